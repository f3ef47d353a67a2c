/*!
The `fastcsv` crate provides a streaming reader and a writer for delimiter
separated text.

The reader never needs to see a whole record at once. It pulls windows of
bytes from any `io::Read`, decodes them and feeds them to an incremental
state machine (from the [`fastcsv-core`](fastcsv_core) crate). A record that
spans any number of windows parses exactly like one that arrives whole, so
the buffer size only affects how often the source is read.

# Overview

* [`Reader`] reads records from a file, an in memory string or any other
  `io::Read`. Records come out one at a time, through an iterator, all at
  once with [`Reader::read_all`] or through a callback with
  [`Reader::for_each_record`].
* [`queue`] runs a reader on a worker thread and hands its records to any
  number of consumer threads.
* [`Writer`] writes records back out, quoting fields only when needed so
  that they read back unchanged.
* [`convert`] turns fields into typed [`Value`](convert::Value)s.

# Malformed input

Bad data never stops the stream. A record that could not be parsed cleanly
(a stray quote, text after a closing quote, a quoted field longer than the
configured limit, or a quote left open at the end of the stream) is still
returned, with [`Record::is_error`] set and whatever fields could be
recovered. Parsing picks up again at the next line terminator.

Only a failing byte source ends the stream early, with an [`Error::Io`].

# Example

```
use fastcsv::ReaderBuilder;

let data = "\
name,quote
Ada,\"\"\"The Analytical Engine weaves algebraic patterns\"\"\"
Grace,\"It's easier to ask forgiveness
than it is to get permission.\"
";
let mut rdr = ReaderBuilder::new().from_text(data)?;
for result in rdr.records() {
    let record = result?;
    assert!(!record.is_error());
    assert_eq!(record.len(), 2);
}
# Ok::<(), fastcsv::Error>(())
```

# Logging

This crate logs through the [`log`](https://docs.rs/log) facade. A stream
that ends inside a quoted field and a failing source are reported at the
`warn` level, stream summaries at `debug` and window refills at `trace`.
No logger is installed by the crate itself.
*/

#![deny(missing_docs)]

pub use fastcsv_core::{Record, RecordIter, State};

pub use crate::error::{Error, Result};
pub use crate::reader::{
    Reader, ReaderBuilder, RecordsIntoIter, RecordsIter, DEFAULT_BUFFER_SIZE,
};
pub use crate::writer::{
    delimit, needs_quotes, quote_field, QuoteStyle, Terminator, Writer,
    WriterBuilder,
};

pub mod convert;
pub mod decode;
mod error;
pub mod queue;
mod reader;
mod writer;

/// Parse the first record of `line` with the default configuration and
/// return its fields.
///
/// Text past the first record is ignored. If `line` holds no record at
/// all, the result is empty.
///
/// ```
/// assert_eq!(fastcsv::parse_line("a,\"b,c\""), vec!["a", "b,c"]);
/// assert!(fastcsv::parse_line("").is_empty());
/// ```
pub fn parse_line(line: &str) -> Vec<String> {
    let mut parser = fastcsv_core::Parser::new();
    let mut input = line;
    loop {
        let (res, nin) = parser.read_record(input);
        input = &input[nin..];
        match res {
            fastcsv_core::ReadRecordResult::Record(record) => {
                return record.into_fields();
            }
            fastcsv_core::ReadRecordResult::End => return vec![],
            fastcsv_core::ReadRecordResult::InputEmpty => {}
        }
    }
}

/// Parse all of `text` with the default configuration.
///
/// ```
/// let records = fastcsv::parse_str("a,b\n\"\"\n,,")?;
/// assert_eq!(records.len(), 3);
/// assert_eq!(records[1].fields(), &[""]);
/// assert_eq!(records[2].fields(), &["", "", ""]);
/// # Ok::<(), fastcsv::Error>(())
/// ```
pub fn parse_str(text: &str) -> Result<Vec<Record>> {
    Reader::from_text(text).read_all()
}
