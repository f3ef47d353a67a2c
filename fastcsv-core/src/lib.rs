/*!
`fastcsv-core` provides the incremental engine behind `fastcsv`: a table of
character classes, a pure state transition function and a chunk agnostic
record reader. It does no I/O of its own.

Callers hand the [`Parser`] windows of already decoded text. The parser keeps
all of its state between calls, so a record split across any number of
windows parses exactly like one delivered whole. An empty window signals the
end of the stream.

# Example

```
use fastcsv_core::{Parser, ReadRecordResult};

let mut parser = Parser::new();
let mut input = "a,\"b\nc\"\nx,y";
let mut records = vec![];
loop {
    let (res, nin) = parser.read_record(input);
    input = &input[nin..];
    match res {
        ReadRecordResult::InputEmpty => {}
        ReadRecordResult::Record(record) => records.push(record),
        ReadRecordResult::End => break,
    }
}
assert_eq!(records.len(), 2);
assert_eq!(records[0].fields(), &["a", "b\nc"]);
assert_eq!(records[1].fields(), &["x", "y"]);
```
*/

#![deny(missing_docs)]

pub use crate::accumulator::Accumulator;
pub use crate::parser::{Config, Parser, ParserBuilder, ReadRecordResult};
pub use crate::record::{Record, RecordIter};
pub use crate::state::State;
pub use crate::symbol::{Symbol, QUOTE};

mod accumulator;
mod parser;
mod record;
mod state;
mod symbol;
