use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use fastcsv_core::QUOTE;

use crate::convert::Value;
use crate::error::{Error, Result};

/// The quoting style to use when writing data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuoteStyle {
    /// This puts quotes around every field. Always.
    Always,
    /// This puts quotes around fields only when necessary.
    ///
    /// They are necessary when fields start or end with whitespace, or
    /// contain a quote, a line terminator or the delimiter. See
    /// [`needs_quotes`].
    ///
    /// This is the default.
    Necessary,
    /// This *never* writes quotes, even if it would produce data that does
    /// not read back the same.
    Never,
}

impl Default for QuoteStyle {
    fn default() -> QuoteStyle {
        QuoteStyle::Necessary
    }
}

/// A record terminator for writing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Terminator {
    /// Writes `\r\n`.
    CRLF,
    /// Writes the given character. Only `\n` and `\r` read back as line
    /// terminators.
    Any(char),
}

impl Default for Terminator {
    fn default() -> Terminator {
        Terminator::Any('\n')
    }
}

/// Returns true if `field` must be quoted to read back unchanged when fields
/// are separated by `delimiter`.
///
/// That is the case when the field starts or ends with whitespace (space,
/// tab, LF, VT, FF or CR), or contains a quote, CR, LF or the delimiter.
pub fn needs_quotes(delimiter: char, field: &str) -> bool {
    fn is_space(c: char) -> bool {
        match c {
            ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r' => true,
            _ => false,
        }
    }

    field.starts_with(is_space)
        || field.ends_with(is_space)
        || field.contains(|c: char| {
            c == QUOTE || c == '\r' || c == '\n' || c == delimiter
        })
}

/// Quote `field` if [`needs_quotes`] says so, doubling any embedded quotes.
pub fn quote_field(delimiter: char, field: &str) -> Cow<'_, str> {
    if needs_quotes(delimiter, field) {
        Cow::Owned(quote(field))
    } else {
        Cow::Borrowed(field)
    }
}

/// Join `fields` into one line, quoting as necessary.
///
/// A record made of a single empty field is written as `""`, so that it is
/// not read back as a blank line. No line terminator is added.
pub fn delimit<I, T>(delimiter: char, fields: I) -> String
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut line = String::new();
    push_record(&mut line, delimiter, QuoteStyle::Necessary, fields);
    line
}

fn quote(field: &str) -> String {
    let mut buf = String::with_capacity(field.len() + 2);
    buf.push(QUOTE);
    for c in field.chars() {
        if c == QUOTE {
            buf.push(QUOTE);
        }
        buf.push(c);
    }
    buf.push(QUOTE);
    buf
}

fn push_record<I, T>(
    line: &mut String,
    delimiter: char,
    style: QuoteStyle,
    fields: I,
) where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut count = 0;
    let mut only_empty = true;
    for field in fields {
        let field = field.as_ref();
        if count > 0 {
            line.push(delimiter);
        }
        count += 1;
        only_empty = only_empty && field.is_empty();
        match style {
            QuoteStyle::Always => line.push_str(&quote(field)),
            QuoteStyle::Necessary => {
                line.push_str(&quote_field(delimiter, field))
            }
            QuoteStyle::Never => line.push_str(field),
        }
    }
    if count == 1 && only_empty && style != QuoteStyle::Always {
        line.push(QUOTE);
        line.push(QUOTE);
    }
}

/// Builds a writer with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, record terminator
/// and more. Once a writer is built, its configuration cannot be changed.
#[derive(Clone, Debug)]
pub struct WriterBuilder {
    delimiter: char,
    terminator: Terminator,
    quote_style: QuoteStyle,
}

impl Default for WriterBuilder {
    fn default() -> WriterBuilder {
        WriterBuilder {
            delimiter: ',',
            terminator: Terminator::default(),
            quote_style: QuoteStyle::default(),
        }
    }
}

impl WriterBuilder {
    /// Create a new builder for configuring a writer.
    ///
    /// To convert a builder into a writer, call one of the methods starting
    /// with `from_`.
    ///
    /// # Example
    ///
    /// ```
    /// use fastcsv::WriterBuilder;
    ///
    /// let mut wtr = WriterBuilder::new().delimiter(';').from_writer(vec![]);
    /// wtr.write_record(&["a;b", "c"])?;
    /// let data = String::from_utf8(wtr.into_inner()?).unwrap();
    /// assert_eq!(data, "\"a;b\";c\n");
    /// # Ok::<(), fastcsv::Error>(())
    /// ```
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a writer from this configuration that writes data to the given
    /// file path. The file is truncated if it already exists.
    ///
    /// If there was a problem opening the file at the given path, then this
    /// returns the corresponding error.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Writer<File>> {
        Ok(self.from_writer(File::create(path)?))
    }

    /// Build a writer from this configuration that writes data to `wtr`.
    ///
    /// Note that the writer is buffered automatically, so you should not
    /// wrap `wtr` in a buffered writer like `io::BufWriter`.
    pub fn from_writer<W: io::Write>(&self, wtr: W) -> Writer<W> {
        Writer {
            wtr: io::BufWriter::new(wtr),
            delimiter: self.delimiter,
            terminator: self.terminator,
            quote_style: self.quote_style,
            line: String::new(),
        }
    }

    /// The field delimiter to use when writing.
    ///
    /// The default is `,`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut WriterBuilder {
        self.delimiter = delimiter;
        self
    }

    /// The record terminator to use when writing.
    ///
    /// The default is `\n`.
    pub fn terminator(&mut self, term: Terminator) -> &mut WriterBuilder {
        self.terminator = term;
        self
    }

    /// The quoting style to use when writing.
    ///
    /// The default is `QuoteStyle::Necessary`.
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.quote_style = style;
        self
    }
}

/// A writer of delimited records.
///
/// Fields are quoted so that the output reads back unchanged with the same
/// delimiter. Records with a single empty field are always written as `""`
/// so that they are not mistaken for blank lines, which the reader skips.
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    wtr: io::BufWriter<W>,
    delimiter: char,
    terminator: Terminator,
    quote_style: QuoteStyle,
    line: String,
}

impl Writer<File> {
    /// Build a writer with a default configuration that writes data to the
    /// given file path. The file is truncated if it already exists.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Writer<File>> {
        WriterBuilder::new().from_path(path)
    }
}

impl<W: io::Write> Writer<W> {
    /// Build a writer with a default configuration that writes data to
    /// `wtr`.
    pub fn from_writer(wtr: W) -> Writer<W> {
        WriterBuilder::new().from_writer(wtr)
    }

    /// Write a single record.
    ///
    /// Any iterator of string-like items works, including a parsed
    /// [`Record`](crate::Record). An empty iterator writes a blank line,
    /// which reads back as no record at all.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.line.clear();
        push_record(&mut self.line, self.delimiter, self.quote_style, record);
        match self.terminator {
            Terminator::CRLF => self.line.push_str("\r\n"),
            Terminator::Any(c) => self.line.push(c),
        }
        self.wtr.write_all(self.line.as_bytes())?;
        Ok(())
    }

    /// Write a record of typed values.
    ///
    /// Values are rendered with their `Display` implementation: integers via
    /// `itoa`, floats via `ryu` and `Value::Null` as an empty field.
    pub fn write_values(&mut self, values: &[Value]) -> Result<()> {
        self.write_record(values.iter().map(|v| v.to_string()))
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }

    /// Return a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.wtr.get_ref()
    }

    /// Flush the internal buffer and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.wtr.into_inner().map_err(|err| {
            Error::Io(io::Error::new(err.error().kind(), err.to_string()))
        })
    }
}
