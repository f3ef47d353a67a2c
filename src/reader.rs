use std::fs::File;
use std::io;
use std::path::Path;

use log::{debug, trace, warn};

use fastcsv_core::{
    Parser, ParserBuilder, ReadRecordResult, Record, State, QUOTE,
};

use crate::decode::Utf8Decoder;
use crate::error::{Error, Result};

/// The default number of bytes read from the source at a time.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Builds a reader with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, the size of the
/// windows read from the source and how forgiving the parser is. Once a
/// reader is built, its configuration cannot be changed.
///
/// The configuration is checked when the reader is built, before anything
/// is read.
#[derive(Clone, Debug)]
pub struct ReaderBuilder {
    parser: ParserBuilder,
    delimiter: char,
    buffer_size: usize,
}

impl Default for ReaderBuilder {
    fn default() -> ReaderBuilder {
        ReaderBuilder {
            parser: ParserBuilder::new(),
            delimiter: ',',
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ReaderBuilder {
    /// Create a new builder for configuring a reader.
    ///
    /// To convert a builder into a reader, call one of the methods starting
    /// with `from_`.
    ///
    /// # Example
    ///
    /// ```
    /// use fastcsv::ReaderBuilder;
    ///
    /// let data = "\
    /// city;country;pop
    /// Boston;\"United States\";4628910
    /// ";
    /// let mut rdr = ReaderBuilder::new().delimiter(';').from_text(data)?;
    /// let records = rdr.read_all()?;
    /// assert_eq!(records.len(), 2);
    /// assert_eq!(&records[1][1], "United States");
    /// # Ok::<(), fastcsv::Error>(())
    /// ```
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a reader from this configuration that reads data from the
    /// given file path.
    ///
    /// If there was a problem opening the file at the given path, or the
    /// configuration is invalid, then this returns the corresponding error.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Reader<File>> {
        self.validate()?;
        self.from_reader(File::open(path)?)
    }

    /// Build a reader from this configuration that reads data from `rdr`.
    ///
    /// Note that the reader is buffered automatically, so you should not
    /// wrap `rdr` in a buffered reader like `io::BufReader`.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Result<Reader<R>> {
        self.validate()?;
        Ok(Reader::new(self, rdr))
    }

    /// Build a reader from this configuration that reads in memory text.
    pub fn from_text<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<Reader<io::Cursor<Vec<u8>>>> {
        self.from_reader(io::Cursor::new(text.into().into_bytes()))
    }

    /// The field delimiter to use when parsing.
    ///
    /// The default is `,`. The quote character and line terminators cannot
    /// be delimiters.
    pub fn delimiter(&mut self, delimiter: char) -> &mut ReaderBuilder {
        self.delimiter = delimiter;
        self.parser.delimiter(delimiter);
        self
    }

    /// The number of bytes to read from the source at a time.
    ///
    /// This never changes the records that are read, only how often the
    /// source is asked for more data. It must be positive. The default is
    /// 1024.
    pub fn buffer_size(&mut self, size: usize) -> &mut ReaderBuilder {
        self.buffer_size = size;
        self
    }

    /// Limit the number of characters a quoted field may hold before the
    /// record is flagged as malformed.
    ///
    /// An unbalanced quote otherwise runs to the end of the stream. With a
    /// limit, the damage stops at the first line terminator past the limit.
    ///
    /// By default, there is no limit.
    pub fn quoted_limit(
        &mut self,
        limit: Option<usize>,
    ) -> &mut ReaderBuilder {
        self.parser.quoted_limit(limit);
        self
    }

    /// Allow unquoted fields to start with a space or a tab.
    ///
    /// This is disabled by default.
    pub fn relaxed(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.parser.relaxed(yes);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::InvalidBufferSize);
        }
        match self.delimiter {
            QUOTE | '\r' | '\n' => {
                Err(Error::InvalidDelimiter(self.delimiter))
            }
            _ => Ok(()),
        }
    }
}

/// A streaming reader of delimited records.
///
/// The reader pulls windows of bytes from its source, decodes them as UTF-8
/// and feeds them to the parser. The size of the windows, and however the
/// source chooses to split its data, never changes the records produced.
///
/// Malformed records are not errors: they are returned with
/// [`Record::is_error`] set. An error is returned only when the source
/// fails, after which the partially parsed record is discarded and the
/// reader yields nothing more.
///
/// # Example
///
/// ```
/// use fastcsv::Reader;
///
/// let mut rdr = Reader::from_text("a,\"b\nc\"\r\nx,y");
/// let mut count = 0;
/// for result in rdr.records() {
///     let record = result?;
///     assert_eq!(record.len(), 2);
///     count += 1;
/// }
/// assert_eq!(count, 2);
/// # Ok::<(), fastcsv::Error>(())
/// ```
#[derive(Debug)]
pub struct Reader<R> {
    rdr: R,
    parser: Parser,
    decoder: Utf8Decoder,
    buf: Vec<u8>,
    window: String,
    pos: usize,
    eof: bool,
    done: bool,
    bytes: u64,
    records: u64,
}

impl<R: io::Read> Reader<R> {
    fn new(builder: &ReaderBuilder, rdr: R) -> Reader<R> {
        Reader {
            rdr,
            parser: builder.parser.build(),
            decoder: Utf8Decoder::new(),
            buf: vec![0; builder.buffer_size],
            window: String::with_capacity(builder.buffer_size),
            pos: 0,
            eof: false,
            done: false,
            bytes: 0,
            records: 0,
        }
    }

    /// Create a new reader with a default configuration for the given
    /// source.
    pub fn from_reader(rdr: R) -> Reader<R> {
        Reader::new(&ReaderBuilder::new(), rdr)
    }

    /// Read the next record.
    ///
    /// This returns `None` once the source is exhausted, and after an
    /// error.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        loop {
            if self.done {
                return Ok(None);
            }
            if self.pos >= self.window.len() {
                if self.eof {
                    return Ok(self.finish());
                }
                if let Err(err) = self.fill() {
                    warn!(
                        "read failed after {} bytes on line {}, \
                         discarding the partial record: {}",
                        self.bytes,
                        self.parser.line(),
                        err,
                    );
                    self.parser.reset();
                    self.done = true;
                    return Err(Error::Io(err));
                }
                continue;
            }
            let (res, nin) = self.parser.read_record(&self.window[self.pos..]);
            self.pos += nin;
            if let ReadRecordResult::Record(record) = res {
                self.records += 1;
                return Ok(Some(record));
            }
        }
    }

    /// Return a borrowed iterator over all records.
    ///
    /// Each item yielded by this iterator is a `Result<Record, Error>`.
    /// The iterator stops after the first error.
    pub fn records(&mut self) -> RecordsIter<'_, R> {
        RecordsIter { rdr: self }
    }

    /// Return an owned iterator over all records.
    pub fn into_records(self) -> RecordsIntoIter<R> {
        RecordsIntoIter { rdr: self }
    }

    /// Read every remaining record into memory.
    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        self.records().collect()
    }

    /// Call `f` once for every remaining record, in order, and return the
    /// number of records seen.
    pub fn for_each_record<F>(&mut self, mut f: F) -> Result<u64>
    where
        F: FnMut(Record),
    {
        let mut count = 0;
        while let Some(record) = self.read_record()? {
            f(record);
            count += 1;
        }
        Ok(count)
    }

    /// The current line number, counting `\n` characters parsed so far.
    /// Line numbers start at `1`.
    pub fn line(&self) -> u64 {
        self.parser.line()
    }

    /// The number of bytes read from the source so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes
    }

    /// The number of records returned so far.
    pub fn records_read(&self) -> u64 {
        self.records
    }

    /// Returns true once the reader will yield no more records.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The state the stream ended in, once its end has been reached.
    ///
    /// Anything other than `State::RecordComplete` means the data ended in
    /// the middle of a quoted field.
    pub fn ended_in(&self) -> Option<State> {
        self.parser.ended_in()
    }

    /// Return a reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.rdr
    }

    /// Unwrap this reader, returning the underlying source.
    ///
    /// Data that was read but not parsed yet is lost.
    pub fn into_inner(self) -> R {
        self.rdr
    }

    fn fill(&mut self) -> io::Result<()> {
        self.window.clear();
        self.pos = 0;
        let n = loop {
            match self.rdr.read(&mut self.buf) {
                Ok(n) => break n,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        };
        if n == 0 {
            self.eof = true;
            self.decoder.finish(&mut self.window);
        } else {
            self.bytes += n as u64;
            self.decoder.decode(&self.buf[..n], &mut self.window);
        }
        trace!("read {} bytes, decoded {} bytes", n, self.window.len());
        Ok(())
    }

    fn finish(&mut self) -> Option<Record> {
        match self.parser.read_record("").0 {
            ReadRecordResult::Record(record) => {
                self.records += 1;
                Some(record)
            }
            _ => {
                debug!(
                    "finished after {} records, {} bytes",
                    self.records, self.bytes
                );
                self.done = true;
                None
            }
        }
    }
}

impl Reader<File> {
    /// Create a new reader with a default configuration for the file at
    /// the given path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader<File>> {
        ReaderBuilder::new().from_path(path)
    }
}

impl Reader<io::Cursor<Vec<u8>>> {
    /// Create a new reader with a default configuration for in memory text.
    pub fn from_text<S: Into<String>>(text: S) -> Reader<io::Cursor<Vec<u8>>> {
        Reader::from_reader(io::Cursor::new(text.into().into_bytes()))
    }
}

/// A borrowed iterator over records.
///
/// The lifetime parameter `'r` refers to the lifetime of the underlying
/// reader.
#[derive(Debug)]
pub struct RecordsIter<'r, R: 'r> {
    rdr: &'r mut Reader<R>,
}

impl<'r, R: io::Read> RecordsIter<'r, R> {
    /// Return a reference to the underlying reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }
}

impl<'r, R: io::Read> Iterator for RecordsIter<'r, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        self.rdr.read_record().transpose()
    }
}

/// An owned iterator over records.
#[derive(Debug)]
pub struct RecordsIntoIter<R> {
    rdr: Reader<R>,
}

impl<R: io::Read> RecordsIntoIter<R> {
    /// Return a reference to the underlying reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }

    /// Drop this iterator and return the underlying reader.
    pub fn into_reader(self) -> Reader<R> {
        self.rdr
    }
}

impl<R: io::Read> Iterator for RecordsIntoIter<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        self.rdr.read_record().transpose()
    }
}
