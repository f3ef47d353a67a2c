use std::fmt;
use std::ops;
use std::slice;

/// A single parsed record.
///
/// A record carries its fields in order, the raw text it was parsed from,
/// the delimiter that separated its fields and whether the parser flagged it
/// as malformed. Malformed records are still delivered: their fields contain
/// everything the parser could recover.
///
/// The raw text excludes the line terminator that ended the record, but
/// includes delimiters, quotes and any line terminators embedded in quoted
/// fields.
#[derive(Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    delimiter: char,
    error: bool,
    raw: String,
    fields: Vec<String>,
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record({:?}, error: {}, raw: {:?})",
            self.fields, self.error, self.raw
        )
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Record {
    /// Create a record from its parts.
    pub fn new(
        delimiter: char,
        error: bool,
        raw: String,
        fields: Vec<String>,
    ) -> Record {
        Record { delimiter, error, raw, fields }
    }

    /// Build a well formed record from fields, rendering its raw text by
    /// joining the fields with `delimiter`.
    ///
    /// No quoting is applied to the raw text.
    pub fn from_fields<I, T>(delimiter: char, fields: I) -> Record
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let mut raw = String::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                raw.push(delimiter);
            }
            raw.push_str(field);
        }
        Record { delimiter, error: false, raw, fields }
    }

    /// The delimiter that separated the fields of this record.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Returns true if this record is malformed.
    pub fn is_error(&self) -> bool {
        self.error
    }

    /// The text this record was parsed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// All fields in order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Return the field at index `i`, if it exists.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.fields.get(i).map(|f| &**f)
    }

    /// The number of fields in this record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if this record has no fields. Parsed records always have
    /// at least one.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over the fields of this record.
    pub fn iter(&self) -> RecordIter<'_> {
        RecordIter { it: self.fields.iter() }
    }

    /// Consume this record and return its fields.
    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl ops::Index<usize> for Record {
    type Output = str;

    fn index(&self, i: usize) -> &str {
        &self.fields[i]
    }
}

impl<'r> IntoIterator for &'r Record {
    type IntoIter = RecordIter<'r>;
    type Item = &'r str;

    fn into_iter(self) -> RecordIter<'r> {
        self.iter()
    }
}

/// An iterator over the fields of a record.
///
/// The `'r` lifetime refers to the lifetime of the `Record` being iterated.
#[derive(Clone, Debug)]
pub struct RecordIter<'r> {
    it: slice::Iter<'r, String>,
}

impl<'r> Iterator for RecordIter<'r> {
    type Item = &'r str;

    fn next(&mut self) -> Option<&'r str> {
        self.it.next().map(|f| &**f)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'r> DoubleEndedIterator for RecordIter<'r> {
    fn next_back(&mut self) -> Option<&'r str> {
        self.it.next_back().map(|f| &**f)
    }
}

impl<'r> ExactSizeIterator for RecordIter<'r> {}
