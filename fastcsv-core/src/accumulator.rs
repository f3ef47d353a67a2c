use crate::record::Record;

/// Collects the pieces of the record currently being parsed.
///
/// An accumulator tracks the field being built, the fields already closed,
/// the raw text of the record and whether the record is malformed. All of it
/// survives across calls to the parser, so a record may be assembled from any
/// number of input windows.
#[derive(Clone, Debug, Default)]
pub struct Accumulator {
    delimiter: char,
    field: String,
    field_len: usize,
    field_open: bool,
    fields: Vec<String>,
    raw: String,
    error: bool,
}

impl Accumulator {
    /// Create an empty accumulator for records separated by `delimiter`.
    pub fn new(delimiter: char) -> Accumulator {
        Accumulator { delimiter, ..Accumulator::default() }
    }

    /// Append one character to the current field.
    pub fn append_field(&mut self, c: char) {
        self.field.push(c);
        self.field_len += 1;
        self.field_open = true;
    }

    /// Mark the current field as present even though it may stay empty.
    ///
    /// This is how a quoted empty field (`""`) becomes a real field.
    pub fn open_field(&mut self) {
        self.field_open = true;
    }

    /// Close the current field and move it onto the list of fields.
    ///
    /// This always produces a field, possibly empty.
    pub fn close_field(&mut self) {
        let field = std::mem::replace(&mut self.field, String::new());
        self.fields.push(field);
        self.field_len = 0;
        self.field_open = false;
    }

    /// Append one character to the raw text of the record.
    pub fn append_raw(&mut self, c: char) {
        self.raw.push(c);
    }

    /// Flag the current record as malformed.
    pub fn mark_error(&mut self) {
        self.error = true;
    }

    /// Returns true if the current record has been flagged as malformed.
    pub fn is_error(&self) -> bool {
        self.error
    }

    /// The number of characters in the current field.
    pub fn field_len(&self) -> usize {
        self.field_len
    }

    /// Returns true if nothing has been accumulated for the current record.
    pub fn is_empty(&self) -> bool {
        !self.field_open && self.fields.is_empty() && self.raw.is_empty()
    }

    /// Finish the current record.
    ///
    /// If a field is open or fields were already closed, the current field
    /// is closed and a record is returned. A line with no content at all
    /// produces no record. Either way, the accumulator is empty afterwards.
    pub fn emit_record(&mut self) -> Option<Record> {
        if self.field_open || !self.fields.is_empty() {
            self.close_field();
        }
        let record = if self.fields.is_empty() {
            None
        } else {
            Some(Record::new(
                self.delimiter,
                self.error,
                std::mem::replace(&mut self.raw, String::new()),
                std::mem::replace(&mut self.fields, vec![]),
            ))
        };
        self.clear();
        record
    }

    /// Discard everything accumulated so far.
    pub fn clear(&mut self) {
        self.field.clear();
        self.field_len = 0;
        self.field_open = false;
        self.fields.clear();
        self.raw.clear();
        self.error = false;
    }
}
