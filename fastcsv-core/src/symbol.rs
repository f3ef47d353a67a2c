/// The quote character.
pub const QUOTE: char = '"';

const VT: char = '\x0B';
const FF: char = '\x0C';

/// A class of characters that the state machine discriminates on.
///
/// Each class is a row in a static table. A row is either an explicit set of
/// characters or, when it is an *exclusion*, every character *not* in the
/// set. Rows that check the delimiter additionally include (for explicit
/// sets) or exclude (for exclusions) the configured delimiter.
///
/// The end of the stream is represented by `None`. It belongs to
/// `EndOfStream` and to no other class.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Symbol {
    /// Exactly the quote character.
    Quote,
    /// Anything that may start an unquoted field in relaxed mode. This
    /// excludes the quote, the delimiter and the newline family, but permits
    /// space and tab.
    FieldStartRelaxed,
    /// Anything that may start an unquoted field in strict mode. Like
    /// `FieldStartRelaxed`, but space and tab are also excluded.
    FieldStartStrict,
    /// Anything that may continue an open unquoted field: everything except
    /// the quote, CR, LF and the delimiter.
    UnquotedContinuation,
    /// Anything that may appear verbatim between quotes: everything except
    /// the quote.
    InsideQuotes,
    /// CR or LF.
    Newline,
    /// The end of stream sentinel.
    EndOfStream,
    /// The configured delimiter.
    Delimiter,
}

struct Row {
    exclusion: bool,
    chars: &'static [char],
    check_delimiter: bool,
}

const QUOTE_ROW: Row =
    Row { exclusion: false, chars: &[QUOTE], check_delimiter: false };
const FIELD_START_RELAXED_ROW: Row = Row {
    exclusion: true,
    chars: &[QUOTE, '\n', VT, FF, '\r'],
    check_delimiter: true,
};
const FIELD_START_STRICT_ROW: Row = Row {
    exclusion: true,
    chars: &[QUOTE, ' ', '\t', '\n', VT, FF, '\r'],
    check_delimiter: true,
};
const UNQUOTED_CONTINUATION_ROW: Row = Row {
    exclusion: true,
    chars: &[QUOTE, '\r', '\n'],
    check_delimiter: true,
};
const INSIDE_QUOTES_ROW: Row =
    Row { exclusion: true, chars: &[QUOTE], check_delimiter: false };
const NEWLINE_ROW: Row =
    Row { exclusion: false, chars: &['\r', '\n'], check_delimiter: false };
const DELIMITER_ROW: Row =
    Row { exclusion: false, chars: &[], check_delimiter: true };

impl Symbol {
    /// Return the class of characters that may start an unquoted field.
    pub fn field_start(relaxed: bool) -> Symbol {
        if relaxed {
            Symbol::FieldStartRelaxed
        } else {
            Symbol::FieldStartStrict
        }
    }

    /// Returns true if and only if `input` belongs to this class when
    /// `delimiter` is the field separator.
    ///
    /// `None` is the end of stream sentinel. This never panics: a character
    /// that appears in no explicit set simply isn't a member of it.
    pub fn contains(self, delimiter: char, input: Option<char>) -> bool {
        let c = match input {
            None => return self == Symbol::EndOfStream,
            Some(c) => c,
        };
        let row = match self.row() {
            None => return false,
            Some(row) => row,
        };
        let in_set = row.chars.contains(&c);
        let is_delim = row.check_delimiter && c == delimiter;
        if row.exclusion {
            !in_set && !is_delim
        } else {
            in_set || is_delim
        }
    }

    fn row(self) -> Option<&'static Row> {
        match self {
            Symbol::Quote => Some(&QUOTE_ROW),
            Symbol::FieldStartRelaxed => Some(&FIELD_START_RELAXED_ROW),
            Symbol::FieldStartStrict => Some(&FIELD_START_STRICT_ROW),
            Symbol::UnquotedContinuation => Some(&UNQUOTED_CONTINUATION_ROW),
            Symbol::InsideQuotes => Some(&INSIDE_QUOTES_ROW),
            Symbol::Newline => Some(&NEWLINE_ROW),
            Symbol::Delimiter => Some(&DELIMITER_ROW),
            // Only the sentinel belongs here, and it never reaches the table.
            Symbol::EndOfStream => None,
        }
    }
}
