use crate::parser::Config;
use crate::symbol::Symbol;

/// A state of the parsing automaton.
///
/// Every record starts at `Start`. `RecordComplete` and `CarriageReturnSeen`
/// are never resting states: the parser immediately re-enters `Start` after
/// reaching either of them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum State {
    /// The beginning of a record.
    Start,
    /// Inside a field that did not begin with a quote.
    UnquotedField,
    /// Between the quotes of a quoted field.
    QuotedField,
    /// Just after a quote that closed a quoted field, or the first half of a
    /// doubled quote.
    AfterClosingQuote,
    /// An LF immediately following a CR. The pair is one line terminator.
    CarriageReturnSeen,
    /// A delimiter ended the previous field.
    FieldBoundary,
    /// The end of the stream ended the current record.
    RecordComplete,
    /// The current record is malformed. Every character up to the next line
    /// terminator is absorbed into it.
    Error,
}

impl Default for State {
    fn default() -> State {
        State::Start
    }
}

impl State {
    /// Compute the state that follows `self` on `input`.
    ///
    /// `input` is `None` at the end of the stream. `previous_was_cr` reports
    /// whether the character before `input` was a carriage return and
    /// `field_len` is the number of characters accumulated in the current
    /// field so far.
    ///
    /// This is a pure function. It never fails: input that fits no other
    /// transition leads to `State::Error`.
    pub fn next_state(
        self,
        config: &Config,
        input: Option<char>,
        previous_was_cr: bool,
        field_len: usize,
    ) -> State {
        use self::State::*;

        let is = |sym: Symbol| sym.contains(config.delimiter, input);
        match self {
            Start | RecordComplete | CarriageReturnSeen => {
                if is(Symbol::field_start(config.relaxed)) {
                    UnquotedField
                } else if is(Symbol::Quote) {
                    QuotedField
                } else if is(Symbol::Newline) {
                    if previous_was_cr {
                        CarriageReturnSeen
                    } else {
                        Start
                    }
                } else if is(Symbol::Delimiter) {
                    FieldBoundary
                } else if is(Symbol::EndOfStream) {
                    RecordComplete
                } else {
                    Error
                }
            }
            UnquotedField => {
                if is(Symbol::UnquotedContinuation) {
                    UnquotedField
                } else if is(Symbol::Delimiter) {
                    FieldBoundary
                } else if is(Symbol::Newline) {
                    Start
                } else if is(Symbol::EndOfStream) {
                    RecordComplete
                } else {
                    Error
                }
            }
            QuotedField => {
                if config.quoted_limit.map_or(false, |limit| field_len > limit)
                {
                    Error
                } else if is(Symbol::InsideQuotes) {
                    QuotedField
                } else if is(Symbol::Quote) {
                    AfterClosingQuote
                } else {
                    Error
                }
            }
            AfterClosingQuote => {
                if is(Symbol::Quote) {
                    QuotedField
                } else if is(Symbol::Delimiter) {
                    FieldBoundary
                } else if is(Symbol::Newline) {
                    Start
                } else if is(Symbol::EndOfStream) {
                    RecordComplete
                } else {
                    Error
                }
            }
            FieldBoundary => {
                if is(Symbol::field_start(config.relaxed)) {
                    UnquotedField
                } else if is(Symbol::Quote) {
                    QuotedField
                } else if is(Symbol::Delimiter) {
                    FieldBoundary
                } else if is(Symbol::Newline) {
                    Start
                } else if is(Symbol::EndOfStream) {
                    RecordComplete
                } else {
                    Error
                }
            }
            Error => {
                if is(Symbol::Newline) {
                    Start
                } else if is(Symbol::EndOfStream) {
                    RecordComplete
                } else {
                    Error
                }
            }
        }
    }
}
