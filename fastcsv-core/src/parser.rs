use log::{debug, warn};

use crate::accumulator::Accumulator;
use crate::record::Record;
use crate::state::State;
use crate::symbol::QUOTE;

/// The immutable configuration of a parser.
///
/// A configuration is built with a [`ParserBuilder`]. It is also what
/// [`State::next_state`] consults to classify characters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub(crate) delimiter: char,
    pub(crate) quoted_limit: Option<usize>,
    pub(crate) relaxed: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config { delimiter: ',', quoted_limit: None, relaxed: false }
    }
}

impl Config {
    /// The field delimiter.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The maximum number of characters a quoted field may accumulate
    /// before the record is flagged as malformed.
    pub fn quoted_limit(&self) -> Option<usize> {
        self.quoted_limit
    }

    /// Whether space and tab may start an unquoted field.
    pub fn relaxed(&self) -> bool {
        self.relaxed
    }
}

/// Builds a parser with various configuration knobs.
#[derive(Clone, Debug, Default)]
pub struct ParserBuilder {
    config: Config,
}

impl ParserBuilder {
    /// Create a new builder.
    pub fn new() -> ParserBuilder {
        ParserBuilder::default()
    }

    /// Build a parser from this configuration.
    pub fn build(&self) -> Parser {
        Parser::from_config(self.config())
    }

    /// Return the configuration this builder would give a parser.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// The field delimiter to use when parsing.
    ///
    /// The default is `,`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut ParserBuilder {
        self.config.delimiter = delimiter;
        self
    }

    /// Limit the number of characters a quoted field may hold.
    ///
    /// Once a quoted field holds more than `limit` characters, the next
    /// character puts the parser in its error state. Everything up to the
    /// next line terminator is then folded into the field and the record is
    /// flagged as malformed. This bounds the damage done by an unbalanced
    /// quote, which would otherwise swallow the rest of the stream.
    ///
    /// By default, there is no limit.
    pub fn quoted_limit(
        &mut self,
        limit: Option<usize>,
    ) -> &mut ParserBuilder {
        self.config.quoted_limit = limit;
        self
    }

    /// Allow unquoted fields to start with a space or a tab.
    ///
    /// This is disabled by default, in which case leading whitespace makes a
    /// record malformed.
    pub fn relaxed(&mut self, yes: bool) -> &mut ParserBuilder {
        self.config.relaxed = yes;
        self
    }
}

/// The result of parsing at most one record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadRecordResult {
    /// The caller provided input was exhausted before the end of a record was
    /// found.
    InputEmpty,
    /// The end of a record was found.
    Record(Record),
    /// All data has been read.
    ///
    /// This can only be returned when an empty input is provided by the
    /// caller.
    End,
}

impl ReadRecordResult {
    /// Returns true if this result carries a record.
    pub fn is_record(&self) -> bool {
        match *self {
            ReadRecordResult::Record(_) => true,
            _ => false,
        }
    }
}

/// A push based incremental parser.
///
/// Callers feed the parser windows of decoded text with
/// [`read_record`](Parser::read_record). All parsing state is kept between
/// calls, so the way the input is split into windows never changes the
/// records that come out.
///
/// The parser never fails. Malformed input produces records flagged with
/// [`Record::is_error`], and parsing resumes at the next line terminator.
///
/// CR, LF and CRLF are each a single record terminator. Lines with no
/// content are skipped.
#[derive(Clone, Debug)]
pub struct Parser {
    config: Config,
    state: State,
    acc: Accumulator,
    previous_was_cr: bool,
    line: u64,
    ended_in: Option<State>,
}

impl Default for Parser {
    fn default() -> Parser {
        Parser::new()
    }
}

impl Parser {
    /// Create a new parser with a default configuration.
    pub fn new() -> Parser {
        ParserBuilder::new().build()
    }

    /// Create a new parser with the given configuration.
    pub fn from_config(config: Config) -> Parser {
        let acc = Accumulator::new(config.delimiter);
        Parser {
            config,
            state: State::Start,
            acc,
            previous_was_cr: false,
            line: 1,
            ended_in: None,
        }
    }

    /// The configuration of this parser.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reset the parser such that it behaves as if it had never been used.
    ///
    /// Anything accumulated for a partially parsed record is discarded.
    pub fn reset(&mut self) {
        self.state = State::Start;
        self.acc.clear();
        self.previous_was_cr = false;
        self.line = 1;
        self.ended_in = None;
    }

    /// Return the current line number as measured by the number of
    /// occurrences of `\n`.
    ///
    /// Line numbers starts at `1` and are reset when `reset` is called.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The state the parser is resting in.
    pub fn state(&self) -> State {
        self.state
    }

    /// The state reached by the most recent end of stream transition, if
    /// the end of the stream has been seen.
    ///
    /// Anything other than `State::RecordComplete` means the stream ended
    /// in the middle of a quoted field.
    pub fn ended_in(&self) -> Option<State> {
        self.ended_in
    }

    /// Parse text in `input` until a record is complete or `input` is
    /// exhausted.
    ///
    /// This returns the result along with the number of bytes of `input`
    /// that were consumed. Callers should pass the unconsumed remainder of
    /// `input` back in on the next call.
    ///
    /// An empty `input` marks the end of the stream. The record in progress,
    /// if any, is then returned. Once nothing is left, `End` is returned,
    /// and it keeps being returned for further empty inputs.
    pub fn read_record(&mut self, input: &str) -> (ReadRecordResult, usize) {
        if input.is_empty() {
            return (self.finish(), 0);
        }
        for (i, c) in input.char_indices() {
            if let Some(record) = self.step(c) {
                return (ReadRecordResult::Record(record), i + c.len_utf8());
            }
        }
        (ReadRecordResult::InputEmpty, input.len())
    }

    fn step(&mut self, c: char) -> Option<Record> {
        let prev = self.state;
        let next = prev.next_state(
            &self.config,
            Some(c),
            self.previous_was_cr,
            self.acc.field_len(),
        );
        self.previous_was_cr = c == '\r';
        if c == '\n' {
            self.line += 1;
        }
        match next {
            State::Start | State::CarriageReturnSeen => {}
            _ => self.acc.append_raw(c),
        }

        self.state = next;
        match next {
            State::Start | State::RecordComplete => {
                self.state = State::Start;
                return self.acc.emit_record();
            }
            State::CarriageReturnSeen => {
                self.state = State::Start;
            }
            State::UnquotedField => self.acc.append_field(c),
            State::QuotedField => {
                if c == QUOTE && prev != State::AfterClosingQuote {
                    self.acc.open_field();
                } else {
                    self.acc.append_field(c);
                }
            }
            State::AfterClosingQuote => {}
            State::FieldBoundary => self.acc.close_field(),
            State::Error => {
                self.acc.append_field(c);
                self.acc.mark_error();
            }
        }
        None
    }

    fn finish(&mut self) -> ReadRecordResult {
        if self.state == State::Start && self.ended_in.is_some() {
            return ReadRecordResult::End;
        }
        let next = self.state.next_state(
            &self.config,
            None,
            self.previous_was_cr,
            self.acc.field_len(),
        );
        self.ended_in = Some(next);
        self.state = State::Start;
        self.previous_was_cr = false;
        if next != State::RecordComplete {
            warn!(
                "stream ended in state {:?} on line {}, \
                 flagging the last record as malformed",
                next, self.line,
            );
            self.acc.mark_error();
        }
        match self.acc.emit_record() {
            Some(record) => ReadRecordResult::Record(record),
            None => {
                debug!("end of stream after {} line(s)", self.line);
                ReadRecordResult::End
            }
        }
    }
}
