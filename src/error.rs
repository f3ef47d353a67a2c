use std::error;
use std::fmt;
use std::io;
use std::result;

use crate::convert::ConvertError;

/// A type alias for `Result<T, fastcsv::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when processing delimited data.
///
/// Malformed records are *not* errors: they are delivered as records whose
/// [`is_error`](crate::Record::is_error) method returns true. The errors
/// here either prevent parsing from starting (bad configuration) or stop a
/// stream for good (a failing byte source).
#[derive(Debug)]
pub enum Error {
    /// An I/O error that occurred while reading or writing data.
    ///
    /// When reading, the partially parsed record is discarded and the reader
    /// yields nothing further.
    Io(io::Error),
    /// The configured buffer size was zero.
    InvalidBufferSize,
    /// The configured delimiter cannot separate fields, either because it is
    /// the quote character or because it is a line terminator.
    InvalidDelimiter(char),
    /// A field could not be converted to the requested type.
    Convert(ConvertError),
}

impl Error {
    /// Returns true if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        match *self {
            Error::Io(_) => true,
            _ => false,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ConvertError> for Error {
    fn from(err: ConvertError) -> Error {
        Error::Convert(err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::InvalidBufferSize => None,
            Error::InvalidDelimiter(_) => None,
            Error::Convert(ref err) => Some(err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Io(ref err) => err.fmt(f),
            Error::InvalidBufferSize => {
                write!(f, "configuration error: buffer size must be positive")
            }
            Error::InvalidDelimiter(c) => write!(
                f,
                "configuration error: {:?} cannot be used as a delimiter",
                c
            ),
            Error::Convert(ref err) => err.fmt(f),
        }
    }
}
