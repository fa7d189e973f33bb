use std::fmt::{Display, Formatter};

use crate::encodings::Encoding;

macro_rules! general_err {
    ($fmt:expr) => ($crate::errors::Error::OutOfSpec($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => ($crate::errors::Error::OutOfSpec(format!($fmt, $($args),*)));
}

macro_rules! nyi_err {
    ($fmt:expr) => ($crate::errors::Error::NotYetImplemented($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => ($crate::errors::Error::NotYetImplemented(format!($fmt, $($args),*)));
}

macro_rules! range_err {
    ($fmt:expr) => ($crate::errors::Error::OutOfRange($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => ($crate::errors::Error::OutOfRange(format!($fmt, $($args),*)));
}

/// The step of a codec during which an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Parsing framing: varint run headers, delta stream and block headers.
    DecodeHeader,
    /// Reading the payload a header announced.
    DecodeBody,
    /// Appending values to an encoder.
    EncodeBody,
    /// Writing buffered runs, groups or blocks on `close`.
    Flush,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::DecodeHeader => "decoding header",
            Operation::DecodeBody => "decoding body",
            Operation::EncodeBody => "encoding",
            Operation::Flush => "flushing",
        };
        f.write_str(name)
    }
}

/// Errors raised by this crate.
#[derive(Debug)]
pub enum Error {
    /// Short read or write on the underlying transport.
    Io(std::io::Error),
    /// A decoded magnitude does not fit the declared or target integer width.
    OutOfRange(String),
    /// The byte stream violates the layout of its encoding.
    OutOfSpec(String),
    /// The request is valid but not supported by this crate.
    NotYetImplemented(String),
    /// An error attributed to the codec and operation it happened in.
    Codec {
        encoding: Encoding,
        operation: Operation,
        source: Box<Error>,
    },
}

impl Error {
    /// Attributes this error to `encoding` and `operation`. Already attributed errors
    /// keep their innermost attribution.
    pub fn within(self, encoding: Encoding, operation: Operation) -> Self {
        match self {
            Error::Codec { .. } => self,
            other => Error::Codec {
                encoding,
                operation,
                source: Box::new(other),
            },
        }
    }

    /// The error without codec attribution.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Codec { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether the underlying transport ran out of bytes.
    pub fn is_eof(&self) -> bool {
        matches!(
            self.root_cause(),
            Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof
        )
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "Io error: {e}"),
            Error::OutOfRange(s) => write!(f, "Value out of range: {s}"),
            Error::OutOfSpec(s) => write!(f, "Out of spec: {s}"),
            Error::NotYetImplemented(s) => write!(f, "Not yet implemented: {s}"),
            Error::Codec {
                encoding,
                operation,
                source,
            } => write!(f, "{encoding:?} {operation}: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Codec { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<parquet_format_safe::thrift::Error> for Error {
    fn from(e: parquet_format_safe::thrift::Error) -> Self {
        Error::OutOfSpec(format!("Invalid thrift: {e}"))
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(e: std::num::TryFromIntError) -> Self {
        Error::OutOfRange(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
