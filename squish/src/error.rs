//! Error types for serialization, deserialization, and configuration.

use core::fmt;

use crate::value::ValueType;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// An error returned by a user-configured conversion hook.
pub type HookError = Box<dyn core::error::Error + Send + Sync>;

/// Why a codec refused a value.
///
/// This is diagnostic detail only: every variant means the same thing to a
/// caller, namely that the value is not one the codec accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The value is of the wrong kind.
    WrongKind {
        /// Kind the codec accepts
        expected: ValueType,
        /// Kind it was given
        found: ValueType,
    },
    /// A fixed-length string or sequence has the wrong length.
    LengthMismatch {
        /// Required length
        expected: usize,
        /// Actual length
        found: usize,
    },
    /// The number is not a whole number in `0..=max`.
    OutOfRange {
        /// The offending number
        value: f64,
        /// Upper bound, if the codec has one
        max: Option<u64>,
    },
    /// The value differs from the constant.
    NotEqual,
    /// No alternative of a union accepted the value.
    NoAlternative,
    /// A record field required by the schema is absent.
    MissingField(String),
    /// A dependent field was processed before the field it depends on.
    UnboundDependency,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::WrongKind { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Rejection::LengthMismatch { expected, found } => {
                write!(f, "expected length {expected}, found {found}")
            }
            Rejection::OutOfRange {
                value,
                max: Some(max),
            } => write!(f, "{value} is not a whole number in 0..={max}"),
            Rejection::OutOfRange { value, max: None } => {
                write!(f, "{value} is not a non-negative whole number")
            }
            Rejection::NotEqual => f.write_str("value differs from constant"),
            Rejection::NoAlternative => f.write_str("no alternative accepts the value"),
            Rejection::MissingField(name) => write!(f, "missing field `{name}`"),
            Rejection::UnboundDependency => {
                f.write_str("dependent field processed before its source field")
            }
        }
    }
}

/// Error produced by a codec.
///
/// Only [`Error::Rejected`] is the "value not accepted" signal; unions try
/// their next alternative on it and nothing else. Hook errors always
/// propagate as they are.
#[derive(Debug)]
pub enum Error {
    /// The value is not accepted by the codec.
    Rejected(Rejection),
    /// A configured conversion hook failed.
    Hook(HookError),
    /// The input text cannot be the encoding of any value.
    Malformed(String),
    /// Templates or recursive schemas nested past the given limit.
    TooDeep(usize),
}

impl Error {
    /// Returns `true` if the codec refused the value.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Rejected(_))
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::Malformed(message.into())
    }
}

impl From<Rejection> for Error {
    fn from(rejection: Rejection) -> Self {
        Error::Rejected(rejection)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Rejected(rejection) => write!(f, "unable to serialize value: {rejection}"),
            Error::Hook(err) => write!(f, "conversion hook failed: {err}"),
            Error::Malformed(message) => write!(f, "malformed input: {message}"),
            Error::TooDeep(limit) => write!(f, "nesting deeper than {limit} levels"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Hook(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// A configuration that would make encodings ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The escape function leaves the terminator character as-is.
    UnescapedTerminator(char),
    /// The terminator is also the integer padding digit.
    TerminatorIsDigit(char),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnescapedTerminator(c) => {
                write!(f, "escape function does not encode the terminator `{c}`")
            }
            ConfigError::TerminatorIsDigit(c) => {
                write!(f, "terminator `{c}` is the integer zero digit")
            }
        }
    }
}

impl core::error::Error for ConfigError {}
