use bstr::BString;
use thiserror::Error;

use crate::error::Location;

/// A lexical error and where it happened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{source} at {location}")]
pub struct TokenizerError {
    /// What was wrong.
    pub source: SyntaxError,
    /// Position of the offending byte.
    pub location: Location,
}

impl TokenizerError {
    pub(crate) fn new(source: SyntaxError, location: Location) -> Self {
        Self { source, location }
    }
}

/// The lexical rule a byte sequence broke.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// A byte (or UTF-8 sequence) the grammar does not allow here.
    #[error("invalid character {0:?}")]
    InvalidCharacter(BString),
    /// A backslash followed by an unknown escape character.
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    /// A non-hex digit inside `\uXXXX`.
    #[error("invalid unicode escape sequence at character: {0:?}")]
    InvalidUnicodeEscapeChar(BString),
    /// A UTF-16 surrogate escape without its other half.
    #[error("unpaired surrogate \\u{0:04X}")]
    UnpairedSurrogate(u16),
    /// A raw byte below 0x20 inside a string.
    #[error("unescaped control character 0x{0:02X} in string")]
    ControlCharacter(u8),
    /// String bytes that do not form valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    /// An integer literal outside the `i64` range.
    #[error("integer literal {0} does not fit in 64 bits")]
    IntegerOutOfRange(String),
    /// More nested containers than `max_depth` allows.
    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),
}

/// Returned by [`Tokenizer::feed`](crate::Tokenizer::feed) when unread input
/// is still buffered.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot feed more input while {unread} fed bytes are still unread")]
pub struct FeedError {
    /// Bytes still waiting to be read.
    pub unread: usize,
}
