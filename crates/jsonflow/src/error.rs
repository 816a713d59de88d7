use core::fmt;

use thiserror::Error;

use crate::{assembler::StructureError, tokenizer::FeedError, tokenizer::TokenizerError};

/// Boxed error type used to carry upstream failures.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// A line/column position in the byte stream, both 1-based.
///
/// Columns count bytes, not characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Line number, starting at 1.
    pub line: usize,
    /// Byte column within the line, starting at 1.
    pub column: usize,
}

impl Default for Location {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A terminal error surfaced to the downstream subscriber.
///
/// Every error is fatal for the processor that produced it: exactly one
/// terminal signal is delivered, and values emitted before the error are not
/// retracted.
#[derive(Debug, Error)]
pub enum Error {
    /// Tokens arrived in an order that cannot form a tree, e.g. a closing
    /// bracket with nothing open.
    #[error("malformed JSON structure: {source} at {location}")]
    MalformedStructure {
        /// What the assembler rejected.
        source: StructureError,
        /// Where the tokenizer was when the offending token ended.
        location: Location,
    },
    /// The upstream completed while a value was still open.
    #[error("unexpected end-of-input at {location}: JSON value left unclosed")]
    TruncatedInput {
        /// Position of the end of input.
        location: Location,
    },
    /// The tokenizer rejected the bytes.
    #[error(transparent)]
    Syntax(#[from] TokenizerError),
    /// The upstream chunk source failed.
    #[error("upstream failed: {0}")]
    Upstream(#[source] BoxError),
    /// A caller broke the demand/request protocol.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::MalformedStructure`].
    MalformedStructure,
    /// See [`Error::TruncatedInput`].
    TruncatedInput,
    /// See [`Error::Syntax`].
    Syntax,
    /// See [`Error::Upstream`].
    Upstream,
    /// See [`Error::Protocol`].
    Protocol,
}

impl Error {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedStructure { .. } => ErrorKind::MalformedStructure,
            Error::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            Error::Syntax(_) => ErrorKind::Syntax,
            Error::Upstream(_) => ErrorKind::Upstream,
            Error::Protocol(_) => ErrorKind::Protocol,
        }
    }

    /// Returns `true` if the input stream ended in the middle of a value.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::TruncatedInput { .. })
    }
}

/// Misuse of the publisher protocol by the upstream or downstream side.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// Demand must be strictly positive.
    #[error("demand must be greater than zero")]
    ZeroDemand,
    /// Upstream delivered a chunk that was never requested.
    #[error("upstream delivered a chunk without an outstanding request")]
    UnrequestedChunk,
    /// A chunk was fed while the tokenizer still held unread bytes.
    #[error(transparent)]
    Feed(#[from] FeedError),
}
