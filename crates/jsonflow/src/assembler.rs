//! Rebuilds [`Node`] trees from a flat token stream.
//!
//! The [`Assembler`] keeps an explicit stack of open containers, so nesting
//! depth never turns into recursion depth. A container is created when its
//! start token arrives, filled in place while it is open, and moved into its
//! parent (or handed out as a finished value) when it closes.
//!
//! In array-streaming mode a root array is never filled. Each of its elements
//! is handed out as soon as it completes, and the closing bracket of the root
//! reports [`Assembled::StreamEnd`].

use thiserror::Error;

use crate::{
    node::{Array, Map, Node},
    options::DuplicateKeys,
    tokenizer::{Token, TokenKind},
};

/// Outcome of pushing one token into the [`Assembler`].
#[derive(Debug, Clone, PartialEq)]
pub enum Assembled {
    /// The token was absorbed; no value is complete yet.
    Incomplete,
    /// A top-level value (or a streamed root-array element) is complete.
    Value(Node),
    /// The streamed root array closed. No further values follow.
    StreamEnd,
}

/// A token sequence that does not describe a well-formed tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// A closing bracket, field name or scalar with no open container.
    #[error("unexpected {0} at top level")]
    UnexpectedAtTopLevel(TokenKind),
    /// A field name inside an array, or two in a row inside an object.
    #[error("unexpected field name where a value was expected")]
    UnexpectedFieldName,
    /// A value inside an object without a preceding field name.
    #[error("object member has no field name")]
    MissingFieldName,
    /// An object closed right after a field name.
    #[error("field {0:?} has no value")]
    MissingValue(String),
    /// A closing bracket of the wrong kind.
    #[error("expected {expected}, found {found}")]
    MismatchedClose {
        /// The close token of the innermost open container.
        expected: TokenKind,
        /// The close token that arrived.
        found: TokenKind,
    },
    /// A repeated field name under [`DuplicateKeys::Reject`].
    #[error("duplicate field {0:?}")]
    DuplicateKey(String),
}

#[derive(Debug)]
enum Container {
    Object(Map),
    Array(Array),
}

impl Container {
    fn closing_kind(&self) -> TokenKind {
        match self {
            Container::Object(_) => TokenKind::EndObject,
            Container::Array(_) => TokenKind::EndArray,
        }
    }

    fn into_node(self) -> Node {
        match self {
            Container::Object(members) => Node::Object(members),
            Container::Array(items) => Node::Array(items),
        }
    }
}

/// An open container and the field name it will be stored under once it
/// closes (`None` inside arrays and at the root).
#[derive(Debug)]
struct Frame {
    container: Container,
    slot: Option<String>,
}

/// Token-driven tree builder.
///
/// ```
/// use jsonflow::{Assembled, Assembler, DuplicateKeys, Node, Token};
///
/// let mut assembler = Assembler::new(false, DuplicateKeys::LastWins);
/// for token in [Token::StartArray, Token::Int(1)] {
///     assert_eq!(assembler.push(token).unwrap(), Assembled::Incomplete);
/// }
/// assert_eq!(
///     assembler.push(Token::EndArray).unwrap(),
///     Assembled::Value(Node::Array(vec![Node::Int(1)])),
/// );
/// ```
#[derive(Debug)]
pub struct Assembler {
    stack: Vec<Frame>,
    pending_field: Option<String>,
    stream_array: bool,
    streaming_root: bool,
    duplicate_keys: DuplicateKeys,
}

impl Assembler {
    /// Creates an empty assembler.
    #[must_use]
    pub fn new(stream_array: bool, duplicate_keys: DuplicateKeys) -> Self {
        Self {
            stack: Vec::new(),
            pending_field: None,
            stream_array,
            streaming_root: false,
            duplicate_keys,
        }
    }

    /// Number of open containers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Drops any partially built tree.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.pending_field = None;
        self.streaming_root = false;
    }

    /// Applies one token.
    ///
    /// # Errors
    ///
    /// Returns a [`StructureError`] if the token cannot appear at this point
    /// of the tree. The assembler should be [`reset`](Self::reset) before it
    /// is used again.
    pub fn push(&mut self, token: Token) -> Result<Assembled, StructureError> {
        match token {
            Token::StartObject => self.open(Container::Object(Map::new())),
            Token::StartArray => self.open(Container::Array(Array::new())),
            Token::EndObject | Token::EndArray => self.close(token.kind()),
            Token::FieldName(name) => self.field_name(name),
            Token::String(s) => self.scalar(Node::String(s), TokenKind::String),
            Token::Int(i) => self.scalar(Node::Int(i), TokenKind::Int),
            Token::Float(f) => self.scalar(Node::Float(f), TokenKind::Float),
            Token::Bool(b) => self.scalar(Node::Bool(b), TokenKind::Bool),
            Token::Null => self.scalar(Node::Null, TokenKind::Null),
        }
    }

    fn open(&mut self, container: Container) -> Result<Assembled, StructureError> {
        if self.stack.is_empty() {
            self.streaming_root = self.stream_array && matches!(container, Container::Array(_));
        }
        let slot = self.take_slot()?;
        self.stack.push(Frame { container, slot });
        Ok(Assembled::Incomplete)
    }

    fn close(&mut self, found: TokenKind) -> Result<Assembled, StructureError> {
        let Some(frame) = self.stack.pop() else {
            return Err(StructureError::UnexpectedAtTopLevel(found));
        };
        let expected = frame.container.closing_kind();
        if expected != found {
            return Err(StructureError::MismatchedClose { expected, found });
        }
        if let Some(name) = self.pending_field.take() {
            return Err(StructureError::MissingValue(name));
        }

        if self.streaming_root && self.stack.is_empty() {
            self.streaming_root = false;
            return Ok(Assembled::StreamEnd);
        }
        self.attach(frame.container.into_node(), frame.slot)
    }

    fn field_name(&mut self, name: String) -> Result<Assembled, StructureError> {
        match self.stack.last() {
            None => Err(StructureError::UnexpectedAtTopLevel(TokenKind::FieldName)),
            Some(Frame {
                container: Container::Object(members),
                ..
            }) if self.pending_field.is_none() => {
                if self.duplicate_keys == DuplicateKeys::Reject && members.contains_key(&name) {
                    return Err(StructureError::DuplicateKey(name));
                }
                self.pending_field = Some(name);
                Ok(Assembled::Incomplete)
            }
            Some(_) => Err(StructureError::UnexpectedFieldName),
        }
    }

    fn scalar(&mut self, node: Node, kind: TokenKind) -> Result<Assembled, StructureError> {
        if self.stack.is_empty() {
            return Err(StructureError::UnexpectedAtTopLevel(kind));
        }
        let slot = self.take_slot()?;
        self.attach(node, slot)
    }

    /// The field name a value starting now belongs to.
    fn take_slot(&mut self) -> Result<Option<String>, StructureError> {
        match self.stack.last() {
            Some(Frame {
                container: Container::Object(_),
                ..
            }) => self
                .pending_field
                .take()
                .map(Some)
                .ok_or(StructureError::MissingFieldName),
            _ => Ok(None),
        }
    }

    /// Stores a finished value in the innermost open container, or hands it
    /// out when it is a root value or a streamed element.
    fn attach(&mut self, node: Node, slot: Option<String>) -> Result<Assembled, StructureError> {
        let streamed = self.streaming_root && self.stack.len() == 1;
        match self.stack.last_mut() {
            None => Ok(Assembled::Value(node)),
            Some(_) if streamed => Ok(Assembled::Value(node)),
            Some(Frame {
                container: Container::Array(items),
                ..
            }) => {
                items.push(node);
                Ok(Assembled::Incomplete)
            }
            Some(Frame {
                container: Container::Object(members),
                ..
            }) => {
                let key = slot.ok_or(StructureError::MissingFieldName)?;
                // Last write wins and keeps the first position.
                members.insert(key, node);
                Ok(Assembled::Incomplete)
            }
        }
    }
}
