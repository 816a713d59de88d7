//! Incremental JSON tokenizer.
//!
//! A [`Tokenizer`] is fed raw byte chunks and hands back structural
//! [`Token`]s one at a time. When the bytes fed so far do not contain another
//! complete token it returns `Ok(None)` and keeps every partial token (a
//! half-read string, number, literal or escape) in its own state, so the next
//! chunk resumes exactly where the previous one stopped.
//!
//! [`JsonTokenizer`] is the RFC 8259 implementation used by default. It
//! tracks the grammar of open containers (commas, colons, keys, matching
//! brackets) but lets closing brackets and scalars through at depth 0. The
//! [`Assembler`](crate::Assembler) decides whether those form a valid tree.
//!
//! # Examples
//!
//! ```rust
//! use jsonflow::{JsonTokenizer, Token, Tokenizer};
//!
//! let mut tokenizer = JsonTokenizer::default();
//! tokenizer.feed(b"{\"ke").unwrap();
//! assert_eq!(tokenizer.next_token().unwrap(), Some(Token::StartObject));
//! assert_eq!(tokenizer.next_token().unwrap(), None);
//!
//! tokenizer.feed(b"y\":12}").unwrap();
//! assert_eq!(tokenizer.next_token().unwrap(), Some(Token::FieldName("key".into())));
//! assert_eq!(tokenizer.next_token().unwrap(), Some(Token::Int(12)));
//! assert_eq!(tokenizer.next_token().unwrap(), Some(Token::EndObject));
//! ```

mod error;
mod escape_buffer;
mod literal_buffer;


use core::fmt;

use bstr::{BString, ByteSlice};
pub use error::{FeedError, SyntaxError, TokenizerError};
use escape_buffer::UnicodeEscapeBuffer;
use literal_buffer::{LiteralMatcher, Step};

use crate::{error::Location, options::TokenizerOptions};

/// An incremental source of structural JSON tokens.
///
/// Implementations own their input buffer. The contract is pull based:
/// callers [`feed`](Tokenizer::feed) a chunk only once
/// [`needs_more_input`](Tokenizer::needs_more_input) reports that every byte
/// fed so far has been consumed, then call
/// [`next_token`](Tokenizer::next_token) until it returns `Ok(None)`.
pub trait Tokenizer {
    /// Appends a chunk of input.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] if bytes from a previous chunk are still unread.
    fn feed(&mut self, chunk: &[u8]) -> Result<(), FeedError>;

    /// Advances by one structural token.
    ///
    /// `Ok(None)` means no further token can be produced from the bytes fed
    /// so far; it is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenizerError`] if the input is not lexically valid JSON.
    fn next_token(&mut self) -> Result<Option<Token>, TokenizerError>;

    /// Returns `true` when every byte fed so far has been consumed.
    fn needs_more_input(&self) -> bool;

    /// Returns `true` while a top-level value has been started but not
    /// finished, i.e. a token is partially read or a container is open.
    fn is_mid_value(&self) -> bool;

    /// Position of the next unread byte.
    fn location(&self) -> Location;

    /// A new tokenizer with the same configuration and no state.
    #[must_use]
    fn fresh(&self) -> Self
    where
        Self: Sized;
}

/// A structural JSON token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// An object key, already unescaped.
    FieldName(String),
    /// A string value, already unescaped.
    String(String),
    /// A number with neither fraction nor exponent.
    Int(i64),
    /// Any other number.
    Float(f64),
    /// `true` or `false`
    Bool(bool),
    /// `null`
    Null,
}

/// The payload-free kind of a [`Token`], used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum TokenKind {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    FieldName,
    String,
    Int,
    Float,
    Bool,
    Null,
}

impl Token {
    /// Returns the kind of this token.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::StartObject => TokenKind::StartObject,
            Token::EndObject => TokenKind::EndObject,
            Token::StartArray => TokenKind::StartArray,
            Token::EndArray => TokenKind::EndArray,
            Token::FieldName(_) => TokenKind::FieldName,
            Token::String(_) => TokenKind::String,
            Token::Int(_) => TokenKind::Int,
            Token::Float(_) => TokenKind::Float,
            Token::Bool(_) => TokenKind::Bool,
            Token::Null => TokenKind::Null,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::StartObject => "start of object",
            TokenKind::EndObject => "end of object",
            TokenKind::StartArray => "start of array",
            TokenKind::EndArray => "end of array",
            TokenKind::FieldName => "field name",
            TokenKind::String => "string literal",
            TokenKind::Int => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::Bool => "boolean literal",
            TokenKind::Null => "null literal",
        })
    }
}

// ------------------------------------------------------------------------------------------------
// JsonTokenizer - internal states
// ------------------------------------------------------------------------------------------------

/// Stack entry – one per open container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Array,
    Object,
}

/// Where we are in the grammar between tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    RootValue,
    ArrayValueOrEnd,
    ArrayValue,
    AfterArrayValue,
    KeyOrEnd,
    Key,
    Colon,
    ObjectValue,
    AfterObjectValue,
}

/// Where we are inside a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Between,
    Literal,
    Sign,
    Zero,
    Integer,
    Point,
    Fraction,
    Exponent,
    ExponentSign,
    ExponentDigits,
    String,
    StringEscape,
    StringEscapeUnicode,
}

/// Bytes that end the unescaped run of a string body.
#[allow(clippy::cast_possible_truncation)]
const STRING_STOP: [u8; 34] = {
    let mut set = [0u8; 34];
    set[0] = b'"';
    set[1] = b'\\';
    let mut i = 0;
    while i < 0x20 {
        set[i + 2] = i as u8;
        i += 1;
    }
    set
};

/// The default incremental RFC 8259 tokenizer.
///
/// Bytes are consumed exactly once: partial strings and numbers accumulate
/// in an internal scratch buffer, so a token split across any number of
/// chunks (including inside a UTF-8 sequence or a `\u` escape) is produced
/// as if it had arrived whole.
#[derive(Debug)]
pub struct JsonTokenizer {
    options: TokenizerOptions,

    input: Vec<u8>,
    pos: usize,
    line: usize,
    column: usize,

    lex_state: LexState,
    expect: Expect,
    frames: Vec<Frame>,

    scratch: Vec<u8>,
    number_is_float: bool,
    unicode_escape: UnicodeEscapeBuffer,
    high_surrogate: Option<u16>,
    literal: LiteralMatcher,
}

impl Default for JsonTokenizer {
    fn default() -> Self {
        Self::new(TokenizerOptions::default())
    }
}

impl Tokenizer for JsonTokenizer {
    fn feed(&mut self, chunk: &[u8]) -> Result<(), FeedError> {
        if !self.needs_more_input() {
            return Err(FeedError {
                unread: self.input.len() - self.pos,
            });
        }
        self.input.clear();
        self.pos = 0;
        self.input.extend_from_slice(chunk);
        Ok(())
    }

    fn next_token(&mut self) -> Result<Option<Token>, TokenizerError> {
        while let Some(byte) = self.peek() {
            if let Some(token) = self.step(byte)? {
                return Ok(Some(token));
            }
        }
        Ok(None)
    }

    fn needs_more_input(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn is_mid_value(&self) -> bool {
        !self.frames.is_empty() || self.lex_state != LexState::Between
    }

    fn location(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
        }
    }

    fn fresh(&self) -> Self {
        Self::new(self.options)
    }
}

impl JsonTokenizer {
    /// Creates a tokenizer with the given options.
    #[must_use]
    pub fn new(options: TokenizerOptions) -> Self {
        Self {
            options,
            input: Vec::new(),
            pos: 0,
            line: 1,
            column: 1,
            lex_state: LexState::Between,
            expect: Expect::RootValue,
            frames: Vec::with_capacity(16),
            scratch: Vec::new(),
            number_is_float: false,
            unicode_escape: UnicodeEscapeBuffer::new(),
            high_surrogate: None,
            literal: LiteralMatcher::default(),
        }
    }

    /// Number of containers currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    fn advance(&mut self, byte: u8) {
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Consume `n` bytes known not to contain a newline.
    #[inline]
    fn skip(&mut self, n: usize) {
        self.pos += n;
        self.column += n;
    }

    fn step(&mut self, byte: u8) -> Result<Option<Token>, TokenizerError> {
        use LexState::*;
        match self.lex_state {
            Between => self.between(byte),

            Literal => match self.literal.step(byte) {
                Step::NeedMore => {
                    self.advance(byte);
                    Ok(None)
                }
                Step::Done(token) => {
                    self.advance(byte);
                    self.lex_state = Between;
                    self.value_done();
                    Ok(Some(token))
                }
                Step::Reject => Err(self.unexpected()),
            },

            // -------------------------- NUMBERS -----------------------------
            Sign => match byte {
                b'0' => self.number_byte(byte, Zero),
                b'1'..=b'9' => self.number_byte(byte, Integer),
                _ => Err(self.unexpected()),
            },
            Zero => match byte {
                b'.' => self.number_byte(byte, Point),
                b'e' | b'E' => self.number_byte(byte, Exponent),
                _ => self.finish_number(),
            },
            Integer => match byte {
                b'0'..=b'9' => self.number_byte(byte, Integer),
                b'.' => self.number_byte(byte, Point),
                b'e' | b'E' => self.number_byte(byte, Exponent),
                _ => self.finish_number(),
            },
            Point => match byte {
                b'0'..=b'9' => self.number_byte(byte, Fraction),
                _ => Err(self.unexpected()),
            },
            Fraction => match byte {
                b'0'..=b'9' => self.number_byte(byte, Fraction),
                b'e' | b'E' => self.number_byte(byte, Exponent),
                _ => self.finish_number(),
            },
            Exponent => match byte {
                b'+' | b'-' => self.number_byte(byte, ExponentSign),
                b'0'..=b'9' => self.number_byte(byte, ExponentDigits),
                _ => Err(self.unexpected()),
            },
            ExponentSign => match byte {
                b'0'..=b'9' => self.number_byte(byte, ExponentDigits),
                _ => Err(self.unexpected()),
            },
            ExponentDigits => match byte {
                b'0'..=b'9' => self.number_byte(byte, ExponentDigits),
                _ => self.finish_number(),
            },

            // -------------------------- STRINGS -----------------------------
            String => self.string_byte(byte),
            StringEscape => self.escape_byte(byte),
            StringEscapeUnicode => match self.unicode_escape.feed(byte) {
                Ok(None) => {
                    self.advance(byte);
                    Ok(None)
                }
                Ok(Some(unit)) => {
                    self.advance(byte);
                    self.lex_state = String;
                    self.push_code_unit(unit)?;
                    Ok(None)
                }
                Err(_) => Err(self.error(SyntaxError::InvalidUnicodeEscapeChar(self.char_at_pos()))),
            },
        }
    }

    fn between(&mut self, byte: u8) -> Result<Option<Token>, TokenizerError> {
        if matches!(byte, b' ' | b'\t' | b'\n' | b'\r') {
            self.advance(byte);
            return Ok(None);
        }

        match self.expect {
            // Closing brackets at depth 0 are handed on for the assembler to reject.
            Expect::RootValue => match byte {
                b'}' => {
                    self.advance(byte);
                    Ok(Some(Token::EndObject))
                }
                b']' => {
                    self.advance(byte);
                    Ok(Some(Token::EndArray))
                }
                _ => self.begin_value(byte),
            },
            Expect::ArrayValueOrEnd if byte == b']' => Ok(Some(self.close(byte))),
            Expect::ArrayValueOrEnd | Expect::ArrayValue | Expect::ObjectValue => {
                self.begin_value(byte)
            }
            Expect::KeyOrEnd if byte == b'}' => Ok(Some(self.close(byte))),
            Expect::KeyOrEnd | Expect::Key => {
                if byte == b'"' {
                    self.begin_string(byte);
                    Ok(None)
                } else {
                    Err(self.unexpected())
                }
            }
            Expect::Colon => {
                if byte == b':' {
                    self.advance(byte);
                    self.expect = Expect::ObjectValue;
                    Ok(None)
                } else {
                    Err(self.unexpected())
                }
            }
            Expect::AfterArrayValue => match byte {
                b',' => {
                    self.advance(byte);
                    self.expect = Expect::ArrayValue;
                    Ok(None)
                }
                b']' => Ok(Some(self.close(byte))),
                _ => Err(self.unexpected()),
            },
            Expect::AfterObjectValue => match byte {
                b',' => {
                    self.advance(byte);
                    self.expect = Expect::Key;
                    Ok(None)
                }
                b'}' => Ok(Some(self.close(byte))),
                _ => Err(self.unexpected()),
            },
        }
    }

    fn begin_value(&mut self, byte: u8) -> Result<Option<Token>, TokenizerError> {
        match byte {
            b'{' => {
                self.open(Frame::Object)?;
                self.advance(byte);
                self.expect = Expect::KeyOrEnd;
                Ok(Some(Token::StartObject))
            }
            b'[' => {
                self.open(Frame::Array)?;
                self.advance(byte);
                self.expect = Expect::ArrayValueOrEnd;
                Ok(Some(Token::StartArray))
            }
            b'"' => {
                self.begin_string(byte);
                Ok(None)
            }
            b't' | b'f' | b'n' => {
                self.advance(byte);
                self.literal = LiteralMatcher::new(byte);
                self.lex_state = LexState::Literal;
                Ok(None)
            }
            b'-' | b'0'..=b'9' => {
                self.scratch.clear();
                self.number_is_float = false;
                let next = match byte {
                    b'-' => LexState::Sign,
                    b'0' => LexState::Zero,
                    _ => LexState::Integer,
                };
                self.number_byte(byte, next)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn open(&mut self, frame: Frame) -> Result<(), TokenizerError> {
        if self.frames.len() >= self.options.max_depth {
            return Err(self.error(SyntaxError::DepthLimitExceeded(self.options.max_depth)));
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Consumes a closing bracket that the grammar state has already matched
    /// against the innermost frame.
    fn close(&mut self, byte: u8) -> Token {
        self.advance(byte);
        let frame = self.frames.pop();
        self.value_done();
        match frame {
            Some(Frame::Object) => Token::EndObject,
            _ => Token::EndArray,
        }
    }

    /// Restore the grammar state after a complete value.
    #[inline]
    fn value_done(&mut self) {
        self.expect = match self.frames.last() {
            None => Expect::RootValue,
            Some(Frame::Array) => Expect::AfterArrayValue,
            Some(Frame::Object) => Expect::AfterObjectValue,
        };
    }

    // ------------------------------------------------------------------------------------------------
    // Numbers
    // ------------------------------------------------------------------------------------------------

    #[inline]
    fn number_byte(&mut self, byte: u8, next: LexState) -> Result<Option<Token>, TokenizerError> {
        self.advance(byte);
        self.scratch.push(byte);
        if matches!(next, LexState::Point | LexState::Exponent) {
            self.number_is_float = true;
        }
        self.lex_state = next;

        if matches!(
            next,
            LexState::Integer | LexState::Fraction | LexState::ExponentDigits
        ) {
            let rest = &self.input[self.pos..];
            let n = rest.iter().take_while(|b| b.is_ascii_digit()).count();
            self.scratch.extend_from_slice(&rest[..n]);
            self.skip(n);
        }
        Ok(None)
    }

    /// Called on the first byte after a number; that byte is left unread.
    fn finish_number(&mut self) -> Result<Option<Token>, TokenizerError> {
        self.lex_state = LexState::Between;
        let text = self.scratch.to_str_lossy();
        let token = if self.number_is_float {
            match text.parse::<f64>() {
                Ok(f) => Token::Float(f),
                Err(_) => return Err(self.error(SyntaxError::InvalidCharacter(self.scratch.as_bstr().into()))),
            }
        } else {
            match text.parse::<i64>() {
                Ok(i) => Token::Int(i),
                Err(_) => {
                    return Err(self.error(SyntaxError::IntegerOutOfRange(text.into_owned())));
                }
            }
        };
        self.scratch.clear();
        self.value_done();
        Ok(Some(token))
    }

    // ------------------------------------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------------------------------------

    fn begin_string(&mut self, byte: u8) {
        self.advance(byte);
        self.scratch.clear();
        self.high_surrogate = None;
        self.lex_state = LexState::String;
    }

    fn string_byte(&mut self, byte: u8) -> Result<Option<Token>, TokenizerError> {
        if byte != b'\\' {
            if let Some(high) = self.high_surrogate {
                return Err(self.error(SyntaxError::UnpairedSurrogate(high)));
            }
        }

        match byte {
            b'"' => {
                self.advance(byte);
                self.lex_state = LexState::Between;
                let bytes = core::mem::take(&mut self.scratch);
                let Ok(text) = String::from_utf8(bytes) else {
                    return Err(self.error(SyntaxError::InvalidUtf8));
                };
                if matches!(self.expect, Expect::Key | Expect::KeyOrEnd) {
                    self.expect = Expect::Colon;
                    Ok(Some(Token::FieldName(text)))
                } else {
                    self.value_done();
                    Ok(Some(Token::String(text)))
                }
            }
            b'\\' => {
                self.advance(byte);
                self.lex_state = LexState::StringEscape;
                Ok(None)
            }
            0x00..=0x1F => Err(self.error(SyntaxError::ControlCharacter(byte))),
            _ => {
                // Copy the whole unescaped run at once; UTF-8 is validated when
                // the string closes, so sequences split across chunks are fine.
                let rest = &self.input[self.pos..];
                let n = rest.find_byteset(STRING_STOP).unwrap_or(rest.len());
                self.scratch.extend_from_slice(&rest[..n]);
                self.skip(n);
                Ok(None)
            }
        }
    }

    fn escape_byte(&mut self, byte: u8) -> Result<Option<Token>, TokenizerError> {
        if byte != b'u' {
            if let Some(high) = self.high_surrogate {
                return Err(self.error(SyntaxError::UnpairedSurrogate(high)));
            }
        }

        let decoded = match byte {
            b'"' | b'\\' | b'/' => byte,
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                self.advance(byte);
                self.unicode_escape.reset();
                self.lex_state = LexState::StringEscapeUnicode;
                return Ok(None);
            }
            _ => return Err(self.error(SyntaxError::InvalidEscape(char::from(byte)))),
        };
        self.advance(byte);
        self.scratch.push(decoded);
        self.lex_state = LexState::String;
        Ok(None)
    }

    /// Appends one UTF-16 code unit from a `\u` escape, pairing surrogates.
    fn push_code_unit(&mut self, unit: u16) -> Result<(), TokenizerError> {
        let decoded = match (self.high_surrogate.take(), unit) {
            (None, 0xD800..=0xDBFF) => {
                self.high_surrogate = Some(unit);
                return Ok(());
            }
            (Some(high), 0xDC00..=0xDFFF) => char::decode_utf16([high, unit]).next(),
            (Some(high), _) => return Err(self.error(SyntaxError::UnpairedSurrogate(high))),
            (None, _) => char::decode_utf16([unit]).next(),
        };

        match decoded {
            Some(Ok(c)) => {
                let mut buf = [0u8; 4];
                self.scratch
                    .extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                Ok(())
            }
            _ => Err(self.error(SyntaxError::UnpairedSurrogate(unit))),
        }
    }

    // ------------------------------------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------------------------------------

    fn error(&self, source: SyntaxError) -> TokenizerError {
        TokenizerError::new(source, self.location())
    }

    fn unexpected(&self) -> TokenizerError {
        self.error(SyntaxError::InvalidCharacter(self.char_at_pos()))
    }

    /// The (possibly invalid) UTF-8 sequence starting at the read position.
    fn char_at_pos(&self) -> BString {
        let rest = &self.input[self.pos.min(self.input.len())..];
        let (_, size) = bstr::decode_utf8(rest);
        BString::from(&rest[..size.max(1).min(rest.len())])
    }
}
