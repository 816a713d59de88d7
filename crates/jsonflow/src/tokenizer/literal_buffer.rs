//! Byte-at-a-time matching of `true`, `false` and `null`, so a literal can
//! be split across any number of chunks.

use super::Token;

/// Outcome of feeding one byte to a [`LiteralMatcher`].
pub(crate) enum Step {
    /// Matched; more bytes follow.
    NeedMore,
    /// Matched the last byte.
    Done(Token),
    /// Not the expected byte. The matcher is unchanged.
    Reject,
}

/// Progress through one literal whose first byte has been consumed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LiteralMatcher {
    text: &'static [u8],
    matched: usize,
}

impl LiteralMatcher {
    /// Starts after `first`. Any byte other than `t`, `f` or `n` gives a
    /// matcher that rejects everything.
    pub fn new(first: u8) -> Self {
        let text: &'static [u8] = match first {
            b't' => b"true",
            b'f' => b"false",
            b'n' => b"null",
            _ => b"",
        };
        Self { text, matched: 1 }
    }

    pub fn step(&mut self, byte: u8) -> Step {
        if self.text.get(self.matched) != Some(&byte) {
            return Step::Reject;
        }
        self.matched += 1;
        if self.matched < self.text.len() {
            return Step::NeedMore;
        }
        Step::Done(match self.text {
            b"true" => Token::Bool(true),
            b"false" => Token::Bool(false),
            _ => Token::Null,
        })
    }
}
