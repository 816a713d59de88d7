//! Owns the tokenizer instance and decides when it is replaced.
//!
//! A new tokenizer is created for each incoming chunk unless the current one
//! stopped in the middle of a value. Replacement only happens at a clean
//! top-level boundary, so no partial token or open container is ever lost.

use crate::{
    error::Location,
    tokenizer::{FeedError, Token, Tokenizer, TokenizerError},
};

/// Feeds chunks into a [`Tokenizer`] and applies its lifecycle rule.
#[derive(Debug)]
pub struct TokenizerAdapter<T> {
    tokenizer: T,
}

impl<T: Tokenizer> TokenizerAdapter<T> {
    /// Wraps `tokenizer`. Its configuration is reused for every fresh
    /// instance.
    pub fn new(tokenizer: T) -> Self {
        Self { tokenizer }
    }

    /// Hands `chunk` to the tokenizer, starting a fresh instance first when
    /// the current one is at a clean boundary.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] if bytes of an earlier chunk are still unread.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), FeedError> {
        if !self.tokenizer.needs_more_input() {
            return self.tokenizer.feed(chunk);
        }
        if !self.tokenizer.is_mid_value() {
            self.tokenizer = self.tokenizer.fresh();
        }
        self.tokenizer.feed(chunk)
    }

    /// Advances the tokenizer by one token.
    ///
    /// # Errors
    ///
    /// Propagates lexical errors from the tokenizer.
    pub fn next_token(&mut self) -> Result<Option<Token>, TokenizerError> {
        self.tokenizer.next_token()
    }

    /// `true` once every fed byte has been consumed.
    pub fn needs_more_input(&self) -> bool {
        self.tokenizer.needs_more_input()
    }

    /// `true` while a top-level value is partially read.
    pub fn is_mid_value(&self) -> bool {
        self.tokenizer.is_mid_value()
    }

    /// Position of the next unread byte.
    pub fn location(&self) -> Location {
        self.tokenizer.location()
    }

    /// Drops all buffered bytes and partial state.
    pub fn reset(&mut self) {
        self.tokenizer = self.tokenizer.fresh();
    }
}
