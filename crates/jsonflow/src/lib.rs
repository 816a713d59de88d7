//! Incremental JSON tree assembly for chunked byte streams.
//!
//! `jsonflow` turns an arbitrarily chunked stream of bytes into a sequence of
//! fully materialized [`Node`] trees. Chunks may split tokens, strings and
//! even UTF-8 code points anywhere; the tokenizer suspends at the chunk
//! boundary and resumes when the next chunk arrives, never re-reading bytes it
//! has already consumed.
//!
//! The pieces, leaves first:
//!
//! - [`Tokenizer`] / [`JsonTokenizer`]: incremental lexer yielding structural
//!   [`Token`]s.
//! - [`TokenizerAdapter`]: owns a tokenizer and decides when a fresh instance
//!   is needed.
//! - [`Assembler`]: rebuilds trees from tokens with an explicit stack.
//! - [`Emitter`]: demand-tracking delivery to a [`Subscriber`].
//! - [`JsonProcessor`]: the backpressure publisher tying it all together.
//! - [`NodeStream`] and [`parse_chunks`]: ready-made drivers.
//!
//! # Examples
//!
//! ```rust
//! use jsonflow::{Node, ProcessorOptions, parse_chunks};
//!
//! let chunks: [&[u8]; 3] = [b"[{\"id\":1},", b"{\"id\"", b":2}]"];
//! let nodes = parse_chunks(chunks, ProcessorOptions {
//!     stream_array: true,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! assert_eq!(nodes.len(), 2);
//! assert_eq!(nodes[1].get("id"), Some(&Node::Int(2)));
//! ```

mod adapter;
mod assembler;
mod chunk_utils;
mod collect;
mod emitter;
mod error;
mod node;
mod options;
mod processor;
mod stream;
mod tokenizer;

#[cfg(test)]
mod tests;

pub use adapter::TokenizerAdapter;
pub use assembler::{Assembled, Assembler, StructureError};
pub use chunk_utils::{produce_chunks, split_at_offsets};
pub use collect::{Collector, PullSignal, Signal, parse_chunks};
pub use emitter::{Emitter, Subscriber};
pub use error::{BoxError, Error, ErrorKind, Location, ProtocolViolation};
pub use node::{Array, Map, Node};
pub use options::{DuplicateKeys, ProcessorOptions, TokenizerOptions};
pub use processor::{JsonProcessor, ProcessorState, Upstream};
pub use stream::NodeStream;
pub use tokenizer::{
    FeedError, JsonTokenizer, SyntaxError, Token, TokenKind, Tokenizer, TokenizerError,
};
