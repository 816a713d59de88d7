//! The backpressure publisher.
//!
//! [`JsonProcessor`] sits between an [`Upstream`] that produces byte chunks
//! and a [`Subscriber`] that consumes [`Node`]s. It is driven entirely by
//! method calls: the downstream side calls [`request`](JsonProcessor::request)
//! and [`cancel`](JsonProcessor::cancel), the upstream side calls
//! [`on_next`](JsonProcessor::on_next), [`on_complete`](JsonProcessor::on_complete)
//! and [`on_error`](JsonProcessor::on_error). Each call does all the work it
//! can and returns; nothing blocks and nothing runs in the background.
//!
//! Chunks are requested one at a time, and only while the tokenizer has
//! consumed everything it was given, no finished value is waiting, and either
//! downstream wants more or a value is half built. At most one finished value
//! is ever held back.
//!
//! ```
//! use jsonflow::{Collector, JsonProcessor, ProcessorOptions, PullSignal, Signal};
//!
//! let mut p = JsonProcessor::new(Collector::default(), PullSignal::default(), ProcessorOptions::default());
//! p.request(1);
//! assert!(p.upstream_mut().take_request());
//! p.on_next(b"{\"a\":[1,");
//! assert!(p.upstream_mut().take_request());
//! p.on_next(b"2]}");
//!
//! assert!(matches!(p.subscriber_mut().pop(), Some(Signal::Next(_))));
//! ```

use bstr::ByteSlice;
use tracing::{debug, trace};

use crate::{
    adapter::TokenizerAdapter,
    assembler::{Assembled, Assembler},
    emitter::{Emitter, Subscriber},
    error::{BoxError, Error, ProtocolViolation},
    node::Node,
    options::ProcessorOptions,
    tokenizer::{JsonTokenizer, Tokenizer},
};

/// Bytes of each chunk shown in trace logs.
const PREVIEW_LEN: usize = 32;

/// The producing side of a byte-chunk stream.
pub trait Upstream {
    /// Asks for `n` more chunks. The processor always asks for one.
    fn request(&mut self, n: u64);

    /// Asks the producer to stop. No further chunks are wanted.
    fn cancel(&mut self);
}

impl<U: Upstream + ?Sized> Upstream for &mut U {
    fn request(&mut self, n: u64) {
        (**self).request(n);
    }

    fn cancel(&mut self) {
        (**self).cancel();
    }
}

/// Observable lifecycle of a [`JsonProcessor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorState {
    /// No demand and nothing in progress.
    Idle,
    /// A chunk has been requested and not yet delivered.
    AwaitingUpstream,
    /// Tokens are being turned into values.
    Draining,
    /// A finished value is held until downstream asks for it.
    Buffering,
    /// Downstream received `on_complete`.
    Completed,
    /// Downstream received `on_error`.
    Failed,
    /// Downstream cancelled.
    Cancelled,
}

impl ProcessorState {
    /// `true` for `Completed`, `Failed` and `Cancelled`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProcessorState::Completed | ProcessorState::Failed | ProcessorState::Cancelled
        )
    }
}

/// Turns a chunked byte stream into JSON values under demand.
#[derive(Debug)]
pub struct JsonProcessor<S, U, T = JsonTokenizer> {
    emitter: Emitter<Node, S>,
    upstream: U,
    adapter: TokenizerAdapter<T>,
    assembler: Assembler,
    state: ProcessorState,
    /// A chunk request is outstanding.
    requested: bool,
    /// Upstream has terminated or been cancelled.
    upstream_done: bool,
    /// The streamed root array has closed.
    stream_ended: bool,
}

impl<S: Subscriber<Node>, U: Upstream> JsonProcessor<S, U> {
    /// Creates a processor using the default [`JsonTokenizer`].
    pub fn new(subscriber: S, upstream: U, options: ProcessorOptions) -> Self {
        Self::with_tokenizer(
            subscriber,
            upstream,
            JsonTokenizer::new(options.tokenizer),
            options,
        )
    }
}

impl<S: Subscriber<Node>, U: Upstream, T: Tokenizer> JsonProcessor<S, U, T> {
    /// Creates a processor around a custom tokenizer. `options.tokenizer` is
    /// ignored.
    pub fn with_tokenizer(subscriber: S, upstream: U, tokenizer: T, options: ProcessorOptions) -> Self {
        Self {
            emitter: Emitter::new(subscriber),
            upstream,
            adapter: TokenizerAdapter::new(tokenizer),
            assembler: Assembler::new(options.stream_array, options.duplicate_keys),
            state: ProcessorState::Idle,
            requested: false,
            upstream_done: false,
            stream_ended: false,
        }
    }

    // ------------------------------------------------------------------------------------------------
    // Downstream signals
    // ------------------------------------------------------------------------------------------------

    /// Adds `n` to the downstream demand. `u64::MAX` (or any sum reaching it)
    /// means unbounded.
    ///
    /// A held value is delivered first, then processing resumes. Zero demand
    /// is a protocol violation and fails the processor.
    pub fn request(&mut self, n: u64) {
        if self.state.is_terminal() {
            return;
        }
        if n == 0 {
            self.fail(ProtocolViolation::ZeroDemand.into());
            return;
        }
        trace!(n, "downstream demand");
        self.emitter.add_demand(n);
        self.pump();
    }

    /// Stops processing without a terminal signal. Upstream is cancelled and
    /// buffered bytes, the held value and any partial tree are dropped.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        debug!("downstream cancelled");
        self.state = ProcessorState::Cancelled;
        self.emitter.discard();
        self.adapter.reset();
        self.assembler.reset();
        self.stop_upstream();
    }

    // ------------------------------------------------------------------------------------------------
    // Upstream signals
    // ------------------------------------------------------------------------------------------------

    /// Accepts one requested chunk.
    ///
    /// Chunks arriving after a terminal state are ignored. A chunk that was
    /// not requested fails the processor.
    pub fn on_next(&mut self, chunk: &[u8]) {
        if self.state.is_terminal() {
            return;
        }
        if !self.requested {
            self.fail(ProtocolViolation::UnrequestedChunk.into());
            return;
        }
        self.requested = false;
        trace!(
            len = chunk.len(),
            preview = %chunk[..chunk.len().min(PREVIEW_LEN)].as_bstr(),
            "received upstream bytes"
        );

        if let Err(err) = self.adapter.feed(chunk) {
            self.fail(ProtocolViolation::from(err).into());
            return;
        }
        self.pump();
    }

    /// Upstream has no more chunks.
    ///
    /// Buffered values are still delivered as demand allows. If the input
    /// ends inside a value the processor fails with
    /// [`Error::TruncatedInput`].
    pub fn on_complete(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        debug!("upstream completed");
        self.upstream_done = true;
        self.requested = false;
        self.pump();
    }

    /// Upstream failed. The error is forwarded downstream and any held value
    /// is dropped.
    pub fn on_error<E: Into<BoxError>>(&mut self, error: E) {
        if self.state.is_terminal() {
            return;
        }
        self.upstream_done = true;
        self.requested = false;
        self.fail(Error::Upstream(error.into()));
    }

    // ------------------------------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> ProcessorState {
        self.state
    }

    /// Outstanding downstream demand; `u64::MAX` is unbounded.
    pub fn demand(&self) -> u64 {
        self.emitter.demand()
    }

    /// `true` while a finished value waits for demand.
    pub fn has_pending(&self) -> bool {
        self.emitter.is_blocked()
    }

    /// `true` while a chunk request is outstanding.
    pub fn is_awaiting_upstream(&self) -> bool {
        self.requested
    }

    /// The downstream subscriber.
    pub fn subscriber(&self) -> &S {
        self.emitter.subscriber()
    }

    /// The downstream subscriber, mutably.
    pub fn subscriber_mut(&mut self) -> &mut S {
        self.emitter.subscriber_mut()
    }

    /// The upstream handle.
    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    /// The upstream handle, mutably.
    pub fn upstream_mut(&mut self) -> &mut U {
        &mut self.upstream
    }

    /// Consumes the processor, returning the subscriber.
    pub fn into_subscriber(self) -> S {
        self.emitter.into_subscriber()
    }

    // ------------------------------------------------------------------------------------------------
    // Engine
    // ------------------------------------------------------------------------------------------------

    /// Makes all progress possible with the bytes and demand at hand, then
    /// settles into the next waiting state.
    fn pump(&mut self) {
        if let Err(error) = self.drain() {
            self.fail(error);
            return;
        }

        if self.emitter.is_blocked() {
            self.state = ProcessorState::Buffering;
            return;
        }
        if self.stream_ended {
            debug!("streamed root array closed");
            self.stop_upstream();
            self.complete();
            return;
        }
        if self.upstream_done {
            self.finish();
            return;
        }

        if self.requested {
            self.state = ProcessorState::AwaitingUpstream;
        } else if self.adapter.needs_more_input()
            && (self.emitter.demand() > 0 || self.adapter.is_mid_value())
        {
            trace!(
                mid_value = self.adapter.is_mid_value(),
                "more input required, requesting a chunk"
            );
            self.requested = true;
            self.state = ProcessorState::AwaitingUpstream;
            self.upstream.request(1);
        } else {
            self.state = ProcessorState::Idle;
        }
    }

    /// Feeds tokens through the assembler until the tokenizer runs dry, a
    /// value has to be held back, or the streamed root array closes.
    fn drain(&mut self) -> Result<(), Error> {
        self.state = ProcessorState::Draining;
        while !self.emitter.is_blocked() && !self.stream_ended {
            let Some(token) = self.adapter.next_token()? else {
                break;
            };
            match self.assembler.push(token) {
                Ok(Assembled::Incomplete) => {}
                Ok(Assembled::Value(node)) => {
                    trace!(container = node.is_container(), "materialized new node");
                    self.emitter.emit(node);
                }
                Ok(Assembled::StreamEnd) => self.stream_ended = true,
                Err(source) => {
                    return Err(Error::MalformedStructure {
                        source,
                        location: self.adapter.location(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Upstream is done and every buffered byte has been consumed.
    fn finish(&mut self) {
        if self.adapter.is_mid_value() || self.assembler.depth() > 0 {
            let location = self.adapter.location();
            self.fail(Error::TruncatedInput { location });
        } else {
            self.complete();
        }
    }

    fn complete(&mut self) {
        debug!("completing downstream");
        self.state = ProcessorState::Completed;
        self.emitter.complete();
    }

    fn fail(&mut self, error: Error) {
        debug!(%error, "failing downstream");
        self.state = ProcessorState::Failed;
        self.adapter.reset();
        self.assembler.reset();
        self.stop_upstream();
        self.emitter.fail(error);
    }

    fn stop_upstream(&mut self) {
        self.requested = false;
        if !self.upstream_done {
            self.upstream_done = true;
            self.upstream.cancel();
        }
    }
}
