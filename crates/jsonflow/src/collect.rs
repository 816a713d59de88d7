//! Synchronous driving of a [`JsonProcessor`].
//!
//! [`Collector`] and [`PullSignal`] are plain in-memory endpoints: the first
//! queues every signal it receives, the second records what the processor
//! asked of its upstream. Together they let a caller drive a processor from
//! an ordinary loop, which is exactly what [`parse_chunks`] does.

use std::collections::VecDeque;

use crate::{
    emitter::Subscriber,
    error::Error,
    node::Node,
    options::ProcessorOptions,
    processor::{JsonProcessor, Upstream},
};

/// One signal received by a [`Collector`].
#[derive(Debug)]
pub enum Signal {
    /// A finished value.
    Next(Node),
    /// Terminal failure.
    Error(Error),
    /// Terminal success.
    Complete,
}

/// A [`Subscriber`] that queues signals in arrival order.
#[derive(Debug, Default)]
pub struct Collector {
    signals: VecDeque<Signal>,
    terminated: bool,
}

impl Collector {
    /// Removes the oldest queued signal.
    pub fn pop(&mut self) -> Option<Signal> {
        self.signals.pop_front()
    }

    /// `true` if no signal is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// `true` once a terminal signal has been received (even if already
    /// popped).
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Removes and returns every queued signal.
    pub fn drain(&mut self) -> impl Iterator<Item = Signal> + '_ {
        self.signals.drain(..)
    }
}

impl Subscriber<Node> for Collector {
    fn on_next(&mut self, item: Node) {
        self.signals.push_back(Signal::Next(item));
    }

    fn on_error(&mut self, error: Error) {
        self.terminated = true;
        self.signals.push_back(Signal::Error(error));
    }

    fn on_complete(&mut self) {
        self.terminated = true;
        self.signals.push_back(Signal::Complete);
    }
}

/// An [`Upstream`] that only records what was asked of it.
///
/// The driver checks [`take_request`](PullSignal::take_request) to learn
/// whether the processor wants another chunk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PullSignal {
    wanted: u64,
    requests: u64,
    cancelled: bool,
}

impl PullSignal {
    /// Consumes one outstanding chunk request. Returns `false` if nothing is
    /// requested or the upstream was cancelled.
    pub fn take_request(&mut self) -> bool {
        if self.cancelled || self.wanted == 0 {
            return false;
        }
        self.wanted -= 1;
        true
    }

    /// Chunks requested and not yet taken.
    #[must_use]
    pub fn wanted(&self) -> u64 {
        self.wanted
    }

    /// Total number of `request` calls received.
    #[must_use]
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// `true` once the processor cancelled its upstream.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Upstream for PullSignal {
    fn request(&mut self, n: u64) {
        self.requests += 1;
        self.wanted = self.wanted.saturating_add(n);
    }

    fn cancel(&mut self) {
        self.cancelled = true;
    }
}

/// Parses `chunks` with unbounded demand and returns every value.
///
/// ```
/// use jsonflow::{Node, ProcessorOptions, parse_chunks};
///
/// let nodes = parse_chunks(["{\"a\"", ":1}  [tr", "ue]"], ProcessorOptions::default()).unwrap();
/// assert_eq!(nodes[1], Node::Array(vec![Node::Bool(true)]));
/// ```
///
/// # Errors
///
/// Returns the terminal error of the processor, if any. Values emitted
/// before the error are discarded.
pub fn parse_chunks<I>(chunks: I, options: ProcessorOptions) -> Result<Vec<Node>, Error>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut processor = JsonProcessor::new(Collector::default(), PullSignal::default(), options);
    processor.request(u64::MAX);

    let mut chunks = chunks.into_iter();
    while processor.upstream_mut().take_request() {
        match chunks.next() {
            Some(chunk) => processor.on_next(chunk.as_ref()),
            None => processor.on_complete(),
        }
    }
    if !processor.state().is_terminal() {
        processor.on_complete();
    }

    let mut nodes = Vec::new();
    for signal in processor.into_subscriber().drain() {
        match signal {
            Signal::Next(node) => nodes.push(node),
            Signal::Error(error) => return Err(error),
            Signal::Complete => break,
        }
    }
    Ok(nodes)
}
