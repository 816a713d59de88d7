//! [`futures`](futures_util) adapter.

use core::{
    pin::Pin,
    task::{Context, Poll},
};

use futures_util::stream::{FusedStream, Stream};

use crate::{
    collect::{Collector, PullSignal, Signal},
    error::{BoxError, Error},
    node::Node,
    options::ProcessorOptions,
    processor::JsonProcessor,
};

/// A [`Stream`] of JSON values parsed from a stream of byte chunks.
///
/// Every `poll_next` asks for exactly one value. The inner stream is polled
/// only when the processor wants another chunk, so at most one chunk is read
/// ahead and at most one finished value is buffered. Once the streamed root
/// array closes (with [`ProcessorOptions::stream_array`]) the inner stream is
/// not polled again.
///
/// ```
/// use futures::{executor::block_on, stream, StreamExt};
/// use jsonflow::{Node, NodeStream, ProcessorOptions};
///
/// let chunks = stream::iter([Ok::<_, std::io::Error>("[1, 2"), Ok("3]")]);
/// let options = ProcessorOptions { stream_array: true, ..Default::default() };
/// let nodes: Vec<_> = block_on(NodeStream::new(chunks, options).collect());
///
/// assert_eq!(nodes.len(), 2);
/// assert_eq!(nodes[1].as_ref().unwrap(), &Node::Int(23));
/// ```
#[derive(Debug)]
pub struct NodeStream<St> {
    inner: St,
    processor: JsonProcessor<Collector, PullSignal>,
}

impl<St> NodeStream<St> {
    /// Wraps a stream of byte chunks.
    pub fn new(inner: St, options: ProcessorOptions) -> Self {
        Self {
            inner,
            processor: JsonProcessor::new(Collector::default(), PullSignal::default(), options),
        }
    }
}

impl<St, B, E> Stream for NodeStream<St>
where
    St: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<BoxError>,
{
    type Item = Result<Node, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if let Some(signal) = this.processor.subscriber_mut().pop() {
                return Poll::Ready(match signal {
                    Signal::Next(node) => Some(Ok(node)),
                    Signal::Error(error) => Some(Err(error)),
                    Signal::Complete => None,
                });
            }
            if this.processor.state().is_terminal() {
                return Poll::Ready(None);
            }
            if this.processor.demand() == 0 {
                this.processor.request(1);
                continue;
            }
            if this.processor.upstream().wanted() == 0 {
                // Demand is outstanding but no chunk was asked for: nothing
                // can make progress, so treat it as the end of input.
                this.processor.on_complete();
                continue;
            }

            let item = match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(item) => item,
                Poll::Pending => return Poll::Pending,
            };
            this.processor.upstream_mut().take_request();
            match item {
                Some(Ok(chunk)) => this.processor.on_next(chunk.as_ref()),
                Some(Err(error)) => this.processor.on_error(error),
                None => this.processor.on_complete(),
            }
        }
    }
}

impl<St, B, E> FusedStream for NodeStream<St>
where
    St: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<BoxError>,
{
    fn is_terminated(&self) -> bool {
        self.processor.state().is_terminal() && self.processor.subscriber().is_empty()
    }
}
