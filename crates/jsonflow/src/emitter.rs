//! Demand tracking between a producer and a [`Subscriber`].
//!
//! [`Emitter`] knows nothing about JSON. It counts how many items the
//! subscriber asked for, delivers items while that count is positive and
//! holds at most one item back when it is not.

use crate::error::Error;

/// Receives the items of a stream followed by exactly one terminal signal.
pub trait Subscriber<T> {
    /// Called once per item, never more often than demand allows.
    fn on_next(&mut self, item: T);

    /// Terminal: the stream failed.
    fn on_error(&mut self, error: Error);

    /// Terminal: the stream finished normally.
    fn on_complete(&mut self);
}

impl<T, S: Subscriber<T> + ?Sized> Subscriber<T> for &mut S {
    fn on_next(&mut self, item: T) {
        (**self).on_next(item);
    }

    fn on_error(&mut self, error: Error) {
        (**self).on_error(error);
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }
}

/// Unbounded demand. Never decremented.
const UNBOUNDED: u64 = u64::MAX;

/// Delivers items to a subscriber as demand allows.
///
/// ```
/// use jsonflow::{Emitter, Error, Subscriber};
///
/// #[derive(Default)]
/// struct Log(Vec<u32>);
///
/// impl Subscriber<u32> for Log {
///     fn on_next(&mut self, item: u32) { self.0.push(item) }
///     fn on_error(&mut self, _: Error) {}
///     fn on_complete(&mut self) {}
/// }
///
/// let mut emitter = Emitter::new(Log::default());
/// emitter.emit(1);
/// assert!(emitter.is_blocked());
///
/// emitter.add_demand(2);
/// emitter.emit(2);
/// assert_eq!(emitter.subscriber().0, [1, 2]);
/// assert_eq!(emitter.demand(), 0);
/// ```
#[derive(Debug)]
pub struct Emitter<T, S> {
    subscriber: S,
    demand: u64,
    pending: Option<T>,
    terminated: bool,
}

impl<T, S: Subscriber<T>> Emitter<T, S> {
    /// Creates an emitter with zero demand.
    pub fn new(subscriber: S) -> Self {
        Self {
            subscriber,
            demand: 0,
            pending: None,
            terminated: false,
        }
    }

    /// Adds `n` to the outstanding demand (saturating at unbounded) and
    /// delivers the pending item if there is one.
    pub fn add_demand(&mut self, n: u64) {
        if self.terminated {
            return;
        }
        self.demand = self.demand.saturating_add(n);
        self.flush();
    }

    /// Delivers `item` now if there is demand, otherwise holds it as the
    /// pending item.
    ///
    /// Only one item can be held. Emitting while [`is_blocked`](Self::is_blocked)
    /// is a logic error and replaces the held item.
    pub fn emit(&mut self, item: T) {
        if self.terminated {
            return;
        }
        debug_assert!(self.pending.is_none(), "emit while an item is pending");
        if self.pending.is_none() && self.demand > 0 {
            self.deliver(item);
        } else {
            self.pending = Some(item);
        }
    }

    fn flush(&mut self) {
        if self.demand > 0 {
            if let Some(item) = self.pending.take() {
                self.deliver(item);
            }
        }
    }

    fn deliver(&mut self, item: T) {
        if self.demand != UNBOUNDED {
            self.demand -= 1;
        }
        self.subscriber.on_next(item);
    }

    /// `true` while an item is waiting for demand.
    pub fn is_blocked(&self) -> bool {
        self.pending.is_some()
    }

    /// Outstanding demand; `u64::MAX` means unbounded.
    pub fn demand(&self) -> u64 {
        self.demand
    }

    /// Signals normal completion. The pending item, if any, must have been
    /// flushed first; otherwise it is dropped.
    pub fn complete(&mut self) {
        if self.terminated {
            return;
        }
        debug_assert!(self.pending.is_none(), "complete while an item is pending");
        self.terminated = true;
        self.pending = None;
        self.subscriber.on_complete();
    }

    /// Signals failure, dropping the pending item.
    pub fn fail(&mut self, error: Error) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        self.pending = None;
        self.subscriber.on_error(error);
    }

    /// Drops the pending item and stops all delivery without a terminal
    /// signal.
    pub fn discard(&mut self) {
        self.terminated = true;
        self.pending = None;
        self.demand = 0;
    }

    /// The downstream subscriber.
    pub fn subscriber(&self) -> &S {
        &self.subscriber
    }

    /// The downstream subscriber, mutably.
    pub fn subscriber_mut(&mut self) -> &mut S {
        &mut self.subscriber
    }

    /// Gives the subscriber back.
    pub fn into_subscriber(self) -> S {
        self.subscriber
    }
}
