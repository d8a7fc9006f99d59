//! Actor plumbing.
//!
//! Each actor owns its state and consumes events from an unbounded channel.
//! The sending span travels with every event so work done on the actor's
//! task stays attributed to whatever caused it.

pub mod orchestrator;

use tracing::Span;

pub struct Sender<E> {
    tx: tokio::sync::mpsc::UnboundedSender<(Span, E)>,
}

impl<E> Clone for Sender<E> {
    fn clone(&self) -> Self { Sender { tx: self.tx.clone() } }
}

impl<E> Sender<E> {
    /// Delivery is best-effort: an actor that has shut down drops the event.
    pub fn send(&self, event: E) { _ = self.tx.send((Span::current(), event)); }
}

pub type Receiver<E> = tokio::sync::mpsc::UnboundedReceiver<(Span, E)>;

pub fn channel<E>() -> (Sender<E>, Receiver<E>) {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    (Sender { tx }, rx)
}
