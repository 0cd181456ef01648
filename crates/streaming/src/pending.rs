use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use futures_util::task::noop_waker_ref;
use tracing::trace;

use crate::request::Request;

/// In-flight loads owned by a tick-driven host.
///
/// Futures are polled with a no-op waker once per `poll_completed` call, so
/// they only make progress when the host ticks. Nothing is ever cancelled:
/// a superseded load still completes and is handed back.
pub struct PendingLoads<T> {
    next_request: u64,
    in_flight: Vec<(Request, BoxFuture<'static, T>)>,
}

impl<T> Default for PendingLoads<T> {
    fn default() -> Self {
        Self {
            next_request: 1,
            in_flight: Vec::new(),
        }
    }
}

impl<T> std::fmt::Debug for PendingLoads<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLoads")
            .field("next_request", &self.next_request)
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl<T> PendingLoads<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn submit(&mut self, load: BoxFuture<'static, T>) -> Request {
        let req = Request(self.next_request);
        self.next_request += 1;
        self.in_flight.push((req, load));
        req
    }

    /// Polls every in-flight load once; completed ones are returned in
    /// submission order.
    pub fn poll_completed(&mut self) -> Vec<(Request, T)> {
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut done = Vec::new();
        let mut i = 0;
        while i < self.in_flight.len() {
            match self.in_flight[i].1.as_mut().poll(&mut cx) {
                Poll::Ready(value) => {
                    let (req, _) = self.in_flight.remove(i);
                    done.push((req, value));
                }
                Poll::Pending => i += 1,
            }
        }
        if !done.is_empty() {
            trace!(completed = done.len(), in_flight = self.in_flight.len(), "loads completed");
        }
        done
    }
}

#[cfg(test)]
mod tests {
    use super::PendingLoads;
    use crate::request::Request;

    #[test]
    fn ready_loads_complete_on_first_poll() {
        let mut p: PendingLoads<u32> = PendingLoads::new();
        let a = p.submit(Box::pin(async { 1 }));
        let b = p.submit(Box::pin(async { 2 }));
        assert_eq!(a, Request(1));
        assert_eq!(p.len(), 2);

        let done = p.poll_completed();
        assert_eq!(done, vec![(a, 1), (b, 2)]);
        assert!(p.is_empty());
    }

    #[test]
    fn pending_loads_wait_for_their_sender() {
        let mut p: PendingLoads<Option<&'static str>> = PendingLoads::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<&'static str>();
        let slow = p.submit(Box::pin(async move { rx.await.ok() }));
        let fast = p.submit(Box::pin(async { Some("fast") }));

        let first = p.poll_completed();
        assert_eq!(first, vec![(fast, Some("fast"))]);
        assert_eq!(p.len(), 1);
        assert!(p.poll_completed().is_empty());

        tx.send("slow").expect("receiver alive");
        assert_eq!(p.poll_completed(), vec![(slow, Some("slow"))]);
    }
}
