//! Coordinates re-fetching when inputs change.
//!
//! - `Refresher` issues one request at a time. Issuing a new request aborts the one in flight, so
//!   only the result of the latest request is ever delivered (last request wins). Periodic callers
//!   use `issue_if_changed` so a slow request is not cancelled by a repeat of itself.
//! - `Poller` is an owned periodic timer. It stops when `stop` is called or when it is dropped.

use crate::Result;
use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

/// A hash of the inputs a request was issued for, e.g. a `DateRange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestKey(u64);

impl RequestKey {
    pub fn of<I>(input: &I) -> Self
    where
        I: Hash + ?Sized,
    {
        let mut hasher = DefaultHasher::new();
        input.hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// Identifies one issued request. Generations increase with every `Refresher::issue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    generation: u64,
    key: RequestKey,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn key(&self) -> RequestKey {
        self.key
    }
}

/// The result of the latest request, tagged with the ticket it was issued under.
#[derive(Debug)]
pub struct Fresh<T> {
    pub ticket: Ticket,
    pub value: Result<T>,
}

/// Runs requests on tokio such that only the most recently issued one can deliver a result.
#[derive(Debug)]
pub struct Refresher<T> {
    generation: u64,
    current: Option<Ticket>,
    in_flight: Option<JoinHandle<Result<T>>>,
}

impl<T> Default for Refresher<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            current: None,
            in_flight: None,
        }
    }
}

impl<T> Refresher<T>
where
    T: Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `request` for `input`, aborting whatever request is still in flight.
    pub fn issue<I, F>(&mut self, input: &I, request: F) -> Ticket
    where
        I: Hash + ?Sized,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        if let Some(previous) = self.in_flight.take() {
            if !previous.is_finished() {
                debug!(
                    "Cancelling request {} in favor of a newer one",
                    self.generation
                );
            }
            previous.abort();
        }

        self.generation += 1;
        let ticket = Ticket {
            generation: self.generation,
            key: RequestKey::of(input),
        };
        trace!("Issuing request {ticket:?}");
        self.current = Some(ticket);
        self.in_flight = Some(tokio::spawn(request));
        ticket
    }

    /// Like `issue`, but does nothing when a request for the same input is still in flight.
    /// Returns `None` when the request was skipped.
    pub fn issue_if_changed<I, F>(&mut self, input: &I, request: F) -> Option<Ticket>
    where
        I: Hash + ?Sized,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let key = RequestKey::of(input);
        if self.has_in_flight() && self.is_current(key) {
            trace!("A request for {key:?} is already in flight");
            return None;
        }
        Some(self.issue(input, request))
    }

    /// Whether the latest issued request was for inputs hashing to `key`.
    pub fn is_current(&self, key: RequestKey) -> bool {
        self.current.is_some_and(|ticket| ticket.key == key)
    }

    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Waits for the latest request to finish. Returns `None` when nothing is in flight.
    ///
    /// This is cancel safe: if the returned future is dropped, the request keeps running and a later
    /// call picks up its result.
    pub async fn next_result(&mut self) -> Option<Fresh<T>> {
        let handle = self.in_flight.as_mut()?;
        let joined = handle.await;
        self.in_flight = None;
        let ticket = self.current?;
        match joined {
            Ok(value) => Some(Fresh { ticket, value }),
            Err(e) if e.is_cancelled() => None,
            Err(e) => Some(Fresh {
                ticket,
                value: Err(anyhow::anyhow!("The request task failed: {e}")),
            }),
        }
    }
}

impl<T> Drop for Refresher<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

/// A periodic timer owned by whoever started it. The first tick is immediate.
#[derive(Debug)]
pub struct Poller {
    ticks: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
    stopped: bool,
}

impl Poller {
    pub fn start(period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let (tx, ticks) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self {
            ticks,
            handle,
            stopped: false,
        }
    }

    /// Waits for the next tick. Returns `false` once the poller has been stopped.
    pub async fn tick(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.ticks.recv().await.is_some()
    }

    /// Stops the timer. No tick is delivered after this returns.
    pub fn stop(&mut self) {
        if !self.stopped {
            debug!("Stopping poller");
            self.stopped = true;
            self.handle.abort();
            self.ticks.close();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[test]
    fn test_request_key_follows_input() {
        assert_eq!(RequestKey::of("2024"), RequestKey::of("2024"));
        assert_ne!(RequestKey::of("2024"), RequestKey::of("2025"));
    }

    #[tokio::test]
    async fn test_nothing_in_flight() {
        let mut refresher: Refresher<u32> = Refresher::new();
        assert!(!refresher.has_in_flight());
        assert!(refresher.next_result().await.is_none());
    }

    #[tokio::test]
    async fn test_single_request() {
        let mut refresher = Refresher::new();
        let ticket = refresher.issue("a", async { Ok(7u32) });
        assert!(refresher.is_current(RequestKey::of("a")));
        let fresh = refresher.next_result().await.unwrap();
        assert_eq!(fresh.ticket, ticket);
        assert_eq!(fresh.value.unwrap(), 7);
        assert!(!refresher.has_in_flight());
    }

    #[tokio::test]
    async fn test_slow_stale_request_is_dropped() {
        let mut refresher = Refresher::new();
        let (_release_old, old_gate) = oneshot::channel::<()>();
        let _ = refresher.issue("old", async move {
            let _ = old_gate.await;
            Ok("old")
        });
        let newer = refresher.issue("new", async { Ok("new") });

        assert!(!refresher.is_current(RequestKey::of("old")));
        assert!(refresher.is_current(RequestKey::of("new")));

        let fresh = refresher.next_result().await.unwrap();
        assert_eq!(fresh.ticket, newer);
        assert_eq!(fresh.value.unwrap(), "new");
        assert!(newer.generation() > 1);
    }

    #[tokio::test]
    async fn test_completed_stale_request_is_dropped() {
        let mut refresher = Refresher::new();
        let _ = refresher.issue(&1, async { Ok(1) });
        // let the first request finish before superseding it
        tokio::time::sleep(Duration::from_millis(20)).await;

        let (release, gate) = oneshot::channel::<()>();
        let newer = refresher.issue(&2, async move {
            let _ = gate.await;
            Ok(2)
        });
        release.send(()).unwrap();

        let fresh = refresher.next_result().await.unwrap();
        assert_eq!(fresh.ticket, newer);
        assert_eq!(fresh.value.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_errors_are_delivered() {
        let mut refresher: Refresher<u32> = Refresher::new();
        let _ = refresher.issue("x", async { Err(anyhow::anyhow!("backend down")) });
        let fresh = refresher.next_result().await.unwrap();
        assert!(fresh.value.unwrap_err().to_string().contains("backend down"));
    }

    #[tokio::test]
    async fn test_issue_if_changed_skips_same_input() {
        let mut refresher = Refresher::new();
        let (release, gate) = oneshot::channel::<()>();
        let first = refresher
            .issue_if_changed("2024", async move {
                let _ = gate.await;
                Ok(1u32)
            })
            .unwrap();
        assert!(refresher.issue_if_changed("2024", async { Ok(2) }).is_none());

        release.send(()).unwrap();
        let fresh = refresher.next_result().await.unwrap();
        assert_eq!(fresh.ticket, first);
        assert_eq!(fresh.value.unwrap(), 1);

        // nothing in flight any more, so the same input is issued again
        assert!(refresher.issue_if_changed("2024", async { Ok(3) }).is_some());
    }

    #[tokio::test]
    async fn test_issue_if_changed_replaces_other_input() {
        let mut refresher = Refresher::new();
        let (_release, gate) = oneshot::channel::<()>();
        let _ = refresher.issue_if_changed("2024", async move {
            let _ = gate.await;
            Ok("2024")
        });
        let newer = refresher
            .issue_if_changed("2025", async { Ok("2025") })
            .unwrap();
        let fresh = refresher.next_result().await.unwrap();
        assert_eq!(fresh.ticket, newer);
        assert_eq!(fresh.value.unwrap(), "2025");
    }

    #[tokio::test]
    async fn test_requests_slower_than_poll_period_complete() {
        let mut poller = Poller::start(Duration::from_millis(10));
        let mut refresher: Refresher<u32> = Refresher::new();
        let mut issued = 0;
        let mut delivered = 0;
        let deadline = tokio::time::sleep(Duration::from_millis(300));
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = poller.tick() => {
                    let request = async {
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        Ok(1)
                    };
                    if refresher.issue_if_changed("2024", request).is_some() {
                        issued += 1;
                    }
                }
                Some(fresh) = refresher.next_result(), if refresher.has_in_flight() => {
                    assert_eq!(fresh.value.unwrap(), 1);
                    delivered += 1;
                }
                _ = &mut deadline => break,
            }
        }
        assert!(delivered >= 2, "delivered {delivered}");
        assert!(issued <= delivered + 1, "issued {issued}, delivered {delivered}");
    }

    #[tokio::test]
    async fn test_poller_ticks_until_stopped() {
        let mut poller = Poller::start(Duration::from_millis(5));
        assert!(poller.tick().await);
        assert!(poller.tick().await);
        poller.stop();
        assert!(poller.is_stopped());
        assert!(!poller.tick().await);
        assert!(!poller.tick().await);
    }
}
