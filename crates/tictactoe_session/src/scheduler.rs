//! Delayed delivery of transport events.
//!
//! The loopback server never sleeps itself; it hands each reply to a
//! [`Scheduler`] with a delay. Tests use [`ManualScheduler`] and move a
//! virtual clock; the binary uses [`TokioScheduler`].

use super::transport::TransportEvent;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Delivers events after a delay.
///
/// Events are delivered ordered by due time; events due at the same
/// time keep the order they were scheduled in.
pub trait Scheduler {
    /// Queues `event` for delivery after `delay`.
    fn schedule(&self, delay: Duration, event: TransportEvent);
}

#[derive(Debug, Default)]
struct ManualQueue {
    now: Duration,
    seq: u64,
    pending: BTreeMap<(Duration, u64), TransportEvent>,
}

/// Deterministic scheduler driven by a virtual clock.
///
/// Clones share the same queue.
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualQueue>>,
}

impl ManualScheduler {
    /// Creates a scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of undelivered events.
    pub fn pending(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Moves the clock forward by `by` and returns every event that fell due.
    pub fn advance(&self, by: Duration) -> Vec<TransportEvent> {
        let mut queue = self.inner.borrow_mut();
        let deadline = queue.now + by;
        let mut due = Vec::new();
        while let Some(entry) = queue.pending.first_entry() {
            if entry.key().0 > deadline {
                break;
            }
            due.push(entry.remove());
        }
        queue.now = deadline;
        due
    }

    /// Delivers everything pending, moving the clock to the last due time.
    pub fn drain(&self) -> Vec<TransportEvent> {
        let mut queue = self.inner.borrow_mut();
        let mut due = Vec::with_capacity(queue.pending.len());
        while let Some(((at, _), event)) = queue.pending.pop_first() {
            queue.now = queue.now.max(at);
            due.push(event);
        }
        due
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, event: TransportEvent) {
        let mut queue = self.inner.borrow_mut();
        let key = (queue.now + delay, queue.seq);
        queue.seq += 1;
        queue.pending.insert(key, event);
    }
}

/// Scheduler backed by tokio timers.
///
/// A single driver task owns the queue, so delivery order matches
/// [`Scheduler`]'s contract no matter how timers race.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    queue_tx: mpsc::UnboundedSender<(Instant, TransportEvent)>,
}

impl TokioScheduler {
    /// Spawns the driver task and returns the scheduler with the receiving
    /// end of the event channel. Must be called inside a tokio runtime.
    #[instrument]
    pub fn spawn() -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        tokio::spawn(drive(queue_rx, event_tx));
        (Self { queue_tx }, event_rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, event: TransportEvent) {
        if self.queue_tx.send((Instant::now() + delay, event)).is_err() {
            warn!("Scheduler driver stopped; event dropped");
        }
    }
}

async fn drive(
    mut queue_rx: mpsc::UnboundedReceiver<(Instant, TransportEvent)>,
    event_tx: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut pending: BTreeMap<(Instant, u64), TransportEvent> = BTreeMap::new();
    let mut seq = 0u64;

    loop {
        let next_due = pending.keys().next().map(|(at, _)| *at);
        tokio::select! {
            incoming = queue_rx.recv() => match incoming {
                Some((at, event)) => {
                    pending.insert((at, seq), event);
                    seq += 1;
                }
                None => break,
            },
            _ = sleep_until(next_due) => {
                if let Some((_, event)) = pending.pop_first()
                    && event_tx.send(event).is_err()
                {
                    break;
                }
            }
        }
    }
    debug!(undelivered = pending.len(), "Scheduler driver finished");
}

async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(s: &str) -> TransportEvent {
        TransportEvent::Frame(s.to_string())
    }

    #[test]
    fn test_manual_orders_by_due_time_then_insertion() {
        let sched = ManualScheduler::new();
        sched.schedule(Duration::from_millis(500), frame("ack"));
        sched.schedule(Duration::from_millis(300), frame("move"));
        sched.schedule(Duration::from_millis(500), frame("joined"));

        assert!(sched.advance(Duration::from_millis(299)).is_empty());
        assert_eq!(sched.advance(Duration::from_millis(1)), vec![frame("move")]);
        assert_eq!(
            sched.advance(Duration::from_millis(200)),
            vec![frame("ack"), frame("joined")]
        );
        assert_eq!(sched.pending(), 0);
        assert_eq!(sched.now(), Duration::from_millis(500));
    }

    #[test]
    fn test_manual_delay_is_relative_to_now() {
        let sched = ManualScheduler::new();
        sched.advance(Duration::from_secs(1));
        sched.schedule(Duration::from_millis(10), TransportEvent::Connected);
        assert!(sched.advance(Duration::from_millis(9)).is_empty());
        assert_eq!(sched.drain(), vec![TransportEvent::Connected]);
        assert_eq!(sched.now(), Duration::from_millis(1010));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_delivers_in_due_order() {
        let (sched, mut rx) = TokioScheduler::spawn();
        sched.schedule(Duration::from_millis(500), frame("ack"));
        sched.schedule(Duration::from_millis(300), frame("move"));
        sched.schedule(Duration::from_millis(500), frame("joined"));
        sched.schedule(Duration::ZERO, TransportEvent::Disconnected);

        assert_eq!(rx.recv().await, Some(TransportEvent::Disconnected));
        assert_eq!(rx.recv().await, Some(frame("move")));
        assert_eq!(rx.recv().await, Some(frame("ack")));
        assert_eq!(rx.recv().await, Some(frame("joined")));
    }
}
