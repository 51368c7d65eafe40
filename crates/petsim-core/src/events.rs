//! Event fan-out from the registry to observers.
//!
//! The registry never calls observers directly. Every state transition is
//! stamped and queued on an unbounded channel while the registry lock is
//! held, so queue order is exactly transition order. One dispatcher task
//! drains the queue and hands each event to every observer, in the order
//! the observers were registered.
//!
//! Closing the registry drops the only sender. The dispatcher then
//! delivers what was already queued and exits.

use std::sync::Arc;

use chrono::Utc;
use petsim_types::{EventRecord, SimEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Receives engine notifications.
///
/// Called from the dispatcher task, never while the registry is locked,
/// so implementations may read engine state. Implementations should return
/// quickly: a slow observer delays delivery to every observer after it.
///
/// The queue in front of the dispatcher is unbounded. Events are queued
/// while the registry lock is held, and that must never wait on an
/// observer, so a slow observer does not stall the simulation. Instead the
/// backlog grows by three events per live pet every decay interval until
/// the observer catches up, and all of it is held in memory.
pub trait SimObserver: Send + Sync {
    /// Called once per event, in global event order.
    fn on_event(&self, record: &EventRecord);
}

/// Observer that forwards every event into an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<EventRecord>,
}

impl ChannelObserver {
    /// Create an observer and the receiver its events arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EventRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SimObserver for ChannelObserver {
    fn on_event(&self, record: &EventRecord) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.tx.send(record.clone());
    }
}

/// Observer that writes every event to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SimObserver for TracingObserver {
    fn on_event(&self, record: &EventRecord) {
        match &record.event {
            SimEvent::StatChanged {
                pet_id,
                stat,
                value,
            } => debug!(seq = record.sequence, %pet_id, %stat, value, "Stat changed"),
            SimEvent::PetDied { pet_id, name } => {
                info!(seq = record.sequence, %pet_id, %name, "Pet died");
            }
            SimEvent::QuestCompleted {
                quest_id,
                description,
                reward,
                total_points,
            } => info!(
                seq = record.sequence,
                %quest_id,
                %description,
                reward,
                total_points,
                "Quest completed"
            ),
        }
    }
}

/// Sending half of the event queue, owned by the registry state.
#[derive(Debug)]
pub(crate) struct EventOutbox {
    tx: mpsc::UnboundedSender<EventRecord>,
    next_sequence: u64,
}

impl EventOutbox {
    /// Create an outbox and the receiver the dispatcher drains.
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<EventRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                next_sequence: 1,
            },
            rx,
        )
    }

    /// Stamp and queue an event.
    pub(crate) fn publish(&mut self, event: SimEvent) {
        let record = EventRecord {
            sequence: self.next_sequence,
            occurred_at: Utc::now(),
            event,
        };
        self.next_sequence = self.next_sequence.saturating_add(1);
        if self.tx.send(record).is_err() {
            warn!("Event dispatcher is gone, event dropped");
        }
    }
}

/// Spawn the dispatcher task.
///
/// Resolves to the number of events delivered once the outbox is dropped
/// and the queue is drained.
pub(crate) fn spawn_dispatcher(
    mut rx: mpsc::UnboundedReceiver<EventRecord>,
    observers: Vec<Arc<dyn SimObserver>>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut delivered: u64 = 0;
        while let Some(record) = rx.recv().await {
            for observer in &observers {
                observer.on_event(&record);
            }
            delivered = delivered.saturating_add(1);
        }
        debug!(delivered, "Event dispatcher stopped");
        delivered
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use petsim_types::{PetId, PetStat, QuestId};

    use super::*;

    /// Records which observer saw which sequence number.
    struct Tagged {
        tag: &'static str,
        log: Arc<Mutex<Vec<(&'static str, u64)>>>,
    }

    impl SimObserver for Tagged {
        fn on_event(&self, record: &EventRecord) {
            self.log.lock().unwrap().push((self.tag, record.sequence));
        }
    }

    fn stat_event() -> SimEvent {
        SimEvent::StatChanged {
            pet_id: PetId::new(),
            stat: PetStat::Hunger,
            value: 10,
        }
    }

    #[tokio::test]
    async fn sequences_start_at_one_and_increase() {
        let (mut outbox, mut rx) = EventOutbox::new();
        outbox.publish(stat_event());
        outbox.publish(SimEvent::QuestCompleted {
            quest_id: QuestId::new(),
            description: String::from("Keep your pet alive for 20 seconds"),
            reward: 20,
            total_points: 20,
        });
        drop(outbox);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn observers_called_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let observers: Vec<Arc<dyn SimObserver>> = vec![
            Arc::new(Tagged {
                tag: "first",
                log: Arc::clone(&log),
            }),
            Arc::new(Tagged {
                tag: "second",
                log: Arc::clone(&log),
            }),
        ];

        let (mut outbox, rx) = EventOutbox::new();
        let handle = spawn_dispatcher(rx, observers);
        outbox.publish(stat_event());
        outbox.publish(stat_event());
        drop(outbox);

        let delivered = handle.await.unwrap();
        assert_eq!(delivered, 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
    }

    #[tokio::test]
    async fn channel_observer_forwards_records() {
        let (observer, mut rx) = ChannelObserver::channel();
        let (mut outbox, events) = EventOutbox::new();
        let handle = spawn_dispatcher(events, vec![Arc::new(observer)]);
        outbox.publish(stat_event());
        drop(outbox);
        handle.await.unwrap();

        let record = rx.recv().await.unwrap();
        assert!(matches!(record.event, SimEvent::StatChanged { value: 10, .. }));
    }

    /// Blocks on its first event until released.
    struct Stuck {
        release: Mutex<Option<std::sync::mpsc::Receiver<()>>>,
        seen: Arc<Mutex<u64>>,
    }

    impl SimObserver for Stuck {
        fn on_event(&self, _record: &EventRecord) {
            if let Some(release) = self.release.lock().unwrap().take() {
                let _ = release.recv();
            }
            *self.seen.lock().unwrap() += 1;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stuck_observer_never_blocks_publishing() {
        let (release, stuck) = std::sync::mpsc::channel();
        let seen = Arc::new(Mutex::new(0));
        let observer = Stuck {
            release: Mutex::new(Some(stuck)),
            seen: Arc::clone(&seen),
        };

        let (mut outbox, rx) = EventOutbox::new();
        let handle = spawn_dispatcher(rx, vec![Arc::new(observer)]);
        for _ in 0..1_000 {
            outbox.publish(stat_event());
        }
        assert_eq!(outbox.next_sequence, 1_001);
        drop(outbox);

        release.send(()).unwrap();
        assert_eq!(handle.await.unwrap(), 1_000);
        assert_eq!(*seen.lock().unwrap(), 1_000);
    }

    #[test]
    fn publish_without_dispatcher_does_not_panic() {
        let (mut outbox, rx) = EventOutbox::new();
        drop(rx);
        outbox.publish(stat_event());
    }
}
