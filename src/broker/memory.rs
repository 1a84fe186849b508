//! In-process broker.
//!
//! One partition per topic, append-only logs, per-group committed offsets. Publishes are
//! buffered in the [`InMemoryPublisher`] and only become visible to consumers on
//! [`flush`](MessagePublisher::flush), mirroring a real producer's batching.
//!
//! Consumers wait on a [`Notify`] while caught up, so an idle subscription does not spin.
//! [`InMemoryBroker::close`] ends every stream once it has been drained.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::debug;

use super::error::BrokerError;
use super::{BrokerConnector, Delivery, DeliveryPosition, MessageConsumer, MessagePublisher};

const ENDPOINT: &str = "memory://local";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A record as stored in a topic log.
pub struct StoredRecord {
    pub key: Option<String>,
    pub payload: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    topics: HashMap<String, Vec<StoredRecord>>,
    // (group, topic) -> next offset to read
    committed: HashMap<(String, String), i64>,
    closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    notify: Notify,
    connect_failures: AtomicU32,
    publish_failures: AtomicU32,
    flush_failures: AtomicU32,
    connect_attempts: AtomicU32,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn append(&self, records: impl IntoIterator<Item = (String, StoredRecord)>) {
        {
            let mut state = self.lock();
            for (topic, record) in records {
                state.topics.entry(topic).or_default().push(record);
            }
        }
        self.notify.notify_waiters();
    }
}

fn take_injected_failure(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        .is_ok()
}

#[derive(Debug, Clone, Default)]
/// Cloneable handle to an in-process broker. All clones share the same topics.
pub struct InMemoryBroker {
    shared: Arc<Shared>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record directly, bypassing any publisher buffer.
    pub fn produce(&self, topic: &str, key: Option<&str>, payload: Vec<u8>) {
        self.shared.append([(
            topic.to_string(),
            StoredRecord {
                key: key.map(str::to_string),
                payload,
            },
        )]);
    }

    /// Snapshot of every flushed record on `topic`.
    pub fn records(&self, topic: &str) -> Vec<StoredRecord> {
        self.shared
            .lock()
            .topics
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    /// Next offset `group` will read from `topic`, if it has committed anything.
    pub fn committed_offset(&self, group: &str, topic: &str) -> Option<i64> {
        self.shared
            .lock()
            .committed
            .get(&(group.to_string(), topic.to_string()))
            .copied()
    }

    /// Ends every subscription once its backlog is drained.
    pub fn close(&self) {
        self.shared.lock().closed = true;
        self.shared.notify.notify_waiters();
    }

    /// Makes the next `n` connect attempts fail as if no broker were reachable.
    pub fn fail_next_connects(&self, n: u32) {
        self.shared.connect_failures.store(n, Ordering::Release);
    }

    /// Makes the next `n` publisher sends fail.
    pub fn fail_next_publishes(&self, n: u32) {
        self.shared.publish_failures.store(n, Ordering::Release);
    }

    /// Makes the next `n` publisher flushes fail. Failed flushes keep their records buffered.
    pub fn fail_next_flushes(&self, n: u32) {
        self.shared.flush_failures.store(n, Ordering::Release);
    }

    /// Total connect attempts seen (consumer and publisher).
    pub fn connect_attempts(&self) -> u32 {
        self.shared.connect_attempts.load(Ordering::Acquire)
    }

    fn check_connect(&self) -> Result<(), BrokerError> {
        self.shared.connect_attempts.fetch_add(1, Ordering::AcqRel);
        if take_injected_failure(&self.shared.connect_failures) {
            return Err(BrokerError::Unavailable {
                endpoint: ENDPOINT.to_string(),
                message: "no brokers available".to_string(),
            });
        }
        Ok(())
    }
}

impl BrokerConnector for InMemoryBroker {
    type Consumer = InMemoryConsumer;
    type Publisher = InMemoryPublisher;

    async fn connect_consumer(&self, topic: &str, group: &str) -> Result<InMemoryConsumer, BrokerError> {
        self.check_connect()?;

        let position = self.committed_offset(group, topic).unwrap_or(0);
        debug!(topic, group, position, "In-memory subscription created");

        Ok(InMemoryConsumer {
            shared: Arc::clone(&self.shared),
            topic: topic.to_string(),
            group: group.to_string(),
            position,
        })
    }

    async fn connect_publisher(&self) -> Result<InMemoryPublisher, BrokerError> {
        self.check_connect()?;

        Ok(InMemoryPublisher {
            shared: Arc::clone(&self.shared),
            pending: Vec::new(),
        })
    }

    fn endpoint(&self) -> String {
        ENDPOINT.to_string()
    }
}

#[derive(Debug)]
/// Subscription to a single in-memory topic.
pub struct InMemoryConsumer {
    shared: Arc<Shared>,
    topic: String,
    group: String,
    position: i64,
}

impl InMemoryConsumer {
    /// Offset of the next record this consumer will read.
    pub fn position(&self) -> i64 {
        self.position
    }
}

impl MessageConsumer for InMemoryConsumer {
    async fn recv(&mut self) -> Result<Option<Delivery>, BrokerError> {
        let shared = Arc::clone(&self.shared);
        loop {
            // Registered before the check so a concurrent append cannot be missed.
            let notified = shared.notify.notified();

            {
                let state = shared.lock();
                let next = state
                    .topics
                    .get(&self.topic)
                    .and_then(|log| log.get(self.position as usize));

                if let Some(record) = next {
                    let delivery = Delivery {
                        topic: self.topic.clone(),
                        partition: 0,
                        offset: self.position,
                        key: record.key.as_ref().map(|k| k.as_bytes().to_vec()),
                        payload: record.payload.clone(),
                    };
                    self.position += 1;
                    return Ok(Some(delivery));
                }

                if state.closed {
                    return Ok(None);
                }
            }

            notified.await;
        }
    }

    async fn commit(&mut self, position: &DeliveryPosition) -> Result<(), BrokerError> {
        let mut state = self.shared.lock();
        let next = position.offset + 1;
        let committed = state
            .committed
            .entry((self.group.clone(), position.topic.clone()))
            .or_insert(next);
        *committed = (*committed).max(next);
        Ok(())
    }
}

#[derive(Debug)]
/// Buffered publisher; records reach the topic logs on flush.
pub struct InMemoryPublisher {
    shared: Arc<Shared>,
    pending: Vec<(String, StoredRecord)>,
}

impl InMemoryPublisher {
    /// Records sent but not yet flushed.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl MessagePublisher for InMemoryPublisher {
    async fn send(&mut self, topic: &str, key: Option<&str>, payload: Vec<u8>) -> Result<(), BrokerError> {
        if take_injected_failure(&self.shared.publish_failures) {
            return Err(BrokerError::Publish {
                topic: topic.to_string(),
                message: "queue full".to_string(),
            });
        }

        self.pending.push((
            topic.to_string(),
            StoredRecord {
                key: key.map(str::to_string),
                payload,
            },
        ));
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), BrokerError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        if take_injected_failure(&self.shared.flush_failures) {
            return Err(BrokerError::Flush {
                message: format!("{} records not acknowledged", self.pending.len()),
            });
        }
        let batch = std::mem::take(&mut self.pending);
        debug!(records = batch.len(), "Flushing in-memory publisher");
        self.shared.append(batch);
        Ok(())
    }
}
