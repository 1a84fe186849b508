//! Message broker seam.
//!
//! The controller talks to the broker through three small traits:
//!
//! - [`BrokerConnector`] builds consumer and publisher handles
//! - [`MessageConsumer`] yields deliveries from one subscription and commits them
//! - [`MessagePublisher`] buffers records and flushes them
//!
//! Delivery semantics expected from every backend: at-least-once, earliest offset on the
//! first subscription of a group, and offsets advanced only through
//! [`MessageConsumer::commit`] (i.e. after local processing, never before).
//!
//! Backends: [`InMemoryBroker`] (always available) and `KafkaConnector` (feature `kafka`).

pub mod error;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod memory;


pub use error::BrokerError;
#[cfg(feature = "kafka")]
pub use kafka::{KafkaConnector, KafkaConsumer, KafkaPublisher};
pub use memory::{InMemoryBroker, InMemoryConsumer, InMemoryPublisher, StoredRecord};

use std::future::Future;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A record pulled from a subscription.
pub struct Delivery {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

impl Delivery {
    /// Coordinates needed to commit this delivery.
    pub fn position(&self) -> DeliveryPosition {
        DeliveryPosition {
            topic: self.topic.clone(),
            partition: self.partition,
            offset: self.offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Topic/partition/offset of a processed delivery.
pub struct DeliveryPosition {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

impl std::fmt::Display for DeliveryPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]@{}", self.topic, self.partition, self.offset)
    }
}

/// Inbound side of a subscription.
pub trait MessageConsumer: Send {
    /// Waits for the next delivery. `Ok(None)` means the stream has ended.
    fn recv(&mut self) -> impl Future<Output = Result<Option<Delivery>, BrokerError>> + Send;

    /// Marks `position` (and everything before it on that partition) as processed.
    fn commit(
        &mut self,
        position: &DeliveryPosition,
    ) -> impl Future<Output = Result<(), BrokerError>> + Send;
}

/// Outbound publishing handle.
pub trait MessagePublisher: Send {
    /// Hands a record to the producer. It may stay buffered until [`flush`](Self::flush).
    fn send(
        &mut self,
        topic: &str,
        key: Option<&str>,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), BrokerError>> + Send;

    /// Waits until every buffered record has been confirmed by the broker.
    fn flush(&mut self) -> impl Future<Output = Result<(), BrokerError>> + Send;
}

/// Factory for consumer and publisher handles.
pub trait BrokerConnector: Send + Sync {
    type Consumer: MessageConsumer;
    type Publisher: MessagePublisher;

    /// Subscribes to `topic` as a member of `group`.
    fn connect_consumer(
        &self,
        topic: &str,
        group: &str,
    ) -> impl Future<Output = Result<Self::Consumer, BrokerError>> + Send;

    /// Creates a publishing handle.
    fn connect_publisher(&self) -> impl Future<Output = Result<Self::Publisher, BrokerError>> + Send;

    /// Address (or description) used in logs.
    fn endpoint(&self) -> String;
}
