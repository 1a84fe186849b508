//! Apache Kafka backend (`rdkafka`).
//!
//! Consumer: `auto.offset.reset=earliest`, auto-commit enabled but `enable.auto.offset.store`
//! disabled, so only offsets passed to [`MessageConsumer::commit`] are ever committed.
//!
//! Both handles probe cluster metadata before they are returned, so an unreachable broker
//! surfaces as [`BrokerError::Unavailable`] at connect time rather than on the first publish.
//!
//! Publisher: records are enqueued with `send_result` and delivered by the producer's polling
//! thread; [`MessagePublisher::flush`] awaits every delivery report and re-enqueues failed
//! records so a retried flush resends them.

use std::time::Duration;

use rdkafka::ClientConfig;
use rdkafka::Offset;
use rdkafka::TopicPartitionList;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use rdkafka::producer::{DeliveryFuture, FutureProducer, FutureRecord, Producer};
use tracing::{debug, warn};

use super::error::BrokerError;
use super::{BrokerConnector, Delivery, DeliveryPosition, MessageConsumer, MessagePublisher};

const METADATA_TIMEOUT: Duration = Duration::from_secs(5);
const MESSAGE_TIMEOUT_MS: &str = "30000";

#[derive(Debug, Clone)]
/// Builds Kafka consumers and producers for one bootstrap address.
pub struct KafkaConnector {
    bootstrap_servers: String,
}

impl KafkaConnector {
    pub fn new(bootstrap_servers: impl Into<String>) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.into(),
        }
    }

    /// Consumer settings: earliest reset, offsets stored only through `commit`.
    pub fn consumer_config(&self, group: &str) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("group.id", group)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "true")
            .set("enable.auto.offset.store", "false");
        config
    }

    pub fn producer_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("message.timeout.ms", MESSAGE_TIMEOUT_MS);
        config
    }

    fn unavailable(&self, err: KafkaError) -> BrokerError {
        BrokerError::Unavailable {
            endpoint: self.bootstrap_servers.clone(),
            message: err.to_string(),
        }
    }

    fn task_failed(&self, err: tokio::task::JoinError) -> BrokerError {
        BrokerError::Connect {
            endpoint: self.bootstrap_servers.clone(),
            message: format!("connect task failed: {err}"),
        }
    }

    fn connect_error(&self, err: KafkaError) -> BrokerError {
        BrokerError::Connect {
            endpoint: self.bootstrap_servers.clone(),
            message: err.to_string(),
        }
    }
}

impl BrokerConnector for KafkaConnector {
    type Consumer = KafkaConsumer;
    type Publisher = KafkaPublisher;

    async fn connect_consumer(&self, topic: &str, group: &str) -> Result<KafkaConsumer, BrokerError> {
        let config = self.consumer_config(group);
        let connector = self.clone();
        let topic_name = topic.to_string();

        // Client creation and the metadata probe block; keep them off the async workers.
        let consumer = tokio::task::spawn_blocking(move || -> Result<StreamConsumer, BrokerError> {
            let consumer: StreamConsumer =
                config.create().map_err(|e| connector.connect_error(e))?;

            consumer
                .fetch_metadata(Some(&topic_name), METADATA_TIMEOUT)
                .map_err(|e| connector.unavailable(e))?;

            consumer
                .subscribe(&[topic_name.as_str()])
                .map_err(|e| connector.connect_error(e))?;

            Ok(consumer)
        })
        .await
        .map_err(|e| self.task_failed(e))??;

        debug!(topic, group, bootstrap = %self.bootstrap_servers, "Kafka subscription created");

        Ok(KafkaConsumer {
            consumer,
            topic: topic.to_string(),
        })
    }

    async fn connect_publisher(&self) -> Result<KafkaPublisher, BrokerError> {
        let config = self.producer_config();
        let connector = self.clone();

        // Producer creation is lazy; the metadata probe is what actually reaches a broker.
        let producer = tokio::task::spawn_blocking(move || -> Result<FutureProducer, BrokerError> {
            let producer: FutureProducer =
                config.create().map_err(|e| connector.connect_error(e))?;

            producer
                .client()
                .fetch_metadata(None, METADATA_TIMEOUT)
                .map_err(|e| connector.unavailable(e))?;

            Ok(producer)
        })
        .await
        .map_err(|e| self.task_failed(e))??;

        debug!(bootstrap = %self.bootstrap_servers, "Kafka producer created");

        Ok(KafkaPublisher {
            producer,
            in_flight: Vec::new(),
        })
    }

    fn endpoint(&self) -> String {
        self.bootstrap_servers.clone()
    }
}

/// Kafka subscription to one topic.
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl MessageConsumer for KafkaConsumer {
    async fn recv(&mut self) -> Result<Option<Delivery>, BrokerError> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| BrokerError::Receive {
                topic: self.topic.clone(),
                message: e.to_string(),
            })?;

        Ok(Some(Delivery {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
            key: message.key().map(<[u8]>::to_vec),
            payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
        }))
    }

    async fn commit(&mut self, position: &DeliveryPosition) -> Result<(), BrokerError> {
        let commit_error = |e: KafkaError| BrokerError::Commit {
            topic: position.topic.clone(),
            offset: position.offset,
            message: e.to_string(),
        };

        // The stored offset is the next one to read.
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &position.topic,
            position.partition,
            Offset::Offset(position.offset + 1),
        )
        .map_err(commit_error)?;

        self.consumer.store_offsets(&tpl).map_err(commit_error)
    }
}

struct InFlight {
    topic: String,
    key: Option<String>,
    payload: Vec<u8>,
    delivery: DeliveryFuture,
}

/// Kafka producer with explicit flush.
pub struct KafkaPublisher {
    producer: FutureProducer,
    in_flight: Vec<InFlight>,
}

impl KafkaPublisher {
    fn enqueue(
        &self,
        topic: String,
        key: Option<String>,
        payload: Vec<u8>,
    ) -> Result<InFlight, BrokerError> {
        let enqueued = {
            let mut record = FutureRecord::<str, [u8]>::to(&topic).payload(payload.as_slice());
            if let Some(key) = key.as_deref() {
                record = record.key(key);
            }
            self.producer
                .send_result(record)
                .map_err(|(err, _)| err.to_string())
        };

        match enqueued {
            Ok(delivery) => Ok(InFlight {
                topic,
                key,
                payload,
                delivery,
            }),
            Err(message) => Err(BrokerError::Publish { topic, message }),
        }
    }
}

impl MessagePublisher for KafkaPublisher {
    async fn send(&mut self, topic: &str, key: Option<&str>, payload: Vec<u8>) -> Result<(), BrokerError> {
        let in_flight = self.enqueue(topic.to_string(), key.map(str::to_string), payload)?;
        self.in_flight.push(in_flight);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), BrokerError> {
        if self.in_flight.is_empty() {
            return Ok(());
        }

        let mut failed = Vec::new();
        let mut first_error: Option<String> = None;

        for record in std::mem::take(&mut self.in_flight) {
            let reason = match record.delivery.await {
                Ok(Ok(_)) => continue,
                Ok(Err((err, _))) => err.to_string(),
                Err(_) => "delivery report dropped".to_string(),
            };
            warn!(topic = %record.topic, error = %reason, "Delivery failed, re-queueing record");
            first_error.get_or_insert(reason);
            failed.push((record.topic, record.key, record.payload));
        }

        for (topic, key, payload) in failed {
            let retry = self.enqueue(topic, key, payload)?;
            self.in_flight.push(retry);
        }

        match first_error {
            Some(message) => Err(BrokerError::Flush { message }),
            None => Ok(()),
        }
    }
}
