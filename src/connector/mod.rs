//! Resilient broker connection.
//!
//! [`ResilientConnector`] wraps a [`BrokerConnector`] and keeps retrying, with a fixed delay,
//! until a handle is obtained. Both the consumer and the publisher go through the same loop.
//! Neither method can fail; shutdown during startup is handled by the caller dropping the
//! future.


use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::broker::{BrokerConnector, BrokerError};
use crate::constants::CONNECT_RETRY_DELAY;

/// Retries connection attempts forever with a fixed delay.
#[derive(Debug, Clone)]
pub struct ResilientConnector<B> {
    backend: B,
    retry_delay: Duration,
}

impl<B: BrokerConnector> ResilientConnector<B> {
    pub fn new(backend: B, retry_delay: Duration) -> Self {
        Self {
            backend,
            retry_delay,
        }
    }

    /// Uses the default 5 second delay.
    pub fn with_default_delay(backend: B) -> Self {
        Self::new(backend, CONNECT_RETRY_DELAY)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Subscribes to `topic` in `group`, blocking until the broker accepts.
    pub async fn connect_consumer(&self, topic: &str, group: &str) -> B::Consumer {
        let consumer = self
            .retry_forever("consumer", || self.backend.connect_consumer(topic, group))
            .await;
        info!(
            endpoint = %self.backend.endpoint(),
            topic,
            group,
            "Connected to broker (consumer)"
        );
        consumer
    }

    /// Creates a publisher, blocking until the broker accepts.
    pub async fn connect_publisher(&self) -> B::Publisher {
        let publisher = self
            .retry_forever("publisher", || self.backend.connect_publisher())
            .await;
        info!(endpoint = %self.backend.endpoint(), "Connected to broker (publisher)");
        publisher
    }

    async fn retry_forever<T, F, Fut>(&self, role: &'static str, mut attempt: F) -> T
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BrokerError>>,
    {
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            match attempt().await {
                Ok(handle) => return handle,
                Err(err) if err.is_unavailable() => {
                    warn!(
                        role,
                        attempt = attempts,
                        endpoint = %self.backend.endpoint(),
                        error = %err,
                        retry_in = ?self.retry_delay,
                        "Broker not available, retrying connection"
                    );
                }
                Err(err) => {
                    warn!(
                        role,
                        attempt = attempts,
                        endpoint = %self.backend.endpoint(),
                        error = %err,
                        retry_in = ?self.retry_delay,
                        "Unexpected error while connecting, retrying"
                    );
                }
            }
            tokio::time::sleep(self.retry_delay).await;
        }
    }
}
