//! Consume → score → decide → publish, one message at a time.
//!
//! # Per-message flow
//!
//! 1. Decode the delivery. Undecodable payloads are poison: logged with their position and
//!    skipped, never retried.
//! 2. Score `answer` against `expected`. A scorer failure (or a score outside `[0, 1]`)
//!    stops the controller.
//! 3. Route via [`RoutingPolicy`](crate::routing::RoutingPolicy) and publish at most one
//!    record: validated sink on accept, questions sink on regenerate, nothing on discard.
//! 4. Flush once `flush_every` publishes are buffered (default: every publish).
//!
//! # Offsets
//!
//! A delivery's offset is committed only when no publish made before it is still
//! buffered. With `flush_every = 1` that is immediately after the message is handled;
//! with larger values commits trail the flushes. A crash can therefore cause redelivery
//! but never loses a decided message.

pub mod error;
pub mod types;


pub use error::ControllerError;
pub use types::{ControllerSettings, Disposition, PublishPolicy, RunSummary};

use std::future::Future;

use tracing::{debug, error, info, warn};

use crate::broker::{Delivery, DeliveryPosition, MessageConsumer, MessagePublisher};
use crate::message::CandidateMessage;
use crate::routing::RoutingDecision;
use crate::scoring::{Scorer, ensure_unit_interval};

/// Sequential feedback controller.
pub struct FeedbackController<S, P> {
    scorer: S,
    publisher: P,
    settings: ControllerSettings,
    unflushed: u32,
    summary: RunSummary,
}

impl<S, P> std::fmt::Debug for FeedbackController<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackController")
            .field("settings", &self.settings)
            .field("unflushed", &self.unflushed)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

impl<S: Scorer, P: MessagePublisher> FeedbackController<S, P> {
    pub fn new(scorer: S, publisher: P, settings: ControllerSettings) -> Self {
        Self {
            scorer,
            publisher,
            settings,
            unflushed: 0,
            summary: RunSummary::default(),
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Publishes sent since the last successful flush.
    pub fn unflushed(&self) -> u32 {
        self.unflushed
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Processes a single delivery to its terminal disposition.
    pub async fn handle(&mut self, delivery: &Delivery) -> Result<Disposition, ControllerError> {
        let message = match CandidateMessage::decode(&delivery.payload) {
            Ok(message) => message,
            Err(err) => {
                error!(
                    position = %delivery.position(),
                    key = ?delivery.key.as_deref().map(String::from_utf8_lossy),
                    payload = %String::from_utf8_lossy(&delivery.payload),
                    error = %err,
                    "Poison message skipped"
                );
                self.summary.record(&Disposition::Poisoned);
                return Ok(Disposition::Poisoned);
            }
        };

        let id = message.key();
        let retries = message.retries;

        let score = self
            .scorer
            .score(&message.expected, &message.answer)
            .and_then(ensure_unit_interval)
            .map_err(|source| ControllerError::Scoring {
                id: id.clone(),
                source,
            })?;

        let threshold = self.settings.policy.score_threshold();

        let disposition = match self.settings.policy.decide(score, retries) {
            RoutingDecision::Accept { score } => {
                let topic = self.settings.validated_topic.clone();
                self.publish(&topic, &id, &message.into_validated(score))
                    .await?;
                info!(
                    id = %id,
                    retries = retries.count(),
                    score = format_args!("{:.3}", score),
                    threshold,
                    sink = %topic,
                    "Score at or above threshold, sending to persistence"
                );
                Disposition::Accepted { score }
            }
            RoutingDecision::Regenerate { score, next } => {
                let topic = self.settings.questions_topic.clone();
                self.publish(&topic, &id, &message.into_regeneration(next))
                    .await?;
                info!(
                    id = %id,
                    retries = next.count(),
                    score = format_args!("{:.3}", score),
                    threshold,
                    sink = %topic,
                    "Score below threshold, re-injecting question"
                );
                Disposition::Regenerated {
                    score,
                    retries: next,
                }
            }
            RoutingDecision::Discard { score, retries } => {
                warn!(
                    id = %id,
                    retries = retries.count(),
                    max_retries = self.settings.policy.max_retries(),
                    score = format_args!("{:.3}", score),
                    "Retry limit reached, discarding"
                );
                Disposition::Discarded { score, retries }
            }
        };

        self.summary.record(&disposition);

        if self.unflushed >= self.settings.flush_every.max(1) {
            self.flush().await?;
        }

        Ok(disposition)
    }

    /// Flushes buffered publishes, retrying per [`PublishPolicy`].
    pub async fn flush(&mut self) -> Result<(), ControllerError> {
        if self.unflushed == 0 {
            return Ok(());
        }

        let max_attempts = self.settings.publish.attempts.max(1);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.publisher.flush().await {
                Ok(()) => {
                    debug!(records = self.unflushed, "Publisher flushed");
                    self.unflushed = 0;
                    return Ok(());
                }
                Err(source) if attempt >= max_attempts => {
                    return Err(ControllerError::Flush {
                        attempts: attempt,
                        source,
                    });
                }
                Err(err) => {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %err,
                        "Flush failed, retrying"
                    );
                    tokio::time::sleep(self.settings.publish.backoff).await;
                }
            }
        }
    }

    /// Runs until the input stream ends, `shutdown` resolves, or a fatal error occurs.
    ///
    /// Buffered publishes are flushed and pending offsets committed before returning `Ok`.
    pub async fn run<C, F>(&mut self, consumer: &mut C, shutdown: F) -> Result<RunSummary, ControllerError>
    where
        C: MessageConsumer,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut awaiting_commit: Vec<DeliveryPosition> = Vec::new();

        info!(
            threshold = self.settings.policy.score_threshold(),
            max_retries = self.settings.policy.max_retries(),
            flush_every = self.settings.flush_every,
            "Feedback controller running"
        );

        loop {
            let next = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping consumption");
                    break;
                }
                next = consumer.recv() => next.map_err(ControllerError::Receive)?,
            };

            let Some(delivery) = next else {
                info!("Input stream ended");
                break;
            };

            self.handle(&delivery).await?;
            awaiting_commit.push(delivery.position());

            if self.unflushed == 0 {
                commit_all(consumer, &mut awaiting_commit).await;
            }
        }

        self.flush().await?;
        commit_all(consumer, &mut awaiting_commit).await;

        let summary = self.summary;
        info!(
            processed = summary.processed,
            accepted = summary.accepted,
            regenerated = summary.regenerated,
            discarded = summary.discarded,
            poisoned = summary.poisoned,
            "Feedback controller stopped"
        );
        Ok(summary)
    }

    async fn publish(
        &mut self,
        topic: &str,
        id: &str,
        message: &CandidateMessage,
    ) -> Result<(), ControllerError> {
        let payload = message.encode()?;
        let max_attempts = self.settings.publish.attempts.max(1);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.publisher.send(topic, Some(id), payload.clone()).await {
                Ok(()) => {
                    self.unflushed += 1;
                    return Ok(());
                }
                Err(source) if attempt >= max_attempts => {
                    return Err(ControllerError::Publish {
                        topic: topic.to_string(),
                        id: id.to_string(),
                        attempts: attempt,
                        source,
                    });
                }
                Err(err) => {
                    warn!(
                        topic,
                        id,
                        attempt,
                        max_attempts,
                        error = %err,
                        "Publish failed, retrying"
                    );
                    tokio::time::sleep(self.settings.publish.backoff).await;
                }
            }
        }
    }
}

async fn commit_all<C: MessageConsumer>(consumer: &mut C, positions: &mut Vec<DeliveryPosition>) {
    for position in positions.drain(..) {
        if let Err(err) = consumer.commit(&position).await {
            warn!(
                position = %position,
                error = %err,
                "Offset commit failed, message may be redelivered"
            );
        }
    }
}
