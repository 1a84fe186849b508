//! Connect-and-run wiring used by the binary and the integration tests.

use std::future::Future;

use tracing::info;

use crate::broker::BrokerConnector;
use crate::config::Config;
use crate::connector::ResilientConnector;
use crate::controller::{ControllerError, FeedbackController, RunSummary};
use crate::scoring::Scorer;

/// Connects to `backend` (retrying until it answers) and runs the controller.
///
/// If `shutdown` resolves while still connecting, returns an empty summary.
pub async fn run_feedback_loop<B, S, F>(
    backend: B,
    config: &Config,
    scorer: S,
    shutdown: F,
) -> Result<RunSummary, ControllerError>
where
    B: BrokerConnector,
    S: Scorer,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let connector = ResilientConnector::new(backend, config.connect_retry_delay);

    let connect = async {
        let consumer = connector
            .connect_consumer(&config.input_topic, &config.consumer_group)
            .await;
        let publisher = connector.connect_publisher().await;
        (consumer, publisher)
    };

    let (mut consumer, publisher) = tokio::select! {
        biased;
        _ = &mut shutdown => {
            info!("Shutdown requested before the broker connection was established");
            return Ok(RunSummary::default());
        }
        handles = connect => handles,
    };

    let mut controller = FeedbackController::new(scorer, publisher, config.controller_settings());
    controller.run(&mut consumer, shutdown).await
}
