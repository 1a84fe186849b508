//! Feedback router entrypoint.

use mimalloc::MiMalloc;
use tokio::signal;

use feedback::broker::InMemoryBroker;
use feedback::config::{BrokerKind, Config};
use feedback::pipeline::run_feedback_loop;
use feedback::scoring::LexicalScorer;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        broker = config.broker.as_str(),
        broker_addr = %config.broker_addr,
        input = %config.input_topic,
        questions = %config.questions_topic,
        validated = %config.validated_topic,
        group = %config.consumer_group,
        "Feedback router starting"
    );

    let scorer = LexicalScorer::new();

    let summary = match config.broker {
        BrokerKind::Memory => {
            tracing::warn!("Using the in-memory broker; nothing outside this process can publish to it");
            run_feedback_loop(InMemoryBroker::new(), &config, scorer, shutdown_signal()).await?
        }
        BrokerKind::Kafka => run_kafka(&config, scorer).await?,
    };

    tracing::info!(processed = summary.processed, "Feedback router shutdown complete");
    Ok(())
}

#[cfg(feature = "kafka")]
async fn run_kafka(
    config: &Config,
    scorer: LexicalScorer,
) -> anyhow::Result<feedback::controller::RunSummary> {
    let backend = feedback::broker::KafkaConnector::new(config.broker_addr.clone());
    Ok(run_feedback_loop(backend, config, scorer, shutdown_signal()).await?)
}

#[cfg(not(feature = "kafka"))]
async fn run_kafka(
    _config: &Config,
    _scorer: LexicalScorer,
) -> anyhow::Result<feedback::controller::RunSummary> {
    anyhow::bail!("this binary was built without the 'kafka' feature")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
