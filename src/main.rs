use clap::Parser;
use miette::{IntoDiagnostic, Result};
use reward_consumer::application::dispatcher::Dispatcher;
use reward_consumer::application::reward::RewardService;
use reward_consumer::config::ConsumerArgs;
use reward_consumer::domain::ports::MessageQueueRef;
use reward_consumer::error::PipelineError;
use reward_consumer::infrastructure::in_memory::InMemoryQueue;
use reward_consumer::telemetry::init_tracing;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Newline-delimited notification bodies to seed the in-memory queue with
    #[arg(long)]
    input: Option<PathBuf>,

    /// SQS queue URL. Requires the `queue-sqs` feature.
    #[arg(long, env = "QUEUE_URL")]
    queue_url: Option<String>,

    #[command(flatten)]
    consumer: ConsumerArgs,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json).into_diagnostic()?;

    let config = cli.consumer.into_config()?;

    let queue: MessageQueueRef = if let Some(url) = cli.queue_url
        && let Some(queue) = remote_queue(url).await
    {
        queue
    } else {
        let queue = InMemoryQueue::new();
        if let Some(path) = cli.input {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(PipelineError::from)?;
            let mut seeded = 0usize;
            for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
                queue.send(line).await;
                seeded += 1;
            }
            info!(seeded, path = %path.display(), "Seeded in-memory queue");
        }
        Arc::new(queue)
    };

    let dispatcher = Dispatcher::new(queue, Arc::new(RewardService::new()), config);
    listen_for_shutdown(dispatcher.cancellation_token());

    dispatcher.run().await;

    let stats = dispatcher.stats();
    println!(
        "received={} acknowledged={} failed={} receive_errors={}",
        stats.received,
        stats.acknowledged,
        stats.failed(),
        stats.receive_errors
    );

    Ok(())
}

#[cfg(feature = "queue-sqs")]
async fn remote_queue(queue_url: String) -> Option<MessageQueueRef> {
    use reward_consumer::infrastructure::sqs::SqsQueue;

    let queue = SqsQueue::connect(queue_url).await;
    info!(queue_url = %queue.queue_url(), "Consuming from SQS");
    Some(Arc::new(queue))
}

#[cfg(not(feature = "queue-sqs"))]
async fn remote_queue(_queue_url: String) -> Option<MessageQueueRef> {
    warn!(
        "WARNING: Queue URL given, but the 'queue-sqs' feature is not enabled. Falling back to an in-memory queue."
    );
    None
}

fn listen_for_shutdown(token: CancellationToken) {
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            ctrl_c_token.cancel();
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM signal");
                token.cancel();
            }
            Err(e) => warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    });
}
