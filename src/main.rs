//! Sentinel entrypoint: HTTP scoring server and offline batch prediction.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use sentinel::config::Config;
use sentinel::dataset::{Dataset, write_submission};
use sentinel::embedding::{EmbeddingProvider, EncoderConfig, SentenceEncoder};
use sentinel::gateway::{AppState, create_router};
use sentinel::pipeline::run_batch;
use sentinel::scoring::ViolationPredictor;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[command(name = "sentinel", version, about = "Centroid-based rule violation scoring")]
struct Cli {
    /// Probe a running server's /healthz and exit 0 if healthy, 1 otherwise.
    #[arg(long)]
    health_check: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP scoring API (default).
    Serve,
    /// Score a JSONL dataset and write a submission file.
    Predict {
        /// Dataset in JSON Lines format.
        #[arg(long)]
        input: PathBuf,
        /// Output file; `.csv` writes `row_id,rule_violation`, anything else JSON Lines.
        #[arg(long, default_value = "submission.csv")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.health_check {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config),
        Command::Predict { input, output } => predict(&config, &input, &output),
    }
}

fn load_encoder(config: &Config) -> anyhow::Result<SentenceEncoder> {
    if config.model_path.is_none() {
        tracing::warn!("No SENTINEL_MODEL_PATH configured, running encoder in stub mode");
    }
    let encoder = SentenceEncoder::load(EncoderConfig::from_config(config))?;
    tracing::info!(
        embedding_dim = encoder.embedding_dim(),
        stub = encoder.is_stub(),
        "Encoder ready"
    );
    Ok(encoder)
}

fn predict(config: &Config, input: &Path, output: &Path) -> anyhow::Result<()> {
    let dataset = Dataset::load_jsonl(input)
        .with_context(|| format!("failed to load dataset {}", input.display()))?;
    let encoder = load_encoder(config)?;
    let predictor = ViolationPredictor::new(config.distance_metric);

    let outcome = run_batch(&dataset, &encoder, config.batch_size, &predictor)?;

    if !outcome.omitted.is_empty() {
        tracing::warn!(
            omitted = outcome.omitted.len(),
            first = %outcome.omitted[0],
            "Some rows could not be scored (no centroid for their rule or no body)"
        );
    }

    write_submission(output, &outcome.records)?;
    tracing::info!(
        path = %output.display(),
        records = outcome.records.len(),
        embedded_texts = outcome.embedded_texts,
        rules = outcome.rules_with_centroids,
        "Submission written"
    );
    Ok(())
}

#[tokio::main]
async fn serve(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "Sentinel starting"
    );

    let encoder = tokio::task::spawn_blocking({
        let config = config.clone();
        move || load_encoder(&config)
    })
    .await??;
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(encoder);

    let app = create_router(AppState::new(provider, config));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Sentinel shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("SENTINEL_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
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
