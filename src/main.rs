use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use sentiment_ops::core::config;
use sentiment_ops::pipelines::SentimentAnalysisPipelineBuilder;
use sentiment_ops::server::{self, AppState};
use sentiment_ops::training::{self, Stage};

/// Sentiment model pipeline and inference service.
#[derive(Debug, Parser)]
#[command(name = "sentiment-ops", version, about)]
struct Cli {
    /// Settings file; defaults to `config/settings.{toml,yaml,json}` when present.
    #[arg(global = true, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download or read the labelled dataset and split it into train/test.
    Ingest,
    /// Normalize the raw train/test text.
    Preprocess,
    /// Fit the vectorizer and write feature matrices.
    Features,
    /// Train the logistic-regression classifier.
    Train,
    /// Score the trained model on the test features.
    Evaluate,
    /// Register the evaluated model and move it to Staging.
    Register,
    /// Move the newest registered version to Production.
    Promote,
    /// Run the HTTP inference service.
    Serve,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_target(false).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("Tracing subscriber already set; skipping re-initialization.");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_from(cli.config.as_deref()).context("failed to load configuration")?;

    let stage = match cli.command {
        Commands::Ingest => Stage::Ingest,
        Commands::Preprocess => Stage::Preprocess,
        Commands::Features => Stage::Features,
        Commands::Train => Stage::Train,
        Commands::Evaluate => Stage::Evaluate,
        Commands::Register => Stage::Register,
        Commands::Promote => Stage::Promote,
        Commands::Serve => return serve(&cfg),
    };
    training::run_stage(stage, &cfg).with_context(|| format!("{} stage failed", stage.name()))
}

fn serve(cfg: &config::AppConfig) -> anyhow::Result<()> {
    // Loading may hit the network (hub registry), so it happens before the
    // runtime starts.
    let pipeline = SentimentAnalysisPipelineBuilder::from_config(&cfg.model).build();
    let state = AppState::new(pipeline);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    runtime
        .block_on(server::serve(&cfg.server.listen_addr, state))
        .context("inference service failed")
}
