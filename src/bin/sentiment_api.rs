//! Sentiment API CLI binary.
//!
//! # Commands
//!
//! - `serve` - Start the HTTP prediction server
//! - `predict` - Classify a single text from an argument or stdin

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sentiment::{
    config::Config,
    server::{create_router, AppState, ServerConfig},
    SentimentService, VERSION,
};

#[derive(Parser)]
#[command(name = "sentiment-api")]
#[command(version = VERSION)]
#[command(about = "Binary sentiment classification over HTTP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP prediction server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Bind to all interfaces
        #[arg(long)]
        bind_all: bool,

        /// Artifact bundle root directory
        #[arg(short, long)]
        model_dir: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Load artifacts at startup instead of on first request
        #[arg(long)]
        preload: bool,

        /// Disable CORS
        #[arg(long)]
        no_cors: bool,

        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Classify a single text (or - for stdin)
    Predict {
        /// Text to classify (or - for stdin)
        input: Option<String>,

        /// Artifact bundle root directory
        #[arg(short, long)]
        model_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            host,
            bind_all,
            model_dir,
            config,
            preload,
            no_cors,
            verbose,
        } => cmd_serve(
            port, &host, bind_all, model_dir, config, preload, no_cors, verbose,
        ),

        Commands::Predict {
            input,
            model_dir,
            json,
        } => cmd_predict(input, model_dir, json),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_serve(
    port: u16,
    host: &str,
    bind_all: bool,
    model_dir: Option<PathBuf>,
    config_file: Option<PathBuf>,
    preload: bool,
    no_cors: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    // Initialize logging
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    // File config and env vars first, CLI flags on top
    let base = match config_file {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env(),
    };

    let addr: std::net::SocketAddr = format!("{host}:{port}").parse()?;
    let mut config = ServerConfig::default()
        .with_addr(addr)
        .with_model(base.model);

    if bind_all {
        config = config.bind_all();
    }
    if let Some(dir) = model_dir {
        config.model.root = dir;
    }
    if preload {
        config = config.with_preload();
    }
    if no_cors {
        config = config.without_cors();
    }

    // Create state and router
    let state = Arc::new(AppState::new(config.clone()));

    if config.preload {
        tracing::info!("preloading artifacts");
        state.service.initialize()?;
    }

    let app = create_router(Arc::clone(&state));

    tracing::info!("Starting sentiment API server on {}", config.addr);
    tracing::info!(model_dir = %config.model.root.display(), "artifact bundle");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(config.addr).await?;
        axum::serve(listener, app).await?;
        Ok::<_, anyhow::Error>(())
    })
}

fn cmd_predict(input: Option<String>, model_dir: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let text = read_input(input)?;

    let mut config = Config::from_env();
    if let Some(dir) = model_dir {
        config.model.root = dir;
    }

    let service = SentimentService::new(config.model);
    let prediction = service.predict(&text)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "text": text,
                "sentiment": prediction.label,
                "confidence": prediction.confidence,
            })
        );
    } else {
        println!("{} ({:.4})", prediction.label, prediction.confidence);
    }

    Ok(())
}

fn read_input(input: Option<String>) -> anyhow::Result<String> {
    match input {
        Some(text) if text != "-" => Ok(text),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer.trim_end().to_string())
        },
    }
}
