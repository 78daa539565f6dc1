use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use chatgate::{
    build_router, AdmissionGate, AppState, CompletionClient, CounterStore, InMemoryCounterStore,
    MockCompletionClient, OpenAiClient, RedisCounterStore, RelayChatUseCase, DEFAULT_MAX_REQUESTS,
    DEFAULT_WINDOW,
};

const DEFAULT_PORT: u16 = 8787;
const DEFAULT_WINDOW_SECS: u64 = DEFAULT_WINDOW.as_secs();

#[derive(Parser)]
#[command(name = "chatgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    verbose: bool,

    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Redis URL for the shared quota counter. Falls back to $REDIS_URL,
    /// then to an in-process counter.
    #[arg(long)]
    redis_url: Option<String>,

    /// Upstream calls admitted per quota window.
    #[arg(long, default_value_t = DEFAULT_MAX_REQUESTS)]
    max_requests: u64,

    /// Quota window length in seconds.
    #[arg(long, default_value_t = DEFAULT_WINDOW_SECS)]
    window_secs: u64,

    /// Serve canned replies instead of calling the real upstream.
    #[arg(long)]
    mock_upstream: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let redis_url = cli
        .redis_url
        .clone()
        .or_else(|| std::env::var("REDIS_URL").ok());
    let store: Arc<dyn CounterStore> = match redis_url {
        Some(url) => {
            // A configured store that cannot be reached is fatal: quietly
            // running without the shared counter would let every replica
            // hand out its own quota.
            let store = RedisCounterStore::connect(&url).await?;
            info!("Using Redis counter store at {}", url);
            Arc::new(store)
        }
        None => {
            warn!("No Redis URL configured; quota is tracked in-process and not shared across replicas");
            Arc::new(InMemoryCounterStore::new())
        }
    };

    let client: Arc<dyn CompletionClient> = if cli.mock_upstream {
        info!("Using mock completion client");
        Arc::new(MockCompletionClient::new())
    } else {
        let client = OpenAiClient::from_env()?;
        info!(
            "Forwarding completions to {} (model {})",
            client.base_url(),
            client.model()
        );
        Arc::new(client)
    };

    let window = Duration::from_secs(cli.window_secs);
    let gate = AdmissionGate::new(store, cli.max_requests, window);
    info!(
        "Admitting up to {} requests per {}s window",
        cli.max_requests, cli.window_secs
    );

    let relay = Arc::new(RelayChatUseCase::new(gate, client));
    let app = build_router(AppState::new(relay));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", cli.host, cli.port)).await?;
    info!("Chat gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
