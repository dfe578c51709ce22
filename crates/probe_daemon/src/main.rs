//! HTTP daemon serving the probe-builder wizard to a browser client.

mod driver;
mod routes;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use probe_core::Session;
use probe_outcome::{GenerativeClient, OutcomeBackend, ScriptedBackend};
use probe_world::{load_content, JsonFileStore};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use state::{AppState, PhaseTimers, SimState};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "probe_daemon", about = "Phobos Probe Builder daemon")]
struct Cli {
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, default_value = "./content")]
    content_dir: String,
    /// Where the draft configuration is persisted between sessions.
    #[arg(long, default_value = "./saves/mission_config.json")]
    save_path: String,
    /// Seed for the catalog RNG; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
    /// Serve canned outcomes instead of calling the generative service.
    #[arg(long)]
    offline: bool,
    /// Environment variable holding the generative-service API key.
    #[arg(long, default_value = "GEMINI_API_KEY")]
    api_key_env: String,
}

fn make_backend(cli: &Cli) -> OutcomeBackend {
    if cli.offline {
        return OutcomeBackend::Scripted(ScriptedBackend::default());
    }
    match std::env::var(&cli.api_key_env) {
        Ok(key) if !key.is_empty() => OutcomeBackend::Generative(GenerativeClient::new(key)),
        _ => {
            tracing::warn!(
                "{} is not set; falling back to scripted outcomes",
                cli.api_key_env,
            );
            OutcomeBackend::Scripted(ScriptedBackend::default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let content = load_content(&cli.content_dir)?;
    let seed = cli.seed.unwrap_or_else(rand::random);
    let rng = ChaCha8Rng::seed_from_u64(seed);

    let store = JsonFileStore::new(&cli.save_path);
    let session = Session::restore(&content, seed, &store);
    tracing::info!(
        seed,
        content_version = %content.content_version,
        restored_draft = session.config.selected_parts().len(),
        "session ready",
    );

    let (event_tx, _) = tokio::sync::broadcast::channel(256);
    let app_state = AppState {
        sim: Arc::new(Mutex::new(SimState {
            session,
            content,
            rng,
            store,
            timers: PhaseTimers::default(),
        })),
        event_tx,
        backend: Arc::new(make_backend(&cli)),
    };

    tokio::spawn(driver::run_driver(app_state.clone()));

    let router = routes::make_router_with_cors(app_state, &cli.cors_origin);
    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, router).await.context("serving")?;
    Ok(())
}
