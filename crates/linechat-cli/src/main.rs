//! Linechat CLI — entry point.
//!
//! Wires credentials → login → bulk fetch, then runs the read-eval loop
//! concurrently with the backend event listener. The binary ships with the
//! in-memory development backend; a production transport plugs in by
//! implementing `MessagingBackend`.

mod helpers;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use linechat_backend::base::MessagingBackend;
use linechat_backend::credentials::CredentialSource;
use linechat_backend::memory::MemoryBackend;
use linechat_backend::token_store::SessionTokenStore;
use linechat_client::dispatch::CommandDispatcher;
use linechat_client::events::{run_listener, EventRouter};
use linechat_client::session::SessionManager;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Linechat — terminal client for a messaging platform
#[derive(Parser)]
#[command(name = "linechat", version, about, long_about = None)]
struct Cli {
    /// Credential file (JSON: {"identifier": ..., "secret": ...}).
    /// Omit to use a saved session or an interactive prompt.
    #[arg(short, long)]
    credentials: Option<PathBuf>,

    /// Where the session token is persisted (default: ~/.linechat/)
    #[arg(long)]
    token_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    logs: bool,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let backend: Arc<dyn MessagingBackend> = Arc::new(MemoryBackend::sample());

    let source = CredentialSource::new(
        SessionTokenStore::new(cli.token_path.clone()),
        cli.credentials.clone(),
    );
    let credentials = source.resolve().context("failed to acquire credentials")?;

    let manager = SessionManager::new(backend, SessionTokenStore::new(cli.token_path));
    let session = match manager.authenticate(&credentials).await {
        Ok(session) => Arc::new(session),
        Err(e) => {
            // Auth and fetch failures are fatal to startup; report once
            // and stop before the read-eval loop.
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let router = Arc::new(EventRouter::with_default_handlers());
    let listener = tokio::spawn(run_listener(session.clone(), router));

    let dispatcher = CommandDispatcher::with_default_commands();
    repl::run(session, dispatcher).await?;

    listener.abort();
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("linechat=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
