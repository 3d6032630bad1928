//! Startup helpers for the pairup binary.
//!
//! Loads configuration from the environment, builds a seeded session and
//! writes its snapshot to stdout as JSON.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::core::clock::SystemClock;
use crate::core::config::PairupConfig;
use crate::core::ids::UserId;
use crate::notifications::TracingToastSink;
use crate::seed::SeedData;
use crate::session::Session;

/// Default log filter when the configuration cannot be loaded.
const FALLBACK_FILTER: &str = "info";

/// Run the binary.
///
/// # Returns
/// `ExitCode::SUCCESS` once the snapshot is written, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    let config = PairupConfig::from_env();
    let filter = config
        .as_ref()
        .map_or(FALLBACK_FILTER, |c| c.logging.filter.as_str());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting pairup v{}", env!("CARGO_PKG_VERSION"));

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let session = match initialize(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to create session: {e:#}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = write_snapshot(&session) {
        tracing::error!("Failed to write snapshot: {e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Build the session described by `config`.
///
/// The seed comes from `seed.path` when set, else the demo set when
/// `seed.demo` is on, else the session starts empty.
///
/// # Errors
/// Returns an error if the seed file cannot be loaded or does not belong to
/// the configured user.
pub fn initialize(config: &PairupConfig) -> anyhow::Result<Session> {
    let current_user = config.session.current_user_id.unwrap_or_default();
    let seed = load_seed(config, current_user)?;

    let session = Session::with_seed(
        current_user,
        config,
        Arc::new(SystemClock),
        Arc::new(TracingToastSink),
        seed,
    )
    .with_context(|| format!("seed does not belong to user {current_user}"))?;

    tracing::info!(
        user = %current_user,
        order = %config.conversations.order,
        unread_messages = session.conversations().total_unread_messages(),
        unread_notifications = session.notifications().unread_count(),
        "Session ready"
    );
    Ok(session)
}

fn load_seed(config: &PairupConfig, current_user: UserId) -> anyhow::Result<SeedData> {
    if let Some(path) = &config.seed.path {
        tracing::info!("Loading seed from {}", path.display());
        return SeedData::from_json_file(path)
            .with_context(|| format!("failed to load seed file {}", path.display()));
    }
    if config.seed.demo {
        return Ok(SeedData::demo(
            current_user,
            &config.notifications.message_link_prefix,
        ));
    }
    Ok(SeedData::default())
}

fn write_snapshot(session: &Session) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &session.snapshot())
        .context("failed to serialize snapshot")?;
    writeln!(out).context("failed to write snapshot")?;
    Ok(())
}
