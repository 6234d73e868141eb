//! displayd service entry point.
//!
//! Wires the session engine together and keeps it alive until a shutdown
//! signal arrives. The engine itself is synchronous; Tokio is used only for
//! signal handling and the idle loop here.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()            -- TOML config, defaults when absent
//!  └─ SessionManager::new()    -- backend + input sink + system delegate
//!  └─ serve                    -- an RPC transport embeds the manager here
//!  └─ shutdown()               -- destroy every session on exit
//! ```

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use displayd::application::session_manager::SessionManager;
use displayd::infrastructure::input::RecordingInputSink;
use displayd::infrastructure::storage::config;
use displayd::infrastructure::surface::headless::HeadlessDisplayBackend;
use displayd::infrastructure::sysops::shell::ShellDelegate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;

    // Initialise structured logging. Level comes from the config file and is
    // overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cfg.service.log_level.clone())),
        )
        .init();

    info!("displayd starting");

    let backend = Arc::new(HeadlessDisplayBackend::new(
        cfg.primary_display.width,
        cfg.primary_display.height,
        cfg.primary_display.density,
    ));
    let manager = Arc::new(SessionManager::new(
        cfg.service.max_sessions,
        backend,
        Arc::new(RecordingInputSink::new()),
        Arc::new(ShellDelegate::new(cfg.service.shell_timeout_secs)),
    ));

    info!(
        max_sessions = cfg.service.max_sessions,
        "displayd ready; waiting for transport connections"
    );

    // The RPC transport owns its own listener threads and calls straight
    // into `manager`; this task only has to wait for the shutdown signal.
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    manager.shutdown();
    info!("displayd stopped");
    Ok(())
}
