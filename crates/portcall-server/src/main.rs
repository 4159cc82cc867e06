//! portcall server binary.
//!
//! - Config: `$PORTCALL_CONFIG`, else `portcall.yaml` (defaults if absent)
//! - Host: newline-delimited request JSON on stdin, responses on stdout
//! - Logs go to stderr; filter with `RUST_LOG`

use tracing_subscriber::{fmt, EnvFilter};

use portcall_core::error::Result;
use portcall_server::{app_state, config, transport};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cfg = match std::env::var_os("PORTCALL_CONFIG") {
        Some(path) => config::load_from_file(path)?,
        None => config::load_or_default(config::DEFAULT_CONFIG_PATH)?,
    };

    let state = app_state::AppState::new(cfg)?;
    tracing::info!(
        request_port = state.cfg().server.request_port,
        response_port = state.cfg().server.response_port,
        "portcall-server starting"
    );

    transport::stdio::run(&state).await
}
