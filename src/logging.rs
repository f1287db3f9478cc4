//! Optional tracing subscriber for hosts that do not install their own.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{BridgeError, Result};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Install a stderr subscriber filtered by `filter`.
///
/// Subsequent calls are no-ops. Fails if the filter does not parse or if
/// the host already set a global subscriber.
pub fn init(filter: &str) -> Result<()> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let env_filter =
        EnvFilter::try_new(filter).map_err(|e| BridgeError::Config(format!("log filter: {e}")))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(env_filter)
        .try_init()
        .map_err(|e| BridgeError::Config(format!("tracing subscriber: {e}")))?;
    let _ = INSTALLED.set(());
    Ok(())
}
