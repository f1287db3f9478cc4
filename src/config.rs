//! Runtime configuration read by [`crate::init_with`].
//!
//! Hosts either build a [`BridgeConfig`] directly, pass JSON through
//! `ab_init_json`, or rely on the environment:
//!
//! - `ALGOBRIDGE_LOG`: tracing filter directive, e.g. `algobridge=debug`
//! - `ALGOBRIDGE_MAX_HANDLES`: upper bound on live handles

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

pub const LOG_ENV: &str = "ALGOBRIDGE_LOG";
pub const MAX_HANDLES_ENV: &str = "ALGOBRIDGE_MAX_HANDLES";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Install a tracing subscriber with this filter. `None` leaves
    /// subscriber setup to the host.
    pub log_filter: Option<String>,
    /// Allocation fails once this many handles are live.
    pub max_handles: Option<usize>,
}

impl BridgeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BridgeError::Config(e.to_string()))
    }

    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let max_handles = match var(MAX_HANDLES_ENV) {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|e| {
                BridgeError::Config(format!("{MAX_HANDLES_ENV}={raw}: {e}"))
            })?),
            None => None,
        };
        Ok(Self {
            log_filter: var(LOG_ENV).filter(|s| !s.trim().is_empty()),
            max_handles,
        })
    }
}
