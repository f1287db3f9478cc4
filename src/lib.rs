//! algobridge: typed handle wrappers over an opaque numerical-algorithm engine.
//!
//! Every wrapper owns one integer handle into a process-wide registry and
//! forwards each accessor to the engine-side object behind it:
//!
//! - [`PredictionBatch`]: boosting prediction bound to a [`Precision`] and
//!   a [`PredictionMethod`], with an input binding and a parameter object
//! - [`FullyConnectedParameter`]: output count and dimension of a
//!   fully-connected layer
//!
//! The same engine is exported as a C ABI (`ab_*` in [`ffi`]) and, with
//! the `python` feature, as a Python extension module.
//!
//! The host calls [`init`] once before creating a [`Context`].

pub mod boosting;
pub mod config;
pub mod context;
pub mod convert;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod layers;
pub mod logging;
#[cfg(feature = "python")]
pub mod python;
pub mod registry;
pub mod types;

pub use boosting::{BoostingParameter, Predictable, PredictionBatch, PredictionInput};
pub use config::BridgeConfig;
pub use context::Context;
pub use error::{BridgeError, Result};
pub use layers::FullyConnectedParameter;
pub use types::{ComputeMode, CountField, Handle, InputId, Precision, PredictionMethod, RealField};

/// Initialise the runtime with configuration read from the environment.
///
/// Idempotent: once the registry exists further calls change nothing.
pub fn init() -> Result<()> {
    init_with(&BridgeConfig::from_env()?)
}

/// Initialise the runtime with an explicit configuration.
pub fn init_with(config: &BridgeConfig) -> Result<()> {
    if let Some(filter) = &config.log_filter {
        logging::init(filter)?;
    }
    if registry::init_registry(config.max_handles)? {
        tracing::debug!(max_handles = ?config.max_handles, "runtime initialized");
    }
    Ok(())
}

/// Drop every engine-side object. Returns how many were live.
pub fn shutdown() -> Result<usize> {
    let dropped = registry::destroy_registry()?;
    tracing::debug!(dropped, "runtime shut down");
    Ok(dropped)
}
