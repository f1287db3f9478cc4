//! Fully-connected layer parameter accessor.

use crate::context::Context;
use crate::engine;
use crate::error::Result;
use crate::types::{CountField, Handle};

/// Parameters of a fully-connected layer: output count and the
/// dimension along which the layer propagates.
#[derive(Debug)]
pub struct FullyConnectedParameter {
    handle: Handle,
}

impl FullyConnectedParameter {
    /// Allocate a parameter object holding `n_outputs` and `dim`.
    pub fn new(ctx: &Context, n_outputs: u64, dim: u64) -> Result<Self> {
        let handle = engine::init_layer_parameter(n_outputs, dim)?;
        ctx.record(handle)?;
        Ok(Self { handle })
    }

    /// Wrap a parameter object produced elsewhere. Its values are left as
    /// they are and the handle is not recorded in any context.
    pub fn adopt(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn n_outputs(&self) -> Result<u64> {
        engine::get_count(self.handle, CountField::NOutputs)
    }

    pub fn set_n_outputs(&self, n_outputs: u64) -> Result<()> {
        engine::set_count(self.handle, CountField::NOutputs, n_outputs)
    }

    pub fn dim(&self) -> Result<u64> {
        engine::get_count(self.handle, CountField::Dim)
    }

    pub fn set_dim(&self, dim: u64) -> Result<()> {
        engine::set_count(self.handle, CountField::Dim, dim)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(engine::snapshot(self.handle)?.to_string())
    }
}
