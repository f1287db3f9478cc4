//! Boosting prediction algorithm and its parameter object.
//!
//! ```no_run
//! use algobridge::{Context, Precision, PredictionBatch, PredictionMethod, Predictable};
//!
//! algobridge::init()?;
//! let ctx = Context::new()?;
//! let batch =
//!     PredictionBatch::new(&ctx, Precision::Double, PredictionMethod::DefaultDense)?;
//! batch.parameter().set_max_iterations(50)?;
//!
//! let copy = batch.clone_in(&ctx)?;
//! assert_eq!(copy.parameter().max_iterations()?, 50);
//! ctx.dispose()?;
//! # Ok::<(), algobridge::BridgeError>(())
//! ```

use crate::context::Context;
use crate::engine;
use crate::error::Result;
use crate::types::{
    ComputeMode, CountField, Handle, InputId, Precision, PredictionMethod, RealField,
};

/// Capabilities shared by prediction algorithm wrappers.
pub trait Predictable: Sized {
    fn method(&self) -> PredictionMethod;

    fn precision(&self) -> Precision;

    fn parameter(&self) -> &BoostingParameter;

    /// Allocate an independent copy of this algorithm, including its
    /// input bindings and parameter values.
    fn clone_in(&self, ctx: &Context) -> Result<Self>;
}

/// Batch prediction with a boosting model.
#[derive(Debug)]
pub struct PredictionBatch {
    handle: Handle,
    precision: Precision,
    method: PredictionMethod,
    input: PredictionInput,
    parameter: BoostingParameter,
}

impl PredictionBatch {
    pub fn new(ctx: &Context, precision: Precision, method: PredictionMethod) -> Result<Self> {
        let handle = engine::init(precision, method)?;
        Self::bind(ctx, handle, precision, method)
    }

    /// Construct from raw selectors as they arrive from a host language.
    ///
    /// The method tag is checked before the numeric type, so an
    /// unsupported method is reported even when the type is also wrong.
    pub fn from_tags(ctx: &Context, numeric_type: &str, method: i32) -> Result<Self> {
        let method = PredictionMethod::try_from(method).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected prediction method");
        })?;
        let precision = numeric_type.parse::<Precision>().inspect_err(|e| {
            tracing::warn!(error = %e, "rejected numeric type");
        })?;
        Self::new(ctx, precision, method)
    }

    /// Attach input and parameter to a freshly allocated algorithm and
    /// record it in `ctx`. On failure the algorithm is released again.
    fn bind(
        ctx: &Context,
        handle: Handle,
        precision: Precision,
        method: PredictionMethod,
    ) -> Result<Self> {
        let bound = engine::init_parameter(handle, precision, method, ComputeMode::Batch)
            .and_then(|parameter| {
                ctx.record(handle)?;
                Ok(parameter)
            });
        let parameter = match bound {
            Ok(parameter) => parameter,
            Err(e) => {
                if let Err(release_err) = engine::release(handle) {
                    tracing::warn!(%handle, error = %release_err, "could not release algorithm");
                }
                return Err(e);
            }
        };
        Ok(Self {
            handle,
            precision,
            method,
            input: PredictionInput { algorithm: handle },
            parameter: BoostingParameter::adopt(parameter),
        })
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn input(&self) -> &PredictionInput {
        &self.input
    }
}

impl Predictable for PredictionBatch {
    fn method(&self) -> PredictionMethod {
        self.method
    }

    fn precision(&self) -> Precision {
        self.precision
    }

    fn parameter(&self) -> &BoostingParameter {
        &self.parameter
    }

    fn clone_in(&self, ctx: &Context) -> Result<Self> {
        let handle = engine::clone(self.handle, self.precision, self.method)?;
        Self::bind(ctx, handle, self.precision, self.method)
    }
}

/// Input bindings of a prediction algorithm. Shares the algorithm handle.
#[derive(Debug)]
pub struct PredictionInput {
    algorithm: Handle,
}

impl PredictionInput {
    pub fn get(&self, id: InputId) -> Result<Option<Handle>> {
        engine::get_input(self.algorithm, id)
    }

    pub fn set(&self, id: InputId, value: Handle) -> Result<()> {
        engine::set_input(self.algorithm, id, value)
    }
}

/// Boosting parameters. Every accessor reads or writes the engine-side
/// object directly.
#[derive(Debug)]
pub struct BoostingParameter {
    handle: Handle,
}

impl BoostingParameter {
    /// Wrap an existing parameter object without touching its values.
    pub fn adopt(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Accuracy of the boosting algorithm.
    pub fn accuracy_threshold(&self) -> Result<f64> {
        engine::get_real(self.handle, RealField::AccuracyThreshold)
    }

    pub fn set_accuracy_threshold(&self, value: f64) -> Result<()> {
        engine::set_real(self.handle, RealField::AccuracyThreshold, value)
    }

    /// Maximal number of iterations of the boosting algorithm.
    pub fn max_iterations(&self) -> Result<u64> {
        engine::get_count(self.handle, CountField::MaxIterations)
    }

    pub fn set_max_iterations(&self, value: u64) -> Result<()> {
        engine::set_count(self.handle, CountField::MaxIterations, value)
    }

    /// Accuracy of the Newton-Raphson method used inside each round.
    pub fn newton_raphson_accuracy_threshold(&self) -> Result<f64> {
        engine::get_real(self.handle, RealField::NewtonRaphsonAccuracyThreshold)
    }

    pub fn set_newton_raphson_accuracy_threshold(&self, value: f64) -> Result<()> {
        engine::set_real(self.handle, RealField::NewtonRaphsonAccuracyThreshold, value)
    }

    pub fn newton_raphson_max_iterations(&self) -> Result<u64> {
        engine::get_count(self.handle, CountField::NewtonRaphsonMaxIterations)
    }

    pub fn set_newton_raphson_max_iterations(&self, value: u64) -> Result<()> {
        engine::set_count(self.handle, CountField::NewtonRaphsonMaxIterations, value)
    }

    /// Threshold below which a case is treated as degenerate.
    pub fn degenerate_cases_threshold(&self) -> Result<f64> {
        engine::get_real(self.handle, RealField::DegenerateCasesThreshold)
    }

    pub fn set_degenerate_cases_threshold(&self, value: f64) -> Result<()> {
        engine::set_real(self.handle, RealField::DegenerateCasesThreshold, value)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(engine::snapshot(self.handle)?.to_string())
    }
}
