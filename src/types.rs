//! Selectors shared by the wrappers, the engine and the C ABI.
//!
//! Every enum carries an explicit `i32` discriminant: that value is what
//! crosses the C boundary. Raw tags are parsed with `TryFrom<i32>` (or
//! `FromStr` for numeric-type names) and anything outside the accepted
//! set is an invalid configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Opaque identifier of an engine-side object.
///
/// Handles start at 1 and increase monotonically. `0` is reserved as the
/// null/error sentinel at the C boundary and never names an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(isize);

impl Handle {
    /// Wrap a raw handle value. Returns `None` for the `0` sentinel.
    pub fn from_raw(raw: isize) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// Raw value as passed across the C boundary.
    pub fn raw(self) -> isize {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Numeric type used by the engine-side computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum Precision {
    Single = 0,
    Double = 1,
}

impl Precision {
    pub fn value(self) -> i32 {
        self as i32
    }

    /// Name of the numeric type this precision is selected with.
    pub fn type_name(self) -> &'static str {
        match self {
            Precision::Single => "float",
            Precision::Double => "double",
        }
    }
}

impl TryFrom<i32> for Precision {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Precision::Single),
            1 => Ok(Precision::Double),
            other => Err(BridgeError::InvalidConfiguration(format!(
                "precision {other} unsupported"
            ))),
        }
    }
}

/// Accepts exactly `"float"` and `"double"`.
impl FromStr for Precision {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float" => Ok(Precision::Single),
            "double" => Ok(Precision::Double),
            other => Err(BridgeError::InvalidConfiguration(format!(
                "type '{other}' unsupported"
            ))),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Prediction method of the boosting predictor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum PredictionMethod {
    DefaultDense = 0,
}

impl PredictionMethod {
    pub fn value(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for PredictionMethod {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PredictionMethod::DefaultDense),
            other => Err(BridgeError::InvalidConfiguration(format!(
                "method {other} unsupported"
            ))),
        }
    }
}

/// Computation mode a parameter object is produced for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum ComputeMode {
    Batch = 0,
    Online = 1,
    Distributed = 2,
}

impl ComputeMode {
    pub fn value(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for ComputeMode {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ComputeMode::Batch),
            1 => Ok(ComputeMode::Online),
            2 => Ok(ComputeMode::Distributed),
            other => Err(BridgeError::InvalidConfiguration(format!(
                "compute mode {other} unsupported"
            ))),
        }
    }
}

/// Integral configuration fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CountField {
    /// Fully-connected layer: number of outputs.
    NOutputs = 0,
    /// Fully-connected layer: dimension along which the layer propagates.
    Dim = 1,
    /// Boosting: maximum number of boosting iterations.
    MaxIterations = 2,
    /// Boosting: maximum Newton-Raphson iterations per boosting round.
    NewtonRaphsonMaxIterations = 3,
}

impl CountField {
    pub fn name(self) -> &'static str {
        match self {
            CountField::NOutputs => "n_outputs",
            CountField::Dim => "dim",
            CountField::MaxIterations => "max_iterations",
            CountField::NewtonRaphsonMaxIterations => "newton_raphson_max_iterations",
        }
    }
}

impl TryFrom<i32> for CountField {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CountField::NOutputs),
            1 => Ok(CountField::Dim),
            2 => Ok(CountField::MaxIterations),
            3 => Ok(CountField::NewtonRaphsonMaxIterations),
            other => Err(BridgeError::UnknownField(format!("count field {other}"))),
        }
    }
}

/// Real-valued configuration fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RealField {
    AccuracyThreshold = 0,
    NewtonRaphsonAccuracyThreshold = 1,
    DegenerateCasesThreshold = 2,
}

impl RealField {
    pub fn name(self) -> &'static str {
        match self {
            RealField::AccuracyThreshold => "accuracy_threshold",
            RealField::NewtonRaphsonAccuracyThreshold => "newton_raphson_accuracy_threshold",
            RealField::DegenerateCasesThreshold => "degenerate_cases_threshold",
        }
    }
}

impl TryFrom<i32> for RealField {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RealField::AccuracyThreshold),
            1 => Ok(RealField::NewtonRaphsonAccuracyThreshold),
            2 => Ok(RealField::DegenerateCasesThreshold),
            other => Err(BridgeError::UnknownField(format!("real field {other}"))),
        }
    }
}

/// Input slots of a prediction algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum InputId {
    /// Observations to predict for.
    Data = 0,
    /// Trained model to predict with.
    Model = 1,
}

impl TryFrom<i32> for InputId {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(InputId::Data),
            1 => Ok(InputId::Model),
            other => Err(BridgeError::UnknownInput(other)),
        }
    }
}
