//! Engine-side objects and the call surface the wrappers forward to.
//!
//! Every function here takes the registry lock once, performs one
//! operation and releases it. Nothing is cached on the wrapper side: a
//! getter always reads the value stored in the table.

use serde::Serialize;
use serde_json::Value;

use crate::error::{BridgeError, Result};
use crate::registry::{self, HandleTable};
use crate::types::{
    ComputeMode, CountField, Handle, InputId, Precision, PredictionMethod, RealField,
};

/// Settings of the boosting predictor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoostingSettings {
    pub accuracy_threshold: f64,
    pub max_iterations: u64,
    pub newton_raphson_accuracy_threshold: f64,
    pub newton_raphson_max_iterations: u64,
    pub degenerate_cases_threshold: f64,
}

impl Default for BoostingSettings {
    fn default() -> Self {
        Self {
            accuracy_threshold: 0.3,
            max_iterations: 10,
            newton_raphson_accuracy_threshold: 1.0e-3,
            newton_raphson_max_iterations: 100,
            degenerate_cases_threshold: 1.0e-2,
        }
    }
}

/// Settings of a fully-connected layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LayerSettings {
    pub n_outputs: u64,
    pub dim: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictionState {
    pub precision: Precision,
    pub method: PredictionMethod,
    pub data: Option<Handle>,
    pub model: Option<Handle>,
    /// Allocated on the first `init_parameter` call.
    pub parameter: Option<Handle>,
}

impl PredictionState {
    fn new(precision: Precision, method: PredictionMethod) -> Self {
        Self {
            precision,
            method,
            data: None,
            model: None,
            parameter: None,
        }
    }

    fn check(&self, handle: Handle, precision: Precision, method: PredictionMethod) -> Result<()> {
        if self.precision != precision || self.method != method {
            return Err(BridgeError::InvalidConfiguration(format!(
                "algorithm {handle} is {:?}/{:?}, not {precision:?}/{method:?}",
                self.precision, self.method
            )));
        }
        Ok(())
    }

    fn input(&self, id: InputId) -> Option<Handle> {
        match id {
            InputId::Data => self.data,
            InputId::Model => self.model,
        }
    }

    fn slot(&mut self, id: InputId) -> &mut Option<Handle> {
        match id {
            InputId::Data => &mut self.data,
            InputId::Model => &mut self.model,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum NativeObject {
    Prediction(PredictionState),
    Boosting {
        owner: Handle,
        settings: BoostingSettings,
    },
    Layer(LayerSettings),
}

impl NativeObject {
    fn kind(&self) -> &'static str {
        match self {
            NativeObject::Prediction(_) => "prediction algorithm",
            NativeObject::Boosting { .. } => "boosting parameter",
            NativeObject::Layer(_) => "layer parameter",
        }
    }
}

fn prediction(table: &HandleTable, handle: Handle) -> Result<&PredictionState> {
    match table.get(handle)? {
        NativeObject::Prediction(state) => Ok(state),
        _ => Err(BridgeError::WrongObject {
            handle: handle.raw(),
            expected: "prediction algorithm",
        }),
    }
}

fn prediction_mut(table: &mut HandleTable, handle: Handle) -> Result<&mut PredictionState> {
    match table.get_mut(handle)? {
        NativeObject::Prediction(state) => Ok(state),
        _ => Err(BridgeError::WrongObject {
            handle: handle.raw(),
            expected: "prediction algorithm",
        }),
    }
}

fn unknown_field(name: &str, object: &NativeObject) -> BridgeError {
    BridgeError::UnknownField(format!("{name} on {}", object.kind()))
}

// ==================== Prediction algorithm ====================

/// Allocate a prediction algorithm object.
pub fn init(precision: Precision, method: PredictionMethod) -> Result<Handle> {
    let handle = registry::with_table(|table| {
        table.insert(NativeObject::Prediction(PredictionState::new(
            precision, method,
        )))
    })?;
    tracing::debug!(%handle, %precision, ?method, "allocated prediction algorithm");
    Ok(handle)
}

/// Return the parameter sub-object of `algorithm`, allocating it on the
/// first call. Prediction parameters only exist for batch mode.
pub fn init_parameter(
    algorithm: Handle,
    precision: Precision,
    method: PredictionMethod,
    mode: ComputeMode,
) -> Result<Handle> {
    if mode != ComputeMode::Batch {
        return Err(BridgeError::InvalidConfiguration(format!(
            "compute mode {mode:?} unsupported for prediction"
        )));
    }
    registry::with_table(|table| {
        let state = prediction(table, algorithm)?;
        state.check(algorithm, precision, method)?;
        if let Some(parameter) = state.parameter {
            return Ok(parameter);
        }
        let parameter = table.insert(NativeObject::Boosting {
            owner: algorithm,
            settings: BoostingSettings::default(),
        })?;
        prediction_mut(table, algorithm)?.parameter = Some(parameter);
        tracing::debug!(%algorithm, %parameter, "allocated boosting parameter");
        Ok(parameter)
    })
}

/// Deep-duplicate `algorithm`: input bindings are copied and the
/// parameter sub-object, if any, is duplicated into a new handle owned by
/// the copy.
pub fn clone(algorithm: Handle, precision: Precision, method: PredictionMethod) -> Result<Handle> {
    registry::with_table(|table| {
        let source = prediction(table, algorithm)?;
        source.check(algorithm, precision, method)?;

        let mut copy = source.clone();
        copy.parameter = None;
        let settings = match source.parameter {
            Some(parameter) => match table.get(parameter)? {
                NativeObject::Boosting { settings, .. } => Some(settings.clone()),
                _ => None,
            },
            None => None,
        };

        let duplicate = table.insert(NativeObject::Prediction(copy))?;
        if let Some(settings) = settings {
            match table.insert(NativeObject::Boosting {
                owner: duplicate,
                settings,
            }) {
                Ok(parameter) => prediction_mut(table, duplicate)?.parameter = Some(parameter),
                Err(e) => {
                    table.remove(duplicate)?;
                    return Err(e);
                }
            }
        }
        tracing::debug!(source = %algorithm, %duplicate, "cloned prediction algorithm");
        Ok(duplicate)
    })
}

pub fn precision_of(algorithm: Handle) -> Result<Precision> {
    registry::with_table(|table| Ok(prediction(table, algorithm)?.precision))
}

pub fn get_input(algorithm: Handle, id: InputId) -> Result<Option<Handle>> {
    registry::with_table(|table| Ok(prediction(table, algorithm)?.input(id)))
}

pub fn set_input(algorithm: Handle, id: InputId, value: Handle) -> Result<()> {
    registry::with_table(|table| {
        *prediction_mut(table, algorithm)?.slot(id) = Some(value);
        Ok(())
    })
}

// ==================== Layer parameter ====================

/// Allocate a fully-connected layer parameter. Values are stored as
/// given; range checks belong to the layer computation.
pub fn init_layer_parameter(n_outputs: u64, dim: u64) -> Result<Handle> {
    let handle = registry::with_table(|table| {
        table.insert(NativeObject::Layer(LayerSettings { n_outputs, dim }))
    })?;
    tracing::debug!(%handle, n_outputs, dim, "allocated layer parameter");
    Ok(handle)
}

// ==================== Field access ====================

pub fn get_count(handle: Handle, field: CountField) -> Result<u64> {
    registry::with_table(|table| {
        let object = table.get(handle)?;
        match (object, field) {
            (NativeObject::Layer(s), CountField::NOutputs) => Ok(s.n_outputs),
            (NativeObject::Layer(s), CountField::Dim) => Ok(s.dim),
            (NativeObject::Boosting { settings, .. }, CountField::MaxIterations) => {
                Ok(settings.max_iterations)
            }
            (NativeObject::Boosting { settings, .. }, CountField::NewtonRaphsonMaxIterations) => {
                Ok(settings.newton_raphson_max_iterations)
            }
            (object, field) => Err(unknown_field(field.name(), object)),
        }
    })
}

pub fn set_count(handle: Handle, field: CountField, value: u64) -> Result<()> {
    registry::with_table(|table| {
        let object = table.get_mut(handle)?;
        let kind = object.kind();
        let slot = match (object, field) {
            (NativeObject::Layer(s), CountField::NOutputs) => &mut s.n_outputs,
            (NativeObject::Layer(s), CountField::Dim) => &mut s.dim,
            (NativeObject::Boosting { settings, .. }, CountField::MaxIterations) => {
                &mut settings.max_iterations
            }
            (NativeObject::Boosting { settings, .. }, CountField::NewtonRaphsonMaxIterations) => {
                &mut settings.newton_raphson_max_iterations
            }
            (_, field) => {
                return Err(BridgeError::UnknownField(format!("{} on {kind}", field.name())))
            }
        };
        *slot = value;
        Ok(())
    })
}

pub fn get_real(handle: Handle, field: RealField) -> Result<f64> {
    registry::with_table(|table| match table.get(handle)? {
        NativeObject::Boosting { settings, .. } => Ok(match field {
            RealField::AccuracyThreshold => settings.accuracy_threshold,
            RealField::NewtonRaphsonAccuracyThreshold => {
                settings.newton_raphson_accuracy_threshold
            }
            RealField::DegenerateCasesThreshold => settings.degenerate_cases_threshold,
        }),
        object => Err(unknown_field(field.name(), object)),
    })
}

pub fn set_real(handle: Handle, field: RealField, value: f64) -> Result<()> {
    registry::with_table(|table| match table.get_mut(handle)? {
        NativeObject::Boosting { settings, .. } => {
            let slot = match field {
                RealField::AccuracyThreshold => &mut settings.accuracy_threshold,
                RealField::NewtonRaphsonAccuracyThreshold => {
                    &mut settings.newton_raphson_accuracy_threshold
                }
                RealField::DegenerateCasesThreshold => &mut settings.degenerate_cases_threshold,
            };
            *slot = value;
            Ok(())
        }
        object => Err(unknown_field(field.name(), object)),
    })
}

// ==================== Lifecycle ====================

/// Free `handle`. Releasing an algorithm also frees its parameter
/// sub-object; a parameter whose algorithm is alive cannot be released
/// on its own.
pub fn release(handle: Handle) -> Result<()> {
    registry::with_table(|table| {
        if let NativeObject::Boosting { owner, .. } = table.get(handle)? {
            if table.get(*owner).is_ok() {
                return Err(BridgeError::OwnedByAlgorithm {
                    handle: handle.raw(),
                    owner: owner.raw(),
                });
            }
        }
        if let NativeObject::Prediction(state) = table.remove(handle)? {
            if let Some(parameter) = state.parameter {
                table.remove(parameter)?;
            }
        }
        tracing::debug!(%handle, "released");
        Ok(())
    })
}

/// JSON view of the object behind `handle`.
pub fn snapshot(handle: Handle) -> Result<Value> {
    let value = registry::with_table(|table| {
        Ok(match table.get(handle)? {
            NativeObject::Prediction(state) => serde_json::to_value(state)?,
            NativeObject::Boosting { settings, .. } => serde_json::to_value(settings)?,
            NativeObject::Layer(settings) => serde_json::to_value(settings)?,
        })
    })?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        registry::init_registry(None).unwrap();
    }

    fn dense_parameter(alg: Handle, precision: Precision, mode: ComputeMode) -> Result<Handle> {
        init_parameter(alg, precision, PredictionMethod::DefaultDense, mode)
    }

    #[test]
    fn reading_inputs_leaves_slots_unchanged() {
        setup();
        let alg = init(Precision::Single, PredictionMethod::DefaultDense).unwrap();
        assert_eq!(get_input(alg, InputId::Model).unwrap(), None);
        let model = Handle::from_raw(9_000_002).unwrap();
        set_input(alg, InputId::Model, model).unwrap();
        assert_eq!(get_input(alg, InputId::Model).unwrap(), Some(model));
        assert_eq!(get_input(alg, InputId::Model).unwrap(), Some(model));
        assert_eq!(get_input(alg, InputId::Data).unwrap(), None);
        release(alg).unwrap();
    }

    #[test]
    fn parameter_sub_object_is_allocated_once() {
        setup();
        let alg = init(Precision::Double, PredictionMethod::DefaultDense).unwrap();
        let p1 = dense_parameter(alg, Precision::Double, ComputeMode::Batch).unwrap();
        let p2 = dense_parameter(alg, Precision::Double, ComputeMode::Batch).unwrap();
        assert_eq!(p1, p2);
        assert_ne!(p1, alg);
        release(alg).unwrap();
    }

    #[test]
    fn parameter_requires_batch_mode_and_matching_precision() {
        setup();
        let alg = init(Precision::Single, PredictionMethod::DefaultDense).unwrap();
        let online = dense_parameter(alg, Precision::Single, ComputeMode::Online);
        assert!(matches!(online, Err(BridgeError::InvalidConfiguration(_))));
        let mismatched = dense_parameter(alg, Precision::Double, ComputeMode::Batch);
        assert!(matches!(mismatched, Err(BridgeError::InvalidConfiguration(_))));
        release(alg).unwrap();
    }

    #[test]
    fn fields_belong_to_one_object_kind() {
        setup();
        let layer = init_layer_parameter(4, 1).unwrap();
        assert!(matches!(
            get_count(layer, CountField::MaxIterations),
            Err(BridgeError::UnknownField(_))
        ));
        assert!(matches!(
            set_real(layer, RealField::AccuracyThreshold, 0.5),
            Err(BridgeError::UnknownField(_))
        ));
        assert!(matches!(
            get_input(layer, InputId::Data),
            Err(BridgeError::WrongObject { .. })
        ));
        release(layer).unwrap();
    }

    #[test]
    fn owned_parameter_is_released_with_its_algorithm() {
        setup();
        let alg = init(Precision::Double, PredictionMethod::DefaultDense).unwrap();
        let param = dense_parameter(alg, Precision::Double, ComputeMode::Batch).unwrap();
        assert!(matches!(release(param), Err(BridgeError::OwnedByAlgorithm { .. })));
        release(alg).unwrap();
        assert!(!registry::contains(param).unwrap());
        assert!(matches!(release(alg), Err(BridgeError::InvalidHandle(_))));
    }

    #[test]
    fn clone_copies_inputs_and_settings_into_new_handles() {
        setup();
        let alg = init(Precision::Double, PredictionMethod::DefaultDense).unwrap();
        let param = dense_parameter(alg, Precision::Double, ComputeMode::Batch).unwrap();
        let data = Handle::from_raw(9_000_001).unwrap();
        set_input(alg, InputId::Data, data).unwrap();
        set_count(param, CountField::MaxIterations, 25).unwrap();

        let copy = clone(alg, Precision::Double, PredictionMethod::DefaultDense).unwrap();
        let copy_param = dense_parameter(copy, Precision::Double, ComputeMode::Batch).unwrap();
        assert_ne!(copy_param, param);
        assert_eq!(get_input(copy, InputId::Data).unwrap(), Some(data));
        assert_eq!(get_count(copy_param, CountField::MaxIterations).unwrap(), 25);

        set_count(copy_param, CountField::MaxIterations, 3).unwrap();
        assert_eq!(get_count(param, CountField::MaxIterations).unwrap(), 25);

        release(alg).unwrap();
        release(copy).unwrap();
    }

    #[test]
    fn snapshot_of_layer_lists_both_fields() {
        setup();
        let layer = init_layer_parameter(10, 2).unwrap();
        let json = snapshot(layer).unwrap();
        assert_eq!(json["n_outputs"], 10);
        assert_eq!(json["dim"], 2);
        release(layer).unwrap();
    }
}
