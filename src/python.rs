//! Python bindings.
//!
//! ```python
//! import algobridge
//!
//! ctx = algobridge.Context()
//! batch = algobridge.PredictionBatch(ctx, "double")
//! batch.parameter.max_iterations = 50
//! copy = batch.clone(ctx)
//!
//! fc = algobridge.FullyConnectedParameter(ctx, n_outputs=10, dim=1)
//! fc.dim = 2
//! ctx.dispose()
//! ```

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::boosting::{BoostingParameter, Predictable, PredictionBatch};
use crate::context::Context;
use crate::error::BridgeError;
use crate::layers::FullyConnectedParameter;
use crate::types::{Handle, InputId};

impl From<BridgeError> for PyErr {
    fn from(err: BridgeError) -> PyErr {
        match &err {
            BridgeError::InvalidConfiguration(_)
            | BridgeError::InvalidArgument(_)
            | BridgeError::UnknownField(_)
            | BridgeError::UnknownInput(_) => PyValueError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

fn handle(raw: isize) -> PyResult<Handle> {
    Ok(Handle::from_raw(raw).ok_or(BridgeError::InvalidHandle(raw))?)
}

#[pyclass(name = "Context")]
pub struct PyContext {
    inner: Context,
}

#[pymethods]
impl PyContext {
    /// Create a context, initialising the runtime on first use.
    #[new]
    fn new() -> PyResult<Self> {
        crate::init()?;
        Ok(Self {
            inner: Context::new()?,
        })
    }

    /// Release every handle allocated through this context.
    fn dispose(&self) -> PyResult<usize> {
        Ok(self.inner.dispose()?)
    }

    fn release(&self, raw: isize) -> PyResult<()> {
        Ok(self.inner.release(handle(raw)?)?)
    }
}

#[pyclass(name = "PredictionBatch")]
pub struct PyPredictionBatch {
    inner: PredictionBatch,
}

#[pymethods]
impl PyPredictionBatch {
    /// `dtype` is `"float"` or `"double"`; `method` 0 is default dense.
    #[new]
    #[pyo3(signature = (context, dtype = "double", method = 0))]
    fn new(context: PyRef<'_, PyContext>, dtype: &str, method: i32) -> PyResult<Self> {
        Ok(Self {
            inner: PredictionBatch::from_tags(&context.inner, dtype, method)?,
        })
    }

    #[getter]
    fn handle(&self) -> isize {
        self.inner.handle().raw()
    }

    #[getter]
    fn dtype(&self) -> &'static str {
        self.inner.precision().type_name()
    }

    #[getter]
    fn method(&self) -> i32 {
        self.inner.method().value()
    }

    #[getter]
    fn parameter(&self) -> PyBoostingParameter {
        PyBoostingParameter {
            inner: BoostingParameter::adopt(self.inner.parameter().handle()),
        }
    }

    fn clone(&self, context: PyRef<'_, PyContext>) -> PyResult<Self> {
        Ok(Self {
            inner: self.inner.clone_in(&context.inner)?,
        })
    }

    /// Bind input slot `id` (0 data, 1 model) to an object handle.
    fn set_input(&self, id: i32, value: isize) -> PyResult<()> {
        Ok(self
            .inner
            .input()
            .set(InputId::try_from(id)?, handle(value)?)?)
    }

    fn get_input(&self, id: i32) -> PyResult<Option<isize>> {
        let bound = self.inner.input().get(InputId::try_from(id)?)?;
        Ok(bound.map(Handle::raw))
    }
}

#[pyclass(name = "BoostingParameter")]
pub struct PyBoostingParameter {
    inner: BoostingParameter,
}

#[pymethods]
impl PyBoostingParameter {
    #[getter]
    fn accuracy_threshold(&self) -> PyResult<f64> {
        Ok(self.inner.accuracy_threshold()?)
    }

    #[setter]
    fn set_accuracy_threshold(&self, value: f64) -> PyResult<()> {
        Ok(self.inner.set_accuracy_threshold(value)?)
    }

    #[getter]
    fn max_iterations(&self) -> PyResult<u64> {
        Ok(self.inner.max_iterations()?)
    }

    #[setter]
    fn set_max_iterations(&self, value: u64) -> PyResult<()> {
        Ok(self.inner.set_max_iterations(value)?)
    }

    #[getter]
    fn newton_raphson_accuracy_threshold(&self) -> PyResult<f64> {
        Ok(self.inner.newton_raphson_accuracy_threshold()?)
    }

    #[setter]
    fn set_newton_raphson_accuracy_threshold(&self, value: f64) -> PyResult<()> {
        Ok(self.inner.set_newton_raphson_accuracy_threshold(value)?)
    }

    #[getter]
    fn newton_raphson_max_iterations(&self) -> PyResult<u64> {
        Ok(self.inner.newton_raphson_max_iterations()?)
    }

    #[setter]
    fn set_newton_raphson_max_iterations(&self, value: u64) -> PyResult<()> {
        Ok(self.inner.set_newton_raphson_max_iterations(value)?)
    }

    #[getter]
    fn degenerate_cases_threshold(&self) -> PyResult<f64> {
        Ok(self.inner.degenerate_cases_threshold()?)
    }

    #[setter]
    fn set_degenerate_cases_threshold(&self, value: f64) -> PyResult<()> {
        Ok(self.inner.set_degenerate_cases_threshold(value)?)
    }

    fn to_json(&self) -> PyResult<String> {
        Ok(self.inner.to_json()?)
    }
}

#[pyclass(name = "FullyConnectedParameter")]
pub struct PyFullyConnectedParameter {
    inner: FullyConnectedParameter,
}

#[pymethods]
impl PyFullyConnectedParameter {
    #[new]
    #[pyo3(signature = (context, n_outputs, dim))]
    fn new(context: PyRef<'_, PyContext>, n_outputs: u64, dim: u64) -> PyResult<Self> {
        Ok(Self {
            inner: FullyConnectedParameter::new(&context.inner, n_outputs, dim)?,
        })
    }

    /// Wrap a parameter object produced elsewhere.
    #[staticmethod]
    fn adopt(raw: isize) -> PyResult<Self> {
        Ok(Self {
            inner: FullyConnectedParameter::adopt(handle(raw)?),
        })
    }

    #[getter]
    fn handle(&self) -> isize {
        self.inner.handle().raw()
    }

    #[getter]
    fn n_outputs(&self) -> PyResult<u64> {
        Ok(self.inner.n_outputs()?)
    }

    #[setter]
    fn set_n_outputs(&self, value: u64) -> PyResult<()> {
        Ok(self.inner.set_n_outputs(value)?)
    }

    #[getter]
    fn dim(&self) -> PyResult<u64> {
        Ok(self.inner.dim()?)
    }

    #[setter]
    fn set_dim(&self, value: u64) -> PyResult<()> {
        Ok(self.inner.set_dim(value)?)
    }

    fn to_json(&self) -> PyResult<String> {
        Ok(self.inner.to_json()?)
    }
}

#[pymodule]
#[pyo3(name = "algobridge")]
fn algobridge_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_class::<PyContext>()?;
    m.add_class::<PyPredictionBatch>()?;
    m.add_class::<PyBoostingParameter>()?;
    m.add_class::<PyFullyConnectedParameter>()?;
    Ok(())
}
