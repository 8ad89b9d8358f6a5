use std::collections::HashMap;
use std::path::PathBuf;

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

use crate::config::{EnvConfig, WorkerConfig};
use crate::env::{BlockingEnv, Env, EnvError};
use crate::simple_env::SimpleEnv;
use crate::synthetic::SyntheticBackend;

fn to_py_err(err: EnvError) -> PyErr {
    PyRuntimeError::new_err(err.to_string())
}

/// Environment over the synthetic backend, stepped synchronously from Python.
#[pyclass(name = "SimpleEnv", unsendable)]
struct PySimpleEnv {
    inner: BlockingEnv<SimpleEnv<SyntheticBackend>>,
}

#[pymethods]
impl PySimpleEnv {
    #[new]
    #[pyo3(signature = (worker, human = false, debug = true, model_id = None, scale_up = 1.0))]
    fn new(
        worker: PathBuf,
        human: bool,
        debug: bool,
        model_id: Option<String>,
        scale_up: f64,
    ) -> PyResult<Self> {
        let defaults = EnvConfig::default();
        let config = EnvConfig {
            model_id: model_id.unwrap_or(defaults.model_id),
            human,
            debug,
            scale_up,
            worker: WorkerConfig::with_program(worker),
            ..EnvConfig::default()
        };
        let inner = BlockingEnv::new(|| SimpleEnv::new(config, SyntheticBackend::default()))
            .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Returns `(frame_bytes, (width, height), reward, done, info)`.
    fn step(
        &mut self,
        action: Vec<f64>,
    ) -> PyResult<(Vec<u8>, (u32, u32), f32, bool, HashMap<String, Option<f64>>)> {
        let (frame, reward, done, info) = self.inner.step(action).map_err(to_py_err)?;
        let dimensions = frame.dimensions();
        let info = HashMap::from([
            ("state_old".to_string(), info.state_old),
            ("state_new".to_string(), Some(info.state_new)),
        ]);
        Ok((frame.into_raw(), dimensions, reward, done, info))
    }

    fn reset(&mut self) -> PyResult<()> {
        self.inner.reset().map_err(to_py_err)
    }

    fn render(&mut self) -> PyResult<()> {
        self.inner.render().map_err(to_py_err)
    }

    fn close(&mut self) -> PyResult<()> {
        self.inner.close().map_err(to_py_err)
    }
}

/// The name of this function must match the lib.name in Cargo.toml
#[pymodule]
fn realenv(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySimpleEnv>()?;
    Ok(())
}
