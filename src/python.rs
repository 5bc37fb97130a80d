use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::sync::Arc;

use crate::core::{GenericMod, ObservedItem};
use crate::error::VariantEngineError;
use crate::reference::ReferenceDb;
use crate::{EngineConfig, VariantEngine as RustVariantEngine, VariantMatchList};

fn to_py_err(err: VariantEngineError) -> PyErr {
    match err {
        VariantEngineError::Json(e) => PyErr::new::<PyValueError, _>(e.to_string()),
        e => PyErr::new::<PyRuntimeError, _>(e.to_string()),
    }
}

fn parse_item(item_json: &str) -> PyResult<ObservedItem> {
    ObservedItem::from_json(item_json).map_err(|e| PyErr::new::<PyValueError, _>(e.to_string()))
}

/// Python wrapper for VariantEngine
#[pyclass]
struct VariantEngine {
    engine: Arc<RustVariantEngine>,
    db: Arc<ReferenceDb>,
}

#[pymethods]
impl VariantEngine {
    /// Load the reference database and optional YAML config
    #[new]
    #[pyo3(signature = (db_path, config_path=None))]
    fn new(db_path: String, config_path: Option<String>) -> PyResult<Self> {
        let config = EngineConfig::load_or_default(config_path.as_ref()).map_err(to_py_err)?;
        let mut db = ReferenceDb::load(&db_path).map_err(to_py_err)?;
        db.apply_patches(&config.patches);

        Ok(Self {
            engine: Arc::new(RustVariantEngine::new(&config)),
            db: Arc::new(db),
        })
    }

    /// `[(variant_name, variant_number)]` tied for best, empty when nothing
    /// reaches the threshold
    #[pyo3(signature = (item_json, threshold=None))]
    fn get_variant(&self, item_json: &str, threshold: Option<f64>) -> PyResult<Vec<(String, usize)>> {
        let item = parse_item(item_json)?;
        let matches = self.engine.resolve(&item, &self.db).map_err(to_py_err)?;
        Ok(matches.top(threshold.unwrap_or(self.engine.threshold())))
    }

    /// Full match list as a JSON string
    fn resolve(&self, item_json: &str) -> PyResult<String> {
        let item = parse_item(item_json)?;
        let matches = self.engine.resolve(&item, &self.db).map_err(to_py_err)?;
        serde_json::to_string(&matches).map_err(|e| PyErr::new::<PyRuntimeError, _>(e.to_string()))
    }

    /// Summary of the match list as a dict
    fn summary(&self, item_json: &str) -> PyResult<PyObject> {
        let item = parse_item(item_json)?;
        let matches = self.engine.resolve(&item, &self.db).map_err(to_py_err)?;
        Python::with_gil(|py| match_list_to_py(py, &matches, self.engine.threshold()))
    }

    /// Number of reference entries
    fn __len__(&self) -> usize {
        self.db.len()
    }
}

/// Convert GenericMod to Python dict
fn generic_mod_to_py(py: Python, generic: &GenericMod) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    dict.set_item("line", &generic.line)?;
    let ranges: Vec<(f64, f64)> = generic.ranges.iter().map(|r| (r[0], r[1])).collect();
    dict.set_item("ranges", ranges)?;
    Ok(dict.into())
}

/// Convert VariantMatchList to Python dict
fn match_list_to_py(py: Python, list: &VariantMatchList, threshold: f64) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    dict.set_item("item_name", &list.item_name)?;
    dict.set_item("basetype", &list.basetype)?;
    dict.set_item("top", list.top(threshold))?;
    dict.set_item("best_score", list.best_score())?;
    dict.set_item("needs_review", list.needs_review())?;

    let scores: Vec<(String, usize, f64)> = list
        .iter()
        .map(|m| (m.variant_name.clone(), m.variant_number, m.minimum_score))
        .collect();
    dict.set_item("scores", scores)?;
    dict.set_item("diagnostics", list.diagnostics.len())?;

    Ok(dict.into())
}

/// Canonicalize one mod line into `{line, ranges}`
#[pyfunction]
fn genericize_mod(py: Python, line: &str) -> PyResult<PyObject> {
    generic_mod_to_py(py, &crate::genericize(line))
}

/// Python module
#[pymodule]
fn unique_variant_engine(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<VariantEngine>()?;
    m.add_function(wrap_pyfunction!(genericize_mod, m)?)?;
    m.add("__version__", crate::VERSION)?;
    Ok(())
}
