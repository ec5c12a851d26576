//! Scenario definition and builder.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use circ_repl::Backend;

use crate::assertion::{Assertion, AssertionBuilder};
use crate::error::{ScenarioError, ScenarioResult};
use crate::loader::Operations;
use crate::runner::Runner;

/// A step in a scenario with its assertion.
#[derive(Debug)]
pub struct Step {
    /// Step name (matches `--# name` in the operations file).
    pub name: String,
    /// Assertion to verify the result.
    pub assertion: Assertion,
}

/// A complete test scenario.
pub struct Scenario {
    /// Scenario name (for reporting).
    name: String,
    /// Store backend to run against.
    backend: Backend,
    /// The fixed clock's starting date.
    start: NaiveDate,
    /// Path to the seed file (optional).
    seed_path: Option<PathBuf>,
    /// Path to the operations file.
    operations_path: Option<PathBuf>,
    /// Parsed operations (if loaded inline).
    operations: Option<Operations>,
    /// Steps with assertions.
    steps: Vec<Step>,
    /// Base path for resolving relative paths.
    base_path: PathBuf,
}

impl Scenario {
    /// Create a new scenario with the given name, on the memory backend,
    /// starting on 2024-03-01.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend: Backend::Memory,
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
            seed_path: None,
            operations_path: None,
            operations: None,
            steps: Vec::new(),
            base_path: scenarios_root(),
        }
    }

    /// Set the base path for resolving relative paths.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = path.into();
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the date the clock starts on.
    pub fn starting(mut self, date: NaiveDate) -> Self {
        self.start = date;
        self
    }

    /// Set the seed file path (relative to scenarios/).
    pub fn seed(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_path = Some(path.into());
        self
    }

    /// Set the operations file path (relative to scenarios/).
    pub fn operations(mut self, path: impl Into<PathBuf>) -> Self {
        self.operations_path = Some(path.into());
        self
    }

    /// Load operations from a string.
    pub fn operations_source(mut self, source: &str) -> ScenarioResult<Self> {
        self.operations = Some(Operations::parse(source)?);
        Ok(self)
    }

    /// Add a step with an assertion.
    ///
    /// The step name must match a `--# name` marker in the operations file.
    pub fn step<F>(mut self, name: impl Into<String>, assertion_fn: F) -> Self
    where
        F: FnOnce(AssertionBuilder) -> AssertionBuilder,
    {
        let name = name.into();
        let assertion = assertion_fn(AssertionBuilder::new()).build();
        self.steps.push(Step { name, assertion });
        self
    }

    /// Run the scenario and return the result.
    pub fn run(&self) -> ScenarioResult<()> {
        let runner = Runner::new(self)?;
        runner.run()
    }

    /// Get the scenario name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store_backend(&self) -> Backend {
        self.backend
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Get the seed path (resolved), if any.
    pub fn seed_path(&self) -> Option<PathBuf> {
        self.seed_path.as_ref().map(|p| self.resolve_path(p))
    }

    /// Get the operations, loading from file if needed.
    pub fn load_operations(&self) -> ScenarioResult<Operations> {
        if let Some(ref ops) = self.operations {
            return Ok(ops.clone());
        }

        match &self.operations_path {
            Some(p) => Operations::load(&self.resolve_path(p)),
            None => Err(ScenarioError::missing_operations(&self.name)),
        }
    }

    /// Get the steps.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Resolve a path relative to the base path.
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

/// The `scenarios/` directory shipped with this crate.
fn scenarios_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_builder() {
        let scenario = Scenario::new("test")
            .backend(Backend::Sqlite)
            .seed("seeds/catalog.circ")
            .step("login", |a| a.ok())
            .step("books", |a| a.rows(3));

        assert_eq!(scenario.name(), "test");
        assert_eq!(scenario.store_backend(), Backend::Sqlite);
        assert_eq!(scenario.steps().len(), 2);
        assert!(scenario
            .seed_path()
            .unwrap()
            .ends_with("scenarios/seeds/catalog.circ"));
    }

    #[test]
    fn test_missing_operations() {
        let scenario = Scenario::new("nothing");
        assert!(matches!(
            scenario.load_operations(),
            Err(ScenarioError::MissingOperations { .. })
        ));
    }
}
