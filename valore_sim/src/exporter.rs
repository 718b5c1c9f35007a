//! JSON exporter for scenario runs and the dashboard overview.

use crate::error::SimError;
use crate::runner::ScenarioResult;

use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use valore_core::Overview;

/// Complete run export.
#[derive(Debug, Clone, Serialize)]
pub struct RunExport {
    /// Scenario selection (a name or `all`)
    pub scenario: String,

    /// Base seed
    pub seed: u64,

    /// Dashboard payload for the base seed
    pub overview: Overview,

    /// Every scenario result, in run order
    pub results: Vec<ScenarioResult>,

    /// True if every result passed
    pub passed: bool,
}

impl RunExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, overview: Overview) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            overview,
            results: Vec::new(),
            passed: true,
        }
    }

    /// Adds a result.
    pub fn add_result(&mut self, result: ScenarioResult) {
        self.passed &= result.passed;
        self.results.push(result);
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
