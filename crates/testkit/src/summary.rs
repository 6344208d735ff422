//! End-of-run summaries written as JSON artifacts.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Counters collected over one scripted run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Script or test that produced the run.
    pub name: String,
    /// RFC 3339 wall-clock time the summary was started.
    pub timestamp: String,
    /// Ticks simulated.
    pub ticks: u64,
    /// Foods eaten out of containers.
    pub meals: u32,
    /// Container screens opened.
    pub screens_opened: u32,
    /// Opens swallowed by the eat debounce.
    pub debounced_opens: u32,
    /// Final food level per player name.
    pub food_levels: BTreeMap<String, i32>,
}

impl RunSummary {
    /// Empty summary stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            ticks: 0,
            meals: 0,
            screens_opened: 0,
            debounced_opens: 0,
            food_levels: BTreeMap::new(),
        }
    }
}

/// Writes a run summary to disk as pretty JSON.
pub struct SummarySink {
    file: File,
}

impl SummarySink {
    /// Create a sink pointed at the supplied path, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Persist `summary`.
    pub fn write(&mut self, summary: &RunSummary) -> Result<()> {
        let json = serde_json::to_string_pretty(summary)?;
        self.file.write_all(json.as_bytes())?;
        Ok(())
    }
}
