#![warn(missing_docs)]
//! Deterministic testing surfaces: event stream, run summaries and a scriptable player host.

mod player;
mod summary;

use anyhow::{Context, Result};
use lunchbox_core::SimTick;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub use player::*;
pub use summary::*;

/// One transcript line as written to an event log.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Simulation tick when the event occurred.
    pub tick: SimTick,
    /// Event kind, e.g. `consumed` or `screen_opened`.
    pub kind: &'a str,
    /// Human-readable detail.
    pub payload: &'a str,
}

/// Newline-delimited JSON writer.
pub struct JsonlSink {
    out: BufWriter<File>,
    written: usize,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = File::create(path)?;
        Ok(Self {
            out: BufWriter::new(file),
            written: 0,
        })
    }

    /// Append one record as a single line.
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Lines written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered lines to disk.
    pub fn finish(mut self) -> Result<usize> {
        self.out.flush()?;
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn jsonl_sink_writes_one_line_per_event() {
        let path = std::env::temp_dir()
            .join(format!(
                "lunchbox-events-{}",
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap()
                    .as_nanos()
            ))
            .join("events.jsonl");
        let mut sink = JsonlSink::create(&path).expect("sink create");
        sink.write(&EventRecord {
            tick: SimTick(3),
            kind: "use_started",
            payload: "alex eating slot 4 for 32 ticks",
        })
        .expect("write succeeds");
        sink.write(&EventRecord {
            tick: SimTick(35),
            kind: "consumed",
            payload: "alex ate Food(CookedBeef) from slot 4",
        })
        .expect("write succeeds");
        assert_eq!(sink.written(), 2);
        assert_eq!(sink.finish().expect("flush"), 2);

        let contents = fs::read_to_string(&path).expect("file readable");
        let lines: Vec<Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid json"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["tick"], 3);
        assert_eq!(lines[1]["kind"], "consumed");
    }
}
