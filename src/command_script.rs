use anyhow::{bail, Context, Result};
use lunchbox_core::SimTick;
use serde::Deserialize;
use std::{collections::VecDeque, fs, path::Path};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptFile {
    #[serde(default)]
    name: Option<String>,
    steps: Vec<StepDef>,
}

/// A step is scheduled either at an absolute `tick` or `after` ticks past
/// the previous step.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepDef {
    #[serde(default)]
    tick: Option<u64>,
    #[serde(default)]
    after: Option<u64>,
    command: String,
}

/// Commands waiting for their tick, in the order they run.
#[derive(Debug)]
pub struct CommandScriptPlayer {
    name: Option<String>,
    pending: VecDeque<(SimTick, String)>,
}

impl CommandScriptPlayer {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading command script {}", path.display()))?;
        Self::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_str(contents: &str) -> Result<Self> {
        let file: ScriptFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            bail!("command script contains no steps");
        }

        let mut cursor = SimTick::ZERO;
        let pending = file
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| {
                let at = match (step.tick, step.after) {
                    (Some(tick), None) if tick < cursor.0 => {
                        bail!("command script steps must be sorted by tick (step {index})")
                    }
                    (Some(tick), None) => SimTick(tick),
                    (None, Some(delay)) => match cursor.0.checked_add(delay) {
                        Some(tick) => SimTick(tick),
                        None => bail!("step {index} is scheduled past the last tick"),
                    },
                    (None, None) => bail!("step {index} needs a `tick` or an `after`"),
                    (Some(_), Some(_)) => bail!("step {index} sets both `tick` and `after`"),
                };
                let command = step.command.trim();
                if command.is_empty() {
                    bail!("step {index} has an empty command");
                }
                cursor = at;
                Ok((at, command.to_string()))
            })
            .collect::<Result<VecDeque<_>>>()?;

        Ok(Self {
            name: file.name.filter(|name| !name.trim().is_empty()),
            pending,
        })
    }

    /// Display name declared by the script, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Tick of the last scheduled command.
    pub fn last_tick(&self) -> Option<SimTick> {
        self.pending.back().map(|(tick, _)| *tick)
    }

    /// Pop every command due at or before `tick`.
    pub fn drain_ready_commands(&mut self, tick: SimTick) -> Vec<String> {
        let due = self.pending.partition_point(|(at, _)| *at <= tick);
        self.pending.drain(..due).map(|(_, command)| command).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }
}
