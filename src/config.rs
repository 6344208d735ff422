use anyhow::Result;
use lunchbox_world::{
    UseConfig, DEFAULT_EAT_DEBOUNCE_MS, DEFAULT_HISTORY_CAPACITY, DEFAULT_OPEN_GRACE_TICKS,
    MAX_FOOD_LEVEL,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/lunchbox.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LunchboxConfig {
    /// Food level at which players count as full.
    pub max_food_level: i32,
    #[serde(rename = "use")]
    pub use_action: UseSection,
    pub carrot: CarrotSection,
    pub history: HistorySection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UseSection {
    /// Milliseconds after a meal during which the container screen stays shut.
    pub eat_debounce_ms: u64,
    /// A release within this many ticks of starting the use opens the screen.
    pub open_grace_ticks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CarrotSection {
    pub enable: bool,
    /// Hearts a player starts with; max health is twice this.
    pub start_hearts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HistorySection {
    /// Meals remembered per player.
    pub capacity: usize,
    /// Times a food may appear in the history before it is refused. Unset means no limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_repeats: Option<u32>,
}

impl Default for LunchboxConfig {
    fn default() -> Self {
        Self {
            max_food_level: MAX_FOOD_LEVEL,
            use_action: UseSection::default(),
            carrot: CarrotSection::default(),
            history: HistorySection::default(),
        }
    }
}

impl Default for UseSection {
    fn default() -> Self {
        Self {
            eat_debounce_ms: DEFAULT_EAT_DEBOUNCE_MS,
            open_grace_ticks: DEFAULT_OPEN_GRACE_TICKS,
        }
    }
}

impl Default for CarrotSection {
    fn default() -> Self {
        Self {
            enable: false,
            start_hearts: 10,
        }
    }
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            max_repeats: None,
        }
    }
}

impl LunchboxConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<LunchboxConfig>(&contents) {
                Ok(cfg) => cfg.sanitized(),
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    LunchboxConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                LunchboxConfig::default()
            }
        }
    }

    /// Replace values the simulation cannot run with by their defaults.
    pub fn sanitized(mut self) -> Self {
        if self.max_food_level <= 0 {
            warn!(
                max_food_level = self.max_food_level,
                "max_food_level must be positive. Using {MAX_FOOD_LEVEL}"
            );
            self.max_food_level = MAX_FOOD_LEVEL;
        }
        self
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    pub fn use_config(&self) -> UseConfig {
        UseConfig {
            eat_debounce_ms: self.use_action.eat_debounce_ms,
            open_grace_ticks: self.use_action.open_grace_ticks,
        }
    }

    /// Max health a player is reset to when the carrot module is on.
    pub fn start_health(&self) -> u32 {
        self.carrot.start_hearts * 2
    }
}
