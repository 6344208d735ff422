//! Debounce between eating from a container and reopening it.

use std::collections::HashMap;

use lunchbox_core::PlayerId;

/// Default quiet period after eating before the container screen may open.
pub const DEFAULT_EAT_DEBOUNCE_MS: u64 = 1000;

/// Per-player last-eat timestamps.
///
/// Entries live as long as the player's connection; call [`EatGuard::forget`]
/// on disconnect.
#[derive(Debug, Clone)]
pub struct EatGuard {
    debounce_ms: u64,
    last_eat_ms: HashMap<PlayerId, u64>,
}

impl EatGuard {
    /// Create a guard with the given quiet period.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            last_eat_ms: HashMap::new(),
        }
    }

    /// Quiet period in milliseconds.
    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms
    }

    /// Whether the container screen may open for `player` at `now_ms`.
    pub fn may_open(&self, player: PlayerId, now_ms: u64) -> bool {
        match self.last_eat_ms.get(&player) {
            Some(&last) => now_ms.saturating_sub(last) >= self.debounce_ms,
            None => true,
        }
    }

    /// Stamp `now_ms` as the player's last container action.
    pub fn record(&mut self, player: PlayerId, now_ms: u64) {
        self.last_eat_ms.insert(player, now_ms);
    }

    /// Drop the player's entry.
    pub fn forget(&mut self, player: PlayerId) {
        self.last_eat_ms.remove(&player);
    }

    /// Number of tracked players.
    pub fn len(&self) -> usize {
        self.last_eat_ms.len()
    }

    /// True if no player is tracked.
    pub fn is_empty(&self) -> bool {
        self.last_eat_ms.is_empty()
    }
}

impl Default for EatGuard {
    fn default() -> Self {
        Self::new(DEFAULT_EAT_DEBOUNCE_MS)
    }
}
