//! Recent-meal ledger used to discourage eating the same food over and over.

use std::collections::VecDeque;

use lunchbox_core::{ItemStack, ItemType};
use serde::{Deserialize, Serialize};

/// Default number of meals remembered.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// A single remembered meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FoodHistoryEntry {
    /// What was eaten.
    pub item_type: ItemType,
}

impl FoodHistoryEntry {
    /// Entry for the food in `stack`.
    pub fn from_stack(stack: &ItemStack) -> Self {
        Self {
            item_type: stack.item_type,
        }
    }
}

/// Bounded queue of the most recent meals, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodHistory {
    capacity: usize,
    recent: VecDeque<FoodHistoryEntry>,
}

impl FoodHistory {
    /// Create an empty history that keeps at most `capacity` meals.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            recent: VecDeque::with_capacity(capacity),
        }
    }

    /// Remember that `stack` was eaten, forgetting the oldest meal if full.
    pub fn record(&mut self, stack: &ItemStack) {
        if self.capacity == 0 {
            return;
        }
        while self.recent.len() >= self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(FoodHistoryEntry::from_stack(stack));
    }

    /// How often `item_type` appears in the remembered meals.
    pub fn times_eaten(&self, item_type: ItemType) -> usize {
        self.recent
            .iter()
            .filter(|entry| entry.item_type == item_type)
            .count()
    }

    /// Whether `stack` may be eaten when each food is limited to `max_repeats` recent meals.
    ///
    /// `None` disables the limit.
    pub fn allows(&self, stack: &ItemStack, max_repeats: Option<u32>) -> bool {
        match max_repeats {
            Some(limit) => self.times_eaten(stack.item_type) < limit as usize,
            None => true,
        }
    }

    /// Forget every meal.
    pub fn clear(&mut self) {
        self.recent.clear();
    }

    /// Remembered meals, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &FoodHistoryEntry> {
        self.recent.iter()
    }

    /// Number of remembered meals.
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    /// True if nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }
}

impl Default for FoodHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
