//! Picks the food a container should feed its holder.
//!
//! Selection runs in two steps. [`collect_candidates`] walks the container and
//! keeps every slot the player may eat right now. [`select_best`] then picks a
//! winner from those candidates given how many hunger points are missing:
//!
//! - if any candidate fills the player up, the one that overshoots least wins
//!   (an exact fit beats any overshoot);
//! - otherwise the candidate that restores the most wins;
//! - equal nutrition outcomes go to the faster food, then to the lower slot.

use lunchbox_core::{FoodProperties, ItemStack};
use tracing::warn;

use crate::container_inventory::ContainerInventory;
use crate::host::{FoodResolver, HungerPolicy};

/// A slot the player could eat from right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoodCandidate {
    /// Container slot index.
    pub slot_index: usize,
    /// Hunger points the food restores.
    pub nutrition: i32,
    /// Ticks it takes to eat.
    pub consume_ticks: u32,
}

/// The food picked for the next bite.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodChoice {
    /// Container slot index.
    pub slot_index: usize,
    /// Snapshot of the slot contents.
    pub stack: ItemStack,
    /// Resolved food properties for the stack.
    pub food: FoodProperties,
}

/// Collect the eligible food slots of a container, in slot order.
///
/// Slots holding something without food data are skipped with a warning.
pub fn collect_candidates<R, P>(
    inventory: &ContainerInventory<'_>,
    resolver: &R,
    policy: &P,
) -> Vec<FoodCandidate>
where
    R: FoodResolver + ?Sized,
    P: HungerPolicy + ?Sized,
{
    inventory
        .occupied()
        .filter_map(|(slot_index, stack)| {
            let Some(food) = resolver.resolve(stack) else {
                warn!(slot = slot_index, %stack, "Non-food stack found in food container");
                return None;
            };
            if !policy.may_eat(stack, &food) {
                return None;
            }
            Some(FoodCandidate {
                slot_index,
                nutrition: food.nutrition,
                consume_ticks: food.consume_ticks,
            })
        })
        .collect()
}

/// Pick the best candidate for a player missing `required` hunger points.
///
/// Deterministic: the running best is only replaced on strict improvement, so
/// exact ties keep the earliest candidate.
pub fn select_best(candidates: &[FoodCandidate], required: i32) -> Option<FoodCandidate> {
    let mut best: Option<FoodCandidate> = None;
    for candidate in candidates {
        let replace = match best {
            None => true,
            Some(current) => beats(candidate, &current, required),
        };
        if replace {
            best = Some(*candidate);
        }
    }
    best
}

/// Whether `candidate` strictly improves on `current`.
fn beats(candidate: &FoodCandidate, current: &FoodCandidate, required: i32) -> bool {
    let delta = required - candidate.nutrition;
    let current_delta = required - current.nutrition;
    let faster_tie =
        delta == current_delta && candidate.consume_ticks < current.consume_ticks;

    match (delta <= 0, current_delta <= 0) {
        // Anything that fills the player up beats anything that doesn't.
        (true, false) => true,
        (false, true) => false,
        // Both fill the player up: least overshoot wins.
        (true, true) => delta > current_delta || faster_tie,
        // Neither does: most nutrition wins.
        (false, false) => delta < current_delta || faster_tie,
    }
}

/// Run the filter and selection for a player, resolving the winning slot.
pub fn find_next_food<R, P>(
    inventory: &ContainerInventory<'_>,
    resolver: &R,
    policy: &P,
) -> Option<FoodChoice>
where
    R: FoodResolver + ?Sized,
    P: HungerPolicy + ?Sized,
{
    let candidates = collect_candidates(inventory, resolver, policy);
    let best = select_best(&candidates, policy.hunger_deficit())?;
    let stack = inventory.get(best.slot_index).ok().flatten()?.clone();
    let food = resolver.resolve(&stack)?;
    Some(FoodChoice {
        slot_index: best.slot_index,
        stack,
        food,
    })
}
