//! Scriptable player host for container worldtests.

use lunchbox_core::{FoodProperties, Hand, ItemStack, PlayerId};
use lunchbox_world::{
    eat_one, ContainerSession, ContainerUser, FoodHistory, HungerPolicy, PlayerInventory,
    MAX_FOOD_LEVEL,
};
use tracing::debug;

/// An in-memory player that records everything the container logic asks of it.
#[derive(Debug, Clone)]
pub struct TestPlayer {
    /// Player identity.
    pub id: PlayerId,
    /// Current food level.
    pub food_level: i32,
    /// Carried items.
    pub inventory: PlayerInventory,
    /// Recent meals.
    pub history: FoodHistory,
    /// Per-food repeat limit checked against `history`.
    pub max_repeats: Option<u32>,
    /// Hand and duration of the use in progress.
    pub active_use: Option<(Hand, u32)>,
    /// Container screen currently shown.
    pub screen: Option<ContainerSession>,
    /// Stacks that did not fit and were dropped on the ground.
    pub dropped: Vec<ItemStack>,
    /// Number of times the screen was force-closed.
    pub screens_closed: usize,
}

impl TestPlayer {
    /// Fresh player with an empty inventory.
    pub fn new(id: PlayerId, food_level: i32) -> Self {
        Self {
            id,
            food_level,
            inventory: PlayerInventory::new(),
            history: FoodHistory::default(),
            max_repeats: None,
            active_use: None,
            screen: None,
            dropped: Vec::new(),
            screens_closed: 0,
        }
    }

    /// Put `stack` into inventory slot `slot`.
    pub fn with_item(mut self, slot: usize, stack: ItemStack) -> Self {
        self.inventory.set(slot, Some(stack));
        self
    }

    /// Run `f` against the stack held in `hand`, writing the result back.
    ///
    /// A copy of the stack stays in the slot while `f` runs so items handed
    /// back to the player cannot land in it.
    pub fn with_held<R>(
        &mut self,
        hand: Hand,
        f: impl FnOnce(&mut Self, &mut ItemStack) -> R,
    ) -> Option<R> {
        let slot = self.inventory.slot_for(hand);
        let mut held = self.inventory.get(slot)?.clone();
        let result = f(self, &mut held);
        self.inventory.set(slot, Some(held));
        Some(result)
    }
}

impl HungerPolicy for TestPlayer {
    fn food_level(&self) -> i32 {
        self.food_level
    }

    fn may_eat(&self, stack: &ItemStack, food: &FoodProperties) -> bool {
        self.may_consume(food.always_edible) && self.history.allows(stack, self.max_repeats)
    }
}

impl ContainerUser for TestPlayer {
    fn player_id(&self) -> PlayerId {
        self.id
    }

    fn inventory_slot_for(&self, hand: Hand) -> usize {
        self.inventory.slot_for(hand)
    }

    fn start_using(&mut self, hand: Hand, use_ticks: u32) {
        self.active_use = Some((hand, use_ticks));
    }

    fn clear_active_item(&mut self) {
        self.active_use = None;
    }

    fn finish_using(&mut self, food: &mut ItemStack) -> Option<ItemStack> {
        self.active_use = None;
        eat_one(self, food, |player, eaten, props| {
            player.food_level = (player.food_level + props.nutrition).min(MAX_FOOD_LEVEL);
            player.history.record(eaten);
        })
    }

    fn offer_or_drop(&mut self, stack: ItemStack) {
        if let Some(rest) = self.inventory.add_item(stack) {
            debug!(player = %self.id, stack = %rest, "Inventory full, dropping stack");
            self.dropped.push(rest);
        }
    }

    fn open_container_screen(&mut self, session: &ContainerSession) {
        self.screen = Some(session.clone());
    }

    fn close_container_screen(&mut self) {
        self.screen = None;
        self.screens_closed += 1;
    }
}
