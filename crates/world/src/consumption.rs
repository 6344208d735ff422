//! Use-action state machine for food containers.
//!
//! One physical input drives two behaviours. Using a container that holds
//! something edible starts eating the best food inside; using one that holds
//! nothing edible opens the container screen instead. A quick tap (released
//! within the grace window) also opens the screen, so players can always get
//! at the contents.
//!
//! ```text
//! Idle --use, food found------------------> Consuming
//! Idle --use, no food, guard open---------> ContainerOpen
//! Idle --use, no food, guard closed-------> Idle
//! Consuming --use duration elapsed--------> Idle          (food eaten)
//! Consuming --released within grace------> ContainerOpen (guard permitting)
//! Consuming --released late---------------> Idle
//! Consuming --cancelled-------------------> Idle
//! ContainerOpen --closed / auto-closed----> Idle
//! ```

use std::collections::HashMap;

use lunchbox_core::{Hand, ItemStack, ItemType, PlayerId};
use tracing::debug;

use crate::container_inventory::{ContainerInventory, InventoryError};
use crate::eat_guard::{EatGuard, DEFAULT_EAT_DEBOUNCE_MS};
use crate::food_selection::{find_next_food, FoodChoice};
use crate::host::{BaseFoodResolver, ContainerUser, FoodResolver, HungerPolicy};
use crate::session::{ContainerSession, SessionVerdict, SlotChange};

/// Ticks after starting a use within which releasing opens the container.
pub const DEFAULT_OPEN_GRACE_TICKS: u32 = 5;

/// Tunables for the use state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UseConfig {
    /// Quiet period after eating before the screen may open.
    pub eat_debounce_ms: u64,
    /// Release window (in ticks since the use started) that counts as a tap.
    pub open_grace_ticks: u32,
}

impl Default for UseConfig {
    fn default() -> Self {
        Self {
            eat_debounce_ms: DEFAULT_EAT_DEBOUNCE_MS,
            open_grace_ticks: DEFAULT_OPEN_GRACE_TICKS,
        }
    }
}

/// A hold-to-eat in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveUse {
    /// Hand holding the container.
    pub hand: Hand,
    /// Container slot chosen when the use started.
    pub slot_index: usize,
    /// Full duration of the use.
    pub use_ticks: u32,
}

/// Where a player is in the use cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UsePhase {
    /// Nothing going on.
    #[default]
    Idle,
    /// Holding the use action while a food is eaten.
    Consuming(ActiveUse),
    /// Container screen open.
    ContainerOpen(ContainerSession),
}

/// Result of feeding an event into the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseOutcome {
    /// Started eating from a container slot.
    StartedEating {
        /// Container slot being eaten from.
        slot_index: usize,
        /// Ticks until the bite completes.
        use_ticks: u32,
    },
    /// Opened the container screen.
    OpenedContainer {
        /// Player inventory slot holding the container.
        inventory_slot: usize,
    },
    /// Opening was swallowed because the player just ate.
    Debounced,
    /// Finished eating.
    Consumed {
        /// Container slot eaten from.
        slot_index: usize,
        /// What was eaten.
        food: ItemType,
    },
    /// The use was released too late to count as a tap.
    Released,
    /// The event did not apply in the current phase.
    Ignored,
}

static IDLE: UsePhase = UsePhase::Idle;

/// Per-player use state plus the eat debounce guard.
#[derive(Debug)]
pub struct ContainerUseMachine<R = BaseFoodResolver> {
    config: UseConfig,
    resolver: R,
    guard: EatGuard,
    phases: HashMap<PlayerId, UsePhase>,
}

impl ContainerUseMachine<BaseFoodResolver> {
    /// State machine that resolves food from base food data.
    pub fn new(config: UseConfig) -> Self {
        Self::with_resolver(config, BaseFoodResolver)
    }
}

impl<R: FoodResolver> ContainerUseMachine<R> {
    /// State machine with a custom food resolver.
    pub fn with_resolver(config: UseConfig, resolver: R) -> Self {
        Self {
            config,
            resolver,
            guard: EatGuard::new(config.eat_debounce_ms),
            phases: HashMap::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> UseConfig {
        self.config
    }

    /// Current phase for `player`.
    pub fn phase(&self, player: PlayerId) -> &UsePhase {
        self.phases.get(&player).unwrap_or(&IDLE)
    }

    /// Open session for `player`, if any.
    pub fn session(&self, player: PlayerId) -> Option<&ContainerSession> {
        match self.phases.get(&player) {
            Some(UsePhase::ContainerOpen(session)) => Some(session),
            _ => None,
        }
    }

    /// Best food the player could eat from `inventory` right now.
    pub fn next_food<P>(&self, inventory: &ContainerInventory<'_>, policy: &P) -> Option<FoodChoice>
    where
        P: HungerPolicy + ?Sized,
    {
        find_next_food(inventory, &self.resolver, policy)
    }

    /// Guard: the container holds something the player can eat.
    pub fn has_candidate<P>(&self, inventory: &ContainerInventory<'_>, policy: &P) -> bool
    where
        P: HungerPolicy + ?Sized,
    {
        self.next_food(inventory, policy).is_some()
    }

    /// Guard: enough time has passed since the player last ate.
    pub fn may_open(&self, player: PlayerId, now_ms: u64) -> bool {
        self.guard.may_open(player, now_ms)
    }

    /// Guard: a release after `remaining_ticks` of `active` counts as a tap.
    pub fn released_within_grace(&self, active: &ActiveUse, remaining_ticks: u32) -> bool {
        active.use_ticks.saturating_sub(remaining_ticks) <= self.config.open_grace_ticks
    }

    /// The player pressed use with `container` in `hand`.
    pub fn use_item<U>(
        &mut self,
        user: &mut U,
        container: &mut ItemStack,
        hand: Hand,
        now_ms: u64,
    ) -> UseOutcome
    where
        U: ContainerUser + ?Sized,
    {
        let player = user.player_id();
        if !matches!(self.phase(player), UsePhase::Idle) {
            return UseOutcome::Ignored;
        }
        let Some(kind) = container.container_kind() else {
            return UseOutcome::Ignored;
        };

        let inventory = ContainerInventory::load(container, kind.capacity());
        match self.next_food(&inventory, &*user) {
            // Candidates already passed `may_eat` in the filter.
            Some(choice) => {
                let active = ActiveUse {
                    hand,
                    slot_index: choice.slot_index,
                    use_ticks: choice.food.consume_ticks,
                };
                user.start_using(hand, active.use_ticks);
                self.phases.insert(player, UsePhase::Consuming(active));
                debug!(%player, slot = active.slot_index, stack = %choice.stack, "Started eating from container");
                UseOutcome::StartedEating {
                    slot_index: active.slot_index,
                    use_ticks: active.use_ticks,
                }
            }
            None => {
                let inventory_slot = user.inventory_slot_for(hand);
                self.open_container(user, container, inventory_slot, now_ms)
            }
        }
    }

    /// The use duration elapsed: eat one bite of the best food.
    ///
    /// The winning slot is picked again here since the container may have
    /// changed while the player was eating.
    pub fn finish_using<U>(
        &mut self,
        user: &mut U,
        container: &mut ItemStack,
        now_ms: u64,
    ) -> Result<UseOutcome, InventoryError>
    where
        U: ContainerUser + ?Sized,
    {
        let player = user.player_id();
        if !matches!(self.phase(player), UsePhase::Consuming(_)) {
            return Ok(UseOutcome::Ignored);
        }
        self.phases.remove(&player);

        let Some(kind) = container.container_kind() else {
            return Ok(UseOutcome::Ignored);
        };
        let mut inventory = ContainerInventory::load(container, kind.capacity());
        let Some(choice) = self.next_food(&inventory, &*user) else {
            debug!(%player, "Nothing left to eat when the use finished");
            return Ok(UseOutcome::Ignored);
        };

        self.guard.record(player, now_ms);
        let FoodChoice {
            slot_index,
            stack: mut food,
            ..
        } = choice;
        let eaten = food.item_type;

        match user.finish_using(&mut food) {
            // Same stack, possibly smaller: persist it as is.
            None => inventory.set(slot_index, Some(food))?,
            Some(replacement) => {
                store_replacement(user, &mut inventory, slot_index, food, replacement)?
            }
        }

        debug!(%player, slot = slot_index, food = ?eaten, "Ate from container");
        Ok(UseOutcome::Consumed {
            slot_index,
            food: eaten,
        })
    }

    /// The player let go of use with `remaining_ticks` left on the use.
    pub fn release<U>(
        &mut self,
        user: &mut U,
        container: &ItemStack,
        remaining_ticks: u32,
        now_ms: u64,
    ) -> UseOutcome
    where
        U: ContainerUser + ?Sized,
    {
        let player = user.player_id();
        let active = match self.phase(player) {
            UsePhase::Consuming(active) => *active,
            _ => return UseOutcome::Ignored,
        };
        self.phases.remove(&player);

        if !self.released_within_grace(&active, remaining_ticks) {
            return UseOutcome::Released;
        }
        let inventory_slot = user.inventory_slot_for(active.hand);
        self.open_container(user, container, inventory_slot, now_ms)
    }

    /// Abandon an eat in progress without a release, e.g. the container left the hand.
    pub fn cancel(&mut self, player: PlayerId) -> bool {
        if matches!(self.phase(player), UsePhase::Consuming(_)) {
            self.phases.remove(&player);
            return true;
        }
        false
    }

    /// The screen edited the open container; keep watching the new contents.
    pub fn container_edited(&mut self, player: PlayerId, updated: &ItemStack) {
        if let Some(UsePhase::ContainerOpen(session)) = self.phases.get_mut(&player) {
            session.follow(updated);
        }
    }

    /// A slot changed while the player may have a container screen open.
    pub fn slot_changed<U>(&mut self, user: &mut U, change: &SlotChange) -> SessionVerdict
    where
        U: ContainerUser + ?Sized,
    {
        let player = user.player_id();
        let verdict = match self.phases.get(&player) {
            Some(UsePhase::ContainerOpen(session)) => session.observe(change),
            _ => return SessionVerdict::Keep,
        };
        if verdict == SessionVerdict::Close {
            self.phases.remove(&player);
            user.close_container_screen();
            debug!(%player, slot = change.index, "Container moved, closing its screen");
        }
        verdict
    }

    /// The player closed the container screen.
    pub fn screen_closed(&mut self, player: PlayerId) {
        if matches!(self.phase(player), UsePhase::ContainerOpen(_)) {
            self.phases.remove(&player);
        }
    }

    /// Forget everything about a player that left.
    pub fn disconnect(&mut self, player: PlayerId) {
        self.phases.remove(&player);
        self.guard.forget(player);
    }

    fn open_container<U>(
        &mut self,
        user: &mut U,
        container: &ItemStack,
        inventory_slot: usize,
        now_ms: u64,
    ) -> UseOutcome
    where
        U: ContainerUser + ?Sized,
    {
        let player = user.player_id();
        if !self.may_open(player, now_ms) {
            debug!(%player, "Container screen suppressed right after eating");
            return UseOutcome::Debounced;
        }
        self.guard.record(player, now_ms);

        user.clear_active_item();
        let session = ContainerSession::new(player, container.clone(), inventory_slot);
        user.open_container_screen(&session);
        self.phases.insert(player, UsePhase::ContainerOpen(session));
        UseOutcome::OpenedContainer { inventory_slot }
    }
}

/// Put whatever the eaten food turned into back where it belongs.
///
/// A replacement only takes the slot if the food is gone and the replacement
/// is itself allowed in the container; otherwise it goes to the player.
fn store_replacement<U>(
    user: &mut U,
    inventory: &mut ContainerInventory<'_>,
    slot_index: usize,
    food: ItemStack,
    replacement: ItemStack,
) -> Result<(), InventoryError>
where
    U: ContainerUser + ?Sized,
{
    let remainder = (!food.is_empty()).then_some(food);
    if remainder.is_none() && inventory.is_acceptable(slot_index, &replacement) {
        return inventory.set(slot_index, Some(replacement));
    }
    user.offer_or_drop(replacement);
    inventory.set(slot_index, remainder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lunchbox_core::{ContainerKind, FoodType};

    #[derive(Default)]
    struct FakeUser {
        food_level: i32,
        using: Option<(Hand, u32)>,
        screen: Option<ContainerSession>,
        offered: Vec<ItemStack>,
        closed: usize,
        turns_into: Option<ItemStack>,
    }

    impl HungerPolicy for FakeUser {
        fn food_level(&self) -> i32 {
            self.food_level
        }
    }

    impl ContainerUser for FakeUser {
        fn player_id(&self) -> PlayerId {
            PlayerId(1)
        }

        fn inventory_slot_for(&self, hand: Hand) -> usize {
            match hand {
                Hand::Main => 2,
                Hand::Off => 40,
            }
        }

        fn start_using(&mut self, hand: Hand, use_ticks: u32) {
            self.using = Some((hand, use_ticks));
        }

        fn clear_active_item(&mut self) {
            self.using = None;
        }

        fn finish_using(&mut self, food: &mut ItemStack) -> Option<ItemStack> {
            let nutrition = food.food_properties().map_or(0, |f| f.nutrition);
            self.food_level = (self.food_level + nutrition).min(20);
            self.using = None;
            food.count -= 1;
            if let Some(replacement) = self.turns_into.take() {
                return Some(replacement);
            }
            match food.food_type().and_then(|f| f.leftover()) {
                Some(leftover) if food.is_empty() => Some(ItemStack::new(leftover, 1)),
                _ => None,
            }
        }

        fn offer_or_drop(&mut self, stack: ItemStack) {
            self.offered.push(stack);
        }

        fn open_container_screen(&mut self, session: &ContainerSession) {
            self.screen = Some(session.clone());
        }

        fn close_container_screen(&mut self) {
            self.screen = None;
            self.closed += 1;
        }
    }

    fn lunch_box(contents: &[(usize, FoodType, u32)]) -> ItemStack {
        let mut stack = ItemStack::container(ContainerKind::LunchBox);
        let mut inv = ContainerInventory::open(&mut stack).unwrap();
        for &(slot, food, count) in contents {
            inv.set(slot, Some(ItemStack::new(ItemType::Food(food), count)))
                .unwrap();
        }
        drop(inv);
        stack
    }

    fn slot(container: &mut ItemStack, index: usize) -> Option<ItemStack> {
        ContainerInventory::open(container)
            .unwrap()
            .get(index)
            .unwrap()
            .cloned()
    }

    #[test]
    fn use_with_food_starts_eating() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser {
            food_level: 10,
            ..Default::default()
        };
        let mut container = lunch_box(&[(4, FoodType::Bread, 2)]);

        let outcome = machine.use_item(&mut user, &mut container, Hand::Main, 0);
        assert_eq!(
            outcome,
            UseOutcome::StartedEating {
                slot_index: 4,
                use_ticks: 32
            }
        );
        assert_eq!(user.using, Some((Hand::Main, 32)));
        assert!(matches!(machine.phase(PlayerId(1)), UsePhase::Consuming(_)));
    }

    #[test]
    fn finishing_eats_and_persists() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser {
            food_level: 10,
            ..Default::default()
        };
        let mut container = lunch_box(&[(4, FoodType::Bread, 2)]);

        machine.use_item(&mut user, &mut container, Hand::Main, 0);
        let outcome = machine.finish_using(&mut user, &mut container, 1_600).unwrap();
        assert_eq!(
            outcome,
            UseOutcome::Consumed {
                slot_index: 4,
                food: ItemType::Food(FoodType::Bread)
            }
        );
        assert_eq!(user.food_level, 15);
        assert_eq!(slot(&mut container, 4).map(|s| s.count), Some(1));
        assert_eq!(machine.phase(PlayerId(1)), &UsePhase::Idle);
    }

    #[test]
    fn stew_leaves_bowl_with_player() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser {
            food_level: 10,
            ..Default::default()
        };
        let mut container = lunch_box(&[(0, FoodType::MushroomStew, 1)]);

        machine.use_item(&mut user, &mut container, Hand::Main, 0);
        machine.finish_using(&mut user, &mut container, 2_000).unwrap();

        assert_eq!(user.offered, vec![ItemStack::new(ItemType::Bowl, 1)]);
        assert_eq!(slot(&mut container, 0), None);
    }

    #[test]
    fn acceptable_replacement_takes_the_emptied_slot() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser {
            food_level: 10,
            turns_into: Some(ItemStack::new(ItemType::Food(FoodType::BakedPotato), 1)),
            ..Default::default()
        };
        let mut container = lunch_box(&[(6, FoodType::Carrot, 1)]);

        machine.use_item(&mut user, &mut container, Hand::Main, 0);
        machine.finish_using(&mut user, &mut container, 1_600).unwrap();

        assert_eq!(
            slot(&mut container, 6),
            Some(ItemStack::new(ItemType::Food(FoodType::BakedPotato), 1))
        );
        assert!(user.offered.is_empty());
    }

    #[test]
    fn replacement_never_overwrites_remaining_food() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let potato = ItemStack::new(ItemType::Food(FoodType::BakedPotato), 1);
        let mut user = FakeUser {
            food_level: 10,
            turns_into: Some(potato.clone()),
            ..Default::default()
        };
        let mut container = lunch_box(&[(1, FoodType::Bread, 2)]);

        machine.use_item(&mut user, &mut container, Hand::Main, 0);
        machine.finish_using(&mut user, &mut container, 1_600).unwrap();

        assert_eq!(slot(&mut container, 1).map(|s| s.count), Some(1));
        assert_eq!(user.offered, vec![potato]);
    }

    #[test]
    fn empty_container_opens_screen() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser {
            food_level: 10,
            ..Default::default()
        };
        let mut container = lunch_box(&[]);

        let outcome = machine.use_item(&mut user, &mut container, Hand::Off, 5_000);
        assert_eq!(outcome, UseOutcome::OpenedContainer { inventory_slot: 40 });
        let session = user.screen.as_ref().unwrap();
        assert_eq!(session.watched_slot(), 40);
        assert_eq!(machine.session(PlayerId(1)), Some(session));
    }

    #[test]
    fn open_is_debounced_right_after_eating() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser {
            food_level: 16,
            ..Default::default()
        };
        let mut container = lunch_box(&[(0, FoodType::Apple, 1)]);

        machine.use_item(&mut user, &mut container, Hand::Main, 0);
        machine.finish_using(&mut user, &mut container, 1_600).unwrap();

        // Full now, so the next use wants to open the screen.
        let outcome = machine.use_item(&mut user, &mut container, Hand::Main, 2_000);
        assert_eq!(outcome, UseOutcome::Debounced);
        assert!(user.screen.is_none());
        assert_eq!(machine.phase(PlayerId(1)), &UsePhase::Idle);

        let outcome = machine.use_item(&mut user, &mut container, Hand::Main, 2_600);
        assert_eq!(outcome, UseOutcome::OpenedContainer { inventory_slot: 2 });
    }

    #[test]
    fn quick_tap_opens_screen() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser {
            food_level: 10,
            ..Default::default()
        };
        let mut container = lunch_box(&[(1, FoodType::Carrot, 3)]);

        machine.use_item(&mut user, &mut container, Hand::Main, 0);
        let outcome = machine.release(&mut user, &container, 29, 150);
        assert_eq!(outcome, UseOutcome::OpenedContainer { inventory_slot: 2 });
        assert!(user.using.is_none());
    }

    #[test]
    fn late_release_does_nothing() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser {
            food_level: 10,
            ..Default::default()
        };
        let mut container = lunch_box(&[(1, FoodType::Carrot, 3)]);

        machine.use_item(&mut user, &mut container, Hand::Main, 0);
        let outcome = machine.release(&mut user, &container, 20, 600);
        assert_eq!(outcome, UseOutcome::Released);
        assert!(user.screen.is_none());
        assert_eq!(machine.phase(PlayerId(1)), &UsePhase::Idle);
    }

    #[test]
    fn grace_window_is_inclusive() {
        let machine = ContainerUseMachine::new(UseConfig::default());
        let active = ActiveUse {
            hand: Hand::Main,
            slot_index: 0,
            use_ticks: 32,
        };
        assert!(machine.released_within_grace(&active, 27));
        assert!(!machine.released_within_grace(&active, 26));
    }

    #[test]
    fn moving_container_closes_session() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser {
            food_level: 20,
            ..Default::default()
        };
        let mut container = lunch_box(&[]);

        machine.use_item(&mut user, &mut container, Hand::Main, 0);
        let verdict = machine.slot_changed(&mut user, &SlotChange::player(2, None));
        assert_eq!(verdict, SessionVerdict::Close);
        assert_eq!(user.closed, 1);
        assert_eq!(machine.phase(PlayerId(1)), &UsePhase::Idle);
    }

    #[test]
    fn use_while_screen_open_is_ignored() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser::default();
        let mut container = lunch_box(&[]);

        machine.use_item(&mut user, &mut container, Hand::Main, 0);
        let outcome = machine.use_item(&mut user, &mut container, Hand::Main, 5_000);
        assert_eq!(outcome, UseOutcome::Ignored);

        machine.screen_closed(PlayerId(1));
        assert_eq!(machine.phase(PlayerId(1)), &UsePhase::Idle);
    }

    #[test]
    fn disconnect_forgets_debounce() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser::default();
        let mut container = lunch_box(&[]);

        machine.use_item(&mut user, &mut container, Hand::Main, 1_000);
        machine.disconnect(PlayerId(1));
        assert_eq!(machine.phase(PlayerId(1)), &UsePhase::Idle);
        assert!(machine.may_open(PlayerId(1), 1_001));
    }

    #[test]
    fn cancel_drops_the_use_without_opening() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser {
            food_level: 10,
            ..Default::default()
        };
        let mut container = lunch_box(&[(0, FoodType::Bread, 1)]);

        machine.use_item(&mut user, &mut container, Hand::Main, 0);
        assert!(machine.cancel(PlayerId(1)));
        assert!(!machine.cancel(PlayerId(1)));
        assert_eq!(
            machine.finish_using(&mut user, &mut container, 1_600).unwrap(),
            UseOutcome::Ignored
        );
        assert!(user.screen.is_none());
    }

    #[test]
    fn finish_without_use_is_ignored() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser {
            food_level: 5,
            ..Default::default()
        };
        let mut container = lunch_box(&[(0, FoodType::Bread, 1)]);

        let outcome = machine.finish_using(&mut user, &mut container, 0).unwrap();
        assert_eq!(outcome, UseOutcome::Ignored);
        assert_eq!(slot(&mut container, 0).map(|s| s.count), Some(1));
    }

    #[test]
    fn non_container_is_ignored() {
        let mut machine = ContainerUseMachine::new(UseConfig::default());
        let mut user = FakeUser::default();
        let mut bread = ItemStack::new(ItemType::Food(FoodType::Bread), 1);
        assert_eq!(
            machine.use_item(&mut user, &mut bread, Hand::Main, 0),
            UseOutcome::Ignored
        );
    }
}
