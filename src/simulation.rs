//! Headless multi-player simulation driven by command scripts.
//!
//! Each tick first runs the commands scheduled for it, then advances every
//! held use by one tick. A use whose duration has elapsed is finished through
//! the container state machine.

use anyhow::Result;
use lunchbox_core::{FoodProperties, Hand, ItemStack, ItemType, PlayerId, SimTick};
use lunchbox_testkit::RunSummary;
use lunchbox_world::{
    eat_one, ContainerInventory, ContainerSession, ContainerUseMachine, ContainerUser,
    FoodHistory, HungerPolicy, InventoryError, PlayerInventory, SessionVerdict, SlotChange,
    UseOutcome,
};
use tracing::{debug, warn};

use crate::command_script::CommandScriptPlayer;
use crate::commands::{
    execute_command, parse_command, ChatText, CommandContext, CommandError, CommandSource,
};
use crate::config::LunchboxConfig;

/// Wall-clock length of one tick (20 TPS).
pub const MS_PER_TICK: u64 = 50;

const OP_PERMISSION_LEVEL: u8 = 4;
const DEFAULT_MAX_HEALTH: u32 = 20;

/// One line of the simulation transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimEvent {
    pub tick: SimTick,
    pub kind: &'static str,
    pub payload: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeldUse {
    hand: Hand,
    remaining_ticks: u32,
}

#[derive(Debug)]
pub struct SimPlayer {
    pub id: PlayerId,
    pub name: String,
    pub modded: bool,
    pub permission_level: u8,
    pub food_level: i32,
    pub max_food_level: i32,
    pub max_health: u32,
    pub inventory: PlayerInventory,
    pub history: FoodHistory,
    pub max_repeats: Option<u32>,
    pub screen: Option<ContainerSession>,
    active_use: Option<HeldUse>,
    notices: Vec<(&'static str, String)>,
    /// Inventory slots filled since the observer last saw them.
    touched_slots: Vec<usize>,
}

impl SimPlayer {
    fn notice(&mut self, kind: &'static str, payload: String) {
        self.notices.push((kind, payload));
    }

    fn add_to_inventory(&mut self, stack: ItemStack) -> Option<ItemStack> {
        let before = self.inventory.clone();
        let rest = self.inventory.add_item(stack);
        self.touched_slots.extend(self.inventory.changed_slots(&before));
        rest
    }
}

impl HungerPolicy for SimPlayer {
    fn food_level(&self) -> i32 {
        self.food_level
    }

    fn max_food_level(&self) -> i32 {
        self.max_food_level
    }

    fn may_eat(&self, stack: &ItemStack, food: &FoodProperties) -> bool {
        self.may_consume(food.always_edible) && self.history.allows(stack, self.max_repeats)
    }
}

impl ContainerUser for SimPlayer {
    fn player_id(&self) -> PlayerId {
        self.id
    }

    fn inventory_slot_for(&self, hand: Hand) -> usize {
        self.inventory.slot_for(hand)
    }

    fn start_using(&mut self, hand: Hand, use_ticks: u32) {
        self.active_use = Some(HeldUse {
            hand,
            remaining_ticks: use_ticks,
        });
    }

    fn clear_active_item(&mut self) {
        self.active_use = None;
    }

    fn finish_using(&mut self, food: &mut ItemStack) -> Option<ItemStack> {
        self.active_use = None;
        eat_one(self, food, |player, eaten, props| {
            player.food_level = (player.food_level + props.nutrition).min(player.max_food_level);
            player.history.record(eaten);
        })
    }

    fn offer_or_drop(&mut self, stack: ItemStack) {
        if let Some(rest) = self.add_to_inventory(stack) {
            let payload = format!("{} dropped {rest}", self.name);
            self.notice("dropped", payload);
        }
    }

    fn open_container_screen(&mut self, session: &ContainerSession) {
        self.screen = Some(session.clone());
    }

    fn close_container_screen(&mut self) {
        self.screen = None;
        let payload = format!("container screen of {} closed", self.name);
        self.notice("screen_closed", payload);
    }
}

/// Run `f` against the stack in `hand`, writing it back afterwards.
///
/// A copy stays in the slot while `f` runs so stacks handed back to the
/// player cannot land there.
fn with_held<R>(
    player: &mut SimPlayer,
    hand: Hand,
    f: impl FnOnce(&mut SimPlayer, &mut ItemStack) -> R,
) -> Option<R> {
    let slot = player.inventory.slot_for(hand);
    let mut held = player.inventory.get(slot)?.clone();
    let result = f(player, &mut held);
    player.inventory.set(slot, Some(held));
    Some(result)
}

fn inventory_error(err: InventoryError) -> CommandError {
    CommandError::new(err.to_string())
}

pub struct Simulation {
    config: LunchboxConfig,
    tick: SimTick,
    next_id: u32,
    players: Vec<SimPlayer>,
    machine: ContainerUseMachine,
    events: Vec<SimEvent>,
    summary: RunSummary,
}

impl Simulation {
    pub fn new(config: LunchboxConfig, name: impl Into<String>) -> Self {
        let config = config.sanitized();
        let machine = ContainerUseMachine::new(config.use_config());
        Self {
            config,
            tick: SimTick::ZERO,
            next_id: 1,
            players: Vec::new(),
            machine,
            events: Vec::new(),
            summary: RunSummary::new(name),
        }
    }

    pub fn tick(&self) -> SimTick {
        self.tick
    }

    fn now_ms(&self) -> u64 {
        self.tick.0 * MS_PER_TICK
    }

    pub fn player(&self, name: &str) -> Option<&SimPlayer> {
        self.players.iter().find(|p| p.name == name)
    }

    fn index_of(&self, name: &str) -> Result<usize, CommandError> {
        self.players
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| CommandError::no_player(name))
    }

    /// True while any player is holding a use.
    pub fn has_pending_uses(&self) -> bool {
        self.players.iter().any(|p| p.active_use.is_some())
    }

    fn emit(&mut self, kind: &'static str, payload: impl Into<String>) {
        let payload = payload.into();
        debug!(tick = self.tick.0, kind, %payload, "sim event");
        self.events.push(SimEvent {
            tick: self.tick,
            kind,
            payload,
        });
    }

    /// Report filled slots to the observer, then move player notices into the transcript.
    fn collect_notices(&mut self) {
        let tick = self.tick;
        let Self {
            machine,
            players,
            events,
            ..
        } = self;
        for player in players.iter_mut() {
            for slot in std::mem::take(&mut player.touched_slots) {
                let change = SlotChange::player(slot, player.inventory.get(slot).cloned());
                machine.slot_changed(&mut *player, &change);
            }
            for (kind, payload) in player.notices.drain(..) {
                events.push(SimEvent {
                    tick,
                    kind,
                    payload,
                });
            }
        }
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.collect_notices();
        std::mem::take(&mut self.events)
    }

    /// Parse and run one command line, recording its output.
    pub fn run_command(&mut self, input: &str) {
        self.emit("command", input);
        let lines = match parse_command(input) {
            Ok(cmd) => execute_command(self, cmd).lines,
            Err(err) => vec![format!("Error: {err}")],
        };
        for line in lines {
            self.emit("output", line);
        }
        self.collect_notices();
    }

    /// Advance one tick, finishing uses whose duration has elapsed.
    pub fn step(&mut self) {
        self.tick = self.tick.advance(1);
        self.summary.ticks += 1;

        let mut finished = Vec::new();
        for (index, player) in self.players.iter_mut().enumerate() {
            if let Some(held) = player.active_use.as_mut() {
                held.remaining_ticks = held.remaining_ticks.saturating_sub(1);
                if held.remaining_ticks == 0 {
                    finished.push(index);
                }
            }
        }
        for index in finished {
            self.finish_use(index);
        }
        self.collect_notices();
    }

    fn finish_use(&mut self, index: usize) {
        let now_ms = self.now_ms();
        let Self {
            machine, players, ..
        } = self;
        let player = &mut players[index];
        let Some(held) = player.active_use else {
            return;
        };
        let id = player.id;
        let name = player.name.clone();
        let result = with_held(player, held.hand, |p, stack| {
            machine.finish_using(p, stack, now_ms)
        });

        match result {
            Some(Ok(UseOutcome::Consumed { slot_index, food })) => {
                self.summary.meals += 1;
                self.emit("consumed", format!("{name} ate {food:?} from slot {slot_index}"));
            }
            Some(Ok(outcome)) => {
                self.emit("use_finished", format!("{name}: {outcome:?}"));
            }
            Some(Err(err)) => {
                warn!(player = %id, "Failed to update container after eating: {err}");
                self.emit("error", format!("{name}: {err}"));
            }
            None => {
                self.players[index].active_use = None;
                self.machine.cancel(id);
                self.emit("use_cancelled", format!("{name} no longer holds the container"));
            }
        }
    }

    fn cancel_use(&mut self, index: usize) {
        let player = &mut self.players[index];
        if player.active_use.is_none() {
            return;
        }
        player.active_use = None;
        let (id, name) = (player.id, player.name.clone());
        self.machine.cancel(id);
        self.emit("use_cancelled", format!("{name} stopped eating"));
    }

    fn note_outcome(&mut self, name: &str, outcome: &UseOutcome) {
        match outcome {
            UseOutcome::StartedEating {
                slot_index,
                use_ticks,
            } => self.emit(
                "use_started",
                format!("{name} eating slot {slot_index} for {use_ticks} ticks"),
            ),
            UseOutcome::OpenedContainer { inventory_slot } => {
                self.summary.screens_opened += 1;
                self.emit(
                    "screen_opened",
                    format!("{name} opened container in slot {inventory_slot}"),
                );
            }
            UseOutcome::Debounced => {
                self.summary.debounced_opens += 1;
                self.emit("debounced", format!("{name} opened too soon after eating"));
            }
            _ => {}
        }
    }

    /// Run `script` to completion, handing every event to `sink`.
    ///
    /// Stops once the script is drained and no use is pending, or at `max_ticks`.
    pub fn run_script(
        &mut self,
        script: &mut CommandScriptPlayer,
        max_ticks: u64,
        mut sink: impl FnMut(&SimEvent) -> Result<()>,
    ) -> Result<()> {
        loop {
            for command in script.drain_ready_commands(self.tick) {
                self.run_command(&command);
            }
            for event in self.drain_events() {
                sink(&event)?;
            }
            if script.is_finished() && !self.has_pending_uses() {
                break;
            }
            if self.tick.0 >= max_ticks {
                warn!(max_ticks, "Tick limit reached before the script finished");
                break;
            }
            self.step();
            for event in self.drain_events() {
                sink(&event)?;
            }
        }
        Ok(())
    }

    /// Counters for the run so far, with each player's food level.
    pub fn summary(&self) -> RunSummary {
        let mut summary = self.summary.clone();
        summary.food_levels = self
            .players
            .iter()
            .map(|p| (p.name.clone(), p.food_level))
            .collect();
        summary
    }

    /// Player index and watched slot of an open container screen.
    fn open_screen(&self, name: &str) -> Result<(usize, usize), CommandError> {
        let index = self.index_of(name)?;
        let session = self
            .machine
            .session(self.players[index].id)
            .ok_or_else(|| CommandError::new(format!("{name} has no container screen open")))?;
        Ok((index, session.watched_slot()))
    }

    /// Edit the container behind an open screen, then report the change.
    fn edit_open_container<R>(
        &mut self,
        name: &str,
        edit: impl FnOnce(&mut ContainerInventory<'_>) -> Result<R, CommandError>,
    ) -> Result<R, CommandError> {
        let (index, watched_slot) = self.open_screen(name)?;
        let Self {
            machine, players, ..
        } = self;
        let player = &mut players[index];

        let container = player
            .inventory
            .get_mut(watched_slot)
            .ok_or_else(|| CommandError::new("The container is gone"))?;
        let mut inventory = ContainerInventory::open(container)
            .ok_or_else(|| CommandError::new("The watched slot no longer holds a container"))?;
        let result = edit(&mut inventory)?;
        drop(inventory);

        let updated = container.clone();
        machine.container_edited(player.id, &updated);
        machine.slot_changed(player, &SlotChange::player(watched_slot, Some(updated)));
        Ok(result)
    }
}

impl CommandContext for Simulation {
    fn command_source(&self) -> CommandSource {
        match self.players.first() {
            Some(player) => CommandSource::Player {
                name: player.name.clone(),
                permission_level: player.permission_level,
                modded: player.modded,
            },
            None => CommandSource::Console,
        }
    }

    fn has_client_mod(&self, player: &str) -> Option<bool> {
        self.player(player).map(|p| p.modded)
    }

    fn join(&mut self, name: &str, modded: bool, op: bool) -> Result<PlayerId, CommandError> {
        if self.player(name).is_some() {
            return Err(CommandError::new(format!("{name} is already online")));
        }
        let id = PlayerId(self.next_id);
        self.next_id += 1;
        let max_health = if self.config.carrot.enable {
            self.config.start_health()
        } else {
            DEFAULT_MAX_HEALTH
        };
        self.players.push(SimPlayer {
            id,
            name: name.to_string(),
            modded,
            permission_level: if op { OP_PERMISSION_LEVEL } else { 0 },
            food_level: self.config.max_food_level,
            max_food_level: self.config.max_food_level,
            max_health,
            inventory: PlayerInventory::new(),
            history: FoodHistory::new(self.config.history.capacity),
            max_repeats: self.config.history.max_repeats,
            screen: None,
            active_use: None,
            notices: Vec::new(),
            touched_slots: Vec::new(),
        });
        Ok(id)
    }

    fn leave(&mut self, player: &str) -> Result<(), CommandError> {
        let index = self.index_of(player)?;
        let removed = self.players.remove(index);
        self.machine.disconnect(removed.id);
        Ok(())
    }

    fn give_item(
        &mut self,
        player: &str,
        item: ItemType,
        count: u32,
    ) -> Result<u32, CommandError> {
        let index = self.index_of(player)?;
        let rest = self.players[index].add_to_inventory(ItemStack::new(item, count));
        Ok(rest.map_or(0, |stack| stack.count))
    }

    fn set_food_level(&mut self, player: &str, level: i32) -> Result<i32, CommandError> {
        let index = self.index_of(player)?;
        let player = &mut self.players[index];
        player.food_level = level.clamp(0, player.max_food_level);
        Ok(player.food_level)
    }

    fn use_item(&mut self, player: &str, hand: Hand) -> Result<UseOutcome, CommandError> {
        let index = self.index_of(player)?;
        let now_ms = self.now_ms();
        let outcome = {
            let Self {
                machine, players, ..
            } = self;
            let user = &mut players[index];
            let slot = user.inventory.slot_for(hand);
            if !user.inventory.get(slot).is_some_and(ItemStack::is_food_container) {
                return Err(CommandError::new(format!(
                    "{player} is not holding a food container"
                )));
            }
            with_held(user, hand, |p, stack| machine.use_item(p, stack, hand, now_ms))
                .unwrap_or(UseOutcome::Ignored)
        };
        self.note_outcome(player, &outcome);
        Ok(outcome)
    }

    fn release_use(&mut self, player: &str) -> Result<UseOutcome, CommandError> {
        let index = self.index_of(player)?;
        let Some(held) = self.players[index].active_use.take() else {
            return Ok(UseOutcome::Ignored);
        };
        let now_ms = self.now_ms();
        let outcome = {
            let Self {
                machine, players, ..
            } = self;
            let user = &mut players[index];
            let id = user.id;
            match with_held(user, held.hand, |p, stack| {
                machine.release(p, stack, held.remaining_ticks, now_ms)
            }) {
                Some(outcome) => outcome,
                None => {
                    machine.cancel(id);
                    UseOutcome::Ignored
                }
            }
        };
        self.note_outcome(player, &outcome);
        Ok(outcome)
    }

    fn select_slot(&mut self, player: &str, slot: usize) -> Result<(), CommandError> {
        let index = self.index_of(player)?;
        self.cancel_use(index);
        if self.players[index].inventory.select(slot) {
            Ok(())
        } else {
            Err(CommandError::new("Hotbar slot must be 0-8"))
        }
    }

    fn put_in_container(
        &mut self,
        player: &str,
        slot: usize,
        stack: ItemStack,
    ) -> Result<(), CommandError> {
        self.edit_open_container(player, |inventory| {
            if !inventory.is_acceptable(slot, &stack) {
                return Err(CommandError::new("Only food fits in a food container"));
            }
            let merged = match inventory.get(slot).map_err(inventory_error)? {
                None if stack.count <= stack.max_stack_size() => stack,
                Some(existing) if existing.can_merge(&stack) && existing.can_add(stack.count) => {
                    let mut merged = existing.clone();
                    merged.add(stack.count);
                    merged
                }
                None => {
                    return Err(CommandError::new(format!(
                        "At most {} fit in one slot",
                        stack.max_stack_size()
                    )))
                }
                Some(_) => {
                    return Err(CommandError::new(format!(
                        "Container slot {slot} is occupied"
                    )))
                }
            };
            inventory.set(slot, Some(merged)).map_err(inventory_error)
        })
    }

    fn take_from_container(
        &mut self,
        player: &str,
        slot: usize,
    ) -> Result<Option<ItemStack>, CommandError> {
        let taken = self.edit_open_container(player, |inventory| {
            inventory.remove_all(slot).map_err(inventory_error)
        })?;
        if let Some(stack) = &taken {
            let index = self.index_of(player)?;
            self.players[index].offer_or_drop(stack.clone());
        }
        Ok(taken)
    }

    fn move_stack(
        &mut self,
        player: &str,
        from: usize,
        to: usize,
    ) -> Result<SessionVerdict, CommandError> {
        if !PlayerInventory::is_valid_slot(from) || !PlayerInventory::is_valid_slot(to) {
            return Err(CommandError::new("Invalid inventory slot"));
        }
        let index = self.index_of(player)?;
        self.cancel_use(index);
        if from == to {
            return Ok(SessionVerdict::Keep);
        }

        let Self {
            machine, players, ..
        } = self;
        let user = &mut players[index];
        let moving = user.inventory.take(from);
        let displaced = user.inventory.take(to);
        user.inventory.set(from, displaced.clone());
        user.inventory.set(to, moving.clone());

        for change in [SlotChange::player(from, displaced), SlotChange::player(to, moving)] {
            if machine.slot_changed(&mut *user, &change) == SessionVerdict::Close {
                return Ok(SessionVerdict::Close);
            }
        }
        Ok(SessionVerdict::Keep)
    }

    fn close_screen(&mut self, player: &str) -> Result<(), CommandError> {
        let (index, _) = self.open_screen(player)?;
        let user = &mut self.players[index];
        self.machine.screen_closed(user.id);
        if user.screen.take().is_none() {
            warn!(player = %user.id, "Closed a container screen the client never showed");
        }
        Ok(())
    }

    fn clear_food_history(&mut self, player: &str) -> Result<(), CommandError> {
        let index = self.index_of(player)?;
        self.players[index].history.clear();
        Ok(())
    }

    fn send_clear_packet(&mut self, player: &str) {
        self.emit("packet", format!("clear_foods -> {player}"));
    }

    fn reset_max_health(&mut self, player: &str, health: u32) {
        if let Ok(index) = self.index_of(player) {
            let previous = std::mem::replace(&mut self.players[index].max_health, health);
            self.emit(
                "max_health",
                format!("{player} max health {previous} -> {health}"),
            );
        }
    }

    fn send_message(&mut self, player: &str, text: ChatText) {
        self.emit("message", format!("to {player}: {text}"));
    }

    fn carrot_start_health(&self) -> Option<u32> {
        self.config
            .carrot
            .enable
            .then(|| self.config.start_health())
    }
}
