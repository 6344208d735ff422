//! Seams to the host game: hunger rules, food data and player actions.
//!
//! The container logic never reaches into a player object directly. Everything
//! it needs from the surrounding simulation goes through these traits so the
//! same code runs against the headless simulator and the test harness.

use lunchbox_core::{FoodProperties, Hand, ItemStack, PlayerId};

use crate::session::ContainerSession;

/// Food level at which a player is considered full.
pub const MAX_FOOD_LEVEL: i32 = 20;

/// Hunger state and eating rules for one player.
pub trait HungerPolicy {
    /// Current food level (0..=max).
    fn food_level(&self) -> i32;

    /// Food level at which the player is full.
    fn max_food_level(&self) -> i32 {
        MAX_FOOD_LEVEL
    }

    /// Whether the player may start eating at all right now.
    fn may_consume(&self, always_edible: bool) -> bool {
        always_edible || self.food_level() < self.max_food_level()
    }

    /// Whether the player may eat this particular food.
    ///
    /// Hosts override this to veto foods through their history rules.
    fn may_eat(&self, stack: &ItemStack, food: &FoodProperties) -> bool {
        let _ = stack;
        self.may_consume(food.always_edible)
    }

    /// Hunger points needed to be full again.
    fn hunger_deficit(&self) -> i32 {
        (self.max_food_level() - self.food_level()).max(0)
    }
}

/// Resolves the food properties of a stack, including per-stack modifiers.
pub trait FoodResolver {
    /// `None` when the stack carries no food data.
    fn resolve(&self, stack: &ItemStack) -> Option<FoodProperties>;
}

/// Resolver that reads the base properties of the food type.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseFoodResolver;

impl FoodResolver for BaseFoodResolver {
    fn resolve(&self, stack: &ItemStack) -> Option<FoodProperties> {
        stack.food_properties()
    }
}

/// What a single bite produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Bite {
    /// Properties of the food that was eaten.
    pub food: FoodProperties,
    /// Container item left behind (bowl, bottle), if any.
    pub leftover: Option<ItemStack>,
}

/// Eat one item off `food`.
///
/// Returns `None` without touching the stack if it is not food.
pub fn take_bite(food: &mut ItemStack) -> Option<Bite> {
    let food_type = food.food_type()?;
    if food.is_empty() {
        return None;
    }
    food.count -= 1;
    Some(Bite {
        food: food_type.properties(),
        leftover: food_type.leftover().map(|item| ItemStack::new(item, 1)),
    })
}

/// Eat one item off `food` for `user` and route whatever it leaves behind.
///
/// `nourish` applies the meal to the player (hunger, history). A leftover from
/// the last item is returned as the slot's replacement; while food remains it
/// goes to the player through [`ContainerUser::offer_or_drop`] instead.
pub fn eat_one<U>(
    user: &mut U,
    food: &mut ItemStack,
    nourish: impl FnOnce(&mut U, &ItemStack, &FoodProperties),
) -> Option<ItemStack>
where
    U: ContainerUser + ?Sized,
{
    let eaten = food.clone();
    let bite = take_bite(food)?;
    nourish(user, &eaten, &bite.food);

    let leftover = bite.leftover?;
    if food.is_empty() {
        return Some(leftover);
    }
    user.offer_or_drop(leftover);
    None
}

/// A player that can carry and use a food container.
pub trait ContainerUser: HungerPolicy {
    /// Identity used to key per-player state.
    fn player_id(&self) -> PlayerId;

    /// Player inventory slot backing the given hand.
    fn inventory_slot_for(&self, hand: Hand) -> usize;

    /// Begin the hold-to-eat action with the container in `hand`.
    fn start_using(&mut self, hand: Hand, use_ticks: u32);

    /// Abort whatever item use is in progress.
    fn clear_active_item(&mut self);

    /// Apply one bite of `food` to the player.
    ///
    /// `food` is mutated in place. Returns a replacement stack when the food
    /// turned into something else (a stew becoming a bowl).
    fn finish_using(&mut self, food: &mut ItemStack) -> Option<ItemStack>;

    /// Put a stack into the player's inventory, dropping what does not fit.
    fn offer_or_drop(&mut self, stack: ItemStack);

    /// Show the container screen for `session`.
    fn open_container_screen(&mut self, session: &ContainerSession);

    /// Close the container screen.
    fn close_container_screen(&mut self);
}
