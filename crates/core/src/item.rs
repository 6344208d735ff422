//! Item system - Food, food containers, and the stacks that carry them

use serde::{Deserialize, Serialize};

/// Default number of ticks it takes to eat a food item.
pub const DEFAULT_CONSUME_TICKS: u32 = 32;

/// Item type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    /// Edible item
    Food(FoodType),
    /// Portable multi-slot food container
    FoodContainer(ContainerKind),
    /// Empty bowl left behind by stews
    Bowl,
    /// Empty glass bottle left behind by drinkables
    GlassBottle,
    /// A placeable block
    Block(u16), // BlockId
    /// Generic item
    Item(u16),
}

/// Food types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodType {
    /// Apple
    Apple,
    /// Bread
    Bread,
    /// Cooked beef
    CookedBeef,
    /// Cooked chicken
    CookedChicken,
    /// Carrot
    Carrot,
    /// Baked potato
    BakedPotato,
    /// Golden carrot
    GoldenCarrot,
    /// Golden apple (always edible)
    GoldenApple,
    /// Chorus fruit (always edible)
    ChorusFruit,
    /// Cookie
    Cookie,
    /// Melon slice
    MelonSlice,
    /// Sweet berries
    SweetBerries,
    /// Dried kelp (eaten twice as fast)
    DriedKelp,
    /// Mushroom stew (leaves a bowl)
    MushroomStew,
    /// Rabbit stew (leaves a bowl)
    RabbitStew,
    /// Honey bottle (drunk slowly, leaves a bottle)
    HoneyBottle,
}

/// Kinds of food container, each with a fixed number of slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    /// Small paper bag
    PaperBag,
    /// Lunch box
    LunchBox,
    /// Picnic basket
    PicnicBasket,
}

/// Nutrition data resolved for a single food item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodProperties {
    /// Hunger points restored (0-20 scale).
    pub nutrition: i32,
    /// Saturation points restored.
    pub saturation: f32,
    /// Ticks the eat action takes.
    pub consume_ticks: u32,
    /// Whether the food can be eaten on a full stomach.
    pub always_edible: bool,
}

impl FoodType {
    /// Every food type, in registry order.
    pub const ALL: [FoodType; 16] = [
        FoodType::Apple,
        FoodType::Bread,
        FoodType::CookedBeef,
        FoodType::CookedChicken,
        FoodType::Carrot,
        FoodType::BakedPotato,
        FoodType::GoldenCarrot,
        FoodType::GoldenApple,
        FoodType::ChorusFruit,
        FoodType::Cookie,
        FoodType::MelonSlice,
        FoodType::SweetBerries,
        FoodType::DriedKelp,
        FoodType::MushroomStew,
        FoodType::RabbitStew,
        FoodType::HoneyBottle,
    ];

    /// Base food properties before any per-stack modifiers.
    pub fn properties(self) -> FoodProperties {
        let (nutrition, saturation) = match self {
            FoodType::Apple => (4, 2.4),
            FoodType::Bread => (5, 6.0),
            FoodType::CookedBeef => (8, 12.8),
            FoodType::CookedChicken => (6, 7.2),
            FoodType::Carrot => (3, 3.6),
            FoodType::BakedPotato => (5, 6.0),
            FoodType::GoldenCarrot => (6, 14.4),
            FoodType::GoldenApple => (4, 9.6),
            FoodType::ChorusFruit => (4, 2.4),
            FoodType::Cookie => (2, 0.4),
            FoodType::MelonSlice => (2, 1.2),
            FoodType::SweetBerries => (2, 0.4),
            FoodType::DriedKelp => (1, 0.6),
            FoodType::MushroomStew => (6, 7.2),
            FoodType::RabbitStew => (10, 12.0),
            FoodType::HoneyBottle => (6, 1.2),
        };
        let consume_ticks = match self {
            FoodType::DriedKelp => DEFAULT_CONSUME_TICKS / 2,
            FoodType::HoneyBottle => 40,
            _ => DEFAULT_CONSUME_TICKS,
        };
        FoodProperties {
            nutrition,
            saturation,
            consume_ticks,
            always_edible: matches!(self, FoodType::GoldenApple | FoodType::ChorusFruit),
        }
    }

    /// Item left in place once the food has been consumed, if any.
    pub fn leftover(self) -> Option<ItemType> {
        match self {
            FoodType::MushroomStew | FoodType::RabbitStew => Some(ItemType::Bowl),
            FoodType::HoneyBottle => Some(ItemType::GlassBottle),
            _ => None,
        }
    }

    /// Registry key used by commands and logs.
    pub fn key(self) -> &'static str {
        match self {
            FoodType::Apple => "apple",
            FoodType::Bread => "bread",
            FoodType::CookedBeef => "cooked_beef",
            FoodType::CookedChicken => "cooked_chicken",
            FoodType::Carrot => "carrot",
            FoodType::BakedPotato => "baked_potato",
            FoodType::GoldenCarrot => "golden_carrot",
            FoodType::GoldenApple => "golden_apple",
            FoodType::ChorusFruit => "chorus_fruit",
            FoodType::Cookie => "cookie",
            FoodType::MelonSlice => "melon_slice",
            FoodType::SweetBerries => "sweet_berries",
            FoodType::DriedKelp => "dried_kelp",
            FoodType::MushroomStew => "mushroom_stew",
            FoodType::RabbitStew => "rabbit_stew",
            FoodType::HoneyBottle => "honey_bottle",
        }
    }

    /// Look up a food type by its registry key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|food| food.key() == key)
    }
}

impl ContainerKind {
    /// Number of slots the container holds.
    pub fn capacity(self) -> usize {
        match self {
            ContainerKind::PaperBag => 5,
            ContainerKind::LunchBox => 9,
            ContainerKind::PicnicBasket => 18,
        }
    }

    /// Registry key used by commands and logs.
    pub fn key(self) -> &'static str {
        match self {
            ContainerKind::PaperBag => "paper_bag",
            ContainerKind::LunchBox => "lunch_box",
            ContainerKind::PicnicBasket => "picnic_basket",
        }
    }

    /// Look up a container kind by its registry key.
    pub fn from_key(key: &str) -> Option<Self> {
        [
            ContainerKind::PaperBag,
            ContainerKind::LunchBox,
            ContainerKind::PicnicBasket,
        ]
        .into_iter()
        .find(|kind| kind.key() == key)
    }
}

impl ItemType {
    /// Maximum stack size for this item type
    pub fn max_stack_size(self) -> u32 {
        match self {
            ItemType::FoodContainer(_) => 1,
            ItemType::Food(FoodType::MushroomStew | FoodType::RabbitStew) => 1,
            ItemType::Food(FoodType::HoneyBottle) => 16,
            _ => 64,
        }
    }

    /// Parse `food:<key>`, `container:<key>`, `bowl`, `glass_bottle`, `block:<id>` or `item:<id>`.
    ///
    /// A bare food or container key is accepted as a shorthand.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_lowercase();
        if let Some(rest) = token.strip_prefix("food:") {
            return FoodType::from_key(rest).map(ItemType::Food);
        }
        if let Some(rest) = token.strip_prefix("container:") {
            return ContainerKind::from_key(rest).map(ItemType::FoodContainer);
        }
        if let Some(rest) = token.strip_prefix("block:") {
            return rest.parse().ok().map(ItemType::Block);
        }
        if let Some(rest) = token.strip_prefix("item:") {
            return rest.parse().ok().map(ItemType::Item);
        }
        match token.as_str() {
            "bowl" => Some(ItemType::Bowl),
            "glass_bottle" => Some(ItemType::GlassBottle),
            other => FoodType::from_key(other)
                .map(ItemType::Food)
                .or_else(|| ContainerKind::from_key(other).map(ItemType::FoodContainer)),
        }
    }
}

/// An item stack in inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Type of item
    pub item_type: ItemType,
    /// Quantity in stack
    pub count: u32,
    /// Persisted container payload (None for anything that is not a container)
    pub contents: Option<Vec<u8>>,
}

impl ItemStack {
    /// Create a new item stack
    pub fn new(item_type: ItemType, count: u32) -> Self {
        Self {
            item_type,
            count,
            contents: None,
        }
    }

    /// Create a single, empty food container
    pub fn container(kind: ContainerKind) -> Self {
        Self::new(ItemType::FoodContainer(kind), 1)
    }

    /// Maximum stack size for this item type
    pub fn max_stack_size(&self) -> u32 {
        self.item_type.max_stack_size()
    }

    /// A stack with no items left in it
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if this stack can accept more items
    pub fn can_add(&self, count: u32) -> bool {
        self.count
            .checked_add(count)
            .is_some_and(|total| total <= self.max_stack_size())
    }

    /// Check if this stack can merge with another stack.
    pub fn can_merge(&self, other: &ItemStack) -> bool {
        self.item_type == other.item_type && self.contents == other.contents
    }

    /// Try to add items to this stack, returning the amount that didn't fit.
    pub fn add(&mut self, amount: u32) -> u32 {
        let space = self.max_stack_size().saturating_sub(self.count);
        let added = amount.min(space);
        self.count += added;
        amount - added
    }

    /// Split this stack, taking up to `amount` items into a new stack.
    ///
    /// Returns `None` when nothing could be taken.
    pub fn split(&mut self, amount: u32) -> Option<ItemStack> {
        let taken = amount.min(self.count);
        if taken == 0 {
            return None;
        }
        self.count -= taken;
        Some(ItemStack {
            item_type: self.item_type,
            count: taken,
            contents: self.contents.clone(),
        })
    }

    /// Food type, if this stack holds food
    pub fn food_type(&self) -> Option<FoodType> {
        match self.item_type {
            ItemType::Food(food) => Some(food),
            _ => None,
        }
    }

    /// Base food properties, if this stack holds food
    pub fn food_properties(&self) -> Option<FoodProperties> {
        self.food_type().map(FoodType::properties)
    }

    /// Check if this stack is a food container
    pub fn is_food_container(&self) -> bool {
        matches!(self.item_type, ItemType::FoodContainer(_))
    }

    /// Container kind, if this stack is a food container
    pub fn container_kind(&self) -> Option<ContainerKind> {
        match self.item_type {
            ItemType::FoodContainer(kind) => Some(kind),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.item_type {
            ItemType::Food(food) => write!(f, "{}x {}", self.count, food.key()),
            ItemType::FoodContainer(kind) => write!(f, "{}x {}", self.count, kind.key()),
            ItemType::Bowl => write!(f, "{}x bowl", self.count),
            ItemType::GlassBottle => write!(f, "{}x glass_bottle", self.count),
            ItemType::Block(id) => write!(f, "{}x block:{id}", self.count),
            ItemType::Item(id) => write!(f, "{}x item:{id}", self.count),
        }
    }
}
