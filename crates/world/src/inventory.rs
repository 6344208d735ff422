//! Player inventory: 36 main slots, a 9-slot hotbar selection and an off-hand slot.
//!
//! Used by hosts to hand items back to players (`add_item`) and to locate the
//! container stack a hand is holding.

use lunchbox_core::{Hand, ItemStack};

/// Number of slots in player inventory.
pub const INVENTORY_SIZE: usize = 36;

/// Number of hotbar slots (the first slots of the inventory).
pub const HOTBAR_SIZE: usize = 9;

/// Slot index used for the off hand.
pub const OFF_HAND_SLOT: usize = 40;

/// Player inventory with multiple slots.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInventory {
    slots: [Option<ItemStack>; INVENTORY_SIZE],
    off_hand: Option<ItemStack>,
    selected: usize,
}

impl PlayerInventory {
    /// Create a new empty inventory.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            off_hand: None,
            selected: 0,
        }
    }

    /// Selected hotbar slot.
    pub fn selected_slot(&self) -> usize {
        self.selected
    }

    /// Select a hotbar slot. Returns false if `slot` is not on the hotbar.
    pub fn select(&mut self, slot: usize) -> bool {
        if slot >= HOTBAR_SIZE {
            return false;
        }
        self.selected = slot;
        true
    }

    /// Slot index backing `hand`.
    pub fn slot_for(&self, hand: Hand) -> usize {
        match hand {
            Hand::Main => self.selected,
            Hand::Off => OFF_HAND_SLOT,
        }
    }

    /// Check that `slot` names a real slot.
    pub fn is_valid_slot(slot: usize) -> bool {
        slot < INVENTORY_SIZE || slot == OFF_HAND_SLOT
    }

    /// Get an item stack from a slot.
    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slot_ref(slot)?.as_ref()
    }

    /// Get a mutable reference to an item stack in a slot.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut ItemStack> {
        self.slot_mut(slot)?.as_mut()
    }

    /// Set an item stack in a slot.
    pub fn set(&mut self, slot: usize, stack: Option<ItemStack>) -> bool {
        match self.slot_mut(slot) {
            Some(entry) => {
                *entry = stack.filter(|stack| !stack.is_empty());
                true
            }
            None => false,
        }
    }

    /// Take an item stack from a slot, leaving it empty.
    pub fn take(&mut self, slot: usize) -> Option<ItemStack> {
        self.slot_mut(slot)?.take()
    }

    /// Try to add an item stack to the inventory, merging with existing stacks if possible.
    /// Returns the remaining items that couldn't fit (if any).
    pub fn add_item(&mut self, mut stack: ItemStack) -> Option<ItemStack> {
        // First pass: try to merge with existing stacks.
        for existing in self.slots.iter_mut().flatten() {
            if existing.can_merge(&stack) {
                let remainder = existing.add(stack.count);
                if remainder == 0 {
                    return None; // All items added
                }
                stack.count = remainder;
            }
        }

        // Second pass: find empty slots for the remainder.
        let max = stack.max_stack_size();
        for slot in &mut self.slots {
            if slot.is_none() {
                match stack.split(max) {
                    Some(part) => *slot = Some(part),
                    None => return None,
                }
                if stack.is_empty() {
                    return None;
                }
            }
        }

        // Couldn't fit all items.
        Some(stack)
    }

    /// Slot indices and stacks, main inventory first, then the off hand.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .chain(std::iter::once((OFF_HAND_SLOT, &self.off_hand)))
            .filter_map(|(index, slot)| slot.as_ref().map(|stack| (index, stack)))
    }

    /// Get the number of empty slots.
    pub fn empty_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    /// Check if the main inventory is completely full.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_some())
    }

    /// Slots whose contents differ from `before`, main inventory first.
    pub fn changed_slots(&self, before: &PlayerInventory) -> Vec<usize> {
        (0..INVENTORY_SIZE)
            .chain(std::iter::once(OFF_HAND_SLOT))
            .filter(|&slot| self.get(slot) != before.get(slot))
            .collect()
    }

    fn slot_ref(&self, slot: usize) -> Option<&Option<ItemStack>> {
        if slot == OFF_HAND_SLOT {
            Some(&self.off_hand)
        } else {
            self.slots.get(slot)
        }
    }

    fn slot_mut(&mut self, slot: usize) -> Option<&mut Option<ItemStack>> {
        if slot == OFF_HAND_SLOT {
            Some(&mut self.off_hand)
        } else {
            self.slots.get_mut(slot)
        }
    }
}

impl Default for PlayerInventory {
    fn default() -> Self {
        Self::new()
    }
}
