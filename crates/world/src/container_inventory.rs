//! Slot inventory stored inside a food container item.
//!
//! The slots live in the container stack's `contents` payload. A
//! [`ContainerInventory`] is materialised from that payload on every access and
//! writes the full slot list back after each mutation, so the payload is always
//! the authoritative copy.

use lunchbox_core::ItemStack;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Current container payload format version.
const PAYLOAD_VERSION: u8 = 1;

/// Errors raised by slot access.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Slot index outside `[0, capacity)`.
    #[error("slot {index} out of range for container with {capacity} slots")]
    IndexOutOfRange {
        /// Requested slot.
        index: usize,
        /// Number of slots in the container.
        capacity: usize,
    },
    /// The slot list could not be encoded into the payload.
    #[error("failed to encode container payload: {0}")]
    Encode(#[from] bincode::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct ContainerPayload {
    version: u8,
    slots: Vec<Option<ItemStack>>,
}

/// Fill summary shown in container tooltips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSummary {
    /// Slots holding something.
    pub filled_slots: usize,
    /// Total slots.
    pub capacity: usize,
    /// Items across all slots.
    pub item_count: u32,
}

impl ContainerSummary {
    /// Tooltip line for the container.
    pub fn describe(&self) -> String {
        if self.filled_slots == 0 {
            "Empty".to_string()
        } else {
            format!(
                "{}/{} slots, {} items",
                self.filled_slots, self.capacity, self.item_count
            )
        }
    }
}

/// Fixed-size slot inventory bound to one container stack.
#[derive(Debug)]
pub struct ContainerInventory<'a> {
    container: &'a mut ItemStack,
    slots: Vec<Option<ItemStack>>,
}

impl<'a> ContainerInventory<'a> {
    /// Load `capacity` slots from the container's payload.
    ///
    /// Never fails: a missing or unreadable payload yields empty slots, and
    /// entries past `capacity` are ignored.
    pub fn load(container: &'a mut ItemStack, capacity: usize) -> Self {
        let mut slots = decode_slots(container.contents.as_deref());
        slots.truncate(capacity);
        slots.resize(capacity, None);
        for slot in &mut slots {
            if slot.as_ref().is_some_and(ItemStack::is_empty) {
                *slot = None;
            }
        }
        Self { container, slots }
    }

    /// Load using the capacity of the container's kind.
    ///
    /// Returns `None` if the stack is not a food container.
    pub fn open(container: &'a mut ItemStack) -> Option<Self> {
        let capacity = container.container_kind()?.capacity();
        Some(Self::load(container, capacity))
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Contents of a slot.
    pub fn get(&self, index: usize) -> Result<Option<&ItemStack>, InventoryError> {
        self.check_index(index)?;
        Ok(self.slots[index].as_ref())
    }

    /// Replace a slot's contents and persist.
    ///
    /// A stack with a count of zero is stored as an empty slot.
    pub fn set(&mut self, index: usize, stack: Option<ItemStack>) -> Result<(), InventoryError> {
        self.check_index(index)?;
        self.slots[index] = stack.filter(|stack| !stack.is_empty());
        self.mark_dirty()
    }

    /// Take everything out of a slot and persist.
    pub fn remove_all(&mut self, index: usize) -> Result<Option<ItemStack>, InventoryError> {
        self.check_index(index)?;
        let taken = self.slots[index].take();
        self.mark_dirty()?;
        Ok(taken)
    }

    /// Split up to `count` items off a slot, leaving the rest in place, and persist.
    pub fn remove_partial(
        &mut self,
        index: usize,
        count: u32,
    ) -> Result<Option<ItemStack>, InventoryError> {
        self.check_index(index)?;
        let slot = &mut self.slots[index];
        let split = slot.as_mut().and_then(|stack| stack.split(count));
        if slot.as_ref().is_some_and(ItemStack::is_empty) {
            *slot = None;
        }
        self.mark_dirty()?;
        Ok(split)
    }

    /// Whether `stack` may be placed into the container.
    ///
    /// Only food is accepted, and never another food container.
    pub fn is_acceptable(&self, _index: usize, stack: &ItemStack) -> bool {
        stack.food_properties().is_some() && !stack.is_food_container()
    }

    /// True if every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Non-empty slots with their indices, in slot order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|stack| (index, stack)))
    }

    /// Fill summary for tooltips.
    pub fn summary(&self) -> ContainerSummary {
        ContainerSummary {
            filled_slots: self.occupied().count(),
            capacity: self.capacity(),
            item_count: self.occupied().map(|(_, stack)| stack.count).sum(),
        }
    }

    /// Empty every slot and hand back what was inside, e.g. when the container is destroyed.
    pub fn spill_contents(&mut self) -> Result<Vec<ItemStack>, InventoryError> {
        let spilled = self.slots.iter_mut().filter_map(Option::take).collect();
        self.mark_dirty()?;
        Ok(spilled)
    }

    /// Re-serialise the full slot list into the container payload.
    pub fn mark_dirty(&mut self) -> Result<(), InventoryError> {
        let payload = ContainerPayload {
            version: PAYLOAD_VERSION,
            slots: self.slots.clone(),
        };
        self.container.contents = Some(bincode::serialize(&payload)?);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), InventoryError> {
        if index < self.slots.len() {
            Ok(())
        } else {
            Err(InventoryError::IndexOutOfRange {
                index,
                capacity: self.slots.len(),
            })
        }
    }
}

fn decode_slots(bytes: Option<&[u8]>) -> Vec<Option<ItemStack>> {
    let Some(bytes) = bytes else {
        return Vec::new();
    };
    match bincode::deserialize::<ContainerPayload>(bytes) {
        Ok(payload) if payload.version == PAYLOAD_VERSION => payload.slots,
        Ok(payload) => {
            warn!(
                version = payload.version,
                "Unsupported container payload version, treating container as empty"
            );
            Vec::new()
        }
        Err(err) => {
            debug!(%err, "Unreadable container payload, treating container as empty");
            Vec::new()
        }
    }
}
