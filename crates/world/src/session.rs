//! Open container screens and the observer that closes them.
//!
//! A session remembers which container stack was opened and which player
//! inventory slot held it. Slot updates reported while the screen is open are
//! checked against that snapshot; once the container is no longer where it was
//! opened, the screen has to close.

use lunchbox_core::{ItemStack, PlayerId};

/// Which inventory a reported slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOwner {
    /// The watching player's own inventory.
    PlayerInventory,
    /// Any other inventory shown on the screen (the container's own slots).
    Other,
}

/// A slot content change reported by the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotChange {
    /// Inventory the slot belongs to.
    pub owner: SlotOwner,
    /// Slot index within that inventory.
    pub index: usize,
    /// New slot contents.
    pub stack: Option<ItemStack>,
}

impl SlotChange {
    /// A change in the player's own inventory.
    pub fn player(index: usize, stack: Option<ItemStack>) -> Self {
        Self {
            owner: SlotOwner::PlayerInventory,
            index,
            stack,
        }
    }

    /// A change in another inventory on screen.
    pub fn other(index: usize, stack: Option<ItemStack>) -> Self {
        Self {
            owner: SlotOwner::Other,
            index,
            stack,
        }
    }
}

/// What to do with the session after a slot change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionVerdict {
    /// Leave the screen open.
    Keep,
    /// Close the screen.
    Close,
}

/// An open container screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSession {
    owner: PlayerId,
    watched: ItemStack,
    watched_slot: usize,
}

impl ContainerSession {
    /// Start watching `watched` in the owner's inventory slot `watched_slot`.
    pub fn new(owner: PlayerId, watched: ItemStack, watched_slot: usize) -> Self {
        Self {
            owner,
            watched,
            watched_slot,
        }
    }

    /// Player the screen is open for.
    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Snapshot of the opened container.
    pub fn watched(&self) -> &ItemStack {
        &self.watched
    }

    /// Player inventory slot holding the container.
    pub fn watched_slot(&self) -> usize {
        self.watched_slot
    }

    /// Refresh the snapshot after the screen itself edited the container.
    pub fn follow(&mut self, updated: &ItemStack) {
        self.watched = updated.clone();
    }

    /// Decide whether a slot change invalidates the session.
    pub fn observe(&self, change: &SlotChange) -> SessionVerdict {
        let holds_container = change.stack.as_ref() == Some(&self.watched);
        let is_watched_slot =
            change.owner == SlotOwner::PlayerInventory && change.index == self.watched_slot;

        if is_watched_slot != holds_container {
            // Either the container left its slot, or it showed up somewhere else.
            SessionVerdict::Close
        } else {
            SessionVerdict::Keep
        }
    }
}
