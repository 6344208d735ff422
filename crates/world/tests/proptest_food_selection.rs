//! Property-based tests for container food selection
//!
//! Validates selection invariants:
//! - The winner does not depend on anything but the candidate list
//! - A candidate that fills the player up always beats one that doesn't
//! - Among satisfying candidates the smallest overshoot wins
//! - Among insufficient candidates the most nutrition wins
//! - Container payloads never expose more slots than the capacity

use lunchbox_core::{ContainerKind, FoodType, ItemStack, ItemType};
use lunchbox_world::{select_best, ContainerInventory, FoodCandidate};
use proptest::prelude::*;

fn candidates() -> impl Strategy<Value = Vec<FoodCandidate>> {
    prop::collection::vec((1i32..=12, prop_oneof![Just(16u32), Just(32u32), Just(40u32)]), 1..10)
        .prop_map(|foods| {
            foods
                .into_iter()
                .enumerate()
                .map(|(slot_index, (nutrition, consume_ticks))| FoodCandidate {
                    slot_index,
                    nutrition,
                    consume_ticks,
                })
                .collect()
        })
}

proptest! {
    /// Property: Selection is a pure function of its inputs
    #[test]
    fn selection_is_deterministic(candidates in candidates(), required in 0i32..=20) {
        let first = select_best(&candidates, required);
        let second = select_best(&candidates, required);
        prop_assert_eq!(first, second);
        prop_assert!(first.is_some());
    }

    /// Property: A satisfying candidate wins whenever one exists
    #[test]
    fn satisfying_candidate_is_preferred(candidates in candidates(), required in 0i32..=20) {
        let best = select_best(&candidates, required).unwrap();
        let any_satisfying = candidates.iter().any(|c| c.nutrition >= required);
        prop_assert_eq!(best.nutrition >= required, any_satisfying);
    }

    /// Property: The winner's nutrition is optimal for its category
    #[test]
    fn winner_minimises_overshoot_or_undershoot(
        candidates in candidates(),
        required in 0i32..=20,
    ) {
        let best = select_best(&candidates, required).unwrap();
        if best.nutrition >= required {
            let least = candidates
                .iter()
                .filter(|c| c.nutrition >= required)
                .map(|c| c.nutrition)
                .min()
                .unwrap();
            prop_assert_eq!(best.nutrition, least);
        } else {
            let most = candidates.iter().map(|c| c.nutrition).max().unwrap();
            prop_assert_eq!(best.nutrition, most);
        }
    }

    /// Property: Equal nutrition goes to the fastest food, then the lowest slot
    #[test]
    fn ties_break_on_speed_then_slot(candidates in candidates(), required in 0i32..=20) {
        let best = select_best(&candidates, required).unwrap();
        let rivals: Vec<_> = candidates
            .iter()
            .filter(|c| c.nutrition == best.nutrition)
            .collect();
        let fastest = rivals.iter().map(|c| c.consume_ticks).min().unwrap();
        prop_assert_eq!(best.consume_ticks, fastest);

        let first_fastest = rivals
            .iter()
            .find(|c| c.consume_ticks == fastest)
            .map(|c| c.slot_index);
        prop_assert_eq!(Some(best.slot_index), first_fastest);
    }

    /// Property: Loading clamps any stored slot list to the container capacity
    #[test]
    fn capacity_is_clamped(stored in 0usize..30, capacity in 1usize..20) {
        let mut wide = ItemStack::container(ContainerKind::PicnicBasket);
        {
            let mut inv = ContainerInventory::load(&mut wide, stored);
            for slot in 0..stored {
                inv.set(slot, Some(ItemStack::new(ItemType::Food(FoodType::Cookie), 1)))
                    .unwrap();
            }
        }

        let inv = ContainerInventory::load(&mut wide, capacity);
        prop_assert_eq!(inv.capacity(), capacity);
        prop_assert_eq!(inv.occupied().count(), stored.min(capacity));
        prop_assert!(inv.get(capacity).is_err());
    }
}
