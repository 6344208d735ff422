#![warn(missing_docs)]
//! Food container gameplay: slot storage, automatic food selection and the
//! use/eat/open state machine.

mod consumption;
mod container_inventory;
mod eat_guard;
mod food_history;
mod food_selection;
mod inventory;
mod session;

pub mod host;

pub use consumption::*;
pub use container_inventory::*;
pub use eat_guard::*;
pub use food_history::*;
pub use food_selection::*;
pub use host::{
    eat_one, take_bite, BaseFoodResolver, Bite, ContainerUser, FoodResolver, HungerPolicy,
    MAX_FOOD_LEVEL,
};
pub use inventory::*;
pub use session::*;
