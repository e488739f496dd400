//! Character data model module.
//!
//! # Purpose
//! Re-exports the character and item-stack models used by the API and store
//! layers, plus the inventory merge helper.
mod character;
pub mod inventory;

pub use character::{Character, CharacterRecord, ItemStack};
