//! Character model definitions.
//!
//! # Purpose
//! Defines the character document shape persisted under `users/{uid}` and
//! the item stacks held in a character's inventory.
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One quantity of a single item type held in an inventory.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemStack {
    pub item_id: String,
    pub item_count: u64,
}

/// A character document as stored, without its id.
///
/// The id lives outside the document body: the store assigns it and callers
/// address the document by it, matching the persisted layout where the id is
/// the document key rather than a field.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Character {
    pub name: String,
    pub level: u32,
    pub inventory: Vec<ItemStack>,
}

impl Character {
    /// A freshly created character: level 1, empty inventory.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: 1,
            inventory: Vec::new(),
        }
    }
}

/// A character document annotated with its store-assigned id, as returned to
/// API clients.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct CharacterRecord {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub inventory: Vec<ItemStack>,
}

impl CharacterRecord {
    pub fn from_character(id: impl Into<String>, character: Character) -> Self {
        Self {
            id: id.into(),
            name: character.name,
            level: character.level,
            inventory: character.inventory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_character_defaults() {
        let character = Character::new("Aria");
        assert_eq!(character.name, "Aria");
        assert_eq!(character.level, 1);
        assert!(character.inventory.is_empty());
    }

    #[test]
    fn item_stack_uses_camel_case_wire_form() {
        let stack = ItemStack {
            item_id: "sword".to_string(),
            item_count: 2,
        };
        let json = serde_json::to_value(&stack).expect("serialize");
        assert_eq!(json["itemId"], "sword");
        assert_eq!(json["itemCount"], 2);
    }

    #[test]
    fn item_stack_rejects_unknown_fields() {
        let raw = serde_json::json!({ "itemId": "sword", "itemCount": 1, "rarity": "epic" });
        assert!(serde_json::from_value::<ItemStack>(raw).is_err());
    }
}
