//! Inventory merge logic.
//!
//! # Purpose
//! Folds an incoming item delta into a character's inventory while keeping
//! the one-stack-per-item invariant.
//!
//! # Key invariants
//! - After a merge, each distinct `item_id` appears in at most one stack.
//! - Merging never reorders stacks other than removing duplicates; the
//!   surviving stack for an item keeps its original position, and new items
//!   are appended at the end.
//!
//! # Notes
//! Earlier writers of this data appended a new stack on every update (or
//! wrote a summed stack without removing the ones it summed), so documents
//! in the wild can hold several stacks for the same item. The merge folds
//! any such duplicates into the first occurrence, which means legacy
//! documents converge to the invariant on their next update.
use crate::model::ItemStack;

/// Merge `delta` into `inventory` in place.
///
/// If a stack for `delta.item_id` exists its count is incremented;
/// otherwise the delta is appended as a new stack. Duplicate stacks for the
/// same item are folded into the first occurrence as part of the same pass.
pub fn merge_stack(inventory: &mut Vec<ItemStack>, delta: ItemStack) {
    let mut total = delta.item_count;
    let mut slot: Option<usize> = None;
    let mut idx = 0;
    while idx < inventory.len() {
        if inventory[idx].item_id == delta.item_id {
            total = total.saturating_add(inventory[idx].item_count);
            if slot.is_none() {
                slot = Some(idx);
                idx += 1;
            } else {
                // Duplicate left behind by a legacy writer.
                inventory.remove(idx);
            }
        } else {
            idx += 1;
        }
    }
    match slot {
        Some(existing) => inventory[existing].item_count = total,
        None => inventory.push(ItemStack {
            item_id: delta.item_id,
            item_count: total,
        }),
    }
}
