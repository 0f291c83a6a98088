//! Reorder Protocol - pure list operations behind the atomic reorder.
//!
//! Clients always submit the complete new order. Both the up/down controls and
//! drag-and-drop reduce to computing that full list here.

use std::collections::HashSet;

use super::error::{BlockError, Result};
use super::types::{Direction, OrderAssignment};

/// Turn an ordered id list into `(id, index)` assignments.
pub fn assignments_from_ids(ids: &[i64]) -> Vec<OrderAssignment> {
    ids.iter()
        .enumerate()
        .map(|(index, &id)| OrderAssignment {
            id,
            block_order: index as i64,
        })
        .collect()
}

/// Check that `assignments` names every id in `existing` exactly once and that
/// the orders are exactly `0..N`.
pub fn validate_permutation(existing: &[i64], assignments: &[OrderAssignment]) -> Result<()> {
    if assignments.len() != existing.len() {
        return Err(BlockError::MalformedReorder(format!(
            "expected {} blocks, got {}",
            existing.len(),
            assignments.len()
        )));
    }

    let known: HashSet<i64> = existing.iter().copied().collect();
    let mut seen_ids = HashSet::with_capacity(assignments.len());
    let mut seen_orders = HashSet::with_capacity(assignments.len());
    let n = assignments.len() as i64;

    for assignment in assignments {
        if !known.contains(&assignment.id) {
            return Err(BlockError::MalformedReorder(format!(
                "unknown block id {}",
                assignment.id
            )));
        }
        if !seen_ids.insert(assignment.id) {
            return Err(BlockError::MalformedReorder(format!(
                "block id {} appears more than once",
                assignment.id
            )));
        }
        if !(0..n).contains(&assignment.block_order) {
            return Err(BlockError::MalformedReorder(format!(
                "order {} for block {} is outside 0..{}",
                assignment.block_order, assignment.id, n
            )));
        }
        if !seen_orders.insert(assignment.block_order) {
            return Err(BlockError::MalformedReorder(format!(
                "order {} is assigned more than once",
                assignment.block_order
            )));
        }
    }
    Ok(())
}

fn position_of(ids: &[i64], id: i64) -> Result<usize> {
    ids.iter()
        .position(|&candidate| candidate == id)
        .ok_or(BlockError::NotFound(id))
}

/// Swap `id` with its neighbour. Moving past either end leaves the list as is.
pub fn move_step(ids: &[i64], id: i64, direction: Direction) -> Result<Vec<i64>> {
    let from = position_of(ids, id)?;
    let mut reordered = ids.to_vec();
    match direction {
        Direction::Up if from > 0 => reordered.swap(from, from - 1),
        Direction::Down if from + 1 < ids.len() => reordered.swap(from, from + 1),
        _ => {}
    }
    Ok(reordered)
}

/// Remove `id` from its slot and splice it in at `index`, clamped to the end.
pub fn move_to(ids: &[i64], id: i64, index: usize) -> Result<Vec<i64>> {
    let from = position_of(ids, id)?;
    let mut reordered = ids.to_vec();
    let moved = reordered.remove(from);
    let to = index.min(reordered.len());
    reordered.insert(to, moved);
    Ok(reordered)
}
