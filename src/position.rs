//! Position reindexing for ordered sibling sets.
//!
//! Lists within a board and cards within a list carry dense zero-based
//! integer positions. The functions here compute the minimal set of position
//! updates needed to keep a sibling set dense through inserts, moves, and
//! deletes. They are pure: callers apply the returned updates atomically
//! against the backing store.

use crate::Id;

/// A single position assignment produced by a reindex computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionUpdate {
    /// The sibling to update.
    pub id: Id,
    /// Its new position.
    pub position: i64,
}

/// Result of a cross-parent move computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossParentMove {
    /// Updates closing the gap in the source sibling set.
    pub source_updates: Vec<PositionUpdate>,
    /// Updates opening a slot in the target sibling set.
    pub target_updates: Vec<PositionUpdate>,
    /// The position the mover takes in the target set.
    pub moving_position: i64,
}

/// Next append position for a sibling set: 0 if empty, else max + 1.
///
/// Appending never requires renumbering existing siblings.
pub fn next_position(siblings: &[(Id, i64)]) -> i64 {
    siblings.iter().map(|(_, p)| *p).max().map_or(0, |m| m + 1)
}

/// Compute updates for moving one sibling to a new position in its own set.
///
/// The requested position is clamped to `[0, n-1]`. Siblings between the
/// vacated and the landing slot shift by one toward the gap; everything else
/// is untouched, so the result is the minimal update set. Moving to the
/// current position yields no updates. Returns `None` if `moving_id` is not
/// in `siblings`.
pub fn move_within_parent(
    siblings: &[(Id, i64)],
    moving_id: &Id,
    new_position: i64,
) -> Option<Vec<PositionUpdate>> {
    let old_position = siblings
        .iter()
        .find(|(id, _)| id == moving_id)
        .map(|(_, p)| *p)?;

    let upper = (siblings.len() as i64 - 1).max(0);
    let new_position = new_position.clamp(0, upper);

    if new_position == old_position {
        return Some(Vec::new());
    }

    let mut updates = Vec::new();
    for (id, pos) in siblings {
        if id == moving_id {
            updates.push(PositionUpdate {
                id: id.clone(),
                position: new_position,
            });
        } else if old_position < *pos && *pos <= new_position {
            // The mover left a lower slot and landed above this sibling.
            updates.push(PositionUpdate {
                id: id.clone(),
                position: pos - 1,
            });
        } else if new_position <= *pos && *pos < old_position {
            // This sibling shifts right to fill the gap below it.
            updates.push(PositionUpdate {
                id: id.clone(),
                position: pos + 1,
            });
        }
    }
    Some(updates)
}

/// Compute updates for moving a sibling out of one set and into another.
///
/// Source siblings above the vacated slot close the gap; target siblings at
/// or above the (clamped) landing slot make room. The mover itself is
/// assigned `moving_position` and must be relocated by the caller in the same
/// atomic write. Returns `None` if `moving_id` is not in `source`.
pub fn move_across_parents(
    moving_id: &Id,
    source: &[(Id, i64)],
    target: &[(Id, i64)],
    target_position: i64,
) -> Option<CrossParentMove> {
    let old_position = source
        .iter()
        .find(|(id, _)| id == moving_id)
        .map(|(_, p)| *p)?;

    // Appending at the end of the target set is allowed.
    let moving_position = target_position.clamp(0, target.len() as i64);

    let source_updates = source
        .iter()
        .filter(|(id, pos)| id != moving_id && *pos > old_position)
        .map(|(id, pos)| PositionUpdate {
            id: id.clone(),
            position: pos - 1,
        })
        .collect();

    let target_updates = target
        .iter()
        .filter(|(_, pos)| *pos >= moving_position)
        .map(|(id, pos)| PositionUpdate {
            id: id.clone(),
            position: pos + 1,
        })
        .collect();

    Some(CrossParentMove {
        source_updates,
        target_updates,
        moving_position,
    })
}

/// Compute updates re-packing a sibling set after the sibling at
/// `removed_position` was deleted.
pub fn repack_after_delete(siblings: &[(Id, i64)], removed_position: i64) -> Vec<PositionUpdate> {
    siblings
        .iter()
        .filter(|(_, pos)| *pos > removed_position)
        .map(|(id, pos)| PositionUpdate {
            id: id.clone(),
            position: pos - 1,
        })
        .collect()
}
