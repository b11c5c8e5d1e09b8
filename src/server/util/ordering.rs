//! Dense kanban positions.
//!
//! Columns hold task ids in display order; positions are always `0..n`. These helpers
//! compute the new orderings and leave persistence to the caller.

/// Result of moving a task between (or within) columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// New order of the source column. Empty when moving within one column.
    pub source: Vec<i32>,
    /// New order of the target column, including the moved task.
    pub target: Vec<i32>,
}

/// Removes `task_id` from `source` and inserts it into `target` at `position`.
///
/// `position` is clamped to `0..=target.len()` after removal. When `same_column` is set,
/// `source` and `target` describe the same column and only `target` is returned.
pub fn plan_move(
    source: &[i32],
    target: &[i32],
    task_id: i32,
    position: i32,
    same_column: bool,
) -> MovePlan {
    let mut target: Vec<i32> = target.iter().copied().filter(|id| *id != task_id).collect();
    let index = position.clamp(0, target.len() as i32) as usize;
    target.insert(index, task_id);

    let source = if same_column {
        Vec::new()
    } else {
        source.iter().copied().filter(|id| *id != task_id).collect()
    };

    MovePlan { source, target }
}

/// Appends `ids` after `existing`, keeping both relative orders.
pub fn append(existing: &[i32], ids: &[i32]) -> Vec<i32> {
    existing.iter().chain(ids.iter()).copied().collect()
}

/// Checks that `ids` is a permutation of `current`.
pub fn is_permutation(current: &[i32], ids: &[i32]) -> bool {
    if current.len() != ids.len() {
        return false;
    }

    let mut a = current.to_vec();
    let mut b = ids.to_vec();
    a.sort_unstable();
    b.sort_unstable();

    a == b
}
