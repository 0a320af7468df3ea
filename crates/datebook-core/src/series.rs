//! Scoped mutation of occurrences that may belong to a series.
//!
//! Removal only ever happens through [`delete`]. Edits always touch a single
//! occurrence: siblings are never rewritten and the series identity is kept,
//! so an edited occurrence still goes away with its series.

use crate::civil::CivilDateTime;
use crate::error::{DatebookError, Result};
use crate::model::{Occurrence, OccurrenceKind};

/// How far a deletion reaches into the target's series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeleteScope {
    /// Just the target.
    #[default]
    ThisOnly,
    /// The target and every series member starting at or after it.
    ThisAndFuture,
    /// Every member of the target's series.
    All,
}

/// Remove `target_id` and, depending on `scope`, members of its series.
///
/// A target without a series identity is removed alone whatever the scope.
/// Returns the number of occurrences removed; an unknown target removes nothing.
pub fn delete(items: &mut Vec<Occurrence>, target_id: &str, scope: DeleteScope) -> usize {
    let Some(target) = items.iter().find(|o| o.id == target_id) else {
        tracing::debug!(id = target_id, "delete target not found");
        return 0;
    };
    let series_id = target.series_id.clone();
    let target_start = target.start;
    let before = items.len();

    if series_id.is_empty() {
        items.retain(|o| o.id != target_id);
    } else {
        match scope {
            DeleteScope::ThisOnly => items.retain(|o| o.id != target_id),
            DeleteScope::All => items.retain(|o| o.series_id != series_id),
            DeleteScope::ThisAndFuture => {
                items.retain(|o| o.series_id != series_id || o.start < target_start)
            }
        }
    }

    let removed = before - items.len();
    tracing::debug!(id = target_id, ?scope, series = %series_id, removed, "deleted occurrences");
    removed
}

/// Field changes for a single occurrence. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccurrenceEdit {
    pub title: Option<String>,
    pub kind: Option<OccurrenceKind>,
    pub group_id: Option<String>,
    pub start: Option<CivilDateTime>,
    pub end: Option<CivilDateTime>,
}

impl OccurrenceEdit {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply `edit` to the occurrence `target_id` only.
///
/// Tasks always end when they start. An event whose end is not given keeps its
/// duration from the (possibly new) start. Returns `Ok(false)` when the target
/// does not exist. On error nothing is changed.
///
/// # Errors
/// Returns `DatebookError::Validation` for an empty title or an event that
/// would end before it starts.
pub fn edit(items: &mut [Occurrence], target_id: &str, edit: &OccurrenceEdit) -> Result<bool> {
    let Some(target) = items.iter_mut().find(|o| o.id == target_id) else {
        tracing::debug!(id = target_id, "edit target not found");
        return Ok(false);
    };

    let title = match &edit.title {
        Some(title) if title.trim().is_empty() => {
            return Err(DatebookError::validation("title required"));
        }
        Some(title) => title.clone(),
        None => target.title.clone(),
    };
    let kind = edit.kind.unwrap_or(target.kind);
    let start = edit.start.unwrap_or(target.start);
    let end = match kind {
        OccurrenceKind::Task => start,
        OccurrenceKind::Event => match edit.end {
            Some(end) if end < start => {
                return Err(DatebookError::validation("event ends before it starts"));
            }
            Some(end) => end,
            None => start + target.duration().max(chrono::Duration::zero()),
        },
    };

    target.title = title;
    target.kind = kind;
    target.start = start;
    target.end = end;
    if let Some(group_id) = &edit.group_id {
        target.group_id = group_id.clone();
    }
    tracing::debug!(id = target_id, "edited occurrence");
    Ok(true)
}

/// Set the completion flag of one occurrence. Returns whether it was found.
pub fn set_completed(items: &mut [Occurrence], target_id: &str, completed: bool) -> bool {
    match items.iter_mut().find(|o| o.id == target_id) {
        Some(target) => {
            target.completed = completed;
            true
        }
        None => false,
    }
}

/// Flip the completion flag of one occurrence, returning the new value.
pub fn toggle_completed(items: &mut [Occurrence], target_id: &str) -> Option<bool> {
    let target = items.iter_mut().find(|o| o.id == target_id)?;
    target.completed = !target.completed;
    Some(target.completed)
}
