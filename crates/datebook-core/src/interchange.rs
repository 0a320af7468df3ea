//! Mapping between occurrences and the generic `{identity, title, start, end}`
//! interchange record used for import and export.
//!
//! Exported titles carry the group name as a `[Group] ` prefix. Import strips
//! that prefix again and files the record under the named group when it
//! exists, so an export/import round trip keeps titles and groups intact.
//! Series identity does not survive the boundary.

use crate::civil::CivilDateTime;
use crate::ids::IdGenerator;
use crate::model::{Group, Occurrence, OccurrenceKind};
use crate::view;

/// Title given to imported records that have none.
pub const UNTITLED: &str = "(No title)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterchangeRecord {
    pub identity: String,
    pub title: String,
    pub start: CivilDateTime,
    pub end: CivilDateTime,
}

/// One record per occurrence, titled `[<group name>] <title>`.
pub fn export_records(occurrences: &[Occurrence], groups: &[Group]) -> Vec<InterchangeRecord> {
    occurrences
        .iter()
        .map(|o| InterchangeRecord {
            identity: o.id.clone(),
            title: format!("[{}] {}", view::group_name(groups, &o.group_id), o.title),
            start: o.start,
            end: o.end,
        })
        .collect()
}

/// Turn external records into fresh, non-series occurrences.
///
/// Records whose title names an existing group go to that group; everything
/// else lands in `default_group_id` (empty when the calendar has no groups,
/// which renders as unassigned). A record is an `Event` when its start and
/// end differ, otherwise a `Task`.
pub fn import_records(
    records: &[InterchangeRecord],
    groups: &[Group],
    default_group_id: &str,
    ids: &mut IdGenerator,
) -> Vec<Occurrence> {
    let mut batch = ids.import_batch();
    records
        .iter()
        .map(|record| {
            let (group_id, title) = match match_group_prefix(&record.title, groups) {
                Some((group, title)) => (group.id.as_str(), title),
                None => (default_group_id, split_group_prefix(&record.title).1),
            };
            let title = if title.trim().is_empty() {
                UNTITLED.to_string()
            } else {
                title.to_string()
            };
            let kind = if record.start == record.end {
                OccurrenceKind::Task
            } else {
                OccurrenceKind::Event
            };
            Occurrence {
                id: batch.next_id(),
                title,
                start: record.start,
                end: record.end,
                kind,
                group_id: group_id.to_string(),
                completed: false,
                series_id: String::new(),
                legacy_group_name: None,
            }
        })
        .collect()
}

/// The existing group whose `[<name>] ` prefix opens `title`, with the rest of
/// the title. The longest name wins, so names containing `"] "` still match.
pub fn match_group_prefix<'a>(
    title: &'a str,
    groups: &'a [Group],
) -> Option<(&'a Group, &'a str)> {
    let rest = title.strip_prefix('[')?;
    groups
        .iter()
        .filter_map(|group| {
            let remainder = rest.strip_prefix(group.name.as_str())?.strip_prefix("] ")?;
            Some((group, remainder))
        })
        .max_by_key(|(group, _)| group.name.len())
}

/// Split `"[Work] Standup"` into `(Some("Work"), "Standup")`. Titles without a
/// bracketed prefix come back whole.
pub fn split_group_prefix(title: &str) -> (Option<&str>, &str) {
    if let Some(rest) = title.strip_prefix('[') {
        if let Some((name, remainder)) = rest.split_once("] ") {
            if !name.contains('[') {
                return (Some(name), remainder);
            }
        }
    }
    (None, title)
}
