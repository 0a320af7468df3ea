//! Read-only projections of a collection: day agendas and the group board.
//!
//! Nothing here mutates. Hosts re-query after each command instead of
//! subscribing to changes.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::civil;
use crate::model::{Group, Occurrence, SortMode, FALLBACK_COLOR, UNASSIGNED_GROUP_NAME};
use crate::overlap;

/// Longest range [`agenda`] will lay out, in days.
pub const MAX_AGENDA_DAYS: usize = 366;

/// The occurrences visible on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct DayView<'a> {
    pub date: NaiveDate,
    pub occurrences: Vec<&'a Occurrence>,
}

/// One view per date from `from` to `to` inclusive, capped at
/// [`MAX_AGENDA_DAYS`]. Empty when `from` is after `to`.
pub fn agenda(occurrences: &[Occurrence], from: NaiveDate, to: NaiveDate) -> Vec<DayView<'_>> {
    let mut days = Vec::new();
    let mut date = from;
    while date <= to && days.len() < MAX_AGENDA_DAYS {
        days.push(DayView {
            date,
            occurrences: overlap::on_date(occurrences, date),
        });
        match civil::add_days(date, 1) {
            Some(next) => date = next,
            None => break,
        }
    }
    days
}

/// A board column: one group and the items filed under it.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardColumn<'a> {
    /// `None` for the column collecting items whose group no longer exists.
    pub group: Option<&'a Group>,
    pub name: String,
    pub color: String,
    pub items: Vec<&'a Occurrence>,
}

/// Columns for every group in name order, then an "Unassigned" column if any
/// occurrence points at a missing group.
///
/// Incomplete items sort first in each column, then by start time or by
/// case-insensitive title depending on the group's sort mode.
pub fn board<'a>(groups: &'a [Group], occurrences: &'a [Occurrence]) -> Vec<BoardColumn<'a>> {
    let mut sorted_groups: Vec<&Group> = groups.iter().collect();
    sorted_groups.sort_by(|a, b| a.name.cmp(&b.name));

    let mut columns: Vec<BoardColumn<'a>> = sorted_groups
        .into_iter()
        .map(|group| {
            let mut items: Vec<&Occurrence> = occurrences
                .iter()
                .filter(|o| o.group_id == group.id)
                .collect();
            items.sort_by(|a, b| board_order(a, b, group.sort_mode));
            BoardColumn {
                group: Some(group),
                name: group.name.clone(),
                color: group.display_color(),
                items,
            }
        })
        .collect();

    let mut orphans: Vec<&Occurrence> = occurrences
        .iter()
        .filter(|o| !groups.iter().any(|g| g.id == o.group_id))
        .collect();
    if !orphans.is_empty() {
        orphans.sort_by(|a, b| board_order(a, b, SortMode::ByDate));
        columns.push(BoardColumn {
            group: None,
            name: UNASSIGNED_GROUP_NAME.to_string(),
            color: FALLBACK_COLOR.to_string(),
            items: orphans,
        });
    }
    columns
}

/// The display name of `group_id`, or "Unassigned" when it is dangling.
pub fn group_name<'a>(groups: &'a [Group], group_id: &str) -> &'a str {
    groups
        .iter()
        .find(|g| g.id == group_id)
        .map_or(UNASSIGNED_GROUP_NAME, |g| g.name.as_str())
}

fn board_order(a: &Occurrence, b: &Occurrence, mode: SortMode) -> Ordering {
    a.completed.cmp(&b.completed).then_with(|| match mode {
        SortMode::Alphabetical => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortMode::ByDate => a.start.cmp(&b.start),
    })
}
