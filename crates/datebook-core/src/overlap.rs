//! Day membership -- decides which occurrences render on a calendar day.
//!
//! Unlike conflict detection between two spans, the day end is inclusive for
//! zero-length items: a task at exactly midnight belongs to the day it starts.

use chrono::NaiveDate;

use crate::civil::CivilDateTime;
use crate::model::Occurrence;

/// Whether `occurrence` is on the day bounded by `day_start` and `day_end`
/// (`day_end` being the last instant of that day).
///
/// True iff `start < day_end && end >= day_start`.
pub fn matches(occurrence: &Occurrence, day_start: CivilDateTime, day_end: CivilDateTime) -> bool {
    occurrence.start < day_end && occurrence.end >= day_start
}

/// [`matches`] against the bounds of a calendar date.
pub fn matches_date(occurrence: &Occurrence, date: NaiveDate) -> bool {
    matches(
        occurrence,
        CivilDateTime::start_of_day(date),
        CivilDateTime::end_of_day(date),
    )
}

/// The occurrences on `date`, in their original order.
pub fn on_date(occurrences: &[Occurrence], date: NaiveDate) -> Vec<&Occurrence> {
    let day_start = CivilDateTime::start_of_day(date);
    let day_end = CivilDateTime::end_of_day(date);
    occurrences
        .iter()
        .filter(|o| matches(o, day_start, day_end))
        .collect()
}
