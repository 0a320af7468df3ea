//! Recurrence expansion -- turns a base occurrence and a rule into a series.
//!
//! Expansion is bounded two ways: nothing is generated past one year after the
//! base start, and at most [`MAX_GENERATED`] siblings are produced. Both limits
//! truncate silently.

use chrono::{NaiveDate, Weekday};

use crate::civil::{self, CivilDateTime};
use crate::ids::IdGenerator;
use crate::model::Occurrence;

/// Hard cap on siblings generated by one expansion (the base is not counted).
pub const MAX_GENERATED: usize = 100;

/// Length of the expansion window, measured from the base start.
pub const WINDOW_YEARS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekdayOrdinal {
    Every,
    EveryOther,
}

/// How a series repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecurrenceRule {
    /// Every `count` units after the previous occurrence. `count` is at least 1.
    Interval { count: u32, unit: IntervalUnit },
    /// On the next `weekday` after the previous occurrence, skipping a week
    /// in between for [`WeekdayOrdinal::EveryOther`].
    SpecificWeekday {
        ordinal: WeekdayOrdinal,
        weekday: Weekday,
    },
}

impl RecurrenceRule {
    /// Interval rule with `count` clamped into `1..=u32::MAX`.
    pub fn interval(count: i64, unit: IntervalUnit) -> Self {
        let count = u32::try_from(count.max(1)).unwrap_or(u32::MAX);
        RecurrenceRule::Interval { count, unit }
    }

    /// Interval rule from free-text count input. Anything that is not an
    /// integer counts as 1.
    pub fn interval_from_input(raw: &str, unit: IntervalUnit) -> Self {
        let count = raw.trim().parse::<i64>().unwrap_or_else(|_| {
            tracing::warn!(input = raw, "malformed recurrence count, using 1");
            1
        });
        Self::interval(count, unit)
    }

    pub fn weekday(ordinal: WeekdayOrdinal, weekday: Weekday) -> Self {
        RecurrenceRule::SpecificWeekday { ordinal, weekday }
    }

    /// The date one step after `current`, or `None` if calendar arithmetic
    /// runs off the representable range.
    pub fn next_date(&self, current: NaiveDate) -> Option<NaiveDate> {
        match *self {
            RecurrenceRule::Interval { count, unit } => match unit {
                IntervalUnit::Day => civil::add_days(current, i64::from(count)),
                IntervalUnit::Week => civil::add_weeks(current, i64::from(count)),
                IntervalUnit::Month => civil::add_months(current, count),
                IntervalUnit::Year => civil::add_years(current, count),
            },
            RecurrenceRule::SpecificWeekday { ordinal, weekday } => {
                let next = civil::next_weekday_after(current, weekday)?;
                match ordinal {
                    WeekdayOrdinal::Every => Some(next),
                    WeekdayOrdinal::EveryOther => civil::add_days(next, 7),
                }
            }
        }
    }
}

/// Generate the siblings that follow `base` under `rule`.
///
/// Each sibling copies the base's title, kind, group and series identity,
/// starts out not completed, starts at the base's time of day on its own date, and
/// keeps the base's duration. The base itself is not part of the result.
pub fn expand(base: &Occurrence, rule: &RecurrenceRule, ids: &mut IdGenerator) -> Vec<Occurrence> {
    let Some(limit) = window_end(base.start) else {
        return Vec::new();
    };
    let duration = base.duration();
    let mut batch = ids.batch();

    let mut generated = Vec::new();
    let mut current = base.start.date();
    while generated.len() < MAX_GENERATED {
        let Some(next) = rule.next_date(current) else {
            break;
        };
        let start = base.start.with_date(next);
        if start > limit {
            break;
        }
        generated.push(Occurrence {
            id: batch.next_id(),
            start,
            end: start + duration,
            completed: false,
            legacy_group_name: None,
            ..base.clone()
        });
        current = next;
    }

    tracing::debug!(
        series = %base.series_id,
        generated = generated.len(),
        ?rule,
        "expanded recurrence"
    );
    generated
}

/// Mint a series identity for `base`, then return the base followed by its
/// generated siblings, all carrying that identity.
pub fn expand_series(
    mut base: Occurrence,
    rule: &RecurrenceRule,
    ids: &mut IdGenerator,
) -> Vec<Occurrence> {
    base.series_id = ids.series_id();
    let siblings = expand(&base, rule, ids);
    let mut series = Vec::with_capacity(siblings.len() + 1);
    series.push(base);
    series.extend(siblings);
    series
}

/// The latest start a generated sibling of `base_start` may have.
pub fn window_end(base_start: CivilDateTime) -> Option<CivilDateTime> {
    civil::add_years(base_start.date(), WINDOW_YEARS).map(|d| base_start.with_date(d))
}
