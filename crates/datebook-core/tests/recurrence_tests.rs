//! Tests for recurrence expansion.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use datebook_core::ids::IdGenerator;
use datebook_core::recurrence::{expand, expand_series, window_end, MAX_GENERATED};
use datebook_core::{
    CivilDateTime, IntervalUnit, Occurrence, OccurrenceKind, RecurrenceRule, WeekdayOrdinal,
};

fn ts(text: &str) -> CivilDateTime {
    CivilDateTime::parse(text).expect("valid timestamp")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Helper: a series base occurrence spanning `start`..`end`.
fn base(start: &str, end: &str) -> Occurrence {
    let start = ts(start);
    let end = ts(end);
    Occurrence {
        id: "base".to_string(),
        title: "Review".to_string(),
        start,
        end,
        kind: if start == end {
            OccurrenceKind::Task
        } else {
            OccurrenceKind::Event
        },
        group_id: "g-1".to_string(),
        completed: false,
        series_id: "s-test".to_string(),
        legacy_group_name: None,
    }
}

// ---------------------------------------------------------------------------
// Interval rules
// ---------------------------------------------------------------------------

#[test]
fn monthly_first_three_dates() {
    let base = base("2024-01-01 10:00", "2024-01-01 11:30");
    let rule = RecurrenceRule::interval(1, IntervalUnit::Month);
    let generated = expand(&base, &rule, &mut IdGenerator::new());

    assert!(generated.len() >= 3);
    let expected = [date(2024, 2, 1), date(2024, 3, 1), date(2024, 4, 1)];
    for (occ, want) in generated.iter().zip(expected) {
        assert_eq!(occ.start.date(), want);
        assert_eq!((occ.start.hour(), occ.start.minute()), (10, 0));
        assert_eq!(occ.duration(), Duration::minutes(90));
    }
}

#[test]
fn monthly_includes_the_anniversary_date() {
    // 2025-01-01 10:00 is exactly one year after the base: not *after* the
    // window, so it is generated.
    let base = base("2024-01-01 10:00", "2024-01-01 10:00");
    let rule = RecurrenceRule::interval(1, IntervalUnit::Month);
    let generated = expand(&base, &rule, &mut IdGenerator::new());

    assert_eq!(generated.len(), 12);
    assert_eq!(generated.last().unwrap().start, ts("2025-01-01 10:00"));
}

#[test]
fn siblings_start_out_not_completed() {
    let mut done = base("2024-01-01 10:00", "2024-01-01 11:00");
    done.completed = true;
    let siblings = expand(
        &done,
        &RecurrenceRule::interval(1, IntervalUnit::Week),
        &mut IdGenerator::new(),
    );
    assert!(!siblings.is_empty());
    assert!(siblings.iter().all(|s| !s.completed));
    assert!(siblings.iter().all(|s| s.series_id == "s-test"));
}

#[test]
fn yearly_produces_a_single_sibling() {
    let base = base("2024-06-15 08:00", "2024-06-15 08:00");
    let one = expand(
        &base,
        &RecurrenceRule::interval(1, IntervalUnit::Year),
        &mut IdGenerator::new(),
    );
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].start, ts("2025-06-15 08:00"));

    let none = expand(
        &base,
        &RecurrenceRule::interval(2, IntervalUnit::Year),
        &mut IdGenerator::new(),
    );
    assert!(none.is_empty(), "first step already leaves the window");
}

#[test]
fn weekly_fills_the_year() {
    // 2024-01-01 is a Monday; the last Monday on or before 2025-01-01 is 2024-12-30.
    let base = base("2024-01-01 09:00", "2024-01-01 09:30");
    let generated = expand(
        &base,
        &RecurrenceRule::interval(1, IntervalUnit::Week),
        &mut IdGenerator::new(),
    );
    assert_eq!(generated.len(), 52);
    assert_eq!(generated[0].start, ts("2024-01-08 09:00"));
    assert_eq!(generated[51].start, ts("2024-12-30 09:00"));
}

#[test]
fn daily_is_capped_at_one_hundred() {
    let base = base("2024-01-01 07:00", "2024-01-01 07:00");
    let generated = expand(
        &base,
        &RecurrenceRule::interval(1, IntervalUnit::Day),
        &mut IdGenerator::new(),
    );
    assert_eq!(generated.len(), MAX_GENERATED);
    assert_eq!(generated.last().unwrap().start, ts("2024-04-10 07:00"));
}

#[test]
fn every_three_days() {
    let base = base("2024-02-27 18:00", "2024-02-27 19:00");
    let generated = expand(
        &base,
        &RecurrenceRule::interval(3, IntervalUnit::Day),
        &mut IdGenerator::new(),
    );
    assert_eq!(generated[0].start, ts("2024-03-01 18:00"));
    assert_eq!(generated[1].start, ts("2024-03-04 18:00"));
}

#[test]
fn month_end_clamps_and_carries_forward() {
    // Each step advances the previous date, so the clamped day sticks.
    let base = base("2024-01-31 12:00", "2024-01-31 12:00");
    let generated = expand(
        &base,
        &RecurrenceRule::interval(1, IntervalUnit::Month),
        &mut IdGenerator::new(),
    );
    assert_eq!(generated[0].start.date(), date(2024, 2, 29));
    assert_eq!(generated[1].start.date(), date(2024, 3, 29));
}

#[test]
fn multi_day_event_keeps_its_span() {
    let base = base("2024-05-03 22:00", "2024-05-05 02:00");
    let generated = expand(
        &base,
        &RecurrenceRule::interval(2, IntervalUnit::Week),
        &mut IdGenerator::new(),
    );
    assert_eq!(generated[0].start, ts("2024-05-17 22:00"));
    assert_eq!(generated[0].end, ts("2024-05-19 02:00"));
}

// ---------------------------------------------------------------------------
// Specific weekday rules
// ---------------------------------------------------------------------------

#[test]
fn every_friday_from_a_tuesday() {
    // 2024-03-05 is a Tuesday.
    let base = base("2024-03-05 16:00", "2024-03-05 17:00");
    let rule = RecurrenceRule::weekday(WeekdayOrdinal::Every, Weekday::Fri);
    let generated = expand(&base, &rule, &mut IdGenerator::new());

    assert_eq!(generated[0].start, ts("2024-03-08 16:00"));
    assert_eq!(generated[1].start, ts("2024-03-15 16:00"));
    assert!(generated.iter().all(|o| o.start.date().weekday() == Weekday::Fri));
}

#[test]
fn same_weekday_as_base_skips_to_next_week() {
    let base = base("2024-03-05 16:00", "2024-03-05 16:00");
    let rule = RecurrenceRule::weekday(WeekdayOrdinal::Every, Weekday::Tue);
    let generated = expand(&base, &rule, &mut IdGenerator::new());
    assert_eq!(generated[0].start, ts("2024-03-12 16:00"));
}

#[test]
fn every_other_friday() {
    let base = base("2024-03-05 16:00", "2024-03-05 17:00");
    let rule = RecurrenceRule::weekday(WeekdayOrdinal::EveryOther, Weekday::Fri);
    let generated = expand(&base, &rule, &mut IdGenerator::new());

    // Next Friday (Mar 8) plus one skipped week.
    assert_eq!(generated[0].start, ts("2024-03-15 16:00"));
    assert_eq!(generated[1].start, ts("2024-03-29 16:00"));
    for pair in generated.windows(2) {
        assert_eq!(pair[1].start - pair[0].start, Duration::days(14));
    }
}

// ---------------------------------------------------------------------------
// Rule construction
// ---------------------------------------------------------------------------

#[test]
fn interval_count_is_clamped_to_one() {
    let one = RecurrenceRule::Interval {
        count: 1,
        unit: IntervalUnit::Day,
    };
    assert_eq!(RecurrenceRule::interval(0, IntervalUnit::Day), one);
    assert_eq!(RecurrenceRule::interval(-7, IntervalUnit::Day), one);
}

#[test]
fn malformed_count_input_is_one() {
    let one = RecurrenceRule::interval(1, IntervalUnit::Week);
    assert_eq!(RecurrenceRule::interval_from_input("abc", IntervalUnit::Week), one);
    assert_eq!(RecurrenceRule::interval_from_input("", IntervalUnit::Week), one);
    assert_eq!(RecurrenceRule::interval_from_input("2.5", IntervalUnit::Week), one);
    assert_eq!(
        RecurrenceRule::interval_from_input(" 3 ", IntervalUnit::Week),
        RecurrenceRule::interval(3, IntervalUnit::Week)
    );
}

// ---------------------------------------------------------------------------
// Series identity
// ---------------------------------------------------------------------------

#[test]
fn siblings_copy_everything_but_identity_and_dates() {
    let base = base("2024-03-05 09:00", "2024-03-05 10:00");
    let generated = expand(
        &base,
        &RecurrenceRule::interval(1, IntervalUnit::Week),
        &mut IdGenerator::new(),
    );
    for occ in &generated {
        assert_eq!(occ.title, base.title);
        assert_eq!(occ.kind, base.kind);
        assert_eq!(occ.group_id, base.group_id);
        assert_eq!(occ.series_id, base.series_id);
        assert_ne!(occ.id, base.id);
    }
}

#[test]
fn expand_series_mints_one_identity_for_all() {
    let mut ids = IdGenerator::new();
    let mut base = base("2024-03-05 09:00", "2024-03-05 10:00");
    base.series_id.clear();
    let series = expand_series(
        base,
        &RecurrenceRule::interval(1, IntervalUnit::Month),
        &mut ids,
    );

    assert_eq!(series[0].id, "base");
    let series_id = &series[0].series_id;
    assert!(series_id.starts_with("s-"));
    assert!(series.iter().all(|o| &o.series_id == series_id));
    assert!(series.iter().all(|o| &o.id != series_id));
}

#[test]
fn repeated_expansions_never_reuse_identities() {
    let mut ids = IdGenerator::new();
    let base = base("2024-03-05 09:00", "2024-03-05 10:00");
    let rule = RecurrenceRule::interval(1, IntervalUnit::Day);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..3 {
        for occ in expand(&base, &rule, &mut ids) {
            assert!(seen.insert(occ.id.clone()), "duplicate id {}", occ.id);
        }
    }
    assert_eq!(seen.len(), 3 * MAX_GENERATED);
}

#[test]
fn window_end_is_one_year_out() {
    assert_eq!(
        window_end(ts("2024-02-29 06:30")),
        Some(ts("2025-02-28 06:30"))
    );
}
