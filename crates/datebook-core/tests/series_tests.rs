//! Tests for scoped deletion and single-occurrence edits.

use datebook_core::series::{delete, edit, set_completed, toggle_completed};
use datebook_core::{CivilDateTime, DeleteScope, Occurrence, OccurrenceEdit, OccurrenceKind};

fn ts(text: &str) -> CivilDateTime {
    CivilDateTime::parse(text).expect("valid timestamp")
}

/// Helper: a one-hour event.
fn event(id: &str, start: &str, series: &str) -> Occurrence {
    let start = ts(start);
    Occurrence {
        id: id.to_string(),
        title: "Yoga".to_string(),
        start,
        end: start + chrono::Duration::hours(1),
        kind: OccurrenceKind::Event,
        group_id: "g-2".to_string(),
        completed: false,
        series_id: series.to_string(),
        legacy_group_name: None,
    }
}

/// Five weekly "Yoga" events in series `s-1`, with an unrelated one-off and a
/// member of another series mixed in.
fn fixture() -> Vec<Occurrence> {
    vec![
        event("lone", "2024-03-06 12:00", ""),
        event("y1", "2024-03-04 18:00", "s-1"),
        event("y2", "2024-03-11 18:00", "s-1"),
        event("other", "2024-03-20 07:00", "s-2"),
        event("y3", "2024-03-18 18:00", "s-1"),
        event("y4", "2024-03-25 18:00", "s-1"),
        event("y5", "2024-04-01 18:00", "s-1"),
    ]
}

fn ids(items: &[Occurrence]) -> Vec<&str> {
    items.iter().map(|o| o.id.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn all_removes_the_whole_series_only() {
    let mut items = fixture();
    let removed = delete(&mut items, "y2", DeleteScope::All);

    assert_eq!(removed, 5);
    assert_eq!(ids(&items), vec!["lone", "other"]);
}

#[test]
fn this_and_future_from_the_third_of_five() {
    let mut items = fixture();
    let removed = delete(&mut items, "y3", DeleteScope::ThisAndFuture);

    assert_eq!(removed, 3);
    assert_eq!(ids(&items), vec!["lone", "y1", "y2", "other"]);
}

#[test]
fn this_and_future_compares_start_times_not_positions() {
    let mut items = fixture();
    items.reverse();
    let removed = delete(&mut items, "y4", DeleteScope::ThisAndFuture);

    assert_eq!(removed, 2);
    let mut left = ids(&items);
    left.sort_unstable();
    assert_eq!(left, vec!["lone", "other", "y1", "y2", "y3"]);
}

#[test]
fn this_and_future_from_the_first_removes_everything_in_series() {
    let mut items = fixture();
    assert_eq!(delete(&mut items, "y1", DeleteScope::ThisAndFuture), 5);
}

#[test]
fn this_only_leaves_siblings() {
    let mut items = fixture();
    let removed = delete(&mut items, "y3", DeleteScope::ThisOnly);

    assert_eq!(removed, 1);
    assert_eq!(ids(&items), vec!["lone", "y1", "y2", "other", "y4", "y5"]);
}

#[test]
fn non_series_target_ignores_wide_scopes() {
    for scope in [DeleteScope::All, DeleteScope::ThisAndFuture, DeleteScope::ThisOnly] {
        let mut items = fixture();
        assert_eq!(delete(&mut items, "lone", scope), 1, "{scope:?}");
        assert_eq!(items.len(), 6);
    }
}

#[test]
fn unknown_target_is_a_no_op() {
    let mut items = fixture();
    assert_eq!(delete(&mut items, "nope", DeleteScope::All), 0);
    assert_eq!(items, fixture());
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

#[test]
fn edit_touches_only_the_target() {
    let mut items = fixture();
    let change = OccurrenceEdit {
        title: Some("Pilates".to_string()),
        ..OccurrenceEdit::default()
    };
    assert!(edit(&mut items, "y2", &change).unwrap());

    let y2 = items.iter().find(|o| o.id == "y2").unwrap();
    assert_eq!(y2.title, "Pilates");
    assert_eq!(y2.series_id, "s-1");
    assert!(items
        .iter()
        .filter(|o| o.id != "y2")
        .all(|o| o.title == "Yoga"));
}

#[test]
fn edited_occurrence_still_goes_with_its_series() {
    let mut items = fixture();
    let change = OccurrenceEdit {
        start: Some(ts("2024-03-12 07:00")),
        ..OccurrenceEdit::default()
    };
    edit(&mut items, "y2", &change).unwrap();

    assert_eq!(delete(&mut items, "y5", DeleteScope::All), 5);
    assert_eq!(ids(&items), vec!["lone", "other"]);
}

#[test]
fn moving_an_event_keeps_its_duration() {
    let mut items = fixture();
    let change = OccurrenceEdit {
        start: Some(ts("2024-03-11 20:30")),
        ..OccurrenceEdit::default()
    };
    edit(&mut items, "y2", &change).unwrap();
    let y2 = items.iter().find(|o| o.id == "y2").unwrap();
    assert_eq!(y2.end, ts("2024-03-11 21:30"));
}

#[test]
fn turning_an_event_into_a_task_collapses_the_end() {
    let mut items = fixture();
    let change = OccurrenceEdit {
        kind: Some(OccurrenceKind::Task),
        end: Some(ts("2024-03-30 10:00")),
        ..OccurrenceEdit::default()
    };
    edit(&mut items, "lone", &change).unwrap();
    let lone = items.iter().find(|o| o.id == "lone").unwrap();
    assert_eq!(lone.kind, OccurrenceKind::Task);
    assert_eq!(lone.end, lone.start);
}

#[test]
fn invalid_edits_change_nothing() {
    let mut items = fixture();

    let blank = OccurrenceEdit {
        title: Some("   ".to_string()),
        start: Some(ts("2025-01-01 00:00")),
        ..OccurrenceEdit::default()
    };
    assert!(edit(&mut items, "y1", &blank).is_err());

    let backwards = OccurrenceEdit {
        end: Some(ts("2024-03-04 17:00")),
        ..OccurrenceEdit::default()
    };
    assert!(edit(&mut items, "y1", &backwards).is_err());

    assert_eq!(items, fixture());
}

#[test]
fn editing_an_unknown_id_reports_false() {
    let mut items = fixture();
    let change = OccurrenceEdit {
        title: Some("x".to_string()),
        ..OccurrenceEdit::default()
    };
    assert!(!edit(&mut items, "missing", &change).unwrap());
    assert!(OccurrenceEdit::default().is_empty());
    assert!(!change.is_empty());
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

#[test]
fn completion_is_per_occurrence() {
    let mut items = fixture();
    assert_eq!(toggle_completed(&mut items, "y1"), Some(true));
    assert_eq!(toggle_completed(&mut items, "y1"), Some(false));
    assert!(set_completed(&mut items, "y3", true));
    assert_eq!(toggle_completed(&mut items, "missing"), None);
    assert!(!set_completed(&mut items, "missing", true));

    let done: Vec<&str> = items
        .iter()
        .filter(|o| o.completed)
        .map(|o| o.id.as_str())
        .collect();
    assert_eq!(done, vec!["y3"]);
}
