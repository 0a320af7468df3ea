//! iCalendar (.ics) codec for interchange records.
//!
//! Times are written as floating local times (`YYYYMMDDTHHMMSS`, no `Z`, no
//! `TZID`) to match the civil-time model. On read, a trailing `Z` is dropped
//! and the wall-clock value is kept as is.

use chrono::{NaiveDate, NaiveDateTime};
use icalendar::parser::{read_calendar, unfold};
use icalendar::{Calendar, Component, Property};

use crate::civil::CivilDateTime;
use crate::error::{DatebookError, Result};
use crate::interchange::InterchangeRecord;

const ICS_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const ICS_DATE_FORMAT: &str = "%Y%m%d";

/// Serialize records as a `METHOD:PUBLISH` calendar with one VEVENT each.
pub fn to_ics(records: &[InterchangeRecord]) -> String {
    let mut cal = Calendar::new();
    cal.append_property(Property::new("METHOD", "PUBLISH"));

    for record in records {
        let mut event = icalendar::Event::new();
        event.uid(&record.identity);
        event.summary(&record.title);
        event.add_property("DTSTART", format_ics_datetime(record.start));
        event.add_property("DTEND", format_ics_datetime(record.end));
        cal.push(event.done());
    }

    cal.done().to_string()
}

/// Read every VEVENT that has both a SUMMARY and a DTSTART.
///
/// A missing or unreadable DTEND makes the record zero-length (a task). An
/// unreadable DTSTART drops the event.
///
/// # Errors
/// Returns `DatebookError::Interchange` when the text is not an iCalendar
/// document at all.
pub fn from_ics(content: &str) -> Result<Vec<InterchangeRecord>> {
    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| DatebookError::Interchange(e.to_string()))?;

    let mut records = Vec::new();
    for vevent in calendar.components.iter().filter(|c| c.name == "VEVENT") {
        let Some(title) = vevent.find_prop("SUMMARY").map(|p| p.val.to_string()) else {
            continue;
        };
        let Some(start) = vevent
            .find_prop("DTSTART")
            .and_then(|p| parse_ics_datetime(p.val.as_ref()))
        else {
            tracing::warn!(summary = %title, "skipping event without readable DTSTART");
            continue;
        };
        let end = vevent
            .find_prop("DTEND")
            .and_then(|p| parse_ics_datetime(p.val.as_ref()))
            .unwrap_or(start);
        let identity = vevent
            .find_prop("UID")
            .map(|p| p.val.to_string())
            .unwrap_or_default();

        records.push(InterchangeRecord {
            identity,
            title,
            start,
            end,
        });
    }
    Ok(records)
}

fn format_ics_datetime(ts: CivilDateTime) -> String {
    ts.naive().format(ICS_DATETIME_FORMAT).to_string()
}

/// Accepts `YYYYMMDDTHHMMSS` (optionally `Z`-suffixed) or a bare `YYYYMMDD`.
fn parse_ics_datetime(value: &str) -> Option<CivilDateTime> {
    let value = value.trim();
    let value = value.strip_suffix('Z').unwrap_or(value);
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, ICS_DATETIME_FORMAT) {
        return Some(CivilDateTime::from_naive(dt));
    }
    NaiveDate::parse_from_str(value, ICS_DATE_FORMAT)
        .ok()
        .map(CivilDateTime::start_of_day)
}
