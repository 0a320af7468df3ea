//! # datebook-core
//!
//! Recurring tasks and events for a local, single-user datebook.
//!
//! The engine expands a recurrence rule into a bounded series of occurrences,
//! deletes "this", "this and future" or "all" of a series without breaking the
//! remaining members, and decides which occurrences (including multi-day
//! events) belong on a given calendar day.
//!
//! ## Quick start
//!
//! ```rust
//! use datebook_core::{CivilDateTime, Datebook, DeleteScope, IntervalUnit, MemoryStore,
//!     NewOccurrence, RecurrenceRule};
//!
//! let mut book = Datebook::open(MemoryStore::new()).unwrap();
//! let start = CivilDateTime::parse("2024-01-01 10:00").unwrap();
//! let ids = book
//!     .create(NewOccurrence::task("Pay rent", start)
//!         .repeating(RecurrenceRule::interval(1, IntervalUnit::Month)))
//!     .unwrap();
//! assert_eq!(ids.len(), 13);
//!
//! // Drop the last six months of the series.
//! assert_eq!(book.delete(&ids[7], DeleteScope::ThisAndFuture), 6);
//! ```
//!
//! ## Modules
//!
//! - [`civil`]: Civil timestamps and calendar arithmetic
//! - [`recurrence`]: Rule → bounded series of occurrences
//! - [`overlap`]: Day membership test
//! - [`series`]: Scoped delete and single-occurrence edits
//! - [`view`]: Agenda and group-board projections
//! - [`store`]: Load/save boundary, JSON file store, named calendars
//! - [`interchange`] / [`ics`]: Generic import/export records and their iCalendar form
//! - [`datebook`]: The facade owning one calendar
//! - [`error`]: Error types

pub mod civil;
pub mod datebook;
pub mod error;
pub mod ics;
pub mod ids;
pub mod interchange;
pub mod model;
pub mod overlap;
pub mod recurrence;
pub mod series;
pub mod store;
pub mod view;

pub use civil::CivilDateTime;
pub use datebook::{Datebook, NewOccurrence};
pub use error::DatebookError;
pub use interchange::InterchangeRecord;
pub use model::{Group, Occurrence, OccurrenceKind, SortMode};
pub use recurrence::{expand, IntervalUnit, RecurrenceRule, WeekdayOrdinal};
pub use series::{DeleteScope, OccurrenceEdit};
pub use store::{CalendarDirectory, ItemStore, JsonFileStore, MemoryStore};
