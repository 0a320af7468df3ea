//! The store-owning facade every command goes through.
//!
//! A [`Datebook`] holds one calendar's occurrences and groups in memory. All
//! mutations take `&mut self` and funnel through the recurrence and series
//! modules, so the series invariants are enforced in one place. Changes stay
//! in memory until [`Datebook::save`] writes the whole collection back.

use chrono::NaiveDate;

use crate::civil::CivilDateTime;
use crate::error::{DatebookError, Result};
use crate::ics;
use crate::ids::IdGenerator;
use crate::interchange::{self, InterchangeRecord};
use crate::model::{Group, Occurrence, OccurrenceKind, SortMode, PRESET_COLORS};
use crate::overlap;
use crate::recurrence::{self, RecurrenceRule};
use crate::series::{self, DeleteScope, OccurrenceEdit};
use crate::store::{self, ItemStore};
use crate::view::{self, BoardColumn, DayView};

/// Input for [`Datebook::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewOccurrence {
    pub title: String,
    pub kind: OccurrenceKind,
    /// `None` files the occurrence under the first group in name order.
    pub group_id: Option<String>,
    pub start: CivilDateTime,
    /// Ignored for tasks.
    pub end: CivilDateTime,
    pub recurrence: Option<RecurrenceRule>,
}

impl NewOccurrence {
    pub fn task(title: impl Into<String>, at: CivilDateTime) -> Self {
        Self {
            title: title.into(),
            kind: OccurrenceKind::Task,
            group_id: None,
            start: at,
            end: at,
            recurrence: None,
        }
    }

    pub fn event(title: impl Into<String>, start: CivilDateTime, end: CivilDateTime) -> Self {
        Self {
            title: title.into(),
            kind: OccurrenceKind::Event,
            group_id: None,
            start,
            end,
            recurrence: None,
        }
    }

    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn repeating(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }
}

pub struct Datebook<S: ItemStore> {
    store: S,
    items: Vec<Occurrence>,
    groups: Vec<Group>,
    ids: IdGenerator,
}

impl<S: ItemStore> Datebook<S> {
    /// Load the calendar behind `store`.
    ///
    /// # Errors
    /// Propagates store read failures.
    pub fn open(store: S) -> Result<Self> {
        let mut groups = store.load_groups()?;
        sort_groups(&mut groups);
        let mut items = store.load_items()?;
        let resolved = store::resolve_legacy_groups(&mut items, &groups);
        tracing::debug!(
            items = items.len(),
            groups = groups.len(),
            resolved,
            "opened datebook"
        );
        Ok(Self {
            store,
            items,
            groups,
            ids: IdGenerator::new(),
        })
    }

    /// Write occurrences and groups back to the store.
    ///
    /// # Errors
    /// Propagates store write failures.
    pub fn save(&mut self) -> Result<()> {
        self.store.save_groups(&self.groups)?;
        self.store.save_items(&self.items)?;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// All occurrences in insertion order.
    pub fn items(&self) -> &[Occurrence] {
        &self.items
    }

    /// All groups in name order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn get(&self, id: &str) -> Option<&Occurrence> {
        self.items.iter().find(|o| o.id == id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Members of `series_id` in start order.
    pub fn series(&self, series_id: &str) -> Vec<&Occurrence> {
        if series_id.is_empty() {
            return Vec::new();
        }
        let mut members: Vec<&Occurrence> = self
            .items
            .iter()
            .filter(|o| o.series_id == series_id)
            .collect();
        members.sort_by_key(|o| o.start);
        members
    }

    // -----------------------------------------------------------------------
    // Occurrences
    // -----------------------------------------------------------------------

    /// Create one occurrence, or a whole series when a recurrence is given.
    /// Returns the new identities, base first.
    ///
    /// # Errors
    /// Returns `DatebookError::Validation` for an empty title, an unknown
    /// group, a calendar with no groups, or an event ending before it starts.
    pub fn create(&mut self, new: NewOccurrence) -> Result<Vec<String>> {
        if new.title.trim().is_empty() {
            return Err(DatebookError::validation("title required"));
        }
        let group_id = match &new.group_id {
            Some(id) => self
                .group(id)
                .map(|g| g.id.clone())
                .ok_or_else(|| DatebookError::validation(format!("unknown group '{id}'")))?,
            None => self
                .groups
                .first()
                .map(|g| g.id.clone())
                .ok_or_else(|| DatebookError::validation("please select a group"))?,
        };
        let end = match new.kind {
            OccurrenceKind::Task => new.start,
            OccurrenceKind::Event if new.end < new.start => {
                return Err(DatebookError::validation("event ends before it starts"));
            }
            OccurrenceKind::Event => new.end,
        };

        let base = Occurrence {
            id: self.ids.occurrence_id(),
            title: new.title,
            start: new.start,
            end,
            kind: new.kind,
            group_id,
            completed: false,
            series_id: String::new(),
            legacy_group_name: None,
        };
        let created = match &new.recurrence {
            Some(rule) => recurrence::expand_series(base, rule, &mut self.ids),
            None => vec![base],
        };

        let ids: Vec<String> = created.iter().map(|o| o.id.clone()).collect();
        tracing::info!(count = ids.len(), "created occurrences");
        self.items.extend(created);
        Ok(ids)
    }

    /// Delete `id` and, per `scope`, its series siblings. Returns how many
    /// occurrences were removed (0 when `id` is unknown).
    pub fn delete(&mut self, id: &str, scope: DeleteScope) -> usize {
        series::delete(&mut self.items, id, scope)
    }

    /// Edit a single occurrence. Returns `Ok(false)` when `id` is unknown.
    ///
    /// # Errors
    /// Returns `DatebookError::Validation` for an empty title, an unknown
    /// target group, or an event ending before it starts.
    pub fn edit(&mut self, id: &str, edit: &OccurrenceEdit) -> Result<bool> {
        if let Some(group_id) = &edit.group_id {
            self.require_group(group_id)?;
        }
        series::edit(&mut self.items, id, edit)
    }

    pub fn set_completed(&mut self, id: &str, completed: bool) -> bool {
        series::set_completed(&mut self.items, id, completed)
    }

    /// Flip completion, returning the new state (`None` for an unknown id).
    pub fn toggle_completed(&mut self, id: &str) -> Option<bool> {
        series::toggle_completed(&mut self.items, id)
    }

    /// Refile one occurrence under another group.
    ///
    /// # Errors
    /// Returns `DatebookError::Validation` when `group_id` does not exist.
    pub fn move_to_group(&mut self, id: &str, group_id: &str) -> Result<bool> {
        let edit = OccurrenceEdit {
            group_id: Some(group_id.to_string()),
            ..OccurrenceEdit::default()
        };
        self.edit(id, &edit)
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    /// Add a group, returning its identity. The color defaults to the first preset.
    ///
    /// # Errors
    /// Returns `DatebookError::Validation` for an empty name.
    pub fn add_group(&mut self, name: &str, color: Option<&str>) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DatebookError::validation("group name required"));
        }
        let group = Group {
            id: self.ids.group_id(),
            name: name.to_string(),
            color_hex: color.unwrap_or(PRESET_COLORS[0]).to_string(),
            sort_mode: SortMode::ByDate,
        };
        let id = group.id.clone();
        self.groups.push(group);
        sort_groups(&mut self.groups);
        Ok(id)
    }

    /// Rename and/or recolor a group. Returns `Ok(false)` for an unknown id.
    ///
    /// # Errors
    /// Returns `DatebookError::Validation` for an empty name.
    pub fn update_group(&mut self, id: &str, name: Option<&str>, color: Option<&str>) -> Result<bool> {
        if matches!(name, Some(n) if n.trim().is_empty()) {
            return Err(DatebookError::validation("group name required"));
        }
        let Some(group) = self.groups.iter_mut().find(|g| g.id == id) else {
            return Ok(false);
        };
        if let Some(name) = name {
            group.name = name.trim().to_string();
        }
        if let Some(color) = color {
            group.color_hex = color.to_string();
        }
        sort_groups(&mut self.groups);
        Ok(true)
    }

    /// Remove a group. Its occurrences are kept and show up as unassigned.
    pub fn delete_group(&mut self, id: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        let removed = self.groups.len() != before;
        if removed {
            let orphaned = self.items.iter().filter(|o| o.group_id == id).count();
            tracing::info!(group = id, orphaned, "deleted group");
        }
        removed
    }

    pub fn set_sort_mode(&mut self, id: &str, mode: SortMode) -> bool {
        match self.groups.iter_mut().find(|g| g.id == id) {
            Some(group) => {
                group.sort_mode = mode;
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn day(&self, date: NaiveDate) -> Vec<&Occurrence> {
        overlap::on_date(&self.items, date)
    }

    pub fn agenda(&self, from: NaiveDate, to: NaiveDate) -> Vec<DayView<'_>> {
        view::agenda(&self.items, from, to)
    }

    pub fn board(&self) -> Vec<BoardColumn<'_>> {
        view::board(&self.groups, &self.items)
    }

    /// Display name of an occurrence's group ("Unassigned" when dangling).
    pub fn group_name(&self, group_id: &str) -> &str {
        view::group_name(&self.groups, group_id)
    }

    // -----------------------------------------------------------------------
    // Interchange
    // -----------------------------------------------------------------------

    pub fn export_records(&self) -> Vec<InterchangeRecord> {
        interchange::export_records(&self.items, &self.groups)
    }

    /// Append imported records, returning how many were added.
    pub fn import_records(&mut self, records: &[InterchangeRecord]) -> usize {
        let default_group = self.groups.first().map(|g| g.id.clone()).unwrap_or_default();
        let imported =
            interchange::import_records(records, &self.groups, &default_group, &mut self.ids);
        let count = imported.len();
        self.items.extend(imported);
        tracing::info!(count, "imported occurrences");
        count
    }

    pub fn export_ics(&self) -> String {
        ics::to_ics(&self.export_records())
    }

    /// # Errors
    /// Returns `DatebookError::Interchange` when `content` is not iCalendar.
    pub fn import_ics(&mut self, content: &str) -> Result<usize> {
        let records = ics::from_ics(content)?;
        Ok(self.import_records(&records))
    }

    fn require_group(&self, group_id: &str) -> Result<()> {
        match self.group(group_id) {
            Some(_) => Ok(()),
            None => Err(DatebookError::validation(format!(
                "unknown group '{group_id}'"
            ))),
        }
    }
}

fn sort_groups(groups: &mut [Group]) {
    groups.sort_by(|a, b| a.name.cmp(&b.name));
}
