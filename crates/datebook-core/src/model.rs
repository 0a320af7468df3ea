//! Occurrences, groups, and their persisted record shape.

use serde::{Deserialize, Deserializer, Serialize};

use crate::civil::CivilDateTime;

/// Colors offered for new groups. The first one is the default.
pub const PRESET_COLORS: [&str; 12] = [
    "#E74C3C", "#E67E22", "#F1C40F", "#2ECC71", "#1ABC9C", "#3498DB", "#9B59B6", "#34495E",
    "#7F8C8D", "#D35400", "#27AE60", "#8E44AD",
];

/// Color used for groups with an unreadable color, and for the unassigned column.
pub const FALLBACK_COLOR: &str = "#808080";

/// Name shown for occurrences whose group no longer exists.
pub const UNASSIGNED_GROUP_NAME: &str = "Unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OccurrenceKind {
    /// A point in time. `end` always equals `start`.
    #[default]
    Task,
    /// A span of time, possibly crossing midnight.
    Event,
}

impl OccurrenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccurrenceKind::Task => "Task",
            OccurrenceKind::Event => "Event",
        }
    }
}

impl From<String> for OccurrenceKind {
    /// Anything other than an event reads as a task.
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("event") {
            OccurrenceKind::Event
        } else {
            OccurrenceKind::Task
        }
    }
}

impl From<OccurrenceKind> for String {
    fn from(kind: OccurrenceKind) -> Self {
        kind.as_str().to_string()
    }
}

/// One dated item, possibly part of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub id: String,
    pub title: String,
    #[serde(default = "missing_timestamp")]
    pub start: CivilDateTime,
    #[serde(default = "missing_timestamp")]
    pub end: CivilDateTime,
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: OccurrenceKind,
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub completed: bool,
    /// Empty when the occurrence is not part of a series.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub series_id: String,
    /// Group name written by older versions instead of `groupId`. Cleared once
    /// resolved; kept and written back while no group of that name exists.
    #[serde(rename = "group", default, skip_serializing_if = "Option::is_none")]
    pub legacy_group_name: Option<String>,
}

impl Occurrence {
    pub fn is_in_series(&self) -> bool {
        !self.series_id.is_empty()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

fn missing_timestamp() -> CivilDateTime {
    tracing::warn!("missing timestamp, using zero time");
    CivilDateTime::zero()
}

/// `null` or a non-string `type` reads as a task.
fn lenient_kind<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OccurrenceKind, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => OccurrenceKind::from(text),
        _ => OccurrenceKind::Task,
    })
}

/// How a group's board column orders its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortMode {
    #[default]
    ByDate,
    Alphabetical,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::ByDate => "date",
            SortMode::Alphabetical => "alpha",
        }
    }
}

impl From<String> for SortMode {
    /// Unknown or empty values fall back to date order.
    fn from(value: String) -> Self {
        match value.as_str() {
            "alpha" | "alphabetical" => SortMode::Alphabetical,
            _ => SortMode::ByDate,
        }
    }
}

impl From<SortMode> for String {
    fn from(mode: SortMode) -> Self {
        mode.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(alias = "color", default)]
    pub color_hex: String,
    #[serde(default)]
    pub sort_mode: SortMode,
}

impl Group {
    /// The group's color as `#RRGGBB`, or [`FALLBACK_COLOR`] when it is not one.
    pub fn display_color(&self) -> String {
        normalize_color(&self.color_hex).unwrap_or_else(|| FALLBACK_COLOR.to_string())
    }
}

/// The groups a fresh calendar starts with.
pub fn default_groups() -> Vec<Group> {
    vec![
        Group {
            id: "g-1".to_string(),
            name: "Work".to_string(),
            color_hex: "#3498DB".to_string(),
            sort_mode: SortMode::ByDate,
        },
        Group {
            id: "g-2".to_string(),
            name: "Personal".to_string(),
            color_hex: "#2ECC71".to_string(),
            sort_mode: SortMode::ByDate,
        },
    ]
}

fn normalize_color(raw: &str) -> Option<String> {
    let hex = raw.strip_prefix('#').unwrap_or(raw);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", hex.to_ascii_uppercase()))
}
