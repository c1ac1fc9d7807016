use crate::infrastructure::error::DaybookError;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const DEFAULT_CATEGORY: &str = "bg-blue-500";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Category {
    fn default() -> Self {
        Self(DEFAULT_CATEGORY.to_string())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Category,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            title: title.into(),
            notes: None,
            tags: Vec::new(),
            category: Category::default(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = (!notes.trim().is_empty()).then_some(notes);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = normalize_tags(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Category::new(category);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "event.id")?;
        if self.end <= self.start {
            return Err("event.end must be after event.start".to_string());
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    pub fn distinct_tags(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.tags
            .iter()
            .map(String::as_str)
            .filter(|tag| seen.insert(*tag))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FreeBlock {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FreeBlock {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn label(&self, tz: &Tz) -> String {
        format!(
            "{}-{}",
            self.start.with_timezone(tz).format("%H:%M"),
            self.end.with_timezone(tz).format("%H:%M")
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub peer: Event,
    pub strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorMarker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StoredColor {
    Value(String),
    Marker(ColorMarker),
}

impl StoredColor {
    fn value(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value.as_str()),
            Self::Marker(marker) => marker.value.as_deref(),
        }
    }
}

/// Loosely-typed event as handed over by the storage layer. Every field may be
/// absent; conversion into [`Event`] decides which absences are fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub color: Option<StoredColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        Self {
            id: Some(event.id.clone()),
            title: Some(event.title.clone()),
            start: Some(event.start.to_rfc3339()),
            end: Some(event.end.to_rfc3339()),
            tags: Some(event.tags.clone()),
            notes: event.notes.clone(),
            color: Some(StoredColor::Value(event.category.as_str().to_string())),
            border: None,
            name: None,
            category: None,
        }
    }
}

impl TryFrom<EventRecord> for Event {
    type Error = DaybookError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let id = record
            .id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
            .ok_or_else(|| DaybookError::invalid_event(None, "missing id"))?;

        let start = parse_instant(record.start.as_deref(), &id, "start")?;
        let end = parse_instant(record.end.as_deref(), &id, "end")?;
        if end <= start {
            return Err(DaybookError::invalid_event(
                Some(&id),
                "end must be after start",
            ));
        }

        // Blank colors are what the store writes for "unset".
        let category = [
            record.color.as_ref().and_then(StoredColor::value),
            record.category.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(Category::new)
        .unwrap_or_default();

        let mut event = Event::new(id, start, end, record.title.unwrap_or_default())
            .with_tags(record.tags.unwrap_or_default());
        event.category = category;
        if let Some(notes) = record.notes {
            event = event.with_notes(notes);
        }
        Ok(event)
    }
}

pub fn events_from_records(records: Vec<EventRecord>) -> Result<Vec<Event>, DaybookError> {
    records.into_iter().map(Event::try_from).collect()
}

fn parse_instant(
    value: Option<&str>,
    id: &str,
    field_name: &str,
) -> Result<DateTime<Utc>, DaybookError> {
    let raw = value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DaybookError::invalid_event(Some(id), format!("missing {field_name}")))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|error| {
            DaybookError::invalid_event(
                Some(id),
                format!("{field_name} must be an RFC3339 instant: {error}"),
            )
        })
}

fn normalize_tags(tags: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}
