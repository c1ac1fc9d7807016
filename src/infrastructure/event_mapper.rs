use crate::domain::models::Event;
use crate::infrastructure::error::DaybookError;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

pub const PROVIDER_ID_PREFIX: &str = "google_";
pub const PROVIDER_TAG: &str = "Google";
pub const PROVIDER_CATEGORY: &str = "bg-green-500";
pub const UNTITLED_EVENT_TITLE: &str = "(untitled)";
const STATUS_CANCELLED: &str = "cancelled";

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CalendarEventDateTime {
    #[serde(rename = "dateTime", default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "timeZone", default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ProviderCalendarEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub start: CalendarEventDateTime,
    pub end: CalendarEventDateTime,
}

/// Maps a provider event into an [`Event`]. Cancelled events yield `None`.
///
/// All-day dates are read as local dates in `tz`; the provider's end date is
/// exclusive, so an all-day event ends at the local midnight that opens it.
/// An end that is not after the start is rolled forward by one day.
pub fn decode_provider_event(
    event: &ProviderCalendarEvent,
    source_label: &str,
    tz: &Tz,
) -> Result<Option<Event>, DaybookError> {
    if event
        .status
        .as_deref()
        .is_some_and(|status| status.trim().eq_ignore_ascii_case(STATUS_CANCELLED))
    {
        return Ok(None);
    }

    let remote_id = event
        .id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DaybookError::invalid_event(None, "provider event without id"))?;
    let id = format!("{PROVIDER_ID_PREFIX}{remote_id}");

    let start = parse_event_instant(&event.start, &id, "start", tz)?;
    let mut end = parse_event_instant(&event.end, &id, "end", tz)?;
    if end <= start {
        end += Duration::days(1);
    }
    if end <= start {
        return Err(DaybookError::invalid_event(
            Some(&id),
            "end is more than a day before start",
        ));
    }

    let title = event
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(UNTITLED_EVENT_TITLE);

    let mut tags = vec![PROVIDER_TAG.to_string()];
    let source_label = source_label.trim();
    if !source_label.is_empty() {
        tags.push(source_label.to_string());
    }

    let mut decoded = Event::new(id, start, end, title)
        .with_tags(tags)
        .with_category(PROVIDER_CATEGORY);
    if let Some(description) = event.description.as_deref() {
        decoded = decoded.with_notes(description);
    }
    Ok(Some(decoded))
}

pub fn decode_provider_events(
    events: &[ProviderCalendarEvent],
    source_label: &str,
    tz: &Tz,
) -> Result<Vec<Event>, DaybookError> {
    events
        .iter()
        .filter_map(|event| decode_provider_event(event, source_label, tz).transpose())
        .collect()
}

fn parse_event_instant(
    value: &CalendarEventDateTime,
    id: &str,
    field_name: &str,
    tz: &Tz,
) -> Result<DateTime<Utc>, DaybookError> {
    if let Some(raw) = value.date_time.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        return DateTime::parse_from_rfc3339(raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|error| {
                DaybookError::invalid_event(
                    Some(id),
                    format!("invalid {field_name}.dateTime '{raw}': {error}"),
                )
            });
    }

    let Some(raw) = value.date.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Err(DaybookError::invalid_event(
            Some(id),
            format!("missing {field_name}"),
        ));
    };
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|error| {
        DaybookError::invalid_event(
            Some(id),
            format!("invalid {field_name}.date '{raw}': {error}"),
        )
    })?;
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            DaybookError::invalid_event(
                Some(id),
                format!("{field_name}.date '{raw}' has no local midnight"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::similarity::score_breakdown;
    use crate::domain::models::EventRecord;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn timed(value: &str) -> CalendarEventDateTime {
        CalendarEventDateTime {
            date_time: Some(value.to_string()),
            ..CalendarEventDateTime::default()
        }
    }

    fn all_day(value: &str) -> CalendarEventDateTime {
        CalendarEventDateTime {
            date: Some(value.to_string()),
            ..CalendarEventDateTime::default()
        }
    }

    fn sample_event() -> ProviderCalendarEvent {
        ProviderCalendarEvent {
            id: Some("abc123".to_string()),
            summary: Some("Seminar".to_string()),
            description: Some("Room 4".to_string()),
            status: Some("confirmed".to_string()),
            start: timed("2026-02-16T13:00:00+09:00"),
            end: timed("2026-02-16T14:30:00+09:00"),
        }
    }

    #[test]
    fn timed_event_is_mapped_with_provider_defaults() {
        let decoded = decode_provider_event(&sample_event(), "Campus", &Tz::UTC)
            .expect("decode should succeed")
            .expect("confirmed event");

        assert_eq!(decoded.id, "google_abc123");
        assert_eq!(decoded.title, "Seminar");
        assert_eq!(decoded.notes.as_deref(), Some("Room 4"));
        assert_eq!(decoded.tags, vec!["Google".to_string(), "Campus".to_string()]);
        assert_eq!(decoded.category.as_str(), PROVIDER_CATEGORY);
        assert_eq!(decoded.start, fixed_time("2026-02-16T04:00:00Z"));
        assert_eq!(decoded.end, fixed_time("2026-02-16T05:30:00Z"));
    }

    #[test]
    fn all_day_event_spans_local_days() {
        let event = ProviderCalendarEvent {
            summary: None,
            start: all_day("2026-02-16"),
            end: all_day("2026-02-17"),
            ..sample_event()
        };
        let decoded = decode_provider_event(&event, "", &chrono_tz::Asia::Tokyo)
            .expect("decode should succeed")
            .expect("confirmed event");

        assert_eq!(decoded.title, UNTITLED_EVENT_TITLE);
        assert_eq!(decoded.tags, vec!["Google".to_string()]);
        assert_eq!(decoded.start, fixed_time("2026-02-15T15:00:00Z"));
        assert_eq!(decoded.end, fixed_time("2026-02-16T15:00:00Z"));
    }

    #[test]
    fn end_before_start_is_rolled_to_the_next_day() {
        let event = ProviderCalendarEvent {
            start: timed("2026-02-16T23:00:00Z"),
            end: timed("2026-02-16T01:00:00Z"),
            ..sample_event()
        };
        let decoded = decode_provider_event(&event, "Campus", &Tz::UTC)
            .expect("decode should succeed")
            .expect("confirmed event");
        assert_eq!(decoded.end, fixed_time("2026-02-17T01:00:00Z"));
    }

    #[test]
    fn cancelled_events_are_skipped() {
        let cancelled = ProviderCalendarEvent {
            status: Some("Cancelled".to_string()),
            ..sample_event()
        };
        let decoded = decode_provider_events(&[sample_event(), cancelled], "Campus", &Tz::UTC)
            .expect("decode should succeed");
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn missing_id_or_times_are_invalid_events() {
        let without_id = ProviderCalendarEvent {
            id: None,
            ..sample_event()
        };
        assert!(matches!(
            decode_provider_event(&without_id, "Campus", &Tz::UTC),
            Err(DaybookError::InvalidEvent { id: None, .. })
        ));

        let without_start = ProviderCalendarEvent {
            start: CalendarEventDateTime::default(),
            ..sample_event()
        };
        assert!(matches!(
            decode_provider_event(&without_start, "Campus", &Tz::UTC),
            Err(DaybookError::InvalidEvent { id: Some(_), .. })
        ));

        let garbled = ProviderCalendarEvent {
            end: timed("invalid-timestamp"),
            ..sample_event()
        };
        assert!(decode_provider_event(&garbled, "Campus", &Tz::UTC).is_err());
    }

    #[test]
    fn provider_event_matches_its_stored_copy_on_category() {
        let decoded = decode_provider_event(&sample_event(), "Campus", &Tz::UTC)
            .expect("decode should succeed")
            .expect("confirmed event");

        let stored = serde_json::to_string(&EventRecord::from(&decoded)).expect("serialize record");
        let record: EventRecord = serde_json::from_str(&stored).expect("parse record");
        let mut reloaded = Event::try_from(record).expect("convert record");
        assert_eq!(reloaded.category, decoded.category);

        reloaded.id = "reloaded".to_string();
        assert_eq!(score_breakdown(&decoded, &reloaded, 30.0).category, 1.0);
    }

    #[test]
    fn provider_payload_deserializes() {
        let raw = r#"{
            "id": "evt-9",
            "summary": "Lab meeting",
            "start": { "dateTime": "2026-02-16T10:00:00Z", "timeZone": "UTC" },
            "end": { "dateTime": "2026-02-16T11:00:00Z" }
        }"#;
        let event: ProviderCalendarEvent = serde_json::from_str(raw).expect("parse event");
        let decoded = decode_provider_event(&event, "Lab", &Tz::UTC)
            .expect("decode should succeed")
            .expect("event without status");
        assert_eq!(decoded.duration(), Duration::hours(1));
        assert_eq!(decoded.notes, None);
    }
}
