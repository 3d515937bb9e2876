use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{de, Deserialize, Deserializer};
use thiserror::Error;

/// Storage representation for event dates, always UTC.
pub const DATETIME_STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalEvent {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub start_date: String,
    pub end_date: String,
    pub available_tickets: u32,
    pub price: Price,
    pub organizer: Organizer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Organizer {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalEventRecord {
    pub external_id: String,
    pub title: String,
    pub body: String,
    pub start_utc: String,
    pub end_utc: String,
    pub tickets: u32,
    pub price: f64,
    pub organizer_id: String,
    pub image_path: String,
    pub created_at_utc: String,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("unparseable event date {0:?}")]
    BadDate(String),
}

impl LocalEventRecord {
    /// Field-by-field mapping from the feed schema. Fails only on dates the
    /// feed sent in a shape we do not understand.
    pub fn from_feed(
        event: &ExternalEvent,
        image_path: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, MapError> {
        Ok(Self {
            external_id: event.id.clone(),
            title: event.title.clone(),
            body: event.description.clone(),
            start_utc: normalize_datetime(&event.start_date)?,
            end_utc: normalize_datetime(&event.end_date)?,
            tickets: event.available_tickets,
            price: event.price.amount,
            organizer_id: event.organizer.id.clone(),
            image_path: image_path.to_string(),
            created_at_utc: storage_datetime(now),
        })
    }
}

pub fn storage_datetime(value: DateTime<Utc>) -> String {
    value.format(DATETIME_STORAGE_FORMAT).to_string()
}

/// Normalize a feed date string to `DATETIME_STORAGE_FORMAT` in UTC.
///
/// RFC 3339 timestamps keep their offset and are converted; naive timestamps
/// and bare dates are taken as already being in UTC.
pub fn normalize_datetime(input: &str) -> Result<String, MapError> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(storage_datetime(dt.with_timezone(&Utc)));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.format(DATETIME_STORAGE_FORMAT).to_string());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date
            .and_time(NaiveTime::MIN)
            .format(DATETIME_STORAGE_FORMAT)
            .to_string());
    }

    Err(MapError::BadDate(input.to_string()))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE_EVENT: &str = r#"{
        "id": "ev-17",
        "title": "Winter Gala",
        "description": "An evening of music.",
        "image": "https://cdn.example.com/gala.jpg",
        "start_date": "2026-12-04T19:00:00",
        "end_date": "2026-12-04T23:30:00",
        "available_tickets": 42,
        "price": {"amount": 250.0},
        "organizer": {"id": 9}
    }"#;

    #[test]
    fn decodes_feed_event() {
        let event: ExternalEvent = serde_json::from_str(SAMPLE_EVENT).unwrap();
        assert_eq!(event.id, "ev-17");
        assert_eq!(event.title, "Winter Gala");
        assert_eq!(event.available_tickets, 42);
        assert_eq!(event.price.amount, 250.0);
        assert_eq!(event.organizer.id, "9");
    }

    #[test]
    fn decodes_numeric_id() {
        let raw = SAMPLE_EVENT.replace("\"ev-17\"", "17");
        let event: ExternalEvent = serde_json::from_str(&raw).unwrap();
        assert_eq!(event.id, "17");
    }

    #[test]
    fn rejects_object_id() {
        let raw = SAMPLE_EVENT.replace("\"ev-17\"", "{\"value\": 17}");
        assert!(serde_json::from_str::<ExternalEvent>(&raw).is_err());
    }

    #[test]
    fn normalizes_rfc3339_to_utc() {
        assert_eq!(
            normalize_datetime("2026-12-04T19:00:00+02:00").unwrap(),
            "2026-12-04T17:00:00"
        );
    }

    #[test]
    fn normalizes_naive_forms() {
        assert_eq!(
            normalize_datetime("2026-12-04T19:00:00").unwrap(),
            "2026-12-04T19:00:00"
        );
        assert_eq!(
            normalize_datetime("2026-12-04 19:00:00").unwrap(),
            "2026-12-04T19:00:00"
        );
        assert_eq!(
            normalize_datetime("2026-12-04").unwrap(),
            "2026-12-04T00:00:00"
        );
    }

    #[test]
    fn rejects_unknown_date_shape() {
        assert!(matches!(
            normalize_datetime("next friday"),
            Err(MapError::BadDate(_))
        ));
    }

    #[test]
    fn maps_feed_event_to_record() {
        let event: ExternalEvent = serde_json::from_str(SAMPLE_EVENT).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 11, 1, 12, 0, 0).unwrap();
        let record = LocalEventRecord::from_feed(&event, "media/external_events/ev-17", now).unwrap();
        assert_eq!(record.external_id, "ev-17");
        assert_eq!(record.body, "An evening of music.");
        assert_eq!(record.start_utc, "2026-12-04T19:00:00");
        assert_eq!(record.end_utc, "2026-12-04T23:30:00");
        assert_eq!(record.tickets, 42);
        assert_eq!(record.organizer_id, "9");
        assert_eq!(record.image_path, "media/external_events/ev-17");
        assert_eq!(record.created_at_utc, "2026-11-01T12:00:00");
    }
}
