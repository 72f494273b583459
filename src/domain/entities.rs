//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(default, with = "release_date")]
    pub release_date: Option<Date>,
    pub genre: String,
    pub director: String,
    pub rating: f64,
    pub duration: i32,
    pub language: String,
    pub poster_url: String,
    pub trailer_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: i64,
    pub movie_id: i64,
    pub comment: String,
}

/// Binary poster attached to a movie. The payload is served raw, never as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosterRecord {
    pub id: i64,
    pub movie_id: i64,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub mime_type: String,
    pub created_at: OffsetDateTime,
}

/// Calendar dates travel as `YYYY-MM-DD`.
///
/// Full RFC 3339 timestamps are accepted on input and truncated to their date,
/// and an empty string reads as no date.
pub mod release_date {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
    use time::{
        Date, OffsetDateTime,
        format_description::{FormatItem, well_known::Rfc3339},
        macros::format_description,
    };

    const DATE_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day]");

    pub fn serialize<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => {
                let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse(value).map(Some).map_err(D::Error::custom),
        }
    }

    pub fn parse(value: &str) -> Result<Date, String> {
        if let Ok(date) = Date::parse(value, DATE_FORMAT) {
            return Ok(date);
        }
        OffsetDateTime::parse(value, &Rfc3339)
            .map(|timestamp| timestamp.date())
            .map_err(|err| format!("invalid release date `{value}`: {err}"))
    }
}
