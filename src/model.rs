use crate::{
    metadata::VideoMetadata,
    platform::{Platform, Quality},
};

use chrono::{DateTime, NaiveDateTime, ParseError, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Row of the `download_history` table as returned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadHistoryRecord {
    /// Store-assigned identifier
    pub id: String,
    pub video_url: String,
    pub video_title: String,
    pub platform: Platform,
    pub quality: Quality,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    pub file_name: String,
    /// Store-assigned default
    #[serde(deserialize_with = "deserialize_store_timestamp")]
    pub download_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_store_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Parses an RFC 3339 timestamp, or one without an offset (a `timestamp` column), taken as UTC.
pub fn parse_store_timestamp(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))?;
    Ok(naive.and_utc())
}

fn deserialize_store_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_store_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Payload sent to the store when a simulated download completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDownloadRecord {
    pub video_url: String,
    pub video_title: String,
    pub platform: Platform,
    pub quality: Quality,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    pub file_name: String,
}

impl NewDownloadRecord {
    pub fn new(video_url: impl Into<String>, metadata: &VideoMetadata, quality: Quality) -> Self {
        Self {
            video_url: video_url.into(),
            video_title: metadata.title.clone(),
            platform: metadata.platform,
            quality,
            thumbnail_url: Some(metadata.thumbnail.clone()),
            duration: Some(metadata.duration.clone()),
            file_name: derive_file_name(&metadata.title, quality),
        }
    }
}

/// Builds `<title>_<quality>.mp4`, replacing every character outside `[A-Za-z0-9]` in the title with `_`.
pub fn derive_file_name(title: &str, quality: Quality) -> String {
    let stem: String = title
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();

    format!("{stem}_{quality}.mp4")
}

/// Formats like `Jan 5, 2024, 03:04 PM`.
pub fn format_download_date<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.format("%b %-d, %Y, %I:%M %p").to_string()
}
