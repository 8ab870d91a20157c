//! Records as delivered by the upstream agency export
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

use super::service::ServiceMode;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StopRecord {
    pub id: String,
    pub name: String,
    /// `"5"`, `"6/5"` or empty when the stop isn't zoned
    #[serde(default)]
    pub fare_zone: String,
    /// Kept as text, quantizing happens when the stop index is built
    #[serde(deserialize_with = "raw_decimal")]
    pub lat: String,
    #[serde(deserialize_with = "raw_decimal")]
    pub lon: String,
    pub last_modified: DateTime<FixedOffset>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceRecord {
    pub code: String,
    pub name: String,
    pub mode: ServiceMode,
    pub last_modified: DateTime<FixedOffset>,
    /// Schools served by the service, mostly empty
    #[serde(default)]
    pub schools: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceMapPayload {
    pub service_code: String,
    /// Each polyline is a list of `"lat,lon"` strings. Some sources append a third `",0"` field.
    pub polylines: Vec<Vec<String>>,
}

// The export is inconsistent about quoting coordinates so accept both "-41.2" and -41.2
fn raw_decimal<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDecimal {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawDecimal::deserialize(deserializer)? {
        RawDecimal::Text(text) => text,
        RawDecimal::Number(number) => number.to_string(),
    })
}
