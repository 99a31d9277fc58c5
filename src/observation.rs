use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::dates;

pub const DEFAULT_CATEGORY: &str = "Unknown";
pub const DEFAULT_LOCATION: &str = "Unknown location";
pub const DEFAULT_STATUS: &str = "Not specified";
pub const DEFAULT_DESCRIPTION: &str = "No description provided";

pub const DEFAULT_SITE_NAME: &str = "Unknown site";
pub const DEFAULT_INSPECTOR_NAME: &str = "Unknown inspector";
pub const DEFAULT_INSPECTION_DATE: &str = "Date not specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Risk {
    High,
    Medium,
    Low,
}

impl Risk {
    pub const ALL: [Risk; 3] = [Risk::High, Risk::Medium, Risk::Low];

    /// Canonical bucket for a raw risk value. Anything unrecognized lands in MEDIUM.
    pub fn from_raw(raw: Option<&str>) -> Risk {
        match raw.map(|r| r.trim().to_uppercase()).as_deref() {
            Some("HIGH") => Risk::High,
            Some("LOW") => Risk::Low,
            _ => Risk::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Risk::High => "HIGH",
            Risk::Medium => "MEDIUM",
            Risk::Low => "LOW",
        }
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation as received. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    #[serde(default = "default_site_name", deserialize_with = "string_or_placeholder_site")]
    pub site_name: String,
    #[serde(default = "default_inspector_name", deserialize_with = "string_or_placeholder_inspector")]
    pub inspector_name: String,
    #[serde(default = "default_inspection_date", deserialize_with = "string_or_placeholder_date")]
    pub inspection_date: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            site_name: default_site_name(),
            inspector_name: default_inspector_name(),
            inspection_date: default_inspection_date(),
        }
    }
}

fn default_site_name() -> String { DEFAULT_SITE_NAME.to_string() }
fn default_inspector_name() -> String { DEFAULT_INSPECTOR_NAME.to_string() }
fn default_inspection_date() -> String { DEFAULT_INSPECTION_DATE.to_string() }

fn string_or_placeholder_site<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_string(d)?.unwrap_or_else(default_site_name))
}

fn string_or_placeholder_inspector<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_string(d)?.unwrap_or_else(default_inspector_name))
}

fn string_or_placeholder_date<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_string(d)?.unwrap_or_else(default_inspection_date))
}

/// Accepts strings, numbers and booleans; null, blank strings and
/// structured values read as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Observation with defaults applied. `index` is the position in the
/// original request and identifies the observation across stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedObservation {
    pub index: usize,
    pub risk: Risk,
    pub category: String,
    pub location: String,
    pub status: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip)]
    pub parsed_date: Option<NaiveDate>,
}

pub fn normalize(index: usize, raw: &Observation) -> NormalizedObservation {
    NormalizedObservation {
        index,
        risk: Risk::from_raw(raw.risk.as_deref()),
        category: raw.category.clone().unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        location: raw.location.clone().unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        status: raw.status.clone().unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        description: raw.description.clone().unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        date: raw.date.clone(),
        parsed_date: raw.date.as_deref().and_then(dates::parse_observation_date),
    }
}

pub fn normalize_all(raw: &[Observation]) -> Vec<NormalizedObservation> {
    raw.iter().enumerate().map(|(i, o)| normalize(i, o)).collect()
}
