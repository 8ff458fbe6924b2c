use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Group name for links that are not assigned to any broker.
pub const UNASSIGNED_GROUP: &str = "Sonstige";

/// A scraped listing link as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    #[serde(
        rename = "makler_names",
        default,
        deserialize_with = "one_or_many"
    )]
    pub brokers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<String>,
}

impl LinkRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            brokers: Vec::new(),
            scraped_at: None,
        }
    }

    pub fn with_broker(mut self, broker: impl Into<String>) -> Self {
        self.brokers.push(broker.into());
        self
    }

    pub fn with_scraped_at(self, scraped_at: impl Into<String>) -> Self {
        Self {
            scraped_at: Some(scraped_at.into()),
            ..self
        }
    }

    /// Discovery timestamp in the backend's local time, if it parses.
    pub fn discovered_at(&self) -> Option<NaiveDateTime> {
        let raw = self.scraped_at.as_deref()?.trim();
        raw.parse::<NaiveDateTime>().ok().or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
    }

    pub fn is_unassigned(&self) -> bool {
        self.brokers.iter().all(|name| name.trim().is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

// The backend has stored both a bare name and a list of names over time.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(name)) if name.is_empty() => Vec::new(),
        Some(OneOrMany::One(name)) => vec![name],
        Some(OneOrMany::Many(names)) => names,
    })
}

/// Links grouped by broker name, as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkGroups {
    #[serde(default)]
    pub grouped: BTreeMap<String, Vec<LinkRecord>>,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub filtered_count: usize,
}

impl LinkGroups {
    pub fn link_count(&self) -> usize {
        self.grouped.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SearchSummary {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub new_links: Vec<String>,
    #[serde(default)]
    pub total_links: usize,
    #[serde(default)]
    pub message: String,
}
