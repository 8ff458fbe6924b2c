//! Link-collection filters.
//!
//! A [`FilterSpec`] is the single query shape handed to the list, delete and
//! export operations of the link store. [`FilterSpec::matches`] is the
//! reference predicate those operations evaluate.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::Datelike;
use serde::Serialize;

use crate::link::{LinkRecord, UNASSIGNED_GROUP};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(i64),
    #[error("day must be between 1 and 31, got {0}")]
    DayOutOfRange(i64),
    #[error("{field} is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterSpec {
    #[serde(rename = "makler_names", skip_serializing_if = "BTreeSet::is_empty")]
    broker_names: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    day: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    last_search_only: bool,
}

impl FilterSpec {
    /// The unrestricted filter: matches the whole collection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broker(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            self.broker_names.insert(trimmed.to_string());
        }
        self
    }

    pub fn with_brokers<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, Self::with_broker)
    }

    pub fn with_year(self, year: i32) -> Self {
        Self {
            year: Some(year),
            ..self
        }
    }

    pub fn with_month(self, month: i64) -> Result<Self, FilterError> {
        let month = checked_range(month, 12).ok_or(FilterError::MonthOutOfRange(month))?;
        Ok(Self {
            month: Some(month),
            ..self
        })
    }

    /// `day` is accepted without `month`; it then matches that day of any month.
    pub fn with_day(self, day: i64) -> Result<Self, FilterError> {
        let day = checked_range(day, 31).ok_or(FilterError::DayOutOfRange(day))?;
        Ok(Self {
            day: Some(day),
            ..self
        })
    }

    pub fn last_search_only(self, last_search_only: bool) -> Self {
        Self {
            last_search_only,
            ..self
        }
    }

    pub fn broker_names(&self) -> &BTreeSet<String> {
        &self.broker_names
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn is_last_search_only(&self) -> bool {
        self.last_search_only
    }

    pub fn has_date(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.day.is_some()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.broker_names.is_empty() && !self.has_date() && !self.last_search_only
    }

    /// Flat query parameters in the backend's shape; unset fields are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.broker_names.is_empty() {
            let joined = self
                .broker_names
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("makler_names", joined));
        }
        if let Some(year) = self.year {
            pairs.push(("year", year.to_string()));
        }
        if let Some(month) = self.month {
            pairs.push(("month", month.to_string()));
        }
        if let Some(day) = self.day {
            pairs.push(("day", day.to_string()));
        }
        if self.last_search_only {
            pairs.push(("last_search_only", "true".to_string()));
        }
        pairs
    }

    /// Conjunction across field categories; OR only within the broker set.
    ///
    /// A date constraint never matches a link whose timestamp is missing or unparseable.
    pub fn matches(&self, link: &LinkRecord, latest_run: &HashSet<String>) -> bool {
        if self.last_search_only && !latest_run.contains(&link.url) {
            return false;
        }

        if self.has_date() {
            let Some(discovered) = link.discovered_at() else {
                return false;
            };
            if self.year.is_some_and(|year| discovered.year() != year)
                || self.month.is_some_and(|month| discovered.month() != month)
                || self.day.is_some_and(|day| discovered.day() != day)
            {
                return false;
            }
        }

        self.broker_names.is_empty()
            || link
                .brokers
                .iter()
                .any(|name| self.broker_names.contains(name.trim()))
    }
}

fn checked_range(value: i64, max: u32) -> Option<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| (1..=max).contains(v))
}

/// Raw operator selection, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterInput {
    pub broker_names: Vec<String>,
    pub year: String,
    pub month: String,
    pub day: String,
    pub last_search_only: bool,
}

impl FilterInput {
    pub fn build(&self) -> Result<FilterSpec, FilterError> {
        let mut spec = FilterSpec::new()
            .with_brokers(self.broker_names.iter().cloned())
            .last_search_only(self.last_search_only);

        if let Some(year) = parse_field("year", &self.year)? {
            let year = i32::try_from(year).map_err(|_| FilterError::NotANumber {
                field: "year",
                value: self.year.clone(),
            })?;
            spec = spec.with_year(year);
        }
        if let Some(month) = parse_field("month", &self.month)? {
            spec = spec.with_month(month)?;
        }
        if let Some(day) = parse_field("day", &self.day)? {
            spec = spec.with_day(day)?;
        }
        Ok(spec)
    }
}

fn parse_field(field: &'static str, raw: &str) -> Result<Option<i64>, FilterError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| FilterError::NotANumber {
            field,
            value: trimmed.to_string(),
        })
}

/// Applies `filter` and groups matches by broker.
///
/// With a broker restriction only the requested brokers get a group; without one,
/// unassigned links are collected under [`UNASSIGNED_GROUP`].
pub fn group_by_broker<'a, I>(
    links: I,
    filter: &FilterSpec,
    latest_run: &HashSet<String>,
) -> BTreeMap<String, Vec<LinkRecord>>
where
    I: IntoIterator<Item = &'a LinkRecord>,
{
    let mut grouped: BTreeMap<String, Vec<LinkRecord>> = BTreeMap::new();
    for link in links {
        if !filter.matches(link, latest_run) {
            continue;
        }
        if link.is_unassigned() {
            if filter.broker_names.is_empty() {
                grouped
                    .entry(UNASSIGNED_GROUP.to_string())
                    .or_default()
                    .push(link.clone());
            }
            continue;
        }
        for name in link.brokers.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            if filter.broker_names.is_empty() || filter.broker_names.contains(name) {
                grouped.entry(name.to_string()).or_default().push(link.clone());
            }
        }
    }
    grouped
}
