use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A broker ("Makler") and the search URLs that are scraped on its behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broker {
    pub name: String,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Broker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.links.push(link.into());
        self
    }
}

pub type BrokerSnapshot = BTreeMap<String, Broker>;

/// Local copy of the backend's broker list.
///
/// The copy is never patched in place. Every mutation marks it stale, and
/// only a full [`replace`](Self::replace) with a freshly fetched snapshot
/// clears the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerStore {
    snapshot: BrokerSnapshot,
    stale: bool,
    generation: u64,
}

impl Default for BrokerStore {
    fn default() -> Self {
        Self {
            snapshot: BrokerSnapshot::new(),
            stale: true,
            generation: 0,
        }
    }
}

impl BrokerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &BrokerSnapshot {
        &self.snapshot
    }

    pub fn broker_count(&self) -> usize {
        self.snapshot.len()
    }

    pub fn total_links(&self) -> usize {
        self.snapshot.values().map(|b| b.links.len()).sum()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Number of completed refreshes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn replace(&mut self, snapshot: BrokerSnapshot) {
        self.snapshot = snapshot;
        self.stale = false;
        self.generation += 1;
    }
}
