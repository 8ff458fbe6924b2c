use crate::{ExportRecord, LinkGroups, SearchSummary, StatusLine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerRowView {
    pub name: String,
    pub link_count: usize,
    pub links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdminViewModel {
    pub brokers: Vec<BrokerRowView>,
    pub broker_count: usize,
    pub total_links: usize,
    /// The broker list may be out of date until the next refresh lands.
    pub stale: bool,
    pub status: Option<StatusLine>,
    pub link_groups: Option<LinkGroups>,
    pub generated_urls: Vec<String>,
    pub skipped_postal_codes: Vec<String>,
    pub last_export: Option<ExportRecord>,
    pub last_search: Option<SearchSummary>,
}
