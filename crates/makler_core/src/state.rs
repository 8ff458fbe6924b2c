use crate::view_model::{AdminViewModel, BrokerRowView};
use crate::{BrokerStore, LinkGroups, SearchSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub path: String,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdminState {
    brokers: BrokerStore,
    status: Option<StatusLine>,
    link_groups: Option<LinkGroups>,
    generated_urls: Vec<String>,
    skipped_postal_codes: Vec<String>,
    last_export: Option<ExportRecord>,
    last_search: Option<SearchSummary>,
}

impl AdminState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brokers(&self) -> &BrokerStore {
        &self.brokers
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn view(&self) -> AdminViewModel {
        let brokers = self
            .brokers
            .snapshot()
            .values()
            .map(|broker| BrokerRowView {
                name: broker.name.clone(),
                link_count: broker.links.len(),
                links: broker.links.clone(),
            })
            .collect();

        AdminViewModel {
            brokers,
            broker_count: self.brokers.broker_count(),
            total_links: self.brokers.total_links(),
            stale: self.brokers.is_stale(),
            status: self.status.clone(),
            link_groups: self.link_groups.clone(),
            generated_urls: self.generated_urls.clone(),
            skipped_postal_codes: self.skipped_postal_codes.clone(),
            last_export: self.last_export.clone(),
            last_search: self.last_search.clone(),
        }
    }

    pub(crate) fn brokers_mut(&mut self) -> &mut BrokerStore {
        &mut self.brokers
    }

    pub(crate) fn set_status(&mut self, severity: Severity, text: impl Into<String>) {
        self.status = Some(StatusLine {
            severity,
            text: text.into(),
        });
    }

    pub(crate) fn set_link_groups(&mut self, groups: LinkGroups) {
        self.link_groups = Some(groups);
    }

    pub(crate) fn set_generated(&mut self, urls: Vec<String>, skipped: Vec<String>) {
        self.generated_urls = urls;
        self.skipped_postal_codes = skipped;
    }

    pub(crate) fn set_generated_urls(&mut self, urls: Vec<String>) {
        self.generated_urls = urls;
    }

    pub(crate) fn set_last_export(&mut self, record: ExportRecord) {
        self.last_export = Some(record);
    }

    pub(crate) fn set_last_search(&mut self, summary: SearchSummary) {
        self.last_search = Some(summary);
    }
}
