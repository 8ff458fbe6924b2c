use crate::{FilterSpec, PostalCode, SearchSpec};

/// Which of the backend's export operations to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    /// Links discovered by the most recent search run.
    LastSearch,
    All,
    /// Explicit year and month, optionally a day.
    Dated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchBrokers,
    AddBroker { name: String },
    RemoveBroker { name: String },
    AddLink { broker: String, link: String },
    RemoveLink { broker: String, link: String },
    /// Submit links one at a time; later items run only after earlier ones finish.
    AddLinksSequentially { broker: String, links: Vec<String> },
    StartSearch { brokers: Vec<String> },
    ListLinks { filter: FilterSpec },
    DeleteLinks { filter: FilterSpec },
    ExportLinks { scope: ExportScope, filter: FilterSpec },
    GenerateLocatedUrls {
        template: SearchSpec,
        postal_codes: Vec<PostalCode>,
    },
    ClearBlacklist,
}
