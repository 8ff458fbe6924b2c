use crate::{BrokerSnapshot, ExportRecord, ExportScope, FilterInput, LinkGroups, SearchSpec, SearchSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    List,
    Delete,
    Export(ExportScope),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Operator asked for a fresh broker list.
    RefreshRequested,
    /// Full broker snapshot fetched from the backend.
    BrokersLoaded(BrokerSnapshot),
    AddBrokerSubmitted(String),
    RemoveBrokerConfirmed(String),
    AddLinkSubmitted { broker: String, link: String },
    RemoveLinkClicked { broker: String, link: String },
    /// Several search URLs pasted at once, one per line.
    BulkLinksSubmitted { broker: String, text: String },
    /// Start scraping the search URLs of the selected brokers.
    SearchSubmitted(Vec<String>),
    /// List, delete or export scraped links matching the operator's filter selection.
    LinkQuerySubmitted { input: FilterInput, action: LinkAction },
    /// Build search URLs locally from a template and raw postal-code text.
    UrlsRequested {
        template: SearchSpec,
        postal_text: String,
    },
    /// Ask the backend for search URLs that include the site's location id.
    LocatedUrlsRequested {
        template: SearchSpec,
        postal_text: String,
    },
    ClearBlacklistConfirmed,
    MutationSucceeded(String),
    BulkFinished { succeeded: usize, failed: usize },
    SearchFinished(SearchSummary),
    LinksListed(LinkGroups),
    LinksDeleted(usize),
    ExportSaved(ExportRecord),
    LocatedUrlsGenerated(Vec<String>),
    /// A backend call failed; carries the user-facing message.
    RequestFailed(String),
    NoOp,
}
