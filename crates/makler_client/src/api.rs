use makler_core::{BrokerSnapshot, ExportScope, FilterSpec, LinkGroups, PostalCode, SearchSpec, SearchSummary};

use crate::{ApiError, DeleteSummary, ExportFile};

/// Operations of the scraper backend used by the admin tool.
///
/// Mutating calls return the backend's confirmation message.
#[async_trait::async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_brokers(&self) -> Result<BrokerSnapshot, ApiError>;

    async fn add_broker(&self, name: &str) -> Result<String, ApiError>;

    async fn remove_broker(&self, name: &str) -> Result<String, ApiError>;

    async fn add_link(&self, broker: &str, link: &str) -> Result<String, ApiError>;

    async fn remove_link(&self, broker: &str, link: &str) -> Result<String, ApiError>;

    async fn start_search(&self, brokers: &[String]) -> Result<SearchSummary, ApiError>;

    async fn list_links(&self, filter: &FilterSpec) -> Result<LinkGroups, ApiError>;

    async fn delete_links(&self, filter: &FilterSpec) -> Result<DeleteSummary, ApiError>;

    async fn export_links(
        &self,
        scope: ExportScope,
        filter: &FilterSpec,
    ) -> Result<ExportFile, ApiError>;

    /// Search URLs that carry the site's location id, one per postal code.
    async fn generate_located_urls(
        &self,
        postal_codes: &[PostalCode],
        template: &SearchSpec,
    ) -> Result<Vec<String>, ApiError>;

    async fn clear_blacklist(&self) -> Result<String, ApiError>;
}
