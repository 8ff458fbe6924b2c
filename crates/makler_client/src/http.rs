use admin_logging::{admin_debug, admin_info, admin_warn};
use futures_util::StreamExt;
use makler_core::{
    BrokerSnapshot, ExportScope, FilterSpec, LinkGroups, PostalCode, SearchSpec, SearchSummary,
};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::filename::{content_disposition_filename, export_filename};
use crate::{AdminApi, ApiError, ClientSettings, DeleteSummary, ExportFile, FailureKind};

#[derive(Deserialize)]
struct BrokerList {
    #[serde(default)]
    makler: BrokerSnapshot,
}

#[derive(Deserialize)]
struct Confirmation {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct LinkBody<'a> {
    link: &'a str,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    makler_names: &'a [String],
}

#[derive(Serialize)]
struct LocatedUrlsBody<'a> {
    plz_list: &'a [PostalCode],
    filters: &'a SearchSpec,
    reference_url: Option<&'a str>,
}

#[derive(Deserialize)]
struct LocatedUrls {
    #[serde(default)]
    urls: Vec<String>,
}

/// [`AdminApi`] over HTTP against the scraper backend.
#[derive(Debug, Clone)]
pub struct ReqwestAdminApi {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestAdminApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base = Url::parse(settings.base_url.trim())
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    /// Appends percent-encoded path segments and query pairs to the base url.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        admin_debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    fn with_json<T: Serialize>(builder: RequestBuilder, body: &T) -> Result<RequestBuilder, ApiError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        Ok(builder.header(CONTENT_TYPE, "application/json").body(payload))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = read_body(response, self.settings.max_response_bytes)
            .await
            .unwrap_or_default();
        let message = remote_detail(&body).unwrap_or_else(|| status.to_string());
        admin_warn!("Backend answered {}: {}", status, message);
        Err(ApiError::new(FailureKind::HttpStatus(status.as_u16()), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        let body = read_body(response, self.settings.max_response_bytes).await?;
        serde_json::from_slice(&body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }

    async fn confirm(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let confirmation: Confirmation = self.send_json(builder).await?;
        Ok(confirmation.message)
    }
}

#[async_trait::async_trait]
impl AdminApi for ReqwestAdminApi {
    async fn list_brokers(&self) -> Result<BrokerSnapshot, ApiError> {
        let url = self.endpoint(&["makler"], &[]);
        let list: BrokerList = self.send_json(self.request(Method::GET, url)).await?;
        admin_debug!("Loaded {} brokers", list.makler.len());
        Ok(list.makler)
    }

    async fn add_broker(&self, name: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["makler"], &[("name", name.to_string())]);
        self.confirm(self.request(Method::POST, url)).await
    }

    async fn remove_broker(&self, name: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["makler", name], &[]);
        self.confirm(self.request(Method::DELETE, url)).await
    }

    async fn add_link(&self, broker: &str, link: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["makler", broker, "links"], &[]);
        let builder = Self::with_json(self.request(Method::POST, url), &LinkBody { link })?;
        self.confirm(builder).await
    }

    async fn remove_link(&self, broker: &str, link: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["makler", broker, "links"], &[("link", link.to_string())]);
        self.confirm(self.request(Method::DELETE, url)).await
    }

    async fn start_search(&self, brokers: &[String]) -> Result<SearchSummary, ApiError> {
        let url = self.endpoint(&["search", "makler"], &[]);
        admin_info!("Starting search for {} brokers", brokers.len());
        let builder = self
            .request(Method::POST, url)
            .timeout(self.settings.search_timeout);
        let builder = Self::with_json(builder, &SearchBody { makler_names: brokers })?;
        self.send_json(builder).await
    }

    async fn list_links(&self, filter: &FilterSpec) -> Result<LinkGroups, ApiError> {
        let url = self.endpoint(&["links", "grouped"], &filter.query_pairs());
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn delete_links(&self, filter: &FilterSpec) -> Result<DeleteSummary, ApiError> {
        let url = self.endpoint(&["links"], &filter.query_pairs());
        let summary: DeleteSummary = self.send_json(self.request(Method::DELETE, url)).await?;
        admin_info!("Deleted {} links", summary.deleted_count);
        Ok(summary)
    }

    async fn export_links(
        &self,
        scope: ExportScope,
        filter: &FilterSpec,
    ) -> Result<ExportFile, ApiError> {
        let segment = match scope {
            ExportScope::LastSearch => "last",
            ExportScope::All => "all",
            ExportScope::Dated => "filtered",
        };
        // The endpoint itself selects the latest run.
        let pairs = filter.clone().last_search_only(false).query_pairs();
        let url = self.endpoint(&["export", segment], &pairs);

        let response = self.send(self.request(Method::GET, url)).await?;
        let server_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(content_disposition_filename);
        let bytes = read_body(response, self.settings.max_export_bytes).await?;

        let filename = server_name.unwrap_or_else(|| export_filename(scope, filter));
        admin_info!("Exported {} bytes as {}", bytes.len(), filename);
        Ok(ExportFile { filename, bytes })
    }

    async fn generate_located_urls(
        &self,
        postal_codes: &[PostalCode],
        template: &SearchSpec,
    ) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint(&["generate-urls"], &[]);
        let body = LocatedUrlsBody {
            plz_list: postal_codes,
            filters: template,
            reference_url: None,
        };
        let builder = self
            .request(Method::POST, url)
            .timeout(self.settings.search_timeout);
        let located: LocatedUrls = self.send_json(Self::with_json(builder, &body)?).await?;
        Ok(located.urls)
    }

    async fn clear_blacklist(&self) -> Result<String, ApiError> {
        let url = self.endpoint(&["blacklist"], &[]);
        self.confirm(self.request(Method::DELETE, url)).await
    }
}

/// Streams the body, failing once it grows past `max_bytes`.
async fn read_body(response: Response, max_bytes: u64) -> Result<Vec<u8>, ApiError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(ApiError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(content_len),
                },
                "response too large",
            ));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(ApiError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(next_len),
                },
                "response too large",
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// The `detail` field of a JSON error body; validation errors carry a list there.
fn remote_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
