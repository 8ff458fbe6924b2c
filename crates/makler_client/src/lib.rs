//! Makler client: backend API access, export files and bulk submission.
mod api;
mod bulk;
mod filename;
mod http;
mod persist;
mod settings;
mod types;

pub use api::AdminApi;
pub use bulk::{BulkPolicy, BulkReport, SequentialQueue};
pub use filename::{content_disposition_filename, export_filename, sanitize_component};
pub use http::ReqwestAdminApi;
pub use persist::{AtomicFileWriter, PersistError};
pub use settings::{ClientSettings, DEFAULT_API_URL};
pub use types::{ApiError, DeleteSummary, ExportFile, FailureKind};
