use admin_logging::{admin_error, admin_info, admin_warn};
use makler_client::{AdminApi, ApiError, AtomicFileWriter, SequentialQueue};
use makler_core::{Effect, ExportRecord, Msg};

/// Executes core effects against the backend, one at a time, and reports
/// each outcome as a message for `update`.
pub struct EffectRunner<'a> {
    api: &'a dyn AdminApi,
    queue: SequentialQueue,
    writer: AtomicFileWriter,
}

impl<'a> EffectRunner<'a> {
    pub fn new(api: &'a dyn AdminApi, queue: SequentialQueue, writer: AtomicFileWriter) -> Self {
        Self { api, queue, writer }
    }

    pub async fn run(&self, effect: Effect) -> Msg {
        match effect {
            Effect::FetchBrokers => match self.api.list_brokers().await {
                Ok(snapshot) => Msg::BrokersLoaded(snapshot),
                Err(err) => failed("Loading brokers failed", &err),
            },
            Effect::AddBroker { name } => {
                let result = self.api.add_broker(&name).await;
                confirmed(result, || format!("Broker '{name}' added."), "Adding broker failed")
            }
            Effect::RemoveBroker { name } => {
                let result = self.api.remove_broker(&name).await;
                confirmed(result, || format!("Broker '{name}' removed."), "Removing broker failed")
            }
            Effect::AddLink { broker, link } => {
                let result = self.api.add_link(&broker, &link).await;
                confirmed(result, || format!("Link added to '{broker}'."), "Adding link failed")
            }
            Effect::RemoveLink { broker, link } => {
                let result = self.api.remove_link(&broker, &link).await;
                confirmed(result, || format!("Link removed from '{broker}'."), "Removing link failed")
            }
            Effect::AddLinksSequentially { broker, links } => {
                admin_info!("Adding {} links to {}", links.len(), broker);
                let report = self.queue.add_links(self.api, &broker, links).await;
                Msg::BulkFinished {
                    succeeded: report.succeeded,
                    failed: report.failed(),
                }
            }
            Effect::StartSearch { brokers } => match self.api.start_search(&brokers).await {
                Ok(summary) => Msg::SearchFinished(summary),
                Err(err) => failed("Search failed", &err),
            },
            Effect::ListLinks { filter } => match self.api.list_links(&filter).await {
                Ok(groups) => Msg::LinksListed(groups),
                Err(err) => failed("Loading links failed", &err),
            },
            Effect::DeleteLinks { filter } => match self.api.delete_links(&filter).await {
                Ok(summary) => Msg::LinksDeleted(summary.deleted_count),
                Err(err) => failed("Deleting links failed", &err),
            },
            Effect::ExportLinks { scope, filter } => {
                let export = match self.api.export_links(scope, &filter).await {
                    Ok(export) => export,
                    Err(err) => return failed("Export failed", &err),
                };
                match self.writer.write_export(&export) {
                    Ok(path) => Msg::ExportSaved(ExportRecord {
                        path: path.display().to_string(),
                        bytes: export.bytes.len(),
                    }),
                    Err(err) => {
                        admin_error!("Writing export {} failed: {}", export.filename, err);
                        Msg::RequestFailed(format!("Writing export failed: {err}"))
                    }
                }
            }
            Effect::GenerateLocatedUrls {
                template,
                postal_codes,
            } => match self.api.generate_located_urls(&postal_codes, &template).await {
                Ok(urls) => Msg::LocatedUrlsGenerated(urls),
                Err(err) => failed("Generating URLs failed", &err),
            },
            Effect::ClearBlacklist => {
                let result = self.api.clear_blacklist().await;
                confirmed(result, || "Blacklist cleared.".to_string(), "Clearing blacklist failed")
            }
        }
    }
}

fn confirmed(
    result: Result<String, ApiError>,
    fallback: impl FnOnce() -> String,
    context: &str,
) -> Msg {
    match result {
        Ok(message) if message.trim().is_empty() => Msg::MutationSucceeded(fallback()),
        Ok(message) => Msg::MutationSucceeded(message),
        Err(err) => failed(context, &err),
    }
}

fn failed(context: &str, err: &ApiError) -> Msg {
    admin_warn!("{}: {}", context, err);
    Msg::RequestFailed(format!("{context}: {}", err.message))
}
