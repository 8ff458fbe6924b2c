use crate::{
    AdminState, BatchUrlGenerator, Effect, ExportScope, FilterInput, FilterSpec, LinkAction, Msg,
    PostalCodeSet, Severity,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Broker mutations never patch the local snapshot. They mark it stale and are
/// always followed by [`Effect::FetchBrokers`], whether or not they succeed.
pub fn update(mut state: AdminState, msg: Msg) -> (AdminState, Vec<Effect>) {
    let effects = match msg {
        Msg::RefreshRequested => vec![Effect::FetchBrokers],
        Msg::BrokersLoaded(snapshot) => {
            state.brokers_mut().replace(snapshot);
            Vec::new()
        }
        Msg::AddBrokerSubmitted(name) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                state.set_status(Severity::Error, "Enter a broker name.");
                Vec::new()
            } else {
                mutation(&mut state, Effect::AddBroker { name })
            }
        }
        Msg::RemoveBrokerConfirmed(name) => mutation(&mut state, Effect::RemoveBroker { name }),
        Msg::AddLinkSubmitted { broker, link } => {
            let link = link.trim().to_string();
            if is_http_url(&link) {
                mutation(&mut state, Effect::AddLink { broker, link })
            } else {
                state.set_status(
                    Severity::Error,
                    "Enter a valid URL starting with http:// or https://.",
                );
                Vec::new()
            }
        }
        Msg::RemoveLinkClicked { broker, link } => {
            mutation(&mut state, Effect::RemoveLink { broker, link })
        }
        Msg::BulkLinksSubmitted { broker, text } => {
            let links = parse_link_lines(&text);
            if links.is_empty() {
                state.set_status(
                    Severity::Error,
                    "No valid URLs found. URLs must start with http:// or https://.",
                );
                Vec::new()
            } else {
                state.set_status(Severity::Info, format!("Adding {} links...", links.len()));
                mutation(&mut state, Effect::AddLinksSequentially { broker, links })
            }
        }
        Msg::SearchSubmitted(brokers) => {
            let brokers: Vec<String> = brokers
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
            if brokers.is_empty() {
                state.set_status(Severity::Error, "Select at least one broker.");
                Vec::new()
            } else {
                state.set_status(Severity::Info, "Search running...");
                vec![
                    Effect::StartSearch { brokers },
                    Effect::ListLinks {
                        filter: FilterSpec::new(),
                    },
                ]
            }
        }
        Msg::LinkQuerySubmitted { input, action } => link_query(&mut state, &input, action),
        Msg::UrlsRequested {
            template,
            postal_text,
        } => {
            let outcome = BatchUrlGenerator::new(template).generate(&postal_text);
            let count = outcome.count();
            let skipped = outcome.skipped.len();
            state.set_generated(outcome.url_strings(), outcome.skipped);
            if count == 0 {
                state.set_status(
                    Severity::Error,
                    "Enter at least one valid 5-digit postal code.",
                );
            } else if skipped > 0 {
                state.set_status(
                    Severity::Warning,
                    format!("Generated {count} URLs, skipped {skipped} invalid postal codes."),
                );
            } else {
                state.set_status(Severity::Success, format!("Generated {count} URLs."));
            }
            Vec::new()
        }
        Msg::LocatedUrlsRequested {
            template,
            postal_text,
        } => {
            let codes = PostalCodeSet::parse(&postal_text);
            state.set_generated(Vec::new(), codes.rejected().to_vec());
            if codes.is_empty() {
                state.set_status(
                    Severity::Error,
                    "Enter at least one valid 5-digit postal code.",
                );
                Vec::new()
            } else {
                state.set_status(
                    Severity::Info,
                    format!("Generating URLs for {} postal codes...", codes.len()),
                );
                vec![Effect::GenerateLocatedUrls {
                    template,
                    postal_codes: codes.into_codes(),
                }]
            }
        }
        Msg::ClearBlacklistConfirmed => vec![Effect::ClearBlacklist],
        Msg::MutationSucceeded(message) => {
            state.set_status(Severity::Success, message);
            Vec::new()
        }
        Msg::BulkFinished { succeeded, failed } => {
            if failed == 0 {
                state.set_status(Severity::Success, format!("{succeeded} links added."));
            } else {
                state.set_status(
                    Severity::Warning,
                    format!("{succeeded} links added, {failed} failed."),
                );
            }
            Vec::new()
        }
        Msg::SearchFinished(summary) => {
            let text = if summary.message.is_empty() {
                format!("{} new listings found.", summary.new_links.len())
            } else {
                summary.message.clone()
            };
            let severity = if summary.success {
                Severity::Success
            } else {
                Severity::Warning
            };
            state.set_status(severity, text);
            state.set_last_search(summary);
            Vec::new()
        }
        Msg::LinksListed(groups) => {
            state.set_link_groups(groups);
            Vec::new()
        }
        Msg::LinksDeleted(count) => {
            state.set_status(Severity::Success, format!("{count} links deleted."));
            Vec::new()
        }
        Msg::ExportSaved(record) => {
            state.set_status(
                Severity::Success,
                format!("Exported {} bytes to {}.", record.bytes, record.path),
            );
            state.set_last_export(record);
            Vec::new()
        }
        Msg::LocatedUrlsGenerated(urls) => {
            let count = urls.len();
            state.set_generated_urls(urls);
            state.set_status(
                Severity::Success,
                format!("{count} URLs generated with location ids."),
            );
            Vec::new()
        }
        Msg::RequestFailed(message) => {
            state.set_status(Severity::Error, message);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn mutation(state: &mut AdminState, effect: Effect) -> Vec<Effect> {
    state.brokers_mut().mark_stale();
    vec![effect, Effect::FetchBrokers]
}

fn link_query(state: &mut AdminState, input: &FilterInput, action: LinkAction) -> Vec<Effect> {
    let filter = match input.build() {
        Ok(filter) => filter,
        Err(err) => {
            state.set_status(Severity::Error, err.to_string());
            return Vec::new();
        }
    };

    match action {
        LinkAction::List => vec![Effect::ListLinks { filter }],
        LinkAction::Delete if filter.is_last_search_only() => {
            state.set_status(
                Severity::Error,
                "Deleting can not be limited to the last search. Narrow it by broker or date instead.",
            );
            Vec::new()
        }
        LinkAction::Delete => vec![
            Effect::DeleteLinks { filter },
            Effect::ListLinks {
                filter: FilterSpec::new(),
            },
        ],
        LinkAction::Export(ExportScope::All | ExportScope::Dated)
            if filter.is_last_search_only() =>
        {
            state.set_status(
                Severity::Error,
                "Use the last-search export scope to export only the last search.",
            );
            Vec::new()
        }
        LinkAction::Export(scope) => {
            let filter = match scope {
                ExportScope::LastSearch => filter.last_search_only(true),
                ExportScope::All => filter,
                ExportScope::Dated => {
                    if filter.year().is_none() || filter.month().is_none() {
                        state.set_status(
                            Severity::Error,
                            "A dated export needs both a year and a month.",
                        );
                        return Vec::new();
                    }
                    filter
                }
            };
            vec![Effect::ExportLinks { scope, filter }]
        }
    }
}

fn is_http_url(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

fn parse_link_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| is_http_url(line))
        .map(ToOwned::to_owned)
        .collect()
}
