use std::fmt::{Display, Write};

use makler_core::{AdminViewModel, DecodedSearch, FieldParse, LinkGroups, Severity};

/// Parts of the view model a command prints after the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Brokers,
    Links,
    Search,
    Urls,
}

pub fn render(view: &AdminViewModel, sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections {
        match section {
            Section::Brokers => render_brokers(&mut out, view),
            Section::Links => {
                if let Some(groups) = &view.link_groups {
                    render_links(&mut out, groups);
                }
            }
            Section::Search => render_search(&mut out, view),
            Section::Urls => render_urls(&mut out, view),
        }
    }
    if let Some(status) = &view.status {
        let tag = match status.severity {
            Severity::Info => "info",
            Severity::Success => "ok",
            Severity::Warning => "warn",
            Severity::Error => "error",
        };
        let _ = writeln!(out, "[{tag}] {}", status.text);
    }
    out
}

fn render_brokers(out: &mut String, view: &AdminViewModel) {
    let _ = writeln!(
        out,
        "Brokers: {} ({} search URLs)",
        view.broker_count, view.total_links
    );
    if view.stale {
        let _ = writeln!(out, "  (list may be out of date)");
    }
    for row in &view.brokers {
        let _ = writeln!(out, "  {} ({})", row.name, row.link_count);
        for link in &row.links {
            let _ = writeln!(out, "    - {link}");
        }
    }
}

fn render_links(out: &mut String, groups: &LinkGroups) {
    let _ = writeln!(
        out,
        "Links: {} of {}",
        groups.filtered_count, groups.total_count
    );
    for (name, links) in &groups.grouped {
        let _ = writeln!(out, "  {name} ({})", links.len());
        for link in links {
            let when = link
                .discovered_at()
                .map(|at| at.format("%d.%m.%Y %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "    {when:<16}  {}", link.url);
        }
    }
}

fn render_search(out: &mut String, view: &AdminViewModel) {
    let Some(summary) = &view.last_search else {
        return;
    };
    let _ = writeln!(
        out,
        "Search: {} new, {} total",
        summary.new_links.len(),
        summary.total_links
    );
    for link in &summary.new_links {
        let _ = writeln!(out, "  + {link}");
    }
}

fn render_urls(out: &mut String, view: &AdminViewModel) {
    for url in &view.generated_urls {
        let _ = writeln!(out, "{url}");
    }
    if !view.skipped_postal_codes.is_empty() {
        let _ = writeln!(
            out,
            "Skipped: {}",
            view.skipped_postal_codes.join(", ")
        );
    }
}

pub fn render_decoded(decoded: &DecodedSearch) -> String {
    let mut out = String::new();
    field(&mut out, "category", &decoded.category);
    field(&mut out, "postal code", &decoded.postal_code);
    field(&mut out, "provider", &decoded.provider_type);
    field(&mut out, "listing", &decoded.listing_type);
    field(&mut out, "max price", &decoded.price_ceiling);
    field(&mut out, "keyword", &decoded.keyword);
    if let Some(location) = decoded.location {
        let _ = writeln!(out, "{:<12} {location}", "location:");
    }
    for segment in &decoded.unrecognized {
        let _ = writeln!(out, "{:<12} {segment}", "unknown:");
    }
    out
}

fn field<T: Display>(out: &mut String, name: &str, value: &FieldParse<T>) {
    let label = format!("{name}:");
    let _ = match value {
        FieldParse::Absent => writeln!(out, "{label:<12} -"),
        FieldParse::Parsed(value) => writeln!(out, "{label:<12} {value}"),
        FieldParse::Unparseable(raw) => writeln!(out, "{label:<12} unparseable ({raw})"),
    };
}

#[cfg(test)]
mod tests {
    use makler_core::{
        decode, BrokerRowView, LinkRecord, SearchSummary, StatusLine,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn brokers_then_status() {
        let view = AdminViewModel {
            brokers: vec![BrokerRowView {
                name: "Meyer".to_string(),
                link_count: 1,
                links: vec!["https://x/1".to_string()],
            }],
            broker_count: 1,
            total_links: 1,
            status: Some(StatusLine {
                severity: Severity::Success,
                text: "Broker 'Meyer' added.".to_string(),
            }),
            ..AdminViewModel::default()
        };
        assert_eq!(
            render(&view, &[Section::Brokers]),
            "Brokers: 1 (1 search URLs)\n  Meyer (1)\n    - https://x/1\n[ok] Broker 'Meyer' added.\n"
        );
    }

    #[test]
    fn links_show_discovery_time() {
        let mut groups = LinkGroups {
            total_count: 5,
            filtered_count: 2,
            ..LinkGroups::default()
        };
        groups.grouped.insert(
            "Sonstige".to_string(),
            vec![
                LinkRecord::new("https://x/1").with_scraped_at("2026-07-14T09:30:00"),
                LinkRecord::new("https://x/2"),
            ],
        );
        let view = AdminViewModel {
            link_groups: Some(groups),
            ..AdminViewModel::default()
        };
        assert_eq!(
            render(&view, &[Section::Links]),
            "Links: 2 of 5\n  Sonstige (2)\n    14.07.2026 09:30  https://x/1\n    -                 https://x/2\n"
        );
    }

    #[test]
    fn search_and_skipped_codes() {
        let view = AdminViewModel {
            last_search: Some(SearchSummary {
                success: true,
                new_links: vec!["https://x/9".to_string()],
                total_links: 3,
                message: String::new(),
            }),
            generated_urls: vec!["https://u/10115".to_string()],
            skipped_postal_codes: vec!["99999abc".to_string()],
            ..AdminViewModel::default()
        };
        assert_eq!(
            render(&view, &[Section::Search, Section::Urls]),
            "Search: 1 new, 3 total\n  + https://x/9\nhttps://u/10115\nSkipped: 99999abc\n"
        );
    }

    #[test]
    fn decoded_fields_are_labelled() {
        let decoded =
            decode("https://www.kleinanzeigen.de/s-immobilien/10115/preis:x:/haus/k0c195l3331")
                .unwrap();
        assert_eq!(
            render_decoded(&decoded),
            "category:    immobilien\n\
             postal code: 10115\n\
             provider:    -\n\
             listing:     -\n\
             max price:   unparseable (preis:x:)\n\
             keyword:     haus\n\
             location:    k0c195l3331\n"
        );
    }
}
