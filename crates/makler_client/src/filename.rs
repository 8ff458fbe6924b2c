use makler_core::{ExportScope, FilterSpec};

const MULTIPLE_BROKERS: &str = "mehrere_makler";

/// Local export name: `{prefix}[_{year}_{MM}[_{DD}]][_{broker}|_mehrere_makler].csv`.
///
/// Date parts appear only when both year and month are set.
pub fn export_filename(scope: ExportScope, filter: &FilterSpec) -> String {
    let mut name = scope_prefix(scope).to_string();

    if let (Some(year), Some(month)) = (filter.year(), filter.month()) {
        name.push_str(&format!("_{year}_{month:02}"));
        if let Some(day) = filter.day() {
            name.push_str(&format!("_{day:02}"));
        }
    }

    let brokers = filter.broker_names();
    match brokers.len() {
        0 => {}
        1 => {
            if let Some(broker) = brokers.iter().next() {
                name.push('_');
                name.push_str(&sanitize_component(broker));
            }
        }
        _ => {
            name.push('_');
            name.push_str(MULTIPLE_BROKERS);
        }
    }

    name.push_str(".csv");
    name
}

fn scope_prefix(scope: ExportScope) -> &'static str {
    match scope {
        ExportScope::LastSearch => "letzte_suche",
        ExportScope::All => "alle_links",
        ExportScope::Dated => "links",
    }
}

/// Filename from a `Content-Disposition` header, quoted or bare, sanitized.
///
/// Returns `None` when the header has no usable `filename` parameter.
pub fn content_disposition_filename(header: &str) -> Option<String> {
    let raw = filename_param(header)?;

    let cleaned = sanitize_component(&raw);
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);
    if cleaned.is_empty() {
        return None;
    }
    let mut name = cleaned.to_string();
    if is_reserved_windows_name(name.split('.').next().unwrap_or_default()) {
        name.insert(0, '_');
    }
    Some(name)
}

/// Walks `key=value` parameters left to right. A quoted value runs to its
/// closing quote, so it may contain `;`.
fn filename_param(header: &str) -> Option<String> {
    let mut rest = header;
    loop {
        let key_end = rest.find(['=', ';'])?;
        let key = rest[..key_end].trim();
        let (value, tail) = match rest[key_end..].strip_prefix('=') {
            Some(after_eq) => {
                let after_eq = after_eq.trim_start();
                match after_eq.strip_prefix('"') {
                    Some(quoted) => {
                        let end = quoted.find('"').unwrap_or(quoted.len());
                        let tail = quoted[end..].split_once(';').map_or("", |(_, t)| t);
                        (&quoted[..end], tail)
                    }
                    None => match after_eq.split_once(';') {
                        Some((value, tail)) => (value.trim_end(), tail),
                        None => (after_eq.trim_end(), ""),
                    },
                }
            }
            None => ("", &rest[key_end + 1..]),
        };

        if key.eq_ignore_ascii_case("filename") {
            return Some(value.to_string());
        }
        if tail.is_empty() {
            return None;
        }
        rest = tail;
    }
}

/// Replaces spaces, path separators and other characters Windows forbids with `_`.
pub fn sanitize_component(input: &str) -> String {
    input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        ' ' | '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
