use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use makler_client::{BulkPolicy, ClientSettings};
use serde::Deserialize;

use crate::cli::{Cli, Command};
use crate::platform::LogDestination;

const DEFAULT_OUTPUT_DIR: &str = "exports";

/// Optional settings file. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
struct FileConfig {
    api_url: Option<String>,
    output_dir: Option<PathBuf>,
    log: Option<LogDestination>,
    request_timeout_secs: Option<u64>,
    search_timeout_secs: Option<u64>,
    max_export_bytes: Option<u64>,
    bulk_delay_ms: Option<u64>,
}

/// Effective configuration: command-line flags over config file over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub client: ClientSettings,
    pub output_dir: PathBuf,
    pub log: LogDestination,
    pub bulk: BulkPolicy,
    /// Set when the values came partly from a file.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = load_file_config(&cli.config)?;
        let source = file.as_ref().map(|_| cli.config.clone());
        Ok(Self::merge(cli, file.unwrap_or_default(), source))
    }

    fn merge(cli: &Cli, file: FileConfig, source: Option<PathBuf>) -> Self {
        let mut client = ClientSettings::default();
        if let Some(url) = cli.api_url.clone().or(file.api_url) {
            client.base_url = url;
        }
        if let Some(secs) = file.request_timeout_secs {
            client.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.search_timeout_secs {
            client.search_timeout = Duration::from_secs(secs);
        }
        if let Some(bytes) = file.max_export_bytes {
            client.max_export_bytes = bytes;
        }

        let delay_ms = match &cli.command {
            Command::ImportLinks {
                delay_ms: Some(ms), ..
            } => Some(*ms),
            _ => file.bulk_delay_ms,
        };

        Self {
            client,
            output_dir: cli
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            log: cli.log.or(file.log).unwrap_or_default(),
            bulk: BulkPolicy {
                delay: Duration::from_millis(delay_ms.unwrap_or(0)),
            },
            source,
        }
    }
}

fn load_file_config(path: &Path) -> Result<Option<FileConfig>> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {}", path.display()))
        }
    };
    let config = ron::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("makler_admin").chain(args.iter().copied()))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.ron");
        let path_arg = path.to_str().unwrap();
        let config = AppConfig::resolve(&cli(&["--config", path_arg, "brokers"])).unwrap();

        assert_eq!(config.source, None);
        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert_eq!(config.log, LogDestination::File);
        assert_eq!(config.bulk, BulkPolicy::default());
    }

    #[test]
    fn file_values_apply_and_flags_win() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("makler_admin.ron");
        fs::write(
            &path,
            r#"(
                api_url: Some("http://file-host:9000"),
                output_dir: Some("csv"),
                log: Some(both),
                search_timeout_secs: Some(60),
                bulk_delay_ms: Some(250),
            )"#,
        )
        .unwrap();
        let path_arg = path.to_str().unwrap();

        let from_file = AppConfig::resolve(&cli(&["--config", path_arg, "brokers"])).unwrap();
        assert_eq!(from_file.client.base_url, "http://file-host:9000");
        assert_eq!(from_file.client.search_timeout, Duration::from_secs(60));
        assert_eq!(from_file.output_dir, PathBuf::from("csv"));
        assert_eq!(from_file.log, LogDestination::Both);
        assert_eq!(from_file.bulk.delay, Duration::from_millis(250));
        assert_eq!(from_file.source, Some(path.clone()));

        let overridden = AppConfig::resolve(&cli(&[
            "--config",
            path_arg,
            "--api-url",
            "http://flag-host:9000",
            "--output-dir",
            "out",
            "brokers",
        ]))
        .unwrap();
        assert_eq!(overridden.client.base_url, "http://flag-host:9000");
        assert_eq!(overridden.output_dir, PathBuf::from("out"));

        let import = AppConfig::resolve(&cli(&[
            "--config",
            path_arg,
            "import-links",
            "Meyer",
            "--delay-ms",
            "40",
        ]))
        .unwrap();
        assert_eq!(import.bulk.delay, Duration::from_millis(40));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.ron");
        fs::write(&path, "(api_url: 42").unwrap();
        let path_arg = path.to_str().unwrap();

        assert!(AppConfig::resolve(&cli(&["--config", path_arg, "brokers"])).is_err());
    }
}
