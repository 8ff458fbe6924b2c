use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use makler_core::{ExportScope, FilterInput, SearchSpec, DEFAULT_CATEGORY};

use crate::platform::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "makler_admin")]
#[command(about = "Manage brokers, search URLs and scraped listing links")]
pub struct Cli {
    /// Backend base URL
    #[arg(long, env = "MAKLER_API_URL", global = true)]
    pub api_url: Option<String>,

    /// RON config file; missing file means defaults
    #[arg(long, default_value = "makler_admin.ron", global = true)]
    pub config: PathBuf,

    /// Directory for exported CSV files
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, value_enum, global = true)]
    pub log: Option<LogDestination>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List brokers and their search URLs
    Brokers,

    AddBroker { name: String },

    RemoveBroker {
        name: String,
        #[arg(long)]
        yes: bool,
    },

    /// Attach one search URL to a broker
    AddLink { broker: String, link: String },

    RemoveLink { broker: String, link: String },

    /// Attach many search URLs, one per line, submitted one at a time
    ImportLinks {
        broker: String,
        /// Read URLs from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Pause between submissions, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Run the scraper for the given brokers
    Search {
        #[arg(required = true)]
        brokers: Vec<String>,
    },

    /// Show scraped links grouped by broker
    Links(FilterArgs),

    DeleteLinks {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        yes: bool,
    },

    /// Download links as CSV into the output directory
    Export {
        #[arg(long, value_enum, default_value_t = ScopeArg::All)]
        scope: ScopeArg,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Build one search URL per postal code
    GenerateUrls {
        #[command(flatten)]
        template: TemplateArgs,
        /// Postal codes separated by newlines, commas or semicolons
        #[arg(long, conflicts_with = "file")]
        postal_codes: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        /// Ask the backend for URLs that include the location id
        #[arg(long)]
        located: bool,
    },

    /// Show the filter fields encoded in a search URL
    DecodeUrl { url: String },

    ClearBlacklist {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Args, Default)]
pub struct FilterArgs {
    /// Restrict to these brokers (repeatable)
    #[arg(short, long = "broker")]
    pub brokers: Vec<String>,
    #[arg(long)]
    pub year: Option<String>,
    #[arg(long)]
    pub month: Option<String>,
    #[arg(long)]
    pub day: Option<String>,
    /// Only links found by the most recent search run
    #[arg(long)]
    pub last_search_only: bool,
}

impl FilterArgs {
    pub fn to_input(&self) -> FilterInput {
        FilterInput {
            broker_names: self.brokers.clone(),
            year: self.year.clone().unwrap_or_default(),
            month: self.month.clone().unwrap_or_default(),
            day: self.day.clone().unwrap_or_default(),
            last_search_only: self.last_search_only,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct TemplateArgs {
    #[arg(long, default_value = DEFAULT_CATEGORY)]
    pub category: String,
    /// Provider type, e.g. privat or gewerblich
    #[arg(long)]
    pub provider: Option<String>,
    /// Listing type, e.g. angebote or gesuche
    #[arg(long)]
    pub listing: Option<String>,
    #[arg(long)]
    pub max_price: Option<String>,
    #[arg(long)]
    pub keyword: Option<String>,
}

impl TemplateArgs {
    pub fn to_spec(&self) -> SearchSpec {
        SearchSpec {
            category: self.category.clone(),
            provider_type: self.provider.clone(),
            listing_type: self.listing.clone(),
            price_ceiling: self.max_price.clone(),
            keyword: self.keyword.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    /// Links of the most recent search run
    Last,
    All,
    /// Requires --year and --month
    Dated,
}

impl From<ScopeArg> for ExportScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Last => ExportScope::LastSearch,
            ScopeArg::All => ExportScope::All,
            ScopeArg::Dated => ExportScope::Dated,
        }
    }
}
