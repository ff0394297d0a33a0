//! CLI command implementations.

pub(crate) mod links;
pub(crate) mod subtree;
pub(crate) mod tree;

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use sitenav_config::{CliSettings, Config, SourceKind};
use sitenav_site::NavigationProvider;
use sitenav_source::Localization;

use crate::error::CliError;
use crate::navigation;
use crate::output::Output;

pub(crate) use links::{LinkQuery, LinksArgs};
pub(crate) use subtree::SubtreeArgs;
pub(crate) use tree::TreeArgs;

/// Navigation source selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum SourceArg {
    /// Pre-serialized navigation document.
    Static,
    /// Taxonomy service.
    Taxonomy,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Static => Self::Static,
            SourceArg::Taxonomy => Self::Taxonomy,
        }
    }
}

/// Arguments shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover sitenav.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Localization id (default: the first configured localization).
    #[arg(short, long, env = "SITENAV_LOCALIZATION")]
    pub localization: Option<String>,

    /// Content directory holding navigation documents (overrides config).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Navigation source (overrides config).
    #[arg(long, value_enum)]
    source: Option<SourceArg>,

    /// Taxonomy service URL (overrides config).
    #[arg(long, env = "SITENAV_TAXONOMY_URL")]
    taxonomy_url: Option<String>,

    /// Enable verbose output (show reload timing logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable caching.
    #[arg(long)]
    no_cache: bool,
}

/// Loaded configuration, provider and localization for one command.
pub(crate) struct Session {
    pub provider: NavigationProvider,
    pub localization: Localization,
    pub output: Output,
}

impl CommonArgs {
    /// Load config and build the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the localization is unknown.
    pub(crate) fn session(self, version: &str) -> Result<Session, CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            content_dir: self.content_dir,
            source_kind: self.source.map(SourceKind::from),
            taxonomy_url: self.taxonomy_url,
            cache_enabled: self.no_cache.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }

        let localization = navigation::localization(&config, self.localization.as_deref())?;
        let provider = navigation::provider(&config, version)?;

        Ok(Session {
            provider,
            localization,
            output,
        })
    }
}
