//! Configuration management for SiteNav.
//!
//! Parses `sitenav.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `source.content_dir`
//! - `source.taxonomy_url`
//! - `cache.dir`
//!
//! ## Example
//!
//! ```toml
//! [source]
//! kind = "taxonomy"
//! taxonomy_url = "https://${CD_HOST}/taxonomy"
//! content_dir = "content"
//!
//! [cache]
//! ttl_secs = 600
//! subtree_ttl_secs = 60
//!
//! [navigation]
//! sibling_order = "numeric_id"
//!
//! [[localizations]]
//! id = "en"
//! path = "/"
//! publication_id = 5
//! taxonomy_id = 44
//! ```

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content directory for static navigation documents.
    pub content_dir: Option<PathBuf>,
    /// Override navigation source kind.
    pub source_kind: Option<SourceKind>,
    /// Override taxonomy service URL.
    pub taxonomy_url: Option<String>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "sitenav.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Navigation source configuration (paths are relative strings from TOML).
    source: SourceConfigRaw,
    /// Cache configuration (directory is a relative string from TOML).
    cache: CacheConfigRaw,
    /// Navigation rendering rules.
    pub navigation: NavigationConfig,
    /// Configured localizations.
    pub localizations: Vec<LocalizationConfig>,

    /// Resolved source configuration (set after loading).
    #[serde(skip)]
    pub source_resolved: SourceConfig,
    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Where the full navigation tree comes from.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Pre-serialized `navigation.json` document per localization.
    #[default]
    Static,
    /// Keyword hierarchy from a taxonomy service.
    Taxonomy,
}

/// Raw source configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceConfigRaw {
    kind: Option<SourceKind>,
    content_dir: Option<String>,
    navigation_document: Option<String>,
    taxonomy_url: Option<String>,
    timeout_secs: Option<u64>,
    fallback: Option<bool>,
}

/// Resolved navigation source configuration.
#[derive(Debug)]
pub struct SourceConfig {
    /// Primary source kind.
    pub kind: SourceKind,
    /// Root directory for static content (one subdirectory per localization path).
    pub content_dir: PathBuf,
    /// Name of the navigation document inside each localization directory.
    pub navigation_document: String,
    /// Base URL of the taxonomy service.
    pub taxonomy_url: Option<String>,
    /// Timeout applied to every taxonomy service call.
    pub timeout: Duration,
    /// Fall back to the static document when the taxonomy source fails.
    pub fallback: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Static,
            content_dir: PathBuf::from("content"),
            navigation_document: DEFAULT_NAVIGATION_DOCUMENT.to_owned(),
            taxonomy_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fallback: true,
        }
    }
}

const DEFAULT_NAVIGATION_DOCUMENT: &str = "navigation.json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TTL_SECS: u64 = 3600;
const DEFAULT_SUBTREE_TTL_SECS: u64 = 300;

/// Raw cache configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
    ttl_secs: Option<u64>,
    subtree_ttl_secs: Option<u64>,
}

/// Resolved cache configuration.
#[derive(Debug)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// Directory for a persistent file cache. `None` keeps the cache in memory.
    pub dir: Option<PathBuf>,
    /// Lifetime of full navigation trees.
    pub ttl: Duration,
    /// Lifetime of filtered subtree results.
    pub subtree_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            subtree_ttl: Duration::from_secs(DEFAULT_SUBTREE_TTL_SECS),
        }
    }
}

/// Sibling ordering applied to navigation child lists.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SiblingOrderSetting {
    /// Ordinal order of the untranslated title.
    #[default]
    OriginalTitle,
    /// Order by the numeric components embedded in item ids.
    NumericId,
}

/// Navigation rules.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Extension stripped from every URL (e.g. `.html`).
    pub default_extension: String,
    /// Default page name stripped from the end of URLs (e.g. `index`).
    pub default_page: String,
    /// Title of index items that collapse into their parent link.
    pub index_title: String,
    /// Sibling ordering of every child list.
    pub sibling_order: SiblingOrderSetting,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_extension: ".html".to_owned(),
            default_page: "index".to_owned(),
            index_title: "Index".to_owned(),
            sibling_order: SiblingOrderSetting::default(),
        }
    }
}

/// One localization (site language/publication).
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LocalizationConfig {
    /// Localization identifier, unique across the config.
    pub id: String,
    /// Site-relative base path (e.g. `/` or `/fr`).
    #[serde(default = "default_localization_path")]
    pub path: String,
    /// Publication id used to build taxonomy URIs.
    #[serde(default)]
    pub publication_id: u32,
    /// Navigation taxonomy id (required for taxonomy sources).
    #[serde(default)]
    pub taxonomy_id: Option<u32>,
    /// Publish version; a new version invalidates cached trees.
    #[serde(default)]
    pub version: String,
}

fn default_localization_path() -> String {
    "/".to_owned()
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`source.taxonomy_url`").
        field: String,
        /// Error message (e.g., "${`CD_HOST`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `sitenav.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Find a localization by id.
    #[must_use]
    pub fn localization(&self, id: &str) -> Option<&LocalizationConfig> {
        self.localizations.iter().find(|l| l.id == id)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(content_dir) = &settings.content_dir {
            self.source_resolved.content_dir.clone_from(content_dir);
        }
        if let Some(kind) = settings.source_kind {
            self.source_resolved.kind = kind;
        }
        if let Some(url) = &settings.taxonomy_url {
            self.source_resolved.taxonomy_url = Some(url.clone());
        }
        if let Some(enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = enabled;
        }
    }

    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            source: SourceConfigRaw::default(),
            cache: CacheConfigRaw::default(),
            navigation: NavigationConfig::default(),
            localizations: vec![LocalizationConfig {
                id: "default".to_owned(),
                path: default_localization_path(),
                publication_id: 0,
                taxonomy_id: None,
                version: String::new(),
            }],
            source_resolved: SourceConfig {
                content_dir: base.join("content"),
                ..SourceConfig::default()
            },
            cache_resolved: CacheConfig::default(),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_source()?;
        self.validate_navigation()?;
        self.validate_localizations()?;
        Ok(())
    }

    fn validate_source(&self) -> Result<(), ConfigError> {
        let source = &self.source_resolved;
        require_non_empty(&source.navigation_document, "source.navigation_document")?;

        if source.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "source.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        if let Some(url) = &source.taxonomy_url {
            require_non_empty(url, "source.taxonomy_url")?;
            require_http_url(url, "source.taxonomy_url")?;
        }

        if source.kind == SourceKind::Taxonomy && source.taxonomy_url.is_none() {
            return Err(ConfigError::Validation(
                "source.kind = \"taxonomy\" requires source.taxonomy_url".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_navigation(&self) -> Result<(), ConfigError> {
        let nav = &self.navigation;
        require_non_empty(&nav.default_page, "navigation.default_page")?;
        require_non_empty(&nav.index_title, "navigation.index_title")?;
        if !nav.default_extension.starts_with('.') || nav.default_extension.len() < 2 {
            return Err(ConfigError::Validation(
                "navigation.default_extension must look like \".html\"".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_localizations(&self) -> Result<(), ConfigError> {
        if self.localizations.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[localizations]] entry is required".to_owned(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for loc in &self.localizations {
            require_non_empty(&loc.id, "localizations.id")?;
            if !seen.insert(loc.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate localization id: {}",
                    loc.id
                )));
            }
            if !loc.path.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "localization {} path must start with '/'",
                    loc.id
                )));
            }
            if self.source_resolved.kind == SourceKind::Taxonomy && loc.taxonomy_id.is_none() {
                return Err(ConfigError::Validation(format!(
                    "localization {} requires taxonomy_id for taxonomy navigation",
                    loc.id
                )));
            }
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.source.content_dir {
            self.source.content_dir = Some(expand::expand_env(dir, "source.content_dir")?);
        }
        if let Some(ref url) = self.source.taxonomy_url {
            self.source.taxonomy_url = Some(expand::expand_env(url, "source.taxonomy_url")?);
        }
        if let Some(ref dir) = self.cache.dir {
            self.cache.dir = Some(expand::expand_env(dir, "cache.dir")?);
        }
        Ok(())
    }

    /// Resolve raw sections against the config file directory.
    fn resolve(&mut self, config_dir: &Path) {
        let raw = &self.source;
        self.source_resolved = SourceConfig {
            kind: raw.kind.unwrap_or_default(),
            content_dir: config_dir.join(raw.content_dir.as_deref().unwrap_or("content")),
            navigation_document: raw
                .navigation_document
                .clone()
                .unwrap_or_else(|| DEFAULT_NAVIGATION_DOCUMENT.to_owned()),
            taxonomy_url: raw
                .taxonomy_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_owned()),
            timeout: Duration::from_secs(raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            fallback: raw.fallback.unwrap_or(true),
        };

        let cache = &self.cache;
        self.cache_resolved = CacheConfig {
            enabled: cache.enabled.unwrap_or(true),
            dir: cache.dir.as_deref().map(|d| config_dir.join(d)),
            ttl: Duration::from_secs(cache.ttl_secs.unwrap_or(DEFAULT_TTL_SECS)),
            subtree_ttl: Duration::from_secs(
                cache.subtree_ttl_secs.unwrap_or(DEFAULT_SUBTREE_TTL_SECS),
            ),
        };
    }
}
