//! Wiring of configured sources into a [`NavigationProvider`].

use std::sync::Arc;

use sitenav_cache::{Cache, FileCache, MemoryCache, NullCache};
use sitenav_config::{Config, LocalizationConfig, SiblingOrderSetting, SourceKind};
use sitenav_site::{
    NavigationBuilder, NavigationOptions, NavigationProvider, SiblingOrder,
    StaticNavigationBuilder, TaxonomyNavigationBuilder, TaxonomySubtreeResolver, UrlRules,
};
use sitenav_source::{FsContentProvider, HttpTaxonomyService, Localization, TaxonomyService};

use crate::error::CliError;

/// Navigation settings from config.
pub(crate) fn navigation_options(config: &Config) -> NavigationOptions {
    let nav = &config.navigation;
    NavigationOptions {
        rules: UrlRules {
            default_extension: nav.default_extension.clone(),
            default_page: nav.default_page.clone(),
        },
        index_title: nav.index_title.clone(),
        order: match nav.sibling_order {
            SiblingOrderSetting::OriginalTitle => SiblingOrder::OriginalTitle,
            SiblingOrderSetting::NumericId => SiblingOrder::NumericId,
        },
    }
}

/// Convert a configured localization.
pub(crate) fn to_localization(config: &LocalizationConfig) -> Localization {
    let localization = Localization::new(&config.id, &config.path)
        .with_publication(config.publication_id)
        .with_version(&config.version);
    match config.taxonomy_id {
        Some(taxonomy_id) => localization.with_taxonomy(taxonomy_id),
        None => localization,
    }
}

/// Look up a localization by id, or take the first one.
pub(crate) fn localization(config: &Config, id: Option<&str>) -> Result<Localization, CliError> {
    let found = match id {
        Some(id) => config.localization(id),
        None => config.localizations.first(),
    };
    found.map(to_localization).ok_or_else(|| {
        CliError::Validation(format!(
            "Unknown localization: {}",
            id.unwrap_or("(none configured)")
        ))
    })
}

/// Cache chosen by config: none, on disk, or in memory with per-region TTLs.
fn cache(config: &Config, version: &str) -> Arc<dyn Cache> {
    let settings = &config.cache_resolved;
    if !settings.enabled {
        return Arc::new(NullCache);
    }
    if let Some(dir) = &settings.dir {
        return Arc::new(FileCache::new(dir.clone(), version));
    }

    let cache = config
        .localizations
        .iter()
        .fold(MemoryCache::new().with_default_ttl(settings.ttl), |cache, l| {
            cache.with_bucket_ttl(format!("navigation-subtree-{}", l.id), settings.subtree_ttl)
        });
    Arc::new(cache)
}

/// Primary builder for the configured source kind, plus the static document
/// builder as fallback when the primary is the taxonomy.
fn builders(
    config: &Config,
    taxonomy: Option<&Arc<dyn TaxonomyService>>,
    rules: &UrlRules,
) -> Result<(Arc<dyn NavigationBuilder>, Option<Arc<dyn NavigationBuilder>>), CliError> {
    let source = &config.source_resolved;
    let document: Arc<dyn NavigationBuilder> = Arc::new(
        StaticNavigationBuilder::new(
            Arc::new(FsContentProvider::new(source.content_dir.clone())),
            rules.clone(),
        )
        .with_document(source.navigation_document.clone()),
    );

    match (source.kind, taxonomy) {
        (SourceKind::Static, _) => Ok((document, None)),
        (SourceKind::Taxonomy, Some(service)) => {
            let dynamic: Arc<dyn NavigationBuilder> = Arc::new(TaxonomyNavigationBuilder::new(
                Arc::clone(service),
                rules.clone(),
            ));
            Ok((dynamic, source.fallback.then_some(document)))
        }
        (SourceKind::Taxonomy, None) => Err(CliError::Validation(
            "Taxonomy navigation requires source.taxonomy_url".to_owned(),
        )),
    }
}

/// Build the provider for the configured sources.
pub(crate) fn provider(config: &Config, version: &str) -> Result<NavigationProvider, CliError> {
    let source = &config.source_resolved;
    let options = navigation_options(config);

    let taxonomy: Option<Arc<dyn TaxonomyService>> = source
        .taxonomy_url
        .as_deref()
        .map(|url| Arc::new(HttpTaxonomyService::new(url, source.timeout)) as Arc<dyn TaxonomyService>);
    let (primary, fallback) = builders(config, taxonomy.as_ref(), &options.rules)?;
    let has_fallback = fallback.is_some();

    let rules = options.rules.clone();
    let mut provider = NavigationProvider::new(primary, cache(config, version), options);
    if let Some(fallback) = fallback {
        provider = provider.with_fallback(fallback);
    }
    if source.kind == SourceKind::Taxonomy
        && let Some(service) = taxonomy
    {
        provider = provider.with_subtree_resolver(Arc::new(TaxonomySubtreeResolver::new(service, rules)));
    }

    tracing::debug!(
        kind = ?source.kind,
        fallback = has_fallback,
        "Navigation provider ready"
    );
    Ok(provider)
}
