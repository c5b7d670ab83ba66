//! Locale → index target resolution
//!
//! The search variant derives an index name per locale. The ingestion
//! variant looks the task up in the JSON indexing configuration:
//!
//! ```json
//! {"locales": {"en_US": {"products": {"tasks": {"replace": "3f1c..."}}}}}
//! ```

use crate::config::{CatalogSyncConfig, IndexVariant, IndexingConfig};
use crate::domain::{IndexTarget, IndexingError, Locale, Result, SyncError};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Message used when indexing is switched off
pub const DISABLED_MESSAGE: &str = "Catalog sync is disabled";

/// Message used when the ingestion mapping is absent
pub const MISSING_CONFIG_MESSAGE: &str = "Missing Indexing configuration";

#[derive(Debug, Deserialize)]
struct IndexingDocument {
    #[serde(default)]
    locales: BTreeMap<String, LocaleSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct LocaleSettings {
    #[serde(default)]
    products: Option<EntitySettings>,
}

#[derive(Debug, Default, Deserialize)]
struct EntitySettings {
    #[serde(default)]
    tasks: Option<TaskSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct TaskSettings {
    #[serde(default)]
    replace: Option<String>,
}

/// Product replace tasks per locale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskMapping {
    tasks: BTreeMap<String, String>,
}

impl TaskMapping {
    /// Parse the JSON indexing configuration
    ///
    /// Locales without a non-empty `products.tasks.replace` entry are left
    /// out of the mapping.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid JSON.
    pub fn parse(json: &str) -> Result<Self> {
        let document: IndexingDocument = serde_json::from_str(json).map_err(|e| {
            SyncError::Configuration(format!("Invalid Indexing configuration: {e}"))
        })?;

        let tasks = document
            .locales
            .into_iter()
            .filter_map(|(locale, settings)| {
                let task = settings.products?.tasks?.replace?;
                (!task.trim().is_empty()).then_some((locale, task))
            })
            .collect();

        Ok(Self { tasks })
    }

    /// Task configured for a locale
    pub fn task_for(&self, locale: &Locale) -> Option<&str> {
        self.tasks.get(locale.as_str()).map(String::as_str)
    }

    /// Number of locales with a task
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no locale has a task
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Maps locales onto index targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetResolver {
    /// `{prefix}__products__{locale}` indexes
    IndexPerLocale { prefix: String },
    /// Tasks from the indexing configuration
    TaskPerLocale(TaskMapping),
}

impl TargetResolver {
    /// Build the resolver for the configured variant
    ///
    /// # Errors
    ///
    /// For the ingestion variant, returns a configuration error when the
    /// mapping is missing, unreadable or invalid.
    pub async fn from_config(config: &IndexingConfig) -> Result<Self> {
        match config.variant {
            IndexVariant::Search => Ok(Self::IndexPerLocale {
                prefix: config.index_prefix.clone(),
            }),
            IndexVariant::Ingestion => {
                let json = match (&config.indexing_config, &config.indexing_config_path) {
                    (Some(inline), _) if !inline.trim().is_empty() => inline.clone(),
                    (_, Some(path)) => tokio::fs::read_to_string(path).await.map_err(|e| {
                        SyncError::Configuration(format!(
                            "{MISSING_CONFIG_MESSAGE}: cannot read {path}: {e}"
                        ))
                    })?,
                    _ => return Err(SyncError::Configuration(MISSING_CONFIG_MESSAGE.to_string())),
                };
                Ok(Self::TaskPerLocale(TaskMapping::parse(&json)?))
            }
        }
    }

    /// Resolve the target for one locale
    ///
    /// # Errors
    ///
    /// Returns [`IndexingError::MissingTarget`] when no task is configured.
    pub fn resolve(&self, locale: &Locale) -> std::result::Result<IndexTarget, IndexingError> {
        match self {
            Self::IndexPerLocale { prefix } => Ok(IndexTarget::product_index(prefix, locale)),
            Self::TaskPerLocale(mapping) => mapping
                .task_for(locale)
                .map(|task| IndexTarget::Task(task.to_string()))
                .ok_or_else(|| IndexingError::MissingTarget(locale.to_string())),
        }
    }
}

/// A locale together with where its documents go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleRoute {
    /// Locale of the documents
    pub locale: Locale,

    /// Resolved destination
    pub target: IndexTarget,
}

/// Resolve the routes of a run
///
/// With `locale = None` every allowed site locale is in scope, and locales
/// without a target are dropped with an error log. With `Some(locale)` the
/// run is restricted to that locale, which must be allowed and resolvable.
///
/// # Errors
///
/// Returns a configuration error when indexing is disabled, the mapping is
/// missing, the locale parameter is blank, not allowed or unresolvable, or
/// no locale at all can be resolved.
pub async fn resolve_routes(
    config: &CatalogSyncConfig,
    locale: Option<&str>,
) -> Result<Vec<LocaleRoute>> {
    if !config.indexing.enabled {
        return Err(SyncError::Configuration(DISABLED_MESSAGE.to_string()));
    }

    let resolver = TargetResolver::from_config(&config.indexing).await?;
    let allowed = config.site.locales().map_err(SyncError::Configuration)?;

    if let Some(raw) = locale {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SyncError::Configuration(
                "Missing mandatory parameter: locale".to_string(),
            ));
        }
        let locale = Locale::new(raw).map_err(SyncError::Configuration)?;
        if !allowed.contains(&locale) {
            return Err(SyncError::Configuration(format!(
                "Locale {locale} is not allowed."
            )));
        }
        let target = resolver
            .resolve(&locale)
            .map_err(|e| SyncError::Configuration(e.to_string()))?;
        return Ok(vec![LocaleRoute { locale, target }]);
    }

    let mut routes = Vec::with_capacity(allowed.len());
    for locale in allowed {
        match resolver.resolve(&locale) {
            Ok(target) => routes.push(LocaleRoute { locale, target }),
            Err(e) => tracing::error!(
                locale = %locale,
                error = %e,
                "Locale has no index target and will be skipped"
            ),
        }
    }

    if routes.is_empty() {
        return Err(SyncError::Configuration(
            "No locale could be resolved to an index target".to_string(),
        ));
    }

    Ok(routes)
}
