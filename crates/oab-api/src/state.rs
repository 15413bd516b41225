//! # Application State
//!
//! Shared state for the Axum application, passed to handlers via the
//! `State` extractor.
//!
//! The generated document is built once when the state is created and held
//! as an `Arc` snapshot. Requests only ever read the snapshot. The only way
//! to change it is [`AppState::rebuild`], which runs a fresh pass outside the
//! lock and swaps the result in under a short write lock. The lock is
//! `parking_lot` and never held across `.await`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use handlebars::Handlebars;
use oab_core::Info;
use oab_schema::{generate, ConverterRegistry, GeneratedDocument, Manifest, RouteError, RouteTable};
use parking_lot::RwLock;

use crate::error::DocsError;
use crate::routes::docs::page_templates;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind.
    pub port: u16,
    /// Mount point of the documentation routes.
    pub docs_path: String,
    /// Name shown by the documentation UI.
    pub app_name: String,
    /// Document title when routes are declared in code.
    pub title: String,
    /// Document version when routes are declared in code.
    pub version: String,
    /// Manifest describing the documented application, if any.
    pub manifest: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            docs_path: "/docs".to_string(),
            app_name: "OpenAPI UI".to_string(),
            title: "API".to_string(),
            version: "0.1.0".to_string(),
            manifest: None,
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `OAB_DOCS_PATH`, `OAB_APP_NAME`, `OAB_TITLE`,
    /// `OAB_VERSION` and `OAB_MANIFEST`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            docs_path: non_empty("OAB_DOCS_PATH")
                .map(|path| normalize_mount(&path))
                .unwrap_or(defaults.docs_path),
            app_name: non_empty("OAB_APP_NAME").unwrap_or(defaults.app_name),
            title: non_empty("OAB_TITLE").unwrap_or(defaults.title),
            version: non_empty("OAB_VERSION").unwrap_or(defaults.version),
            manifest: non_empty("OAB_MANIFEST").map(PathBuf::from),
        }
    }

    /// Metadata for documents built from in-code routes.
    pub fn info(&self) -> Info {
        Info::new(self.title.clone(), self.version.clone())
    }
}

/// `docs/` → `/docs`, `/` → ``.
pub(crate) fn normalize_mount(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

type RouteFactory = dyn Fn() -> Result<RouteTable, RouteError> + Send + Sync;

/// Where documented routes come from.
#[derive(Clone)]
pub enum DocsSource {
    /// Routes declared in code. The factory runs on every build.
    Routes(Arc<RouteFactory>),
    /// A manifest file, re-read on every build.
    Manifest(PathBuf),
}

impl DocsSource {
    pub fn routes(factory: impl Fn() -> Result<RouteTable, RouteError> + Send + Sync + 'static) -> Self {
        Self::Routes(Arc::new(factory))
    }

    fn generate(&self, info: Info, registry: &Arc<ConverterRegistry>) -> Result<GeneratedDocument, DocsError> {
        match self {
            Self::Routes(factory) => {
                let table = factory()?;
                Ok(generate(info, &table, Arc::clone(registry))?)
            }
            Self::Manifest(path) => {
                let manifest = Manifest::load(path)?;
                Ok(manifest.generate(Arc::clone(registry))?)
            }
        }
    }
}

impl fmt::Debug for DocsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Routes(_) => f.write_str("Routes(..)"),
            Self::Manifest(path) => f.debug_tuple("Manifest").field(path).finish(),
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    registry: Arc<ConverterRegistry>,
    source: DocsSource,
    snapshot: Arc<RwLock<Arc<GeneratedDocument>>>,
    templates: Arc<Handlebars<'static>>,
}

impl AppState {
    /// Build the initial snapshot.
    ///
    /// # Errors
    ///
    /// Fails if the page template does not compile, the routes cannot be
    /// registered, or the pass is aborted.
    pub fn build(
        config: AppConfig,
        registry: Arc<ConverterRegistry>,
        source: DocsSource,
    ) -> Result<Self, DocsError> {
        let templates = page_templates()?;
        let generated = source.generate(config.info(), &registry)?;
        log_outcome(&generated);
        Ok(Self {
            config: Arc::new(config),
            registry,
            source,
            snapshot: Arc::new(RwLock::new(Arc::new(generated))),
            templates: Arc::new(templates),
        })
    }

    /// Compiled page templates.
    pub fn templates(&self) -> &Handlebars<'static> {
        &self.templates
    }

    /// The current snapshot.
    pub fn document(&self) -> Arc<GeneratedDocument> {
        Arc::clone(&self.snapshot.read())
    }

    /// Regenerate the document and replace the snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    ///
    /// # Errors
    ///
    /// As [`AppState::build`].
    pub fn rebuild(&self) -> Result<Arc<GeneratedDocument>, DocsError> {
        let generated = Arc::new(self.source.generate(self.config.info(), &self.registry)?);
        log_outcome(&generated);
        *self.snapshot.write() = Arc::clone(&generated);
        tracing::info!("document snapshot replaced");
        Ok(generated)
    }
}

fn log_outcome(generated: &GeneratedDocument) {
    for diagnostic in &generated.diagnostics {
        tracing::warn!(%diagnostic, kind = %diagnostic.kind, "schema degraded to untyped");
    }
}
