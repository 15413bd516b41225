//! # Documentation Routes
//!
//! Mounted under the configured docs path (default `/docs`):
//!
//! | Route | Response |
//! |---|---|
//! | `GET {mount}/configuration` | the current document snapshot as JSON |
//! | `GET {mount}/`, `GET {mount}` | the documentation UI page |
//!
//! The page embeds a small configuration blob telling the UI where to fetch
//! the document from. Both handlers only read the snapshot. The page is a
//! `handlebars` template compiled once when the state is built.

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use handlebars::{Handlebars, TemplateError};
use oab_core::Document;
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

const PAGE_TEMPLATE: &str = include_str!("../../templates/docs.html");

/// Registered name of the UI page template.
pub const PAGE: &str = "docs";

/// Compile the UI page template.
pub fn page_templates() -> Result<Handlebars<'static>, TemplateError> {
    let mut templates = Handlebars::new();
    templates.register_template_string(PAGE, PAGE_TEMPLATE)?;
    Ok(templates)
}

#[derive(Serialize)]
struct PageData<'a> {
    title: &'a str,
    config_json: String,
}

/// Configuration handed to the UI bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiConfig {
    pub app_name: String,
    pub dom_id: String,
    pub url: String,
    pub layout: String,
    #[serde(rename = "deepLinking")]
    pub deep_linking: bool,
}

impl UiConfig {
    /// Defaults for a UI whose document lives at `{mount}/configuration`.
    pub fn for_mount(app_name: impl Into<String>, mount: &str) -> Self {
        Self {
            app_name: app_name.into(),
            dom_id: "#openapi-ui".to_string(),
            url: configuration_path(mount),
            layout: "StandaloneLayout".to_string(),
            deep_linking: true,
        }
    }
}

fn configuration_path(mount: &str) -> String {
    format!("{mount}/configuration")
}

/// Build the docs router for `mount` (already normalized, e.g. `/docs` or
/// empty for the root).
pub fn router(mount: &str) -> Router<AppState> {
    let index = if mount.is_empty() {
        "/".to_string()
    } else {
        format!("{mount}/")
    };
    let mut router = Router::new()
        .route(&configuration_path(mount), get(configuration))
        .route(&index, get(page));
    if !mount.is_empty() {
        router = router.route(mount, get(page));
    }
    router
}

/// GET {mount}/configuration: the generated document.
async fn configuration(State(state): State<AppState>) -> Json<Document> {
    Json(state.document().document.clone())
}

/// GET {mount}/: the documentation UI page.
async fn page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let config = UiConfig::for_mount(state.config.app_name.clone(), &state.config.docs_path);
    let title = state.document().document.info.title.clone();
    render_page(state.templates(), &title, &config).map(Html)
}

/// Render the page. The title goes through the template's HTML escaping.
/// The configuration JSON is embedded raw in a `<script>` element, so `</`
/// is escaped beforehand to keep it from closing the tag.
pub fn render_page(
    templates: &Handlebars<'_>,
    title: &str,
    config: &UiConfig,
) -> Result<String, AppError> {
    let config_json = serde_json::to_string(config)
        .map_err(|e| AppError::Internal(format!("UI configuration serialization: {e}")))?
        .replace("</", "<\\/");
    templates
        .render(PAGE, &PageData { title, config_json })
        .map_err(|e| AppError::Internal(format!("UI page rendering: {e}")))
}
