//! # oab-api: Binary Entry Point
//!
//! Builds the document snapshot and starts the Axum server.
//! Binds to a configurable port (default 8080).

use std::sync::Arc;

use oab_api::state::{AppConfig, AppState, DocsSource};
use oab_schema::ConverterRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env();
    let source = match &config.manifest {
        Some(path) => {
            tracing::info!(manifest = %path.display(), "documenting manifest");
            DocsSource::Manifest(path.clone())
        }
        None => {
            tracing::info!("OAB_MANIFEST not set, documenting the demo application");
            oab_api::demo::source()
        }
    };

    let registry = Arc::new(ConverterRegistry::with_defaults()?);
    let port = config.port;
    let state = AppState::build(config, registry, source).map_err(|e| {
        tracing::error!("Document build failed: {e}");
        e
    })?;

    let app = oab_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Documentation server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` selects the filter (default `info`); `LOG_FORMAT=json` switches
/// to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
