use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portal_core::{
    CoreConfig, FileDirectory, OrgHierarchy,
    config::{
        consent_with_top_level_org_from_env_value, default_locale_from_env_value,
        org_bundle_path_from_env_value,
    },
    constants::{CONSENT_WITH_TOP_LEVEL_ORG_ENV, DEFAULT_LOCALE_ENV, ORG_BUNDLE_PATH_ENV},
};

mod routes;

/// Main entry point for the organization hierarchy service
///
/// Loads the organization directory bundle once at startup and serves hierarchy queries over
/// REST. If the directory cannot be read the service still starts; queries answer with empty
/// results until `POST /organizations/ingest` or `POST /organizations/reload` succeeds.
///
/// # Environment Variables
/// - `PORTAL_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `ORG_BUNDLE_PATH`: Organization directory bundle (default: "organizations.json")
/// - `PORTAL_DEFAULT_LOCALE`: Locale used when no selected organization names a language
/// - `CONSENT_WITH_TOP_LEVEL_ORG`: Whether consents reference top-level organizations
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portal_run=info".parse()?)
                .add_directive("portal_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("PORTAL_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::new(
        org_bundle_path_from_env_value(std::env::var(ORG_BUNDLE_PATH_ENV).ok()),
        default_locale_from_env_value(std::env::var(DEFAULT_LOCALE_ENV).ok()),
        consent_with_top_level_org_from_env_value(
            std::env::var(CONSENT_WITH_TOP_LEVEL_ORG_ENV).ok(),
        )?,
    )?);

    let mut hierarchy = OrgHierarchy::new();
    match hierarchy.load_from(&FileDirectory::from_config(&cfg)) {
        Ok(report) => tracing::info!(
            "Loaded {} organizations ({} skipped, {} placeholders)",
            report.ingested,
            report.skipped,
            report.placeholders
        ),
        Err(e) => tracing::error!("Organization directory unavailable: {}", e),
    }
    if let Err(e) = hierarchy.validate() {
        tracing::warn!("Organization hierarchy failed validation: {}", e);
    }

    tracing::info!("++ Starting organization REST on {}", rest_addr);

    let app = routes::router(routes::AppState::new(cfg, hierarchy));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
