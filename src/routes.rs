//! REST surface over the organization hierarchy.
//!
//! The hierarchy is shared behind a `tokio::sync::RwLock`: queries take the read lock, ingest and
//! reload take the write lock. Before the first successful ingest every query answers with
//! empty results.

use axum::{
    Router,
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use fhir::{BundleFormat, Communication, Organization};
use portal_core::{
    ConsentScope, CoreConfig, FileDirectory, HierarchyError, OrgHierarchy, OrgId, OrgNode,
    OrganizationDirectory,
};

type ApiError = (StatusCode, &'static str);

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub hierarchy: Arc<RwLock<OrgHierarchy>>,
    pub directory: Arc<FileDirectory>,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>, hierarchy: OrgHierarchy) -> Self {
        Self {
            directory: Arc::new(FileDirectory::from_config(&cfg)),
            cfg,
            hierarchy: Arc::new(RwLock::new(hierarchy)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
    pub initialised: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct IdsReq {
    #[serde(default)]
    pub ids: Vec<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdsRes {
    pub ids: Vec<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrganizationRes {
    pub id: u64,
    pub name: String,
    pub parent_id: Option<u64>,
    pub is_top_level: bool,
    pub placeholder: bool,
    pub children: Vec<u64>,
    pub language: Option<String>,
    pub region: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListOrganizationsRes {
    pub initialised: bool,
    pub organizations: Vec<OrganizationRes>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TopLevelParentRes {
    pub id: u64,
    pub top_level_parent: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FilterRes {
    pub filtered: bool,
    pub hidden_checkboxes: Vec<u64>,
    pub hidden_labels: Vec<u64>,
    pub hidden_groups: Vec<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CommunicationReq {
    #[serde(default)]
    pub ids: Vec<u64>,
    pub default_locale: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestRes {
    pub ingested: usize,
    pub skipped: usize,
    pub placeholders: usize,
    pub total: usize,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_organizations,
        top_level_orgs,
        top_level_parent,
        here_below_for_id,
        child_orgs,
        here_below_orgs,
        user_top_level_parents,
        filter_orgs,
        communication,
        consent_display_org,
        ingest,
        reload,
    ),
    components(schemas(
        HealthRes,
        IdsReq,
        IdsRes,
        OrganizationRes,
        ListOrganizationsRes,
        TopLevelParentRes,
        FilterRes,
        CommunicationReq,
        IngestRes,
    ))
)]
struct ApiDoc;

/// Build the REST router with OpenAPI/Swagger documentation.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/organizations", get(list_organizations))
        .route("/organizations/top-level", get(top_level_orgs))
        .route("/organizations/:id/top-level-parent", get(top_level_parent))
        .route("/organizations/:id/here-below", get(here_below_for_id))
        .route("/organizations/children", post(child_orgs))
        .route("/organizations/here-below", post(here_below_orgs))
        .route("/organizations/top-level-parents", post(user_top_level_parents))
        .route("/organizations/filter", post(filter_orgs))
        .route("/organizations/communication", post(communication))
        .route("/organizations/ingest", post(ingest))
        .route("/organizations/reload", post(reload))
        .route("/consents/:org_id/display-org", get(consent_display_org))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn to_ids(ids: &[u64]) -> Vec<OrgId> {
    ids.iter().copied().map(OrgId::new).collect()
}

fn from_ids<'a>(ids: impl IntoIterator<Item = &'a OrgId>) -> Vec<u64> {
    ids.into_iter().map(|id| id.get()).collect()
}

fn org_res(node: &OrgNode) -> OrganizationRes {
    OrganizationRes {
        id: node.id().get(),
        name: node.name().to_string(),
        parent_id: node.parent_id().map(OrgId::get),
        is_top_level: node.is_top_level(),
        placeholder: node.is_placeholder(),
        children: from_ids(node.children()),
        language: node.language().map(|l| l.as_str().to_string()),
        region: node.region().map(str::to_string),
        timezone: node.timezone().map(str::to_string),
    }
}

fn hierarchy_error(err: HierarchyError) -> ApiError {
    tracing::error!("Organization hierarchy error: {}", err);
    match err {
        HierarchyError::CyclicHierarchy { .. } => {
            (StatusCode::CONFLICT, "Cyclic organization hierarchy")
        }
        HierarchyError::Fhir(_) | HierarchyError::InvalidInput(_) => {
            (StatusCode::BAD_REQUEST, "Invalid organization data")
        }
        HierarchyError::Directory { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, "Organization directory unavailable")
        }
        HierarchyError::LanguageCode(_) => (StatusCode::BAD_REQUEST, "Invalid language code"),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Reports whether the service is alive and whether the hierarchy has been populated.
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    let initialised = state.hierarchy.read().await.is_initialised();
    Json(HealthRes {
        ok: true,
        message: "Organization hierarchy service is alive".into(),
        initialised,
    })
}

#[utoipa::path(
    get,
    path = "/organizations",
    responses(
        (status = 200, description = "Every organization node", body = ListOrganizationsRes)
    )
)]
/// List every organization node in id order
async fn list_organizations(State(state): State<AppState>) -> Json<ListOrganizationsRes> {
    let hierarchy = state.hierarchy.read().await;
    Json(ListOrganizationsRes {
        initialised: hierarchy.is_initialised(),
        organizations: hierarchy.orgs_list().values().map(org_res).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/organizations/top-level",
    responses(
        (status = 200, description = "Top-level organization ids in discovery order", body = IdsRes)
    )
)]
/// List top-level organizations
async fn top_level_orgs(State(state): State<AppState>) -> Json<IdsRes> {
    let hierarchy = state.hierarchy.read().await;
    Json(IdsRes {
        ids: from_ids(&hierarchy.top_level_orgs()),
    })
}

#[utoipa::path(
    get,
    path = "/organizations/{id}/top-level-parent",
    params(("id" = u64, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Top-level parent, null for unknown ids", body = TopLevelParentRes),
        (status = 409, description = "Cyclic organization hierarchy")
    )
)]
/// Resolve the top-level parent of one organization
async fn top_level_parent(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<u64>,
) -> Result<Json<TopLevelParentRes>, ApiError> {
    let hierarchy = state.hierarchy.read().await;
    let top = hierarchy
        .top_level_parent_org(OrgId::new(id))
        .map_err(hierarchy_error)?;
    Ok(Json(TopLevelParentRes {
        id,
        top_level_parent: top.map(OrgId::get),
    }))
}

#[utoipa::path(
    get,
    path = "/organizations/{id}/here-below",
    params(("id" = u64, Path, description = "Organization id")),
    responses(
        (status = 200, description = "The organization followed by its descendants", body = IdsRes),
        (status = 409, description = "Cyclic organization hierarchy")
    )
)]
/// List one organization and everything below it
async fn here_below_for_id(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<u64>,
) -> Result<Json<IdsRes>, ApiError> {
    let hierarchy = state.hierarchy.read().await;
    let ids = hierarchy
        .here_below_orgs(&[OrgId::new(id)])
        .map_err(hierarchy_error)?;
    Ok(Json(IdsRes {
        ids: from_ids(&ids),
    }))
}

#[utoipa::path(
    post,
    path = "/organizations/children",
    request_body = IdsReq,
    responses(
        (status = 200, description = "All descendants, breadth first", body = IdsRes),
        (status = 409, description = "Cyclic organization hierarchy")
    )
)]
/// List all descendants of the given organizations
async fn child_orgs(
    State(state): State<AppState>,
    Json(req): Json<IdsReq>,
) -> Result<Json<IdsRes>, ApiError> {
    let hierarchy = state.hierarchy.read().await;
    let ids = hierarchy
        .child_orgs(&to_ids(&req.ids))
        .map_err(hierarchy_error)?;
    Ok(Json(IdsRes {
        ids: from_ids(&ids),
    }))
}

#[utoipa::path(
    post,
    path = "/organizations/here-below",
    request_body = IdsReq,
    responses(
        (status = 200, description = "Each id followed by its descendants", body = IdsRes),
        (status = 409, description = "Cyclic organization hierarchy")
    )
)]
/// List the given organizations each followed by its descendants
async fn here_below_orgs(
    State(state): State<AppState>,
    Json(req): Json<IdsReq>,
) -> Result<Json<IdsRes>, ApiError> {
    let hierarchy = state.hierarchy.read().await;
    let ids = hierarchy
        .here_below_orgs(&to_ids(&req.ids))
        .map_err(hierarchy_error)?;
    Ok(Json(IdsRes {
        ids: from_ids(&ids),
    }))
}

#[utoipa::path(
    post,
    path = "/organizations/top-level-parents",
    request_body = IdsReq,
    responses(
        (status = 200, description = "Distinct top-level parents in first-seen order", body = IdsRes),
        (status = 409, description = "Cyclic organization hierarchy")
    )
)]
/// Resolve the distinct top-level parents of a user's organizations
async fn user_top_level_parents(
    State(state): State<AppState>,
    Json(req): Json<IdsReq>,
) -> Result<Json<IdsRes>, ApiError> {
    let hierarchy = state.hierarchy.read().await;
    let ids = hierarchy
        .user_top_level_parent_orgs(&to_ids(&req.ids))
        .map_err(hierarchy_error)?;
    Ok(Json(IdsRes {
        ids: from_ids(&ids),
    }))
}

#[utoipa::path(
    post,
    path = "/organizations/filter",
    request_body = IdsReq,
    responses(
        (status = 200, description = "Elements to hide for the allowed leaf organizations", body = FilterRes),
        (status = 409, description = "Cyclic organization hierarchy")
    )
)]
/// Compute which organizations the form hides for a set of allowed leaf organizations
async fn filter_orgs(
    State(state): State<AppState>,
    Json(req): Json<IdsReq>,
) -> Result<Json<FilterRes>, ApiError> {
    let hierarchy = state.hierarchy.read().await;
    let visibility = hierarchy
        .filter_orgs(&to_ids(&req.ids))
        .map_err(hierarchy_error)?;

    Ok(Json(match visibility {
        None => FilterRes {
            filtered: false,
            hidden_checkboxes: Vec::new(),
            hidden_labels: Vec::new(),
            hidden_groups: Vec::new(),
        },
        Some(v) => FilterRes {
            filtered: true,
            hidden_checkboxes: from_ids(&v.hidden_checkboxes),
            hidden_labels: from_ids(&v.hidden_labels),
            hidden_groups: from_ids(&v.hidden_groups),
        },
    }))
}

#[utoipa::path(
    post,
    path = "/organizations/communication",
    request_body = CommunicationReq,
    responses(
        (status = 200, description = "FHIR communication entries", body = Object),
        (status = 500, description = "Internal server error")
    )
)]
/// Derive patient communication languages from selected organizations
///
/// Falls back to the request's `default_locale`, then to the configured default locale.
async fn communication(
    State(state): State<AppState>,
    Json(req): Json<CommunicationReq>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let requested = portal_core::config::default_locale_from_env_value(req.default_locale);
    let default_locale = requested.as_ref().or(state.cfg.default_locale());

    let hierarchy = state.hierarchy.read().await;
    let entries = hierarchy.communication_for_orgs(&to_ids(&req.ids), default_locale);
    let value = Communication::to_value(&entries).map_err(|e| {
        tracing::error!("Communication serialisation error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })?;
    Ok(Json(value))
}

#[utoipa::path(
    get,
    path = "/consents/{org_id}/display-org",
    params(("org_id" = u64, Path, description = "Organization the consent was recorded against")),
    responses(
        (status = 200, description = "Organization to display for the consent", body = OrganizationRes),
        (status = 404, description = "Unknown organization")
    )
)]
/// Resolve the organization shown against a consent agreement
async fn consent_display_org(
    State(state): State<AppState>,
    AxumPath(org_id): AxumPath<u64>,
) -> Result<Json<OrganizationRes>, ApiError> {
    let scope = ConsentScope::from_config(&state.cfg);
    let hierarchy = state.hierarchy.read().await;
    hierarchy
        .consent_display_org(OrgId::new(org_id), scope)
        .map(|node| Json(org_res(node)))
        .ok_or((StatusCode::NOT_FOUND, "Unknown organization"))
}

#[utoipa::path(
    post,
    path = "/organizations/ingest",
    request_body(content = String, description = "Organization bundle JSON", content_type = "application/json"),
    responses(
        (status = 200, description = "Ingest summary", body = IngestRes),
        (status = 400, description = "Body is not an organization bundle")
    )
)]
/// Ingest a directory bundle on top of the current hierarchy
async fn ingest(State(state): State<AppState>, body: String) -> Result<Json<IngestRes>, ApiError> {
    let bundle = Organization::parse_bundle(&body, BundleFormat::Json)
        .map_err(|e| hierarchy_error(HierarchyError::Fhir(e)))?;

    let mut hierarchy = state.hierarchy.write().await;
    let report = hierarchy.ingest_bundle(&bundle);

    Ok(Json(IngestRes {
        ingested: report.ingested,
        skipped: report.skipped,
        placeholders: report.placeholders,
        total: hierarchy.orgs_list().len(),
    }))
}

#[utoipa::path(
    post,
    path = "/organizations/reload",
    responses(
        (status = 200, description = "Hierarchy rebuilt from the directory", body = IngestRes),
        (status = 503, description = "Organization directory unavailable")
    )
)]
/// Rebuild the hierarchy from the configured organization directory
///
/// The current hierarchy keeps serving until the directory has been read successfully.
async fn reload(State(state): State<AppState>) -> Result<Json<IngestRes>, ApiError> {
    let directory = state.directory.clone();
    let bundle = tokio::task::spawn_blocking(move || directory.fetch())
        .await
        .map_err(|e| {
            tracing::error!("Reload task failed: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        })?
        .map_err(hierarchy_error)?;

    let mut hierarchy = state.hierarchy.write().await;
    let report = hierarchy.replace_with(&bundle);
    tracing::info!("Reloaded {} organizations from directory", report.ingested);

    Ok(Json(IngestRes {
        ingested: report.ingested,
        skipped: report.skipped,
        placeholders: report.placeholders,
        total: hierarchy.orgs_list().len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use fhir::OrganizationRecord;
    use http_body_util::BodyExt;
    use portal_core::LanguageCode;
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn records() -> Vec<OrganizationRecord> {
        vec![
            OrganizationRecord::new(OrgId::new(1), "A"),
            OrganizationRecord::new(OrgId::new(2), "B").with_parent(OrgId::new(1)),
            OrganizationRecord::new(OrgId::new(3), "C").with_parent(OrgId::new(2)),
        ]
    }

    fn state_with(hierarchy: OrgHierarchy, bundle_path: PathBuf) -> AppState {
        let cfg = CoreConfig::new(bundle_path, LanguageCode::new("en_US").ok(), false)
            .expect("valid config");
        AppState::new(Arc::new(cfg), hierarchy)
    }

    fn test_app() -> Router {
        router(state_with(
            OrgHierarchy::from_records(&records()),
            PathBuf::from("does-not-exist.json"),
        ))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.expect("request handled");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_initialised_state() {
        let (status, body) = send(test_app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["initialised"], true);
    }

    #[tokio::test]
    async fn top_level_and_parent_queries() {
        let (_, body) = send(test_app(), get("/organizations/top-level")).await;
        assert_eq!(body["ids"], serde_json::json!([1]));

        let (_, body) = send(test_app(), get("/organizations/3/top-level-parent")).await;
        assert_eq!(body["top_level_parent"], 1);

        let (_, body) = send(test_app(), get("/organizations/404/top-level-parent")).await;
        assert!(body["top_level_parent"].is_null());
    }

    #[tokio::test]
    async fn here_below_and_children() {
        let (_, body) = send(test_app(), get("/organizations/1/here-below")).await;
        assert_eq!(body["ids"], serde_json::json!([1, 2, 3]));

        let (_, body) = send(
            test_app(),
            post_json("/organizations/children", serde_json::json!({"ids": []})),
        )
        .await;
        assert_eq!(body["ids"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn uninitialised_hierarchy_answers_empty() {
        let app = router(state_with(
            OrgHierarchy::new(),
            PathBuf::from("does-not-exist.json"),
        ));

        let (_, body) = send(app.clone(), get("/organizations/1/here-below")).await;
        assert_eq!(body["ids"], serde_json::json!([]));

        let (_, body) = send(app, get("/organizations")).await;
        assert_eq!(body["initialised"], false);
        assert_eq!(body["organizations"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn cyclic_data_is_a_conflict() {
        let app = router(state_with(
            OrgHierarchy::from_records(&[
                OrganizationRecord::new(OrgId::new(1), "A").with_parent(OrgId::new(2)),
                OrganizationRecord::new(OrgId::new(2), "B").with_parent(OrgId::new(1)),
            ]),
            PathBuf::from("does-not-exist.json"),
        ));

        let (status, _) = send(app, get("/organizations/1/top-level-parent")).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn communication_uses_configured_default() {
        let (status, body) = send(
            test_app(),
            post_json("/organizations/communication", serde_json::json!({"ids": [3]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["language"]["coding"][0]["code"], "en_US");
    }

    #[tokio::test]
    async fn communication_prefers_request_locale() {
        let (status, body) = send(
            test_app(),
            post_json(
                "/organizations/communication",
                serde_json::json!({"ids": [3], "default_locale": "fr_CA"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["language"]["coding"][0]["code"], "fr_CA");
        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn blank_request_locale_falls_back_to_configured() {
        let (status, body) = send(
            test_app(),
            post_json(
                "/organizations/communication",
                serde_json::json!({"ids": [3], "default_locale": "   "}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["language"]["coding"][0]["code"], "en_US");
    }

    #[tokio::test]
    async fn consent_display_uses_top_level_program() {
        let (status, body) = send(test_app(), get("/consents/3/display-org")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "A");

        let (status, _) = send(test_app(), get("/consents/404/display-org")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ingest_adds_records_without_duplicates() {
        let state = state_with(OrgHierarchy::new(), PathBuf::from("does-not-exist.json"));
        let app = router(state.clone());
        let bundle = serde_json::json!({
            "resourceType": "Bundle",
            "entry": [
                {"id": 1, "name": "A"},
                {"id": 2, "name": "B", "partOf": {"reference": "api/organization/1"}},
                {"name": "no id"}
            ]
        });

        let (status, body) = send(app.clone(), post_json("/organizations/ingest", bundle.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ingested"], 2);
        assert_eq!(body["skipped"], 1);
        assert_eq!(body["total"], 2);

        let (_, body) = send(app, post_json("/organizations/ingest", bundle)).await;
        assert_eq!(body["total"], 2);
        assert_eq!(state.hierarchy.read().await.top_level_orgs(), vec![OrgId::new(1)]);
    }

    #[tokio::test]
    async fn ingest_rejects_non_bundle_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/organizations/ingest")
            .body(Body::from("not json"))
            .unwrap();
        let (status, _) = send(test_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reload_failure_keeps_current_hierarchy() {
        let state = state_with(
            OrgHierarchy::from_records(&records()),
            PathBuf::from("does-not-exist.json"),
        );
        let app = router(state.clone());

        let (status, _) = send(app, post_json("/organizations/reload", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.hierarchy.read().await.orgs_list().len(), 3);
    }

    #[tokio::test]
    async fn reload_rebuilds_from_directory() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("orgs.json");
        std::fs::write(&path, r#"{"entry": [{"id": 9, "name": "Replacement"}]}"#)
            .expect("write bundle");

        let state = state_with(OrgHierarchy::from_records(&records()), path);
        let app = router(state.clone());

        let (status, body) = send(app, post_json("/organizations/reload", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(state.hierarchy.read().await.top_level_orgs(), vec![OrgId::new(9)]);
    }

    #[tokio::test]
    async fn filter_reports_hidden_groups() {
        let (_, body) = send(
            test_app(),
            post_json("/organizations/filter", serde_json::json!({"ids": [3]})),
        )
        .await;
        assert_eq!(body["filtered"], true);
        assert_eq!(body["hidden_checkboxes"], serde_json::json!([1, 2]));
        assert_eq!(body["hidden_groups"], serde_json::json!([]));

        let (_, body) = send(
            test_app(),
            post_json("/organizations/filter", serde_json::json!({"ids": []})),
        )
        .await;
        assert_eq!(body["filtered"], false);
    }
}
