use axum::{
    extract::{Path, Query as QueryParams, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{Api, ApiError};
use crate::core::{Query, NAME_KEY, VERSION_KEY};
use crate::stats::{Outcome, RequestStats, StatusReport};
use crate::storage::CatalogStore;

/// 路由共享状态
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub api: Api,
    pub stats: RequestStats,
}

impl AppState {
    pub fn new(catalog: Arc<CatalogStore>, api: Api) -> Self {
        Self {
            catalog,
            api,
            stats: RequestStats::new(),
        }
    }

    pub fn status(&self) -> StatusReport {
        let snapshot = self.catalog.snapshot();
        StatusReport {
            records: snapshot.counts(),
            requests: self.stats.report(),
            catalog_fingerprint: format!("{:016x}", snapshot.fingerprint()),
            catalog_reloads: self.catalog.reload_count(),
            last_reload_error: self.catalog.last_error(),
        }
    }
}

pub struct QueryServer {
    pub state: Arc<AppState>,
}

impl QueryServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/v2/:cdn/libraries", get(libraries_handler))
            .route("/v2/:cdn/library", get(library_handler))
            .route("/v2/:cdn/library/:name", get(library_exact_handler))
            .route("/v2/:cdn/library/:name/:version", get(library_version_handler))
            .route("/status", get(status_handler))
            .with_state(self.state.clone())
    }

    pub async fn run(self, addr: SocketAddr) -> anyhow::Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP Query Server listening on {}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}

async fn libraries_handler(
    Path(cdn): Path<String>,
    QueryParams(params): QueryParams<BTreeMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Response {
    dispatch(&state, &cdn, params.into_iter().collect(), "find", false)
}

async fn library_handler(
    Path(cdn): Path<String>,
    QueryParams(params): QueryParams<BTreeMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Response {
    dispatch(&state, &cdn, params.into_iter().collect(), "findOne", false)
}

async fn library_exact_handler(
    Path((cdn, name)): Path<(String, String)>,
    QueryParams(params): QueryParams<BTreeMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let mut query: Query = params.into_iter().collect();
    query.insert(NAME_KEY, name);
    dispatch(&state, &cdn, query, "findOne", true)
}

async fn library_version_handler(
    Path((cdn, name, version)): Path<(String, String, String)>,
    QueryParams(params): QueryParams<BTreeMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let mut query: Query = params.into_iter().collect();
    query.insert(NAME_KEY, name);
    query.insert(VERSION_KEY, version);
    dispatch(&state, &cdn, query, "findOne", true)
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusReport> {
    Json(state.status())
}

fn dispatch(state: &AppState, cdn: &str, query: Query, action: &str, exact_match: bool) -> Response {
    let snapshot = state.catalog.snapshot();
    let Some(collection) = snapshot.collection(cdn) else {
        return ApiError::UnknownCollection(cdn.to_string()).into_response();
    };

    let result = state
        .api
        .process_request(collection, snapshot.etags(), &query, action, exact_match);

    let find_one = action == "findOne";
    match result {
        Ok(resp) => {
            state.stats.record(cdn, find_one, Outcome::Ok);
            let mut headers = HeaderMap::new();
            for (k, v) in &resp.headers {
                match (HeaderName::from_bytes(k.as_bytes()), HeaderValue::from_str(v)) {
                    (Ok(name), Ok(value)) => {
                        headers.insert(name, value);
                    }
                    _ => tracing::warn!("{}: dropping invalid response header {}={:?}", cdn, k, v),
                }
            }
            (StatusCode::OK, headers, Json(resp.body)).into_response()
        }
        Err(e) => {
            let outcome = if e.status_code() == 404 {
                Outcome::NotFound
            } else {
                Outcome::Error
            };
            state.stats.record(cdn, find_one, outcome);
            tracing::debug!("{}: {} failed: {}", cdn, action, e);
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CatalogSnapshot;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const CATALOG: &str = r#"{
        "collections": {
            "jsdelivr": [
                {"name": "jquery-ui", "author": "jquery", "$loki": 1,
                 "assets": [{"version": "1.11.4", "files": ["jquery-ui.js"]}]},
                {"name": "jquery", "author": "jquery", "mainfile": "jquery.min.js", "$loki": 2,
                 "assets": [{"version": "1.0.0", "files": ["a.js"]},
                            {"version": "2.1.4", "files": ["jquery.js", "jquery.min.js"]}]}
            ]
        },
        "etags": {"jsdelivr": [{"path": "jquery", "etag": "\"v1-jquery\""}]}
    }"#;

    fn server() -> QueryServer {
        let snapshot = CatalogSnapshot::from_json(CATALOG.as_bytes()).unwrap();
        let catalog = Arc::new(CatalogStore::from_snapshot("catalog.json".into(), snapshot));
        QueryServer::new(Arc::new(AppState::new(catalog, Api::default())))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn libraries_route_ranks_and_projects() {
        let (status, _, body) = get(server().router(), "/v2/jsdelivr/libraries?name=jquery*&fields=name").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"name": "jquery"}, {"name": "jquery-ui"}]));
    }

    #[tokio::test]
    async fn exact_route_sets_etag() {
        let (status, headers, body) = get(server().router(), "/v2/jsdelivr/library/jquery").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get("etag").unwrap(), "\"v1-jquery\"");
        assert_eq!(body["mainfile"], json!("jquery.min.js"));
        assert!(body.get("$loki").is_none());
        assert!(body.get("assets").is_none());
    }

    #[tokio::test]
    async fn version_route_returns_files_or_404() {
        let (status, _, body) = get(server().router(), "/v2/jsdelivr/library/jquery/2.1.4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["jquery.js", "jquery.min.js"]));

        let (status, _, body) = get(server().router(), "/v2/jsdelivr/library/jquery/9.9.9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], json!("Requested version not found."));
    }

    #[tokio::test]
    async fn loose_route_without_query_is_404() {
        let (status, _, body) = get(server().router(), "/v2/jsdelivr/library").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], json!(404));
    }

    #[tokio::test]
    async fn unknown_collection_is_404() {
        let (status, _, _) = get(server().router(), "/v2/google/libraries").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_reports_counts_and_requests() {
        let s = server();
        let _ = get(s.router(), "/v2/jsdelivr/library/nope").await;
        let (status, _, body) = get(s.router(), "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"]["jsdelivr"], json!(2));
        assert_eq!(body["requests"]["jsdelivr"]["not_found"], json!(1));
    }

    #[tokio::test]
    async fn run_fails_when_address_is_taken() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();
        let res = tokio::time::timeout(std::time::Duration::from_secs(5), server().run(addr)).await;
        assert!(matches!(res, Ok(Err(_))));
    }
}
