mod sync;
mod transactions;

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use posterm_sync::SyncPayload;
use serde::Serialize;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};
use transactions::StoredTransaction;

/// Shared state for the demo backend.
#[derive(Clone)]
pub struct AppState {
    /// Label of the catalog being served (`coffee`, or the YAML path).
    pub catalog_label: Arc<str>,
    pub payload: Arc<SyncPayload>,
    pub transactions: Arc<Mutex<Vec<StoredTransaction>>>,
}

impl AppState {
    #[must_use]
    pub fn new(catalog_label: impl Into<Arc<str>>, payload: SyncPayload) -> Self {
        Self {
            catalog_label: catalog_label.into(),
            payload: Arc::new(payload),
            transactions: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    catalog: String,
    products: usize,
    transactions: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = if matches!(self.error.code.as_str(), "bad_request" | "validation_error") {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> usize {
    usize::try_from(limit.unwrap_or(50).clamp(1, 500)).unwrap_or(50)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/sync", get(sync::get_sync))
        .route(
            "/api/transactions",
            get(transactions::list_transactions).post(transactions::record_transaction),
        )
}

/// Demo backend routes plus the web simulator's static files at `/`.
pub fn build_app(state: AppState, simulator_dir: &Path) -> Router {
    Router::new()
        .merge(api_router())
        .fallback_service(ServeDir::new(simulator_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let transactions = state.transactions.lock().await.len();
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            catalog: state.catalog_label.to_string(),
            products: state.payload.products.len(),
            transactions,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use posterm_core::DemoDataset;
    use tower::ServiceExt;

    pub(super) fn coffee_state() -> AppState {
        let payload = SyncPayload {
            products: DemoDataset::Coffee.catalog().products().to_vec(),
            categories: DemoDataset::Coffee.catalog().categories().to_vec(),
            settings: posterm_core::StoreSettings::default(),
        };
        AppState::new("coffee", payload)
    }

    pub(super) fn test_app(state: AppState) -> Router {
        build_app(state, Path::new("/nonexistent/posterm-simulator"))
    }

    pub(super) async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(-3)), 1);
        assert_eq!(normalize_limit(Some(10_000)), 500);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_unknown_code_maps_to_500() {
        let response = ApiError::new("req-1", "boom", "x").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_reports_catalog_and_counts() {
        let response = test_app(coffee_state())
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header(REQUEST_ID_HEADER, "req-health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["catalog"], "coffee");
        assert_eq!(json["data"]["products"], 15);
        assert_eq!(json["data"]["transactions"], 0);
        assert_eq!(json["meta"]["request_id"], "req-health");
    }

    #[tokio::test]
    async fn cors_preflight_allows_post() {
        let response = test_app(coffee_state())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/transactions")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn serves_simulator_files_at_root() {
        let dir = std::env::temp_dir().join(format!("posterm-sim-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create dir");
        std::fs::write(dir.join("index.html"), "<h1>POS</h1>").expect("write index");

        let app = build_app(coffee_state(), &dir);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(&body[..], b"<h1>POS</h1>");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_static_file_is_404() {
        let response = test_app(coffee_state())
            .oneshot(
                Request::builder()
                    .uri("/app.js")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
