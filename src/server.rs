//! RPC server module.
//!
//! Exposes the blog service as Twirp-style RPC over HTTP: every method is a
//! POST to `/twirp/service.BlogService/<Method>` with a JSON body. Handlers
//! are pure delegation to whichever [`BlogStore`] adapter was selected at
//! startup; the only logic they own is substituting the default list limit.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::storage::{Blog, BlogStore, StorageError};

/// Path prefix the service is mounted at.
pub const SERVICE_PATH: &str = "/twirp/service.BlogService";

/// Caller-facing default for ListBlog when no positive limit is supplied.
const DEFAULT_LIST_LIMIT: i64 = 25;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The backend adapter selected at startup.
    pub store: Arc<dyn BlogStore>,
}

// =============================================================================
// Wire Types
// =============================================================================

/// Request body for CreateBlog.
#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
}

/// Request body for GetBlog.
#[derive(Debug, Deserialize)]
pub struct GetBlogRequest {
    pub id: String,
}

/// Request body for UpdateBlog.
#[derive(Debug, Deserialize)]
pub struct UpdateBlogRequest {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// Request body for DeleteBlog.
#[derive(Debug, Deserialize)]
pub struct DeleteBlogRequest {
    pub id: String,
}

/// Request body for ListBlog. The limit is optional on the wire.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListBlogRequest {
    pub limit: i64,
}

/// Response body for DeleteBlog.
#[derive(Debug, Serialize)]
struct DeleteBlogResponse {
    id: String,
}

/// Response body for ListBlog.
#[derive(Debug, Serialize)]
struct ListBlogResponse {
    blogs: Vec<Blog>,
}

/// Twirp wire error body.
#[derive(Debug, Serialize)]
struct TwirpError {
    code: &'static str,
    msg: String,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    db: Option<String>,
}

/// Map a storage error onto the Twirp status and error code.
fn error_response(err: StorageError) -> Response {
    let (status, code) = match &err {
        StorageError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
        StorageError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        StorageError::Connection(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
    };

    (
        status,
        Json(TwirpError {
            code,
            msg: err.to_string(),
        }),
    )
        .into_response()
}

// =============================================================================
// Router
// =============================================================================

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(&format!("{SERVICE_PATH}/CreateBlog"), post(create_blog))
        .route(&format!("{SERVICE_PATH}/GetBlog"), post(get_blog))
        .route(&format!("{SERVICE_PATH}/UpdateBlog"), post(update_blog))
        .route(&format!("{SERVICE_PATH}/DeleteBlog"), post(delete_blog))
        .route(&format!("{SERVICE_PATH}/ListBlog"), post(list_blog))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

async fn create_blog(
    State(state): State<AppState>,
    Json(req): Json<CreateBlogRequest>,
) -> Response {
    match state.store.create(&req.title, &req.content).await {
        Ok(blog) => Json(blog).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_blog(State(state): State<AppState>, Json(req): Json<GetBlogRequest>) -> Response {
    match state.store.get(&req.id).await {
        Ok(blog) => Json(blog).into_response(),
        Err(err) => error_response(err),
    }
}

async fn update_blog(
    State(state): State<AppState>,
    Json(req): Json<UpdateBlogRequest>,
) -> Response {
    match state.store.update(&req.id, &req.title, &req.content).await {
        Ok(blog) => Json(blog).into_response(),
        Err(err) => error_response(err),
    }
}

async fn delete_blog(
    State(state): State<AppState>,
    Json(req): Json<DeleteBlogRequest>,
) -> Response {
    match state.store.delete(&req.id).await {
        Ok(id) => Json(DeleteBlogResponse { id }).into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_blog(State(state): State<AppState>, Json(req): Json<ListBlogRequest>) -> Response {
    let limit = if req.limit > 0 {
        req.limit
    } else {
        DEFAULT_LIST_LIMIT
    };

    match state.store.list(limit).await {
        Ok(blogs) => Json(ListBlogResponse { blogs }).into_response(),
        Err(err) => error_response(err),
    }
}

/// Liveness probe.
async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        db: None,
    })
}

/// Readiness probe that checks backend availability with a minimal list.
///
/// The document adapter reports an empty collection as not-found; that still
/// means the backend answered, so it counts as ready.
async fn readyz_handler(State(state): State<AppState>) -> Response {
    match state.store.list(1).await {
        Ok(_) | Err(StorageError::NotFound(_)) => Json(HealthResponse {
            status: "ok".to_string(),
            db: Some("ready".to_string()),
        })
        .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "not_ready".to_string(),
                    db: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::MemoryStore;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_router() -> Router {
        create_router(AppState {
            store: Arc::new(MemoryStore::default()),
        })
    }

    async fn rpc(router: &Router, method: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(format!("{SERVICE_PATH}/{method}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let router = test_router();

        let (status, created) =
            rpc(&router, "CreateBlog", json!({"title": "Hello", "content": "World"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["title"], "Hello");
        assert_eq!(created["content"], "World");
        let id = created["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());

        let (status, fetched) = rpc(&router, "GetBlog", json!({"id": id})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let router = test_router();

        let (status, body) = rpc(&router, "GetBlog", json!({"id": "999"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn test_get_malformed_id_is_invalid_argument() {
        let router = test_router();

        let (status, body) = rpc(&router, "GetBlog", json!({"id": "not-a-valid-id"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");
        assert_eq!(body["msg"], "invalid blog id");
    }

    #[tokio::test]
    async fn test_update_preserves_id() {
        let router = test_router();

        let (_, created) =
            rpc(&router, "CreateBlog", json!({"title": "v1", "content": "c1"})).await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = rpc(
            &router,
            "UpdateBlog",
            json!({"id": id, "title": "v2", "content": "c2"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id.as_str());
        assert_eq!(updated["title"], "v2");

        let (_, fetched) = rpc(&router, "GetBlog", json!({"id": id})).await;
        assert_eq!(fetched["content"], "c2");
    }

    #[tokio::test]
    async fn test_update_missing_id_is_invalid_argument() {
        let router = test_router();

        let (status, body) = rpc(
            &router,
            "UpdateBlog",
            json!({"id": "999", "title": "t", "content": "c"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");
    }

    #[tokio::test]
    async fn test_second_delete_is_rejected() {
        let router = test_router();

        let (_, created) =
            rpc(&router, "CreateBlog", json!({"title": "t", "content": "c"})).await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, deleted) = rpc(&router, "DeleteBlog", json!({"id": id})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["id"], id.as_str());

        let (status, body) = rpc(&router, "DeleteBlog", json!({"id": id})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");

        let (status, _) = rpc(&router, "GetBlog", json!({"id": id})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let router = test_router();

        for i in 0..30 {
            rpc(
                &router,
                "CreateBlog",
                json!({"title": format!("post {i}"), "content": "body"}),
            )
            .await;
        }

        let (status, body) = rpc(&router, "ListBlog", json!({"limit": 10})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["blogs"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_list_substitutes_default_limit() {
        let router = test_router();

        for i in 0..30 {
            rpc(
                &router,
                "CreateBlog",
                json!({"title": format!("post {i}"), "content": "body"}),
            )
            .await;
        }

        // Zero and omitted both fall back to the default of 25.
        let (_, body) = rpc(&router, "ListBlog", json!({"limit": 0})).await;
        assert_eq!(body["blogs"].as_array().unwrap().len(), 25);

        let (_, body) = rpc(&router, "ListBlog", json!({})).await;
        assert_eq!(body["blogs"].as_array().unwrap().len(), 25);

        let (_, body) = rpc(&router, "ListBlog", json!({"limit": -5})).await;
        assert_eq!(body["blogs"].as_array().unwrap().len(), 25);
    }

    #[tokio::test]
    async fn test_health_probes() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/readyz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
