//! Admin server
//!
//! A small JSON API for editing posts, plus static serving of the generated
//! site. Every request that touches the store goes through one mutex, so
//! saves and generation runs never interleave.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{Post, PostSummary};
use crate::generator::GenerateReport;
use crate::publish::Publisher;
use crate::{Error, Site};

/// Server state
struct ServerState {
    publisher: Publisher,
    /// Serializes all store and generator access
    write_lock: Mutex<()>,
}

/// Request body for create and update
#[derive(Debug, Deserialize)]
struct PostInput {
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    published: bool,
}

/// Build the admin router around `publisher`
pub fn router(publisher: Publisher) -> Router {
    let serve_dir = ServeDir::new(publisher.output_dir());
    let state = Arc::new(ServerState {
        publisher,
        write_lock: Mutex::new(()),
    });

    Router::new()
        .route("/admin/posts", get(list_posts).post(create_post))
        .route(
            "/admin/posts/:slug",
            get(show_post).put(update_post).delete(delete_post),
        )
        .route("/admin/generate", post(generate))
        .fallback_service(serve_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the admin server
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let publisher = site.publisher()?;

    tracing::info!("Generating static files...");
    publisher.regenerate()?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Admin API at http://{}:{}/admin/posts", ip, port);
    println!("Site at http://{}:{}/index.html", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(publisher)).await?;

    Ok(())
}

async fn list_posts(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let _guard = state.write_lock.lock().await;
    Ok(Json(state.publisher.store().list_posts()?))
}

async fn show_post(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let _guard = state.write_lock.lock().await;
    Ok(Json(state.publisher.store().load_post(&slug)?))
}

async fn create_post(
    State(state): State<Arc<ServerState>>,
    Json(input): Json<PostInput>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let _guard = state.write_lock.lock().await;
    let post = state
        .publisher
        .create(&input.title, &input.body, input.published)?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    Json(input): Json<PostInput>,
) -> Result<Json<Post>, ApiError> {
    let _guard = state.write_lock.lock().await;
    let post = state
        .publisher
        .update(&slug, &input.title, &input.body, input.published)?;
    Ok(Json(post))
}

async fn delete_post(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    let _guard = state.write_lock.lock().await;
    state.publisher.delete(&slug)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn generate(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<GenerateReport>, ApiError> {
    let _guard = state.write_lock.lock().await;
    Ok(Json(state.publisher.regenerate()?))
}

/// Store and generator errors as HTTP responses
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_user_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}
