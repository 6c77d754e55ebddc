// src/ingest/server.rs
// =============================================================================
// The local HTTP endpoint the browser extension talks to.
//
// Routes:
//   POST /bookmarks       body: ["https://...", ...]  -> replaces the snapshot
//   GET  /extension.zip   the packaged extension, ready to unzip and load
//
// There is no authentication: the server binds to localhost by default and
// only ever stores a list of URLs. CORS is wide open because the request
// comes from the extension's own origin.
// =============================================================================

use crate::error::Result;
use crate::extension::{ExtensionBundle, ARCHIVE_NAME};
use crate::ingest::snapshot::SnapshotStore;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Largest `POST /bookmarks` body we accept. A browser export of 100k
/// bookmarks is around 6 MiB; axum's own default of 2 MB is too small.
pub const MAX_INGEST_BYTES: usize = 64 * 1024 * 1024;

pub struct IngestState {
    pub store: Arc<SnapshotStore>,
    pub extension: ExtensionBundle,
}

pub fn router(state: Arc<IngestState>) -> Router {
    Router::new()
        .route("/bookmarks", post(receive_bookmarks))
        .route("/extension.zip", get(download_extension))
        .layer(DefaultBodyLimit::max(MAX_INGEST_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn bind(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Ingest endpoint listening on http://{}", listener.local_addr()?);
    Ok(listener)
}

/// Serves until the process exits
pub async fn serve(listener: TcpListener, state: Arc<IngestState>) -> Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn receive_bookmarks(
    State(state): State<Arc<IngestState>>,
    Json(urls): Json<Vec<String>>,
) -> Response {
    let count = urls.len();
    let store = Arc::clone(&state.store);

    // File I/O plus fsync: keep it off the async worker threads
    let saved = tokio::task::spawn_blocking(move || store.save(&urls)).await;

    match saved {
        Ok(Ok(())) => {
            log::info!("Received {} bookmarks", count);
            Json(json!({"status": "success", "message": "Bookmarks received"})).into_response()
        }
        Ok(Err(e)) => error_response(format!("Could not save bookmarks: {}", e)),
        Err(e) => error_response(format!("Could not save bookmarks: {}", e)),
    }
}

async fn download_extension(State(state): State<Arc<IngestState>>) -> Response {
    match state.extension.to_zip() {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/zip".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", ARCHIVE_NAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => error_response(format!("Could not package extension: {}", e)),
    }
}

fn error_response(message: String) -> Response {
    log::error!("{}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"status": "error", "message": message})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    async fn start(dir: &std::path::Path) -> (SocketAddr, Arc<SnapshotStore>) {
        let store = Arc::new(SnapshotStore::new(dir.join("bookmarks.json")));
        let state = Arc::new(IngestState {
            store: Arc::clone(&store),
            extension: ExtensionBundle::bundled(),
        });

        let listener = bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, state));

        (addr, store)
    }

    #[tokio::test]
    async fn test_post_bookmarks_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let (addr, store) = start(dir.path()).await;

        let response = reqwest::Client::new()
            .post(format!("http://{}/bookmarks", addr))
            .json(&vec!["https://a.example", "https://b.example"])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Bookmarks received");

        assert_eq!(
            store.load().unwrap(),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[tokio::test]
    async fn test_second_post_replaces_first() {
        let dir = tempfile::tempdir().unwrap();
        let (addr, store) = start(dir.path()).await;
        let client = reqwest::Client::new();

        for batch in [vec!["https://old.example"], vec!["https://new.example"]] {
            client
                .post(format!("http://{}/bookmarks", addr))
                .json(&batch)
                .send()
                .await
                .unwrap();
        }

        assert_eq!(store.load().unwrap(), vec!["https://new.example".to_string()]);
    }

    #[tokio::test]
    async fn test_large_export_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let (addr, store) = start(dir.path()).await;

        // ~3.3 MB of JSON, above axum's 2 MB default
        let urls: Vec<String> = (0..60_000)
            .map(|i| format!("https://bookmark-{:06}.example/some/path", i))
            .collect();
        let body = serde_json::to_vec(&urls).unwrap();
        assert!(body.len() > 2 * 1024 * 1024);

        let response = reqwest::Client::new()
            .post(format!("http://{}/bookmarks", addr))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(store.load().unwrap().len(), 60_000);
    }

    #[tokio::test]
    async fn test_non_array_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (addr, store) = start(dir.path()).await;

        let response = reqwest::Client::new()
            .post(format!("http://{}/bookmarks", addr))
            .json(&serde_json::json!({"not": "a list"}))
            .send()
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert!(store.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_extension() {
        let dir = tempfile::tempdir().unwrap();
        let (addr, _) = start(dir.path()).await;

        let response = reqwest::get(format!("http://{}/extension.zip", addr))
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.headers()["content-type"], "application/zip");
        let bytes = response.bytes().await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
