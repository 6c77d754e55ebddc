// src/ingest/mod.rs
// =============================================================================
// Receiving bookmarks from the browser extension.
//
// - snapshot: the JSON file the bookmarks are stored in
// - server: the HTTP endpoint that writes it
// =============================================================================

mod server;
mod snapshot;

pub use server::{bind, router, serve, IngestState};
pub use snapshot::SnapshotStore;
