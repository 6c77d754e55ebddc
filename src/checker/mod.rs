// src/checker/mod.rs
// =============================================================================
// This module contains the bookmark checking pipeline.
//
// Submodules:
// - probe: checks one URL and classifies the outcome
// - metadata: reads <title> and the description meta tag from HTML
// - runner: probes many URLs with bounded concurrency, keeping input order
// - categorize: splits results into the active / no metadata / dead buckets
//
// The usual flow is:
//   urls -> runner::run(HttpProber) -> Vec<ProbeResult> -> categorize -> Buckets
// =============================================================================

mod categorize;
mod metadata;
mod probe;
mod runner;

pub use categorize::{categorize, Bucket, Buckets, Summary};
pub use metadata::{extract_metadata, PageMetadata};
pub use probe::{
    HttpProber, Probe, ProbeResult, ProbeStatus, StatusCode, NOT_AVAILABLE, NO_DESCRIPTION,
};
pub use runner::{run, DEFAULT_CONCURRENCY};

use std::sync::Arc;

// Probes every bookmark and sorts the results into buckets
pub async fn analyze(prober: Arc<dyn Probe>, urls: &[String], concurrency: usize) -> Buckets {
    let results = run(prober, urls, concurrency).await;
    let buckets = categorize(results);

    let summary = buckets.summary();
    log::info!(
        "Analyzed {} bookmark(s): {} active, {} without metadata, {} dead",
        summary.total,
        summary.active,
        summary.no_metadata,
        summary.dead
    );

    buckets
}
