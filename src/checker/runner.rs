// src/checker/runner.rs
// =============================================================================
// This module probes a whole list of bookmarks with bounded concurrency.
//
// How it works:
// 1. Number every URL with its position in the input (enumerate)
// 2. Spawn one tokio task per probe, but keep at most `concurrency` running
// 3. As each probe finishes (in any order), drop its result into the slot
//    matching its position
// 4. Once every slot is filled, hand back the results in input order
//
// Rust concepts:
// - Arc<dyn Probe>: a shared, thread-safe handle to the prober
// - buffer_unordered: run up to N futures at once
// - tokio::spawn: run each probe as its own task, possibly on another thread
// =============================================================================

use crate::checker::probe::{Probe, ProbeResult};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// How many probes run at once when nobody says otherwise
pub const DEFAULT_CONCURRENCY: usize = 10;

// Probes every URL and returns one result per URL, in input order
//
// Parameters:
//   prober: what to probe with (the real HttpProber, or a fake in tests)
//   urls: the bookmarks, in the order they should come back
//   concurrency: maximum number of probes in flight (0 is treated as 1)
//
// Returns only after every URL has a result. There is no overall deadline:
// each probe is bounded by its own timeout instead.
pub async fn run(prober: Arc<dyn Probe>, urls: &[String], concurrency: usize) -> Vec<ProbeResult> {
    let concurrency = concurrency.max(1);
    log::info!("Probing {} URL(s) with {} worker(s)", urls.len(), concurrency);

    // One slot per input URL; each finished probe fills the slot at its index
    let mut slots: Vec<Option<ProbeResult>> = vec![None; urls.len()];

    let tasks = urls.iter().cloned().enumerate().map(|(index, url)| {
        let prober = Arc::clone(&prober);
        async move {
            let handle = tokio::spawn({
                let url = url.clone();
                async move { prober.probe(&url).await }
            });

            // A probe should never panic, but if one does the batch still
            // gets a result for that URL
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    log::warn!("Probe task for {} failed: {}", url, e);
                    ProbeResult::dead(&url, format!("Probe task failed: {}", e))
                }
            };

            (index, result)
        }
    });

    let mut completions = stream::iter(tasks).buffer_unordered(concurrency);
    while let Some((index, result)) = completions.next().await {
        slots[index] = Some(result);
    }

    // Every index was yielded exactly once above, so no slot is empty
    let results: Vec<ProbeResult> = slots.into_iter().flatten().collect();
    debug_assert_eq!(results.len(), urls.len());
    results
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why not just collect() the buffer_unordered stream?
//    - buffer_unordered yields results as they finish, fastest first
//    - Callers line results up with the bookmark list by index, so the order
//      has to match the input
//    - The slot vector puts every result back where it belongs
//
// 2. Why spawn a task per probe?
//    - buffer_unordered alone polls every future from the caller's task,
//      so HTML parsing would all happen on one thread
//    - tokio::spawn lets the runtime spread probes over its worker threads
//    - The concurrency limit still holds: a spawned task only exists while
//      its wrapper future is inside the buffer
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::probe::ProbeStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // Fake prober: sleeps for a per-URL delay and records how many probes
    // were running at the same time
    #[derive(Default)]
    struct InstrumentedProber {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Probe for InstrumentedProber {
        async fn probe(&self, url: &str) -> ProbeResult {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);

            // URLs look like "https://site/<delay-ms>"
            let delay: u64 = url.rsplit('/').next().and_then(|d| d.parse().ok()).unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ProbeResult::inactive(url, 404)
        }
    }

    struct PanickingProber;

    #[async_trait]
    impl Probe for PanickingProber {
        async fn probe(&self, url: &str) -> ProbeResult {
            if url.contains("boom") {
                panic!("probe blew up");
            }
            ProbeResult::inactive(url, 500)
        }
    }

    fn urls_with_delays(delays: &[u64]) -> Vec<String> {
        delays
            .iter()
            .enumerate()
            .map(|(i, d)| format!("https://site-{}/{}", i, d))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_input() {
        let prober = Arc::new(InstrumentedProber::default());
        let results = run(prober.clone(), &[], 10).await;
        assert!(results.is_empty());
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_one_result_per_url() {
        let urls = urls_with_delays(&[5, 0, 3, 1, 0, 2, 4]);
        let prober = Arc::new(InstrumentedProber::default());

        let results = run(prober.clone(), &urls, 3).await;

        assert_eq!(results.len(), urls.len());
        assert_eq!(prober.calls.load(Ordering::SeqCst), urls.len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_order_matches_input_despite_latency() {
        // Earlier URLs are slower, so they finish last
        let urls = urls_with_delays(&[120, 100, 80, 60, 40, 20, 0]);
        let results = run(Arc::new(InstrumentedProber::default()), &urls, 7).await;

        let returned: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
        let expected: Vec<&str> = urls.iter().map(String::as_str).collect();
        assert_eq!(returned, expected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_bound_is_respected() {
        let urls = urls_with_delays(&[20; 25]);
        let prober = Arc::new(InstrumentedProber::default());

        run(prober.clone(), &urls, 4).await;

        let peak = prober.peak.load(Ordering::SeqCst);
        assert!(peak <= 4, "peak concurrency was {}", peak);
        assert!(peak >= 2, "probes never overlapped");
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_finishes() {
        let urls = urls_with_delays(&[0, 0, 0]);
        let prober = Arc::new(InstrumentedProber::default());

        let results = run(prober.clone(), &urls, 0).await;

        assert_eq!(results.len(), 3);
        assert_eq!(prober.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_probe_becomes_dead() {
        let urls = vec![
            "https://fine.example".to_string(),
            "https://boom.example".to_string(),
            "https://also-fine.example".to_string(),
        ];

        let results = run(Arc::new(PanickingProber), &urls, 2).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].status, ProbeStatus::Inactive);
        assert_eq!(results[1].status, ProbeStatus::Dead);
        assert_eq!(results[1].url, "https://boom.example");
        assert_eq!(results[2].status, ProbeStatus::Inactive);
    }
}
