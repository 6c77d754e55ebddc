// src/checker/categorize.rs
// =============================================================================
// This module sorts probe results into the three buckets users see:
//
//   active       -> Active
//   no_metadata  -> Active but no metadata, and Inactive
//   dead         -> Dead
//
// Inactive pages (404, 500, ...) share the "without metadata" bucket with
// live pages that have no title or description. That grouping is what users
// of the analyzer are used to, so it is kept as-is.
// =============================================================================

use crate::checker::probe::{ProbeResult, ProbeStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buckets {
    pub active: Vec<ProbeResult>,
    pub no_metadata: Vec<ProbeResult>,
    pub dead: Vec<ProbeResult>,
}

/// Counts per bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub active: usize,
    pub no_metadata: usize,
    pub dead: usize,
}

/// Which bucket a status lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Active,
    NoMetadata,
    Dead,
}

impl From<ProbeStatus> for Bucket {
    fn from(status: ProbeStatus) -> Self {
        match status {
            ProbeStatus::Active => Bucket::Active,
            ProbeStatus::ActiveNoMetadata | ProbeStatus::Inactive => Bucket::NoMetadata,
            ProbeStatus::Dead => Bucket::Dead,
        }
    }
}

// Splits results into buckets, keeping their relative order
pub fn categorize(results: Vec<ProbeResult>) -> Buckets {
    let mut buckets = Buckets::default();

    for result in results {
        match Bucket::from(result.status) {
            Bucket::Active => buckets.active.push(result),
            Bucket::NoMetadata => buckets.no_metadata.push(result),
            Bucket::Dead => buckets.dead.push(result),
        }
    }

    buckets
}

impl Buckets {
    pub fn summary(&self) -> Summary {
        Summary {
            total: self.len(),
            active: self.active.len(),
            no_metadata: self.no_metadata.len(),
            dead: self.dead.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.no_metadata.len() + self.dead.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every result, bucket by bucket
    pub fn iter(&self) -> impl Iterator<Item = &ProbeResult> {
        self.active
            .iter()
            .chain(self.no_metadata.iter())
            .chain(self.dead.iter())
    }

    /// Mutable access to every result, bucket by bucket
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ProbeResult> {
        self.active
            .iter_mut()
            .chain(self.no_metadata.iter_mut())
            .chain(self.dead.iter_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ProbeResult> {
        vec![
            ProbeResult::from_page("https://a.example", "<title>A</title>"),
            ProbeResult::dead("https://b.example", "dns error"),
            ProbeResult::inactive("https://c.example", 404),
            ProbeResult::from_page("https://d.example", "<p>no metadata</p>"),
            ProbeResult::from_page("https://e.example", r#"<meta name="description" content="E">"#),
            ProbeResult::dead("https://f.example", "timed out"),
        ]
    }

    fn urls(results: &[ProbeResult]) -> Vec<&str> {
        results.iter().map(|r| r.url.as_str()).collect()
    }

    #[test]
    fn test_buckets_keep_input_order() {
        let buckets = categorize(sample());

        assert_eq!(urls(&buckets.active), vec!["https://a.example", "https://e.example"]);
        assert_eq!(urls(&buckets.no_metadata), vec!["https://c.example", "https://d.example"]);
        assert_eq!(urls(&buckets.dead), vec!["https://b.example", "https://f.example"]);
    }

    #[test]
    fn test_every_result_in_exactly_one_bucket() {
        let input = sample();
        let total = input.len();
        let buckets = categorize(input.clone());

        assert_eq!(buckets.len(), total);

        for result in &input {
            let hits = [&buckets.active, &buckets.no_metadata, &buckets.dead]
                .iter()
                .filter(|bucket| bucket.contains(result))
                .count();
            assert_eq!(hits, 1, "{} landed in {} buckets", result.url, hits);
        }

        assert!(buckets.active.iter().all(|r| r.status == ProbeStatus::Active));
        assert!(buckets.dead.iter().all(|r| r.status == ProbeStatus::Dead));
        assert!(buckets.no_metadata.iter().all(|r| matches!(
            r.status,
            ProbeStatus::ActiveNoMetadata | ProbeStatus::Inactive
        )));
    }

    #[test]
    fn test_inactive_shares_bucket_with_no_metadata() {
        assert_eq!(Bucket::from(ProbeStatus::Inactive), Bucket::NoMetadata);
        assert_eq!(Bucket::from(ProbeStatus::ActiveNoMetadata), Bucket::NoMetadata);
    }

    #[test]
    fn test_empty_input_gives_empty_buckets() {
        let buckets = categorize(Vec::new());
        assert!(buckets.is_empty());
        assert_eq!(buckets.summary(), Summary::default());
    }

    #[test]
    fn test_summary_counts() {
        let summary = categorize(sample()).summary();
        assert_eq!(
            summary,
            Summary {
                total: 6,
                active: 2,
                no_metadata: 2,
                dead: 2,
            }
        );
    }
}
