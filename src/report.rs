// src/report.rs
// =============================================================================
// Prints analysis results, either as tables or as JSON.
//
// The table view has one section per bucket, followed by a summary:
//
//   Active Links with Metadata
//   BOOKMARK                                  STATUS          CODE
//   ==========================================================================
//   Rust Programming Language                 ✅ ACTIVE       200
// =============================================================================

use crate::checker::{Buckets, ProbeResult, ProbeStatus, Summary};
use crate::error::Result;
use serde::Serialize;
use std::fmt::Write;

const TEXT_WIDTH: usize = 57;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    buckets: &'a Buckets,
    summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<&'a str>,
}

/// Prints the full analysis: every bucket, the summary and, if present, the
/// summarizer's grouping
pub fn print_report(buckets: &Buckets, organization: Option<&str>, json: bool) -> Result<()> {
    if json {
        let report = JsonReport {
            buckets,
            summary: buckets.summary(),
            organization,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(buckets));
        if let Some(text) = organization {
            print!("{}", render_organization(text));
        }
    }
    Ok(())
}

/// Prints one probe result
pub fn print_probe(result: &ProbeResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", render_table(std::slice::from_ref(result)));
    }
    Ok(())
}

pub fn render_report(buckets: &Buckets) -> String {
    let mut out = String::new();

    for (heading, results) in [
        ("Active Links with Metadata", &buckets.active),
        ("Active Links without Metadata", &buckets.no_metadata),
        ("Dead Links", &buckets.dead),
    ] {
        let _ = writeln!(out, "\n{}", heading);
        if results.is_empty() {
            let _ = writeln!(out, "   (none)");
        } else {
            out.push_str(&render_table(results));
        }
    }

    out.push_str(&render_summary(&buckets.summary()));
    out
}

pub fn render_table(results: &[ProbeResult]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{:<60} {:<26} {}", "BOOKMARK", "STATUS", "CODE");
    let _ = writeln!(out, "{}", "=".repeat(100));

    for result in results {
        let _ = writeln!(
            out,
            "{:<60} {:<26} {}",
            truncate(result.display_text()),
            format_status(result.status),
            truncate(&result.status_code.to_string()),
        );
        if result.display_text() != result.url {
            let _ = writeln!(out, "   {}", result.url);
        }
        if let Some(explanation) = &result.explanation {
            let _ = writeln!(out, "   💬 {}", explanation);
        }
    }

    out
}

pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n📊 Summary:");
    let _ = writeln!(out, "   📋 Total bookmarks: {}", summary.total);
    let _ = writeln!(out, "   ✅ Active links with metadata: {}", summary.active);
    let _ = writeln!(out, "   🟠 Active links without metadata: {}", summary.no_metadata);
    let _ = writeln!(out, "   ❌ Dead links: {}", summary.dead);
    out
}

pub fn render_organization(text: &str) -> String {
    format!("\n🗂️  Suggested organization:\n{}\n", text)
}

fn format_status(status: ProbeStatus) -> &'static str {
    match status {
        ProbeStatus::Active => "✅ ACTIVE",
        ProbeStatus::ActiveNoMetadata => "🟠 ACTIVE (NO METADATA)",
        ProbeStatus::Inactive => "🟠 INACTIVE",
        ProbeStatus::Dead => "❌ DEAD",
    }
}

// Cuts on a char boundary, so multi-byte titles don't panic
fn truncate(text: &str) -> String {
    if text.chars().count() > TEXT_WIDTH {
        let head: String = text.chars().take(TEXT_WIDTH).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::categorize;

    fn buckets() -> Buckets {
        categorize(vec![
            ProbeResult::from_page("https://rust-lang.org", "<title>Rust</title>"),
            ProbeResult::inactive("https://gone.example", 404),
            ProbeResult::dead("https://nowhere.invalid", "dns error"),
        ])
    }

    #[test]
    fn test_report_has_every_section() {
        let text = render_report(&buckets());

        assert!(text.contains("Active Links with Metadata"));
        assert!(text.contains("Active Links without Metadata"));
        assert!(text.contains("Dead Links"));
        assert!(text.contains("Total bookmarks: 3"));
        assert!(text.contains("Dead links: 1"));
    }

    #[test]
    fn test_title_shown_instead_of_url_when_present() {
        let text = render_table(&buckets().active);
        assert!(text.contains("Rust"));
        assert!(text.contains("✅ ACTIVE"));
    }

    #[test]
    fn test_empty_bucket_says_none() {
        let text = render_report(&Buckets::default());
        assert_eq!(text.matches("(none)").count(), 3);
    }

    #[test]
    fn test_truncate_handles_multibyte() {
        let long = "日本語".repeat(40);
        let cut = truncate(&long);
        assert_eq!(cut.chars().count(), TEXT_WIDTH + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_json_report_shape() {
        let buckets = buckets();
        let report = JsonReport {
            buckets: &buckets,
            summary: buckets.summary(),
            organization: Some("Rust: 1"),
        };
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["active"].as_array().unwrap().len(), 1);
        assert_eq!(value["no_metadata"][0]["status_code"], 404);
        assert_eq!(value["dead"][0]["status"], "Dead");
        assert_eq!(value["summary"]["total"], 3);
        assert_eq!(value["organization"], "Rust: 1");
    }
}
