// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (RUST_LOG controls it, "info" by default)
// 2. Parse command-line arguments using clap and load the config
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = dead links found, 2 = error)
// =============================================================================

use anyhow::{Context, Result};
use bookmark_analyzer::checker::{self, HttpProber, Probe, ProbeResult, ProbeStatus};
use bookmark_analyzer::cli::{Cli, Commands};
use bookmark_analyzer::extension::{ExtensionBundle, ARCHIVE_NAME};
use bookmark_analyzer::ingest::{self, IngestState, SnapshotStore};
use bookmark_analyzer::report;
use bookmark_analyzer::summarize::{self, ChatSummarizer, Summarizer};
use bookmark_analyzer::wizard::{Wizard, WizardContext};
use bookmark_analyzer::AppConfig;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("could not load config")?;

    match cli.command {
        Commands::Serve => handle_serve(&config).await,
        Commands::Analyze {
            json,
            concurrency,
            timeout,
            explain,
            organize,
        } => {
            let mut config = config;
            if let Some(concurrency) = concurrency {
                config.probe.concurrency = concurrency;
            }
            if let Some(timeout) = timeout {
                config.probe.timeout_secs = timeout;
                config.validate()?;
            }
            handle_analyze(&config, json, explain, organize).await
        }
        Commands::Probe { url, json } => handle_probe(&config, &url, json).await,
        Commands::PackageExtension { output } => handle_package(&config, &output),
        Commands::Wizard => handle_wizard(&config).await,
    }
}

fn ingest_state(config: &AppConfig) -> Result<Arc<IngestState>> {
    Ok(Arc::new(IngestState {
        store: Arc::new(SnapshotStore::new(&config.snapshot_path)),
        extension: extension_bundle(config)?,
    }))
}

// The extension, pointed at the configured ingest address
fn extension_bundle(config: &AppConfig) -> Result<ExtensionBundle> {
    Ok(ExtensionBundle::load(config.extension_dir.as_deref())?.pointed_at(&config.bind_addr))
}

// Handles the 'serve' subcommand: runs the ingest endpoint until killed
async fn handle_serve(config: &AppConfig) -> Result<i32> {
    let state = ingest_state(config)?;
    let listener = ingest::bind(&config.bind_addr)
        .await
        .with_context(|| format!("could not listen on {}", config.bind_addr))?;

    println!("📥 Waiting for bookmarks on http://{}/bookmarks", config.bind_addr);
    println!("   Snapshot file: {}", config.snapshot_path.display());

    ingest::serve(listener, state).await?;
    Ok(0)
}

// Handles the 'analyze' subcommand
//
// Returns Ok(1) when at least one bookmark is dead, like a failing check
async fn handle_analyze(config: &AppConfig, json: bool, explain: bool, organize: bool) -> Result<i32> {
    let store = SnapshotStore::new(&config.snapshot_path);
    let bookmarks = store
        .load()
        .with_context(|| format!("could not read {}", config.snapshot_path.display()))?;

    if bookmarks.is_empty() {
        println!(
            "⚠️  No bookmarks found in {}. Run `bookmark-analyzer serve` and click the extension icon.",
            config.snapshot_path.display()
        );
        return Ok(0);
    }

    // Build the summarizer first, so a missing API key fails before the slow part
    let summarizer = if explain || organize {
        Some(ChatSummarizer::from_config(&config.summarizer)?)
    } else {
        None
    };

    if !json {
        println!("🌐 Checking {} bookmark(s)...", bookmarks.len());
    }

    let prober: Arc<dyn Probe> = Arc::new(HttpProber::new(&config.probe)?);
    let mut buckets = checker::analyze(prober, &bookmarks, config.probe.concurrency).await;

    let mut organization = None;
    if let Some(summarizer) = &summarizer {
        if explain {
            summarize::attach_explanations(summarizer, buckets.iter_mut(), config.probe.concurrency)
                .await;
        }
        if organize {
            let all: Vec<ProbeResult> = buckets.iter().cloned().collect();
            match summarize::organize(summarizer, &all).await {
                Ok(text) => organization = Some(text),
                Err(e) => log::warn!("Could not organize bookmarks: {}", e),
            }
        }
    }

    report::print_report(&buckets, organization.as_deref(), json)?;

    if buckets.dead.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Handles the 'probe' subcommand
async fn handle_probe(config: &AppConfig, url: &str, json: bool) -> Result<i32> {
    let prober = HttpProber::new(&config.probe)?;
    let result = prober.probe(url).await;

    report::print_probe(&result, json)?;

    Ok(if result.status == ProbeStatus::Dead { 1 } else { 0 })
}

// Handles the 'package-extension' subcommand
fn handle_package(config: &AppConfig, output: &Path) -> Result<i32> {
    extension_bundle(config)?
        .write_zip(output)
        .with_context(|| format!("could not write {}", output.display()))?;

    println!("📦 Extension written to {}", output.display());
    Ok(0)
}

// Handles the 'wizard' subcommand: ingest endpoint in the background,
// interactive steps in the foreground
async fn handle_wizard(config: &AppConfig) -> Result<i32> {
    let state = ingest_state(config)?;
    let store = Arc::clone(&state.store);
    let extension = state.extension.clone();

    let listener = ingest::bind(&config.bind_addr)
        .await
        .with_context(|| format!("could not listen on {}", config.bind_addr))?;
    tokio::spawn(async move {
        if let Err(e) = ingest::serve(listener, state).await {
            log::error!("Ingest endpoint stopped: {}", e);
        }
    });

    let summarizer: Option<Arc<dyn Summarizer>> = match ChatSummarizer::from_config(&config.summarizer) {
        Ok(summarizer) => Some(Arc::new(summarizer)),
        Err(e) => {
            log::info!("Organizing with AI is disabled: {}", e);
            None
        }
    };

    let ctx = WizardContext {
        store,
        prober: Arc::new(HttpProber::new(&config.probe)?),
        concurrency: config.probe.concurrency,
        extension,
        download_path: PathBuf::from(ARCHIVE_NAME),
        summarizer,
    };

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    Wizard::new(ctx, input).run().await?;
    Ok(0)
}
