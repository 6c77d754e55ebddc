// src/wizard/mod.rs
// =============================================================================
// The interactive, step-by-step flow in the terminal:
//
// 1. Ask whether the browser extension is installed
// 2. If not, write the extension zip and explain how to load it
// 3. Wait for the user to click the extension (which posts the bookmarks to
//    the ingest endpoint running in the background)
// 4. Check that bookmarks arrived
// 5. Analyze them, and optionally ask the summarizer to organize them
//
// Each step prints a small menu and turns the user's answer into an Event.
// The state machine in state.rs decides where that leads.
// =============================================================================

mod state;

pub use state::{Event, WizardState};

use crate::checker::{self, Buckets, Probe, ProbeResult};
use crate::error::Result;
use crate::extension::ExtensionBundle;
use crate::ingest::SnapshotStore;
use crate::report;
use crate::summarize::{self, Summarizer};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// Everything the wizard's steps need to do their work
pub struct WizardContext {
    pub store: Arc<SnapshotStore>,
    pub prober: Arc<dyn Probe>,
    pub concurrency: usize,
    pub extension: ExtensionBundle,
    /// Where the extension zip is written in the download step
    pub download_path: PathBuf,
    pub summarizer: Option<Arc<dyn Summarizer>>,
}

type MenuOption = (&'static str, &'static str, Event);

pub struct Wizard<R> {
    state: WizardState,
    ctx: WizardContext,
    input: Lines<R>,
    last_analysis: Option<Buckets>,
}

impl<R: AsyncBufRead + Unpin> Wizard<R> {
    pub fn new(ctx: WizardContext, input: R) -> Self {
        Self {
            state: WizardState::default(),
            ctx,
            input: input.lines(),
            last_analysis: None,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn last_analysis(&self) -> Option<&Buckets> {
        self.last_analysis.as_ref()
    }

    /// Runs until the user quits or input ends
    pub async fn run(&mut self) -> Result<()> {
        println!("📚 Browser Bookmark Analyzer");

        while let Some(event) = self.step().await? {
            match self.state.transition(event) {
                Ok(next) => {
                    log::debug!("Wizard: {} --{:?}--> {}", self.state, event, next);
                    self.state = next;
                }
                Err(e) => log::warn!("{}", e),
            }
        }

        Ok(())
    }

    // Shows the current step, does its work and returns the next event.
    // None means the user quit.
    async fn step(&mut self) -> Result<Option<Event>> {
        match self.state {
            WizardState::Start => {
                self.choose(&[("1", "Extract bookmarks", Event::ExtractBookmarks)])
                    .await
            }

            WizardState::ExtensionCheck => {
                println!("\nDo you have the Bookmark Analyzer extension installed?");
                self.choose(&[
                    ("1", "Yes, I have it installed", Event::ExtensionInstalled),
                    ("2", "No, I need to install it", Event::ExtensionMissing),
                ])
                .await
            }

            WizardState::DownloadExtension => {
                self.ctx.extension.write_zip(&self.ctx.download_path)?;
                println!("\n📦 Extension saved to {}", self.ctx.download_path.display());
                println!("To install it:");
                println!("   1. Unzip the downloaded file");
                println!("   2. Open Chrome and go to chrome://extensions/");
                println!("   3. Enable 'Developer mode' in the top right");
                println!("   4. Click 'Load unpacked' and select the unzipped folder");
                println!("   5. Click the extension icon in Chrome to send bookmarks");
                self.choose(&[("1", "Done, it's installed", Event::ExtensionDownloaded)])
                    .await
            }

            WizardState::WaitForBookmarks => {
                println!("\nPlease click the extension icon in Chrome to send your bookmarks.");
                println!("Waiting for bookmarks...");
                self.choose(&[("1", "I've sent the bookmarks", Event::BookmarksSent)])
                    .await
            }

            WizardState::CheckBookmarks => {
                let count = self.ctx.store.load()?.len();
                if count > 0 {
                    println!("\n✅ Found {} bookmarks. Ready to analyze!", count);
                    return Ok(Some(Event::BookmarksFound(count)));
                }

                println!("\n❌ No bookmarks received yet. Make sure you've clicked the extension icon.");
                self.choose(&[("1", "Try again", Event::TryAgain)]).await
            }

            WizardState::Analyze => {
                let bookmarks = self.ctx.store.load()?;
                println!("\n📋 {} bookmarks ready.", bookmarks.len());

                let mut options: Vec<MenuOption> = vec![("1", "Analyze bookmarks", Event::Analyze)];
                if self.last_analysis.is_some() && self.ctx.summarizer.is_some() {
                    options.push(("2", "Organize them with AI", Event::Organize));
                }

                let event = self.choose(&options).await?;
                if event == Some(Event::Analyze) {
                    println!("🌐 Analyzing bookmarks...");
                    let buckets = checker::analyze(
                        Arc::clone(&self.ctx.prober),
                        &bookmarks,
                        self.ctx.concurrency,
                    )
                    .await;
                    print!("{}", report::render_report(&buckets));
                    self.last_analysis = Some(buckets);
                }
                Ok(event)
            }

            WizardState::Organize => {
                self.organize().await;
                self.choose(&[("1", "Back to analysis", Event::Reanalyze)]).await
            }
        }
    }

    async fn organize(&self) {
        let (Some(summarizer), Some(buckets)) = (&self.ctx.summarizer, &self.last_analysis) else {
            println!("\nNothing to organize yet.");
            return;
        };

        let results: Vec<ProbeResult> = buckets.iter().cloned().collect();

        println!("\n🤖 Asking the summarizer...");
        match summarize::organize(summarizer.as_ref(), &results).await {
            Ok(text) => print!("{}", report::render_organization(&text)),
            Err(e) => println!("⚠️  Could not organize bookmarks: {}", e),
        }
    }

    // Prints the options and reads lines until one matches
    async fn choose(&mut self, options: &[MenuOption]) -> Result<Option<Event>> {
        for (key, label, _) in options {
            println!("  {}) {}", key, label);
        }
        println!("  q) Quit");

        loop {
            print!("> ");
            let _ = std::io::stdout().flush();

            let Some(line) = self.input.next_line().await? else {
                return Ok(None);
            };

            let choice = line.trim();
            if choice.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            if let Some((_, _, event)) = options.iter().find(|(key, _, _)| *key == choice) {
                return Ok(Some(*event));
            }
            println!("Please pick one of the options above.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::ProbeStatus;
    use crate::error::Error;
    use crate::summarize::BookmarkInfo;
    use async_trait::async_trait;

    // Every URL containing "dead" is dead, everything else is active
    struct FakeProber;

    #[async_trait]
    impl Probe for FakeProber {
        async fn probe(&self, url: &str) -> ProbeResult {
            if url.contains("dead") {
                ProbeResult::dead(url, "connection refused")
            } else {
                ProbeResult::from_page(url, "<title>Fake</title>")
            }
        }
    }

    struct FakeSummarizer;

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn explain(&self, _: &BookmarkInfo) -> Result<String> {
            Err(Error::Summarizer("unused".to_string()))
        }

        async fn organize(&self, bookmarks: &[BookmarkInfo]) -> Result<String> {
            Ok(format!("{} bookmarks in one group", bookmarks.len()))
        }
    }

    fn context(dir: &std::path::Path, urls: &[&str]) -> WizardContext {
        let store = Arc::new(SnapshotStore::new(dir.join("bookmarks.json")));
        if !urls.is_empty() {
            let urls: Vec<String> = urls.iter().map(|s| s.to_string()).collect();
            store.save(&urls).unwrap();
        }

        WizardContext {
            store,
            prober: Arc::new(FakeProber),
            concurrency: 2,
            extension: ExtensionBundle::bundled(),
            download_path: dir.join("extension.zip"),
            summarizer: Some(Arc::new(FakeSummarizer)),
        }
    }

    #[tokio::test]
    async fn test_full_walkthrough() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), &["https://live.example", "https://dead.example"]);

        // extract, need extension, installed, sent, analyze, organize, back, quit
        let script: &[u8] = b"1\n2\n1\n1\n1\n2\n1\nq\n";
        let mut wizard = Wizard::new(ctx, script);
        wizard.run().await.unwrap();

        assert_eq!(wizard.state(), WizardState::Analyze);
        assert!(dir.path().join("extension.zip").exists());

        let buckets = wizard.last_analysis().unwrap();
        assert_eq!(buckets.active.len(), 1);
        assert_eq!(buckets.dead.len(), 1);
        assert_eq!(buckets.dead[0].status, ProbeStatus::Dead);
    }

    #[tokio::test]
    async fn test_no_bookmarks_sends_user_back() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), &[]);

        // extract, already installed, sent, try again, then input ends
        let script: &[u8] = b"1\n1\n1\n1\n";
        let mut wizard = Wizard::new(ctx, script);
        wizard.run().await.unwrap();

        assert_eq!(wizard.state(), WizardState::WaitForBookmarks);
        assert!(wizard.last_analysis().is_none());
        assert!(!dir.path().join("extension.zip").exists());
    }

    #[tokio::test]
    async fn test_unknown_choice_is_asked_again() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), &[]);

        let script: &[u8] = b"7\nhello\n1\nq\n";
        let mut wizard = Wizard::new(ctx, script);
        wizard.run().await.unwrap();

        assert_eq!(wizard.state(), WizardState::ExtensionCheck);
    }

    #[tokio::test]
    async fn test_organize_hidden_before_first_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), &["https://live.example"]);

        // "2" is not on the analyze menu until an analysis has run
        let script: &[u8] = b"1\n1\n1\n2\nq\n";
        let mut wizard = Wizard::new(ctx, script);
        wizard.run().await.unwrap();

        assert_eq!(wizard.state(), WizardState::Analyze);
        assert!(wizard.last_analysis().is_none());
    }
}
