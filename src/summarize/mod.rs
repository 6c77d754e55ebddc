// src/summarize/mod.rs
// =============================================================================
// This module asks a language model about the bookmarks.
//
// Two questions:
// - explain: "what is this bookmark?" for one bookmark, attached to its result
// - organize: "how would you group these?" for the whole list, as free text
//
// Only (url, title, description) is sent. Whatever text comes back is shown
// as-is; nothing here tries to parse it.
// =============================================================================

mod client;

pub use client::{ChatClient, ChatMessage, ChatRequest};

use crate::checker::ProbeResult;
use crate::config::SummarizerConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

/// The part of a probe result the model gets to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkInfo {
    pub url: String,
    pub title: String,
    pub description: String,
}

impl From<&ProbeResult> for BookmarkInfo {
    fn from(result: &ProbeResult) -> Self {
        Self {
            url: result.url.clone(),
            title: result.title.clone(),
            description: result.description.clone(),
        }
    }
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// A short explanation of a single bookmark
    async fn explain(&self, bookmark: &BookmarkInfo) -> Result<String>;

    /// A suggested grouping of all bookmarks
    async fn organize(&self, bookmarks: &[BookmarkInfo]) -> Result<String>;
}

const SYSTEM_PROMPT: &str =
    "You help people make sense of their browser bookmarks. Answer briefly and in plain text.";

pub struct ChatSummarizer {
    client: ChatClient,
    model: String,
}

impl ChatSummarizer {
    pub fn new(client: ChatClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    /// Builds a summarizer from config, reading the API key from the
    /// configured environment variable
    pub fn from_config(config: &SummarizerConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            Error::Summarizer(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;

        let client = ChatClient::new(&api_key, &config.base_url, config.timeout())?;
        Ok(Self::new(client, &config.model))
    }

    async fn ask(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            temperature: Some(0.3),
        };

        let answer = self.client.complete(&request).await?;
        Ok(answer.trim().to_string())
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    async fn explain(&self, bookmark: &BookmarkInfo) -> Result<String> {
        self.ask(explain_prompt(bookmark)).await
    }

    async fn organize(&self, bookmarks: &[BookmarkInfo]) -> Result<String> {
        if bookmarks.is_empty() {
            return Ok(String::new());
        }
        self.ask(organize_prompt(bookmarks)).await
    }
}

fn explain_prompt(bookmark: &BookmarkInfo) -> String {
    format!(
        "In one or two sentences, explain what this page is and why someone might have bookmarked it.\n\
         URL: {}\nTitle: {}\nDescription: {}",
        bookmark.url, bookmark.title, bookmark.description
    )
}

fn organize_prompt(bookmarks: &[BookmarkInfo]) -> String {
    let listing: Vec<String> = bookmarks
        .iter()
        .enumerate()
        .map(|(i, b)| format!("{}. {} | {} | {}", i + 1, b.url, b.title, b.description))
        .collect();

    format!(
        "Group these bookmarks into a handful of categories. Give each category a short \
         heading and list the bookmark numbers under it.\n\n{}",
        listing.join("\n")
    )
}

/// Asks for an explanation of every result and stores it on the result.
///
/// A failed request is logged and leaves that result's explanation empty;
/// the other results are unaffected.
pub async fn attach_explanations<'a, I>(summarizer: &dyn Summarizer, results: I, concurrency: usize)
where
    I: IntoIterator<Item = &'a mut ProbeResult>,
{
    stream::iter(results)
        .for_each_concurrent(concurrency.max(1), |result| async move {
            let info = BookmarkInfo::from(&*result);
            match summarizer.explain(&info).await {
                Ok(text) => result.explanation = Some(text),
                Err(e) => log::warn!("Could not explain {}: {}", result.url, e),
            }
        })
        .await;
}

/// Asks for a grouping of all results
pub async fn organize(summarizer: &dyn Summarizer, results: &[ProbeResult]) -> Result<String> {
    let infos: Vec<BookmarkInfo> = results.iter().map(BookmarkInfo::from).collect();
    summarizer.organize(&infos).await
}
