//! Network collaborators: page content, video transcripts, and summaries.

mod page;
mod summary;
mod transcript;

use async_trait::async_trait;
use reqwest::Client;

pub use page::html_to_markdown;
pub use summary::{HttpSummarizer, SummaryConfig, SUMMARY_PROMPT};
pub use transcript::{extract_caption_tracks, parse_timed_text, CaptionTrack};

use crate::capture::ContentFetcher;
use crate::error::CaptureError;
use crate::models::{ContentKind, PageContent};

const USER_AGENT: &str = concat!("vault-capture/", env!("CARGO_PKG_VERSION"));

/// Whether `url` points at a video host whose transcript should be captured
/// instead of the page.
pub fn is_video_url(url: &str) -> bool {
    url.contains("youtube.com")
}

/// Fetches page markdown or, for video links, the caption transcript.
#[derive(Debug, Clone)]
pub struct HttpContentFetcher {
    client: Client,
}

impl HttpContentFetcher {
    pub fn new() -> Result<Self, CaptureError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Result<String, CaptureError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CaptureError::Fetch(format!("{} returned {}", url, status)));
        }
        Ok(response.text().await?)
    }

    async fn fetch_page(&self, url: &str) -> Result<String, CaptureError> {
        let html = self.get_text(url).await?;
        Ok(html_to_markdown(&html))
    }

    async fn fetch_transcript(&self, url: &str) -> Result<String, CaptureError> {
        let watch_page = self.get_text(url).await?;
        let tracks = extract_caption_tracks(&watch_page)?;
        let track = CaptionTrack::preferred(&tracks)
            .ok_or_else(|| CaptureError::Fetch("video has no captions".to_string()))?;
        tracing::debug!(language = %track.language_code, "Fetching captions");

        let timed_text = self.get_text(&track.base_url).await?;
        let lines = parse_timed_text(&timed_text);
        if lines.is_empty() {
            return Err(CaptureError::Fetch("caption track is empty".to_string()));
        }
        Ok(lines.join("\n"))
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, url: &str) -> Result<PageContent, CaptureError> {
        if is_video_url(url) {
            let body = self.fetch_transcript(url).await?;
            Ok(PageContent {
                kind: ContentKind::Transcript,
                body,
            })
        } else {
            let body = self.fetch_page(url).await?;
            Ok(PageContent {
                kind: ContentKind::Page,
                body,
            })
        }
    }
}
