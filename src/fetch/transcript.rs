//! YouTube caption extraction.
//!
//! The watch page embeds its player response, which lists caption tracks under
//! `"captionTracks"`. Each track's `baseUrl` serves timed-text XML; the timing
//! attributes are dropped and only caption text is kept.

use std::sync::OnceLock;

use regex::Regex;
use scraper::Html;
use serde::Deserialize;

use crate::error::CaptureError;

const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub language_code: String,
    /// `"asr"` for auto-generated captions.
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_english(&self) -> bool {
        self.language_code == "en" || self.language_code.starts_with("en-")
    }

    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    /// Manual English captions, then generated English, then whatever comes first.
    pub fn preferred(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
        tracks
            .iter()
            .find(|t| t.is_english() && !t.is_generated())
            .or_else(|| tracks.iter().find(|t| t.is_english()))
            .or_else(|| tracks.first())
    }
}

/// Pull the caption track list out of a watch page.
pub fn extract_caption_tracks(watch_page: &str) -> Result<Vec<CaptionTrack>, CaptureError> {
    let start = watch_page
        .find(CAPTION_TRACKS_KEY)
        .map(|idx| idx + CAPTION_TRACKS_KEY.len())
        .ok_or_else(|| CaptureError::Fetch("video has no captions".to_string()))?;

    // The track list is followed by the rest of the player response; only the
    // leading array is parsed.
    let mut values = serde_json::Deserializer::from_str(&watch_page[start..])
        .into_iter::<Vec<CaptionTrack>>();
    match values.next() {
        Some(Ok(tracks)) => Ok(tracks),
        Some(Err(e)) => Err(CaptureError::Fetch(format!(
            "malformed caption track list: {}",
            e
        ))),
        None => Err(CaptureError::Fetch(
            "malformed caption track list".to_string(),
        )),
    }
}

fn text_element() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>").expect("valid regex"))
}

/// Caption lines from a timed-text XML document, in order.
pub fn parse_timed_text(xml: &str) -> Vec<String> {
    text_element()
        .captures_iter(xml)
        .filter_map(|caps| {
            // Caption text arrives escaped twice (`&amp;#39;`).
            let text = decode_entities(&decode_entities(&caps[1]));
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then_some(text)
        })
        .collect()
}

fn decode_entities(text: &str) -> String {
    Html::parse_fragment(text).root_element().text().collect()
}
