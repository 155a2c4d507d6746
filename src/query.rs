//! Request construction from raw user input.
//!
//! [`build_request`] is pure: it validates the pasted URL and assembles the
//! immutable [`ResolutionRequest`] (target URL, output schema, instruction)
//! without touching the network.

use serde_json::Value;

use crate::media::response_schema;
use crate::resolver::ResolveError;

/// Label the service is asked to use for the 4K tier.
pub const UHD_TIER_LABEL: &str = "2160p (4K)";

/// Standard HD tiers required in the `video_audio` category.
pub const HD_TIERS: [&str; 2] = ["1080p", "720p"];

/// SD / low-data tiers required in the `video_audio` category.
pub const SD_TIERS: [&str; 3] = ["480p", "360p", "240p"];

/// Audio tiers required in the `audio_only` category.
pub const AUDIO_TIERS: [&str; 2] = ["320kbps (High)", "128kbps (Standard)"];

/// A fully specified resolution request for one URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionRequest {
    url: String,
    schema: Value,
    instruction: String,
}

impl ResolutionRequest {
    /// The trimmed target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The structured-output schema the service must follow.
    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// The natural-language instruction payload.
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }
}

/// Builds a [`ResolutionRequest`] for a raw, possibly untrimmed URL string.
///
/// # Errors
///
/// Returns [`ResolveError::EmptyInput`] when the trimmed input is empty.
pub fn build_request(raw_url: &str) -> Result<ResolutionRequest, ResolveError> {
    let url = raw_url.trim();
    if url.is_empty() {
        return Err(ResolveError::EmptyInput);
    }

    Ok(ResolutionRequest {
        url: url.to_string(),
        schema: response_schema(),
        instruction: build_instruction(url),
    })
}

fn build_instruction(url: &str) -> String {
    let hd = HD_TIERS.join(", ");
    let sd = SD_TIERS.join(", ");
    let [audio_high, audio_standard] = AUDIO_TIERS;

    format!(
        "I need you to act as a backend service for a media downloader.\n\
         \n\
         1. USE GOOGLE SEARCH to find the ACTUAL details for this specific URL: {url}\n\
         2. Extract the real Video Title, Channel/Author Name, and Duration.\n\
         3. Find the real Thumbnail URL.\n\
         \x20  - If it's YouTube, use the standard maxresdefault format if possible or the one found in search.\n\
         \x20  - If it's Instagram, find the image source.\n\
         4. Generate a COMPREHENSIVE list of download options.\n\
         \x20  - CRITICAL: If the video is high quality (HD), YOU MUST INCLUDE a '{UHD_TIER_LABEL}' option in the 'video_audio' list.\n\
         \x20  - Include standard HD options: {hd}.\n\
         \x20  - Include SD/Low Data options: {sd}.\n\
         \x20  - For 'audio_only', include '{audio_high}' and '{audio_standard}'.\n\
         \x20  - Estimate realistic file sizes (e.g. 4K is large, 240p is small).\n\
         \n\
         Return ONLY the JSON object matching the schema."
    )
}
