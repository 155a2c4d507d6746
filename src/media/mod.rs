//! Canonical media record and download option model.
//!
//! [`MediaRecord`] is the resolved description of one piece of media. Its
//! wire shape is defined once in [`schema`] and shared by the outbound
//! request and the inbound validation step.

pub mod schema;

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

pub use schema::{SchemaViolation, response_schema, validate_against_schema};

/// Platform the media was resolved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    YouTube,
    Instagram,
    /// Terminal failure signal; never surfaced as a success.
    Unknown,
}

impl Platform {
    /// Every value accepted on the wire, in schema order.
    pub const ALL: [Platform; 3] = [Platform::YouTube, Platform::Instagram, Platform::Unknown];

    /// Returns the wire label for this platform.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::Instagram => "Instagram",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a download option, used to partition options into tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    /// Normal video with sound.
    #[default]
    VideoAudio,
    /// Muted video stream.
    VideoOnly,
    /// Music extraction.
    AudioOnly,
}

impl OptionType {
    /// Every category, in schema order.
    pub const ALL: [OptionType; 3] = [
        OptionType::VideoAudio,
        OptionType::VideoOnly,
        OptionType::AudioOnly,
    ];

    /// Category tabs in display order (Video, Music, Muted).
    pub const TABS: [OptionType; 3] = [
        OptionType::VideoAudio,
        OptionType::AudioOnly,
        OptionType::VideoOnly,
    ];

    /// Returns the wire label (`video_audio`, `video_only`, `audio_only`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VideoAudio => "video_audio",
            Self::VideoOnly => "video_only",
            Self::AudioOnly => "audio_only",
        }
    }

    /// Returns the tab label shown to users.
    #[must_use]
    pub fn tab_label(self) -> &'static str {
        match self {
            Self::VideoAudio => "Video",
            Self::AudioOnly => "Music",
            Self::VideoOnly => "Muted",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One synthetic quality/format tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOption {
    /// Quality label, e.g. `1080p` or `320kbps (High)`.
    pub quality: String,
    /// Free-form estimated size.
    pub size: String,
    /// Short container/codec label, e.g. `mp4`.
    pub format: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
}

/// A grounding source backing a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Citation {
    /// Label to display for this citation: the title, or the URI host when
    /// the title is absent or blank.
    #[must_use]
    pub fn display_label(&self) -> String {
        if let Some(title) = self.title.as_deref().map(str::trim)
            && !title.is_empty()
        {
            return title.to_string();
        }

        Url::parse(&self.uri)
            .ok()
            .and_then(|url| url.host_str().map(ToString::to_string))
            .unwrap_or_else(|| self.uri.clone())
    }
}

/// The resolved description of one piece of media.
///
/// Constructed once per successful resolution and never mutated afterwards;
/// the session shares it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub title: String,
    pub platform: Platform,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub thumbnail_url: String,
    /// Insertion order is presentation order.
    pub options: Vec<DownloadOption>,
    /// Attached by the normalizer from grounding metadata, never read from the payload.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Citation>>,
}

impl MediaRecord {
    /// Returns true when at least one citation is attached.
    ///
    /// Unset and empty `sources` are treated identically.
    #[must_use]
    pub fn has_sources(&self) -> bool {
        self.sources.as_ref().is_some_and(|sources| !sources.is_empty())
    }

    /// Returns attached citations, or an empty slice.
    #[must_use]
    pub fn sources(&self) -> &[Citation] {
        self.sources.as_deref().unwrap_or(&[])
    }
}
