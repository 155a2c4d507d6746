//! Option selection and simulated artifact generation.
//!
//! Filtering is a pure function of `(options, category)`. "Acquiring" an
//! option does not transfer any media: after a fixed delay it produces a
//! local text receipt describing the chosen tier. Replace
//! [`ArtifactGenerator::generate`] with a real fetch to back it with actual
//! downloads; the selection contract stays the same.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use crate::media::{DownloadOption, MediaRecord, OptionType};
use crate::utils::compile_static_regex;

/// Shown instead of an empty list when a category has no options.
pub const NO_OPTIONS_MESSAGE: &str = "No options available for this category.";

/// Default delay before a simulated artifact is ready.
pub const DEFAULT_ARTIFACT_DELAY_MS: u64 = 1500;

/// Maximum characters of the title kept in artifact filenames.
const FILENAME_TITLE_CHARS: usize = 30;

/// Numeric suffixes tried before falling back to a timestamp.
const MAX_NUMERIC_SUFFIX: u32 = 1000;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"[^A-Za-z0-9]"));

/// Returns the options of `category`, preserving their original order.
#[must_use]
pub fn filter_options(options: &[DownloadOption], category: OptionType) -> Vec<&DownloadOption> {
    options
        .iter()
        .filter(|option| option.option_type == category)
        .collect()
}

/// Rendered content of one category tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionView<'a> {
    /// Distinct "no options" affordance.
    Empty,
    /// Matching options in presentation order.
    Options(Vec<&'a DownloadOption>),
}

impl<'a> OptionView<'a> {
    #[must_use]
    pub fn for_category(options: &'a [DownloadOption], category: OptionType) -> Self {
        let matching = filter_options(options, category);
        if matching.is_empty() {
            Self::Empty
        } else {
            Self::Options(matching)
        }
    }
}

/// Display badge derived from a quality label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    UltraHd,
    Hd,
    Sd,
    HighAudio,
    Standard,
}

impl QualityTier {
    /// Classifies a quality label (`2160p (4K)`, `720p`, `320kbps (High)`, ...).
    #[must_use]
    pub fn classify(quality: &str) -> Self {
        let contains_any = |needles: &[&str]| needles.iter().any(|n| quality.contains(n));
        if contains_any(&["4K", "2160p"]) {
            Self::UltraHd
        } else if contains_any(&["1080p", "720p"]) {
            Self::Hd
        } else if contains_any(&["480p", "360p", "240p"]) {
            Self::Sd
        } else if quality.contains("320k") || quality.to_lowercase().contains("high") {
            Self::HighAudio
        } else {
            Self::Standard
        }
    }

    /// Short badge text, if the tier has one.
    #[must_use]
    pub fn badge(self) -> Option<&'static str> {
        match self {
            Self::UltraHd => Some("4K"),
            Self::Hd => Some("HD"),
            Self::HighAudio => Some("HQ"),
            Self::Sd | Self::Standard => None,
        }
    }
}

/// A locally synthesized placeholder offered in place of real media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub contents: String,
    pub mime_type: &'static str,
}

impl Artifact {
    /// Builds the receipt for `option` of `record`.
    #[must_use]
    pub fn receipt(record: &MediaRecord, option: &DownloadOption) -> Self {
        let contents = format!(
            "Media Download Receipt\n\nTitle: {}\nQuality: {}\nFormat: {}\nType: {}\n\n\
             (This file confirms the download action was successful.)",
            record.title, option.quality, option.format, option.option_type
        );
        Self {
            filename: artifact_filename(&record.title, option),
            contents,
            mime_type: "text/plain",
        }
    }

    /// Writes the artifact into `dir` without overwriting existing files.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be written, or
    /// [`io::ErrorKind::AlreadyExists`] when every candidate name is taken.
    pub fn save(&self, dir: &Path) -> io::Result<PathBuf> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.save_with_fallback(dir, timestamp)
    }

    fn save_with_fallback(&self, dir: &Path, timestamp: u64) -> io::Result<PathBuf> {
        for path in candidate_paths(dir, &self.filename, timestamp) {
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(error) if error.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(error) => return Err(error),
            };
            file.write_all(self.contents.as_bytes())?;
            debug!(path = %path.display(), bytes = self.contents.len(), "Saved artifact");
            return Ok(path);
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free filename left for '{}'", self.filename),
        ))
    }
}

/// Builds `{title}_{quality}.{format}` with the title reduced to ASCII
/// alphanumerics and truncated.
#[must_use]
pub fn artifact_filename(title: &str, option: &DownloadOption) -> String {
    let title: String = NON_ALPHANUMERIC
        .replace_all(title, "_")
        .chars()
        .take(FILENAME_TITLE_CHARS)
        .collect();
    let quality = sanitize_filename_component(&option.quality);
    let format = sanitize_filename_component(&option.format.to_lowercase());
    format!("{title}_{quality}.{format}")
}

fn sanitize_filename_component(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// `name.ext`, then `name_1.ext` .. `name_999.ext`, then `name_{timestamp}.ext`.
fn candidate_paths<'a>(
    dir: &'a Path,
    filename: &'a str,
    timestamp: u64,
) -> impl Iterator<Item = PathBuf> + 'a {
    let (stem, ext) = match filename.rfind('.') {
        Some(pos) => (&filename[..pos], &filename[pos..]),
        None => (filename, ""),
    };

    let numbered = (1..MAX_NUMERIC_SUFFIX).map(move |i| dir.join(format!("{stem}_{i}{ext}")));
    std::iter::once(dir.join(filename))
        .chain(numbered)
        .chain(std::iter::once(dir.join(format!("{stem}_{timestamp}{ext}"))))
}

/// Produces artifacts after a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactGenerator {
    delay: Duration,
}

impl ArtifactGenerator {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits for the configured delay, then builds the receipt.
    ///
    /// The wait is a local timer and does not interact with any resolution.
    pub async fn generate(&self, record: &MediaRecord, option: &DownloadOption) -> Artifact {
        tokio::time::sleep(self.delay).await;
        Artifact::receipt(record, option)
    }
}

impl Default for ArtifactGenerator {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_ARTIFACT_DELAY_MS))
    }
}

/// Errors from option acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// The index does not point at a visible option
    #[error("no option #{index} in category '{category}'")]
    NoSuchOption { index: usize, category: OptionType },

    /// Another option of this record is still generating
    #[error("option '{quality}' is still being prepared")]
    Busy { quality: String },
}

/// Per-record view: category tab plus at most one generating option.
#[derive(Debug)]
pub struct OptionSelector {
    record: Arc<MediaRecord>,
    category: OptionType,
    generating: Arc<Mutex<Option<usize>>>,
    generator: ArtifactGenerator,
}

impl OptionSelector {
    /// Creates a selector on the default `video_audio` category.
    #[must_use]
    pub fn new(record: Arc<MediaRecord>, generator: ArtifactGenerator) -> Self {
        Self {
            record,
            category: OptionType::default(),
            generating: Arc::new(Mutex::new(None)),
            generator,
        }
    }

    #[must_use]
    pub fn record(&self) -> &MediaRecord {
        &self.record
    }

    #[must_use]
    pub fn category(&self) -> OptionType {
        self.category
    }

    pub fn select_category(&mut self, category: OptionType) {
        self.category = category;
    }

    /// Options visible under the selected category.
    #[must_use]
    pub fn view(&self) -> OptionView<'_> {
        OptionView::for_category(&self.record.options, self.category)
    }

    /// The option currently being generated, if any.
    #[must_use]
    pub fn generating(&self) -> Option<&DownloadOption> {
        let index = (*self.generating.lock().unwrap_or_else(PoisonError::into_inner))?;
        self.record.options.get(index)
    }

    /// Generates the artifact for the `index`-th visible option (0-based).
    ///
    /// # Errors
    ///
    /// [`SelectError::NoSuchOption`] for an index outside the visible list,
    /// [`SelectError::Busy`] while another option is generating.
    pub async fn acquire(&self, index: usize) -> Result<Artifact, SelectError> {
        let (absolute, option) = self
            .record
            .options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.option_type == self.category)
            .nth(index)
            .ok_or(SelectError::NoSuchOption {
                index,
                category: self.category,
            })?;

        let _marker = GeneratingMarker::claim(&self.generating, absolute)
            .map_err(|busy| SelectError::Busy {
                quality: self
                    .record
                    .options
                    .get(busy)
                    .map(|o| o.quality.clone())
                    .unwrap_or_default(),
            })?;

        info!(quality = %option.quality, format = %option.format, "Preparing artifact");
        Ok(self.generator.generate(&self.record, option).await)
    }
}

/// Holds the "generating" slot; released on drop.
struct GeneratingMarker {
    slot: Arc<Mutex<Option<usize>>>,
}

impl GeneratingMarker {
    fn claim(slot: &Arc<Mutex<Option<usize>>>, index: usize) -> Result<Self, usize> {
        let mut current = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(busy) = *current {
            return Err(busy);
        }
        *current = Some(index);
        Ok(Self {
            slot: Arc::clone(slot),
        })
    }
}

impl Drop for GeneratingMarker {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
