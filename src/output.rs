//! Terminal rendering of session views.
//!
//! Every renderer returns lines so the layout can be tested without a
//! terminal; the `print_*` helpers write them to stdout.

use std::path::Path;

use aetherload_core::resolver::EMPTY_INPUT_MESSAGE;
use aetherload_core::{
    Artifact, MediaRecord, NO_OPTIONS_MESSAGE, OptionType, OptionView, QualityTier,
};

/// Message when no input was provided at all.
pub const NO_INPUT_GUIDANCE: &str = EMPTY_INPUT_MESSAGE;

/// Message when stdin was piped but empty.
pub const EMPTY_STDIN_GUIDANCE: &str =
    "Received empty stdin input. Pipe a YouTube or Instagram link, or pass it as an argument.";

/// Example for passing the URL as an argument.
pub const INPUT_ARG_EXAMPLE: &str = "Example: aetherload https://youtu.be/dQw4w9WgXcQ";

/// Example for piping input.
pub const INPUT_PIPE_EXAMPLE: &str =
    "Example: echo 'https://www.instagram.com/reel/xyz/' | aetherload -c music";

/// Headline of the reduced offline view.
pub const OFFLINE_HEADLINE: &str = "You are offline";

pub const OFFLINE_HINT: &str = "Check your internet connection and try again.";

/// Shown when a record carries no citations (unset and empty alike).
pub const NO_SOURCES_MESSAGE: &str = "No sources cited.";

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return "…".to_string();
    }

    let mut output: String = text.chars().take(width - 1).collect();
    output.push('…');
    output
}

/// Quick-start guidance (headline + examples), truncated to width.
pub fn quick_start_guidance_lines(empty_stdin: bool, width: usize) -> Vec<String> {
    let headline = if empty_stdin {
        EMPTY_STDIN_GUIDANCE
    } else {
        NO_INPUT_GUIDANCE
    };

    [headline, INPUT_ARG_EXAMPLE, INPUT_PIPE_EXAMPLE]
        .iter()
        .map(|line| truncate_to_width(line, width))
        .collect()
}

pub fn print_quick_start_guidance(empty_stdin: bool) {
    print_lines(&quick_start_guidance_lines(
        empty_stdin,
        terminal_width().min(80),
    ));
}

pub fn offline_lines() -> Vec<String> {
    vec![OFFLINE_HEADLINE.to_string(), OFFLINE_HINT.to_string()]
}

pub fn error_lines(message: &str) -> Vec<String> {
    vec![format!("Error: {message}")]
}

/// Renders a resolved record with the `category` tab selected.
pub fn record_lines(record: &MediaRecord, category: OptionType, width: usize) -> Vec<String> {
    let mut lines = vec![truncate_to_width(&record.title, width)];

    let mut byline = format!("{} | {}", record.platform, record.author);
    if let Some(duration) = record.duration.as_deref().filter(|d| !d.trim().is_empty()) {
        byline.push_str(" | ");
        byline.push_str(duration);
    }
    lines.push(truncate_to_width(&byline, width));
    lines.push(truncate_to_width(
        &format!("Thumbnail: {}", record.thumbnail_url),
        width,
    ));

    lines.push(String::new());
    if record.has_sources() {
        lines.push("Sources:".to_string());
        for citation in record.sources() {
            lines.push(truncate_to_width(
                &format!("  - {} <{}>", citation.display_label(), citation.uri),
                width,
            ));
        }
    } else {
        lines.push(NO_SOURCES_MESSAGE.to_string());
    }

    lines.push(String::new());
    lines.push(tab_bar(category));
    match OptionView::for_category(&record.options, category) {
        OptionView::Empty => lines.push(format!("  {NO_OPTIONS_MESSAGE}")),
        OptionView::Options(options) => {
            for (position, option) in options.iter().enumerate() {
                let mut row = format!(
                    "  {:>2}. {:<20} {:<5} {}",
                    position + 1,
                    option.quality,
                    option.format.to_uppercase(),
                    option.size
                );
                if let Some(badge) = QualityTier::classify(&option.quality).badge() {
                    row.push_str(&format!("  [{badge}]"));
                }
                lines.push(truncate_to_width(&row, width));
            }
        }
    }
    lines
}

fn tab_bar(selected: OptionType) -> String {
    OptionType::TABS
        .iter()
        .map(|tab| {
            if *tab == selected {
                format!("[{}]", tab.tab_label())
            } else {
                format!(" {} ", tab.tab_label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn artifact_saved_line(artifact: &Artifact, path: &Path) -> String {
    format!(
        "Saved {} ({}, {} bytes) to {}",
        artifact.filename,
        artifact.mime_type,
        artifact.contents.len(),
        path.display()
    )
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
