//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use aetherload_core::OptionType;
use clap::{Parser, ValueEnum};

/// Resolve a YouTube or Instagram link into a structured media description.
///
/// AetherLoad asks a search-grounded generative service for the title,
/// author, thumbnail and a catalog of download options, then renders them
/// by category.
#[derive(Parser, Debug)]
#[command(name = "aetherload")]
#[command(author, version, about)]
pub struct Args {
    /// Media URL to analyze (reads stdin when omitted and piped)
    pub url: Option<String>,

    /// Category tab to show
    #[arg(short = 'c', long, value_enum, default_value_t = CategoryArg::Video)]
    pub category: CategoryArg,

    /// Generate the receipt for the N-th option of the selected category (1-based)
    #[arg(short = 'a', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub acquire: Option<u32>,

    /// Directory to save acquired receipts into (default: current directory)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Model identifier to query
    #[arg(long)]
    pub model: Option<String>,

    /// Service base URL
    #[arg(long = "api-base")]
    pub api_base: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Simulated receipt generation delay in milliseconds (max 60000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub artifact_delay_ms: Option<u64>,

    /// Assume the network is reachable instead of probing the service host
    #[arg(long)]
    pub skip_connectivity_check: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Category tab names as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    /// Video with audio
    Video,
    /// Audio only
    Music,
    /// Video without audio
    Muted,
}

impl From<CategoryArg> for OptionType {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Video => OptionType::VideoAudio,
            CategoryArg::Music => OptionType::AudioOnly,
            CategoryArg::Muted => OptionType::VideoOnly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["aetherload"]).unwrap();
        assert!(args.url.is_none());
        assert_eq!(args.category, CategoryArg::Video);
        assert!(args.acquire.is_none());
        assert!(!args.skip_connectivity_check);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_positional_url() {
        let args = Args::try_parse_from(["aetherload", "https://youtu.be/abc123"]).unwrap();
        assert_eq!(args.url.as_deref(), Some("https://youtu.be/abc123"));
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["aetherload", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["aetherload", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["aetherload", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["aetherload", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["aetherload", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_category_maps_to_option_type() {
        let args = Args::try_parse_from(["aetherload", "-c", "music"]).unwrap();
        assert_eq!(OptionType::from(args.category), OptionType::AudioOnly);

        let args = Args::try_parse_from(["aetherload", "--category", "muted"]).unwrap();
        assert_eq!(OptionType::from(args.category), OptionType::VideoOnly);

        assert_eq!(OptionType::from(CategoryArg::Video), OptionType::VideoAudio);
    }

    #[test]
    fn test_cli_unknown_category_rejected() {
        let err = Args::try_parse_from(["aetherload", "-c", "podcast"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_cli_acquire_is_one_based() {
        let args = Args::try_parse_from(["aetherload", "-a", "1"]).unwrap();
        assert_eq!(args.acquire, Some(1));

        let err = Args::try_parse_from(["aetherload", "-a", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_artifact_delay_over_max_rejected() {
        let err = Args::try_parse_from(["aetherload", "--artifact-delay-ms", "60001"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_service_overrides() {
        let args = Args::try_parse_from([
            "aetherload",
            "--model",
            "gemini-2.5-flash",
            "--api-base",
            "http://127.0.0.1:9000",
            "--config",
            "/tmp/aetherload.toml",
            "-o",
            "/tmp/out",
            "--skip-connectivity-check",
        ])
        .unwrap();
        assert_eq!(args.model.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(args.api_base.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/aetherload.toml")));
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/out")));
        assert!(args.skip_connectivity_check);
    }
}
