//! CLI entry point for AetherLoad.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use aetherload_core::resolver::{
    DEFAULT_API_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MODEL, DEFAULT_READ_TIMEOUT_SECS,
};
use aetherload_core::{
    ArtifactGenerator, Connectivity, DEFAULT_ARTIFACT_DELAY_MS, FileConfig, GeminiResolver,
    LoadedConfig, OptionSelector, OptionType, ResolverSettings, SessionController, Status, View,
    load_config_from_path, load_default_file_config, probe_online, probe_target, spawn_monitor,
};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

mod cli;
mod output;
mod progress;

use cli::Args;

const EXIT_RESOLUTION_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_OFFLINE: u8 = 3;

/// Interval between connectivity re-probes while a resolution is pending.
const CONNECTIVITY_RECHECK_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => load_config_from_path(path),
        None => load_default_file_config(),
    };
    init_tracing(&args, loaded.as_ref().ok());

    match run(args, loaded).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

/// Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > info.
fn init_tracing(args: &Args, loaded: Option<&LoadedConfig>) {
    let config_level = loaded
        .and_then(|loaded| loaded.config.as_ref())
        .and_then(|config| config.verbosity)
        .map(|verbosity| verbosity.filter_directive());

    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => config_level.unwrap_or("info"),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(args: Args, loaded: Result<LoadedConfig>) -> Result<ExitCode> {
    let loaded = loaded?;
    if let Some(path) = loaded.path.as_deref() {
        debug!(path = %path.display(), from_file = loaded.loaded_from_file, "Configuration resolved");
    }
    let file_config = loaded.config_or_default();
    debug!(?args, "CLI arguments parsed");

    // Read input: from positional arg or stdin
    let (input, from_stdin) = match args.url.as_deref() {
        Some(url) => (url.to_string(), false),
        None if !io::stdin().is_terminal() => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read URL from stdin")?;
            (buffer, true)
        }
        None => (String::new(), false),
    };
    let url = input.trim().to_string();
    if url.is_empty() {
        output::print_quick_start_guidance(from_stdin);
        return Ok(ExitCode::SUCCESS);
    }

    let settings = resolver_settings(&args, &file_config);
    let connectivity = initial_connectivity(&args, &settings).await;
    if !connectivity.is_online() {
        output::print_lines(&output::offline_lines());
        return Ok(ExitCode::from(EXIT_OFFLINE));
    }

    let resolver = match GeminiResolver::new(settings.clone()) {
        Ok(resolver) => resolver,
        Err(error) => {
            warn!(kind = %error.kind(), error = %error, "Resolver unavailable");
            output::print_lines(&output::error_lines(error.user_message()));
            return Ok(ExitCode::from(EXIT_RESOLUTION_FAILED));
        }
    };

    let monitor = (!args.skip_connectivity_check)
        .then(|| probe_target(&settings.base_url))
        .flatten()
        .map(|(host, port)| {
            spawn_monitor(
                connectivity.clone(),
                host,
                port,
                CONNECTIVITY_RECHECK_INTERVAL,
            )
        });

    let controller = SessionController::new(Arc::new(resolver), connectivity);
    let snapshots = controller.subscribe();
    let Some(pending) = controller.submit(&url) else {
        output::print_lines(&output::offline_lines());
        return Ok(ExitCode::from(EXIT_OFFLINE));
    };

    let use_spinner = !args.quiet && io::stderr().is_terminal();
    let spinner = progress::spawn_analyzing_spinner(use_spinner, &url, snapshots);
    let applied = pending.await.context("Resolution task failed")?;
    spinner.finish().await;
    if let Some(monitor) = monitor {
        monitor.abort();
    }
    debug!(applied, "Resolution finished");

    let snapshot = match controller.view() {
        View::Offline => {
            output::print_lines(&output::offline_lines());
            return Ok(ExitCode::from(EXIT_OFFLINE));
        }
        View::Interactive(snapshot) => snapshot,
    };

    let category = OptionType::from(args.category);
    let record = match (snapshot.status, snapshot.record) {
        (Status::Success, Some(record)) => record,
        _ => {
            let message = snapshot
                .error
                .unwrap_or_else(|| aetherload_core::resolver::GENERIC_FAILURE_MESSAGE.to_string());
            output::print_lines(&output::error_lines(&message));
            return Ok(ExitCode::from(EXIT_RESOLUTION_FAILED));
        }
    };
    output::print_lines(&output::record_lines(
        &record,
        category,
        output::terminal_width(),
    ));

    let Some(position) = args.acquire else {
        return Ok(ExitCode::SUCCESS);
    };

    let delay_ms = args
        .artifact_delay_ms
        .or(file_config.artifact_delay_ms)
        .unwrap_or(DEFAULT_ARTIFACT_DELAY_MS);
    let mut selector =
        OptionSelector::new(record, ArtifactGenerator::new(Duration::from_millis(delay_ms)));
    selector.select_category(category);

    let index = usize::try_from(position.saturating_sub(1)).unwrap_or(usize::MAX);
    let quality = selector
        .record()
        .options
        .iter()
        .filter(|option| option.option_type == category)
        .nth(index)
        .map(|option| option.quality.clone())
        .unwrap_or_default();

    let spinner = progress::spawn_generating_spinner(use_spinner, &quality);
    let outcome = selector.acquire(index).await;
    spinner.finish().await;

    let artifact = match outcome {
        Ok(artifact) => artifact,
        Err(error) => {
            eprintln!("Error: {error}");
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };

    let output_dir = args
        .output_dir
        .or(file_config.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!(
            "Failed to create output directory '{}'",
            output_dir.display()
        )
    })?;
    let path = artifact
        .save(&output_dir)
        .with_context(|| format!("Failed to save {}", artifact.filename))?;
    info!(path = %path.display(), "Receipt saved");
    println!("{}", output::artifact_saved_line(&artifact, &path));

    Ok(ExitCode::SUCCESS)
}

/// CLI flags take precedence over file values, which take precedence over defaults.
fn resolver_settings(args: &Args, file: &FileConfig) -> ResolverSettings {
    ResolverSettings {
        base_url: args
            .api_base
            .clone()
            .or_else(|| file.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        model: args
            .model
            .clone()
            .or_else(|| file.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        api_key: file.api_key.clone(),
        connect_timeout: Duration::from_secs(
            file.connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        ),
        read_timeout: Duration::from_secs(
            file.read_timeout_secs.unwrap_or(DEFAULT_READ_TIMEOUT_SECS),
        ),
    }
}

async fn initial_connectivity(args: &Args, settings: &ResolverSettings) -> Connectivity {
    if args.skip_connectivity_check {
        return Connectivity::online();
    }
    let Some((host, port)) = probe_target(&settings.base_url) else {
        warn!(base_url = %settings.base_url, "Cannot derive a probe target; assuming online");
        return Connectivity::online();
    };
    let online = probe_online(&host, port, settings.connect_timeout).await;
    debug!(host = %host, port, online, "Initial connectivity probe");
    Connectivity::new(online)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_settings_prefers_cli_over_file() {
        let args = Args::try_parse_from([
            "aetherload",
            "--model",
            "cli-model",
            "https://youtu.be/abc123",
        ])
        .unwrap();
        let file = FileConfig {
            model: Some("file-model".to_string()),
            api_base_url: Some("http://127.0.0.1:9000".to_string()),
            read_timeout_secs: Some(5),
            ..FileConfig::default()
        };

        let settings = resolver_settings(&args, &file);
        assert_eq!(settings.model, "cli-model");
        assert_eq!(settings.base_url, "http://127.0.0.1:9000");
        assert_eq!(settings.read_timeout, Duration::from_secs(5));
        assert_eq!(
            settings.connect_timeout,
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_resolver_settings_defaults_without_file() {
        let args = Args::try_parse_from(["aetherload"]).unwrap();
        let settings = resolver_settings(&args, &FileConfig::default());
        assert_eq!(settings.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert!(settings.api_key.is_none());
    }

    #[tokio::test]
    async fn test_skip_flag_assumes_online() {
        let args = Args::try_parse_from([
            "aetherload",
            "--skip-connectivity-check",
            "--api-base",
            "http://127.0.0.1:1",
        ])
        .unwrap();
        let settings = resolver_settings(&args, &FileConfig::default());
        assert!(initial_connectivity(&args, &settings).await.is_online());
    }
}
