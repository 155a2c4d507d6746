//! File configuration for resolver and CLI defaults.
//!
//! The file is a flat list of `key = value` lines. Strings are
//! double-quoted, integers are bare, and `#` starts a comment outside of
//! strings. Unknown keys are rejected so typos surface early.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Parsed configuration file. Every field is optional; unset fields fall
/// back to CLI defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Credential for the generative-search service.
    pub api_key: Option<String>,
    /// Model identifier used in the request path.
    pub model: Option<String>,
    /// Service base URL (scheme and host, optional port).
    pub api_base_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
    /// Simulated artifact generation delay.
    pub artifact_delay_ms: Option<u64>,
    /// Directory where acquired artifacts are saved.
    pub output_dir: Option<PathBuf>,
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending key.
    pub fn validate(&self) -> Result<()> {
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;

        if let Some(delay) = self.artifact_delay_ms
            && delay > 60_000
        {
            bail!("Invalid config value for `artifact_delay_ms`: {delay}. Expected range: 0..=60000");
        }

        if let Some(base) = self.api_base_url.as_deref()
            && url::Url::parse(base).map_or(true, |url| !url.has_host())
        {
            bail!("Invalid config value for `api_base_url`: '{base}'. Expected an absolute URL");
        }

        if let Some(model) = self.model.as_deref()
            && model.trim().is_empty()
        {
            bail!("Invalid config value for `model`: must not be empty");
        }

        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }

    /// Log filter directive for this setting.
    #[must_use]
    pub fn filter_directive(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose | Self::Debug => "debug",
            Self::Quiet => "error",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
    pub loaded_from_file: bool,
}

impl LoadedConfig {
    /// Parsed config, or an empty one when no file was loaded.
    #[must_use]
    pub fn config_or_default(&self) -> FileConfig {
        self.config.clone().unwrap_or_default()
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/aetherload/config.toml`
/// 2. `$HOME/.config/aetherload/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("aetherload")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("aetherload")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    match path.as_deref() {
        Some(existing) if existing.exists() => {
            let config = load_file_config(existing)?;
            Ok(LoadedConfig {
                path,
                config: Some(config),
                loaded_from_file: true,
            })
        }
        _ => Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        }),
    }
}

/// Loads config from an explicit path, which must exist.
///
/// # Errors
///
/// Returns an error when the file is missing, unreadable or invalid.
pub fn load_config_from_path(path: &Path) -> Result<LoadedConfig> {
    let config = load_file_config(path)?;
    Ok(LoadedConfig {
        path: Some(path.to_path_buf()),
        config: Some(config),
        loaded_from_file: true,
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "api_key" => cfg.api_key = Some(parse_string_literal(value).with_context(invalid)?),
            "model" => cfg.model = Some(parse_string_literal(value).with_context(invalid)?),
            "api_base_url" => {
                cfg.api_base_url = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "artifact_delay_ms" => {
                cfg.artifact_delay_ms = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "output_dir" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.output_dir = Some(PathBuf::from(parsed));
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
model = "gemini-2.5-flash"
verbosity = "verbose"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.model.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert!(cfg.api_key.is_none());
        assert!(cfg.output_dir.is_none());
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
api_key = "secret-value"
model = "gemini-3-flash-preview"
api_base_url = "http://127.0.0.1:9000"
connect_timeout_secs = 5
read_timeout_secs = 90
artifact_delay_ms = 0
output_dir = "/tmp/receipts"
verbosity = "quiet"
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.api_key.as_deref(), Some("secret-value"));
        assert_eq!(cfg.api_base_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(cfg.connect_timeout_secs, Some(5));
        assert_eq!(cfg.read_timeout_secs, Some(90));
        assert_eq!(cfg.artifact_delay_ms, Some(0));
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/tmp/receipts")));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Quiet));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
read_timeout_secs = 30 # slow networks
api_key = "abc#def" # hash inside string is kept
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.read_timeout_secs, Some(30));
        assert_eq!(cfg.api_key.as_deref(), Some("abc#def"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err = parse_config_str("connect_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("connect_timeout_secs"));

        let err = parse_config_str("read_timeout_secs = 3601").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_excessive_artifact_delay() {
        let err = parse_config_str("artifact_delay_ms = 60001").expect_err("delay above range");
        assert!(err.to_string().contains("artifact_delay_ms"));
    }

    #[test]
    fn test_parse_config_rejects_relative_base_url() {
        let err = parse_config_str(r#"api_base_url = "localhost""#).expect_err("not absolute");
        assert!(err.to_string().contains("api_base_url"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("model = gemini").expect_err("unquoted string");
        assert!(format!("{err:#}").contains("model"));
    }

    #[test]
    fn test_parse_config_rejects_numeric_values_with_trailing_tokens() {
        let err = parse_config_str("read_timeout_secs = 4 trailing")
            .expect_err("expected trailing token error");
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("concurrency = 4").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("model").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_verbosity_labels_and_filters() {
        assert_eq!(VerbositySetting::Default.as_str(), "default");
        assert_eq!(VerbositySetting::Debug.as_str(), "debug");
        assert_eq!(VerbositySetting::Quiet.filter_directive(), "error");
        assert_eq!(VerbositySetting::Verbose.filter_directive(), "debug");
        assert_eq!(VerbositySetting::Default.filter_directive(), "info");
    }

    #[test]
    fn test_load_config_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "artifact_delay_ms = 250\n").unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        assert!(loaded.loaded_from_file);
        assert_eq!(loaded.config_or_default().artifact_delay_ms, Some(250));
    }

    #[test]
    fn test_load_config_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
