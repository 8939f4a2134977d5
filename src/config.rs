use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "RAIS_DASHBOARD_CONFIG";
/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "RAIS_DATA_DIR";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Parser)]
#[command(author, version, about = "RAIS microelectronics dashboard")]
pub struct CliArgs {
    /// JSON config file.
    #[arg(long, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,
    /// Directory holding the .xlsx files; overrides the config file.
    #[arg(long, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory holding the four `.xlsx` files.
    pub data_dir: PathBuf,
    /// Initial N of the "Top N" locality mode.
    pub default_top_n: usize,
    /// Localities pre-selected when switching to manual mode.
    pub manual_default: usize,
    /// Maximum rows of the heatmap.
    pub heatmap_rows: usize,
    /// Maximum bars of the ranking and change charts.
    pub ranking_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            default_top_n: 10,
            manual_default: 5,
            heatmap_rows: 15,
            ranking_rows: 15,
        }
    }
}

impl AppConfig {
    /// Read a JSON config file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Configuration for the running process: command line, then environment.
    pub fn from_env_and_args() -> Result<Self> {
        Self::resolve(CliArgs::parse())
    }

    /// Merge the parsed command line with the config file it points at.
    ///
    /// Precedence for the data directory: `--data-dir` (or `RAIS_DATA_DIR`),
    /// the config file, the default. A config file that does not exist is
    /// reported and ignored.
    pub fn resolve(args: CliArgs) -> Result<Self> {
        let mut config = match args.config {
            Some(path) if path.exists() => Self::from_json_file(&path)?,
            Some(path) => {
                log::warn!("config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        if let Some(dir) = args.data_dir {
            config.data_dir = dir;
        }
        config.default_top_n = config.default_top_n.max(1);
        log::debug!("configuration: {config:?}");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> std::result::Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("rais-dashboard").chain(list.iter().copied()))
    }

    #[test]
    fn defaults_without_input() {
        let config = AppConfig::resolve(CliArgs::default()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.json");
        std::fs::write(&path, r#"{ "heatmap_rows": 8, "data_dir": "/srv/rais" }"#).unwrap();

        let args = parse(&["--config", path.to_str().unwrap()]).unwrap();
        let config = AppConfig::resolve(args).unwrap();
        assert_eq!(config.heatmap_rows, 8);
        assert_eq!(config.data_dir, PathBuf::from("/srv/rais"));
        assert_eq!(config.ranking_rows, 15);
    }

    #[test]
    fn data_dir_flag_beats_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.json");
        std::fs::write(&path, r#"{ "data_dir": "/from/file" }"#).unwrap();

        let flag = format!("--config={}", path.display());
        let args = parse(&[flag.as_str(), "--data-dir=/from/args"]).unwrap();
        assert_eq!(args.data_dir.as_deref(), Some(Path::new("/from/args")));
        let config = AppConfig::resolve(args).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/from/args"));
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let args = parse(&["--config", "/nonexistent/dash.json"]).unwrap();
        assert_eq!(AppConfig::resolve(args).unwrap(), AppConfig::default());
    }

    #[test]
    fn top_n_is_at_least_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.json");
        std::fs::write(&path, r#"{ "default_top_n": 0 }"#).unwrap();
        let args = CliArgs {
            config: Some(path),
            data_dir: None,
        };
        assert_eq!(AppConfig::resolve(args).unwrap().default_top_n, 1);
    }

    #[test]
    fn bad_arguments_are_errors() {
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["--data-dir"]).is_err());
    }

    #[test]
    fn unknown_config_fields_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.json");
        std::fs::write(&path, r#"{ "colour": "red" }"#).unwrap();
        assert!(AppConfig::from_json_file(&path).is_err());
    }
}
