//! Settings file and environment overrides.
//!
//! Values are layered lowest to highest: built-in defaults, the TOML file,
//! `RGET_*` environment variables, then command-line flags.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use rget_fetch::{Backoff, ResumeOptions};
use serde::Deserialize;

use crate::args::Args;

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_READ_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    #[default]
    Constant,
    Exponential,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub chunk_size:           Option<u64>,
    pub partial_ext:          Option<String>,
    pub range_unit:           Option<String>,
    pub download_dir:         Option<PathBuf>,
    pub retry_delay_ms:       Option<u64>,
    pub backoff:              BackoffKind,
    pub server_error_retries: Option<u32>,
    pub stall_check_interval: Option<u32>,
    pub connect_timeout_ms:   Option<u64>,
    pub read_timeout_ms:      Option<u64>,
    pub debug:                bool,
    pub headers:              BTreeMap<String, String>,
}

impl FileConfig {
    /// Reads `path` (a missing file is not an error) and `RGET_*` variables.
    pub fn load(path: &Path) -> Result<Self, figment::Error> {
        Self::from_figment(Figment::new().merge(Toml::file(path)).merge(Env::prefixed("RGET_")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> { figment.extract() }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.unwrap_or(DEFAULT_READ_TIMEOUT_MS))
    }
}

/// Builds the per-download options, letting flags win over the file.
pub fn resume_options(args: &Args, file: &FileConfig) -> ResumeOptions {
    let mut options = ResumeOptions::default();

    if let Some(chunk_size) = args.chunk_size.or(file.chunk_size) {
        options = options.chunk_size(chunk_size);
    }
    if let Some(path) = &args.output {
        options = options.file_path(path.clone());
    }
    if let Some(ext) = args.partial_ext.as_ref().or(file.partial_ext.as_ref()) {
        options = options.partial_ext(ext.clone());
    }
    if let Some(unit) = args.range_unit.as_ref().or(file.range_unit.as_ref()) {
        options = options.range_unit(unit.clone());
    }
    if let Some(dir) = args.download_dir.as_ref().or(file.download_dir.as_ref()) {
        options = options.download_dir(dir.clone());
    }
    if let Some(delay) = args.retry_delay_ms.or(file.retry_delay_ms) {
        let delay = Duration::from_millis(delay);
        options = options.backoff(match file.backoff {
            BackoffKind::Constant => Backoff::Constant(delay),
            BackoffKind::Exponential => Backoff::Exponential(delay),
        });
    }
    if let Some(retries) = args.server_error_retries.or(file.server_error_retries) {
        options = options.server_error_retries(retries);
    }
    if let Some(interval) = file.stall_check_interval {
        options = options.stall_check_interval(interval);
    }

    let mut headers: Vec<(String, String)> = file
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    headers.extend(args.headers.iter().cloned());

    options
        .headers(headers)
        .debug(args.debug || args.stats.is_some() || file.debug)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(toml: &str) -> FileConfig {
        FileConfig::from_figment(Figment::from(Toml::string(toml))).unwrap()
    }

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["rget", "http://host.test/file.bin"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let file = parse("");
        assert_eq!(file, FileConfig::default());
        assert_eq!(file.connect_timeout(), Duration::from_secs(30));

        let options = resume_options(&args(&[]), &file);
        assert_eq!(options.chunk_size, ResumeOptions::default().chunk_size);
        assert_eq!(options.partial_ext, "part");
        assert!(!options.debug);
    }

    #[test]
    fn test_file_values_apply() {
        let file = parse(
            r#"
            chunk_size = 4096
            partial_ext = "tmp"
            download_dir = "descargas"
            retry_delay_ms = 10
            backoff = "exponential"
            server_error_retries = 3
            stall_check_interval = 2
            read_timeout_ms = 500

            [headers]
            User-Agent = "rget-test"
            "#,
        );
        assert_eq!(file.read_timeout(), Duration::from_millis(500));

        let options = resume_options(&args(&[]), &file);
        assert_eq!(options.chunk_size, 4096);
        assert_eq!(options.partial_ext, "tmp");
        assert_eq!(options.download_dir, PathBuf::from("descargas"));
        assert_eq!(options.backoff, Backoff::Exponential(Duration::from_millis(10)));
        assert_eq!(options.server_error_retries, 3);
        assert_eq!(options.stall_check_interval, 2);
        assert_eq!(&*options.headers, [("User-Agent".to_string(), "rget-test".to_string())]);
    }

    #[test]
    fn test_flags_override_file() {
        let file = parse("chunk_size = 4096\npartial_ext = \"tmp\"");
        let options = resume_options(
            &args(&["--chunk-size", "10", "--partial-ext", "dl", "-o", "x.bin", "--stats", "s.jsonl"]),
            &file,
        );
        assert_eq!(options.chunk_size, 10);
        assert_eq!(options.partial_ext, "dl");
        assert_eq!(options.file_path, Some(PathBuf::from("x.bin")));
        assert!(options.debug);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileConfig::from_figment(Figment::new().merge(Toml::file(dir.path().join("absent.toml"))));
        assert_eq!(file.unwrap(), FileConfig::default());
    }

    #[test]
    fn test_bad_value_is_reported() {
        let result = FileConfig::from_figment(Figment::from(Toml::string("chunk_size = \"big\"")));
        assert!(result.is_err());
    }
}
