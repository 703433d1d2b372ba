use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::consts::{APP_NAME, DEFAULT_CONFIG_FILE};
use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct GeneralConfig {
    pub(crate) sessions_folder: PathBuf,
    pub(crate) session_pattern: String,
    pub(crate) results_folder: PathBuf,
    pub(crate) users_list: PathBuf,
    pub(crate) delay: String,
    pub(crate) clear_results: bool,
    pub(crate) timezone: Option<String>,
    pub(crate) poll_interval_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            sessions_folder: PathBuf::from("sessions"),
            session_pattern: "*".to_string(),
            results_folder: PathBuf::from("results"),
            users_list: PathBuf::from("usernames.txt"),
            delay: "5-10".to_string(),
            clear_results: false,
            timezone: None,
            poll_interval_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct RemoteConfig {
    pub(crate) base_url: String,
    pub(crate) timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8081".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct LoggingConfig {
    pub(crate) logs_folder: PathBuf,
    pub(crate) sink: String,
    pub(crate) console_level: String,
    pub(crate) write_level: String,
    pub(crate) rotation: String,
    pub(crate) max_files: usize,
    /// full, compact or pretty
    pub(crate) format: String,
    /// none, or gz to compress rotated files
    pub(crate) compression: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            logs_folder: PathBuf::from("logs"),
            sink: format!("{APP_NAME}.log"),
            console_level: "info".to_string(),
            write_level: "debug".to_string(),
            rotation: "10 MB".to_string(),
            max_files: 5,
            format: "full".to_string(),
            compression: "none".to_string(),
        }
    }
}

/// Settings file contents. Read once at startup, never mutated afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default, rename = "General")]
    pub(crate) general: GeneralConfig,
    #[serde(default, rename = "Remote")]
    pub(crate) remote: RemoteConfig,
    #[serde(default, rename = "Logging")]
    pub(crate) logging: LoggingConfig,
}

impl Config {
    /// Load from an explicit path, or search the default locations.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::get_config_paths()
                .into_iter()
                .find(|p| p.exists())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
        };
        Self::load_from(&path)
    }

    pub(crate) fn load_from(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::ConfigNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                AppError::ConfigRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, AppError> {
        toml::from_str::<Config>(content).map_err(|e| AppError::ConfigMalformed {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
    }

    pub(crate) fn delay_range(&self) -> Result<DelayRange, AppError> {
        DelayRange::parse(&self.general.delay)
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.general.poll_interval_ms.max(1))
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];

        // ~/.config/presence-sort/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join(APP_NAME).join("config.toml"));
        }

        // Platform config dir (Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join(APP_NAME).join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // ~/.presence-sort.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{APP_NAME}.toml")));
        }

        paths
    }
}

/// Inclusive pause range, in whole seconds, between two lookups of one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DelayRange {
    min: u64,
    max: u64,
}

impl DelayRange {
    pub(crate) fn new(a: u64, b: u64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Parse "MIN-MAX". The bounds are sorted, so "10-5" is the same as "5-10".
    pub(crate) fn parse(raw: &str) -> Result<Self, AppError> {
        let malformed = || AppError::MalformedDelay {
            input: raw.to_string(),
        };
        let (lo, hi) = raw.trim().split_once('-').ok_or_else(malformed)?;
        let lo = lo.trim().parse::<u64>().map_err(|_| malformed())?;
        let hi = hi.trim().parse::<u64>().map_err(|_| malformed())?;
        Ok(Self::new(lo, hi))
    }

    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_secs(rng.random_range(self.min..=self.max))
    }
}

impl std::fmt::Display for DelayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}s", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths() {
        let paths = Config::get_config_paths();
        assert_eq!(paths[0], PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn parse_full_config() {
        let content = r#"
[General]
sessions_folder = "accs"
results_folder = "out"
users_list = "list.txt"
delay = "2-4"
clear_results = true
timezone = "Europe/Berlin"

[Remote]
base_url = "http://gateway:9000"

[Logging]
console_level = "warn"
rotation = "1 MB"
format = "compact"
compression = "gz"
"#;
        let config = Config::parse(Path::new("config.toml"), content).unwrap();
        assert_eq!(config.general.sessions_folder, PathBuf::from("accs"));
        assert_eq!(config.general.results_folder, PathBuf::from("out"));
        assert_eq!(config.general.users_list, PathBuf::from("list.txt"));
        assert!(config.general.clear_results);
        assert_eq!(config.general.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(config.remote.base_url, "http://gateway:9000");
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.logging.console_level, "warn");
        assert_eq!(config.logging.write_level, "debug");
        assert_eq!(config.logging.format, "compact");
        assert_eq!(config.logging.compression, "gz");
        assert_eq!(config.delay_range().unwrap(), DelayRange::new(2, 4));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse(Path::new("config.toml"), "").unwrap();
        assert_eq!(config.general.session_pattern, "*");
        assert_eq!(config.general.poll_interval_ms, 5000);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.logging.max_files, 5);
        assert_eq!(config.logging.format, "full");
        assert_eq!(config.logging.compression, "none");
    }

    #[test]
    fn malformed_config_is_rejected() {
        let err = Config::parse(Path::new("bad.toml"), "[General\ndelay = ").unwrap_err();
        assert!(matches!(err, AppError::ConfigMalformed { .. }));
    }

    #[test]
    fn wrong_type_is_malformed() {
        let err = Config::parse(Path::new("bad.toml"), "[General]\nclear_results = \"yes\"")
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigMalformed { .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, AppError::ConfigNotFound { .. }));
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[General]\ndelay = \"1-1\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.delay_range().unwrap(), DelayRange::new(1, 1));
    }

    #[test]
    fn delay_parses_min_max() {
        let range = DelayRange::parse("5-10").unwrap();
        assert_eq!((range.min, range.max), (5, 10));
    }

    #[test]
    fn delay_is_sorted() {
        assert_eq!(DelayRange::parse("10-5").unwrap(), DelayRange::new(5, 10));
        assert_eq!(DelayRange::parse(" 3 - 7 ").unwrap(), DelayRange::new(3, 7));
    }

    #[test]
    fn delay_without_hyphen_is_malformed() {
        let err = DelayRange::parse("abc").unwrap_err();
        assert!(matches!(err, AppError::MalformedDelay { ref input } if input == "abc"));
        assert!(DelayRange::parse("5").is_err());
    }

    #[test]
    fn delay_with_bad_bounds_is_malformed() {
        assert!(DelayRange::parse("a-b").is_err());
        assert!(DelayRange::parse("1-2-3").is_err());
        assert!(DelayRange::parse("-5").is_err());
        assert!(DelayRange::parse("5-").is_err());
    }

    #[test]
    fn sampled_delay_stays_in_range() {
        let range = DelayRange::new(2, 4);
        let mut rng = rand::rng();
        for _ in 0..500 {
            let secs = range.sample(&mut rng).as_secs();
            assert!((2..=4).contains(&secs), "out of range: {secs}");
        }
    }

    #[test]
    fn degenerate_range_always_samples_its_bound() {
        let range = DelayRange::new(0, 0);
        let mut rng = rand::rng();
        assert_eq!(range.sample(&mut rng), Duration::ZERO);
    }
}
