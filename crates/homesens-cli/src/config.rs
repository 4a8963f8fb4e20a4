//! Configuration file management and run-config resolution.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use homesens_core::UradmonCredentials;
use homesens_core::uradmon::DEFAULT_API_URL;
use homesens_core::validation::{is_valid_credential, parse_api_url};
use homesens_types::{DEFAULT_HUMIDITY_LEAF, DEFAULT_TEMPERATURE_LEAF};

use crate::cli::{Cli, OutputFormat};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default sensor index
    #[serde(default)]
    pub sensor: Option<u32>,

    /// Default temperature leafoid
    #[serde(default)]
    pub temperature_leaf: Option<String>,

    /// Default humidity leafoid
    #[serde(default)]
    pub humidity_leaf: Option<String>,

    /// Default output format
    #[serde(default)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,

    /// uRadMonitor settings
    #[serde(default)]
    pub uradmon: UradmonSection,
}

/// The `[uradmon]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UradmonSection {
    /// Query uRadMonitor unless `-U` is given.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub userid: Option<String>,

    #[serde(default)]
    pub userkey: Option<String>,

    #[serde(default)]
    pub api: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for UradmonSection {
    fn default() -> Self {
        Self {
            enabled: true,
            id: None,
            userid: None,
            userkey: None,
            api: None,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("homesens")
            .join("config.toml")
    }

    /// Load the config file.
    ///
    /// With no explicit path, a missing default file yields the default
    /// config. An explicit path must exist. Unreadable or malformed files
    /// are errors naming the path.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let path = Self::path();
                if !path.exists() {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Where sensor values come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorSource {
    /// The backend native to the build target.
    Platform,
    /// A Linux IIO sysfs tree rooted at the given directory.
    Iio(PathBuf),
}

/// Resolved uRadMonitor settings. Present only when the remote call is made.
#[derive(Debug, Clone)]
pub struct UradmonConfig {
    pub credentials: UradmonCredentials,
    pub api_url: String,
}

/// Everything one run needs, resolved from flags, environment, config file
/// and built-in defaults in that order.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub list_sensors: bool,
    pub sensor: u32,
    pub temperature_leaf: String,
    pub humidity_leaf: String,
    /// `None` when uRadMonitor is disabled or not needed.
    pub uradmon: Option<UradmonConfig>,
    pub format: OutputFormat,
    pub no_color: bool,
    pub sensor_source: SensorSource,
}

/// A setting that is missing or malformed after resolution.
#[derive(Debug, Error)]
pub enum UsageError {
    /// Credentials required for the uRadMonitor call are absent.
    #[error("the following required arguments were not provided: {}", .flags.join(", "))]
    MissingUradmon { flags: Vec<&'static str> },

    /// A value taken from the config file failed validation.
    #[error("invalid value '{value}' for '{key}' in config file: {reason}")]
    InvalidConfigValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl UsageError {
    /// The clap error kind used when reporting this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingUradmon { .. } => ErrorKind::MissingRequiredArgument,
            Self::InvalidConfigValue { .. } => ErrorKind::ValueValidation,
        }
    }
}

impl RunConfig {
    /// Merge command-line arguments with the config file.
    ///
    /// Flag and environment values have already been validated by clap;
    /// values coming from the config file are validated here.
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self, UsageError> {
        let uradmon = if cli.list_sensors || cli.no_uradmon || !config.uradmon.enabled {
            None
        } else {
            Some(resolve_uradmon(cli, config)?)
        };

        let sensor_source = match &cli.iio_root {
            Some(root) => SensorSource::Iio(root.clone()),
            None => SensorSource::Platform,
        };

        Ok(Self {
            list_sensors: cli.list_sensors,
            sensor: cli.sensor.or(config.sensor).unwrap_or(0),
            temperature_leaf: cli
                .temperature_leaf
                .clone()
                .or_else(|| config.temperature_leaf.clone())
                .unwrap_or_else(|| DEFAULT_TEMPERATURE_LEAF.to_string()),
            humidity_leaf: cli
                .humidity_leaf
                .clone()
                .or_else(|| config.humidity_leaf.clone())
                .unwrap_or_else(|| DEFAULT_HUMIDITY_LEAF.to_string()),
            uradmon,
            format: cli.format.or(config.format).unwrap_or_default(),
            no_color: cli.no_color || config.no_color,
            sensor_source,
        })
    }
}

fn resolve_uradmon(cli: &Cli, config: &Config) -> Result<UradmonConfig, UsageError> {
    let section = &config.uradmon;
    let id = credential(cli.uradmon_id.as_ref(), section.id.as_ref(), "uradmon.id")?;
    let userid = credential(
        cli.uradmon_userid.as_ref(),
        section.userid.as_ref(),
        "uradmon.userid",
    )?;
    let userkey = credential(
        cli.uradmon_userkey.as_ref(),
        section.userkey.as_ref(),
        "uradmon.userkey",
    )?;

    let (id, userid, userkey) = match (id, userid, userkey) {
        (Some(id), Some(userid), Some(userkey)) => (id, userid, userkey),
        (id, userid, userkey) => {
            let flags = [
                (id.is_none(), "--uradmon-id <ID>"),
                (userid.is_none(), "--uradmon-userid <USERID>"),
                (userkey.is_none(), "--uradmon-userkey <USERKEY>"),
            ]
            .into_iter()
            .filter_map(|(missing, flag)| missing.then_some(flag))
            .collect();
            return Err(UsageError::MissingUradmon { flags });
        }
    };

    let api_url = match (&cli.uradmon_api, &section.api) {
        (Some(url), _) => url.clone(),
        (None, Some(url)) => {
            parse_api_url(url).map_err(|reason| UsageError::InvalidConfigValue {
                key: "uradmon.api",
                value: url.clone(),
                reason,
            })?;
            url.clone()
        }
        (None, None) => DEFAULT_API_URL.to_string(),
    };

    Ok(UradmonConfig {
        credentials: UradmonCredentials::new(id, userid, userkey),
        api_url,
    })
}

/// Pick the flag value, falling back to a validated config value.
fn credential(
    flag: Option<&String>,
    file: Option<&String>,
    key: &'static str,
) -> Result<Option<String>, UsageError> {
    if let Some(value) = flag {
        return Ok(Some(value.clone()));
    }
    match file {
        Some(value) if !is_valid_credential(value) => Err(UsageError::InvalidConfigValue {
            key,
            value: value.clone(),
            reason: "only letters, digits, '-' and '_' are allowed".to_string(),
        }),
        other => Ok(other.cloned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["homesens"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    const CREDS: [&str; 3] = [
        "--uradmon-id=82000001",
        "--uradmon-userid=1234",
        "--uradmon-userkey=0123abcd",
    ];

    #[test]
    fn test_defaults_with_no_uradmon() {
        let run = RunConfig::resolve(&cli(&["-U"]), &Config::default()).unwrap();
        assert_eq!(run.sensor, 0);
        assert_eq!(run.temperature_leaf, "temperature");
        assert_eq!(run.humidity_leaf, "humidity");
        assert!(run.uradmon.is_none());
        assert_eq!(run.format, OutputFormat::Text);
        assert_eq!(run.sensor_source, SensorSource::Platform);
    }

    #[test]
    fn test_missing_all_credentials_names_each_flag() {
        let err = RunConfig::resolve(&cli(&[]), &Config::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("--uradmon-id"));
        assert!(message.contains("--uradmon-userid"));
        assert!(message.contains("--uradmon-userkey"));
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_missing_only_userkey() {
        let err = RunConfig::resolve(
            &cli(&["--uradmon-id=82000001", "--uradmon-userid=1234"]),
            &Config::default(),
        )
        .unwrap_err();
        match err {
            UsageError::MissingUradmon { flags } => {
                assert_eq!(flags, vec!["--uradmon-userkey <USERKEY>"]);
            }
            other => panic!("expected MissingUradmon, got {:?}", other),
        }
    }

    #[test]
    fn test_list_skips_credential_check() {
        let run = RunConfig::resolve(&cli(&["-l"]), &Config::default()).unwrap();
        assert!(run.list_sensors);
        assert!(run.uradmon.is_none());
    }

    #[test]
    fn test_credentials_from_flags_use_default_api() {
        let run = RunConfig::resolve(&cli(&CREDS), &Config::default()).unwrap();
        let uradmon = run.uradmon.unwrap();
        assert_eq!(uradmon.credentials.device_id, "82000001");
        assert_eq!(uradmon.credentials.user_id, "1234");
        assert_eq!(uradmon.credentials.user_key, "0123abcd");
        assert_eq!(uradmon.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            sensor: Some(3),
            temperature_leaf: Some("temp_file".to_string()),
            format: Some(OutputFormat::Json),
            ..Default::default()
        };
        let run = RunConfig::resolve(&cli(&["-U", "-s", "1", "-f", "text"]), &config).unwrap();
        assert_eq!(run.sensor, 1);
        assert_eq!(run.temperature_leaf, "temp_file");
        assert_eq!(run.format, OutputFormat::Text);
    }

    #[test]
    fn test_credentials_from_config() {
        let config: Config = toml::from_str(
            r#"
            [uradmon]
            id = "82000001"
            userid = "1234"
            userkey = "0123abcd"
            api = "http://127.0.0.1:9/api"
            "#,
        )
        .unwrap();
        let run = RunConfig::resolve(&cli(&[]), &config).unwrap();
        let uradmon = run.uradmon.unwrap();
        assert_eq!(uradmon.credentials.device_id, "82000001");
        assert_eq!(uradmon.api_url, "http://127.0.0.1:9/api");
    }

    #[test]
    fn test_config_can_disable_uradmon() {
        let config: Config = toml::from_str("[uradmon]\nenabled = false\n").unwrap();
        let run = RunConfig::resolve(&cli(&[]), &config).unwrap();
        assert!(run.uradmon.is_none());
    }

    #[test]
    fn test_invalid_config_credential() {
        let config: Config = toml::from_str(
            "[uradmon]\nid = \"bad id\"\nuserid = \"1\"\nuserkey = \"k\"\n",
        )
        .unwrap();
        let err = RunConfig::resolve(&cli(&[]), &config).unwrap_err();
        assert!(matches!(
            err,
            UsageError::InvalidConfigValue { key: "uradmon.id", .. }
        ));
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_invalid_config_api_url() {
        let config: Config = toml::from_str("[uradmon]\napi = \"ftp://example.com\"\n").unwrap();
        let err = RunConfig::resolve(&cli(&CREDS), &config).unwrap_err();
        assert!(matches!(
            err,
            UsageError::InvalidConfigValue { key: "uradmon.api", .. }
        ));
    }

    #[test]
    fn test_iio_root_selects_iio_source() {
        let run = RunConfig::resolve(&cli(&["-U", "--iio-root", "/tmp/iio"]), &Config::default())
            .unwrap();
        assert_eq!(
            run.sensor_source,
            SensorSource::Iio(PathBuf::from("/tmp/iio"))
        );
    }

    #[test]
    fn test_load_full_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
sensor = 1
temperature_leaf = "temp"
humidity_leaf = "hum"
format = "json"
no_color = true

[uradmon]
enabled = true
id = "82000001"
"#
        )
        .unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.sensor, Some(1));
        assert_eq!(config.temperature_leaf.as_deref(), Some("temp"));
        assert_eq!(config.humidity_leaf.as_deref(), Some("hum"));
        assert_eq!(config.format, Some(OutputFormat::Json));
        assert!(config.no_color);
        assert_eq!(config.uradmon.id.as_deref(), Some("82000001"));
        assert!(config.uradmon.userid.is_none());
    }

    #[test]
    fn test_load_empty_file_is_default() {
        let file = NamedTempFile::new().unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.sensor.is_none());
        assert!(config.uradmon.enabled);
    }

    #[test]
    fn test_load_malformed_file_names_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sensor = \"zero\"").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(format!("{:#}", err).contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_default_path_ends_with_homesens_config() {
        let path = Config::path();
        assert!(path.ends_with("homesens/config.toml"));
    }
}
