use crate::adapters::geocoder::{DEFAULT_GEOCODER_ENDPOINT, DEFAULT_USER_AGENT};
use crate::adapters::visit_log::RemoteRepoSettings;
use crate::config::toml_config::{redacted, resolved_value, RemoteLogConfig, TomlConfig};
use crate::core::directions::DEFAULT_DIRECTIONS_BASE_URL;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, ShuttleError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_required_field,
    validate_url, Validate,
};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_STOPS_FILE: &str = "shuttles.csv";
pub const DEFAULT_VISIT_LOG_PATH: &str = "visits.csv";
pub const DEFAULT_REMOTE_API_BASE: &str = "https://api.github.com";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum VisitLogKind {
    None,
    Local,
    Remote,
}

impl VisitLogKind {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(VisitLogKind::None),
            "local" | "csv" => Ok(VisitLogKind::Local),
            "remote" => Ok(VisitLogKind::Remote),
            other => Err(ShuttleError::InvalidConfigValueError {
                field: "visit_log.backend".to_string(),
                value: other.to_string(),
                reason: "Valid backends: none, local, remote".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisitLogBackend {
    None,
    Local { path: String },
    Remote {
        settings: RemoteRepoSettings,
        timeout: Duration,
    },
}

/// 合併 TOML 與命令列後的最終設定
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub base_dir: String,
    pub stops_file: String,
    pub geocoding_enabled: bool,
    pub geocoder_endpoint: String,
    pub user_agent: String,
    pub geocoder_timeout: Duration,
    pub directions_base_url: String,
    pub maps_api_key: Option<String>,
    pub visit_log: VisitLogBackend,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: ".".to_string(),
            stops_file: DEFAULT_STOPS_FILE.to_string(),
            geocoding_enabled: true,
            geocoder_endpoint: DEFAULT_GEOCODER_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            geocoder_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            directions_base_url: DEFAULT_DIRECTIONS_BASE_URL.to_string(),
            maps_api_key: None,
            visit_log: VisitLogBackend::Local {
                path: DEFAULT_VISIT_LOG_PATH.to_string(),
            },
        }
    }
}

impl Settings {
    pub fn from_toml(config: &TomlConfig) -> Result<Self> {
        let defaults = Settings::default();

        let kind = match &config.visit_log.backend {
            Some(backend) => VisitLogKind::parse(backend)?,
            None => VisitLogKind::Local,
        };
        let visit_log = Self::build_visit_log(
            kind,
            config.visit_log.path.clone(),
            config.visit_log.remote.as_ref(),
        )?;

        Ok(Self {
            base_dir: config.data.base_dir.clone().unwrap_or(defaults.base_dir),
            stops_file: config
                .data
                .stops_file
                .clone()
                .unwrap_or(defaults.stops_file),
            geocoding_enabled: config.geocoding.enabled.unwrap_or(true),
            geocoder_endpoint: config
                .geocoding
                .endpoint
                .clone()
                .unwrap_or(defaults.geocoder_endpoint),
            user_agent: config
                .geocoding
                .user_agent
                .clone()
                .unwrap_or(defaults.user_agent),
            geocoder_timeout: config
                .geocoding
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.geocoder_timeout),
            directions_base_url: config
                .directions
                .base_url
                .clone()
                .unwrap_or(defaults.directions_base_url),
            maps_api_key: resolved_value(&config.directions.api_key),
            visit_log,
        })
    }

    pub fn build_visit_log(
        kind: VisitLogKind,
        local_path: Option<String>,
        remote: Option<&RemoteLogConfig>,
    ) -> Result<VisitLogBackend> {
        match kind {
            VisitLogKind::None => Ok(VisitLogBackend::None),
            VisitLogKind::Local => Ok(VisitLogBackend::Local {
                path: local_path.unwrap_or_else(|| DEFAULT_VISIT_LOG_PATH.to_string()),
            }),
            VisitLogKind::Remote => {
                let remote = remote.ok_or_else(|| ShuttleError::MissingConfigError {
                    field: "visit_log.remote".to_string(),
                })?;
                let owner = resolved_value(&remote.owner);
                let repo = resolved_value(&remote.repo);
                let token = resolved_value(&remote.token);
                let settings = RemoteRepoSettings {
                    api_base: remote
                        .api_base
                        .clone()
                        .unwrap_or_else(|| DEFAULT_REMOTE_API_BASE.to_string()),
                    owner: validate_required_field("visit_log.remote.owner", &owner)?.clone(),
                    repo: validate_required_field("visit_log.remote.repo", &repo)?.clone(),
                    path: remote
                        .path
                        .clone()
                        .or(local_path)
                        .unwrap_or_else(|| DEFAULT_VISIT_LOG_PATH.to_string()),
                    branch: remote.branch.clone().unwrap_or_else(|| "main".to_string()),
                    token: validate_required_field("visit_log.remote.token", &token)?.clone(),
                    commit_message: remote
                        .commit_message
                        .clone()
                        .unwrap_or_else(|| "Update shuttle visit log".to_string()),
                };
                Ok(VisitLogBackend::Remote {
                    settings,
                    timeout: Duration::from_secs(
                        remote.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
                    ),
                })
            }
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_dir", &self.base_dir)
            .field("stops_file", &self.stops_file)
            .field("geocoding_enabled", &self.geocoding_enabled)
            .field("geocoder_endpoint", &self.geocoder_endpoint)
            .field("user_agent", &self.user_agent)
            .field("geocoder_timeout", &self.geocoder_timeout)
            .field("directions_base_url", &self.directions_base_url)
            .field("maps_api_key", &redacted(self.maps_api_key.as_deref()))
            .field("visit_log", &self.visit_log)
            .finish()
    }
}

impl ConfigProvider for Settings {
    fn stops_file(&self) -> &str {
        &self.stops_file
    }

    fn directions_base_url(&self) -> &str {
        &self.directions_base_url
    }

    fn maps_api_key(&self) -> Option<&str> {
        self.maps_api_key.as_deref()
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("data.base_dir", &self.base_dir)?;
        validate_path("data.stops_file", &self.stops_file)?;
        validate_url("directions.base_url", &self.directions_base_url)?;

        if self.geocoding_enabled {
            validate_url("geocoding.endpoint", &self.geocoder_endpoint)?;
            validate_non_empty_string("geocoding.user_agent", &self.user_agent)?;
            validate_range(
                "geocoding.timeout_seconds",
                self.geocoder_timeout.as_secs(),
                1,
                120,
            )?;
        }

        match &self.visit_log {
            VisitLogBackend::None => {}
            VisitLogBackend::Local { path } => validate_path("visit_log.path", path)?,
            VisitLogBackend::Remote { settings, .. } => {
                validate_url("visit_log.remote.api_base", &settings.api_base)?;
                validate_non_empty_string("visit_log.remote.owner", &settings.owner)?;
                validate_non_empty_string("visit_log.remote.repo", &settings.repo)?;
                validate_path("visit_log.remote.path", &settings.path)?;
                validate_non_empty_string("visit_log.remote.branch", &settings.branch)?;
            }
        }

        Ok(())
    }
}
