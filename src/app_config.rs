use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::AppError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Location substrings that mark a record as already in the target locale
    #[serde(default = "default_target_locale_markers")]
    pub target_locale_markers: Vec<String>,

    /// Translation provider config
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Checkpoint locations
    #[serde(default)]
    pub checkpoint: CheckpointConfig,

    /// Logging config
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Use the fake translator and the test checkpoint
    #[serde(default)]
    pub test_mode: bool,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: DeepL REST API
    #[default]
    DeepL,
    // @provider: Offline fake translator
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::DeepL => "DeepL",
            Self::Mock => "Mock",
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeepL => write!(f, "deepl"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deepl" => Ok(Self::DeepL),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// How the translator waits out a run of failures
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EscalationMode {
    /// Wait for the operator to press Enter
    #[default]
    Prompt,
    /// Sleep and resume on its own
    Backoff,
}

/// Provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type", default)]
    pub provider_type: TranslationProvider,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_deepl_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: TranslationProvider::default(),
            api_key: String::new(),
            endpoint: default_deepl_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Pipeline tuning knobs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Consecutive failures before escalation
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Minimum seconds between time-gated checkpoints
    #[serde(default = "default_checkpoint_interval_secs")]
    pub checkpoint_interval_secs: u64,

    /// Upper bound on retry sweeps after the first pass
    #[serde(default = "default_max_retry_rounds")]
    pub max_retry_rounds: u32,

    /// Drop cached pairs not in the target language before translating
    #[serde(default)]
    pub consistency_check: bool,

    /// How escalations are acknowledged
    #[serde(default)]
    pub escalation: EscalationMode,

    /// Base wait for the backoff escalation mode
    #[serde(default = "default_escalation_backoff_secs")]
    pub escalation_backoff_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            checkpoint_interval_secs: default_checkpoint_interval_secs(),
            max_retry_rounds: default_max_retry_rounds(),
            consistency_check: false,
            escalation: EscalationMode::default(),
            escalation_backoff_secs: default_escalation_backoff_secs(),
        }
    }
}

impl PipelineConfig {
    pub fn checkpoint_interval(&self) -> Duration {
        Duration::from_secs(self.checkpoint_interval_secs)
    }

    pub fn escalation_backoff(&self) -> Duration {
        Duration::from_secs(self.escalation_backoff_secs)
    }
}

/// Checkpoint file locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CheckpointConfig {
    /// Checkpoint used by real runs
    #[serde(default = "default_checkpoint_path")]
    pub path: PathBuf,

    /// Checkpoint used in test mode
    #[serde(default = "default_test_checkpoint_path")]
    pub test_path: PathBuf,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            path: default_checkpoint_path(),
            test_path: default_test_checkpoint_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default)]
    pub level: LogLevel,

    /// Log file, appended to on every run
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            file: default_log_file(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_target_locale_markers() -> Vec<String> {
    vec!["united states".to_string()]
}

fn default_deepl_endpoint() -> String {
    crate::providers::deepl::DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_failure_threshold() -> u32 {
    crate::translation::retry::DEFAULT_FAILURE_THRESHOLD
}

fn default_checkpoint_interval_secs() -> u64 {
    20
}

fn default_max_retry_rounds() -> u32 {
    crate::translation::batch::DEFAULT_MAX_RETRY_ROUNDS
}

fn default_escalation_backoff_secs() -> u64 {
    60
}

fn default_checkpoint_path() -> PathBuf {
    PathBuf::from("translation_progress.db")
}

fn default_test_checkpoint_path() -> PathBuf {
    PathBuf::from("translation_test.db")
}

fn default_log_file() -> Option<PathBuf> {
    Some(PathBuf::from("translation_log.log"))
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration, writing a default file first if none exists
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        crate::language_utils::get_language_name(&self.target_language)
            .map_err(|e| AppError::Config(format!("Invalid target language: {}", e)))?;

        if self.target_locale_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(AppError::Config("At least one target locale marker is required".to_string()));
        }

        if self.pipeline.failure_threshold == 0 {
            return Err(AppError::Config("pipeline.failure_threshold must be at least 1".to_string()));
        }

        if self.effective_provider() == TranslationProvider::DeepL {
            url::Url::parse(&self.provider.endpoint).map_err(|e| {
                AppError::Config(format!("Invalid provider endpoint {}: {}", self.provider.endpoint, e))
            })?;
            if self.provider.api_key.trim().is_empty() {
                return Err(AppError::Config(
                    "Translation API key is required for the DeepL provider".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Provider actually used, accounting for test mode
    pub fn effective_provider(&self) -> TranslationProvider {
        if self.test_mode {
            TranslationProvider::Mock
        } else {
            self.provider.provider_type
        }
    }

    /// Checkpoint path for the current mode
    pub fn checkpoint_path(&self) -> &Path {
        if self.test_mode {
            &self.checkpoint.test_path
        } else {
            &self.checkpoint.path
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            target_locale_markers: default_target_locale_markers(),
            provider: ProviderConfig::default(),
            pipeline: PipelineConfig::default(),
            checkpoint: CheckpointConfig::default(),
            logging: LoggingConfig::default(),
            test_mode: false,
        }
    }
}
