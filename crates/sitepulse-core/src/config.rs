//! Configuration module for SitePulse.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for SitePulse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analytics: AnalyticsConfig,
    pub sink: SinkConfig,
    pub tracking: TrackingConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Analytics property settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Measurement id passed as the target of `config` sink calls.
    pub measurement_id: String,
    /// Record a page view as soon as a page session starts.
    pub track_initial_page_view: bool,
}

/// Where forwarded events go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Sink kind: `log`, `http`, or `none`.
    pub kind: String,
    /// Collector URL for the `http` sink.
    pub endpoint: Option<String>,
    /// Request timeout for the `http` sink, in seconds.
    pub timeout_secs: u64,
}

/// Passive observer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Scroll-depth percentages reported once each, strictly ascending.
    pub scroll_milestones: Vec<u8>,
    /// Maximum characters of element text copied into interaction events.
    pub element_text_limit: usize,
    /// Install the error and unhandled-rejection capture observer.
    pub capture_errors: bool,
    /// Install the web-vitals and load-timing observer (when the host supports it).
    pub performance: bool,
}

/// User study export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory receiving `user_study_data_<session>.json` files.
    pub dir: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/sitepulse/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("sitepulse")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Scroll-depth milestones used when none are configured.
pub const DEFAULT_SCROLL_MILESTONES: [u8; 5] = [25, 50, 75, 90, 100];

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            measurement_id: "GA_MEASUREMENT_ID".to_string(),
            track_initial_page_view: true,
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: "log".to_string(),
            endpoint: None,
            timeout_secs: 5,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            scroll_milestones: DEFAULT_SCROLL_MILESTONES.to_vec(),
            element_text_limit: 50,
            capture_errors: true,
            performance: true,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("sitepulse")
                .join("exports"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sink.endpoint"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid values for `sink.kind`.
pub const VALID_SINK_KINDS: &[&str] = &["log", "http", "none"];

/// Checks that a milestone set is non-empty, strictly ascending and within 1..=100.
pub fn check_scroll_milestones(milestones: &[u8]) -> Result<(), DomainError> {
    if milestones.is_empty() {
        return Err(DomainError::InvalidMilestones(
            "at least one milestone is required".into(),
        ));
    }
    if let Some(bad) = milestones.iter().find(|m| **m == 0 || **m > 100) {
        return Err(DomainError::InvalidMilestones(format!(
            "{bad} is outside 1..=100"
        )));
    }
    if milestones.windows(2).any(|w| w[0] >= w[1]) {
        return Err(DomainError::InvalidMilestones(
            "milestones must be strictly ascending".into(),
        ));
    }
    Ok(())
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- analytics ---
        if self.analytics.measurement_id.trim().is_empty() {
            errors.push(ValidationError {
                field: "analytics.measurement_id".into(),
                message: "must not be empty".into(),
            });
        }

        // --- sink ---
        if !VALID_SINK_KINDS.contains(&self.sink.kind.as_str()) {
            errors.push(ValidationError {
                field: "sink.kind".into(),
                message: format!(
                    "invalid kind '{}'; valid options: {}",
                    self.sink.kind,
                    VALID_SINK_KINDS.join(", ")
                ),
            });
        }
        if self.sink.kind == "http" {
            match self.sink.endpoint.as_deref() {
                None => errors.push(ValidationError {
                    field: "sink.endpoint".into(),
                    message: "required when sink.kind is 'http'".into(),
                }),
                Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                    errors.push(ValidationError {
                        field: "sink.endpoint".into(),
                        message: format!("not an http(s) URL: {url}"),
                    })
                }
                Some(_) => {}
            }
        }
        if self.sink.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "sink.timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- tracking ---
        if let Err(e) = check_scroll_milestones(&self.tracking.scroll_milestones) {
            errors.push(ValidationError {
                field: "tracking.scroll_milestones".into(),
                message: e.to_string(),
            });
        }
        if self.tracking.element_text_limit == 0 {
            errors.push(ValidationError {
                field: "tracking.element_text_limit".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use sitepulse_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .measurement_id("G-TEST123")
///     .sink_kind("none")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- analytics ---

    pub fn measurement_id(mut self, id: impl Into<String>) -> Self {
        self.config.analytics.measurement_id = id.into();
        self
    }

    pub fn track_initial_page_view(mut self, enabled: bool) -> Self {
        self.config.analytics.track_initial_page_view = enabled;
        self
    }

    // --- sink ---

    pub fn sink_kind(mut self, kind: impl Into<String>) -> Self {
        self.config.sink.kind = kind.into();
        self
    }

    pub fn sink_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.sink.endpoint = Some(endpoint.into());
        self
    }

    pub fn sink_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.sink.timeout_secs = seconds;
        self
    }

    // --- tracking ---

    pub fn scroll_milestones(mut self, milestones: Vec<u8>) -> Self {
        self.config.tracking.scroll_milestones = milestones;
        self
    }

    pub fn element_text_limit(mut self, limit: usize) -> Self {
        self.config.tracking.element_text_limit = limit;
        self
    }

    pub fn capture_errors(mut self, enabled: bool) -> Self {
        self.config.tracking.capture_errors = enabled;
        self
    }

    pub fn performance(mut self, enabled: bool) -> Self {
        self.config.tracking.performance = enabled;
        self
    }

    // --- export ---

    pub fn export_dir(mut self, dir: PathBuf) -> Self {
        self.config.export.dir = dir;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert_eq!(cfg.analytics.measurement_id, "GA_MEASUREMENT_ID");
        assert!(cfg.analytics.track_initial_page_view);
        assert_eq!(cfg.sink.kind, "log");
        assert!(cfg.sink.endpoint.is_none());
        assert_eq!(cfg.sink.timeout_secs, 5);
        assert_eq!(cfg.tracking.scroll_milestones, vec![25, 50, 75, 90, 100]);
        assert_eq!(cfg.tracking.element_text_limit, 50);
        assert!(cfg.tracking.capture_errors);
        assert!(cfg.tracking.performance);
        assert!(cfg.export.dir.ends_with("sitepulse/exports"));
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn default_config_passes_validation() {
        let errors = Config::default().validate();
        assert!(errors.is_empty(), "unexpected validation errors: {errors:?}");
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
analytics:
  measurement_id: G-ABC123
  track_initial_page_view: false
sink:
  kind: http
  endpoint: https://collector.example.com/v1/events
  timeout_secs: 2
tracking:
  scroll_milestones: [10, 50, 100]
  element_text_limit: 20
  capture_errors: false
  performance: false
export:
  dir: /tmp/sitepulse-exports
logging:
  level: debug
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.analytics.measurement_id, "G-ABC123");
        assert!(!cfg.analytics.track_initial_page_view);
        assert_eq!(cfg.sink.kind, "http");
        assert_eq!(
            cfg.sink.endpoint.as_deref(),
            Some("https://collector.example.com/v1/events")
        );
        assert_eq!(cfg.sink.timeout_secs, 2);
        assert_eq!(cfg.tracking.scroll_milestones, vec![10, 50, 100]);
        assert_eq!(cfg.tracking.element_text_limit, 20);
        assert!(!cfg.tracking.capture_errors);
        assert!(!cfg.tracking.performance);
        assert_eq!(cfg.export.dir, PathBuf::from("/tmp/sitepulse-exports"));
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"analytics:\n  measurement_id: G-PARTIAL\n").unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).unwrap();
        assert_eq!(cfg.analytics.measurement_id, "G-PARTIAL");
        assert!(cfg.analytics.track_initial_page_view);
        assert_eq!(cfg.tracking.scroll_milestones, DEFAULT_SCROLL_MILESTONES.to_vec());
    }

    #[test]
    fn load_or_default_returns_default_on_missing_file() {
        let cfg = Config::load_or_default(Path::new("/nonexistent/config.yaml"));
        assert_eq!(cfg.sink.kind, "log");
    }

    #[test]
    fn load_returns_error_on_invalid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"tracking: [not, a, map").unwrap();
        tmp.flush().unwrap();
        assert!(Config::load(tmp.path()).is_err());
    }

    // -- Validation --

    #[test]
    fn validate_catches_empty_measurement_id() {
        let cfg = ConfigBuilder::new().measurement_id("  ").build();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "analytics.measurement_id"));
    }

    #[test]
    fn validate_catches_invalid_sink_kind() {
        let cfg = ConfigBuilder::new().sink_kind("carrier_pigeon").build();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "sink.kind"));
    }

    #[test]
    fn validate_requires_endpoint_for_http_sink() {
        let cfg = ConfigBuilder::new().sink_kind("http").build();
        assert!(cfg.validate().iter().any(|e| e.field == "sink.endpoint"));

        let cfg = ConfigBuilder::new()
            .sink_kind("http")
            .sink_endpoint("ftp://example.com")
            .build();
        assert!(cfg.validate().iter().any(|e| e.field == "sink.endpoint"));

        let cfg = ConfigBuilder::new()
            .sink_kind("http")
            .sink_endpoint("http://localhost:8080/collect")
            .build();
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validate_catches_zero_timeout() {
        let cfg = ConfigBuilder::new().sink_timeout_secs(0).build();
        assert!(cfg.validate().iter().any(|e| e.field == "sink.timeout_secs"));
    }

    #[test]
    fn validate_catches_bad_milestones() {
        for milestones in [vec![], vec![50, 25], vec![25, 25], vec![0, 50], vec![50, 101]] {
            let cfg = ConfigBuilder::new().scroll_milestones(milestones.clone()).build();
            assert!(
                cfg.validate()
                    .iter()
                    .any(|e| e.field == "tracking.scroll_milestones"),
                "milestones {milestones:?} should be rejected"
            );
        }
    }

    #[test]
    fn validate_catches_zero_text_limit() {
        let cfg = ConfigBuilder::new().element_text_limit(0).build();
        assert!(cfg
            .validate()
            .iter()
            .any(|e| e.field == "tracking.element_text_limit"));
    }

    #[test]
    fn validate_catches_invalid_log_level() {
        let cfg = ConfigBuilder::new().logging_level("verbose").build();
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "logging.level");
    }

    #[test]
    fn validate_accepts_all_valid_log_levels() {
        for level in VALID_LOG_LEVELS {
            let cfg = ConfigBuilder::new().logging_level(*level).build();
            assert!(cfg.validate().is_empty(), "level {level} should be valid");
        }
    }

    #[test]
    fn check_scroll_milestones_messages() {
        assert!(check_scroll_milestones(&DEFAULT_SCROLL_MILESTONES).is_ok());
        let err = check_scroll_milestones(&[10, 5]).unwrap_err();
        assert!(err.to_string().contains("ascending"));
    }

    // -- Builder --

    #[test]
    fn builder_starts_from_defaults() {
        let cfg = ConfigBuilder::new().build();
        assert_eq!(cfg.analytics.measurement_id, "GA_MEASUREMENT_ID");
        assert_eq!(cfg.tracking.element_text_limit, 50);
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = ConfigBuilder::new()
            .measurement_id("G-XYZ")
            .track_initial_page_view(false)
            .sink_kind("none")
            .scroll_milestones(vec![50, 100])
            .element_text_limit(10)
            .capture_errors(false)
            .performance(false)
            .export_dir(PathBuf::from("/tmp/out"))
            .logging_level("warn")
            .build();

        assert_eq!(cfg.analytics.measurement_id, "G-XYZ");
        assert!(!cfg.analytics.track_initial_page_view);
        assert_eq!(cfg.sink.kind, "none");
        assert_eq!(cfg.tracking.scroll_milestones, vec![50, 100]);
        assert_eq!(cfg.tracking.element_text_limit, 10);
        assert!(!cfg.tracking.capture_errors);
        assert!(!cfg.tracking.performance);
        assert_eq!(cfg.export.dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn builder_build_validated_fails_for_invalid_config() {
        let result = ConfigBuilder::new().logging_level("loud").build_validated();
        let errors = result.unwrap_err();
        assert_eq!(errors[0].field, "logging.level");

        assert!(ConfigBuilder::new().build_validated().is_ok());
    }

    #[test]
    fn default_path_ends_with_config_yaml() {
        let path = Config::default_path();
        assert!(path.ends_with("sitepulse/config.yaml"));
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError {
            field: "sink.kind".into(),
            message: "bad".into(),
        };
        assert_eq!(err.to_string(), "sink.kind: bad");
    }
}
