//! Config command - View and manage SitePulse configuration
//!
//! Provides the `sitepulse config` CLI command which:
//! 1. Shows the current configuration (YAML or JSON)
//! 2. Sets individual configuration values via dot-notation keys
//! 3. Validates the configuration file and reports errors

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use sitepulse_core::config::Config;
use tracing::info;

use crate::output::{get_formatter, OutputFormat};

/// Keys accepted by `config set`, with a short description
const SUPPORTED_KEYS: &[(&str, &str)] = &[
    ("analytics.measurement_id", "Target of config sink calls"),
    ("analytics.track_initial_page_view", "true|false"),
    ("sink.kind", "log|http|none"),
    ("sink.endpoint", "Collector URL for the http sink (none to clear)"),
    ("sink.timeout_secs", "HTTP request timeout in seconds"),
    ("tracking.scroll_milestones", "Comma-separated ascending percentages"),
    ("tracking.element_text_limit", "Characters of element text kept"),
    ("tracking.capture_errors", "true|false"),
    ("tracking.performance", "true|false"),
    ("export.dir", "Directory for user study exports"),
    ("logging.level", "trace|debug|info|warn|error"),
];

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "sink.kind")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    /// Execute the config command against the file at `config_path`
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(format, config_path),
            ConfigCommand::Set { key, value } => {
                self.execute_set(key, value, format, config_path)
            }
            ConfigCommand::Validate => self.execute_validate(format, config_path),
        }
    }

    fn execute_show(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let formatter = get_formatter(format);
        let config = Config::load_or_default(config_path);

        info!(config_path = %config_path.display(), "Showing configuration");

        if format.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", config_path.display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }
        }

        Ok(())
    }

    fn execute_set(
        &self,
        key: &str,
        value: &str,
        format: OutputFormat,
        config_path: &Path,
    ) -> Result<()> {
        let formatter = get_formatter(format);
        let mut config = Config::load_or_default(config_path);

        info!(key = %key, value = %value, "Setting configuration value");

        if let Err(e) = apply_config_value(&mut config, key, value) {
            if format.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "error": e.to_string(),
                }));
            } else {
                formatter.error(&format!("Failed to set '{}': {}", key, e));
                formatter.info("");
                formatter.info("Supported keys:");
                for (name, help) in SUPPORTED_KEYS {
                    formatter.info(&format!("  {:<36} - {}", name, help));
                }
            }
            return Ok(());
        }

        // Validate the new config before saving
        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            if format.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "errors": messages,
                }));
            } else {
                formatter.error(&format!(
                    "Invalid value for '{}': {}",
                    key,
                    messages.join("; ")
                ));
            }
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create configuration directory")?;
        }
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
        std::fs::write(config_path, &yaml).context("Failed to write configuration file")?;

        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "key": key,
                "value": value,
                "config_path": config_path.display().to_string(),
            }));
        } else {
            formatter.success(&format!("Set {} = {}", key, value));
            formatter.info(&format!("Saved to {}", config_path.display()));
        }

        Ok(())
    }

    fn execute_validate(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let formatter = get_formatter(format);

        // Load explicitly so parse errors are reported instead of defaulted
        let config = match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                let message = if config_path.exists() {
                    format!("Failed to parse configuration: {}", e)
                } else {
                    "Configuration file not found. Using defaults.".to_string()
                };
                if format.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [message],
                    }));
                } else if config_path.exists() {
                    formatter.error(&message);
                    formatter.info(&format!("File: {}", config_path.display()));
                } else {
                    formatter.info(&format!(
                        "Configuration file not found at {}",
                        config_path.display()
                    ));
                    formatter.info(
                        "Using default configuration. Run 'sitepulse config set <key> <value>' to create one.",
                    );
                }
                return Ok(());
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");

        let errors = config.validate();

        if format.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", config_path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.info(&format!("File: {}", config_path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        Ok(())
    }
}

/// Apply a dot-notation key/value pair to a Config struct
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- analytics ---
        "analytics.measurement_id" => {
            config.analytics.measurement_id = value.to_string();
        }
        "analytics.track_initial_page_view" => {
            config.analytics.track_initial_page_view = parse_bool(key, value)?;
        }

        // --- sink ---
        "sink.kind" => {
            config.sink.kind = value.to_string();
        }
        "sink.endpoint" => {
            config.sink.endpoint = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.to_string())
            };
        }
        "sink.timeout_secs" => {
            config.sink.timeout_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for sink.timeout_secs")?;
        }

        // --- tracking ---
        "tracking.scroll_milestones" => {
            config.tracking.scroll_milestones = value
                .split(',')
                .map(|m| m.trim().parse::<u8>())
                .collect::<Result<Vec<_>, _>>()
                .context("Expected comma-separated percentages, e.g. 25,50,75,100")?;
        }
        "tracking.element_text_limit" => {
            config.tracking.element_text_limit = value
                .parse::<usize>()
                .context("Expected a positive integer")?;
        }
        "tracking.capture_errors" => {
            config.tracking.capture_errors = parse_bool(key, value)?;
        }
        "tracking.performance" => {
            config.tracking.performance = parse_bool(key, value)?;
        }

        // --- export ---
        "export.dir" => {
            config.export.dir = PathBuf::from(value);
        }

        // --- logging ---
        "logging.level" => {
            config.logging.level = value.to_string();
        }

        _ => {
            anyhow::bail!("Unknown configuration key: '{}'", key);
        }
    }

    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("Expected true or false for {}", key),
    }
}
