use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{HrDeskError, Result};

/// Top-level configuration for HR Desk.
///
/// Loaded from `~/.hrdesk/config.toml` by default. Missing sections and
/// fields fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HrDeskConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl HrDeskConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HrDeskConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing
    /// or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the conversation logic cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.chat.escalation_threshold == 0 {
            return Err(HrDeskError::Config(
                "chat.escalation_threshold must be at least 1".to_string(),
            ));
        }
        if self.chat.max_message_length == 0 {
            return Err(HrDeskError::Config(
                "chat.max_message_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Consecutive unmatched inputs before escalation is offered.
    pub escalation_threshold: u32,
    /// Maximum accepted message length in characters.
    pub max_message_length: usize,
    /// Simulated HR backend latency in milliseconds.
    pub backend_latency_ms: u64,
    /// Delay before a user message is marked as sent, in milliseconds.
    pub delivery_delay_ms: u64,
    /// Optional JSON rule set replacing the bundled one.
    pub rules_path: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: 3,
            max_message_length: 2000,
            backend_latency_ms: 1000,
            delivery_delay_ms: 500,
            rules_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = HrDeskConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.chat.escalation_threshold, 3);
        assert_eq!(config.chat.max_message_length, 2000);
        assert_eq!(config.chat.backend_latency_ms, 1000);
        assert_eq!(config.chat.delivery_delay_ms, 500);
        assert!(config.chat.rules_path.is_none());
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"

[chat]
escalation_threshold = 5
max_message_length = 500
backend_latency_ms = 0
delivery_delay_ms = 0
rules_path = "/etc/hrdesk/rules.json"
"#;
        let file = create_temp_config(content);
        let config = HrDeskConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.chat.escalation_threshold, 5);
        assert_eq!(config.chat.max_message_length, 500);
        assert_eq!(config.chat.backend_latency_ms, 0);
        assert_eq!(
            config.chat.rules_path.as_deref(),
            Some("/etc/hrdesk/rules.json")
        );
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[chat]
backend_latency_ms = 10
"#;
        let file = create_temp_config(content);
        let config = HrDeskConfig::load(file.path()).unwrap();
        assert_eq!(config.chat.backend_latency_ms, 10);
        assert_eq!(config.chat.escalation_threshold, 3);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let file = create_temp_config("");
        let config = HrDeskConfig::load(file.path()).unwrap();
        assert_eq!(config.chat.escalation_threshold, 3);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let file = create_temp_config("[chat\nescalation_threshold = ");
        let result = HrDeskConfig::load(file.path());
        assert!(matches!(result, Err(HrDeskError::Config(_))));
    }

    #[test]
    fn test_load_zero_threshold_rejected() {
        let file = create_temp_config("[chat]\nescalation_threshold = 0\n");
        let result = HrDeskConfig::load(file.path());
        assert!(matches!(result, Err(HrDeskError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = HrDeskConfig::load(Path::new("/nonexistent/hrdesk/config.toml"));
        assert!(matches!(result, Err(HrDeskError::Io(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = HrDeskConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.chat.escalation_threshold, 3);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = HrDeskConfig::default();
        config.chat.escalation_threshold = 4;
        config.general.log_level = "warn".to_string();
        config.save(&path).unwrap();

        let loaded = HrDeskConfig::load(&path).unwrap();
        assert_eq!(loaded.chat.escalation_threshold, 4);
        assert_eq!(loaded.general.log_level, "warn");
    }
}
