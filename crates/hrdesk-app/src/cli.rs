//! CLI argument definitions and terminal input parsing for the `hrdesk` binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// HR Desk: a keyword-matching HR support assistant for the terminal.
#[derive(Parser, Debug)]
#[command(name = "hrdesk", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// JSON rule set replacing the bundled HR responses.
    #[arg(short = 'r', long = "rules")]
    pub rules: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Answer immediately instead of simulating backend latency.
    #[arg(long = "no-delay")]
    pub no_delay: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > HRDESK_CONFIG env var > ~/.hrdesk/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("HRDESK_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the rule set path.
    ///
    /// Priority: --rules flag > HRDESK_RULES env var > config file value.
    /// `None` means the bundled rule set.
    pub fn resolve_rules_path(&self, config_rules: Option<&str>) -> Option<PathBuf> {
        if let Some(ref p) = self.rules {
            return Some(p.clone());
        }
        if let Ok(p) = std::env::var("HRDESK_RULES") {
            return Some(PathBuf::from(p));
        }
        config_rules.map(PathBuf::from)
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".hrdesk").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".hrdesk").join("config.toml");
    }
    PathBuf::from("config.toml")
}

// =============================================================================
// Terminal input
// =============================================================================

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Blank line.
    Empty,
    /// `/quit` or `/exit`.
    Quit,
    /// `/actions`: list the quick actions.
    ListActions,
    /// `/N`: fire quick action N (1-based on screen, stored 0-based).
    QuickAction(usize),
    /// Any other slash command.
    Unknown(String),
    /// Free text for the assistant.
    Text(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Input::Empty;
        }
        let Some(command) = trimmed.strip_prefix('/') else {
            return Input::Text(line.trim_end_matches(['\r', '\n']).to_string());
        };
        match command {
            "quit" | "exit" => Input::Quit,
            "actions" | "help" => Input::ListActions,
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => Input::QuickAction(n - 1),
                _ => Input::Unknown(trimmed.to_string()),
            },
        }
    }
}
