//! Configuration loading for text-guards
//!
//! Supports TOML configuration with embedded defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{GuardError, Result};
use crate::guard::{ExhaustionPolicy, GuardConfig};

/// General configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default retry budget for every guard (validated to be >= 0)
    pub retries: i64,

    /// What a guard does once its retries run out
    pub on_exhaustion: ExhaustionPolicy,

    /// Enable audit logging
    pub audit_log: bool,

    /// Path to audit log file
    pub audit_path: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            on_exhaustion: ExhaustionPolicy::ReturnLast,
            audit_log: true,
            audit_path: Some("~/.config/text-guards/audit.jsonl".to_string()),
        }
    }
}

/// Protected-string guard section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StringSection {
    /// Strings the output must not reproduce
    pub protected: Vec<String>,

    /// Fraction of a protected string that may appear before triggering
    pub leniency: f64,

    /// Overrides `general.retries`
    pub retries: Option<i64>,
}

impl Default for StringSection {
    fn default() -> Self {
        Self {
            protected: Vec::new(),
            leniency: 1.0,
            retries: None,
        }
    }
}

/// Pattern-based custom guard section
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CustomSection {
    /// Regexes; any match is a violation
    pub deny_patterns: Vec<String>,

    /// Overrides `general.retries`
    pub retries: Option<i64>,
}

/// Judge-backed restriction guard section
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RestrictionSection {
    /// Natural-language restrictions, e.g. "must not mention prices"
    pub restrictions: Vec<String>,

    /// Shell command that reads a judgment prompt on stdin
    pub judge_command: Option<String>,

    /// Overrides `general.retries`
    pub retries: Option<i64>,
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub string: StringSection,
    pub custom: CustomSection,
    pub restriction: RestrictionSection,
}

impl Config {
    /// Load configuration from the first standard location that exists
    ///
    /// Defaults apply only when no config file is present; a file that
    /// exists but cannot be read or parsed is an error.
    pub fn load() -> Result<Self> {
        Self::load_first([
            // User-specific config
            dirs::config_dir().map(|p| p.join("text-guards/config.toml")),
            // System-wide config
            Some(PathBuf::from("/etc/text-guards/config.toml")),
        ]
        .into_iter()
        .flatten())
    }

    /// Load the first existing path, or defaults if none exists
    pub fn load_first<I>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for path in paths {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        // Return defaults
        Ok(Config::default())
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GuardError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| GuardError::config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Expand ~ in path strings
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get the audit log path (expanded)
    pub fn audit_path(&self) -> Option<PathBuf> {
        self.general.audit_path.as_ref().map(|p| Self::expand_path(p))
    }

    /// Guard settings for a section, falling back to the general budget
    pub fn guard_config(&self, section_retries: Option<i64>) -> Result<GuardConfig> {
        let retries = section_retries.unwrap_or(self.general.retries);
        GuardConfig::from_signed(retries, self.general.on_exhaustion)
    }

    /// Validate everything that can be checked without building predicates
    pub fn validate(&self) -> Result<()> {
        self.guard_config(None)?;
        self.guard_config(self.string.retries)?;
        self.guard_config(self.custom.retries)?;
        self.guard_config(self.restriction.retries)?;

        if !self.restriction.restrictions.is_empty() && self.restriction.judge_command.is_none() {
            return Err(GuardError::config(
                "restriction.restrictions is set but restriction.judge_command is missing",
            ));
        }

        Ok(())
    }
}

/// Embedded default configuration
pub const DEFAULT_CONFIG_TOML: &str = r#"
[general]
retries = 2
on_exhaustion = "return_last"
audit_log = true
audit_path = "~/.config/text-guards/audit.jsonl"

[string]
protected = []
leniency = 1.0

[custom]
deny_patterns = []

[restriction]
restrictions = []
"#;
