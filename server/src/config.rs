//! Service configuration from TOML and `ARENA_*` environment variables

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use arena_battle::AiConfig;
use serde::{Deserialize, Serialize};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "ARENA_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Computer opponent tuning
    pub ai: AiConfig,

    /// Idle time after which the waiting side may claim the win
    pub turn_timeout_secs: u64,

    /// Health of every character at battle start
    pub starting_health: u32,

    /// Whether computer opponents can be requested
    pub ai_enabled: bool,

    /// Character roster JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roster_path: Option<PathBuf>,

    /// Battle store file; battles stay in memory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battles_path: Option<PathBuf>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            turn_timeout_secs: 120,
            starting_health: 100,
            ai_enabled: true,
            roster_path: None,
            battles_path: None,
        }
    }
}

impl ArenaConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("Failed to parse arena config")
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Apply `ARENA_*` overrides; other variables are ignored
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();
            match name {
                "VENDETTA_RATIO" => self.ai.vendetta_ratio = parse_var(name, value)?,
                "AGGRESSION_THRESHOLD" => self.ai.aggression_threshold = parse_var(name, value)?,
                "MAX_CONSECUTIVE_TURNS" => self.ai.max_consecutive_turns = parse_var(name, value)?,
                "TURN_TIMEOUT_SECS" => self.turn_timeout_secs = parse_var(name, value)?,
                "STARTING_HEALTH" => self.starting_health = parse_var(name, value)?,
                "AI_ENABLED" => self.ai_enabled = parse_var(name, value)?,
                "ROSTER_PATH" => self.roster_path = Some(PathBuf::from(value)),
                "BATTLES_PATH" => self.battles_path = Some(PathBuf::from(value)),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("Invalid value for {ENV_PREFIX}{name}: {value:?}"))
}
