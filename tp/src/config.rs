//! TripCrew configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Main TripCrew configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Pipeline behaviour
    pub pipeline: PipelineConfig,

    /// Values used when auto-filling or estimating
    pub defaults: DefaultsConfig,

    /// Research cache policy
    pub cache: CacheConfig,

    /// Booking link policy
    pub booking: BookingConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the LLM API key environment variable is set. Call this
    /// before building LLM-backed agents to fail fast with a clear message.
    pub fn validate(&self) -> Result<()> {
        debug!(api_key_env = %self.llm.api_key_env, "Config::validate: called");
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::implicit_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Peek at `log-level` before logging is initialized
    ///
    /// Never fails: any read or parse problem yields `None` and the full
    /// `load` reports it later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = match config_path {
            Some(p) => Some(p.clone()),
            None => Self::implicit_paths().into_iter().find(|p| p.exists()),
        }?;

        let content = fs::read_to_string(path).ok()?;
        let value: serde_yaml::Value = serde_yaml::from_str(&content).ok()?;
        value.get("log-level")?.as_str().map(str::to_string)
    }

    /// ./.tripcrew.yml then ~/.config/tripcrew/tripcrew.yml
    fn implicit_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".tripcrew.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("tripcrew").join("tripcrew.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("openai" compatible; "gemini" is an alias)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL (the `/chat/completions` path is appended)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            max_tokens: 4000,
            temperature: 0.3,
            timeout_ms: 300_000,
        }
    }
}

/// What to do with curated activities naming another city's landmark
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForeignAttractionPolicy {
    /// Log and record a warning on the itinerary
    #[default]
    Warn,
    /// Drop the offending activities
    Remove,
}

/// Pipeline behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Halt with clarification questions when required fields are missing
    #[serde(rename = "ask-if-missing")]
    pub ask_if_missing: bool,

    /// Treat an absent budget as a required field
    #[serde(rename = "budget-required")]
    pub budget_required: bool,

    /// Maximum concurrent capability calls
    #[serde(rename = "worker-pool-size")]
    pub worker_pool_size: usize,

    /// Per-capability call timeout in milliseconds
    #[serde(rename = "capability-timeout-ms")]
    pub capability_timeout_ms: u64,

    #[serde(rename = "foreign-attraction-policy")]
    pub foreign_attraction_policy: ForeignAttractionPolicy,
}

impl PipelineConfig {
    pub fn capability_timeout(&self) -> Duration {
        Duration::from_millis(self.capability_timeout_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ask_if_missing: true,
            budget_required: false,
            worker_pool_size: 4,
            capability_timeout_ms: 300_000,
            foreign_attraction_policy: ForeignAttractionPolicy::Warn,
        }
    }
}

/// Values used when auto-filling or estimating
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Trip length when no end date or duration is known
    #[serde(rename = "trip-days")]
    pub trip_days: u32,

    /// Budget substituted for an absent or too-small budget
    #[serde(rename = "budget-usd")]
    pub budget_usd: u32,

    /// Budgets below this are treated as not supplied
    #[serde(rename = "min-budget-usd")]
    pub min_budget_usd: u32,

    pub travelers: String,

    /// Flight cost used when no priced flight is chosen
    #[serde(rename = "flight-estimate-usd")]
    pub flight_estimate_usd: u32,

    /// Food/transport estimate per day when no budget was supplied
    #[serde(rename = "incidentals-per-day-usd")]
    pub incidentals_per_day_usd: u32,

    /// Nightly rate when neither the hotel nor the estimator has one
    #[serde(rename = "hotel-nightly-fallback-usd")]
    pub hotel_nightly_fallback_usd: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            trip_days: 3,
            budget_usd: 2000,
            min_budget_usd: 100,
            travelers: "1".to_string(),
            flight_estimate_usd: 500,
            incidentals_per_day_usd: 50,
            hotel_nightly_fallback_usd: 100,
        }
    }
}

/// Research cache policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(rename = "ttl-hours")]
    pub ttl_hours: u64,

    /// Clear the whole cache at the start of every run
    #[serde(rename = "clear-per-run")]
    pub clear_per_run: bool,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours.saturating_mul(3600))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: tripcache::DEFAULT_TTL_HOURS,
            clear_per_run: true,
        }
    }
}

/// Booking link policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Hosts (and their subdomains) accepted for hotel booking URLs
    #[serde(rename = "trusted-hotel-domains")]
    pub trusted_hotel_domains: Vec<String>,

    /// Search page that untrusted hotel URLs are rewritten to
    #[serde(rename = "hotel-search-url")]
    pub hotel_search_url: String,

    /// Booking URL for placeholder flights
    #[serde(rename = "flight-search-url")]
    pub flight_search_url: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            trusted_hotel_domains: vec!["booking.com".to_string()],
            hotel_search_url: "https://www.booking.com/searchresults.html".to_string(),
            flight_search_url: "https://www.google.com/flights".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "openai");
        assert!(config.pipeline.ask_if_missing);
        assert!(!config.pipeline.budget_required);
        assert_eq!(config.defaults.trip_days, 3);
        assert_eq!(config.defaults.budget_usd, 2000);
        assert_eq!(config.cache.ttl_hours, 24);
        assert!(config.cache.clear_per_run);
        assert_eq!(config.booking.trusted_hotel_domains, vec!["booking.com".to_string()]);
    }

    #[test]
    fn test_cache_ttl_saturates() {
        let cache = CacheConfig {
            ttl_hours: u64::MAX,
            ..Default::default()
        };
        assert_eq!(cache.ttl(), Duration::from_secs(u64::MAX));
        assert_eq!(CacheConfig::default().ttl(), Duration::from_secs(24 * 3600));
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
llm:
  model: gpt-4o-mini
  api-key-env: OPENAI_API_KEY
  base-url: https://api.openai.com/v1
pipeline:
  ask-if-missing: false
  budget-required: true
  worker-pool-size: 2
  foreign-attraction-policy: remove
defaults:
  trip-days: 5
  budget-usd: 3000
cache:
  ttl-hours: 1
  clear-per-run: false
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert!(!config.pipeline.ask_if_missing);
        assert!(config.pipeline.budget_required);
        assert_eq!(config.pipeline.worker_pool_size, 2);
        assert_eq!(config.pipeline.foreign_attraction_policy, ForeignAttractionPolicy::Remove);
        assert_eq!(config.defaults.trip_days, 5);
        assert_eq!(config.defaults.budget_usd, 3000);
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert!(!config.cache.clear_per_run);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gemini-1.5-pro
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(config.defaults.min_budget_usd, 100);
        assert_eq!(config.pipeline.foreign_attraction_policy, ForeignAttractionPolicy::Warn);
    }

    #[test]
    fn test_load_explicit_path_and_log_level() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log-level: WARN\ndefaults:\n  trip-days: 7").unwrap();
        let path = file.path().to_path_buf();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.defaults.trip_days, 7);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/tripcrew.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    fn test_validate_reports_missing_key() {
        let mut config = Config::default();
        config.llm.api_key_env = "TRIPCREW_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TRIPCREW_TEST_KEY_THAT_IS_NEVER_SET"));
    }
}
