//! Configuration Types
//!
//! All configuration structures with behavior-preserving defaults.
//! Supports global (~/.config/reviewgen/) and project (.reviewgen/) level
//! configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::provider::{ProviderConfig, SharedProvider, create_provider};
use crate::ai::retry::RetryPolicy;
use crate::constants::{admission, document, network, retry};
use crate::pipeline::{OrchestratorConfig, PipelineConfig};
use crate::types::{Result, ReviewError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Generation chain tuning
    pub generation: GenerationConfig,

    /// Provider chain settings
    pub providers: ProvidersConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            generation: GenerationConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ReviewError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        let generation = &self.generation;

        if generation.backoff_multiplier < 1.0 {
            return Err(ReviewError::Config(format!(
                "backoff_multiplier must be at least 1.0, got {}",
                generation.backoff_multiplier
            )));
        }

        if generation.section_count == 0 || generation.section_count > document::MAX_SECTIONS {
            return Err(ReviewError::Config(format!(
                "section_count must be between 1 and {}, got {}",
                document::MAX_SECTIONS,
                generation.section_count
            )));
        }

        // A zero maximum disables the admission delay entirely, so the
        // bound ordering only matters when the delay is active.
        if generation.admission_delay_max_ms != 0
            && generation.admission_delay_min_ms > generation.admission_delay_max_ms
        {
            return Err(ReviewError::Config(format!(
                "admission_delay_min_ms ({}) exceeds admission_delay_max_ms ({})",
                generation.admission_delay_min_ms, generation.admission_delay_max_ms
            )));
        }

        if generation.stage_timeout_secs == 0 {
            return Err(ReviewError::Config(
                "stage_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.providers.order.is_empty() {
            return Err(ReviewError::Config(
                "providers.order must name at least one provider".to_string(),
            ));
        }

        for name in &self.providers.order {
            if self.providers.for_name(name).is_none() {
                return Err(ReviewError::Config(format!(
                    "Unknown provider in order: {}. Supported: openai, gemini, groq",
                    name
                )));
            }
        }

        for config in [
            &self.providers.openai,
            &self.providers.gemini,
            &self.providers.groq,
        ] {
            if !(0.0..=2.0).contains(&config.temperature) {
                return Err(ReviewError::Config(format!(
                    "{} temperature must be between 0.0 and 2.0, got {}",
                    config.provider, config.temperature
                )));
            }
            if config.timeout_secs == 0 {
                return Err(ReviewError::Config(format!(
                    "{} timeout_secs must be greater than 0",
                    config.provider
                )));
            }
        }

        Ok(())
    }

    /// Orchestrator tuning derived from this configuration
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let generation = &self.generation;
        OrchestratorConfig {
            admission_delay_ms: (
                generation.admission_delay_min_ms,
                generation.admission_delay_max_ms,
            ),
            pipeline: PipelineConfig {
                retry: RetryPolicy::new(
                    generation.max_retries,
                    Duration::from_millis(generation.initial_delay_ms),
                    generation.backoff_multiplier,
                ),
                section_count: generation.section_count,
                stage_timeout: Duration::from_secs(generation.stage_timeout_secs),
            },
        }
    }

    /// Instantiate the provider chain in configured order
    pub fn build_provider_chain(&self) -> Result<Vec<SharedProvider>> {
        self.providers
            .order
            .iter()
            .map(|name| {
                let config = self.providers.for_name(name).ok_or_else(|| {
                    ReviewError::Config(format!("Unknown provider in order: {}", name))
                })?;
                create_provider(config)
            })
            .collect()
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Retries after the initial attempt, per model call
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,

    /// Backoff multiplier applied after every failed attempt
    pub backoff_multiplier: f32,

    /// Outline section count for blog-style documents
    pub section_count: usize,

    /// Lower bound of the randomized admission delay, in milliseconds
    pub admission_delay_min_ms: u64,

    /// Upper bound of the randomized admission delay; 0 disables the delay
    pub admission_delay_max_ms: u64,

    /// Deadline for each individual model call, in seconds
    pub stage_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: retry::MAX_RETRIES,
            initial_delay_ms: retry::INITIAL_DELAY_MS,
            backoff_multiplier: retry::BACKOFF_MULTIPLIER,
            section_count: document::SECTION_COUNT,
            admission_delay_min_ms: admission::MIN_DELAY_MS,
            admission_delay_max_ms: admission::MAX_DELAY_MS,
            stage_timeout_secs: network::DEFAULT_TIMEOUT_SECS,
        }
    }
}

// =============================================================================
// Provider Chain Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Fallback order; earlier providers are tried first
    pub order: Vec<String>,

    pub openai: ProviderConfig,
    pub gemini: ProviderConfig,
    pub groq: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            order: vec![
                "openai".to_string(),
                "gemini".to_string(),
                "groq".to_string(),
            ],
            openai: ProviderConfig {
                provider: "openai".to_string(),
                ..Default::default()
            },
            gemini: ProviderConfig {
                provider: "gemini".to_string(),
                ..Default::default()
            },
            groq: ProviderConfig {
                provider: "groq".to_string(),
                ..Default::default()
            },
        }
    }
}

impl ProvidersConfig {
    pub fn for_name(&self, name: &str) -> Option<&ProviderConfig> {
        match name {
            "openai" => Some(&self.openai),
            "gemini" => Some(&self.gemini),
            "groq" => Some(&self.groq),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.generation.max_retries, 2);
        assert_eq!(config.generation.section_count, 6);
        assert_eq!(config.providers.order, vec!["openai", "gemini", "groq"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_multiplier() {
        let mut config = Config::default();
        config.generation.backoff_multiplier = 0.5;
        assert!(matches!(config.validate(), Err(ReviewError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_admission_bounds() {
        let mut config = Config::default();
        config.generation.admission_delay_min_ms = 5000;
        config.generation.admission_delay_max_ms = 1000;
        assert!(matches!(config.validate(), Err(ReviewError::Config(_))));
    }

    #[test]
    fn test_zero_admission_max_disables_delay() {
        // Setting only the maximum to 0 is the documented disable switch
        // and must pass validation even though the default minimum exceeds it
        let mut config = Config::default();
        config.generation.admission_delay_max_ms = 0;
        assert!(config.validate().is_ok());
        assert_eq!(config.orchestrator_config().admission_delay_ms.1, 0);
    }

    #[test]
    fn test_validate_rejects_unknown_provider_in_order() {
        let mut config = Config::default();
        config.providers.order = vec!["openai".to_string(), "mystery".to_string()];
        assert!(matches!(config.validate(), Err(ReviewError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_sections() {
        let mut config = Config::default();
        config.generation.section_count = 0;
        assert!(matches!(config.validate(), Err(ReviewError::Config(_))));
    }

    #[test]
    fn test_orchestrator_config_carries_tuning() {
        let mut config = Config::default();
        config.generation.max_retries = 5;
        config.generation.section_count = 4;
        config.generation.admission_delay_max_ms = 0;
        config.generation.admission_delay_min_ms = 0;

        let orchestrator = config.orchestrator_config();
        assert_eq!(orchestrator.pipeline.retry.max_retries, 5);
        assert_eq!(orchestrator.pipeline.section_count, 4);
        assert_eq!(orchestrator.admission_delay_ms, (0, 0));
    }
}
