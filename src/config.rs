//! Configuration types for the tutor.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, TutorError};

/// Environment variable that supplies the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Remote generation settings.
    pub gemini: GeminiConfig,
    /// Local fallback generator settings.
    pub fallback: FallbackConfig,
    /// Speech output settings.
    pub voice: VoiceConfig,
}

/// One remote model tried during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCandidate {
    /// Model identifier passed to the API.
    pub name: String,
    /// Whether an attached image is sent to this model.
    #[serde(default)]
    pub accepts_images: bool,
}

impl ModelCandidate {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accepts_images: false,
        }
    }

    pub fn multimodal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accepts_images: true,
        }
    }
}

/// Gemini API configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key. Empty means the remote path is disabled.
    ///
    /// The `GEMINI_API_KEY` environment variable takes precedence.
    pub api_key: String,
    /// API root, without the `/v1beta` suffix.
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Top-k sampling.
    pub top_k: u32,
    /// Top-p (nucleus) sampling threshold.
    pub top_p: f64,
    /// Maximum tokens per reply.
    pub max_output_tokens: u32,
    /// Deadline for a single candidate attempt, in seconds.
    pub request_timeout_secs: u64,
    /// Candidates in priority order. Tried first to last, never reordered.
    pub models: Vec<ModelCandidate>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("temperature", &self.temperature)
            .field("top_k", &self.top_k)
            .field("top_p", &self.top_p)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com".to_owned(),
            models: vec![
                ModelCandidate::text("gemini-2.5-pro"),
                ModelCandidate::text("gemini-flash-latest"),
                ModelCandidate::text("gemini-1.5-pro"),
                ModelCandidate::text("gemini-1.5-flash"),
                ModelCandidate::multimodal("nano-banana"),
            ],
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
            request_timeout_secs: 30,
        }
    }
}

impl GeminiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Local fallback generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Lower bound of the cosmetic reply delay, in milliseconds.
    pub min_delay_ms: u64,
    /// Upper bound of the cosmetic reply delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 800,
            max_delay_ms: 2000,
        }
    }
}

/// Speech output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Synthesizer command (`say` on macOS, `espeak` elsewhere). Empty disables speech.
    pub command: String,
    /// Speaking rate passed to the synthesizer, in words per minute.
    pub rate_wpm: u32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            command: if cfg!(target_os = "macos") {
                "say".to_owned()
            } else {
                "espeak".to_owned()
            },
            rate_wpm: 160,
        }
    }
}

impl TutorConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| TutorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`TutorError::Config`] for a zero attempt deadline.
    pub fn validate(&self) -> Result<()> {
        if self.gemini.request_timeout_secs == 0 {
            return Err(TutorError::Config(
                "gemini.request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TutorError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load `path` if it exists, otherwise defaults; then apply the environment key.
    ///
    /// # Errors
    ///
    /// Returns an error only when an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// Override the API key with `key` when it is non-empty.
    pub fn apply_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key.map(|k| k.trim().to_owned()).filter(|k| !k.is_empty()) {
            self.gemini.api_key = key;
        }
    }

    /// Returns the default config file path: `<config dir>/tutor/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("tutor")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TutorConfig::default();
        assert_eq!(config.gemini.models.len(), 5);
        assert_eq!(config.gemini.models[0].name, "gemini-2.5-pro");
        assert!(config.gemini.models.iter().filter(|m| m.accepts_images).count() == 1);
        assert!(config.gemini.api_key.is_empty());
        assert!(config.fallback.min_delay_ms <= config.fallback.max_delay_ms);
        assert_eq!(config.gemini.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = TutorConfig::default();
        config.gemini.models = vec![ModelCandidate::text("gemini-1.5-flash")];
        config.gemini.temperature = 0.2;
        config.fallback.max_delay_ms = 10;

        config.save_to_file(&path).unwrap();
        let loaded = TutorConfig::from_file(&path).unwrap();
        assert_eq!(loaded.gemini.models, config.gemini.models);
        assert!((loaded.gemini.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(loaded.fallback.max_delay_ms, 10);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let toml_str = r#"
            [fallback]
            min_delay_ms = 0
        "#;
        let config: TutorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.fallback.min_delay_ms, 0);
        assert_eq!(config.fallback.max_delay_ms, 2000);
        assert_eq!(config.gemini.top_k, 40);
    }

    #[test]
    fn candidate_image_flag_defaults_off() {
        let toml_str = r#"
            [gemini]
            models = [{ name = "a" }, { name = "b", accepts_images = true }]
        "#;
        let config: TutorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.gemini.models,
            vec![ModelCandidate::text("a"), ModelCandidate::multimodal("b")]
        );
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "gemini = [").unwrap();
        assert!(matches!(
            TutorConfig::from_file(&path),
            Err(TutorError::Config(_))
        ));
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gemini]\nrequest_timeout_secs = 0\n").unwrap();
        let err = TutorConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, TutorError::Config(ref m) if m.contains("request_timeout_secs")));
        assert!(TutorConfig::load_or_default(&path).is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TutorConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.gemini.models.len(), 5);
    }

    #[test]
    fn api_key_override_ignores_blank_values() {
        let mut config = TutorConfig::default();
        config.gemini.api_key = "from-file".into();
        config.apply_api_key(Some("  ".into()));
        assert_eq!(config.gemini.api_key, "from-file");
        config.apply_api_key(None);
        assert_eq!(config.gemini.api_key, "from-file");
        config.apply_api_key(Some("from-env".into()));
        assert_eq!(config.gemini.api_key, "from-env");
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = GeminiConfig::default();
        config.api_key = "secret-value".into();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-value"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn default_path_ends_with_tutor_config() {
        let path = TutorConfig::default_config_path();
        assert!(path.ends_with("tutor/config.toml"));
    }
}
