// src/config.rs
use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_UNLOCK_SECRET: &str = "larenva";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub bind_addr: String,
    pub unlock_secret: String,
    pub launch_delay: Duration,
    pub languages: Languages,
    pub max_image_dimension: u32,
    pub static_dir: Option<PathBuf>,
}

/// Language pair used by the generation instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Languages {
    /// Language of generated prompts and spoken lines.
    pub narrative: String,
    /// Language of the premium rewrite.
    pub translation: String,
}

impl Default for Languages {
    fn default() -> Self {
        Self {
            narrative: "Indonesian".to_string(),
            translation: "English".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("GEMINI_API_KEY must be set"))?;

        let launch_delay_ms: u64 = var("LAUNCH_DELAY_MS", "1800")
            .parse()
            .context("LAUNCH_DELAY_MS must be a non-negative integer")?;
        let max_image_dimension: u32 = var("MAX_IMAGE_DIMENSION", "2048")
            .parse()
            .context("MAX_IMAGE_DIMENSION must be a positive integer")?;
        if max_image_dimension == 0 {
            return Err(anyhow!("MAX_IMAGE_DIMENSION must be a positive integer"));
        }

        let defaults = Languages::default();

        Ok(Self {
            api_key,
            model: var("GEMINI_MODEL", DEFAULT_MODEL),
            api_base: var("GEMINI_API_BASE", DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            bind_addr: var("BIND_ADDR", "0.0.0.0:8080"),
            unlock_secret: var("UNLOCK_SECRET", DEFAULT_UNLOCK_SECRET),
            launch_delay: Duration::from_millis(launch_delay_ms),
            languages: Languages {
                narrative: var("NARRATIVE_LANGUAGE", &defaults.narrative),
                translation: var("TRANSLATION_LANGUAGE", &defaults.translation),
            },
            max_image_dimension,
            static_dir: lookup("STATIC_DIR").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.unlock_secret, "larenva");
        assert_eq!(config.launch_delay, Duration::from_millis(1800));
        assert_eq!(config.languages, Languages::default());
        assert_eq!(config.max_image_dimension, 2048);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn bad_delay_names_the_variable() {
        let err = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("LAUNCH_DELAY_MS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("LAUNCH_DELAY_MS"));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_API_BASE", "http://localhost:9000/"),
            ("LAUNCH_DELAY_MS", "0"),
            ("TRANSLATION_LANGUAGE", "French"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "http://localhost:9000");
        assert!(config.launch_delay.is_zero());
        assert_eq!(config.languages.translation, "French");
    }
}
