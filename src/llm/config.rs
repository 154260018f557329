use std::fmt;
use std::time::Duration;

use crate::error::{Result, SalaryAnalystError};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANALYSIS_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "OPENAI_MODEL";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

#[derive(Clone)]
pub struct AgentConfig {
    pub api_key: String,
    pub model: String,
    /// Base of an OpenAI-compatible API, without the trailing `/chat/completions`.
    pub base_url: String,
    pub analysis_temperature: f64,
    pub timeout: Duration,
}

impl AgentConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            analysis_temperature: DEFAULT_ANALYSIS_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads `OPENAI_API_KEY`, `OPENAI_MODEL` and `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = non_empty(API_KEY_ENV).ok_or_else(|| {
            SalaryAnalystError::Configuration(format!(
                "{} not found. Set it in the environment or in a .env file.",
                API_KEY_ENV
            ))
        })?;

        let mut config = Self::new(api_key.trim());
        if let Some(model) = non_empty(MODEL_ENV) {
            config.model = model.trim().to_string();
        }
        if let Some(base_url) = non_empty(BASE_URL_ENV) {
            config = config.with_base_url(base_url.trim());
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_analysis_temperature(mut self, temperature: f64) -> Self {
        self.analysis_temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("analysis_temperature", &self.analysis_temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = AgentConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, SalaryAnalystError::Configuration(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        assert!(AgentConfig::from_lookup(lookup(&[(API_KEY_ENV, "  ")])).is_err());
    }

    #[test]
    fn test_defaults_and_overrides() {
        let config = AgentConfig::from_lookup(lookup(&[(API_KEY_ENV, "sk-test")])).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.analysis_temperature, DEFAULT_ANALYSIS_TEMPERATURE);

        let config = AgentConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "sk-test"),
            (MODEL_ENV, "gpt-4o-mini"),
            (BASE_URL_ENV, "http://localhost:8080/v1/"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AgentConfig::new("sk-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
