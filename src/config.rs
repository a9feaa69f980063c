use std::env;

use url::Url;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Settings for talking to the Gemini API.
///
/// The credential is kept optional here; whether its absence is fatal is
/// decided when the client is built.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Config {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Read the credential from the process environment.
    pub fn from_env(model: Option<String>) -> Self {
        let api_key = env::var(API_KEY_VAR).ok();
        Self::new(api_key, model.unwrap_or_else(|| DEFAULT_MODEL.to_string()))
    }

    pub fn generate_content_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_counts_as_missing() {
        assert!(Config::new(Some("   ".into()), DEFAULT_MODEL).api_key.is_none());
        assert!(Config::new(None, DEFAULT_MODEL).api_key.is_none());
        assert_eq!(
            Config::new(Some("abc".into()), DEFAULT_MODEL).api_key.as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn endpoint_targets_the_configured_model() {
        let mut config = Config::new(Some("abc".into()), "gemini-2.5-pro");
        config.base_url = "https://example.test/v1beta/".into();
        let url = config.generate_content_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.test/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }
}
