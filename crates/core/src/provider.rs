use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Missing API key for {provider_name}: set {env_var} or chat_api_key in config.json")]
    MissingApiKey {
        provider_name: String,
        env_var: String,
    },
}

/// OpenAI-compatible chat completion backends.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Sambanova,
    Openai,
    Grok,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub model: &'static str,
    pub env_var: &'static str,
    /// Older variable name still honored when `env_var` is unset.
    pub legacy_env_var: Option<&'static str>,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Sambanova => ProviderConfig {
                api_url: "https://api.sambanova.ai/v1/chat/completions",
                model: "Meta-Llama-3.3-70B-Instruct",
                env_var: "SAMBANOVA_API_KEY",
                legacy_env_var: Some("SN_API_KEY"),
            },
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1/chat/completions",
                model: "gpt-4o-mini",
                env_var: "OPENAI_API_KEY",
                legacy_env_var: None,
            },
            Provider::Grok => ProviderConfig {
                api_url: "https://api.x.ai/v1/chat/completions",
                model: "grok-4-fast",
                env_var: "XAI_API_KEY",
                legacy_env_var: None,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Sambanova => "SambaNova",
            Provider::Openai => "OpenAI",
            Provider::Grok => "Grok",
        }
    }

    /// Resolve the API key, preferring the provider's environment variable
    /// over the value from the config file.
    pub fn resolve_api_key(&self, configured: Option<&str>) -> Result<String, ProviderError> {
        let from_env = self.key_from_env(|name| std::env::var(name).ok());
        self.pick_api_key(from_env, configured)
    }

    /// First non-blank key among the provider's environment variables.
    pub fn key_from_env(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        let config = self.config();
        std::iter::once(config.env_var)
            .chain(config.legacy_env_var)
            .filter_map(|name| lookup(name))
            .find(|key| !key.trim().is_empty())
    }

    pub fn pick_api_key(
        &self,
        from_env: Option<String>,
        configured: Option<&str>,
    ) -> Result<String, ProviderError> {
        from_env
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                configured
                    .filter(|key| !key.trim().is_empty())
                    .map(str::to_string)
            })
            .ok_or_else(|| ProviderError::MissingApiKey {
                provider_name: self.name().to_string(),
                env_var: self.config().env_var.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_overrides_configured_key() {
        let key = Provider::Sambanova
            .pick_api_key(Some("from-env".into()), Some("from-file"))
            .unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn blank_env_key_falls_back_to_config() {
        let key = Provider::Openai
            .pick_api_key(Some("  ".into()), Some("from-file"))
            .unwrap();
        assert_eq!(key, "from-file");
    }

    #[test]
    fn missing_key_names_the_env_var() {
        let err = Provider::Grok.pick_api_key(None, None).unwrap_err();
        assert!(err.to_string().contains("XAI_API_KEY"));
    }

    #[test]
    fn legacy_sambanova_variable_is_still_read() {
        let key = Provider::Sambanova
            .key_from_env(|name| (name == "SN_API_KEY").then(|| "legacy".to_string()));
        assert_eq!(key.as_deref(), Some("legacy"));
    }

    #[test]
    fn current_variable_wins_over_legacy() {
        let key = Provider::Sambanova.key_from_env(|name| match name {
            "SAMBANOVA_API_KEY" => Some("current".to_string()),
            "SN_API_KEY" => Some("legacy".to_string()),
            _ => None,
        });
        assert_eq!(key.as_deref(), Some("current"));
    }

    #[test]
    fn provider_names_deserialize_lowercase() {
        let provider: Provider = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(provider, Provider::Openai);
    }
}
