use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::{AutotubeError, Result},
    provider::Provider,
};

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;

#[async_trait]
pub trait ScriptWriter: Send + Sync {
    /// Submit `prompt` and return the narration text.
    async fn write(&self, prompt: &str) -> Result<String>;
}

pub fn script_prompt(topic: &str) -> String {
    format!("Write a concise (~250 word) YouTube script about: {}", topic)
}

/// Script writer backed by an OpenAI-compatible chat completion endpoint.
pub struct ChatScriptWriter {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl ChatScriptWriter {
    pub fn new(provider: &Provider, model: &str, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: provider.config().api_url.to_string(),
            model: model.to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl ScriptWriter for ChatScriptWriter {
    async fn write(&self, prompt: &str) -> Result<String> {
        debug!(url = %self.api_url, model = %self.model, "requesting chat completion");

        let response = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt,
                    },
                ],
                "temperature": TEMPERATURE,
                "max_tokens": MAX_TOKENS,
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        completion_text(&response)
    }
}

/// Extract the trimmed text of the top choice.
pub fn completion_text(response: &serde_json::Value) -> Result<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| AutotubeError::ScriptFailed {
            reason: format!("Invalid API response: {:?}", response),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_topic_verbatim() {
        assert_eq!(
            script_prompt("Deep Sea Vents"),
            "Write a concise (~250 word) YouTube script about: Deep Sea Vents"
        );
    }

    #[test]
    fn completion_text_is_trimmed() {
        let response = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "\n  Hello there.  \n"}}]
        });
        assert_eq!(completion_text(&response).unwrap(), "Hello there.");
    }

    #[test]
    fn missing_choices_is_a_script_failure() {
        let response = serde_json::json!({"error": {"message": "bad key"}});
        assert!(matches!(
            completion_text(&response),
            Err(AutotubeError::ScriptFailed { .. })
        ));
    }
}
