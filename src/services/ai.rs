use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the text-generation backend
#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("no usable text in model response")]
    EmptyResponse,
}

/// Cloudflare Workers AI client
///
/// Runs one prompt against one model per call. Every call carries the
/// client-level timeout; a timeout surfaces as a request error and is
/// treated by callers exactly like any other call failure. No retries.
pub struct WorkersAiClient {
    base_url: String,
    api_token: String,
    llm_model: String,
    translation_model: String,
    client: Client,
}

impl WorkersAiClient {
    pub fn new(
        base_url: String,
        api_token: String,
        llm_model: String,
        translation_model: String,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_token,
            llm_model,
            translation_model,
            client,
        }
    }

    pub fn llm_model(&self) -> &str {
        &self.llm_model
    }

    pub fn translation_model(&self) -> &str {
        &self.translation_model
    }

    /// Run a prompt against a model and return the raw response JSON.
    pub async fn run_model(&self, model: &str, prompt: &str) -> Result<Value, AiError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), model);
        let payload = json!({ "input": prompt });

        tracing::debug!("Workers AI request: {} ({} prompt bytes)", url, prompt.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AiError::ApiError(format!(
                "model call failed: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Run a prompt and pull the generated text out of the response.
    ///
    /// Collapses every failure mode (transport, non-2xx, unusable payload)
    /// to None; the pipeline stages turn that into their own degraded
    /// outcomes. Never propagates an error.
    pub async fn generate(&self, model: &str, prompt: &str) -> Option<String> {
        match self.run_model(model, prompt).await {
            Ok(body) => {
                let text = extract_text(&body);
                if text.is_none() {
                    tracing::warn!("Workers AI response had no usable text");
                }
                text
            }
            Err(e) => {
                tracing::warn!("Workers AI call failed: {}", e);
                None
            }
        }
    }
}

/// One response-shape reader. Each strategy is pure and returns the
/// trimmed text when its shape matches.
type TextStrategy = fn(&Value) -> Option<String>;

/// Known Workers AI response shapes, tried in order; first non-empty text
/// wins. Adding a model family with a new payload layout means appending
/// one function here.
const TEXT_STRATEGIES: &[TextStrategy] = &[
    result_response_field,
    result_text_field,
    output_text_blocks,
    any_output_block,
    message_content,
    top_level_output_text,
];

/// Extract generated text from a heterogeneous model response.
pub fn extract_text(body: &Value) -> Option<String> {
    TEXT_STRATEGIES.iter().find_map(|strategy| strategy(body))
}

fn non_blank(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `result.response` as a plain string.
fn result_response_field(body: &Value) -> Option<String> {
    non_blank(body.get("result")?.get("response")?)
}

/// `result.text` as a plain string.
fn result_text_field(body: &Value) -> Option<String> {
    non_blank(body.get("result")?.get("text")?)
}

fn output_blocks(body: &Value) -> Option<&Vec<Value>> {
    body.get("result")?.get("output")?.as_array()
}

/// `result.output[].content[]` items explicitly typed `output_text`.
fn output_text_blocks(body: &Value) -> Option<String> {
    output_blocks(body)?
        .iter()
        .filter_map(|out| out.get("content")?.as_array())
        .flatten()
        .find(|c| c.get("type").and_then(Value::as_str) == Some("output_text"))
        .and_then(|c| non_blank(c.get("text")?))
}

/// Any `result.output[].content[]` item carrying text.
fn any_output_block(body: &Value) -> Option<String> {
    output_blocks(body)?
        .iter()
        .filter_map(|out| out.get("content")?.as_array())
        .flatten()
        .find_map(|c| non_blank(c.get("text")?))
}

/// `result.message.content[]` items carrying text.
fn message_content(body: &Value) -> Option<String> {
    body.get("result")?
        .get("message")?
        .get("content")?
        .as_array()?
        .iter()
        .find_map(|c| non_blank(c.get("text")?))
}

/// Rare top-level `output_text` field.
fn top_level_output_text(body: &Value) -> Option<String> {
    non_blank(body.get("output_text")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_from_response_field() {
        let body = json!({"result": {"response": "  hello  "}});
        assert_eq!(extract_text(&body), Some("hello".to_string()));
    }

    #[test]
    fn test_extract_from_text_field() {
        let body = json!({"result": {"text": "hola"}});
        assert_eq!(extract_text(&body), Some("hola".to_string()));
    }

    #[test]
    fn test_prefers_output_text_typed_block() {
        let body = json!({"result": {"output": [
            {"content": [
                {"type": "reasoning", "text": "thinking..."},
                {"type": "output_text", "text": "the answer"}
            ]}
        ]}});
        assert_eq!(extract_text(&body), Some("the answer".to_string()));
    }

    #[test]
    fn test_falls_back_to_any_text_block() {
        let body = json!({"result": {"output": [
            {"content": [{"type": "something_else", "text": "still usable"}]}
        ]}});
        assert_eq!(extract_text(&body), Some("still usable".to_string()));
    }

    #[test]
    fn test_message_content_shape() {
        let body = json!({"result": {"message": {"content": [{"text": "from message"}]}}});
        assert_eq!(extract_text(&body), Some("from message".to_string()));
    }

    #[test]
    fn test_top_level_output_text() {
        let body = json!({"output_text": "rare shape"});
        assert_eq!(extract_text(&body), Some("rare shape".to_string()));
    }

    #[test]
    fn test_no_usable_text() {
        assert_eq!(extract_text(&json!({})), None);
        assert_eq!(extract_text(&json!({"result": {"response": "   "}})), None);
        assert_eq!(
            extract_text(&json!({"result": {"output": [{"content": []}]}})),
            None
        );
    }

    #[test]
    fn test_client_model_accessors() {
        let client = WorkersAiClient::new(
            "https://ai.test/run".to_string(),
            "token".to_string(),
            "@cf/openai/gpt-oss-120b".to_string(),
            "@cf/meta/m2m100-1.2b".to_string(),
            30,
        );
        assert_eq!(client.llm_model(), "@cf/openai/gpt-oss-120b");
        assert_eq!(client.translation_model(), "@cf/meta/m2m100-1.2b");
    }
}
