use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{ChatPromptTemplate, MessageTemplate, PromptError};

pub const DEFAULT_HUB_API_URL: &str = "https://api.hub.langchain.com";
pub const OPENAI_FUNCTIONS_AGENT_HANDLE: &str = "hwchase17/openai-functions-agent";

/// The `hwchase17/openai-functions-agent` prompt, as published on the hub.
pub fn openai_functions_agent_prompt() -> ChatPromptTemplate {
    ChatPromptTemplate::new(vec![
        MessageTemplate::System("You are a helpful assistant".to_string()),
        MessageTemplate::optional_placeholder("chat_history"),
        MessageTemplate::Human("{input}".to_string()),
        MessageTemplate::placeholder("agent_scratchpad"),
    ])
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    manifest: Value,
}

/// A node of LangChain's serialized object format: `{"lc", "type", "id", "kwargs"}`.
#[derive(Debug, Deserialize)]
struct Serialized {
    #[serde(default)]
    id: Vec<String>,
    #[serde(default)]
    kwargs: Value,
}

impl Serialized {
    fn class_name(&self) -> &str {
        self.id.last().map(String::as_str).unwrap_or_default()
    }
}

/// Client for the LangChain prompt hub.
#[derive(Debug, Clone)]
pub struct PromptHub {
    api_url: String,
    client: Client,
}

impl Default for PromptHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_API_URL)
    }
}

impl PromptHub {
    pub fn new<S: Into<String>>(api_url: S) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Fetches `owner/repo` (or `owner/repo:commit`) and parses its manifest.
    pub async fn pull(&self, handle: &str) -> Result<ChatPromptTemplate, PromptError> {
        let (repo, commit) = handle.split_once(':').unwrap_or((handle, "latest"));
        if repo.split('/').count() != 2 {
            return Err(PromptError::ManifestError(format!(
                "prompt handle must look like owner/repo, got {handle:?}"
            )));
        }

        let url = format!("{}/commits/{}/{}", self.api_url, repo, commit);
        log::debug!("Pulling prompt {} from {}", handle, url);
        let response: CommitResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_manifest(&response.manifest)
    }

    /// Like [`Self::pull`], but falls back to the built-in agent prompt when the
    /// hub cannot be reached or returns something unusable.
    pub async fn pull_or_default(&self, handle: &str) -> ChatPromptTemplate {
        match self.pull(handle).await {
            Ok(prompt) => {
                log::info!("Loaded prompt {} from the hub", handle);
                prompt
            }
            Err(e) => {
                log::warn!(
                    "Could not pull prompt {} ({}); using the built-in openai-functions-agent prompt",
                    handle,
                    e
                );
                openai_functions_agent_prompt()
            }
        }
    }
}

/// Converts a serialized `ChatPromptTemplate` manifest into a [`ChatPromptTemplate`].
pub fn parse_manifest(manifest: &Value) -> Result<ChatPromptTemplate, PromptError> {
    let root: Serialized = serde_json::from_value(manifest.clone())
        .map_err(|e| PromptError::ManifestError(e.to_string()))?;
    if root.class_name() != "ChatPromptTemplate" {
        return Err(PromptError::ManifestError(format!(
            "expected ChatPromptTemplate, got {:?}",
            root.class_name()
        )));
    }

    let messages: Vec<Serialized> = serde_json::from_value(root.kwargs["messages"].clone())
        .map_err(|e| PromptError::ManifestError(format!("messages: {e}")))?;

    let templates = messages
        .iter()
        .map(parse_message)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ChatPromptTemplate::new(templates))
}

fn parse_message(message: &Serialized) -> Result<MessageTemplate, PromptError> {
    let class_name = message.class_name();
    if class_name == "MessagesPlaceholder" {
        let variable_name = message.kwargs["variable_name"]
            .as_str()
            .ok_or_else(|| PromptError::ManifestError("placeholder without variable_name".into()))?;
        let optional = message.kwargs["optional"].as_bool().unwrap_or(false);
        return Ok(MessageTemplate::Placeholder {
            variable_name: variable_name.to_string(),
            optional,
        });
    }

    let prompt = &message.kwargs["prompt"]["kwargs"];
    let format = prompt["template_format"].as_str().unwrap_or("f-string");
    if format != "f-string" {
        return Err(PromptError::ManifestError(format!(
            "template format {format:?} is not supported"
        )));
    }
    let template = prompt["template"]
        .as_str()
        .ok_or_else(|| PromptError::ManifestError(format!("{class_name} without template")))?
        .to_string();

    match class_name {
        "SystemMessagePromptTemplate" => Ok(MessageTemplate::System(template)),
        "HumanMessagePromptTemplate" => Ok(MessageTemplate::Human(template)),
        "AIMessagePromptTemplate" => Ok(MessageTemplate::AI(template)),
        other => Err(PromptError::ManifestError(format!(
            "unsupported message template {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn manifest() -> Value {
        json!({
            "lc": 1,
            "type": "constructor",
            "id": ["langchain", "prompts", "chat", "ChatPromptTemplate"],
            "kwargs": {
                "input_variables": ["agent_scratchpad", "input"],
                "optional_variables": ["chat_history"],
                "messages": [
                    {
                        "lc": 1, "type": "constructor",
                        "id": ["langchain", "prompts", "chat", "SystemMessagePromptTemplate"],
                        "kwargs": {"prompt": {
                            "lc": 1, "type": "constructor",
                            "id": ["langchain", "prompts", "prompt", "PromptTemplate"],
                            "kwargs": {"input_variables": [], "template": "You are a helpful assistant", "template_format": "f-string"}
                        }}
                    },
                    {
                        "lc": 1, "type": "constructor",
                        "id": ["langchain_core", "prompts", "chat", "MessagesPlaceholder"],
                        "kwargs": {"variable_name": "chat_history", "optional": true}
                    },
                    {
                        "lc": 1, "type": "constructor",
                        "id": ["langchain", "prompts", "chat", "HumanMessagePromptTemplate"],
                        "kwargs": {"prompt": {
                            "lc": 1, "type": "constructor",
                            "id": ["langchain", "prompts", "prompt", "PromptTemplate"],
                            "kwargs": {"input_variables": ["input"], "template": "{input}", "template_format": "f-string"}
                        }}
                    },
                    {
                        "lc": 1, "type": "constructor",
                        "id": ["langchain", "prompts", "chat", "MessagesPlaceholder"],
                        "kwargs": {"variable_name": "agent_scratchpad"}
                    }
                ]
            }
        })
    }

    #[test]
    fn test_parse_manifest_matches_builtin() {
        assert_eq!(
            parse_manifest(&manifest()).unwrap(),
            openai_functions_agent_prompt()
        );
    }

    #[test]
    fn test_parse_manifest_rejects_other_formats() {
        let mut manifest = manifest();
        manifest["kwargs"]["messages"][0]["kwargs"]["prompt"]["kwargs"]["template_format"] =
            json!("jinja2");
        assert!(matches!(
            parse_manifest(&manifest),
            Err(PromptError::ManifestError(_))
        ));
    }

    #[tokio::test]
    async fn test_pull() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/commits/hwchase17/openai-functions-agent/latest")
            .with_header("content-type", "application/json")
            .with_body(json!({"commit_hash": "a1b2c3", "manifest": manifest(), "examples": []}).to_string())
            .create_async()
            .await;

        let prompt = PromptHub::new(server.url())
            .pull(OPENAI_FUNCTIONS_AGENT_HANDLE)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(prompt.input_variables(), vec!["input", "agent_scratchpad"]);
    }

    #[tokio::test]
    async fn test_pull_or_default_falls_back() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/commits/hwchase17/openai-functions-agent/latest")
            .with_status(502)
            .create_async()
            .await;

        let prompt = PromptHub::new(server.url())
            .pull_or_default(OPENAI_FUNCTIONS_AGENT_HANDLE)
            .await;
        assert_eq!(prompt, openai_functions_agent_prompt());
    }
}
