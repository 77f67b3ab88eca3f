use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::{
    configuration::AgentSettings,
    domain::{AskingPrice, VideoUpload},
};

use super::{ConversationStore, SessionId, ToolRegistry};

const SYSTEM_PROMPT: &str = include_str!("appraiser_prompt.txt");

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("request to the model failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned no candidates (finish reason: {0})")]
    NoCandidates(String),

    #[error("model returned an empty reply")]
    EmptyReply,

    #[error("agent gave no final answer after {0} iterations")]
    IterationLimit(usize),
}

/// One user turn: the question plus the video it is about.
pub struct AppraisalTurn {
    pub prompt: String,
    pub video: Vec<u8>,
    pub media_type: String,
}

impl AppraisalTurn {
    pub fn for_listing(price: &AskingPrice, upload: VideoUpload) -> Self {
        AppraisalTurn {
            prompt: format!(
                "I saw this item for ${}. Is it a good buy? Please analyze the video and search eBay for comparable prices.",
                price.as_str()
            ),
            media_type: upload.format.mime_type().to_string(),
            video: upload.bytes,
        }
    }
}

/// Reasoning loop that looks at the video and decides when to call tools.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn appraise(&self, session: &SessionId, turn: AppraisalTurn)
        -> Result<String, AgentError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Content {
            role: Some("user".to_string()),
            parts,
        }
    }

    /// Swaps inline media for a short note so stored history never holds
    /// the uploaded bytes.
    fn without_inline_data(self) -> Self {
        let parts = self
            .parts
            .into_iter()
            .map(|part| match part.inline_data {
                Some(blob) => Part::text(format!(
                    "[{} attachment from an earlier turn, no longer available]",
                    blob.mime_type
                )),
                None => part,
            })
            .collect();
        Content { parts, ..self }
    }

    fn function_calls(&self) -> Vec<FunctionCall> {
        self.parts
            .iter()
            .filter_map(|p| p.function_call.clone())
            .collect()
    }

    fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<&str>>()
            .join("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
    // Must be sent back unchanged with the call it belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Part {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    fn inline_data(mime_type: &str, bytes: &[u8]) -> Self {
        Part {
            inline_data: Some(Blob {
                mime_type: mime_type.to_string(),
                data: BASE64.encode(bytes),
            }),
            ..Default::default()
        }
    }

    fn function_response(name: String, response: Value) -> Self {
        Part {
            function_response: Some(FunctionResponse { name, response }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content,
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclarations>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

/// Gemini `generateContent` client running the function-calling loop.
pub struct GeminiAgent {
    client: Client,
    endpoint: Url,
    api_key: String,
    temperature: f32,
    max_iterations: usize,
    tools: ToolRegistry,
    conversations: ConversationStore<Content>,
}

impl GeminiAgent {
    pub fn new(
        settings: &AgentSettings,
        api_key: String,
        tools: ToolRegistry,
    ) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let endpoint = settings
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", settings.model))?;

        Ok(GeminiAgent {
            client,
            endpoint,
            api_key,
            temperature: settings.temperature,
            max_iterations: settings.max_iterations,
            tools,
            conversations: ConversationStore::new(
                settings.max_history_turns,
                settings.max_conversations,
            ),
        })
    }

    fn tool_declarations(&self) -> Vec<ToolDeclarations> {
        if self.tools.is_empty() {
            return vec![];
        }

        vec![ToolDeclarations {
            function_declarations: self
                .tools
                .tools()
                .map(|t| FunctionDeclaration {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters(),
                })
                .collect(),
        }]
    }

    async fn generate(&self, contents: &[Content]) -> Result<Content, AgentError> {
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(SYSTEM_PROMPT)],
            },
            contents,
            tools: self.tool_declarations(),
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response: GenerateContentResponse = response.json().await?;
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::NoCandidates("none".to_string()))?;

        match candidate.content {
            Some(content) => Ok(Content {
                role: Some("model".to_string()),
                parts: content.parts,
            }),
            None => Err(AgentError::NoCandidates(
                candidate.finish_reason.unwrap_or_else(|| "unknown".to_string()),
            )),
        }
    }
}

#[async_trait]
impl AgentRuntime for GeminiAgent {
    async fn appraise(
        &self,
        session: &SessionId,
        turn: AppraisalTurn,
    ) -> Result<String, AgentError> {
        let mut contents = self.conversations.history(session).await;
        let turn_start = contents.len();
        contents.push(Content::user(vec![
            Part::text(turn.prompt),
            Part::inline_data(&turn.media_type, &turn.video),
        ]));

        for iteration in 1..=self.max_iterations {
            let reply = self.generate(&contents).await?;
            let calls = reply.function_calls();
            let text = reply.text();
            contents.push(reply);

            if calls.is_empty() {
                if text.trim().is_empty() {
                    return Err(AgentError::EmptyReply);
                }
                log::info!(
                    "Agent answered for session {} after {} iteration(s)",
                    session,
                    iteration
                );
                let exchange = contents
                    .split_off(turn_start)
                    .into_iter()
                    .map(Content::without_inline_data)
                    .collect();
                self.conversations.append_turn(session, exchange).await;
                return Ok(text);
            }

            let mut responses = Vec::with_capacity(calls.len());
            for call in calls {
                log::info!("Agent called {} with {}", call.name, call.args);
                let result = self.tools.dispatch(&call.name, call.args).await;
                responses.push(Part::function_response(call.name, result));
            }
            contents.push(Content::user(responses));
        }

        log::error!(
            "Agent hit {} iterations without answering for session {}",
            self.max_iterations,
            session
        );
        Err(AgentError::IterationLimit(self.max_iterations))
    }
}
