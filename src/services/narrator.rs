use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::configuration::NarrationSettings;

#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("request to the speech API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("speech API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("speech API returned no audio")]
    EmptyAudio,
}

/// Turns the verdict text into spoken audio.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, text: &str) -> Result<Vec<u8>, NarrationError>;
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[derive(Serialize)]
struct SpeechQuery<'a> {
    output_format: &'a str,
}

pub struct ElevenLabsNarrator {
    client: Client,
    endpoint: Url,
    api_key: String,
    model_id: String,
    output_format: String,
}

impl ElevenLabsNarrator {
    pub fn new(settings: &NarrationSettings, api_key: String) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let endpoint = settings
            .base_url
            .join(&format!("v1/text-to-speech/{}", settings.voice_id))?;

        Ok(ElevenLabsNarrator {
            client,
            endpoint,
            api_key,
            model_id: settings.model_id.clone(),
            output_format: settings.output_format.clone(),
        })
    }
}

#[async_trait]
impl Narrator for ElevenLabsNarrator {
    async fn narrate(&self, text: &str) -> Result<Vec<u8>, NarrationError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&SpeechQuery {
                output_format: &self.output_format,
            })
            .header("xi-api-key", &self.api_key)
            .json(&SpeechRequest {
                text,
                model_id: &self.model_id,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NarrationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let audio = response.bytes().await?;
        match audio.is_empty() {
            true => Err(NarrationError::EmptyAudio),
            false => Ok(audio.to_vec()),
        }
    }
}
