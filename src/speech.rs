use async_openai::config::{Config, OpenAIConfig};
use async_openai::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Result, TtsError};
use crate::params::{Format, Model, Voice};

const SPEECH_PATH: &str = "/audio/speech";

/// Body of `POST /audio/speech`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpeechRequest {
    pub model: Model,
    pub input: String,
    pub voice: Voice,
    pub speed: f32,
    pub response_format: Format,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpeechError {
    /// The API answered with an error status and (usually) an error payload.
    #[error("OpenAI API error: {message}")]
    Api {
        status: u16,
        message: String,
        kind: String,
        body: String,
    },

    /// Anything that never produced an API error response.
    #[error("{0}")]
    Request(String),
}

#[async_trait]
pub trait SpeechClient: Send + Sync {
    async fn synthesize(&self, request: &SpeechRequest)
        -> std::result::Result<Vec<u8>, SpeechError>;
}

pub struct OpenAiSpeechClient {
    config: OpenAIConfig,
    http: reqwest::Client,
}

pub fn initialize_client(api_key: Option<&str>, base_url: Option<&str>) -> Result<OpenAiSpeechClient> {
    let api_key = match api_key {
        Some(key) if !key.is_empty() => key,
        _ => return Err(TtsError::MissingApiKey),
    };

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base_url) = base_url.filter(|b| !b.is_empty()) {
        config = config.with_api_base(base_url.trim_end_matches('/'));
    }

    Ok(OpenAiSpeechClient {
        config,
        http: reqwest::Client::new(),
    })
}

impl OpenAiSpeechClient {
    pub fn endpoint(&self) -> String {
        self.config.url(SPEECH_PATH)
    }
}

#[async_trait]
impl SpeechClient for OpenAiSpeechClient {
    async fn synthesize(
        &self,
        request: &SpeechRequest,
    ) -> std::result::Result<Vec<u8>, SpeechError> {
        log::trace!("Synthesizing {:?}", &request.input);
        let start_time = std::time::Instant::now();

        let response = self
            .http
            .post(self.endpoint())
            .headers(self.config.headers())
            .json(request)
            .send()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), body));
        }

        let data: Vec<u8> = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?
            .to_vec();

        log::trace!(
            "synthesize_speech took {}ms, {} bytes input, {} bytes output",
            start_time.elapsed().as_millis(),
            request.input.len(),
            data.len()
        );
        Ok(data)
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

pub(crate) fn api_error(status: u16, body: String) -> SpeechError {
    let (message, kind) = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => (Some(envelope.error.message), envelope.error.r#type),
        Err(_) => (None, None),
    };

    SpeechError::Api {
        status,
        message: message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "no error details".to_string()),
        kind: kind.unwrap_or_else(|| "no error type".to_string()),
        body,
    }
}
