use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::backend::InferenceBackend;
use super::prompt::PERCEPTION_PROMPT;
use crate::config::Config;
use crate::error::{InferenceError, SynthesisError};
use crate::vision::input::ImageInput;

/// REST client for the generative-language `generateContent` endpoint.
///
/// No request timeout: a cycle waits for the service as long as it takes.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    perception_model: String,
    speech_model: String,
    voice: String,
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn audio(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()?
            .inline_data
            .map(|d| d.data)
            .filter(|d| !d.is_empty())
    }
}

enum CallError {
    Transport(reqwest::Error),
    Status { status: u16, body: String },
}

impl From<CallError> for InferenceError {
    fn from(e: CallError) -> Self {
        match e {
            CallError::Transport(e) => InferenceError::Transport(e),
            CallError::Status { status, body } => InferenceError::Status { status, body },
        }
    }
}

impl From<CallError> for SynthesisError {
    fn from(e: CallError) -> Self {
        match e {
            CallError::Transport(e) => SynthesisError::Transport(e),
            CallError::Status { status, body } => SynthesisError::Status { status, body },
        }
    }
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_http_client(config, Client::new())
    }

    /// Same as [`GeminiClient::new`] over a caller-built `reqwest` client.
    pub fn with_http_client(config: &Config, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            perception_model: config.perception_model.clone(),
            speech_model: config.speech_model.clone(),
            voice: config.voice.clone(),
            temperature: config.temperature,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, CallError> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(CallError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(model, status = status.as_u16(), "generateContent failed");
            return Err(CallError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(CallError::Transport)
    }
}

#[async_trait]
impl InferenceBackend for GeminiClient {
    async fn perceive(&self, image: &ImageInput) -> Result<String, InferenceError> {
        let api_key = self.api_key.as_deref().ok_or(InferenceError::MissingCredential)?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.data_base64.clone(),
                        }),
                    },
                    Part {
                        text: Some(PERCEPTION_PROMPT.to_string()),
                        inline_data: None,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                temperature: Some(self.temperature),
                ..Default::default()
            },
        };

        debug!(
            model = %self.perception_model,
            mime = %image.mime_type,
            payload_bytes = image.data_base64.len(),
            "perception request"
        );

        let response = self.generate(api_key, &self.perception_model, &request).await?;
        let text = response.text().ok_or(InferenceError::EmptyResponse)?;
        debug!(chars = text.len(), "perception response");
        Ok(text)
    }

    async fn synthesize(&self, text: &str) -> Result<String, SynthesisError> {
        let api_key = self.api_key.as_deref().ok_or(SynthesisError::MissingCredential)?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(text.to_string()),
                    inline_data: None,
                }],
            }],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: self.voice.clone(),
                        },
                    },
                }),
                ..Default::default()
            },
        };

        let response = self.generate(api_key, &self.speech_model, &request).await?;
        response.audio().ok_or(SynthesisError::NoAudio)
    }
}
