//! OpenAI speech API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use super::{SpeechError, SpeechSynthesizer, Transcriber};

const SYNTHESIS_URL: &str = "https://api.openai.com/v1/audio/speech";
const TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

const SYNTHESIS_MODEL: &str = "tts-1";
const SYNTHESIS_VOICE: &str = "echo";
const TRANSCRIPTION_MODEL: &str = "whisper-1";

// Requests fail instead of hanging when the API stalls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Client for the hosted synthesis and transcription endpoints. One
/// instance per session, built from the API key entered at startup.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAiSpeech {
    pub fn new(api_key: impl Into<String>) -> Result<Self, SpeechError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Identifier shown in the status bar.
    pub fn voice_label() -> String {
        format!("{}/{}", SYNTHESIS_MODEL, SYNTHESIS_VOICE)
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let body = json!({
            "model": SYNTHESIS_MODEL,
            "voice": SYNTHESIS_VOICE,
            "input": text,
            "response_format": "wav",
        });

        let response = self
            .client
            .post(SYNTHESIS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(SpeechError::Synthesis(format!("{}: {}", status, error)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Transcriber for OpenAiSpeech {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<String, SpeechError> {
        let part = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| SpeechError::Transcription(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("model", TRANSCRIPTION_MODEL)
            .text("language", "en");

        let response = self
            .client
            .post(TRANSCRIPTION_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeechError::Transcription(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(SpeechError::Transcription(format!("{}: {}", status, error)));
        }

        let result: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::Transcription(e.to_string()))?;
        Ok(result.text)
    }
}
