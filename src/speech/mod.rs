//! Speech collaborators: OpenAI synthesis and transcription

mod client;
mod similarity;

pub use client::*;
pub use similarity::*;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
    #[error("transcription failed: {0}")]
    Transcription(String),
}

/// Renders UTF-8 text as audio in the cloned voice. The caller treats the
/// result as opaque bytes; there is no retry on failure.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

/// Recognizes text from recorded WAV audio.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<String, SpeechError>;
}
