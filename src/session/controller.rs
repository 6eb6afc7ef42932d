//! Session controller
//!
//! Tracks the active username and the cursor into the fixed prompt list,
//! gates synthesis until all samples are collected, and drives the ledger.
//! Progression is strictly linear: one successful recording advances the
//! cursor by one, with no rollback or skipping. A completed collection is
//! terminal for the session; re-recording requires a new username.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::ledger::{LedgerError, SampleLedger, MAX_SAMPLES};
use crate::speech::{SpeechError, SpeechSynthesizer};

/// The sentences each user reads aloud, one per sample slot.
pub const PROMPTS: [&str; MAX_SAMPLES] = [
    "Hello, welcome to ECHO GEN!",
    "Please record your voice to create a custom voice profile.",
    "This is the third sample sentence for the voice model.",
    "Almost there, just one more after this!",
    "Thank you for providing your voice samples.",
];

/// Where a session stands for the active username.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No username has been set yet.
    Unstarted,
    /// Collecting; the value is the zero-based cursor of the next slot.
    Collecting(usize),
    /// All samples are recorded; synthesis is available.
    Complete,
    /// The ledger quota was hit mid-session; this username cannot proceed.
    Blocked,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no audio was recorded")]
    EmptyRecording,
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("no active username")]
    NoUsername,
    #[error("voice sample collection is not complete yet")]
    CollectionIncomplete,
    #[error("sample collection is finished for this username")]
    CollectionFinished,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Speech(#[from] SpeechError),
    #[error("failed to store sample audio: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a successful recording step.
#[derive(Debug, Clone)]
pub struct RecordedSample {
    pub slot: usize,
    pub path: PathBuf,
}

pub struct SessionController {
    ledger: SampleLedger,
    samples_dir: PathBuf,
    username: Option<String>,
    phase: Phase,
}

impl SessionController {
    /// Create a fresh session: cursor at zero, username unset.
    pub fn new(ledger: SampleLedger, samples_dir: impl Into<PathBuf>) -> Self {
        Self {
            ledger,
            samples_dir: samples_dir.into(),
            username: None,
            phase: Phase::Unstarted,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn ledger(&self) -> &SampleLedger {
        &self.ledger
    }

    /// Activate an identity and position the cursor after any samples the
    /// ledger already holds for it. A username with a full column starts
    /// complete, skipping straight to synthesis.
    ///
    /// Returns the number of previously recorded samples.
    pub fn set_username(&mut self, name: &str) -> Result<usize, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyUsername);
        }

        let recorded = self.ledger.count_for_user(name)?;
        self.username = Some(name.to_string());
        self.phase = if recorded >= MAX_SAMPLES {
            Phase::Complete
        } else {
            Phase::Collecting(recorded)
        };
        tracing::debug!(user = name, recorded, "session username set");
        Ok(recorded)
    }

    /// Zero-based index of the next prompt to record, while collecting.
    pub fn prompt_index(&self) -> Option<usize> {
        match self.phase {
            Phase::Collecting(index) => Some(index),
            _ => None,
        }
    }

    /// Sentence the user should read next, while collecting.
    pub fn current_prompt(&self) -> Option<&'static str> {
        self.prompt_index().and_then(|i| PROMPTS.get(i).copied())
    }

    pub fn is_collection_complete(&self) -> bool {
        matches!(self.phase, Phase::Complete)
    }

    /// Persist one recording and register it in the ledger.
    ///
    /// Empty audio fails with `EmptyRecording` and changes nothing; the
    /// caller should re-prompt. A ledger failure removes the just-written
    /// audio file and leaves the cursor where it was; hitting the quota
    /// additionally blocks the session for this username.
    pub fn record_sample(&mut self, audio: &[u8]) -> Result<RecordedSample, SessionError> {
        let slot = match self.phase {
            Phase::Collecting(index) => index,
            Phase::Unstarted => return Err(SessionError::NoUsername),
            Phase::Complete | Phase::Blocked => return Err(SessionError::CollectionFinished),
        };
        let user = self.username.clone().ok_or(SessionError::NoUsername)?;

        if audio.is_empty() {
            return Err(SessionError::EmptyRecording);
        }

        // Unique name so concurrent sessions never collide on the file.
        let file_name = format!("audio_sample_{}_{}.wav", slot + 1, Uuid::new_v4().simple());
        let path = self.samples_dir.join(file_name);
        fs::write(&path, audio)?;
        let path = absolute(&path)?;

        if let Err(err) = self.ledger.record_path(&user, slot, &path) {
            let _ = fs::remove_file(&path);
            if matches!(err, LedgerError::QuotaExceeded { .. }) {
                self.phase = Phase::Blocked;
            }
            return Err(err.into());
        }

        let next = slot + 1;
        self.phase = if next >= MAX_SAMPLES {
            Phase::Complete
        } else {
            Phase::Collecting(next)
        };

        tracing::info!(user = %user, slot, path = %path.display(), "sample recorded");
        Ok(RecordedSample { slot, path })
    }

    /// Render `text` in the cloned voice. Valid only once collection is
    /// complete; any collaborator failure is surfaced as-is, with no retry
    /// and no state change.
    pub async fn synthesize(
        &self,
        synthesizer: &dyn SpeechSynthesizer,
        text: &str,
    ) -> Result<Vec<u8>, SessionError> {
        if !self.is_collection_complete() {
            return Err(SessionError::CollectionIncomplete);
        }
        Ok(synthesizer.synthesize(text).await?)
    }
}

/// The ledger stores absolute paths; the samples directory may be relative.
fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
