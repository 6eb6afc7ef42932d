//! Tests for the session state machine

use async_trait::async_trait;
use tempfile::TempDir;

use super::controller::{Phase, RecordedSample, SessionController, SessionError, PROMPTS};
use crate::ledger::{LedgerError, SampleLedger, MAX_SAMPLES};
use crate::speech::{SpeechError, SpeechSynthesizer};

/// Synthesizer stand-in that returns fixed bytes.
struct StaticVoice(Vec<u8>);

#[async_trait]
impl SpeechSynthesizer for StaticVoice {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SpeechError> {
        Ok(self.0.clone())
    }
}

/// Synthesizer stand-in that always fails.
struct BrokenVoice;

#[async_trait]
impl SpeechSynthesizer for BrokenVoice {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SpeechError> {
        Err(SpeechError::Synthesis("upstream unavailable".to_string()))
    }
}

fn controller_in(dir: &TempDir) -> SessionController {
    let ledger = SampleLedger::new(dir.path().join("audio_samples.csv"));
    SessionController::new(ledger, dir.path())
}

fn record(controller: &mut SessionController, bytes: &[u8]) -> RecordedSample {
    controller.record_sample(bytes).unwrap()
}

#[test]
fn test_session_starts_unstarted_with_no_username() {
    let dir = TempDir::new().unwrap();
    let controller = controller_in(&dir);

    assert_eq!(controller.phase(), Phase::Unstarted);
    assert!(controller.username().is_none());
    assert!(controller.current_prompt().is_none());
    assert!(!controller.is_collection_complete());
}

#[test]
fn test_recording_requires_a_username() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller_in(&dir);

    assert!(matches!(
        controller.record_sample(b"audio"),
        Err(SessionError::NoUsername)
    ));
}

#[test]
fn test_empty_username_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller_in(&dir);

    assert!(matches!(
        controller.set_username("   "),
        Err(SessionError::EmptyUsername)
    ));
    assert_eq!(controller.phase(), Phase::Unstarted);
}

#[test]
fn test_collection_completes_exactly_after_fifth_sample() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller_in(&dir);
    controller.set_username("user1").unwrap();

    for slot in 0..MAX_SAMPLES {
        assert!(!controller.is_collection_complete(), "complete before slot {}", slot);
        assert_eq!(controller.prompt_index(), Some(slot));
        assert_eq!(controller.current_prompt(), Some(PROMPTS[slot]));
        record(&mut controller, b"some recorded audio");
    }

    assert!(controller.is_collection_complete());
    assert_eq!(controller.phase(), Phase::Complete);
    assert!(controller.current_prompt().is_none());
}

#[test]
fn test_empty_audio_never_advances_and_never_touches_the_ledger() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller_in(&dir);
    controller.set_username("user1").unwrap();

    assert!(matches!(
        controller.record_sample(&[]),
        Err(SessionError::EmptyRecording)
    ));
    assert_eq!(controller.prompt_index(), Some(0));
    // The ledger file is created lazily, so an empty recording must not
    // have created it.
    assert!(!controller.ledger().path().exists());
}

#[test]
fn test_each_sample_lands_in_the_ledger_at_its_slot() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller_in(&dir);
    controller.set_username("user1").unwrap();

    let first = record(&mut controller, b"first");
    let second = record(&mut controller, b"second");

    assert_eq!(first.slot, 0);
    assert_eq!(second.slot, 1);
    assert!(first.path.is_absolute());
    assert_ne!(first.path, second.path);
    assert_eq!(controller.ledger().count_for_user("user1").unwrap(), 2);
    assert_eq!(
        controller.ledger().path_for("user1", 0).unwrap().unwrap(),
        first.path
    );
}

#[test]
fn test_set_username_resumes_from_ledger_count() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller_in(&dir);
    controller.set_username("user1").unwrap();
    record(&mut controller, b"one");
    record(&mut controller, b"two");

    // A new session for the same username picks up where the ledger left off
    let mut resumed = controller_in(&dir);
    let recorded = resumed.set_username("user1").unwrap();
    assert_eq!(recorded, 2);
    assert_eq!(resumed.phase(), Phase::Collecting(2));
    assert_eq!(resumed.current_prompt(), Some(PROMPTS[2]));
}

#[test]
fn test_full_user_starts_complete() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller_in(&dir);
    controller.set_username("user1").unwrap();
    for _ in 0..MAX_SAMPLES {
        record(&mut controller, b"audio");
    }

    let mut resumed = controller_in(&dir);
    resumed.set_username("user1").unwrap();
    assert!(resumed.is_collection_complete());
    assert!(matches!(
        resumed.record_sample(b"audio"),
        Err(SessionError::CollectionFinished)
    ));
}

#[test]
fn test_quota_hit_blocks_the_session_and_removes_the_audio_file() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller_in(&dir);
    controller.set_username("user1").unwrap();

    // Another writer fills the user's column under this session's feet.
    let ledger = SampleLedger::new(dir.path().join("audio_samples.csv"));
    for slot in 0..MAX_SAMPLES {
        ledger
            .record_path("user1", slot, &dir.path().join(format!("other{}.wav", slot)))
            .unwrap();
    }

    let result = controller.record_sample(b"late audio");
    assert!(matches!(
        result,
        Err(SessionError::Ledger(LedgerError::QuotaExceeded { .. }))
    ));
    assert_eq!(controller.phase(), Phase::Blocked);
    // No orphaned sample file is left behind
    let orphans = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".wav"))
        .count();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn test_synthesis_is_gated_until_collection_completes() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller_in(&dir);
    controller.set_username("user1").unwrap();

    let voice = StaticVoice(b"rendered".to_vec());
    assert!(matches!(
        controller.synthesize(&voice, "hello").await,
        Err(SessionError::CollectionIncomplete)
    ));
}

#[tokio::test]
async fn test_synthesis_failure_is_surfaced_and_state_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller_in(&dir);
    controller.set_username("user1").unwrap();
    for _ in 0..MAX_SAMPLES {
        record(&mut controller, b"audio");
    }

    let result = controller.synthesize(&BrokenVoice, "hello").await;
    assert!(matches!(
        result,
        Err(SessionError::Speech(SpeechError::Synthesis(_)))
    ));
    assert!(controller.is_collection_complete());
}

#[tokio::test]
async fn test_alice_records_five_samples_then_synthesizes() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller_in(&dir);
    controller.set_username("alice").unwrap();

    let audio = [0u8; 100];
    let mut paths = Vec::new();
    for _ in 0..MAX_SAMPLES {
        paths.push(record(&mut controller, &audio).path);
    }

    // Five rows, alice's column fully populated with distinct absolute paths
    let ledger = controller.ledger();
    assert_eq!(ledger.count_for_user("alice").unwrap(), MAX_SAMPLES);
    for (slot, path) in paths.iter().enumerate() {
        assert!(path.is_absolute());
        assert_eq!(ledger.path_for("alice", slot).unwrap().unwrap(), *path);
        assert_eq!(std::fs::read(path).unwrap().len(), 100);
    }
    let distinct: std::collections::HashSet<_> = paths.iter().collect();
    assert_eq!(distinct.len(), MAX_SAMPLES);

    assert!(controller.is_collection_complete());
    let voice = StaticVoice(b"hello-in-cloned-voice".to_vec());
    let rendered = controller.synthesize(&voice, "hello").await.unwrap();
    assert_eq!(rendered, b"hello-in-cloned-voice");
}
