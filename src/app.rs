//! Main application state and event loop

use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::{
    input_utils::InputBuffer,
    ledger::{LedgerError, SampleLedger, MAX_SAMPLES},
    session::{Phase, RecordedSample, SessionController, SessionError, PROMPTS},
    speech::{self, OpenAiSpeech, Transcriber},
    ui::{self, InputMode, RenderState},
    voice::{AudioPlayer, VoiceRecorder},
};

/// Name of the synthesized output file, overwritten on every synthesis call
const OUTPUT_FILE: &str = "generated_audio_response.wav";

/// Messages sent to the app from collaborator threads and tasks
#[derive(Debug)]
pub enum AppMessage {
    /// A recording finished; empty bytes mean no audio was captured
    RecordingCaptured(Vec<u8>),
    /// Audio capture failed
    RecordingFailed(String),
    /// Verification transcript for a saved sample
    TranscriptReady {
        slot: usize,
        transcript: String,
        score: f64,
    },
    /// Verification transcription failed
    TranscriptFailed(String),
    /// Playback of the synthesized audio finished
    PlaybackFinished,
    /// Playback failed
    PlaybackFailed(String),
}

/// Which input the app is currently asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ApiKey,
    Username,
    Collecting,
    Synthesis,
}

/// A single entry in the session log
#[derive(Debug, Clone)]
pub struct EventEntry {
    pub kind: EventKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Info,
    User,
    Sample,
    Transcript,
    Error,
}

/// Application state
pub struct App {
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Which input is being collected
    stage: Stage,
    /// Sample collection state machine
    session: SessionController,
    /// Speech API client, absent until a key is provided
    speech: Option<Arc<OpenAiSpeech>>,
    /// Microphone recorder
    recorder: VoiceRecorder,
    /// Synthesized audio player
    player: AudioPlayer,
    /// Where the synthesized response is written
    output_path: PathBuf,
    /// Session log for display
    events: Vec<EventEntry>,
    /// Input line buffer with a char-indexed cursor
    input: InputBuffer,
    /// Input mode (normal, recording)
    input_mode: InputMode,
    /// Is a speech request in flight?
    busy: bool,
    /// Scroll offset for the log view
    scroll_offset: usize,
    /// Input history
    input_history: Vec<String>,
    /// Current position in input history
    history_index: Option<usize>,
    /// Should quit
    should_quit: bool,
    /// Status message
    status_message: Option<String>,
    /// Username supplied on the command line, applied at startup
    pending_user: Option<String>,
    /// App message receiver
    message_rx: mpsc::Receiver<AppMessage>,
    /// App message sender (shared)
    message_tx: mpsc::Sender<AppMessage>,
}

impl App {
    pub fn new(ledger_path: PathBuf, samples_dir: PathBuf, user: Option<String>) -> Result<Self> {
        // Set up terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        std::fs::create_dir_all(&samples_dir)?;

        // Create message channel
        let (message_tx, message_rx) = mpsc::channel(100);

        // Initialize components
        let recorder = VoiceRecorder::new(message_tx.clone());
        let player = AudioPlayer::new(message_tx.clone());
        let session = SessionController::new(SampleLedger::new(&ledger_path), &samples_dir);

        // A key in the environment skips the entry step
        let speech = match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Some(Arc::new(OpenAiSpeech::new(key)?)),
            _ => None,
        };
        let stage = if speech.is_some() {
            Stage::Username
        } else {
            Stage::ApiKey
        };

        let events = vec![EventEntry {
            kind: EventKind::Info,
            text: "Welcome to ECHO GEN, an AI voice generating software.".to_string(),
            timestamp: Utc::now(),
        }];

        Ok(Self {
            terminal,
            stage,
            session,
            speech,
            recorder,
            player,
            output_path: samples_dir.join(OUTPUT_FILE),
            events,
            input: InputBuffer::default(),
            input_mode: InputMode::Normal,
            busy: false,
            scroll_offset: 0,
            input_history: Vec::new(),
            history_index: None,
            should_quit: false,
            status_message: None,
            pending_user: user,
            message_rx,
            message_tx,
        })
    }

    /// Main event loop
    pub async fn run(&mut self) -> Result<()> {
        if self.speech.is_some() {
            if let Some(user) = self.pending_user.take() {
                self.apply_username(&user);
            }
        }

        loop {
            // Draw UI
            self.draw()?;

            // Handle events with timeout
            tokio::select! {
                // Check for terminal events
                _ = tokio::time::sleep(Duration::from_millis(16)) => {
                    if event::poll(Duration::from_millis(0))? {
                        if let Event::Key(key) = event::read()? {
                            self.handle_key_event(key).await?;
                        }
                    }
                }

                // Check for app messages
                Some(msg) = self.message_rx.recv() => {
                    self.handle_app_message(msg);
                }
            }

            if self.should_quit {
                break;
            }
        }

        // Cleanup
        self.cleanup()?;
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let recorded = match self.session.phase() {
            Phase::Unstarted => 0,
            Phase::Collecting(index) => index,
            Phase::Complete | Phase::Blocked => MAX_SAMPLES,
        };
        let voice = OpenAiSpeech::voice_label();

        // Extract state for rendering
        let state = RenderState {
            stage: self.stage,
            events: &self.events,
            input: self.input.text(),
            cursor_position: self.input.cursor(),
            input_mode: self.input_mode,
            username: self.session.username(),
            prompt: self.session.prompt_index().zip(self.session.current_prompt()),
            recorded,
            busy: self.busy,
            voice: &voice,
            scroll_offset: self.scroll_offset,
            status_message: self.status_message.as_deref(),
        };

        self.terminal.draw(|frame| {
            ui::draw(frame, &state);
        })?;
        Ok(())
    }

    fn push_event(&mut self, kind: EventKind, text: String) {
        self.events.push(EventEntry {
            kind,
            text,
            timestamp: Utc::now(),
        });
        // Reset scroll to see new entries
        self.scroll_offset = 0;
    }

    async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode_key(key).await?,
            InputMode::Recording => self.handle_recording_mode_key(key).await?,
        }
        Ok(())
    }

    async fn handle_normal_mode_key(&mut self, key: KeyEvent) -> Result<()> {
        match (key.modifiers, key.code) {
            // Quit
            (KeyModifiers::CONTROL, KeyCode::Char('q')) => {
                self.should_quit = true;
            }
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                self.input.clear();
            }
            // Submit input
            (_, KeyCode::Enter) => {
                if !self.input.is_empty() {
                    self.submit_input().await?;
                }
            }
            // Recording toggle, only while collecting samples
            (_, KeyCode::Char('*')) if self.stage == Stage::Collecting => {
                self.toggle_recording().await?;
            }
            // Character input
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.input.insert(c);
            }
            // Backspace
            (_, KeyCode::Backspace) => {
                self.input.backspace();
            }
            // Delete
            (_, KeyCode::Delete) => {
                self.input.delete();
            }
            // Cursor movement
            (_, KeyCode::Left) => {
                self.input.move_left();
            }
            (_, KeyCode::Right) => {
                self.input.move_right();
            }
            (_, KeyCode::Home) => {
                self.input.move_home();
            }
            (_, KeyCode::End) => {
                self.input.move_end();
            }
            // History navigation
            (_, KeyCode::Up) => {
                self.navigate_history(-1);
            }
            (_, KeyCode::Down) => {
                self.navigate_history(1);
            }
            // Scroll the log
            (_, KeyCode::PageUp) => {
                self.scroll_offset = self.scroll_offset.saturating_add(10);
            }
            (_, KeyCode::PageDown) => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_recording_mode_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            // Stop recording
            KeyCode::Char('*') => {
                self.toggle_recording().await?;
            }
            // Cancel recording
            KeyCode::Esc => {
                self.recorder.cancel().await;
                self.input_mode = InputMode::Normal;
                self.status_message = Some("Recording cancelled".to_string());
            }
            _ => {}
        }
        Ok(())
    }

    async fn submit_input(&mut self) -> Result<()> {
        let input = self.input.take();

        let trimmed = input.trim().to_string();
        if trimmed.is_empty() {
            return Ok(());
        }

        // Save to history, but never the API key
        if self.stage != Stage::ApiKey {
            self.input_history.push(trimmed.clone());
            self.history_index = None;
        }

        // Slash commands work everywhere except the key entry step
        if trimmed.starts_with('/') && self.stage != Stage::ApiKey {
            return self.handle_slash_command(&trimmed).await;
        }

        match self.stage {
            Stage::ApiKey => self.apply_api_key(&trimmed),
            Stage::Username => self.apply_username(&trimmed),
            Stage::Collecting => {
                self.status_message = Some("Press * to record the current sample".to_string());
            }
            Stage::Synthesis => {
                self.synthesize_text(&trimmed).await?;
            }
        }

        Ok(())
    }

    fn apply_api_key(&mut self, key: &str) {
        match OpenAiSpeech::new(key) {
            Ok(client) => {
                self.speech = Some(Arc::new(client));
                self.push_event(EventKind::Info, "API key set.".to_string());
                self.stage = Stage::Username;
                if let Some(user) = self.pending_user.take() {
                    self.apply_username(&user);
                }
            }
            Err(e) => {
                self.push_event(EventKind::Error, e.to_string());
            }
        }
    }

    fn apply_username(&mut self, name: &str) {
        match self.session.set_username(name) {
            Ok(recorded) => {
                let user = name.trim().to_string();
                if self.session.is_collection_complete() {
                    self.push_event(
                        EventKind::Info,
                        format!(
                            "{} has already recorded the maximum of {} audio samples.",
                            user, MAX_SAMPLES
                        ),
                    );
                    self.push_event(
                        EventKind::Info,
                        "Generating your custom voice model...".to_string(),
                    );
                    self.stage = Stage::Synthesis;
                } else {
                    if recorded > 0 {
                        self.push_event(
                            EventKind::Info,
                            format!(
                                "Welcome back, {}: {} of {} samples already recorded.",
                                user, recorded, MAX_SAMPLES
                            ),
                        );
                    } else {
                        self.push_event(EventKind::Info, format!("Recording samples for {}.", user));
                    }
                    self.stage = Stage::Collecting;
                }
                self.status_message = None;
            }
            Err(SessionError::EmptyUsername) => {
                self.status_message = Some("Please enter a username to proceed.".to_string());
            }
            Err(e) => {
                self.push_event(EventKind::Error, e.to_string());
            }
        }
    }

    async fn handle_slash_command(&mut self, input: &str) -> Result<()> {
        let parts: Vec<&str> = input[1..].splitn(2, ' ').collect();
        let command = parts[0];
        let args = parts.get(1).copied().unwrap_or("");

        match command {
            "quit" | "q" => {
                self.should_quit = true;
            }
            "user" => {
                if args.is_empty() {
                    self.status_message = Some("Usage: /user <name>".to_string());
                } else {
                    self.apply_username(args);
                }
            }
            "play" => {
                if self.output_path.exists() {
                    self.status_message = Some("Playing...".to_string());
                    self.player.play(&self.output_path);
                } else {
                    self.status_message = Some("Nothing has been generated yet".to_string());
                }
            }
            "status" => {
                let text = match self.session.username() {
                    Some(user) => {
                        let recorded = self.session.ledger().count_for_user(user).unwrap_or(0);
                        format!(
                            "User: {}\nSamples recorded: {} of {}\nLedger: {}",
                            user,
                            recorded,
                            MAX_SAMPLES,
                            self.session.ledger().path().display()
                        )
                    }
                    None => "No active username.".to_string(),
                };
                self.push_event(EventKind::Info, text);
            }
            "help" => {
                let help = r#"Commands:
  *              Start/stop recording the current sample
  /user <name>   Switch to another username
  /play          Replay the last generated audio
  /status        Show session progress
  /quit          Exit
  Ctrl+C         Clear input
  Ctrl+Q         Quit"#;
                self.push_event(EventKind::Info, help.to_string());
            }
            _ => {
                self.status_message = Some(format!("Unknown command: /{}", command));
            }
        }
        Ok(())
    }

    async fn toggle_recording(&mut self) -> Result<()> {
        match self.input_mode {
            InputMode::Normal => {
                self.recorder.start();
                self.input_mode = InputMode::Recording;
                self.status_message = Some("Recording...".to_string());
            }
            InputMode::Recording => {
                self.recorder.stop().await?;
                self.input_mode = InputMode::Normal;
                self.status_message = Some("Saving sample...".to_string());
            }
        }
        Ok(())
    }

    /// Render `text` in the cloned voice, save it, and play it back.
    /// The request runs to completion before further input is handled.
    async fn synthesize_text(&mut self, text: &str) -> Result<()> {
        let Some(speech) = self.speech.clone() else {
            self.status_message = Some("API key not set".to_string());
            return Ok(());
        };

        self.push_event(EventKind::User, text.to_string());
        self.busy = true;
        self.status_message = Some("Generating speech...".to_string());
        self.draw()?;

        match self.session.synthesize(speech.as_ref(), text).await {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::write(&self.output_path, &bytes).await {
                    self.push_event(
                        EventKind::Error,
                        format!("Failed to save generated audio: {}", e),
                    );
                } else {
                    self.push_event(
                        EventKind::Sample,
                        format!("Generated voice saved to {}", self.output_path.display()),
                    );
                    self.status_message = Some("Playing...".to_string());
                    self.player.play(&self.output_path);
                }
            }
            Err(e) => {
                self.push_event(
                    EventKind::Error,
                    format!("An error occurred while generating voice: {}", e),
                );
                self.status_message = None;
            }
        }

        self.busy = false;
        Ok(())
    }

    /// Transcribe a saved sample in the background and compare it to the
    /// sentence the user was asked to read. Failures are logged and never
    /// block collection.
    fn verify_sample(&self, sample: &RecordedSample, wav: Vec<u8>) {
        let Some(client) = self.speech.clone() else {
            return;
        };
        let slot = sample.slot;
        let tx = self.message_tx.clone();

        tokio::spawn(async move {
            match client.transcribe(wav).await {
                Ok(transcript) => {
                    let score = speech::ratio(PROMPTS[slot], &transcript);
                    let _ = tx
                        .send(AppMessage::TranscriptReady {
                            slot,
                            transcript,
                            score,
                        })
                        .await;
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::TranscriptFailed(e.to_string())).await;
                }
            }
        });
    }

    fn navigate_history(&mut self, direction: i32) {
        if self.input_history.is_empty() {
            return;
        }

        let new_index = match self.history_index {
            None if direction < 0 => Some(self.input_history.len() - 1),
            Some(i) if direction < 0 && i > 0 => Some(i - 1),
            Some(i) if direction > 0 && i < self.input_history.len() - 1 => Some(i + 1),
            Some(_) if direction > 0 => None,
            idx => idx,
        };

        self.history_index = new_index;
        match new_index {
            Some(i) => self.input.set(self.input_history[i].clone()),
            None => self.input.clear(),
        }
    }

    fn handle_app_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::RecordingCaptured(bytes) => {
                self.input_mode = InputMode::Normal;
                self.handle_captured_recording(bytes);
            }
            AppMessage::RecordingFailed(err) => {
                self.input_mode = InputMode::Normal;
                self.status_message = Some(format!("Recording error: {}", err));
            }
            AppMessage::TranscriptReady {
                slot,
                transcript,
                score,
            } => {
                self.push_event(
                    EventKind::Transcript,
                    format!(
                        "Sample {}: \"{}\" ({:.0}% match)",
                        slot + 1,
                        transcript.trim(),
                        score * 100.0
                    ),
                );
            }
            AppMessage::TranscriptFailed(err) => {
                self.push_event(EventKind::Error, format!("Could not verify sample: {}", err));
            }
            AppMessage::PlaybackFinished => {
                self.status_message = Some("Generated voice has been played and saved.".to_string());
            }
            AppMessage::PlaybackFailed(err) => {
                self.push_event(EventKind::Error, format!("Playback failed: {}", err));
            }
        }
    }

    fn handle_captured_recording(&mut self, bytes: Vec<u8>) {
        match self.session.record_sample(&bytes) {
            Ok(sample) => {
                self.push_event(
                    EventKind::Sample,
                    format!(
                        "Sample {} recorded successfully and logged in {}.",
                        sample.slot + 1,
                        self.session.ledger().path().display()
                    ),
                );
                self.status_message = None;
                self.verify_sample(&sample, bytes);

                if self.session.is_collection_complete() {
                    self.push_event(
                        EventKind::Info,
                        "All 5 voice samples have been recorded.".to_string(),
                    );
                    self.push_event(
                        EventKind::Info,
                        "Generating your custom voice model...".to_string(),
                    );
                    self.stage = Stage::Synthesis;
                }
            }
            Err(SessionError::EmptyRecording) => {
                self.status_message = Some("No audio recorded. Please try again.".to_string());
            }
            Err(SessionError::Ledger(LedgerError::QuotaExceeded { user })) => {
                self.push_event(
                    EventKind::Error,
                    format!(
                        "{} has already recorded the maximum of {} audio samples. \
                         Enter another username to proceed.",
                        user, MAX_SAMPLES
                    ),
                );
                self.stage = Stage::Username;
            }
            Err(e) => {
                self.push_event(
                    EventKind::Error,
                    format!("An error occurred while logging the sample: {}", e),
                );
            }
        }
    }

    fn cleanup(&mut self) -> Result<()> {
        // Restore terminal
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
