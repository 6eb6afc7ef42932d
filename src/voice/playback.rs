//! Synthesized audio playback using rodio

use anyhow::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::app::AppMessage;

/// Plays synthesized WAV files and reports completion to the app.
pub struct AudioPlayer {
    message_tx: mpsc::Sender<AppMessage>,
}

impl AudioPlayer {
    pub fn new(message_tx: mpsc::Sender<AppMessage>) -> Self {
        Self { message_tx }
    }

    /// Play a WAV file on a dedicated thread (rodio output streams aren't Send)
    pub fn play(&self, path: &Path) {
        let tx = self.message_tx.clone();
        let path: PathBuf = path.to_path_buf();

        std::thread::spawn(move || {
            let msg = match play_file(&path) {
                Ok(()) => AppMessage::PlaybackFinished,
                Err(e) => {
                    tracing::error!("Playback error: {}", e);
                    AppMessage::PlaybackFailed(e.to_string())
                }
            };
            let _ = tx.blocking_send(msg);
        });
    }
}

fn play_file(path: &Path) -> Result<()> {
    let (_stream, handle) = rodio::OutputStream::try_default()?;
    let sink = rodio::Sink::try_new(&handle)?;

    let source = rodio::Decoder::new(BufReader::new(File::open(path)?))?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}
