//! Audio capture using cpal

use anyhow::Result;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use tokio::sync::mpsc;

use crate::app::AppMessage;

use super::wav::{encode_wav, resample, STORAGE_SAMPLE_RATE};

/// Captures microphone audio and delivers it to the app as WAV bytes.
/// Zero captured samples are delivered as empty bytes, which downstream
/// code treats as "no recording made".
pub struct VoiceRecorder {
    message_tx: mpsc::Sender<AppMessage>,
    recording: Arc<AtomicBool>,
    samples: Arc<Mutex<Vec<f32>>>,
    sample_rate: Arc<Mutex<u32>>,
}

impl VoiceRecorder {
    pub fn new(message_tx: mpsc::Sender<AppMessage>) -> Self {
        Self {
            message_tx,
            recording: Arc::new(AtomicBool::new(false)),
            samples: Arc::new(Mutex::new(Vec::new())),
            sample_rate: Arc::new(Mutex::new(STORAGE_SAMPLE_RATE)),
        }
    }

    /// Start capturing audio
    pub fn start(&self) {
        {
            let mut samples = self.samples.lock().unwrap();
            samples.clear();
        }

        self.recording.store(true, Ordering::SeqCst);

        let samples = self.samples.clone();
        let sample_rate_store = self.sample_rate.clone();
        let recording = self.recording.clone();
        let tx = self.message_tx.clone();

        // Run capture in a dedicated thread (cpal Stream isn't Send)
        std::thread::spawn(move || {
            if let Err(e) = run_capture(samples, sample_rate_store, recording) {
                tracing::error!("Capture error: {}", e);
                let _ = tx.blocking_send(AppMessage::RecordingFailed(e.to_string()));
            }
        });
    }

    /// Stop capturing and deliver the recording as WAV bytes
    pub async fn stop(&self) -> Result<()> {
        self.recording.store(false, Ordering::SeqCst);

        // Give time for the stream to finish
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

        let samples = {
            let samples = self.samples.lock().unwrap();
            samples.clone()
        };

        let sample_rate = {
            let sr = self.sample_rate.lock().unwrap();
            *sr
        };

        let wav = if samples.is_empty() {
            Vec::new()
        } else {
            let samples = resample(&samples, sample_rate, STORAGE_SAMPLE_RATE);
            encode_wav(&samples, STORAGE_SAMPLE_RATE)?
        };

        self.message_tx
            .send(AppMessage::RecordingCaptured(wav))
            .await?;
        Ok(())
    }

    /// Cancel recording without delivering anything
    pub async fn cancel(&self) {
        self.recording.store(false, Ordering::SeqCst);
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        let mut samples = self.samples.lock().unwrap();
        samples.clear();
    }
}

/// Mix interleaved frames down to mono and append them to the buffer.
fn push_mono(samples: &Mutex<Vec<f32>>, data: &[f32], channels: usize) {
    let mut samples = samples.lock().unwrap();
    if channels > 1 {
        for chunk in data.chunks(channels) {
            let mono: f32 = chunk.iter().sum::<f32>() / channels as f32;
            samples.push(mono);
        }
    } else {
        samples.extend_from_slice(data);
    }
}

/// Run the capture loop in a dedicated thread
fn run_capture(
    samples: Arc<Mutex<Vec<f32>>>,
    sample_rate_store: Arc<Mutex<u32>>,
    recording: Arc<AtomicBool>,
) -> Result<()> {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow::anyhow!("No input device available"))?;

    let config = device.default_input_config()?;
    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;

    {
        let mut sr = sample_rate_store.lock().unwrap();
        *sr = sample_rate;
    }

    tracing::debug!("Capturing at {} Hz, {} channels", sample_rate, channels);

    let err_fn = |err| {
        tracing::error!("Audio input error: {}", err);
    };

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let samples = samples.clone();
            let recording = recording.clone();
            device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if recording.load(Ordering::SeqCst) {
                        push_mono(&samples, data, channels);
                    }
                },
                err_fn,
                None,
            )?
        }
        cpal::SampleFormat::I16 => {
            let samples = samples.clone();
            let recording = recording.clone();
            device.build_input_stream(
                &config.into(),
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if recording.load(Ordering::SeqCst) {
                        let scaled: Vec<f32> =
                            data.iter().map(|&s| s as f32 / 32768.0).collect();
                        push_mono(&samples, &scaled, channels);
                    }
                },
                err_fn,
                None,
            )?
        }
        cpal::SampleFormat::U16 => {
            let samples = samples.clone();
            let recording = recording.clone();
            device.build_input_stream(
                &config.into(),
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    if recording.load(Ordering::SeqCst) {
                        let scaled: Vec<f32> = data
                            .iter()
                            .map(|&s| (s as f32 - 32768.0) / 32768.0)
                            .collect();
                        push_mono(&samples, &scaled, channels);
                    }
                },
                err_fn,
                None,
            )?
        }
        _ => return Err(anyhow::anyhow!("Unsupported sample format")),
    };

    stream.play()?;

    // Keep stream alive while recording
    while recording.load(Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(10));
    }

    // Stream is dropped here, stopping capture
    Ok(())
}
