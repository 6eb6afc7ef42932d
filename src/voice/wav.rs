//! WAV encoding helpers for captured audio

use anyhow::Result;

/// Sample rate the recordings are stored at.
pub const STORAGE_SAMPLE_RATE: u32 = 16000;

/// Encode mono f32 samples as 16-bit PCM WAV bytes.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    use std::io::Cursor;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let amplitude = (sample * 32767.0) as i16;
            writer.write_sample(amplitude)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Simple linear resampling
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let new_len = (samples.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(new_len);

    for i in 0..new_len {
        let src_idx = i as f64 * ratio;
        let idx = src_idx as usize;
        let frac = src_idx - idx as f64;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac as f32) + samples[idx + 1] * frac as f32
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_same_rate_is_identity() {
        let samples = vec![0.1, -0.2, 0.3];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn test_resample_halves_length_when_downsampling() {
        let samples = vec![0.0; 48000];
        let out = resample(&samples, 48000, 16000);
        assert_eq!(out.len(), 16000);
    }

    #[test]
    fn test_encode_wav_produces_riff_container() {
        let samples = vec![0.0, 0.5, -0.5, 1.0];
        let bytes = encode_wav(&samples, STORAGE_SAMPLE_RATE).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // 44-byte header plus two bytes per 16-bit sample
        assert_eq!(bytes.len(), 44 + samples.len() * 2);
    }

    #[test]
    fn test_encode_empty_input_is_header_only() {
        let bytes = encode_wav(&[], STORAGE_SAMPLE_RATE).unwrap();
        assert_eq!(bytes.len(), 44);
    }
}
