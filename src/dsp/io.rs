//! WAV import and export for the audio studio.
//!
//! Imported audio is converted to 32-bit float and resampled to the studio
//! rate with linear interpolation.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::dsp::buffer::AudioBuffer;
use crate::error::{CutlineError, Result};

fn wav_error(context: &str, e: hound::Error) -> CutlineError {
    CutlineError::InvalidAudio {
        reason: format!("{}: {}", context, e),
        source: Some(e),
    }
}

/// Read a mono or stereo WAV file at `target_rate`.
pub fn import_wav(path: &Path, target_rate: u32) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(CutlineError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = WavReader::open(path).map_err(|e| wav_error("failed to open WAV file", e))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels);
    if channels == 0 || channels > 2 {
        return Err(CutlineError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", channels),
        });
    }

    let samples = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    let planar = deinterleave(&samples, channels);
    let planar = if spec.sample_rate != target_rate {
        let ratio = f64::from(target_rate) / f64::from(spec.sample_rate);
        planar.iter().map(|c| resample_linear(c, ratio)).collect()
    } else {
        planar
    };

    let buffer = AudioBuffer::from_channels(planar, target_rate)?;
    log::debug!(
        "Imported {} ({} ch, {:.2}s)",
        path.display(),
        buffer.num_channels(),
        buffer.duration()
    );
    Ok(buffer)
}

/// Write `buffer` as a WAV file at its own sample rate.
pub fn export_wav(buffer: &AudioBuffer, path: &Path, bit_depth: u16) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: bit_depth,
        sample_format: if bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    if !matches!(bit_depth, 16 | 24 | 32) {
        return Err(CutlineError::UnsupportedFormat {
            format: format!("{}-bit audio (only 16, 24, 32 supported)", bit_depth),
        });
    }

    let mut writer =
        WavWriter::create(path, spec).map_err(|e| wav_error("failed to create WAV file", e))?;
    for frame in 0..buffer.num_frames() {
        for channel in 0..buffer.num_channels() {
            let sample = buffer.sample(channel, frame);
            let written = match bit_depth {
                16 => writer.write_sample((sample * 32767.0).clamp(-32768.0, 32767.0) as i16),
                24 => writer.write_sample((sample * 8_388_607.0).clamp(-8_388_608.0, 8_388_607.0) as i32),
                _ => writer.write_sample(sample),
            };
            written.map_err(|e| wav_error("failed to write sample", e))?;
        }
    }
    writer
        .finalize()
        .map_err(|e| wav_error("failed to finalize WAV file", e))?;

    log::info!("Wrote {} ({:.2}s)", path.display(), buffer.duration());
    Ok(())
}

fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let collected: std::result::Result<Vec<f32>, hound::Error> = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => reader.samples::<f32>().collect(),
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| f32::from(v) / 128.0))
            .collect(),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| f32::from(v) / 32768.0))
            .collect(),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8_388_608.0))
            .collect(),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
            .collect(),
        (SampleFormat::Int, bits) => {
            return Err(CutlineError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits),
            })
        }
    };
    collected.map_err(|e| wav_error("failed to read samples", e))
}

/// [L,R,L,R,...] -> [[L,L,...],[R,R,...]]
fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels;
    let mut result = vec![Vec::with_capacity(frames); channels];
    for (i, sample) in samples.iter().enumerate() {
        result[i % channels].push(*sample);
    }
    result
}

fn resample_linear(samples: &[f32], ratio: f64) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let target_len = (samples.len() as f64 * ratio).ceil() as usize;
    (0..target_len)
        .map(|i| {
            let pos = i as f64 / ratio;
            let idx = pos.floor() as usize;
            let frac = (pos - idx as f64) as f32;
            match (samples.get(idx), samples.get(idx + 1)) {
                (Some(a), Some(b)) => a * (1.0 - frac) + b * frac,
                (Some(a), None) => *a,
                _ => 0.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::buffer::sine_tone;
    use approx::assert_abs_diff_eq;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip_stereo_float() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let buffer = AudioBuffer::from_channels(vec![vec![0.5, -0.5, 0.25], vec![0.1, 0.2, 0.3]], 48000)
            .unwrap();

        export_wav(&buffer, &path, 32).unwrap();
        let loaded = import_wav(&path, 48000).unwrap();
        assert_eq!(loaded, buffer);
    }

    #[test]
    fn test_16_bit_within_quantization() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let tone = sine_tone(440.0, 0.1, 48000);

        export_wav(&tone, &path, 16).unwrap();
        let loaded = import_wav(&path, 48000).unwrap();
        assert_eq!(loaded.num_frames(), tone.num_frames());
        for (a, b) in tone.channel(0).iter().zip(loaded.channel(0)) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_import_resamples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("low.wav");
        let tone = sine_tone(220.0, 0.5, 24000);
        export_wav(&tone, &path, 24).unwrap();

        let loaded = import_wav(&path, 48000).unwrap();
        assert_eq!(loaded.sample_rate(), 48000);
        assert_abs_diff_eq!(loaded.duration(), 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_missing_file() {
        let err = import_wav(Path::new("/nonexistent/a.wav"), 48000).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_unsupported_bit_depth() {
        let dir = tempdir().unwrap();
        let err = export_wav(&sine_tone(440.0, 0.01, 48000), &dir.path().join("x.wav"), 12)
            .unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_not_a_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bogus.wav");
        std::fs::write(&path, b"definitely not RIFF").unwrap();
        let err = import_wav(&path, 48000).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_AUDIO");
    }
}
