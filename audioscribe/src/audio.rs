use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Sample rate required by whisper.cpp.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// A decoded audio stream: mono f32 PCM with a known sample rate.
///
/// Owned for the duration of one transcription run and never mutated —
/// the segmenter hands out borrowed slices of it. Producing this buffer
/// (downloading, demuxing, resampling) is upstream's job; the only ingestion
/// this crate provides is reading a plain WAV file.
#[derive(Debug, Clone)]
pub struct AudioStream {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioStream {
    /// Wrap already-decoded mono samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::AudioDecode("sample rate must be nonzero".into()));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Read a WAV file into a mono stream.
    ///
    /// Accepts 16-bit integer and 32-bit float PCM; multi-channel audio is
    /// downmixed by averaging. No resampling is performed — the stream keeps
    /// the file's rate, and paths with a rate requirement check it themselves.
    pub fn from_wav(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::AudioNotFound {
                path: path.to_path_buf(),
            });
        }

        info!(path = %path.display(), "reading WAV");

        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Int, 16) => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<_, _>>()?,
            (hound::SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            (format, bits) => {
                return Err(Error::AudioDecode(format!(
                    "unsupported WAV encoding: {bits}-bit {format:?} — convert to 16-bit PCM upstream"
                )));
            }
        };

        let samples = downmix(&interleaved, spec.channels);

        let stream = Self::new(samples, spec.sample_rate)?;
        debug!(
            samples = stream.samples.len(),
            sample_rate = stream.sample_rate,
            duration_secs = format!("{:.1}", stream.duration()),
            "WAV decoded"
        );
        Ok(stream)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Average interleaved channels down to mono.
fn downmix(interleaved: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let n = channels as usize;
    interleaved
        .chunks(n)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav_i16(path: &Path, sample_rate: u32, channels: u16, frames: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_new_rejects_zero_rate() {
        assert!(AudioStream::new(vec![0.0; 10], 0).is_err());
    }

    #[test]
    fn test_duration() {
        let stream = AudioStream::new(vec![0.0; 32_000], 16_000).unwrap();
        assert!((stream.duration() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stream() {
        let stream = AudioStream::new(Vec::new(), 16_000).unwrap();
        assert!(stream.is_empty());
        assert_eq!(stream.duration(), 0.0);
    }

    #[test]
    fn test_from_wav_mono_i16() {
        let path = std::env::temp_dir().join("audioscribe_test_mono.wav");
        write_wav_i16(&path, 16_000, 1, &[0, 16384, -16384, 32767]);

        let stream = AudioStream::from_wav(&path).unwrap();
        assert_eq!(stream.sample_rate(), 16_000);
        assert_eq!(stream.samples().len(), 4);
        assert!((stream.samples()[1] - 0.5).abs() < 1e-3);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_from_wav_stereo_downmix() {
        let path = std::env::temp_dir().join("audioscribe_test_stereo.wav");
        // two frames: (1.0-ish, 0.0) and (-0.5, -0.5)
        write_wav_i16(&path, 8_000, 2, &[32767, 0, -16384, -16384]);

        let stream = AudioStream::from_wav(&path).unwrap();
        assert_eq!(stream.samples().len(), 2);
        assert!((stream.samples()[0] - 0.5).abs() < 1e-3);
        assert!((stream.samples()[1] + 0.5).abs() < 1e-3);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_from_wav_missing_file() {
        let result = AudioStream::from_wav("/nonexistent/audio.wav");
        assert!(matches!(result, Err(Error::AudioNotFound { .. })));
    }

    #[test]
    fn test_from_wav_rejects_non_wav() {
        let path = std::env::temp_dir().join("audioscribe_test_not_audio.txt");
        std::fs::write(&path, "this is not audio").unwrap();
        assert!(AudioStream::from_wav(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_samples_in_valid_range() {
        let path = std::env::temp_dir().join("audioscribe_test_range.wav");
        write_wav_i16(&path, 16_000, 1, &[i16::MIN, -1, 0, 1, i16::MAX]);

        let stream = AudioStream::from_wav(&path).unwrap();
        for &s in stream.samples() {
            assert!((-1.0..=1.0).contains(&s), "sample {s} out of range");
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix(&samples, 1), samples);
    }

    #[test]
    fn test_downmix_averages() {
        let out = downmix(&[1.0, 0.0, 0.5, 0.5], 2);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.5).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }
}
