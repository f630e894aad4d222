use std::path::PathBuf;

/// All errors that can occur in audioscribe.
///
/// These are the *fatal* conditions — a run that returns one of these produced
/// no transcript at all. Per-segment recognition failures never surface here;
/// they are recorded as [`crate::RecognitionOutcome`] variants and rendered as
/// marker lines in an otherwise successful transcript.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("model error: {0}")]
    Model(String),

    #[error("model not found: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("model download failed: {0}")]
    ModelDownload(String),

    #[error("audio decoding error: {0}")]
    AudioDecode(String),

    #[error("audio file not found: {path}")]
    AudioNotFound { path: PathBuf },

    #[error("unsupported sample rate: {found} Hz — this path requires {required} Hz; resample upstream (e.g. ffmpeg -ar {required})")]
    UnsupportedSampleRate { found: u32, required: u32 },

    #[error("unsupported language: \"{0}\" — use Language::supported() to list valid codes")]
    UnsupportedLanguage(String),

    #[error("transcription error: {0}")]
    Transcription(String),

    #[error("whisper error: {0}")]
    Whisper(#[from] whisper_rs::WhisperError),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
