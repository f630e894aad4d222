//! Audio transcription library — PCM stream in, timestamped transcript out.
//!
//! **audioscribe** turns a recorded audio stream into a readable transcript
//! via one of two recognition paths:
//!
//! - the **cloud path** slices the stream into fixed windows, submits each to
//!   a remote speech service (retrying across a prioritized candidate-language
//!   list in auto-detect mode), and assembles the per-window outcomes into an
//!   ordered transcript where failures become marker lines instead of aborts;
//! - the **local path** runs a whisper.cpp model once over the whole stream
//!   and keeps the model's own timestamped segmentation.
//!
//! Producing the audio itself (downloading, demuxing, resampling) is
//! upstream's job; this crate ingests plain WAV or already-decoded PCM.
//!
//! # Quick start
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> audioscribe::Result<()> {
//! // Local whisper model, whole-stream pass
//! let transcript = audioscribe::transcribe_wav_local(
//!     "meeting.wav",
//!     &audioscribe::LocalOptions::default(),
//! )
//! .await?;
//! println!("{}", transcript.render_document());
//!
//! // Remote service, 60-second windows with language fallback
//! let service = audioscribe::HttpSpeechService::new("https://stt.example/v1/recognize")?;
//! let transcript = audioscribe::transcribe_wav_cloud(
//!     "meeting.wav",
//!     service,
//!     &audioscribe::CloudOptions::default(),
//! )?;
//! println!("{}", transcript.render());
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod local;
pub mod model;
pub mod pipeline;
pub mod recognize;
pub mod segment;
pub mod transcript;

pub use audio::AudioStream;
pub use config::{CloudOptions, Language, LocalOptions, Model, TaskMode};
pub use error::{Error, Result};
pub use local::{LocalModel, LocalTranscription, SpokenSegment};
pub use model::ModelCache;
pub use pipeline::transcribe_stream;
pub use recognize::{
    CloudRecognizer, HttpSpeechService, LanguageHint, RecognitionOutcome, SpeechService,
    DEFAULT_CANDIDATE_LANGUAGES,
};
pub use segment::{Segment, Segmenter, SegmenterConfig};
pub use transcript::{Transcript, TranscriptLine};

use std::path::Path;

/// Transcribe a WAV file through a remote speech service.
///
/// Opens the file (the only fatal step), then runs the segment/recognize/
/// assemble pipeline — per-segment failures end up as marker lines, never
/// errors.
pub fn transcribe_wav_cloud<S: SpeechService>(
    path: impl AsRef<Path>,
    service: S,
    options: &CloudOptions,
) -> Result<Transcript> {
    let path = path.as_ref();
    let stream = AudioStream::from_wav(path)?;
    let transcript = pipeline::transcribe_stream(&stream, service, options);
    Ok(attach_source(transcript, path))
}

/// Transcribe a WAV file with a local whisper model.
///
/// Ensures the model is cached (downloading on first use), loads it once, and
/// runs a single whole-stream pass.
pub async fn transcribe_wav_local(
    path: impl AsRef<Path>,
    options: &LocalOptions,
) -> Result<Transcript> {
    let path = path.as_ref();

    let model_path = ModelCache::from_options(options)
        .ensure(&options.model)
        .await?;

    let stream = AudioStream::from_wav(path)?;

    let model = LocalModel::load(&model_path, options)?;
    let transcription = model.transcribe(&stream, options)?;

    Ok(attach_source(transcription.into_transcript(), path))
}

fn attach_source(transcript: Transcript, path: &Path) -> Transcript {
    match path.file_name() {
        Some(name) => transcript.with_source(name.to_string_lossy()),
        None => transcript,
    }
}
