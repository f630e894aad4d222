use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::{AudioStream, WHISPER_SAMPLE_RATE};
use crate::config::{Language, LocalOptions, TaskMode};
use crate::error::{Error, Result};
use crate::recognize::RecognitionOutcome;
use crate::transcript::{Transcript, TranscriptLine};

/// One timestamped phrase from the local model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpokenSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Structured result of one whole-stream pass of the local model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalTranscription {
    pub segments: Vec<SpokenSegment>,
    /// Detected (or requested) language code.
    pub language: String,
    /// Stream duration in seconds.
    pub duration: f64,
    /// Model size name used for this run.
    pub model: String,
}

impl LocalTranscription {
    /// Full text, segments concatenated.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Convert into the common transcript form. The model's own segment
    /// boundaries are kept as the line boundaries.
    pub fn into_transcript(self) -> Transcript {
        let language = self.language.clone();
        let lines = self
            .segments
            .into_iter()
            .map(|s| TranscriptLine {
                start: s.start,
                end: s.end,
                outcome: RecognitionOutcome::Success {
                    text: s.text.trim().to_string(),
                    language: language.clone(),
                },
            })
            .collect();
        Transcript::assemble(lines, Some(language))
    }
}

/// A loaded whisper.cpp model.
///
/// Loading is the expensive part, so the context is built once and reused:
/// [`LocalModel::transcribe`] can be called any number of times against the
/// same instance. The model runs over the whole stream in one pass and does
/// its own internal chunking — the segmenter is not involved on this path.
pub struct LocalModel {
    ctx: WhisperContext,
    model_name: String,
}

impl LocalModel {
    /// Load a ggml model file into a whisper context.
    pub fn load(model_path: &Path, options: &LocalOptions) -> Result<Self> {
        info!(model = %model_path.display(), "loading whisper model");

        let mut ctx_params = WhisperContextParameters::new();
        ctx_params.use_gpu(options.gpu);
        ctx_params.gpu_device(options.gpu_device as i32);

        let ctx = WhisperContext::new_with_params(
            model_path
                .to_str()
                .ok_or_else(|| Error::Model("model path contains invalid UTF-8".into()))?,
            ctx_params,
        )?;

        Ok(Self {
            ctx,
            model_name: options.model.name().to_string(),
        })
    }

    /// Transcribe (or translate) a whole stream in one pass.
    ///
    /// Whisper requires 16 kHz input; any other rate is a fatal error —
    /// resampling belongs upstream.
    pub fn transcribe(
        &self,
        stream: &AudioStream,
        options: &LocalOptions,
    ) -> Result<LocalTranscription> {
        if stream.sample_rate() != WHISPER_SAMPLE_RATE {
            return Err(Error::UnsupportedSampleRate {
                found: stream.sample_rate(),
                required: WHISPER_SAMPLE_RATE,
            });
        }

        let mut state = self.ctx.create_state()?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 5 });

        match &options.language {
            Language::Auto => params.set_detect_language(true),
            Language::Code(code) => params.set_language(Some(code)),
        }

        params.set_translate(options.task == TaskMode::Translate);
        params.set_temperature(options.temperature);

        if let Some(n) = options.n_threads {
            params.set_n_threads(n as i32);
        }

        // Keep whisper.cpp off stderr
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        info!(samples = stream.samples().len(), task = ?options.task, "running transcription");
        state.full(params, stream.samples())?;

        let num_segments = state.full_n_segments();
        debug!(num_segments, "transcription complete");

        let mut segments = Vec::with_capacity(num_segments as usize);

        for i in 0..num_segments {
            let segment = state
                .get_segment(i)
                .ok_or_else(|| Error::Transcription(format!("segment {i} not found")))?;

            let text = segment
                .to_str_lossy()
                .map_err(|e| Error::Transcription(format!("segment text error: {e}")))?
                .into_owned();

            // whisper timestamps are centiseconds
            segments.push(SpokenSegment {
                start: segment.start_timestamp() as f64 / 100.0,
                end: segment.end_timestamp() as f64 / 100.0,
                text,
            });
        }

        let language = match &options.language {
            Language::Code(code) => code.clone(),
            Language::Auto => {
                let detected_id = state.full_lang_id_from_state();
                whisper_rs::get_lang_str(detected_id)
                    .unwrap_or("unknown")
                    .to_string()
            }
        };

        Ok(LocalTranscription {
            segments,
            language,
            duration: stream.duration(),
            model: self.model_name.clone(),
        })
    }
}
