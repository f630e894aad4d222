use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::segment::Segment;

/// Candidate languages tried in priority order when the caller asks for
/// auto-detection. Overridable via [`CloudRecognizer::with_candidates`].
pub const DEFAULT_CANDIDATE_LANGUAGES: [&str; 5] =
    ["en-US", "hi-IN", "te-IN", "ta-IN", "kn-IN"];

/// Per-call timeout for the HTTP speech service.
const SERVICE_TIMEOUT: Duration = Duration::from_secs(30);

/// The tagged result of one recognition unit.
///
/// Never a bare string: the assembler needs to tell "empty because silent"
/// from "empty because the attempt failed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecognitionOutcome {
    /// Speech was recognized in the given language.
    Success { text: String, language: String },
    /// The audio was silent or below the service's speech threshold.
    NoSpeechDetected,
    /// Content was present but could not be decoded into text in any
    /// attempted language.
    Unintelligible,
    /// Transient infrastructure failure: network, quota, malformed request.
    ServiceError(String),
}

/// Requested language for the cloud path.
#[derive(Debug, Clone, PartialEq)]
pub enum LanguageHint {
    /// Try the recognizer's candidate list in priority order.
    Auto,
    /// A specific BCP-47 code, e.g. "en-US". No fallback.
    Code(String),
}

impl LanguageHint {
    /// Parse a CLI-style value: "auto" (any case) or a literal code.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("auto") {
            LanguageHint::Auto
        } else {
            LanguageHint::Code(s.to_string())
        }
    }
}

impl std::fmt::Display for LanguageHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageHint::Auto => write!(f, "auto"),
            LanguageHint::Code(code) => write!(f, "{code}"),
        }
    }
}

/// Abstract remote speech-to-text capability: one attempt, one language.
///
/// Implementations must map their wire protocol onto the outcome taxonomy —
/// the fallback policy in [`CloudRecognizer`] drives on these variants and
/// never sees transport details. Calls are blocking and assumed fallible;
/// implementations should impose their own network timeout and surface it as
/// [`RecognitionOutcome::ServiceError`].
pub trait SpeechService {
    fn recognize(&self, samples: &[f32], sample_rate: u32, language: &str) -> RecognitionOutcome;
}

/// Cloud-path recognizer: wraps a [`SpeechService`] with the multi-language
/// fallback policy.
///
/// Per segment: `Pending -> {Success, NoSpeechDetected, Unintelligible,
/// ServiceError}`, terminal in one attempt (explicit language) or after the
/// candidate list is exhausted (auto). At most one attempt per candidate, so
/// the loop always terminates.
pub struct CloudRecognizer<S> {
    service: S,
    sample_rate: u32,
    candidates: Vec<String>,
}

impl<S: SpeechService> CloudRecognizer<S> {
    pub fn new(service: S, sample_rate: u32) -> Self {
        Self {
            service,
            sample_rate,
            candidates: DEFAULT_CANDIDATE_LANGUAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Replace the auto-detection candidate list (priority order).
    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Recognize one segment, applying the fallback policy in auto mode.
    pub fn recognize(&self, segment: &Segment<'_>, hint: &LanguageHint) -> RecognitionOutcome {
        match hint {
            LanguageHint::Code(code) => {
                let outcome = self.attempt(segment, code);
                debug!(
                    start = segment.start,
                    end = segment.end,
                    language = %code,
                    ?outcome,
                    "segment recognized"
                );
                outcome
            }
            LanguageHint::Auto => self.recognize_auto(segment),
        }
    }

    fn recognize_auto(&self, segment: &Segment<'_>) -> RecognitionOutcome {
        let mut any_unintelligible = false;
        let mut last_error: Option<String> = None;

        for code in &self.candidates {
            match self.attempt(segment, code) {
                RecognitionOutcome::Success { text, language } => {
                    info!(
                        start = segment.start,
                        end = segment.end,
                        %language,
                        "segment recognized"
                    );
                    return RecognitionOutcome::Success { text, language };
                }
                // Silence is silence in every language; stop probing.
                RecognitionOutcome::NoSpeechDetected => {
                    debug!(start = segment.start, end = segment.end, "no speech detected");
                    return RecognitionOutcome::NoSpeechDetected;
                }
                RecognitionOutcome::Unintelligible => {
                    debug!(
                        start = segment.start,
                        end = segment.end,
                        language = %code,
                        "not understood, trying next candidate"
                    );
                    any_unintelligible = true;
                }
                RecognitionOutcome::ServiceError(detail) => {
                    warn!(
                        start = segment.start,
                        end = segment.end,
                        language = %code,
                        error = %detail,
                        "service error, trying next candidate"
                    );
                    last_error = Some(detail);
                }
            }
        }

        // Exhausted. A candidate that understood nothing is a judgment about
        // the content; only report a service error when no candidate got far
        // enough to judge.
        if any_unintelligible {
            RecognitionOutcome::Unintelligible
        } else {
            RecognitionOutcome::ServiceError(
                last_error.unwrap_or_else(|| "no candidate languages configured".into()),
            )
        }
    }

    fn attempt(&self, segment: &Segment<'_>, language: &str) -> RecognitionOutcome {
        match self
            .service
            .recognize(segment.samples, self.sample_rate, language)
        {
            // An understood-but-empty reply means the service heard nothing.
            RecognitionOutcome::Success { text, .. } if text.trim().is_empty() => {
                RecognitionOutcome::NoSpeechDetected
            }
            outcome => outcome,
        }
    }
}

/// JSON reply expected from the HTTP speech endpoint.
#[derive(Debug, Deserialize)]
struct ServiceReply {
    /// Recognized text; absent or null when the service could not interpret
    /// the audio.
    transcript: Option<String>,
}

/// [`SpeechService`] over a plain HTTP endpoint.
///
/// Posts the segment as raw signed 16-bit little-endian PCM
/// (`Content-Type: audio/l16; rate=<hz>`) with the language as a query
/// parameter, and expects `{"transcript": "..."}` back — `null` or a missing
/// field meaning the service could not interpret the speech. Timeouts and
/// non-success statuses become [`RecognitionOutcome::ServiceError`].
pub struct HttpSpeechService {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpSpeechService {
    /// Build a client for the given endpoint URL, with a fixed per-call
    /// timeout.
    pub fn new(endpoint: impl Into<String>) -> crate::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(SERVICE_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl SpeechService for HttpSpeechService {
    fn recognize(&self, samples: &[f32], sample_rate: u32, language: &str) -> RecognitionOutcome {
        let body = pcm_s16le_bytes(samples);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("lang", language)])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("audio/l16; rate={sample_rate}"),
            )
            .body(body)
            .send();

        let response = match response {
            Ok(r) => r,
            Err(e) => return RecognitionOutcome::ServiceError(e.to_string()),
        };

        if !response.status().is_success() {
            return RecognitionOutcome::ServiceError(format!(
                "service returned {}",
                response.status()
            ));
        }

        match response.json::<ServiceReply>() {
            Ok(ServiceReply {
                transcript: Some(text),
            }) => RecognitionOutcome::Success {
                text,
                language: language.to_string(),
            },
            Ok(ServiceReply { transcript: None }) => RecognitionOutcome::Unintelligible,
            Err(e) => RecognitionOutcome::ServiceError(format!("malformed reply: {e}")),
        }
    }
}

/// Convert f32 samples to raw s16le bytes for the wire.
fn pcm_s16le_bytes(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}
