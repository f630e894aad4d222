use tracing::info;

use crate::audio::AudioStream;
use crate::config::CloudOptions;
use crate::recognize::{CloudRecognizer, SpeechService};
use crate::segment::Segmenter;
use crate::transcript::{Transcript, TranscriptLine};

/// Run the cloud recognition pipeline over a stream: slice into windows,
/// recognize each against the service (with language fallback), assemble.
///
/// Infallible by construction — the stream is already open, and every
/// per-segment failure becomes an outcome variant in the transcript. Segments
/// are processed sequentially; each window's buffer is a borrowed slice
/// dropped once its outcome is recorded.
pub fn transcribe_stream<S: SpeechService>(
    stream: &AudioStream,
    service: S,
    options: &CloudOptions,
) -> Transcript {
    let segmenter = Segmenter::new(stream, &options.segmenter_config());
    let recognizer = CloudRecognizer::new(service, stream.sample_rate())
        .with_candidates(options.candidate_languages.clone());

    info!(
        duration_secs = format!("{:.1}", stream.duration()),
        segments = segmenter.len(),
        chunk_secs = options.chunk_duration,
        language = %options.language,
        "transcribing stream"
    );

    let mut lines = Vec::with_capacity(segmenter.len());
    for segment in segmenter.segments() {
        let outcome = recognizer.recognize(&segment, &options.language);
        lines.push(TranscriptLine {
            start: segment.start,
            end: segment.end,
            outcome,
        });
    }

    Transcript::assemble(lines, None)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::recognize::{LanguageHint, RecognitionOutcome};
    use crate::transcript::UNINTELLIGIBLE_MARKER;

    /// Service scripted per segment index (derived from attempt order).
    struct PerSegmentService {
        outcomes: Vec<RecognitionOutcome>,
        calls: RefCell<usize>,
    }

    impl SpeechService for &PerSegmentService {
        fn recognize(&self, _samples: &[f32], _rate: u32, language: &str) -> RecognitionOutcome {
            let idx = *self.calls.borrow();
            *self.calls.borrow_mut() += 1;
            match self.outcomes.get(idx) {
                Some(RecognitionOutcome::Success { text, .. }) => RecognitionOutcome::Success {
                    text: text.clone(),
                    language: language.to_string(),
                },
                Some(other) => other.clone(),
                None => RecognitionOutcome::Unintelligible,
            }
        }
    }

    fn stream_of(duration_secs: f64) -> AudioStream {
        let n = (duration_secs * 16_000.0) as usize;
        AudioStream::new(vec![0.1; n], 16_000).unwrap()
    }

    fn ok(text: &str) -> RecognitionOutcome {
        RecognitionOutcome::Success {
            text: text.into(),
            language: "en-US".into(),
        }
    }

    #[test]
    fn test_empty_stream_empty_transcript() {
        let stream = stream_of(0.0);
        let service = PerSegmentService {
            outcomes: vec![],
            calls: RefCell::new(0),
        };
        let transcript = transcribe_stream(&stream, &service, &CloudOptions::default());
        assert!(transcript.is_empty());
        assert_eq!(*service.calls.borrow(), 0);
    }

    #[test]
    fn test_end_to_end_125_seconds() {
        // 125 s stream, 60 s chunks, 300 s cap: three lines, the middle one a
        // marker, everything chronological.
        let stream = stream_of(125.0);
        let service = PerSegmentService {
            outcomes: vec![
                ok("first minute"),
                RecognitionOutcome::Unintelligible,
                ok("last five seconds"),
            ],
            calls: RefCell::new(0),
        };
        let options = CloudOptions::new().language(LanguageHint::Code("en-US".into()));
        let transcript = transcribe_stream(&stream, &service, &options);

        assert_eq!(transcript.lines().len(), 3);
        let spans: Vec<(f64, f64)> = transcript
            .lines()
            .iter()
            .map(|l| (l.start, l.end))
            .collect();
        assert_eq!(spans, vec![(0.0, 60.0), (60.0, 120.0), (120.0, 125.0)]);

        let body = transcript.render();
        let rendered: Vec<&str> = body.split("\n\n").collect();
        assert_eq!(rendered[0], "[00:00 - 01:00] first minute");
        assert_eq!(rendered[1], format!("[01:00 - 02:00] {UNINTELLIGIBLE_MARKER}"));
        assert_eq!(rendered[2], "[02:00 - 02:05] last five seconds");
    }

    #[test]
    fn test_cap_limits_service_calls() {
        let stream = stream_of(600.0);
        let service = PerSegmentService {
            outcomes: (0..10).map(|i| ok(&format!("chunk {i}"))).collect(),
            calls: RefCell::new(0),
        };
        let options = CloudOptions::new().language(LanguageHint::Code("en-US".into()));
        let transcript = transcribe_stream(&stream, &service, &options);

        // 300 s cap at 60 s chunks: five segments, five calls.
        assert_eq!(transcript.lines().len(), 5);
        assert_eq!(*service.calls.borrow(), 5);
        assert_eq!(transcript.lines().last().unwrap().end, 300.0);
    }

    #[test]
    fn test_failures_never_abort() {
        let stream = stream_of(180.0);
        let service = PerSegmentService {
            outcomes: vec![
                RecognitionOutcome::ServiceError("down".into()),
                RecognitionOutcome::ServiceError("down".into()),
                RecognitionOutcome::ServiceError("down".into()),
            ],
            calls: RefCell::new(0),
        };
        let options = CloudOptions::new().language(LanguageHint::Code("en-US".into()));
        let transcript = transcribe_stream(&stream, &service, &options);

        assert_eq!(transcript.lines().len(), 3);
        assert!(transcript
            .lines()
            .iter()
            .all(|l| matches!(l.outcome, RecognitionOutcome::ServiceError(_))));
        // Still renders a document, just all markers.
        assert!(transcript.render().contains("[Recognition service error]"));
    }
}
