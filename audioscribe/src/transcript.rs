use serde::{Deserialize, Serialize};

use crate::recognize::RecognitionOutcome;

/// Marker rendered for a silent segment.
pub const NO_SPEECH_MARKER: &str = "[No speech detected]";
/// Marker rendered when no attempted language could decode the segment.
pub const UNINTELLIGIBLE_MARKER: &str = "[Could not understand audio]";
/// Marker rendered when every attempt failed at the transport level.
pub const SERVICE_ERROR_MARKER: &str = "[Recognition service error]";

/// One transcript line: a time window and what recognition made of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    /// Window start in seconds.
    pub start: f64,
    /// Window end in seconds (exclusive).
    pub end: f64,
    pub outcome: RecognitionOutcome,
}

/// The assembled, ordered transcript of one run. Immutable after assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
    /// Detected language, when the recognition path reports one.
    pub language: Option<String>,
    /// Name of the source recording, used in the document header.
    pub source: Option<String>,
}

impl Transcript {
    /// Assemble lines into a transcript, sorting chronologically.
    ///
    /// Callers that recognize segments in parallel may push lines in
    /// completion order; assembly restores chronological order. Pure — all
    /// failures were captured upstream as outcome variants.
    pub fn assemble(mut lines: Vec<TranscriptLine>, language: Option<String>) -> Self {
        lines.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self {
            lines,
            language,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Recognized text only, successes joined with spaces. Marker segments
    /// are skipped.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .filter_map(|line| match &line.outcome {
                RecognitionOutcome::Success { text, .. } => Some(text.trim()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render the timestamped body: one `[mm:ss - mm:ss] <payload>` line per
    /// segment, blank-line separated, in chronological order.
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(render_line)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Render the full text document: a header naming the source (and the
    /// detected language when known), a rule, then the body.
    pub fn render_document(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Transcript of: {}\n",
            self.source.as_deref().unwrap_or("(unknown source)")
        ));
        if let Some(lang) = &self.language {
            out.push_str(&format!("Detected Language: {lang}\n"));
        }
        out.push_str(&"=".repeat(50));
        out.push_str("\n\n");
        out.push_str(&self.render());
        out.push('\n');
        out
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn render_line(line: &TranscriptLine) -> String {
    let payload = match &line.outcome {
        RecognitionOutcome::Success { text, .. } => text.trim(),
        RecognitionOutcome::NoSpeechDetected => NO_SPEECH_MARKER,
        RecognitionOutcome::Unintelligible => UNINTELLIGIBLE_MARKER,
        RecognitionOutcome::ServiceError(_) => SERVICE_ERROR_MARKER,
    };
    format!(
        "[{} - {}] {payload}",
        format_clock(line.start),
        format_clock(line.end)
    )
}

/// Format seconds as mm:ss. Minutes are not wrapped at the hour, matching
/// the `[02:05 - 03:05]` style of the output files.
fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
