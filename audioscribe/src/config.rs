use std::fmt;
use std::path::PathBuf;

use crate::error::Error;
use crate::recognize::{LanguageHint, DEFAULT_CANDIDATE_LANGUAGES};
use crate::segment::{SegmenterConfig, DEFAULT_CHUNK_DURATION, DEFAULT_MAX_TOTAL_DURATION};

/// A validated language for the local whisper path.
///
/// Wraps a code verified against whisper.cpp's supported language list.
/// Accepts both short codes ("en", "te") and full names ("english", "telugu").
/// Use `Language::Auto` for detection.
#[derive(Debug, Clone)]
pub enum Language {
    /// Auto-detect language from audio.
    Auto,
    /// A validated short code as whisper expects it (e.g. "en", "hi", "te").
    Code(String),
}

impl Language {
    /// Create a language from a code or full name, validating against
    /// whisper.cpp. Returns an error for unsupported languages.
    pub fn new(lang: &str) -> Result<Self, Error> {
        let lower = lang.to_lowercase();
        if lower == "auto" {
            return Ok(Language::Auto);
        }

        match whisper_rs::get_lang_id(&lower) {
            // Normalize full names ("telugu") to the short code ("te")
            Some(id) => Ok(Language::Code(
                whisper_rs::get_lang_str(id).unwrap_or(&lower).to_string(),
            )),
            None => Err(Error::UnsupportedLanguage(lang.to_string())),
        }
    }

    /// Get the short language code (e.g. "en"), or None for Auto.
    pub fn code(&self) -> Option<&str> {
        match self {
            Language::Auto => None,
            Language::Code(code) => Some(code),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Language::Auto)
    }

    /// List all supported languages as (code, full_name) pairs.
    pub fn supported() -> Vec<(&'static str, &'static str)> {
        let max = whisper_rs::get_lang_max_id();
        (0..=max)
            .filter_map(|id| {
                let code = whisper_rs::get_lang_str(id)?;
                let name = whisper_rs::get_lang_str_full(id)?;
                Some((code, name))
            })
            .collect()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Auto => write!(f, "auto"),
            Language::Code(code) => write!(f, "{code}"),
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Auto
    }
}

/// Whisper model sizes.
#[derive(Debug, Clone)]
pub enum Model {
    Tiny,
    TinyEn,
    Base,
    BaseEn,
    Small,
    SmallEn,
    Medium,
    MediumEn,
    LargeV2,
    LargeV3,
    LargeV3Turbo,
    /// User-provided .ggml file path.
    Custom(PathBuf),
}

impl Model {
    /// Every named size, in the order the CLI lists them.
    pub const ALL: [Model; 11] = [
        Model::Tiny,
        Model::TinyEn,
        Model::Base,
        Model::BaseEn,
        Model::Small,
        Model::SmallEn,
        Model::Medium,
        Model::MediumEn,
        Model::LargeV2,
        Model::LargeV3,
        Model::LargeV3Turbo,
    ];

    /// Size name; doubles as the CLI argument spelling.
    pub fn name(&self) -> &str {
        match self {
            Model::Tiny => "tiny",
            Model::TinyEn => "tiny.en",
            Model::Base => "base",
            Model::BaseEn => "base.en",
            Model::Small => "small",
            Model::SmallEn => "small.en",
            Model::Medium => "medium",
            Model::MediumEn => "medium.en",
            Model::LargeV2 => "large-v2",
            Model::LargeV3 => "large-v3",
            Model::LargeV3Turbo => "large-v3-turbo",
            Model::Custom(_) => "custom",
        }
    }

    /// Filename as published in the whisper.cpp weights repo, derived from
    /// the size name.
    pub fn filename(&self) -> String {
        match self {
            Model::Custom(path) => path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| "custom-model".into()),
            named => format!("ggml-{}.bin", named.name()),
        }
    }

    /// Approximate download size, for listings.
    pub fn approx_size(&self) -> &'static str {
        match self {
            Model::Tiny | Model::TinyEn => "75 MB",
            Model::Base | Model::BaseEn => "142 MB",
            Model::Small | Model::SmallEn => "466 MB",
            Model::Medium | Model::MediumEn => "1.5 GB",
            Model::LargeV2 | Model::LargeV3 => "2.9 GB",
            Model::LargeV3Turbo => "1.6 GB",
            Model::Custom(_) => "-",
        }
    }

    /// Parse a size name (e.g. CLI argument).
    pub fn parse_name(s: &str) -> Option<Self> {
        Self::ALL.iter().find(|m| m.name() == s).cloned()
    }
}

/// What the local model should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskMode {
    /// Transcribe in the spoken language.
    #[default]
    Transcribe,
    /// Translate into English.
    Translate,
}

/// Options for the cloud (segment-by-segment) recognition path.
#[derive(Debug, Clone)]
pub struct CloudOptions {
    /// Requested language, or auto-detection over `candidate_languages`.
    pub language: LanguageHint,
    /// Priority-ordered languages tried in auto mode.
    pub candidate_languages: Vec<String>,
    /// Window length per recognition call, seconds.
    pub chunk_duration: f64,
    /// Cap on total processed duration, seconds.
    pub max_total_duration: Option<f64>,
}

impl Default for CloudOptions {
    fn default() -> Self {
        Self {
            language: LanguageHint::Auto,
            candidate_languages: DEFAULT_CANDIDATE_LANGUAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            chunk_duration: DEFAULT_CHUNK_DURATION,
            max_total_duration: Some(DEFAULT_MAX_TOTAL_DURATION),
        }
    }
}

impl CloudOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(mut self, hint: LanguageHint) -> Self {
        self.language = hint;
        self
    }

    pub fn candidate_languages(mut self, candidates: Vec<String>) -> Self {
        self.candidate_languages = candidates;
        self
    }

    pub fn chunk_duration(mut self, seconds: f64) -> Self {
        self.chunk_duration = seconds;
        self
    }

    /// Cap total processed duration; `None` removes the cap.
    pub fn max_total_duration(mut self, seconds: Option<f64>) -> Self {
        self.max_total_duration = seconds;
        self
    }

    pub(crate) fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            chunk_duration: self.chunk_duration,
            max_total_duration: self.max_total_duration,
        }
    }
}

/// Options for the local whisper path.
#[derive(Debug, Clone)]
pub struct LocalOptions {
    pub model: Model,
    pub language: Language,
    pub task: TaskMode,
    pub gpu: bool,
    pub gpu_device: u32,
    pub n_threads: Option<u32>,
    pub temperature: f32,
    pub cache_dir: Option<PathBuf>,
}

impl Default for LocalOptions {
    fn default() -> Self {
        Self {
            model: Model::Base,
            language: Language::Auto,
            task: TaskMode::Transcribe,
            gpu: true,
            gpu_device: 0,
            n_threads: None,
            temperature: 0.0,
            cache_dir: None,
        }
    }
}

impl LocalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Set the language, validating against whisper's supported list.
    pub fn language(mut self, lang: &str) -> Result<Self, Error> {
        self.language = Language::new(lang)?;
        Ok(self)
    }

    pub fn task(mut self, task: TaskMode) -> Self {
        self.task = task;
        self
    }

    pub fn gpu(mut self, enabled: bool) -> Self {
        self.gpu = enabled;
        self
    }

    pub fn gpu_device(mut self, device: u32) -> Self {
        self.gpu_device = device;
        self
    }

    pub fn n_threads(mut self, n: u32) -> Self {
        self.n_threads = Some(n);
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    pub fn cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = Some(dir);
        self
    }

    /// Resolve the cache directory, defaulting to
    /// `~/.cache/audioscribe/models`.
    pub fn resolve_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("audioscribe")
                .join("models")
        })
    }
}
