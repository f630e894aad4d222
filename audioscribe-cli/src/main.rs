use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use audioscribe::{
    CloudOptions, HttpSpeechService, Language, LanguageHint, LocalOptions, Model, ModelCache,
    TaskMode,
};

#[derive(Parser)]
#[command(name = "audioscribe", about = "Transcribe a WAV recording to timestamped text")]
struct Cli {
    /// WAV file to transcribe.
    #[arg(required_unless_present_any = ["list_models", "download_model", "list_languages"])]
    input: Option<PathBuf>,

    /// Recognition engine.
    #[arg(short, long, default_value = "local")]
    engine: Engine,

    /// Output format.
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Write output to file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Language: a code ("en" for local, "en-US" for cloud) or "auto".
    #[arg(short, long, default_value = "auto")]
    language: String,

    /// Speech service endpoint URL (cloud engine).
    #[arg(long)]
    endpoint: Option<String>,

    /// Comma-separated candidate languages for cloud auto-detection,
    /// in priority order.
    #[arg(long, value_delimiter = ',')]
    candidates: Option<Vec<String>>,

    /// Window length per cloud recognition call, seconds.
    #[arg(long, default_value = "60")]
    chunk_duration: f64,

    /// Cap on processed duration in seconds (cloud engine); 0 disables the cap.
    #[arg(long, default_value = "300")]
    max_duration: f64,

    /// Whisper model to use (local engine).
    #[arg(short, long, default_value = "base")]
    model: String,

    /// Translate to English instead of transcribing (local engine).
    #[arg(long)]
    translate: bool,

    /// Disable GPU acceleration.
    #[arg(long)]
    no_gpu: bool,

    /// GPU device ID.
    #[arg(long, default_value = "0")]
    gpu_device: u32,

    /// Number of threads (default: auto).
    #[arg(long)]
    threads: Option<u32>,

    /// Sampling temperature.
    #[arg(long, default_value = "0.0")]
    temperature: f32,

    /// Model cache directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// List available whisper models.
    #[arg(long)]
    list_models: bool,

    /// Download a model without transcribing.
    #[arg(long)]
    download_model: Option<String>,

    /// List languages supported by the local engine.
    #[arg(long)]
    list_languages: bool,
}

#[derive(Clone, ValueEnum)]
enum Engine {
    /// Local whisper model, one pass over the whole stream.
    Local,
    /// Remote speech service, 60-second windows with language fallback.
    Cloud,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Headed document with [mm:ss - mm:ss] lines.
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("audioscribe=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.list_languages {
        println!("{:<6} {}", "CODE", "LANGUAGE");
        println!("{:<6} {}", "----", "--------");
        for (code, name) in Language::supported() {
            println!("{code:<6} {name}");
        }
        return;
    }

    if cli.list_models {
        println!("{:<16} DOWNLOAD", "MODEL");
        for model in &Model::ALL {
            println!("{:<16} {}", model.name(), model.approx_size());
        }

        let cache = ModelCache::from_options(&LocalOptions::default());
        let cached = cache.cached();
        if !cached.is_empty() {
            println!("\nCached in {}:", cache.dir().display());
            for path in cached {
                let size = std::fs::metadata(&path)
                    .map(|m| human_size(m.len()))
                    .unwrap_or_default();
                println!(
                    "  {} ({size})",
                    path.file_name()
                        .map(|f| f.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
            }
        }
        return;
    }

    if let Some(model_name) = &cli.download_model {
        let model = match Model::parse_name(model_name) {
            Some(m) => m,
            None => {
                eprintln!("Unknown model: {model_name}");
                eprintln!("Use --list-models to see available models");
                std::process::exit(1);
            }
        };
        let cache = match &cli.cache_dir {
            Some(dir) => ModelCache::new(dir.clone()),
            None => ModelCache::from_options(&LocalOptions::default()),
        };
        match cache.ensure(&model).await {
            Ok(path) => println!("Model ready: {}", path.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let input = cli.input.clone().unwrap();

    let result = match cli.engine {
        Engine::Local => run_local(&cli, &input).await,
        Engine::Cloud => run_cloud(&cli, &input).await,
    };

    let transcript = match result {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    eprintln!(
        "Transcription complete: {} lines, language: {}",
        transcript.lines().len(),
        transcript.language.as_deref().unwrap_or("n/a"),
    );

    let output_text = match cli.format {
        OutputFormat::Text => transcript.render_document(),
        OutputFormat::Json => match transcript.to_json_pretty() {
            Ok(j) => j,
            Err(e) => {
                eprintln!("JSON error: {e}");
                std::process::exit(1);
            }
        },
    };

    match cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &output_text) {
                eprintln!("Error writing to {}: {e}", path.display());
                std::process::exit(1);
            }
            eprintln!("Written to {}", path.display());
        }
        None => print!("{output_text}"),
    }
}

async fn run_local(cli: &Cli, input: &PathBuf) -> audioscribe::Result<audioscribe::Transcript> {
    let model = match Model::parse_name(&cli.model) {
        Some(m) => m,
        None => {
            // Try as custom model path
            let path = PathBuf::from(&cli.model);
            if path.exists() {
                Model::Custom(path)
            } else {
                eprintln!("Unknown model: {}", cli.model);
                eprintln!("Use --list-models to see available models, or provide a path to a .ggml file");
                std::process::exit(1);
            }
        }
    };

    let mut opts = LocalOptions::new()
        .model(model)
        .language(&cli.language)?
        .task(if cli.translate {
            TaskMode::Translate
        } else {
            TaskMode::Transcribe
        })
        .gpu(!cli.no_gpu)
        .gpu_device(cli.gpu_device)
        .temperature(cli.temperature);

    if let Some(n) = cli.threads {
        opts = opts.n_threads(n);
    }
    if let Some(dir) = &cli.cache_dir {
        opts = opts.cache_dir(dir.clone());
    }

    audioscribe::transcribe_wav_local(input, &opts).await
}

async fn run_cloud(cli: &Cli, input: &PathBuf) -> audioscribe::Result<audioscribe::Transcript> {
    let endpoint = match &cli.endpoint {
        Some(url) => url.clone(),
        None => {
            eprintln!("The cloud engine requires --endpoint <URL>");
            std::process::exit(1);
        }
    };

    let mut opts = CloudOptions::new()
        .language(LanguageHint::parse(&cli.language))
        .chunk_duration(cli.chunk_duration)
        .max_total_duration((cli.max_duration > 0.0).then_some(cli.max_duration));

    if let Some(candidates) = &cli.candidates {
        opts = opts.candidate_languages(candidates.clone());
    }

    let input = input.clone();
    // The HTTP speech client is blocking; keep it off the async runtime.
    tokio::task::spawn_blocking(move || {
        let service = HttpSpeechService::new(endpoint)?;
        audioscribe::transcribe_wav_cloud(&input, service, &opts)
    })
    .await
    .map_err(|e| audioscribe::Error::Transcription(format!("worker panicked: {e}")))?
}

/// Scale a byte count for the cached-model listing.
fn human_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if value < 1000.0 {
            return if unit == "B" {
                format!("{bytes} B")
            } else {
                format!("{value:.1} {unit}")
            };
        }
        value /= 1000.0;
    }
    format!("{value:.1} TB")
}
