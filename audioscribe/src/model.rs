use std::io::Write;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::config::{LocalOptions, Model};
use crate::error::{Error, Result};

/// Where ggerganov publishes the whisper.cpp ggml weights.
const WEIGHTS_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Smallest plausible ggml file. Anything under this is an HTML error page,
/// not weights.
const MIN_MODEL_BYTES: u64 = 1_000_000;

/// Extension of an in-flight download. Never listed by [`ModelCache::cached`].
const PARTIAL_EXT: &str = "download";

/// On-disk store of whisper model weights, one `ggml-*.bin` per named size.
///
/// The local path only ever talks to the cache: it asks for a [`Model`] and
/// gets back a path to complete weights, fetching them on first use.
pub struct ModelCache {
    dir: PathBuf,
}

impl ModelCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache at the directory the options resolve to
    /// (`~/.cache/audioscribe/models` unless overridden).
    pub fn from_options(options: &LocalOptions) -> Self {
        Self::new(options.resolve_cache_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a model occupies (or will occupy) in this cache.
    pub fn slot(&self, model: &Model) -> PathBuf {
        self.dir.join(model.filename())
    }

    /// Make a model available locally and return its path.
    ///
    /// Named sizes are fetched into the cache on first use. A
    /// [`Model::Custom`] path is returned as-is after an existence check; it
    /// is never copied into the cache.
    pub async fn ensure(&self, model: &Model) -> Result<PathBuf> {
        if let Model::Custom(path) = model {
            return if path.exists() {
                Ok(path.clone())
            } else {
                Err(Error::ModelNotFound { path: path.clone() })
            };
        }

        let slot = self.slot(model);
        if slot.exists() {
            debug!(model = model.name(), path = %slot.display(), "cache hit");
            return Ok(slot);
        }

        std::fs::create_dir_all(&self.dir).map_err(|e| {
            Error::ModelDownload(format!(
                "cannot create cache dir {}: {e}",
                self.dir.display()
            ))
        })?;

        let url = format!("{WEIGHTS_BASE_URL}/{}", model.filename());
        info!(model = model.name(), %url, "fetching model weights");
        fetch(&url, &slot).await?;
        Ok(slot)
    }

    /// Fully downloaded models currently in the cache, sorted by filename.
    pub fn cached(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut models: Vec<PathBuf> = entries
            .filter_map(|e| Some(e.ok()?.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "bin"))
            .collect();
        models.sort();
        models
    }
}

/// Stream `url` into `dest`, via a partial file so the slot only ever holds
/// complete weights. A short or truncated body fails the download.
async fn fetch(url: &str, dest: &Path) -> Result<()> {
    let response = reqwest::get(url)
        .await?
        .error_for_status()
        .map_err(|e| Error::ModelDownload(e.to_string()))?;

    let expected = response.content_length();
    let bar = download_bar(dest, expected.unwrap_or(0));

    let partial = dest.with_extension(PARTIAL_EXT);
    let mut file = std::fs::File::create(&partial)?;
    let mut written: u64 = 0;
    let mut chunks = response.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        written += chunk.len() as u64;
        bar.set_position(written);
    }
    file.flush()?;
    drop(file);

    if written < MIN_MODEL_BYTES {
        std::fs::remove_file(&partial).ok();
        return Err(Error::ModelDownload(format!(
            "got {written} bytes from {url} — that is an error page, not model weights"
        )));
    }
    if let Some(expected) = expected {
        if written != expected {
            std::fs::remove_file(&partial).ok();
            return Err(Error::ModelDownload(format!(
                "truncated download: {written} of {expected} bytes"
            )));
        }
    }

    std::fs::rename(&partial, dest)?;
    bar.finish_and_clear();
    info!(path = %dest.display(), bytes = written, "model ready");
    Ok(())
}

fn download_bar(dest: &Path, total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} {bar:40.green} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
            .expect("valid template")
            .progress_chars("=> "),
    );
    bar.set_prefix(
        dest.file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    bar
}
