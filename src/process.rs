//! Batch compression of image files.
//!
//! The CLI's `compress` command feeds files through the same path an upload
//! takes in the app: each file is read, wrapped as a data URI (as a photo
//! picker would hand it over), compressed, and the JPEG is written to the
//! output directory as `<stem>.jpg`.
//!
//! ## Inputs
//!
//! Arguments may be files or directories. Directories are walked
//! recursively and every file with a decodable extension is picked up.
//! Explicitly named files are taken as-is, so a mislabeled file surfaces as
//! a decode failure rather than being skipped silently.
//!
//! ## Output names
//!
//! Two inputs with the same stem (`rex.png`, `rex.jpg`) would collide, so
//! later ones get a numeric suffix: `rex.jpg`, `rex-2.jpg`.
//!
//! ## Parallel Processing
//!
//! Files are compressed in parallel using [rayon](https://docs.rs/rayon).
//! A failure on one file is recorded and the rest continue.

use crate::imaging::{
    CompressConfig, CompressOutcome, ImageBackend, RustBackend, compress_image,
    is_supported_image, mime_for_path,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),
}

/// One successfully compressed file.
#[derive(Debug, Clone)]
pub struct CompressedFile {
    pub source: PathBuf,
    pub output: PathBuf,
    pub source_bytes: u64,
    pub width: u32,
    pub height: u32,
    pub quality: u32,
    pub output_bytes: usize,
    pub attempts: u32,
    pub within_budget: bool,
}

/// A file that could not be compressed.
#[derive(Debug, Clone)]
pub struct FailedFile {
    pub source: PathBuf,
    pub error: String,
}

/// Progress reported while a batch runs, one event per file.
#[derive(Debug, Clone)]
pub enum CompressEvent {
    Compressed(CompressedFile),
    Failed(FailedFile),
}

#[derive(Debug, Default)]
pub struct BatchResult {
    /// In input order.
    pub compressed: Vec<CompressedFile>,
    pub failed: Vec<FailedFile>,
}

impl BatchResult {
    pub fn over_budget(&self) -> usize {
        self.compressed.iter().filter(|f| !f.within_budget).count()
    }
}

/// Expand files and directories into the list of images to compress.
///
/// Directory contents are sorted by path so runs are reproducible.
pub fn collect_images(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, ProcessError> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input).follow_links(true) {
                let entry = entry.map_err(|source| ProcessError::Walk {
                    path: input.clone(),
                    source,
                })?;
                if entry.file_type().is_file() && is_supported_image(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            images.extend(found);
        } else if input.is_file() {
            images.push(input.clone());
        } else {
            return Err(ProcessError::InputNotFound(input.clone()));
        }
    }
    Ok(images)
}

/// Pair each source with its output path, de-duplicating file names.
///
/// Names are compared case-insensitively and every name handed out is
/// reserved, so a suffixed `rex-2.jpg` can't collide with an input that
/// is itself called `rex-2`.
pub fn plan_outputs(sources: &[PathBuf], output_dir: &Path) -> Vec<(PathBuf, PathBuf)> {
    let mut taken: HashSet<String> = HashSet::new();
    sources
        .iter()
        .map(|source| {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let mut name = format!("{stem}.jpg");
            let mut suffix = 1;
            while !taken.insert(name.to_lowercase()) {
                suffix += 1;
                name = format!("{stem}-{suffix}.jpg");
            }
            (source.clone(), output_dir.join(name))
        })
        .collect()
}

/// Read a file and wrap it as a base64 data URI.
pub fn read_as_data_uri(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!(
        "data:{};base64,{}",
        mime_for_path(path),
        STANDARD.encode(bytes)
    ))
}

/// Compress `sources` into `output_dir` with the default backend.
pub fn compress_files(
    sources: &[PathBuf],
    output_dir: &Path,
    config: &CompressConfig,
    progress: Option<Sender<CompressEvent>>,
) -> Result<BatchResult, ProcessError> {
    compress_files_with_backend(&RustBackend::new(), sources, output_dir, config, progress)
}

/// Compress using a specific backend (allows testing with mock).
pub fn compress_files_with_backend<B: ImageBackend>(
    backend: &B,
    sources: &[PathBuf],
    output_dir: &Path,
    config: &CompressConfig,
    progress: Option<Sender<CompressEvent>>,
) -> Result<BatchResult, ProcessError> {
    std::fs::create_dir_all(output_dir)?;
    let plan = plan_outputs(sources, output_dir);

    let events: Vec<CompressEvent> = plan
        .par_iter()
        .map(|(source, output)| {
            let event = match compress_one(backend, source, output, config) {
                Ok(file) => CompressEvent::Compressed(file),
                Err(error) => {
                    tracing::warn!(source = %source.display(), %error, "compression failed");
                    CompressEvent::Failed(FailedFile {
                        source: source.clone(),
                        error,
                    })
                }
            };
            if let Some(tx) = &progress {
                tx.send(event.clone()).ok();
            }
            event
        })
        .collect();

    let mut result = BatchResult::default();
    for event in events {
        match event {
            CompressEvent::Compressed(file) => result.compressed.push(file),
            CompressEvent::Failed(file) => result.failed.push(file),
        }
    }
    Ok(result)
}

fn compress_one<B: ImageBackend>(
    backend: &B,
    source: &Path,
    output: &Path,
    config: &CompressConfig,
) -> Result<CompressedFile, String> {
    let source_bytes = std::fs::metadata(source)
        .map_err(|e| e.to_string())?
        .len();
    let data_uri = read_as_data_uri(source).map_err(|e| e.to_string())?;
    let outcome = compress_image(backend, &data_uri, config).map_err(|e| e.to_string())?;
    let jpeg = jpeg_bytes(&outcome)?;
    std::fs::write(output, &jpeg).map_err(|e| format!("{}: {e}", output.display()))?;

    Ok(CompressedFile {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        source_bytes,
        width: outcome.width,
        height: outcome.height,
        quality: outcome.quality.value(),
        output_bytes: jpeg.len(),
        attempts: outcome.attempts,
        within_budget: outcome.within_budget,
    })
}

fn jpeg_bytes(outcome: &CompressOutcome) -> Result<Vec<u8>, String> {
    let payload = outcome
        .data_uri
        .split_once(',')
        .map(|(_, p)| p)
        .unwrap_or(&outcome.data_uri);
    STANDARD.decode(payload).map_err(|e| e.to_string())
}
