use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::watch;

/// Errors from the rotation service.
#[derive(Error, Debug)]
pub enum RotationError {
    #[error("Rotation cancelled by user")]
    Cancelled,

    #[error("Input directory not found: {0}")]
    InputDirMissing(Utf8PathBuf),

    #[error("Image error for {path}: {source}")]
    Image {
        path: Utf8PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Outcome of processing a single file, delivered through the progress
/// callback of [`RotationService::rotate_batch`].
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file_name: String,
    pub ok: bool,
    /// Human-readable progress line, suitable for the window title
    pub message: String,
    /// Index of the rayon worker that processed the file
    pub worker: usize,
}

/// Totals for a completed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rotated: usize,
    pub failed: usize,
}

/// Service that rotates JPEG files 180 degrees in parallel.
///
/// The batch is a rayon `par_iter().try_for_each` over the file list, run on
/// a dedicated pool bounded by the worker count. Each loop body polls the
/// cancellation channel once before touching its file; a set signal
/// short-circuits the remaining iterations and surfaces a single
/// [`RotationError::Cancelled`] to the caller.
///
/// Framework-agnostic: no GUI types, no async. Callers drive it from
/// `spawn_blocking` and receive progress through the `on_file` callback.
pub struct RotationService {
    worker_threads: usize,
}

impl RotationService {
    /// Create a service with the given worker count; 0 means one worker per
    /// logical processor.
    pub fn new(worker_threads: usize) -> Self {
        let worker_threads = if worker_threads == 0 {
            num_cpus::get()
        } else {
            worker_threads
        };
        Self { worker_threads }
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Rotate a single image 180 degrees and save it under the same file name
    /// in `output_dir`.
    ///
    /// # Returns
    /// The path of the written output file.
    pub fn rotate_file(
        src: &Utf8Path,
        output_dir: &Utf8Path,
    ) -> Result<Utf8PathBuf, RotationError> {
        let file_name = src
            .file_name()
            .ok_or_else(|| RotationError::Io(std::io::Error::other("path has no file name")))?;

        let img = image::open(src).map_err(|source| RotationError::Image {
            path: src.to_path_buf(),
            source,
        })?;

        let rotated = img.rotate180();

        let dest = output_dir.join(file_name);
        rotated.save(&dest).map_err(|source| RotationError::Image {
            path: dest.clone(),
            source,
        })?;

        Ok(dest)
    }

    /// Rotate every file in `files`, writing results into `output_dir`.
    ///
    /// Creates the output directory if absent. `on_file` is invoked from
    /// worker threads once per completed file; per-file image errors are
    /// reported there and do not abort the batch. Cancellation does: the
    /// first worker to observe the signal stops the loop and the whole batch
    /// returns [`RotationError::Cancelled`].
    pub fn rotate_batch<F>(
        &self,
        files: &[Utf8PathBuf],
        output_dir: &Utf8Path,
        cancel_rx: watch::Receiver<bool>,
        on_file: F,
    ) -> Result<BatchSummary, RotationError>
    where
        F: Fn(FileOutcome) + Send + Sync,
    {
        fs::create_dir_all(output_dir)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_threads)
            .thread_name(|i| format!("picflip-rotate-{}", i))
            .build()?;

        tracing::info!(
            "Rotating {} files into {} with {} workers",
            files.len(),
            output_dir,
            self.worker_threads
        );

        let rotated = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        pool.install(|| {
            files.par_iter().try_for_each(|path| {
                // One cancellation check per item, before any decoding work
                if *cancel_rx.borrow() {
                    return Err(RotationError::Cancelled);
                }

                let worker = rayon::current_thread_index().unwrap_or(0);
                let file_name = path
                    .file_name()
                    .unwrap_or(path.as_str())
                    .to_string();

                match Self::rotate_file(path, output_dir) {
                    Ok(dest) => {
                        rotated.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!("Rotated {} -> {}", path, dest);
                        on_file(FileOutcome {
                            message: format!("Rotated {} on worker {}", file_name, worker),
                            file_name,
                            ok: true,
                            worker,
                        });
                    }
                    Err(e) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        tracing::error!("Failed to rotate {}: {}", path, e);
                        on_file(FileOutcome {
                            message: format!("Failed {}: {}", file_name, e),
                            file_name,
                            ok: false,
                            worker,
                        });
                    }
                }

                Ok(())
            })
        })?;

        let summary = BatchSummary {
            rotated: rotated.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
        };

        tracing::info!(
            "Batch finished: {} rotated, {} failed",
            summary.rotated,
            summary.failed
        );

        Ok(summary)
    }
}
