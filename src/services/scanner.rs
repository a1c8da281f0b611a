use crate::services::rotation::RotationError;
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

/// Extensions treated as JPEG input, compared case-insensitively.
pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Recursively collect all JPEG files under the given directory.
///
/// Results are sorted by path so a run always visits files in a stable order
/// (completion order is still up to the worker pool).
pub fn scan_images(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, RotationError> {
    if !dir.is_dir() {
        return Err(RotationError::InputDirMissing(dir.to_path_buf()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| {
            RotationError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::other("walkdir loop detected")
            }))
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = match Utf8PathBuf::from_path_buf(entry.path().to_path_buf()) {
            Ok(path) => path,
            Err(path) => {
                tracing::warn!("Skipping non-UTF-8 path: {}", path.display());
                continue;
            }
        };

        let is_jpeg = path
            .extension()
            .map(|ext| ext.to_ascii_lowercase())
            .is_some_and(|ext| JPEG_EXTENSIONS.contains(&ext.as_str()));

        if is_jpeg {
            files.push(path);
        }
    }

    files.sort();

    tracing::debug!("Found {} JPEG files under {}", files.len(), dir);
    Ok(files)
}
