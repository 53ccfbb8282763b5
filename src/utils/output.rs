use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

/// Replace `path` with `contents`.
///
/// The data goes to a temporary file in the destination directory first and
/// is renamed over the target. An interrupted run leaves the old file intact.
///
/// # Errors
///
/// Returns an I/O error if the temporary file cannot be created, written or
/// renamed onto `path`.
pub fn write_whole_file(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote output file");
    Ok(())
}
