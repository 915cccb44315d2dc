use std::fs::File;
use std::path::Path;

use log::warn;

/// Reads every row of a GTFS table; rows that fail to deserialize are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn deserialize_gtfs_file<T>(path: &Path) -> Result<Vec<T>, std::io::Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;

    let mut skipped = 0usize;
    let rows: Vec<T> = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file)
        .deserialize()
        .filter_map(|row| {
            row.map_err(|e| {
                skipped += 1;
                log::trace!("Skipping row of '{}': {e}", path.display());
            })
            .ok()
        })
        .collect();

    if skipped > 0 {
        warn!("Skipped {skipped} malformed rows in '{}'", path.display());
    }
    Ok(rows)
}

/// Like `deserialize_gtfs_file`, but a missing file yields no rows
pub(super) fn deserialize_optional_gtfs_file<T>(path: &Path) -> Result<Vec<T>, std::io::Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    if path.exists() {
        deserialize_gtfs_file(path)
    } else {
        log::debug!("Optional GTFS file '{}' not found", path.display());
        Ok(Vec::new())
    }
}
