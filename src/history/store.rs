use super::RunEntry;
use crate::error::Error;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load the full history from `path`. The file must hold a JSON array of
/// run entries.
pub fn load(path: &Path) -> Result<Vec<RunEntry>, Error> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| io_err(path, source))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| malformed_store(path, e))?;
    entries_from_value(value, path)
}

/// Append one entry to the history at `path`, creating the file if needed.
/// The whole document is rewritten through a sibling temp file and renamed
/// over the destination, so readers see either the old or the new history.
pub fn append(path: &Path, entry: RunEntry) -> Result<(), Error> {
    let mut history = existing_entries(path)?;
    history.push(entry);
    write_atomic(path, &history)
}

/// History to extend: an absent file starts empty, a legacy top-level object
/// is discarded, everything else must parse as an array of runs.
fn existing_entries(path: &Path) -> Result<Vec<RunEntry>, Error> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|source| io_err(path, source))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| malformed_store(path, e))?;
    if value.is_object() {
        debug!(
            "{}: legacy object-shaped history, starting a fresh array",
            path.display()
        );
        return Ok(Vec::new());
    }
    entries_from_value(value, path)
}

fn entries_from_value(value: Value, path: &Path) -> Result<Vec<RunEntry>, Error> {
    if !value.is_array() {
        return Err(malformed_store(path, "top-level value is not an array"));
    }
    serde_json::from_value(value).map_err(|e| malformed_store(path, e))
}

fn write_atomic(path: &Path, history: &[RunEntry]) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| io_err(parent, source))?;
        }
    }

    let json = serde_json::to_string_pretty(history).map_err(|e| Error::Unexpected(e.into()))?;

    let tmp = path.with_extension("partial");
    fs::write(&tmp, json).map_err(|source| io_err(&tmp, source))?;
    fs::rename(&tmp, path).map_err(|source| io_err(path, source))?;
    Ok(())
}

fn io_err(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn malformed_store(path: &Path, reason: impl std::fmt::Display) -> Error {
    Error::MalformedStore {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
