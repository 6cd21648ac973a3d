//! Versioned bincode snapshot files
//!
//! Each snapshot is a format version followed by the body. Files are
//! written to a sibling temp path and renamed into place, so a crash
//! mid-write leaves the previous snapshot intact.

use litrank_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    body: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    body: T,
}

/// Serialize `body` to `path` atomically
pub fn write_snapshot<T: Serialize>(path: &Path, body: &T) -> Result<()> {
    let bytes = bincode::serialize(&EnvelopeRef {
        version: SNAPSHOT_VERSION,
        body,
    })?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a snapshot written by [`write_snapshot`]
///
/// # Errors
/// - `Error::Io` if the file cannot be read
/// - `Error::Serialization` if it is corrupt or from another format version
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    let envelope: Envelope<T> = bincode::deserialize(&bytes)?;
    if envelope.version != SNAPSHOT_VERSION {
        return Err(Error::Serialization(format!(
            "unsupported snapshot version {} (expected {})",
            envelope.version, SNAPSHOT_VERSION
        )));
    }
    Ok(envelope.body)
}
