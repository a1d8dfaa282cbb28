//! Input formats: registry snapshots (JSON) and vote logs (text).

pub mod vote_log;

use crate::model::registry::{RegistrySnapshot, VoteEvent};
use crate::util;
use log::debug;
use sha1::{Digest, Sha1};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Vote log line {line}: {message}")]
    VoteLog { line: usize, message: String },
}

pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// A registry snapshot together with the SHA-1 of the bytes it was read from.
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub snapshot: RegistrySnapshot,
    pub digest: String,
}

pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn parse_snapshot(bytes: &[u8]) -> FormatResult<LoadedSnapshot> {
    let snapshot: RegistrySnapshot = serde_json::from_slice(bytes)?;
    Ok(LoadedSnapshot {
        snapshot,
        digest: digest(bytes),
    })
}

pub fn read_snapshot(path: &Path) -> FormatResult<LoadedSnapshot> {
    let bytes = util::read_bytes(path)?;
    let loaded = parse_snapshot(&bytes)?;
    debug!(
        "Read snapshot {}: {} candidates, {} centers, sha1 {}",
        path.display(),
        loaded.snapshot.candidates.len(),
        loaded.snapshot.centers.len(),
        loaded.digest
    );
    Ok(loaded)
}

pub fn read_vote_log(path: &Path) -> FormatResult<Vec<VoteEvent>> {
    let text = util::read_string(path)?;
    let votes = vote_log::parse_vote_log(&text)?;
    debug!("Read {} votes from {}", votes.len(), path.display());
    Ok(votes)
}
