//! On-disk model artifact formats.
//!
//! A model file is decoded with one of these strategies, in order:
//!
//! 1. **Binary**: magic `LRM1` (4 bytes), format version `u32` LE,
//!    reserved flags `u32` LE, then a `bincode` payload. Fast and portable.
//! 2. **JSON**: the model serialized with `serde_json`, read as UTF-8.
//! 3. **JSON (Latin-1)**: same, but every byte is read as the Latin-1 code
//!    point of the same value. Covers artifacts written by legacy tooling.

use crate::models::linear::LinearRegression;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Magic bytes identifying a binary model artifact.
pub const ARTIFACT_MAGIC: [u8; 4] = *b"LRM1";

/// Current binary artifact version.
pub const ARTIFACT_VERSION: u32 = 1;

/// Header size in bytes (magic + version + flags).
pub const ARTIFACT_HEADER_SIZE: usize = 12;

/// Decoding strategy that produced a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStrategy {
    Binary,
    Json,
    JsonLatin1,
}

impl std::fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoadStrategy::Binary => "binary",
            LoadStrategy::Json => "json",
            LoadStrategy::JsonLatin1 => "json-latin1",
        };
        f.write_str(name)
    }
}

/// Errors raised while reading or writing an artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("file too short for artifact header ({0} bytes)")]
    Truncated(usize),

    #[error("invalid magic bytes {0:?}")]
    BadMagic([u8; 4]),

    #[error("unsupported artifact version {0}")]
    UnsupportedVersion(u32),

    #[error("binary payload: {0}")]
    Binary(#[from] bincode::Error),

    #[error("json payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Decode a binary artifact
pub fn decode_binary(bytes: &[u8]) -> Result<LinearRegression, ArtifactError> {
    if bytes.len() < ARTIFACT_HEADER_SIZE {
        return Err(ArtifactError::Truncated(bytes.len()));
    }

    let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
    if magic != ARTIFACT_MAGIC {
        return Err(ArtifactError::BadMagic(magic));
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != ARTIFACT_VERSION {
        return Err(ArtifactError::UnsupportedVersion(version));
    }

    // bytes[8..12] are reserved flags
    Ok(bincode::deserialize(&bytes[ARTIFACT_HEADER_SIZE..])?)
}

/// Encode a model as a binary artifact
pub fn encode_binary(model: &LinearRegression) -> Result<Vec<u8>, ArtifactError> {
    let payload = bincode::serialize(model)?;

    let mut bytes = Vec::with_capacity(ARTIFACT_HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&ARTIFACT_MAGIC);
    bytes.extend_from_slice(&ARTIFACT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode a JSON artifact as UTF-8
pub fn decode_json(bytes: &[u8]) -> Result<LinearRegression, ArtifactError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decode a JSON artifact whose text is Latin-1 encoded
pub fn decode_json_latin1(bytes: &[u8]) -> Result<LinearRegression, ArtifactError> {
    let text: String = bytes.iter().map(|&b| char::from(b)).collect();
    Ok(serde_json::from_str(&text)?)
}

/// Write a binary artifact to `path`
pub fn save_binary<P: AsRef<Path>>(model: &LinearRegression, path: P) -> Result<(), ArtifactError> {
    fs::write(path, encode_binary(model)?)?;
    Ok(())
}

/// Write a JSON artifact to `path`
pub fn save_json<P: AsRef<Path>>(model: &LinearRegression, path: P) -> Result<(), ArtifactError> {
    fs::write(path, serde_json::to_vec_pretty(model)?)?;
    Ok(())
}
