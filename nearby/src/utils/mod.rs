use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use base64::Engine;
use sha2::{Digest, Sha256};

pub mod hex;
pub use hex::*;

pub mod mac;
pub use mac::*;

/// Number of bytes of the SHA-256 digest kept by [key_fingerprint]
const FINGERPRINT_LEN: usize = 4;

pub fn base64_bytes(data: &[u8]) -> String {
    let eng = base64::engine::general_purpose::STANDARD;
    eng.encode(data)
}

pub fn unbase64(s: &str) -> crate::Result<Vec<u8>> {
    let eng = base64::engine::general_purpose::STANDARD;
    eng.decode(s.trim())
        .map_err(|e| crate::Error::InvalidBase64(e.to_string()))
}

/// Short, log-safe identifier for key material.
///
/// Account keys and shared secrets must never show up in logs, but being able
/// to tell two of them apart is useful when debugging a pairing flow.
pub fn key_fingerprint(key: &[u8]) -> String {
    let digest = Sha256::digest(key);
    bytes_to_hex(&digest[..FINGERPRINT_LEN])
}

/// Same as [key_fingerprint] but renders `None` as `<none>`
pub fn maybe_key_fingerprint(key: Option<&[u8]>) -> String {
    match key {
        Some(k) => key_fingerprint(k),
        None => String::from("<none>"),
    }
}

pub fn read_file(path: &Path) -> crate::Result<String> {
    match fs::read_to_string(path) {
        Ok(v) => Ok(v),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Err(crate::Error::MissingFile(
                path.to_string_lossy().into(),
            )),
            _ => Err(e.into()),
        },
    }
}
