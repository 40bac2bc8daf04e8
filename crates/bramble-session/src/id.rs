//! Session id generation.

use base64::{Engine, engine::general_purpose::URL_SAFE};
use rand::{TryRngCore, rngs::OsRng};

use crate::error::{Error, Result};

/// Bytes of OS randomness behind every session id.
pub const SESSION_ID_BYTES: usize = 32;

/// Generate a fresh session id: 32 random bytes, base64 URL-safe encoded.
///
/// Fails instead of returning a weak or empty id when the OS random source
/// is unavailable.
pub fn generate_session_id() -> Result<String> {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Entropy(e.to_string()))?;
    Ok(URL_SAFE.encode(bytes))
}
