//! Short identifiers: 7-symbol, URL-safe, time-sortable handles derived from an [`ObjectId`].
//!
//! The id's `millis_like` value is written as 6 big-endian bytes and base64-encoded with
//! the URL-safe symbol set arranged in ASCII order, so comparing two short ids as
//! strings compares their creation times. `millis_like` stays below 2^42, which makes
//! the leading symbol always [`ZERO_SYMBOL`]; it is dropped on encode and restored on
//! decode.
//!
//! Decoding only recovers the 6-byte projection, never the full 12-byte id. Stores
//! look records up by the stored `short_id` field instead.

use std::fmt;

use base64::alphabet::Alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::object_id::ObjectId;

/// Number of symbols in an encoded short id.
pub const SHORT_ID_LEN: usize = 7;

const ZERO_SYMBOL: char = '-';

const SORTED_URL_SAFE: Alphabet =
    match Alphabet::new("-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz") {
        Ok(alphabet) => alphabet,
        Err(_) => panic!("short id alphabet is invalid"),
    };

const ENGINE: GeneralPurpose = GeneralPurpose::new(&SORTED_URL_SAFE, NO_PAD);

#[derive(Error, Debug)]
pub enum ShortIdError {
    #[error("Short id must be 7 bytes, got {0}")]
    InvalidLength(usize),
    #[error("Short id is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
}

/// Encoded short id, as stored in `MessageRecord::short_id` and typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(String);

impl ShortId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encodes `id` into its short form.
pub fn encode(id: &ObjectId) -> ShortId {
    let full = ENGINE.encode(id.projection());
    debug_assert!(full.starts_with(ZERO_SYMBOL));
    ShortId(full[1..].to_string())
}

/// Decodes a short id back to the 6-byte projection it was built from.
pub fn decode(s: &str) -> Result<[u8; 6], ShortIdError> {
    if s.len() != SHORT_ID_LEN {
        return Err(ShortIdError::InvalidLength(s.len()));
    }
    let mut full = String::with_capacity(SHORT_ID_LEN + 1);
    full.push(ZERO_SYMBOL);
    full.push_str(s);

    let bytes = ENGINE.decode(full)?;
    let mut out = [0u8; 6];
    out.copy_from_slice(&bytes);
    Ok(out)
}
