//! Time-ordered 12-byte record identifier.
//!
//! Layout: 4-byte big-endian seconds since epoch, 5 bytes chosen once per process,
//! 3-byte big-endian counter. Byte order is creation order.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 12]);

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid object id: {0}")]
pub struct ParseObjectIdError(String);

struct ProcessSeed {
    unique: [u8; 5],
    counter: AtomicU32,
}

fn seed() -> &'static ProcessSeed {
    static SEED: OnceLock<ProcessSeed> = OnceLock::new();
    SEED.get_or_init(|| {
        let random = *Uuid::new_v4().as_bytes();
        let mut unique = [0u8; 5];
        unique.copy_from_slice(&random[..5]);
        let start = u32::from_be_bytes([0, random[8], random[9], random[10]]) & 0x007F_FFFF;
        ProcessSeed {
            unique,
            counter: AtomicU32::new(start),
        }
    })
}

impl ObjectId {
    /// Generates a new id stamped with the current time.
    pub fn new() -> Self {
        let seconds = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        let counter = seed().counter.fetch_add(1, Ordering::Relaxed);
        Self::from_parts(seconds, counter)
    }

    /// Builds an id from explicit seconds and counter (only the low 24 counter bits are kept).
    pub fn from_parts(seconds: u32, counter: u32) -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&seed().unique);
        bytes[9..].copy_from_slice(&(counter & COUNTER_MASK).to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Seconds since epoch embedded at creation.
    pub fn seconds(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(i64::from(self.seconds()), 0).unwrap_or_default()
    }

    /// The 24-bit per-process counter.
    pub fn counter(&self) -> u32 {
        u32::from_be_bytes([0, self.0[9], self.0[10], self.0[11]])
    }

    /// Millisecond-like sort key: creation seconds * 1000 plus the counter's last three
    /// decimal digits. Always below 2^42.
    pub fn millis_like(&self) -> u64 {
        u64::from(self.seconds()) * 1000 + u64::from(self.counter() % 1000)
    }

    /// `millis_like` as 6 big-endian bytes; what a short id decodes back to.
    pub fn projection(&self) -> [u8; 6] {
        let mut out = [0u8; 6];
        out.copy_from_slice(&self.millis_like().to_be_bytes()[2..]);
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ParseObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ParseObjectIdError(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_layout() {
        let id = ObjectId::from_parts(1_700_000_000, 0x0102_0304);
        assert_eq!(id.seconds(), 1_700_000_000);
        assert_eq!(id.counter(), 0x02_0304);
        assert_eq!(id.timestamp().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_new_ids_are_increasing() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert!(a < b);
        assert_ne!(a.to_hex(), b.to_hex());
    }

    #[test]
    fn test_hex_round_trip() {
        let id = ObjectId::new();
        let hex = id.to_hex();
        assert_eq!(hex.len(), 24);
        assert_eq!(hex.parse::<ObjectId>().unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("".parse::<ObjectId>().is_err());
        assert!("abc".parse::<ObjectId>().is_err());
        assert!("zzzzzzzzzzzzzzzzzzzzzzzz".parse::<ObjectId>().is_err());
        assert!("0123456789abcdef0123456789".parse::<ObjectId>().is_err());
    }

    #[test]
    fn test_millis_like_folds_counter_digits() {
        // counter 0x00_1F_A4 = 8100 -> last three decimal digits 100
        let id = ObjectId::from_parts(2, 0x1FA4);
        assert_eq!(id.millis_like(), 2100);
        assert_eq!(id.projection(), [0, 0, 0, 0, 0x08, 0x34]);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let id = ObjectId::from_parts(10, 1);
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_hex()));
        let back: ObjectId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }
}
