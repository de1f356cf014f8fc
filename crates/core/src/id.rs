// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job id minting and the inline id buffer.

use crate::clock::Clock;

/// Byte length of a job id: 14-digit UTC timestamp, a dash, 8 hex chars.
pub const ID_LEN: usize = 23;

const HEX_ALPHABET: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];

/// Fixed-size inline ID buffer. Always ≤ 23 ASCII bytes, `Copy`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IdBuf {
    len: u8,
    buf: [u8; ID_LEN],
}

impl std::hash::Hash for IdBuf {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Hash only the active bytes so it matches str::hash,
        // which is required for Borrow<str> HashMap lookups.
        self.as_str().hash(state);
    }
}

impl IdBuf {
    pub fn new(s: &str) -> Self {
        debug_assert!(
            s.len() <= ID_LEN,
            "ID exceeds {} bytes ({} bytes): {:?}",
            ID_LEN,
            s.len(),
            s,
        );
        let len = s.len().min(ID_LEN);
        let mut buf = [0u8; ID_LEN];
        buf[..len].copy_from_slice(&s.as_bytes()[..len]);
        Self { len: len as u8, buf }
    }

    pub fn as_str(&self) -> &str {
        // Invariant: only constructed from &str, always valid UTF-8.
        match std::str::from_utf8(&self.buf[..self.len as usize]) {
            Ok(s) => s,
            Err(_) => unreachable!("IdBuf constructed from non-UTF-8"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for IdBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl std::fmt::Display for IdBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier for one run of a pipeline: `YYYYMMDDhhmmss-<8 hex>`.
///
/// The timestamp prefix makes ids sort in creation order; the random
/// suffix keeps two jobs minted in the same second distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(IdBuf);

impl JobId {
    /// Mint a fresh id from the clock's current UTC time.
    pub fn mint(clock: &impl Clock) -> Self {
        let stamp = clock.now_utc().format("%Y%m%d%H%M%S");
        let suffix = nanoid::nanoid!(8, &HEX_ALPHABET);
        Self(IdBuf::new(&format!("{stamp}-{suffix}")))
    }

    /// Wrap an existing id string (registry rows, request paths).
    pub fn from_string(id: impl AsRef<str>) -> Self {
        Self(IdBuf::new(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The 14-digit `YYYYMMDDhhmmss` prefix.
    pub fn timestamp_prefix(&self) -> &str {
        let s = self.0.as_str();
        let end = s.len().min(14);
        &s[..end]
    }

    /// Whether `s` has the minted shape: 14 digits, a dash, 8 lowercase hex.
    pub fn is_well_formed(s: &str) -> bool {
        let bytes = s.as_bytes();
        bytes.len() == ID_LEN
            && bytes[..14].iter().all(u8::is_ascii_digit)
            && bytes[14] == b'-'
            && bytes[15..]
                .iter()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(b))
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq<str> for JobId {
    fn eq(&self, other: &str) -> bool {
        self.0.as_str() == other
    }
}

impl PartialEq<&str> for JobId {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_str() == *other
    }
}

impl std::borrow::Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl std::ops::Deref for JobId {
    type Target = str;

    fn deref(&self) -> &str {
        self.0.as_str()
    }
}

impl serde::Serialize for JobId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.len() > ID_LEN {
            return Err(serde::de::Error::custom(format!(
                "job id exceeds {} bytes: {:?}",
                ID_LEN, s
            )));
        }
        Ok(JobId::from_string(s))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
