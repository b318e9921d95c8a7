// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! RFC 4122 UUID generation
//!
//! Version 4 values are drawn from the operating system CSPRNG, version 5
//! values are derived from a namespace and a name with SHA-1.

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Byte widths of the five dash-separated groups of the canonical form
const GROUPS: [usize; 5] = [4, 2, 2, 2, 6];

/// Length of the canonical text form
pub const CANONICAL_LEN: usize = 36;

/// DNS namespace (6ba7b810-9dad-11d1-80b4-00c04fd430c8)
pub const NS_DNS: Uuid = Uuid([
    0x6b, 0xa7, 0xb8, 0x10, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30, 0xc8,
]);

/// URL namespace (6ba7b811-9dad-11d1-80b4-00c04fd430c8)
pub const NS_URL: Uuid = Uuid([
    0x6b, 0xa7, 0xb8, 0x11, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30, 0xc8,
]);

/// ISO OID namespace (6ba7b812-9dad-11d1-80b4-00c04fd430c8)
pub const NS_OID: Uuid = Uuid([
    0x6b, 0xa7, 0xb8, 0x12, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30, 0xc8,
]);

/// X.500 DN namespace (6ba7b814-9dad-11d1-80b4-00c04fd430c8)
pub const NS_X500: Uuid = Uuid([
    0x6b, 0xa7, 0xb8, 0x14, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30, 0xc8,
]);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UuidParseError {
    #[error("invalid UUID length {0}, expected 36")]
    Length(usize),

    #[error("missing dash at position {0}")]
    Dash(usize),

    #[error("invalid hex digits in UUID: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// 16-byte UUID value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uuid([u8; 16]);

impl Uuid {
    pub const fn nil() -> Self {
        Uuid([0; 16])
    }

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Uuid(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0 == [0; 16]
    }

    /// Version nibble (high half of byte 6)
    pub fn version(&self) -> u8 {
        self.0[6] >> 4
    }

    /// Generate a random (version 4) UUID
    ///
    /// Panics if the operating system random source is unavailable.
    pub fn new_v4() -> Self {
        let mut bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self::stamp(bytes, 0x40)
    }

    /// Generate a name-based (version 5, SHA-1) UUID
    pub fn new_v5(ns: &Uuid, name: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(ns.0);
        hasher.update(name);
        let digest = hasher.finalize();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self::stamp(bytes, 0x50)
    }

    fn stamp(mut bytes: [u8; 16], version: u8) -> Self {
        bytes[6] = (bytes[6] & 0x0f) | version;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;
        Uuid(bytes)
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(bytes: [u8; 16]) -> Self {
        Uuid(bytes)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut offset = 0;
        for (i, width) in GROUPS.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            f.write_str(&hex::encode(&self.0[offset..offset + width]))?;
            offset += width;
        }
        Ok(())
    }
}

impl FromStr for Uuid {
    type Err = UuidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != CANONICAL_LEN {
            return Err(UuidParseError::Length(s.len()));
        }

        let raw = s.as_bytes();
        for pos in [8, 13, 18, 23] {
            if raw[pos] != b'-' {
                return Err(UuidParseError::Dash(pos));
            }
        }

        let digits: String = s.chars().filter(|c| *c != '-').collect();
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(digits, &mut bytes)?;

        Ok(Uuid(bytes))
    }
}

impl Serialize for Uuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Uuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Generate a version 4 UUID in canonical form
pub fn gen_uuid4() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a version 5 UUID in canonical form
pub fn gen_uuid5(ns: &Uuid, name: &str) -> String {
    Uuid::new_v5(ns, name.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn check_layout(u: &str, version: char) {
        assert_eq!(u.len(), CANONICAL_LEN);
        let chars: Vec<char> = u.chars().collect();
        for pos in [8, 13, 18, 23] {
            assert_eq!(chars[pos], '-', "dash expected at {} in {}", pos, u);
        }
        assert_eq!(chars[14], version);
        assert!(matches!(chars[19], '8' | '9' | 'a' | 'b'), "bad variant in {}", u);
        assert!(u.chars().all(|c| c == '-' || c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_v4_layout() {
        for _ in 0..100 {
            check_layout(&gen_uuid4(), '4');
        }
    }

    #[test]
    fn test_v4_unique() {
        let set: HashSet<String> = (0..1000).map(|_| gen_uuid4()).collect();
        assert_eq!(set.len(), 1000);
    }

    #[test]
    fn test_v5_layout_and_determinism() {
        let a = gen_uuid5(&NS_URL, "https://example.com");
        check_layout(&a, '5');
        assert_eq!(a, gen_uuid5(&NS_URL, "https://example.com"));
        assert_ne!(a, gen_uuid5(&NS_DNS, "https://example.com"));
    }

    #[test]
    fn test_v5_known_value() {
        // Python: uuid.uuid5(uuid.NAMESPACE_DNS, "python.org")
        assert_eq!(
            gen_uuid5(&NS_DNS, "python.org"),
            "886313e1-3b8a-5372-9b90-0c9aee199e5d"
        );
    }

    #[test]
    fn test_namespace_text() {
        assert_eq!(NS_DNS.to_string(), "6ba7b810-9dad-11d1-80b4-00c04fd430c8");
        assert_eq!(NS_URL.to_string(), "6ba7b811-9dad-11d1-80b4-00c04fd430c8");
        assert_eq!(NS_OID.to_string(), "6ba7b812-9dad-11d1-80b4-00c04fd430c8");
        assert_eq!(NS_X500.to_string(), "6ba7b814-9dad-11d1-80b4-00c04fd430c8");
    }

    #[test]
    fn test_parse() {
        let u: Uuid = "6BA7B810-9DAD-11D1-80B4-00C04FD430C8".parse().unwrap();
        assert_eq!(u, NS_DNS);
        assert_eq!(u.version(), 1);

        assert_eq!("abc".parse::<Uuid>(), Err(UuidParseError::Length(3)));
        assert_eq!(
            "6ba7b810x9dad-11d1-80b4-00c04fd430c8".parse::<Uuid>(),
            Err(UuidParseError::Dash(8))
        );
        assert_eq!(
            "6ba7b810-9dad-11d1-80b4-00c04fd430zz".parse::<Uuid>(),
            Err(UuidParseError::Hex(hex::FromHexError::InvalidHexCharacter { c: 'z', index: 30 }))
        );
    }

    #[test]
    fn test_nil() {
        assert!(Uuid::nil().is_nil());
        assert!(!Uuid::new_v4().is_nil());
        assert_eq!(Uuid::nil().to_string(), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&NS_OID).unwrap();
        assert_eq!(json, "\"6ba7b812-9dad-11d1-80b4-00c04fd430c8\"");
        let back: Uuid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NS_OID);
    }
}
