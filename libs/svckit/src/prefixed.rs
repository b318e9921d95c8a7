// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Prefixed UUID codec
//!
//! Opaque, URL-safe identifiers of the form `<prefix>.<base64>`, where the
//! data part is the 16 UUID bytes in the standard base64 alphabet without
//! padding.

use crate::uuid::Uuid;
use base64::prelude::*;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SEPARATOR: char = '.';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrefixedError {
    #[error("Can't decode data: no prefix separator")]
    NoSeparator,

    #[error("Can't decode data: empty prefix")]
    EmptyPrefix,

    #[error("Can't decode data: empty UUID data")]
    EmptyData,

    #[error("Can't decode UUID data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Can't decode UUID data: got {0} bytes, expected 16")]
    WrongLength(usize),
}

/// Decoded prefixed identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrefixedUuid {
    pub prefix: String,
    pub uuid: Uuid,
}

impl PrefixedUuid {
    pub fn new(prefix: impl Into<String>, uuid: Uuid) -> Self {
        Self { prefix: prefix.into(), uuid }
    }
}

impl fmt::Display for PrefixedUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(&self.prefix, &self.uuid))
    }
}

impl FromStr for PrefixedUuid {
    type Err = PrefixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Encode a UUID with the given prefix
///
/// Returns an empty string if the prefix is empty or the UUID is nil.
pub fn encode(prefix: &str, uuid: &Uuid) -> String {
    if prefix.is_empty() || uuid.is_nil() {
        return String::new();
    }

    format!("{}{}{}", prefix, SEPARATOR, BASE64_STANDARD_NO_PAD.encode(uuid.as_bytes()))
}

/// Decode a prefixed UUID
pub fn decode(data: &str) -> Result<PrefixedUuid, PrefixedError> {
    // The base64 alphabet has no '.', so the last separator always ends the prefix
    let (prefix, payload) = data.rsplit_once(SEPARATOR).ok_or(PrefixedError::NoSeparator)?;

    if prefix.is_empty() {
        return Err(PrefixedError::EmptyPrefix);
    }

    if payload.is_empty() {
        return Err(PrefixedError::EmptyData);
    }

    let raw = BASE64_STANDARD_NO_PAD.decode(payload)?;
    let bytes: [u8; 16] = raw
        .as_slice()
        .try_into()
        .map_err(|_| PrefixedError::WrongLength(raw.len()))?;

    Ok(PrefixedUuid::new(prefix, Uuid::from_bytes(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for prefix in ["test", "user", "a.b"] {
            let uuid = Uuid::new_v4();
            let encoded = encode(prefix, &uuid);
            assert!(encoded.starts_with(prefix));

            let decoded = decode(&encoded).unwrap();
            assert_eq!(decoded.prefix, prefix);
            assert_eq!(decoded.uuid, uuid);
        }
    }

    #[test]
    fn test_known_encoding() {
        let encoded = encode("ns", &crate::uuid::NS_DNS);
        assert_eq!(encoded, "ns.a6e4EJ2tEdGAtADAT9QwyA");
        assert_eq!(encoded, PrefixedUuid::new("ns", crate::uuid::NS_DNS).to_string());
    }

    #[test]
    fn test_encode_sentinels() {
        assert_eq!(encode("", &Uuid::new_v4()), "");
        assert_eq!(encode("test", &Uuid::nil()), "");
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode("test"), Err(PrefixedError::NoSeparator));
        assert_eq!(decode(".AAAA"), Err(PrefixedError::EmptyPrefix));
        assert_eq!(decode("test."), Err(PrefixedError::EmptyData));
        assert_eq!(decode("test.AAAA"), Err(PrefixedError::WrongLength(3)));

        let err = decode("test.####").unwrap_err();
        assert!(matches!(err, PrefixedError::Base64(_)));
        assert!(err.to_string().starts_with("Can't decode UUID data:"));
    }

    #[test]
    fn test_from_str() {
        let id: PrefixedUuid = "ns.a6e4EJ2tEdGAtADAT9QwyA".parse().unwrap();
        assert_eq!(id.prefix, "ns");
        assert_eq!(id.uuid, crate::uuid::NS_DNS);
    }
}
