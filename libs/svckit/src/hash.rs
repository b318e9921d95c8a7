// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Hashing utilities

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Multiplier of the jump consistent hash linear congruential step
const JUMP_MULTIPLIER: u64 = 2862933555777941757;

/// SHA-256 of an in-memory buffer as lowercase hex
pub fn checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// SHA-256 of everything a reader yields
pub fn reader_hash<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-256 of a file's contents as lowercase hex
///
/// Returns an empty string if the file can't be opened. A read error in the
/// middle of the file is not reported; the digest covers what was read.
pub fn file_hash(path: impl AsRef<Path>) -> String {
    let mut file = match File::open(path.as_ref()) {
        Ok(file) => file,
        Err(_) => return String::new(),
    };

    let mut hasher = Sha256::new();
    let _ = io::copy(&mut file, &mut hasher);

    hex::encode(hasher.finalize())
}

/// Jump consistent hash (Lamping and Veach)
///
/// Maps `key` to a bucket in `[0, buckets)`. Returns 0 if `buckets <= 0`.
pub fn jump_hash(mut key: u64, buckets: i32) -> i32 {
    if buckets <= 0 {
        return 0;
    }

    let mut b: i64 = -1;
    let mut j: i64 = 0;

    while j < i64::from(buckets) {
        b = j;
        key = key.wrapping_mul(JUMP_MULTIPLIER).wrapping_add(1);
        j = ((b + 1) as f64 * ((1u64 << 31) as f64 / ((key >> 33) + 1) as f64)) as i64;
    }

    b as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_hash() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ABCDEF12345\n\n").unwrap();
        file.flush().unwrap();

        assert_eq!(
            file_hash(file.path()),
            "2d7ec20906125cd23fee7b628b98463d554b1105b141b2d39a19bac5f3274dec"
        );
    }

    #[test]
    fn test_file_hash_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(file_hash(dir.path().join("missing")), "");
    }

    #[test]
    fn test_empty_file_hash() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let hash = file_hash(file.path());
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, checksum(b""));
    }

    #[test]
    fn test_reader_hash() {
        let hash = reader_hash(&b"ABCDEF12345\n\n"[..]).unwrap();
        assert_eq!(hash, checksum(b"ABCDEF12345\n\n"));
    }

    #[test]
    fn test_jump_hash_known() {
        assert_eq!(jump_hash(0xDEAD10CC, 1000), 361);
        assert_eq!(jump_hash(128, 1024), 267);
    }

    #[test]
    fn test_jump_hash_degenerate() {
        for key in [0, 1, 42, u64::MAX] {
            assert_eq!(jump_hash(key, 1), 0);
            assert_eq!(jump_hash(key, 0), 0);
            assert_eq!(jump_hash(key, -5), 0);
        }
    }

    #[test]
    fn test_jump_hash_stability() {
        for key in [1u64, 0xDEAD10CC, 987654321, u64::MAX / 3] {
            let mut prev = jump_hash(key, 1);
            for n in 2..=500 {
                let cur = jump_hash(key, n);
                assert!(cur < n);
                // Growing by one bucket either keeps the key or moves it to the new bucket
                assert!(
                    cur == prev || cur == n - 1,
                    "key {} moved {} -> {} at {}",
                    key,
                    prev,
                    cur,
                    n
                );
                prev = cur;
            }
        }
    }

    #[test]
    fn test_jump_hash_distribution() {
        let buckets = 10;
        let mut counts = [0usize; 10];
        for key in 0..10_000u64 {
            counts[jump_hash(key, buckets) as usize] += 1;
        }
        for count in counts {
            assert!((800..1200).contains(&count), "uneven distribution: {:?}", counts);
        }
    }
}
