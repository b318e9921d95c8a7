// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Key-value pairs

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KvError {
    #[error("value is {found}, not {expected}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
        }
    }

    fn wrong(&self, expected: &'static str) -> KvError {
        KvError::WrongType { expected, found: self.kind() }
    }

    pub fn as_str(&self) -> Result<&str, KvError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(other.wrong("text")),
        }
    }

    pub fn as_int(&self) -> Result<i64, KvError> {
        match self {
            Value::Int(n) => Ok(*n),
            other => Err(other.wrong("integer")),
        }
    }

    pub fn as_float(&self) -> Result<f64, KvError> {
        match self {
            Value::Float(f) => Ok(*f),
            other => Err(other.wrong("float")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kv {
    pub key: String,
    pub value: Value,
}

impl Kv {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

impl fmt::Display for Kv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Sort pairs by key (byte order)
pub fn sort(kvs: &mut [Kv]) {
    kvs.sort_unstable_by(|a, b| a.key.as_bytes().cmp(b.key.as_bytes()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort() {
        let mut kvs = vec![
            Kv::new("test1", "abc"),
            Kv::new("Test", 12i64),
            Kv::new("test0", 3.5),
            Kv::new("a", "z"),
            Kv::new("_", 0i64),
        ];

        sort(&mut kvs);

        let keys: Vec<&str> = kvs.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["Test", "_", "a", "test0", "test1"]);
        assert_eq!(kvs[0].value.as_int(), Ok(12));
        assert_eq!(kvs[3].value.as_float(), Ok(3.5));
        assert_eq!(kvs[4].value.as_str(), Ok("abc"));
    }

    #[test]
    fn test_wrong_type() {
        let v = Value::from("text");
        assert_eq!(
            v.as_int(),
            Err(KvError::WrongType { expected: "integer", found: "text" })
        );
        assert_eq!(
            Value::from(1i64).as_float().unwrap_err().to_string(),
            "value is integer, not float"
        );
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(Kv::new("port", 8080i64).to_string(), "port=8080");

        let kvs: Vec<Kv> =
            serde_json::from_str(r#"[{"key":"a","value":1},{"key":"b","value":"x"}]"#).unwrap();
        assert_eq!(kvs[0].value, Value::Int(1));
        assert_eq!(kvs[1].value, Value::Text("x".to_string()));
    }
}
