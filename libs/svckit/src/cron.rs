// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Cron expressions and the config property validator

use chrono::{Datelike, NaiveDateTime, Timelike};
use std::collections::HashMap;
use thiserror::Error;

const MONTH_NAMES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

const DAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

struct Field {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
    // Value of the first name
    names_base: u32,
}

const MINUTE: Field = Field { name: "minute", min: 0, max: 59, names: &[], names_base: 0 };
const HOUR: Field = Field { name: "hour", min: 0, max: 23, names: &[], names_base: 0 };
const DOM: Field = Field { name: "day of month", min: 1, max: 31, names: &[], names_base: 0 };
const MONTH: Field = Field { name: "month", min: 1, max: 12, names: &MONTH_NAMES, names_base: 1 };
// 7 is accepted as Sunday
const DOW: Field = Field { name: "day of week", min: 0, max: 7, names: &DAY_NAMES, names_base: 0 };

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CronError {
    #[error("expected 5 fields, got {0}")]
    FieldCount(usize),

    #[error("unknown descriptor {0:?}")]
    UnknownDescriptor(String),

    #[error("invalid {field} value {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error("{field} value {value} is out of range {min}-{max}")]
    OutOfRange { field: &'static str, value: u32, min: u32, max: u32 },

    #[error("invalid {field} range {from}-{to}")]
    InvalidRange { field: &'static str, from: u32, to: u32 },

    #[error("invalid {field} step {step:?}")]
    InvalidStep { field: &'static str, step: String },
}

/// Parsed five-field cron expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    minutes: u64,
    hours: u64,
    doms: u64,
    months: u64,
    dows: u64,
    dom_any: bool,
    dow_any: bool,
}

impl Expr {
    /// Check whether the expression fires at the given minute
    pub fn matches(&self, t: &NaiveDateTime) -> bool {
        if !bit(self.minutes, t.minute())
            || !bit(self.hours, t.hour())
            || !bit(self.months, t.month())
        {
            return false;
        }

        let dom = bit(self.doms, t.day());
        let dow = bit(self.dows, t.weekday().num_days_from_sunday());

        // Restricting both day fields matches either one
        if self.dom_any || self.dow_any {
            dom && dow
        } else {
            dom || dow
        }
    }
}

impl std::str::FromStr for Expr {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

fn bit(set: u64, n: u32) -> bool {
    set & (1 << n) != 0
}

/// Parse a cron expression or descriptor (`@daily` and friends)
pub fn parse(expr: &str) -> Result<Expr, CronError> {
    let expr = expr.trim();

    let expanded = match expr {
        "@yearly" | "@annually" => "0 0 1 1 *",
        "@monthly" => "0 0 1 * *",
        "@weekly" => "0 0 * * 0",
        "@daily" | "@midnight" => "0 0 * * *",
        "@hourly" => "0 * * * *",
        other if other.starts_with('@') => {
            return Err(CronError::UnknownDescriptor(other.to_string()));
        }
        other => other,
    };

    let fields: Vec<&str> = expanded.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(CronError::FieldCount(fields.len()));
    }

    let mut dows = parse_field(fields[4], &DOW)?;
    if bit(dows, 7) {
        dows = (dows & !(1 << 7)) | 1;
    }

    Ok(Expr {
        minutes: parse_field(fields[0], &MINUTE)?,
        hours: parse_field(fields[1], &HOUR)?,
        doms: parse_field(fields[2], &DOM)?,
        months: parse_field(fields[3], &MONTH)?,
        dows,
        dom_any: fields[2].starts_with('*'),
        dow_any: fields[4].starts_with('*'),
    })
}

fn parse_field(text: &str, field: &Field) -> Result<u64, CronError> {
    let mut set = 0u64;

    for part in text.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step = step.parse::<u32>().ok().filter(|s| *s > 0).ok_or_else(|| {
                    CronError::InvalidStep { field: field.name, step: step.to_string() }
                })?;
                (range, Some(step))
            }
            None => (part, None),
        };

        let (from, to) = if range == "*" {
            (field.min, field.max)
        } else if let Some((a, b)) = range.split_once('-') {
            (parse_value(a, field)?, parse_value(b, field)?)
        } else {
            let v = parse_value(range, field)?;
            // "5/15" runs from 5 to the end of the range
            (v, if step.is_some() { field.max } else { v })
        };

        if from > to {
            return Err(CronError::InvalidRange { field: field.name, from, to });
        }

        for v in (from..=to).step_by(step.unwrap_or(1) as usize) {
            set |= 1 << v;
        }
    }

    Ok(set)
}

fn parse_value(text: &str, field: &Field) -> Result<u32, CronError> {
    let invalid = || CronError::InvalidValue { field: field.name, value: text.to_string() };

    let value = match field.names.iter().position(|n| n.eq_ignore_ascii_case(text)) {
        Some(idx) => idx as u32 + field.names_base,
        None => text.parse::<u32>().map_err(|_| invalid())?,
    };

    if value < field.min || value > field.max {
        return Err(CronError::OutOfRange {
            field: field.name,
            value,
            min: field.min,
            max: field.max,
        });
    }

    Ok(value)
}

/// Source of string properties for validation
pub trait PropertySource {
    /// String value of a property, or an empty string if it is missing
    fn get_string(&self, name: &str) -> String;
}

/// Dotted paths walk nested objects: `backup.schedule`
impl PropertySource for serde_json::Value {
    fn get_string(&self, name: &str) -> String {
        let mut node = self;
        for key in name.split('.') {
            match node.get(key) {
                Some(next) => node = next,
                None => return String::new(),
            }
        }

        node.as_str().map(str::to_string).unwrap_or_default()
    }
}

impl PropertySource for HashMap<String, String> {
    fn get_string(&self, name: &str) -> String {
        self.get(name).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("property {property} contains invalid cron expression: {source}")]
    InvalidCron {
        property: String,
        #[source]
        source: CronError,
    },
}

/// Validate that a config property holds a cron expression
///
/// Empty properties are valid.
pub fn validate<C: PropertySource + ?Sized>(
    config: &C,
    property: &str,
    _value: &str,
) -> Result<(), ValidationError> {
    let expr = config.get_string(property);
    if expr.is_empty() {
        return Ok(());
    }

    parse(&expr)
        .map(|_| ())
        .map_err(|source| ValidationError::InvalidCron { property: property.to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_valid() {
        for expr in [
            "* * * * *",
            "*/5 * * * *",
            "0 0 1 1 *",
            "15,45 9-17 * * MON-FRI",
            "0 12 * jan,jul sun",
            "5/15 0 1-31/2 * 7",
            "@daily",
            "@annually",
        ] {
            assert!(parse(expr).is_ok(), "{}", expr);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("* * * *"), Err(CronError::FieldCount(4)));
        assert_eq!(parse(""), Err(CronError::FieldCount(0)));
        assert_eq!(parse("@sometimes"), Err(CronError::UnknownDescriptor("@sometimes".into())));
        assert_eq!(
            parse("60 * * * *"),
            Err(CronError::OutOfRange { field: "minute", value: 60, min: 0, max: 59 })
        );
        assert_eq!(
            parse("* * 0 * *"),
            Err(CronError::OutOfRange { field: "day of month", value: 0, min: 1, max: 31 })
        );
        assert_eq!(
            parse("* * * FOO *"),
            Err(CronError::InvalidValue { field: "month", value: "FOO".into() })
        );
        assert_eq!(
            parse("*/0 * * * *"),
            Err(CronError::InvalidStep { field: "minute", step: "0".into() })
        );
        assert_eq!(
            parse("* 10-2 * * *"),
            Err(CronError::InvalidRange { field: "hour", from: 10, to: 2 })
        );
    }

    #[test]
    fn test_matches() {
        let expr = parse("*/15 9-17 * * MON-FRI").unwrap();
        // 2024-06-03 is a Monday
        assert!(expr.matches(&at(2024, 6, 3, 9, 30)));
        assert!(!expr.matches(&at(2024, 6, 3, 9, 31)));
        assert!(!expr.matches(&at(2024, 6, 3, 18, 0)));
        assert!(!expr.matches(&at(2024, 6, 2, 10, 0)));

        let sunday = parse("0 0 * * 7").unwrap();
        assert!(sunday.matches(&at(2024, 6, 2, 0, 0)));
        assert!(!sunday.matches(&at(2024, 6, 3, 0, 0)));
    }

    #[test]
    fn test_matches_day_fields() {
        // Both restricted: first of the month OR any Friday
        let expr = parse("0 0 1 * FRI").unwrap();
        assert!(expr.matches(&at(2024, 6, 1, 0, 0)));
        assert!(expr.matches(&at(2024, 6, 7, 0, 0)));
        assert!(!expr.matches(&at(2024, 6, 8, 0, 0)));

        // Weekday wildcard: only the first of the month
        let expr = parse("0 0 1 * *").unwrap();
        assert!(expr.matches(&at(2024, 6, 1, 0, 0)));
        assert!(!expr.matches(&at(2024, 6, 7, 0, 0)));
    }

    #[test]
    fn test_descriptors() {
        assert_eq!(parse("@hourly").unwrap(), parse("0 * * * *").unwrap());
        assert_eq!(parse("@midnight").unwrap(), parse("@daily").unwrap());
        assert!(parse("@weekly").unwrap().matches(&at(2024, 6, 2, 0, 0)));
    }

    #[test]
    fn test_validate() {
        let config = json!({
            "backup": { "schedule": "0 3 * * *" },
            "cleanup": { "schedule": "0 25 * * *" },
            "report": { "schedule": "" },
        });

        assert_eq!(validate(&config, "backup.schedule", ""), Ok(()));
        assert_eq!(validate(&config, "report.schedule", ""), Ok(()));
        assert_eq!(validate(&config, "missing.schedule", ""), Ok(()));

        let err = validate(&config, "cleanup.schedule", "").unwrap_err();
        assert!(err
            .to_string()
            .starts_with("property cleanup.schedule contains invalid cron expression"));
    }

    #[test]
    fn test_validate_map() {
        let mut props = HashMap::new();
        props.insert("schedule".to_string(), "bad".to_string());
        assert!(matches!(
            validate(&props, "schedule", ""),
            Err(ValidationError::InvalidCron { source: CronError::FieldCount(1), .. })
        ));
    }
}
