// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! LS_COLORS parser and file name colorizer

use glob::Pattern;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;

const RESET: &str = "\x1b[0m";

static DEFAULT: Lazy<LsColors> = Lazy::new(LsColors::from_env);

/// Parsed LS_COLORS rules
#[derive(Debug, Clone, Default)]
pub struct LsColors {
    disabled: bool,
    exact: HashMap<String, String>,
    // Glob rules in the order they appear in LS_COLORS
    globs: Vec<(Pattern, String)>,
}

impl LsColors {
    /// Parse rules from a dircolors string (`key=value` entries separated by `:`)
    ///
    /// Only entries whose value holds an SGR list (contains `;`) are kept,
    /// so single-code keyword entries such as `rs=0` never color a name.
    pub fn parse(rules: &str) -> Self {
        let mut colors = LsColors::default();

        for entry in rules.split(':') {
            let Some((key, value)) = entry.split_once('=') else {
                continue;
            };

            if !value.contains(';') {
                log::trace!("skipping LS_COLORS entry {:?}", entry);
                continue;
            }

            colors.exact.insert(key.to_string(), value.to_string());

            if !key.starts_with('*') {
                continue;
            }

            match colors.globs.iter_mut().find(|(p, _)| p.as_str() == key) {
                Some(rule) => rule.1 = value.to_string(),
                None => match Pattern::new(key) {
                    Ok(pattern) => colors.globs.push((pattern, value.to_string())),
                    Err(e) => log::trace!("skipping LS_COLORS glob {:?}: {}", key, e),
                },
            }
        }

        colors
    }

    /// Build rules from `NO_COLOR` and `LS_COLORS`
    pub fn from_env() -> Self {
        let no_color = std::env::var_os("NO_COLOR");
        let rules = std::env::var("LS_COLORS").unwrap_or_default();
        Self::from_vars(no_color.as_deref(), &rules)
    }

    /// Build rules from the values of `NO_COLOR` and `LS_COLORS`
    ///
    /// A non-empty `NO_COLOR` disables colors whatever `LS_COLORS` holds.
    pub fn from_vars(no_color: Option<&OsStr>, ls_colors: &str) -> Self {
        if no_color.is_some_and(|v| !v.is_empty()) {
            log::debug!("NO_COLOR is set, file name colors disabled");
            return Self::disabled();
        }

        let colors = Self::parse(ls_colors);
        log::debug!(
            "loaded {} LS_COLORS rules ({} globs)",
            colors.exact.len(),
            colors.globs.len()
        );

        colors
    }

    /// Rules that never color anything
    pub fn disabled() -> Self {
        LsColors { disabled: true, ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// ANSI SGR sequence for a file name, or an empty string
    pub fn get_color(&self, name: &str) -> String {
        if self.disabled || self.is_empty() {
            return String::new();
        }

        if let Some(value) = self.exact.get(name) {
            return sgr(value);
        }

        self.globs
            .iter()
            .find(|(pattern, _)| pattern.matches(name))
            .map(|(_, value)| sgr(value))
            .unwrap_or_default()
    }

    /// Wrap a name in its color, or return it unchanged
    pub fn colorize(&self, name: &str) -> String {
        wrap(self.get_color(name), name)
    }

    /// Color a full path by its base name
    pub fn colorize_path(&self, path: &str) -> String {
        let base = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        wrap(self.get_color(&base), path)
    }
}

fn sgr(value: &str) -> String {
    format!("\x1b[{}m", value)
}

fn wrap(color: String, text: &str) -> String {
    if color.is_empty() {
        return text.to_string();
    }

    format!("{}{}{}", color, text, RESET)
}

/// Rules loaded from the environment on first use
pub fn default_colors() -> &'static LsColors {
    &DEFAULT
}

pub fn get_color(name: &str) -> String {
    DEFAULT.get_color(name)
}

pub fn colorize(name: &str) -> String {
    DEFAULT.colorize(name)
}

pub fn colorize_path(path: &str) -> String {
    DEFAULT.colorize_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "rs=0:di=01;38;5;75:ln=01;38;5;51:ex=01;38;5;41:*.tar=01;38;5;203:\
                          *.gz=01;38;5;203:*.txt=38;5;178:*.bz=38;5;105";

    #[test]
    fn test_get_color() {
        let colors = LsColors::parse(SAMPLE);

        assert_eq!(colors.get_color("test.log"), "");
        assert_eq!(colors.get_color("test.txt"), "\x1b[38;5;178m");
        assert_eq!(colors.get_color("test.tar.bz"), "\x1b[38;5;105m");
        assert_eq!(colors.get_color("di"), "\x1b[01;38;5;75m");
        assert_eq!(colors.get_color("rs"), "");
    }

    #[test]
    fn test_single_code_entries_skipped() {
        let colors = LsColors::parse("rs=0:di=01;38;5;75:*.gz=31:*.txt=38;5;178");
        assert_eq!(colors.get_color("rs"), "");
        assert_eq!(colors.get_color("a.gz"), "");
        assert_eq!(colors.get_color("di"), "\x1b[01;38;5;75m");
        assert_eq!(colors.get_color("a.txt"), "\x1b[38;5;178m");

        assert!(LsColors::parse("rs=0:*.gz=31").is_empty());
    }

    #[test]
    fn test_glob_order() {
        let colors = LsColors::parse("*.gz=01;31:*z=01;32:*.gz=01;33");
        // Re-definition keeps the first position and takes the last value
        assert_eq!(colors.get_color("a.tar.gz"), "\x1b[01;33m");
        assert_eq!(colors.get_color("a.xz"), "\x1b[01;32m");

        let colors = LsColors::parse("*z=01;32:*.gz=01;31");
        assert_eq!(colors.get_color("a.gz"), "\x1b[01;32m");
    }

    #[test]
    fn test_glob_classes() {
        let colors = LsColors::parse("*.[ch]=00;35:*.?s=00;36");
        assert_eq!(colors.get_color("main.c"), "\x1b[00;35m");
        assert_eq!(colors.get_color("main.h"), "\x1b[00;35m");
        assert_eq!(colors.get_color("main.o"), "");
        assert_eq!(colors.get_color("app.js"), "\x1b[00;36m");
    }

    #[test]
    fn test_colorize() {
        let colors = LsColors::parse(SAMPLE);

        assert_eq!(colors.colorize("test.log"), "test.log");
        assert_eq!(colors.colorize("test.txt"), "\x1b[38;5;178mtest.txt\x1b[0m");
        assert_eq!(
            colors.colorize_path("/home/user/test.txt"),
            "\x1b[38;5;178m/home/user/test.txt\x1b[0m"
        );
        assert_eq!(colors.colorize_path("/home/user/test.log"), "/home/user/test.log");
    }

    #[test]
    fn test_empty_and_disabled() {
        let empty = LsColors::parse("");
        assert!(empty.is_empty());
        assert_eq!(empty.get_color("test.txt"), "");

        let junk = LsColors::parse("no-equals:also:none");
        assert!(junk.is_empty());

        let disabled = LsColors::disabled();
        assert_eq!(disabled.colorize("test.txt"), "test.txt");
    }

    #[test]
    fn test_from_vars() {
        let colors = LsColors::from_vars(None, SAMPLE);
        assert_eq!(colors.get_color("test.txt"), "\x1b[38;5;178m");

        let colors = LsColors::from_vars(Some(OsStr::new("")), SAMPLE);
        assert_eq!(colors.get_color("test.txt"), "\x1b[38;5;178m");

        let colors = LsColors::from_vars(Some(OsStr::new("1")), SAMPLE);
        assert_eq!(colors.get_color("test.txt"), "");
        assert_eq!(colors.colorize("test.txt"), "test.txt");

        let colors = LsColors::from_vars(None, "");
        assert!(colors.is_empty());
        assert_eq!(colors.get_color("test.txt"), "");
    }
}
