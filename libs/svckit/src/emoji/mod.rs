// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Emoji aliases
//!
//! Lookup between gemoji-style aliases (`zap`, `+1`, `t-rex`) and glyphs,
//! and `:alias:` interpolation in text.

mod data;

use data::EMOJI;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static BY_ALIAS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| EMOJI.iter().copied().collect());

// Several aliases share a glyph; the first one in the table names it
static BY_GLYPH: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::with_capacity(EMOJI.len());
    for (alias, glyph) in EMOJI {
        map.entry(*glyph).or_insert(*alias);
    }
    map
});

static ALIAS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":[a-zA-Z0-9_+\-]+:").expect("alias pattern is valid"));

/// Glyph for an alias, or an empty string
pub fn get(alias: &str) -> &'static str {
    BY_ALIAS.get(alias).copied().unwrap_or_default()
}

/// Alias for a glyph, or an empty string
pub fn get_name(glyph: &str) -> &'static str {
    BY_GLYPH.get(glyph).copied().unwrap_or_default()
}

/// Aliases containing `substr`, in table order
pub fn find(substr: &str) -> Vec<&'static str> {
    aliases().filter(|alias| alias.contains(substr)).collect()
}

/// All aliases in table order
pub fn aliases() -> impl Iterator<Item = &'static str> {
    EMOJI.iter().map(|(alias, _)| *alias)
}

/// Replace every `:alias:` of a known alias with its glyph
///
/// Matches do not overlap, so an unknown `:alias:` is left as is together
/// with both of its colons.
pub fn emojize(text: &str) -> String {
    ALIAS_RE
        .replace_all(text, |caps: &Captures| {
            let m = &caps[0];
            match BY_ALIAS.get(&m[1..m.len() - 1]) {
                Some(glyph) => glyph.to_string(),
                None => m.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get() {
        assert_eq!(get("zap"), "\u{26a1}\u{fe0f}");
        assert_eq!(get("smile"), "😄");
        assert_eq!(get("+1"), "👍");
        assert_eq!(get("no_such_emoji"), "");
    }

    #[test]
    fn test_get_name() {
        assert_eq!(get_name("\u{26a1}\u{fe0f}"), "zap");
        assert_eq!(get_name("👍"), "+1");
        assert_eq!(get_name("💩"), "hankey");
        assert_eq!(get_name("x"), "");
    }

    #[test]
    fn test_find() {
        let found = find("heart_eyes");
        assert_eq!(found, vec!["heart_eyes", "heart_eyes_cat"]);
        assert!(find("zzzz_nothing").is_empty());
        assert_eq!(find("").len(), aliases().count());
    }

    #[test]
    fn test_emojize() {
        assert_eq!(emojize("Hi :smile: emoji: :zap:!"), "Hi 😄 emoji: \u{26a1}\u{fe0f}!");
        assert_eq!(
            emojize("Hi :smile__1: emoji: :zap:!"),
            "Hi :smile__1: emoji: \u{26a1}\u{fe0f}!"
        );
        assert_eq!(emojize("no aliases here"), "no aliases here");
        assert_eq!(emojize(":+1: :t-rex:"), "👍 🦖");
    }

    #[test]
    fn test_emojize_adjacent_colons() {
        assert_eq!(emojize(":unknown:zap:"), ":unknown:zap:");
        assert_eq!(emojize(":zap::smile:"), "\u{26a1}\u{fe0f}😄");
        assert_eq!(emojize("::zap::"), ":\u{26a1}\u{fe0f}:");
        assert_eq!(emojize(":zap\n:"), ":zap\n:");
        assert_eq!(emojize("ratio 1:2:3"), "ratio 1:2:3");
    }

    #[test]
    fn test_table_consistency() {
        for (alias, glyph) in EMOJI {
            assert!(!glyph.is_empty());
            assert!(ALIAS_RE.is_match(&format!(":{}:", alias)), "alias {:?}", alias);
            assert_eq!(get(alias), *glyph);
        }
    }
}
