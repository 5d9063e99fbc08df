//! Text canonicalization shared by query terms and candidate texts.
//!
//! Applied per character:
//! 1. Full-width ASCII (`！`..`～`) to half-width, except `（` and `）`
//! 2. Katakana to hiragana
//! 3. Whitespace (including U+3000) removed
//! 4. ASCII letters lowercased

use std::collections::HashMap;

use once_cell::sync::Lazy;

const FULLWIDTH_START: u32 = 0xFF01;
const FULLWIDTH_END: u32 = 0xFF5E;
const FULLWIDTH_OFFSET: u32 = 0xFF01 - 0x21;

const KATAKANA_START: u32 = 0x30A1;
const KATAKANA_END: u32 = 0x30F6;
const KANA_OFFSET: u32 = 0x30A1 - 0x3041;

/// Full-width parentheses are kept so they never turn into grouping syntax.
const PRESERVED: [char; 2] = ['（', '）'];

static CHAR_MAP: Lazy<HashMap<char, char>> = Lazy::new(|| {
    let fullwidth = (FULLWIDTH_START..=FULLWIDTH_END).map(|c| (c, c - FULLWIDTH_OFFSET));
    let katakana = (KATAKANA_START..=KATAKANA_END).map(|c| (c, c - KANA_OFFSET));

    fullwidth
        .chain(katakana)
        .filter_map(|(from, to)| Some((char::from_u32(from)?, char::from_u32(to)?)))
        .filter(|(from, _)| !PRESERVED.contains(from))
        .collect()
});

/// Canonicalize `text` for matching. Idempotent.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| CHAR_MAP.get(&c).copied().unwrap_or(c))
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
