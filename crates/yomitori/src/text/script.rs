//! Japanese script detection.

/// Whether `text` contains any Japanese character.
///
/// Matches hiragana and full-width katakana (U+3040–U+30FF), CJK unified
/// ideographs (U+4E00–U+9FFF) and half-width katakana (U+FF66–U+FF9F). Used to
/// decide whether a PDF text layer is worth keeping over OCR.
pub fn contains_japanese(text: &str) -> bool {
    text.chars().any(is_japanese_char)
}

/// Whether `ch` is kana or a CJK unified ideograph.
pub fn is_japanese_char(ch: char) -> bool {
    matches!(ch, '\u{3040}'..='\u{30ff}' | '\u{4e00}'..='\u{9fff}' | '\u{ff66}'..='\u{ff9f}')
}
