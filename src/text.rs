//! Text cleanup shared by the backend, the heading detector and the exporter.

use unicode_normalization::UnicodeNormalization;

/// Normalize extracted text: NFC, line breaks and runs of whitespace folded
/// to single spaces, surrounding whitespace trimmed.
pub fn clean_text(text: &str) -> String {
    let normalized: String = text.nfc().collect();
    let mut result = String::with_capacity(normalized.len());
    let mut pending_space = false;

    for c in normalized.chars() {
        if c.is_whitespace() || c == '\u{00A0}' {
            pending_space = !result.is_empty();
        } else {
            if pending_space {
                result.push(' ');
                pending_space = false;
            }
            result.push(c);
        }
    }

    result
}

/// Normalize multi-line text (comments): NFC, CRLF to LF, trimmed.
///
/// Inner line breaks are kept; the exporters quote them.
pub fn clean_multiline(text: &str) -> String {
    let normalized: String = text.nfc().collect();
    normalized
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .trim()
        .to_string()
}

/// Check if character is from a script that doesn't use word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs
    (0x4E00..=0x9FFF).contains(&code)
    // Extension A
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana
    || (0x3040..=0x309F).contains(&code)
    // Katakana
    || (0x30A0..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Append `piece` to `text`, inserting a space between words of scripts
/// that use them.
pub fn push_word(text: &mut String, piece: &str) {
    let piece = piece.trim();
    if piece.is_empty() {
        return;
    }

    let needs_space = match (text.chars().last(), piece.chars().next()) {
        (Some(last), Some(first)) => {
            !last.is_whitespace()
                && !(is_spaceless_script_char(last) && is_spaceless_script_char(first))
        }
        _ => false,
    };

    if needs_space {
        text.push(' ');
    }
    text.push_str(piece);
}
