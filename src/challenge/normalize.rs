//! Text repair and marker stripping for raw OCR output.

use regex::Regex;
use std::sync::LazyLock;

/// Completion marker as printed by the game, plus the common OCR misread.
static COMPLETION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:completed|compieted)\b").unwrap());

/// Progress fraction such as `3/5`, which ends a challenge description.
pub(crate) static PROGRESS_FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+/\d+").unwrap());

/// Repairs the text, then replaces completion markers and progress
/// fractions with line breaks. Everything else is kept verbatim.
pub fn normalize(raw_text: &str) -> String {
    strip_markers(&repair_text(raw_text))
}

/// Replaces completion markers and progress fractions with line breaks.
/// Expects text that already went through [`repair_text`].
pub fn strip_markers(text: &str) -> String {
    let text = COMPLETION_MARKER.replace_all(text, "\n");
    PROGRESS_FRACTION.replace_all(&text, "\n").into_owned()
}

/// Best-effort Unicode repair. Returns the input unchanged when nothing applies.
pub fn repair_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    for (i, line) in unified.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let line = fix_mojibake(line);
        for c in line.chars() {
            push_repaired_char(&mut out, c);
        }
    }
    out
}

fn push_repaired_char(out: &mut String, c: char) {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => out.push('\''),
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => out.push('"'),
        '\u{FB00}' => out.push_str("ff"),
        '\u{FB01}' => out.push_str("fi"),
        '\u{FB02}' => out.push_str("fl"),
        '\u{FB03}' => out.push_str("ffi"),
        '\u{FB04}' => out.push_str("ffl"),
        // BOM and zero-width characters
        '\u{FEFF}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' => {}
        '\t' => out.push(c),
        c if c.is_control() => {}
        c => out.push(c),
    }
}

/// Undoes UTF-8 text that was decoded as Windows-1252 (or Latin-1).
///
/// Only replaces the line when every character maps back to a single byte
/// and those bytes are valid UTF-8 that differs from the input.
fn fix_mojibake(line: &str) -> std::borrow::Cow<'_, str> {
    if line.is_ascii() {
        return line.into();
    }

    let mut bytes = Vec::with_capacity(line.len());
    for c in line.chars() {
        match sloppy_cp1252_byte(c) {
            Some(b) => bytes.push(b),
            None => return line.into(),
        }
    }

    match String::from_utf8(bytes) {
        Ok(decoded) if decoded != line => decoded.into(),
        _ => line.into(),
    }
}

/// Maps a character back to its Windows-1252 byte. Code points 0x80-0x9F
/// that Windows-1252 leaves undefined map to themselves, as Latin-1 would.
fn sloppy_cp1252_byte(c: char) -> Option<u8> {
    let b = match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        c if (c as u32) <= 0xFF => c as u32 as u8,
        _ => return None,
    };
    Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_markers_become_line_breaks() {
        assert_eq!(normalize("Completed Win 10 matches"), "\n Win 10 matches");
        assert_eq!(normalize("Compieted Deal damage"), "\n Deal damage");
        assert_eq!(normalize("COMPLETED x"), "\n x");
    }

    #[test]
    fn test_marker_inside_word_is_kept() {
        // Word boundaries only
        assert_eq!(normalize("Uncompleted task"), "Uncompleted task");
    }

    #[test]
    fn test_progress_fraction_becomes_line_break() {
        assert_eq!(normalize("Win a match 3/5 Play games"), "Win a match \n Play games");
        assert_eq!(normalize("Score KOs 12/100"), "Score KOs \n");
    }

    #[test]
    fn test_other_text_preserved() {
        let text = "Win 3 games with Sword\nDeal 500 damage\n";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_marker_stripping_is_idempotent() {
        let inputs = [
            "Completed Win 10 matches\nWin a match 3/5\nab",
            "Compieted\ncompleted 1/2 3/4 Hammer",
            "plain text only",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_repair_mojibake() {
        // "café" encoded as UTF-8 and decoded as Windows-1252
        assert_eq!(repair_text("cafÃ©"), "café");
        // Right single quote mangled into three characters
        assert_eq!(repair_text("Bodvarâ€™s Hammer"), "Bodvar's Hammer");
    }

    #[test]
    fn test_repair_leaves_valid_unicode() {
        assert_eq!(repair_text("Nai — Katars"), "Nai — Katars");
        assert_eq!(repair_text("ステージ 1"), "ステージ 1");
    }

    #[test]
    fn test_repair_ligatures_quotes_and_controls() {
        assert_eq!(repair_text("\u{FEFF}\u{FB01}nish “fast”"), "finish \"fast\"");
        assert_eq!(repair_text("a\r\nb\rc\u{0007}d\te"), "a\nb\ncd\te");
    }
}
