//! Width-aware truncation of styled lines.
//!
//! Escape sequences take no room on screen, so widths are measured over the
//! visible graphemes only and escapes are never cut in half.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const RESET: &str = "\x1b[0m";

enum Segment<'a> {
    Escape(&'a str),
    Text(&'a str),
}

/// Split `s` into escape sequences and runs of visible text.
fn segments(s: &str) -> impl Iterator<Item = Segment<'_>> {
    let mut rest = s;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let bytes = rest.as_bytes();
        if bytes[0] == 0x1b {
            let len = escape_len(bytes);
            let (escape, tail) = rest.split_at(len);
            rest = tail;
            return Some(Segment::Escape(escape));
        }
        let len = rest.find('\x1b').unwrap_or(rest.len());
        let (text, tail) = rest.split_at(len);
        rest = tail;
        Some(Segment::Text(text))
    })
}

/// Length of the escape sequence at the start of `bytes`.
fn escape_len(bytes: &[u8]) -> usize {
    match bytes.get(1) {
        Some(b'[') => bytes[2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map_or(bytes.len(), |end| end + 3),
        // Two-byte escapes; the second byte is ASCII so this stays on a char boundary.
        Some(b) if b.is_ascii() => 2,
        _ => 1,
    }
}

/// Columns `s` occupies on screen.
pub fn display_width(s: &str) -> usize {
    segments(s)
        .map(|segment| match segment {
            Segment::Escape(_) => 0,
            Segment::Text(text) => text.width(),
        })
        .sum()
}

/// Cut `line` to `width` columns, ending it with `tail` when anything was cut.
///
/// A `width` of 0 means "unknown" and leaves the line untouched.
pub fn truncate_with_tail(line: &str, width: usize, tail: &str) -> String {
    if width == 0 || display_width(line) <= width {
        return line.to_string();
    }

    let budget = width.saturating_sub(display_width(tail));
    let mut out = String::with_capacity(line.len());
    let mut used = 0;
    let mut styled = false;

    'outer: for segment in segments(line) {
        match segment {
            Segment::Escape(escape) => {
                styled = true;
                out.push_str(escape);
            }
            Segment::Text(text) => {
                for grapheme in text.graphemes(true) {
                    let w = grapheme.width();
                    if used + w > budget {
                        break 'outer;
                    }
                    used += w;
                    out.push_str(grapheme);
                }
            }
        }
    }

    if styled {
        out.push_str(RESET);
    }
    out.push_str(tail);
    out
}
