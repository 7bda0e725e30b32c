//! # Focused-link highlighting
//!
//! Marks the focused link inside text that the renderer has already styled
//! with ANSI escapes, without disturbing any existing escape sequence or
//! splitting a multi-byte character.
//!
//! ```text
//! "\x1b[36mSee \x1b[4mhere\x1b[0m"
//!            │
//!   scan ────┤  printable: "See here"
//!            │  offsets:   [5, 6, 7, 8, 13, 14, 15, 16, 21]   (last = end of text)
//!            ▼
//! label "here" → chars 4..8 → bytes 13..21 → wrap in ESC[7m … ESC[27m
//! ```
//!
//! Every link's label is searched from a cursor that only moves forward, so
//! two links that share a label ("here", "here") land on successive
//! occurrences instead of both matching the first.

use super::links::LinkRegistry;

pub const REVERSE_ON: &str = "\x1b[7m";
pub const REVERSE_OFF: &str = "\x1b[27m";

const ESC: u8 = 0x1b;

/// Printable characters of a styled text plus the byte offset each one starts
/// at. `offsets` has one extra entry: the length of the text.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PrintableMap {
    pub chars: Vec<char>,
    pub offsets: Vec<usize>,
}

#[derive(Clone, Copy)]
enum ScanState {
    Normal,
    Escape,
}

/// Scan `text` once, skipping `ESC [ … final` sequences (final byte in
/// `0x40..=0x7E`). Bytes that do not decode as UTF-8 count as one printable
/// unit each.
pub fn printable_map(text: &[u8]) -> PrintableMap {
    let mut map = PrintableMap::default();
    let mut state = ScanState::Normal;
    let mut i = 0;

    while i < text.len() {
        match state {
            ScanState::Escape => {
                let byte = text[i];
                i += 1;
                if (0x40..=0x7e).contains(&byte) {
                    state = ScanState::Normal;
                }
            }
            ScanState::Normal => {
                if text[i] == ESC && text.get(i + 1) == Some(&b'[') {
                    state = ScanState::Escape;
                    i += 2;
                    continue;
                }
                let (ch, size) = decode_char(&text[i..]);
                map.chars.push(ch);
                map.offsets.push(i);
                i += size;
            }
        }
    }

    map.offsets.push(text.len());
    map
}

/// Decode one character at the start of `bytes`, or a single raw byte as
/// U+FFFD when the sequence is invalid.
fn decode_char(bytes: &[u8]) -> (char, usize) {
    let width = match bytes[0] {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return (char::REPLACEMENT_CHARACTER, 1),
    };
    bytes
        .get(..width)
        .and_then(|seq| std::str::from_utf8(seq).ok())
        .and_then(|s| s.chars().next())
        .map(|ch| (ch, width))
        .unwrap_or((char::REPLACEMENT_CHARACTER, 1))
}

/// Byte span `(start, end)` of each link's label in `text`, in registry
/// order. `None` for labels that could not be found past the cursor.
pub fn label_spans(text: &[u8], links: &LinkRegistry) -> Vec<Option<(usize, usize)>> {
    let map = printable_map(text);
    let mut cursor = 0;

    links
        .iter()
        .map(|link| {
            let label: Vec<char> = link.label.trim().chars().collect();
            if label.is_empty() || cursor >= map.chars.len() {
                return None;
            }
            let found = find_chars(&map.chars[cursor..], &label)?;
            let start = cursor + found;
            let end = start + label.len();
            cursor = end;
            Some((map.offsets[start], map.offsets[end]))
        })
        .collect()
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Byte-level highlighting. Returns the input unchanged when `focused` is
/// `None`, out of range, or its label was not found.
pub fn highlight_focused_link_bytes(
    rendered: &[u8],
    links: &LinkRegistry,
    focused: Option<usize>,
) -> Vec<u8> {
    let Some(index) = focused.filter(|&i| i < links.len()) else {
        return rendered.to_vec();
    };

    let Some((start, end)) = label_spans(rendered, links)[index] else {
        return rendered.to_vec();
    };

    let mut out = Vec::with_capacity(rendered.len() + REVERSE_ON.len() + REVERSE_OFF.len());
    out.extend_from_slice(&rendered[..start]);
    out.extend_from_slice(REVERSE_ON.as_bytes());
    out.extend_from_slice(&rendered[start..end]);
    out.extend_from_slice(REVERSE_OFF.as_bytes());
    out.extend_from_slice(&rendered[end..]);
    out
}

/// Wrap the focused link's label in reverse video.
pub fn highlight_focused_link(
    rendered: &str,
    links: &LinkRegistry,
    focused: Option<usize>,
) -> String {
    let Some(index) = focused.filter(|&i| i < links.len()) else {
        return rendered.to_string();
    };

    // Spans start and end on character boundaries of valid UTF-8, so slicing
    // the str directly is safe.
    let Some((start, end)) = label_spans(rendered.as_bytes(), links)[index] else {
        return rendered.to_string();
    };

    let mut out = String::with_capacity(rendered.len() + REVERSE_ON.len() + REVERSE_OFF.len());
    out.push_str(&rendered[..start]);
    out.push_str(REVERSE_ON);
    out.push_str(&rendered[start..end]);
    out.push_str(REVERSE_OFF);
    out.push_str(&rendered[end..]);
    out
}
