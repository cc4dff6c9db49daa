//! Printable escaping for arbitrary text
//!
//! [`escape`] turns any string into printable ASCII using C-style escapes;
//! [`unescape`] reverses it and additionally understands octal escapes as
//! written by hand in `.cfg` files.

use std::fmt::Write;

/// Escape `text` into printable ASCII.
///
/// Printable ASCII passes through except `\` and `"`. Newline, carriage
/// return and tab use their short forms; every other byte of the UTF-8
/// encoding becomes `\xHH`.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for &byte in text.as_bytes() {
        match byte {
            b'\\' => escaped.push_str("\\\\"),
            b'"' => escaped.push_str("\\\""),
            b'\n' => escaped.push_str("\\n"),
            b'\r' => escaped.push_str("\\r"),
            b'\t' => escaped.push_str("\\t"),
            0x20..=0x7E => escaped.push(byte as char),
            _ => {
                let _ = write!(escaped, "\\x{byte:02x}");
            }
        }
    }
    escaped
}

/// Reverse [`escape`].
///
/// Also accepts octal escapes (`\0` through `\377`), `\a`, `\b`, `\f`, `\v`
/// and `\'`. An unknown escape keeps the escaped character; a trailing lone
/// backslash is kept as-is. Byte sequences that do not form valid UTF-8 are
/// decoded lossily.
pub fn unescape(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;

    while index < bytes.len() {
        let byte = bytes[index];
        index += 1;
        if byte != b'\\' {
            decoded.push(byte);
            continue;
        }

        let Some(&code) = bytes.get(index) else {
            decoded.push(b'\\');
            break;
        };
        index += 1;

        match code {
            b'n' => decoded.push(b'\n'),
            b'r' => decoded.push(b'\r'),
            b't' => decoded.push(b'\t'),
            b'a' => decoded.push(0x07),
            b'b' => decoded.push(0x08),
            b'f' => decoded.push(0x0C),
            b'v' => decoded.push(0x0B),
            b'x' => {
                let digits = bytes[index..]
                    .iter()
                    .take(2)
                    .take_while(|b| b.is_ascii_hexdigit())
                    .count();
                if digits == 0 {
                    decoded.push(b'x');
                } else {
                    let value = bytes[index..index + digits]
                        .iter()
                        .fold(0u8, |acc, &d| (acc << 4) | hex_value(d));
                    decoded.push(value);
                    index += digits;
                }
            }
            b'0'..=b'7' => {
                let mut value = u32::from(code - b'0');
                let mut digits = 1;
                while digits < 3 {
                    match bytes.get(index) {
                        Some(&d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            index += 1;
                            digits += 1;
                        }
                        _ => break,
                    }
                }
                decoded.push((value & 0xFF) as u8);
            }
            other => {
                // Keep the whole UTF-8 sequence of the escaped character
                decoded.push(other);
            }
        }
    }

    match String::from_utf8(decoded) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_is_printable() {
        let escaped = escape("tab\there \"quoted\" back\\slash é\u{1}");
        assert!(escaped.bytes().all(|b| (0x20..=0x7E).contains(&b)));
        assert_eq!(
            escaped,
            "tab\\there \\\"quoted\\\" back\\\\slash \\xc3\\xa9\\x01"
        );
    }

    #[test]
    fn test_round_trip_every_code_point_below_256() {
        let text: String = (0u32..=255).filter_map(char::from_u32).collect();
        assert_eq!(text.chars().count(), 256);
        assert_eq!(unescape(&escape(&text)), text);
    }

    #[test]
    fn test_round_trip_assorted() {
        for text in ["", "plain", "\\", "\"", "\n\r\t", "日本語", "🎮 Astrosmash", "\\x41"] {
            assert_eq!(unescape(&escape(text)), text, "round trip of {text:?}");
        }
    }

    #[test]
    fn test_unescape_octal_and_hex() {
        assert_eq!(unescape("\\101\\x42\\103"), "ABC");
        assert_eq!(unescape("\\0"), "\0");
        assert_eq!(unescape("\\1234"), "S4");
        assert_eq!(unescape("\\xZZ"), "xZZ");
    }

    #[test]
    fn test_unescape_unknown_and_trailing() {
        assert_eq!(unescape("\\q"), "q");
        assert_eq!(unescape("end\\"), "end\\");
        assert_eq!(unescape("\\'"), "'");
    }

    #[test]
    fn test_unescape_invalid_utf8_is_lossy() {
        let text = unescape("\\xff\\xfe");
        assert!(!text.is_empty());
    }
}
