//! Low-level cursor over the parser's working buffer.
//!
//! [`ParserInput`] owns a mutable view of the UTF-8 source and provides
//! the scanning primitives the XML parser is built from: peeking,
//! advancing, name scanning, and in-place decoding of character data.
//!
//! Decoding never grows a span (every reference is at least as long as
//! the bytes it stands for), so decoded text is compacted towards the
//! start of its own span and the bytes ahead of the cursor stay intact.

use std::ops::Range;

// -------------------------------------------------------------------------
// XML Name character classes (XML 1.0 §2.3)
// -------------------------------------------------------------------------

/// Returns `true` if `c` is a valid `Char` per XML 1.0 §2.2 `[2]`.
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x0001_0000..=0x0010_FFFF
    )
}

/// Returns `true` if `c` is a valid `NameStartChar` per XML 1.0 §2.3 `[4]`.
pub(crate) fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z' |
        '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}' |
        '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' |
        '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}' |
        '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' |
        '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' |
        '\u{10000}'..='\u{EFFFF}'
    )
}

/// Returns `true` if `c` is a valid `NameChar` per XML 1.0 §2.3 [4a].
pub(crate) fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' |
            '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

/// Returns `true` for the four XML whitespace bytes.
pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Which transformations [`ParserInput::decode_in_place`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Decode {
    /// Expand predefined entities and numeric character references.
    pub escapes: bool,
    /// Fold `\r\n` and lone `\r` into `\n`.
    pub eol: bool,
    /// Turn tab, line feed, and carriage return into a space.
    pub attribute: bool,
}

/// The result of scanning a `&...` sequence.
#[derive(Debug, PartialEq, Eq)]
enum Reference {
    /// A numeric reference to a character, with its source length.
    Char(char, usize),
    /// One of the five predefined entities, with its source length.
    Predefined(u8, usize),
    /// Anything else starting with `&`; kept verbatim.
    Unknown,
    /// A numeric reference that is malformed or names a non-character.
    Invalid,
}

const PREDEFINED: [(&[u8], u8); 5] = [
    (b"lt;", b'<'),
    (b"gt;", b'>'),
    (b"amp;", b'&'),
    (b"apos;", b'\''),
    (b"quot;", b'"'),
];

fn scan_reference(bytes: &[u8]) -> Reference {
    debug_assert_eq!(bytes.first(), Some(&b'&'));
    if bytes.get(1) != Some(&b'#') {
        return PREDEFINED
            .iter()
            .find(|(name, _)| bytes[1..].starts_with(name))
            .map_or(Reference::Unknown, |&(name, byte)| {
                Reference::Predefined(byte, name.len() + 1)
            });
    }

    let (radix, digits_start) = if bytes.get(2) == Some(&b'x') {
        (16, 3)
    } else {
        (10, 2)
    };
    let digits = bytes
        .get(digits_start..)
        .unwrap_or_default()
        .iter()
        .take_while(|b| {
            if radix == 16 {
                b.is_ascii_hexdigit()
            } else {
                b.is_ascii_digit()
            }
        })
        .count();
    let end = digits_start + digits;
    if digits == 0 || bytes.get(end) != Some(&b';') {
        return Reference::Invalid;
    }
    std::str::from_utf8(&bytes[digits_start..end])
        .ok()
        .and_then(|text| u32::from_str_radix(text, radix).ok())
        .and_then(char::from_u32)
        .filter(|&c| is_xml_char(c))
        .map_or(Reference::Invalid, |c| Reference::Char(c, end + 1))
}

/// Cursor over a mutable UTF-8 buffer.
pub(crate) struct ParserInput<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl<'b> ParserInput<'b> {
    /// Creates a cursor at the start of `buf`.
    pub fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Returns `true` if all input has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Returns the current byte offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the total input length.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns the bytes of `range`.
    pub fn bytes(&self, range: Range<usize>) -> &[u8] {
        &self.buf[range]
    }

    // -- Peek operations --

    /// Returns the byte at the current position without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Returns the byte at `current_position + offset` without consuming.
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.buf.get(self.pos + offset).copied()
    }

    /// Returns the character at the current position without consuming it.
    pub fn peek_char(&self) -> Option<char> {
        let first = self.peek()?;
        let width = match first {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            _ => 4,
        };
        let end = (self.pos + width).min(self.buf.len());
        std::str::from_utf8(&self.buf[self.pos..end])
            .ok()
            .and_then(|s| s.chars().next())
    }

    // -- Advance operations --

    /// Advances the position by `count` bytes, stopping at the end.
    pub fn advance(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.buf.len());
    }

    /// Moves the cursor to an absolute offset.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }

    // -- Lookahead --

    /// Returns `true` if the remaining input starts with `s`.
    pub fn looking_at(&self, s: &[u8]) -> bool {
        self.buf[self.pos..].starts_with(s)
    }

    /// Returns the absolute offset of the next `byte`, if any.
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        self.buf[self.pos..]
            .iter()
            .position(|&b| b == byte)
            .map(|p| self.pos + p)
    }

    /// Returns the absolute offset of the next occurrence of `needle`.
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        self.buf[self.pos..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|p| self.pos + p)
    }

    // -- Whitespace --

    /// Skips whitespace characters. Returns `true` if any were consumed.
    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    // -- Names --

    /// Consumes an XML name and returns its byte range, or `None` without
    /// moving if the cursor is not at a name start character.
    pub fn scan_name(&mut self) -> Option<Range<usize>> {
        let start = self.pos;
        let first = self.peek_char().filter(|&c| is_name_start_char(c))?;
        self.pos += first.len_utf8();
        while let Some(c) = self.peek_char().filter(|&c| is_name_char(c)) {
            self.pos += c.len_utf8();
        }
        Some(start..self.pos)
    }

    // -- Decoding --

    /// Decodes `span` in place and returns the range holding the result.
    ///
    /// # Errors
    ///
    /// Returns the offset of a malformed numeric character reference.
    pub fn decode_in_place(&mut self, span: Range<usize>, mode: Decode) -> Result<Range<usize>, usize> {
        let Range { start, end } = span;
        let buf = &mut *self.buf;
        let (mut read, mut write) = (start, start);
        while read < end {
            let b = buf[read];
            match b {
                b'&' if mode.escapes => match scan_reference(&buf[read..end]) {
                    Reference::Char(c, len) => {
                        let mut utf8 = [0u8; 4];
                        let encoded = c.encode_utf8(&mut utf8).as_bytes();
                        buf[write..write + encoded.len()].copy_from_slice(encoded);
                        write += encoded.len();
                        read += len;
                    }
                    Reference::Predefined(byte, len) => {
                        buf[write] = byte;
                        write += 1;
                        read += len;
                    }
                    Reference::Unknown => {
                        buf[write] = b'&';
                        write += 1;
                        read += 1;
                    }
                    Reference::Invalid => return Err(read),
                },
                b'\r' if mode.eol => {
                    buf[write] = if mode.attribute { b' ' } else { b'\n' };
                    write += 1;
                    read += 1;
                    if read < end && buf[read] == b'\n' {
                        read += 1;
                    }
                }
                b'\t' | b'\n' | b'\r' if mode.attribute => {
                    buf[write] = b' ';
                    write += 1;
                    read += 1;
                }
                _ => {
                    buf[write] = b;
                    write += 1;
                    read += 1;
                }
            }
        }
        Ok(start..write)
    }
}

/// Shrinks `range` to exclude leading and trailing whitespace of `bytes`.
pub(crate) fn trim_range(bytes: &[u8], range: Range<usize>) -> Range<usize> {
    let mut start = range.start;
    let mut end = range.end;
    while start < end && is_whitespace(bytes[start]) {
        start += 1;
    }
    while end > start && is_whitespace(bytes[end - 1]) {
        end -= 1;
    }
    start..end
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(text: &str, mode: Decode) -> Result<String, usize> {
        let mut buf = text.as_bytes().to_vec();
        let len = buf.len();
        let mut input = ParserInput::new(&mut buf);
        let range = input.decode_in_place(0..len, mode)?;
        Ok(String::from_utf8(input.bytes(range).to_vec()).unwrap())
    }

    const ESCAPES: Decode = Decode {
        escapes: true,
        eol: true,
        attribute: false,
    };

    #[test]
    fn test_peek_and_advance() {
        let mut buf = b"abc".to_vec();
        let mut input = ParserInput::new(&mut buf);
        assert_eq!(input.peek(), Some(b'a'));
        assert_eq!(input.peek_at(1), Some(b'b'));
        input.advance(1);
        assert_eq!(input.peek(), Some(b'b'));
        input.advance(5);
        assert!(input.at_end());
        assert_eq!(input.pos(), 3);
    }

    #[test]
    fn test_peek_char_multibyte() {
        let mut buf = "é!".as_bytes().to_vec();
        let input = ParserInput::new(&mut buf);
        assert_eq!(input.peek_char(), Some('é'));
    }

    #[test]
    fn test_scan_name() {
        let mut buf = b"foo:bar-1 rest".to_vec();
        let mut input = ParserInput::new(&mut buf);
        let range = input.scan_name().unwrap();
        assert_eq!(input.bytes(range), b"foo:bar-1");
        assert_eq!(input.peek(), Some(b' '));
    }

    #[test]
    fn test_scan_name_rejects_digit_start() {
        let mut buf = b"1abc".to_vec();
        let mut input = ParserInput::new(&mut buf);
        assert_eq!(input.scan_name(), None);
        assert_eq!(input.pos(), 0);
    }

    #[test]
    fn test_find_and_looking_at() {
        let mut buf = b"abc-->def".to_vec();
        let input = ParserInput::new(&mut buf);
        assert_eq!(input.find(b"-->"), Some(3));
        assert_eq!(input.find_byte(b'd'), Some(6));
        assert!(input.looking_at(b"abc"));
        assert!(!input.looking_at(b"abd"));
    }

    #[test]
    fn test_skip_whitespace() {
        let mut buf = b" \t\r\nx".to_vec();
        let mut input = ParserInput::new(&mut buf);
        assert!(input.skip_whitespace());
        assert_eq!(input.peek(), Some(b'x'));
        assert!(!input.skip_whitespace());
    }

    #[test]
    fn test_decode_predefined_entities() {
        assert_eq!(
            decode("&lt;&gt;&amp;&apos;&quot;", ESCAPES).unwrap(),
            "<>&'\""
        );
    }

    #[test]
    fn test_decode_char_refs() {
        assert_eq!(decode("&#65;&#x42;&#x1F600;", ESCAPES).unwrap(), "AB😀");
    }

    #[test]
    fn test_decode_keeps_unknown_entity() {
        assert_eq!(decode("a &nbsp; b &", ESCAPES).unwrap(), "a &nbsp; b &");
    }

    #[test]
    fn test_decode_rejects_bad_char_refs() {
        assert_eq!(decode("ab&#;", ESCAPES), Err(2));
        assert_eq!(decode("&#0;", ESCAPES), Err(0));
        assert_eq!(decode("&#xD800;", ESCAPES), Err(0));
        assert_eq!(decode("&#65", ESCAPES), Err(0));
        assert_eq!(decode("&#99999999999;", ESCAPES), Err(0));
    }

    #[test]
    fn test_decode_disabled_escapes() {
        let mode = Decode::default();
        assert_eq!(decode("&amp;&#0;", mode).unwrap(), "&amp;&#0;");
    }

    #[test]
    fn test_decode_eol() {
        assert_eq!(decode("a\r\nb\rc\n", ESCAPES).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn test_decode_attribute_whitespace() {
        let mode = Decode {
            escapes: true,
            eol: true,
            attribute: true,
        };
        assert_eq!(decode("a\tb\r\nc\nd", mode).unwrap(), "a b c d");
    }

    #[test]
    fn test_trim_range() {
        let bytes = b"  ab c \n";
        assert_eq!(trim_range(bytes, 0..bytes.len()), 2..6);
        assert_eq!(trim_range(b"   ", 0..3), 3..3);
    }
}
