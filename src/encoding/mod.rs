//! Encoding detection and transcoding.
//!
//! Every source is normalized to UTF-8 before parsing, bridging to
//! `encoding_rs` for UTF-16 and Latin-1 conversion.
//!
//! # Detection strategy
//!
//! 1. Check for a Byte Order Mark. UTF-32 marks are tested before UTF-16
//!    ones since `FF FE 00 00` starts with the UTF-16LE mark.
//! 2. Without a BOM, look at the width of the leading `<` (or `<?`).
//! 3. For byte-oriented input, read the XML declaration's `encoding=`
//!    label; `ISO-8859-1` and its aliases select Latin-1.
//! 4. Otherwise default to UTF-8.

use std::borrow::Cow;
use std::fmt;

/// A source encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// Detect from the BOM, leading bytes, and XML declaration.
    #[default]
    Auto,
    /// UTF-8.
    Utf8,
    /// UTF-16, little endian.
    Utf16Le,
    /// UTF-16, big endian.
    Utf16Be,
    /// UTF-32, little endian.
    Utf32Le,
    /// UTF-32, big endian.
    Utf32Be,
    /// ISO-8859-1.
    Latin1,
}

impl Encoding {
    /// Returns the IANA-style name of the encoding.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Utf8 => "UTF-8",
            Self::Utf16Le => "UTF-16LE",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf32Le => "UTF-32LE",
            Self::Utf32Be => "UTF-32BE",
            Self::Latin1 => "ISO-8859-1",
        }
    }

    /// Maps an encoding label (case-insensitive) to an `Encoding`.
    ///
    /// Byte-order-less `UTF-16`/`UTF-32` labels are not recognized here
    /// since they do not determine the byte order on their own.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmlarbor::Encoding;
    ///
    /// assert_eq!(Encoding::from_label("latin1"), Some(Encoding::Latin1));
    /// assert_eq!(Encoding::from_label("Shift_JIS"), None);
    /// ```
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase();
        match label.as_str() {
            "utf-8" | "utf8" | "us-ascii" | "ascii" => Some(Self::Utf8),
            "utf-16le" => Some(Self::Utf16Le),
            "utf-16be" => Some(Self::Utf16Be),
            "utf-32le" => Some(Self::Utf32Le),
            "utf-32be" => Some(Self::Utf32Be),
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1" => {
                Some(Self::Latin1)
            }
            _ => None,
        }
    }

    /// Returns the BOM for this encoding, if it has one.
    fn bom(self) -> &'static [u8] {
        match self {
            Self::Utf8 => b"\xEF\xBB\xBF",
            Self::Utf16Le => b"\xFF\xFE",
            Self::Utf16Be => b"\xFE\xFF",
            Self::Utf32Le => b"\xFF\xFE\x00\x00",
            Self::Utf32Be => b"\x00\x00\xFE\xFF",
            Self::Auto | Self::Latin1 => b"",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detects the encoding of a byte stream.
///
/// Returns the encoding and the number of BOM bytes to skip. The returned
/// encoding is never [`Encoding::Auto`].
///
/// # Examples
///
/// ```
/// use xmlarbor::encoding::detect_encoding;
/// use xmlarbor::Encoding;
///
/// assert_eq!(detect_encoding(b"\xEF\xBB\xBF<a/>"), (Encoding::Utf8, 3));
/// assert_eq!(detect_encoding(b"<\x00a\x00/\x00>\x00"), (Encoding::Utf16Le, 0));
/// assert_eq!(detect_encoding(b"<a/>"), (Encoding::Utf8, 0));
/// ```
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> (Encoding, usize) {
    match bytes {
        [0x00, 0x00, 0xFE, 0xFF, ..] => (Encoding::Utf32Be, 4),
        [0xFF, 0xFE, 0x00, 0x00, ..] => (Encoding::Utf32Le, 4),
        [0xFE, 0xFF, ..] => (Encoding::Utf16Be, 2),
        [0xFF, 0xFE, ..] => (Encoding::Utf16Le, 2),
        [0xEF, 0xBB, 0xBF, ..] => (Encoding::Utf8, 3),
        [0x00, 0x00, 0x00, b'<', ..] => (Encoding::Utf32Be, 0),
        [b'<', 0x00, 0x00, 0x00, ..] => (Encoding::Utf32Le, 0),
        [0x00, b'<', ..] => (Encoding::Utf16Be, 0),
        [b'<', 0x00, ..] => (Encoding::Utf16Le, 0),
        _ => match declared_encoding(bytes).as_deref().and_then(Encoding::from_label) {
            Some(Encoding::Latin1) => (Encoding::Latin1, 0),
            _ => (Encoding::Utf8, 0),
        },
    }
}

/// Resolves the effective encoding and BOM length for `bytes`.
///
/// A forced encoding is used as-is; its BOM is skipped if present.
pub(crate) fn resolve_encoding(bytes: &[u8], forced: Encoding) -> (Encoding, usize) {
    if forced == Encoding::Auto {
        return detect_encoding(bytes);
    }
    let bom = forced.bom();
    let skip = if !bom.is_empty() && bytes.starts_with(bom) {
        bom.len()
    } else {
        0
    };
    (forced, skip)
}

/// Decodes `bytes` (BOM already stripped) from `encoding` into UTF-8.
///
/// Malformed sequences are replaced with U+FFFD. Valid UTF-8 input is
/// borrowed without copying.
///
/// # Examples
///
/// ```
/// use xmlarbor::encoding::decode_to_utf8;
/// use xmlarbor::Encoding;
///
/// assert_eq!(decode_to_utf8(b"caf\xE9", Encoding::Latin1), "caf\u{e9}");
/// assert_eq!(decode_to_utf8(b"<\x00a\x00", Encoding::Utf16Le), "<a");
/// ```
#[must_use]
pub fn decode_to_utf8(bytes: &[u8], encoding: Encoding) -> Cow<'_, str> {
    match encoding {
        Encoding::Auto | Encoding::Utf8 => String::from_utf8_lossy(bytes),
        Encoding::Utf16Le => encoding_rs::UTF_16LE.decode_without_bom_handling(bytes).0,
        Encoding::Utf16Be => encoding_rs::UTF_16BE.decode_without_bom_handling(bytes).0,
        Encoding::Utf32Le => Cow::Owned(decode_utf32(bytes, u32::from_le_bytes)),
        Encoding::Utf32Be => Cow::Owned(decode_utf32(bytes, u32::from_be_bytes)),
        Encoding::Latin1 => encoding_rs::mem::decode_latin1(bytes),
    }
}

fn decode_utf32(bytes: &[u8], unit: fn([u8; 4]) -> u32) -> String {
    let chunks = bytes.chunks_exact(4);
    let trailing = !chunks.remainder().is_empty();
    let mut out = String::with_capacity(bytes.len() / 4);
    for chunk in chunks {
        let code = unit([chunk[0], chunk[1], chunk[2], chunk[3]]);
        out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    if trailing {
        out.push(char::REPLACEMENT_CHARACTER);
    }
    out
}

/// Extracts the `encoding` label from an ASCII-compatible XML declaration.
///
/// Only the first 200 bytes are scanned.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let scan = &bytes[..bytes.len().min(200)];
    if !scan.starts_with(b"<?xml") {
        return None;
    }
    let decl_end = scan.windows(2).position(|w| w == b"?>")?;
    let decl = &scan[..decl_end];

    let needle = b"encoding";
    let enc_pos = decl.windows(needle.len()).position(|w| w == needle)?;
    let after_enc = skip_ascii_whitespace(&decl[enc_pos + needle.len()..]);
    let after_eq = skip_ascii_whitespace(after_enc.strip_prefix(b"=")?);

    let quote = *after_eq.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value = &after_eq[1..];
    let end = value.iter().position(|&b| b == quote)?;
    let label = &value[..end];
    label
        .is_ascii()
        .then(|| String::from_utf8_lossy(label).into_owned())
}

fn skip_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let skip = bytes
        .iter()
        .take_while(|&&b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        .count();
    &bytes[skip..]
}
