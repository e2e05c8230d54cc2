//! XML parser.
//!
//! A hand-rolled, iterative parser that fills a [`Document`] from UTF-8
//! text. Every source form funnels into one routine that works on a
//! mutable byte buffer: references and line endings are decoded in place,
//! and each node or attribute string is recorded as a byte range of that
//! buffer. Once parsing stops the ranges are turned into strings, either
//! borrowed from the caller's buffer (in-place loads) or copied.
//!
//! Parsing never aborts with a `Result`; it stops at the first
//! unrecoverable byte and reports that position in a [`ParseResult`],
//! leaving the already-built prefix of the tree in the document.

pub(crate) mod input;
mod xml;

use std::borrow::Cow;
use std::ops::Range;
use std::path::Path;

use crate::encoding::{decode_to_utf8, resolve_encoding, Encoding};
use crate::error::{ParseResult, ParseStatus};
use crate::tree::{Document, StrTarget};

/// Parse options controlling which nodes are produced and how text is
/// decoded.
///
/// Use the builder pattern to configure options:
///
/// ```
/// use xmlarbor::parser::ParseOptions;
///
/// let opts = ParseOptions::default()
///     .fragment(true)
///     .comments(true)
///     .trim_pcdata(true);
/// assert!(opts.fragment);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ParseOptions {
    /// Accept any number of top-level nodes, including text, instead of
    /// exactly one document element.
    pub fragment: bool,
    /// Keep comments as `Comment` nodes.
    pub comments: bool,
    /// Keep processing instructions as `Pi` nodes.
    pub pi: bool,
    /// Keep the XML declaration as a `Declaration` node.
    pub declaration: bool,
    /// Keep CDATA sections as `CData` nodes.
    pub cdata: bool,
    /// Keep text nodes that consist only of whitespace.
    pub whitespace_pcdata: bool,
    /// Decode predefined entities and numeric character references.
    pub escapes: bool,
    /// Normalize `\r\n` and `\r` to `\n`.
    pub eol: bool,
    /// Replace tab, line feed, and carriage return in attribute values
    /// with a space.
    pub attribute_whitespace: bool,
    /// Trim leading and trailing whitespace from text nodes.
    pub trim_pcdata: bool,
    /// Source encoding, or [`Encoding::Auto`] to detect it.
    pub encoding: Encoding,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            fragment: false,
            comments: false,
            pi: false,
            declaration: false,
            cdata: true,
            whitespace_pcdata: false,
            escapes: true,
            eol: true,
            attribute_whitespace: true,
            trim_pcdata: false,
            encoding: Encoding::Auto,
        }
    }
}

impl ParseOptions {
    /// Returns options that keep every node kind, including
    /// whitespace-only text.
    #[must_use]
    pub fn full() -> Self {
        Self::default()
            .comments(true)
            .pi(true)
            .declaration(true)
            .whitespace_pcdata(true)
    }

    /// Enables or disables fragment mode.
    #[must_use]
    pub fn fragment(mut self, yes: bool) -> Self {
        self.fragment = yes;
        self
    }

    /// Enables or disables comment nodes.
    #[must_use]
    pub fn comments(mut self, yes: bool) -> Self {
        self.comments = yes;
        self
    }

    /// Enables or disables processing instruction nodes.
    #[must_use]
    pub fn pi(mut self, yes: bool) -> Self {
        self.pi = yes;
        self
    }

    /// Enables or disables the declaration node.
    #[must_use]
    pub fn declaration(mut self, yes: bool) -> Self {
        self.declaration = yes;
        self
    }

    /// Enables or disables CDATA nodes.
    #[must_use]
    pub fn cdata(mut self, yes: bool) -> Self {
        self.cdata = yes;
        self
    }

    /// Enables or disables whitespace-only text nodes.
    #[must_use]
    pub fn whitespace_pcdata(mut self, yes: bool) -> Self {
        self.whitespace_pcdata = yes;
        self
    }

    /// Enables or disables reference decoding.
    #[must_use]
    pub fn escapes(mut self, yes: bool) -> Self {
        self.escapes = yes;
        self
    }

    /// Enables or disables end-of-line normalization.
    #[must_use]
    pub fn eol(mut self, yes: bool) -> Self {
        self.eol = yes;
        self
    }

    /// Enables or disables attribute whitespace conversion.
    #[must_use]
    pub fn attribute_whitespace(mut self, yes: bool) -> Self {
        self.attribute_whitespace = yes;
        self
    }

    /// Enables or disables text trimming.
    #[must_use]
    pub fn trim_pcdata(mut self, yes: bool) -> Self {
        self.trim_pcdata = yes;
        self
    }

    /// Forces the source encoding.
    #[must_use]
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// A string produced by the parser, as a range of the working buffer.
pub(crate) type Pending = (StrTarget, Range<usize>);

/// Parses already-UTF-8 text, copying every string.
pub(crate) fn load_str(doc: &mut Document<'_>, text: &str, options: &ParseOptions) -> ParseResult {
    log::trace!("loading {} bytes of text", text.len());
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    load_owned(doc, text.as_bytes().to_vec(), Encoding::Utf8, options)
}

/// Parses a byte buffer in any supported encoding, copying every string.
pub(crate) fn load_bytes(
    doc: &mut Document<'_>,
    bytes: &[u8],
    options: &ParseOptions,
) -> ParseResult {
    let (encoding, bom) = resolve_encoding(bytes, options.encoding);
    log::trace!("loading {} bytes as {encoding}", bytes.len());
    let text = decode_to_utf8(&bytes[bom..], encoding);
    load_owned(doc, text.into_owned().into_bytes(), encoding, options)
}

/// Parses `buf` in place; the document borrows its strings from `buf`.
///
/// Sources that are not valid UTF-8 cannot be borrowed and fall back to a
/// transcoded private copy.
pub(crate) fn load_in_place<'a>(
    doc: &mut Document<'a>,
    buf: &'a mut [u8],
    options: &ParseOptions,
) -> ParseResult {
    let (encoding, bom) = resolve_encoding(buf, options.encoding);
    log::trace!("loading {} bytes in place as {encoding}", buf.len());
    let body = &mut buf[bom..];
    if encoding != Encoding::Utf8 || std::str::from_utf8(body).is_err() {
        let text = decode_to_utf8(body, encoding).into_owned();
        return load_owned(doc, text.into_bytes(), encoding, options);
    }

    doc.reset();
    let (status, offset, pending) = xml::parse(body, doc, options);
    let frozen: &'a [u8] = body;
    for (target, range) in pending {
        doc.set_raw_string(target, String::from_utf8_lossy(&frozen[range]));
    }
    finish(status, offset, encoding)
}

/// Reads and parses a file.
pub(crate) fn load_file(
    doc: &mut Document<'_>,
    path: &Path,
    options: &ParseOptions,
) -> ParseResult {
    match std::fs::read(path) {
        Ok(bytes) => load_bytes(doc, &bytes, options),
        Err(err) => {
            log::debug!("cannot read {}: {err}", path.display());
            doc.reset();
            let status = if err.kind() == std::io::ErrorKind::NotFound {
                ParseStatus::FileNotFound
            } else {
                ParseStatus::IoError
            };
            ParseResult::new(status, 0, Encoding::Auto)
        }
    }
}

fn load_owned(
    doc: &mut Document<'_>,
    mut text: Vec<u8>,
    encoding: Encoding,
    options: &ParseOptions,
) -> ParseResult {
    doc.reset();
    let (status, offset, pending) = xml::parse(&mut text, doc, options);
    for (target, range) in pending {
        let value = String::from_utf8_lossy(&text[range]).into_owned();
        doc.set_raw_string(target, Cow::Owned(value));
    }
    finish(status, offset, encoding)
}

fn finish(status: ParseStatus, offset: usize, encoding: Encoding) -> ParseResult {
    if status != ParseStatus::Ok {
        log::debug!("parse stopped at offset {offset}: {status}");
    }
    ParseResult::new(status, offset, encoding)
}
