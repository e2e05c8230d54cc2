//! Error types and parse outcomes.
//!
//! Parsing never fails through a `Result`: every load returns a
//! [`ParseResult`] describing where and why parsing stopped, and the
//! document keeps whatever well-formed prefix was built before that point.
//! [`ParseResult::into_result`] converts a failure into a [`ParseError`]
//! for callers who prefer `?`.
//!
//! Tree mutation reports contract failures through [`TreeError`].

use std::fmt;

use crate::encoding::Encoding;
use crate::tree::NodeType;

/// The outcome category of a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseStatus {
    /// The whole input was consumed without error.
    Ok,
    /// The file passed to a file load does not exist.
    FileNotFound,
    /// The source could not be read.
    IoError,
    /// An allocation failed while building the tree.
    OutOfMemory,
    /// The parser reached an inconsistent state.
    InternalError,
    /// `<` was followed by something that is not a known construct.
    UnrecognizedTag,
    /// Malformed processing instruction or XML declaration.
    BadPi,
    /// Malformed comment.
    BadComment,
    /// Malformed CDATA section.
    BadCdata,
    /// Malformed document type declaration.
    BadDoctype,
    /// Malformed character data.
    BadPcdata,
    /// Malformed start tag.
    BadStartElement,
    /// Malformed attribute.
    BadAttribute,
    /// Malformed end tag.
    BadEndElement,
    /// An end tag does not match the innermost open element.
    EndElementMismatch,
    /// A numeric character reference is empty, overflows, or names a
    /// code point that is not a character.
    BadCharRef,
    /// The input ended inside an open element or construct.
    UnexpectedEof,
    /// The document contains no element.
    NoDocumentElement,
    /// More than one top-level element outside fragment mode.
    MultipleDocumentElements,
}

impl ParseStatus {
    /// Returns a human-readable description of the status.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Ok => "No error",
            Self::FileNotFound => "File was not found",
            Self::IoError => "Error reading from file/stream",
            Self::OutOfMemory => "Could not allocate memory",
            Self::InternalError => "Internal error occurred",
            Self::UnrecognizedTag => "Could not determine tag type",
            Self::BadPi => "Error parsing document declaration/processing instruction",
            Self::BadComment => "Error parsing comment",
            Self::BadCdata => "Error parsing CDATA section",
            Self::BadDoctype => "Error parsing document type declaration",
            Self::BadPcdata => "Error parsing PCDATA section",
            Self::BadStartElement => "Error parsing start element tag",
            Self::BadAttribute => "Error parsing element attribute",
            Self::BadEndElement => "Error parsing end element tag",
            Self::EndElementMismatch => "Start-end tags mismatch",
            Self::BadCharRef => "Invalid character reference",
            Self::UnexpectedEof => "Unexpected end of input",
            Self::NoDocumentElement => "No document element found",
            Self::MultipleDocumentElements => "Multiple document elements found",
        }
    }
}

impl fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Source location within parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
}

impl SourceLocation {
    /// Computes the line and column of `byte_offset` within `text`.
    ///
    /// Offsets past the end are clamped to the end of `text`.
    #[must_use]
    pub fn from_offset(text: &str, byte_offset: usize) -> Self {
        let mut end = byte_offset.min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let before = &text[..end];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |p| p + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
            byte_offset,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The record produced by every load operation.
///
/// `offset` is the byte offset into the decoded UTF-8 text at which
/// parsing stopped; it is meaningful mainly on failure. For sources that
/// were transcoded, the offset refers to the transcoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseResult {
    /// Success or the failure category.
    pub status: ParseStatus,
    /// Byte offset at which parsing stopped.
    pub offset: usize,
    /// Detected (or forced) source encoding.
    pub encoding: Encoding,
}

impl ParseResult {
    pub(crate) fn new(status: ParseStatus, offset: usize, encoding: Encoding) -> Self {
        Self {
            status,
            offset,
            encoding,
        }
    }

    /// Returns `true` if parsing succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == ParseStatus::Ok
    }

    /// Returns the human-readable description of the status.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.status.description()
    }

    /// Converts a failed result into a [`ParseError`].
    ///
    /// `text` is used to compute the line/column; pass the parsed source,
    /// or an empty string when it is not at hand.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the status is not [`ParseStatus::Ok`].
    pub fn into_result(self, text: &str) -> Result<(), ParseError> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(ParseError {
                status: self.status,
                location: SourceLocation::from_offset(text, self.offset),
            })
        }
    }
}

impl Default for ParseResult {
    fn default() -> Self {
        Self::new(ParseStatus::Ok, 0, Encoding::Utf8)
    }
}

impl fmt::Display for ParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            f.write_str(self.description())
        } else {
            write!(f, "{} at offset {}", self.description(), self.offset)
        }
    }
}

/// A parse failure, for use with `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The failure category.
    pub status: ParseStatus,
    /// Where parsing stopped.
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at {}: {}", self.location, self.status)
    }
}

impl std::error::Error for ParseError {}

/// A rejected tree mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The handle refers to a removed node/attribute or another document.
    StaleHandle,
    /// The target node kind cannot hold children.
    NoChildren(NodeType),
    /// The target node kind cannot hold attributes.
    NoAttributes(NodeType),
    /// The anchor node is not a child of the given parent.
    NotAChild,
    /// The anchor attribute does not belong to the given node.
    NotAnAttribute,
    /// The requested node kind cannot be created as a child.
    InvalidKind(NodeType),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleHandle => write!(f, "handle does not refer to a live node"),
            Self::NoChildren(kind) => write!(f, "{kind} nodes cannot have children"),
            Self::NoAttributes(kind) => write!(f, "{kind} nodes cannot have attributes"),
            Self::NotAChild => write!(f, "anchor node is not a child of the parent"),
            Self::NotAnAttribute => write!(f, "anchor attribute does not belong to the node"),
            Self::InvalidKind(kind) => write!(f, "cannot create a {kind} node"),
        }
    }
}

impl std::error::Error for TreeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation {
            line: 10,
            column: 5,
            byte_offset: 42,
        };
        assert_eq!(loc.to_string(), "10:5");
    }

    #[test]
    fn test_source_location_from_offset() {
        let text = "<a>\n  <b>\n</a>";
        let loc = SourceLocation::from_offset(text, 6);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
        assert_eq!(loc.byte_offset, 6);
    }

    #[test]
    fn test_source_location_counts_chars_not_bytes() {
        let text = "<é>x";
        let loc = SourceLocation::from_offset(text, 4);
        assert_eq!(loc.column, 4);
    }

    #[test]
    fn test_source_location_past_end_is_clamped() {
        let loc = SourceLocation::from_offset("ab", 99);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 3);
    }

    #[test]
    fn test_parse_result_description() {
        let res = ParseResult::new(ParseStatus::EndElementMismatch, 12, Encoding::Utf8);
        assert!(!res.is_ok());
        assert_eq!(res.description(), "Start-end tags mismatch");
        assert_eq!(res.to_string(), "Start-end tags mismatch at offset 12");
    }

    #[test]
    fn test_parse_result_into_result() {
        let ok = ParseResult::default();
        assert!(ok.into_result("").is_ok());

        let bad = ParseResult::new(ParseStatus::UnexpectedEof, 3, Encoding::Utf8);
        let Err(err) = bad.into_result("<a>") else {
            panic!("failed result converted to Ok");
        };
        assert_eq!(err.status, ParseStatus::UnexpectedEof);
        assert_eq!(err.to_string(), "parse error at 1:4: Unexpected end of input");
    }

    #[test]
    fn test_tree_error_display() {
        assert_eq!(
            TreeError::NoChildren(NodeType::PcData).to_string(),
            "pcdata nodes cannot have children"
        );
        assert_eq!(
            TreeError::NotAChild.to_string(),
            "anchor node is not a child of the parent"
        );
    }

    #[test]
    fn test_errors_are_error_trait() {
        let err = ParseError {
            status: ParseStatus::BadAttribute,
            location: SourceLocation::default(),
        };
        let _: &dyn std::error::Error = &err;
        let _: &dyn std::error::Error = &TreeError::StaleHandle;
    }
}
