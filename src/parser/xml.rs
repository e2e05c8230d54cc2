//! Core XML parser state machine.
//!
//! An iterative parser: open elements are kept on an explicit stack, so
//! nesting depth costs heap, not call stack. The parser creates nodes as
//! soon as their markup starts and records each string as a byte range of
//! the working buffer; the caller turns ranges into strings afterwards.

use std::borrow::Cow;
use std::ops::Range;

use super::input::{is_whitespace, trim_range, Decode, ParserInput};
use super::{ParseOptions, Pending};
use crate::error::ParseStatus;
use crate::tree::{AttrList, Document, NodeKind, SlotIndex, StrTarget};

/// Why and where parsing stopped.
type Failure = (ParseStatus, usize);

/// Parses `buf` into `doc`, which must be freshly reset.
///
/// Returns the status, the offset where parsing stopped, and the string
/// ranges still to be stored.
pub(super) fn parse(
    buf: &mut [u8],
    doc: &mut Document<'_>,
    options: &ParseOptions,
) -> (ParseStatus, usize, Vec<Pending>) {
    let root = doc.root_index();
    let mut parser = XmlParser {
        input: ParserInput::new(buf),
        doc,
        options,
        pending: Vec::new(),
        open: Vec::new(),
        root,
        top_level_elements: 0,
    };
    let (status, offset) = match parser.run() {
        Ok(()) => (ParseStatus::Ok, parser.input.pos()),
        Err(failure) => failure,
    };
    (status, offset, parser.pending)
}

/// The parser state.
struct XmlParser<'b, 'd, 'a> {
    /// Cursor over the working buffer.
    input: ParserInput<'b>,
    /// The document being built.
    doc: &'d mut Document<'a>,
    /// Parser options.
    options: &'d ParseOptions,
    /// Strings produced so far.
    pending: Vec<Pending>,
    /// Open elements with the byte range of their names.
    open: Vec<(SlotIndex, Range<usize>)>,
    /// The document root slot.
    root: SlotIndex,
    /// Elements seen directly below the root.
    top_level_elements: usize,
}

impl XmlParser<'_, '_, '_> {
    fn run(&mut self) -> Result<(), Failure> {
        while !self.input.at_end() {
            if self.input.peek() == Some(b'<') {
                self.parse_markup()?;
            } else {
                self.parse_text()?;
            }
        }
        if !self.open.is_empty() {
            return Err((ParseStatus::UnexpectedEof, self.input.len()));
        }
        if !self.options.fragment && self.top_level_elements == 0 {
            return Err((ParseStatus::NoDocumentElement, self.input.len()));
        }
        Ok(())
    }

    /// The node new children are attached to.
    fn cursor(&self) -> SlotIndex {
        self.open.last().map_or(self.root, |(slot, _)| *slot)
    }

    /// Returns `true` when loose content at the current position is kept.
    fn keeps_loose_content(&self) -> bool {
        self.options.fragment || !self.open.is_empty()
    }

    fn text_decode(&self) -> Decode {
        Decode {
            escapes: self.options.escapes,
            eol: self.options.eol,
            attribute: false,
        }
    }

    fn raw_decode(&self) -> Decode {
        Decode {
            escapes: false,
            eol: self.options.eol,
            attribute: false,
        }
    }

    fn decode(&mut self, span: Range<usize>, mode: Decode) -> Result<Range<usize>, Failure> {
        self.input
            .decode_in_place(span, mode)
            .map_err(|at| (ParseStatus::BadCharRef, at))
    }

    fn push(&mut self, kind: NodeKind<'static>) -> SlotIndex {
        let parent = self.cursor();
        self.doc.push_node(parent, kind)
    }

    fn parse_markup(&mut self) -> Result<(), Failure> {
        let start = self.input.pos();
        match self.input.peek_at(1) {
            None => Err((ParseStatus::UnexpectedEof, start + 1)),
            Some(b'/') => self.parse_end_tag(),
            Some(b'?') => self.parse_pi(),
            Some(b'!') => {
                if self.input.looking_at(b"<!--") {
                    self.parse_comment()
                } else if self.input.looking_at(b"<![CDATA[") {
                    self.parse_cdata()
                } else if self.input.looking_at(b"<!DOCTYPE") {
                    self.parse_doctype()
                } else if self.truncated_declaration(start) {
                    Err((ParseStatus::UnexpectedEof, self.input.len()))
                } else {
                    Err((ParseStatus::UnrecognizedTag, start))
                }
            }
            Some(_) => self.parse_start_tag(),
        }
    }

    /// Whether the input ends inside one of the `<!` openers.
    fn truncated_declaration(&self, start: usize) -> bool {
        let rest = self.input.bytes(start..self.input.len());
        [&b"<!--"[..], b"<![CDATA[", b"<!DOCTYPE"]
            .iter()
            .any(|opener| opener.starts_with(rest))
    }

    fn parse_start_tag(&mut self) -> Result<(), Failure> {
        let lt = self.input.pos();
        self.input.advance(1);
        let Some(name) = self.input.scan_name() else {
            return Err((ParseStatus::UnrecognizedTag, self.input.pos()));
        };
        if self.open.is_empty() && !self.options.fragment {
            self.top_level_elements += 1;
            if self.top_level_elements > 1 {
                return Err((ParseStatus::MultipleDocumentElements, lt));
            }
        }

        let element = self.push(NodeKind::Element {
            name: Cow::Borrowed(""),
            attributes: AttrList::default(),
        });
        self.pending.push((StrTarget::NodeName(element), name.clone()));

        loop {
            let had_space = self.input.skip_whitespace();
            let at = self.input.pos();
            match self.input.peek() {
                None => return Err((ParseStatus::UnexpectedEof, at)),
                Some(b'>') => {
                    self.input.advance(1);
                    self.open.push((element, name));
                    return Ok(());
                }
                Some(b'/') => {
                    return match self.input.peek_at(1) {
                        Some(b'>') => {
                            self.input.advance(2);
                            Ok(())
                        }
                        None => Err((ParseStatus::UnexpectedEof, at + 1)),
                        Some(_) => Err((ParseStatus::BadStartElement, at)),
                    };
                }
                Some(_) => {
                    let Some(attr_name) = self.input.scan_name() else {
                        return Err((ParseStatus::BadStartElement, at));
                    };
                    if !had_space {
                        return Err((ParseStatus::BadAttribute, at));
                    }
                    self.parse_attribute(element, attr_name)?;
                }
            }
        }
    }

    fn parse_attribute(&mut self, element: SlotIndex, name: Range<usize>) -> Result<(), Failure> {
        let attr = self.doc.push_attribute(element);
        self.pending.push((StrTarget::AttrName(attr), name));

        self.input.skip_whitespace();
        self.expect_attribute_byte(|b| b == b'=')?;
        self.input.skip_whitespace();
        let quote = self.expect_attribute_byte(|b| b == b'"' || b == b'\'')?;

        let start = self.input.pos();
        let Some(end) = self.input.find_byte(quote) else {
            return Err((ParseStatus::BadAttribute, start));
        };
        let mode = Decode {
            escapes: self.options.escapes,
            eol: self.options.eol,
            attribute: self.options.attribute_whitespace,
        };
        let value = self.decode(start..end, mode)?;
        self.input.seek(end + 1);
        self.pending.push((StrTarget::AttrValue(attr), value));
        Ok(())
    }

    /// Consumes one byte matching `accept`, failing with `BadAttribute`.
    fn expect_attribute_byte(&mut self, accept: impl Fn(u8) -> bool) -> Result<u8, Failure> {
        let at = self.input.pos();
        match self.input.peek() {
            Some(b) if accept(b) => {
                self.input.advance(1);
                Ok(b)
            }
            None => Err((ParseStatus::UnexpectedEof, at)),
            Some(_) => Err((ParseStatus::BadAttribute, at)),
        }
    }

    fn parse_end_tag(&mut self) -> Result<(), Failure> {
        self.input.advance(2);
        let name_at = self.input.pos();
        let Some(name) = self.input.scan_name() else {
            let status = if self.input.at_end() {
                ParseStatus::UnexpectedEof
            } else {
                ParseStatus::BadEndElement
            };
            return Err((status, name_at));
        };
        let matches_open = self
            .open
            .last()
            .is_some_and(|(_, open)| self.input.bytes(open.clone()) == self.input.bytes(name.clone()));
        if !matches_open {
            return Err((ParseStatus::EndElementMismatch, name_at));
        }

        self.input.skip_whitespace();
        let at = self.input.pos();
        match self.input.peek() {
            Some(b'>') => self.input.advance(1),
            None => return Err((ParseStatus::UnexpectedEof, at)),
            Some(_) => return Err((ParseStatus::BadEndElement, at)),
        }
        self.open.pop();
        Ok(())
    }

    fn parse_text(&mut self) -> Result<(), Failure> {
        let start = self.input.pos();
        let end = self.input.find_byte(b'<').unwrap_or(self.input.len());
        self.input.seek(end);
        if !self.keeps_loose_content() {
            return Ok(());
        }
        if !self.options.whitespace_pcdata
            && self.input.bytes(start..end).iter().all(|&b| is_whitespace(b))
        {
            return Ok(());
        }

        let mut value = self.decode(start..end, self.text_decode())?;
        if self.options.trim_pcdata {
            value = trim_range(self.input.bytes(0..self.input.len()), value);
        }
        let node = self.push(NodeKind::PcData {
            value: Cow::Borrowed(""),
        });
        self.pending.push((StrTarget::NodeValue(node), value));
        Ok(())
    }

    fn parse_comment(&mut self) -> Result<(), Failure> {
        let start = self.input.pos();
        self.input.advance(4);
        let content = self.input.pos();
        let Some(end) = self.input.find(b"-->") else {
            return Err((ParseStatus::BadComment, start));
        };
        self.input.seek(end + 3);
        if !self.options.comments {
            return Ok(());
        }

        let value = self.decode(content..end, self.raw_decode())?;
        let node = self.push(NodeKind::Comment {
            value: Cow::Borrowed(""),
        });
        self.pending.push((StrTarget::NodeValue(node), value));
        Ok(())
    }

    fn parse_cdata(&mut self) -> Result<(), Failure> {
        let start = self.input.pos();
        self.input.advance(9);
        let content = self.input.pos();
        let Some(end) = self.input.find(b"]]>") else {
            return Err((ParseStatus::BadCdata, start));
        };
        self.input.seek(end + 3);
        if !self.options.cdata || !self.keeps_loose_content() {
            return Ok(());
        }

        let value = self.decode(content..end, self.raw_decode())?;
        let node = self.push(NodeKind::CData {
            value: Cow::Borrowed(""),
        });
        self.pending.push((StrTarget::NodeValue(node), value));
        Ok(())
    }

    /// Skips a document type declaration, honoring quoted strings,
    /// comments, and the bracketed internal subset.
    fn parse_doctype(&mut self) -> Result<(), Failure> {
        let start = self.input.pos();
        if !self.open.is_empty() {
            return Err((ParseStatus::BadDoctype, start));
        }
        self.input.advance(9);
        let mut depth = 0usize;
        loop {
            match self.input.peek() {
                None => return Err((ParseStatus::BadDoctype, start)),
                Some(quote @ (b'"' | b'\'')) => {
                    self.input.advance(1);
                    let Some(end) = self.input.find_byte(quote) else {
                        return Err((ParseStatus::BadDoctype, start));
                    };
                    self.input.seek(end + 1);
                }
                Some(b'<') if self.input.looking_at(b"<!--") => {
                    let Some(end) = self.input.find(b"-->") else {
                        return Err((ParseStatus::BadDoctype, start));
                    };
                    self.input.seek(end + 3);
                }
                Some(b'[') => {
                    depth += 1;
                    self.input.advance(1);
                }
                Some(b']') => {
                    if depth == 0 {
                        return Err((ParseStatus::BadDoctype, self.input.pos()));
                    }
                    depth -= 1;
                    self.input.advance(1);
                }
                Some(b'>') if depth == 0 => {
                    self.input.advance(1);
                    return Ok(());
                }
                Some(_) => self.input.advance(1),
            }
        }
    }

    /// Parses a processing instruction or the XML declaration.
    fn parse_pi(&mut self) -> Result<(), Failure> {
        let start = self.input.pos();
        self.input.advance(2);
        let Some(target) = self.input.scan_name() else {
            return Err((ParseStatus::BadPi, self.input.pos()));
        };
        let is_declaration = self.input.bytes(target.clone()).eq_ignore_ascii_case(b"xml");
        if is_declaration && !self.open.is_empty() {
            return Err((ParseStatus::BadPi, start));
        }
        if !self.input.looking_at(b"?>") && !self.input.peek().is_some_and(is_whitespace) {
            return Err((ParseStatus::BadPi, self.input.pos()));
        }

        let content = self.input.pos();
        let Some(end) = self.input.find(b"?>") else {
            return Err((ParseStatus::BadPi, start));
        };
        self.input.seek(end + 2);
        let keep = if is_declaration {
            self.options.declaration
        } else {
            self.options.pi
        };
        if !keep {
            return Ok(());
        }

        let value = trim_range(self.input.bytes(0..self.input.len()), content..end);
        let node = if is_declaration {
            self.push(NodeKind::Declaration {
                name: Cow::Borrowed(""),
                value: Cow::Borrowed(""),
            })
        } else {
            self.push(NodeKind::Pi {
                name: Cow::Borrowed(""),
                value: Cow::Borrowed(""),
            })
        };
        self.pending.push((StrTarget::NodeName(node), target));
        self.pending.push((StrTarget::NodeValue(node), value));
        Ok(())
    }
}
