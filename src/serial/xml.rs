//! XML serializer.
//!
//! Writes a [`Document`] back out as XML text. The output is compact: no
//! whitespace is added, so the text nodes of the tree are reproduced
//! exactly and reparsing with [`ParseOptions::full`] yields the same tree.
//!
//! [`ParseOptions::full`]: crate::parser::ParseOptions::full

use std::fmt::Write as _;
use std::io;
use std::ops::ControlFlow;

use crate::tree::{Document, NodeKind, NodeRef, NodeType};

/// Options controlling XML serialization output.
///
/// # Examples
///
/// ```
/// use xmlarbor::Document;
/// use xmlarbor::serial::{serialize_with_options, SerializeOptions};
///
/// let doc = Document::parse_str("<root><empty/></root>").unwrap();
/// let opts = SerializeOptions::default().declaration(true).empty_element_tags(false);
/// assert_eq!(
///     serialize_with_options(&doc, &opts),
///     "<?xml version=\"1.0\"?><root><empty></empty></root>"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Emit `<?xml version="1.0"?>` when the document has no declaration
    /// node of its own. Defaults to `false`.
    pub declaration: bool,
    /// Write childless elements as `<a/>` rather than `<a></a>`.
    /// Defaults to `true`.
    pub empty_element_tags: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            declaration: false,
            empty_element_tags: true,
        }
    }
}

impl SerializeOptions {
    /// Enables or disables the generated XML declaration.
    #[must_use]
    pub fn declaration(mut self, yes: bool) -> Self {
        self.declaration = yes;
        self
    }

    /// Enables or disables self-closing tags for childless elements.
    #[must_use]
    pub fn empty_element_tags(mut self, yes: bool) -> Self {
        self.empty_element_tags = yes;
        self
    }
}

/// Serializes a document to an XML string.
///
/// # Examples
///
/// ```
/// use xmlarbor::Document;
/// use xmlarbor::serial::serialize;
///
/// let doc = Document::parse_str("<root a='1 &amp; 2'>x &lt; y</root>").unwrap();
/// assert_eq!(serialize(&doc), "<root a=\"1 &amp; 2\">x &lt; y</root>");
/// ```
#[must_use]
pub fn serialize(doc: &Document<'_>) -> String {
    serialize_with_options(doc, &SerializeOptions::default())
}

/// Serializes a document to an XML string with the given options.
#[must_use]
pub fn serialize_with_options(doc: &Document<'_>, options: &SerializeOptions) -> String {
    let mut out = String::new();
    let has_declaration = doc
        .root_node()
        .children()
        .any(|n| n.node_type() == NodeType::Declaration);
    if options.declaration && !has_declaration {
        out.push_str("<?xml version=\"1.0\"?>");
    }

    // Elements whose end tag is still owed, with their depth.
    let mut open: Vec<(usize, &str)> = Vec::new();
    doc.traverse(|node, depth| {
        while let Some(&(_, name)) = open.last().filter(|&&(d, _)| d >= depth) {
            write_end_tag(&mut out, name);
            open.pop();
        }
        if write_node(&mut out, node, options) {
            open.push((depth, element_name(node.name())));
        }
        ControlFlow::Continue(())
    });
    while let Some((_, name)) = open.pop() {
        write_end_tag(&mut out, name);
    }
    out
}

/// Writes the markup that opens `node`. Returns `true` if the node is an
/// element whose end tag must follow its children.
fn write_node(out: &mut String, node: NodeRef<'_, '_>, options: &SerializeOptions) -> bool {
    let Some(kind) = node.kind() else {
        return false;
    };
    match kind {
        NodeKind::Element { name, .. } => {
            let name = element_name(name);
            out.push('<');
            out.push_str(name);
            for attr in node.attributes() {
                out.push(' ');
                out.push_str(attr.name());
                out.push_str("=\"");
                write_escaped_attr(out, attr.value());
                out.push('"');
            }
            if node.first_child().is_null() {
                if options.empty_element_tags {
                    out.push_str("/>");
                } else {
                    out.push_str("></");
                    out.push_str(name);
                    out.push('>');
                }
                false
            } else {
                out.push('>');
                true
            }
        }
        NodeKind::PcData { value } => {
            write_escaped_text(out, value);
            false
        }
        NodeKind::CData { value } => {
            // `]]>` cannot appear inside a section; split it across two.
            out.push_str("<![CDATA[");
            out.push_str(&value.replace("]]>", "]]]]><![CDATA[>"));
            out.push_str("]]>");
            false
        }
        NodeKind::Comment { value } => {
            out.push_str("<!--");
            write_comment_text(out, value);
            out.push_str("-->");
            false
        }
        NodeKind::Pi { name, value } | NodeKind::Declaration { name, value } => {
            out.push_str("<?");
            out.push_str(name);
            if !value.is_empty() {
                out.push(' ');
                out.push_str(&value.replace("?>", "? >"));
            }
            out.push_str("?>");
            false
        }
        NodeKind::Document => false,
    }
}

/// Unnamed elements are written under a placeholder so the output still
/// parses.
fn element_name(name: &str) -> &str {
    if name.is_empty() {
        ":anonymous"
    } else {
        name
    }
}

/// Writes a comment body. A `-` followed by another `-` or by the end of
/// the comment gets a trailing space, so `--` never appears.
fn write_comment_text(out: &mut String, text: &str) {
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        out.push(ch);
        if ch == '-' && matches!(chars.peek(), Some('-') | None) {
            out.push(' ');
        }
    }
}

fn write_end_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Escapes character data. A carriage return is written as a reference
/// so that end-of-line normalization on reparse keeps it.
fn write_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}

/// Escapes an attribute value for a double-quoted literal. Whitespace
/// other than space is written as references so attribute normalization
/// on reparse keeps it.
fn write_escaped_attr(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' | '\n' | '\r' => {
                let _ = write!(out, "&#{};", ch as u32);
            }
            _ => out.push(ch),
        }
    }
}

impl Document<'_> {
    /// Writes the document as XML to `writer`.
    ///
    /// # Errors
    ///
    /// Returns any error reported by `writer`.
    pub fn save(&self, writer: impl io::Write) -> io::Result<()> {
        self.save_with_options(writer, &SerializeOptions::default())
    }

    /// Like [`save`](Self::save) with explicit options.
    ///
    /// # Errors
    ///
    /// Returns any error reported by `writer`.
    pub fn save_with_options(
        &self,
        mut writer: impl io::Write,
        options: &SerializeOptions,
    ) -> io::Result<()> {
        let text = serialize_with_options(self, options);
        log::trace!("saving {} bytes of XML", text.len());
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::ParseOptions;
    use pretty_assertions::assert_eq;

    fn round(text: &str) -> String {
        let mut doc = Document::new();
        let result = doc.load_str_with_options(text, &ParseOptions::full());
        assert!(result.is_ok(), "{result}");
        serialize(&doc)
    }

    #[test]
    fn test_serialize_empty_element() {
        assert_eq!(round("<root/>"), "<root/>");
        assert_eq!(round("<root></root>"), "<root/>");
    }

    #[test]
    fn test_serialize_nested_with_text() {
        assert_eq!(
            round("<a><b>one</b><c><d/></c>tail</a>"),
            "<a><b>one</b><c><d/></c>tail</a>"
        );
    }

    #[test]
    fn test_serialize_attributes_in_order() {
        assert_eq!(
            round(r#"<a z="1" b='2' m="x&quot;y"/>"#),
            r#"<a z="1" b="2" m="x&quot;y"/>"#
        );
    }

    #[test]
    fn test_serialize_escaping() {
        let mut doc = Document::new();
        let root = doc.append_child(doc.root(), "r").unwrap();
        doc.set_text(root, "a < b & c > d");
        let attr = doc.append_attribute(root, "v").unwrap();
        doc.set_attribute_value(attr, "<\"tab\t\">");
        assert_eq!(
            serialize(&doc),
            "<r v=\"&lt;&quot;tab&#9;&quot;>\">a &lt; b &amp; c &gt; d</r>"
        );
    }

    #[test]
    fn test_serialize_other_node_kinds() {
        let text = "<?xml version=\"1.0\"?><!--c--><r><?pi data?><![CDATA[<x>]]></r>";
        assert_eq!(round(text), text);
    }

    #[test]
    fn test_serialize_splits_cdata_terminator() {
        let mut doc = Document::new();
        let root = doc.append_child(doc.root(), "r").unwrap();
        let cdata = doc.append_child_of_type(root, NodeType::CData).unwrap();
        doc.set_value(cdata, "a]]>b");
        let text = serialize(&doc);
        assert_eq!(text, "<r><![CDATA[a]]]]><![CDATA[>b]]></r>");
        let back = Document::parse_str(&text).unwrap();
        let values: Vec<&str> = back.document_element().children().map(|n| n.value()).collect();
        assert_eq!(values.concat(), "a]]>b");
    }

    #[test]
    fn test_serialize_breaks_comment_and_pi_terminators() {
        let mut doc = Document::new();
        let root = doc.append_child(doc.root(), "r").unwrap();
        let comment = doc.append_child_of_type(root, NodeType::Comment).unwrap();
        doc.set_value(comment, "a-->b");
        let trailing = doc.append_child_of_type(root, NodeType::Comment).unwrap();
        doc.set_value(trailing, "end-");
        let pi = doc.append_child_of_type(root, NodeType::Pi).unwrap();
        doc.set_name(pi, "t");
        doc.set_value(pi, "x?>y");
        let text = serialize(&doc);
        assert_eq!(text, "<r><!--a- ->b--><!--end- --><?t x? >y?></r>");

        let mut back = Document::new();
        assert!(back.load_str_with_options(&text, &ParseOptions::full()).is_ok());
        let kinds: Vec<(NodeType, &str)> = back
            .document_element()
            .children()
            .map(|n| (n.node_type(), n.value()))
            .collect();
        assert_eq!(
            kinds,
            [
                (NodeType::Comment, "a- ->b"),
                (NodeType::Comment, "end- "),
                (NodeType::Pi, "x? >y"),
            ]
        );
    }

    #[test]
    fn test_serialize_unnamed_element_uses_placeholder() {
        let mut doc = Document::new();
        let unnamed = doc.append_child(doc.root(), "").unwrap();
        doc.append_child(unnamed, "x").unwrap();
        let text = serialize(&doc);
        assert_eq!(text, "<:anonymous><x/></:anonymous>");
        let back = Document::parse_str(&text).unwrap();
        assert_eq!(back.document_element().name(), ":anonymous");
        assert_eq!(back.document_element().first_child().name(), "x");
    }

    #[test]
    fn test_serialize_generated_declaration() {
        let doc = Document::parse_str("<r/>").unwrap();
        let opts = SerializeOptions::default().declaration(true);
        assert_eq!(
            serialize_with_options(&doc, &opts),
            "<?xml version=\"1.0\"?><r/>"
        );

        let mut doc = Document::new();
        let result = doc.load_str_with_options("<?xml version='1.1'?><r/>", &ParseOptions::full());
        assert!(result.is_ok());
        assert_eq!(
            serialize_with_options(&doc, &opts),
            "<?xml version='1.1'?><r/>"
        );
    }

    #[test]
    fn test_serialize_fragment_siblings() {
        let mut doc = Document::new();
        let opts = ParseOptions::default().fragment(true);
        assert!(doc.load_str_with_options("<a><b/></a>text<c>1</c>", &opts).is_ok());
        assert_eq!(serialize(&doc), "<a><b/></a>text<c>1</c>");
    }

    #[test]
    fn test_round_trip_reparses_identically() {
        let src = "<r a=\"1\">\n  <x y=\"&#10;\">t&amp;t</x>\n  <!--note-->\n</r>";
        let first = round(src);
        assert_eq!(round(&first), first);
        let doc = Document::parse_str(&first).unwrap();
        assert_eq!(doc.document_element().child("x").attribute("y").value(), "\n");
    }

    #[test]
    fn test_save_writes_to_writer() {
        let doc = Document::parse_str("<r><c/></r>").unwrap();
        let mut buf = Vec::new();
        doc.save(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "<r><c/></r>");
    }

    #[test]
    fn test_serialize_deep_tree_without_recursion() {
        let depth = 50_000;
        let text = format!("{}{}", "<d>".repeat(depth), "</d>".repeat(depth));
        let doc = Document::parse_str(&text).unwrap();
        assert_eq!(serialize(&doc).len(), depth * 3 + (depth - 1) * 4 + 1);
    }
}
