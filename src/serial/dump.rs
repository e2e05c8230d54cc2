//! Indented diagnostic listing of a document tree.
//!
//! One line per node: its kind, then its name and value where the kind has
//! them, followed by one line per attribute. Names and values are printed
//! with Rust string escaping so control characters stay visible. The
//! layout is meant for people and may change between releases.

use std::fmt::{self, Write as _};
use std::io;
use std::ops::ControlFlow;

use crate::tree::{Document, NodeRef};

const INDENT: &str = "  ";

fn write_line(out: &mut String, node: NodeRef<'_, '_>, depth: usize) -> fmt::Result {
    let kind = node.node_type();
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(kind.as_str());
    if kind.has_name() {
        write!(out, " {:?}", node.name())?;
    }
    if kind.has_value() {
        write!(out, " = {:?}", node.value())?;
    }
    out.push('\n');
    for attr in node.attributes() {
        for _ in 0..=depth {
            out.push_str(INDENT);
        }
        writeln!(out, "@{} = {:?}", attr.name(), attr.value())?;
    }
    Ok(())
}

impl Document<'_> {
    /// Renders the tree as an indented, one-line-per-node listing.
    ///
    /// ```
    /// use xmlarbor::Document;
    ///
    /// let doc = Document::parse_str("<a x='1'><b>hi</b></a>").unwrap();
    /// assert_eq!(
    ///     doc.debug_dump(),
    ///     "document\n  element \"a\"\n    @x = \"1\"\n    element \"b\"\n      pcdata = \"hi\"\n"
    /// );
    /// ```
    #[must_use]
    pub fn debug_dump(&self) -> String {
        let mut out = String::from("document\n");
        // Writing into a String cannot fail.
        let _ = self.traverse(|node, depth| match write_line(&mut out, node, depth + 1) {
            Ok(()) => ControlFlow::Continue(()),
            Err(fmt::Error) => ControlFlow::Break(()),
        });
        out
    }

    /// Writes [`debug_dump`](Self::debug_dump) to `writer`.
    ///
    /// # Errors
    ///
    /// Returns any error reported by `writer`.
    pub fn write_debug_dump(&self, mut writer: impl io::Write) -> io::Result<()> {
        writer.write_all(self.debug_dump().as_bytes())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::parser::ParseOptions;
    use crate::tree::{Document, NodeType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dump_empty_document() {
        assert_eq!(Document::new().debug_dump(), "document\n");
    }

    #[test]
    fn test_dump_every_kind() {
        let mut doc = Document::new();
        let result = doc.load_str_with_options(
            "<?xml version='1.0'?><r a='1' b='x\"y'><?go now?><!--c-->t<![CDATA[d]]></r>",
            &ParseOptions::full(),
        );
        assert!(result.is_ok());
        let expected = "\
document
  declaration \"xml\" = \"version='1.0'\"
  element \"r\"
    @a = \"1\"
    @b = \"x\\\"y\"
    pi \"go\" = \"now\"
    comment = \"c\"
    pcdata = \"t\"
    cdata = \"d\"
";
        assert_eq!(doc.debug_dump(), expected);
    }

    #[test]
    fn test_dump_shows_control_characters() {
        let mut doc = Document::new();
        let root = doc.append_child(doc.root(), "r").unwrap();
        let text = doc.append_child_of_type(root, NodeType::PcData).unwrap();
        doc.set_value(text, "a\tb");
        assert!(doc.debug_dump().contains("pcdata = \"a\\tb\""));
    }

    #[test]
    fn test_write_debug_dump() {
        let doc = Document::parse_str("<r/>").unwrap();
        let mut buf = Vec::new();
        doc.write_debug_dump(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "document\n  element \"r\"\n");
    }
}
