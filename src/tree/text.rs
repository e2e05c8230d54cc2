//! Text view over a node's character data.

use std::fmt;

use super::{NodeKind, NodeRef};
use crate::util::convert;

/// A read-only view of the character data associated with a node.
///
/// A text view binds to the node itself when it is PCDATA or CDATA, and
/// otherwise to that node's first PCDATA or CDATA child. It owns no
/// storage; all conversions read the bound node's value.
///
/// ```
/// use xmlarbor::Document;
///
/// let doc = Document::parse_str("<cfg><debug>yes</debug><port>80</port></cfg>").unwrap();
/// let cfg = doc.document_element();
/// assert!(cfg.child("debug").text().as_bool());
/// assert_eq!(cfg.child("port").text().as_int(), 80);
/// assert!(cfg.child("missing").text().is_empty());
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Text<'d, 'a> {
    data: NodeRef<'d, 'a>,
}

impl<'d, 'a> Text<'d, 'a> {
    pub(crate) fn of(node: NodeRef<'d, 'a>) -> Self {
        let data = match node.kind() {
            Some(kind) if kind.is_text() => node,
            Some(_) => node
                .children()
                .find(|c| c.kind().is_some_and(NodeKind::is_text))
                .unwrap_or(NodeRef::null(node.doc)),
            None => node,
        };
        Self { data }
    }

    /// Returns the bound PCDATA/CDATA node, or the null node.
    #[must_use]
    pub fn data(&self) -> NodeRef<'d, 'a> {
        self.data
    }

    /// Returns `true` if no node is bound.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    /// Returns `true` if no node is bound or its value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Returns the raw value, or `""`.
    #[must_use]
    pub fn as_str(&self) -> &'d str {
        self.data.value()
    }

    /// Interprets the value as a boolean; see [`convert::to_bool`].
    #[must_use]
    pub fn as_bool(&self) -> bool {
        convert::to_bool(self.as_str())
    }

    /// Interprets the leading integer as an `i32`; see [`convert::to_i32`].
    #[must_use]
    pub fn as_int(&self) -> i32 {
        convert::to_i32(self.as_str())
    }

    /// Interprets the leading integer as a `u32`.
    #[must_use]
    pub fn as_uint(&self) -> u32 {
        convert::to_u32(self.as_str())
    }

    /// Interprets the leading integer as an `i64`.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        convert::to_i64(self.as_str())
    }

    /// Interprets the leading number as an `f64`.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        convert::to_f64(self.as_str())
    }
}

impl fmt::Display for Text<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Text<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Text({:?})", self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::tree::{Document, NodeType};

    #[test]
    fn test_binds_to_first_text_child() {
        let doc = Document::parse_str("<r><!--c--><a/>first<b/>second</r>").unwrap();
        let text = doc.document_element().text();
        assert_eq!(text.as_str(), "first");
        assert_eq!(text.data().node_type(), NodeType::PcData);
    }

    #[test]
    fn test_binds_to_self_for_text_nodes() {
        let doc = Document::parse_str("<r><![CDATA[ 12 ]]></r>").unwrap();
        let cdata = doc.document_element().first_child();
        assert_eq!(cdata.text().data(), cdata);
        assert_eq!(cdata.text().as_int(), 12);
    }

    #[test]
    fn test_conversions() {
        let doc = Document::parse_str(
            "<r><b>TRUE</b><e></e><n>42abc</n><x>abc</x><f>1.5</f><u>-3</u></r>",
        )
        .unwrap();
        let r = doc.document_element();
        assert!(r.child("b").text().as_bool());
        assert!(!r.child("e").text().as_bool());
        assert_eq!(r.child("n").text().as_int(), 42);
        assert_eq!(r.child("x").text().as_int(), 0);
        assert!((r.child("f").text().as_f64() - 1.5).abs() < f64::EPSILON);
        assert_eq!(r.child("u").text().as_uint(), 0);
        assert_eq!(r.child("u").text().as_i64(), -3);
    }

    #[test]
    fn test_empty_states() {
        let doc = Document::parse_str("<r><e/><t>v</t></r>").unwrap();
        let r = doc.document_element();
        assert!(r.child("e").text().is_empty());
        assert!(r.child("e").text().is_null());
        assert!(r.child("missing").text().is_empty());
        assert!(!r.child("t").text().is_empty());
        assert_eq!(r.child("t").text().to_string(), "v");
    }
}
