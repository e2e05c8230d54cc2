//! Arena-based XML document tree.
//!
//! All nodes and attributes live in two arenas owned by the [`Document`]
//! and are referenced by [`NodeId`] / [`AttrId`] handles. Navigation links
//! (parent, first/last child, next/previous sibling, attribute chains) are
//! plain slot indices, so the tree has no reference counting and no
//! ownership cycles; dropping the `Document` frees everything.
//!
//! # Handles
//!
//! A handle carries the slot index, the slot's generation at the time the
//! handle was minted, and a tag identifying the document load it came
//! from. Removing a node bumps the generation of every freed slot and
//! reloading a document assigns a fresh tag, so stale handles are always
//! detected. Using one is a programming error: debug builds panic, release
//! builds treat the handle as null (navigation yields empty views and
//! mutation fails). [`Document::contains`] checks liveness without
//! asserting.
//!
//! # Views
//!
//! [`NodeRef`] and [`AttrRef`] borrow the document and make navigation
//! total: every step returns a (possibly null) view, so chains like
//! `doc.child("config").child("port").text().as_int()` never fail.

mod arena;
mod handle;
mod mutation;
mod node;
mod text;
mod walk;

pub use handle::{AttrRef, Attributes, Children, Descendants, NodeRef};
pub use node::{AttrList, NodeKind, NodeType};
pub use text::Text;

use std::borrow::Cow;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

pub(crate) use arena::SlotIndex;

use arena::Arena;
use node::{AttrData, NodeData};

use crate::encoding::decode_to_utf8;
use crate::error::{ParseError, ParseResult};
use crate::parser::{self, ParseOptions};

/// Source of per-load document tags.
static NEXT_TAG: AtomicU32 = AtomicU32::new(1);

fn next_tag() -> u32 {
    NEXT_TAG.fetch_add(1, Ordering::Relaxed)
}

/// A handle to a node in a [`Document`].
///
/// Handles are `Copy` and compare equal iff they name the same node of
/// the same document load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    tag: u32,
    index: SlotIndex,
    generation: u32,
}

/// A handle to an attribute in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttrId {
    tag: u32,
    index: SlotIndex,
    generation: u32,
}

/// The string slot a parsed range is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StrTarget {
    NodeName(SlotIndex),
    NodeValue(SlotIndex),
    AttrName(SlotIndex),
    AttrValue(SlotIndex),
}

/// An XML document.
///
/// The lifetime `'a` bounds strings borrowed from an in-place buffer
/// (see [`Document::load_buffer_inplace`]); documents built by copying
/// loads or by mutation alone can be `Document<'static>`.
///
/// # Examples
///
/// ```
/// use xmlarbor::Document;
///
/// let doc = Document::parse_str("<root><port>8080</port></root>").unwrap();
/// let root = doc.document_element();
/// assert_eq!(root.name(), "root");
/// assert_eq!(root.child("port").text().as_int(), 8080);
/// ```
#[derive(Debug)]
pub struct Document<'a> {
    tag: u32,
    nodes: Arena<NodeData<'a>>,
    attrs: Arena<AttrData<'a>>,
    root: SlotIndex,
}

impl<'a> Document<'a> {
    /// Creates a new empty document holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let root = nodes.insert(NodeData::new(NodeKind::Document));
        Self {
            tag: next_tag(),
            nodes,
            attrs: Arena::new(),
            root,
        }
    }

    /// Discards the whole tree. Every outstanding handle becomes stale.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Parses a string with default options.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the input is not well-formed.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmlarbor::Document;
    ///
    /// let doc = Document::parse_str("<root>hello</root>").unwrap();
    /// assert_eq!(doc.document_element().child_value(), "hello");
    /// ```
    pub fn parse_str(text: &str) -> Result<Document<'static>, ParseError> {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        let mut doc = Document::new();
        doc.load_str(text).into_result(text)?;
        Ok(doc)
    }

    /// Parses raw bytes, detecting the encoding.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the input is not well-formed. The error
    /// location refers to the decoded text.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Document<'static>, ParseError> {
        let mut doc = Document::new();
        let result = doc.load_buffer(bytes);
        if !result.is_ok() {
            let (_, bom) = crate::encoding::detect_encoding(bytes);
            let text = decode_to_utf8(&bytes[bom..], result.encoding);
            result.into_result(&text)?;
        }
        Ok(doc)
    }

    // --- Loading ---

    /// Replaces the tree with the contents of `text`, copying every string.
    pub fn load_str(&mut self, text: &str) -> ParseResult {
        self.load_str_with_options(text, &ParseOptions::default())
    }

    /// Like [`load_str`](Self::load_str) with explicit options.
    pub fn load_str_with_options(&mut self, text: &str, options: &ParseOptions) -> ParseResult {
        parser::load_str(self, text, options)
    }

    /// Replaces the tree with the contents of a borrowed byte buffer in
    /// any supported encoding, copying every string.
    pub fn load_buffer(&mut self, bytes: &[u8]) -> ParseResult {
        self.load_buffer_with_options(bytes, &ParseOptions::default())
    }

    /// Like [`load_buffer`](Self::load_buffer) with explicit options.
    pub fn load_buffer_with_options(&mut self, bytes: &[u8], options: &ParseOptions) -> ParseResult {
        parser::load_bytes(self, bytes, options)
    }

    /// Parses `bytes` in fragment mode: any number of top-level nodes,
    /// including text, is accepted.
    pub fn load_buffer_fragment(&mut self, bytes: &[u8]) -> ParseResult {
        self.load_buffer_with_options(bytes, &ParseOptions::default().fragment(true))
    }

    /// Parses `buf` in place without copying.
    ///
    /// References and line endings are decoded by rewriting `buf`, and the
    /// resulting strings borrow from it, so the buffer stays borrowed for
    /// as long as the document lives. Non-UTF-8 sources are transcoded
    /// into a private copy instead.
    ///
    /// ```
    /// use xmlarbor::Document;
    ///
    /// let mut buf = b"<a x='1 &amp; 2'/>".to_vec();
    /// let mut doc = Document::new();
    /// assert!(doc.load_buffer_inplace(&mut buf).is_ok());
    /// assert_eq!(doc.document_element().attribute("x").value(), "1 & 2");
    /// ```
    pub fn load_buffer_inplace(&mut self, buf: &'a mut [u8]) -> ParseResult {
        self.load_buffer_inplace_with_options(buf, &ParseOptions::default())
    }

    /// Like [`load_buffer_inplace`](Self::load_buffer_inplace) with
    /// explicit options.
    pub fn load_buffer_inplace_with_options(
        &mut self,
        buf: &'a mut [u8],
        options: &ParseOptions,
    ) -> ParseResult {
        parser::load_in_place(self, buf, options)
    }

    /// Reads and parses a file. A missing file yields
    /// [`ParseStatus::FileNotFound`](crate::ParseStatus::FileNotFound),
    /// any other read failure `IoError`.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ParseResult {
        self.load_file_with_options(path, &ParseOptions::default())
    }

    /// Like [`load_file`](Self::load_file) with explicit options.
    pub fn load_file_with_options(
        &mut self,
        path: impl AsRef<Path>,
        options: &ParseOptions,
    ) -> ParseResult {
        parser::load_file(self, path.as_ref(), options)
    }

    // --- Handles and views ---

    /// Returns the document root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.node_id(self.root)
    }

    /// Returns a view of the document root.
    #[must_use]
    pub fn root_node(&self) -> NodeRef<'_, 'a> {
        NodeRef::from_index(self, Some(self.root))
    }

    /// Returns a view of `id`; null if the handle is stale.
    #[must_use]
    pub fn node(&self, id: NodeId) -> NodeRef<'_, 'a> {
        NodeRef::from_index(self, self.resolve(id))
    }

    /// Returns a view of the attribute `id`; null if the handle is stale.
    #[must_use]
    pub fn attr(&self, id: AttrId) -> AttrRef<'_, 'a> {
        AttrRef::from_index(self, self.resolve_attr(id))
    }

    /// Returns the first element child of the root.
    #[must_use]
    pub fn document_element(&self) -> NodeRef<'_, 'a> {
        self.root_node()
            .children()
            .find(|n| n.node_type() == NodeType::Element)
            .unwrap_or_else(|| NodeRef::null(self))
    }

    /// Returns the first child of the root named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> NodeRef<'_, 'a> {
        self.root_node().child(name)
    }

    /// Returns `true` if `id` names a live node of this document.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.tag == self.tag && self.nodes.generation(id.index) == Some(id.generation)
    }

    /// Returns `true` if `id` names a live attribute of this document.
    #[must_use]
    pub fn contains_attribute(&self, id: AttrId) -> bool {
        id.tag == self.tag && self.attrs.generation(id.index) == Some(id.generation)
    }

    /// Number of live nodes, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live attributes.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.attrs.len()
    }

    // --- Id-based navigation ---

    /// Returns the node's type, `Null` for a stale handle.
    #[must_use]
    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.node(id).node_type()
    }

    /// Returns the node's payload.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind<'a>> {
        self.resolve(id).map(|index| &self.nodes[index].kind)
    }

    /// Returns the node's name, or `""` for kinds without one.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.node(id).name()
    }

    /// Returns the node's value, or `""` for kinds without one.
    #[must_use]
    pub fn value(&self, id: NodeId) -> &str {
        self.node(id).value()
    }

    /// Returns the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent().id()
    }

    /// Returns the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child().id()
    }

    /// Returns the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child().id()
    }

    /// Returns the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling().id()
    }

    /// Returns the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).previous_sibling().id()
    }

    /// Returns an iterator over views of the children of a node.
    pub fn children(&self, id: NodeId) -> Children<'_, 'a> {
        self.node(id).children()
    }

    /// Returns the first attribute of `id` named `name`.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<AttrId> {
        self.node(id).attribute(name).id()
    }

    /// Returns an attribute's name, or `""` for a stale handle.
    #[must_use]
    pub fn attribute_name(&self, id: AttrId) -> &str {
        self.attr(id).name()
    }

    /// Returns an attribute's value, or `""` for a stale handle.
    #[must_use]
    pub fn attribute_value(&self, id: AttrId) -> &str {
        self.attr(id).value()
    }

    // --- Internal plumbing ---

    pub(crate) fn resolve(&self, id: NodeId) -> Option<SlotIndex> {
        let live = self.contains(id);
        debug_assert!(live, "stale or foreign node handle {id:?}");
        live.then_some(id.index)
    }

    pub(crate) fn resolve_attr(&self, id: AttrId) -> Option<SlotIndex> {
        let live = self.contains_attribute(id);
        debug_assert!(live, "stale or foreign attribute handle {id:?}");
        live.then_some(id.index)
    }

    pub(crate) fn node_id(&self, index: SlotIndex) -> NodeId {
        NodeId {
            tag: self.tag,
            index,
            generation: self.nodes.generation(index).unwrap_or_default(),
        }
    }

    pub(crate) fn attr_id(&self, index: SlotIndex) -> AttrId {
        AttrId {
            tag: self.tag,
            index,
            generation: self.attrs.generation(index).unwrap_or_default(),
        }
    }

    pub(crate) fn root_index(&self) -> SlotIndex {
        self.root
    }

    pub(crate) fn data(&self, index: SlotIndex) -> &NodeData<'a> {
        &self.nodes[index]
    }

    pub(crate) fn attr_data(&self, index: SlotIndex) -> &AttrData<'a> {
        &self.attrs[index]
    }

    /// Stores a string produced by the parser.
    pub(crate) fn set_raw_string(&mut self, target: StrTarget, text: Cow<'a, str>) {
        let slot = match target {
            StrTarget::NodeName(index) => self.nodes[index].kind.name_mut(),
            StrTarget::NodeValue(index) => self.nodes[index].kind.value_mut(),
            StrTarget::AttrName(index) => Some(&mut self.attrs[index].name),
            StrTarget::AttrValue(index) => Some(&mut self.attrs[index].value),
        };
        if let Some(slot) = slot {
            *slot = text;
        }
    }
}

impl Default for Document<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ParseStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_document_has_root() {
        let doc = Document::new();
        assert_eq!(doc.node_type(doc.root()), NodeType::Document);
        assert_eq!(doc.node_count(), 1);
        assert!(doc.document_element().is_null());
    }

    #[test]
    fn test_parse_str_simple_element() {
        let Ok(doc) = Document::parse_str("<root/>") else {
            panic!("failed to parse simple element");
        };
        let root = doc.document_element();
        assert_eq!(root.name(), "root");
        assert_eq!(doc.name(root.id().unwrap()), "root");
    }

    #[test]
    fn test_parse_str_nested_elements() {
        let Ok(doc) = Document::parse_str("<parent><child/></parent>") else {
            panic!("failed to parse nested elements");
        };
        let root = doc.document_element().id().unwrap();
        let Some(child) = doc.first_child(root) else {
            panic!("root element has no children");
        };
        assert_eq!(doc.name(child), "child");
        assert_eq!(doc.parent(child), Some(root));
    }

    #[test]
    fn test_parse_str_error_location() {
        let Err(err) = Document::parse_str("<a>\n<b></a>") else {
            panic!("mismatched tags parsed");
        };
        assert_eq!(err.status, ParseStatus::EndElementMismatch);
        assert_eq!(err.location.line, 2);
    }

    #[test]
    fn test_parse_bytes_with_bom() {
        let mut input = vec![0xEF, 0xBB, 0xBF];
        input.extend_from_slice(b"<root/>");
        let Ok(doc) = Document::parse_bytes(&input) else {
            panic!("failed to parse bytes with BOM");
        };
        assert_eq!(doc.document_element().name(), "root");
    }

    #[test]
    fn test_reload_makes_old_handles_stale() {
        let mut doc = Document::new();
        assert!(doc.load_str("<a/>").is_ok());
        let old = doc.document_element().id().unwrap();
        assert!(doc.contains(old));
        assert!(doc.load_str("<a/>").is_ok());
        assert!(!doc.contains(old));
        assert_ne!(doc.document_element().id(), Some(old));
    }

    #[test]
    fn test_handles_from_other_documents_are_foreign() {
        let a = Document::parse_str("<a/>").unwrap();
        let b = Document::parse_str("<a/>").unwrap();
        let id = a.document_element().id().unwrap();
        assert!(a.contains(id));
        assert!(!b.contains(id));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "stale or foreign node handle")]
    fn test_stale_handle_asserts_in_debug() {
        let a = Document::parse_str("<a/>").unwrap();
        let b = Document::parse_str("<a/>").unwrap();
        let id = a.document_element().id().unwrap();
        let _ = b.node(id);
    }

    #[test]
    fn test_document_child_searches_root() {
        let doc = Document::parse_str("<cfg><x/></cfg>").unwrap();
        assert_eq!(doc.child("cfg").name(), "cfg");
        assert!(doc.child("x").is_null());
    }

    #[test]
    fn test_kind_payload() {
        let doc = Document::parse_str("<r>text</r>").unwrap();
        let text = doc.document_element().first_child().id().unwrap();
        assert_eq!(
            doc.kind(text),
            Some(&NodeKind::PcData {
                value: Cow::Borrowed("text")
            })
        );
    }
}
