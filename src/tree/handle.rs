//! Borrowed node and attribute views.
//!
//! A view pairs a document borrow with an optional slot. The null view
//! (no slot) is a valid value: every accessor on it returns an empty
//! answer, so navigation chains never need intermediate checks.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::arena::SlotIndex;
use super::{AttrId, Document, NodeId, NodeKind, NodeType, Text};

/// A borrowed view of a node, or the null node.
///
/// Two views are equal iff they denote the same node of the same
/// document; all null views are equal.
#[derive(Clone, Copy)]
pub struct NodeRef<'d, 'a> {
    pub(crate) doc: &'d Document<'a>,
    pub(crate) index: Option<SlotIndex>,
}

impl<'d, 'a> NodeRef<'d, 'a> {
    pub(crate) fn from_index(doc: &'d Document<'a>, index: Option<SlotIndex>) -> Self {
        Self { doc, index }
    }

    pub(crate) fn null(doc: &'d Document<'a>) -> Self {
        Self { doc, index: None }
    }

    fn step(&self, link: impl FnOnce(SlotIndex) -> Option<SlotIndex>) -> Self {
        Self::from_index(self.doc, self.index.and_then(link))
    }

    /// Returns the handle, or `None` for the null view.
    #[must_use]
    pub fn id(&self) -> Option<NodeId> {
        self.index.map(|index| self.doc.node_id(index))
    }

    /// Returns the owning document.
    #[must_use]
    pub fn document(&self) -> &'d Document<'a> {
        self.doc
    }

    /// Returns `true` for the null view.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.index.is_none()
    }

    /// Returns `true` for the null view and for elements with an empty
    /// name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.kind() {
            None => true,
            Some(NodeKind::Element { name, .. }) => name.is_empty(),
            Some(_) => false,
        }
    }

    /// Returns the node's payload.
    #[must_use]
    pub fn kind(&self) -> Option<&'d NodeKind<'a>> {
        self.index.map(|index| &self.doc.data(index).kind)
    }

    /// Returns the node's type, `Null` for the null view.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.kind().map_or(NodeType::Null, NodeKind::node_type)
    }

    /// Returns the node's name, or `""` if it has none.
    #[must_use]
    pub fn name(&self) -> &'d str {
        self.kind().and_then(NodeKind::name).unwrap_or("")
    }

    /// Returns the node's value, or `""` if it has none.
    ///
    /// Elements have no value of their own; see
    /// [`child_value`](Self::child_value).
    #[must_use]
    pub fn value(&self) -> &'d str {
        self.kind().and_then(NodeKind::value).unwrap_or("")
    }

    // --- Links ---

    /// Returns the parent node.
    #[must_use]
    pub fn parent(&self) -> Self {
        self.step(|i| self.doc.data(i).parent)
    }

    /// Returns the first child.
    #[must_use]
    pub fn first_child(&self) -> Self {
        self.step(|i| self.doc.data(i).first_child)
    }

    /// Returns the last child.
    #[must_use]
    pub fn last_child(&self) -> Self {
        self.step(|i| self.doc.data(i).last_child)
    }

    /// Returns the next sibling.
    #[must_use]
    pub fn next_sibling(&self) -> Self {
        self.step(|i| self.doc.data(i).next_sibling)
    }

    /// Returns the previous sibling.
    #[must_use]
    pub fn previous_sibling(&self) -> Self {
        self.step(|i| self.doc.data(i).prev_sibling)
    }

    /// Returns the document root.
    #[must_use]
    pub fn root(&self) -> Self {
        self.step(|_| Some(self.doc.root_index()))
    }

    // --- Name-filtered links ---

    fn find_forward(&self, start: Option<SlotIndex>, name: &str) -> Self {
        let mut cur = start;
        while let Some(i) = cur {
            let data = self.doc.data(i);
            if data.kind.name() == Some(name) {
                return Self::from_index(self.doc, Some(i));
            }
            cur = data.next_sibling;
        }
        Self::null(self.doc)
    }

    fn find_backward(&self, start: Option<SlotIndex>, name: &str) -> Self {
        let mut cur = start;
        while let Some(i) = cur {
            let data = self.doc.data(i);
            if data.kind.name() == Some(name) {
                return Self::from_index(self.doc, Some(i));
            }
            cur = data.prev_sibling;
        }
        Self::null(self.doc)
    }

    /// Returns the first child named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let start = self.index.and_then(|i| self.doc.data(i).first_child);
        self.find_forward(start, name)
    }

    /// Returns the last child named `name`.
    #[must_use]
    pub fn last_child_named(&self, name: &str) -> Self {
        let start = self.index.and_then(|i| self.doc.data(i).last_child);
        self.find_backward(start, name)
    }

    /// Returns the next sibling named `name`, skipping others.
    #[must_use]
    pub fn next_sibling_named(&self, name: &str) -> Self {
        let start = self.index.and_then(|i| self.doc.data(i).next_sibling);
        self.find_forward(start, name)
    }

    /// Returns the previous sibling named `name`, skipping others.
    #[must_use]
    pub fn previous_sibling_named(&self, name: &str) -> Self {
        let start = self.index.and_then(|i| self.doc.data(i).prev_sibling);
        self.find_backward(start, name)
    }

    /// Returns the value of the first PCDATA or CDATA child, or `""`.
    #[must_use]
    pub fn child_value(&self) -> &'d str {
        self.children()
            .find(|c| c.kind().is_some_and(NodeKind::is_text))
            .map_or("", |c| c.value())
    }

    /// Returns [`child_value`](Self::child_value) of the first child named
    /// `name`.
    #[must_use]
    pub fn child_value_named(&self, name: &str) -> &'d str {
        self.child(name).child_value()
    }

    /// Returns a text view of this node.
    #[must_use]
    pub fn text(&self) -> Text<'d, 'a> {
        Text::of(*self)
    }

    // --- Attributes ---

    fn attr_list(&self) -> Option<&'d super::AttrList> {
        self.kind().and_then(NodeKind::attributes)
    }

    /// Returns the first attribute.
    #[must_use]
    pub fn first_attribute(&self) -> AttrRef<'d, 'a> {
        AttrRef::from_index(self.doc, self.attr_list().and_then(|l| l.first))
    }

    /// Returns the last attribute.
    #[must_use]
    pub fn last_attribute(&self) -> AttrRef<'d, 'a> {
        AttrRef::from_index(self.doc, self.attr_list().and_then(|l| l.last))
    }

    /// Returns the first attribute named `name`.
    ///
    /// Later attributes with the same name are only reachable by walking
    /// the list.
    #[must_use]
    pub fn attribute(&self, name: &str) -> AttrRef<'d, 'a> {
        self.attributes()
            .find(|a| a.name() == name)
            .unwrap_or(AttrRef::from_index(self.doc, None))
    }

    // --- Iteration ---

    /// Iterates over the children.
    #[must_use]
    pub fn children(&self) -> Children<'d, 'a> {
        Children {
            doc: self.doc,
            next: self.index.and_then(|i| self.doc.data(i).first_child),
        }
    }

    /// Iterates over the attributes in list order.
    #[must_use]
    pub fn attributes(&self) -> Attributes<'d, 'a> {
        Attributes {
            doc: self.doc,
            next: self.attr_list().and_then(|l| l.first),
        }
    }

    /// Iterates over all descendants in document order, excluding `self`.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'d, 'a> {
        Descendants {
            doc: self.doc,
            root: self.index,
            next: self.index.and_then(|i| self.doc.data(i).first_child),
        }
    }
}

impl PartialEq for NodeRef<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        (std::ptr::eq(self.doc, other.doc) && self.index == other.index)
            || (self.index.is_none() && other.index.is_none())
    }
}

impl Eq for NodeRef<'_, '_> {}

impl Hash for NodeRef<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.index {
            Some(index) => {
                std::ptr::hash(self.doc, state);
                index.hash(state);
            }
            None => 0u32.hash(state),
        }
    }
}

impl fmt::Debug for NodeRef<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            None => f.write_str("NodeRef(null)"),
            Some(kind) => write!(
                f,
                "NodeRef({}, name={:?}, value={:?})",
                kind.node_type(),
                self.name(),
                self.value()
            ),
        }
    }
}

/// A borrowed view of an attribute, or the null attribute.
#[derive(Clone, Copy)]
pub struct AttrRef<'d, 'a> {
    doc: &'d Document<'a>,
    index: Option<SlotIndex>,
}

impl<'d, 'a> AttrRef<'d, 'a> {
    pub(crate) fn from_index(doc: &'d Document<'a>, index: Option<SlotIndex>) -> Self {
        Self { doc, index }
    }

    /// Returns the handle, or `None` for the null view.
    #[must_use]
    pub fn id(&self) -> Option<AttrId> {
        self.index.map(|index| self.doc.attr_id(index))
    }

    /// Returns `true` for the null view.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.index.is_none()
    }

    /// Returns `true` for the null view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_null()
    }

    /// Returns the name, or `""` for the null view.
    #[must_use]
    pub fn name(&self) -> &'d str {
        self.index.map_or("", |i| &*self.doc.attr_data(i).name)
    }

    /// Returns the value, or `""` for the null view.
    #[must_use]
    pub fn value(&self) -> &'d str {
        self.index.map_or("", |i| &*self.doc.attr_data(i).value)
    }

    /// Returns the element the attribute belongs to.
    #[must_use]
    pub fn owner(&self) -> NodeRef<'d, 'a> {
        NodeRef::from_index(self.doc, self.index.map(|i| self.doc.attr_data(i).owner))
    }

    /// Returns the next attribute of the same element.
    #[must_use]
    pub fn next_attribute(&self) -> Self {
        Self::from_index(self.doc, self.index.and_then(|i| self.doc.attr_data(i).next))
    }

    /// Returns the previous attribute of the same element.
    #[must_use]
    pub fn previous_attribute(&self) -> Self {
        Self::from_index(self.doc, self.index.and_then(|i| self.doc.attr_data(i).prev))
    }

    /// Interprets the value as a boolean; see [`crate::util::convert::to_bool`].
    #[must_use]
    pub fn as_bool(&self) -> bool {
        crate::util::convert::to_bool(self.value())
    }

    /// Interprets the value as an `i32`; see [`crate::util::convert::to_i32`].
    #[must_use]
    pub fn as_int(&self) -> i32 {
        crate::util::convert::to_i32(self.value())
    }

    /// Interprets the value as a `u32`.
    #[must_use]
    pub fn as_uint(&self) -> u32 {
        crate::util::convert::to_u32(self.value())
    }

    /// Interprets the value as an `i64`.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        crate::util::convert::to_i64(self.value())
    }

    /// Interprets the value as an `f64`.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        crate::util::convert::to_f64(self.value())
    }
}

impl PartialEq for AttrRef<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        (std::ptr::eq(self.doc, other.doc) && self.index == other.index)
            || (self.index.is_none() && other.index.is_none())
    }
}

impl Eq for AttrRef<'_, '_> {}

impl fmt::Debug for AttrRef<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("AttrRef(null)")
        } else {
            write!(f, "AttrRef({:?}={:?})", self.name(), self.value())
        }
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
pub struct Children<'d, 'a> {
    doc: &'d Document<'a>,
    next: Option<SlotIndex>,
}

impl<'d, 'a> Iterator for Children<'d, 'a> {
    type Item = NodeRef<'d, 'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.data(current).next_sibling;
        Some(NodeRef::from_index(self.doc, Some(current)))
    }
}

/// Iterator over the attributes of an element.
pub struct Attributes<'d, 'a> {
    doc: &'d Document<'a>,
    next: Option<SlotIndex>,
}

impl<'d, 'a> Iterator for Attributes<'d, 'a> {
    type Item = AttrRef<'d, 'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.attr_data(current).next;
        Some(AttrRef::from_index(self.doc, Some(current)))
    }
}

/// Depth-first iterator over all descendants of a node.
pub struct Descendants<'d, 'a> {
    doc: &'d Document<'a>,
    root: Option<SlotIndex>,
    next: Option<SlotIndex>,
}

impl<'d, 'a> Iterator for Descendants<'d, 'a> {
    type Item = NodeRef<'d, 'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let data = self.doc.data(current);

        // Try to go deeper first
        if let Some(child) = data.first_child {
            self.next = Some(child);
            return Some(NodeRef::from_index(self.doc, Some(current)));
        }

        // Walk up to find an ancestor with a next sibling
        let mut node = current;
        self.next = loop {
            if Some(node) == self.root {
                break None;
            }
            let data = self.doc.data(node);
            if let Some(sibling) = data.next_sibling {
                break Some(sibling);
            }
            match data.parent {
                Some(parent) => node = parent,
                None => break None,
            }
        };
        Some(NodeRef::from_index(self.doc, Some(current)))
    }
}
