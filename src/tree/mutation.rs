//! Tree mutation.
//!
//! Creation operations return the new handle or a [`TreeError`] naming
//! the violated precondition. Removal and rename operations return
//! `bool`: `false` means nothing matched or the node kind does not
//! support the change. Removing a node frees its whole subtree and every
//! attribute in it; handles into the removed part become stale.

use std::borrow::Cow;

use super::arena::SlotIndex;
use super::node::{AttrData, NodeData};
use super::{AttrId, Document, NodeId, NodeKind, NodeType};
use crate::error::TreeError;

/// Where a new node or attribute goes relative to its siblings.
#[derive(Debug, Clone, Copy)]
enum Position {
    Last,
    First,
    After(SlotIndex),
    Before(SlotIndex),
}

impl<'a> Document<'a> {
    // --- Child creation ---

    /// Appends a new element named `name` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails if `parent` is stale or cannot have children.
    ///
    /// ```
    /// use xmlarbor::Document;
    ///
    /// let mut doc = Document::new();
    /// let root = doc.root();
    /// let list = doc.append_child(root, "list").unwrap();
    /// doc.append_child(list, "item").unwrap();
    /// assert_eq!(doc.child("list").first_child().name(), "item");
    /// ```
    pub fn append_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, TreeError> {
        self.create_child(parent, element(name), Position::Last)
    }

    /// Prepends a new element named `name` as the first child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails if `parent` is stale or cannot have children.
    pub fn prepend_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, TreeError> {
        self.create_child(parent, element(name), Position::First)
    }

    /// Inserts a new element named `name` right after `anchor`.
    ///
    /// # Errors
    ///
    /// Fails with [`TreeError::NotAChild`] if `anchor` is not a child of
    /// `parent`.
    pub fn insert_child_after(
        &mut self,
        parent: NodeId,
        name: &str,
        anchor: NodeId,
    ) -> Result<NodeId, TreeError> {
        let anchor = self.child_slot(parent, anchor)?;
        self.create_child(parent, element(name), Position::After(anchor))
    }

    /// Inserts a new element named `name` right before `anchor`.
    ///
    /// # Errors
    ///
    /// Fails with [`TreeError::NotAChild`] if `anchor` is not a child of
    /// `parent`.
    pub fn insert_child_before(
        &mut self,
        parent: NodeId,
        name: &str,
        anchor: NodeId,
    ) -> Result<NodeId, TreeError> {
        let anchor = self.child_slot(parent, anchor)?;
        self.create_child(parent, element(name), Position::Before(anchor))
    }

    /// Appends an empty node of any creatable kind.
    ///
    /// # Errors
    ///
    /// `Null` and `Document` cannot be created; a declaration may only be
    /// a child of the document root.
    pub fn append_child_of_type(
        &mut self,
        parent: NodeId,
        node_type: NodeType,
    ) -> Result<NodeId, TreeError> {
        let kind = self.creatable(parent, node_type)?;
        self.create_child(parent, kind, Position::Last)
    }

    /// Prepends an empty node of any creatable kind.
    ///
    /// # Errors
    ///
    /// As for [`append_child_of_type`](Self::append_child_of_type).
    pub fn prepend_child_of_type(
        &mut self,
        parent: NodeId,
        node_type: NodeType,
    ) -> Result<NodeId, TreeError> {
        let kind = self.creatable(parent, node_type)?;
        self.create_child(parent, kind, Position::First)
    }

    // --- Child removal ---

    /// Removes `child` and its subtree from `parent`.
    ///
    /// Returns `false` if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        match self.child_slot(parent, child) {
            Ok(slot) => {
                self.unlink(slot);
                self.free_subtree(slot);
                true
            }
            Err(_) => false,
        }
    }

    /// Removes the first child of `parent` named `name`.
    pub fn remove_child_named(&mut self, parent: NodeId, name: &str) -> bool {
        let found = self.node(parent).child(name).index;
        match found {
            Some(slot) => {
                self.unlink(slot);
                self.free_subtree(slot);
                true
            }
            None => false,
        }
    }

    /// Removes every child of `parent`. Returns `false` if there were none.
    pub fn remove_children(&mut self, parent: NodeId) -> bool {
        let Some(parent) = self.resolve(parent) else {
            return false;
        };
        let mut next = self.nodes[parent].first_child.take();
        self.nodes[parent].last_child = None;
        let removed = next.is_some();
        while let Some(child) = next {
            next = self.nodes[child].next_sibling;
            self.free_subtree(child);
        }
        removed
    }

    // --- Renaming ---

    /// Renames an element, PI or declaration.
    pub fn set_name(&mut self, node: NodeId, name: &str) -> bool {
        let Some(slot) = self.resolve(node) else {
            return false;
        };
        match self.nodes[slot].kind.name_mut() {
            Some(current) => {
                *current = Cow::Owned(name.to_owned());
                true
            }
            None => false,
        }
    }

    /// Sets the value of a PCDATA, CDATA, comment, PI or declaration node.
    ///
    /// Elements have no value; use [`set_text`](Self::set_text) for their
    /// character data.
    pub fn set_value(&mut self, node: NodeId, value: &str) -> bool {
        let Some(slot) = self.resolve(node) else {
            return false;
        };
        match self.nodes[slot].kind.value_mut() {
            Some(current) => {
                *current = Cow::Owned(value.to_owned());
                true
            }
            None => false,
        }
    }

    /// Sets the value of the node's text view, appending a PCDATA child to
    /// an element or document that has none.
    pub fn set_text(&mut self, node: NodeId, value: &str) -> bool {
        let Some(slot) = self.resolve(node) else {
            return false;
        };
        let bound = self.node(node).text().data().index;
        if let Some(bound) = bound {
            if let Some(current) = self.nodes[bound].kind.value_mut() {
                *current = Cow::Owned(value.to_owned());
                return true;
            }
        }
        if !self.nodes[slot].kind.node_type().has_children() {
            return false;
        }
        let pcdata = NodeKind::PcData {
            value: Cow::Owned(value.to_owned()),
        };
        self.push_node(slot, pcdata);
        true
    }

    // --- Attributes ---

    /// Appends an attribute named `name` with an empty value.
    ///
    /// Duplicate names are allowed; lookup by name finds the first.
    ///
    /// # Errors
    ///
    /// Fails if `node` is stale or not an element.
    pub fn append_attribute(&mut self, node: NodeId, name: &str) -> Result<AttrId, TreeError> {
        self.create_attribute(node, name, Position::Last)
    }

    /// Prepends an attribute named `name` with an empty value.
    ///
    /// # Errors
    ///
    /// Fails if `node` is stale or not an element.
    pub fn prepend_attribute(&mut self, node: NodeId, name: &str) -> Result<AttrId, TreeError> {
        self.create_attribute(node, name, Position::First)
    }

    /// Inserts an attribute named `name` right after `anchor`.
    ///
    /// # Errors
    ///
    /// Fails with [`TreeError::NotAnAttribute`] if `anchor` does not
    /// belong to `node`.
    pub fn insert_attribute_after(
        &mut self,
        node: NodeId,
        name: &str,
        anchor: AttrId,
    ) -> Result<AttrId, TreeError> {
        let anchor = self.attr_slot(node, anchor)?;
        self.create_attribute(node, name, Position::After(anchor))
    }

    /// Inserts an attribute named `name` right before `anchor`.
    ///
    /// # Errors
    ///
    /// Fails with [`TreeError::NotAnAttribute`] if `anchor` does not
    /// belong to `node`.
    pub fn insert_attribute_before(
        &mut self,
        node: NodeId,
        name: &str,
        anchor: AttrId,
    ) -> Result<AttrId, TreeError> {
        let anchor = self.attr_slot(node, anchor)?;
        self.create_attribute(node, name, Position::Before(anchor))
    }

    /// Removes `attr` from `node`.
    pub fn remove_attribute(&mut self, node: NodeId, attr: AttrId) -> bool {
        match self.attr_slot(node, attr) {
            Ok(slot) => {
                self.unlink_attr(slot);
                self.attrs.remove(slot);
                true
            }
            Err(_) => false,
        }
    }

    /// Removes the first attribute of `node` named `name`.
    pub fn remove_attribute_named(&mut self, node: NodeId, name: &str) -> bool {
        let Some(attr) = self.node(node).attribute(name).id() else {
            return false;
        };
        self.remove_attribute(node, attr)
    }

    /// Removes every attribute of `node`. Returns `false` if there were
    /// none.
    pub fn remove_attributes(&mut self, node: NodeId) -> bool {
        let Some(slot) = self.resolve(node) else {
            return false;
        };
        let Some(list) = self.nodes[slot].kind.attributes_mut() else {
            return false;
        };
        let mut next = list.first.take();
        list.last = None;
        let removed = next.is_some();
        while let Some(attr) = next {
            next = self.attrs[attr].next;
            self.attrs.remove(attr);
        }
        removed
    }

    /// Renames an attribute.
    pub fn set_attribute_name(&mut self, attr: AttrId, name: &str) -> bool {
        match self.resolve_attr(attr) {
            Some(slot) => {
                self.attrs[slot].name = Cow::Owned(name.to_owned());
                true
            }
            None => false,
        }
    }

    /// Sets an attribute's value.
    pub fn set_attribute_value(&mut self, attr: AttrId, value: &str) -> bool {
        match self.resolve_attr(attr) {
            Some(slot) => {
                self.attrs[slot].value = Cow::Owned(value.to_owned());
                true
            }
            None => false,
        }
    }

    // --- Parser entry points ---

    /// Appends a node below `parent` without checks.
    pub(crate) fn push_node(&mut self, parent: SlotIndex, kind: NodeKind<'a>) -> SlotIndex {
        let slot = self.nodes.insert(NodeData::new(kind));
        self.link(parent, slot, Position::Last);
        slot
    }

    /// Appends an attribute with empty strings to an element without checks.
    pub(crate) fn push_attribute(&mut self, owner: SlotIndex) -> SlotIndex {
        let slot = self.attrs.insert(empty_attr(owner));
        self.link_attr(owner, slot, Position::Last);
        slot
    }

    // --- Internals ---

    fn create_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind<'a>,
        position: Position,
    ) -> Result<NodeId, TreeError> {
        let parent = self.resolve(parent).ok_or(TreeError::StaleHandle)?;
        let parent_type = self.nodes[parent].kind.node_type();
        if !parent_type.has_children() {
            return Err(TreeError::NoChildren(parent_type));
        }
        let slot = self.nodes.insert(NodeData::new(kind));
        self.link(parent, slot, position);
        Ok(self.node_id(slot))
    }

    fn creatable(&self, parent: NodeId, node_type: NodeType) -> Result<NodeKind<'a>, TreeError> {
        let kind = match node_type {
            NodeType::Null | NodeType::Document => None,
            NodeType::Declaration if self.node(parent).node_type() != NodeType::Document => None,
            _ => NodeKind::empty(node_type),
        };
        kind.ok_or(TreeError::InvalidKind(node_type))
    }

    fn create_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        position: Position,
    ) -> Result<AttrId, TreeError> {
        let owner = self.resolve(node).ok_or(TreeError::StaleHandle)?;
        let owner_type = self.nodes[owner].kind.node_type();
        if owner_type != NodeType::Element {
            return Err(TreeError::NoAttributes(owner_type));
        }
        let mut data = empty_attr(owner);
        data.name = Cow::Owned(name.to_owned());
        let slot = self.attrs.insert(data);
        self.link_attr(owner, slot, position);
        Ok(self.attr_id(slot))
    }

    /// Resolves `child` and checks that it hangs directly below `parent`.
    fn child_slot(&self, parent: NodeId, child: NodeId) -> Result<SlotIndex, TreeError> {
        let parent = self.resolve(parent).ok_or(TreeError::StaleHandle)?;
        let child = self.resolve(child).ok_or(TreeError::StaleHandle)?;
        if self.nodes[child].parent == Some(parent) {
            Ok(child)
        } else {
            Err(TreeError::NotAChild)
        }
    }

    fn attr_slot(&self, node: NodeId, attr: AttrId) -> Result<SlotIndex, TreeError> {
        let node = self.resolve(node).ok_or(TreeError::StaleHandle)?;
        let attr = self.resolve_attr(attr).ok_or(TreeError::StaleHandle)?;
        if self.attrs[attr].owner == node {
            Ok(attr)
        } else {
            Err(TreeError::NotAnAttribute)
        }
    }

    fn link(&mut self, parent: SlotIndex, child: SlotIndex, position: Position) {
        let (prev, next) = match position {
            Position::Last => (self.nodes[parent].last_child, None),
            Position::First => (None, self.nodes[parent].first_child),
            Position::After(anchor) => (Some(anchor), self.nodes[anchor].next_sibling),
            Position::Before(anchor) => (self.nodes[anchor].prev_sibling, Some(anchor)),
        };
        let data = &mut self.nodes[child];
        data.parent = Some(parent);
        data.prev_sibling = prev;
        data.next_sibling = next;
        match prev {
            Some(p) => self.nodes[p].next_sibling = Some(child),
            None => self.nodes[parent].first_child = Some(child),
        }
        match next {
            Some(n) => self.nodes[n].prev_sibling = Some(child),
            None => self.nodes[parent].last_child = Some(child),
        }
    }

    fn unlink(&mut self, slot: SlotIndex) {
        let data = &mut self.nodes[slot];
        let (parent, prev, next) = (
            data.parent.take(),
            data.prev_sibling.take(),
            data.next_sibling.take(),
        );
        let Some(parent) = parent else {
            return;
        };
        match prev {
            Some(p) => self.nodes[p].next_sibling = next,
            None => self.nodes[parent].first_child = next,
        }
        match next {
            Some(n) => self.nodes[n].prev_sibling = prev,
            None => self.nodes[parent].last_child = prev,
        }
    }

    /// Frees an already unlinked subtree, iteratively.
    fn free_subtree(&mut self, top: SlotIndex) {
        let mut stack = vec![top];
        while let Some(slot) = stack.pop() {
            let Some(data) = self.nodes.remove(slot) else {
                continue;
            };
            let mut attr = data.kind.attributes().and_then(|list| list.first);
            while let Some(a) = attr {
                attr = self.attrs[a].next;
                self.attrs.remove(a);
            }
            let mut child = data.first_child;
            while let Some(c) = child {
                child = self.nodes[c].next_sibling;
                stack.push(c);
            }
        }
    }

    fn link_attr(&mut self, owner: SlotIndex, attr: SlotIndex, position: Position) {
        let Some(list) = self.nodes[owner].kind.attributes() else {
            return;
        };
        let (prev, next) = match position {
            Position::Last => (list.last, None),
            Position::First => (None, list.first),
            Position::After(anchor) => (Some(anchor), self.attrs[anchor].next),
            Position::Before(anchor) => (self.attrs[anchor].prev, Some(anchor)),
        };
        let data = &mut self.attrs[attr];
        data.owner = owner;
        data.prev = prev;
        data.next = next;
        if let Some(p) = prev {
            self.attrs[p].next = Some(attr);
        }
        if let Some(n) = next {
            self.attrs[n].prev = Some(attr);
        }
        if let Some(list) = self.nodes[owner].kind.attributes_mut() {
            if prev.is_none() {
                list.first = Some(attr);
            }
            if next.is_none() {
                list.last = Some(attr);
            }
        }
    }

    fn unlink_attr(&mut self, attr: SlotIndex) {
        let AttrData {
            owner, prev, next, ..
        } = self.attrs[attr];
        if let Some(p) = prev {
            self.attrs[p].next = next;
        }
        if let Some(n) = next {
            self.attrs[n].prev = prev;
        }
        if let Some(list) = self.nodes[owner].kind.attributes_mut() {
            if prev.is_none() {
                list.first = next;
            }
            if next.is_none() {
                list.last = prev;
            }
        }
    }
}

fn element(name: &str) -> NodeKind<'static> {
    NodeKind::Element {
        name: Cow::Owned(name.to_owned()),
        attributes: super::AttrList::default(),
    }
}

fn empty_attr<'a>(owner: SlotIndex) -> AttrData<'a> {
    AttrData {
        name: Cow::Borrowed(""),
        value: Cow::Borrowed(""),
        owner,
        prev: None,
        next: None,
    }
}
