//! Depth-first tree walking with early stop.

use std::ops::ControlFlow;

use super::{Document, NodeId, NodeRef};

impl<'a> Document<'a> {
    /// Visits every node below the root in document order (pre-order).
    ///
    /// The visitor receives each node and its depth, where the root's
    /// children are at depth 0. Returning [`ControlFlow::Break`] stops the
    /// walk at once. Returns `true` if every node was visited.
    ///
    /// The walk holds a shared borrow of the document, so the tree cannot
    /// be mutated from inside the visitor.
    ///
    /// ```
    /// use std::ops::ControlFlow;
    /// use xmlarbor::Document;
    ///
    /// let doc = Document::parse_str("<a><b/><c><d/></c></a>").unwrap();
    /// let mut seen = Vec::new();
    /// let completed = doc.traverse(|node, depth| {
    ///     seen.push(format!("{}{}", " ".repeat(depth), node.name()));
    ///     ControlFlow::Continue(())
    /// });
    /// assert!(completed);
    /// assert_eq!(seen, ["a", " b", " c", "  d"]);
    /// ```
    pub fn traverse<'d, F>(&'d self, visit: F) -> bool
    where
        F: FnMut(NodeRef<'d, 'a>, usize) -> ControlFlow<()>,
    {
        self.walk(self.root_index(), visit)
    }

    /// Like [`traverse`](Self::traverse), visiting the descendants of
    /// `start` only. Depth is relative to `start`.
    pub fn traverse_from<'d, F>(&'d self, start: NodeId, visit: F) -> bool
    where
        F: FnMut(NodeRef<'d, 'a>, usize) -> ControlFlow<()>,
    {
        match self.resolve(start) {
            Some(top) => self.walk(top, visit),
            None => true,
        }
    }

    fn walk<'d, F>(&'d self, top: super::arena::SlotIndex, mut visit: F) -> bool
    where
        F: FnMut(NodeRef<'d, 'a>, usize) -> ControlFlow<()>,
    {
        let mut depth = 0usize;
        let mut cur = self.data(top).first_child;
        while let Some(node) = cur {
            if visit(NodeRef::from_index(self, Some(node)), depth).is_break() {
                return false;
            }
            if let Some(child) = self.data(node).first_child {
                depth += 1;
                cur = Some(child);
                continue;
            }
            let mut up = node;
            cur = loop {
                let data = self.data(up);
                if let Some(sibling) = data.next_sibling {
                    break Some(sibling);
                }
                match data.parent {
                    Some(parent) if parent != top => {
                        up = parent;
                        depth -= 1;
                    }
                    _ => break None,
                }
            };
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::ops::ControlFlow;

    use crate::tree::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_visits_every_node_once_with_depth() {
        let doc = Document::parse_str("<r><a><b/></a><c/>text</r>").unwrap();
        let mut seen = Vec::new();
        assert!(doc.traverse(|node, depth| {
            seen.push((node.node_type().as_str(), node.name(), depth));
            ControlFlow::Continue(())
        }));
        assert_eq!(
            seen,
            [
                ("element", "r", 0),
                ("element", "a", 1),
                ("element", "b", 2),
                ("element", "c", 1),
                ("pcdata", "", 1),
            ]
        );
    }

    #[test]
    fn test_early_stop_after_third_node() {
        let doc = Document::parse_str("<r><a/><b/><c/><d/><e/></r>").unwrap();
        let mut calls = 0;
        let completed = doc.traverse(|_, _| {
            calls += 1;
            if calls == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(!completed);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_traverse_from_subtree() {
        let doc = Document::parse_str("<r><a><b/><c/></a><d/></r>").unwrap();
        let a = doc.document_element().child("a").id().unwrap();
        let mut names = Vec::new();
        doc.traverse_from(a, |node, depth| {
            names.push((node.name(), depth));
            ControlFlow::Continue(())
        });
        assert_eq!(names, [("b", 0), ("c", 0)]);
    }

    #[test]
    fn test_empty_document_walk() {
        let doc = Document::new();
        let mut calls = 0;
        assert!(doc.traverse(|_, _| {
            calls += 1;
            ControlFlow::Continue(())
        }));
        assert_eq!(calls, 0);
    }
}
