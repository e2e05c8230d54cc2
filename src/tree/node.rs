//! Node type definitions.
//!
//! The `NodeKind` enum represents all node types in a document tree. Each
//! variant carries only the payload meaningful for that kind, so "this
//! kind has no name" is a match arm rather than an empty field.

use std::borrow::Cow;
use std::fmt;

use super::arena::SlotIndex;

/// The closed set of node kinds, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeType {
    /// The empty handle.
    #[default]
    Null,
    /// The implicit document root.
    Document,
    /// An element, e.g. `<item id="1">`.
    Element,
    /// Parsed character data.
    PcData,
    /// A CDATA section.
    CData,
    /// A comment.
    Comment,
    /// A processing instruction, e.g. `<?target data?>`.
    Pi,
    /// The XML declaration, `<?xml ...?>`.
    Declaration,
}

impl NodeType {
    /// Returns the lowercase name used in diagnostics and debug dumps.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Document => "document",
            Self::Element => "element",
            Self::PcData => "pcdata",
            Self::CData => "cdata",
            Self::Comment => "comment",
            Self::Pi => "pi",
            Self::Declaration => "declaration",
        }
    }

    /// Returns `true` for kinds that own a child sequence.
    #[must_use]
    pub fn has_children(self) -> bool {
        matches!(self, Self::Document | Self::Element)
    }

    /// Returns `true` for kinds that carry a name.
    #[must_use]
    pub fn has_name(self) -> bool {
        matches!(self, Self::Element | Self::Pi | Self::Declaration)
    }

    /// Returns `true` for kinds that carry a value.
    #[must_use]
    pub fn has_value(self) -> bool {
        matches!(
            self,
            Self::PcData | Self::CData | Self::Comment | Self::Pi | Self::Declaration
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Head and tail of an element's attribute list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttrList {
    pub(crate) first: Option<SlotIndex>,
    pub(crate) last: Option<SlotIndex>,
}

impl AttrList {
    /// Returns `true` if the list holds no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }
}

/// The kind of a node and its payload.
///
/// Navigation links (parent, children, siblings) are stored alongside in
/// the arena, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind<'a> {
    /// The document root; exactly one per `Document`.
    Document,
    /// An element node.
    Element {
        /// Tag name as written.
        name: Cow<'a, str>,
        /// Ordered attribute list.
        attributes: AttrList,
    },
    /// Character data (already decoded).
    PcData {
        /// The text.
        value: Cow<'a, str>,
    },
    /// A CDATA section (no escaping applied).
    CData {
        /// The section content.
        value: Cow<'a, str>,
    },
    /// A comment (without the `<!--` and `-->` delimiters).
    Comment {
        /// The comment text.
        value: Cow<'a, str>,
    },
    /// A processing instruction.
    Pi {
        /// The target.
        name: Cow<'a, str>,
        /// Everything after the target, trimmed.
        value: Cow<'a, str>,
    },
    /// The XML declaration.
    Declaration {
        /// Always `xml` when parsed.
        name: Cow<'a, str>,
        /// The raw pseudo-attribute text.
        value: Cow<'a, str>,
    },
}

impl<'a> NodeKind<'a> {
    /// Creates an empty payload of the given type, or `None` for `Null`.
    pub(crate) fn empty(node_type: NodeType) -> Option<Self> {
        Some(match node_type {
            NodeType::Null => return None,
            NodeType::Document => Self::Document,
            NodeType::Element => Self::Element {
                name: Cow::Borrowed(""),
                attributes: AttrList::default(),
            },
            NodeType::PcData => Self::PcData {
                value: Cow::Borrowed(""),
            },
            NodeType::CData => Self::CData {
                value: Cow::Borrowed(""),
            },
            NodeType::Comment => Self::Comment {
                value: Cow::Borrowed(""),
            },
            NodeType::Pi => Self::Pi {
                name: Cow::Borrowed(""),
                value: Cow::Borrowed(""),
            },
            NodeType::Declaration => Self::Declaration {
                name: Cow::Borrowed(""),
                value: Cow::Borrowed(""),
            },
        })
    }

    /// Returns the payload-free type.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Document => NodeType::Document,
            Self::Element { .. } => NodeType::Element,
            Self::PcData { .. } => NodeType::PcData,
            Self::CData { .. } => NodeType::CData,
            Self::Comment { .. } => NodeType::Comment,
            Self::Pi { .. } => NodeType::Pi,
            Self::Declaration { .. } => NodeType::Declaration,
        }
    }

    /// Returns the name for kinds that have one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Element { name, .. } | Self::Pi { name, .. } | Self::Declaration { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Returns the value for kinds that have one.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::PcData { value }
            | Self::CData { value }
            | Self::Comment { value }
            | Self::Pi { value, .. }
            | Self::Declaration { value, .. } => Some(value),
            _ => None,
        }
    }

    pub(crate) fn name_mut(&mut self) -> Option<&mut Cow<'a, str>> {
        match self {
            Self::Element { name, .. } | Self::Pi { name, .. } | Self::Declaration { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    pub(crate) fn value_mut(&mut self) -> Option<&mut Cow<'a, str>> {
        match self {
            Self::PcData { value }
            | Self::CData { value }
            | Self::Comment { value }
            | Self::Pi { value, .. }
            | Self::Declaration { value, .. } => Some(value),
            _ => None,
        }
    }

    pub(crate) fn attributes(&self) -> Option<&AttrList> {
        match self {
            Self::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub(crate) fn attributes_mut(&mut self) -> Option<&mut AttrList> {
        match self {
            Self::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Returns `true` for PCDATA and CDATA, the kinds a text view binds to.
    pub(crate) fn is_text(&self) -> bool {
        matches!(self, Self::PcData { .. } | Self::CData { .. })
    }
}

/// Storage for one node: payload plus navigation links.
#[derive(Debug, Clone)]
pub(crate) struct NodeData<'a> {
    pub kind: NodeKind<'a>,
    pub parent: Option<SlotIndex>,
    pub first_child: Option<SlotIndex>,
    pub last_child: Option<SlotIndex>,
    pub next_sibling: Option<SlotIndex>,
    pub prev_sibling: Option<SlotIndex>,
}

impl<'a> NodeData<'a> {
    pub fn new(kind: NodeKind<'a>) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// Storage for one attribute.
#[derive(Debug, Clone)]
pub(crate) struct AttrData<'a> {
    pub name: Cow<'a, str>,
    pub value: Cow<'a, str>,
    pub owner: SlotIndex,
    pub prev: Option<SlotIndex>,
    pub next: Option<SlotIndex>,
}
