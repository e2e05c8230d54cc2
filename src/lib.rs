//! # xmlarbor
//!
//! An in-memory XML document object model with a fast, forgiving parser.
//! A [`Document`] owns every node and attribute in two arenas; callers
//! hold small copyable [`NodeId`] / [`AttrId`] handles or borrowed
//! [`NodeRef`] / [`AttrRef`] views that make navigation total.
//!
//! ## Quick Start
//!
//! ```
//! use xmlarbor::Document;
//!
//! let doc = Document::parse_str("<config><port>8080</port></config>").unwrap();
//! assert_eq!(doc.child("config").child("port").text().as_int(), 8080);
//! assert!(doc.child("config").child("missing").is_null());
//! ```
//!
//! ## Editing
//!
//! ```
//! use xmlarbor::{serial, Document};
//!
//! let mut doc = Document::new();
//! let root = doc.append_child(doc.root(), "list").unwrap();
//! for n in ["a", "b"] {
//!     let item = doc.append_child(root, "item").unwrap();
//!     doc.set_text(item, n);
//! }
//! assert_eq!(serial::serialize(&doc), "<list><item>a</item><item>b</item></list>");
//! ```

pub mod encoding;
pub mod error;
pub mod parser;
pub mod serial;
pub mod tree;
pub mod util;

// Re-export primary types at the crate root for convenience.
pub use encoding::Encoding;
pub use error::{ParseError, ParseResult, ParseStatus, SourceLocation, TreeError};
pub use parser::ParseOptions;
pub use serial::SerializeOptions;
pub use tree::{AttrId, AttrRef, Document, NodeId, NodeKind, NodeRef, NodeType, Text};
