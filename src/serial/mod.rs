//! Output: XML serialization and the diagnostic tree dump.
//!
//! [`serialize`] turns a `Document` back into XML text with the escaping
//! needed for it to reparse to the same tree. The debug dump
//! ([`Document::debug_dump`](crate::Document::debug_dump)) is an
//! indented listing meant for inspection only.

mod dump;
pub mod xml;

pub use xml::{serialize, serialize_with_options, SerializeOptions};
