//! Building and editing a tree, then writing it out.
//!
//! Run with: `cargo run --example edit_tree`
#![allow(clippy::expect_used)]

use std::io;

use xmlarbor::{Document, NodeType};

fn main() -> io::Result<()> {
    let mut doc = Document::parse_str("<config><server port='80'/><legacy/></config>")
        .expect("failed to parse XML");
    let config = doc.document_element().id().expect("document element exists");
    let server = doc.node(config).child("server").id().expect("server exists");

    // Rewrite an attribute, add another before it.
    let port = doc.attribute(server, "port").expect("port attribute exists");
    doc.set_attribute_value(port, "8080");
    let host = doc
        .insert_attribute_before(server, "host", port)
        .expect("server is an element");
    doc.set_attribute_value(host, "localhost");

    // Replace the legacy node with a commented-out note.
    doc.remove_child_named(config, "legacy");
    let note = doc
        .append_child_of_type(config, NodeType::Comment)
        .expect("elements accept comments");
    doc.set_value(note, " legacy section removed ");

    // Add a list of features with text content.
    let features = doc
        .insert_child_after(config, "features", server)
        .expect("server is a child of config");
    for name in ["gzip", "tls"] {
        let feature = doc.append_child(features, "feature").expect("element");
        doc.set_text(feature, name);
    }

    println!("Tree:\n{}", doc.debug_dump());

    println!("XML:");
    doc.save(io::stdout().lock())?;
    println!();
    Ok(())
}
