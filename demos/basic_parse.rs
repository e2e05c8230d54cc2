//! Basic XML parsing and tree navigation.
//!
//! Run with: `cargo run --example basic_parse`
#![allow(clippy::expect_used)]

use std::ops::ControlFlow;

use xmlarbor::{Document, NodeType};

fn main() {
    let xml = r#"<?xml version="1.0"?>
<bookstore>
  <book category="fiction">
    <title lang="en">The Great Gatsby</title>
    <author>F. Scott Fitzgerald</author>
    <year>1925</year>
    <price>10.99</price>
  </book>
  <book category="science">
    <title lang="en">A Brief History of Time</title>
    <author>Stephen Hawking</author>
    <year>1988</year>
    <price>14.99</price>
  </book>
</bookstore>"#;

    let doc = Document::parse_str(xml).expect("failed to parse XML");
    let root = doc.document_element();

    println!("Root element: {}", root.name());

    for book in root.children().filter(|n| n.name() == "book") {
        let category = book.attribute("category");
        let category = if category.is_null() { "unknown" } else { category.value() };
        println!("\n<{}> (category={category})", book.name());

        for field in book.children().filter(|n| n.node_type() == NodeType::Element) {
            println!("  {}: {}", field.name(), field.text());
        }
        println!(
            "  published {} years before 2000, costs {:.2}",
            2000 - book.child("year").text().as_int(),
            book.child("price").text().as_f64()
        );
    }

    // Walk the whole tree, stopping at the first author.
    let mut first_author = None;
    doc.traverse(|node, depth| {
        if node.name() == "author" {
            first_author = Some((node.child_value().to_string(), depth));
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });
    if let Some((author, depth)) = first_author {
        println!("\nFirst author at depth {depth}: {author}");
    }

    // Malformed input is reported with a status and an offset.
    let mut broken = Document::new();
    let result = broken.load_str("<bookstore><book></bookstore>");
    println!("\nBroken input: {result}");
}
