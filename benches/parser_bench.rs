#![allow(clippy::expect_used)]

use std::fmt::Write;
use std::ops::ControlFlow;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use xmlarbor::serial::serialize;
use xmlarbor::Document;

// ---------------------------------------------------------------------------
// Document generators
// ---------------------------------------------------------------------------

/// Generates a small XML document with approximately 10 elements.
fn make_small_xml() -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root>\n");
    for i in 0..10 {
        let _ = writeln!(xml, "  <item id=\"{i}\">Value {i}</item>");
    }
    xml.push_str("</root>\n");
    xml
}

/// Generates a large XML document with approximately 1000 records.
fn make_large_xml() -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<database>\n");
    for i in 0..1000 {
        let _ = writeln!(
            xml,
            "  <record id=\"{i}\"><name>Record {i} &amp; co</name>\
             <value>{}</value><status>active</status></record>",
            i * 42
        );
    }
    xml.push_str("</database>\n");
    xml
}

/// Generates a deeply nested XML document with the given nesting depth.
fn make_nested_xml(depth: usize) -> String {
    let mut xml = String::new();
    for i in 0..depth {
        let _ = write!(xml, "<level{i}>");
    }
    xml.push_str("leaf");
    for i in (0..depth).rev() {
        let _ = write!(xml, "</level{i}>");
    }
    xml
}

/// Generates an XML document where each element has `num_attrs` attributes.
fn make_attr_heavy_xml(num_attrs: usize) -> String {
    let mut xml = String::from("<root>\n");
    for i in 0..10 {
        xml.push_str("  <element");
        for j in 0..num_attrs {
            let _ = write!(xml, " attr{j}=\"value_{i}_{j}\"");
        }
        xml.push_str("/>\n");
    }
    xml.push_str("</root>\n");
    xml
}

// ---------------------------------------------------------------------------
// Parsing benchmarks
// ---------------------------------------------------------------------------

fn bench_parse_small(c: &mut Criterion) {
    let xml = make_small_xml();
    c.bench_function("parse_small", |b| {
        b.iter(|| Document::parse_str(black_box(&xml)));
    });
}

fn bench_parse_large(c: &mut Criterion) {
    let xml = make_large_xml();
    c.bench_function("parse_large", |b| {
        b.iter(|| Document::parse_str(black_box(&xml)));
    });
}

fn bench_parse_large_inplace(c: &mut Criterion) {
    let xml = make_large_xml().into_bytes();
    c.bench_function("parse_large_inplace", |b| {
        b.iter_batched_ref(
            || xml.clone(),
            |buf| {
                let mut doc = Document::new();
                let result = doc.load_buffer_inplace(buf);
                black_box(result.is_ok());
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_parse_deeply_nested(c: &mut Criterion) {
    let xml = make_nested_xml(2000);
    c.bench_function("parse_deeply_nested", |b| {
        b.iter(|| Document::parse_str(black_box(&xml)));
    });
}

fn bench_parse_many_attributes(c: &mut Criterion) {
    let xml = make_attr_heavy_xml(50);
    c.bench_function("parse_many_attributes", |b| {
        b.iter(|| Document::parse_str(black_box(&xml)));
    });
}

// ---------------------------------------------------------------------------
// Tree benchmarks
// ---------------------------------------------------------------------------

fn bench_traverse_large(c: &mut Criterion) {
    let doc = Document::parse_str(&make_large_xml()).expect("benchmark input parses");
    c.bench_function("traverse_large", |b| {
        b.iter(|| {
            let mut count = 0usize;
            doc.traverse(|_, depth| {
                count += depth;
                ControlFlow::Continue(())
            });
            black_box(count)
        });
    });
}

fn bench_build_tree(c: &mut Criterion) {
    c.bench_function("build_tree_1000", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            let root = doc.append_child(doc.root(), "root").expect("root accepts children");
            for i in 0..1000 {
                let item = doc.append_child(root, "item").expect("element accepts children");
                let attr = doc.append_attribute(item, "n").expect("element accepts attributes");
                doc.set_attribute_value(attr, &i.to_string());
            }
            black_box(doc.node_count())
        });
    });
}

fn bench_serialize_large(c: &mut Criterion) {
    let doc = Document::parse_str(&make_large_xml()).expect("benchmark input parses");
    c.bench_function("serialize_large", |b| {
        b.iter(|| serialize(black_box(&doc)));
    });
}

criterion_group!(
    parsing,
    bench_parse_small,
    bench_parse_large,
    bench_parse_large_inplace,
    bench_parse_deeply_nested,
    bench_parse_many_attributes,
);

criterion_group!(tree, bench_traverse_large, bench_build_tree, bench_serialize_large);

criterion_main!(parsing, tree);
