//! Integration tests parsing real-world XML formats.
//!
//! These serve as smoke tests ensuring the parser handles common patterns
//! found in Atom feeds, SVG, Maven POMs, and Android manifests, and that
//! the serializer writes them back in a form that reparses to the same
//! tree.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use xmlarbor::serial::serialize;
use xmlarbor::{Document, ParseOptions};

fn parse_and_roundtrip(input: &str) -> Document<'static> {
    let mut doc = Document::new();
    let result = doc.load_str_with_options(input, &ParseOptions::full());
    assert!(result.is_ok(), "parse failed: {result}");
    // Roundtrip: serialize and re-parse
    let output = serialize(&doc);
    let mut doc2 = Document::new();
    let result = doc2.load_str_with_options(&output, &ParseOptions::full());
    assert!(result.is_ok(), "roundtrip parse failed: {result}");
    assert_eq!(doc.debug_dump(), doc2.debug_dump(), "tree changed after roundtrip");
    doc
}

// --- Atom ---

#[test]
fn test_atom_feed() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Feed</title>
  <link href="http://example.org/"/>
  <updated>2025-12-13T18:30:02Z</updated>
  <author>
    <name>John Doe</name>
  </author>
  <entry>
    <title>Atom-Powered Robots Run Amok</title>
    <link href="http://example.org/2003/12/13/atom03"/>
    <summary>Some text.</summary>
  </entry>
</feed>"#;

    let doc = parse_and_roundtrip(xml);
    let feed = doc.document_element();
    assert_eq!(feed.name(), "feed");
    // Namespaces are plain attributes.
    assert_eq!(
        feed.attribute("xmlns").value(),
        "http://www.w3.org/2005/Atom"
    );
    assert_eq!(feed.child("author").child_value_named("name"), "John Doe");
    assert_eq!(
        feed.child("entry").child("link").attribute("href").value(),
        "http://example.org/2003/12/13/atom03"
    );
    assert_eq!(doc.root_node().first_child().name(), "xml");
}

// --- SVG ---

#[test]
fn test_svg_with_prefixed_names() {
    let xml = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="100" height="100">
  <defs>
    <linearGradient id="g1"><stop offset="0%" stop-color="#fff"/></linearGradient>
  </defs>
  <circle cx="50" cy="50" r="40" fill="url(#g1)"/>
  <use xlink:href="#g1"/>
  <text x="10" y="20">A &lt; B</text>
</svg>"##;

    let doc = parse_and_roundtrip(xml);
    let svg = doc.document_element();
    assert_eq!(svg.attribute("width").as_uint(), 100);
    assert_eq!(svg.child("circle").attribute("r").as_int(), 40);
    assert_eq!(svg.child("use").attribute("xlink:href").value(), "#g1");
    assert_eq!(svg.child("text").text().as_str(), "A < B");
    let stops = svg.descendants().filter(|n| n.name() == "stop").count();
    assert_eq!(stops, 1);
}

// --- Maven ---

#[test]
fn test_maven_pom() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <modelVersion>4.0.0</modelVersion>
  <groupId>org.example</groupId>
  <artifactId>demo</artifactId>
  <dependencies>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <scope>test</scope>
    </dependency>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
    </dependency>
  </dependencies>
  <!-- build settings are inherited -->
</project>"#;

    let doc = parse_and_roundtrip(xml);
    let project = doc.document_element();
    let artifacts: Vec<&str> = project
        .child("dependencies")
        .children()
        .filter(|n| n.name() == "dependency")
        .map(|n| n.child_value_named("artifactId"))
        .collect();
    assert_eq!(artifacts, ["junit", "slf4j-api"]);
    let comment = project
        .children()
        .find(|n| n.node_type() == xmlarbor::NodeType::Comment)
        .unwrap();
    assert_eq!(comment.value(), " build settings are inherited ");
}

// --- Android ---

#[test]
fn test_android_manifest() {
    let xml = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example">
    <uses-permission android:name="android.permission.INTERNET"/>
    <application android:label="@string/app_name" android:debuggable="true">
        <activity android:name=".MainActivity" android:exported="yes"/>
    </application>
</manifest>"#;

    let doc = parse_and_roundtrip(xml);
    let manifest = doc.document_element();
    assert_eq!(manifest.attribute("package").value(), "com.example");
    let app = manifest.child("application");
    assert!(app.attribute("android:debuggable").as_bool());
    assert!(app.child("activity").attribute("android:exported").as_bool());
    assert_eq!(
        manifest.child("uses-permission").attribute("android:name").value(),
        "android.permission.INTERNET"
    );
}

// --- Configuration with DOCTYPE ---

#[test]
fn test_config_with_internal_subset() {
    let xml = r#"<!DOCTYPE config [
  <!ELEMENT config (server+)>
  <!ATTLIST server port CDATA "80">
  <!-- a comment with a > inside -->
]>
<config>
  <server host='a.example' port='8080'/>
  <server host="b.example" port="0x1F90"/>
</config>"#;

    let doc = Document::parse_str(xml).unwrap();
    let ports: Vec<i32> = doc
        .document_element()
        .children()
        .map(|s| s.attribute("port").as_int())
        .collect();
    assert_eq!(ports, [8080, 8080]);
}
