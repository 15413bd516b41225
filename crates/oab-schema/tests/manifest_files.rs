//! Loading manifests from disk.

use std::io::Write;
use std::sync::Arc;

use oab_core::HttpMethod;
use oab_schema::{ConverterRegistry, Manifest, ManifestError};

const LIBRARY: &str = r#"
info:
  title: Library
  version: 0.3.0
  description: Books and the people who borrow them
schemas:
  Book:
    fields:
      isbn: string
      published: date
      cover: url
      borrower: { nested: Member }
  Member:
    fields:
      id: uuid
      joined: date-time
      history: { nested: Book, many: true }
      notes: raw
routes:
  - method: get
    path: /books/{isbn}
    operation_id: getBook
    tags: [books]
    responses:
      - status: 200
        description: The book
        body: Book
      - status: 404
        description: Unknown ISBN
  - method: put
    path: /members/{member_id}
    request: Member
    responses:
      - status: 204
        description: Updated
"#;

#[test]
fn load_from_file_and_generate() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(LIBRARY.as_bytes()).unwrap();

    let manifest = Manifest::load(file.path()).unwrap();
    let registry = Arc::new(ConverterRegistry::with_defaults().unwrap());
    let generated = manifest.generate(registry).unwrap();
    let doc = &generated.document;

    assert_eq!(
        doc.info.description.as_deref(),
        Some("Books and the people who borrow them")
    );
    assert_eq!(doc.components.schemas.len(), 2);

    let get_book = doc.operation("/books/{isbn}", HttpMethod::Get).unwrap();
    assert_eq!(get_book.parameters[0].name, "isbn");
    assert_eq!(get_book.tags, vec!["books"]);

    let update = doc.operation("/members/{member_id}", HttpMethod::Put).unwrap();
    assert!(update.request_body.is_some());
    assert!(update.responses["204"].content.is_empty());

    // `notes: raw` degrades but the rest of Member survives.
    assert_eq!(generated.diagnostics.len(), 1);
    assert_eq!(generated.diagnostics[0].path.as_deref(), Some("Member.notes"));
    assert_eq!(doc.schema("Member").unwrap().properties().len(), 4);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    let err = Manifest::load(&missing).unwrap_err();
    match err {
        ManifestError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("expected an I/O error, got {other}"),
    }
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"info: [unterminated").unwrap();
    let err = Manifest::load(file.path()).unwrap_err();
    assert!(matches!(err, ManifestError::Parse(_)));
}

#[test]
fn unknown_top_level_key_is_rejected() {
    let err = Manifest::from_yaml_str("info: {title: t, version: v}\nendpoints: []\n").unwrap_err();
    assert!(matches!(err, ManifestError::Parse(_)));
}
