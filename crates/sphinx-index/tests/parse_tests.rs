//! Parsing and re-emission tests against a realistic searchindex.js

use pretty_assertions::assert_eq;
use sphinx_index::{DocId, KindCode, SearchIndex};

const FIXTURE: &str = include_str!("fixtures/searchindex.js");

fn fixture() -> SearchIndex {
    SearchIndex::parse_js(FIXTURE).expect("fixture parses")
}

// ═══════════════════════════════════════════════════════════════════════
// Envelope and Shape
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_fixture_parses() {
    let index = fixture();
    assert_eq!(index.doc_count(), 7);
    assert_eq!(index.docnames.len(), index.filenames.len());
    assert_eq!(index.docnames.len(), index.titles.len());
}

#[test]
fn test_envversion_includes_bare_sphinx_key() {
    let index = fixture();
    assert_eq!(index.envversion.get("sphinx"), Some(&56));
    assert_eq!(index.envversion.get("sphinx.domains.python"), Some(&3));
}

#[test]
fn test_unicode_escape_in_title() {
    let index = fixture();
    assert_eq!(
        index.title(DocId(6)),
        Some("Welcome to relay\u{2019}s documentation!")
    );
}

#[test]
fn test_missing_envelope_is_rejected() {
    let err = SearchIndex::parse_js("{docnames:[]}").expect_err("must fail");
    assert!(err.to_string().contains("Search.setIndex"));
}

#[test]
fn test_shape_error_reports_what_is_wrong() {
    // docnames must be an array of strings.
    let err = SearchIndex::parse_literal(
        r#"{docnames:[1],envversion:{},filenames:[],objects:{},objnames:{},objtypes:{},terms:{},titles:[],titleterms:{}}"#,
    )
    .expect_err("must fail");
    assert!(err.to_string().contains("index shape error"));
}

// ═══════════════════════════════════════════════════════════════════════
// Postings and Object Entries
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_scalar_and_list_postings() {
    let index = fixture();
    // `publish:0` is a bare integer on the wire.
    let publish = index.terms.get("publish").expect("term exists");
    assert_eq!(publish.docs(), &[DocId(0)]);
    let api = index.terms.get("api").expect("term exists");
    assert_eq!(api.docs(), &[DocId(0), DocId(1), DocId(2)]);
}

#[test]
fn test_object_inventory_entries() {
    let index = fixture();
    assert_eq!(index.object_count(), 8);

    let connect = index
        .lookup_object("relay.client.connect")
        .expect("symbol exists");
    assert_eq!(connect.module, "relay.client");
    assert_eq!(connect.name, "connect");
    assert_eq!(connect.entry.doc, DocId(1));
    assert_eq!(connect.entry.kind, KindCode(1));
    assert_eq!(connect.anchor(), "relay.client.connect");

    let kind = index.object_kind(connect.entry.kind).expect("kind exists");
    assert_eq!(kind.label, "Python function");
    assert_eq!(kind.type_string(), "py:function");
}

#[test]
fn test_module_entries_use_dash_anchor() {
    let index = fixture();
    let module = index.lookup_object("relay.channels").expect("module entry");
    assert_eq!(module.entry.anchor, "-");
    assert_eq!(module.anchor(), "module-relay.channels");
}

#[test]
fn test_lookup_object_misses() {
    let index = fixture();
    assert!(index.lookup_object("relay.client.missing").is_none());
    assert!(index.lookup_object("other.module").is_none());
}

// ═══════════════════════════════════════════════════════════════════════
// Round Trip
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_reemitted_index_parses_back_identically() {
    let index = fixture();
    let emitted = index.to_setindex_js().expect("serializes");
    assert!(emitted.starts_with("Search.setIndex({"));
    assert!(emitted.ends_with("})"));
    let reparsed = SearchIndex::parse_js(&emitted).expect("round trips");
    assert_eq!(index, reparsed);
}

#[test]
fn test_singleton_postings_collapse_on_emission() {
    let index = fixture();
    let emitted = index.to_setindex_js().expect("serializes");
    assert!(emitted.contains(r#""publish":0"#));
    assert!(emitted.contains(r#""api":[0,1,2]"#));
}
