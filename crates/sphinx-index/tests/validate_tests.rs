//! Consistency-check tests: a clean index stays clean, and each class of
//! corruption is reported with the right severity.

use sphinx_index::{
    DocId, KindCode, ObjectEntry, Postings, SearchIndex, Severity, Violation,
};

const FIXTURE: &str = include_str!("fixtures/searchindex.js");

fn fixture() -> SearchIndex {
    SearchIndex::parse_js(FIXTURE).expect("fixture parses")
}

// ═══════════════════════════════════════════════════════════════════════
// Clean Index
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_fixture_is_clean() {
    let report = fixture().validate();
    assert!(report.is_clean(), "unexpected violations:\n{report}");
    assert!(fixture().ensure_valid().is_ok());
}

// ═══════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_misaligned_filenames_table() {
    let mut index = fixture();
    index.filenames.pop();
    let report = index.validate();
    assert!(!report.is_ok());
    assert!(report.violations().iter().any(|v| matches!(
        v,
        Violation::LengthMismatch {
            table: "filenames",
            expected: 7,
            actual: 6,
        }
    )));
}

#[test]
fn test_out_of_bounds_posting() {
    let mut index = fixture();
    index
        .terms
        .insert("zzz".to_string(), Postings::from(vec![DocId(99)]));
    let report = index.validate();
    let violation = report
        .errors()
        .find(|v| matches!(v, Violation::DocOutOfBounds { .. }))
        .expect("out-of-bounds posting reported");
    assert_eq!(violation.severity(), Severity::Error);
    assert!(violation.to_string().contains("zzz"));
}

#[test]
fn test_out_of_bounds_object_entry() {
    let mut index = fixture();
    if let Some(table) = index.objects.get_mut("relay.client") {
        if let Some(entry) = table.get_mut("connect") {
            entry.doc = DocId(42);
        }
    }
    let report = index.validate();
    assert!(report.errors().any(|v| matches!(
        v,
        Violation::DocOutOfBounds { doc: DocId(42), .. }
    )));
}

#[test]
fn test_undeclared_kind_code() {
    let mut index = fixture();
    if let Some(table) = index.objects.get_mut("relay.channels") {
        table.insert(
            "rogue".to_string(),
            ObjectEntry {
                doc: DocId(0),
                kind: KindCode(9),
                priority: 1,
                anchor: String::new(),
            },
        );
    }
    let report = index.validate();
    assert!(report.errors().any(|v| matches!(
        v,
        Violation::UndeclaredKind { kind: KindCode(9), .. }
    )));
}

#[test]
fn test_kind_tables_must_cover_the_same_codes() {
    let mut index = fixture();
    index.objtypes.shift_remove(&KindCode(2));
    let report = index.validate();
    assert!(report.errors().any(|v| matches!(
        v,
        Violation::KindTableMismatch {
            kind: KindCode(2),
            missing_from: "objtypes",
        }
    )));
}

#[test]
fn test_kind_type_disagreement() {
    let mut index = fixture();
    index
        .objtypes
        .insert(KindCode(1), "py:method".to_string());
    let report = index.validate();
    assert!(report.errors().any(|v| matches!(
        v,
        Violation::KindTypeDisagreement { kind: KindCode(1), .. }
    )));
}

#[test]
fn test_ensure_valid_reports_counts() {
    let mut index = fixture();
    index.filenames.pop();
    index.titles.pop();
    let err = index.ensure_valid().expect_err("must fail");
    assert_eq!(err.errors, 2);
    assert!(err.to_string().contains("failed validation"));
    assert_eq!(err.report.error_count(), 2);
}

// ═══════════════════════════════════════════════════════════════════════
// Warnings
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_duplicate_docname_is_a_warning() {
    let mut index = fixture();
    index.docnames[1] = index.docnames[0].clone();
    let report = index.validate();
    assert!(report.is_ok(), "duplicates do not break loading");
    assert!(report.warnings().any(|v| matches!(
        v,
        Violation::DuplicateDocname { .. }
    )));
}

#[test]
fn test_empty_term_string_is_a_warning() {
    let mut index = fixture();
    index
        .terms
        .insert(String::new(), Postings::from(vec![DocId(0)]));
    let report = index.validate();
    assert!(report.is_ok());
    assert!(report
        .warnings()
        .any(|v| matches!(v, Violation::EmptyTerm { table: "terms" })));
}

#[test]
fn test_empty_postings_is_a_warning() {
    let mut index = fixture();
    index
        .titleterms
        .insert("ghost".to_string(), Postings::from(Vec::new()));
    let report = index.validate();
    assert!(report.is_ok());
    assert!(report.warnings().any(|v| matches!(
        v,
        Violation::EmptyPostings {
            table: "titleterms",
            ..
        }
    )));
}

#[test]
fn test_duplicate_posting_is_a_warning() {
    let mut index = fixture();
    index
        .terms
        .insert("echo".to_string(), Postings::from(vec![DocId(1), DocId(1)]));
    let report = index.validate();
    assert!(report.is_ok());
    assert!(report.warnings().any(|v| matches!(
        v,
        Violation::DuplicatePosting { doc: DocId(1), .. }
    )));
}
