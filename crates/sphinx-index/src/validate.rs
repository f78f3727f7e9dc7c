//! Self-consistency checks for a parsed search index
//!
//! A malformed index does not crash the browser widget, it just silently
//! returns no results. These checks catch that class of defect at build
//! or review time: every referenced document index must exist, the
//! parallel tables must agree on length, and the two kind tables must
//! describe the same code set.

use std::collections::HashSet;
use std::fmt;

use crate::error::ValidateError;
use crate::index::{DocId, KindCode, SearchIndex};

/// How bad a [`Violation`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Suspicious but loadable; search may behave oddly
    Warning,

    /// The index is structurally broken
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// One consistency problem found in an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A table positionally aligned with `docnames` has a different length.
    LengthMismatch {
        /// Name of the misaligned table (`filenames` or `titles`)
        table: &'static str,
        /// `docnames` length
        expected: usize,
        /// The table's actual length
        actual: usize,
    },

    /// A document index points past the end of `docnames`.
    DocOutOfBounds {
        /// Where the reference lives, e.g. `terms["klines"]`
        context: String,
        /// The offending document index
        doc: DocId,
        /// Number of documents actually present
        limit: usize,
    },

    /// An object entry uses a kind code declared in neither kind table.
    UndeclaredKind {
        /// Fully qualified symbol name
        fullname: String,
        /// The undeclared code
        kind: KindCode,
    },

    /// A kind code appears in one kind table but not the other.
    KindTableMismatch {
        /// The code in question
        kind: KindCode,
        /// The table it is missing from (`objnames` or `objtypes`)
        missing_from: &'static str,
    },

    /// `objtypes` and `objnames` disagree about a code's `domain:kind`.
    KindTypeDisagreement {
        /// The code in question
        kind: KindCode,
        /// What `objtypes` says
        objtypes: String,
        /// What `objnames` implies
        objnames: String,
    },

    /// The same docname appears twice.
    DuplicateDocname {
        /// The repeated docname
        docname: String,
    },

    /// A term map contains an empty-string key.
    EmptyTerm {
        /// `terms` or `titleterms`
        table: &'static str,
    },

    /// A term maps to no documents at all.
    EmptyPostings {
        /// `terms` or `titleterms`
        table: &'static str,
        /// The term with the empty posting list
        term: String,
    },

    /// A posting list mentions the same document twice.
    DuplicatePosting {
        /// `terms` or `titleterms`
        table: &'static str,
        /// The term whose postings repeat
        term: String,
        /// The repeated document
        doc: DocId,
    },
}

impl Violation {
    /// Severity of this violation.
    pub fn severity(&self) -> Severity {
        match self {
            Violation::LengthMismatch { .. }
            | Violation::DocOutOfBounds { .. }
            | Violation::UndeclaredKind { .. }
            | Violation::KindTableMismatch { .. }
            | Violation::KindTypeDisagreement { .. } => Severity::Error,
            Violation::DuplicateDocname { .. }
            | Violation::EmptyTerm { .. }
            | Violation::EmptyPostings { .. }
            | Violation::DuplicatePosting { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::LengthMismatch {
                table,
                expected,
                actual,
            } => write!(
                f,
                "`{table}` has {actual} entries but `docnames` has {expected}"
            ),
            Violation::DocOutOfBounds {
                context,
                doc,
                limit,
            } => write!(
                f,
                "{context} references document {doc}, but only {limit} documents exist"
            ),
            Violation::UndeclaredKind { fullname, kind } => {
                write!(f, "object `{fullname}` uses undeclared kind code {kind}")
            }
            Violation::KindTableMismatch { kind, missing_from } => {
                write!(f, "kind code {kind} is missing from `{missing_from}`")
            }
            Violation::KindTypeDisagreement {
                kind,
                objtypes,
                objnames,
            } => write!(
                f,
                "kind code {kind}: `objtypes` says `{objtypes}` but `objnames` says `{objnames}`"
            ),
            Violation::DuplicateDocname { docname } => {
                write!(f, "docname `{docname}` appears more than once")
            }
            Violation::EmptyTerm { table } => {
                write!(f, "`{table}` contains an empty term")
            }
            Violation::EmptyPostings { table, term } => {
                write!(f, "`{table}[\"{term}\"]` maps to no documents")
            }
            Violation::DuplicatePosting { table, term, doc } => {
                write!(f, "`{table}[\"{term}\"]` lists document {doc} twice")
            }
        }
    }
}

/// Everything [`SearchIndex::validate`] found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// All violations, in discovery order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Only the error-severity violations.
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity() == Severity::Error)
    }

    /// Only the warning-severity violations.
    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity() == Severity::Warning)
    }

    /// Number of error-severity violations.
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Number of warning-severity violations.
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// True when the index has no error-severity violations.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// True when nothing at all was flagged.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            writeln!(f, "{}: {}", violation.severity(), violation)?;
        }
        Ok(())
    }
}

impl SearchIndex {
    /// Run every consistency check and report what was found.
    ///
    /// Never fails: a broken index produces a report full of violations,
    /// not an error. Use [`Self::ensure_valid`] for a pass/fail answer.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        let limit = self.docnames.len();

        // Parallel tables.
        for (table, len) in [
            ("filenames", self.filenames.len()),
            ("titles", self.titles.len()),
        ] {
            if len != limit {
                report.push(Violation::LengthMismatch {
                    table,
                    expected: limit,
                    actual: len,
                });
            }
        }

        // Duplicate docnames.
        let mut seen = HashSet::new();
        for docname in &self.docnames {
            if !seen.insert(docname.as_str()) {
                report.push(Violation::DuplicateDocname {
                    docname: docname.clone(),
                });
            }
        }

        check_term_table(&mut report, "terms", &self.terms, limit);
        check_term_table(&mut report, "titleterms", &self.titleterms, limit);

        // Kind tables must cover the same code set and agree on types.
        for (kind, objkind) in &self.objnames {
            match self.objtypes.get(kind) {
                None => report.push(Violation::KindTableMismatch {
                    kind: *kind,
                    missing_from: "objtypes",
                }),
                Some(type_string) if *type_string != objkind.type_string() => {
                    report.push(Violation::KindTypeDisagreement {
                        kind: *kind,
                        objtypes: type_string.clone(),
                        objnames: objkind.type_string(),
                    });
                }
                Some(_) => {}
            }
        }
        for kind in self.objtypes.keys() {
            if !self.objnames.contains_key(kind) {
                report.push(Violation::KindTableMismatch {
                    kind: *kind,
                    missing_from: "objnames",
                });
            }
        }

        // Object inventory references.
        for symbol in self.symbols() {
            if symbol.entry.doc.0 >= limit {
                report.push(Violation::DocOutOfBounds {
                    context: format!("objects entry `{}`", symbol.fullname()),
                    doc: symbol.entry.doc,
                    limit,
                });
            }
            if !self.objnames.contains_key(&symbol.entry.kind)
                || !self.objtypes.contains_key(&symbol.entry.kind)
            {
                report.push(Violation::UndeclaredKind {
                    fullname: symbol.fullname(),
                    kind: symbol.entry.kind,
                });
            }
        }

        report
    }

    /// Fail with a [`ValidateError`] if the index has any error-severity
    /// violations.
    ///
    /// # Errors
    ///
    /// [`ValidateError`] carrying the full report.
    pub fn ensure_valid(&self) -> Result<(), ValidateError> {
        let report = self.validate();
        if report.is_ok() {
            Ok(())
        } else {
            Err(ValidateError {
                errors: report.error_count(),
                warnings: report.warning_count(),
                report,
            })
        }
    }
}

fn check_term_table(
    report: &mut ValidationReport,
    table: &'static str,
    terms: &indexmap::IndexMap<String, crate::index::Postings>,
    limit: usize,
) {
    for (term, postings) in terms {
        if term.is_empty() {
            report.push(Violation::EmptyTerm { table });
        }
        if postings.is_empty() {
            report.push(Violation::EmptyPostings {
                table,
                term: term.clone(),
            });
        }
        let mut seen = HashSet::new();
        for doc in postings {
            if doc.0 >= limit {
                report.push(Violation::DocOutOfBounds {
                    context: format!("{table}[\"{term}\"]"),
                    doc,
                    limit,
                });
            }
            if !seen.insert(doc) {
                report.push(Violation::DuplicatePosting {
                    table,
                    term: term.clone(),
                    doc,
                });
            }
        }
    }
}
