//! Construction of new search indices
//!
//! An index is generated once per documentation build and consumed
//! read-only afterwards; [`IndexBuilder`] is that generation step. Feed
//! it documents and inventory entries, and `build()` produces a
//! [`SearchIndex`] that passes validation and re-emits as a working
//! `searchindex.js`.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::error::Result;
use crate::index::{DocId, KindCode, ObjectEntry, ObjectKind, Postings, SearchIndex};
use crate::stem::{is_stopword, porter_stem, tokenize};

/// Incrementally assembles a [`SearchIndex`].
///
/// Documents keep the order they were added in; term maps come out
/// sorted with deduplicated, ascending posting lists, matching what a
/// documentation build writes.
///
/// # Example
///
/// ```
/// use sphinx_index::IndexBuilder;
///
/// let mut builder = IndexBuilder::new();
/// builder.declare_kind(0, "py", "module", "Python module");
/// builder.declare_kind(1, "py", "function", "Python function");
///
/// let doc = builder.add_document(
///     "api/client",
///     "api/client.rst",
///     "Client",
///     "Connecting and closing relay client sessions.",
/// );
/// builder.add_object("relay.client", "connect", 1, doc, 1, "");
///
/// let index = builder.build().expect("consistent by construction");
/// assert_eq!(index.doc_count(), 1);
/// assert!(!index.search("connecting").is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    docnames: Vec<String>,
    filenames: Vec<String>,
    titles: Vec<String>,
    envversion: IndexMap<String, u64>,
    objects: IndexMap<String, IndexMap<String, ObjectEntry>>,
    objnames: IndexMap<KindCode, ObjectKind>,
    terms: BTreeMap<String, BTreeSet<usize>>,
    titleterms: BTreeMap<String, BTreeSet<usize>>,
}

impl IndexBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the version of a domain or extension that participated in
    /// the build (the `envversion` table).
    pub fn env(&mut self, name: impl Into<String>, version: u64) -> &mut Self {
        self.envversion.insert(name.into(), version);
        self
    }

    /// Declare an object kind. Object entries reference kinds by code;
    /// every code used in [`Self::add_object`] must be declared here.
    pub fn declare_kind(
        &mut self,
        code: u32,
        domain: impl Into<String>,
        kind: impl Into<String>,
        label: impl Into<String>,
    ) -> &mut Self {
        self.objnames.insert(
            KindCode(code),
            ObjectKind {
                domain: domain.into(),
                kind: kind.into(),
                label: label.into(),
            },
        );
        self
    }

    /// Add one documentation page and index its title and body text.
    ///
    /// Tokens are lowercased, stopword-filtered, and Porter-stemmed, the
    /// same pipeline queries go through. Returns the page's [`DocId`]
    /// for use in [`Self::add_object`].
    pub fn add_document(
        &mut self,
        docname: impl Into<String>,
        filename: impl Into<String>,
        title: impl Into<String>,
        body: &str,
    ) -> DocId {
        let doc = self.docnames.len();
        self.docnames.push(docname.into());
        self.filenames.push(filename.into());
        let title = title.into();
        index_text(&mut self.titleterms, &title, doc);
        index_text(&mut self.terms, body, doc);
        self.titles.push(title);
        DocId(doc)
    }

    /// Add an object-inventory entry.
    ///
    /// `anchor` follows the wire convention: `""` for the default
    /// `<fullname>` fragment, `"-"` for a module entry.
    pub fn add_object(
        &mut self,
        module: impl Into<String>,
        name: impl Into<String>,
        kind: u32,
        doc: DocId,
        priority: i64,
        anchor: impl Into<String>,
    ) -> &mut Self {
        self.objects.entry(module.into()).or_default().insert(
            name.into(),
            ObjectEntry {
                doc,
                kind: KindCode(kind),
                priority,
                anchor: anchor.into(),
            },
        );
        self
    }

    /// Finish the build.
    ///
    /// # Errors
    ///
    /// [`crate::ValidateError`] when the assembled index is inconsistent,
    /// e.g. an object entry references an undeclared kind code or a
    /// [`DocId`] that did not come from [`Self::add_document`].
    pub fn build(self) -> Result<SearchIndex> {
        let objtypes = self
            .objnames
            .iter()
            .map(|(code, kind)| (*code, kind.type_string()))
            .collect();
        let index = SearchIndex {
            docnames: self.docnames,
            envversion: self.envversion,
            filenames: self.filenames,
            objects: self.objects,
            objnames: self.objnames,
            objtypes,
            terms: freeze(self.terms),
            titles: self.titles,
            titleterms: freeze(self.titleterms),
        };
        index.ensure_valid()?;
        Ok(index)
    }
}

/// Stem and accumulate one document's text into a term table.
fn index_text(table: &mut BTreeMap<String, BTreeSet<usize>>, text: &str, doc: usize) {
    for token in tokenize(text) {
        if is_stopword(&token) {
            continue;
        }
        let stemmed = porter_stem(&token);
        if stemmed.is_empty() {
            continue;
        }
        table.entry(stemmed).or_default().insert(doc);
    }
}

/// Convert accumulated postings into the wire representation. BTree
/// ordering gives sorted terms and ascending, deduplicated doc lists.
fn freeze(table: BTreeMap<String, BTreeSet<usize>>) -> IndexMap<String, Postings> {
    table
        .into_iter()
        .map(|(term, docs)| {
            let docs: Vec<DocId> = docs.into_iter().map(DocId).collect();
            (term, Postings::from(docs))
        })
        .collect()
}
