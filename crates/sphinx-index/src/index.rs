//! Typed model of a Sphinx search index
//!
//! Mirrors the object literal a documentation build assigns via
//! `Search.setIndex({...})`: document name/file/title tables, the object
//! inventory, the stemmed term maps, and the extension version stamp.
//! All mappings are order-preserving so an index re-emits the way it was
//! read.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::de::{SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ParseError, Result};
use crate::literal;

/// Position of a document in the [`SearchIndex::docnames`] table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct DocId(pub usize);

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric code identifying an object kind, the key space shared by
/// [`SearchIndex::objnames`] and [`SearchIndex::objtypes`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct KindCode(pub u32);

impl fmt::Display for KindCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the object inventory: where a documented symbol lives.
///
/// On the wire this is the heterogeneous tuple
/// `[docIndex, kindCode, priority, anchor]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Document the symbol is documented in
    pub doc: DocId,

    /// Kind code, resolved through [`SearchIndex::objnames`]
    pub kind: KindCode,

    /// Search priority: 0 = important, 1 = default, 2 = de-emphasized
    pub priority: i64,

    /// Anchor note: `""` for the default `<fullname>` fragment, `"-"`
    /// for a module entry, anything else verbatim
    pub anchor: String,
}

impl ObjectEntry {
    /// Resolve the URL fragment for this entry given the symbol's fully
    /// qualified name.
    ///
    /// `""` means the fragment is the full name itself; `"-"` marks a
    /// module entry whose fragment is `module-<fullname>`.
    pub fn anchor_for(&self, fullname: &str) -> String {
        match self.anchor.as_str() {
            "" => fullname.to_string(),
            "-" => format!("module-{fullname}"),
            other => other.to_string(),
        }
    }
}

impl Serialize for ObjectEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.doc, &self.kind, &self.priority, &self.anchor).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (doc, kind, priority, anchor) =
            <(DocId, KindCode, i64, String)>::deserialize(deserializer)?;
        Ok(Self {
            doc,
            kind,
            priority,
            anchor,
        })
    }
}

/// Human-readable description of an object kind: the wire tuple
/// `[domain, kind, label]`, e.g. `["py", "function", "Python function"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKind {
    /// Documentation domain, e.g. `py`
    pub domain: String,

    /// Kind within the domain, e.g. `function`
    pub kind: String,

    /// Display label, e.g. `Python function`
    pub label: String,
}

impl ObjectKind {
    /// The `<domain>:<kind>` form stored in [`SearchIndex::objtypes`].
    pub fn type_string(&self) -> String {
        format!("{}:{}", self.domain, self.kind)
    }
}

impl Serialize for ObjectKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.domain, &self.kind, &self.label).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (domain, kind, label) = <(String, String, String)>::deserialize(deserializer)?;
        Ok(Self {
            domain,
            kind,
            label,
        })
    }
}

/// The documents a term occurs in.
///
/// The wire format collapses a one-element list to a bare integer
/// (`ping:1` vs `limit:[1,2]`); this type round-trips that collapse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Postings(Vec<DocId>);

impl Postings {
    /// The documents, in stored order.
    pub fn docs(&self) -> &[DocId] {
        &self.0
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no documents are listed (a build artifact defect).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `doc` appears in the list.
    pub fn contains(&self, doc: DocId) -> bool {
        self.0.contains(&doc)
    }
}

impl From<Vec<DocId>> for Postings {
    fn from(docs: Vec<DocId>) -> Self {
        Self(docs)
    }
}

impl<'a> IntoIterator for &'a Postings {
    type Item = DocId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, DocId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

impl Serialize for Postings {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => single.serialize(serializer),
            many => many.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Postings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PostingsVisitor;

        impl<'de> Visitor<'de> for PostingsVisitor {
            type Value = Postings;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a document index or a list of document indices")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<Postings, E> {
                Ok(Postings(vec![DocId(v as usize)]))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<Postings, E> {
                if v < 0 {
                    return Err(E::custom(format!("negative document index {v}")));
                }
                Ok(Postings(vec![DocId(v as usize)]))
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> std::result::Result<Postings, A::Error> {
                let mut docs = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(doc) = seq.next_element::<DocId>()? {
                    docs.push(doc);
                }
                Ok(Postings(docs))
            }
        }

        deserializer.deserialize_any(PostingsVisitor)
    }
}

/// A symbol from the object inventory, borrowed from its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol<'a> {
    /// Module path the symbol is grouped under (may be empty)
    pub module: &'a str,

    /// Symbol name within the module
    pub name: &'a str,

    /// The inventory row
    pub entry: &'a ObjectEntry,
}

impl Symbol<'_> {
    /// Fully qualified name, `module.name` (or just `name` for
    /// top-level entries).
    pub fn fullname(&self) -> String {
        if self.module.is_empty() {
            self.name.to_string()
        } else {
            format!("{}.{}", self.module, self.name)
        }
    }

    /// URL fragment for this symbol's documentation entry.
    pub fn anchor(&self) -> String {
        self.entry.anchor_for(&self.fullname())
    }
}

/// A complete Sphinx search index.
///
/// Field order matches the (alphabetical) key order Sphinx writes, so
/// serialization reproduces the original layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchIndex {
    /// Document identifiers, one per documentation page
    pub docnames: Vec<String>,

    /// Versions of the Sphinx domains/extensions that built the index
    #[serde(default)]
    pub envversion: IndexMap<String, u64>,

    /// Source file paths, positionally aligned with `docnames`
    pub filenames: Vec<String>,

    /// Object inventory: module path -> symbol name -> entry
    pub objects: IndexMap<String, IndexMap<String, ObjectEntry>>,

    /// Kind code -> human-readable kind description
    pub objnames: IndexMap<KindCode, ObjectKind>,

    /// Kind code -> `domain:kind` string
    pub objtypes: IndexMap<KindCode, String>,

    /// Stemmed body term -> documents containing it
    pub terms: IndexMap<String, Postings>,

    /// Document titles, positionally aligned with `docnames`
    pub titles: Vec<String>,

    /// Stemmed title term -> documents whose title contains it
    pub titleterms: IndexMap<String, Postings>,
}

impl SearchIndex {
    /// Parse a complete `searchindex.js` file: the `Search.setIndex(...)`
    /// envelope around a JavaScript object literal.
    ///
    /// # Errors
    ///
    /// [`ParseError::MissingEnvelope`] / [`ParseError::UnclosedEnvelope`]
    /// when the call wrapper is absent or unbalanced, plus everything
    /// [`Self::parse_literal`] can return.
    pub fn parse_js(src: &str) -> Result<Self> {
        Self::parse_literal(strip_envelope(src)?)
    }

    /// Parse a bare object literal (the argument of `Search.setIndex`).
    ///
    /// # Errors
    ///
    /// [`ParseError`] for malformed literals or a literal whose shape
    /// does not match a search index.
    pub fn parse_literal(src: &str) -> Result<Self> {
        let value = literal::parse_literal(src)?;
        let index = serde_json::from_value(value)
            .map_err(|e| ParseError::Shape(e.to_string()))?;
        Ok(index)
    }

    /// Read and parse a `searchindex.js` file from disk.
    ///
    /// # Errors
    ///
    /// I/O errors from reading the file, plus everything
    /// [`Self::parse_js`] can return.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let src = std::fs::read_to_string(path)?;
        Self::parse_js(&src)
    }

    /// Re-emit the index as a `Search.setIndex(...)` payload.
    ///
    /// The argument is serialized as compact JSON, which is a valid
    /// JavaScript object literal, so the output loads in the browser
    /// exactly like a build-produced file.
    ///
    /// # Errors
    ///
    /// Serialization errors from `serde_json` (not expected for any
    /// index this crate can represent).
    pub fn to_setindex_js(&self) -> Result<String> {
        Ok(format!("Search.setIndex({})", serde_json::to_string(self)?))
    }

    /// Number of documents in the index.
    pub fn doc_count(&self) -> usize {
        self.docnames.len()
    }

    /// Docname for a document, if the id is in bounds.
    pub fn docname(&self, doc: DocId) -> Option<&str> {
        self.docnames.get(doc.0).map(String::as_str)
    }

    /// Source filename for a document, if the id is in bounds.
    pub fn filename(&self, doc: DocId) -> Option<&str> {
        self.filenames.get(doc.0).map(String::as_str)
    }

    /// Title for a document, if the id is in bounds.
    pub fn title(&self, doc: DocId) -> Option<&str> {
        self.titles.get(doc.0).map(String::as_str)
    }

    /// Kind description for a kind code.
    pub fn object_kind(&self, kind: KindCode) -> Option<&ObjectKind> {
        self.objnames.get(&kind)
    }

    /// Iterate over every symbol in the object inventory.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol<'_>> {
        self.objects.iter().flat_map(|(module, table)| {
            table.iter().map(move |(name, entry)| Symbol {
                module,
                name,
                entry,
            })
        })
    }

    /// Total number of inventory entries.
    pub fn object_count(&self) -> usize {
        self.objects.values().map(IndexMap::len).sum()
    }

    /// Look up a symbol by fully qualified name.
    ///
    /// The inventory groups symbols by module path, so
    /// `relay.client.connect` is found under module `relay.client`,
    /// name `connect`.
    pub fn lookup_object(&self, fullname: &str) -> Option<Symbol<'_>> {
        for (module, table) in &self.objects {
            let rest = if module.is_empty() {
                fullname
            } else if let Some(rest) = fullname
                .strip_prefix(module.as_str())
                .and_then(|r| r.strip_prefix('.'))
            {
                rest
            } else {
                continue;
            };
            if let Some((name, entry)) = table.get_key_value(rest) {
                return Some(Symbol {
                    module,
                    name,
                    entry,
                });
            }
        }
        None
    }
}

/// Strip the `Search.setIndex(` ... `)` wrapper, tolerating a UTF-8 BOM,
/// surrounding whitespace, and a trailing semicolon.
fn strip_envelope(src: &str) -> std::result::Result<&str, ParseError> {
    let s = src.trim_start_matches('\u{feff}').trim();
    let rest = s
        .strip_prefix("Search.setIndex(")
        .ok_or(ParseError::MissingEnvelope)?;
    let rest = rest.trim_end();
    let rest = rest.strip_suffix(';').unwrap_or(rest).trim_end();
    rest.strip_suffix(')')
        .map(str::trim)
        .ok_or(ParseError::UnclosedEnvelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postings_roundtrip_collapses_singletons() {
        let one = Postings::from(vec![DocId(3)]);
        assert_eq!(serde_json::to_string(&one).expect("serialize"), "3");
        let many = Postings::from(vec![DocId(0), DocId(2)]);
        assert_eq!(serde_json::to_string(&many).expect("serialize"), "[0,2]");

        let parsed: Postings = serde_json::from_str("3").expect("deserialize");
        assert_eq!(parsed, one);
        let parsed: Postings = serde_json::from_str("[0,2]").expect("deserialize");
        assert_eq!(parsed, many);
    }

    #[test]
    fn test_object_entry_is_a_tuple_on_the_wire() {
        let entry: ObjectEntry = serde_json::from_str(r#"[1,2,1,""]"#).expect("deserialize");
        assert_eq!(entry.doc, DocId(1));
        assert_eq!(entry.kind, KindCode(2));
        assert_eq!(entry.priority, 1);
        assert_eq!(
            serde_json::to_string(&entry).expect("serialize"),
            r#"[1,2,1,""]"#
        );
    }

    #[test]
    fn test_anchor_resolution() {
        let plain = ObjectEntry {
            doc: DocId(0),
            kind: KindCode(1),
            priority: 1,
            anchor: String::new(),
        };
        assert_eq!(plain.anchor_for("relay.client.connect"), "relay.client.connect");

        let module = ObjectEntry {
            anchor: "-".to_string(),
            ..plain.clone()
        };
        assert_eq!(module.anchor_for("relay.client"), "module-relay.client");

        let custom = ObjectEntry {
            anchor: "relay-custom".to_string(),
            ..plain
        };
        assert_eq!(custom.anchor_for("whatever"), "relay-custom");
    }

    #[test]
    fn test_envelope_stripping() {
        assert_eq!(strip_envelope("Search.setIndex({a:1})").expect("strip"), "{a:1}");
        assert_eq!(
            strip_envelope("\u{feff}  Search.setIndex({a:1});\n").expect("strip"),
            "{a:1}"
        );
        assert!(matches!(
            strip_envelope("setIndex({})"),
            Err(ParseError::MissingEnvelope)
        ));
        assert!(matches!(
            strip_envelope("Search.setIndex({}"),
            Err(ParseError::UnclosedEnvelope)
        ));
    }
}
