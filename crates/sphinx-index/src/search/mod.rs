//! Ranked full-text and object-inventory search
//!
//! Reimplements, against the parsed index, what the browser-side search
//! script does at query time:
//!
//! - query words are stemmed the way the index terms were stemmed;
//! - the object inventory is matched by symbol name (exact or substring);
//! - body and title terms are matched exactly and by substring;
//! - a document only qualifies for a full-text hit when *every*
//!   non-stopword query word matched it somewhere.

mod score;
mod types;

pub use score::ScoreWeights;
pub use types::SearchHit;

use std::cmp::Ordering;
use std::collections::HashMap;

use indexmap::IndexMap;

use crate::index::{DocId, Postings, SearchIndex};
use crate::stem::{normalize_query, QueryWord};

/// Query engine over a borrowed [`SearchIndex`].
#[derive(Debug, Clone)]
pub struct Searcher<'a> {
    index: &'a SearchIndex,
    weights: ScoreWeights,
}

impl<'a> Searcher<'a> {
    /// Create a searcher with the stock widget weights.
    pub fn new(index: &'a SearchIndex) -> Self {
        Self::with_weights(index, ScoreWeights::default())
    }

    /// Create a searcher with custom weights.
    pub fn with_weights(index: &'a SearchIndex, weights: ScoreWeights) -> Self {
        Self { index, weights }
    }

    /// Run a query and return hits ranked by descending score.
    ///
    /// Ties are broken by docname, then by symbol name, so results are
    /// deterministic.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let words = normalize_query(query);
        // A stopword survives only when the index stores it verbatim
        // (the widget does the same).
        let kept: Vec<&QueryWord> = words
            .iter()
            .filter(|w| !w.stopword || self.index.terms.contains_key(&w.original))
            .collect();
        if kept.is_empty() {
            return Vec::new();
        }

        let mut hits = self.object_hits(&kept);
        hits.extend(self.fulltext_hits(&kept));
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.docname.cmp(&b.docname))
                .then_with(|| a.object.cmp(&b.object))
        });
        hits
    }

    /// Match query words against the object inventory. Each symbol keeps
    /// its best-scoring match.
    fn object_hits(&self, words: &[&QueryWord]) -> Vec<SearchHit> {
        let mut best: HashMap<String, SearchHit> = HashMap::new();
        for word in words {
            let needle = word.original.as_str();
            for symbol in self.index.symbols() {
                let fullname = symbol.fullname();
                let name = symbol.name.to_lowercase();
                let base = if name == needle {
                    self.weights.obj_name_match
                } else if name.contains(needle) || fullname.to_lowercase().contains(needle) {
                    self.weights.obj_partial_match
                } else {
                    continue;
                };
                let score = base + self.weights.priority_bonus(symbol.entry.priority);
                // Out-of-bounds entries are dropped, not surfaced: a
                // broken index degrades to fewer results.
                let Some(docname) = self.index.docname(symbol.entry.doc) else {
                    continue;
                };
                let hit = SearchHit {
                    doc: symbol.entry.doc,
                    docname: docname.to_string(),
                    title: self
                        .index
                        .title(symbol.entry.doc)
                        .unwrap_or_default()
                        .to_string(),
                    score,
                    anchor: Some(symbol.anchor()),
                    object: Some(fullname.clone()),
                    matched: vec![needle.to_string()],
                };
                match best.get(&fullname) {
                    Some(existing) if existing.score >= hit.score => {}
                    _ => {
                        best.insert(fullname, hit);
                    }
                }
            }
        }
        best.into_values().collect()
    }

    /// Match query words against the body and title term maps. A
    /// document qualifies only when every word matched it; its score is
    /// the sum of the best per-word weights.
    fn fulltext_hits(&self, words: &[&QueryWord]) -> Vec<SearchHit> {
        // Per query word: document -> (best weight, which indexed term).
        let mut per_word: Vec<HashMap<DocId, (f32, String)>> = Vec::with_capacity(words.len());
        for word in words {
            let lookup = self.lookup_term(word);
            let mut matches: HashMap<DocId, (f32, String)> = HashMap::new();
            collect_exact(&mut matches, &self.index.terms, lookup, self.weights.term);
            collect_partial(
                &mut matches,
                &self.index.terms,
                lookup,
                self.weights.partial_term,
            );
            collect_exact(
                &mut matches,
                &self.index.titleterms,
                lookup,
                self.weights.title,
            );
            collect_partial(
                &mut matches,
                &self.index.titleterms,
                lookup,
                self.weights.partial_title,
            );
            if matches.is_empty() {
                // One word with no hits anywhere sinks the whole query.
                return Vec::new();
            }
            per_word.push(matches);
        }

        let (first, rest) = match per_word.split_first() {
            Some(split) => split,
            None => return Vec::new(),
        };
        let mut hits = Vec::new();
        'docs: for (doc, (weight, term)) in first {
            let mut score = *weight;
            let mut matched = vec![term.clone()];
            for other in rest {
                match other.get(doc) {
                    Some((w, t)) => {
                        score += w;
                        if !matched.contains(t) {
                            matched.push(t.clone());
                        }
                    }
                    None => continue 'docs,
                }
            }
            let Some(docname) = self.index.docname(*doc) else {
                continue;
            };
            matched.sort_unstable();
            hits.push(SearchHit {
                doc: *doc,
                docname: docname.to_string(),
                title: self.index.title(*doc).unwrap_or_default().to_string(),
                score,
                object: None,
                anchor: None,
                matched,
            });
        }
        hits
    }

    /// Pick the indexed form of a query word: the stem when the index
    /// knows it, otherwise the word as typed (numeric terms like `24hr`
    /// and already-stemmed input both land here).
    fn lookup_term<'b>(&self, word: &'b QueryWord) -> &'b str {
        if self.index.terms.contains_key(&word.stemmed)
            || self.index.titleterms.contains_key(&word.stemmed)
        {
            &word.stemmed
        } else {
            &word.original
        }
    }
}

impl SearchIndex {
    /// Run a query with the stock weights. Convenience for
    /// [`Searcher::search`].
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        Searcher::new(self).search(query)
    }
}

fn collect_exact(
    matches: &mut HashMap<DocId, (f32, String)>,
    table: &IndexMap<String, Postings>,
    term: &str,
    weight: f32,
) {
    if let Some(postings) = table.get(term) {
        for doc in postings {
            insert_max(matches, doc, weight, term);
        }
    }
}

/// Substring matches: every indexed term that *contains* the query word,
/// other than the exact term itself.
fn collect_partial(
    matches: &mut HashMap<DocId, (f32, String)>,
    table: &IndexMap<String, Postings>,
    term: &str,
    weight: f32,
) {
    for (indexed, postings) in table {
        if indexed != term && indexed.contains(term) {
            for doc in postings {
                insert_max(matches, doc, weight, indexed);
            }
        }
    }
}

/// Keep the strongest weight a word achieved for a document.
fn insert_max(matches: &mut HashMap<DocId, (f32, String)>, doc: DocId, weight: f32, term: &str) {
    match matches.get(&doc) {
        Some((existing, _)) if existing.total_cmp(&weight) != Ordering::Less => {}
        _ => {
            matches.insert(doc, (weight, term.to_string()));
        }
    }
}
