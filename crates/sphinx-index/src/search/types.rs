//! Search result types.

use serde::Serialize;

use crate::index::DocId;

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Document the hit points at
    pub doc: DocId,

    /// Docname of that document
    pub docname: String,

    /// Title of that document
    pub title: String,

    /// Relevance score (higher is better)
    pub score: f32,

    /// Fully qualified symbol name, for object-inventory hits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,

    /// URL fragment within the document, for object-inventory hits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,

    /// The indexed terms (or symbol) the query words matched
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched: Vec<String>,
}
