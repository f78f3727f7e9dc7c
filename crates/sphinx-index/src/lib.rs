//! # sphinx-index
//!
//! A toolkit for the search index a Sphinx documentation build emits
//! (`searchindex.js`): the `Search.setIndex({...})` payload that powers
//! client-side full-text search on a generated documentation site.
//!
//! The payload is a JavaScript object literal, not JSON, and it is
//! consumed read-only by a browser script. This crate covers the whole
//! lifecycle on the tooling side:
//!
//! - **Parse**: read the literal (bare identifier keys, single-quoted
//!   strings, `\u` escapes) into a typed [`SearchIndex`].
//! - **Validate**: check the internal consistency a build should
//!   guarantee, such as every referenced document index being in bounds
//!   and the two kind tables agreeing.
//! - **Search**: run ranked queries the way the browser widget does,
//!   including Porter stemming and the stock relevance weights.
//! - **Build**: assemble a new index from documents and an object
//!   inventory, and emit it as a working `searchindex.js`.
//!
//! ## Example
//!
//! ```
//! use sphinx_index::SearchIndex;
//!
//! let index = SearchIndex::parse_js(
//!     r#"Search.setIndex({docnames:["index"],envversion:{sphinx:56},
//!        filenames:["index.rst"],objects:{},objnames:{},objtypes:{},
//!        terms:{instal:0,quickstart:0},titles:["Overview"],
//!        titleterms:{overview:0}})"#,
//! )?;
//!
//! assert!(index.validate().is_ok());
//! let hits = index.search("installing");
//! assert_eq!(hits[0].docname, "index");
//! # Ok::<(), sphinx_index::IndexError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod error;
pub mod index;
pub mod literal;
pub mod search;
pub mod stem;
pub mod validate;

// Re-export main types
pub use builder::IndexBuilder;
pub use error::{IndexError, ParseError, Result, ValidateError};
pub use index::{DocId, KindCode, ObjectEntry, ObjectKind, Postings, SearchIndex, Symbol};
pub use search::{ScoreWeights, SearchHit, Searcher};
pub use validate::{Severity, ValidationReport, Violation};

/// sphinx-index version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
