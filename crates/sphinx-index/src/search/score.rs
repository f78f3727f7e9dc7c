//! Relevance weights.
//!
//! The defaults are the stock weights the browser search widget ships,
//! so a query here ranks the same way it would on the rendered site.

/// Relevance weights used by [`Searcher`](super::Searcher).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWeights {
    /// A query word equals an object's name
    pub obj_name_match: f32,

    /// A query word is a substring of an object's (full) name
    pub obj_partial_match: f32,

    /// Bonus by object priority (0 = important, 1 = default,
    /// 2 = de-emphasized)
    pub obj_prio: [f32; 3],

    /// Bonus for priorities outside the table above
    pub obj_prio_default: f32,

    /// Exact hit in a document title
    pub title: f32,

    /// Substring hit in a title term
    pub partial_title: f32,

    /// Exact hit in a document body
    pub term: f32,

    /// Substring hit in a body term
    pub partial_term: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            obj_name_match: 11.0,
            obj_partial_match: 6.0,
            obj_prio: [15.0, 5.0, -5.0],
            obj_prio_default: 0.0,
            title: 15.0,
            partial_title: 7.0,
            term: 5.0,
            partial_term: 2.0,
        }
    }
}

impl ScoreWeights {
    /// Bonus contributed by an object entry's priority.
    pub fn priority_bonus(&self, priority: i64) -> f32 {
        match priority {
            0..=2 => self.obj_prio[priority as usize],
            _ => self.obj_prio_default,
        }
    }
}
