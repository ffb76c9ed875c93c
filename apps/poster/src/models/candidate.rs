use serde::{Deserialize, Serialize};

/// One ranked item from the feed. Never mutated after it is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// The feed's unique identifier; this is the dedup key.
    pub id: String,
    pub title: String,
    pub url: String,
    pub score: i64,
}

impl Candidate {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        score: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            score,
        }
    }
}
