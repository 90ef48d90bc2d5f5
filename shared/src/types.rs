use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A movie row as handed back to clients: every attribute flattened to text.
pub type DecodedItem = HashMap<String, String>;

// ========== MOVIE ==========
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub movie_id: String,
    pub title: String,
    pub overview: String,
    pub genre: String,
    pub user_id: String,
    pub username: String,
    pub grinning_score: u64,
    pub created_at: String, // ISO-8601, assigned by the service
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieRequest {
    pub movie_id: String,
    pub user_id: String,
    pub username: String,
    pub title: String,
    pub overview: String,
    pub genre: String,
}

impl CreateMovieRequest {
    /// Builds the row to store. Score and timestamp never come from the client.
    pub fn into_record(self, created_at: String) -> MovieRecord {
        MovieRecord {
            movie_id: self.movie_id,
            title: self.title,
            overview: self.overview,
            genre: self.genre,
            user_id: self.user_id,
            username: self.username,
            grinning_score: 0,
            created_at,
        }
    }
}

// ========== SCORE ==========
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdateRequest {
    pub grinning_score: String, // integer as text
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreIncrement {
    pub movie_id: String,
    pub delta: u64,
}

// ========== FILTER ==========
/// Optional equality filters accepted by the list endpoint.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MovieFilter {
    pub user_id: Option<String>,
    pub genre: Option<String>,
    pub title: Option<String>,
}

// ========== RESPONSES ==========
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
