//! Domain DTOs for the movie API.
//!
//! # Design
//! These types mirror the backend's wire contract but are defined
//! independently of the mock-server crate; integration tests catch schema
//! drift. Movie fields keep the catalog's OMDb-style capitalized names on
//! the wire, review and watchlist fields are camelCase — the serde renames
//! localize both conventions here so the rest of the crate is plain Rust.
//!
//! Deserialization is deliberately lenient (defaults on most fields): the
//! query facade degrades on failure, it does not want a missing `Poster`
//! field to turn a usable record into an error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which backend sub-system owns a movie record: the external catalog or the
/// locally administered custom collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    External,
    Custom,
}

impl Source {
    /// Id prefix the backend assigns to custom records.
    pub const CUSTOM_ID_PREFIX: &'static str = "custom_";

    /// Infer the owning sub-system from an id's shape. Fallback only —
    /// prefer an explicit `source` tag wherever one is available.
    pub fn from_id(id: &str) -> Self {
        if id.starts_with(Self::CUSTOM_ID_PREFIX) {
            Source::Custom
        } else {
            Source::External
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::External => "external",
            Source::Custom => "custom",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A movie record as returned by the catalog endpoints.
///
/// `response`/`error` carry the backend's inline failure convention: a
/// record with `Response == "False"` is a stub standing in for a movie that
/// could not be fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "imdbID", default)]
    pub id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster_url: String,
    #[serde(rename = "imdbRating", default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(rename = "Plot", default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(rename = "Director", default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(rename = "Actors", default, skip_serializing_if = "Option::is_none")]
    pub cast: Option<String>,
    #[serde(rename = "Genre", default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "Runtime", default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(rename = "Response", default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Explicit owning sub-system. Older catalog payloads omit it; use
    /// [`Movie::resolved_source`] instead of reading the field directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl Movie {
    /// The explicit source tag, falling back to the id-prefix heuristic
    /// when the backend did not send one.
    pub fn resolved_source(&self) -> Source {
        self.source.unwrap_or_else(|| Source::from_id(&self.id))
    }

    /// A displayable stub for a movie that could not be fetched.
    pub fn error_stub(id: &str, message: &str) -> Self {
        Movie {
            id: id.to_string(),
            response: Some("False".to_string()),
            error: Some(message.to_string()),
            ..Movie::default()
        }
    }

    /// Whether this record is an error stub rather than real catalog data.
    pub fn is_error(&self) -> bool {
        self.response.as_deref() == Some("False")
    }
}

impl Default for Movie {
    fn default() -> Self {
        Movie {
            id: String::new(),
            title: String::new(),
            year: String::new(),
            poster_url: String::new(),
            rating: None,
            plot: None,
            director: None,
            cast: None,
            genre: None,
            runtime: None,
            response: None,
            error: None,
            source: None,
        }
    }
}

/// Authenticated identity returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Envelope shared by `/auth/login` and `/auth/register`: both sign the
/// caller in and issue a token.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub user: Option<User>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub success: bool,
    pub user: Option<User>,
}

/// One page of search results, OMDb envelope shape. `Response` is `"True"`
/// on a hit, `"False"` otherwise; `totalResults` is a stringly count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(rename = "Search", default)]
    pub search: Vec<Movie>,
    #[serde(rename = "totalResults", default)]
    pub total_results: String,
    #[serde(rename = "Response")]
    pub response: String,
}

impl SearchPage {
    /// The degraded result every failed search collapses to.
    pub fn empty() -> Self {
        SearchPage {
            search: Vec::new(),
            total_results: "0".to_string(),
            response: "False".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopRatedPage {
    #[serde(default)]
    pub movies: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u32,
}

impl TopRatedPage {
    pub fn empty() -> Self {
        TopRatedPage {
            movies: Vec::new(),
            total_pages: 0,
        }
    }
}

/// Admin create-movie payload. The backend assigns the id (with the
/// `custom_` prefix) and tags the record `source = custom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genre: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
}

/// Result of the admin create path. Mirrors failure into `success = false`
/// plus a message so a form can render inline feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMovieOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie: Option<Movie>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreateMovieOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        CreateMovieOutcome {
            success: false,
            movie: None,
            error: Some(message.into()),
        }
    }
}

/// A user review, camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub author: String,
    pub movie_id: String,
    pub movie_source: Source,
    pub rating: u8,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub helpful_count: u32,
    #[serde(default)]
    pub total_votes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_reviews: u32,
    pub average_rating: f64,
    pub recommendation_percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewsPage {
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub stats: ReviewStats,
}

impl ReviewsPage {
    pub fn empty() -> Self {
        ReviewsPage::default()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub movie_id: String,
    pub movie_source: Source,
    pub title: String,
    pub content: String,
    pub rating: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<Review>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreateReviewOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        CreateReviewOutcome {
            success: false,
            review: None,
            error: Some(message.into()),
        }
    }
}

/// Denormalized display snapshot stored with a watchlist entry so the UI
/// never re-fetches the catalog to render the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSnapshot {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub poster: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
}

impl MovieSnapshot {
    pub fn from_movie(movie: &Movie) -> Self {
        MovieSnapshot {
            title: movie.title.clone(),
            year: movie.year.clone(),
            poster: movie.poster_url.clone(),
            rating: movie.rating.clone(),
        }
    }
}

/// One saved movie in the authenticated user's watchlist. The source tag is
/// always present here — entries only exist after resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub movie_id: String,
    #[serde(rename = "movieSource")]
    pub source: Source,
    pub movie_data: MovieSnapshot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistPage {
    #[serde(default)]
    pub watchlist: Vec<WatchlistEntry>,
    #[serde(default)]
    pub total: u32,
}
