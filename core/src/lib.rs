//! Client coordination core for a movie-discovery front end.
//!
//! # Overview
//! Coordinates authentication, a per-user watchlist cache, and read-oriented
//! movie/review queries against a remote JSON API. The presentation layer is
//! out of scope; these stores are what it calls into.
//!
//! # Design
//! - I/O goes through the [`Transport`] trait: the core builds
//!   `HttpRequest` values as plain data and interprets `HttpResponse`
//!   values, so every behavior is testable with a scripted transport.
//! - [`SessionStore`] owns the bearer token lifecycle; [`ApiClient`] only
//!   reads it. On any ambiguity the session fails closed.
//! - [`WatchlistCache`] mirrors the server-side list: the backend is the
//!   single source of truth, and failed mutations leave the cache exactly
//!   as it was.
//! - [`MovieQueries`] degrades every read to a typed empty result, so the
//!   rendering layer always has something displayable.

pub mod api;
pub mod error;
pub mod http;
pub mod queries;
pub mod session;
pub mod token;
pub mod types;
pub mod watchlist;

pub use api::{ApiClient, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use queries::MovieQueries;
pub use session::{SessionState, SessionStore};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::{
    CreateMovieOutcome, CreateReviewOutcome, Movie, MovieSnapshot, NewMovie, NewReview, Review,
    ReviewStats, ReviewsPage, Role, SearchPage, Source, TopRatedPage, User, WatchlistEntry,
};
pub use watchlist::WatchlistCache;
