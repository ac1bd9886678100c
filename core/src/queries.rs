//! Read-oriented movie and review queries with graceful degradation.
//!
//! Every operation here feeds a rendering layer that must always have
//! something displayable, so failures never escape: a failed search is an
//! empty page, a failed detail fetch is a stub record carrying the error
//! message, failed stats are zeroes. The underlying `ApiError` is logged
//! at `warn` and dropped.

use tracing::warn;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::types::{
    CreateMovieOutcome, CreateReviewOutcome, Movie, NewMovie, NewReview, ReviewsPage, SearchPage,
    Source, TopRatedPage,
};

#[derive(Debug, Clone)]
pub struct MovieQueries {
    api: ApiClient,
}

impl MovieQueries {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// One page of title matches. Failure collapses to the canonical empty
    /// page: `{Search: [], totalResults: "0", Response: "False"}`.
    pub fn search_movies(&self, query: &str, page: u32) -> SearchPage {
        let params = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", query)
            .append_pair("page", &page.to_string())
            .finish();
        match self.api.get(&format!("/movies/search?{params}")) {
            Ok(results) => results,
            Err(e) => {
                warn!(query, error = %e, "movie search failed");
                SearchPage::empty()
            }
        }
    }

    /// Full detail record, or an error stub with `Response = "False"` when
    /// the movie is missing or the backend is unreachable.
    pub fn get_movie_by_id(&self, id: &str) -> Movie {
        match self.api.get::<Movie>(&format!("/movies/{id}")) {
            Ok(movie) => movie,
            Err(e) => {
                warn!(id, error = %e, "movie fetch failed");
                Movie::error_stub(id, &degrade_message(&e))
            }
        }
    }

    pub fn get_featured_movies(&self) -> Vec<Movie> {
        self.api.get("/movies/lists/featured").unwrap_or_else(|e| {
            warn!(error = %e, "featured list fetch failed");
            Vec::new()
        })
    }

    pub fn get_new_releases(&self) -> Vec<Movie> {
        self.api
            .get("/movies/lists/new-releases")
            .unwrap_or_else(|e| {
                warn!(error = %e, "new releases fetch failed");
                Vec::new()
            })
    }

    pub fn get_top_rated_movies(&self, page: u32) -> TopRatedPage {
        self.api
            .get(&format!("/movies/lists/top-rated?page={page}"))
            .unwrap_or_else(|e| {
                warn!(page, error = %e, "top rated fetch failed");
                TopRatedPage::empty()
            })
    }

    /// Admin create path. Failure is mirrored into the outcome (`success =
    /// false` plus a message) so the form can render inline feedback.
    pub fn create_movie(&self, movie: &NewMovie) -> CreateMovieOutcome {
        match self.api.post::<CreateMovieOutcome, _>("/movies", movie) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(title = %movie.title, error = %e, "movie create failed");
                CreateMovieOutcome::failure(degrade_message(&e))
            }
        }
    }

    /// Reviews plus aggregate stats for one movie. Zeroed stats and an
    /// empty list on failure.
    pub fn get_movie_reviews(
        &self,
        movie_id: &str,
        source: Source,
        page: u32,
        limit: u32,
    ) -> ReviewsPage {
        self.api
            .get(&format!(
                "/reviews/movie/{movie_id}?source={source}&page={page}&limit={limit}"
            ))
            .unwrap_or_else(|e| {
                warn!(movie_id, error = %e, "reviews fetch failed");
                ReviewsPage::empty()
            })
    }

    /// Authenticated review submission; pass-through with mirrored failure.
    pub fn create_review(&self, review: &NewReview) -> CreateReviewOutcome {
        match self.api.post::<CreateReviewOutcome, _>("/reviews", review) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(movie_id = %review.movie_id, error = %e, "review create failed");
                CreateReviewOutcome::failure(degrade_message(&e))
            }
        }
    }
}

/// Human-readable reason for a degraded result: the server's own message
/// for HTTP failures, the error display otherwise.
fn degrade_message(error: &ApiError) -> String {
    match error {
        ApiError::Http { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
