//! In-memory implementation of the movie backend HTTP contract.
//!
//! # Design
//! Everything lives behind one `Arc<RwLock<AppState>>`: a seeded movie
//! catalog, two fixed accounts, issued bearer tokens, per-user watchlists,
//! and reviews. The wire shapes mirror the real backend — OMDb-style
//! capitalized movie fields, camelCase review/watchlist fields, error
//! bodies of the form `{"error": "..."}` — so the client core's integration
//! tests exercise the exact contract it ships against.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Poster")]
    pub poster: String,
    #[serde(rename = "imdbRating", skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(rename = "Plot", skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(rename = "Director", skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(rename = "Actors", skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(rename = "Genre", skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "Runtime", skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    /// Owning sub-system: `"external"` for the seeded catalog, `"custom"`
    /// for admin-created records. Always present in responses.
    pub source: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Clone, Debug)]
struct Account {
    user: User,
    password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub movie_id: String,
    pub movie_source: String,
    pub movie_data: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub author: String,
    pub movie_id: String,
    pub movie_source: String,
    pub rating: u8,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub helpful_count: u32,
    pub total_votes: u32,
}

#[derive(Debug, Default)]
pub struct AppState {
    movies: Vec<Movie>,
    accounts: Vec<Account>,
    /// token -> user id
    tokens: HashMap<String, String>,
    /// user id -> saved entries
    watchlists: HashMap<String, Vec<WatchlistItem>>,
    reviews: Vec<Review>,
}

pub type Db = Arc<RwLock<AppState>>;

const SEARCH_PAGE_SIZE: usize = 10;
const TOP_RATED_PAGE_SIZE: usize = 4;

fn seed() -> AppState {
    let external = |id: &str, title: &str, year: &str, rating: &str, genre: &str| Movie {
        id: id.to_string(),
        title: title.to_string(),
        year: year.to_string(),
        poster: format!("https://posters.example.com/{id}.jpg"),
        rating: Some(rating.to_string()),
        plot: Some(format!("{title} plot.")),
        director: None,
        actors: None,
        genre: Some(genre.to_string()),
        runtime: None,
        source: "external".to_string(),
    };
    let account = |id: &str, email: &str, name: &str, role: &str, password: &str| Account {
        user: User {
            id: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role: role.to_string(),
        },
        password: password.to_string(),
    };
    AppState {
        movies: vec![
            external("tt0468569", "The Dark Knight", "2008", "9.0", "Action"),
            external("tt0068646", "The Godfather", "1972", "9.2", "Crime"),
            external("tt1375666", "Inception", "2010", "8.8", "Sci-Fi"),
            external("tt0110912", "Pulp Fiction", "1994", "8.9", "Crime"),
            external("tt0133093", "The Matrix", "1999", "8.7", "Sci-Fi"),
            external("tt0034583", "Casablanca", "1942", "8.5", "Romance"),
            external("tt15239678", "Dune: Part Two", "2024", "8.5", "Sci-Fi"),
            external("tt15398776", "Oppenheimer", "2023", "8.3", "Biography"),
        ],
        accounts: vec![
            account("1", "admin@moviedb.com", "Admin User", "admin", "admin123"),
            account("2", "user@moviedb.com", "John Doe", "user", "user123"),
        ],
        ..AppState::default()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/verify", get(verify))
        .route("/auth/logout", post(logout))
        .route("/movies/search", get(search_movies))
        .route("/movies/lists/featured", get(featured))
        .route("/movies/lists/top-rated", get(top_rated))
        .route("/movies/lists/new-releases", get(new_releases))
        .route("/movies", post(create_movie))
        .route("/movies/{id}", get(get_movie))
        .route("/reviews/movie/{id}", get(movie_reviews))
        .route("/reviews", post(create_review))
        .route("/watchlist", post(watchlist_add).get(watchlist_get).delete(watchlist_clear))
        .route("/watchlist/{movie_id}", delete(watchlist_remove))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type ApiError = (StatusCode, Json<Value>);

fn error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Resolve the bearer token to an account, or 401.
async fn authenticate(db: &Db, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Authentication required"))?;
    let state = db.read().await;
    let user_id = state
        .tokens
        .get(&token)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Invalid or expired token"))?;
    state
        .accounts
        .iter()
        .find(|a| &a.user.id == user_id)
        .map(|a| a.user.clone())
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Invalid or expired token"))
}

// --- auth ---

#[derive(Deserialize)]
struct LoginInput {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct RegisterInput {
    email: String,
    password: String,
    name: String,
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if input.email.is_empty() || input.password.is_empty() || input.name.is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "Email, password and name are required"));
    }
    let mut state = db.write().await;
    if state.accounts.iter().any(|a| a.user.email == input.email) {
        return Err(error(StatusCode::CONFLICT, "Email already registered"));
    }
    let user = User {
        id: (state.accounts.len() + 1).to_string(),
        email: input.email,
        name: input.name,
        role: "user".to_string(),
    };
    state.accounts.push(Account {
        user: user.clone(),
        password: input.password,
    });
    // registration signs the new account in
    let token = Uuid::new_v4().to_string();
    state.tokens.insert(token.clone(), user.id.clone());
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "user": user, "token": token })),
    ))
}

async fn login(State(db): State<Db>, Json(input): Json<LoginInput>) -> Result<Json<Value>, ApiError> {
    let mut state = db.write().await;
    let account = state
        .accounts
        .iter()
        .find(|a| a.user.email == input.email && a.password == input.password)
        .cloned()
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;
    let token = Uuid::new_v4().to_string();
    state.tokens.insert(token.clone(), account.user.id.clone());
    Ok(Json(json!({ "success": true, "user": account.user, "token": token })))
}

async fn verify(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let user = authenticate(&db, &headers).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    authenticate(&db, &headers).await?;
    if let Some(token) = bearer_token(&headers) {
        db.write().await.tokens.remove(&token);
    }
    Ok(Json(json!({ "success": true })))
}

// --- movies ---

fn default_page() -> usize {
    1
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    #[serde(default = "default_page")]
    page: usize,
}

async fn search_movies(
    State(db): State<Db>,
    Query(params): Query<SearchParams>,
) -> Json<Value> {
    let state = db.read().await;
    let needle = params.q.to_lowercase();
    let matches: Vec<&Movie> = state
        .movies
        .iter()
        .filter(|m| !needle.is_empty() && m.title.to_lowercase().contains(&needle))
        .collect();
    let total = matches.len();
    let page: Vec<&Movie> = matches
        .into_iter()
        .skip(params.page.saturating_sub(1) * SEARCH_PAGE_SIZE)
        .take(SEARCH_PAGE_SIZE)
        .collect();
    if page.is_empty() {
        return Json(json!({
            "Search": [],
            "totalResults": "0",
            "Response": "False",
            "Error": "Movie not found!"
        }));
    }
    Json(json!({
        "Search": page,
        "totalResults": total.to_string(),
        "Response": "True"
    }))
}

async fn get_movie(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let state = db.read().await;
    let movie = state
        .movies
        .iter()
        .find(|m| m.id == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Movie not found"))?;
    let mut value = serde_json::to_value(movie)
        .map_err(|_| error(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed"))?;
    value["Response"] = json!("True");
    Ok(Json(value))
}

#[derive(Deserialize)]
struct NewMovieInput {
    title: String,
    year: String,
    #[serde(default)]
    runtime: Option<String>,
    #[serde(default)]
    director: Option<String>,
    #[serde(default)]
    actors: Option<String>,
    #[serde(default)]
    genre: Vec<String>,
    #[serde(default)]
    plot: Option<String>,
    #[serde(default)]
    poster: Option<String>,
    #[serde(default)]
    rating: Option<String>,
}

async fn create_movie(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<NewMovieInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user = authenticate(&db, &headers).await?;
    if user.role != "admin" {
        return Err(error(StatusCode::FORBIDDEN, "Admin access required"));
    }
    let movie = Movie {
        id: format!("custom_{}", Uuid::new_v4().simple()),
        title: input.title,
        year: input.year,
        poster: input.poster.unwrap_or_default(),
        rating: input.rating,
        plot: input.plot,
        director: input.director,
        actors: input.actors,
        genre: if input.genre.is_empty() {
            None
        } else {
            Some(input.genre.join(", "))
        },
        runtime: input.runtime,
        source: "custom".to_string(),
    };
    db.write().await.movies.push(movie.clone());
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "movie": movie })),
    ))
}

async fn featured(State(db): State<Db>) -> Json<Vec<Movie>> {
    let state = db.read().await;
    let mut movies: Vec<Movie> = state
        .movies
        .iter()
        .filter(|m| rating_of(m) >= 8.5)
        .cloned()
        .collect();
    movies.sort_by(|a, b| rating_of(b).total_cmp(&rating_of(a)));
    movies.truncate(6);
    Json(movies)
}

#[derive(Deserialize)]
struct PageParams {
    #[serde(default = "default_page")]
    page: usize,
}

async fn top_rated(State(db): State<Db>, Query(params): Query<PageParams>) -> Json<Value> {
    let state = db.read().await;
    let mut movies: Vec<Movie> = state
        .movies
        .iter()
        .filter(|m| rating_of(m) >= 7.0)
        .cloned()
        .collect();
    movies.sort_by(|a, b| rating_of(b).total_cmp(&rating_of(a)));
    let total_pages = movies.len().div_ceil(TOP_RATED_PAGE_SIZE);
    let page: Vec<Movie> = movies
        .into_iter()
        .skip(params.page.saturating_sub(1) * TOP_RATED_PAGE_SIZE)
        .take(TOP_RATED_PAGE_SIZE)
        .collect();
    Json(json!({ "movies": page, "totalPages": total_pages }))
}

async fn new_releases(State(db): State<Db>) -> Json<Vec<Movie>> {
    let state = db.read().await;
    let movies: Vec<Movie> = state
        .movies
        .iter()
        .filter(|m| m.year.parse::<u32>().is_ok_and(|y| y >= 2020))
        .cloned()
        .collect();
    Json(movies)
}

fn rating_of(movie: &Movie) -> f64 {
    movie
        .rating
        .as_deref()
        .and_then(|r| r.parse().ok())
        .unwrap_or(0.0)
}

// --- reviews ---

#[derive(Deserialize)]
struct ReviewQuery {
    #[serde(default = "default_source")]
    source: String,
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_source() -> String {
    "external".to_string()
}

fn default_limit() -> usize {
    20
}

async fn movie_reviews(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<ReviewQuery>,
) -> Json<Value> {
    let state = db.read().await;
    let matching: Vec<&Review> = state
        .reviews
        .iter()
        .filter(|r| r.movie_id == id && r.movie_source == params.source)
        .collect();
    let stats = review_stats(&matching);
    let page: Vec<&Review> = matching
        .into_iter()
        .skip(params.page.saturating_sub(1) * params.limit)
        .take(params.limit)
        .collect();
    Json(json!({ "reviews": page, "stats": stats }))
}

fn review_stats(reviews: &[&Review]) -> Value {
    let total = reviews.len();
    if total == 0 {
        return json!({
            "totalReviews": 0,
            "averageRating": 0.0,
            "recommendationPercentage": 0.0
        });
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    let average = (f64::from(sum) / total as f64 * 10.0).round() / 10.0;
    let recommending = reviews.iter().filter(|r| r.rating >= 4).count();
    let percentage = (recommending as f64 / total as f64 * 1000.0).round() / 10.0;
    json!({
        "totalReviews": total,
        "averageRating": average,
        "recommendationPercentage": percentage
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewReviewInput {
    movie_id: String,
    movie_source: String,
    title: String,
    content: String,
    rating: u8,
}

async fn create_review(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<NewReviewInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user = authenticate(&db, &headers).await?;
    if !(1..=5).contains(&input.rating) {
        return Err(error(StatusCode::BAD_REQUEST, "Rating must be between 1 and 5"));
    }
    let review = Review {
        id: Uuid::new_v4().to_string(),
        author: user.name,
        movie_id: input.movie_id,
        movie_source: input.movie_source,
        rating: input.rating,
        title: input.title,
        content: input.content,
        created_at: chrono::Utc::now().to_rfc3339(),
        helpful_count: 0,
        total_votes: 0,
    };
    db.write().await.reviews.push(review.clone());
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "review": review })),
    ))
}

// --- watchlist ---

async fn watchlist_add(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(item): Json<WatchlistItem>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user = authenticate(&db, &headers).await?;
    let mut state = db.write().await;
    let list = state.watchlists.entry(user.id).or_default();
    // at most one entry per (user, movie, source)
    if list
        .iter()
        .any(|e| e.movie_id == item.movie_id && e.movie_source == item.movie_source)
    {
        return Err(error(StatusCode::CONFLICT, "Already in watchlist"));
    }
    list.push(item);
    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}

#[derive(Deserialize)]
struct WatchlistParams {
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_watchlist_limit")]
    limit: usize,
}

fn default_watchlist_limit() -> usize {
    50
}

async fn watchlist_get(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<WatchlistParams>,
) -> Result<Json<Value>, ApiError> {
    let user = authenticate(&db, &headers).await?;
    let state = db.read().await;
    let list = state.watchlists.get(&user.id).cloned().unwrap_or_default();
    let total = list.len();
    let page: Vec<WatchlistItem> = list
        .into_iter()
        .skip(params.page.saturating_sub(1) * params.limit)
        .take(params.limit)
        .collect();
    Ok(Json(json!({ "watchlist": page, "total": total })))
}

#[derive(Deserialize)]
struct RemoveParams {
    #[serde(default = "default_source")]
    source: String,
}

async fn watchlist_remove(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(movie_id): Path<String>,
    Query(params): Query<RemoveParams>,
) -> Result<Json<Value>, ApiError> {
    let user = authenticate(&db, &headers).await?;
    let mut state = db.write().await;
    let list = state.watchlists.entry(user.id).or_default();
    let before = list.len();
    list.retain(|e| !(e.movie_id == movie_id && e.movie_source == params.source));
    if list.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "Not in watchlist"));
    }
    Ok(Json(json!({ "success": true })))
}

async fn watchlist_clear(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let user = authenticate(&db, &headers).await?;
    db.write().await.watchlists.remove(&user.id);
    Ok(Json(json!({ "success": true })))
}
