use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<String> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

/// Log in through a shared app service and return the issued token.
async fn login(app: &mut axum::routing::RouterIntoService<String>, email: &str, password: &str) -> String {
    let resp = ServiceExt::<Request<String>>::ready(app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/auth/login",
            None,
            &format!(r#"{{"email":"{email}","password":"{password}"}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["success"], true);
    body["token"].as_str().unwrap().to_string()
}

// --- auth ---

#[tokio::test]
async fn login_with_valid_credentials_issues_token() {
    let mut app = app().into_service();
    let token = login(&mut app, "user@moviedb.com", "user123").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn login_with_invalid_credentials_returns_401() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            r#"{"email":"user@moviedb.com","password":"wrong"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn register_creates_account_and_issues_token() {
    let mut app = app().into_service();

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/auth/register",
            None,
            r#"{"email":"new@moviedb.com","password":"pw12345","name":"New User"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "user");
    let token = body["token"].as_str().unwrap().to_string();

    // the issued token resolves to the new identity
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/auth/verify", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["user"]["email"], "new@moviedb.com");

    // and the new credentials work for a later login
    let login_token = login(&mut app, "new@moviedb.com", "pw12345").await;
    assert!(!login_token.is_empty());
}

#[tokio::test]
async fn register_with_taken_email_is_conflict() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            None,
            r#"{"email":"user@moviedb.com","password":"x","name":"Imposter"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn register_with_blank_fields_is_rejected() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            None,
            r#"{"email":"","password":"pw","name":"X"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_without_token_returns_401() {
    let app = app();
    let resp = app.oneshot(get_request("/auth/verify", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_returns_identity_for_issued_token() {
    let mut app = app().into_service();
    let token = login(&mut app, "admin@moviedb.com", "admin123").await;

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/auth/verify", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn logout_invalidates_the_token() {
    let mut app = app().into_service();
    let token = login(&mut app, "user@moviedb.com", "user123").await;

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/auth/logout", Some(&token), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/auth/verify", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- movies ---

#[tokio::test]
async fn search_matches_by_title_substring() {
    let app = app();
    let resp = app
        .oneshot(get_request("/movies/search?q=dark&page=1", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["Response"], "True");
    assert_eq!(body["totalResults"], "1");
    assert_eq!(body["Search"][0]["imdbID"], "tt0468569");
}

#[tokio::test]
async fn search_without_match_reports_false() {
    let app = app();
    let resp = app
        .oneshot(get_request("/movies/search?q=zzzz&page=1", None))
        .await
        .unwrap();
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["Response"], "False");
    assert_eq!(body["totalResults"], "0");
}

#[tokio::test]
async fn get_movie_includes_response_flag() {
    let app = app();
    let resp = app
        .oneshot(get_request("/movies/tt0068646", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["Title"], "The Godfather");
    assert_eq!(body["Response"], "True");
    assert_eq!(body["source"], "external");
}

#[tokio::test]
async fn get_unknown_movie_returns_404() {
    let app = app();
    let resp = app.oneshot(get_request("/movies/tt404", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "Movie not found");
}

#[tokio::test]
async fn featured_is_sorted_by_rating() {
    let app = app();
    let resp = app
        .oneshot(get_request("/movies/lists/featured", None))
        .await
        .unwrap();
    let movies: Vec<serde_json::Value> = body_json(resp).await;
    assert!(!movies.is_empty());
    assert_eq!(movies[0]["imdbID"], "tt0068646"); // 9.2 tops the list
}

#[tokio::test]
async fn top_rated_paginates() {
    let mut app = app().into_service();

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/movies/lists/top-rated?page=1", None))
        .await
        .unwrap();
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["movies"].as_array().unwrap().len(), 4);

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/movies/lists/top-rated?page=3", None))
        .await
        .unwrap();
    let body: serde_json::Value = body_json(resp).await;
    assert!(body["movies"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn new_releases_are_recent_years() {
    let app = app();
    let resp = app
        .oneshot(get_request("/movies/lists/new-releases", None))
        .await
        .unwrap();
    let movies: Vec<serde_json::Value> = body_json(resp).await;
    assert_eq!(movies.len(), 2);
    for movie in movies {
        let year: u32 = movie["Year"].as_str().unwrap().parse().unwrap();
        assert!(year >= 2020);
    }
}

#[tokio::test]
async fn create_movie_requires_admin_role() {
    let mut app = app().into_service();
    let token = login(&mut app, "user@moviedb.com", "user123").await;

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/movies",
            Some(&token),
            r#"{"title":"Mine","year":"2024"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "Admin access required");
}

#[tokio::test]
async fn admin_creates_custom_movie() {
    let mut app = app().into_service();
    let token = login(&mut app, "admin@moviedb.com", "admin123").await;

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/movies",
            Some(&token),
            r#"{"title":"Mine","year":"2024","genre":["Drama","Indie"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["success"], true);
    let id = body["movie"]["imdbID"].as_str().unwrap();
    assert!(id.starts_with("custom_"));
    assert_eq!(body["movie"]["source"], "custom");
    assert_eq!(body["movie"]["Genre"], "Drama, Indie");

    // the created record is fetchable
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/movies/{id}"), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- reviews ---

#[tokio::test]
async fn review_creation_requires_auth() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/reviews",
            None,
            r#"{"movieId":"tt0468569","movieSource":"external","title":"t","content":"c","rating":5}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reviews_aggregate_into_stats() {
    let mut app = app().into_service();
    let token = login(&mut app, "user@moviedb.com", "user123").await;

    for (rating, title) in [(5, "Great"), (2, "Meh")] {
        let resp = ServiceExt::<Request<String>>::ready(&mut app)
            .await
            .unwrap()
            .call(json_request(
                "POST",
                "/reviews",
                Some(&token),
                &format!(
                    r#"{{"movieId":"tt0468569","movieSource":"external","title":"{title}","content":"c","rating":{rating}}}"#
                ),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(
            "/reviews/movie/tt0468569?source=external&page=1&limit=20",
            None,
        ))
        .await
        .unwrap();
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["reviews"].as_array().unwrap().len(), 2);
    assert_eq!(body["stats"]["totalReviews"], 2);
    assert_eq!(body["stats"]["averageRating"], 3.5);
    assert_eq!(body["stats"]["recommendationPercentage"], 50.0);
    assert_eq!(body["reviews"][0]["author"], "John Doe");
}

#[tokio::test]
async fn reviews_for_unreviewed_movie_have_zeroed_stats() {
    let app = app();
    let resp = app
        .oneshot(get_request("/reviews/movie/tt0034583?source=external", None))
        .await
        .unwrap();
    let body: serde_json::Value = body_json(resp).await;
    assert!(body["reviews"].as_array().unwrap().is_empty());
    assert_eq!(body["stats"]["averageRating"], 0.0);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let mut app = app().into_service();
    let token = login(&mut app, "user@moviedb.com", "user123").await;

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/reviews",
            Some(&token),
            r#"{"movieId":"tt0468569","movieSource":"external","title":"t","content":"c","rating":6}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- watchlist ---

#[tokio::test]
async fn watchlist_requires_auth() {
    let app = app();
    let resp = app.oneshot(get_request("/watchlist", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn watchlist_lifecycle() {
    let mut app = app().into_service();
    let token = login(&mut app, "user@moviedb.com", "user123").await;

    // empty to start
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/watchlist", Some(&token)))
        .await
        .unwrap();
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["total"], 0);

    // add
    let item = r#"{"movieId":"tt0468569","movieSource":"external","movieData":{"title":"The Dark Knight","year":"2008","poster":"p"}}"#;
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/watchlist", Some(&token), item))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // duplicate is a conflict
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/watchlist", Some(&token), item))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // listed with the denormalized snapshot
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/watchlist?page=1&limit=50", Some(&token)))
        .await
        .unwrap();
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["watchlist"][0]["movieData"]["title"], "The Dark Knight");

    // remove
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri("/watchlist/tt0468569?source=external")
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // removing again is 404
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri("/watchlist/tt0468569?source=external")
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn watchlists_are_per_user() {
    let mut app = app().into_service();
    let user_token = login(&mut app, "user@moviedb.com", "user123").await;
    let admin_token = login(&mut app, "admin@moviedb.com", "admin123").await;

    let item = r#"{"movieId":"tt0133093","movieSource":"external","movieData":{"title":"The Matrix"}}"#;
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/watchlist", Some(&user_token), item))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/watchlist", Some(&admin_token)))
        .await
        .unwrap();
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn clear_empties_the_watchlist() {
    let mut app = app().into_service();
    let token = login(&mut app, "user@moviedb.com", "user123").await;

    for id in ["tt1", "tt2"] {
        let resp = ServiceExt::<Request<String>>::ready(&mut app)
            .await
            .unwrap()
            .call(json_request(
                "POST",
                "/watchlist",
                Some(&token),
                &format!(r#"{{"movieId":"{id}","movieSource":"external","movieData":{{"title":"x"}}}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri("/watchlist")
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/watchlist", Some(&token)))
        .await
        .unwrap();
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["total"], 0);
}
