use axum::Router;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("listening on {addr}");
    // Nested under /api to match the client's default base URL.
    let app = Router::new().nest("/api", mock_server::app());
    axum::serve(listener, app).await
}
