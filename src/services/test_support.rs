//! Local stand-ins for the hosted APIs, served over real HTTP.

use crate::config::Config;
use axum::Router;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Config with test credentials and every upstream pointed at `base_url`.
pub fn config_for(base_url: &str) -> Config {
    Config::from_lookup(|key| {
        let value = match key {
            "OPENAI_API_KEY" => "sk-test",
            "SPOTIFY_CLIENT_ID" => "client",
            "SPOTIFY_CLIENT_SECRET" => "secret",
            "OPENAI_BASE_URL" | "SPOTIFY_API_URL" | "SPOTIFY_ACCOUNTS_URL" => base_url,
            "HTTP_TIMEOUT_SECS" => "5",
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}
