//! Bookshelf - a small service that manages its schema with stepwise.
//!
//! ```text
//! bookshelf up            # apply pending migrations and exit
//! bookshelf up --no-exit  # apply pending migrations, then serve
//! bookshelf down --all    # roll everything back
//! bookshelf               # serve
//! ```

mod migrations;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use stepwise::Stepwise;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    if Stepwise::new(migrations::registry()).run().await?.should_exit() {
        return Ok(());
    }

    let addr = std::env::var("BOOKSHELF_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!("Server starting on {}", addr);
    info!("Visit http://{}/ping to test", addr);

    axum::serve(listener, router()).await?;
    Ok(())
}

fn router() -> Router {
    Router::new().route("/ping", get(ping))
}

async fn ping() -> &'static str {
    "pong"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ping() {
        assert_eq!(ping().await, "pong");
    }

    #[tokio::test]
    async fn test_serves_ping() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router()).await.unwrap() });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        stream
            .write_all(b"GET /ping HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("pong"));
    }
}
