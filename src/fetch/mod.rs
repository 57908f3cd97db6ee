//! Source loading for station and trip data.
//!
//! A source is either an `http(s)://` URL, fetched through an
//! [`HttpClient`], or a local file path.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    if !resp.status().is_success() {
        return Err(anyhow!("GET {} returned status {}", url, resp.status()));
    }
    Ok(resp.bytes().await?.to_vec())
}

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads `source` from the network or the local filesystem.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("Failed to fetch {source}"))?
    } else {
        debug!("Reading local file");
        tokio::fs::read(source)
            .await
            .with_context(|| format!("Failed to read {source}"))?
    };
    info!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::env;

    struct NoNetwork;

    #[async_trait]
    impl HttpClient for NoNetwork {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            panic!("local sources must not touch the network");
        }
    }

    struct ServerError;

    #[async_trait]
    impl HttpClient for ServerError {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            let resp = http::Response::builder()
                .status(500)
                .body("internal error")
                .unwrap();
            Ok(reqwest::Response::from(resp))
        }
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.org/stations.json"));
        assert!(is_remote("http://example.org/trips.csv"));
        assert!(!is_remote("data/trips.csv"));
        assert!(!is_remote("/tmp/https.csv"));
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let path = format!("{}/bikeshare_traffic_test_load.csv", env::temp_dir().display());
        std::fs::write(&path, b"started_at,ended_at\n").unwrap();

        let bytes = load_source(&NoNetwork, &path).await.unwrap();
        assert_eq!(bytes, b"started_at,ended_at\n");

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load_source(&NoNetwork, "/definitely/not/here.csv").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let err = fetch_bytes(&ServerError, "https://example.org/trips.csv")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_load_remote_error_status() {
        let result = load_source(&ServerError, "https://example.org/stations.json").await;
        assert!(result.is_err());
    }
}
