use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes prepared HTTP requests; lets tests swap out the network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
