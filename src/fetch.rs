use reqwest::Client;
use url::Url;

use crate::{Config, Error, Result};

/// Shared HTTP client for a run: fixed timeout and a browser-like
/// `User-Agent`, upstream blocks the default one
pub fn build_client(config: &Config) -> Result<Client> {
    Ok(Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.as_str())
        .build()
        .inspect_err(|e| log::warn!("failed to build http client: {e}"))?)
}

/// Single GET, no retries. Non-success statuses are errors.
pub async fn fetch_feed_text(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .inspect_err(|e| log::warn!("Error fetching {url}: {e}"))?;
    let status = response.status();
    if !status.is_success() {
        log::warn!("Error fetching {url}: HTTP {status}");
        return Err(Error::HttpStatus {
            url: url.clone(),
            status,
        });
    }
    Ok(response
        .text()
        .await
        .inspect_err(|e| log::warn!("Fetching feed failed to read as text: {e}"))?)
}
