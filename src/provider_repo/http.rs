// GET helpers: status check and error mapping for every upstream call.

use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use crate::error::FetchError;

fn network(url: &str, source: reqwest::Error) -> FetchError {
    FetchError::Network {
        url: url.to_string(),
        source,
    }
}

async fn get_body(client: &reqwest::Client, url: &str, accept: &str) -> Result<String, FetchError> {
    let resp = client
        .get(url)
        .header(ACCEPT, accept)
        .send()
        .await
        .map_err(|e| network(url, e))?;
    let status = resp.status();
    if !status.is_success() {
        tracing::debug!(url, %status, "upstream returned non-success status");
        return Err(FetchError::upstream(url, format!("HTTP {status}")));
    }
    resp.text().await.map_err(|e| network(url, e))
}

/// Body as trimmed text (block hashes, tip heights).
pub(super) async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    Ok(get_body(client, url, "text/plain, application/json").await?.trim().to_string())
}

/// Body parsed as JSON into `T`; a shape mismatch is an upstream error.
pub(super) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, FetchError> {
    let body = get_body(client, url, "application/json").await?;
    serde_json::from_str(&body).map_err(|e| FetchError::upstream(url, format!("invalid JSON: {e}")))
}
