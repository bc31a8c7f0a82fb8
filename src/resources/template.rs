//! Config template retrieval.

use crate::resources::{get, ResourceError};

/// Fetch the plain-text settings template at `url`.
pub async fn fetch_template(client: &reqwest::Client, url: &str) -> Result<String, ResourceError> {
    tracing::debug!(url, "Fetching config template");

    get(client, url)
        .await?
        .text()
        .await
        .map_err(|source| ResourceError::Http {
            url: url.to_string(),
            source,
        })
}
