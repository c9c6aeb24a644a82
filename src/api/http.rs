//! Implements the `Ledger` trait against the ledger HTTP API.

use crate::api::{decode, Ledger};
use crate::model::LedgerData;
use crate::Result;
use anyhow::{anyhow, Context};
use tracing::trace;
use url::Url;

/// Fetches `GET {api_url}/movements/{project}`, optionally with a bearer token.
pub(crate) struct HttpLedger {
    base: Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpLedger {
    pub(crate) fn new(base: Url, token: Option<String>) -> Self {
        Self {
            base,
            token,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl Ledger for HttpLedger {
    async fn get_data(&mut self, project: &str) -> Result<LedgerData> {
        let url = movements_url(&self.base, project)?;
        trace!("GET {url}");
        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send the ledger request to {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("The ledger API failed with status {}: {}", status, body);
        }

        let body = response
            .text()
            .await
            .context("Failed to read the ledger API response")?;
        decode(&body).with_context(|| format!("Bad ledger data for project '{project}'"))
    }
}

/// Appends `movements/{project}` to the base URL's path. The project is percent-encoded as a
/// single path segment.
fn movements_url(base: &Url, project: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("The API URL '{base}' cannot be used as a base URL"))?
        .pop_if_empty()
        .push("movements")
        .push(project);
    Ok(url)
}
