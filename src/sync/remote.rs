//! Remote sheet fetch.
//!
//! Fetches a public sheet by slug and runs it through the seed transform.
//! Every failure mode surfaces as the same [`SyncError::Fetch`]; the
//! underlying cause is logged at debug level only.

use std::time::Duration;

use tracing::{debug, info};

use crate::model::SheetState;
use crate::sync::seed::transform_raw;
use crate::sync::types::{RawEnvelope, SeedStats, SyncError, SyncResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the public sheet API.
pub struct SheetClient {
    client: reqwest::Client,
    api_base: String,
}

impl SheetClient {
    /// Create a client for the given API base URL.
    #[must_use]
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    /// URL of the sheet with the given slug.
    #[must_use]
    pub fn sheet_url(&self, slug: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), slug)
    }

    /// Fetch a sheet and transform it into a normalized snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Fetch` on transport errors, non-success HTTP
    /// status, `success: false` or a missing `data` field.
    pub async fn fetch_sheet(&self, slug: &str) -> SyncResult<(SheetState, SeedStats)> {
        let url = self.sheet_url(slug);
        debug!(url = %url, "Fetching sheet");

        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| fetch_failed(&url, e))?;

        if !response.status().is_success() {
            return Err(fetch_failed(&url, format!("HTTP {}", response.status())));
        }

        let envelope: RawEnvelope = response.json().await.map_err(|e| fetch_failed(&url, e))?;
        let data = match envelope {
            RawEnvelope {
                success: Some(true),
                data: Some(data),
            } => data,
            RawEnvelope { success, .. } => {
                return Err(fetch_failed(&url, format!("success={success:?} or missing data")));
            }
        };

        let result = transform_raw(data);
        info!(slug, questions = result.1.questions, "Fetched remote sheet");
        Ok(result)
    }

    /// Blocking wrapper around [`Self::fetch_sheet`] on a dedicated runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot start or the fetch fails.
    pub fn fetch_sheet_blocking(&self, slug: &str) -> SyncResult<(SheetState, SeedStats)> {
        let rt = tokio::runtime::Runtime::new().map_err(SyncError::fetch)?;
        rt.block_on(self.fetch_sheet(slug))
    }
}

fn fetch_failed(url: &str, cause: impl ToString) -> SyncError {
    let cause = cause.to_string();
    debug!(url, cause = %cause, "Sheet fetch failed");
    SyncError::Fetch { cause }
}
