use crate::errors::FetchError;
use crate::models::UserRecord;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/users";

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// HTTP client for the remote user source. One GET per refresh, no retries.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ApiClient {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Point the client at a different endpoint. Used by tests; production
    /// callers go through [`ApiClient::new`].
    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let users: Vec<UserRecord> = response.json().await?;
        Ok(users)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
