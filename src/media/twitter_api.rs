//! Minimal Twitter API client used to resolve video variants.
//!
//! Authenticates application-only: the consumer key and secret are exchanged
//! for a bearer token, which is then used for `statuses/lookup`.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::archive::Post;
use crate::constants::FETCH_USER_AGENT;
use crate::credentials::Credentials;

/// Most ids the lookup endpoint accepts in one request.
const LOOKUP_BATCH_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API returned {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    #[error("token response did not contain a bearer token")]
    MissingToken,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token_type: String,
    access_token: String,
}

/// Client for the status lookup endpoint.
pub struct TwitterApiClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    bearer: OnceCell<String>,
}

impl TwitterApiClient {
    /// Create a client against `base_url` (e.g. `https://api.twitter.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(FETCH_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            bearer: OnceCell::new(),
        })
    }

    async fn bearer_token(&self) -> Result<&str, ApiError> {
        self.bearer
            .get_or_try_init(|| async {
                let endpoint = format!("{}/oauth2/token", self.base_url);
                let response = self
                    .client
                    .post(&endpoint)
                    .basic_auth(
                        &self.credentials.consumer_key,
                        Some(&self.credentials.consumer_secret),
                    )
                    .form(&[("grant_type", "client_credentials")])
                    .send()
                    .await?;
                let response = check_status(&endpoint, response).await?;
                let token: TokenResponse = response.json().await?;
                if !token.token_type.eq_ignore_ascii_case("bearer") || token.access_token.is_empty() {
                    return Err(ApiError::MissingToken);
                }
                debug!("Obtained API bearer token");
                Ok(token.access_token)
            })
            .await
            .map(String::as_str)
    }

    /// Fetch full posts for `ids`, in batches of at most 100.
    ///
    /// # Errors
    ///
    /// Returns an error on any transport failure or non-success response.
    pub async fn lookup_statuses(&self, ids: &[String]) -> Result<Vec<Post>, ApiError> {
        let token = self.bearer_token().await?;
        let endpoint = format!("{}/1.1/statuses/lookup.json", self.base_url);
        let mut posts = Vec::new();

        for batch in ids.chunks(LOOKUP_BATCH_SIZE) {
            debug!(count = batch.len(), "Looking up statuses");
            let response = self
                .client
                .get(&endpoint)
                .bearer_auth(token)
                .query(&[
                    ("id", batch.join(",").as_str()),
                    ("include_entities", "true"),
                ])
                .send()
                .await?;
            let response = check_status(&endpoint, response).await?;
            let mut found: Vec<Post> = response.json().await?;
            posts.append(&mut found);
        }

        Ok(posts)
    }
}

async fn check_status(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        endpoint: endpoint.to_string(),
        status,
        body,
    })
}

impl std::fmt::Debug for TwitterApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
