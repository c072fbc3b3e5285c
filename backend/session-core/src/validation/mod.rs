//! Remote token validation against the identity endpoint.
//!
//! A token is valid only when `GET {api_base_path}/me` answers 2xx for it.
//! Everything else, including a missing base path and transport failures,
//! reports "not valid". Nothing here returns an error to the caller.

use crate::IDENTITY_ENDPOINT_PATH;
use crate::error::{RequestError, SessionError};

use common::{BearerToken, HttpStatusCode};

use std::time::Duration;

use log::{debug, error, info, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use url::Url;

pub const DEFAULT_TIMEOUT_DURATION: Duration = Duration::from_secs(30);
const JSON_CONTENT_TYPE: &str = "application/json";

/// Identity-endpoint client.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    base_path: Option<String>,
    identity_endpoint: Option<Url>,
    client: Client,
}

impl TokenValidator {
    /// Create a validator for `api_base_path`.
    ///
    /// `None` or an unparsable base path is accepted: every validation then
    /// fails with a logged configuration error.
    ///
    /// # Errors
    /// Returns [`SessionError::HttpClient`] if the client cannot be built.
    pub fn new(api_base_path: Option<&str>, timeout: Duration) -> Result<Self, SessionError> {
        let base_path = api_base_path
            .map(|path| path.trim().trim_end_matches('/').to_owned())
            .filter(|path| !path.is_empty());

        let identity_endpoint = match &base_path {
            Some(base) => match Url::parse(&format!("{base}/{IDENTITY_ENDPOINT_PATH}")) {
                Ok(endpoint) => Some(endpoint),
                Err(e) => {
                    error!("API base path {base:?} is not a valid URL: {e}");
                    None
                }
            },
            None => {
                warn!("API base path is not set; every token will be reported invalid");
                None
            }
        };

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_path,
            identity_endpoint,
            client,
        })
    }

    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// Ask the identity endpoint whether `token` is currently valid.
    pub async fn validate(&self, token: &BearerToken) -> bool {
        let Some(endpoint) = &self.identity_endpoint else {
            error!("No usable API base path; cannot validate token");
            return false;
        };

        debug!("Validating token ({} chars) against {}", token.len(), endpoint);

        let response = self
            .client
            .get(endpoint.clone())
            .header(AUTHORIZATION, token.authorization_value())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = HttpStatusCode(response.status().as_u16());
                if status.is_success() {
                    debug!("Token validation response: HTTP {status}");
                    true
                } else if status.is_auth_rejection() {
                    info!("Identity endpoint rejected token: HTTP {status}");
                    false
                } else {
                    warn!("Unexpected identity endpoint response: HTTP {status}");
                    false
                }
            }
            Err(e) => {
                warn!(
                    "Token validation failed (timeout={}, connect={}): {}",
                    e.is_timeout(),
                    e.is_connect(),
                    e
                );
                false
            }
        }
    }

    /// Start a request to `path` under the API base path carrying `token`.
    ///
    /// # Errors
    /// Returns [`RequestError::MissingBasePath`] when no base path is configured
    /// and [`RequestError::UrlParse`] when the joined URL is invalid.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        token: &BearerToken,
    ) -> Result<RequestBuilder, RequestError> {
        let base = self
            .base_path
            .as_deref()
            .ok_or_else(|| RequestError::missing_base_path())?;
        let url = Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))?;

        Ok(self
            .client
            .request(method, url)
            .header(AUTHORIZATION, token.authorization_value())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE))
    }
}
