//! The LearnX API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use learnx_core::{MemoryTokenStore, TokenStore};

use crate::error::ClientError;
use crate::refresh::{RefreshError, RefreshGate, Ticket};
use crate::request::ApiRequest;
use crate::types::{TokenRefreshRequest, TokenRefreshResponse};

/// Callback invoked when the client gives up on the session and clears the
/// stored tokens. Applications hang their "redirect to login" logic here.
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// Client for the LearnX platform API.
///
/// Every request sent through [`send`](Self::send) carries the stored
/// access token as a bearer header. On a 401 the client refreshes the
/// access token once, shared across all concurrent callers, and re-sends
/// the rejected request a single time with the new token. A failed refresh
/// clears both stored tokens and surfaces as
/// [`ClientError::AuthenticationFailed`].
///
/// The client is cheap to clone; clones share the HTTP connection pool, the
/// token store, and the refresh state.
#[derive(Clone)]
pub struct LearnxClient {
    http: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    gate: Arc<RefreshGate>,
    on_session_expired: Option<SessionExpiredHook>,
}

/// One pass through the send loop: the token to present and whether the
/// single retry is already spent.
struct Attempt {
    access: Option<String>,
    retried: bool,
}

impl Attempt {
    fn first(access: Option<String>) -> Self {
        Self {
            access,
            retried: false,
        }
    }

    fn retry_with(&mut self, access: String) {
        self.access = Some(access);
        self.retried = true;
    }
}

impl LearnxClient {
    /// Create a client for `base_url` with default configuration.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder.
    pub fn builder() -> LearnxClientBuilder {
        LearnxClientBuilder::default()
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token store backing this client.
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request with bearer authentication and 401 recovery.
    ///
    /// Responses come back unchanged for every status except 401. A 401
    /// comes back unchanged too once recovery is off the table: either no
    /// refresh token is stored, or the request was already re-sent with a
    /// refreshed token. A failed refresh surfaces as an error instead of a
    /// response.
    pub async fn send(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let mut attempt = Attempt::first(self.store.access().await?);

        loop {
            let response = self.dispatch(request, attempt.access.as_deref()).await?;
            if response.status() != StatusCode::UNAUTHORIZED || attempt.retried {
                return Ok(response);
            }

            match self.recover_access().await? {
                Some(access) => attempt.retry_with(access),
                None => {
                    // No refresh token to recover with: drop the rejected
                    // access token and let the 401 through
                    self.store.clear_access().await?;
                    self.notify_session_expired();
                    return Ok(response);
                }
            }
        }
    }

    /// Send a request and decode the JSON response, mapping error statuses
    /// to typed errors.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            Err(ClientError::from_status(status, error_message(response).await))
        }
    }

    /// Send a request and discard the response body.
    pub async fn execute_empty(&self, request: &ApiRequest) -> Result<(), ClientError> {
        let response = self.send(request).await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::from_status(status, error_message(response).await))
        }
    }

    /// Send a request and return the raw response bytes. Used for binary
    /// downloads such as completion certificates.
    pub async fn execute_raw(&self, request: &ApiRequest) -> Result<bytes::Bytes, ClientError> {
        let response = self.send(request).await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.bytes().await?)
        } else {
            Err(ClientError::from_status(status, error_message(response).await))
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        access: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut builder = self
            .http
            .request(request.method().clone(), self.url(request.path()));

        if !request.query_params().is_empty() {
            builder = builder.query(request.query_params());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        if let Some(access) = access {
            builder = builder.header(AUTHORIZATION, format!("Bearer {access}"));
        }

        Ok(builder.send().await?)
    }

    /// Run the shared refresh protocol after a 401.
    ///
    /// Returns the fresh access token, or `None` when no refresh token is
    /// stored. At most one refresh call is in flight per client at a time;
    /// callers that arrive during it are queued and handed the same
    /// outcome, oldest first. A failed refresh clears both stored tokens
    /// and fails this caller and every queued one.
    async fn recover_access(&self) -> Result<Option<String>, ClientError> {
        let Some(refresh_token) = self.store.refresh().await? else {
            return Ok(None);
        };

        match self.gate.join() {
            Ticket::Leader(flight) => {
                debug!("access token rejected, refreshing");
                match self.refresh_access(&refresh_token).await {
                    Ok(access) => {
                        self.store.store_access(&access).await?;
                        flight.succeed(&access);
                        Ok(Some(access))
                    }
                    Err(error) => {
                        warn!("Token refresh failed: {error}");
                        flight.fail(error.clone());
                        if let Err(storage_error) = self.store.clear().await {
                            warn!("Failed to clear tokens after refresh failure: {storage_error}");
                        }
                        self.notify_session_expired();
                        Err(ClientError::AuthenticationFailed(error.message))
                    }
                }
            }
            Ticket::Waiter(receiver) => {
                debug!("refresh already in flight, queueing");
                match receiver.await {
                    Ok(Ok(access)) => Ok(Some(access)),
                    Ok(Err(error)) => Err(ClientError::AuthenticationFailed(error.message)),
                    Err(_) => Err(ClientError::AuthenticationFailed(
                        "token refresh was interrupted".to_string(),
                    )),
                }
            }
        }
    }

    /// The bare refresh call. No bearer header: the endpoint authenticates
    /// by refresh token alone, and sending the rejected access token along
    /// would be pointless.
    async fn refresh_access(&self, refresh_token: &str) -> Result<String, RefreshError> {
        let response = self
            .http
            .post(self.url("auth/token/refresh/"))
            .json(&TokenRefreshRequest {
                refresh: refresh_token.to_string(),
            })
            .send()
            .await
            .map_err(|err| RefreshError::new(format!("refresh request failed: {err}")))?;

        let status = response.status();
        if status.is_success() {
            let body: TokenRefreshResponse = response
                .json()
                .await
                .map_err(|err| RefreshError::new(format!("malformed refresh response: {err}")))?;
            debug!("access token refreshed");
            Ok(body.access)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(RefreshError::new(format!(
                "refresh rejected ({status}): {message}"
            )))
        }
    }

    fn notify_session_expired(&self) {
        if let Some(hook) = &self.on_session_expired {
            hook();
        }
    }
}

/// Pull the `detail` message out of a backend error body when present.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    #[derive(serde::Deserialize)]
    struct ErrorBody {
        detail: String,
    }

    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.detail,
        Err(_) if body.is_empty() => status.to_string(),
        Err(_) => body,
    }
}

/// Builder for [`LearnxClient`].
#[derive(Default)]
pub struct LearnxClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    store: Option<Arc<dyn TokenStore>>,
    on_session_expired: Option<SessionExpiredHook>,
}

impl LearnxClientBuilder {
    /// Set the base URL (required), e.g. `https://learnx.app/api`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout. Covers refresh calls as well; there is no
    /// separate refresh timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a custom User-Agent header.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Persist tokens with the given store instead of a fresh in-memory
    /// one.
    pub fn token_store(mut self, store: impl TokenStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Invoke `hook` whenever the client clears the stored tokens because
    /// the session could not be recovered.
    pub fn on_session_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<LearnxClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".to_string()))?;

        // Normalize so path joining never doubles a slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut http = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        http = http.user_agent(
            self.user_agent
                .unwrap_or_else(|| "learnx-client/0.1.0".to_string()),
        );

        Ok(LearnxClient {
            http: http.build()?,
            base_url,
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryTokenStore::new())),
            gate: Arc::new(RefreshGate::default()),
            on_session_expired: self.on_session_expired,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_doubling_slashes() {
        let client = LearnxClient::new("http://localhost:8000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("auth/me/"), "http://localhost:8000/api/auth/me/");
        assert_eq!(client.url("/auth/me/"), "http://localhost:8000/api/auth/me/");
    }

    #[test]
    fn build_requires_a_base_url() {
        let result = LearnxClient::builder().build();
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[tokio::test]
    async fn storage_failure_surfaces_before_any_request() {
        use learnx_core::tokens::mock::MockTokenStore;

        let mut store = MockTokenStore::new();
        store
            .expect_access()
            .returning(|| Err(learnx_core::Error::Storage("backend down".to_string())));

        // Unroutable base URL: the send must fail before reaching the network
        let client = LearnxClient::builder()
            .base_url("http://127.0.0.1:1")
            .token_store(store)
            .build()
            .unwrap();

        let result = client.send(&ApiRequest::get("auth/me/")).await;
        assert!(matches!(result, Err(ClientError::Storage(_))));
    }
}
