//! Account and session operations.

use learnx_core::{Profile, TokenPair, User};

use crate::client::LearnxClient;
use crate::error::ClientError;
use crate::request::ApiRequest;
use crate::types::{ContactRequest, LoginRequest, LogoutRequest, ProfileUpdate, RegisterRequest};

impl LearnxClient {
    /// Log in with username and password, storing the issued token pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ClientError> {
        let request = ApiRequest::post("auth/token/").json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;

        let tokens: TokenPair = self.execute(&request).await?;
        self.token_store().store(&tokens).await?;
        debug!("logged in as {username}");
        Ok(tokens)
    }

    /// Create an account. Does not log in; follow up with
    /// [`login`](Self::login).
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let request = ApiRequest::post("auth/register/").json(&RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })?;

        self.execute_empty(&request).await
    }

    /// End the session: blacklist the refresh token server-side, then clear
    /// the local store. The server call is best effort; local tokens are
    /// removed even when it fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Some(refresh) = self.token_store().refresh().await? {
            let request = ApiRequest::post("auth/logout/").json(&LogoutRequest { refresh })?;
            match self.send(&request).await {
                Ok(response) if !response.status().is_success() => {
                    debug!(
                        "Logout rejected by backend ({}), clearing local session anyway",
                        response.status()
                    );
                }
                Err(error) => {
                    debug!("Logout request failed ({error}), clearing local session anyway");
                }
                Ok(_) => {}
            }
        }

        self.token_store().clear().await?;
        Ok(())
    }

    /// The authenticated user's account basics.
    pub async fn me(&self) -> Result<User, ClientError> {
        self.execute(&ApiRequest::get("auth/me/")).await
    }

    /// The authenticated user's extended profile.
    pub async fn profile(&self) -> Result<Profile, ClientError> {
        self.execute(&ApiRequest::get("auth/profile/")).await
    }

    /// Partially update the profile, returning the stored result.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ClientError> {
        let request = ApiRequest::patch("auth/profile/").json(update)?;
        self.execute(&request).await
    }

    /// Send a message to the platform contact inbox.
    pub async fn contact(
        &self,
        name: &str,
        email: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), ClientError> {
        let request = ApiRequest::post("auth/contact/").json(&ContactRequest {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        })?;

        self.execute_empty(&request).await
    }
}
