use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Access/refresh token pair issued by `POST auth/token/`.
///
/// The access token is short-lived and attached as a bearer credential to
/// every authenticated request. The refresh token is longer-lived and is only
/// ever sent to the refresh and logout endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

/// Durable storage for the token pair, keyed by the fixed names `access` and
/// `refresh`.
///
/// Implementations must be shareable across tasks: the client reads the
/// access token on every request and rewrites it mid-flight during a refresh.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current access token, if any.
    async fn access(&self) -> Result<Option<String>>;

    /// Current refresh token, if any.
    async fn refresh(&self) -> Result<Option<String>>;

    /// Replace both tokens (login, signup).
    async fn store(&self, tokens: &TokenPair) -> Result<()>;

    /// Replace the access token only, keeping the refresh token
    /// (successful refresh).
    async fn store_access(&self, access: &str) -> Result<()>;

    /// Remove the access token, keeping any refresh token (unrecoverable
    /// 401 with no refresh token on hand).
    async fn clear_access(&self) -> Result<()>;

    /// Remove both tokens (logout, failed refresh).
    async fn clear(&self) -> Result<()>;
}

// Mock implementation for testing
#[cfg(any(test, feature = "tests"))]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub TokenStore {}

        #[async_trait]
        impl TokenStore for TokenStore {
            async fn access(&self) -> Result<Option<String>>;
            async fn refresh(&self) -> Result<Option<String>>;
            async fn store(&self, tokens: &TokenPair) -> Result<()>;
            async fn store_access(&self, access: &str) -> Result<()>;
            async fn clear_access(&self) -> Result<()>;
            async fn clear(&self) -> Result<()>;
        }
    }
}
