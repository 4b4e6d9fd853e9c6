//! Authenticated HTTP client for the LearnX platform API.
//!
//! [`LearnxClient`] wraps every call in the platform's bearer-token
//! protocol: the access token from the configured
//! [`TokenStore`](learnx_core::TokenStore) is attached to each request, a
//! 401 triggers a single shared refresh against `auth/token/refresh/`, and
//! the rejected request is re-sent once with the fresh token. Requests that
//! hit a 401 while a refresh is already in flight queue behind it instead
//! of racing their own.
//!
//! ```no_run
//! use learnx_client::LearnxClient;
//!
//! # async fn run() -> Result<(), learnx_client::ClientError> {
//! let client = LearnxClient::builder()
//!     .base_url("https://learnx.app/api")
//!     .build()?;
//!
//! client.login("maya", "s3cret").await?;
//! let me = client.me().await?;
//! println!("logged in as {}", me.username);
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub mod client;
pub mod error;
pub mod request;
pub mod types;

mod auth;
mod catalog;
mod quizzes;
mod refresh;
mod tutor;

pub use client::{LearnxClient, LearnxClientBuilder, SessionExpiredHook};
pub use error::ClientError;
pub use request::ApiRequest;
