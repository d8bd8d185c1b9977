//! BioMentor HTTP client
//!
//! Typed access to the BioMentor quiz backend: an authentication client for
//! the login/refresh authority and an authenticated client for the quiz API
//! that refreshes expired access tokens on its own.

pub mod client;
pub mod types;

pub use client::error::ClientError;
pub use client::{ApiClient, ApiClientBuilder, AuthClient};
