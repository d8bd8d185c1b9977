//! BioMentor core types and utilities

pub mod config;
pub mod error;
pub mod session;
pub mod state_dir;

pub use config::ClientConfig;
pub use error::{CoreError, CoreResult};
pub use session::{
    CredentialStore, Credentials, ExpiryReason, FileCredentialStore, MemoryCredentialStore,
    SessionEvent, SessionEvents, UserIdentity,
};
pub use state_dir::StateDir;
