//! Owner session storage trait.
//!
//! Owner-facing routes authenticate through a separate identity channel that
//! is out of scope here; this trait is the reduction of that channel to an
//! interface. A bearer session token resolves to the owning user id.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CardResult;

/// Storage trait for authenticated owner sessions.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Resolves a bearer session token to the authenticated user, if the
    /// session is live.
    async fn resolve(&self, session_token: &str) -> CardResult<Option<Uuid>>;
}
