//! Authentication gate consulted before the first load.

use std::future::Future;

use thiserror::Error;

use crate::models::Identity;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Not logged in")]
    NotLoggedIn,
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Decides whether an actor may load their milestones.
pub trait AuthGate: Send + Sync {
    fn ensure_authenticated(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = AuthResult<()>> + Send;
}

/// Trusts the `authenticated` flag carried by the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAuthGate;

impl AuthGate for StaticAuthGate {
    async fn ensure_authenticated(&self, identity: &Identity) -> AuthResult<()> {
        if identity.authenticated {
            Ok(())
        } else {
            Err(AuthError::NotLoggedIn)
        }
    }
}
