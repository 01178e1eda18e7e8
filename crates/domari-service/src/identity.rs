//! Identity resolution — opaque session tokens to [`AuthContext`].
//!
//! Upstream credential verification is a collaborator's job; this
//! module starts from an already-authenticated user. The organization
//! id in the resolved context always comes from the stored profile,
//! never from anything the client sent.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use domari_core::context::AuthContext;
use domari_core::error::{DomariError, DomariResult};
use domari_core::models::session::CreateSession;
use domari_core::repository::{SessionRepository, UserRepository};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

/// Generate a cryptographically random opaque session token
/// (32 bytes → base64url-encoded, no padding).
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hash of a raw session token, hex-encoded.
///
/// This is the value stored in the database as `session.token_hash`;
/// the raw token is returned to the client exactly once.
pub fn hash_session_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// A freshly issued session. The raw token is not recoverable later.
#[derive(Debug)]
pub struct IssuedSession {
    pub session_id: Uuid,
    pub raw_token: String,
    pub expires_at: chrono::DateTime<Utc>,
}

/// Resolves bearer tokens into a tenant-scoped caller identity.
pub struct IdentityService<S: SessionRepository, U: UserRepository> {
    sessions: S,
    users: U,
}

impl<S: SessionRepository, U: UserRepository> IdentityService<S, U> {
    pub fn new(sessions: S, users: U) -> Self {
        Self { sessions, users }
    }

    /// Resolve a raw bearer token into an [`AuthContext`].
    ///
    /// Fails with `AuthenticationFailed` for unknown or expired
    /// sessions, inactive accounts, and accounts that have not
    /// finished onboarding into an organization.
    pub async fn resolve(&self, raw_token: &str) -> DomariResult<AuthContext> {
        let token_hash = hash_session_token(raw_token);
        let session = self
            .sessions
            .get_by_token_hash(&token_hash)
            .await
            .map_err(|e| match e {
                DomariError::NotFound { .. } => DomariError::AuthenticationFailed {
                    reason: "unknown session token".into(),
                },
                other => other,
            })?;

        if session.expires_at <= Utc::now() {
            // Best-effort purge; the caller is rejected either way.
            if let Err(err) = self.sessions.invalidate(session.id).await {
                warn!(session_id = %session.id, error = %err, "expired session cleanup failed");
            }
            return Err(DomariError::AuthenticationFailed {
                reason: "session expired".into(),
            });
        }

        let user = self.users.get_by_id(session.user_id).await?;
        if !user.is_active {
            return Err(DomariError::AuthenticationFailed {
                reason: "account is inactive".into(),
            });
        }
        let organization_id = user.organization_id.ok_or(DomariError::AuthenticationFailed {
            reason: "account is not attached to an organization".into(),
        })?;

        Ok(AuthContext {
            user_id: user.id,
            organization_id,
            role: user.role,
            full_name: user.full_name,
            email: user.email,
        })
    }

    /// Create a session for an already-authenticated user and return
    /// the raw opaque token.
    pub async fn issue_session(&self, user_id: Uuid, ttl: Duration) -> DomariResult<IssuedSession> {
        let raw_token = generate_session_token();
        let expires_at = Utc::now() + ttl;

        let session = self
            .sessions
            .create(CreateSession {
                user_id,
                token_hash: hash_session_token(&raw_token),
                expires_at,
            })
            .await?;

        Ok(IssuedSession {
            session_id: session.id,
            raw_token,
            expires_at,
        })
    }

    /// Invalidate one session.
    pub async fn logout(&self, session_id: Uuid) -> DomariResult<()> {
        self.sessions.invalidate(session_id).await
    }
}
