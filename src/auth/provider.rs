//! Identity-provider seam.
//!
//! The store in [`crate::auth`] talks to the identity provider only through
//! [`IdentityProvider`], so the hosted provider can be swapped for a fake in
//! tests or disabled when it is not configured.

use crate::models::{ProfileRecord, ProfileUpdate};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Free-form metadata attached to an identity at sign-up or by OAuth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// The provider's view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Tokens for an authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: IdentityUser,
}

impl AuthSession {
    /// Fill `expires_at` from `expires_in` when the provider only sent the latter.
    pub fn stamp_expiry(mut self) -> Self {
        if self.expires_at.is_none() {
            if let Some(secs) = self.expires_in {
                self.expires_at = Some(Utc::now().timestamp() + secs);
            }
        }
        self
    }

    /// Expired, or expiring within `leeway_secs`. Sessions without an expiry
    /// never expire locally.
    pub fn is_expired(&self, leeway_secs: i64) -> bool {
        match self.expires_at {
            Some(at) => Utc::now().timestamp() + leeway_secs >= at,
            None => false,
        }
    }
}

/// Session-state changes, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    InitialSession(Option<AuthSession>),
    SignedIn(AuthSession),
    TokenRefreshed(AuthSession),
    UserUpdated,
    SignedOut,
}

impl AuthEvent {
    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            AuthEvent::InitialSession(session) => session.as_ref(),
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => Some(session),
            AuthEvent::UserUpdated | AuthEvent::SignedOut => None,
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account. Returns `None` when the provider requires email
    /// confirmation before the first session.
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Option<AuthSession>>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// URL the user opens to authenticate with an OAuth `provider`.
    fn authorize_url(&self, provider: &str) -> Result<String>;

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession>;

    async fn get_user(&self, access_token: &str) -> Result<IdentityUser>;

    async fn sign_out(&self, access_token: &str) -> Result<()>;

    /// Profile row for `user_id`, `None` when there is none.
    async fn fetch_profile(&self, access_token: &str, user_id: &str) -> Result<Option<ProfileRecord>>;

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<()>;
}

/// Stand-in used when no identity provider is configured: every call fails
/// with a configuration error.
#[derive(Debug, Clone, Default)]
pub struct DisabledProvider;

impl DisabledProvider {
    fn unavailable<T>() -> Result<T> {
        Err(AppError::Config(
            "Supabase is not configured (set SUPABASE_URL and the anon key)".to_string(),
        ))
    }
}

#[async_trait]
impl IdentityProvider for DisabledProvider {
    async fn sign_up(&self, _email: &str, _password: &str, _name: &str) -> Result<Option<AuthSession>> {
        Self::unavailable()
    }

    async fn sign_in_with_password(&self, _email: &str, _password: &str) -> Result<AuthSession> {
        Self::unavailable()
    }

    fn authorize_url(&self, _provider: &str) -> Result<String> {
        Self::unavailable()
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<AuthSession> {
        Self::unavailable()
    }

    async fn get_user(&self, _access_token: &str) -> Result<IdentityUser> {
        Self::unavailable()
    }

    async fn sign_out(&self, _access_token: &str) -> Result<()> {
        Self::unavailable()
    }

    async fn fetch_profile(&self, _access_token: &str, _user_id: &str) -> Result<Option<ProfileRecord>> {
        Self::unavailable()
    }

    async fn update_profile(
        &self,
        _access_token: &str,
        _user_id: &str,
        _update: &ProfileUpdate,
    ) -> Result<()> {
        Self::unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: Option<i64>) -> AuthSession {
        AuthSession {
            access_token: "at".into(),
            refresh_token: Some("rt".into()),
            expires_in: None,
            expires_at,
            user: IdentityUser {
                id: "u1".into(),
                email: Some("lan@example.com".into()),
                user_metadata: UserMetadata::default(),
            },
        }
    }

    #[test]
    fn test_expiry_with_leeway() {
        let now = Utc::now().timestamp();
        assert!(session(Some(now - 1)).is_expired(0));
        assert!(session(Some(now + 30)).is_expired(60));
        assert!(!session(Some(now + 3600)).is_expired(60));
        assert!(!session(None).is_expired(60));
    }

    #[test]
    fn test_stamp_expiry_from_expires_in() {
        let mut s = session(None);
        s.expires_in = Some(3600);
        let stamped = s.stamp_expiry();
        assert!(stamped.expires_at.unwrap() > Utc::now().timestamp());
    }

    #[tokio::test]
    async fn test_disabled_provider_reports_config_error() {
        let provider = DisabledProvider;
        let err = provider.sign_in_with_password("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(provider.authorize_url("google").is_err());
    }
}
