//! Authentication store
//!
//! Adapts the identity provider's session into a small read-mostly user model
//! and hands out bearer tokens for authenticated API calls.
//!
//! # Module Structure
//!
//! - [`auth::provider`](crate::auth::provider) - `IdentityProvider` trait, sessions and events
//! - [`auth::supabase`](crate::auth::supabase) - Supabase implementation (GoTrue + PostgREST)
//!
//! # Events
//!
//! Every session change (initial restore, sign-in, token refresh, profile
//! edit, sign-out) is broadcast as an [`AuthEvent`] after the user model has
//! been updated. Stores that depend on the signed-in identity (wishlist, chat)
//! watch [`AuthStore::subscribe`] instead of polling.
//!
//! # Persistence
//!
//! The session is cached under [`AUTH_SESSION_KEY`] so a restart restores it.
//! An expired cached session is refreshed once during [`AuthStore::init`].

/// Identity-provider trait and session types.
pub mod provider;
/// Supabase REST implementation of the provider.
pub mod supabase;

pub use provider::{AuthEvent, AuthSession, DisabledProvider, IdentityProvider, IdentityUser};
pub use supabase::SupabaseAuth;

use crate::models::{AuthUser, ProfileRecord, ProfileUpdate};
use crate::state::Observable;
use crate::storage::{get_json, set_json, KeyValueStore, AUTH_SESSION_KEY};
use crate::types::{AppError, Result};
use parking_lot::RwLock;
use reqwest::Url;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Refresh a cached session this many seconds before it expires.
const REFRESH_LEEWAY_SECS: i64 = 60;

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/initials/svg";

/// Observable auth state.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    /// True until the cached session has been checked.
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

pub struct AuthStore {
    provider: Arc<dyn IdentityProvider>,
    storage: Arc<dyn KeyValueStore>,
    session: RwLock<Option<AuthSession>>,
    state: Observable<AuthState>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthStore {
    pub fn new(provider: Arc<dyn IdentityProvider>, storage: Arc<dyn KeyValueStore>) -> Self {
        let (events, _rx) = broadcast::channel(16);
        Self {
            provider,
            storage,
            session: RwLock::new(None),
            state: Observable::new(AuthState::default()),
            events,
        }
    }

    /// Restore the cached session, refreshing it first if it has expired.
    pub async fn init(&self) {
        let cached: Option<AuthSession> = get_json(self.storage.as_ref(), AUTH_SESSION_KEY);

        let session = match cached {
            Some(session) if session.is_expired(REFRESH_LEEWAY_SECS) => {
                match session.refresh_token.as_deref() {
                    Some(refresh_token) => match self.provider.refresh(refresh_token).await {
                        Ok(fresh) => {
                            debug!("Refreshed expired cached session");
                            Some(fresh)
                        }
                        Err(e) => {
                            warn!("Cached session could not be refreshed: {}", e);
                            None
                        }
                    },
                    None => None,
                }
            }
            other => other,
        };

        self.apply(AuthEvent::InitialSession(session)).await;
    }

    /// Register. When the provider starts a session immediately the user is
    /// signed in; otherwise they must confirm their email first.
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<()> {
        if let Some(session) = self.provider.sign_up(email, password, name).await? {
            self.apply(AuthEvent::SignedIn(session)).await;
        }
        Ok(())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let session = self.provider.sign_in_with_password(email, password).await?;
        info!("Signed in as {}", email);
        self.apply(AuthEvent::SignedIn(session)).await;
        Ok(())
    }

    /// URL to open for Google sign-in.
    pub fn sign_in_with_google(&self) -> Result<String> {
        self.provider.authorize_url("google")
    }

    /// Sign out. A rejected token still clears the local session; an
    /// unreachable provider leaves it in place and returns the error.
    pub async fn sign_out(&self) -> Result<()> {
        if let Some(token) = self.get_access_token() {
            if let Err(e) = self.provider.sign_out(&token).await {
                if e.is_unreachable() {
                    return Err(e);
                }
                warn!("Provider rejected sign-out, clearing local session: {}", e);
            }
        }
        self.apply(AuthEvent::SignedOut).await;
        Ok(())
    }

    /// Exchange the refresh token for a new session.
    pub async fn refresh_session(&self) -> Result<()> {
        let refresh_token = self
            .session
            .read()
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or_else(|| AppError::Unauthorized("No session to refresh".to_string()))?;

        let fresh = self.provider.refresh(&refresh_token).await?;
        self.apply(AuthEvent::TokenRefreshed(fresh)).await;
        Ok(())
    }

    /// Bearer token of the current session, if any.
    pub fn get_access_token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.access_token.clone())
    }

    /// Rebuild the user model from the provider identity and the profile row.
    pub async fn fetch_user_profile(&self) -> Result<()> {
        let Some(token) = self.get_access_token() else {
            self.state.update(|s| s.user = None);
            return Ok(());
        };

        let identity = self.provider.get_user(&token).await?;
        let profile = match self.provider.fetch_profile(&token, &identity.id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Profile for {} unavailable: {}", identity.id, e);
                None
            }
        };

        let user = merge_profile(&identity, profile.as_ref());
        self.state.update(|s| s.user = Some(user));
        Ok(())
    }

    /// Write the provided profile fields, then reload the user model.
    pub async fn update_user(&self, update: &ProfileUpdate) -> Result<()> {
        let user_id = self
            .user()
            .map(|u| u.id)
            .ok_or_else(|| AppError::Unauthorized("No user logged in".to_string()))?;
        let token = self
            .get_access_token()
            .ok_or_else(|| AppError::Unauthorized("No user logged in".to_string()))?;

        if !update.is_empty() {
            self.provider.update_profile(&token, &user_id, update).await?;
        }
        self.fetch_user_profile().await?;
        self.emit(AuthEvent::UserUpdated);
        Ok(())
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.state.with(|s| s.user.clone())
    }

    pub fn user_id(&self) -> Option<String> {
        self.state.with(|s| s.user.as_ref().map(|u| u.id.clone()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with(|s| s.user.is_some())
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|s| s.loading)
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.session.read().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Store the event's session, rebuild the user model and broadcast.
    async fn apply(&self, event: AuthEvent) {
        let session = event.session().cloned();
        self.store_session(session);

        if self.get_access_token().is_some() {
            if let Err(e) = self.fetch_user_profile().await {
                if e.is_unreachable() {
                    warn!("Could not load user profile: {}", e);
                } else {
                    warn!("Session rejected by identity provider, discarding: {}", e);
                    self.store_session(None);
                    self.state.update(|s| s.user = None);
                }
            }
        } else {
            self.state.update(|s| s.user = None);
        }

        self.state.update(|s| s.loading = false);
        self.emit(event);
    }

    fn store_session(&self, session: Option<AuthSession>) {
        let persisted = match &session {
            Some(s) => set_json(self.storage.as_ref(), AUTH_SESSION_KEY, s),
            None => self.storage.remove(AUTH_SESSION_KEY),
        };
        if let Err(e) = persisted {
            warn!("Failed to persist auth session: {}", e);
        }
        *self.session.write() = session;
    }

    fn emit(&self, event: AuthEvent) {
        if self.events.send(event).is_err() {
            debug!("Auth event dropped: no listeners");
        }
    }
}

/// Merge identity metadata with the profile row.
///
/// Name: profile name, then metadata `name`, `full_name`, the email's local
/// part, and finally "User". Avatar: metadata `avatar_url`, else initials
/// seeded by email.
pub fn merge_profile(identity: &IdentityUser, profile: Option<&ProfileRecord>) -> AuthUser {
    let email = identity.email.clone().unwrap_or_default();
    let meta = &identity.user_metadata;

    let name = [
        profile.and_then(|p| p.name.as_deref()),
        meta.name.as_deref(),
        meta.full_name.as_deref(),
        email.split('@').next(),
    ]
    .into_iter()
    .flatten()
    .find(|candidate| !candidate.trim().is_empty())
    .unwrap_or("User")
    .to_string();

    let avatar_url = meta
        .avatar_url
        .clone()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| default_avatar_url(&email));

    AuthUser {
        id: identity.id.clone(),
        email,
        name,
        avatar_url,
        role: profile.and_then(|p| p.role).unwrap_or_default(),
        gender: profile.and_then(|p| p.gender.clone()),
        birthdate: profile.and_then(|p| p.birthdate.clone()),
        city: profile.and_then(|p| p.city.clone()),
        mobile_number: profile.and_then(|p| p.mobile_number.clone()),
    }
}

/// Initials avatar seeded by `email` ("U" when empty).
pub fn default_avatar_url(email: &str) -> String {
    let seed = if email.is_empty() { "U" } else { email };
    Url::parse_with_params(AVATAR_BASE_URL, &[("seed", seed)])
        .map(|url| url.to_string())
        .unwrap_or_else(|_| AVATAR_BASE_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::provider::UserMetadata;
    use crate::models::UserRole;

    fn identity(email: &str, meta: UserMetadata) -> IdentityUser {
        IdentityUser {
            id: "u1".into(),
            email: Some(email.into()),
            user_metadata: meta,
        }
    }

    #[test]
    fn test_name_chain_prefers_profile_then_metadata() {
        let meta = UserMetadata {
            name: None,
            full_name: Some("Nguyễn Văn An".into()),
            avatar_url: None,
        };
        let profile = ProfileRecord {
            id: "u1".into(),
            name: Some("An".into()),
            role: Some(UserRole::Admin),
            ..Default::default()
        };

        let with_profile = merge_profile(&identity("an@example.com", meta.clone()), Some(&profile));
        assert_eq!(with_profile.name, "An");
        assert!(with_profile.is_admin());

        let without_profile = merge_profile(&identity("an@example.com", meta), None);
        assert_eq!(without_profile.name, "Nguyễn Văn An");
        assert_eq!(without_profile.role, UserRole::User);
    }

    #[test]
    fn test_name_falls_back_to_email_local_part_then_user() {
        let user = merge_profile(&identity("lan.tran@example.com", UserMetadata::default()), None);
        assert_eq!(user.name, "lan.tran");

        let anonymous = IdentityUser {
            id: "u2".into(),
            email: None,
            user_metadata: UserMetadata::default(),
        };
        assert_eq!(merge_profile(&anonymous, None).name, "User");
    }

    #[test]
    fn test_default_avatar_is_seeded_by_email() {
        let user = merge_profile(&identity("an@example.com", UserMetadata::default()), None);
        assert_eq!(
            user.avatar_url,
            "https://api.dicebear.com/7.x/initials/svg?seed=an%40example.com"
        );
        assert!(default_avatar_url("").ends_with("seed=U"));

        let meta = UserMetadata {
            avatar_url: Some("https://lh3.googleusercontent.com/a/x".into()),
            ..Default::default()
        };
        let google = merge_profile(&identity("an@example.com", meta), None);
        assert_eq!(google.avatar_url, "https://lh3.googleusercontent.com/a/x");
    }
}
