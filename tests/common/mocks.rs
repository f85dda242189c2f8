//! Mock implementations for testing.
//!
//! A scripted identity provider, so store tests can sign users in and out
//! without a Supabase project.

use async_trait::async_trait;
use joigo::auth::provider::UserMetadata;
use joigo::auth::{AuthSession, IdentityProvider, IdentityUser};
use joigo::models::{ProfileRecord, ProfileUpdate};
use joigo::types::{AppError, Result};
use parking_lot::Mutex;

/// Identity provider that accepts one email/password pair.
///
/// Tokens are `token-<user id>`, so backend mocks can match the bearer
/// header of a specific user.
pub struct FakeIdentity {
    email: String,
    password: String,
    user_id: String,
    profile: Mutex<ProfileRecord>,
    pub sign_out_calls: Mutex<u32>,
}

impl FakeIdentity {
    pub fn new(email: &str, password: &str, user_id: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            user_id: user_id.to_string(),
            profile: Mutex::new(ProfileRecord {
                id: user_id.to_string(),
                ..Default::default()
            }),
            sign_out_calls: Mutex::new(0),
        }
    }

    pub fn token(&self) -> String {
        format!("token-{}", self.user_id)
    }

    fn identity(&self) -> IdentityUser {
        IdentityUser {
            id: self.user_id.clone(),
            email: Some(self.email.clone()),
            user_metadata: UserMetadata::default(),
        }
    }

    fn session(&self) -> AuthSession {
        AuthSession {
            access_token: self.token(),
            refresh_token: Some(format!("refresh-{}", self.user_id)),
            expires_in: Some(3600),
            expires_at: None,
            user: self.identity(),
        }
        .stamp_expiry()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_up(&self, _email: &str, _password: &str, name: &str) -> Result<Option<AuthSession>> {
        self.profile.lock().name = Some(name.to_string());
        Ok(Some(self.session()))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        if email == self.email && password == self.password {
            Ok(self.session())
        } else {
            Err(AppError::Auth("Invalid login credentials".to_string()))
        }
    }

    fn authorize_url(&self, provider: &str) -> Result<String> {
        Ok(format!("https://auth.test/authorize?provider={}", provider))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession> {
        if refresh_token == format!("refresh-{}", self.user_id) {
            Ok(self.session())
        } else {
            Err(AppError::Auth("Invalid refresh token".to_string()))
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<IdentityUser> {
        if access_token == self.token() {
            Ok(self.identity())
        } else {
            Err(AppError::Auth("invalid JWT".to_string()))
        }
    }

    async fn sign_out(&self, _access_token: &str) -> Result<()> {
        *self.sign_out_calls.lock() += 1;
        Ok(())
    }

    async fn fetch_profile(&self, _access_token: &str, _user_id: &str) -> Result<Option<ProfileRecord>> {
        Ok(Some(self.profile.lock().clone()))
    }

    async fn update_profile(
        &self,
        _access_token: &str,
        _user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<()> {
        let mut profile = self.profile.lock();
        if let Some(name) = &update.name {
            profile.name = Some(name.clone());
        }
        if let Some(city) = &update.city {
            profile.city = Some(city.clone());
        }
        Ok(())
    }
}
