//! Supabase identity provider over its REST surface.
//!
//! Auth goes through GoTrue (`/auth/v1/*`), the `profiles` table through
//! PostgREST (`/rest/v1/profiles`). Every request carries the project's anon
//! key in the `apikey` header.

use super::provider::{AuthSession, IdentityProvider, IdentityUser};
use crate::models::{ProfileRecord, ProfileUpdate};
use crate::types::{AppError, Result};
use crate::utils::config::SupabaseConfig;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::json;

/// Error body shapes GoTrue and PostgREST use.
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ProviderErrorBody {
    fn reason(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    http: reqwest::Client,
    url: String,
    anon_key: String,
    redirect_to: String,
}

impl SupabaseAuth {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            http: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            redirect_to: redirect_to.into(),
        }
    }

    /// Build from the `[supabase]` section; fails when the URL or anon key is missing.
    pub fn from_config(config: &SupabaseConfig) -> Result<Self> {
        match (&config.url, &config.anon_key) {
            (Some(url), Some(key)) => Ok(Self::new(url.clone(), key.clone(), config.redirect_to.clone())),
            (None, _) => Err(AppError::Config("supabase.url is not set".to_string())),
            (_, None) => Err(AppError::Config(format!(
                "Supabase anon key not found in ${}",
                config.anon_key_env
            ))),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }

    fn with_keys(&self, req: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        let req = req.header("apikey", &self.anon_key);
        match access_token {
            Some(token) => req.bearer_auth(token),
            None => req.bearer_auth(&self.anon_key),
        }
    }

    async fn execute(req: RequestBuilder) -> Result<Response> {
        let resp = req.send().await.map_err(AppError::from)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ProviderErrorBody>(&text)
            .ok()
            .and_then(ProviderErrorBody::reason)
            .unwrap_or_else(|| format!("Identity provider returned {}", status));
        Err(AppError::Auth(reason))
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> Result<AuthSession> {
        let req = self
            .http
            .post(self.endpoint("/auth/v1/token"))
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let resp = Self::execute(self.with_keys(req, None)).await?;
        let session: AuthSession = resp.json().await?;
        Ok(session.stamp_expiry())
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Option<AuthSession>> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "name": name, "full_name": name },
        });
        let req = self.http.post(self.endpoint("/auth/v1/signup")).json(&body);
        let resp = Self::execute(self.with_keys(req, None)).await?;

        // With email confirmation on, GoTrue answers with the bare user.
        let value: serde_json::Value = resp.json().await?;
        if value.get("access_token").is_some() {
            let session: AuthSession = serde_json::from_value(value)?;
            Ok(Some(session.stamp_expiry()))
        } else {
            tracing::info!("Sign-up for {} awaits email confirmation", email);
            Ok(None)
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    fn authorize_url(&self, provider: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &self.endpoint("/auth/v1/authorize"),
            &[("provider", provider), ("redirect_to", self.redirect_to.as_str())],
        )
        .map_err(|e| AppError::Config(format!("Invalid Supabase URL: {}", e)))?;
        Ok(url.to_string())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn get_user(&self, access_token: &str) -> Result<IdentityUser> {
        let req = self.http.get(self.endpoint("/auth/v1/user"));
        let resp = Self::execute(self.with_keys(req, Some(access_token))).await?;
        Ok(resp.json().await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let req = self.http.post(self.endpoint("/auth/v1/logout"));
        Self::execute(self.with_keys(req, Some(access_token))).await?;
        Ok(())
    }

    async fn fetch_profile(&self, access_token: &str, user_id: &str) -> Result<Option<ProfileRecord>> {
        let id_filter = format!("eq.{}", user_id);
        let req = self
            .http
            .get(self.endpoint("/rest/v1/profiles"))
            .query(&[("id", id_filter.as_str()), ("select", "*")]);
        let resp = Self::execute(self.with_keys(req, Some(access_token))).await?;
        let rows: Vec<ProfileRecord> = resp.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<()> {
        let id_filter = format!("eq.{}", user_id);
        let req = self
            .http
            .patch(self.endpoint("/rest/v1/profiles"))
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(update);
        Self::execute(self.with_keys(req, Some(access_token))).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_encodes_redirect() {
        let auth = SupabaseAuth::new("https://proj.supabase.co/", "anon", "http://localhost:8080/tours?x=1");
        let url = auth.authorize_url("google").unwrap();
        assert!(url.starts_with("https://proj.supabase.co/auth/v1/authorize?provider=google"));
        assert!(url.contains("redirect_to=http%3A%2F%2Flocalhost%3A8080%2Ftours%3Fx%3D1"));
    }

    #[test]
    fn test_from_config_requires_url_and_key() {
        let mut config = SupabaseConfig::default();
        assert!(matches!(SupabaseAuth::from_config(&config), Err(AppError::Config(_))));

        config.url = Some("https://proj.supabase.co".into());
        let err = SupabaseAuth::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("SUPABASE_ANON_KEY"));

        config.anon_key = Some("anon".into());
        assert!(SupabaseAuth::from_config(&config).is_ok());
    }

    #[test]
    fn test_error_reason_prefers_description() {
        let body: ProviderErrorBody = serde_json::from_str(
            r#"{"error": "invalid_grant", "error_description": "Invalid login credentials"}"#,
        )
        .unwrap();
        assert_eq!(body.reason().as_deref(), Some("Invalid login credentials"));
    }
}
