//! reqwest-backed client for the Joigo REST API.

use super::types::*;
use crate::i18n::Language;
use crate::models::{Booking, ChatSession, Tour, TourRecord};
use crate::types::{AppError, Result};
use crate::utils::config::ApiConfig;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Thin wrapper over a shared `reqwest::Client` and the backend base URL.
///
/// Cloning is cheap; every store holds its own handle.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from the `[api]` config section. No timeout is set unless
    /// `timeout_secs` is configured.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client with default transport settings against `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let req = self.http.request(method, self.url(path));
        match token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    /// Send and check the status. Non-2xx responses become `AppError::Api`
    /// carrying the body's `detail`, or `Unauthorized` for 401.
    async fn execute(req: RequestBuilder) -> Result<Response> {
        let resp = req.send().await.map_err(AppError::from)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .and_then(|body| body.reason())
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthorized(detail));
        }
        Err(AppError::Api { status, detail })
    }

    async fn fetch<R: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<R> {
        let resp = Self::execute(self.request(Method::GET, path, token)).await?;
        Ok(resp.json::<R>().await?)
    }

    async fn send_json<B, R>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let resp = Self::execute(self.request(method, path, token).json(body)).await?;
        Ok(resp.json::<R>().await?)
    }

    /// Like `send_json` but the response body is not read.
    async fn send_json_discard<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<()> {
        Self::execute(self.request(method, path, token).json(body)).await?;
        Ok(())
    }

    async fn delete(&self, path: &str, token: Option<&str>) -> Result<()> {
        Self::execute(self.request(Method::DELETE, path, token)).await?;
        Ok(())
    }

    // ============= Tours =============

    /// `GET /api/tours`, mapped to display tours at this boundary.
    pub async fn list_tours(&self) -> Result<Vec<Tour>> {
        let records: Vec<TourRecord> = self.fetch("/api/tours", None).await?;
        Ok(records.into_iter().map(Tour::from).collect())
    }

    pub async fn get_tour(&self, id: &str) -> Result<Tour> {
        let record: TourRecord = self.fetch(&format!("/api/tours/{}", id), None).await?;
        Ok(Tour::from(record))
    }

    pub async fn create_tour(&self, tour: &Tour, token: Option<&str>) -> Result<()> {
        let token = require_token(token)?;
        self.send_json_discard(Method::POST, "/api/tours", &TourRecord::from(tour), Some(token))
            .await
    }

    pub async fn update_tour(&self, tour: &Tour, token: Option<&str>) -> Result<()> {
        let token = require_token(token)?;
        self.send_json_discard(
            Method::PUT,
            &format!("/api/tours/{}", tour.id),
            &TourRecord::from(tour),
            Some(token),
        )
        .await
    }

    pub async fn delete_tour(&self, id: &str, token: Option<&str>) -> Result<()> {
        let token = require_token(token)?;
        self.delete(&format!("/api/tours/{}", id), Some(token)).await
    }

    // ============= Chat =============

    pub async fn send_chat(
        &self,
        message: &str,
        session_id: Option<&str>,
        language: Language,
        token: Option<&str>,
    ) -> Result<ChatResponse> {
        let body = ChatRequest {
            message: message.to_string(),
            session_id: session_id.map(str::to_string),
            language: language.code().to_string(),
        };
        self.send_json(Method::POST, "/api/chat", &body, token).await
    }

    pub async fn list_sessions(&self, token: Option<&str>) -> Result<Vec<ChatSession>> {
        let token = require_token(token)?;
        let resp: SessionsResponse = self.fetch("/api/chat/sessions", Some(token)).await?;
        Ok(resp.into_sessions())
    }

    /// Returns the new session's id.
    pub async fn create_session(
        &self,
        title: &str,
        language: Language,
        token: Option<&str>,
    ) -> Result<String> {
        let body = CreateSessionRequest {
            title: title.to_string(),
            language: language.code().to_string(),
        };
        let resp: CreateSessionResponse = self
            .send_json(Method::POST, "/api/chat/sessions", &body, token)
            .await?;
        Ok(resp.session_id)
    }

    pub async fn session_messages(
        &self,
        session_id: &str,
        token: Option<&str>,
    ) -> Result<HistoryResponse> {
        self.fetch(&format!("/api/chat/sessions/{}/messages", session_id), token)
            .await
    }

    pub async fn delete_session(&self, session_id: &str, token: Option<&str>) -> Result<()> {
        let token = require_token(token)?;
        self.delete(&format!("/api/chat/sessions/{}", session_id), Some(token))
            .await
    }

    // ============= Favorites =============

    pub async fn list_favorites(&self, token: Option<&str>) -> Result<Vec<Tour>> {
        let token = require_token(token)?;
        let resp: FavoritesResponse = self.fetch("/api/favorites", Some(token)).await?;
        Ok(resp.favorites.into_iter().map(Tour::from).collect())
    }

    pub async fn add_favorite(&self, tour_id: &str, token: Option<&str>) -> Result<()> {
        let token = require_token(token)?;
        let body = FavoriteRequest {
            tour_id: tour_id.to_string(),
        };
        self.send_json_discard(Method::POST, "/api/favorites", &body, Some(token))
            .await
    }

    pub async fn remove_favorite(&self, tour_id: &str, token: Option<&str>) -> Result<()> {
        let token = require_token(token)?;
        self.delete(&format!("/api/favorites/{}", tour_id), Some(token))
            .await
    }

    pub async fn check_favorite(&self, tour_id: &str, token: Option<&str>) -> Result<bool> {
        let token = require_token(token)?;
        let resp: FavoriteCheckResponse = self
            .fetch(&format!("/api/favorites/check/{}", tour_id), Some(token))
            .await?;
        Ok(resp.is_favorite)
    }

    // ============= Consultations & Bookings =============

    pub async fn submit_consultation(&self, req: &ConsultationRequest) -> Result<SubmissionResponse> {
        self.send_json(Method::POST, "/api/consultations", req, None)
            .await
    }

    pub async fn create_booking(
        &self,
        req: &BookingRequest,
        token: Option<&str>,
    ) -> Result<SubmissionResponse> {
        self.send_json(Method::POST, "/api/bookings", req, token).await
    }

    /// Booking history. A body that is not a list reads as no bookings.
    pub async fn my_bookings(&self, user_id: &str) -> Result<Vec<Booking>> {
        let req = self
            .request(Method::GET, "/api/bookings/my-bookings", None)
            .query(&[("user_id", user_id)]);
        let resp = Self::execute(req).await?;
        match resp.json::<serde_json::Value>().await? {
            value @ serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
            other => {
                tracing::warn!("Unexpected bookings payload, treating as empty: {}", other);
                Ok(Vec::new())
            }
        }
    }

    // ============= Tracking =============

    pub async fn track_visitor(&self, page_path: &str) -> Result<()> {
        let body = VisitorBeacon {
            page_path: page_path.to_string(),
        };
        self.send_json_discard(Method::POST, "/api/tracking/visitor", &body, None)
            .await
    }

    pub async fn track_tour_view(&self, tour_id: &str, user_id: Option<&str>) -> Result<()> {
        let body = TourViewBeacon {
            tour_id: tour_id.to_string(),
            user_id: user_id.map(str::to_string),
        };
        self.send_json_discard(Method::POST, "/api/tracking/tour-view", &body, None)
            .await
    }
}

/// Token-requiring calls fail before any request when there is no session.
fn require_token(token: Option<&str>) -> Result<&str> {
    token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Please log in to continue".to_string()))
}
