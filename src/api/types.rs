//! API types matching the Joigo backend

use crate::models::{chat::MessageRecord, ChatSession, TourRecord};
use serde::{Deserialize, Serialize};

/// Error response from API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Human-readable reason. FastAPI validation errors put a list in `detail`;
    /// the first entry's `msg` is used then.
    pub fn reason(&self) -> Option<String> {
        match &self.detail {
            Some(serde_json::Value::String(s)) => return Some(s.clone()),
            Some(serde_json::Value::Array(items)) => {
                if let Some(msg) = items
                    .first()
                    .and_then(|item| item.get("msg"))
                    .and_then(|m| m.as_str())
                {
                    return Some(msg.to_string());
                }
            }
            _ => {}
        }
        self.error.clone().or_else(|| self.message.clone())
    }
}

// ============= Chat =============

/// Chat request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    /// `null` lets the backend mint a new session.
    pub session_id: Option<String>,
    pub language: String,
}

/// Chat response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, deserialize_with = "crate::models::de::opt_id")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionRequest {
    pub title: String,
    pub language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionResponse {
    #[serde(alias = "id", deserialize_with = "crate::models::de::id")]
    pub session_id: String,
}

/// The session list arrives either bare or wrapped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SessionsResponse {
    Wrapped { sessions: Vec<ChatSession> },
    Bare(Vec<ChatSession>),
}

impl SessionsResponse {
    pub fn into_sessions(self) -> Vec<ChatSession> {
        match self {
            SessionsResponse::Wrapped { sessions } => sessions,
            SessionsResponse::Bare(sessions) => sessions,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
}

// ============= Favorites =============

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteRequest {
    pub tour_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FavoritesResponse {
    #[serde(default)]
    pub favorites: Vec<TourRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteCheckResponse {
    pub is_favorite: bool,
}

// ============= Consultations & Bookings =============

/// "Book your tour now" / contact request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsultationRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub user_id: Option<String>,
    pub tour_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingRequest {
    pub user_id: String,
    pub tour_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
}

/// Acknowledgement for consultation and booking submissions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

// ============= Tracking =============

#[derive(Debug, Clone, Serialize)]
pub struct VisitorBeacon {
    pub page_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TourViewBeacon {
    pub tour_id: String,
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reason_from_string_detail() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"detail": "Tour không tồn tại"}"#).unwrap();
        assert_eq!(body.reason().as_deref(), Some("Tour không tồn tại"));
    }

    #[test]
    fn test_error_reason_from_validation_list() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"detail": [{"loc": ["body", "phone"], "msg": "String should have at least 9 characters"}]}"#,
        )
        .unwrap();
        assert_eq!(
            body.reason().as_deref(),
            Some("String should have at least 9 characters")
        );
    }

    #[test]
    fn test_sessions_response_both_shapes() {
        let bare: SessionsResponse =
            serde_json::from_str(r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();
        assert_eq!(bare.into_sessions().len(), 2);

        let wrapped: SessionsResponse =
            serde_json::from_str(r#"{"sessions": [{"id": "a"}]}"#).unwrap();
        assert_eq!(wrapped.into_sessions()[0].id, "a");
    }

    #[test]
    fn test_chat_request_sends_null_session() {
        let req = ChatRequest {
            message: "Xin chào".into(),
            session_id: None,
            language: "VI".into(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value["session_id"].is_null());
        assert_eq!(value["language"], "VI");
    }
}
