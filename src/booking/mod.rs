//! Consultation requests, tour bookings and booking history.
//!
//! Form fields are checked locally before anything is sent; an invalid form
//! never reaches the network.

use crate::api::types::{BookingRequest, ConsultationRequest};
use crate::api::ApiClient;
use crate::auth::AuthStore;
use crate::i18n::{t, t_with, Language};
use crate::models::Booking;
use crate::state::Notifications;
use crate::types::{AppError, Result};
use parking_lot::RwLock;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{error, info};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

const PHONE_MIN: usize = 9;
const PHONE_MAX: usize = 15;

/// Contact fields shared by the consultation and booking forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
}

impl ContactDetails {
    /// Check required fields and formats. The error message is localised.
    pub fn validate(&self, language: Language) -> Result<()> {
        let required = |field_key: &str| {
            AppError::Validation(t_with(
                language,
                "validation_required",
                &[("field", t(language, field_key).as_str())],
            ))
        };

        let name = self.full_name.trim();
        if name.is_empty() {
            return Err(required("field_full_name"));
        }
        if name.chars().count() < 2 {
            return Err(AppError::Validation(t(language, "validation_name_short")));
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err(required("field_email"));
        }
        if !EMAIL.is_match(email) {
            return Err(AppError::Validation(t(language, "validation_email_invalid")));
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(required("field_phone"));
        }
        let length = phone.chars().count();
        let allowed = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '.' | '(' | ')'));
        if !allowed || !(PHONE_MIN..=PHONE_MAX).contains(&length) {
            return Err(AppError::Validation(t(language, "validation_phone_invalid")));
        }

        Ok(())
    }

    fn trimmed_message(&self) -> Option<String> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }
}

pub struct BookingService {
    api: ApiClient,
    auth: Arc<AuthStore>,
    notifications: Notifications,
    language: RwLock<Language>,
}

impl BookingService {
    pub fn new(
        api: ApiClient,
        auth: Arc<AuthStore>,
        notifications: Notifications,
        language: Language,
    ) -> Self {
        Self {
            api,
            auth,
            notifications,
            language: RwLock::new(language),
        }
    }

    pub fn set_language(&self, language: Language) {
        *self.language.write() = language;
    }

    fn language(&self) -> Language {
        *self.language.read()
    }

    /// `POST /api/consultations`. Signed-in users are linked by id.
    pub async fn submit_consultation(
        &self,
        details: &ContactDetails,
        tour_id: Option<&str>,
    ) -> Result<()> {
        let language = self.language();
        self.validated(details, language)?;

        let request = ConsultationRequest {
            full_name: details.full_name.trim().to_string(),
            email: details.email.trim().to_string(),
            phone: details.phone.trim().to_string(),
            message: details.trimmed_message(),
            user_id: self.auth.user_id(),
            tour_id: tour_id.map(str::to_string),
        };

        match self.api.submit_consultation(&request).await {
            Ok(_) => {
                info!("Consultation request submitted");
                self.notifications.success(t(language, "contact_success"));
                Ok(())
            }
            Err(e) => {
                error!("Consultation request failed: {}", e);
                self.notifications.error(t(language, "contact_error"));
                Err(e)
            }
        }
    }

    /// `POST /api/bookings` for the signed-in user.
    pub async fn create_booking(&self, tour_id: &str, details: &ContactDetails) -> Result<()> {
        let language = self.language();
        let Some(user_id) = self.auth.user_id() else {
            let message = t(language, "booking_login_required");
            self.notifications.error(message.clone());
            return Err(AppError::Unauthorized(message));
        };
        self.validated(details, language)?;

        let request = BookingRequest {
            user_id,
            tour_id: tour_id.to_string(),
            full_name: details.full_name.trim().to_string(),
            email: details.email.trim().to_string(),
            phone: details.phone.trim().to_string(),
            message: details.trimmed_message(),
        };
        let token = self.auth.get_access_token();

        match self.api.create_booking(&request, token.as_deref()).await {
            Ok(_) => {
                info!("Booked tour {}", tour_id);
                self.notifications.success(t(language, "booking_success"));
                Ok(())
            }
            Err(e) => {
                error!("Booking tour {} failed: {}", tour_id, e);
                let message = match &e {
                    AppError::Api { detail, .. } | AppError::Unauthorized(detail) => {
                        detail.clone()
                    }
                    _ => t(language, "contact_error"),
                };
                self.notifications.error(message);
                Err(e)
            }
        }
    }

    /// Booking history of the signed-in user; empty when signed out.
    /// Callers classify failures with [`LoadFailure`](crate::types::LoadFailure).
    pub async fn my_bookings(&self) -> Result<Vec<Booking>> {
        match self.auth.user_id() {
            Some(user_id) => self.api.my_bookings(&user_id).await,
            None => Ok(Vec::new()),
        }
    }

    fn validated(&self, details: &ContactDetails, language: Language) -> Result<()> {
        details.validate(language).inspect_err(|e| {
            if let AppError::Validation(message) = e {
                self.notifications.error(message.clone());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(name: &str, email: &str, phone: &str) -> ContactDetails {
        ContactDetails {
            full_name: name.into(),
            email: email.into(),
            phone: phone.into(),
            message: None,
        }
    }

    #[test]
    fn test_valid_details_pass() {
        assert!(details("Trần Lan", "lan@example.com", "0912 345 678")
            .validate(Language::En)
            .is_ok());
        assert!(details("An", "an@example.vn", "+84912345678")
            .validate(Language::Vi)
            .is_ok());
    }

    #[test]
    fn test_empty_phone_is_required() {
        let err = details("Trần Lan", "lan@example.com", "  ")
            .validate(Language::En)
            .unwrap_err();
        match err {
            AppError::Validation(message) => assert_eq!(message, "Phone number is required"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_format_checks() {
        let short_name = details("L", "lan@example.com", "0912345678").validate(Language::En);
        assert!(matches!(short_name, Err(AppError::Validation(_))));

        let bad_email = details("Lan", "lan@example", "0912345678").validate(Language::Vi);
        match bad_email {
            Err(AppError::Validation(message)) => assert_eq!(message, "Email không hợp lệ"),
            other => panic!("unexpected result: {other:?}"),
        }

        for phone in ["12345678", "1234567890123456", "0912abc678"] {
            assert!(
                details("Lan", "lan@example.com", phone).validate(Language::En).is_err(),
                "{phone} should be rejected"
            );
        }
    }

    #[test]
    fn test_blank_message_is_dropped() {
        let mut d = details("Lan", "lan@example.com", "0912345678");
        d.message = Some("   ".into());
        assert_eq!(d.trimmed_message(), None);
        d.message = Some(" Cho 4 người ".into());
        assert_eq!(d.trimmed_message().as_deref(), Some("Cho 4 người"));
    }
}
