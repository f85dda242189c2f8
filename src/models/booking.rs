//! Booking history entries.

use super::de;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tour columns joined onto a booking row. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingTour {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub price_vnd: Option<f64>,
    #[serde(default)]
    pub departure: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub tour_id: Option<String>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub booking_date: Option<DateTime<Utc>>,
    /// Joined tour; null when the tour was deleted.
    #[serde(default)]
    pub tours: Option<BookingTour>,
}

fn default_status() -> String {
    "pending".to_string()
}

impl Booking {
    pub fn tour_title(&self) -> Option<&str> {
        self.tours.as_ref().and_then(|t| t.title.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_with_null_tour() {
        let booking: Booking = serde_json::from_str(
            r#"{"id": 3, "tour_id": 7, "full_name": "Lan", "email": "lan@example.com",
                "phone": "0912345678", "status": "confirmed", "tours": null}"#,
        )
        .unwrap();
        assert_eq!(booking.id, "3");
        assert_eq!(booking.tour_id.as_deref(), Some("7"));
        assert_eq!(booking.tour_title(), None);
        assert_eq!(booking.booking_date, None);
    }
}
