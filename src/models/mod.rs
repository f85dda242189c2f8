//! Domain types shared by the stores and the API client.
//!
//! Wire records (`*Record`) mirror the backend's JSON exactly; the display
//! types are produced from them by one mapping function per type, at the
//! fetch boundary.

pub mod booking;
pub mod chat;
pub mod tour;
pub mod user;

pub use booking::{Booking, BookingTour};
pub use chat::{ChatMessage, ChatSession, Delivery, MessageRole};
pub use tour::{Currency, Tour, TourRecord};
pub use user::{AuthUser, ProfileRecord, ProfileUpdate, UserRole};

/// Lenient deserialisers for fields the backend does not type consistently.
pub(crate) mod de {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Str(String),
        Int(i64),
        Float(f64),
    }

    /// Ids arrive as strings from some tables and integers from others.
    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match StringOrNumber::deserialize(d)? {
            StringOrNumber::Str(s) => s,
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        })
    }

    pub fn opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(
            Option::<StringOrNumber>::deserialize(d)?.map(|v| match v {
                StringOrNumber::Str(s) => s,
                StringOrNumber::Int(i) => i.to_string(),
                StringOrNumber::Float(f) => f.to_string(),
            }),
        )
    }

    /// `null` reads as the type's default.
    pub fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
    }

    /// Parse RFC 3339, falling back to a naive timestamp taken as UTC.
    pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    pub fn opt_timestamp<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<String>::deserialize(d)?.and_then(|raw| parse_timestamp(&raw)))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{Datelike, Timelike};

        #[test]
        fn test_parse_timestamp_variants() {
            let with_offset = parse_timestamp("2025-11-02T08:30:00+07:00").unwrap();
            assert_eq!(with_offset.hour(), 1);

            let naive = parse_timestamp("2025-11-02T08:30:00.123456").unwrap();
            assert_eq!(naive.hour(), 8);
            assert_eq!(naive.day(), 2);

            assert!(parse_timestamp("yesterday").is_none());
        }
    }
}
