//! Tours as the backend sends them and as the catalog holds them.

use super::de;
use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// VND per USD used for display conversion.
pub const VND_PER_USD: f64 = 23_000.0;

/// Category tags: the backend stores either one tag or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TourTypes {
    One(String),
    Many(Vec<String>),
}

impl TourTypes {
    pub fn into_list(self) -> Vec<String> {
        match self {
            TourTypes::One(tag) if tag.is_empty() => vec![],
            TourTypes::One(tag) => vec![tag],
            TourTypes::Many(tags) => tags,
        }
    }
}

/// Row of the `tours` table, field names as on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourRecord {
    /// Empty for a tour not yet created.
    #[serde(default, deserialize_with = "de::id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_key: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub reviews: u32,
    #[serde(default, deserialize_with = "de::null_default")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_vnd: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tour_type: Option<TourTypes>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub departure: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub destination: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub transportation: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info_en: Option<String>,
}

/// A bookable cultural experience, normalised for display and filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tour {
    pub id: String,
    pub title: String,
    pub title_en: Option<String>,
    pub title_key: Option<String>,
    pub image: String,
    /// Gallery; empty when the backend sent none.
    pub images: Vec<String>,
    pub rating: f64,
    pub reviews: u32,
    /// Base-currency (USD) price, never negative.
    pub price: f64,
    pub price_vnd: Option<f64>,
    /// Category tags, always a list.
    pub types: Vec<String>,
    pub departure: String,
    pub destination: String,
    pub transportation: String,
    pub description: String,
    pub description_en: Option<String>,
    pub detailed_description: Option<String>,
    /// Rich-text markup, rendered verbatim.
    pub additional_info: Option<String>,
    pub additional_info_en: Option<String>,
}

impl From<TourRecord> for Tour {
    fn from(r: TourRecord) -> Self {
        let price = if r.price.is_finite() && r.price >= 0.0 {
            r.price
        } else {
            tracing::warn!("Tour {} has invalid price {}, using 0", r.id, r.price);
            0.0
        };

        Self {
            id: r.id,
            title: r.title,
            title_en: non_empty(r.title_en),
            title_key: non_empty(r.title_key),
            image: r.image,
            images: r.images.unwrap_or_default(),
            rating: r.rating.clamp(0.0, 5.0),
            reviews: r.reviews,
            price,
            price_vnd: r.price_vnd,
            types: r.tour_type.map(TourTypes::into_list).unwrap_or_default(),
            departure: r.departure,
            destination: r.destination,
            transportation: r.transportation,
            description: r.description,
            description_en: non_empty(r.description_en),
            detailed_description: non_empty(r.detailed_description),
            additional_info: non_empty(r.additional_info),
            additional_info_en: non_empty(r.additional_info_en),
        }
    }
}

impl From<&Tour> for TourRecord {
    fn from(t: &Tour) -> Self {
        Self {
            id: t.id.clone(),
            title: t.title.clone(),
            title_en: t.title_en.clone(),
            title_key: t.title_key.clone(),
            image: t.image.clone(),
            images: Some(t.images.clone()),
            rating: t.rating,
            reviews: t.reviews,
            price: t.price,
            price_vnd: t.price_vnd,
            tour_type: Some(TourTypes::Many(t.types.clone())),
            departure: t.departure.clone(),
            destination: t.destination.clone(),
            transportation: t.transportation.clone(),
            description: t.description.clone(),
            description_en: t.description_en.clone(),
            detailed_description: t.detailed_description.clone(),
            additional_info: t.additional_info.clone(),
            additional_info_en: t.additional_info_en.clone(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl Tour {
    pub fn display_title(&self, language: Language) -> &str {
        match (language, &self.title_en) {
            (Language::En, Some(en)) => en,
            _ => &self.title,
        }
    }

    pub fn display_description(&self, language: Language) -> &str {
        match (language, &self.description_en) {
            (Language::En, Some(en)) => en,
            _ => &self.description,
        }
    }

    pub fn display_additional_info(&self, language: Language) -> Option<&str> {
        match (language, &self.additional_info_en) {
            (Language::En, Some(en)) => Some(en.as_str()),
            _ => self.additional_info.as_deref(),
        }
    }

    /// Gallery images, falling back to the cover image.
    pub fn gallery(&self) -> Vec<&str> {
        if self.images.is_empty() {
            if self.image.is_empty() {
                vec![]
            } else {
                vec![self.image.as_str()]
            }
        } else {
            self.images.iter().map(String::as_str).collect()
        }
    }

    /// Price rendered in `currency`. An explicit VND price wins over conversion.
    pub fn formatted_price(&self, currency: Currency) -> String {
        match (currency, self.price_vnd) {
            (Currency::Vnd, Some(vnd)) if vnd > 0.0 => Currency::format_vnd(vnd),
            _ => currency.format(self.price),
        }
    }
}

// ============= Currency =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD", alias = "usd")]
    Usd,
    #[serde(rename = "VND", alias = "vnd")]
    Vnd,
}

impl Currency {
    /// Format a base-currency (USD) amount.
    pub fn format(&self, usd: f64) -> String {
        match self {
            Currency::Usd => {
                if usd.fract() == 0.0 {
                    format!("${}", usd as i64)
                } else {
                    format!("${:.2}", usd)
                }
            }
            Currency::Vnd => Self::format_vnd(usd * VND_PER_USD),
        }
    }

    fn format_vnd(vnd: f64) -> String {
        let whole = vnd.round() as i64;
        let digits = whole.abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if whole < 0 {
            grouped.insert(0, '-');
        }
        format!("{}₫", grouped)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usd => f.write_str("USD"),
            Currency::Vnd => f.write_str("VND"),
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "VND" => Ok(Currency::Vnd),
            other => Err(format!("unknown currency '{}'", other)),
        }
    }
}
