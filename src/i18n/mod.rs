//! Localised strings.
//!
//! `t` maps a (language, key) pair to display text. Unknown keys fall back to
//! the key itself so a missing entry is visible rather than blank.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "EN", alias = "en")]
    En,
    #[serde(rename = "VI", alias = "vi")]
    Vi,
}

impl Language {
    /// Wire code sent to the backend (`"EN"` / `"VI"`).
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Vi => "VI",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EN" => Ok(Language::En),
            "VI" => Ok(Language::Vi),
            other => Err(format!("unknown language '{}'", other)),
        }
    }
}

struct Entry {
    en: &'static str,
    vi: &'static str,
}

const ENTRIES: &[(&str, Entry)] = &[
    // Chat assistant
    (
        "chat_welcome",
        Entry {
            en: "Hello! 👋 I'm JOIGO's virtual assistant. I can help you search and get advice about cultural tours in Hanoi. What kind of tour are you looking for?",
            vi: "Xin chào! 👋 Tôi là trợ lý ảo của JOIGO. Tôi có thể giúp bạn tìm kiếm và tư vấn về các tour du lịch văn hóa tại Hà Nội. Bạn muốn tìm loại tour nào?",
        },
    ),
    (
        "chat_send_error",
        Entry {
            en: "Sorry, I'm experiencing technical issues. Please try again later or contact our hotline for support.",
            vi: "Xin lỗi, tôi đang gặp sự cố kỹ thuật. Vui lòng thử lại sau hoặc liên hệ hotline để được hỗ trợ.",
        },
    ),
    (
        "chat_connection_error",
        Entry {
            en: "Cannot connect to chatbot. Please try again later.",
            vi: "Không thể kết nối với chatbot. Vui lòng thử lại sau.",
        },
    ),
    (
        "chat_new_chat_title",
        Entry {
            en: "New chat",
            vi: "Cuộc trò chuyện mới",
        },
    ),
    (
        "chat_no_history",
        Entry {
            en: "No chat history yet",
            vi: "Chưa có lịch sử trò chuyện",
        },
    ),
    (
        "chat_suggestion_family",
        Entry {
            en: "Which tour is suitable for families?",
            vi: "Tour nào phù hợp với gia đình?",
        },
    ),
    (
        "chat_suggestion_culture",
        Entry {
            en: "I want to find traditional cultural tours",
            vi: "Tôi muốn tìm tour văn hóa truyền thống",
        },
    ),
    (
        "chat_suggestion_cheapest",
        Entry {
            en: "Which tour has the cheapest price?",
            vi: "Tour nào có giá rẻ nhất?",
        },
    ),
    (
        "chat_suggestion_craft",
        Entry {
            en: "Introduce craft village tours",
            vi: "Giới thiệu tour làng nghề",
        },
    ),
    // Wishlist
    (
        "wishlist_login_required",
        Entry {
            en: "Please log in to save favourite tours",
            vi: "Vui lòng đăng nhập để thêm tour yêu thích",
        },
    ),
    (
        "wishlist_added",
        Entry {
            en: "Added \"{title}\" to your wishlist! ❤️",
            vi: "Đã thêm \"{title}\" vào danh sách yêu thích! ❤️",
        },
    ),
    (
        "wishlist_removed",
        Entry {
            en: "Removed from your wishlist",
            vi: "Đã xóa khỏi danh sách yêu thích",
        },
    ),
    (
        "wishlist_error",
        Entry {
            en: "Something went wrong. Please try again.",
            vi: "Có lỗi xảy ra. Vui lòng thử lại.",
        },
    ),
    // Consultation / booking
    (
        "contact_success",
        Entry {
            en: "Request sent! We will contact you soon.",
            vi: "Gửi yêu cầu thành công! Chúng tôi sẽ liên hệ sớm.",
        },
    ),
    (
        "contact_error",
        Entry {
            en: "Could not send your request. Please try again.",
            vi: "Không thể gửi yêu cầu. Vui lòng thử lại.",
        },
    ),
    (
        "booking_success",
        Entry {
            en: "Tour booked successfully!",
            vi: "Đặt tour thành công!",
        },
    ),
    (
        "bookings_unreachable",
        Entry {
            en: "Cannot reach the server. Check your connection and retry.",
            vi: "Không thể kết nối tới máy chủ. Vui lòng kiểm tra kết nối và thử lại.",
        },
    ),
    (
        "bookings_rejected",
        Entry {
            en: "The server could not load your bookings: {detail}",
            vi: "Không thể tải lịch sử đặt tour: {detail}",
        },
    ),
    (
        "validation_required",
        Entry {
            en: "{field} is required",
            vi: "Vui lòng nhập {field}",
        },
    ),
    (
        "validation_name_short",
        Entry {
            en: "Full name must be at least 2 characters",
            vi: "Họ tên phải có ít nhất 2 ký tự",
        },
    ),
    (
        "validation_email_invalid",
        Entry {
            en: "Please enter a valid email address",
            vi: "Email không hợp lệ",
        },
    ),
    (
        "validation_phone_invalid",
        Entry {
            en: "Phone number must be 9 to 15 digits",
            vi: "Số điện thoại phải có từ 9 đến 15 chữ số",
        },
    ),
    (
        "field_full_name",
        Entry {
            en: "Full name",
            vi: "họ tên",
        },
    ),
    (
        "field_email",
        Entry {
            en: "Email",
            vi: "email",
        },
    ),
    (
        "field_phone",
        Entry {
            en: "Phone number",
            vi: "số điện thoại",
        },
    ),
    (
        "booking_login_required",
        Entry {
            en: "Please log in to book a tour",
            vi: "Vui lòng đăng nhập để đặt tour",
        },
    ),
    // Catalog
    (
        "tours_empty",
        Entry {
            en: "No tours found",
            vi: "Không tìm thấy tour nào",
        },
    ),
    (
        "td_tour_not_found",
        Entry {
            en: "Tour not found",
            vi: "Không tìm thấy tour",
        },
    ),
    // Auth
    (
        "auth_login_error",
        Entry {
            en: "Login failed. Please try again.",
            vi: "Đăng nhập thất bại. Vui lòng thử lại.",
        },
    ),
    (
        "auth_signup_error",
        Entry {
            en: "Sign up failed. Please try again.",
            vi: "Đăng ký thất bại. Vui lòng thử lại.",
        },
    ),
    (
        "profile_not_logged_in",
        Entry {
            en: "You are not logged in",
            vi: "Bạn chưa đăng nhập",
        },
    ),
];

static DICTIONARY: LazyLock<HashMap<&'static str, &'static Entry>> =
    LazyLock::new(|| ENTRIES.iter().map(|(key, entry)| (*key, entry)).collect());

/// Look up `key` in `language`.
pub fn t(language: Language, key: &str) -> String {
    match DICTIONARY.get(key) {
        Some(entry) => match language {
            Language::En => entry.en.to_string(),
            Language::Vi => entry.vi.to_string(),
        },
        None => key.to_string(),
    }
}

/// Look up `key` and substitute every `{name}` placeholder from `params`.
pub fn t_with(language: Language, key: &str, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(t(language, key), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
}
