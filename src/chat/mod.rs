//! Chat assistant session lifecycle
//!
//! One [`ChatWidget`] keeps exactly one conversation active: its session id,
//! its message list, and (for signed-in users) the sidebar list of sessions.
//!
//! # Module Structure
//!
//! - [`chat::log`](crate::chat::log) - confirmed log plus pending overlay
//! - [`chat::session`](crate::chat::session) - session resolution by auth state
//!
//! # Ordering
//!
//! At most one send is in flight per widget; a second `send` while one is
//! pending fails with [`AppError::Busy`](crate::types::AppError::Busy).
//! History and session-list loads carry a generation number and a response
//! older than the widget's current generation is dropped, so a slow history
//! fetch cannot overwrite a session the user has since switched to.

/// Confirmed log with a pending overlay.
pub mod log;
/// Session resolution state machine.
pub mod session;
mod widget;

pub use log::MessageLog;
pub use session::SessionResolution;
pub use widget::{ChatState, ChatWidget};

use crate::i18n::{t, Language};
use regex::Regex;
use std::sync::LazyLock;

const SUGGESTION_KEYS: [&str; 4] = [
    "chat_suggestion_family",
    "chat_suggestion_culture",
    "chat_suggestion_cheapest",
    "chat_suggestion_craft",
];

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());

/// Conversation starters in `language`.
pub fn suggested_questions(language: Language) -> Vec<String> {
    SUGGESTION_KEYS
        .iter()
        .map(|key| t(language, key))
        .collect()
}

/// Drop `**bold**` and `*emphasis*` markers from assistant replies.
pub fn strip_markdown(text: &str) -> String {
    let without_bold = BOLD.replace_all(text, "$1");
    EMPHASIS.replace_all(&without_bold, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markdown() {
        assert_eq!(
            strip_markdown("**Làng gốm Bát Tràng** là *lựa chọn* tốt"),
            "Làng gốm Bát Tràng là lựa chọn tốt"
        );
        assert_eq!(strip_markdown("giá 2 * 3 = 6"), "giá 2 * 3 = 6");
        assert_eq!(strip_markdown("plain"), "plain");
    }

    #[test]
    fn test_four_localised_suggestions() {
        let en = suggested_questions(Language::En);
        let vi = suggested_questions(Language::Vi);
        assert_eq!(en.len(), 4);
        assert_eq!(en[0], "Which tour is suitable for families?");
        assert_eq!(vi[3], "Giới thiệu tour làng nghề");
    }
}
