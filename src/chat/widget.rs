use super::log::MessageLog;
use super::session::{self, SessionResolution};
use super::{strip_markdown, suggested_questions};
use crate::api::ApiClient;
use crate::auth::AuthStore;
use crate::i18n::{t, Language};
use crate::models::{ChatMessage, ChatSession};
use crate::state::{Notifications, Observable, Subscription};
use crate::storage::{KeyValueStore, CHAT_SESSION_KEY};
use crate::types::{AppError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// What a front end renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub session_id: Option<String>,
    /// Sidebar list, newest first. Empty for anonymous visitors.
    pub sessions: Vec<ChatSession>,
    pub resolution: SessionResolution,
    pub sending: bool,
    pub loading_history: bool,
    pub language: Language,
    /// Starters shown while only the greeting is visible.
    pub suggestions: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    log: MessageLog,
    session_id: Option<String>,
    sessions: Vec<ChatSession>,
    resolution: SessionResolution,
    language: Language,
    sending: bool,
    loading_history: bool,
    history_generation: u64,
    sessions_generation: u64,
}

impl Inner {
    fn snapshot(&self) -> ChatState {
        let suggestions = if self.log.is_only_welcome() {
            suggested_questions(self.language)
        } else {
            Vec::new()
        };
        ChatState {
            messages: self.log.messages(),
            session_id: self.session_id.clone(),
            sessions: self.sessions.clone(),
            resolution: self.resolution,
            sending: self.sending,
            loading_history: self.loading_history,
            language: self.language,
            suggestions,
        }
    }

    fn welcome(&mut self) {
        self.log = MessageLog::welcome(t(self.language, "chat_welcome"));
    }
}

/// One chat surface (floating widget or full page). Widgets sharing a
/// key-value store share the cached session id.
pub struct ChatWidget {
    api: ApiClient,
    auth: Arc<AuthStore>,
    storage: Arc<dyn KeyValueStore>,
    notifications: Notifications,
    inner: Mutex<Inner>,
    state: Observable<ChatState>,
}

impl ChatWidget {
    pub fn new(
        api: ApiClient,
        auth: Arc<AuthStore>,
        storage: Arc<dyn KeyValueStore>,
        notifications: Notifications,
        language: Language,
    ) -> Self {
        let mut inner = Inner {
            language,
            ..Default::default()
        };
        inner.welcome();
        let state = Observable::new(inner.snapshot());

        Self {
            api,
            auth,
            storage,
            notifications,
            inner: Mutex::new(inner),
            state,
        }
    }

    /// Apply `f` under the lock and publish the new snapshot.
    fn mutate<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.lock();
        let out = f(&mut inner);
        self.state.set(inner.snapshot());
        out
    }

    fn authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    fn persist_session_id(&self, id: Option<&str>) {
        let result = match id {
            Some(id) => self.storage.set(CHAT_SESSION_KEY, id),
            None => self.storage.remove(CHAT_SESSION_KEY),
        };
        if let Err(e) = result {
            warn!("Failed to persist chat session id: {}", e);
        }
    }

    // ============= Resolution =============

    /// Pick the starting session for the current auth state and load it.
    pub async fn init(&self) {
        if self.authenticated() {
            let sessions = self.refresh_sessions().await;
            let (resolution, selected) = session::resolve_authenticated(&sessions);
            info!("Chat resolved as {:?}", resolution);
            self.activate(resolution, selected).await;
        } else {
            let cached = self.storage.get(CHAT_SESSION_KEY);
            let (resolution, selected) = session::resolve_anonymous(cached);
            info!("Chat resolved as {:?}", resolution);
            self.activate(resolution, selected).await;
        }
    }

    /// Re-resolve after sign-in or sign-out. Signing out forgets the cached
    /// id so the next visitor does not resume the user's conversation.
    pub async fn on_auth_changed(&self) {
        let signed_out = !self.authenticated()
            && self.inner.lock().resolution.is_authenticated();
        if signed_out {
            self.persist_session_id(None);
            self.mutate(|inner| {
                inner.sessions.clear();
                inner.sessions_generation += 1;
            });
        }
        self.init().await;
    }

    /// Make `selected` the active session and show its history, or the
    /// greeting when there is none.
    async fn activate(&self, resolution: SessionResolution, selected: Option<String>) {
        if let Some(id) = &selected {
            self.persist_session_id(Some(id));
        }

        let generation = self.mutate(|inner| {
            inner.resolution = resolution;
            inner.session_id = selected.clone();
            inner.history_generation += 1;
            match selected {
                Some(_) => inner.loading_history = true,
                None => {
                    inner.loading_history = false;
                    inner.welcome();
                }
            }
            inner.history_generation
        });

        if let Some(id) = selected {
            self.load_history(&id, generation).await;
        }
    }

    /// Load history for `session_id`. Failures and empty histories show the
    /// greeting. Dropped when `generation` is stale.
    async fn load_history(&self, session_id: &str, generation: u64) {
        let token = self.auth.get_access_token();
        let result = self.api.session_messages(session_id, token.as_deref()).await;

        self.mutate(|inner| {
            if inner.history_generation != generation {
                debug!("Dropping stale history for session {}", session_id);
                return;
            }
            inner.loading_history = false;
            match result {
                Ok(history) if !history.messages.is_empty() => {
                    let messages = history.messages.into_iter().map(ChatMessage::from).collect();
                    inner.log = MessageLog::from_history(messages);
                }
                Ok(_) => inner.welcome(),
                Err(e) => {
                    warn!("Failed to load history for session {}: {}", session_id, e);
                    inner.welcome();
                }
            }
        });
    }

    /// Reload the sidebar list. Anonymous visitors and failed loads get an
    /// empty list.
    pub async fn refresh_sessions(&self) -> Vec<ChatSession> {
        let generation = self.mutate(|inner| {
            inner.sessions_generation += 1;
            inner.sessions_generation
        });

        let token = self.auth.get_access_token();
        if token.is_none() || !self.authenticated() {
            self.mutate(|inner| inner.sessions.clear());
            return Vec::new();
        }

        let result = self.api.list_sessions(token.as_deref()).await;
        self.mutate(|inner| {
            if inner.sessions_generation != generation {
                debug!("Dropping stale session list");
                return inner.sessions.clone();
            }
            inner.sessions = match result {
                Ok(mut sessions) => {
                    session::sort_recent_first(&mut sessions);
                    sessions
                }
                Err(e) => {
                    warn!("Failed to load chat sessions: {}", e);
                    Vec::new()
                }
            };
            inner.sessions.clone()
        })
    }

    // ============= Messaging =============

    /// Send `text` in the active session.
    ///
    /// The message shows immediately as pending. A reply confirms it; a
    /// failure marks it failed and appends a localised error bubble.
    /// Rejected with [`AppError::Busy`] while another send or a history load
    /// is in flight.
    pub async fn send(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("Message is empty".to_string()));
        }

        let message = ChatMessage::user(text);
        let message_id = message.id.clone();
        let (session_id, language) = {
            let mut inner = self.inner.lock();
            // A history load landing after this send would replace the log.
            if inner.sending || inner.loading_history {
                return Err(AppError::Busy);
            }
            inner.sending = true;
            inner.log.push_pending(message);
            self.state.set(inner.snapshot());
            (inner.session_id.clone(), inner.language)
        };

        let token = self.auth.get_access_token();
        let result = self
            .api
            .send_chat(text, session_id.as_deref(), language, token.as_deref())
            .await;

        match result {
            Ok(resp) => {
                let reply = ChatMessage::assistant(strip_markdown(&resp.response));
                let authenticated = self.authenticated();
                let adopted = self.mutate(|inner| {
                    inner.sending = false;
                    if !inner.log.confirm(&message_id, reply) {
                        debug!("Reply arrived after the conversation was replaced");
                        return None;
                    }
                    match resp.session_id {
                        Some(new_id) if inner.session_id.as_deref() != Some(new_id.as_str()) => {
                            info!("Adopting chat session {}", new_id);
                            inner.session_id = Some(new_id.clone());
                            inner.resolution = SessionResolution::with_session(authenticated);
                            Some(new_id)
                        }
                        _ => None,
                    }
                });

                if let Some(id) = adopted {
                    self.persist_session_id(Some(&id));
                    if authenticated {
                        self.refresh_sessions().await;
                    }
                }
                Ok(())
            }
            Err(e) => {
                warn!("Chat send failed: {}", e);
                self.mutate(|inner| {
                    inner.sending = false;
                    let bubble = ChatMessage::assistant(t(inner.language, "chat_send_error"));
                    inner.log.fail(&message_id, bubble);
                });
                self.notifications
                    .error(t(language, "chat_connection_error"));
                Err(e)
            }
        }
    }

    // ============= Session management =============

    /// Make an existing session active and load its history.
    pub async fn switch_session(&self, session_id: &str) {
        info!("Switching to chat session {}", session_id);
        let resolution = SessionResolution::with_session(self.authenticated());
        self.activate(resolution, Some(session_id.to_string())).await;
    }

    /// Create a session server-side and make it active with a fresh greeting.
    /// On failure the current session is left untouched.
    pub async fn new_chat(&self) -> Result<String> {
        let language = self.inner.lock().language;
        let token = self.auth.get_access_token();
        let id = self
            .api
            .create_session(&t(language, "chat_new_chat_title"), language, token.as_deref())
            .await?;

        let authenticated = self.authenticated();
        self.persist_session_id(Some(&id));
        self.mutate(|inner| {
            inner.session_id = Some(id.clone());
            inner.resolution = SessionResolution::with_session(authenticated);
            inner.history_generation += 1;
            inner.loading_history = false;
            inner.welcome();
        });

        if authenticated {
            self.refresh_sessions().await;
        }
        Ok(id)
    }

    /// Delete a session. Deleting the active one moves to a new chat; if that
    /// cannot be created the widget is left with no session rather than the
    /// deleted id.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let token = self.auth.get_access_token();
        self.api.delete_session(session_id, token.as_deref()).await?;

        let was_active = self.mutate(|inner| {
            inner.sessions.retain(|s| s.id != session_id);
            inner.session_id.as_deref() == Some(session_id)
        });

        if !was_active {
            self.refresh_sessions().await;
            return Ok(());
        }

        match self.new_chat().await {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!("No replacement for deleted session {}: {}", session_id, e);
                let authenticated = self.authenticated();
                self.persist_session_id(None);
                self.mutate(|inner| {
                    inner.session_id = None;
                    inner.resolution = SessionResolution::without_session(authenticated);
                    inner.history_generation += 1;
                    inner.loading_history = false;
                    inner.welcome();
                });
                Err(e)
            }
        }
    }

    /// Change the display language; an untouched greeting is re-localised.
    pub fn set_language(&self, language: Language) {
        self.mutate(|inner| {
            inner.language = language;
            inner.log.relocalize_welcome(t(language, "chat_welcome"));
        });
    }

    /// Re-resolve whenever the signed-in identity changes.
    pub fn watch_auth(self: &Arc<Self>) -> Subscription {
        let widget = Arc::clone(self);
        let mut rx = self.auth.subscribe();
        let mut last = rx.borrow().user.as_ref().map(|u| u.id.clone());

        Subscription::new(tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let current = rx.borrow_and_update().user.as_ref().map(|u| u.id.clone());
                if current != last {
                    last = current;
                    widget.on_auth_changed().await;
                }
            }
        }))
    }

    // ============= Accessors =============

    pub fn snapshot(&self) -> ChatState {
        self.state.get()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.with(|s| s.messages.clone())
    }

    pub fn session_id(&self) -> Option<String> {
        self.state.with(|s| s.session_id.clone())
    }

    pub fn sessions(&self) -> Vec<ChatSession> {
        self.state.with(|s| s.sessions.clone())
    }

    pub fn resolution(&self) -> SessionResolution {
        self.state.with(|s| s.resolution)
    }

    pub fn is_sending(&self) -> bool {
        self.state.with(|s| s.sending)
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.state.with(|s| s.suggestions.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::DisabledProvider;
    use crate::storage::MemoryStore;

    fn offline_widget(storage: Arc<MemoryStore>) -> ChatWidget {
        let auth = Arc::new(AuthStore::new(Arc::new(DisabledProvider), storage.clone()));
        ChatWidget::new(
            ApiClient::with_base_url("http://127.0.0.1:1"),
            auth,
            storage,
            Notifications::new(),
            Language::En,
        )
    }

    #[test]
    fn test_new_widget_shows_welcome_and_suggestions() {
        let widget = offline_widget(Arc::new(MemoryStore::new()));
        let state = widget.snapshot();
        assert_eq!(state.messages.len(), 1);
        assert!(state.messages[0].is_welcome());
        assert_eq!(state.suggestions.len(), 4);
        assert_eq!(state.session_id, None);
    }

    #[test]
    fn test_language_switch_relocalises_untouched_welcome() {
        let widget = offline_widget(Arc::new(MemoryStore::new()));
        widget.set_language(Language::Vi);
        let state = widget.snapshot();
        assert!(state.messages[0].content.starts_with("Xin chào!"));
        assert_eq!(state.suggestions[0], "Tour nào phù hợp với gia đình?");
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_without_request() {
        let widget = offline_widget(Arc::new(MemoryStore::new()));
        let err = widget.send("   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(widget.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_history_fails_open_to_welcome() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(CHAT_SESSION_KEY, "s-cached").unwrap();
        let widget = offline_widget(storage);

        widget.init().await;
        let state = widget.snapshot();
        assert_eq!(state.resolution, SessionResolution::AnonymousCached);
        assert_eq!(state.session_id.as_deref(), Some("s-cached"));
        assert!(!state.loading_history);
        assert!(state.messages[0].is_welcome());
    }

    #[tokio::test]
    async fn test_failed_send_keeps_message_and_appends_error() {
        let widget = offline_widget(Arc::new(MemoryStore::new()));
        let err = widget.send("Tour nào rẻ nhất?").await.unwrap_err();
        assert!(err.is_unreachable());

        let messages = widget.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "Tour nào rẻ nhất?");
        assert_eq!(messages[1].delivery, crate::models::Delivery::Failed);
        assert!(messages[2].content.starts_with("Sorry"));
        assert!(!widget.is_sending());
    }
}
