//! Which session is current, keyed by authentication state.

use crate::models::ChatSession;
use serde::Serialize;

/// How the active session was chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionResolution {
    /// Not initialised yet.
    #[default]
    Unresolved,
    /// Anonymous visitor resuming the locally cached session.
    AnonymousCached,
    /// Anonymous visitor without a session; the first send mints one.
    AnonymousFresh,
    /// Signed-in user with a server session selected.
    AuthenticatedSelected,
    /// Signed-in user who has no sessions yet.
    AuthenticatedEmpty,
}

impl SessionResolution {
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self,
            SessionResolution::AuthenticatedSelected | SessionResolution::AuthenticatedEmpty
        )
    }

    /// State after a session id has been adopted or selected.
    pub fn with_session(authenticated: bool) -> Self {
        if authenticated {
            SessionResolution::AuthenticatedSelected
        } else {
            SessionResolution::AnonymousCached
        }
    }

    /// State when no session is active.
    pub fn without_session(authenticated: bool) -> Self {
        if authenticated {
            SessionResolution::AuthenticatedEmpty
        } else {
            SessionResolution::AnonymousFresh
        }
    }
}

/// Anonymous start: resume the cached id when there is one.
pub fn resolve_anonymous(cached: Option<String>) -> (SessionResolution, Option<String>) {
    match cached.filter(|id| !id.is_empty()) {
        Some(id) => (SessionResolution::AnonymousCached, Some(id)),
        None => (SessionResolution::AnonymousFresh, None),
    }
}

/// Signed-in start: the most recently updated session, if any.
pub fn resolve_authenticated(sessions: &[ChatSession]) -> (SessionResolution, Option<String>) {
    match most_recent(sessions) {
        Some(session) => (SessionResolution::AuthenticatedSelected, Some(session.id.clone())),
        None => (SessionResolution::AuthenticatedEmpty, None),
    }
}

/// Latest `updated_at` (falling back to `created_at`). Ties keep server order.
pub fn most_recent(sessions: &[ChatSession]) -> Option<&ChatSession> {
    sessions.iter().reduce(|best, candidate| {
        if candidate.last_activity() > best.last_activity() {
            candidate
        } else {
            best
        }
    })
}

/// Newest first; sessions without timestamps go last.
pub fn sort_recent_first(sessions: &mut [ChatSession]) {
    sessions.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
}
