//! Per-user favourite tours, backed by `/api/favorites`.
//!
//! Mutations are never applied locally: every add/remove is followed by a
//! full refresh so the list always mirrors the server.

use crate::api::ApiClient;
use crate::auth::AuthStore;
use crate::i18n::{t, t_with, Language};
use crate::models::Tour;
use crate::state::{Notifications, Observable, Subscription};
use crate::types::{AppError, Result};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WishlistState {
    pub tours: Vec<Tour>,
    pub loading: bool,
}

pub struct WishlistStore {
    api: ApiClient,
    auth: Arc<AuthStore>,
    notifications: Notifications,
    language: RwLock<Language>,
    state: Observable<WishlistState>,
    /// Bumped by every refresh; a response from an older one is dropped.
    generation: AtomicU64,
}

impl WishlistStore {
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
            state: Observable::new(WishlistState::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn set_language(&self, language: Language) {
        *self.language.write() = language;
    }

    fn language(&self) -> Language {
        *self.language.read()
    }

    /// Reload the list. Logged out: the list is cleared without a request.
    /// On failure the previous list is kept. A response that lands after a
    /// newer refresh or a change of user is dropped.
    pub async fn refresh(&self) -> Result<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let user_id = self.auth.user_id();
        let token = match self.auth.get_access_token() {
            Some(token) if self.auth.is_authenticated() => token,
            _ => {
                self.state.set(WishlistState::default());
                return Ok(());
            }
        };

        self.state.update(|s| s.loading = true);
        let result = self.api.list_favorites(Some(&token)).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Dropping wishlist response superseded by a newer refresh");
            return Ok(());
        }
        if self.auth.user_id() != user_id {
            debug!("Dropping wishlist response for a previous user");
            self.state.set(WishlistState::default());
            return Ok(());
        }

        match result {
            Ok(tours) => {
                debug!("Wishlist holds {} tours", tours.len());
                self.state.set(WishlistState {
                    tours,
                    loading: false,
                });
                Ok(())
            }
            Err(e) => {
                error!("Error loading wishlist: {}", e);
                self.state.update(|s| s.loading = false);
                Err(e)
            }
        }
    }

    pub async fn add(&self, tour: &Tour) -> Result<()> {
        let language = self.language();
        let token = self.require_login(language)?;

        if let Err(e) = self.api.add_favorite(&tour.id, Some(&token)).await {
            error!("Error adding tour {} to wishlist: {}", tour.id, e);
            self.notifications.error(t(language, "wishlist_error"));
            return Err(e);
        }

        self.resync().await;
        self.notifications.success(t_with(
            language,
            "wishlist_added",
            &[("title", tour.display_title(language))],
        ));
        Ok(())
    }

    pub async fn remove(&self, tour_id: &str) -> Result<()> {
        let language = self.language();
        let token = self.require_login(language)?;

        if let Err(e) = self.api.remove_favorite(tour_id, Some(&token)).await {
            error!("Error removing tour {} from wishlist: {}", tour_id, e);
            self.notifications.error(t(language, "wishlist_error"));
            return Err(e);
        }

        self.resync().await;
        self.notifications.success(t(language, "wishlist_removed"));
        Ok(())
    }

    /// Membership against the cached list.
    pub fn is_in_wishlist(&self, tour_id: &str) -> bool {
        self.state.with(|s| s.tours.iter().any(|t| t.id == tour_id))
    }

    pub fn tours(&self) -> Vec<Tour> {
        self.state.with(|s| s.tours.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|s| s.loading)
    }

    pub fn subscribe(&self) -> watch::Receiver<WishlistState> {
        self.state.subscribe()
    }

    /// Refresh whenever the signed-in identity changes.
    pub fn watch_auth(self: &Arc<Self>) -> Subscription {
        let store = Arc::clone(self);
        let mut rx = self.auth.subscribe();
        let mut last = rx.borrow().user.as_ref().map(|u| u.id.clone());

        Subscription::new(tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let current = rx.borrow_and_update().user.as_ref().map(|u| u.id.clone());
                if current == last {
                    continue;
                }
                last = current;
                if let Err(e) = store.refresh().await {
                    debug!("Wishlist refresh after auth change failed: {}", e);
                }
            }
        }))
    }

    fn require_login(&self, language: Language) -> Result<String> {
        match self.auth.get_access_token() {
            Some(token) if self.auth.is_authenticated() => Ok(token),
            _ => {
                let message = t(language, "wishlist_login_required");
                self.notifications.error(message.clone());
                Err(AppError::Unauthorized(message))
            }
        }
    }

    async fn resync(&self) {
        if let Err(e) = self.refresh().await {
            error!("Wishlist resync failed: {}", e);
        }
    }
}
