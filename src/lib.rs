//! # Joigo - client core for the Joigo cultural tour service
//!
//! Joigo sells guided cultural tours around Hanoi. This crate holds
//! everything a front end needs to talk to the Joigo backend and keep
//! its state consistent: the tour catalog with search and facet filters,
//! Supabase sign-in, the wishlist, the chat assistant with its session
//! lifecycle, consultation and booking forms, and analytics beacons.
//!
//! ## Overview
//!
//! Joigo can be used in two ways:
//!
//! 1. **As a CLI** - Run the `joigo` binary
//! 2. **As a library** - Build an [`AppState`] and drive its stores from your own front end
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use joigo::{AppState, JoigoConfig};
//!
//! #[tokio::main]
//! async fn main() -> joigo::Result<()> {
//!     let config = JoigoConfig::load("joigo.toml")?;
//!     let app = AppState::from_config(config)?;
//!     app.bootstrap().await;
//!
//!     for tour in app.catalog.filtered_tours() {
//!         println!("{}", tour.display_title(app.catalog.language()));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Every store is built once by [`AppState`] and handed its collaborators
//! explicitly. Stores publish their state through
//! [`state::Observable`]; call `subscribe()` to be told about changes.
//! Localised toasts travel on the shared [`state::Notifications`] bus.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// REST client for the Joigo backend.
pub mod api;
/// Identity provider integration and the signed-in user store.
pub mod auth;
/// Consultation and booking forms, booking history.
pub mod booking;
/// Tour catalog, search and facet filters.
pub mod catalog;
/// Chat assistant: message log, session resolution, widget store.
pub mod chat;
/// Command-line front end.
pub mod cli;
/// Localised strings.
pub mod i18n;
/// Display and wire models.
pub mod models;
/// Subscribe/notify primitives and the toast bus.
pub mod state;
/// Local persisted key-value storage.
pub mod storage;
/// Analytics beacons.
pub mod tracking;
/// Core types (errors).
pub mod types;
/// Configuration utilities (TOML, environment).
pub mod utils;
/// Saved favourite tours.
pub mod wishlist;

pub use api::ApiClient;
pub use auth::{AuthStore, IdentityProvider};
pub use booking::{BookingService, ContactDetails};
pub use catalog::{FilterCriteria, TourCatalog};
pub use chat::ChatWidget;
pub use i18n::Language;
pub use models::{Currency, Tour};
pub use state::{Notifications, Subscription};
pub use types::{AppError, Result};
pub use utils::config::JoigoConfig;
pub use wishlist::WishlistStore;

use crate::auth::provider::DisabledProvider;
use crate::auth::supabase::SupabaseAuth;
use crate::storage::{FileStore, KeyValueStore};
use crate::tracking::Tracker;
use std::sync::Arc;
use tracing::{debug, warn};

/// Application state shared by every front-end surface.
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration (file + environment)
    pub config: Arc<JoigoConfig>,
    /// Backend REST client
    pub api: ApiClient,
    /// Persisted key-value storage (chat session id, auth session)
    pub storage: Arc<dyn KeyValueStore>,
    /// Toast bus
    pub notifications: Notifications,
    /// Tour catalog, filters, language and currency
    pub catalog: Arc<TourCatalog>,
    /// Signed-in user
    pub auth: Arc<AuthStore>,
    /// Saved tours of the signed-in user
    pub wishlist: Arc<WishlistStore>,
    /// Chat assistant
    pub chat: Arc<ChatWidget>,
    /// Consultation and booking submission
    pub booking: Arc<BookingService>,
    /// Analytics beacons
    pub tracker: Tracker,
}

impl AppState {
    /// Build the stores from configuration, with file-backed storage at
    /// `storage.path` and Supabase auth when it is configured.
    pub fn from_config(config: JoigoConfig) -> Result<Self> {
        let api = ApiClient::new(&config.api)?;
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage.path)?);

        let provider: Arc<dyn IdentityProvider> = match SupabaseAuth::from_config(&config.supabase)
        {
            Ok(supabase) => Arc::new(supabase),
            Err(e) => {
                warn!("Sign-in disabled: {}", e);
                Arc::new(DisabledProvider)
            }
        };

        Ok(Self::with_parts(config, api, provider, storage))
    }

    /// Build the stores around explicit collaborators.
    pub fn with_parts(
        config: JoigoConfig,
        api: ApiClient,
        provider: Arc<dyn IdentityProvider>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let language = config.ui.language;
        let currency = config.ui.currency;
        let notifications = Notifications::new();

        let auth = Arc::new(AuthStore::new(provider, Arc::clone(&storage)));
        let catalog = Arc::new(TourCatalog::new(api.clone(), language, currency));
        let wishlist = Arc::new(WishlistStore::new(
            api.clone(),
            Arc::clone(&auth),
            notifications.clone(),
            language,
        ));
        let chat = Arc::new(ChatWidget::new(
            api.clone(),
            Arc::clone(&auth),
            Arc::clone(&storage),
            notifications.clone(),
            language,
        ));
        let booking = Arc::new(BookingService::new(
            api.clone(),
            Arc::clone(&auth),
            notifications.clone(),
            language,
        ));
        let tracker = Tracker::new(api.clone());

        Self {
            config: Arc::new(config),
            api,
            storage,
            notifications,
            catalog,
            auth,
            wishlist,
            chat,
            booking,
            tracker,
        }
    }

    /// Restore the signed-in user, then load the catalog, the wishlist and
    /// the chat session concurrently. Failures degrade to empty state.
    pub async fn bootstrap(&self) {
        self.auth.init().await;

        let (_, wishlist, _) = tokio::join!(
            self.catalog.fetch_tours(),
            self.wishlist.refresh(),
            self.chat.init(),
        );
        if let Err(e) = wishlist {
            debug!("Initial wishlist load failed: {}", e);
        }
    }

    /// Start the listeners that keep the wishlist and chat in step with
    /// sign-in and sign-out. Listeners stop when the handles are dropped.
    pub fn watch_auth(&self) -> Vec<Subscription> {
        vec![self.wishlist.watch_auth(), self.chat.watch_auth()]
    }

    /// Switch the display language everywhere.
    pub fn set_language(&self, language: Language) {
        self.catalog.set_language(language);
        self.wishlist.set_language(language);
        self.chat.set_language(language);
        self.booking.set_language(language);
    }

    pub fn language(&self) -> Language {
        self.catalog.language()
    }

    pub fn set_currency(&self, currency: Currency) {
        self.catalog.set_currency(currency);
    }
}
