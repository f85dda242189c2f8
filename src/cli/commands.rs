//! Command handlers.
//!
//! Each handler restores the signed-in user first, then loads only the
//! stores it needs. Toasts raised by the stores are printed by the caller.

use super::output::Output;
use super::{
    AuthCommands, ChatCommands, Commands, ContactArgs, FilterArgs, TourCommands, WishlistCommands,
};
use crate::booking::ContactDetails;
use crate::catalog::{Facet, FilterCriteria};
use crate::i18n::{t, Language};
use crate::models::{Currency, ProfileUpdate, Tour, TourRecord};
use crate::types::{AppError, LoadFailure, Result};
use crate::AppState;
use reqwest::StatusCode;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// How long a beacon may hold up process exit.
const BEACON_GRACE: Duration = Duration::from_secs(2);

/// Run a command against an already-built [`AppState`]. `init` is handled
/// before any state exists and is rejected here.
pub async fn execute(command: Commands, app: &AppState, output: &Output) -> Result<()> {
    match command {
        Commands::Init { .. } => Err(AppError::Config(
            "init runs before configuration is loaded".to_string(),
        )),
        Commands::Config { full, validate } => show_config(app, full, validate, output),
        Commands::Tours(cmd) => {
            app.auth.init().await;
            tours(cmd, app, output).await
        }
        Commands::Chat(cmd) => {
            app.auth.init().await;
            chat(cmd, app, output).await
        }
        Commands::Auth(cmd) => {
            app.auth.init().await;
            auth(cmd, app, output).await
        }
        Commands::Wishlist(cmd) => {
            app.auth.init().await;
            wishlist(cmd, app, output).await
        }
        Commands::Contact { details, tour } => {
            app.auth.init().await;
            app.booking
                .submit_consultation(&contact_details(details), tour.as_deref())
                .await
        }
        Commands::Book { tour_id, details } => {
            app.auth.init().await;
            app.booking
                .create_booking(&tour_id, &contact_details(details))
                .await
        }
        Commands::Bookings => {
            app.auth.init().await;
            bookings(app, output).await
        }
    }
}

// ============= Config =============

fn show_config(app: &AppState, full: bool, validate: bool, output: &Output) -> Result<()> {
    let config = &app.config;
    if validate {
        config.validate()?;
        output.success("Configuration is valid");
    }

    if full {
        println!("{}", config.to_toml());
        return Ok(());
    }

    output.header("Configuration");
    output.kv("api.base_url", &config.api.base_url);
    output.kv(
        "api.timeout",
        &config
            .api
            .timeout_secs
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "none".to_string()),
    );
    output.kv(
        "supabase.url",
        config.supabase.url.as_deref().unwrap_or("(not set)"),
    );
    output.kv(
        "supabase.anon_key",
        if config.supabase.anon_key.is_some() {
            "set"
        } else {
            "missing"
        },
    );
    output.kv("storage.path", &config.storage.path.display().to_string());
    output.kv("ui.language", config.ui.language.code());
    output.kv("ui.currency", &config.ui.currency.to_string());
    if !config.supabase.is_configured() {
        output.hint("Sign-in is disabled until SUPABASE_URL and the anon key are set");
    }
    Ok(())
}

// ============= Tours =============

async fn tours(cmd: TourCommands, app: &AppState, output: &Output) -> Result<()> {
    let token = app.auth.get_access_token();
    match cmd {
        TourCommands::List { filters, currency } => {
            if let Some(currency) = currency {
                app.set_currency(currency);
            }
            let beacon = app.tracker.track_visitor("/tours");
            app.catalog.fetch_tours().await;
            app.catalog.set_search_query(filters.search.clone());
            app.catalog.set_filters(filter_criteria(filters));
            print_tour_list(&app.catalog.filtered_tours(), app, output);
            settle(beacon).await;
            Ok(())
        }
        TourCommands::Show { id, currency } => {
            if let Some(currency) = currency {
                app.set_currency(currency);
            }
            let beacon = app
                .tracker
                .track_tour_view(&id, app.auth.user_id().as_deref());
            app.catalog.fetch_tours().await;
            let result = app.catalog.tour_detail(&id).await;
            settle(beacon).await;

            let tour = match result {
                Ok(tour) => tour,
                Err(e) => {
                    let language = app.language();
                    if e.status() == Some(StatusCode::NOT_FOUND) {
                        return Err(AppError::NotFound(t(language, "td_tour_not_found")));
                    }
                    output.error(&LoadFailure::from(&e).message(language));
                    output.hint("Run the command again to retry");
                    return Err(e);
                }
            };
            let saved = if app.auth.is_authenticated() {
                match app.api.check_favorite(&tour.id, token.as_deref()).await {
                    Ok(saved) => Some(saved),
                    Err(e) => {
                        debug!("Favourite check failed: {}", e);
                        None
                    }
                }
            } else {
                None
            };
            print_tour(&tour, saved, app, output);
            Ok(())
        }
        TourCommands::Create { file } => {
            let tour = read_tour(&file)?;
            app.catalog.create_tour(&tour, token.as_deref()).await?;
            output.success(&format!("Created tour {}", tour.title));
            Ok(())
        }
        TourCommands::Update { file } => {
            let tour = read_tour(&file)?;
            if tour.id.is_empty() {
                return Err(AppError::Validation(
                    "the tour document needs an id to update".to_string(),
                ));
            }
            app.catalog.update_tour(&tour, token.as_deref()).await?;
            output.success(&format!("Updated tour {}", tour.id));
            Ok(())
        }
        TourCommands::Delete { id, yes } => {
            if !yes && !output.confirm(&format!("Delete tour {}?", id)) {
                output.info("Cancelled");
                return Ok(());
            }
            app.catalog.delete_tour(&id, token.as_deref()).await?;
            output.success(&format!("Deleted tour {}", id));
            Ok(())
        }
    }
}

fn filter_criteria(args: FilterArgs) -> FilterCriteria {
    let facet = |value: Option<String>| value.map(Facet::from).unwrap_or_default();
    FilterCriteria {
        tour_type: facet(args.tour_type),
        departure: facet(args.departure),
        destination: facet(args.destination),
        transportation: facet(args.transportation),
    }
}

fn read_tour(path: &Path) -> Result<Tour> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Storage(format!("{}: {}", path.display(), e)))?;
    let record: TourRecord = serde_json::from_str(&content)?;
    Ok(Tour::from(record))
}

fn print_tour_list(tours: &[Tour], app: &AppState, output: &Output) {
    let language = app.language();
    let currency = app.catalog.currency();
    if tours.is_empty() {
        output.info(&t(language, "tours_empty"));
        return;
    }

    output.table_header(&["Id", "Price", "Destination", "Tour"]);
    for tour in tours {
        output.table_row(&[
            &tour.id,
            &tour.formatted_price(currency),
            &tour.destination,
            tour.display_title(language),
        ]);
    }
}

fn print_tour(tour: &Tour, saved: Option<bool>, app: &AppState, output: &Output) {
    let language = app.language();
    let currency: Currency = app.catalog.currency();

    output.header(tour.display_title(language));
    output.kv("Price", &tour.formatted_price(currency));
    output.kv(
        "Rating",
        &format!("{:.1} ({} reviews)", tour.rating, tour.reviews),
    );
    output.kv("Type", &tour.types.join(", "));
    output.kv("Departure", &tour.departure);
    output.kv("Destination", &tour.destination);
    output.kv("Transportation", &tour.transportation);
    if let Some(saved) = saved {
        output.kv("In wishlist", if saved { "yes" } else { "no" });
    }

    output.subheader("Description");
    println!("    {}", tour.display_description(language));
    if let Some(info) = tour.display_additional_info(language) {
        output.subheader("Details");
        println!("    {}", info);
    }

    let gallery = tour.gallery();
    if !gallery.is_empty() {
        output.subheader("Gallery");
        for image in gallery {
            output.list_item(image);
        }
    }
}

/// Give a beacon a moment to finish before the process exits.
async fn settle(beacon: JoinHandle<()>) {
    if tokio::time::timeout(BEACON_GRACE, beacon).await.is_err() {
        debug!("Beacon still in flight at exit");
    }
}

// ============= Chat =============

async fn chat(cmd: ChatCommands, app: &AppState, output: &Output) -> Result<()> {
    let widget = &app.chat;
    widget.init().await;

    match cmd {
        ChatCommands::Send { message } => {
            let before = widget.messages().len();
            let result = widget.send(&message).await;
            // Show the turn, including the error bubble on failure.
            let messages = widget.messages();
            for message in messages.iter().skip(before.min(messages.len())) {
                output.chat_message(message);
            }
            result?;
            if let Some(id) = widget.session_id() {
                debug!("Active chat session {}", id);
            }
            Ok(())
        }
        ChatCommands::History => {
            match widget.session_id() {
                Some(id) => output.header(&format!("Session {}", id)),
                None => output.header("New conversation"),
            }
            for message in widget.messages() {
                output.chat_message(&message);
            }
            Ok(())
        }
        ChatCommands::Sessions => {
            if !app.auth.is_authenticated() {
                return Err(AppError::Unauthorized(t(
                    app.language(),
                    "profile_not_logged_in",
                )));
            }
            let sessions = widget.sessions();
            if sessions.is_empty() {
                output.info(&t(app.language(), "chat_no_history"));
                return Ok(());
            }
            let active = widget.session_id();
            output.table_header(&["Id", "Updated", "Title"]);
            for session in &sessions {
                let marker = if active.as_deref() == Some(session.id.as_str()) {
                    format!("{} *", session.id)
                } else {
                    session.id.clone()
                };
                let updated = session
                    .last_activity()
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                output.table_row(&[&marker, &updated, session.title.as_deref().unwrap_or("")]);
            }
            Ok(())
        }
        ChatCommands::New => {
            let id = widget.new_chat().await?;
            output.success(&format!("Started session {}", id));
            Ok(())
        }
        ChatCommands::Switch { session_id } => {
            widget.switch_session(&session_id).await;
            output.header(&format!("Session {}", session_id));
            for message in widget.messages() {
                output.chat_message(&message);
            }
            Ok(())
        }
        ChatCommands::Delete { session_id, yes } => {
            if !yes && !output.confirm(&format!("Delete chat session {}?", session_id)) {
                output.info("Cancelled");
                return Ok(());
            }
            widget.delete_session(&session_id).await?;
            output.success(&format!("Deleted session {}", session_id));
            if let Some(id) = widget.session_id() {
                output.info(&format!("Active session is now {}", id));
            }
            Ok(())
        }
        ChatCommands::Suggestions => {
            for question in crate::chat::suggested_questions(app.language()) {
                output.list_item(&question);
            }
            Ok(())
        }
    }
}

// ============= Auth =============

async fn auth(cmd: AuthCommands, app: &AppState, output: &Output) -> Result<()> {
    let language = app.language();
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = require_password(password)?;
            app.auth.sign_in(&email, &password).await.inspect_err(|_| {
                output.error(&t(language, "auth_login_error"));
            })?;
            whoami(app, output, language)
        }
        AuthCommands::Signup {
            email,
            name,
            password,
        } => {
            let password = require_password(password)?;
            app.auth
                .sign_up(&email, &password, &name)
                .await
                .inspect_err(|_| output.error(&t(language, "auth_signup_error")))?;
            if app.auth.is_authenticated() {
                whoami(app, output, language)
            } else {
                output.success("Account created. Check your email to confirm it, then log in.");
                Ok(())
            }
        }
        AuthCommands::Google => {
            let url = app.auth.sign_in_with_google()?;
            output.info("Open this URL in your browser to continue with Google:");
            output.command(&url);
            Ok(())
        }
        AuthCommands::Logout => {
            // The widget must know it was signed in to forget the conversation.
            app.chat.init().await;
            app.auth.sign_out().await?;
            app.chat.on_auth_changed().await;
            output.success("Signed out");
            Ok(())
        }
        AuthCommands::Whoami => whoami(app, output, language),
        AuthCommands::Profile {
            name,
            gender,
            birthdate,
            city,
            mobile_number,
        } => {
            let update = ProfileUpdate {
                name,
                gender,
                birthdate,
                city,
                mobile_number,
            };
            if update.is_empty() {
                return Err(AppError::Validation(
                    "nothing to update; pass at least one field".to_string(),
                ));
            }
            app.auth.update_user(&update).await?;
            whoami(app, output, language)
        }
    }
}

fn require_password(password: Option<String>) -> Result<String> {
    password.filter(|p| !p.is_empty()).ok_or_else(|| {
        AppError::Validation("password required: pass --password or set JOIGO_PASSWORD".to_string())
    })
}

fn whoami(app: &AppState, output: &Output, language: Language) -> Result<()> {
    let Some(user) = app.auth.user() else {
        return Err(AppError::Unauthorized(t(language, "profile_not_logged_in")));
    };
    output.header(&user.name);
    output.kv("Id", &user.id);
    output.kv("Email", &user.email);
    output.kv("Role", if user.is_admin() { "admin" } else { "user" });
    output.kv("Avatar", &user.avatar_url);
    for (label, value) in [
        ("Gender", &user.gender),
        ("Birthdate", &user.birthdate),
        ("City", &user.city),
        ("Mobile", &user.mobile_number),
    ] {
        if let Some(value) = value {
            output.kv(label, value);
        }
    }
    Ok(())
}

// ============= Wishlist =============

async fn wishlist(cmd: WishlistCommands, app: &AppState, output: &Output) -> Result<()> {
    let language = app.language();
    let store = &app.wishlist;

    match cmd {
        WishlistCommands::List => {
            if !app.auth.is_authenticated() {
                return Err(AppError::Unauthorized(t(language, "wishlist_login_required")));
            }
            store.refresh().await?;
            print_tour_list(&store.tours(), app, output);
            Ok(())
        }
        WishlistCommands::Add { tour_id } => {
            app.catalog.fetch_tours().await;
            // The toast needs the title; fall back to a bare record.
            let tour = match app.catalog.tour(&tour_id) {
                Some(tour) => tour,
                None => Tour::from(TourRecord {
                    id: tour_id.clone(),
                    title: tour_id.clone(),
                    ..Default::default()
                }),
            };
            store.add(&tour).await
        }
        WishlistCommands::Remove { tour_id } => store.remove(&tour_id).await,
    }
}

// ============= Bookings =============

fn contact_details(args: ContactArgs) -> ContactDetails {
    ContactDetails {
        full_name: args.name,
        email: args.email,
        phone: args.phone,
        message: args.message,
    }
}

async fn bookings(app: &AppState, output: &Output) -> Result<()> {
    let language = app.language();
    if !app.auth.is_authenticated() {
        return Err(AppError::Unauthorized(t(language, "profile_not_logged_in")));
    }

    let bookings = match app.booking.my_bookings().await {
        Ok(bookings) => bookings,
        Err(e) => {
            output.error(&LoadFailure::from(&e).message(language));
            output.hint("Run the command again to retry");
            return Err(e);
        }
    };

    if bookings.is_empty() {
        output.info("No bookings yet");
        return Ok(());
    }

    output.table_header(&["Id", "Status", "Date", "Tour"]);
    for booking in &bookings {
        let date = booking
            .booking_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        output.table_row(&[
            &booking.id,
            &booking.status,
            &date,
            booking.tour_title().unwrap_or("-"),
        ]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omitted_facets_are_unconstrained() {
        let criteria = filter_criteria(FilterArgs {
            destination: Some("Sơn Tây".into()),
            ..Default::default()
        });
        assert!(criteria.tour_type.is_any());
        assert!(criteria.departure.is_any());
        assert_eq!(criteria.destination, Facet::is("Sơn Tây"));
    }

    #[test]
    fn test_read_tour_without_id() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tour.json");
        fs::write(&path, r#"{"title": "Làng gốm Bát Tràng", "price": 25, "type": "Làng nghề"}"#)
            .unwrap();

        let tour = read_tour(&path).unwrap();
        assert!(tour.id.is_empty());
        assert_eq!(tour.types, vec!["Làng nghề".to_string()]);
    }

    #[test]
    fn test_missing_password_is_rejected() {
        assert!(matches!(require_password(None), Err(AppError::Validation(_))));
        assert!(matches!(require_password(Some(String::new())), Err(AppError::Validation(_))));
        assert_eq!(require_password(Some("pw".into())).unwrap(), "pw");
    }
}
