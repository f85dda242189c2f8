//! HTTP client for the Joigo backend
//!
//! All backend interaction is JSON over HTTP(S) against a configurable base URL.
//!
//! # Endpoints
//!
//! ## Tours (`/api/tours`)
//! - `GET /api/tours` - Full catalog
//! - `GET /api/tours/{id}` - One tour
//! - `POST /api/tours`, `PUT /api/tours/{id}`, `DELETE /api/tours/{id}` - Admin edits (bearer)
//!
//! ## Chat (`/api/chat`)
//! - `POST /api/chat` - Send a message, receive the reply and the session id
//! - `GET /api/chat/sessions` - List the caller's sessions (bearer)
//! - `POST /api/chat/sessions` - Create a session (optional bearer)
//! - `GET /api/chat/sessions/{id}/messages` - Session history (optional bearer)
//! - `DELETE /api/chat/sessions/{id}` - Delete a session (bearer)
//!
//! ## Favorites (`/api/favorites`)
//! - `GET /api/favorites`, `POST /api/favorites`, `DELETE /api/favorites/{tour_id}`,
//!   `GET /api/favorites/check/{tour_id}` (all bearer)
//!
//! ## Bookings and consultations
//! - `POST /api/consultations`
//! - `POST /api/bookings`
//! - `GET /api/bookings/my-bookings?user_id=`
//!
//! ## Tracking
//! - `POST /api/tracking/visitor`, `POST /api/tracking/tour-view`
//!
//! # Authentication
//!
//! Endpoints marked bearer need an access token from the identity provider:
//! ```text
//! Authorization: Bearer <token>
//! ```
//! Calling them without one fails with [`AppError::Unauthorized`](crate::types::AppError)
//! before any request is sent.

/// Request helpers and endpoint methods.
pub mod client;
/// Wire request/response bodies.
pub mod types;

pub use client::ApiClient;
