//! Axum extractors for authenticated routes.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::post};
//! use jobly_auth::middleware::{AdminAuth, AuthState};
//!
//! async fn admin_only(admin: AdminAuth) -> String {
//!     format!("Hello, {}!", admin.username)
//! }
//!
//! let app = Router::new()
//!     .route("/admin", post(admin_only))
//!     .with_state(AuthState::new(jwt_service));
//! ```

pub mod admin;
pub mod auth;
pub mod error;

pub use admin::AdminAuth;
pub use auth::{AuthContext, AuthState, BearerAuth};
