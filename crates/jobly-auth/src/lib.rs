//! Authentication for the Jobly jobs service.
//!
//! Requests carry an HS256-signed JWT in `Authorization: Bearer <token>`.
//! The token's claims name the user and say whether they are an admin.
//!
//! # Modules
//!
//! - [`token`]: JWT encoding, decoding and claims
//! - [`middleware`]: Axum extractors for authenticated and admin-only routes
//! - [`error`]: Authentication error types

pub mod error;
pub mod middleware;
pub mod token;

pub use error::AuthError;
pub use middleware::{AdminAuth, AuthContext, AuthState, BearerAuth};
pub use token::{Claims, JwtError, JwtService};

/// Result type alias for authentication operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;
