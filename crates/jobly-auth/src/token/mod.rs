//! JWT encoding and decoding.

pub mod jwt;

pub use jwt::{Claims, JwtError, JwtService};
