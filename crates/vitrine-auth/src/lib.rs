//! Back-office authentication for the Vitrine storefront.
//!
//! Password hashing (argon2), opaque bearer tokens, and DB-backed
//! sessions. The HTTP layer calls [`AuthService::authenticate`] with the
//! bearer token and checks the returned role; the order and product
//! stores never see credentials.

pub mod error;
pub mod password;
pub mod service;
pub mod token;
pub mod user;

pub use error::AuthError;
pub use password::PasswordHasher;
pub use service::AuthService;
pub use user::{AdminUser, Role};
