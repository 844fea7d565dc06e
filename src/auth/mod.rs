//! Authentication module for the messaging server
//!
//! This module handles registration, credential checks,
//! token issuing and per-request identity extraction.

mod extractor;
pub mod handlers;
mod password;
mod service;

pub use extractor::AuthenticatedUser;
pub use password::{hash_password, verify_password};
pub use service::{AuthOutcome, AuthService, Claims, Registration};
