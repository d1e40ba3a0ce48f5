//! Session credentials, user profiles, and redacted token secrets.

pub mod secret;
pub mod session;

pub use secret::*;
pub use session::*;
