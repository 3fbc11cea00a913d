//! Authentication service models

pub mod preference;
pub mod session;
pub mod user;

// Re-export for convenience
pub use preference::Preference;
pub use session::{Session, SessionRejection};
pub use user::{NewUser, PublicUser, User};
