pub mod command;
pub mod note;
pub mod reconcile;
pub mod reminder;
pub mod time_serde;

/// Cache bucket used when no authenticated principal is configured.
pub const GUEST_USER: &str = "guest";
