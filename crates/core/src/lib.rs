//! Droidant Core - shared types
//!
//! Settings, the central error type, and the event bus used for
//! inter-component communication (build lifecycle, status indicators).

pub mod config;
pub mod error;
pub mod events;

pub use config::Settings;
pub use error::{DroidantError, Result};
pub use events::{BuildResult, Event, EventBus, EventSubscription};

/// Droidant version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Droidant";
