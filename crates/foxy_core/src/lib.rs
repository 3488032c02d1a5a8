//! Shared plumbing for the FOXy staking crates: configuration, logging,
//! error classification and in-app notifications.

pub mod config;
pub mod error_handler;
pub mod logging;
pub mod notifications;

pub use config::{ErrorMessages, FoxyConfig};
pub use error_handler::{FoxyError, MessageCategory, classify_message};
pub use notifications::{AppNotification, NotificationStore, NotificationType};
