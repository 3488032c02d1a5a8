use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised while loading or validating configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FoxyError {
    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Message classification for raw provider errors
// ---------------------------------------------------------------------------

/// Marker the staking contract puts in its revert reason when the instant
/// withdraw reserve cannot cover the amount.
pub const INSUFFICIENT_RESERVE_MARKER: &str = "not enough funds in reserve";

/// Category derived from a raw provider error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageCategory {
    InsufficientReserve,
    InsufficientFunds,
    Reverted,
    Network,
    Unknown,
}

/// Classify a raw error string (JSON-RPC error text, revert reason, ...) by
/// inspecting it for known patterns. Matching is case-insensitive.
pub fn classify_message(message: &str) -> MessageCategory {
    let msg = message.to_lowercase();

    if msg.contains(INSUFFICIENT_RESERVE_MARKER) {
        MessageCategory::InsufficientReserve
    } else if msg.contains("insufficient funds") || msg.contains("exceeds balance") {
        MessageCategory::InsufficientFunds
    } else if msg.contains("execution reverted") || msg.contains("revert") {
        MessageCategory::Reverted
    } else if msg.contains("timeout")
        || msg.contains("timed out")
        || msg.contains("connection")
        || msg.contains("dns")
        || msg.contains("429")
    {
        MessageCategory::Network
    } else {
        MessageCategory::Unknown
    }
}
