//! Centralized error handling for the Casavia client
//!
//! This module provides a unified error type for everything the data layer
//! can fail at, with a severity mapping used when errors are surfaced as
//! user-facing notifications.

use thiserror::Error;

use crate::notify::NotificationLevel;

/// Client error type covering the full failure taxonomy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No signing agent available")]
    WalletUnavailable,

    #[error("Signing request rejected by the user")]
    SigningRejected,

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Wallet is not connected")]
    NotConnected,
}

impl ClientError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::InvalidAmount(_) => "INVALID_AMOUNT",
            ClientError::InvalidAddress(_) => "INVALID_ADDRESS",
            ClientError::Validation(_) => "VALIDATION_FAILED",
            ClientError::WalletUnavailable => "WALLET_UNAVAILABLE",
            ClientError::SigningRejected => "SIGNING_REJECTED",
            ClientError::Execution(_) => "EXECUTION_FAILED",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::NotFound(_) => "NOT_FOUND",
            ClientError::NotConnected => "NOT_CONNECTED",
        }
    }

    /// Notification severity for this error when it reaches the user.
    ///
    /// Wallet-side refusals are routine (the user closed the signing
    /// prompt, or no agent is installed) and rank below execution and
    /// transport failures.
    pub fn severity(&self) -> NotificationLevel {
        match self {
            ClientError::WalletUnavailable | ClientError::SigningRejected => {
                NotificationLevel::Info
            }
            _ => NotificationLevel::Error,
        }
    }

    /// True when the operation never reached the external contract.
    pub fn is_pre_submission(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidAmount(_)
                | ClientError::InvalidAddress(_)
                | ClientError::Validation(_)
                | ClientError::NotConnected
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}
