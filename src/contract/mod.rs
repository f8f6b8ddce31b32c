//! Chain-facing plumbing for the deployed PropertyRental contract
//!
//! Contains the consumed contract surface as a trait, the raw record types
//! the contract returns, and the live JSON-RPC implementation.

pub mod abi;
mod live;
mod rpc;

pub use live::{ConfirmPolicy, EthPropertyRental};
pub use rpc::{JsonRpcClient, TxReceipt};

use async_trait::async_trait;
use primitive_types::U256;

use crate::error::ClientError;

/// Transaction hash as returned by the signing agent
pub type TxHash = String;

/// Raw listing record exactly as the contract returns it
#[derive(Debug, Clone, PartialEq)]
pub struct RawListing {
    pub id: U256,
    pub owner: String,
    pub description: String,
    pub image_url: String,
    pub property_type: String,
    pub daily_rate: U256,
    pub available_days: U256,
    pub is_available: bool,
    /// Unix seconds
    pub created_at: U256,
}

/// Raw platform statistics triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPlatformStats {
    pub total_listings: U256,
    pub total_rentals: U256,
    pub fee_balance: U256,
}

/// An unsigned transaction handed to the signing agent
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    pub to: String,
    pub data: Vec<u8>,
    /// Value transferred with the call, in wei
    pub value: U256,
    pub chain_id: u64,
}

/// The user's external authorization tool. Implementations approve the
/// request (or not), sign it, and broadcast it to the network.
#[async_trait]
pub trait SigningAgent: Send + Sync {
    /// Returns `SigningRejected` when the user declines the prompt and
    /// `WalletUnavailable` when no agent is reachable.
    async fn sign_and_submit(&self, tx: TransactionRequest) -> Result<TxHash, ClientError>;
}

/// Signing agent used by read-only embeddings: every write fails with
/// `WalletUnavailable` before reaching the network.
pub struct NoSigningAgent;

#[async_trait]
impl SigningAgent for NoSigningAgent {
    async fn sign_and_submit(&self, _tx: TransactionRequest) -> Result<TxHash, ClientError> {
        Err(ClientError::WalletUnavailable)
    }
}

/// The consumed surface of the external PropertyRental contract
#[async_trait]
pub trait RentalContract: Send + Sync {
    async fn all_listings(&self) -> Result<Vec<RawListing>, ClientError>;
    async fn listings_by_owner(&self, owner: &str) -> Result<Vec<RawListing>, ClientError>;
    async fn listing(&self, id: U256) -> Result<RawListing, ClientError>;
    async fn platform_stats(&self) -> Result<RawPlatformStats, ClientError>;
    /// The contract's designated owner, the only identity allowed to
    /// collect platform fees (enforced by the contract, not by us)
    async fn contract_owner(&self) -> Result<String, ClientError>;

    async fn submit_register(
        &self,
        description: &str,
        image_url: &str,
        property_type: &str,
        daily_rate: U256,
        available_days: u64,
    ) -> Result<TxHash, ClientError>;

    /// `value` is attached as the payable amount of the call
    async fn submit_rent(&self, id: U256, days: u64, value: U256) -> Result<TxHash, ClientError>;

    async fn submit_collect_fees(&self) -> Result<TxHash, ClientError>;

    /// Block until the transaction is accepted into a block.
    /// `Execution` on revert, `Transport` on timeout.
    async fn wait_confirmed(&self, tx_hash: &TxHash) -> Result<(), ClientError>;
}
