//! Live implementation of the PropertyRental contract surface

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use primitive_types::U256;
use tokio::time::{sleep, Instant};

use super::abi::{self, Token};
use super::rpc::JsonRpcClient;
use super::{RawListing, RawPlatformStats, RentalContract, SigningAgent, TransactionRequest, TxHash};
use crate::config::Config;
use crate::error::ClientError;

const SIG_ALL_PROPERTIES: &str = "getAllProperties()";
const SIG_PROPERTIES_BY_OWNER: &str = "getPropertiesByOwner(address)";
const SIG_PROPERTY: &str = "getProperty(uint256)";
const SIG_PLATFORM_STATS: &str = "getPlatformStats()";
const SIG_OWNER: &str = "owner()";
const SIG_REGISTER: &str = "registerProperty(string,string,string,uint256,uint256)";
const SIG_RENT: &str = "rentProperty(uint256,uint256)";
const SIG_COLLECT_FEES: &str = "collectPlatformFees()";

/// How confirmation polling behaves while a transaction is in flight
#[derive(Debug, Clone, Copy)]
pub struct ConfirmPolicy {
    pub poll_every: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            poll_every: Duration::from_secs(2),
            timeout: Duration::from_secs(120),
        }
    }
}

impl ConfirmPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_every: config.confirm_poll_every,
            timeout: config.confirm_timeout,
        }
    }
}

/// JSON-RPC-backed client for the deployed contract
pub struct EthPropertyRental {
    rpc: JsonRpcClient,
    address: String,
    chain_id: u64,
    agent: Arc<dyn SigningAgent>,
    confirm: ConfirmPolicy,
}

impl EthPropertyRental {
    pub fn new(
        rpc: JsonRpcClient,
        address: String,
        chain_id: u64,
        agent: Arc<dyn SigningAgent>,
        confirm: ConfirmPolicy,
    ) -> Self {
        Self {
            rpc,
            address,
            chain_id,
            agent,
            confirm,
        }
    }

    pub fn from_config(config: &Config, agent: Arc<dyn SigningAgent>) -> Self {
        Self::new(
            JsonRpcClient::new(config.eth_rpc_url.clone()),
            config.contract_address.clone(),
            config.chain_id,
            agent,
            ConfirmPolicy::from_config(config),
        )
    }

    async fn call(&self, data: Vec<u8>) -> Result<Vec<u8>, ClientError> {
        self.rpc.eth_call(&self.address, &data).await
    }

    async fn submit(&self, data: Vec<u8>, value: U256) -> Result<TxHash, ClientError> {
        let request = TransactionRequest {
            to: self.address.clone(),
            data,
            value,
            chain_id: self.chain_id,
        };
        self.agent.sign_and_submit(request).await
    }
}

#[async_trait]
impl RentalContract for EthPropertyRental {
    async fn all_listings(&self) -> Result<Vec<RawListing>, ClientError> {
        let data = abi::encode_call(SIG_ALL_PROPERTIES, &[])?;
        abi::decode_listing_array(&self.call(data).await?)
    }

    async fn listings_by_owner(&self, owner: &str) -> Result<Vec<RawListing>, ClientError> {
        let data =
            abi::encode_call(SIG_PROPERTIES_BY_OWNER, &[Token::Address(owner.to_string())])?;
        abi::decode_listing_array(&self.call(data).await?)
    }

    async fn listing(&self, id: U256) -> Result<RawListing, ClientError> {
        let data = abi::encode_call(SIG_PROPERTY, &[Token::Uint(id)])?;
        abi::decode_listing(&self.call(data).await?)
    }

    async fn platform_stats(&self) -> Result<RawPlatformStats, ClientError> {
        let data = abi::encode_call(SIG_PLATFORM_STATS, &[])?;
        abi::decode_stats(&self.call(data).await?)
    }

    async fn contract_owner(&self) -> Result<String, ClientError> {
        let data = abi::encode_call(SIG_OWNER, &[])?;
        abi::decode_address(&self.call(data).await?)
    }

    async fn submit_register(
        &self,
        description: &str,
        image_url: &str,
        property_type: &str,
        daily_rate: U256,
        available_days: u64,
    ) -> Result<TxHash, ClientError> {
        let data = abi::encode_call(
            SIG_REGISTER,
            &[
                Token::Str(description.to_string()),
                Token::Str(image_url.to_string()),
                Token::Str(property_type.to_string()),
                Token::Uint(daily_rate),
                Token::Uint(U256::from(available_days)),
            ],
        )?;
        self.submit(data, U256::zero()).await
    }

    async fn submit_rent(&self, id: U256, days: u64, value: U256) -> Result<TxHash, ClientError> {
        let data = abi::encode_call(
            SIG_RENT,
            &[Token::Uint(id), Token::Uint(U256::from(days))],
        )?;
        self.submit(data, value).await
    }

    async fn submit_collect_fees(&self) -> Result<TxHash, ClientError> {
        let data = abi::encode_call(SIG_COLLECT_FEES, &[])?;
        self.submit(data, U256::zero()).await
    }

    async fn wait_confirmed(&self, tx_hash: &TxHash) -> Result<(), ClientError> {
        let deadline = Instant::now() + self.confirm.timeout;
        loop {
            if let Some(receipt) = self.rpc.transaction_receipt(tx_hash).await? {
                if receipt.succeeded() {
                    tracing::info!(tx_hash = %tx_hash, block = ?receipt.block_number, "transaction confirmed");
                    return Ok(());
                }
                return Err(ClientError::Execution(
                    "transaction reverted on-chain (status 0x0)".to_string(),
                ));
            }
            if Instant::now() >= deadline {
                return Err(ClientError::Transport(format!(
                    "timed out waiting for confirmation of {}",
                    tx_hash
                )));
            }
            sleep(self.confirm.poll_every).await;
        }
    }
}
