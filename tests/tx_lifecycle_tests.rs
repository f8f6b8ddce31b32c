//! Write transaction lifecycle tests
//!
//! A scripted contract double drives the state machine through its
//! success, rejection and revert paths and checks which notifications
//! fire for each.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use primitive_types::U256;
use tokio::sync::broadcast::error::TryRecvError;

use casavia_client::contract::{
    RawListing, RawPlatformStats, RentalContract, TxHash,
};
use casavia_client::error::ClientError;
use casavia_client::models::ListingDraft;
use casavia_client::notify::{NotificationLevel, Notifier};
use casavia_client::tx::{TxPhase, WriteService};

const RENTER: &str = "0x9999999999999999999999999999999999999999";

/// Scripted contract double: configurable submit/confirm outcomes,
/// records what reached it
struct ScriptedContract {
    submit_result: Result<TxHash, ClientError>,
    confirm_result: Result<(), ClientError>,
    submitted: AtomicBool,
    rent_args: Mutex<Option<(U256, u64, U256)>>,
}

impl ScriptedContract {
    fn new(
        submit_result: Result<TxHash, ClientError>,
        confirm_result: Result<(), ClientError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            submit_result,
            confirm_result,
            submitted: AtomicBool::new(false),
            rent_args: Mutex::new(None),
        })
    }

    fn happy() -> Arc<Self> {
        Self::new(Ok("0xhash".to_string()), Ok(()))
    }
}

#[async_trait]
impl RentalContract for ScriptedContract {
    async fn all_listings(&self) -> Result<Vec<RawListing>, ClientError> {
        Ok(Vec::new())
    }

    async fn listings_by_owner(&self, _owner: &str) -> Result<Vec<RawListing>, ClientError> {
        Ok(Vec::new())
    }

    async fn listing(&self, id: U256) -> Result<RawListing, ClientError> {
        Err(ClientError::NotFound(id.to_string()))
    }

    async fn platform_stats(&self) -> Result<RawPlatformStats, ClientError> {
        Ok(RawPlatformStats {
            total_listings: U256::zero(),
            total_rentals: U256::zero(),
            fee_balance: U256::zero(),
        })
    }

    async fn contract_owner(&self) -> Result<String, ClientError> {
        Ok(RENTER.to_string())
    }

    async fn submit_register(
        &self,
        _description: &str,
        _image_url: &str,
        _property_type: &str,
        _daily_rate: U256,
        _available_days: u64,
    ) -> Result<TxHash, ClientError> {
        self.submitted.store(true, Ordering::SeqCst);
        self.submit_result.clone()
    }

    async fn submit_rent(&self, id: U256, days: u64, value: U256) -> Result<TxHash, ClientError> {
        self.submitted.store(true, Ordering::SeqCst);
        *self.rent_args.lock().unwrap() = Some((id, days, value));
        self.submit_result.clone()
    }

    async fn submit_collect_fees(&self) -> Result<TxHash, ClientError> {
        self.submitted.store(true, Ordering::SeqCst);
        self.submit_result.clone()
    }

    async fn wait_confirmed(&self, _tx_hash: &TxHash) -> Result<(), ClientError> {
        self.confirm_result.clone()
    }
}

fn draft() -> ListingDraft {
    ListingDraft {
        description: "Seaside flat".to_string(),
        property_type: "apartment".to_string(),
        image_url: "https://example.com/flat.jpg".to_string(),
        daily_rate: 0.05,
        available_days: 30,
    }
}

// ============================================================================
// Lifecycle: Success Path
// ============================================================================

#[tokio::test]
async fn test_successful_register_confirms_and_notifies() {
    let contract = ScriptedContract::happy();
    let notifier = Notifier::new();
    let mut notifications = notifier.subscribe();
    let writes = WriteService::new(contract.clone(), notifier);

    let handle = writes.register_listing(draft()).expect("handle");
    let settled = handle.settled().await;

    assert_eq!(settled, TxPhase::Confirmed("0xhash".to_string()));
    let notification = notifications.recv().await.expect("success notification");
    assert_eq!(notification.level, NotificationLevel::Success);
    assert!(contract.submitted.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_rent_converts_total_amount_and_attaches_value() {
    let contract = ScriptedContract::happy();
    let writes = WriteService::new(contract.clone(), Notifier::new());

    let handle = writes
        .rent_listing("7", RENTER, 3, 0.15)
        .expect("handle");
    assert!(handle.settled().await.is_terminal());

    let (id, days, value) = contract.rent_args.lock().unwrap().expect("rent args");
    assert_eq!(id, U256::from(7u64));
    assert_eq!(days, 3);
    assert_eq!(value, U256::from(150_000_000_000_000_000u64));
}

// ============================================================================
// Lifecycle: Signing Rejection
// ============================================================================

#[tokio::test]
async fn test_signing_rejection_returns_to_idle_without_result_notification() {
    let contract = ScriptedContract::new(Err(ClientError::SigningRejected), Ok(()));
    let notifier = Notifier::new();
    let mut notifications = notifier.subscribe();
    let writes = WriteService::new(contract, notifier);

    let handle = writes.register_listing(draft()).expect("handle");
    let settled = handle.settled().await;

    assert_eq!(settled, TxPhase::Idle);
    // An informational notice is allowed, a success/error result is not
    let notification = notifications.recv().await.expect("cancel notice");
    assert_eq!(notification.level, NotificationLevel::Info);
    assert!(matches!(
        notifications.try_recv(),
        Err(TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn test_wallet_unavailable_returns_to_idle() {
    let contract = ScriptedContract::new(Err(ClientError::WalletUnavailable), Ok(()));
    let writes = WriteService::new(contract, Notifier::new());

    let handle = writes.collect_platform_fees();
    assert_eq!(handle.settled().await, TxPhase::Idle);
}

// ============================================================================
// Lifecycle: Failures
// ============================================================================

#[tokio::test]
async fn test_reverted_execution_fails_with_verbatim_reason() {
    let contract = ScriptedContract::new(
        Ok("0xhash".to_string()),
        Err(ClientError::Execution(
            "PropertyRental: property not available".to_string(),
        )),
    );
    let notifier = Notifier::new();
    let mut notifications = notifier.subscribe();
    let writes = WriteService::new(contract, notifier);

    let handle = writes.register_listing(draft()).expect("handle");
    match handle.settled().await {
        TxPhase::Failed(reason) => {
            assert!(!reason.is_empty());
            assert!(reason.contains("PropertyRental: property not available"));
        }
        other => panic!("expected Failed, got {:?}", other),
    }

    let notification = notifications.recv().await.expect("error notification");
    assert_eq!(notification.level, NotificationLevel::Error);
    assert!(notification
        .message
        .contains("PropertyRental: property not available"));
}

#[tokio::test]
async fn test_collect_fees_surfaces_contract_rejection() {
    // No client-side guard: the rejection comes from the contract
    let contract = ScriptedContract::new(
        Err(ClientError::Execution("caller is not the owner".to_string())),
        Ok(()),
    );
    let writes = WriteService::new(contract, Notifier::new());

    match writes.collect_platform_fees().settled().await {
        TxPhase::Failed(reason) => assert!(reason.contains("caller is not the owner")),
        other => panic!("expected Failed, got {:?}", other),
    }
}

// ============================================================================
// Fail-Fast Validation
// ============================================================================

#[tokio::test]
async fn test_validation_failures_never_reach_the_contract() {
    let contract = ScriptedContract::happy();
    let writes = WriteService::new(contract.clone(), Notifier::new());

    let mut zero_days = draft();
    zero_days.available_days = 0;
    assert!(matches!(
        writes.register_listing(zero_days),
        Err(ClientError::Validation(_))
    ));

    let mut negative_rate = draft();
    negative_rate.daily_rate = -0.5;
    assert!(matches!(
        writes.register_listing(negative_rate),
        Err(ClientError::InvalidAmount(_))
    ));

    assert!(matches!(
        writes.rent_listing("1", "bad-address", 3, 0.15),
        Err(ClientError::InvalidAddress(_))
    ));

    assert!(matches!(
        writes.rent_listing("1", RENTER, 0, 0.15),
        Err(ClientError::Validation(_))
    ));

    assert!(!contract.submitted.load(Ordering::SeqCst));
}
