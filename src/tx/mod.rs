//! Write transaction layer
//!
//! Every state-changing request runs the same four-phase lifecycle:
//! `Submitting → Confirming → Confirmed | Failed`, with a signing
//! rejection dropping back to `Idle`. Phases are published on a watch
//! channel so status rendering is decoupled from notification emission.

use std::future::Future;
use std::sync::Arc;

use primitive_types::U256;
use tokio::sync::watch;

use crate::contract::{RentalContract, TxHash};
use crate::error::ClientError;
use crate::models::{ListingDraft, RentalRequest};
use crate::notify::Notifier;
use crate::query::ListingQueries;
use crate::units::to_smallest_unit;

/// Lifecycle phase of one write operation
#[derive(Debug, Clone, PartialEq)]
pub enum TxPhase {
    /// No transaction outstanding; also the resting state after the user
    /// declines the signing prompt
    Idle,
    /// Sent to the signing agent, not yet accepted onto the ledger
    Submitting,
    /// Accepted onto the ledger, awaiting finality; no cancellation
    /// possible from here on
    Confirming(TxHash),
    /// Terminal success
    Confirmed(TxHash),
    /// Terminal failure carrying the underlying reason
    Failed(String),
}

impl TxPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxPhase::Confirmed(_) | TxPhase::Failed(_))
    }
}

/// Observer handle for one in-flight write.
///
/// The handle starts in `Submitting`; `Idle` only reappears if the user
/// cancels at the signing prompt.
pub struct TxHandle {
    phase: watch::Receiver<TxPhase>,
}

impl TxHandle {
    /// Current phase
    pub fn phase(&self) -> TxPhase {
        self.phase.borrow().clone()
    }

    /// Subscribe to phase changes
    pub fn subscribe(&self) -> watch::Receiver<TxPhase> {
        self.phase.clone()
    }

    /// Wait until the operation settles: `Confirmed`, `Failed`, or back
    /// to `Idle` after a signing rejection.
    pub async fn settled(mut self) -> TxPhase {
        loop {
            let current = self.phase.borrow_and_update().clone();
            match current {
                TxPhase::Submitting | TxPhase::Confirming(_) => {
                    if self.phase.changed().await.is_err() {
                        return self.phase.borrow().clone();
                    }
                }
                done => return done,
            }
        }
    }
}

/// Submits state-changing requests and tracks their lifecycle
pub struct WriteService {
    contract: Arc<dyn RentalContract>,
    notifier: Notifier,
    queries: Option<Arc<ListingQueries>>,
}

impl WriteService {
    pub fn new(contract: Arc<dyn RentalContract>, notifier: Notifier) -> Self {
        Self {
            contract,
            notifier,
            queries: None,
        }
    }

    /// Wire in the read layer so confirmed writes invalidate its caches
    pub fn with_queries(mut self, queries: Arc<ListingQueries>) -> Self {
        self.queries = Some(queries);
        self
    }

    /// Register a new listing. The daily rate is converted to wei before
    /// submission; validation failures return before anything is signed.
    pub fn register_listing(&self, draft: ListingDraft) -> Result<TxHandle, ClientError> {
        draft.validate()?;
        let daily_rate_wei = to_smallest_unit(draft.daily_rate)?;

        Ok(self.run(
            "Listing registered successfully",
            "register listing",
            move |contract| async move {
                contract
                    .submit_register(
                        &draft.description,
                        &draft.image_url,
                        &draft.property_type,
                        daily_rate_wei,
                        draft.available_days,
                    )
                    .await
            },
        ))
    }

    /// Rent a listing, attaching `total_amount` (display units) as the
    /// transferred value. The caller computes `daily_rate * days`; this
    /// layer does not recompute it.
    pub fn rent_listing(
        &self,
        property_id: &str,
        renter_address: &str,
        days: u64,
        total_amount: f64,
    ) -> Result<TxHandle, ClientError> {
        let total_wei = to_smallest_unit(total_amount)?;
        self.rent_listing_request(RentalRequest {
            property_id: property_id.to_string(),
            renter_address: renter_address.to_string(),
            days,
            total_amount: total_wei,
        })
    }

    /// Rent from an already-built request with the amount in wei
    pub fn rent_listing_request(&self, request: RentalRequest) -> Result<TxHandle, ClientError> {
        request.validate()?;

        let id = U256::from_dec_str(&request.property_id).map_err(|_| {
            ClientError::Validation(format!("malformed listing id: {}", request.property_id))
        })?;
        let total_wei = request.total_amount;

        Ok(self.run(
            "Listing rented successfully",
            "rent listing",
            move |contract| async move { contract.submit_rent(id, request.days, total_wei).await },
        ))
    }

    /// Collect accumulated platform fees. No client-side guard: the
    /// contract is the source of truth and rejects callers other than
    /// its owner, and a zero-balance collection is its call to refuse.
    pub fn collect_platform_fees(&self) -> TxHandle {
        self.run(
            "Platform fees collected",
            "collect platform fees",
            |contract| async move { contract.submit_collect_fees().await },
        )
    }

    fn run<F, Fut>(&self, success_message: &'static str, what: &'static str, submit: F) -> TxHandle
    where
        F: FnOnce(Arc<dyn RentalContract>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<TxHash, ClientError>> + Send + 'static,
    {
        let (phase_tx, phase_rx) = watch::channel(TxPhase::Submitting);
        let contract = Arc::clone(&self.contract);
        let notifier = self.notifier.clone();
        let queries = self.queries.clone();

        tokio::spawn(async move {
            match submit(Arc::clone(&contract)).await {
                Ok(hash) => {
                    tracing::info!(tx_hash = %hash, operation = what, "transaction accepted, confirming");
                    let _ = phase_tx.send(TxPhase::Confirming(hash.clone()));

                    match contract.wait_confirmed(&hash).await {
                        Ok(()) => {
                            let _ = phase_tx.send(TxPhase::Confirmed(hash));
                            notifier.success(success_message);
                            // Cached reads are only touched after a
                            // confirmed success; a failed write leaves
                            // them as they were
                            if let Some(queries) = queries {
                                queries.invalidate_all().await;
                            }
                        }
                        Err(err) => {
                            let _ = phase_tx.send(TxPhase::Failed(err.to_string()));
                            notifier.error(format!("Failed to {}: {}", what, err));
                        }
                    }
                }
                Err(ClientError::SigningRejected) => {
                    tracing::info!(operation = what, "signing rejected by user");
                    let _ = phase_tx.send(TxPhase::Idle);
                    notifier.info(format!("Signing request for {} was cancelled", what));
                }
                Err(err @ ClientError::WalletUnavailable) => {
                    let _ = phase_tx.send(TxPhase::Idle);
                    notifier.info(format!("Cannot {}: {}", what, err));
                }
                Err(err) => {
                    let _ = phase_tx.send(TxPhase::Failed(err.to_string()));
                    notifier.error(format!("Failed to {}: {}", what, err));
                }
            }
        });

        TxHandle { phase: phase_rx }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(TxPhase::Confirmed("0xabc".to_string()).is_terminal());
        assert!(TxPhase::Failed("reverted".to_string()).is_terminal());
        assert!(!TxPhase::Idle.is_terminal());
        assert!(!TxPhase::Submitting.is_terminal());
        assert!(!TxPhase::Confirming("0xabc".to_string()).is_terminal());
    }
}
