//! Core models for the Casavia data layer
//!
//! Both data-source variants (local fixture store and live contract) share
//! these types and their validation rules, so the two paths cannot drift.

use chrono::{DateTime, Utc};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::units::is_valid_address;

/// A rentable property record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Unique listing id. Derived from the on-chain counter in the live
    /// path, a random token in the local path.
    pub id: String,
    /// Wallet address of the listing owner
    pub owner: String,
    pub description: String,
    pub property_type: String,
    pub image_url: String,
    /// Rate per day in wei
    pub daily_rate: U256,
    /// Informational cap; not decremented by rentals in this layer
    pub available_days: u64,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

/// Owner-supplied input for registering a new listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDraft {
    pub description: String,
    pub property_type: String,
    pub image_url: String,
    /// Rate per day in display units (ether)
    pub daily_rate: f64,
    pub available_days: u64,
}

impl ListingDraft {
    /// Validate the draft before it goes anywhere near the contract
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.description.trim().is_empty() {
            return Err(ClientError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        if self.property_type.trim().is_empty() {
            return Err(ClientError::Validation(
                "property type must not be empty".to_string(),
            ));
        }
        if self.available_days == 0 {
            return Err(ClientError::Validation(
                "available days must be greater than zero".to_string(),
            ));
        }
        if !self.daily_rate.is_finite() || self.daily_rate < 0.0 {
            return Err(ClientError::InvalidAmount(format!(
                "daily rate must be a non-negative amount, got {}",
                self.daily_rate
            )));
        }
        Ok(())
    }
}

/// Transient rental request, constructed immediately before submission.
///
/// `total_amount` is `daily_rate * days` in wei; the caller computes it,
/// this layer does not recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalRequest {
    pub property_id: String,
    pub renter_address: String,
    pub days: u64,
    pub total_amount: U256,
}

impl RentalRequest {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.property_id.trim().is_empty() {
            return Err(ClientError::Validation(
                "property id must not be empty".to_string(),
            ));
        }
        if self.days == 0 {
            return Err(ClientError::Validation(
                "rental days must be greater than zero".to_string(),
            ));
        }
        if !is_valid_address(&self.renter_address) {
            return Err(ClientError::InvalidAddress(self.renter_address.clone()));
        }
        Ok(())
    }
}

/// Read-only platform statistics projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_listings: u64,
    pub total_rentals: u64,
    /// Accumulated platform fee balance in wei
    pub fee_balance: U256,
}

/// Listings currently open for rental, original order preserved
pub fn filter_available(listings: &[Listing]) -> Vec<Listing> {
    listings.iter().filter(|l| l.is_available).cloned().collect()
}

/// Listings already rented out, original order preserved
pub fn filter_unavailable(listings: &[Listing]) -> Vec<Listing> {
    listings.iter().filter(|l| !l.is_available).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, available: bool) -> Listing {
        Listing {
            id: id.to_string(),
            owner: "0x1234567890123456789012345678901234567890".to_string(),
            description: "test".to_string(),
            property_type: "apartment".to_string(),
            image_url: String::new(),
            daily_rate: U256::from(1u64),
            available_days: 30,
            is_available: available,
            created_at: Utc::now(),
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

    #[test]
    fn test_draft_validation() {
        assert!(draft().validate().is_ok());

        let mut d = draft();
        d.available_days = 0;
        assert!(matches!(d.validate(), Err(ClientError::Validation(_))));

        let mut d = draft();
        d.description = "  ".to_string();
        assert!(matches!(d.validate(), Err(ClientError::Validation(_))));

        let mut d = draft();
        d.daily_rate = -0.01;
        assert!(matches!(d.validate(), Err(ClientError::InvalidAmount(_))));

        let mut d = draft();
        d.daily_rate = f64::NAN;
        assert!(matches!(d.validate(), Err(ClientError::InvalidAmount(_))));
    }

    #[test]
    fn test_rental_request_validation() {
        let request = RentalRequest {
            property_id: "1".to_string(),
            renter_address: "0x2345678901234567890123456789012345678901".to_string(),
            days: 3,
            total_amount: U256::from(150_000_000_000_000_000u64),
        };
        assert!(request.validate().is_ok());

        let mut r = request.clone();
        r.days = 0;
        assert!(matches!(r.validate(), Err(ClientError::Validation(_))));

        let mut r = request.clone();
        r.renter_address = "not-an-address".to_string();
        assert!(matches!(r.validate(), Err(ClientError::InvalidAddress(_))));

        let mut r = request;
        r.property_id = String::new();
        assert!(matches!(r.validate(), Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_partitions_preserve_relative_order() {
        let listings = vec![
            listing("1", true),
            listing("2", true),
            listing("3", true),
            listing("4", false),
        ];

        let available = filter_available(&listings);
        let ids: Vec<&str> = available.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let unavailable = filter_unavailable(&listings);
        assert_eq!(unavailable.len(), 1);
        assert_eq!(unavailable[0].id, "4");
    }
}
