//! Local in-memory listing store (demo/offline path)
//!
//! Used when no live contract is wired up. Mutations are synchronous and
//! record failures in an error field instead of returning early errors,
//! so the consuming view can render the last problem without unwinding.
//! The store is an explicit container owned by the application context,
//! not a process-wide global.

use chrono::{DateTime, Utc};
use primitive_types::U256;
use uuid::Uuid;

use crate::models::{
    filter_available, filter_unavailable, Listing, ListingDraft, PlatformStats, RentalRequest,
};
use crate::notify::Notifier;
use crate::units::{is_valid_address, to_smallest_unit, truncate_address};

pub struct LocalListingStore {
    connected: bool,
    address: Option<String>,
    listings: Vec<Listing>,
    last_error: Option<String>,
    notifier: Notifier,
}

impl LocalListingStore {
    /// Empty store
    pub fn new(notifier: Notifier) -> Self {
        Self {
            connected: false,
            address: None,
            listings: Vec::new(),
            last_error: None,
            notifier,
        }
    }

    /// Store seeded with the demo fixture listings
    pub fn with_fixtures(notifier: Notifier) -> Self {
        let mut store = Self::new(notifier);
        store.listings = sample_listings();
        store
    }

    /// Mark the given wallet address as connected
    pub fn connect(&mut self, address: &str) {
        if !is_valid_address(address) {
            self.record_error(format!("cannot connect malformed address: {}", address));
            return;
        }
        self.connected = true;
        self.address = Some(address.to_string());
        self.last_error = None;
        self.notifier
            .info(format!("Wallet connected: {}", truncate_address(address)));
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
        self.address = None;
        self.notifier.info("Wallet disconnected");
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn connected_address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Add a new listing owned by the connected address. Returns the
    /// fresh id, or `None` with the error recorded.
    pub fn add(&mut self, draft: ListingDraft) -> Option<String> {
        let owner = match (self.connected, self.address.clone()) {
            (true, Some(address)) => address,
            _ => {
                self.record_error("cannot add a listing without a connected wallet");
                return None;
            }
        };
        if let Err(err) = draft.validate() {
            self.record_error(err.to_string());
            return None;
        }
        let daily_rate = match to_smallest_unit(draft.daily_rate) {
            Ok(rate) => rate,
            Err(err) => {
                self.record_error(err.to_string());
                return None;
            }
        };

        let id = Uuid::new_v4().to_string();
        self.listings.push(Listing {
            id: id.clone(),
            owner,
            description: draft.description,
            property_type: draft.property_type,
            image_url: draft.image_url,
            daily_rate,
            available_days: draft.available_days,
            is_available: true,
            created_at: Utc::now(),
        });
        self.last_error = None;
        self.notifier.success("Listing registered successfully");
        Some(id)
    }

    /// Mark the referenced listing as rented. No funds move in the demo
    /// path; only the availability flag flips. Returns whether the
    /// rental was applied.
    pub fn rent(&mut self, request: &RentalRequest) -> bool {
        if !self.connected {
            self.record_error("cannot rent without a connected wallet");
            return false;
        }
        if let Err(err) = request.validate() {
            self.record_error(err.to_string());
            return false;
        }
        let index = match self
            .listings
            .iter()
            .position(|l| l.id == request.property_id)
        {
            Some(index) => index,
            None => {
                self.record_error(format!("listing {} does not exist", request.property_id));
                return false;
            }
        };
        if self.listings[index]
            .owner
            .eq_ignore_ascii_case(&request.renter_address)
        {
            self.record_error("owners cannot rent their own listing");
            return false;
        }
        if !self.listings[index].is_available {
            self.record_error(format!(
                "listing {} is not available",
                request.property_id
            ));
            return false;
        }

        self.listings[index].is_available = false;
        self.last_error = None;
        self.notifier.success("Listing rented successfully");
        true
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Listings open for rental, in insertion order
    pub fn available(&self) -> Vec<Listing> {
        filter_available(&self.listings)
    }

    /// Listings already rented out, in insertion order
    pub fn unavailable(&self) -> Vec<Listing> {
        filter_unavailable(&self.listings)
    }

    /// Demo-path statistics projection: rentals are the listings no
    /// longer available, and no fees accrue locally
    pub fn stats(&self) -> PlatformStats {
        PlatformStats {
            total_listings: self.listings.len() as u64,
            total_rentals: self.listings.iter().filter(|l| !l.is_available).count() as u64,
            fee_balance: U256::zero(),
        }
    }

    /// The most recent operation failure, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(error = %message, "local store operation failed");
        self.last_error = Some(message);
    }
}

fn fixture(
    id: &str,
    owner: &str,
    description: &str,
    property_type: &str,
    image_url: &str,
    daily_rate_wei: u64,
    available_days: u64,
    is_available: bool,
    created_unix: i64,
) -> Listing {
    Listing {
        id: id.to_string(),
        owner: owner.to_string(),
        description: description.to_string(),
        property_type: property_type.to_string(),
        image_url: image_url.to_string(),
        daily_rate: U256::from(daily_rate_wei),
        available_days,
        is_available,
        created_at: DateTime::<Utc>::from_timestamp(created_unix, 0).unwrap_or_default(),
    }
}

/// Demo fixture data shown before any wallet is connected
pub fn sample_listings() -> Vec<Listing> {
    vec![
        fixture(
            "1",
            "0x1234567890123456789012345678901234567890",
            "Modern two-bedroom apartment downtown with a wide living room \
             and sea view. Fully furnished, air conditioning included.",
            "apartment",
            "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267",
            50_000_000_000_000_000, // 0.05 ETH
            30,
            true,
            1_705_276_800, // 2024-01-15
        ),
        fixture(
            "2",
            "0x2345678901234567890123456789012345678901",
            "Spacious three-bedroom house with garden and garage, in a \
             quiet residential neighbourhood. Great for families.",
            "house",
            "https://images.unsplash.com/photo-1568605114967-8130f3a36994",
            80_000_000_000_000_000, // 0.08 ETH
            45,
            true,
            1_704_844_800, // 2024-01-10
        ),
        fixture(
            "3",
            "0x3456789012345678901234567890123456789012",
            "Compact, functional studio close to the metro and shopping \
             district. Ideal for professionals.",
            "studio",
            "https://images.unsplash.com/photo-1586023492125-27b2c045efd7",
            30_000_000_000_000_000, // 0.03 ETH
            60,
            true,
            1_705_708_800, // 2024-01-20
        ),
        fixture(
            "4",
            "0x4567890123456789012345678901234567890123",
            "Modern industrial loft with high ceilings, mezzanine and \
             luxury finishes. Panoramic city view.",
            "loft",
            "https://images.unsplash.com/photo-1502672260266-1c1ef2d93688",
            120_000_000_000_000_000, // 0.12 ETH
            20,
            false,
            1_704_412_800, // 2024-01-05
        ),
    ]
}
