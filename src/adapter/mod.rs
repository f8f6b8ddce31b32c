//! Mapping from raw contract records to the application model

use chrono::{DateTime, Utc};

use crate::contract::RawListing;
use crate::models::Listing;

/// Map a raw contract record into the internal listing representation.
///
/// The on-chain integer id becomes a decimal string and the unix-seconds
/// timestamp becomes a calendar date-time; everything else is copied
/// verbatim. Pure: no side effects, no failure modes beyond what the
/// caller already type-checked.
pub fn listing_from_raw(raw: RawListing) -> Listing {
    let secs = raw.created_at.low_u64().min(i64::MAX as u64) as i64;
    Listing {
        id: raw.id.to_string(),
        owner: raw.owner,
        description: raw.description,
        property_type: raw.property_type,
        image_url: raw.image_url,
        daily_rate: raw.daily_rate,
        available_days: raw.available_days.low_u64(),
        is_available: raw.is_available,
        created_at: DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default(),
    }
}
