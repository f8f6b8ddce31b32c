//! Currency and address display helpers
//!
//! Amounts are carried through the data layer as wei (`U256`, the chain's
//! smallest indivisible unit) and only converted at the display edge.
//! Conversions run over decimal strings rather than floating point so large
//! magnitudes do not drift.

use primitive_types::U256;

use crate::error::ClientError;

/// Settlement currency symbol appended by [`format_currency`]
pub const CURRENCY_SYMBOL: &str = "ETH";

/// Number of decimals between wei and ether
pub const DECIMALS: u32 = 18;

/// Scale factor between wei and ether (10^18)
pub fn wei_per_eth() -> U256 {
    U256::from(10u64).pow(U256::from(DECIMALS))
}

/// Convert wei to a display-unit float.
///
/// For display only; use [`format_display_unit`] when the exact decimal
/// expansion matters.
pub fn to_display_unit(wei: U256) -> f64 {
    format_display_unit(wei).parse::<f64>().unwrap_or(f64::INFINITY)
}

/// Exact decimal-string representation of a wei amount in ether
pub fn format_display_unit(wei: U256) -> String {
    let (whole, frac) = wei.div_mod(wei_per_eth());
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac_str = format!("{:0>18}", frac.to_string());
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}

/// Parse a non-negative decimal ether string into wei.
///
/// Fractions beyond 18 digits round to the nearest wei, matching what the
/// original web client's `parseEther` did with user input.
pub fn parse_display_unit(s: &str) -> Result<U256, ClientError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ClientError::InvalidAmount("empty amount".to_string()));
    }
    if s.starts_with('-') {
        return Err(ClientError::InvalidAmount(format!(
            "amount must not be negative: {}",
            s
        )));
    }

    let (whole_str, frac_str) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole_str.is_empty() && frac_str.is_empty() {
        return Err(ClientError::InvalidAmount(format!("malformed amount: {}", s)));
    }
    if !whole_str.bytes().all(|b| b.is_ascii_digit())
        || !frac_str.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ClientError::InvalidAmount(format!("malformed amount: {}", s)));
    }

    let mut whole = if whole_str.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole_str)
            .map_err(|_| ClientError::InvalidAmount(format!("malformed amount: {}", s)))?
    };

    let mut frac_digits: String = frac_str.chars().take(DECIMALS as usize).collect();
    while frac_digits.len() < DECIMALS as usize {
        frac_digits.push('0');
    }
    let mut frac = U256::from_dec_str(&frac_digits)
        .map_err(|_| ClientError::InvalidAmount(format!("malformed amount: {}", s)))?;

    // Round half up on the 19th fractional digit
    if let Some(next) = frac_str.as_bytes().get(DECIMALS as usize) {
        if *next >= b'5' {
            frac += U256::one();
        }
    }
    if frac == wei_per_eth() {
        whole += U256::one();
        frac = U256::zero();
    }

    whole
        .checked_mul(wei_per_eth())
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| ClientError::InvalidAmount(format!("amount out of range: {}", s)))
}

/// Convert a display-unit amount to wei.
///
/// Fails with `InvalidAmount` on negative or non-finite input.
pub fn to_smallest_unit(amount: f64) -> Result<U256, ClientError> {
    if !amount.is_finite() {
        return Err(ClientError::InvalidAmount(format!(
            "amount is not finite: {}",
            amount
        )));
    }
    if amount < 0.0 {
        return Err(ClientError::InvalidAmount(format!(
            "amount must not be negative: {}",
            amount
        )));
    }
    // f64 Display gives the shortest round-trip decimal form, never
    // scientific notation, so the string path stays exact.
    parse_display_unit(&format!("{}", amount))
}

/// Format a wei amount as a currency string with 4 decimal places
pub fn format_currency(wei: U256) -> String {
    let quantum = wei_per_eth() / U256::from(10_000u64);
    let half = quantum / U256::from(2u64);
    let units = wei.saturating_add(half) / quantum;
    let (whole, frac) = units.div_mod(U256::from(10_000u64));
    format!("{}.{:0>4} {}", whole, frac.to_string(), CURRENCY_SYMBOL)
}

/// True iff `s` is `0x` followed by exactly 40 hex characters
pub fn is_valid_address(s: &str) -> bool {
    s.len() == 42 && s.starts_with("0x") && s[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Shorten a wallet address for display: first 6 and last 4 characters.
///
/// Empty input stays empty; malformed non-empty input is returned
/// unchanged so display code stays total.
pub fn truncate_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }
    if !is_valid_address(address) {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
