//! Minimal ABI encoding/decoding for the PropertyRental call surface
//!
//! We only speak the handful of shapes the contract uses (uint256, address,
//! bool, string, and the Property tuple/array), so a hand-rolled codec over
//! 32-byte words is all that is needed, without an ABI machinery crate.

use primitive_types::U256;
use sha3::{Digest, Keccak256};

use super::{RawListing, RawPlatformStats};
use crate::error::ClientError;
use crate::units::is_valid_address;

const WORD: usize = 32;

/// First four bytes of the Keccak-256 hash of the function signature
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Argument value for an encoded call
#[derive(Debug, Clone)]
pub enum Token {
    Uint(U256),
    Address(String),
    Bool(bool),
    Str(String),
}

/// Encode a function call: selector followed by head/tail argument layout
pub fn encode_call(signature: &str, args: &[Token]) -> Result<Vec<u8>, ClientError> {
    let head_len = WORD * args.len();
    let mut head: Vec<u8> = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for arg in args {
        match arg {
            Token::Uint(v) => head.extend_from_slice(&uint_word(*v)),
            Token::Bool(b) => head.extend_from_slice(&uint_word(U256::from(*b as u8))),
            Token::Address(a) => head.extend_from_slice(&address_word(a)?),
            Token::Str(s) => {
                // Dynamic value: head holds the offset, tail holds
                // length + padded bytes
                let offset = head_len + tail.len();
                head.extend_from_slice(&uint_word(U256::from(offset)));
                tail.extend_from_slice(&uint_word(U256::from(s.len())));
                tail.extend_from_slice(s.as_bytes());
                let pad = (WORD - s.len() % WORD) % WORD;
                tail.extend(std::iter::repeat(0u8).take(pad));
            }
        }
    }

    let mut out = Vec::with_capacity(4 + head.len() + tail.len());
    out.extend_from_slice(&selector(signature));
    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    Ok(out)
}

fn uint_word(v: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    v.to_big_endian(&mut word);
    word
}

fn address_word(address: &str) -> Result<[u8; WORD], ClientError> {
    if !is_valid_address(address) {
        return Err(ClientError::InvalidAddress(address.to_string()));
    }
    let bytes = hex::decode(&address[2..])
        .map_err(|_| ClientError::InvalidAddress(address.to_string()))?;
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(&bytes);
    Ok(word)
}

fn malformed(what: &str) -> ClientError {
    ClientError::Transport(format!("malformed ABI response: {}", what))
}

/// Word-oriented reader over an ABI-encoded response
struct AbiReader<'a> {
    data: &'a [u8],
}

impl<'a> AbiReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn word(&self, offset: usize) -> Result<[u8; WORD], ClientError> {
        let slice = self
            .data
            .get(offset..offset + WORD)
            .ok_or_else(|| malformed("truncated word"))?;
        let mut word = [0u8; WORD];
        word.copy_from_slice(slice);
        Ok(word)
    }

    fn uint(&self, offset: usize) -> Result<U256, ClientError> {
        Ok(U256::from_big_endian(&self.word(offset)?))
    }

    /// A uint that is used as an offset or length; must fit in the buffer
    fn usize_at(&self, offset: usize) -> Result<usize, ClientError> {
        let value = self.uint(offset)?;
        if value > U256::from(self.data.len()) {
            return Err(malformed("offset beyond response"));
        }
        Ok(value.low_u64() as usize)
    }

    fn address(&self, offset: usize) -> Result<String, ClientError> {
        let word = self.word(offset)?;
        Ok(format!("0x{}", hex::encode(&word[12..])))
    }

    fn bool_at(&self, offset: usize) -> Result<bool, ClientError> {
        Ok(!self.uint(offset)?.is_zero())
    }

    /// String whose length word sits at `offset`
    fn string_at(&self, offset: usize) -> Result<String, ClientError> {
        let len = self.usize_at(offset)?;
        let bytes = self
            .data
            .get(offset + WORD..offset + WORD + len)
            .ok_or_else(|| malformed("truncated string"))?;
        String::from_utf8(bytes.to_vec()).map_err(|_| malformed("string is not valid UTF-8"))
    }

    /// Property tuple whose first word sits at `base`. String offsets
    /// inside the tuple are relative to the tuple start.
    fn listing_at(&self, base: usize) -> Result<RawListing, ClientError> {
        Ok(RawListing {
            id: self.uint(base)?,
            owner: self.address(base + WORD)?,
            description: self.string_at(base + self.usize_at(base + 2 * WORD)?)?,
            image_url: self.string_at(base + self.usize_at(base + 3 * WORD)?)?,
            property_type: self.string_at(base + self.usize_at(base + 4 * WORD)?)?,
            daily_rate: self.uint(base + 5 * WORD)?,
            available_days: self.uint(base + 6 * WORD)?,
            is_available: self.bool_at(base + 7 * WORD)?,
            created_at: self.uint(base + 8 * WORD)?,
        })
    }
}

/// Decode a `Property[]` return value
pub fn decode_listing_array(data: &[u8]) -> Result<Vec<RawListing>, ClientError> {
    if data.is_empty() {
        // No data at all (e.g. a fresh deployment answering with 0x)
        // reads as an empty collection
        return Ok(Vec::new());
    }
    let reader = AbiReader::new(data);
    let array_base = reader.usize_at(0)?;
    let count = reader.usize_at(array_base)?;
    let elements_base = array_base + WORD;

    let mut listings = Vec::with_capacity(count);
    for i in 0..count {
        // Tuples with dynamic fields are referenced by offset relative to
        // the start of the element area
        let rel = reader.usize_at(elements_base + i * WORD)?;
        listings.push(reader.listing_at(elements_base + rel)?);
    }
    Ok(listings)
}

/// Decode a single `Property` return value
pub fn decode_listing(data: &[u8]) -> Result<RawListing, ClientError> {
    let reader = AbiReader::new(data);
    let base = reader.usize_at(0)?;
    reader.listing_at(base)
}

/// Decode the `(uint256,uint256,uint256)` platform statistics triple
pub fn decode_stats(data: &[u8]) -> Result<RawPlatformStats, ClientError> {
    let reader = AbiReader::new(data);
    Ok(RawPlatformStats {
        total_listings: reader.uint(0)?,
        total_rentals: reader.uint(WORD)?,
        fee_balance: reader.uint(2 * WORD)?,
    })
}

/// Decode a single `address` return value
pub fn decode_address(data: &[u8]) -> Result<String, ClientError> {
    AbiReader::new(data).address(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_of(v: u64) -> Vec<u8> {
        uint_word(U256::from(v)).to_vec()
    }

    fn padded_string(s: &str) -> Vec<u8> {
        let mut out = word_of(s.len() as u64);
        out.extend_from_slice(s.as_bytes());
        out.extend(std::iter::repeat(0u8).take((WORD - s.len() % WORD) % WORD));
        out
    }

    /// Build the tuple encoding of a Property with the given strings
    fn encoded_listing_tuple(id: u64, desc: &str, image: &str, kind: &str) -> Vec<u8> {
        let mut tail: Vec<u8> = Vec::new();
        let head_len = 9 * WORD;

        let desc_offset = head_len + tail.len();
        tail.extend(padded_string(desc));
        let image_offset = head_len + tail.len();
        tail.extend(padded_string(image));
        let kind_offset = head_len + tail.len();
        tail.extend(padded_string(kind));

        let mut out = Vec::new();
        out.extend(word_of(id));
        out.extend(
            address_word("0x1234567890123456789012345678901234567890")
                .unwrap()
                .to_vec(),
        );
        out.extend(word_of(desc_offset as u64));
        out.extend(word_of(image_offset as u64));
        out.extend(word_of(kind_offset as u64));
        out.extend(word_of(50_000_000_000_000_000)); // dailyRate
        out.extend(word_of(30)); // availableDays
        out.extend(word_of(1)); // isAvailable
        out.extend(word_of(1_705_276_800)); // createdAt
        out.extend(tail);
        out
    }

    #[test]
    fn test_selector_matches_known_value() {
        // Canonical ERC-20 transfer selector
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_encode_static_args() {
        let data = encode_call(
            "rentProperty(uint256,uint256)",
            &[Token::Uint(U256::from(7u64)), Token::Uint(U256::from(3u64))],
        )
        .unwrap();

        assert_eq!(data.len(), 4 + 2 * WORD);
        assert_eq!(&data[..4], selector("rentProperty(uint256,uint256)").as_slice());
        assert_eq!(U256::from_big_endian(&data[4..36]), U256::from(7u64));
        assert_eq!(U256::from_big_endian(&data[36..68]), U256::from(3u64));
    }

    #[test]
    fn test_encode_dynamic_args_layout() {
        let data = encode_call(
            "registerProperty(string,string,string,uint256,uint256)",
            &[
                Token::Str("flat".to_string()),
                Token::Str("".to_string()),
                Token::Str("apartment".to_string()),
                Token::Uint(U256::from(5u64)),
                Token::Uint(U256::from(30u64)),
            ],
        )
        .unwrap();

        let args = &data[4..];
        // Three dynamic heads point past the 5-word head area
        assert_eq!(U256::from_big_endian(&args[0..32]), U256::from(160u64));
        // "flat" tail: length word + one padded word
        assert_eq!(U256::from_big_endian(&args[32..64]), U256::from(224u64));
        // empty string tail is a single length word
        assert_eq!(U256::from_big_endian(&args[64..96]), U256::from(256u64));
        assert_eq!(U256::from_big_endian(&args[96..128]), U256::from(5u64));
        assert_eq!(U256::from_big_endian(&args[128..160]), U256::from(30u64));
        // "flat" length + bytes
        assert_eq!(U256::from_big_endian(&args[160..192]), U256::from(4u64));
        assert_eq!(&args[192..196], b"flat");
    }

    #[test]
    fn test_encode_rejects_malformed_address() {
        let result = encode_call(
            "getPropertiesByOwner(address)",
            &[Token::Address("0xnope".to_string())],
        );
        assert!(matches!(result, Err(ClientError::InvalidAddress(_))));
    }

    #[test]
    fn test_decode_single_listing() {
        // Single dynamic tuple return: one offset word, then the tuple
        let mut data = word_of(WORD as u64);
        data.extend(encoded_listing_tuple(9, "Seaside flat", "https://img", "apartment"));

        let listing = decode_listing(&data).unwrap();
        assert_eq!(listing.id, U256::from(9u64));
        assert_eq!(listing.owner, "0x1234567890123456789012345678901234567890");
        assert_eq!(listing.description, "Seaside flat");
        assert_eq!(listing.image_url, "https://img");
        assert_eq!(listing.property_type, "apartment");
        assert_eq!(listing.daily_rate, U256::from(50_000_000_000_000_000u64));
        assert_eq!(listing.available_days, U256::from(30u64));
        assert!(listing.is_available);
        assert_eq!(listing.created_at, U256::from(1_705_276_800u64));
    }

    #[test]
    fn test_decode_listing_array() {
        let first = encoded_listing_tuple(1, "one", "a", "studio");
        let second = encoded_listing_tuple(2, "two", "b", "loft");

        let mut data = word_of(WORD as u64); // offset to array
        data.extend(word_of(2)); // count
        data.extend(word_of(2 * WORD as u64)); // element 0, relative offset
        data.extend(word_of((2 * WORD + first.len()) as u64)); // element 1
        data.extend(&first);
        data.extend(&second);

        let listings = decode_listing_array(&data).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].id, U256::from(1u64));
        assert_eq!(listings[0].description, "one");
        assert_eq!(listings[1].id, U256::from(2u64));
        assert_eq!(listings[1].property_type, "loft");
    }

    #[test]
    fn test_decode_empty_and_zero_length_arrays() {
        assert!(decode_listing_array(&[]).unwrap().is_empty());

        let mut data = word_of(WORD as u64);
        data.extend(word_of(0));
        assert!(decode_listing_array(&data).unwrap().is_empty());
    }

    #[test]
    fn test_decode_stats() {
        let mut data = word_of(12);
        data.extend(word_of(5));
        data.extend(word_of(700));

        let stats = decode_stats(&data).unwrap();
        assert_eq!(stats.total_listings, U256::from(12u64));
        assert_eq!(stats.total_rentals, U256::from(5u64));
        assert_eq!(stats.fee_balance, U256::from(700u64));
    }

    #[test]
    fn test_decode_truncated_response_is_an_error() {
        let data = word_of(WORD as u64); // promises an array that is not there
        assert!(decode_listing_array(&data).is_err());
        assert!(decode_stats(&data[..16]).is_err());
    }
}
