//! Solana account addresses.
//!
//! An address is a raw 32-byte public key whose text form is the Base58
//! encoding of those bytes (Bitcoin alphabet, as used by the `bs58` crate).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WorldError;

/// A 32-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pubkey([u8; 32]);

impl Pubkey {
    pub const LEN: usize = 32;

    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Build an address from a slice that must be exactly 32 bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, WorldError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            WorldError::InvalidAddress(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Pubkey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Pubkey {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        address_to_bytes(s).map(Self)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bytes_to_address(&self.0))
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self)
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Decode a Base58 address string to its 32-byte representation.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], WorldError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| WorldError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        WorldError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })?;

    Ok(arr)
}

/// Encode 32 bytes as a Base58 address string.
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

// ---------------------------------------------------------------------------
// Well-known addresses
// ---------------------------------------------------------------------------

/// System Program: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0u8; 32]);

/// Instructions sysvar: `Sysvar1nstructions1111111111111111111111111`
pub const INSTRUCTIONS_SYSVAR_ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xa7, 0xd5, 0x17, 0x18, 0x7b, 0xd1, 0x66, 0x35, 0xda, 0xd4, 0x04, 0x55, 0xfd, 0xc2,
    0xc0, 0xc1, 0x24, 0xc6, 0x8f, 0x21, 0x56, 0x75, 0xa5, 0xdb, 0xba, 0xcb, 0x5f, 0x08, 0x00,
    0x00, 0x00,
]);

/// Delegation program: `DELeGGvXpWV2fqAUhqcF5ZSYMS4JTLjteaAMARRSaeSh`
pub const DELEGATION_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0xb5, 0xb7, 0x00, 0xe1, 0xf2, 0x57, 0x3a, 0xc0, 0xcc, 0x06, 0x04, 0x87, 0x73, 0xed, 0xcb,
    0x74, 0x59, 0xac, 0xff, 0x28, 0x40, 0x28, 0xe2, 0xf0, 0x17, 0xd8, 0x32, 0x0b, 0x93, 0x80,
    0xa7, 0x3e,
]);

/// World program: `WorLD15A7CrDwLcLy4fRqtaTb9fbd8o8iqiEMUDse2n`
pub const WORLD_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x07, 0xa2, 0xd1, 0x49, 0xef, 0x2c, 0x2b, 0xbc, 0x6e, 0xcc, 0x4b, 0x2e, 0x8f, 0x76, 0xc3,
    0x85, 0x15, 0xab, 0x5c, 0xf8, 0x2e, 0xb2, 0xc8, 0x1a, 0xfb, 0x53, 0xa6, 0x4a, 0x2c, 0xd7,
    0x71, 0x8b,
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_program_address() {
        assert_eq!(
            SYSTEM_PROGRAM_ID.to_string(),
            "11111111111111111111111111111111"
        );
    }

    #[test]
    fn well_known_constants_match_base58() {
        assert_eq!(
            INSTRUCTIONS_SYSVAR_ID.to_string(),
            "Sysvar1nstructions1111111111111111111111111"
        );
        assert_eq!(
            DELEGATION_PROGRAM_ID.to_string(),
            "DELeGGvXpWV2fqAUhqcF5ZSYMS4JTLjteaAMARRSaeSh"
        );
        assert_eq!(
            WORLD_PROGRAM_ID.to_string(),
            "WorLD15A7CrDwLcLy4fRqtaTb9fbd8o8iqiEMUDse2n"
        );
    }

    #[test]
    fn parse_and_display_roundtrip() {
        let address = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        let key: Pubkey = address.parse().unwrap();
        assert_eq!(key.to_string(), address);
    }

    #[test]
    fn parse_garbage_returns_error() {
        let result = "not-a-valid-address!!!".parse::<Pubkey>();
        assert!(matches!(result, Err(WorldError::InvalidAddress(_))));
    }

    #[test]
    fn parse_too_short_returns_error() {
        // "1" decodes to a single zero byte.
        let result = "1".parse::<Pubkey>();
        assert!(result.is_err());
    }

    #[test]
    fn try_from_slice_checks_length() {
        assert!(Pubkey::try_from_slice(&[7u8; 32]).is_ok());
        assert!(Pubkey::try_from_slice(&[7u8; 31]).is_err());
    }

    #[test]
    fn serde_uses_base58_string() {
        let json = serde_json::to_string(&WORLD_PROGRAM_ID).unwrap();
        assert_eq!(json, "\"WorLD15A7CrDwLcLy4fRqtaTb9fbd8o8iqiEMUDse2n\"");

        let back: Pubkey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WORLD_PROGRAM_ID);
    }

    #[test]
    fn debug_shows_base58() {
        let debug = format!("{:?}", SYSTEM_PROGRAM_ID);
        assert_eq!(debug, "Pubkey(11111111111111111111111111111111)");
    }
}
