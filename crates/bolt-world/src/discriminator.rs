//! Anchor instruction discriminators.
//!
//! Anchor prefixes every instruction payload with the first 8 bytes of
//! `SHA-256("global:<snake_case_name>")`. The built-in tables store these as
//! constants; the IDL loader falls back to computing them.

use sha2::{Digest, Sha256};

/// Length of an Anchor instruction discriminator.
pub const DISCRIMINATOR_LEN: usize = 8;

const GLOBAL_NAMESPACE: &str = "global";

/// Compute the Anchor discriminator for an instruction name.
///
/// The name is hashed as given, so callers holding a camelCase name must run
/// it through [`to_snake_case`] first.
pub fn anchor_sighash(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(GLOBAL_NAMESPACE.as_bytes());
    hasher.update(b":");
    hasher.update(name.as_bytes());
    let hash: [u8; 32] = hasher.finalize().into();

    let mut disc = [0u8; DISCRIMINATOR_LEN];
    disc.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    disc
}

/// Convert a camelCase or PascalCase identifier to snake_case.
///
/// Digits stay attached to the preceding word (`apply2` stays `apply2`),
/// which matches how Anchor names its instruction handlers.
///
/// The conversion is lossy: a handler named `apply_2` appears in a legacy
/// IDL as `apply2` and cannot be recovered, so a sighash computed from it
/// will not match. The IDL loader uses the IDL's explicit `discriminator`
/// whenever one is present.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
