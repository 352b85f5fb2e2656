//! Program Derived Addresses used by the world and delegation programs.
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || bump || program_id ||
//! "ProgramDerivedAddress")` for the highest bump (255 down to 0) whose hash
//! is NOT a valid Ed25519 point.

use sha2::{Digest, Sha256};

use crate::address::{Pubkey, DELEGATION_PROGRAM_ID, WORLD_PROGRAM_ID};
use crate::error::WorldError;

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Maximum length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds, including the bump.
pub const MAX_SEEDS: usize = 16;

const REGISTRY_SEED: &[u8] = b"registry";
const WORLD_SEED: &[u8] = b"world";
const ENTITY_SEED: &[u8] = b"entity";
const BUFFER_SEED: &[u8] = b"buffer";
const DELEGATION_SEED: &[u8] = b"delegation";
const DELEGATION_METADATA_SEED: &[u8] = b"delegation-metadata";

/// Find a valid PDA for the given seeds and program, returning it with its
/// bump seed.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), WorldError> {
    if seeds.len() >= MAX_SEEDS {
        return Err(WorldError::Pda(format!(
            "{} seeds given, at most {} allowed",
            seeds.len(),
            MAX_SEEDS - 1
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(WorldError::Pda(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }

    for bump in (0u8..=255).rev() {
        if let Some(address) = try_create_program_address(seeds, &[bump], program_id) {
            return Ok((address, bump));
        }
    }

    Err(WorldError::Pda("could not find valid PDA bump seed".into()))
}

/// Returns `Some(address)` if the derived point is OFF the Ed25519 curve,
/// `None` if it falls on the curve.
fn try_create_program_address(
    seeds: &[&[u8]],
    bump_seed: &[u8],
    program_id: &Pubkey,
) -> Option<Pubkey> {
    let mut hasher = Sha256::new();

    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&hash) {
        return None;
    }

    Some(Pubkey::new_from_array(hash))
}

/// Check if 32 bytes decompress to an Ed25519 curve point.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

// ---------------------------------------------------------------------------
// World program accounts
// ---------------------------------------------------------------------------

/// The singleton registry account.
pub fn registry_pda() -> Result<Pubkey, WorldError> {
    find_program_address(&[REGISTRY_SEED], &WORLD_PROGRAM_ID).map(|(key, _)| key)
}

/// The world with the given id. Ids are hashed big-endian.
pub fn world_pda(world_id: u64) -> Result<Pubkey, WorldError> {
    find_program_address(&[WORLD_SEED, &world_id.to_be_bytes()], &WORLD_PROGRAM_ID)
        .map(|(key, _)| key)
}

/// How an entity address is seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitySeed<'a> {
    /// The world's entity counter at creation time.
    Id(u64),
    /// A caller-chosen seed, as passed to `add_entity`'s `extra_seed`.
    Extra(&'a [u8]),
}

/// The entity at `seed` within world `world_id`.
pub fn entity_pda(world_id: u64, seed: EntitySeed<'_>) -> Result<Pubkey, WorldError> {
    let world_id = world_id.to_be_bytes();
    match seed {
        EntitySeed::Id(entity_id) => find_program_address(
            &[ENTITY_SEED, &world_id, &entity_id.to_be_bytes()],
            &WORLD_PROGRAM_ID,
        ),
        EntitySeed::Extra(extra) => find_program_address(
            &[ENTITY_SEED, &world_id, &[0u8; 8], extra],
            &WORLD_PROGRAM_ID,
        ),
    }
    .map(|(key, _)| key)
}

/// A component's data account for `entity`, owned by `component_program`.
///
/// `seed` distinguishes several components of the same program on one
/// entity; most components use an empty seed.
pub fn component_pda(
    component_program: &Pubkey,
    entity: &Pubkey,
    seed: &[u8],
) -> Result<Pubkey, WorldError> {
    find_program_address(&[seed, entity.as_ref()], component_program).map(|(key, _)| key)
}

// ---------------------------------------------------------------------------
// Delegation program accounts
// ---------------------------------------------------------------------------

/// Buffer holding a delegated account's data, owned by its program.
pub fn delegation_buffer_pda(
    delegated_account: &Pubkey,
    owner_program: &Pubkey,
) -> Result<Pubkey, WorldError> {
    find_program_address(&[BUFFER_SEED, delegated_account.as_ref()], owner_program)
        .map(|(key, _)| key)
}

pub fn delegation_record_pda(delegated_account: &Pubkey) -> Result<Pubkey, WorldError> {
    find_program_address(
        &[DELEGATION_SEED, delegated_account.as_ref()],
        &DELEGATION_PROGRAM_ID,
    )
    .map(|(key, _)| key)
}

pub fn delegation_metadata_pda(delegated_account: &Pubkey) -> Result<Pubkey, WorldError> {
    find_program_address(
        &[DELEGATION_METADATA_SEED, delegated_account.as_ref()],
        &DELEGATION_PROGRAM_ID,
    )
    .map(|(key, _)| key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;

    #[test]
    fn pda_is_not_on_curve() {
        let pda = world_pda(0).unwrap();
        assert!(!is_on_curve(&pda.to_bytes()), "PDA must NOT be on the Ed25519 curve");
    }

    #[test]
    fn pda_derivation_is_deterministic() {
        assert_eq!(registry_pda().unwrap(), registry_pda().unwrap());
        assert_eq!(world_pda(3).unwrap(), world_pda(3).unwrap());
    }

    #[test]
    fn different_world_ids_give_different_worlds() {
        assert_ne!(world_pda(1).unwrap(), world_pda(2).unwrap());
    }

    #[test]
    fn entity_seeding_modes_differ() {
        let by_id = entity_pda(1, EntitySeed::Id(0)).unwrap();
        let by_seed = entity_pda(1, EntitySeed::Extra(b"hero")).unwrap();
        assert_ne!(by_id, by_seed);
        assert_ne!(by_id, entity_pda(1, EntitySeed::Id(1)).unwrap());
    }

    #[test]
    fn component_pda_depends_on_program_and_seed() {
        let entity = Pubkey::new_from_array([0xAA; 32]);
        let program_a = Pubkey::new_from_array([0x01; 32]);
        let program_b = Pubkey::new_from_array([0x02; 32]);

        let a = component_pda(&program_a, &entity, b"").unwrap();
        assert_ne!(a, component_pda(&program_b, &entity, b"").unwrap());
        assert_ne!(a, component_pda(&program_a, &entity, b"extra").unwrap());
    }

    #[test]
    fn delegation_pdas_are_distinct() {
        let account = Pubkey::new_from_array([0x33; 32]);
        let owner = Pubkey::new_from_array([0x44; 32]);
        let buffer = delegation_buffer_pda(&account, &owner).unwrap();
        let record = delegation_record_pda(&account).unwrap();
        let metadata = delegation_metadata_pda(&account).unwrap();
        assert_ne!(buffer, record);
        assert_ne!(record, metadata);
    }

    #[test]
    fn long_seed_rejected() {
        let program = Pubkey::new_from_array([1; 32]);
        let long = [0u8; 33];
        assert!(matches!(
            find_program_address(&[&long], &program),
            Err(WorldError::Pda(_))
        ));
    }

    #[test]
    fn too_many_seeds_rejected() {
        let program = Pubkey::new_from_array([1; 32]);
        let seeds: Vec<&[u8]> = vec![b"s"; MAX_SEEDS];
        assert!(find_program_address(&seeds, &program).is_err());
    }

    #[test]
    fn is_on_curve_accepts_real_public_key() {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        let public = signing_key.verifying_key().to_bytes();
        assert!(is_on_curve(&public));
    }

    #[test]
    fn is_on_curve_rejects_off_curve_bytes() {
        // y = 0x0202...02 has no matching x coordinate.
        assert!(!is_on_curve(&[0x02; 32]));
    }
}
