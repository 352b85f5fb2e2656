//! Instruction encoding for the Bolt ECS world program.
//!
//! Turns an instruction name, a role-to-address map and typed arguments into
//! the exact bytes and account list the on-chain program expects: an 8-byte
//! Anchor discriminator followed by Borsh-encoded arguments, plus account
//! metadata in declared order. Signing and submission are left to the
//! caller's transaction builder.
//!
//! Instruction tables come from the built-in [`world`] and [`component`]
//! definitions or from an Anchor IDL file via [`idl`].

pub mod address;
pub mod codec;
pub mod component;
pub mod config;
pub mod discriminator;
pub mod encoder;
pub mod error;
pub mod idl;
pub mod pda;
pub mod program_error;
pub mod schema;
pub mod value;
pub mod world;

// Re-export key public types for ergonomic imports.
pub use address::{
    address_to_bytes, bytes_to_address, Pubkey, DELEGATION_PROGRAM_ID, INSTRUCTIONS_SYSVAR_ID,
    SYSTEM_PROGRAM_ID, WORLD_PROGRAM_ID,
};
pub use config::ClientConfig;
pub use discriminator::{anchor_sighash, DISCRIMINATOR_LEN};
pub use encoder::{
    decode_args, encode_args, encode_instruction, AccountInputs, AccountMeta,
    EncodedInstruction, Encoder,
};
pub use error::WorldError;
pub use idl::{load_idl_file, schema_from_idl};
pub use program_error::WorldProgramError;
pub use schema::{
    AccountResolution, AccountRole, FieldDef, FieldType, InstructionDef, KnownAddresses,
    ProgramSchema, WellKnown,
};
pub use value::{ArgValue, Args};
