//! Instruction table shared by every Bolt component program.
//!
//! Each component is its own deployed program, so unlike the world table
//! this one is built per program id.

use crate::address::Pubkey;
use crate::encoder::{AccountInputs, EncodedInstruction, Encoder};
use crate::error::WorldError;
use crate::pda;
use crate::schema::{AccountRole, FieldType, InstructionDef, ProgramSchema, WellKnown};
use crate::value::{ArgValue, Args};

pub const INITIALIZE: [u8; 8] = [175, 175, 109, 31, 13, 152, 155, 237];
pub const DESTROY: [u8; 8] = [157, 40, 96, 3, 135, 203, 143, 74];
pub const UPDATE: [u8; 8] = [219, 200, 88, 176, 158, 63, 253, 127];
pub const DELEGATE: [u8; 8] = [90, 147, 75, 178, 85, 88, 4, 137];

/// Component instruction table for the program at `program_id`.
pub fn schema(program_id: Pubkey) -> ProgramSchema {
    let system_program =
        || AccountRole::new("system_program").defaults_to(WellKnown::SystemProgram);
    let instruction_sysvar = || {
        AccountRole::new("instruction_sysvar_account").defaults_to(WellKnown::InstructionsSysvar)
    };

    let instructions = vec![
        InstructionDef::new("initialize", INITIALIZE)
            .account(AccountRole::new("payer").signer().writable())
            .account(AccountRole::new("data").writable())
            .account(AccountRole::new("entity"))
            .account(AccountRole::new("authority"))
            .account(instruction_sysvar())
            .account(system_program()),
        InstructionDef::new("destroy", DESTROY)
            .account(AccountRole::new("authority").signer().writable())
            .account(AccountRole::new("receiver").writable())
            .account(AccountRole::new("entity"))
            .account(AccountRole::new("component").writable())
            .account(AccountRole::new("component_program_data"))
            .account(instruction_sysvar())
            .account(system_program()),
        InstructionDef::new("update", UPDATE)
            .account(AccountRole::new("bolt_component").writable())
            .account(AccountRole::new("authority").signer())
            .account(instruction_sysvar())
            .account(AccountRole::new("session_token").omittable())
            .arg("data", FieldType::Bytes),
        InstructionDef::new("delegate", DELEGATE)
            .account(AccountRole::new("payer").signer().writable())
            .account(AccountRole::new("entity"))
            .account(AccountRole::new("account").writable())
            .account(AccountRole::new("owner_program"))
            .account(AccountRole::new("buffer").writable())
            .account(AccountRole::new("delegation_record").writable())
            .account(AccountRole::new("delegation_metadata").writable())
            .account(AccountRole::new("delegation_program").defaults_to(WellKnown::DelegationProgram))
            .account(system_program())
            .arg("commit_frequency_ms", FieldType::U32)
            .arg("validator", FieldType::option(FieldType::PublicKey))
            .arg("pda_seeds", FieldType::vec(FieldType::Bytes)),
    ];

    ProgramSchema::new("component", program_id, instructions)
}

/// Parameters of a `delegate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    pub payer: Pubkey,
    pub entity: Pubkey,
    /// The component account being delegated.
    pub account: Pubkey,
    pub commit_frequency_ms: u32,
    pub validator: Option<Pubkey>,
    pub pda_seeds: Vec<Vec<u8>>,
}

/// Build `delegate` for a component program, deriving the buffer and
/// delegation PDAs from the delegated account.
pub fn delegate(
    component_program: Pubkey,
    delegation: &Delegation,
) -> Result<EncodedInstruction, WorldError> {
    let schema = schema(component_program);
    let account = delegation.account;

    let accounts = AccountInputs::new()
        .with("payer", delegation.payer)
        .with("entity", delegation.entity)
        .with("account", account)
        .with("owner_program", component_program)
        .with("buffer", pda::delegation_buffer_pda(&account, &component_program)?)
        .with("delegation_record", pda::delegation_record_pda(&account)?)
        .with("delegation_metadata", pda::delegation_metadata_pda(&account)?);

    let seeds = delegation
        .pda_seeds
        .iter()
        .map(|seed| ArgValue::Bytes(seed.clone()))
        .collect();
    let args = Args::new()
        .with("commit_frequency_ms", delegation.commit_frequency_ms)
        .with("validator", delegation.validator)
        .with("pda_seeds", ArgValue::Vec(seeds));

    Encoder::new(&schema).encode("delegate", &accounts, &args)
}
