//! The world program's instruction table.
//!
//! Account order and signer/writable flags follow the program's `Accounts`
//! structs exactly; reordering a role breaks the call on-chain.

use std::sync::OnceLock;

use crate::address::{Pubkey, WORLD_PROGRAM_ID};
use crate::encoder::{AccountInputs, AccountMeta, EncodedInstruction, Encoder};
use crate::error::WorldError;
use crate::schema::{AccountRole, FieldType, InstructionDef, ProgramSchema, WellKnown};
use crate::value::Args;

// ---------------------------------------------------------------------------
// Discriminators: sha256("global:<name>")[..8]
// ---------------------------------------------------------------------------

pub const INITIALIZE_REGISTRY: [u8; 8] = [189, 181, 20, 17, 174, 57, 249, 59];
pub const INITIALIZE_NEW_WORLD: [u8; 8] = [23, 96, 88, 194, 200, 203, 200, 98];
pub const ADD_AUTHORITY: [u8; 8] = [229, 9, 106, 73, 91, 213, 109, 183];
pub const REMOVE_AUTHORITY: [u8; 8] = [242, 104, 208, 132, 190, 250, 74, 216];
pub const APPROVE_SYSTEM: [u8; 8] = [114, 165, 105, 68, 52, 67, 207, 121];
pub const REMOVE_SYSTEM: [u8; 8] = [218, 80, 71, 80, 161, 130, 149, 120];
pub const ADD_ENTITY: [u8; 8] = [163, 241, 57, 35, 244, 244, 48, 57];
pub const INITIALIZE_COMPONENT: [u8; 8] = [36, 143, 233, 113, 12, 234, 61, 30];
pub const DESTROY_COMPONENT: [u8; 8] = [40, 197, 69, 196, 67, 95, 219, 73];
pub const APPLY: [u8; 8] = [248, 243, 145, 24, 105, 50, 162, 225];
pub const APPLY2: [u8; 8] = [120, 32, 116, 154, 158, 159, 208, 73];
pub const APPLY3: [u8; 8] = [254, 146, 49, 7, 236, 131, 105, 221];
pub const APPLY4: [u8; 8] = [223, 104, 24, 79, 252, 196, 14, 109];
pub const APPLY5: [u8; 8] = [70, 164, 214, 28, 136, 116, 84, 153];

/// Most components a single `applyN` call can touch.
pub const MAX_APPLY_COMPONENTS: usize = 5;

static APPLY_DISCRIMINATORS: [(&str, [u8; 8]); MAX_APPLY_COMPONENTS] = [
    ("apply", APPLY),
    ("apply2", APPLY2),
    ("apply3", APPLY3),
    ("apply4", APPLY4),
    ("apply5", APPLY5),
];

fn system_program() -> AccountRole {
    AccountRole::new("system_program").defaults_to(WellKnown::SystemProgram)
}

fn instruction_sysvar() -> AccountRole {
    AccountRole::new("instruction_sysvar_account").defaults_to(WellKnown::InstructionsSysvar)
}

/// Build the world program table from scratch.
pub fn build_schema() -> ProgramSchema {
    let mut instructions = vec![
        InstructionDef::new("initialize_registry", INITIALIZE_REGISTRY)
            .account(AccountRole::new("registry").writable())
            .account(AccountRole::new("payer").signer().writable())
            .account(system_program()),
        InstructionDef::new("initialize_new_world", INITIALIZE_NEW_WORLD)
            .account(AccountRole::new("payer").signer().writable())
            .account(AccountRole::new("world").writable())
            .account(AccountRole::new("registry").writable())
            .account(system_program()),
        InstructionDef::new("add_authority", ADD_AUTHORITY)
            .account(AccountRole::new("authority").signer().writable())
            .account(AccountRole::new("new_authority"))
            .account(AccountRole::new("world").writable())
            .account(system_program())
            .arg("world_id", FieldType::U64),
        InstructionDef::new("remove_authority", REMOVE_AUTHORITY)
            .account(AccountRole::new("authority").signer().writable())
            .account(AccountRole::new("authority_to_delete"))
            .account(AccountRole::new("world").writable())
            .account(system_program())
            .arg("world_id", FieldType::U64),
        InstructionDef::new("approve_system", APPROVE_SYSTEM)
            .account(AccountRole::new("authority").signer().writable())
            .account(AccountRole::new("world").writable())
            .account(AccountRole::new("system"))
            .account(system_program()),
        InstructionDef::new("remove_system", REMOVE_SYSTEM)
            .account(AccountRole::new("authority").signer().writable())
            .account(AccountRole::new("world").writable())
            .account(AccountRole::new("system"))
            .account(system_program()),
        InstructionDef::new("add_entity", ADD_ENTITY)
            .account(AccountRole::new("payer").signer().writable())
            .account(AccountRole::new("entity").writable())
            .account(AccountRole::new("world").writable())
            .account(system_program())
            .arg("extra_seed", FieldType::option(FieldType::String)),
        InstructionDef::new("initialize_component", INITIALIZE_COMPONENT)
            .account(AccountRole::new("payer").signer().writable())
            .account(AccountRole::new("data").writable())
            .account(AccountRole::new("entity"))
            .account(AccountRole::new("component_program"))
            .account(AccountRole::new("authority"))
            .account(instruction_sysvar())
            .account(system_program()),
        InstructionDef::new("destroy_component", DESTROY_COMPONENT)
            .account(AccountRole::new("authority").signer().writable())
            .account(AccountRole::new("receiver").writable())
            .account(AccountRole::new("component_program"))
            .account(AccountRole::new("component_program_data"))
            .account(AccountRole::new("entity"))
            .account(AccountRole::new("component").writable())
            .account(instruction_sysvar())
            .account(system_program()),
    ];

    instructions.push(
        InstructionDef::new("apply", APPLY)
            .account(AccountRole::new("component_program"))
            .account(AccountRole::new("bolt_system"))
            .account(AccountRole::new("bolt_component").writable())
            .account(AccountRole::new("authority").signer())
            .account(instruction_sysvar())
            .account(AccountRole::new("world"))
            .arg("args", FieldType::Bytes),
    );
    for (count, (name, discriminator)) in APPLY_DISCRIMINATORS.iter().enumerate().skip(1) {
        instructions.push(apply_n(name, *discriminator, count + 1));
    }

    ProgramSchema::new("world", WORLD_PROGRAM_ID, instructions)
}

/// `apply2`..`apply5`: one system, then a program/component pair per slot.
fn apply_n(name: &str, discriminator: [u8; 8], components: usize) -> InstructionDef {
    let mut def = InstructionDef::new(name, discriminator).account(AccountRole::new("bolt_system"));
    for i in 1..=components {
        def = def
            .account(AccountRole::new(format!("component_program_{i}")))
            .account(AccountRole::new(format!("bolt_component_{i}")).writable());
    }
    def.account(AccountRole::new("authority").signer())
        .account(instruction_sysvar())
        .account(AccountRole::new("world"))
        .arg("args", FieldType::Bytes)
}

/// The shared world program table.
pub fn schema() -> &'static ProgramSchema {
    static SCHEMA: OnceLock<ProgramSchema> = OnceLock::new();
    SCHEMA.get_or_init(build_schema)
}

// ---------------------------------------------------------------------------
// Typed builders
// ---------------------------------------------------------------------------

/// `initialize_registry`: create the singleton registry account.
pub fn initialize_registry(registry: Pubkey, payer: Pubkey) -> Result<EncodedInstruction, WorldError> {
    let accounts = AccountInputs::new()
        .with("registry", registry)
        .with("payer", payer);
    Encoder::new(schema()).encode("initialize_registry", &accounts, &Args::new())
}

/// `initialize_new_world`: create the next world under the registry.
pub fn initialize_new_world(
    payer: Pubkey,
    world: Pubkey,
    registry: Pubkey,
) -> Result<EncodedInstruction, WorldError> {
    let accounts = AccountInputs::new()
        .with("payer", payer)
        .with("world", world)
        .with("registry", registry);
    Encoder::new(schema()).encode("initialize_new_world", &accounts, &Args::new())
}

/// `add_entity`: create an entity in `world`, optionally at a seeded address.
pub fn add_entity(
    payer: Pubkey,
    entity: Pubkey,
    world: Pubkey,
    extra_seed: Option<&str>,
) -> Result<EncodedInstruction, WorldError> {
    let accounts = AccountInputs::new()
        .with("payer", payer)
        .with("entity", entity)
        .with("world", world);
    let args = Args::new().with("extra_seed", extra_seed);
    Encoder::new(schema()).encode("add_entity", &accounts, &args)
}

/// `initialize_component`: attach a component account to an entity.
pub fn initialize_component(
    payer: Pubkey,
    data: Pubkey,
    entity: Pubkey,
    component_program: Pubkey,
    authority: Pubkey,
) -> Result<EncodedInstruction, WorldError> {
    let accounts = AccountInputs::new()
        .with("payer", payer)
        .with("data", data)
        .with("entity", entity)
        .with("component_program", component_program)
        .with("authority", authority);
    Encoder::new(schema()).encode("initialize_component", &accounts, &Args::new())
}

/// One component a system runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentTarget {
    pub component_program: Pubkey,
    pub component: Pubkey,
}

/// Run `bolt_system` over one to five components, picking `apply`..`apply5`
/// from the number of targets.
pub fn apply_system(
    bolt_system: Pubkey,
    components: &[ComponentTarget],
    authority: Pubkey,
    world: Pubkey,
    args: &[u8],
    remaining: &[AccountMeta],
) -> Result<EncodedInstruction, WorldError> {
    let Some((name, _)) = components
        .len()
        .checked_sub(1)
        .and_then(|i| APPLY_DISCRIMINATORS.get(i))
    else {
        return Err(WorldError::encoding(
            "components",
            format!(
                "expected 1 to {MAX_APPLY_COMPONENTS} components, got {}",
                components.len()
            ),
        ));
    };

    let mut accounts = AccountInputs::new()
        .with("bolt_system", bolt_system)
        .with("authority", authority)
        .with("world", world);
    if let [single] = components {
        accounts = accounts
            .with("component_program", single.component_program)
            .with("bolt_component", single.component);
    } else {
        for (i, target) in components.iter().enumerate() {
            accounts = accounts
                .with(format!("component_program_{}", i + 1), target.component_program)
                .with(format!("bolt_component_{}", i + 1), target.component);
        }
    }
    let accounts = accounts.remaining_accounts(remaining.iter().copied());

    let args = Args::new().with("args", args);
    Encoder::new(schema()).encode(name, &accounts, &args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{INSTRUCTIONS_SYSVAR_ID, SYSTEM_PROGRAM_ID};
    use crate::discriminator::anchor_sighash;

    fn key(b: u8) -> Pubkey {
        Pubkey::new_from_array([b; 32])
    }

    #[test]
    fn discriminators_are_anchor_sighashes() {
        for ix in &schema().instructions {
            assert_eq!(
                ix.discriminator,
                anchor_sighash(&ix.name).to_vec(),
                "discriminator of {}",
                ix.name
            );
        }
    }

    #[test]
    fn table_is_valid() {
        let schema = schema();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.instructions.len(), 14);
        assert_eq!(schema.program_id, WORLD_PROGRAM_ID);
    }

    #[test]
    fn initialize_new_world_layout() {
        let ix = initialize_new_world(key(1), key(2), key(3)).unwrap();
        assert_eq!(ix.data(), &INITIALIZE_NEW_WORLD);

        let accounts = ix.accounts();
        assert_eq!(accounts.len(), 4);
        assert_eq!(accounts[0], AccountMeta::new(key(1), true, true));
        assert_eq!(accounts[1], AccountMeta::writable(key(2)));
        assert_eq!(accounts[2], AccountMeta::writable(key(3)));
        assert_eq!(accounts[3], AccountMeta::readonly(SYSTEM_PROGRAM_ID));
    }

    #[test]
    fn add_entity_with_and_without_seed() {
        let without = add_entity(key(1), key(2), key(3), None).unwrap();
        let mut expected = ADD_ENTITY.to_vec();
        expected.push(0);
        assert_eq!(without.data(), expected.as_slice());

        let with = add_entity(key(1), key(2), key(3), Some("hero")).unwrap();
        let mut expected = ADD_ENTITY.to_vec();
        expected.extend_from_slice(&[1, 4, 0, 0, 0]);
        expected.extend_from_slice(b"hero");
        assert_eq!(with.data(), expected.as_slice());
    }

    #[test]
    fn initialize_component_fills_sysvar_and_system_program() {
        let ix = initialize_component(key(1), key(2), key(3), key(4), key(5)).unwrap();
        let accounts = ix.accounts();
        assert_eq!(accounts.len(), 7);
        assert_eq!(accounts[5].pubkey, INSTRUCTIONS_SYSVAR_ID);
        assert_eq!(accounts[6].pubkey, SYSTEM_PROGRAM_ID);
    }

    #[test]
    fn apply_single_component() {
        let target = ComponentTarget {
            component_program: key(10),
            component: key(11),
        };
        let ix = apply_system(key(9), &[target], key(1), key(2), &[1, 2, 3, 4, 5], &[]).unwrap();

        let mut expected = APPLY.to_vec();
        expected.extend_from_slice(&[5, 0, 0, 0, 1, 2, 3, 4, 5]);
        assert_eq!(ix.data(), expected.as_slice());

        let keys: Vec<Pubkey> = ix.accounts().iter().map(|m| m.pubkey).collect();
        assert_eq!(
            keys,
            vec![key(10), key(9), key(11), key(1), INSTRUCTIONS_SYSVAR_ID, key(2)]
        );
        assert!(ix.accounts()[3].is_signer);
        assert!(ix.accounts()[2].is_writable);
    }

    #[test]
    fn apply_three_components_uses_apply3() {
        let targets: Vec<ComponentTarget> = (0..3)
            .map(|i| ComponentTarget {
                component_program: key(20 + i),
                component: key(30 + i),
            })
            .collect();
        let extra = AccountMeta::readonly(key(99));
        let ix = apply_system(key(9), &targets, key(1), key(2), &[], &[extra]).unwrap();

        assert_eq!(&ix.data()[..8], &APPLY3);
        // system + 3 pairs + authority + sysvar + world + 1 remaining
        assert_eq!(ix.accounts().len(), 1 + 6 + 3 + 1);
        assert_eq!(ix.accounts()[1].pubkey, key(20));
        assert_eq!(ix.accounts()[2].pubkey, key(30));
        assert_eq!(*ix.accounts().last().unwrap(), extra);
    }

    #[test]
    fn apply_rejects_bad_component_counts() {
        assert!(apply_system(key(9), &[], key(1), key(2), &[], &[]).is_err());

        let six = vec![
            ComponentTarget {
                component_program: key(1),
                component: key(2),
            };
            6
        ];
        assert!(matches!(
            apply_system(key(9), &six, key(1), key(2), &[], &[]),
            Err(WorldError::Encoding { .. })
        ));
    }

    #[test]
    fn add_authority_encodes_world_id() {
        let accounts = AccountInputs::new()
            .with("authority", key(1))
            .with("new_authority", key(2))
            .with("world", key(3));
        let args = Args::new().with("world_id", 7u64);
        let ix = Encoder::new(schema())
            .encode("add_authority", &accounts, &args)
            .unwrap();
        assert_eq!(&ix.data()[8..], &7u64.to_le_bytes());
    }
}
