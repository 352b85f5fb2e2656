//! Instruction definitions as data.
//!
//! A [`ProgramSchema`] is a table of [`InstructionDef`]s: the discriminator,
//! the ordered account roles, and the ordered argument fields. One generic
//! encoder and decoder walks these tables instead of a generated function per
//! instruction.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::{Pubkey, DELEGATION_PROGRAM_ID, INSTRUCTIONS_SYSVAR_ID, SYSTEM_PROGRAM_ID};
use crate::error::WorldError;

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

/// Semantic type of an instruction argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    /// IEEE 754, little-endian.
    F32,
    F64,
    /// 32 raw bytes, no length prefix.
    PublicKey,
    /// u32 LE length prefix followed by the raw bytes.
    Bytes,
    /// u32 LE length prefix followed by UTF-8 bytes.
    String,
    /// 1-byte presence flag, then the value when present.
    Option(Box<FieldType>),
    /// u32 LE element count, then each element.
    Vec(Box<FieldType>),
    /// Exactly N elements, no prefix.
    Array(Box<FieldType>, usize),
}

impl FieldType {
    pub fn option(inner: FieldType) -> Self {
        FieldType::Option(Box::new(inner))
    }

    pub fn vec(inner: FieldType) -> Self {
        FieldType::Vec(Box::new(inner))
    }

    pub fn array(inner: FieldType, len: usize) -> Self {
        FieldType::Array(Box::new(inner), len)
    }

    /// Fewest bytes any value of this type encodes to, or `None` if that
    /// count does not fit in a `usize`.
    pub fn min_encoded_size(&self) -> Option<usize> {
        match self {
            FieldType::Bool | FieldType::U8 | FieldType::I8 | FieldType::Option(_) => Some(1),
            FieldType::U16 | FieldType::I16 => Some(2),
            FieldType::U32 | FieldType::I32 | FieldType::F32 => Some(4),
            FieldType::Bytes | FieldType::String | FieldType::Vec(_) => Some(4),
            FieldType::U64 | FieldType::I64 | FieldType::F64 => Some(8),
            FieldType::U128 | FieldType::I128 => Some(16),
            FieldType::PublicKey => Some(32),
            FieldType::Array(inner, len) => inner.min_encoded_size()?.checked_mul(*len),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => f.write_str("bool"),
            FieldType::U8 => f.write_str("u8"),
            FieldType::U16 => f.write_str("u16"),
            FieldType::U32 => f.write_str("u32"),
            FieldType::U64 => f.write_str("u64"),
            FieldType::U128 => f.write_str("u128"),
            FieldType::I8 => f.write_str("i8"),
            FieldType::I16 => f.write_str("i16"),
            FieldType::I32 => f.write_str("i32"),
            FieldType::I64 => f.write_str("i64"),
            FieldType::I128 => f.write_str("i128"),
            FieldType::F32 => f.write_str("f32"),
            FieldType::F64 => f.write_str("f64"),
            FieldType::PublicKey => f.write_str("publicKey"),
            FieldType::Bytes => f.write_str("bytes"),
            FieldType::String => f.write_str("string"),
            FieldType::Option(inner) => write!(f, "option<{inner}>"),
            FieldType::Vec(inner) => write!(f, "vec<{inner}>"),
            FieldType::Array(inner, len) => write!(f, "[{inner}; {len}]"),
        }
    }
}

/// A named argument field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
}

// ---------------------------------------------------------------------------
// Account roles
// ---------------------------------------------------------------------------

/// Addresses an omitted account role may fall back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnown {
    SystemProgram,
    InstructionsSysvar,
    DelegationProgram,
    Address(Pubkey),
}

/// What happens when the caller does not supply an account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountResolution {
    /// Must be supplied; encoding fails otherwise.
    Required,
    /// Falls back to a well-known address.
    Default(WellKnown),
    /// Dropped from the metadata list.
    Omittable,
}

/// A named slot in an instruction's account list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRole {
    pub name: String,
    pub is_signer: bool,
    pub is_writable: bool,
    pub resolution: AccountResolution,
}

impl AccountRole {
    /// A required, read-only, non-signer role.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_signer: false,
            is_writable: false,
            resolution: AccountResolution::Required,
        }
    }

    pub fn signer(mut self) -> Self {
        self.is_signer = true;
        self
    }

    pub fn writable(mut self) -> Self {
        self.is_writable = true;
        self
    }

    pub fn defaults_to(mut self, address: WellKnown) -> Self {
        self.resolution = AccountResolution::Default(address);
        self
    }

    pub fn omittable(mut self) -> Self {
        self.resolution = AccountResolution::Omittable;
        self
    }
}

/// Concrete addresses behind [`WellKnown`] defaults.
///
/// Overridable through the client config so that local validators running a
/// relocated delegation program still resolve correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KnownAddresses {
    pub system_program: Pubkey,
    pub instructions_sysvar: Pubkey,
    pub delegation_program: Pubkey,
}

impl Default for KnownAddresses {
    fn default() -> Self {
        Self {
            system_program: SYSTEM_PROGRAM_ID,
            instructions_sysvar: INSTRUCTIONS_SYSVAR_ID,
            delegation_program: DELEGATION_PROGRAM_ID,
        }
    }
}

impl KnownAddresses {
    pub fn resolve(&self, address: WellKnown) -> Pubkey {
        match address {
            WellKnown::SystemProgram => self.system_program,
            WellKnown::InstructionsSysvar => self.instructions_sysvar,
            WellKnown::DelegationProgram => self.delegation_program,
            WellKnown::Address(key) => key,
        }
    }

    /// Map a fixed address back to the well-known slot it names, if any.
    pub fn classify(address: Pubkey) -> WellKnown {
        if address == SYSTEM_PROGRAM_ID {
            WellKnown::SystemProgram
        } else if address == INSTRUCTIONS_SYSVAR_ID {
            WellKnown::InstructionsSysvar
        } else if address == DELEGATION_PROGRAM_ID {
            WellKnown::DelegationProgram
        } else {
            WellKnown::Address(address)
        }
    }
}

// ---------------------------------------------------------------------------
// Instructions and programs
// ---------------------------------------------------------------------------

/// One instruction of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionDef {
    pub name: String,
    pub discriminator: Vec<u8>,
    pub accounts: Vec<AccountRole>,
    pub args: Vec<FieldDef>,
}

impl InstructionDef {
    pub fn new(name: impl Into<String>, discriminator: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            discriminator: discriminator.into(),
            accounts: Vec::new(),
            args: Vec::new(),
        }
    }

    pub fn account(mut self, role: AccountRole) -> Self {
        self.accounts.push(role);
        self
    }

    pub fn arg(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.args.push(FieldDef {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn role(&self, name: &str) -> Option<&AccountRole> {
        self.accounts.iter().find(|r| r.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.args.iter().find(|f| f.name == name)
    }
}

/// The instruction table of one on-chain program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSchema {
    pub name: String,
    pub program_id: Pubkey,
    pub instructions: Vec<InstructionDef>,
}

impl ProgramSchema {
    pub fn new(name: impl Into<String>, program_id: Pubkey, instructions: Vec<InstructionDef>) -> Self {
        Self {
            name: name.into(),
            program_id,
            instructions,
        }
    }

    /// Same table, deployed at a different address.
    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn instruction(&self, name: &str) -> Result<&InstructionDef, WorldError> {
        self.instructions
            .iter()
            .find(|ix| ix.name == name)
            .ok_or_else(|| WorldError::UnknownInstruction(name.to_string()))
    }

    /// Find the instruction whose discriminator prefixes `payload`.
    pub fn identify(&self, payload: &[u8]) -> Result<&InstructionDef, WorldError> {
        self.instructions
            .iter()
            .find(|ix| payload.starts_with(&ix.discriminator))
            .ok_or_else(|| {
                let shown = &payload[..payload.len().min(8)];
                WorldError::Decoding(format!(
                    "no instruction in `{}` matches discriminator {:02x?}",
                    self.name, shown
                ))
            })
    }

    /// Check the table is unambiguous.
    ///
    /// Instruction names must be unique, discriminators non-empty and none a
    /// prefix of another, and role and field names unique per instruction.
    pub fn validate(&self) -> Result<(), WorldError> {
        let mut names = HashSet::new();
        for ix in &self.instructions {
            if !names.insert(ix.name.as_str()) {
                return Err(WorldError::Idl(format!(
                    "duplicate instruction `{}` in `{}`",
                    ix.name, self.name
                )));
            }
            if ix.discriminator.is_empty() {
                return Err(WorldError::Idl(format!(
                    "instruction `{}` has an empty discriminator",
                    ix.name
                )));
            }

            let mut roles = HashSet::new();
            for role in &ix.accounts {
                if !roles.insert(role.name.as_str()) {
                    return Err(WorldError::Idl(format!(
                        "instruction `{}` declares account `{}` twice",
                        ix.name, role.name
                    )));
                }
            }

            let mut fields = HashSet::new();
            for field in &ix.args {
                if !fields.insert(field.name.as_str()) {
                    return Err(WorldError::Idl(format!(
                        "instruction `{}` declares argument `{}` twice",
                        ix.name, field.name
                    )));
                }
            }
        }

        for (i, a) in self.instructions.iter().enumerate() {
            for b in &self.instructions[i + 1..] {
                if a.discriminator.starts_with(&b.discriminator)
                    || b.discriminator.starts_with(&a.discriminator)
                {
                    return Err(WorldError::Idl(format!(
                        "discriminators of `{}` and `{}` collide",
                        a.name, b.name
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProgramSchema {
        ProgramSchema::new(
            "sample",
            Pubkey::new_from_array([9u8; 32]),
            vec![
                InstructionDef::new("ping", [1u8, 0, 0, 0, 0, 0, 0, 0])
                    .account(AccountRole::new("payer").signer().writable()),
                InstructionDef::new("pong", [2u8, 0, 0, 0, 0, 0, 0, 0])
                    .arg("value", FieldType::U64),
            ],
        )
    }

    #[test]
    fn role_builder_sets_flags() {
        let role = AccountRole::new("payer").signer().writable();
        assert!(role.is_signer);
        assert!(role.is_writable);
        assert_eq!(role.resolution, AccountResolution::Required);

        let sys = AccountRole::new("system_program").defaults_to(WellKnown::SystemProgram);
        assert!(!sys.is_signer);
        assert_eq!(
            sys.resolution,
            AccountResolution::Default(WellKnown::SystemProgram)
        );
    }

    #[test]
    fn lookup_by_name() {
        let schema = sample();
        assert_eq!(schema.instruction("pong").unwrap().args.len(), 1);
        assert!(matches!(
            schema.instruction("pang"),
            Err(WorldError::UnknownInstruction(name)) if name == "pang"
        ));
    }

    #[test]
    fn identify_by_discriminator_prefix() {
        let schema = sample();
        let payload = [2u8, 0, 0, 0, 0, 0, 0, 0, 42, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(schema.identify(&payload).unwrap().name, "pong");
        assert!(schema.identify(&[3u8; 8]).is_err());
    }

    #[test]
    fn validate_accepts_sample() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn validate_rejects_prefix_collision() {
        let mut schema = sample();
        schema
            .instructions
            .push(InstructionDef::new("short", vec![1u8, 0]));
        assert!(matches!(schema.validate(), Err(WorldError::Idl(_))));
    }

    #[test]
    fn validate_rejects_duplicate_role() {
        let mut schema = sample();
        schema.instructions[0]
            .accounts
            .push(AccountRole::new("payer"));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn known_addresses_resolve_and_classify() {
        let addrs = KnownAddresses::default();
        assert_eq!(addrs.resolve(WellKnown::SystemProgram), SYSTEM_PROGRAM_ID);
        assert_eq!(
            KnownAddresses::classify(DELEGATION_PROGRAM_ID),
            WellKnown::DelegationProgram
        );
        let other = Pubkey::new_from_array([5u8; 32]);
        assert_eq!(KnownAddresses::classify(other), WellKnown::Address(other));
        assert_eq!(addrs.resolve(WellKnown::Address(other)), other);
    }

    #[test]
    fn min_encoded_size_of_nested_types() {
        assert_eq!(FieldType::array(FieldType::U32, 3).min_encoded_size(), Some(12));
        assert_eq!(FieldType::option(FieldType::U64).min_encoded_size(), Some(1));
        assert_eq!(FieldType::vec(FieldType::PublicKey).min_encoded_size(), Some(4));
        assert_eq!(FieldType::array(FieldType::U8, 0).min_encoded_size(), Some(0));
    }

    #[test]
    fn min_encoded_size_overflow_is_none() {
        let ty = FieldType::array(FieldType::U64, usize::MAX);
        assert_eq!(ty.min_encoded_size(), None);
        let nested = FieldType::array(FieldType::array(FieldType::U8, usize::MAX), 2);
        assert_eq!(nested.min_encoded_size(), None);
    }

    #[test]
    fn field_type_display() {
        let ty = FieldType::vec(FieldType::option(FieldType::PublicKey));
        assert_eq!(ty.to_string(), "vec<option<publicKey>>");
        assert_eq!(FieldType::array(FieldType::U8, 4).to_string(), "[u8; 4]");
    }
}
