//! Instruction encoding.
//!
//! Turns an instruction name, a role-to-address mapping and typed arguments
//! into the three things a Solana instruction consists of:
//!
//! ```text
//! program_id   the schema's program address
//! accounts     one entry per declared role, in declaration order,
//!              then any remaining accounts
//! data         discriminator | arg_0 | arg_1 | ... (field order)
//! ```

use std::collections::BTreeMap;

use crate::address::Pubkey;
use crate::codec::{decode_value, encode_value, Reader};
use crate::error::WorldError;
use crate::schema::{AccountResolution, FieldType, InstructionDef, KnownAddresses, ProgramSchema};
use crate::value::{ArgValue, Args};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn new(pubkey: Pubkey, is_signer: bool, is_writable: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable,
        }
    }

    pub fn readonly(pubkey: Pubkey) -> Self {
        Self::new(pubkey, false, false)
    }

    pub fn writable(pubkey: Pubkey) -> Self {
        Self::new(pubkey, false, true)
    }
}

/// A fully encoded instruction, ready for a transaction builder.
///
/// Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInstruction {
    program_id: Pubkey,
    accounts: Vec<AccountMeta>,
    data: Vec<u8>,
}

impl EncodedInstruction {
    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn accounts(&self) -> &[AccountMeta] {
        &self.accounts
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_parts(self) -> (Pubkey, Vec<AccountMeta>, Vec<u8>) {
        (self.program_id, self.accounts, self.data)
    }
}

/// Caller-supplied accounts: addresses by role name plus an open-ended tail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountInputs {
    roles: BTreeMap<String, Pubkey>,
    remaining: Vec<AccountMeta>,
}

impl AccountInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, role: impl Into<String>, address: Pubkey) -> Self {
        self.roles.insert(role.into(), address);
        self
    }

    /// Like [`with`](Self::with), skipping `None`.
    pub fn with_opt(self, role: impl Into<String>, address: Option<Pubkey>) -> Self {
        match address {
            Some(address) => self.with(role, address),
            None => self,
        }
    }

    pub fn remaining(mut self, meta: AccountMeta) -> Self {
        self.remaining.push(meta);
        self
    }

    pub fn remaining_accounts(mut self, metas: impl IntoIterator<Item = AccountMeta>) -> Self {
        self.remaining.extend(metas);
        self
    }

    pub fn get(&self, role: &str) -> Option<&Pubkey> {
        self.roles.get(role)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes and decodes calls against one program schema.
#[derive(Debug, Clone)]
pub struct Encoder<'a> {
    schema: &'a ProgramSchema,
    addresses: KnownAddresses,
}

impl<'a> Encoder<'a> {
    pub fn new(schema: &'a ProgramSchema) -> Self {
        Self {
            schema,
            addresses: KnownAddresses::default(),
        }
    }

    pub fn with_addresses(mut self, addresses: KnownAddresses) -> Self {
        self.addresses = addresses;
        self
    }

    pub fn schema(&self) -> &'a ProgramSchema {
        self.schema
    }

    /// Encode the named instruction.
    pub fn encode(
        &self,
        instruction: &str,
        accounts: &AccountInputs,
        args: &Args,
    ) -> Result<EncodedInstruction, WorldError> {
        let def = self.schema.instruction(instruction)?;
        encode_instruction(def, self.schema.program_id, accounts, args, &self.addresses)
    }

    /// Identify the instruction a payload belongs to and decode its arguments.
    pub fn decode(&self, data: &[u8]) -> Result<(&'a InstructionDef, Args), WorldError> {
        let def = self.schema.identify(data)?;
        let args = decode_args(def, data)?;
        Ok((def, args))
    }
}

/// Encode one call of `def` targeting `program_id`.
pub fn encode_instruction(
    def: &InstructionDef,
    program_id: Pubkey,
    accounts: &AccountInputs,
    args: &Args,
    addresses: &KnownAddresses,
) -> Result<EncodedInstruction, WorldError> {
    let metas = resolve_accounts(def, accounts, addresses)?;
    let data = encode_args(def, args)?;

    tracing::debug!(
        instruction = %def.name,
        program = %program_id,
        accounts = metas.len(),
        data_len = data.len(),
        "encoded instruction"
    );

    Ok(EncodedInstruction {
        program_id,
        accounts: metas,
        data,
    })
}

/// Build the ordered account metadata list for `def`.
pub fn resolve_accounts(
    def: &InstructionDef,
    accounts: &AccountInputs,
    addresses: &KnownAddresses,
) -> Result<Vec<AccountMeta>, WorldError> {
    if let Some(unknown) = accounts.roles.keys().find(|name| def.role(name).is_none()) {
        return Err(WorldError::UnknownAccount {
            instruction: def.name.clone(),
            role: unknown.clone(),
        });
    }

    let mut metas = Vec::with_capacity(def.accounts.len() + accounts.remaining.len());
    for role in &def.accounts {
        let pubkey = match (accounts.roles.get(&role.name), role.resolution) {
            (Some(key), _) => *key,
            (None, AccountResolution::Default(well_known)) => {
                let key = addresses.resolve(well_known);
                tracing::trace!(role = %role.name, address = %key, "using default address");
                key
            }
            (None, AccountResolution::Omittable) => {
                tracing::trace!(role = %role.name, "omitting optional account");
                continue;
            }
            (None, AccountResolution::Required) => {
                return Err(WorldError::MissingAccount {
                    instruction: def.name.clone(),
                    role: role.name.clone(),
                });
            }
        };
        metas.push(AccountMeta::new(pubkey, role.is_signer, role.is_writable));
    }

    metas.extend_from_slice(&accounts.remaining);
    Ok(metas)
}

/// Serialize `discriminator | args` for `def`.
pub fn encode_args(def: &InstructionDef, args: &Args) -> Result<Vec<u8>, WorldError> {
    if let Some(unknown) = args.names().find(|name| def.field(name).is_none()) {
        return Err(WorldError::encoding(
            unknown,
            format!("instruction `{}` has no such argument", def.name),
        ));
    }

    let absent = ArgValue::none();
    let mut data = Vec::with_capacity(def.discriminator.len() + 32);
    data.extend_from_slice(&def.discriminator);

    for field in &def.args {
        let value = match (args.get(&field.name), &field.ty) {
            (Some(value), _) => value,
            (None, FieldType::Option(_)) => &absent,
            (None, _) => {
                return Err(WorldError::encoding(&field.name, "missing argument"));
            }
        };
        encode_value(&mut data, &field.name, &field.ty, value)?;
    }

    Ok(data)
}

/// Decode the arguments of a payload produced for `def`.
///
/// Fails if the discriminator does not match or bytes are left over.
pub fn decode_args(def: &InstructionDef, data: &[u8]) -> Result<Args, WorldError> {
    if !data.starts_with(&def.discriminator) {
        return Err(WorldError::Decoding(format!(
            "payload does not start with the discriminator of `{}`",
            def.name
        )));
    }

    let mut reader = Reader::new(&data[def.discriminator.len()..]);
    let mut args = Args::new();
    for field in &def.args {
        let value = decode_value(&mut reader, &field.ty)?;
        args.insert(field.name.as_str(), value);
    }

    if reader.remaining() != 0 {
        return Err(WorldError::Decoding(format!(
            "{} trailing bytes after the arguments of `{}`",
            reader.remaining(),
            def.name
        )));
    }

    Ok(args)
}
