//! Anchor IDL loading.
//!
//! Builds a [`ProgramSchema`] from the IDL JSON the program's build emits, so
//! programs without a built-in table can still be encoded. Both the legacy
//! layout (`isMut`, `isSigner`, `metadata.address`, camelCase names) and the
//! Anchor 0.30 layout (`writable`, `signer`, top-level `address`, explicit
//! `discriminator`) are accepted.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::address::Pubkey;
use crate::discriminator::{anchor_sighash, to_snake_case};
use crate::error::WorldError;
use crate::schema::{
    AccountResolution, AccountRole, FieldDef, FieldType, InstructionDef, KnownAddresses,
    ProgramSchema,
};

/// Top-level IDL document. Sections other than instructions are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Idl {
    #[serde(default)]
    pub address: Option<Pubkey>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: Option<IdlMetadata>,
    pub instructions: Vec<IdlInstruction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdlMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<Pubkey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdlInstruction {
    pub name: String,
    #[serde(default)]
    pub discriminator: Option<Vec<u8>>,
    #[serde(default)]
    pub accounts: Vec<IdlAccountItem>,
    #[serde(default)]
    pub args: Vec<IdlField>,
}

/// An account entry: either a single account or a nested group whose
/// accounts are spliced in place.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdlAccountItem {
    Composite(IdlAccountGroup),
    Single(IdlAccount),
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdlAccountGroup {
    pub name: String,
    pub accounts: Vec<IdlAccountItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdlAccount {
    pub name: String,
    #[serde(default, alias = "isMut")]
    pub writable: bool,
    #[serde(default, alias = "isSigner")]
    pub signer: bool,
    #[serde(default, alias = "isOptional")]
    pub optional: bool,
    /// Fixed address; the role then defaults to it.
    #[serde(default)]
    pub address: Option<Pubkey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdlField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdlType {
    Primitive(String),
    Option { option: Box<IdlType> },
    Vec { vec: Box<IdlType> },
    Array { array: (Box<IdlType>, usize) },
    Defined { defined: serde_json::Value },
}

impl IdlType {
    /// Map to a codec type; the error names the offending type only.
    fn to_field_type(&self) -> Result<FieldType, String> {
        let ty = match self {
            IdlType::Primitive(name) => match name.as_str() {
                "bool" => FieldType::Bool,
                "u8" => FieldType::U8,
                "u16" => FieldType::U16,
                "u32" => FieldType::U32,
                "u64" => FieldType::U64,
                "u128" => FieldType::U128,
                "i8" => FieldType::I8,
                "i16" => FieldType::I16,
                "i32" => FieldType::I32,
                "i64" => FieldType::I64,
                "i128" => FieldType::I128,
                "f32" => FieldType::F32,
                "f64" => FieldType::F64,
                "publicKey" | "pubkey" => FieldType::PublicKey,
                "bytes" => FieldType::Bytes,
                "string" => FieldType::String,
                other => {
                    return Err(format!("unsupported type `{other}`"));
                }
            },
            IdlType::Option { option } => FieldType::option(option.to_field_type()?),
            IdlType::Vec { vec } => FieldType::vec(vec.to_field_type()?),
            IdlType::Array { array } => {
                let (inner, len) = (array.0.to_field_type()?, array.1);
                if len == 0 {
                    return Err(format!("zero-length array of {inner}"));
                }
                let ty = FieldType::array(inner, len);
                if ty.min_encoded_size().is_none() {
                    return Err(format!("array type {ty} is too large"));
                }
                ty
            }
            IdlType::Defined { defined } => {
                return Err(format!("user-defined type {defined} is not supported"));
            }
        };
        Ok(ty)
    }
}

impl Idl {
    pub fn program_name(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .or(self.name.as_deref())
            .unwrap_or("program")
    }

    /// Address declared by the IDL itself, if any.
    pub fn declared_address(&self) -> Option<Pubkey> {
        self.address
            .or_else(|| self.metadata.as_ref().and_then(|m| m.address))
    }

    /// Convert to a validated schema. `program_id` overrides the address
    /// declared in the IDL; one of the two must be present.
    pub fn to_schema(&self, program_id: Option<Pubkey>) -> Result<ProgramSchema, WorldError> {
        let program_id = program_id.or(self.declared_address()).ok_or_else(|| {
            WorldError::Idl(format!(
                "IDL for `{}` declares no program address and none was given",
                self.program_name()
            ))
        })?;

        let instructions = self
            .instructions
            .iter()
            .map(convert_instruction)
            .collect::<Result<Vec<_>, _>>()?;

        let schema = ProgramSchema::new(self.program_name(), program_id, instructions);
        schema.validate()?;

        tracing::debug!(
            program = %schema.name,
            program_id = %schema.program_id,
            instructions = schema.instructions.len(),
            "loaded IDL"
        );
        Ok(schema)
    }
}

fn convert_instruction(ix: &IdlInstruction) -> Result<InstructionDef, WorldError> {
    let name = to_snake_case(&ix.name);
    let discriminator = match &ix.discriminator {
        Some(bytes) => bytes.clone(),
        None => anchor_sighash(&name).to_vec(),
    };

    let mut accounts = Vec::new();
    flatten_accounts(&ix.accounts, &mut accounts);

    let args = ix
        .args
        .iter()
        .map(|field| {
            Ok(FieldDef {
                name: to_snake_case(&field.name),
                ty: field.ty.to_field_type().map_err(|e| {
                    WorldError::Idl(format!("argument `{}` of `{name}`: {e}", field.name))
                })?,
            })
        })
        .collect::<Result<Vec<_>, WorldError>>()?;

    Ok(InstructionDef {
        name,
        discriminator,
        accounts,
        args,
    })
}

fn flatten_accounts(items: &[IdlAccountItem], out: &mut Vec<AccountRole>) {
    for item in items {
        match item {
            IdlAccountItem::Composite(group) => flatten_accounts(&group.accounts, out),
            IdlAccountItem::Single(account) => {
                let resolution = match (account.address, account.optional) {
                    (Some(address), _) => AccountResolution::Default(KnownAddresses::classify(address)),
                    (None, true) => AccountResolution::Omittable,
                    (None, false) => AccountResolution::Required,
                };
                out.push(AccountRole {
                    name: to_snake_case(&account.name),
                    is_signer: account.signer,
                    is_writable: account.writable,
                    resolution,
                });
            }
        }
    }
}

/// Parse IDL JSON.
pub fn parse_idl(json: &str) -> Result<Idl, WorldError> {
    serde_json::from_str(json).map_err(|e| WorldError::Idl(format!("invalid IDL JSON: {e}")))
}

/// Parse IDL JSON straight into a schema.
pub fn schema_from_idl(json: &str, program_id: Option<Pubkey>) -> Result<ProgramSchema, WorldError> {
    parse_idl(json)?.to_schema(program_id)
}

/// Read an IDL file and build its schema.
pub fn load_idl_file(
    path: impl AsRef<Path>,
    program_id: Option<Pubkey>,
) -> Result<ProgramSchema, WorldError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| WorldError::Idl(format!("cannot read {}: {e}", path.display())))?;
    schema_from_idl(&json, program_id)
}
