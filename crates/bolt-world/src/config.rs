//! Client configuration.
//!
//! Mirrors the keys of a `.solitarc` file:
//!
//! ```json
//! {
//!   "programName": "world",
//!   "programId": "WorLD15A7CrDwLcLy4fRqtaTb9fbd8o8iqiEMUDse2n",
//!   "idlPath": "target/idl/world.json",
//!   "addresses": { "delegationProgram": "DELeGGvXpWV2fqAUhqcF5ZSYMS4JTLjteaAMARRSaeSh" }
//! }
//! ```
//!
//! `idlPath` is optional. Without it the built-in table for `programName`
//! is used, which must then be `world` or `component`.
//!
//! `programId` is optional too. An IDL falls back to the address it declares,
//! `world` to the canonical world program. Component programs have no
//! canonical address, so a `component` config must name one.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::address::{Pubkey, WORLD_PROGRAM_ID};
use crate::encoder::Encoder;
use crate::error::WorldError;
use crate::schema::{KnownAddresses, ProgramSchema};
use crate::{component, idl, world};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub program_name: String,
    #[serde(default)]
    pub program_id: Option<Pubkey>,
    #[serde(default)]
    pub idl_path: Option<PathBuf>,
    #[serde(default)]
    pub addresses: KnownAddresses,
    /// Directory relative `idl_path`s resolve against; set by [`Self::from_file`].
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Config for the built-in world table at its canonical address.
    pub fn world() -> Self {
        Self {
            program_name: "world".into(),
            program_id: None,
            idl_path: None,
            addresses: KnownAddresses::default(),
            base_dir: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        serde_json::from_str(json).map_err(|e| WorldError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| WorldError::Config(format!("cannot read {}: {e}", path.display())))?;
        let mut config = Self::from_json(&json)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// The IDL path with relative paths resolved against the config file.
    pub fn resolved_idl_path(&self) -> Option<PathBuf> {
        let path = self.idl_path.as_ref()?;
        match &self.base_dir {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path.clone()),
        }
    }

    /// Build the instruction table this config describes.
    pub fn load_schema(&self) -> Result<ProgramSchema, WorldError> {
        if let Some(path) = self.resolved_idl_path() {
            tracing::debug!(path = %path.display(), "loading schema from IDL");
            return idl::load_idl_file(&path, self.program_id);
        }

        match self.program_name.as_str() {
            "world" => Ok(world::build_schema()
                .with_program_id(self.program_id.unwrap_or(WORLD_PROGRAM_ID))),
            "component" => {
                let program_id = self.program_id.ok_or_else(|| {
                    WorldError::Config("a component config must set programId".into())
                })?;
                Ok(component::schema(program_id))
            }
            other => Err(WorldError::Config(format!(
                "no built-in table for program `{other}`; set idlPath"
            ))),
        }
    }

    /// An encoder over `schema` using this config's well-known addresses.
    pub fn encoder<'a>(&self, schema: &'a ProgramSchema) -> Encoder<'a> {
        Encoder::new(schema).with_addresses(self.addresses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{DELEGATION_PROGRAM_ID, SYSTEM_PROGRAM_ID};

    #[test]
    fn minimal_config_uses_defaults() {
        let config = ClientConfig::from_json(r#"{ "programName": "world" }"#).unwrap();
        assert_eq!(config, ClientConfig::world());
        assert_eq!(config.addresses.delegation_program, DELEGATION_PROGRAM_ID);
        assert_eq!(config.load_schema().unwrap().program_id, WORLD_PROGRAM_ID);
    }

    #[test]
    fn component_without_program_id_is_a_config_error() {
        let config = ClientConfig::from_json(r#"{ "programName": "component" }"#).unwrap();
        assert_eq!(config.program_id, None);
        assert!(matches!(config.load_schema(), Err(WorldError::Config(_))));
    }

    #[test]
    fn idl_without_program_id_keeps_declared_address() {
        let dir = std::env::temp_dir().join(format!("bolt-world-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("counter.json"),
            r#"{
                "address": "11111111111111111111111111111112",
                "metadata": { "name": "counter" },
                "instructions": []
            }"#,
        )
        .unwrap();
        let config_path = dir.join("solitarc.json");
        fs::write(
            &config_path,
            r#"{ "programName": "counter", "idlPath": "counter.json" }"#,
        )
        .unwrap();

        let schema = ClientConfig::from_file(&config_path).unwrap().load_schema().unwrap();
        assert_eq!(schema.program_id.to_string(), "11111111111111111111111111111112");
        assert_ne!(schema.program_id, WORLD_PROGRAM_ID);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn address_overrides_are_partial() {
        let config = ClientConfig::from_json(
            r#"{
                "programName": "component",
                "programId": "11111111111111111111111111111112",
                "addresses": { "delegationProgram": "11111111111111111111111111111113" }
            }"#,
        )
        .unwrap();
        assert_ne!(config.addresses.delegation_program, DELEGATION_PROGRAM_ID);
        assert_eq!(config.addresses.system_program, SYSTEM_PROGRAM_ID);

        let schema = config.load_schema().unwrap();
        assert_eq!(Some(schema.program_id), config.program_id);
        assert!(schema.instruction("delegate").is_ok());
    }

    #[test]
    fn world_schema_respects_program_id() {
        let config = ClientConfig::from_json(
            r#"{ "programName": "world", "programId": "11111111111111111111111111111112" }"#,
        )
        .unwrap();
        let schema = config.load_schema().unwrap();
        assert_eq!(schema.program_id.to_string(), "11111111111111111111111111111112");
        assert_eq!(schema.instructions.len(), 14);
    }

    #[test]
    fn unknown_program_without_idl_is_an_error() {
        let config = ClientConfig::from_json(r#"{ "programName": "counter" }"#).unwrap();
        assert!(matches!(config.load_schema(), Err(WorldError::Config(_))));
    }

    #[test]
    fn bad_program_id_is_a_config_error() {
        let result = ClientConfig::from_json(r#"{ "programName": "world", "programId": "0OIl" }"#);
        assert!(matches!(result, Err(WorldError::Config(_))));
    }

    #[test]
    fn missing_program_name_is_a_config_error() {
        assert!(matches!(
            ClientConfig::from_json("{}"),
            Err(WorldError::Config(_))
        ));
    }

    #[test]
    fn relative_idl_path_resolves_against_config_dir() {
        let mut config = ClientConfig::from_json(
            r#"{ "programName": "world", "idlPath": "idl/world.json" }"#,
        )
        .unwrap();
        assert_eq!(config.resolved_idl_path(), Some(PathBuf::from("idl/world.json")));

        config.base_dir = Some(PathBuf::from("/opt/game"));
        assert_eq!(
            config.resolved_idl_path(),
            Some(PathBuf::from("/opt/game/idl/world.json"))
        );
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(matches!(
            ClientConfig::from_file("/nonexistent/.solitarc.json"),
            Err(WorldError::Config(_))
        ));
    }
}
