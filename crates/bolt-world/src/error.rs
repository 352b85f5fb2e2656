use thiserror::Error;

/// Errors raised while building, encoding, or decoding world instructions.
///
/// Every variant is a caller input error: nothing here is retryable, the
/// call site has to be fixed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("instruction `{instruction}` is missing required account `{role}`")]
    MissingAccount { instruction: String, role: String },

    #[error("instruction `{instruction}` has no account role `{role}`")]
    UnknownAccount { instruction: String, role: String },

    #[error("unknown instruction: {0}")]
    UnknownInstruction(String),

    #[error("cannot encode field `{field}`: {reason}")]
    Encoding { field: String, reason: String },

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("IDL error: {0}")]
    Idl(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("PDA derivation error: {0}")]
    Pda(String),
}

impl WorldError {
    pub(crate) fn encoding(field: &str, reason: impl Into<String>) -> Self {
        WorldError::Encoding {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_account() {
        let err = WorldError::MissingAccount {
            instruction: "add_entity".into(),
            role: "payer".into(),
        };
        assert_eq!(
            err.to_string(),
            "instruction `add_entity` is missing required account `payer`"
        );
    }

    #[test]
    fn display_unknown_account() {
        let err = WorldError::UnknownAccount {
            instruction: "apply".into(),
            role: "bolt_sytem".into(),
        };
        assert_eq!(
            err.to_string(),
            "instruction `apply` has no account role `bolt_sytem`"
        );
    }

    #[test]
    fn display_encoding() {
        let err = WorldError::encoding("world_id", "expected u64, got string");
        assert_eq!(
            err.to_string(),
            "cannot encode field `world_id`: expected u64, got string"
        );
    }

    #[test]
    fn display_decoding() {
        let err = WorldError::Decoding("unexpected end of data".into());
        assert_eq!(err.to_string(), "decoding error: unexpected end of data");
    }

    #[test]
    fn display_unknown_instruction() {
        let err = WorldError::UnknownInstruction("apply9".into());
        assert_eq!(err.to_string(), "unknown instruction: apply9");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(WorldError::Idl("no instructions".into()));
        assert!(err.to_string().contains("no instructions"));
    }

    #[test]
    fn debug_format_works() {
        let err = WorldError::Pda("seed too long".into());
        let debug = format!("{:?}", err);
        assert!(debug.contains("Pda"));
    }
}
