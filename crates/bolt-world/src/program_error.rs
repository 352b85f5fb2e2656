//! Custom errors returned by the world program.
//!
//! Anchor numbers custom errors from 6000 upward in declaration order. A
//! failed transaction reports the bare code; [`WorldProgramError::from_code`]
//! maps it back.

use thiserror::Error;

/// First custom error code Anchor assigns.
pub const ERROR_CODE_OFFSET: u32 = 6000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldProgramError {
    #[error("Invalid authority for instruction")]
    InvalidAuthority,

    #[error("The system has to return the same number of components it received")]
    InvalidSystemOutput,

    #[error("The provided world account does not match the expected PDA")]
    WorldAccountMismatch,

    #[error("Exceed the maximum number of authorities")]
    TooManyAuthorities,

    #[error("The provided authority not found")]
    AuthorityNotFound,

    #[error("The system is not approved in this world instance")]
    SystemNotApproved,
}

const ALL: [WorldProgramError; 6] = [
    WorldProgramError::InvalidAuthority,
    WorldProgramError::InvalidSystemOutput,
    WorldProgramError::WorldAccountMismatch,
    WorldProgramError::TooManyAuthorities,
    WorldProgramError::AuthorityNotFound,
    WorldProgramError::SystemNotApproved,
];

impl WorldProgramError {
    pub fn code(self) -> u32 {
        ERROR_CODE_OFFSET + self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        let index = code.checked_sub(ERROR_CODE_OFFSET)?;
        ALL.get(index as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            WorldProgramError::InvalidAuthority => "InvalidAuthority",
            WorldProgramError::InvalidSystemOutput => "InvalidSystemOutput",
            WorldProgramError::WorldAccountMismatch => "WorldAccountMismatch",
            WorldProgramError::TooManyAuthorities => "TooManyAuthorities",
            WorldProgramError::AuthorityNotFound => "AuthorityNotFound",
            WorldProgramError::SystemNotApproved => "SystemNotApproved",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_start_at_6000() {
        assert_eq!(WorldProgramError::InvalidAuthority.code(), 6000);
        assert_eq!(WorldProgramError::SystemNotApproved.code(), 6005);
    }

    #[test]
    fn from_code_roundtrip() {
        for err in ALL {
            assert_eq!(WorldProgramError::from_code(err.code()), Some(err));
        }
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(WorldProgramError::from_code(0), None);
        assert_eq!(WorldProgramError::from_code(5999), None);
        assert_eq!(WorldProgramError::from_code(6006), None);
    }

    #[test]
    fn display_and_name() {
        let err = WorldProgramError::AuthorityNotFound;
        assert_eq!(err.to_string(), "The provided authority not found");
        assert_eq!(err.name(), "AuthorityNotFound");
    }
}
