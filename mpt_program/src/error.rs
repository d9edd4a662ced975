use pinocchio::program_error::ProgramError;
use pinocchio_log::log;

/// Custom error codes returned by the verifier, offset like Anchor's `#[error_code]`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MptError {
    InvalidInstruction = 6_000,
    InvalidProofAccount,
    AuthorityMismatch,
    ProofTooLarge,
    ProofOverflow,
    MergeWithoutNode,
    IncompleteProof,
    CorruptProof,
    InvalidProof,
    KeyNotFound,
    AlreadyVerified,
    InvalidSeeds,
}

impl MptError {
    pub const ALL: [MptError; 12] = [
        MptError::InvalidInstruction,
        MptError::InvalidProofAccount,
        MptError::AuthorityMismatch,
        MptError::ProofTooLarge,
        MptError::ProofOverflow,
        MptError::MergeWithoutNode,
        MptError::IncompleteProof,
        MptError::CorruptProof,
        MptError::InvalidProof,
        MptError::KeyNotFound,
        MptError::AlreadyVerified,
        MptError::InvalidSeeds,
    ];

    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|error| error.code() == code)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            MptError::InvalidInstruction => "InvalidInstruction",
            MptError::InvalidProofAccount => "InvalidProofAccount",
            MptError::AuthorityMismatch => "AuthorityMismatch",
            MptError::ProofTooLarge => "ProofTooLarge",
            MptError::ProofOverflow => "ProofOverflow",
            MptError::MergeWithoutNode => "MergeWithoutNode",
            MptError::IncompleteProof => "IncompleteProof",
            MptError::CorruptProof => "CorruptProof",
            MptError::InvalidProof => "InvalidProof",
            MptError::KeyNotFound => "KeyNotFound",
            MptError::AlreadyVerified => "AlreadyVerified",
            MptError::InvalidSeeds => "InvalidSeeds",
        }
    }

    #[must_use]
    pub const fn msg(self) -> &'static str {
        match self {
            MptError::InvalidInstruction => "Instruction data could not be decoded",
            MptError::InvalidProofAccount => "Account is not a proof account of this program",
            MptError::AuthorityMismatch => "Signer is not the proof authority",
            MptError::ProofTooLarge => "Proof does not fit in a single account",
            MptError::ProofOverflow => "Appended nodes exceed the declared proof size",
            MptError::MergeWithoutNode => "Cannot merge into a proof without nodes",
            MptError::IncompleteProof => "Proof has not been fully uploaded",
            MptError::CorruptProof => "Stored proof body is malformed",
            MptError::InvalidProof => "Proof does not verify against the root",
            MptError::KeyNotFound => "Proof shows the key is absent from the trie",
            MptError::AlreadyVerified => "Proof has already been verified",
            MptError::InvalidSeeds => "Proof account does not match the root seeds",
        }
    }

    /// Logs the error name and message with [`pinocchio_log`].
    pub fn log(self) {
        log!("MptError: {} - {}", self.name(), self.msg());
    }
}

impl From<MptError> for ProgramError {
    fn from(error: MptError) -> Self {
        ProgramError::Custom(error.code())
    }
}

impl core::fmt::Display for MptError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.msg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn codes_are_sequential_from_6000() {
        for (offset, error) in MptError::ALL.into_iter().enumerate() {
            assert_eq!(error.code(), 6_000 + offset as u32);
            assert_eq!(MptError::from_code(error.code()), Some(error));
        }
        assert_eq!(MptError::from_code(42), None);
        assert_eq!(MptError::InvalidSeeds.code(), 6_011);
    }

    #[test]
    fn converts_to_custom_program_error() {
        assert_eq!(
            ProgramError::from(MptError::KeyNotFound),
            ProgramError::Custom(6_009)
        );
    }
}
