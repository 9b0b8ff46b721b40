use thiserror::Error;

use crate::status::StatusCode;
use crate::types::AlgorithmId;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Every internal failure. Each variant maps to exactly one [`StatusCode`].
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid parameters: {0}")]
    InvalidParams(&'static str),

    #[error("unsupported algorithm id {0}")]
    UnsupportedAlgorithm(i32),

    #[error("mode id {mode} is not available for algorithm id {algorithm}")]
    UnsupportedMode { algorithm: i32, mode: i32 },

    #[error("{bits}-bit keys are not valid for {algorithm}")]
    InvalidKeySize { algorithm: AlgorithmId, bits: i32 },

    #[error("password must be at least {min} bytes")]
    PasswordTooShort { min: usize },

    #[error("output buffer too small: {required} bytes required")]
    OutputBufferTooSmall { required: usize },

    #[error("memory allocation failed")]
    Memory,

    #[error("cryptographic operation failed: {0}")]
    Crypto(#[from] CryptoFailure),

    #[error("internal error: {0}")]
    Unknown(String),
}

/// Failures raised while configuring or running a cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CryptoFailure {
    #[error("cipher rejected a {len}-byte key")]
    KeyLength { len: usize },

    #[error("cipher rejected a {len}-byte IV")]
    IvLength { len: usize },

    #[error("invalid padding or ciphertext not block aligned")]
    Padding,

    #[error("authentication tag mismatch")]
    Authentication,

    #[error("ciphertext shorter than the authentication tag")]
    TruncatedCiphertext,

    #[error("message exceeds the cipher's length limit")]
    MessageTooLong,

    #[error("key derivation failed")]
    KeyDerivation,

    #[error("mode was not routed to a transform")]
    UnroutedMode,
}

impl BridgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::InvalidParams(_) => StatusCode::InvalidParams,
            BridgeError::UnsupportedAlgorithm(_) => StatusCode::UnsupportedAlgorithm,
            BridgeError::UnsupportedMode { .. } => StatusCode::UnsupportedMode,
            BridgeError::InvalidKeySize { .. } => StatusCode::InvalidKeySize,
            BridgeError::PasswordTooShort { .. } => StatusCode::PasswordTooShort,
            BridgeError::OutputBufferTooSmall { .. } => StatusCode::OutputBufferTooSmall,
            BridgeError::Memory => StatusCode::MemoryError,
            BridgeError::Crypto(_) => StatusCode::CryptoError,
            BridgeError::Unknown(_) => StatusCode::UnknownError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            BridgeError::InvalidParams("x").status(),
            StatusCode::InvalidParams
        );
        assert_eq!(
            BridgeError::Crypto(CryptoFailure::Authentication).status(),
            StatusCode::CryptoError
        );
        assert_eq!(
            BridgeError::OutputBufferTooSmall { required: 32 }.status(),
            StatusCode::OutputBufferTooSmall
        );
        assert_eq!(BridgeError::Memory.status(), StatusCode::MemoryError);
        assert_eq!(
            BridgeError::Unknown("panic".into()).status(),
            StatusCode::UnknownError
        );
    }

    #[test]
    fn test_key_size_message() {
        let err = BridgeError::InvalidKeySize {
            algorithm: AlgorithmId::Aes,
            bits: 100,
        };
        assert_eq!(err.to_string(), "100-bit keys are not valid for AES");
    }
}
