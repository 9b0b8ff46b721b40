//! Closed set of outcomes returned across the boundary

/// Exactly one status is returned per call. Values are part of the C ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StatusCode {
    Success = 0,
    InvalidParams = -1,
    UnsupportedAlgorithm = -2,
    UnsupportedMode = -3,
    InvalidKeySize = -4,
    MemoryError = -5,
    CryptoError = -6,
    PasswordTooShort = -7,
    OutputBufferTooSmall = -8,
    UnknownError = -9,
}

impl StatusCode {
    pub const ALL: [StatusCode; 10] = [
        StatusCode::Success,
        StatusCode::InvalidParams,
        StatusCode::UnsupportedAlgorithm,
        StatusCode::UnsupportedMode,
        StatusCode::InvalidKeySize,
        StatusCode::MemoryError,
        StatusCode::CryptoError,
        StatusCode::PasswordTooShort,
        StatusCode::OutputBufferTooSmall,
        StatusCode::UnknownError,
    ];

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_raw() == raw)
    }

    pub fn is_success(self) -> bool {
        self == StatusCode::Success
    }

    /// Only `OutputBufferTooSmall` can be fixed by retrying the same request.
    pub fn is_retryable(self) -> bool {
        self == StatusCode::OutputBufferTooSmall
    }

    pub fn message(self) -> &'static str {
        match self {
            StatusCode::Success => "Success",
            StatusCode::InvalidParams => "Invalid parameters",
            StatusCode::UnsupportedAlgorithm => "Unsupported algorithm",
            StatusCode::UnsupportedMode => "Unsupported mode",
            StatusCode::InvalidKeySize => "Invalid key size",
            StatusCode::MemoryError => "Memory error",
            StatusCode::CryptoError => "Cryptographic error",
            StatusCode::PasswordTooShort => "Password too short",
            StatusCode::OutputBufferTooSmall => "Output buffer too small",
            StatusCode::UnknownError => "Unknown error",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.as_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_values_are_stable() {
        let raws: Vec<i32> = StatusCode::ALL.iter().map(|s| s.as_raw()).collect();
        assert_eq!(raws, vec![0, -1, -2, -3, -4, -5, -6, -7, -8, -9]);
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(StatusCode::from_raw(-8), Some(StatusCode::OutputBufferTooSmall));
        assert_eq!(StatusCode::from_raw(1), None);
        assert_eq!(StatusCode::from_raw(-10), None);
    }

    #[test]
    fn test_only_buffer_size_is_retryable() {
        for status in StatusCode::ALL {
            assert_eq!(status.is_retryable(), status == StatusCode::OutputBufferTooSmall);
        }
    }
}
