//! cipherbridge-core: password-based symmetric encryption behind one status-code boundary
//!
//! Architecture: validate, derive, dispatch, copy out.
//!
//! Pipeline: raw request → input checks → rule tables → PBKDF2 key/IV → cipher transform → caller buffer
//!
//! Derivation:
//! ```text
//! password (>= 8 bytes)
//!   ├── key = PBKDF2-HMAC-SHA256(password, KDF_SALT || 0x00, 10_000, key_size_bits / 8)
//!   └── iv  = PBKDF2-HMAC-SHA256(password, KDF_SALT || 0x01, 10_000, iv_len(algorithm))
//! ```
//!
//! The salt is a compile-time constant, so equal passwords always produce equal
//! keys. Callers that need per-message uniqueness must vary the password.

pub mod bridge;
pub mod catalog;
pub mod ciphers;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod kdf;
pub mod seal;
pub mod status;
pub mod types;
pub mod validate;

pub use bridge::{Bridge, CryptoBuffers, CryptoRequest, Outcome};
pub use catalog::{AlgorithmSpec, KeySizeRule, Profile, Shape};
pub use config::{BridgeConfig, LogFormat, LoggingConfig};
pub use error::{BridgeError, BridgeResult, CryptoFailure};
pub use kdf::{derive, DerivedMaterial};
pub use seal::{CipherSpec, Sealed};
pub use status::StatusCode;
pub use types::{AlgorithmId, ModeId, Operation};

/// Version reported across the C boundary
pub const BRIDGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shortest password accepted by the boundary, in bytes
pub const MIN_PASSWORD_LEN: usize = 8;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Output headroom reserved when encrypting under a non-AEAD mode
pub const BLOCK_HEADROOM: usize = 16;

/// PBKDF2-HMAC-SHA256 rounds for both key and IV
pub const KDF_ITERATIONS: u32 = 10_000;

/// Application-wide PBKDF2 salt.
///
/// Fixed and public: identical passwords yield identical keys and IVs across
/// calls. This keeps ciphertexts reproducible without storing a salt.
pub const KDF_SALT: &[u8; 16] = b"CryptingTool2024";
