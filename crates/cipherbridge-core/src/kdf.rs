//! Key derivation: password → cipher key and IV via PBKDF2-HMAC-SHA256

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{BridgeResult, CryptoFailure};
use crate::KDF_ITERATIONS;

const KEY_PURPOSE: u8 = 0x00;
const IV_PURPOSE: u8 = 0x01;

/// Key and IV derived from one password.
///
/// Zeroized on drop. Never logged.
pub struct DerivedMaterial {
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl DerivedMaterial {
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }
}

impl Drop for DerivedMaterial {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

impl std::fmt::Debug for DerivedMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedMaterial")
            .field("key", &"[REDACTED]")
            .field("key_len", &self.key.len())
            .field("iv_len", &self.iv.len())
            .finish()
    }
}

fn stretch(password: &[u8], salt: &[u8], purpose: u8, len: usize) -> BridgeResult<Vec<u8>> {
    let mut labelled = Vec::new();
    labelled
        .try_reserve_exact(salt.len() + 1)
        .map_err(|_| CryptoFailure::KeyDerivation)?;
    labelled.extend_from_slice(salt);
    labelled.push(purpose);

    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| CryptoFailure::KeyDerivation)?;
    out.resize(len, 0);
    pbkdf2_hmac::<Sha256>(password, &labelled, KDF_ITERATIONS, &mut out);
    Ok(out)
}

/// Derive `key_len` key bytes and `iv_len` IV bytes from `password` and `salt`.
///
/// Deterministic: the same inputs always give the same material. Key and IV
/// come from separate PBKDF2 runs over `salt || 0x00` and `salt || 0x01`.
pub fn derive(
    password: &[u8],
    salt: &[u8],
    key_len: usize,
    iv_len: usize,
) -> BridgeResult<DerivedMaterial> {
    let key = stretch(password, salt, KEY_PURPOSE, key_len)?;
    let iv = stretch(password, salt, IV_PURPOSE, iv_len)?;
    Ok(DerivedMaterial { key, iv })
}
