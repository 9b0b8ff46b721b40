//! Owned-buffer wrapper over [`Bridge::process`]
//!
//! Sizes every buffer from the same rules the boundary enforces, so callers
//! never see `OutputBufferTooSmall`.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::bridge::{Bridge, CryptoBuffers, CryptoRequest};
use crate::error::BridgeResult;
use crate::types::{AlgorithmId, ModeId, Operation};
use crate::TAG_SIZE;

/// Algorithm, mode and key size for a seal/open pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherSpec {
    pub algorithm: AlgorithmId,
    pub mode: ModeId,
    pub key_size_bits: i32,
}

impl CipherSpec {
    pub fn new(algorithm: AlgorithmId, mode: ModeId, key_size_bits: i32) -> Self {
        Self {
            algorithm,
            mode,
            key_size_bits,
        }
    }

    fn request<'a>(
        &self,
        operation: Operation,
        password: &'a [u8],
        input: &'a [u8],
    ) -> CryptoRequest<'a> {
        CryptoRequest {
            algorithm: self.algorithm.as_raw(),
            mode: self.mode.as_raw(),
            key_size_bits: self.key_size_bits,
            operation: operation.as_raw(),
            password: Some(password),
            input: Some(input),
        }
    }
}

/// Result of [`Bridge::seal`]. Under GCM the tag is kept apart from the
/// ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
    pub tag: Option<[u8; TAG_SIZE]>,
}

impl Bridge {
    /// Encrypt `plaintext` under a key derived from `password`.
    ///
    /// Fails with `InvalidParams` on empty plaintext, like the raw boundary.
    pub fn seal(
        &self,
        spec: &CipherSpec,
        password: &SecretString,
        plaintext: &[u8],
    ) -> BridgeResult<Sealed> {
        let request = spec.request(
            Operation::Encrypt,
            password.expose_secret().as_bytes(),
            plaintext,
        );
        let detached = spec.mode.is_aead();
        let capacity = self.required_output_len(&request, detached)?;

        let mut ciphertext = vec![0u8; capacity];
        let mut iv = vec![0u8; Bridge::iv_len(request.algorithm).unwrap_or(0)];
        let mut tag = [0u8; TAG_SIZE];
        let buffers = CryptoBuffers {
            output: Some(&mut ciphertext[..]),
            iv: Some(&mut iv[..]),
            auth_tag: detached.then_some(&mut tag[..]),
        };
        let written = self.run(&request, buffers, &mut None)?;
        ciphertext.truncate(written);

        Ok(Sealed {
            ciphertext,
            iv,
            tag: detached.then_some(tag),
        })
    }

    /// Decrypt output of [`Bridge::seal`]. `tag` is required for GCM unless
    /// it was appended to `ciphertext`.
    pub fn open(
        &self,
        spec: &CipherSpec,
        password: &SecretString,
        ciphertext: &[u8],
        tag: Option<&[u8; TAG_SIZE]>,
    ) -> BridgeResult<Zeroizing<Vec<u8>>> {
        let request = spec.request(
            Operation::Decrypt,
            password.expose_secret().as_bytes(),
            ciphertext,
        );
        let capacity = self.required_output_len(&request, tag.is_some())?;

        let mut plaintext = Zeroizing::new(vec![0u8; capacity]);
        let mut tag = tag.copied();
        let buffers = CryptoBuffers {
            output: Some(&mut plaintext[..]),
            iv: None,
            auth_tag: tag.as_mut().map(|t| &mut t[..]),
        };
        let written = self.run(&request, buffers, &mut None)?;
        plaintext.truncate(written);
        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Profile;
    use crate::error::{BridgeError, CryptoFailure};

    fn password() -> SecretString {
        SecretString::from("correct horse battery staple")
    }

    #[test]
    fn test_seal_open_cbc() {
        let bridge = Bridge::default();
        let spec = CipherSpec::new(AlgorithmId::Twofish, ModeId::Cbc, 256);
        let sealed = bridge.seal(&spec, &password(), b"hello cipherbridge").unwrap();

        assert_eq!(sealed.ciphertext.len(), 32);
        assert_eq!(sealed.iv.len(), 16);
        assert!(sealed.tag.is_none());

        let opened = bridge
            .open(&spec, &password(), &sealed.ciphertext, None)
            .unwrap();
        assert_eq!(opened.as_slice(), b"hello cipherbridge");
    }

    #[test]
    fn test_seal_open_gcm_detached_tag() {
        let bridge = Bridge::default();
        let spec = CipherSpec::new(AlgorithmId::Aes, ModeId::Gcm, 128);
        let sealed = bridge.seal(&spec, &password(), b"authenticated").unwrap();

        assert_eq!(sealed.ciphertext.len(), 13);
        let tag = sealed.tag.expect("GCM seal must produce a tag");

        let opened = bridge
            .open(&spec, &password(), &sealed.ciphertext, Some(&tag))
            .unwrap();
        assert_eq!(opened.as_slice(), b"authenticated");

        let mut bad_tag = tag;
        bad_tag[3] ^= 0x10;
        let err = bridge
            .open(&spec, &password(), &sealed.ciphertext, Some(&bad_tag))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Crypto(CryptoFailure::Authentication)));
    }

    #[test]
    fn test_open_gcm_with_appended_tag() {
        let bridge = Bridge::default();
        let spec = CipherSpec::new(AlgorithmId::Aria, ModeId::Gcm, 192);
        let sealed = bridge.seal(&spec, &password(), b"inline tag").unwrap();

        let mut joined = sealed.ciphertext.clone();
        joined.extend_from_slice(&sealed.tag.unwrap());
        let opened = bridge.open(&spec, &password(), &joined, None).unwrap();
        assert_eq!(opened.as_slice(), b"inline tag");
    }

    #[test]
    fn test_seal_is_deterministic() {
        let bridge = Bridge::default();
        let spec = CipherSpec::new(AlgorithmId::ChaCha20, ModeId::Ctr, 256);
        let a = bridge.seal(&spec, &password(), b"same input").unwrap();
        let b = bridge.seal(&spec, &password(), b"same input").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.iv.len(), 12);
    }

    #[test]
    fn test_seal_rejects_what_the_boundary_rejects() {
        let bridge = Bridge::new(Profile::Minimal);
        let spec = CipherSpec::new(AlgorithmId::Camellia, ModeId::Cbc, 128);
        assert!(matches!(
            bridge.seal(&spec, &password(), b"x"),
            Err(BridgeError::UnsupportedAlgorithm(11))
        ));

        let short = SecretString::from("short");
        let spec = CipherSpec::new(AlgorithmId::Aes, ModeId::Cbc, 128);
        assert!(matches!(
            bridge.seal(&spec, &short, b"x"),
            Err(BridgeError::PasswordTooShort { min: 8 })
        ));
        assert!(matches!(
            bridge.seal(&spec, &password(), b""),
            Err(BridgeError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_cipher_spec_toml() {
        let spec: CipherSpec = toml::from_str(
            r#"
algorithm = "Serpent"
mode = "Ofb"
key_size_bits = 192
"#,
        )
        .unwrap();
        assert_eq!(spec, CipherSpec::new(AlgorithmId::Serpent, ModeId::Ofb, 192));
    }
}
