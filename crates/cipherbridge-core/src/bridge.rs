//! The status-code boundary: raw request in, status and output length out

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, trace};

use crate::catalog::{self, AlgorithmSpec, KeySizeRule, Profile};
use crate::config::BridgeConfig;
use crate::dispatch;
use crate::error::{BridgeError, BridgeResult};
use crate::kdf;
use crate::status::StatusCode;
use crate::types::{AlgorithmId, ModeId, Operation};
use crate::validate::{validate_key_size, validate_mode};
use crate::{BLOCK_HEADROOM, KDF_SALT, MIN_PASSWORD_LEN, TAG_SIZE};

/// One encrypt or decrypt call, with ids exactly as received from the caller.
#[derive(Debug, Clone, Copy)]
pub struct CryptoRequest<'a> {
    pub algorithm: i32,
    pub mode: i32,
    pub key_size_bits: i32,
    pub operation: i32,
    pub password: Option<&'a [u8]>,
    pub input: Option<&'a [u8]>,
}

/// Caller-owned destinations. Capacity of each is its slice length.
#[derive(Debug, Default)]
pub struct CryptoBuffers<'a> {
    pub output: Option<&'a mut [u8]>,
    /// Receives the derived IV when present.
    pub iv: Option<&'a mut [u8]>,
    /// GCM only: receives the tag on encrypt, supplies it on decrypt.
    pub auth_tag: Option<&'a mut [u8]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub status: StatusCode,
    /// Bytes written on success; the required size after a sizing failure; 0
    /// if the request was rejected before sizing.
    pub output_len: usize,
    /// False when the request was rejected before its output size was known.
    /// `output_len` carries no information then.
    pub sized: bool,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Stateless entry point. The profile is fixed per value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bridge {
    profile: Profile,
}

impl Bridge {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.profile)
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Run one request. Never panics; every failure becomes a status code.
    pub fn process(&self, request: &CryptoRequest<'_>, buffers: CryptoBuffers<'_>) -> Outcome {
        let mut reported = None;
        match self.run(request, buffers, &mut reported) {
            Ok(written) => {
                trace!(
                    algorithm = request.algorithm,
                    mode = request.mode,
                    operation = request.operation,
                    output_len = written,
                    "request completed"
                );
                Outcome {
                    status: StatusCode::Success,
                    output_len: written,
                    sized: true,
                }
            }
            Err(e) => {
                let status = e.status();
                if let BridgeError::Unknown(_) = e {
                    error!(
                        algorithm = request.algorithm,
                        mode = request.mode,
                        error = %e,
                        "request aborted"
                    );
                } else {
                    debug!(
                        algorithm = request.algorithm,
                        mode = request.mode,
                        key_size_bits = request.key_size_bits,
                        status = status.as_raw(),
                        error = %e,
                        "request rejected"
                    );
                }
                Outcome {
                    status,
                    output_len: reported.unwrap_or(0),
                    sized: reported.is_some(),
                }
            }
        }
    }

    /// [`Bridge::process`] without the status mapping. `reported` follows the
    /// same output-length rules as [`Outcome::output_len`].
    pub(crate) fn run(
        &self,
        request: &CryptoRequest<'_>,
        buffers: CryptoBuffers<'_>,
        reported: &mut Option<usize>,
    ) -> BridgeResult<usize> {
        panic::catch_unwind(AssertUnwindSafe(|| self.execute(request, buffers, reported)))
            .unwrap_or_else(|_| {
                Err(BridgeError::Unknown(
                    "panic caught at the bridge boundary".into(),
                ))
            })
    }

    fn execute(
        &self,
        request: &CryptoRequest<'_>,
        buffers: CryptoBuffers<'_>,
        reported: &mut Option<usize>,
    ) -> BridgeResult<usize> {
        let CryptoBuffers {
            output,
            iv: iv_out,
            auth_tag,
        } = buffers;
        let (Some(password), Some(input), Some(output)) = (request.password, request.input, output)
        else {
            return Err(BridgeError::InvalidParams(
                "password, input and output are required",
            ));
        };

        if password.len() < MIN_PASSWORD_LEN {
            return Err(BridgeError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        if input.is_empty() {
            return Err(BridgeError::InvalidParams("input is empty"));
        }
        if output.is_empty() {
            return Err(BridgeError::InvalidParams("output buffer has no capacity"));
        }
        let operation = Operation::from_raw(request.operation)
            .ok_or(BridgeError::InvalidParams("unknown operation"))?;

        let spec = validate_key_size(self.profile, request.algorithm, request.key_size_bits)?;
        let mode = validate_mode(self.profile, request.algorithm, request.mode)?;

        // the tag buffer only takes part in GCM
        let auth_tag = if mode.is_aead() { auth_tag } else { None };
        let required = output_len_for(spec, mode, operation, input.len(), auth_tag.is_some());
        *reported = Some(required);
        if output.len() < required {
            return Err(BridgeError::OutputBufferTooSmall { required });
        }

        if iv_out.as_deref().is_some_and(|buf| buf.len() < spec.iv_len) {
            return Err(BridgeError::InvalidParams("IV buffer is shorter than the IV"));
        }
        let tag = match auth_tag {
            Some(buf) => Some(
                buf.get_mut(..TAG_SIZE)
                    .and_then(|head| <&mut [u8; TAG_SIZE]>::try_from(head).ok())
                    .ok_or(BridgeError::InvalidParams(
                        "auth tag buffer is shorter than 16 bytes",
                    ))?,
            ),
            None => None,
        };

        if !dispatch::has_backend(spec.id) {
            return Err(BridgeError::UnsupportedAlgorithm(request.algorithm));
        }

        let key_len = (request.key_size_bits / 8) as usize;
        let material = kdf::derive(password, KDF_SALT, key_len, spec.iv_len)?;
        if let Some(iv_out) = iv_out {
            iv_out[..spec.iv_len].copy_from_slice(material.iv());
        }

        let result = dispatch::transform(
            spec.id,
            mode,
            operation,
            material.key(),
            material.iv(),
            input,
            tag,
        )?;
        if result.len() > output.len() {
            *reported = Some(result.len());
            return Err(BridgeError::OutputBufferTooSmall {
                required: result.len(),
            });
        }
        output[..result.len()].copy_from_slice(&result);
        Ok(result.len())
    }

    /// Output capacity `request` needs, after the same checks `process` runs
    /// before sizing. The password is not inspected.
    pub fn required_output_len(
        &self,
        request: &CryptoRequest<'_>,
        detached_tag: bool,
    ) -> BridgeResult<usize> {
        let operation = Operation::from_raw(request.operation)
            .ok_or(BridgeError::InvalidParams("unknown operation"))?;
        let spec = validate_key_size(self.profile, request.algorithm, request.key_size_bits)?;
        let mode = validate_mode(self.profile, request.algorithm, request.mode)?;
        let input_len = request.input.map_or(0, <[u8]>::len);
        Ok(output_len_for(
            spec,
            mode,
            operation,
            input_len,
            detached_tag && mode.is_aead(),
        ))
    }

    /// Algorithms in this profile that validate and have a cipher backend.
    pub fn supported_algorithms(&self) -> Vec<AlgorithmId> {
        catalog::all()
            .iter()
            .filter(|spec| {
                self.profile.includes(spec)
                    && spec.key_sizes != KeySizeRule::Unavailable
                    && dispatch::has_backend(spec.id)
            })
            .map(|spec| spec.id)
            .collect()
    }

    /// Modes `algorithm` accepts in this profile; empty if the algorithm is
    /// not supported at all.
    pub fn supported_modes(&self, algorithm: i32) -> Vec<ModeId> {
        let Some(spec) = catalog::lookup(algorithm) else {
            return Vec::new();
        };
        if !self.supported_algorithms().contains(&spec.id) {
            return Vec::new();
        }
        ModeId::ALL
            .iter()
            .copied()
            .filter(|mode| validate_mode(self.profile, algorithm, mode.as_raw()).is_ok())
            .collect()
    }

    /// Key sizes in bits that `algorithm` accepts in this profile.
    pub fn supported_key_sizes(&self, algorithm: i32) -> Vec<i32> {
        match catalog::lookup(algorithm) {
            Some(spec) if self.profile.includes(spec) => spec.key_sizes.sizes(),
            _ => Vec::new(),
        }
    }

    /// IV length for `algorithm`, independent of profile.
    pub fn iv_len(algorithm: i32) -> Option<usize> {
        catalog::lookup(algorithm).map(|spec| spec.iv_len)
    }
}

fn output_len_for(
    spec: &AlgorithmSpec,
    mode: ModeId,
    operation: Operation,
    input_len: usize,
    detached_tag: bool,
) -> usize {
    // one padding block, never less than the fixed headroom
    let headroom = spec.block_size().map_or(BLOCK_HEADROOM, |bs| bs.max(BLOCK_HEADROOM));
    match (operation, mode) {
        (Operation::Encrypt, ModeId::Gcm) if detached_tag => input_len,
        (Operation::Encrypt, ModeId::Gcm) => input_len + TAG_SIZE,
        (Operation::Encrypt, _) => input_len + headroom,
        (Operation::Decrypt, _) => input_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(alg: AlgorithmId, mode: ModeId, bits: i32, input: &'a [u8]) -> CryptoRequest<'a> {
        CryptoRequest {
            algorithm: alg.as_raw(),
            mode: mode.as_raw(),
            key_size_bits: bits,
            operation: Operation::Encrypt.as_raw(),
            password: Some(&b"longpassword123"[..]),
            input: Some(input),
        }
    }

    #[test]
    fn test_output_len_for() {
        let aes = catalog::spec(AlgorithmId::Aes);
        let chacha = catalog::spec(AlgorithmId::ChaCha20);
        let blowfish = catalog::spec(AlgorithmId::Blowfish);
        assert_eq!(output_len_for(aes, ModeId::Cbc, Operation::Encrypt, 16, false), 32);
        assert_eq!(output_len_for(chacha, ModeId::Ctr, Operation::Encrypt, 37, false), 53);
        assert_eq!(output_len_for(blowfish, ModeId::Cbc, Operation::Encrypt, 8, false), 24);
        assert_eq!(output_len_for(aes, ModeId::Gcm, Operation::Encrypt, 10, true), 10);
        assert_eq!(output_len_for(aes, ModeId::Gcm, Operation::Encrypt, 10, false), 26);
        assert_eq!(output_len_for(aes, ModeId::Cbc, Operation::Decrypt, 32, false), 32);
        assert_eq!(output_len_for(aes, ModeId::Gcm, Operation::Decrypt, 26, false), 26);
    }

    #[test]
    fn test_output_len_for_wide_blocks() {
        let threefish = catalog::spec(AlgorithmId::Threefish1024);
        assert_eq!(output_len_for(threefish, ModeId::Cbc, Operation::Encrypt, 5, false), 133);
        assert_eq!(output_len_for(threefish, ModeId::Ctr, Operation::Encrypt, 5, false), 133);
        assert_eq!(output_len_for(threefish, ModeId::Cbc, Operation::Decrypt, 128, false), 128);
    }

    #[test]
    fn test_required_output_len_validates_first() {
        let bridge = Bridge::default();
        let req = request(AlgorithmId::Aes, ModeId::Cbc, 100, b"abc");
        assert!(matches!(
            bridge.required_output_len(&req, false),
            Err(BridgeError::InvalidKeySize { bits: 100, .. })
        ));
        let req = request(AlgorithmId::Aes, ModeId::Gcm, 128, b"abc");
        assert_eq!(bridge.required_output_len(&req, true).unwrap(), 3);
        assert_eq!(bridge.required_output_len(&req, false).unwrap(), 19);
    }

    #[test]
    fn test_supported_algorithms_full() {
        let algs = Bridge::default().supported_algorithms();
        assert_eq!(algs.len(), 27);
        assert!(algs.contains(&AlgorithmId::Aes));
        assert!(algs.contains(&AlgorithmId::Rc4));
        assert!(algs.contains(&AlgorithmId::Rc6));
        assert!(algs.contains(&AlgorithmId::Threefish1024));
        assert!(!algs.contains(&AlgorithmId::Mars));
        assert!(!algs.contains(&AlgorithmId::Lucifer));
    }

    #[test]
    fn test_supported_algorithms_minimal() {
        let algs = Bridge::new(Profile::Minimal).supported_algorithms();
        assert_eq!(
            algs,
            vec![
                AlgorithmId::Aes,
                AlgorithmId::Serpent,
                AlgorithmId::Twofish,
                AlgorithmId::Rc6,
                AlgorithmId::Blowfish,
                AlgorithmId::Cast128
            ]
        );
    }

    #[test]
    fn test_supported_modes() {
        let bridge = Bridge::default();
        assert_eq!(bridge.supported_modes(AlgorithmId::Aes.as_raw()), ModeId::ALL.to_vec());
        assert_eq!(bridge.supported_modes(AlgorithmId::ChaCha20.as_raw()), vec![ModeId::Ctr]);
        assert_eq!(
            bridge.supported_modes(AlgorithmId::Blowfish.as_raw()),
            vec![ModeId::Cbc, ModeId::Ecb, ModeId::Cfb, ModeId::Ofb, ModeId::Ctr]
        );
        assert!(bridge.supported_modes(AlgorithmId::Mars.as_raw()).is_empty());
        assert!(bridge.supported_modes(0).is_empty());

        let minimal = Bridge::new(Profile::Minimal);
        assert!(!minimal.supported_modes(AlgorithmId::Twofish.as_raw()).contains(&ModeId::Gcm));
    }

    #[test]
    fn test_supported_key_sizes() {
        let bridge = Bridge::default();
        assert_eq!(bridge.supported_key_sizes(AlgorithmId::Aes.as_raw()), vec![128, 192, 256]);
        assert_eq!(bridge.supported_key_sizes(AlgorithmId::Rc2.as_raw()), vec![40, 64, 128]);
        assert!(bridge.supported_key_sizes(AlgorithmId::Simon.as_raw()).is_empty());
        assert!(Bridge::new(Profile::Minimal)
            .supported_key_sizes(AlgorithmId::Aria.as_raw())
            .is_empty());
    }

    #[test]
    fn test_iv_len() {
        assert_eq!(Bridge::iv_len(AlgorithmId::ChaCha20.as_raw()), Some(12));
        assert_eq!(Bridge::iv_len(AlgorithmId::XSalsa20.as_raw()), Some(24));
        assert_eq!(Bridge::iv_len(AlgorithmId::Des.as_raw()), Some(8));
        assert_eq!(Bridge::iv_len(44), None);
    }

    #[test]
    fn test_from_config() {
        let config = BridgeConfig {
            profile: Profile::Minimal,
            ..Default::default()
        };
        assert_eq!(Bridge::from_config(&config).profile(), Profile::Minimal);
    }

    #[test]
    fn test_outcome_marks_unsized_rejections() {
        let bridge = Bridge::default();
        let input = [0u8; 16];
        let mut output = [0u8; 64];

        let mut short_password = request(AlgorithmId::Aes, ModeId::Cbc, 128, &input);
        short_password.password = Some(&b"short"[..]);
        let buffers = CryptoBuffers {
            output: Some(&mut output[..]),
            ..Default::default()
        };
        let outcome = bridge.process(&short_password, buffers);
        assert_eq!(outcome.status, StatusCode::PasswordTooShort);
        assert!(!outcome.sized);

        let req = request(AlgorithmId::Aes, ModeId::Cbc, 128, &input);
        let buffers = CryptoBuffers {
            output: Some(&mut output[..8]),
            ..Default::default()
        };
        let outcome = bridge.process(&req, buffers);
        assert_eq!(outcome.status, StatusCode::OutputBufferTooSmall);
        assert!(outcome.sized);
        assert_eq!(outcome.output_len, 32);

        let buffers = CryptoBuffers {
            output: Some(&mut output[..]),
            ..Default::default()
        };
        let outcome = bridge.process(&req, buffers);
        assert!(outcome.is_success());
        assert!(outcome.sized);
    }
}
