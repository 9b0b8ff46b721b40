//! Cipher dispatch: (algorithm, mode, operation) → concrete transform
//!
//! Three shapes:
//! - chained block modes: CBC/ECB (PKCS#7) and CFB/OFB/CTR (length-preserving)
//! - GCM over any 128-bit block cipher, tag detached or appended
//! - raw stream ciphers, keyed with the derived IV as nonce
//!
//! Inputs are assumed validated. Every transform runs in a single zeroizing
//! work buffer sized up front so it never reallocates.

use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::AeadInPlace;
use aes_gcm::AesGcm;
use aria::{Aria128, Aria192, Aria256};
use blowfish::Blowfish;
use camellia::{Camellia128, Camellia192, Camellia256};
use cast5::Cast5;
use cast6::Cast6;
use chacha20::ChaCha20;
use cipher::block_padding::Pkcs7;
use cipher::consts::{self, U16, U256, U8};
use cipher::generic_array::GenericArray;
use cipher::typenum::{IsLess, Le, NonZero};
use cipher::{
    AsyncStreamCipher, BlockCipher, BlockDecrypt, BlockDecryptMut, BlockEncrypt,
    BlockEncryptMut, BlockSizeUser, InnerIvInit, KeyInit, KeyIvInit, StreamCipher,
    StreamCipherCoreWrapper,
};
use ctr::flavors::{Ctr128BE, Ctr64BE, CtrFlavor};
use ctr::CtrCore;
use des::{Des, TdesEde3};
use hc_256::Hc256;
use idea::Idea;
use magma::Magma;
use ofb::OfbCore;
use rabbit::Rabbit;
use rc2::Rc2;
use rc4::Rc4;
use salsa20::{Salsa20, XSalsa20};
use serpent::Serpent;
use sm4::Sm4;
use threefish::{Threefish1024, Threefish256, Threefish512};
use twofish::Twofish;
use zeroize::Zeroizing;

use crate::catalog;
use crate::ciphers::{salsa20_short_key, Rc6, Tea, Xtea};
use crate::error::{BridgeError, BridgeResult, CryptoFailure};
use crate::types::{AlgorithmId, ModeId, Operation};
use crate::{BLOCK_HEADROOM, TAG_SIZE};

/// Whether a cipher implementation is linked for `algorithm`.
pub fn has_backend(algorithm: AlgorithmId) -> bool {
    use AlgorithmId as A;
    matches!(
        algorithm,
        A::Aes
            | A::Serpent
            | A::Twofish
            | A::Rc6
            | A::Blowfish
            | A::Cast128
            | A::Cast256
            | A::Camellia
            | A::Aria
            | A::Sm4
            | A::Gost28147
            | A::Des3
            | A::Idea
            | A::Rc2
            | A::Des
            | A::Threefish256
            | A::Threefish512
            | A::Threefish1024
            | A::Tea
            | A::Xtea
            | A::ChaCha20
            | A::Salsa20
            | A::XSalsa20
            | A::Hc256
            | A::Rabbit
            | A::Rc4
    )
}

struct Job<'a> {
    mode: ModeId,
    operation: Operation,
    iv: &'a [u8],
    buf: &'a mut Vec<u8>,
    tag: Option<&'a mut [u8; TAG_SIZE]>,
}

/// Run `input` through the cipher selected by `algorithm` and `mode`.
///
/// With GCM, `tag` receives the tag on encrypt and supplies it on decrypt.
/// Without a tag buffer the tag is appended to the ciphertext on encrypt and
/// taken from the last [`TAG_SIZE`] input bytes on decrypt.
pub fn transform(
    algorithm: AlgorithmId,
    mode: ModeId,
    operation: Operation,
    key: &[u8],
    iv: &[u8],
    input: &[u8],
    tag: Option<&mut [u8; TAG_SIZE]>,
) -> BridgeResult<Zeroizing<Vec<u8>>> {
    if !has_backend(algorithm) {
        return Err(BridgeError::UnsupportedAlgorithm(algorithm.as_raw()));
    }
    let spec = catalog::spec(algorithm);
    if spec.is_stream() && mode != ModeId::Ctr {
        return Err(CryptoFailure::UnroutedMode.into());
    }

    // room for one padding block or an appended tag
    let headroom = spec.block_size().unwrap_or(0).max(BLOCK_HEADROOM).max(TAG_SIZE);
    let mut buf = work_buffer(input, headroom)?;
    let job = Job {
        mode,
        operation,
        iv,
        buf: &mut buf,
        tag,
    };
    match route(algorithm, key, job) {
        Ok(()) => Ok(buf),
        Err(BridgeError::Crypto(CryptoFailure::Authentication)) => {
            tracing::warn!(%algorithm, %mode, "authentication tag mismatch");
            Err(CryptoFailure::Authentication.into())
        }
        Err(e) => Err(e),
    }
}

fn work_buffer(input: &[u8], headroom: usize) -> BridgeResult<Zeroizing<Vec<u8>>> {
    let mut buf = Zeroizing::new(Vec::new());
    buf.try_reserve_exact(input.len() + headroom)
        .map_err(|_| BridgeError::Memory)?;
    buf.extend_from_slice(input);
    Ok(buf)
}

macro_rules! rc4_by_key_len {
    ($key:expr, $buf:expr; $($len:literal => $size:ident),+ $(,)?) => {
        match $key.len() {
            $($len => keystream(keyed::<Rc4<consts::$size>>($key)?, $buf),)+
            len => Err(CryptoFailure::KeyLength { len }.into()),
        }
    };
}

fn route(algorithm: AlgorithmId, key: &[u8], job: Job<'_>) -> BridgeResult<()> {
    use AlgorithmId as A;
    match algorithm {
        A::Aes => match key.len() {
            16 => wide(keyed::<Aes128>(key)?, job),
            24 => wide(keyed::<Aes192>(key)?, job),
            32 => wide(keyed::<Aes256>(key)?, job),
            len => Err(CryptoFailure::KeyLength { len }.into()),
        },
        A::Camellia => match key.len() {
            16 => wide(keyed::<Camellia128>(key)?, job),
            24 => wide(keyed::<Camellia192>(key)?, job),
            32 => wide(keyed::<Camellia256>(key)?, job),
            len => Err(CryptoFailure::KeyLength { len }.into()),
        },
        A::Aria => match key.len() {
            16 => wide(keyed::<Aria128>(key)?, job),
            24 => wide(keyed::<Aria192>(key)?, job),
            32 => wide(keyed::<Aria256>(key)?, job),
            len => Err(CryptoFailure::KeyLength { len }.into()),
        },
        A::Serpent => wide(keyed::<Serpent>(key)?, job),
        A::Twofish => wide(keyed::<Twofish>(key)?, job),
        A::Cast256 => wide(keyed::<Cast6>(key)?, job),
        A::Sm4 => wide(keyed::<Sm4>(key)?, job),
        A::Rc6 => wide(keyed::<Rc6>(key)?, job),

        A::Blowfish => narrow(keyed::<Blowfish>(key)?, job),
        A::Cast128 => narrow(keyed::<Cast5>(key)?, job),
        A::Gost28147 => narrow(keyed::<Magma>(key)?, job),
        A::Des3 => narrow(keyed::<TdesEde3>(key)?, job),
        A::Idea => narrow(keyed::<Idea>(key)?, job),
        A::Rc2 => narrow(keyed::<Rc2>(key)?, job),
        A::Tea => narrow(keyed::<Tea>(key)?, job),
        A::Xtea => narrow(keyed::<Xtea>(key)?, job),
        A::Des => {
            let key = des_key_with_parity(key)?;
            narrow(keyed::<Des>(key.as_slice())?, job)
        }

        A::Threefish256 => streamed::<_, Ctr128BE>(keyed::<Threefish256>(key)?, job),
        A::Threefish512 => streamed::<_, Ctr128BE>(keyed::<Threefish512>(key)?, job),
        A::Threefish1024 => streamed::<_, Ctr128BE>(keyed::<Threefish1024>(key)?, job),

        A::ChaCha20 => keystream(keyed_iv::<ChaCha20>(key, job.iv)?, job.buf),
        A::Salsa20 => match key.len() {
            16 => keystream(salsa20_short_key(key, job.iv)?, job.buf),
            _ => keystream(keyed_iv::<Salsa20>(key, job.iv)?, job.buf),
        },
        A::XSalsa20 => keystream(keyed_iv::<XSalsa20>(key, job.iv)?, job.buf),
        A::Hc256 => keystream(keyed_iv::<Hc256>(key, job.iv)?, job.buf),
        A::Rabbit => keystream(keyed_iv::<Rabbit>(key, job.iv)?, job.buf),
        A::Rc4 => rc4_by_key_len!(key, job.buf;
            5 => U5, 6 => U6, 7 => U7, 8 => U8, 9 => U9, 10 => U10, 11 => U11,
            12 => U12, 13 => U13, 14 => U14, 15 => U15, 16 => U16, 17 => U17,
            18 => U18, 19 => U19, 20 => U20, 21 => U21, 22 => U22, 23 => U23,
            24 => U24, 25 => U25, 26 => U26, 27 => U27, 28 => U28, 29 => U29,
            30 => U30, 31 => U31, 32 => U32,
        ),

        _ => Err(BridgeError::UnsupportedAlgorithm(algorithm.as_raw())),
    }
}

fn keyed<C: KeyInit>(key: &[u8]) -> BridgeResult<C> {
    C::new_from_slice(key).map_err(|_| CryptoFailure::KeyLength { len: key.len() }.into())
}

fn keyed_iv<S: KeyIvInit>(key: &[u8], iv: &[u8]) -> BridgeResult<S> {
    if iv.len() != S::iv_size() {
        return Err(bad_iv(iv));
    }
    S::new_from_slices(key, iv).map_err(|_| CryptoFailure::KeyLength { len: key.len() }.into())
}

fn bad_iv(iv: &[u8]) -> BridgeError {
    CryptoFailure::IvLength { len: iv.len() }.into()
}

/// 128-bit block ciphers: every mode including GCM, CTR with a 128-bit counter.
fn wide<C>(cipher: C, job: Job<'_>) -> BridgeResult<()>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + BlockDecrypt,
{
    match job.mode {
        ModeId::Gcm => gcm(cipher, job),
        _ => streamed::<C, Ctr128BE>(cipher, job),
    }
}

/// 64-bit block ciphers: no GCM, CTR with a 64-bit counter.
fn narrow<C>(cipher: C, job: Job<'_>) -> BridgeResult<()>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U8> + BlockEncrypt + BlockDecrypt,
{
    streamed::<C, Ctr64BE>(cipher, job)
}

/// Every non-AEAD mode over a block cipher of any width. OFB and CTR
/// keystreams are one block long; CTR counts with flavor `F`.
fn streamed<C, F>(cipher: C, job: Job<'_>) -> BridgeResult<()>
where
    C: BlockCipher + BlockEncrypt + BlockDecrypt,
    F: CtrFlavor<C::BlockSize>,
    C::BlockSize: IsLess<U256>,
    Le<C::BlockSize, U256>: NonZero,
{
    match job.mode {
        ModeId::Gcm => Err(CryptoFailure::UnroutedMode.into()),
        ModeId::Ofb => {
            let core = OfbCore::<C>::inner_iv_slice_init(cipher, job.iv)
                .map_err(|_| bad_iv(job.iv))?;
            keystream(StreamCipherCoreWrapper::from_core(core), job.buf)
        }
        ModeId::Ctr => {
            let core = CtrCore::<C, F>::inner_iv_slice_init(cipher, job.iv)
                .map_err(|_| bad_iv(job.iv))?;
            keystream(StreamCipherCoreWrapper::from_core(core), job.buf)
        }
        ModeId::Cbc | ModeId::Ecb | ModeId::Cfb => chained(cipher, job),
    }
}

/// Modes whose wrappers carry no block-size bounds.
fn chained<C>(cipher: C, job: Job<'_>) -> BridgeResult<()>
where
    C: BlockCipher + BlockEncrypt + BlockDecrypt,
{
    let Job {
        mode,
        operation,
        iv,
        buf,
        ..
    } = job;
    match (mode, operation) {
        (ModeId::Cbc, Operation::Encrypt) => {
            let enc = cbc::Encryptor::<C>::inner_iv_slice_init(cipher, iv).map_err(|_| bad_iv(iv))?;
            padded_encrypt(enc, buf)
        }
        (ModeId::Cbc, Operation::Decrypt) => {
            let dec = cbc::Decryptor::<C>::inner_iv_slice_init(cipher, iv).map_err(|_| bad_iv(iv))?;
            padded_decrypt(dec, buf)
        }
        // a bare block cipher driven through the padded helpers is ECB
        (ModeId::Ecb, Operation::Encrypt) => padded_encrypt(cipher, buf),
        (ModeId::Ecb, Operation::Decrypt) => padded_decrypt(cipher, buf),
        (ModeId::Cfb, Operation::Encrypt) => {
            let enc = cfb_mode::Encryptor::<C>::inner_iv_slice_init(cipher, iv)
                .map_err(|_| bad_iv(iv))?;
            AsyncStreamCipher::encrypt(enc, buf);
            Ok(())
        }
        (ModeId::Cfb, Operation::Decrypt) => {
            let dec = cfb_mode::Decryptor::<C>::inner_iv_slice_init(cipher, iv)
                .map_err(|_| bad_iv(iv))?;
            AsyncStreamCipher::decrypt(dec, buf);
            Ok(())
        }
        _ => Err(CryptoFailure::UnroutedMode.into()),
    }
}

fn padded_encrypt<E: BlockEncryptMut>(enc: E, buf: &mut Vec<u8>) -> BridgeResult<()> {
    let msg_len = buf.len();
    let block = E::block_size();
    // PKCS#7 always adds between 1 and `block` bytes
    buf.resize(msg_len + block - msg_len % block, 0);
    let len = enc
        .encrypt_padded_mut::<Pkcs7>(buf, msg_len)
        .map_err(|_| CryptoFailure::Padding)?
        .len();
    buf.truncate(len);
    Ok(())
}

fn padded_decrypt<D: BlockDecryptMut>(dec: D, buf: &mut Vec<u8>) -> BridgeResult<()> {
    let len = dec
        .decrypt_padded_mut::<Pkcs7>(buf)
        .map_err(|_| CryptoFailure::Padding)?
        .len();
    buf.truncate(len);
    Ok(())
}

fn keystream<S: StreamCipher>(mut cipher: S, buf: &mut [u8]) -> BridgeResult<()> {
    cipher
        .try_apply_keystream(buf)
        .map_err(|_| CryptoFailure::MessageTooLong.into())
}

fn gcm<C>(cipher: C, job: Job<'_>) -> BridgeResult<()>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt,
{
    let Job {
        operation,
        iv,
        buf,
        tag,
        ..
    } = job;
    if iv.len() != 16 {
        return Err(bad_iv(iv));
    }
    let aead = AesGcm::<C, U16>::from(cipher);
    let nonce = GenericArray::from_slice(iv);

    match operation {
        Operation::Encrypt => {
            let computed = aead
                .encrypt_in_place_detached(nonce, &[], buf)
                .map_err(|_| CryptoFailure::MessageTooLong)?;
            match tag {
                Some(out) => out.copy_from_slice(&computed),
                None => buf.extend_from_slice(&computed),
            }
            Ok(())
        }
        Operation::Decrypt => {
            let expected = match tag {
                Some(supplied) => GenericArray::clone_from_slice(&supplied[..]),
                None => {
                    let split = buf
                        .len()
                        .checked_sub(TAG_SIZE)
                        .ok_or(CryptoFailure::TruncatedCiphertext)?;
                    let trailing = GenericArray::clone_from_slice(&buf[split..]);
                    buf.truncate(split);
                    trailing
                }
            };
            aead.decrypt_in_place_detached(nonce, &[], buf, &expected)
                .map_err(|_| CryptoFailure::Authentication.into())
        }
    }
}

/// Spread a 56-bit DES key over eight bytes, seven key bits each, with the
/// low bit of every byte set for odd parity.
fn des_key_with_parity(key: &[u8]) -> BridgeResult<Zeroizing<[u8; 8]>> {
    if key.len() != 7 {
        return Err(CryptoFailure::KeyLength { len: key.len() }.into());
    }
    let bits = Zeroizing::new(
        key.iter()
            .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte)),
    );
    let mut out = Zeroizing::new([0u8; 8]);
    for (i, byte) in out.iter_mut().enumerate() {
        let seven = ((*bits >> (49 - 7 * i)) & 0x7f) as u8;
        let shifted = seven << 1;
        *byte = shifted | u8::from(shifted.count_ones() % 2 == 0);
    }
    Ok(out)
}
