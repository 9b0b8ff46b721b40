//! Ciphers without a published RustCrypto crate, built on the same `cipher`
//! traits so the mode wrappers in [`crate::dispatch`] drive them unchanged.
//!
//! - RC6-32/20 (128-bit block, 16/24/32-byte keys, little-endian words)
//! - TEA and XTEA (64-bit block, 16-byte key, big-endian words)
//! - Salsa20/20 under a 16-byte key, via the `salsa20` core

use cipher::consts::{U10, U16, U32, U8};
use cipher::{BlockCipher, InvalidLength, Key, KeyInit, KeySizeUser, StreamCipherCoreWrapper};
use salsa20::{Salsa20, SalsaCore};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{BridgeResult, CryptoFailure};

fn le_words<const N: usize>(bytes: &[u8]) -> [u32; N] {
    let mut out = [0u32; N];
    for (word, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    out
}

fn be_words<const N: usize>(bytes: &[u8]) -> [u32; N] {
    let mut out = [0u32; N];
    for (word, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    out
}

fn store_le(words: &[u32], out: &mut [u8]) {
    for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}

fn store_be(words: &[u32], out: &mut [u8]) {
    for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
}

const RC6_ROUNDS: usize = 20;
const RC6_SCHEDULE: usize = 2 * RC6_ROUNDS + 4;
const RC6_P32: u32 = 0xb7e1_5163;
const RC6_Q32: u32 = 0x9e37_79b9;

/// RC6-32/20/b block cipher.
#[derive(Clone)]
pub struct Rc6 {
    schedule: [u32; RC6_SCHEDULE],
}

impl Rc6 {
    fn expand(key: &[u8]) -> Self {
        let c = key.len().div_ceil(4).max(1);
        let mut l = Zeroizing::new([0u32; 8]);
        for (i, byte) in key.iter().enumerate() {
            l[i / 4] |= u32::from(*byte) << (8 * (i % 4));
        }

        let mut s = [0u32; RC6_SCHEDULE];
        s[0] = RC6_P32;
        for i in 1..RC6_SCHEDULE {
            s[i] = s[i - 1].wrapping_add(RC6_Q32);
        }

        let (mut a, mut b) = (0u32, 0u32);
        let (mut i, mut j) = (0usize, 0usize);
        for _ in 0..3 * c.max(RC6_SCHEDULE) {
            a = s[i].wrapping_add(a).wrapping_add(b).rotate_left(3);
            s[i] = a;
            b = l[j].wrapping_add(a).wrapping_add(b).rotate_left(a.wrapping_add(b) & 31);
            l[j] = b;
            i = (i + 1) % RC6_SCHEDULE;
            j = (j + 1) % c;
        }
        Self { schedule: s }
    }

    fn encrypt_words(&self, [mut a, mut b, mut c, mut d]: [u32; 4]) -> [u32; 4] {
        let s = &self.schedule;
        b = b.wrapping_add(s[0]);
        d = d.wrapping_add(s[1]);
        for i in 1..=RC6_ROUNDS {
            let t = b.wrapping_mul(b.wrapping_mul(2).wrapping_add(1)).rotate_left(5);
            let u = d.wrapping_mul(d.wrapping_mul(2).wrapping_add(1)).rotate_left(5);
            a = (a ^ t).rotate_left(u & 31).wrapping_add(s[2 * i]);
            c = (c ^ u).rotate_left(t & 31).wrapping_add(s[2 * i + 1]);
            (a, b, c, d) = (b, c, d, a);
        }
        a = a.wrapping_add(s[2 * RC6_ROUNDS + 2]);
        c = c.wrapping_add(s[2 * RC6_ROUNDS + 3]);
        [a, b, c, d]
    }

    fn decrypt_words(&self, [mut a, mut b, mut c, mut d]: [u32; 4]) -> [u32; 4] {
        let s = &self.schedule;
        c = c.wrapping_sub(s[2 * RC6_ROUNDS + 3]);
        a = a.wrapping_sub(s[2 * RC6_ROUNDS + 2]);
        for i in (1..=RC6_ROUNDS).rev() {
            (a, b, c, d) = (d, a, b, c);
            let u = d.wrapping_mul(d.wrapping_mul(2).wrapping_add(1)).rotate_left(5);
            let t = b.wrapping_mul(b.wrapping_mul(2).wrapping_add(1)).rotate_left(5);
            c = c.wrapping_sub(s[2 * i + 1]).rotate_right(t & 31) ^ u;
            a = a.wrapping_sub(s[2 * i]).rotate_right(u & 31) ^ t;
        }
        d = d.wrapping_sub(s[1]);
        b = b.wrapping_sub(s[0]);
        [a, b, c, d]
    }
}

impl BlockCipher for Rc6 {}

impl KeySizeUser for Rc6 {
    type KeySize = U32;
}

impl KeyInit for Rc6 {
    fn new(key: &Key<Self>) -> Self {
        Self::expand(&key[..])
    }

    fn new_from_slice(key: &[u8]) -> Result<Self, InvalidLength> {
        match key.len() {
            16 | 24 | 32 => Ok(Self::expand(key)),
            _ => Err(InvalidLength),
        }
    }
}

impl Drop for Rc6 {
    fn drop(&mut self) {
        self.schedule.zeroize();
    }
}

cipher::impl_simple_block_encdec!(
    Rc6, U16, cipher, block,
    encrypt: {
        let words = cipher.encrypt_words(le_words(&block.get_in()[..]));
        store_le(&words, &mut block.get_out()[..]);
    }
    decrypt: {
        let words = cipher.decrypt_words(le_words(&block.get_in()[..]));
        store_le(&words, &mut block.get_out()[..]);
    }
);

const TEA_DELTA: u32 = 0x9e37_79b9;
const TEA_CYCLES: u32 = 32;

/// Tiny Encryption Algorithm, 32 cycles.
#[derive(Clone)]
pub struct Tea {
    key: [u32; 4],
}

impl Tea {
    fn encrypt_words(&self, [mut v0, mut v1]: [u32; 2]) -> [u32; 2] {
        let k = &self.key;
        let mut sum = 0u32;
        for _ in 0..TEA_CYCLES {
            sum = sum.wrapping_add(TEA_DELTA);
            v0 = v0.wrapping_add(
                (v1 << 4).wrapping_add(k[0]) ^ v1.wrapping_add(sum) ^ (v1 >> 5).wrapping_add(k[1]),
            );
            v1 = v1.wrapping_add(
                (v0 << 4).wrapping_add(k[2]) ^ v0.wrapping_add(sum) ^ (v0 >> 5).wrapping_add(k[3]),
            );
        }
        [v0, v1]
    }

    fn decrypt_words(&self, [mut v0, mut v1]: [u32; 2]) -> [u32; 2] {
        let k = &self.key;
        let mut sum = TEA_DELTA.wrapping_mul(TEA_CYCLES);
        for _ in 0..TEA_CYCLES {
            v1 = v1.wrapping_sub(
                (v0 << 4).wrapping_add(k[2]) ^ v0.wrapping_add(sum) ^ (v0 >> 5).wrapping_add(k[3]),
            );
            v0 = v0.wrapping_sub(
                (v1 << 4).wrapping_add(k[0]) ^ v1.wrapping_add(sum) ^ (v1 >> 5).wrapping_add(k[1]),
            );
            sum = sum.wrapping_sub(TEA_DELTA);
        }
        [v0, v1]
    }
}

impl BlockCipher for Tea {}

impl KeySizeUser for Tea {
    type KeySize = U16;
}

impl KeyInit for Tea {
    fn new(key: &Key<Self>) -> Self {
        Self {
            key: be_words(&key[..]),
        }
    }
}

impl Drop for Tea {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

cipher::impl_simple_block_encdec!(
    Tea, U8, cipher, block,
    encrypt: {
        let words = cipher.encrypt_words(be_words(&block.get_in()[..]));
        store_be(&words, &mut block.get_out()[..]);
    }
    decrypt: {
        let words = cipher.decrypt_words(be_words(&block.get_in()[..]));
        store_be(&words, &mut block.get_out()[..]);
    }
);

/// XTEA, 32 cycles.
#[derive(Clone)]
pub struct Xtea {
    key: [u32; 4],
}

impl Xtea {
    fn mix(v: u32) -> u32 {
        ((v << 4) ^ (v >> 5)).wrapping_add(v)
    }

    fn encrypt_words(&self, [mut v0, mut v1]: [u32; 2]) -> [u32; 2] {
        let k = &self.key;
        let mut sum = 0u32;
        for _ in 0..TEA_CYCLES {
            v0 = v0.wrapping_add(Self::mix(v1) ^ sum.wrapping_add(k[(sum & 3) as usize]));
            sum = sum.wrapping_add(TEA_DELTA);
            v1 = v1.wrapping_add(Self::mix(v0) ^ sum.wrapping_add(k[((sum >> 11) & 3) as usize]));
        }
        [v0, v1]
    }

    fn decrypt_words(&self, [mut v0, mut v1]: [u32; 2]) -> [u32; 2] {
        let k = &self.key;
        let mut sum = TEA_DELTA.wrapping_mul(TEA_CYCLES);
        for _ in 0..TEA_CYCLES {
            v1 = v1.wrapping_sub(Self::mix(v0) ^ sum.wrapping_add(k[((sum >> 11) & 3) as usize]));
            sum = sum.wrapping_sub(TEA_DELTA);
            v0 = v0.wrapping_sub(Self::mix(v1) ^ sum.wrapping_add(k[(sum & 3) as usize]));
        }
        [v0, v1]
    }
}

impl BlockCipher for Xtea {}

impl KeySizeUser for Xtea {
    type KeySize = U16;
}

impl KeyInit for Xtea {
    fn new(key: &Key<Self>) -> Self {
        Self {
            key: be_words(&key[..]),
        }
    }
}

impl Drop for Xtea {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

cipher::impl_simple_block_encdec!(
    Xtea, U8, cipher, block,
    encrypt: {
        let words = cipher.encrypt_words(be_words(&block.get_in()[..]));
        store_be(&words, &mut block.get_out()[..]);
    }
    decrypt: {
        let words = cipher.decrypt_words(be_words(&block.get_in()[..]));
        store_be(&words, &mut block.get_out()[..]);
    }
);

/// "expand 16-byte k"
const SALSA_TAU: [u32; 4] = [0x6170_7865, 0x3120_646e, 0x7962_2d36, 0x6b20_6574];

/// Salsa20/20 keyed with 16 bytes: the key fills both key halves of the
/// state and the tau constants replace sigma.
pub fn salsa20_short_key(key: &[u8], nonce: &[u8]) -> BridgeResult<Salsa20> {
    if key.len() != 16 {
        return Err(CryptoFailure::KeyLength { len: key.len() }.into());
    }
    if nonce.len() != 8 {
        return Err(CryptoFailure::IvLength { len: nonce.len() }.into());
    }
    let k = Zeroizing::new(le_words::<4>(key));
    let n = le_words::<2>(nonce);

    let mut state = Zeroizing::new([0u32; 16]);
    state[0] = SALSA_TAU[0];
    state[1..5].copy_from_slice(&k[..]);
    state[5] = SALSA_TAU[1];
    state[6..8].copy_from_slice(&n);
    // words 8 and 9 are the block counter
    state[10] = SALSA_TAU[2];
    state[11..15].copy_from_slice(&k[..]);
    state[15] = SALSA_TAU[3];

    Ok(StreamCipherCoreWrapper::from_core(
        SalsaCore::<U10>::from_raw_state(*state),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipher::generic_array::GenericArray;
    use cipher::{BlockDecrypt, BlockEncrypt, KeyIvInit, StreamCipher};

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn encrypt_block<C: BlockEncrypt + BlockDecrypt>(cipher: &C, plaintext: &[u8]) -> Vec<u8> {
        let mut block = GenericArray::clone_from_slice(plaintext);
        cipher.encrypt_block(&mut block);
        let ciphertext = block.to_vec();
        cipher.decrypt_block(&mut block);
        assert_eq!(block.as_slice(), plaintext);
        ciphertext
    }

    #[test]
    fn test_rc6_known_answers() {
        // vectors from the RC6 submission paper
        let cases = [
            (
                "00000000000000000000000000000000",
                "00000000000000000000000000000000",
                "8fc3a53656b1f778c129df4e9848a41e",
            ),
            (
                "0123456789abcdef0112233445566778",
                "02132435465768798a9bacbdcedfe0f1",
                "524e192f4715c6231f51f6367ea43f18",
            ),
            (
                "0123456789abcdef0112233445566778899aabbccddeeff01032547698badcfe",
                "02132435465768798a9bacbdcedfe0f1",
                "c8241816f0d7e48920ad16a1674e5d48",
            ),
        ];
        for (key, pt, ct) in cases {
            let rc6 = Rc6::new_from_slice(&hex(key)).unwrap();
            assert_eq!(encrypt_block(&rc6, &hex(pt)), hex(ct), "key {key}");
        }
    }

    #[test]
    fn test_rc6_key_lengths() {
        assert!(Rc6::new_from_slice(&[0u8; 24]).is_ok());
        assert!(Rc6::new_from_slice(&[0u8; 15]).is_err());
        assert!(Rc6::new_from_slice(&[0u8; 40]).is_err());
    }

    #[test]
    fn test_tea_known_answer() {
        let tea = Tea::new_from_slice(&[0u8; 16]).unwrap();
        assert_eq!(encrypt_block(&tea, &[0u8; 8]), hex("41ea3a0a94baa940"));
    }

    #[test]
    fn test_xtea_known_answers() {
        let xtea = Xtea::new_from_slice(&hex("000102030405060708090a0b0c0d0e0f")).unwrap();
        assert_eq!(encrypt_block(&xtea, b"ABCDEFGH"), hex("497df3d072612cb5"));
        let zero = Xtea::new_from_slice(&[0u8; 16]).unwrap();
        assert_eq!(encrypt_block(&zero, &[0u8; 8]), hex("dee9d4d8f7131ed9"));
    }

    #[test]
    fn test_tea_and_xtea_differ() {
        let key = hex("000102030405060708090a0b0c0d0e0f");
        let tea = Tea::new_from_slice(&key).unwrap();
        let xtea = Xtea::new_from_slice(&key).unwrap();
        assert_ne!(encrypt_block(&tea, b"ABCDEFGH"), encrypt_block(&xtea, b"ABCDEFGH"));
    }

    #[test]
    fn test_salsa20_short_key_known_answer() {
        // ECRYPT Salsa20 set 1, vector 0 (128-bit key)
        let mut key = [0u8; 16];
        key[0] = 0x80;
        let mut cipher = salsa20_short_key(&key, &[0u8; 8]).unwrap();
        let mut stream = [0u8; 64];
        cipher.apply_keystream(&mut stream);
        assert_eq!(
            stream.to_vec(),
            hex(concat!(
                "4dfa5e481da23ea09a31022050859936da52fcee218005164f267cb65f5cfd7f",
                "2b4f97e0ff16924a52df269515110a07f9e460bc65ef95da58f740b7d1dbb0aa"
            ))
        );
    }

    #[test]
    fn test_salsa20_short_key_differs_from_doubled_long_key() {
        let key = [0x5au8; 16];
        let nonce = [0x01u8; 8];
        let mut short = salsa20_short_key(&key, &nonce).unwrap();
        let mut doubled = Salsa20::new_from_slices(&[0x5au8; 32], &nonce).unwrap();
        let (mut a, mut b) = ([0u8; 64], [0u8; 64]);
        short.apply_keystream(&mut a);
        doubled.apply_keystream(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_salsa20_short_key_rejects_bad_lengths() {
        assert!(salsa20_short_key(&[0u8; 32], &[0u8; 8]).is_err());
        assert!(salsa20_short_key(&[0u8; 16], &[0u8; 12]).is_err());
    }
}
