//! Per-algorithm capability records
//!
//! One record per [`AlgorithmId`], indexed by raw id. The validator and the
//! dispatcher read only from this table; nothing here is mutable.

use serde::{Deserialize, Serialize};

use crate::types::{AlgorithmId, ModeId};

/// Which algorithm subset a [`crate::Bridge`] accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// All 43 identifiers; GCM for AES, Serpent, Twofish, Camellia and ARIA.
    #[default]
    Full,
    /// AES, Serpent, Twofish, RC6, Blowfish and CAST-128; GCM for AES only.
    Minimal,
}

impl Profile {
    pub fn includes(self, spec: &AlgorithmSpec) -> bool {
        match self {
            Profile::Full => true,
            Profile::Minimal => spec.minimal,
        }
    }

    fn allows_gcm(self, spec: &AlgorithmSpec) -> bool {
        match self {
            Profile::Full => spec.gcm,
            Profile::Minimal => spec.id == AlgorithmId::Aes,
        }
    }
}

/// Legal key sizes, in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySizeRule {
    OneOf(&'static [i32]),
    Range { min: i32, max: i32, step: i32 },
    /// Listed for id stability only; every key size is refused.
    Unavailable,
}

impl KeySizeRule {
    pub fn accepts(self, bits: i32) -> bool {
        match self {
            KeySizeRule::OneOf(sizes) => sizes.contains(&bits),
            KeySizeRule::Range { min, max, step } => {
                bits >= min && bits <= max && (bits - min) % step == 0
            }
            KeySizeRule::Unavailable => false,
        }
    }

    /// Every accepted size in ascending order.
    pub fn sizes(self) -> Vec<i32> {
        match self {
            KeySizeRule::OneOf(sizes) => sizes.to_vec(),
            KeySizeRule::Range { min, max, step } => {
                (min..=max).step_by(step as usize).collect()
            }
            KeySizeRule::Unavailable => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Block { block_size: usize },
    Stream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmSpec {
    pub id: AlgorithmId,
    pub key_sizes: KeySizeRule,
    pub iv_len: usize,
    pub shape: Shape,
    /// Usable under GCM in the full profile.
    pub gcm: bool,
    /// Member of the minimal profile.
    pub minimal: bool,
}

impl AlgorithmSpec {
    pub fn is_stream(&self) -> bool {
        self.shape == Shape::Stream
    }

    pub fn block_size(&self) -> Option<usize> {
        match self.shape {
            Shape::Block { block_size } => Some(block_size),
            Shape::Stream => None,
        }
    }

    /// Mode legality under `profile`. Stream ciphers only run as "CTR".
    pub fn supports_mode(&self, profile: Profile, mode: ModeId) -> bool {
        match (self.shape, mode) {
            (Shape::Stream, ModeId::Ctr) => true,
            (Shape::Stream, _) => false,
            (Shape::Block { .. }, ModeId::Gcm) => profile.allows_gcm(self),
            (Shape::Block { .. }, _) => true,
        }
    }
}

const AES_SIZES: &[i32] = &[128, 192, 256];
const ONLY_128: &[i32] = &[128];
const ONLY_256: &[i32] = &[256];
const SHORT_OR_LONG: &[i32] = &[128, 256];

const fn block(id: AlgorithmId, key_sizes: KeySizeRule, block_size: usize) -> AlgorithmSpec {
    AlgorithmSpec {
        id,
        key_sizes,
        // chaining modes take one full block of IV
        iv_len: block_size,
        shape: Shape::Block { block_size },
        gcm: false,
        minimal: false,
    }
}

const fn stream(id: AlgorithmId, key_sizes: KeySizeRule, iv_len: usize) -> AlgorithmSpec {
    AlgorithmSpec {
        id,
        key_sizes,
        iv_len,
        shape: Shape::Stream,
        gcm: false,
        minimal: false,
    }
}

const fn with_gcm(mut spec: AlgorithmSpec) -> AlgorithmSpec {
    spec.gcm = true;
    spec
}

const fn minimal(mut spec: AlgorithmSpec) -> AlgorithmSpec {
    spec.minimal = true;
    spec
}

use AlgorithmId as A;
use KeySizeRule::{OneOf, Range, Unavailable};

static ALGORITHMS: [AlgorithmSpec; 43] = [
    minimal(with_gcm(block(A::Aes, OneOf(AES_SIZES), 16))),
    minimal(with_gcm(block(A::Serpent, OneOf(AES_SIZES), 16))),
    minimal(with_gcm(block(A::Twofish, OneOf(AES_SIZES), 16))),
    minimal(block(A::Rc6, OneOf(AES_SIZES), 16)),
    block(A::Mars, OneOf(AES_SIZES), 16),
    block(A::Rc5, Range { min: 64, max: 256, step: 8 }, 8),
    block(A::Skipjack, OneOf(&[80]), 8),
    minimal(block(A::Blowfish, Range { min: 32, max: 448, step: 8 }, 8)),
    minimal(block(A::Cast128, OneOf(ONLY_128), 8)),
    block(A::Cast256, OneOf(&[128, 160, 192, 224, 256]), 16),
    with_gcm(block(A::Camellia, OneOf(AES_SIZES), 16)),
    stream(A::ChaCha20, OneOf(ONLY_256), 12),
    stream(A::Salsa20, OneOf(SHORT_OR_LONG), 8),
    stream(A::XSalsa20, OneOf(ONLY_256), 24),
    stream(A::Hc128, OneOf(SHORT_OR_LONG), 16),
    stream(A::Hc256, OneOf(ONLY_256), 32),
    // Rabbit is defined for 128-bit keys only
    stream(A::Rabbit, OneOf(ONLY_128), 8),
    stream(A::Sosemanuk, OneOf(SHORT_OR_LONG), 16),
    with_gcm(block(A::Aria, OneOf(AES_SIZES), 16)),
    block(A::Seed, OneOf(ONLY_128), 16),
    block(A::Sm4, OneOf(ONLY_128), 16),
    block(A::Gost28147, OneOf(ONLY_256), 8),
    block(A::Des3, OneOf(&[192]), 8),
    block(A::Idea, OneOf(ONLY_128), 8),
    block(A::Rc2, OneOf(&[40, 64, 128]), 8),
    block(A::Safer, OneOf(&[64, 128]), 8),
    block(A::SaferPlus, OneOf(AES_SIZES), 16),
    // effective key length; parity bits are added when keying the cipher
    block(A::Des, OneOf(&[56]), 8),
    stream(A::Rc4, Range { min: 40, max: 256, step: 8 }, 16),
    block(A::Threefish256, OneOf(ONLY_256), 32),
    block(A::Threefish512, OneOf(&[512]), 64),
    block(A::Threefish1024, OneOf(&[1024]), 128),
    block(A::Tea, OneOf(ONLY_128), 8),
    block(A::Xtea, OneOf(ONLY_128), 8),
    block(A::Shacal2, OneOf(&[128, 192, 256, 384, 512]), 32),
    stream(A::Wake, OneOf(SHORT_OR_LONG), 16),
    block(A::Square, OneOf(ONLY_128), 16),
    block(A::Shark, OneOf(ONLY_128), 8),
    stream(A::Panama, OneOf(ONLY_256), 16),
    stream(A::Seal, OneOf(&[160]), 16),
    block(A::Lucifer, Unavailable, 16),
    block(A::Simon, Unavailable, 16),
    block(A::Speck, Unavailable, 16),
];

pub fn spec(id: AlgorithmId) -> &'static AlgorithmSpec {
    &ALGORITHMS[(id.as_raw() - 1) as usize]
}

/// Look up a raw id. `None` for ids outside the enumeration.
pub fn lookup(raw: i32) -> Option<&'static AlgorithmSpec> {
    AlgorithmId::from_raw(raw).map(spec)
}

pub fn all() -> &'static [AlgorithmSpec] {
    &ALGORITHMS
}
