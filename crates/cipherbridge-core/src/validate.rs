//! Algorithm/key-size and algorithm/mode compatibility checks
//!
//! Both checks take raw ids straight from the caller and consult only the
//! static catalog. No cipher object is constructed here.

use crate::catalog::{self, AlgorithmSpec, KeySizeRule, Profile};
use crate::error::{BridgeError, BridgeResult};
use crate::types::ModeId;

fn admitted(profile: Profile, algorithm: i32) -> BridgeResult<&'static AlgorithmSpec> {
    let spec = catalog::lookup(algorithm).ok_or(BridgeError::UnsupportedAlgorithm(algorithm))?;
    if !profile.includes(spec) || spec.key_sizes == KeySizeRule::Unavailable {
        return Err(BridgeError::UnsupportedAlgorithm(algorithm));
    }
    Ok(spec)
}

/// Accept `bits` only if the algorithm is known, in `profile`, and keyed at that size.
pub fn validate_key_size(
    profile: Profile,
    algorithm: i32,
    bits: i32,
) -> BridgeResult<&'static AlgorithmSpec> {
    let spec = admitted(profile, algorithm)?;
    if !spec.key_sizes.accepts(bits) {
        return Err(BridgeError::InvalidKeySize {
            algorithm: spec.id,
            bits,
        });
    }
    Ok(spec)
}

pub fn validate_mode(profile: Profile, algorithm: i32, mode: i32) -> BridgeResult<ModeId> {
    let spec = admitted(profile, algorithm)?;
    let unsupported = BridgeError::UnsupportedMode { algorithm, mode };
    let mode_id = ModeId::from_raw(mode).ok_or(unsupported)?;
    if !spec.supports_mode(profile, mode_id) {
        return Err(BridgeError::UnsupportedMode { algorithm, mode });
    }
    Ok(mode_id)
}
