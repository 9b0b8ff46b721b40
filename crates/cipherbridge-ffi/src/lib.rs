//! cipherbridge-ffi: C ABI over cipherbridge-core
//!
//! ```text
//! host app (C / JNI / Swift)
//!       │
//!       └── crypto_bridge_* (this crate, header generated into OUT_DIR)
//!                 │
//!                 └── cipherbridge-core::Bridge
//! ```
//!
//! Every export returns a raw [`StatusCode`] or a count and never unwinds
//! into the caller. The profile is chosen once by [`crypto_bridge_init`];
//! calls made before it run with the full profile.

pub mod logging;

use std::ffi::{c_char, c_int, c_uchar, CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::OnceLock;

use cipherbridge_core::{
    Bridge, BridgeConfig, CryptoBuffers, CryptoRequest, StatusCode, TAG_SIZE,
};

static BRIDGE: OnceLock<Bridge> = OnceLock::new();
static MESSAGES: OnceLock<Vec<CString>> = OnceLock::new();
static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();

fn bridge() -> &'static Bridge {
    BRIDGE.get_or_init(Bridge::default)
}

fn guarded(f: impl FnOnce() -> c_int) -> c_int {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or(StatusCode::UnknownError.as_raw())
}

/// Build a slice from a caller pointer. Null yields `None`.
///
/// # Safety
/// A non-null `ptr` must be valid for `len` reads.
unsafe fn input_slice<'a>(ptr: *const c_uchar, len: usize) -> Option<&'a [u8]> {
    if ptr.is_null() {
        None
    } else {
        Some(std::slice::from_raw_parts(ptr, len))
    }
}

/// # Safety
/// A non-null `ptr` must be valid for `len` writes and not aliased.
unsafe fn output_slice<'a>(ptr: *mut c_uchar, len: usize) -> Option<&'a mut [u8]> {
    if ptr.is_null() {
        None
    } else {
        Some(std::slice::from_raw_parts_mut(ptr, len))
    }
}

/// Load configuration, install logging and fix the profile.
///
/// `config_path` may be null, in which case `CIPHERBRIDGE_CONFIG` is
/// consulted and defaults apply if it is unset. Calling again with a config
/// that selects a different profile returns `InvalidParams`.
///
/// # Safety
/// A non-null `config_path` must point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn crypto_bridge_init(config_path: *const c_char) -> c_int {
    guarded(|| {
        let loaded = if config_path.is_null() {
            BridgeConfig::from_env()
        } else {
            match CStr::from_ptr(config_path).to_str() {
                Ok(path) => BridgeConfig::load(Path::new(path)),
                Err(_) => return StatusCode::InvalidParams.as_raw(),
            }
        };
        let config = match loaded {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("crypto_bridge_init: {e:#}");
                return StatusCode::InvalidParams.as_raw();
            }
        };

        logging::init_tracing(&config.logging);

        let wanted = Bridge::from_config(&config);
        let active = BRIDGE.get_or_init(|| wanted);
        if *active != wanted {
            tracing::warn!(
                active = ?active.profile(),
                requested = ?wanted.profile(),
                "profile already fixed; ignoring re-initialisation"
            );
            return StatusCode::InvalidParams.as_raw();
        }
        tracing::info!(profile = ?active.profile(), version = cipherbridge_core::BRIDGE_VERSION, "crypto bridge ready");
        StatusCode::Success.as_raw()
    })
}

/// Encrypt or decrypt `input` into `output`.
///
/// `*output_len` holds the output capacity on entry and the written (or,
/// after a sizing failure, required) length on return. A request rejected
/// before its output size is known leaves `*output_len` untouched. Negative
/// lengths count as empty buffers, so the password check still runs first.
/// `iv`, if not null,
/// receives the derived IV. `auth_tag`, if not null, is a 16-byte GCM tag
/// buffer: written on encrypt, read on decrypt.
///
/// # Safety
/// Each non-null pointer must be valid for its stated length: `password`
/// for `password_len` bytes, `input` for `input_len`, `output` for
/// `*output_len`, `iv` for `crypto_bridge_iv_length(algorithm)` and
/// `auth_tag` for 16. Buffers must not overlap.
#[no_mangle]
pub unsafe extern "C" fn crypto_bridge_process(
    algorithm: c_int,
    mode: c_int,
    key_size_bits: c_int,
    operation: c_int,
    password: *const c_char,
    password_len: c_int,
    input: *const c_uchar,
    input_len: c_int,
    output: *mut c_uchar,
    output_len: *mut c_int,
    iv: *mut c_uchar,
    auth_tag: *mut c_uchar,
) -> c_int {
    guarded(|| {
        if output_len.is_null() {
            return StatusCode::InvalidParams.as_raw();
        }
        let password_len = usize::try_from(password_len).unwrap_or(0);
        let input_len = usize::try_from(input_len).unwrap_or(0);
        let capacity = usize::try_from(*output_len).unwrap_or(0);

        let request = CryptoRequest {
            algorithm,
            mode,
            key_size_bits,
            operation,
            password: input_slice(password.cast(), password_len),
            input: input_slice(input, input_len),
        };
        let iv_len = Bridge::iv_len(algorithm).unwrap_or(0);
        let buffers = CryptoBuffers {
            output: output_slice(output, capacity),
            iv: output_slice(iv, iv_len),
            auth_tag: output_slice(auth_tag, TAG_SIZE),
        };

        let outcome = bridge().process(&request, buffers);
        if outcome.sized {
            *output_len = c_int::try_from(outcome.output_len).unwrap_or(c_int::MAX);
        }
        outcome.status.as_raw()
    })
}

/// Version string of the bridge. Static; do not free.
#[no_mangle]
pub extern "C" fn crypto_bridge_version() -> *const c_char {
    VERSION.as_ptr().cast()
}

/// IV length in bytes for `algorithm`, or `UnsupportedAlgorithm` for an
/// unknown id.
#[no_mangle]
pub extern "C" fn crypto_bridge_iv_length(algorithm: c_int) -> c_int {
    match Bridge::iv_len(algorithm) {
        Some(len) => c_int::try_from(len).unwrap_or(c_int::MAX),
        None => StatusCode::UnsupportedAlgorithm.as_raw(),
    }
}

/// Copy up to `capacity` ids into `out` and return how many exist.
///
/// # Safety
/// `out` must be null or valid for `capacity` writes.
unsafe fn write_ids(ids: &[c_int], out: *mut c_int, capacity: c_int) -> c_int {
    let Ok(capacity) = usize::try_from(capacity) else {
        return StatusCode::InvalidParams.as_raw();
    };
    if !out.is_null() {
        let n = ids.len().min(capacity);
        std::slice::from_raw_parts_mut(out, n).copy_from_slice(&ids[..n]);
    }
    c_int::try_from(ids.len()).unwrap_or(c_int::MAX)
}

/// Algorithm ids usable under the active profile.
///
/// Returns the total count; at most `capacity` ids are written. Pass a null
/// `out` to query the count.
///
/// # Safety
/// `out` must be null or valid for `capacity` writes.
#[no_mangle]
pub unsafe extern "C" fn crypto_bridge_supported_algorithms(
    out: *mut c_int,
    capacity: c_int,
) -> c_int {
    guarded(|| {
        let ids: Vec<c_int> = bridge()
            .supported_algorithms()
            .iter()
            .map(|alg| alg.as_raw())
            .collect();
        write_ids(&ids, out, capacity)
    })
}

/// Mode ids `algorithm` accepts under the active profile. Same contract as
/// [`crypto_bridge_supported_algorithms`].
///
/// # Safety
/// `out` must be null or valid for `capacity` writes.
#[no_mangle]
pub unsafe extern "C" fn crypto_bridge_supported_modes(
    algorithm: c_int,
    out: *mut c_int,
    capacity: c_int,
) -> c_int {
    guarded(|| {
        let ids: Vec<c_int> = bridge()
            .supported_modes(algorithm)
            .iter()
            .map(|mode| mode.as_raw())
            .collect();
        write_ids(&ids, out, capacity)
    })
}

/// Human-readable text for a status code. Static; do not free.
#[no_mangle]
pub extern "C" fn crypto_bridge_status_message(status: c_int) -> *const c_char {
    let messages = MESSAGES.get_or_init(|| {
        StatusCode::ALL
            .iter()
            .map(|s| CString::new(s.message()).unwrap_or_default())
            .collect()
    });
    let status = StatusCode::from_raw(status).unwrap_or(StatusCode::UnknownError);
    let idx = StatusCode::ALL
        .iter()
        .position(|s| *s == status)
        .unwrap_or(StatusCode::ALL.len() - 1);
    messages[idx].as_ptr()
}
