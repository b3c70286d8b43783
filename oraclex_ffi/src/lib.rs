#![allow(clippy::missing_safety_doc)]

use std::ptr;

use oraclex_core::{verify_commitment, Probability, ResolverCfg};
use oraclex_proxy::{
    handle, render, CommitRecord, CommitmentRegistry, Envelope, RegistryError, RegistrySnapshot,
};

/// FFI ABI version for oraclex_ffi.
///
/// Bump this when any `#[repr(C)]` struct layout or exported function signature changes.
pub const ORACLEX_FFI_VERSION: u32 = 2;

#[no_mangle]
pub extern "C" fn oraclex_ffi_version() -> u32 {
    ORACLEX_FFI_VERSION
}

// Snapshot wire format identification.
const SNAP_MAGIC: u32 = 0x3158_524F; // "ORX1" little-endian
const SNAP_VERSION: u32 = 1;
const SNAP_HEADER_LEN: usize = 12;

/// Opaque registry handle exposed over FFI.
pub struct OxRegistry {
    inner: CommitmentRegistry,
}

/// FFI string view (UTF-8 bytes).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct OxStr {
    pub ptr: *const u8,
    pub len: usize,
}

impl OxStr {
    fn as_str(&self) -> Option<&str> {
        if self.ptr.is_null() {
            return None;
        }
        let bytes = unsafe { std::slice::from_raw_parts(self.ptr, self.len) };
        std::str::from_utf8(bytes).ok()
    }
}

/// Owned byte buffer (JSON envelope or snapshot). Free with `oraclex_bytes_free`.
#[repr(C)]
pub struct OxBytes {
    pub ptr: *mut u8,
    pub len: usize,
}

impl OxBytes {
    fn null() -> Self {
        OxBytes { ptr: ptr::null_mut(), len: 0 }
    }

    fn from_vec(buf: Vec<u8>) -> Self {
        let mut boxed = buf.into_boxed_slice();
        let ptr = boxed.as_mut_ptr();
        let len = boxed.len();
        std::mem::forget(boxed);
        OxBytes { ptr, len }
    }
}

/// Result of a resolve call.
///
/// `json` always holds a response envelope when `rc >= -2`:
/// - `0`  success shape `{probability, explanation, aiHash}`
/// - `-1` null/invalid input handle or string (json is null)
/// - `-2` error shape `{error}` (malformed request)
/// - `-3` commitment conflict (registry only; json holds `{error}`)
/// - `-4` invalid market id (registry only; json holds `{error}`)
#[repr(C)]
pub struct OxResolveResult {
    pub json: OxBytes,
    pub rc: i32,
}

/// Restore result statistics (FFI-safe).
#[repr(C)]
#[derive(Default)]
pub struct OxRestoreStats {
    pub applied: u32,
    pub unchanged: u32,
    pub conflicts: u32,
    pub rejected: u32,
    pub rc: i32,
}

impl OxRestoreStats {
    fn err(rc: i32) -> Self {
        OxRestoreStats { rc, ..Default::default() }
    }
}

fn cfg_from_ffi(allow_clock_fallback: u8) -> ResolverCfg {
    if allow_clock_fallback != 0 {
        ResolverCfg::with_clock_fallback()
    } else {
        ResolverCfg::default()
    }
}

fn envelope_result(envelope: &Envelope, rc_on_error: i32) -> OxResolveResult {
    let rc = if envelope.is_error() { rc_on_error } else { 0 };
    OxResolveResult {
        json: OxBytes::from_vec(render(envelope, false).into_bytes()),
        rc,
    }
}

/// Resolve one JSON request. Returns an owned envelope (free with `oraclex_bytes_free`).
#[no_mangle]
pub unsafe extern "C" fn oraclex_resolve_json(input: OxStr, allow_clock_fallback: u8) -> OxResolveResult {
    if input.ptr.is_null() {
        return OxResolveResult { json: OxBytes::null(), rc: -1 };
    }
    let bytes = std::slice::from_raw_parts(input.ptr, input.len);
    let envelope = handle(bytes, &cfg_from_ffi(allow_clock_fallback));
    envelope_result(&envelope, -2)
}

/// Returns 1 if `ai_hash` commits to (probability, explanation), 0 if not, -1 on bad input.
#[no_mangle]
pub unsafe extern "C" fn oraclex_verify_commitment(probability: u32, explanation: OxStr, ai_hash: OxStr) -> i32 {
    let (Some(explanation), Some(ai_hash)) = (explanation.as_str(), ai_hash.as_str()) else {
        return -1;
    };
    let Some(p) = u8::try_from(probability).ok().and_then(Probability::new) else {
        return 0;
    };
    verify_commitment(p, explanation, ai_hash) as i32
}

/// Create a new registry handle.
///
/// The handle is not synchronized; callers sharing it across threads must serialize access.
#[no_mangle]
pub extern "C" fn oraclex_registry_new(allow_clock_fallback: u8) -> *mut OxRegistry {
    let handle = OxRegistry {
        inner: CommitmentRegistry::new(cfg_from_ffi(allow_clock_fallback)),
    };
    Box::into_raw(Box::new(handle))
}

#[no_mangle]
pub unsafe extern "C" fn oraclex_registry_free(h: *mut OxRegistry) {
    if !h.is_null() {
        drop(Box::from_raw(h));
    }
}

/// Resolve a JSON request and commit it under `market_id`.
#[no_mangle]
pub unsafe extern "C" fn oraclex_registry_commit(
    h: *mut OxRegistry,
    market_id: OxStr,
    request: OxStr,
) -> OxResolveResult {
    if h.is_null() || request.ptr.is_null() {
        return OxResolveResult { json: OxBytes::null(), rc: -1 };
    }
    let Some(market_id) = market_id.as_str() else {
        return OxResolveResult { json: OxBytes::null(), rc: -1 };
    };
    let handle = &mut *h;
    let bytes = std::slice::from_raw_parts(request.ptr, request.len);

    let raw = match oraclex_proxy::parse_request(bytes) {
        Ok(v) => v,
        Err(e) => return envelope_result(&Envelope::Err { error: e.to_string() }, -2),
    };

    match handle.inner.resolve_and_commit(market_id, &raw) {
        Ok(resolution) => envelope_result(&Envelope::Ok(resolution), 0),
        Err(e @ RegistryError::Conflict { .. }) => envelope_result(&Envelope::Err { error: e.to_string() }, -3),
        Err(e @ RegistryError::InvalidMarketId(_)) => {
            envelope_result(&Envelope::Err { error: e.to_string() }, -4)
        }
        Err(e) => envelope_result(&Envelope::Err { error: e.to_string() }, -2),
    }
}

/// Committed aiHash for a market as owned UTF-8 bytes; null if none.
#[no_mangle]
pub unsafe extern "C" fn oraclex_registry_commitment(h: *mut OxRegistry, market_id: OxStr) -> OxBytes {
    if h.is_null() {
        return OxBytes::null();
    }
    let Some(market_id) = market_id.as_str() else {
        return OxBytes::null();
    };
    let handle = &*h;
    match handle.inner.commitment(market_id) {
        Some(hash) => OxBytes::from_vec(hash.as_bytes().to_vec()),
        None => OxBytes::null(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn oraclex_bytes_free(b: OxBytes) {
    if !b.ptr.is_null() {
        let slice_ptr = std::ptr::slice_from_raw_parts_mut(b.ptr, b.len);
        drop(Box::from_raw(slice_ptr));
    }
}

fn push_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

fn encode_snapshot(snap: &RegistrySnapshot) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    buf.extend_from_slice(&SNAP_MAGIC.to_le_bytes());
    buf.extend_from_slice(&SNAP_VERSION.to_le_bytes());
    buf.extend_from_slice(&(snap.records.len() as u32).to_le_bytes());

    for (key, rec) in &snap.records {
        push_str(&mut buf, key);
        buf.extend_from_slice(&(rec.probability.value() as u32).to_le_bytes());
        push_str(&mut buf, &rec.explanation);
        push_str(&mut buf, &rec.ai_hash);
    }
    buf
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn u32(&mut self) -> Option<u32> {
        let end = self.pos.checked_add(4)?;
        let v = u32::from_le_bytes(self.data.get(self.pos..end)?.try_into().ok()?);
        self.pos = end;
        Some(v)
    }

    fn str(&mut self) -> Result<&'a str, i32> {
        let len = self.u32().ok_or(-3)? as usize;
        let end = self.pos.checked_add(len).ok_or(-4)?;
        let bytes = self.data.get(self.pos..end).ok_or(-4)?;
        self.pos = end;
        std::str::from_utf8(bytes).map_err(|_| -5)
    }
}

/// Decode the binary snapshot format; `Err` carries the FFI return code.
fn decode_snapshot(data: &[u8]) -> Result<RegistrySnapshot, i32> {
    let mut r = Reader { data, pos: 0 };

    let magic = r.u32().ok_or(-2)?;
    if magic != SNAP_MAGIC {
        return Err(-8); // bad magic
    }
    let ver = r.u32().ok_or(-2)?;
    if ver != SNAP_VERSION {
        return Err(-9); // unsupported version
    }
    let count = r.u32().ok_or(-2)? as usize;

    // Each record needs at least 16 bytes; don't trust `count` for the allocation.
    let body_len = data.len().saturating_sub(SNAP_HEADER_LEN);
    let mut records: Vec<(String, CommitRecord)> = Vec::with_capacity(count.min(body_len / 16));
    for _ in 0..count {
        let key = r.str()?.to_string();
        let probability = r
            .u32()
            .and_then(|v| u8::try_from(v).ok())
            .and_then(Probability::new)
            .ok_or(-6)?;
        let explanation = r.str()?.to_string();
        let ai_hash = r.str()?.to_string();
        if ai_hash.is_empty() {
            return Err(-7);
        }
        records.push((key, CommitRecord { probability, explanation, ai_hash }));
    }

    Ok(RegistrySnapshot { records })
}

/// Snapshot format (binary, little-endian):
/// [u32 magic = "ORX1"][u32 version = 1][u32 count]
/// repeated count times:
///   [u32 len][market_key][u32 probability][u32 len][explanation][u32 len][ai_hash]
#[no_mangle]
pub unsafe extern "C" fn oraclex_registry_snapshot(h: *mut OxRegistry) -> OxBytes {
    if h.is_null() {
        return OxBytes::null();
    }
    let handle = &*h;
    OxBytes::from_vec(encode_snapshot(&handle.inner.snapshot()))
}

/// Restore from a binary snapshot. `merge != 0` keeps existing records.
///
/// Records are checked the way `commit` checks them; see the counters in
/// `OxRestoreStats`. Existing commitments are never replaced by a merge.
///
/// rc: 0 ok, -1 null handle or buffer, -2 truncated header, -3..-5 bad string
/// field, -6 bad probability, -7 empty hash, -8 bad magic, -9 unsupported version.
#[no_mangle]
pub unsafe extern "C" fn oraclex_registry_restore_stats(
    h: *mut OxRegistry,
    bytes: *const u8,
    len: usize,
    merge: u8,
) -> OxRestoreStats {
    if h.is_null() || bytes.is_null() {
        return OxRestoreStats::err(-1);
    }
    let handle = &mut *h;
    let data = std::slice::from_raw_parts(bytes, len);

    let snap = match decode_snapshot(data) {
        Ok(s) => s,
        Err(rc) => return OxRestoreStats::err(rc),
    };

    let stats = if merge != 0 {
        handle.inner.restore_merge(snap)
    } else {
        handle.inner.restore(snap)
    };

    OxRestoreStats {
        applied: stats.applied as u32,
        unchanged: stats.unchanged as u32,
        conflicts: stats.conflicts as u32,
        rejected: stats.rejected as u32,
        rc: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_bad_headers() {
        assert_eq!(decode_snapshot(&[]).unwrap_err(), -2);
        assert_eq!(decode_snapshot(&SNAP_MAGIC.to_le_bytes()).unwrap_err(), -2);
        assert_eq!(decode_snapshot(&[0u8; 12]).unwrap_err(), -8);

        let mut buf = SNAP_MAGIC.to_le_bytes().to_vec();
        buf.extend_from_slice(&7u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(decode_snapshot(&buf).unwrap_err(), -9);
    }

    #[test]
    fn decode_rejects_truncated_records() {
        let mut buf = encode_snapshot(&RegistrySnapshot::default());
        // claim one record, provide none
        buf[8..12].copy_from_slice(&1u32.to_le_bytes());
        assert_eq!(decode_snapshot(&buf).unwrap_err(), -3);
    }

    #[test]
    fn decode_rejects_out_of_range_probability() {
        let mut buf = SNAP_MAGIC.to_le_bytes().to_vec();
        buf.extend_from_slice(&SNAP_VERSION.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        push_str(&mut buf, "0xaa");
        buf.extend_from_slice(&95u32.to_le_bytes());
        assert_eq!(decode_snapshot(&buf).unwrap_err(), -6);
    }
}
