//! FFI smoke tests.
//!
//! These tests call the exported `extern "C"` functions directly (as an external consumer would),
//! to validate:
//! - ABI surface compiles and links
//! - allocation/free symmetry for returned buffers
//! - snapshot/restore round-trip works

use std::ptr;

use oraclex_ffi::*;

fn s(s: &str) -> OxStr {
    OxStr {
        ptr: s.as_ptr(),
        len: s.len(),
    }
}

fn bytes_to_string(b: &OxBytes) -> String {
    let slice = unsafe { std::slice::from_raw_parts(b.ptr, b.len) };
    String::from_utf8(slice.to_vec()).unwrap()
}

const EVT1: &str = r#"{"eventId":"evt1","description":"","timestamp":1700000000,"chainId":1}"#;
const EVT1_HASH: &str = "0x4c0f51271e72376415bbb639e19f2f4597e8e334fbb5fdf59eb14e1d9792e4a1";
const EVT1_EXPLANATION: &str =
    "Signals: words=0, keywordWeight=0, lengthSignal=0. Deterministic seed=2333c78acaa0";

#[test]
fn ffi_version() {
    assert_eq!(oraclex_ffi_version(), ORACLEX_FFI_VERSION);
}

#[test]
fn ffi_resolve_and_free() {
    let res = unsafe { oraclex_resolve_json(s(EVT1), 0) };
    assert_eq!(res.rc, 0);
    assert!(!res.json.ptr.is_null());

    let v: serde_json::Value = serde_json::from_str(&bytes_to_string(&res.json)).unwrap();
    assert_eq!(v["probability"], 68);
    assert_eq!(v["aiHash"], EVT1_HASH);

    unsafe { oraclex_bytes_free(res.json) };
}

#[test]
fn ffi_resolve_errors() {
    let res = unsafe { oraclex_resolve_json(s("not json"), 0) };
    assert_eq!(res.rc, -2);
    assert!(bytes_to_string(&res.json).contains("\"error\""));
    unsafe { oraclex_bytes_free(res.json) };

    let res = unsafe {
        oraclex_resolve_json(
            OxStr {
                ptr: ptr::null(),
                len: 0,
            },
            0,
        )
    };
    assert_eq!(res.rc, -1);
    assert!(res.json.ptr.is_null());
}

#[test]
fn ffi_verify_commitment() {
    let ok = unsafe { oraclex_verify_commitment(68, s(EVT1_EXPLANATION), s(EVT1_HASH)) };
    assert_eq!(ok, 1);

    let bad = unsafe { oraclex_verify_commitment(69, s(EVT1_EXPLANATION), s(EVT1_HASH)) };
    assert_eq!(bad, 0);

    let out_of_range = unsafe { oraclex_verify_commitment(300, s(EVT1_EXPLANATION), s(EVT1_HASH)) };
    assert_eq!(out_of_range, 0);
}

#[test]
fn ffi_registry_commit_conflict_and_lookup() {
    let h = oraclex_registry_new(0);
    assert!(!h.is_null());

    let res = unsafe { oraclex_registry_commit(h, s("market-1"), s(EVT1)) };
    assert_eq!(res.rc, 0);
    unsafe { oraclex_bytes_free(res.json) };

    let other = r#"{"eventId":"evt1","description":"","timestamp":1700000001,"chainId":1}"#;
    let res = unsafe { oraclex_registry_commit(h, s("market-1"), s(other)) };
    assert_eq!(res.rc, -3);
    unsafe { oraclex_bytes_free(res.json) };

    let hash = unsafe { oraclex_registry_commitment(h, s("market-1")) };
    assert_eq!(bytes_to_string(&hash), EVT1_HASH);
    unsafe { oraclex_bytes_free(hash) };

    let missing = unsafe { oraclex_registry_commitment(h, s("market-2")) };
    assert!(missing.ptr.is_null());

    unsafe { oraclex_registry_free(h) };
}

#[test]
fn ffi_snapshot_restore_roundtrip() {
    let h = oraclex_registry_new(0);
    let res = unsafe { oraclex_registry_commit(h, s("market-rt"), s(EVT1)) };
    unsafe { oraclex_bytes_free(res.json) };

    // Snapshot.
    let snap = unsafe { oraclex_registry_snapshot(h) };
    assert!(!snap.ptr.is_null());
    assert!(snap.len >= 12); // magic + version + count

    // Restore into a fresh handle (clear then load).
    let h2 = oraclex_registry_new(0);
    let stats = unsafe { oraclex_registry_restore_stats(h2, snap.ptr as *const u8, snap.len, 0) };
    assert_eq!(stats.rc, 0);
    assert_eq!(stats.applied, 1);
    assert_eq!((stats.unchanged, stats.conflicts, stats.rejected), (0, 0, 0));

    let hash = unsafe { oraclex_registry_commitment(h2, s("market-rt")) };
    assert_eq!(bytes_to_string(&hash), EVT1_HASH);
    unsafe { oraclex_bytes_free(hash) };

    // Merge into the original: the record already on file is left alone.
    let stats = unsafe { oraclex_registry_restore_stats(h, snap.ptr as *const u8, snap.len, 1) };
    assert_eq!(stats.rc, 0);
    assert_eq!((stats.applied, stats.unchanged), (0, 1));

    // Short buffers reach the decoder and report a truncated header.
    let stats = unsafe { oraclex_registry_restore_stats(h2, snap.ptr as *const u8, 4, 0) };
    assert_eq!(stats.rc, -2);

    // Corrupt magic.
    let mut bad = unsafe { std::slice::from_raw_parts(snap.ptr, snap.len) }.to_vec();
    bad[0] ^= 0xff;
    let stats = unsafe { oraclex_registry_restore_stats(h2, bad.as_ptr(), bad.len(), 0) };
    assert_eq!(stats.rc, -8);

    unsafe { oraclex_bytes_free(snap) };
    unsafe { oraclex_registry_free(h) };
    unsafe { oraclex_registry_free(h2) };
}

#[test]
fn ffi_merge_never_replaces_a_commitment() {
    let h = oraclex_registry_new(0);
    let res = unsafe { oraclex_registry_commit(h, s("m"), s(EVT1)) };
    unsafe { oraclex_bytes_free(res.json) };

    // A different, valid commitment for the same market.
    let other = oraclex_registry_new(0);
    let later = r#"{"eventId":"evt1","description":"","timestamp":1700000001,"chainId":1}"#;
    let res = unsafe { oraclex_registry_commit(other, s("m"), s(later)) };
    unsafe { oraclex_bytes_free(res.json) };
    let snap = unsafe { oraclex_registry_snapshot(other) };

    let stats = unsafe { oraclex_registry_restore_stats(h, snap.ptr as *const u8, snap.len, 1) };
    assert_eq!(stats.rc, 0);
    assert_eq!((stats.applied, stats.conflicts), (0, 1));

    let hash = unsafe { oraclex_registry_commitment(h, s("m")) };
    assert_eq!(bytes_to_string(&hash), EVT1_HASH);
    unsafe { oraclex_bytes_free(hash) };

    unsafe { oraclex_bytes_free(snap) };
    unsafe { oraclex_registry_free(other) };
    unsafe { oraclex_registry_free(h) };
}

#[test]
fn ffi_commit_rejects_malformed_hex_market_id() {
    let h = oraclex_registry_new(0);
    let res = unsafe { oraclex_registry_commit(h, s("0xnot-a-bytes32"), s(EVT1)) };
    assert_eq!(res.rc, -4);
    assert!(bytes_to_string(&res.json).contains("invalid market id"));
    unsafe { oraclex_bytes_free(res.json) };
    unsafe { oraclex_registry_free(h) };
}
