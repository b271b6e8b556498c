use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use economy::{ActionKind, CreditLedger, MemoryStore, BALANCE_EVENT};
use session::{Activity, ActivityFeed, EcosystemCache};

// ============================================================================
// String Management
// ============================================================================

/// Free a string that was allocated by Rust
#[no_mangle]
pub extern "C" fn bizpilot_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            drop(CString::from_raw(ptr));
        }
    }
}

/// Helper to convert Rust string to C string
fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s)
        .map(|cs| cs.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

/// Helper to convert C string to Rust string
fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe {
        CStr::from_ptr(ptr)
            .to_str()
            .ok()
            .map(|s| s.to_string())
    }
}

// ============================================================================
// Credit Ledger FFI
// ============================================================================

/// Create a new CreditLedger backed by in-memory storage
#[no_mangle]
pub extern "C" fn credit_ledger_new() -> *mut CreditLedger {
    Box::into_raw(Box::new(CreditLedger::new(MemoryStore::new())))
}

/// Name of the balance-updated event the UI should dispatch on
#[no_mangle]
pub extern "C" fn credit_ledger_balance_event() -> *mut c_char {
    to_c_string(BALANCE_EVENT)
}

/// Free a CreditLedger
#[no_mangle]
pub extern "C" fn credit_ledger_free(ptr: *mut CreditLedger) {
    if !ptr.is_null() {
        unsafe {
            drop(Box::from_raw(ptr));
        }
    }
}

/// Get the current balance
#[no_mangle]
pub extern "C" fn credit_ledger_balance(ptr: *const CreditLedger) -> u64 {
    if ptr.is_null() {
        return 0;
    }

    let ledger = unsafe { &*ptr };
    ledger.balance()
}

/// Set the balance; negative values are clamped to zero
#[no_mangle]
pub extern "C" fn credit_ledger_set_balance(ptr: *mut CreditLedger, value: i64) {
    if ptr.is_null() {
        return;
    }

    let ledger = unsafe { &mut *ptr };
    ledger.set_balance(value);
}

/// Charge for a priced action, returns charge result as JSON
#[no_mangle]
pub extern "C" fn credit_ledger_charge(
    ptr: *mut CreditLedger,
    action: *const c_char,
) -> *mut c_char {
    if ptr.is_null() {
        return to_c_string(r#"{"error": "null ledger pointer"}"#);
    }

    let action_str = match from_c_string(action) {
        Some(s) => s,
        None => return to_c_string(r#"{"error": "invalid action"}"#),
    };

    let kind: ActionKind = match action_str.parse() {
        Ok(k) => k,
        Err(e) => return to_c_string(&format!(r#"{{"error": "{}"}}"#, e)),
    };

    let ledger = unsafe { &mut *ptr };
    let charged = ledger.charge(kind);
    let json = serde_json::json!({
        "charged": charged,
        "balance": ledger.balance()
    });

    to_c_string(&json.to_string())
}

/// Subscribe to balance updates, returns the subscriber ID
#[no_mangle]
pub extern "C" fn credit_ledger_subscribe(
    ptr: *mut CreditLedger,
    callback: extern "C" fn(u64),
) -> u64 {
    if ptr.is_null() {
        return 0;
    }

    let ledger = unsafe { &mut *ptr };
    ledger.subscribe(move |update| callback(update.balance))
}

/// Remove a subscriber, returns whether it was registered
#[no_mangle]
pub extern "C" fn credit_ledger_unsubscribe(ptr: *mut CreditLedger, id: u64) -> bool {
    if ptr.is_null() {
        return false;
    }

    let ledger = unsafe { &mut *ptr };
    ledger.unsubscribe(id)
}

// ============================================================================
// Activity Feed FFI
// ============================================================================

/// Create a new ActivityFeed
#[no_mangle]
pub extern "C" fn activity_feed_new() -> *mut ActivityFeed {
    Box::into_raw(Box::new(ActivityFeed::new()))
}

/// Free an ActivityFeed
#[no_mangle]
pub extern "C" fn activity_feed_free(ptr: *mut ActivityFeed) {
    if !ptr.is_null() {
        unsafe {
            drop(Box::from_raw(ptr));
        }
    }
}

/// Add an activity from JSON, returns the assigned ID
#[no_mangle]
pub extern "C" fn activity_feed_add(
    ptr: *mut ActivityFeed,
    activity_json: *const c_char,
) -> *mut c_char {
    if ptr.is_null() {
        return to_c_string(r#"{"error": "null feed pointer"}"#);
    }

    let json_str = match from_c_string(activity_json) {
        Some(s) => s,
        None => return to_c_string(r#"{"error": "invalid activity JSON"}"#),
    };

    let activity: Activity = match serde_json::from_str(&json_str) {
        Ok(a) => a,
        Err(e) => return to_c_string(&format!(r#"{{"error": "{}"}}"#, e)),
    };

    let feed = unsafe { &mut *ptr };
    let id = feed.add(activity);

    to_c_string(&format!(r#"{{"id": "{}"}}"#, id))
}

/// Add an activity only if the signature is new; "id" is null when suppressed
#[no_mangle]
pub extern "C" fn activity_feed_add_once(
    ptr: *mut ActivityFeed,
    signature: *const c_char,
    activity_json: *const c_char,
) -> *mut c_char {
    if ptr.is_null() {
        return to_c_string(r#"{"error": "null feed pointer"}"#);
    }

    let sig = match from_c_string(signature) {
        Some(s) => s,
        None => return to_c_string(r#"{"error": "invalid signature"}"#),
    };

    let json_str = match from_c_string(activity_json) {
        Some(s) => s,
        None => return to_c_string(r#"{"error": "invalid activity JSON"}"#),
    };

    let activity: Activity = match serde_json::from_str(&json_str) {
        Ok(a) => a,
        Err(e) => return to_c_string(&format!(r#"{{"error": "{}"}}"#, e)),
    };

    let feed = unsafe { &mut *ptr };
    let json = serde_json::json!({ "id": feed.add_once(sig, activity) });

    to_c_string(&json.to_string())
}

/// Get all feed entries as a JSON array, newest first
#[no_mangle]
pub extern "C" fn activity_feed_items(ptr: *const ActivityFeed) -> *mut c_char {
    if ptr.is_null() {
        return to_c_string("[]");
    }

    let feed = unsafe { &*ptr };
    let items: Vec<_> = feed.items().collect();

    match serde_json::to_string(&items) {
        Ok(json) => to_c_string(&json),
        Err(_) => to_c_string("[]"),
    }
}

/// Number of retained entries
#[no_mangle]
pub extern "C" fn activity_feed_len(ptr: *const ActivityFeed) -> usize {
    if ptr.is_null() {
        return 0;
    }

    let feed = unsafe { &*ptr };
    feed.len()
}

/// Remove all entries
#[no_mangle]
pub extern "C" fn activity_feed_clear(ptr: *mut ActivityFeed) {
    if ptr.is_null() {
        return;
    }

    let feed = unsafe { &mut *ptr };
    feed.clear();
}

// ============================================================================
// Ecosystem Cache FFI
// ============================================================================

/// Create a new EcosystemCache
#[no_mangle]
pub extern "C" fn ecosystem_cache_new() -> *mut EcosystemCache {
    Box::into_raw(Box::new(EcosystemCache::new()))
}

/// Free an EcosystemCache
#[no_mangle]
pub extern "C" fn ecosystem_cache_free(ptr: *mut EcosystemCache) {
    if !ptr.is_null() {
        unsafe {
            drop(Box::from_raw(ptr));
        }
    }
}

/// Merge a JSON object into the pending summary for a channel
#[no_mangle]
pub extern "C" fn ecosystem_cache_set_summary(
    ptr: *mut EcosystemCache,
    channel: *const c_char,
    patch_json: *const c_char,
) -> *mut c_char {
    if ptr.is_null() {
        return to_c_string(r#"{"error": "null cache pointer"}"#);
    }

    let channel_name = match from_c_string(channel) {
        Some(s) => s,
        None => return to_c_string(r#"{"error": "invalid channel"}"#),
    };

    let json_str = match from_c_string(patch_json) {
        Some(s) => s,
        None => return to_c_string(r#"{"error": "invalid patch JSON"}"#),
    };

    let patch: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(&json_str) {
        Ok(p) => p,
        Err(e) => return to_c_string(&format!(r#"{{"error": "{}"}}"#, e)),
    };

    let cache = unsafe { &mut *ptr };
    cache.set_summary(channel_name, patch);

    to_c_string(r#"{"success": true}"#)
}

/// Read the pending summary without consuming it, JSON "null" when absent
#[no_mangle]
pub extern "C" fn ecosystem_cache_peek(
    ptr: *const EcosystemCache,
    channel: *const c_char,
) -> *mut c_char {
    if ptr.is_null() {
        return to_c_string("null");
    }

    let channel_name = match from_c_string(channel) {
        Some(s) => s,
        None => return to_c_string("null"),
    };

    let cache = unsafe { &*ptr };
    match cache.peek(&channel_name) {
        Some(summary) => match serde_json::to_string(summary) {
            Ok(json) => to_c_string(&json),
            Err(_) => to_c_string("null"),
        },
        None => to_c_string("null"),
    }
}

/// Consume the pending summary, JSON "null" when absent
#[no_mangle]
pub extern "C" fn ecosystem_cache_take(
    ptr: *mut EcosystemCache,
    channel: *const c_char,
) -> *mut c_char {
    if ptr.is_null() {
        return to_c_string("null");
    }

    let channel_name = match from_c_string(channel) {
        Some(s) => s,
        None => return to_c_string("null"),
    };

    let cache = unsafe { &mut *ptr };
    match cache.get_and_clear(&channel_name) {
        Some(summary) => match serde_json::to_string(&summary) {
            Ok(json) => to_c_string(&json),
            Err(_) => to_c_string("null"),
        },
        None => to_c_string("null"),
    }
}
