//! Record id generation.
//!
//! Ids have the form `{prefix}_{n}` where `n` is the current Unix time in
//! milliseconds, bumped so that it is strictly increasing within the process.
//! Two records created in the same millisecond therefore still get distinct ids.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Prefix for user ids
pub const USER_PREFIX: &str = "u";
/// Prefix for service ids
pub const SERVICE_PREFIX: &str = "s";
/// Prefix for store item ids
pub const ITEM_PREFIX: &str = "i";
/// Prefix for order ids
pub const ORDER_PREFIX: &str = "o";
/// Prefix for anonymous cart ids
pub const CART_PREFIX: &str = "cart";

static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

/// Returns a fresh id with the given prefix.
#[must_use]
pub fn next_id(prefix: &str) -> String {
    let now = Utc::now().timestamp_millis();

    // The closure never returns None, so both arms carry the previous value
    let previous = LAST_ISSUED
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or_else(|last| last);

    format!("{prefix}_{}", now.max(previous + 1))
}
