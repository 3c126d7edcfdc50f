//! The timer primitive consumed by transition functions and hooks.

use std::time::Duration;

/// Suspend the current task for `ms` milliseconds.
///
/// The sole suspension source the bundled machines use. `delay(0)` is
/// a valid zero-delay suspension, not a hang. There is no cancellation:
/// a hook already sleeping will wake and push its event regardless of
/// where the machine has moved in the meantime.
pub async fn delay(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
