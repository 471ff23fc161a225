//! Small standalone helpers shared by the rest of the crate.

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Returns the current time as a Unix timestamp, truncated to 32 bits like the on-disk fields
/// that store it.
pub fn get_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock panic")
        .as_secs() as u32
}

/// Divides `n` by `d`, rounding up.
pub fn ceil_division(n: u32, d: u32) -> u32 {
    n.div_ceil(d)
}

/// Rounds `n` up to the next multiple of 4.
pub fn round_up4(n: u32) -> u32 {
    (n + 3) & !3
}
