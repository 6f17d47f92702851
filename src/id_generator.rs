use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

// Single process-wide counter for all widgets. Starts at 1 so 0 stays the failure sentinel.
static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

pub fn generate_id() -> NonZeroU64 {
    let raw = NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed);
    NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN)
}
