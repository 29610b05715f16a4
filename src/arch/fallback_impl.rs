//! Fallback backend for architectures without a supported cycle counter.
//!
//! Uses a process-wide atomic tick counter so that repeated calls still
//! observe distinct, monotonically increasing values, standing in for the
//! cycle field when no hardware cycle counter is available.

use core::sync::atomic::{AtomicU64, Ordering};

static TICKS: AtomicU64 = AtomicU64::new(0);

pub fn read_cycle_counter() -> u64 {
    TICKS.fetch_add(1, Ordering::Relaxed)
}

pub fn try_hardware_random(_dest: &mut [u64]) -> bool {
    false
}

pub fn current_cpu_id() -> usize {
    0
}
