//! Input record and per-CPU staging.
//!
//! Grounded on `original_source/drivers/char/whirlwind-input.c`'s
//! `rng_input`, `input_fast`/`input_slow` per-CPU buffers, and
//! `add_to_seed`. Each CPU slot accumulates raw input records into a
//! [`crate::hash::BLOCK_BYTES`]-sized buffer; once full, its contents are
//! folded into the target seed pool and the buffer wraps.

use spin::Mutex;

use crate::arch::MAX_CPUS;
use crate::hash::BLOCK_BYTES;
use crate::seed::SeedPool;

/// Size in bytes of one input record (`source_id`, `cycles`, `value1`,
/// `value2`, each `u32`).
pub const RECORD_BYTES: usize = 16;

/// A single contribution of entropy from some source in the embedding
/// system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRecord {
    pub source_id: u32,
    pub cycles: u32,
    pub value1: u32,
    pub value2: u32,
}

impl InputRecord {
    /// An input whose every field is zero contributes nothing and is
    /// silently discarded, matching `add_to_seed`'s
    /// `source_id + cycles + value1 + value2 == 0` check.
    pub fn is_sentinel(&self) -> bool {
        self.source_id
            .wrapping_add(self.cycles)
            .wrapping_add(self.value1)
            .wrapping_add(self.value2)
            == 0
    }

    /// Serialize to native-endian bytes for staging-buffer packing. Native
    /// (not big-endian) because these bytes are only ever folded through
    /// `compress`, never compared across platforms.
    pub fn to_bytes(self) -> [u8; RECORD_BYTES] {
        let mut out = [0u8; RECORD_BYTES];
        out[0..4].copy_from_slice(&self.source_id.to_ne_bytes());
        out[4..8].copy_from_slice(&self.cycles.to_ne_bytes());
        out[8..12].copy_from_slice(&self.value1.to_ne_bytes());
        out[12..16].copy_from_slice(&self.value2.to_ne_bytes());
        out
    }
}

/// One CPU's staging buffer for one seed pool: a ring of exactly one hash
/// input block, plus a write cursor into it.
struct StagingSlot {
    buffer: [u8; BLOCK_BYTES],
    write_index: usize,
}

impl StagingSlot {
    const fn new() -> Self {
        StagingSlot {
            buffer: [0u8; BLOCK_BYTES],
            write_index: 0,
        }
    }

    /// Write `data` into the buffer starting at the current cursor, folding
    /// into `pool` and wrapping every time the buffer fills, exactly as
    /// `add_to_seed` does with `memcpy_limit`.
    fn write(&mut self, data: &[u8], pool: &SeedPool) {
        let mut offset = 0;
        while offset < data.len() {
            let space = BLOCK_BYTES - self.write_index;
            let chunk = core::cmp::min(space, data.len() - offset);

            self.buffer[self.write_index..self.write_index + chunk]
                .copy_from_slice(&data[offset..offset + chunk]);
            self.write_index += chunk;
            offset += chunk;

            if self.write_index == BLOCK_BYTES {
                pool.fold(&self.buffer);
                self.write_index = 0;
            }
        }
    }
}

/// Per-CPU staging state for one seed pool, indexed by `arch::current_cpu_id`.
///
/// The original kernel driver relies on pre-emption being disabled around
/// `get_cpu_var`/`put_cpu_var` to make per-CPU access race-free without a
/// lock. This crate has no way to disable pre-emption (it is a library, not
/// a kernel), so each slot carries its own `spin::Mutex` as a safety net —
/// see `DESIGN.md`.
pub struct PerCpuStaging {
    slots: [Mutex<StagingSlot>; MAX_CPUS],
}

impl PerCpuStaging {
    pub const fn new() -> Self {
        // `Mutex::new` and `StagingSlot::new` are both const, but there is
        // no const `[T; N]::from_fn`-free way to build the array generically
        // without an explicit repeat literal at this array size; expand it
        // once via a helper array constant to keep this readable.
        const SLOT: Mutex<StagingSlot> = Mutex::new(StagingSlot::new());
        PerCpuStaging {
            slots: [SLOT; MAX_CPUS],
        }
    }

    /// Stage `data` for `cpu`, folding into `pool` whenever the per-CPU
    /// buffer fills.
    pub fn write(&self, cpu: usize, data: &[u8], pool: &SeedPool) {
        let cpu = cpu % MAX_CPUS;
        self.slots[cpu].lock().write(data, pool);
    }
}

impl Default for PerCpuStaging {
    fn default() -> Self {
        Self::new()
    }
}

/// Fast pool's per-CPU staging buffers.
pub static FAST_STAGING: PerCpuStaging = PerCpuStaging::new();

/// Slow pool's per-CPU staging buffers.
pub static SLOW_STAGING: PerCpuStaging = PerCpuStaging::new();
