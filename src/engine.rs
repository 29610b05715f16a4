//! Public engine API.
//!
//! The engine's state is not a single struct instance — each component
//! (`seed::FAST_SEED`/`SLOW_SEED`, `input::FAST_STAGING`/`SLOW_STAGING`,
//! `swiftbuffer::SWIFT_BUFFER`, `output`'s counter, `bootstrap`'s init flag)
//! is already a process-wide static guarded by its own lock or atomic,
//! mirroring the original C driver's module-level globals
//! (`seed_fast`/`seed_slow`/`input_fast`/`input_slow`/`buffer`) more
//! directly than wrapping them in one synthetic struct would. This module is
//! the thin public facade over all of it — see `DESIGN.md` for why a single
//! owned `Engine` value was not introduced.

use crate::arch;
use crate::bootstrap;
use crate::error::WhirlwindResult;
use crate::input::InputRecord;
use crate::output::{self, OutputSink};
use crate::router;
use crate::swiftbuffer::SWIFT_BUFFER;

/// Add a single input to the RNG, tagged with `source_id` and up to 64 bits
/// of caller-provided data, as `ww_add_input` does.
pub fn add_input(source_id: u32, value1: u32, value2: u32) {
    router::route(InputRecord {
        source_id,
        cycles: arch::read_cycle_counter() as u32,
        value1,
        value2,
    });
}

/// Add a buffer of arbitrary bytes as input, packing 4 bytes at a time into
/// `value1` then `value2` per record, as `ww_add_input_buffer` does. No-ops
/// on an empty buffer.
pub fn add_input_buffer(source_id: u32, buffer: &[u8]) {
    if buffer.is_empty() {
        return;
    }

    let mut i = 0;
    while i < buffer.len() {
        let cycles = arch::read_cycle_counter() as u32;

        let (value1, consumed1) = take_word(buffer, i);
        i += consumed1;
        let (value2, consumed2) = take_word(buffer, i);
        i += consumed2;

        router::route(InputRecord {
            source_id,
            cycles,
            value1,
            value2,
        });

        if consumed1 == 0 && consumed2 == 0 {
            break;
        }
    }
}

/// Read up to 4 bytes starting at `offset` into a little-endian `u32`,
/// zero-padding any short tail. Returns the word and how many bytes were
/// actually consumed.
fn take_word(buffer: &[u8], offset: usize) -> (u32, usize) {
    if offset >= buffer.len() {
        return (0, 0);
    }
    let end = core::cmp::min(offset + 4, buffer.len());
    let mut word = [0u8; 4];
    word[..end - offset].copy_from_slice(&buffer[offset..end]);
    (u32::from_le_bytes(word), end - offset)
}

/// Fill `buffer` with random bytes (`get_random_bytes`).
pub fn get_random_bytes(buffer: &mut [u8]) -> WhirlwindResult<()> {
    let len = buffer.len();
    output::generate_bytes(buffer, len)
}

/// Generate `length` random bytes through a caller-supplied [`OutputSink`],
/// for callers that don't have a plain `&mut [u8]` destination (e.g. a
/// fallible user-space copy). Exposes the same failure mode as
/// `get_random_bytes`, just without requiring a local buffer.
pub fn generate_bytes(sink: &mut dyn OutputSink, length: usize) -> WhirlwindResult<()> {
    output::generate_bytes(sink, length)
}

/// A single random `u64` (`get_random_ulong`).
pub fn get_random_ulong() -> WhirlwindResult<u64> {
    let mut bytes = [0u8; 8];
    get_random_bytes(&mut bytes)?;
    Ok(u64::from_ne_bytes(bytes))
}

/// Generate a version-4, variant-1 (DCE) random UUID (`generate_random_uuid`).
pub fn random_uuid() -> WhirlwindResult<[u8; 16]> {
    let mut uuid = [0u8; 16];
    get_random_bytes(&mut uuid)?;
    uuid[6] = (uuid[6] & 0x0f) | 0x40;
    uuid[8] = (uuid[8] & 0x3f) | 0x80;
    Ok(uuid)
}

/// Default page size `randomize_range` aligns to (`PAGE_ALIGN` in the
/// original, which picks the machine's page size). Use
/// `randomize_range_with_page_size` to supply a different one.
pub const DEFAULT_PAGE_SIZE: u64 = 4096;

/// Round `addr` up to the next multiple of `page_size` (`page_size` must be
/// a power of two).
fn page_align_up(addr: u64, page_size: u64) -> u64 {
    (addr + page_size - 1) & !(page_size - 1)
}

/// Round `addr` down to the nearest multiple of `page_size`.
fn page_align_down(addr: u64, page_size: u64) -> u64 {
    addr & !(page_size - 1)
}

/// Return a randomized, page-aligned start address for a `len`-byte region
/// inside `[start, end)`, or `0` if no such region fits (`randomize_range`).
/// Aligns to [`DEFAULT_PAGE_SIZE`]; see `randomize_range_with_page_size` to
/// supply a different page size.
pub fn randomize_range(start: u64, end: u64, len: u64) -> u64 {
    randomize_range_with_page_size(start, end, len, DEFAULT_PAGE_SIZE)
}

/// As `randomize_range`, but page-aligns to `page_size` (a power of two)
/// instead of [`DEFAULT_PAGE_SIZE`]. The original picks the machine's page
/// size at compile time; this crate takes it as a parameter so a test can
/// supply its own.
pub fn randomize_range_with_page_size(start: u64, end: u64, len: u64, page_size: u64) -> u64 {
    if end <= start + len {
        return 0;
    }
    let range = end - len - start;
    let mut bytes = [0u8; 8];
    // A fault here can only come from this crate's own internal buffer
    // path, never a user-space copy, so it is infallible in practice.
    let _ = get_random_bytes(&mut bytes);
    let r = u64::from_ne_bytes(bytes);
    let candidate = start + (r % range);

    // The largest page-aligned start that still leaves room for `len`
    // bytes before `end`. If that falls below `start`, no aligned region
    // fits at all.
    let last_fit = page_align_down(end - len, page_size);
    if last_fit < start {
        return 0;
    }
    page_align_up(candidate, page_size).min(last_fit)
}

/// Feed one interrupt-time entropy sample into the SwiftBuffer
/// (`add_interrupt_randomness`). Safe to call from interrupt context.
///
/// The original folds `irq_flags ^ rip` (the faulting instruction pointer).
/// This crate has no interrupt-frame/instruction-pointer concept of its
/// own, so it substitutes `arch::current_task_id()` — like `rip`, it's a
/// cheap, call-site-correlated value, not a source of real entropy on its
/// own (see `DESIGN.md`).
pub fn add_interrupt_sample(irq: i32, irq_flags: u64) {
    let rip_substitute = arch::current_task_id();
    let cycles = arch::read_cycle_counter();
    SWIFT_BUFFER.add_interrupt_sample(irq, irq_flags, rip_substitute, cycles);
}

/// Run the one-time bootstrap early, if a caller wants deterministic
/// initialization timing rather than paying for it lazily on first output.
pub fn ensure_initialized() {
    bootstrap::ensure_initialized();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_uuid_has_version_and_variant_bits_set() {
        let uuid = random_uuid().unwrap();
        assert_eq!(uuid[6] & 0xf0, 0x40);
        assert_eq!(uuid[8] & 0xc0, 0x80);
    }

    #[test]
    fn randomize_range_respects_bounds_and_alignment() {
        for _ in 0..50 {
            let start = randomize_range_with_page_size(1000, 2000, 100, 8);
            assert!(start == 0 || (start >= 1000 && start + 100 <= 2000));
            assert_eq!(start % 8, 0);
        }
    }

    #[test]
    fn randomize_range_rejects_oversized_length() {
        assert_eq!(randomize_range(0, 10, 20), 0);
    }

    #[test]
    fn randomize_range_rejects_when_no_aligned_region_fits() {
        // range is wide enough for `len` bytes but too narrow for any
        // 4096-aligned start to fit before `end`.
        assert_eq!(randomize_range_with_page_size(1, 4097, 4000, 4096), 0);
    }

    #[test]
    fn add_input_buffer_handles_short_and_empty_buffers() {
        add_input_buffer(1, &[]);
        add_input_buffer(1, b"x");
        add_input_buffer(1, b"0123456789abcdef0123");
    }
}
