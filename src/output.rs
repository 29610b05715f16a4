//! Counter-mode output generator.
//!
//! Grounded on `original_source/drivers/char/whirlwind-output.c`
//! (`ww_generate_bytes`) and `whirlwind-hash.c` (`hash_output`): reserve a
//! run of counter values, copy both seeds onto the stack (ratcheting the
//! fast seed forward immediately for forward secrecy), then hash the
//! counter-mode input struct once per output block, incrementing the
//! counter each time.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::arch;
use crate::error::{WhirlwindError, WhirlwindResult};
use crate::hash::{self, DIGEST_BYTES};
use crate::router;
use crate::seed::{FAST_SEED, SLOW_SEED};

/// Domain separation tag for output hashing (fast/slow seed chains use
/// domains 1 and 2; this is domain 3).
const OUTPUT_HASH_DOMAIN: u64 = 3;

const PREFIX_BYTES: usize = 8 + DIGEST_BYTES + DIGEST_BYTES + 8 + 8 + 8 + 8; // 168
const PADDED_BYTES: usize = PREFIX_BYTES.div_ceil(hash::BLOCK_BYTES) * hash::BLOCK_BYTES; // 256
const TAIL_WORDS: usize = (PADDED_BYTES - PREFIX_BYTES) / 8; // 11

/// The hash input for one block of counter-mode output. Stored as native
/// `u64`s; only serialized to big-endian bytes at the point it's fed to
/// [`hash::hash`].
struct CounterModeInput {
    domain: u64,
    seed1: [u8; DIGEST_BYTES],
    seed2: [u8; DIGEST_BYTES],
    counter: u64,
    value1: u64,
    value2: u64,
    value3: u64,
    tail: [u64; TAIL_WORDS],
}

impl CounterModeInput {
    fn to_bytes(&self) -> [u8; PADDED_BYTES] {
        let mut out = [0u8; PADDED_BYTES];
        let mut offset = 0;

        out[offset..offset + 8].copy_from_slice(&self.domain.to_be_bytes());
        offset += 8;
        out[offset..offset + DIGEST_BYTES].copy_from_slice(&self.seed1);
        offset += DIGEST_BYTES;
        out[offset..offset + DIGEST_BYTES].copy_from_slice(&self.seed2);
        offset += DIGEST_BYTES;
        out[offset..offset + 8].copy_from_slice(&self.counter.to_be_bytes());
        offset += 8;
        out[offset..offset + 8].copy_from_slice(&self.value1.to_be_bytes());
        offset += 8;
        out[offset..offset + 8].copy_from_slice(&self.value2.to_be_bytes());
        offset += 8;
        out[offset..offset + 8].copy_from_slice(&self.value3.to_be_bytes());
        offset += 8;
        for word in &self.tail {
            out[offset..offset + 8].copy_from_slice(&word.to_be_bytes());
            offset += 8;
        }
        debug_assert_eq!(offset, PADDED_BYTES);

        out
    }
}

static OUTPUT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Reserve `length` consecutive counter values and return the first one.
fn reserve_counter_range(length: u64) -> u64 {
    OUTPUT_COUNTER.fetch_add(length, Ordering::Relaxed)
}

/// A sink for generated random bytes. Kernel code would dispatch between a
/// kernel-space `memcpy` and a `copy_to_user` that can fault partway
/// through; this crate has no user/kernel address-space split, so the
/// fault path is modeled by making the sink fallible and letting tests
/// supply one that fails partway through.
pub trait OutputSink {
    /// Write `block` starting at `offset` bytes into the destination.
    /// Returns `Err` if the copy could not be completed.
    fn write_at(&mut self, offset: usize, block: &[u8]) -> Result<(), ()>;
}

impl OutputSink for [u8] {
    fn write_at(&mut self, offset: usize, block: &[u8]) -> Result<(), ()> {
        let end = offset + block.len();
        if end > self.len() {
            return Err(());
        }
        self[offset..end].copy_from_slice(block);
        Ok(())
    }
}

/// Generate `length` bytes of random output into `sink`.
pub fn generate_bytes(sink: &mut dyn OutputSink, length: usize) -> WhirlwindResult<()> {
    crate::bootstrap::ensure_initialized();

    let blocks_needed = (length / DIGEST_BYTES + 1) as u64;
    let mut counter = reserve_counter_range(blocks_needed);

    let mut tail = [0u64; TAIL_WORDS];
    arch::try_hardware_random(&mut tail);

    let mut input = CounterModeInput {
        domain: OUTPUT_HASH_DOMAIN,
        seed1: FAST_SEED.take_and_ratchet(),
        seed2: SLOW_SEED.public_seed(),
        counter,
        value1: arch::read_cycle_counter(),
        value2: arch::current_task_id(),
        value3: arch::current_cpu_id() as u64,
        tail,
    };

    // Two feedback inputs, generated before and after the output itself,
    // give some resistance to checkpointing attacks from an attacker
    // sampling very frequently (whirlwind-output.c's `rng_input()` calls).
    feedback_input();

    let mut total = 0usize;
    let result = (|| -> WhirlwindResult<()> {
        while total < length {
            let mut block = hash::hash(&input.to_bytes());
            let take = core::cmp::min(DIGEST_BYTES, length - total);

            if sink.write_at(total, &block[..take]).is_err() {
                block = [0u8; DIGEST_BYTES];
                let _ = block;
                return Err(WhirlwindError::AddressFault);
            }

            total += take;
            counter = counter.wrapping_add(1);
            input.counter = counter;
        }
        Ok(())
    })();

    zeroize(&mut input);
    feedback_input();

    result
}

fn feedback_input() {
    let record = crate::input::InputRecord {
        source_id: 0,
        cycles: arch::read_cycle_counter() as u32,
        value1: arch::current_task_id() as u32,
        value2: arch::current_cpu_id() as u32,
    };
    router::route(record);
}

fn zeroize(input: &mut CounterModeInput) {
    input.domain = 0;
    input.seed1 = [0; DIGEST_BYTES];
    input.seed2 = [0; DIGEST_BYTES];
    input.counter = 0;
    input.value1 = 0;
    input.value2 = 0;
    input.value3 = 0;
    input.tail = [0; TAIL_WORDS];
}
