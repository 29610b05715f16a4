//! Bootstrap: a cheap one-time entropy kick run before the engine's first
//! output, so the very first caller doesn't draw from a seed that has never
//! absorbed any system-specific timing jitter.
//!
//! Grounded on `original_source/drivers/char/whirlwind-input.c`'s
//! `ww_bootstrap` / `ww_initialize`: a gated atomic flag runs a 100-iteration
//! outer loop once per process lifetime, each iteration contributing the
//! cycle counter as an input and then burning a data-dependent, variable
//! length inner loop purely to keep the compiler from discarding the whole
//! thing as dead code.

use spin::Once;

use crate::arch;
use crate::input::InputRecord;
use crate::router;

const OUTER_LOOPS: u32 = 100;
const INNER_LOOP_MAX: u32 = 1024;

static INIT: Once<()> = Once::new();

/// Run the one-time bootstrap if it hasn't already run in this process.
/// Idempotent and cheap to call on every `generate_bytes` (matches
/// `ww_initialize`'s own unconditional call site before every output).
///
/// Uses `spin::Once` rather than a bare compare-exchange flag so that a
/// thread that loses the race to start the bootstrap still blocks until the
/// winner has finished it — a losing thread must still observe a
/// fully-initialized RNG before returning, instead of racing ahead to draw
/// output from a not-yet-bootstrapped seed.
pub fn ensure_initialized() {
    INIT.call_once(run_bootstrap);
}

fn run_bootstrap() {
    let mut accumulator: u32 = 0;

    for i in 0..OUTER_LOOPS {
        let cycles = arch::read_cycle_counter() as u32;

        router::route(InputRecord {
            source_id: 0xb007_0000 ^ i,
            cycles,
            value1: 0xb007_0001 ^ i,
            value2: 0xb007_0002 ^ i,
        });

        let inner_bound = cycles % INNER_LOOP_MAX;
        for j in 0..inner_bound {
            // Mirrors `a = (cycles/(j+1)) - (a*i) + 1` from `ww_bootstrap`,
            // translated to explicit wrapping arithmetic: the C version
            // silently wraps on overflow, Rust panics by default in debug
            // builds. This accumulator's output carries no intended entropy
            // of its own — only the data dependency that keeps the loop from
            // being optimized away.
            accumulator = (cycles / (j + 1))
                .wrapping_sub(accumulator.wrapping_mul(i))
                .wrapping_add(1);
        }
    }

    router::route(InputRecord {
        source_id: 0xb007_ffff,
        cycles: arch::read_cycle_counter() as u32,
        value1: accumulator,
        value2: 0,
    });
}
