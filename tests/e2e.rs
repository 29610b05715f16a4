//! End-to-end scenarios exercised against the crate's public API and its
//! process-wide engine state.
//!
//! These all live in one `#[test]` function rather than several. The engine
//! is process-wide global state (matching the original driver's module-level
//! globals — there is exactly one RNG per kernel), so separate `#[test]` fns
//! in this binary would run concurrently against the same statics and step
//! on each other's counters. Sequencing them by hand inside one function is
//! the straightforward way to get deterministic assertions out of a
//! singleton; see `DESIGN.md`.

use whirlwind::engine::DEFAULT_PAGE_SIZE;
use whirlwind::{add_input, add_input_buffer, get_random_bytes, random_uuid, randomize_range};

#[test]
fn scenario_suite() {
    distinct_back_to_back_outputs();
    uuid_shape_and_distribution();
    randomize_range_bounds();
    slow_pool_hash_count_bound();
    concurrent_stress();
}

/// Two back-to-back 64-byte draws never collide.
fn distinct_back_to_back_outputs() {
    let mut a = [0u8; 64];
    let mut b = [0u8; 64];
    get_random_bytes(&mut a).unwrap();
    get_random_bytes(&mut b).unwrap();
    assert_ne!(a, b);
}

/// Every UUID carries version 4 / variant DCE bits, and the remaining bytes
/// look uniform over many samples (a loose chi-squared check, not a strict
/// statistical test — this is a correctness smoke test, not a statistical
/// test suite).
fn uuid_shape_and_distribution() {
    const SAMPLES: usize = 2000;
    let mut byte0_counts = [0u32; 256];

    for _ in 0..SAMPLES {
        let uuid = random_uuid().unwrap();
        assert_eq!(uuid[6] & 0xf0, 0x40, "version nibble must be 4");
        assert_eq!(uuid[8] & 0xc0, 0x80, "variant bits must be DCE (10xxxxxx)");
        byte0_counts[uuid[0] as usize] += 1;
    }

    // Chi-squared goodness-of-fit against a uniform distribution over 256
    // buckets, 2000 samples -> expected count ~7.8 per bucket. 255 degrees
    // of freedom; a generous upper bound (350, vs. a ~293 critical value at
    // p=0.01) keeps this from flaking on an honestly-random source while
    // still catching a badly broken one (e.g. all zero, or a fixed byte).
    let expected = SAMPLES as f64 / 256.0;
    let chi_squared: f64 = byte0_counts
        .iter()
        .map(|&count| {
            let diff = count as f64 - expected;
            diff * diff / expected
        })
        .sum();
    assert!(
        chi_squared < 350.0,
        "uuid[0] byte distribution looks non-uniform: chi^2 = {chi_squared}"
    );
}

/// A zero-width range returns 0; a real range stays within bounds and is
/// always page-aligned.
fn randomize_range_bounds() {
    assert_eq!(randomize_range(0x1000, 0x1000, 0x100), 0);

    for _ in 0..200 {
        let start = randomize_range(0x1000, 0x100000, 0x1000);
        assert!(start == 0 || (start >= 0x1000 && start + 0x1000 <= 0x100000));
        assert_eq!(start % DEFAULT_PAGE_SIZE, 0, "result must be page-aligned");
    }
}

/// 500 inputs with distinct source ids fold into the slow pool a bounded
/// number of times (500 records * 16 bytes / (10th routed * 128 byte block)
/// ~= 6.25, so between 1 and 7 publishes). Measured as a delta against the
/// slow pool's hash count before this scenario runs, since the pool is
/// process-wide and earlier scenarios (and bootstrap) may have already
/// folded into it.
fn slow_pool_hash_count_bound() {
    let before = whirlwind::seed::SLOW_SEED.hash_count();

    for i in 0..500u32 {
        add_input(i, i.wrapping_mul(7), i.wrapping_mul(13));
    }

    let after = whirlwind::seed::SLOW_SEED.hash_count();
    let delta = after.wrapping_sub(before);
    assert!(
        (1..=7).contains(&delta),
        "expected 1..=7 slow-pool publishes for 500 inputs, got {delta}"
    );
}

/// Best-effort: concurrent producers and a concurrent consumer never observe
/// an all-zero output, and nothing panics or deadlocks. Lock-hold duration
/// isn't independently observable from outside this crate without a
/// dedicated instrumentation hook, so this checks the externally visible
/// half of the property (no corruption, no hang) rather than timing.
fn concurrent_stress() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    let stop = Arc::new(AtomicBool::new(false));
    let saw_all_zero = Arc::new(AtomicBool::new(false));

    let producer_stop = stop.clone();
    let producer = thread::spawn(move || {
        let mut counter = 0u32;
        while !producer_stop.load(Ordering::Relaxed) {
            add_input(counter, counter, counter.wrapping_mul(3));
            add_input_buffer(counter, &counter.to_le_bytes());
            counter = counter.wrapping_add(1);
        }
    });

    let consumer_stop = stop.clone();
    let consumer_zero_flag = saw_all_zero.clone();
    let consumer = thread::spawn(move || {
        let mut buf = [0u8; 64];
        while !consumer_stop.load(Ordering::Relaxed) {
            get_random_bytes(&mut buf).unwrap();
            if buf.iter().all(|&b| b == 0) {
                consumer_zero_flag.store(true, Ordering::Relaxed);
            }
        }
    });

    thread::sleep(std::time::Duration::from_millis(200));
    stop.store(true, Ordering::Relaxed);
    producer.join().unwrap();
    consumer.join().unwrap();

    assert!(!saw_all_zero.load(Ordering::Relaxed));
}
