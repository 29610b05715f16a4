//! Whirlwind: a kernel-resident CSPRNG that continuously harvests
//! low-quality system entropy (timing jitter, interrupt arrival, caller
//! values) into two independently-paced seed pools, and serves output
//! through a SHA-512 counter-mode generator with forward secrecy.
//!
//! `no_std` throughout — this crate has no process, page, or file
//! abstraction of its own; see `DESIGN.md` for how the handful of
//! kernel-specific concepts it still needs (CPU id, task id, a page-free
//! `randomize_range`) are modeled without one.

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod bootstrap;
pub mod engine;
pub mod error;
pub mod hash;
pub mod input;
pub mod output;
pub mod router;
pub mod seed;
pub mod swiftbuffer;

pub use engine::{
    add_input, add_input_buffer, add_interrupt_sample, ensure_initialized, generate_bytes,
    get_random_bytes, get_random_ulong, random_uuid, randomize_range,
};
pub use error::{WhirlwindError, WhirlwindResult};
