//! Architecture-independent hardware primitives.
//!
//! Centralizes cycle-counter and hardware-random access so that the engine
//! modules (`seed`, `input`, `swiftbuffer`, `output`) do not need scattered
//! `#[cfg(target_arch)]` blocks with inline assembly.

#[cfg(target_arch = "x86_64")]
mod x86_64_impl;
#[cfg(target_arch = "x86_64")]
use x86_64_impl as backend;

#[cfg(target_arch = "aarch64")]
mod aarch64_impl;
#[cfg(target_arch = "aarch64")]
use aarch64_impl as backend;

#[cfg(target_arch = "riscv64")]
mod riscv64_impl;
#[cfg(target_arch = "riscv64")]
use riscv64_impl as backend;

#[cfg(not(any(
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "riscv64"
)))]
mod fallback_impl;
#[cfg(not(any(
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "riscv64"
)))]
use fallback_impl as backend;

/// Maximum number of CPUs this engine statically provisions per-CPU state
/// for. Kernel-resident code cannot grow this at runtime.
pub const MAX_CPUS: usize = 64;

/// Read the hardware cycle/timestamp counter (or a tick counter fallback if
/// no cycle counter is available on this architecture).
///
/// * **x86_64**: `RDTSC`.
/// * **AArch64**: `CNTVCT_EL0`.
/// * **RISC-V64**: `rdcycle`.
/// * other: a monotonically increasing tick counter driven by an atomic, so
///   that callers still observe distinct values across calls.
#[inline]
pub fn read_cycle_counter() -> u64 {
    backend::read_cycle_counter()
}

/// Attempt to fill `dest` with hardware-random bytes (e.g. `RDRAND`).
///
/// Returns `true` if the hardware source was available and `dest` was
/// filled, `false` otherwise (in which case `dest` is left unmodified and
/// the caller must fall back to seed-derived randomness or leave the field
/// zero).
pub fn try_hardware_random(dest: &mut [u64]) -> bool {
    backend::try_hardware_random(dest)
}

/// Return the index of the CPU the caller is currently running on, masked
/// into `0..MAX_CPUS`.
///
/// This engine has no way to disable kernel pre-emption on its own (it is a
/// library, not a kernel) — see `DESIGN.md` for how per-CPU staging copes
/// with that.
pub fn current_cpu_id() -> usize {
    backend::current_cpu_id() % MAX_CPUS
}

/// Return an identifier for the calling task/thread, used only as one more
/// field of diversifying input to the counter-mode output block. Does not
/// need to be globally unique, only distinguishing between
/// concurrently-running callers.
///
/// In a real kernel this would be `current->pid` (see
/// `original_source/whirlwind-output.c`). This crate has no process
/// abstraction of its own, so it substitutes the address of a stack-local
/// byte, which differs between concurrently-executing call stacks and is
/// stable across calls made from the same stack depth on the same thread —
/// sufficient for input diversification, not for identification.
#[inline(never)]
pub fn current_task_id() -> u64 {
    let marker: u8 = 0;
    (&marker as *const u8 as usize) as u64
}
