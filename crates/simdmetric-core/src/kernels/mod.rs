//! Kernel bodies, one module per tier.
//!
//! # Module Structure
//!
//! - `serial`: Portable kernels for every supported (metric, datatype) pair
//! - `x86_haswell`: AVX2+FMA+F16C kernels (x86_64 only)
//! - `x86_skylake`: AVX-512F kernels (x86_64 only)
//! - `x86_ice`: AVX-512 VPOPCNTDQ binary kernels (x86_64 only)
//! - `neon`: ARM NEON kernels (aarch64 only)
//!
//! Each module exposes an `ENTRIES` section the catalog folds in.
#![allow(clippy::doc_markdown)] // Contains ISA/architecture nomenclature in docs.

// =============================================================================
// Unsafe Invariants Reference
// =============================================================================
// SAFETY: Shared invariants for SIMD unsafe blocks in this module tree.
// - Condition 1: All pointer arithmetic is derived from slice pointers with loop bounds
//   proving in-range access for each lane width.
// - Condition 2: Target-featured functions are only called from `guarded_kernel!`
//   wrappers after the runtime feature check for their tier, or on architectures
//   where the feature is guaranteed.
// - Condition 3: Unaligned loads use `*_loadu_*`/masked-load intrinsics or equivalent
//   APIs that permit unaligned access.
// - Condition 4: Wrappers truncate both inputs to the shorter length before any
//   pointer arithmetic, so unequal lengths never read out of bounds.

/// Defines a safe real-valued kernel that runs `$fast` when `$avail()` holds
/// and `$slow` otherwise.
///
/// A caller can hand the resolver a forged `supported` mask; the check keeps
/// such a call on the serial body instead of faulting.
#[allow(unused_macros)]
macro_rules! guarded_kernel {
    ($(#[$meta:meta])* $name:ident: $ty:ty => $fast:path, fallback $slow:path, when $avail:path) => {
        $(#[$meta])*
        fn $name(a: &[$ty], b: &[$ty]) -> f64 {
            let n = a.len().min(b.len());
            let (a, b) = (&a[..n], &b[..n]);
            if $avail() {
                // SAFETY: tier features confirmed by `$avail`; both slices have length `n`.
                unsafe { $fast(a, b) }
            } else {
                $slow(a, b)
            }
        }
    };
}

pub(crate) mod serial;
#[cfg(test)]
mod serial_tests;

#[cfg(target_arch = "x86_64")]
pub(crate) mod x86_haswell;

#[cfg(target_arch = "x86_64")]
pub(crate) mod x86_skylake;

#[cfg(target_arch = "x86_64")]
pub(crate) mod x86_ice;

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;

pub use serial::{cosine_distance, jaccard_distance, DIVERGENCE_EPSILON};
