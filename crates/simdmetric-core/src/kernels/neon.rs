//! ARM NEON kernel implementations for aarch64.
//!
//! Contains NEON kernels for `f32` dot product, squared L2 and cosine
//! distance, plus byte-wise popcount kernels for packed binary vectors.
//!
//! NEON is part of the aarch64 baseline; the runtime check in the wrappers
//! always succeeds on conforming hardware.

// SAFETY: Numeric casts in this file are intentional and safe:
// - All casts are from well-bounded values (vector dimensions, lane popcounts)
// - All casts are validated by the kernel agreement tests
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::similar_names)]

use std::arch::aarch64::*;

use super::serial;
use crate::capability::Tier;
use crate::catalog::KernelEntry;
use crate::kernel::MetricKernel;
use crate::metric::MetricKind;

#[inline]
fn available() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

// =============================================================================
// f32
// =============================================================================

/// NEON dot product with 4 accumulators.
///
/// # Safety
///
/// `a.len() == b.len()`.
#[target_feature(enable = "neon")]
#[inline]
unsafe fn dot_f32_neon(a: &[f32], b: &[f32]) -> f64 {
    // SAFETY: offset + 16 <= len inside the main loop; vld1q_f32 is unaligned-safe.
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut acc0 = vdupq_n_f32(0.0);
    let mut acc1 = vdupq_n_f32(0.0);
    let mut acc2 = vdupq_n_f32(0.0);
    let mut acc3 = vdupq_n_f32(0.0);

    let mut offset = 0;
    while offset + 16 <= len {
        acc0 = vfmaq_f32(acc0, vld1q_f32(a_ptr.add(offset)), vld1q_f32(b_ptr.add(offset)));
        acc1 = vfmaq_f32(acc1, vld1q_f32(a_ptr.add(offset + 4)), vld1q_f32(b_ptr.add(offset + 4)));
        acc2 = vfmaq_f32(acc2, vld1q_f32(a_ptr.add(offset + 8)), vld1q_f32(b_ptr.add(offset + 8)));
        acc3 = vfmaq_f32(acc3, vld1q_f32(a_ptr.add(offset + 12)), vld1q_f32(b_ptr.add(offset + 12)));
        offset += 16;
    }
    while offset + 4 <= len {
        acc0 = vfmaq_f32(acc0, vld1q_f32(a_ptr.add(offset)), vld1q_f32(b_ptr.add(offset)));
        offset += 4;
    }

    let sum = vaddq_f32(vaddq_f32(acc0, acc1), vaddq_f32(acc2, acc3));
    let mut result = vaddvq_f32(sum);
    for (x, y) in a[offset..].iter().zip(&b[offset..]) {
        result += x * y;
    }
    f64::from(result)
}

/// NEON squared L2 distance.
///
/// # Safety
///
/// `a.len() == b.len()`.
#[target_feature(enable = "neon")]
#[inline]
unsafe fn l2sq_f32_neon(a: &[f32], b: &[f32]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut acc = vdupq_n_f32(0.0);
    let mut offset = 0;
    while offset + 4 <= len {
        let diff = vsubq_f32(vld1q_f32(a_ptr.add(offset)), vld1q_f32(b_ptr.add(offset)));
        acc = vfmaq_f32(acc, diff, diff);
        offset += 4;
    }

    let mut result = vaddvq_f32(acc);
    for (x, y) in a[offset..].iter().zip(&b[offset..]) {
        let d = x - y;
        result += d * d;
    }
    f64::from(result)
}

/// NEON fused cosine distance.
///
/// # Safety
///
/// `a.len() == b.len()`.
#[target_feature(enable = "neon")]
#[inline]
unsafe fn cos_f32_neon(a: &[f32], b: &[f32]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut dot = vdupq_n_f32(0.0);
    let mut na = vdupq_n_f32(0.0);
    let mut nb = vdupq_n_f32(0.0);
    let mut offset = 0;
    while offset + 4 <= len {
        let va = vld1q_f32(a_ptr.add(offset));
        let vb = vld1q_f32(b_ptr.add(offset));
        dot = vfmaq_f32(dot, va, vb);
        na = vfmaq_f32(na, va, va);
        nb = vfmaq_f32(nb, vb, vb);
        offset += 4;
    }

    let mut ab = f64::from(vaddvq_f32(dot));
    let mut a2 = f64::from(vaddvq_f32(na));
    let mut b2 = f64::from(vaddvq_f32(nb));
    for (x, y) in a[offset..].iter().zip(&b[offset..]) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        ab += x * y;
        a2 += x * x;
        b2 += y * y;
    }
    serial::cosine_distance(ab, a2, b2)
}

// =============================================================================
// Binary
// =============================================================================

/// # Safety
///
/// `a.len() == b.len()`.
#[target_feature(enable = "neon")]
#[inline]
unsafe fn hamming_b8_neon(a: &[u8], b: &[u8]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut differing = 0_u64;
    let mut offset = 0;
    while offset + 16 <= len {
        let x = veorq_u8(vld1q_u8(a_ptr.add(offset)), vld1q_u8(b_ptr.add(offset)));
        // 16 lanes of at most 8 bits each fit in a u8 sum.
        differing += u64::from(vaddvq_u8(vcntq_u8(x)));
        offset += 16;
    }
    differing as f64 + serial::hamming_b8(&a[offset..], &b[offset..])
}

/// # Safety
///
/// `a.len() == b.len()`.
#[target_feature(enable = "neon")]
#[inline]
unsafe fn jaccard_b8_neon(a: &[u8], b: &[u8]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut intersection = 0_u64;
    let mut union = 0_u64;
    let mut offset = 0;
    while offset + 16 <= len {
        let va = vld1q_u8(a_ptr.add(offset));
        let vb = vld1q_u8(b_ptr.add(offset));
        intersection += u64::from(vaddvq_u8(vcntq_u8(vandq_u8(va, vb))));
        union += u64::from(vaddvq_u8(vcntq_u8(vorrq_u8(va, vb))));
        offset += 16;
    }
    for (x, y) in a[offset..].iter().zip(&b[offset..]) {
        intersection += u64::from((x & y).count_ones());
        union += u64::from((x | y).count_ones());
    }
    serial::jaccard_distance(intersection, union)
}

// =============================================================================
// Registration
// =============================================================================

guarded_kernel!(dot_f32: f32 => dot_f32_neon, fallback serial::dot, when available);
guarded_kernel!(cos_f32: f32 => cos_f32_neon, fallback serial::cos, when available);
guarded_kernel!(l2sq_f32: f32 => l2sq_f32_neon, fallback serial::l2sq, when available);
guarded_kernel!(hamming_b8: u8 => hamming_b8_neon, fallback serial::hamming_b8, when available);
guarded_kernel!(jaccard_b8: u8 => jaccard_b8_neon, fallback serial::jaccard_b8, when available);

const fn entry(kind: MetricKind, kernel: MetricKernel) -> KernelEntry {
    KernelEntry::new(kind, Tier::Neon, kernel)
}

/// NEON tier.
pub(crate) const ENTRIES: &[KernelEntry] = &[
    entry(MetricKind::Inner, MetricKernel::F32(dot_f32)),
    entry(MetricKind::Cosine, MetricKernel::F32(cos_f32)),
    entry(MetricKind::SqEuclidean, MetricKernel::F32(l2sq_f32)),
    entry(MetricKind::Hamming, MetricKernel::B8(hamming_b8)),
    entry(MetricKind::Jaccard, MetricKernel::B8(jaccard_b8)),
];
