//! AVX-512F kernel implementations for x86_64.
//!
//! Contains hand-tuned AVX-512 kernels for `f32` and `f64` dot product,
//! squared L2 and cosine distance. Remainders use masked loads instead of a
//! scalar tail loop.

// SAFETY: Numeric casts in this file are intentional and safe:
// - Remainder counts are in 1..lane width, so mask shifts cannot overflow
// - All casts are validated by the kernel agreement tests
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::similar_names)]

use std::arch::x86_64::*;

use super::serial;
use crate::capability::Tier;
use crate::catalog::KernelEntry;
use crate::kernel::MetricKernel;
use crate::metric::MetricKind;

#[inline]
fn available() -> bool {
    is_x86_feature_detected!("avx512f")
}

/// Mask selecting the first `remainder` of 16 lanes.
#[inline]
fn mask16(remainder: usize) -> __mmask16 {
    ((1_u32 << remainder) - 1) as u16
}

/// Mask selecting the first `remainder` of 8 lanes.
#[inline]
fn mask8(remainder: usize) -> __mmask8 {
    ((1_u32 << remainder) - 1) as u8
}

// =============================================================================
// f32
// =============================================================================

/// AVX-512 dot product with 2 accumulators and a masked tail.
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports AVX-512F
/// - `a.len() == b.len()`
#[target_feature(enable = "avx512f")]
#[inline]
unsafe fn dot_f32_avx512(a: &[f32], b: &[f32]) -> f64 {
    // SAFETY: `_mm512_loadu_ps` handles unaligned loads; masked loads only
    // touch lanes below `len`.
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut acc0 = _mm512_setzero_ps();
    let mut acc1 = _mm512_setzero_ps();

    let mut offset = 0;
    while offset + 32 <= len {
        acc0 = _mm512_fmadd_ps(
            _mm512_loadu_ps(a_ptr.add(offset)),
            _mm512_loadu_ps(b_ptr.add(offset)),
            acc0,
        );
        acc1 = _mm512_fmadd_ps(
            _mm512_loadu_ps(a_ptr.add(offset + 16)),
            _mm512_loadu_ps(b_ptr.add(offset + 16)),
            acc1,
        );
        offset += 32;
    }
    while offset + 16 <= len {
        acc0 = _mm512_fmadd_ps(
            _mm512_loadu_ps(a_ptr.add(offset)),
            _mm512_loadu_ps(b_ptr.add(offset)),
            acc0,
        );
        offset += 16;
    }

    let remainder = len - offset;
    if remainder > 0 {
        let mask = mask16(remainder);
        let va = _mm512_maskz_loadu_ps(mask, a_ptr.add(offset));
        let vb = _mm512_maskz_loadu_ps(mask, b_ptr.add(offset));
        acc1 = _mm512_fmadd_ps(va, vb, acc1);
    }

    f64::from(_mm512_reduce_add_ps(_mm512_add_ps(acc0, acc1)))
}

/// AVX-512 squared L2 distance with a masked tail.
///
/// # Safety
///
/// Same requirements as `dot_f32_avx512`.
#[target_feature(enable = "avx512f")]
#[inline]
unsafe fn l2sq_f32_avx512(a: &[f32], b: &[f32]) -> f64 {
    // SAFETY: See module-level "Unsafe Invariants Reference".
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut acc = _mm512_setzero_ps();
    let mut offset = 0;
    while offset + 16 <= len {
        let diff = _mm512_sub_ps(
            _mm512_loadu_ps(a_ptr.add(offset)),
            _mm512_loadu_ps(b_ptr.add(offset)),
        );
        acc = _mm512_fmadd_ps(diff, diff, acc);
        offset += 16;
    }

    let remainder = len - offset;
    if remainder > 0 {
        let mask = mask16(remainder);
        let diff = _mm512_sub_ps(
            _mm512_maskz_loadu_ps(mask, a_ptr.add(offset)),
            _mm512_maskz_loadu_ps(mask, b_ptr.add(offset)),
        );
        acc = _mm512_fmadd_ps(diff, diff, acc);
    }

    f64::from(_mm512_reduce_add_ps(acc))
}

/// AVX-512 fused cosine distance.
///
/// # Safety
///
/// Same requirements as `dot_f32_avx512`.
#[target_feature(enable = "avx512f")]
#[inline]
unsafe fn cos_f32_avx512(a: &[f32], b: &[f32]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut dot = _mm512_setzero_ps();
    let mut na = _mm512_setzero_ps();
    let mut nb = _mm512_setzero_ps();

    let mut offset = 0;
    while offset < len {
        let remainder = len - offset;
        let (va, vb) = if remainder >= 16 {
            (
                _mm512_loadu_ps(a_ptr.add(offset)),
                _mm512_loadu_ps(b_ptr.add(offset)),
            )
        } else {
            let mask = mask16(remainder);
            (
                _mm512_maskz_loadu_ps(mask, a_ptr.add(offset)),
                _mm512_maskz_loadu_ps(mask, b_ptr.add(offset)),
            )
        };
        dot = _mm512_fmadd_ps(va, vb, dot);
        na = _mm512_fmadd_ps(va, va, na);
        nb = _mm512_fmadd_ps(vb, vb, nb);
        offset += 16;
    }

    serial::cosine_distance(
        f64::from(_mm512_reduce_add_ps(dot)),
        f64::from(_mm512_reduce_add_ps(na)),
        f64::from(_mm512_reduce_add_ps(nb)),
    )
}

// =============================================================================
// f64
// =============================================================================

/// AVX-512 `f64` dot product.
///
/// # Safety
///
/// CPU supports AVX-512F; `a.len() == b.len()`.
#[target_feature(enable = "avx512f")]
#[inline]
unsafe fn dot_f64_avx512(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut acc = _mm512_setzero_pd();
    let mut offset = 0;
    while offset + 8 <= len {
        acc = _mm512_fmadd_pd(
            _mm512_loadu_pd(a_ptr.add(offset)),
            _mm512_loadu_pd(b_ptr.add(offset)),
            acc,
        );
        offset += 8;
    }

    let remainder = len - offset;
    if remainder > 0 {
        let mask = mask8(remainder);
        acc = _mm512_fmadd_pd(
            _mm512_maskz_loadu_pd(mask, a_ptr.add(offset)),
            _mm512_maskz_loadu_pd(mask, b_ptr.add(offset)),
            acc,
        );
    }

    _mm512_reduce_add_pd(acc)
}

/// AVX-512 `f64` squared L2 distance.
///
/// # Safety
///
/// CPU supports AVX-512F; `a.len() == b.len()`.
#[target_feature(enable = "avx512f")]
#[inline]
unsafe fn l2sq_f64_avx512(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut acc = _mm512_setzero_pd();
    let mut offset = 0;
    while offset + 8 <= len {
        let diff = _mm512_sub_pd(
            _mm512_loadu_pd(a_ptr.add(offset)),
            _mm512_loadu_pd(b_ptr.add(offset)),
        );
        acc = _mm512_fmadd_pd(diff, diff, acc);
        offset += 8;
    }

    let remainder = len - offset;
    if remainder > 0 {
        let mask = mask8(remainder);
        let diff = _mm512_sub_pd(
            _mm512_maskz_loadu_pd(mask, a_ptr.add(offset)),
            _mm512_maskz_loadu_pd(mask, b_ptr.add(offset)),
        );
        acc = _mm512_fmadd_pd(diff, diff, acc);
    }

    _mm512_reduce_add_pd(acc)
}

/// AVX-512 `f64` fused cosine distance.
///
/// # Safety
///
/// CPU supports AVX-512F; `a.len() == b.len()`.
#[target_feature(enable = "avx512f")]
#[inline]
unsafe fn cos_f64_avx512(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut dot = _mm512_setzero_pd();
    let mut na = _mm512_setzero_pd();
    let mut nb = _mm512_setzero_pd();

    let mut offset = 0;
    while offset < len {
        let remainder = len - offset;
        let (va, vb) = if remainder >= 8 {
            (
                _mm512_loadu_pd(a_ptr.add(offset)),
                _mm512_loadu_pd(b_ptr.add(offset)),
            )
        } else {
            let mask = mask8(remainder);
            (
                _mm512_maskz_loadu_pd(mask, a_ptr.add(offset)),
                _mm512_maskz_loadu_pd(mask, b_ptr.add(offset)),
            )
        };
        dot = _mm512_fmadd_pd(va, vb, dot);
        na = _mm512_fmadd_pd(va, va, na);
        nb = _mm512_fmadd_pd(vb, vb, nb);
        offset += 8;
    }

    serial::cosine_distance(
        _mm512_reduce_add_pd(dot),
        _mm512_reduce_add_pd(na),
        _mm512_reduce_add_pd(nb),
    )
}

// =============================================================================
// Registration
// =============================================================================

guarded_kernel!(dot_f32: f32 => dot_f32_avx512, fallback serial::dot, when available);
guarded_kernel!(cos_f32: f32 => cos_f32_avx512, fallback serial::cos, when available);
guarded_kernel!(l2sq_f32: f32 => l2sq_f32_avx512, fallback serial::l2sq, when available);
guarded_kernel!(dot_f64: f64 => dot_f64_avx512, fallback serial::dot, when available);
guarded_kernel!(cos_f64: f64 => cos_f64_avx512, fallback serial::cos, when available);
guarded_kernel!(l2sq_f64: f64 => l2sq_f64_avx512, fallback serial::l2sq, when available);

const fn entry(kind: MetricKind, kernel: MetricKernel) -> KernelEntry {
    KernelEntry::new(kind, Tier::Skylake, kernel)
}

/// Skylake tier.
pub(crate) const ENTRIES: &[KernelEntry] = &[
    entry(MetricKind::Inner, MetricKernel::F64(dot_f64)),
    entry(MetricKind::Cosine, MetricKernel::F64(cos_f64)),
    entry(MetricKind::SqEuclidean, MetricKernel::F64(l2sq_f64)),
    entry(MetricKind::Inner, MetricKernel::F32(dot_f32)),
    entry(MetricKind::Cosine, MetricKernel::F32(cos_f32)),
    entry(MetricKind::SqEuclidean, MetricKernel::F32(l2sq_f32)),
];
