//! AVX2+FMA+F16C kernel implementations for x86_64.
//!
//! Contains hand-tuned AVX2 kernels for `f32` and `f16` spatial metrics and
//! POPCNT kernels for packed binary vectors.
//!
//! The `unsafe` bodies require the Haswell tier; they are only reached through
//! `guarded_kernel!` wrappers that confirm it at runtime.

// SAFETY: Numeric casts in this file are intentional and safe:
// - All casts are from well-bounded values (vector dimensions, loop indices)
// - All casts are validated by the kernel agreement tests
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::similar_names)]

use std::arch::x86_64::*;

use half::f16;

use super::serial;
use crate::capability::Tier;
use crate::catalog::KernelEntry;
use crate::kernel::MetricKernel;
use crate::metric::MetricKind;

#[inline]
fn available() -> bool {
    is_x86_feature_detected!("avx2")
        && is_x86_feature_detected!("fma")
        && is_x86_feature_detected!("f16c")
}

#[inline]
fn popcnt_available() -> bool {
    is_x86_feature_detected!("popcnt")
}

/// Horizontal sum of eight `f32` lanes.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn hsum_ps256(v: __m256) -> f32 {
    let hi = _mm256_extractf128_ps(v, 1);
    let lo = _mm256_castps256_ps128(v);
    let sum128 = _mm_add_ps(lo, hi);
    let shuf = _mm_movehdup_ps(sum128);
    let sums = _mm_add_ps(sum128, shuf);
    let shuf2 = _mm_movehl_ps(sums, sums);
    _mm_cvtss_f32(_mm_add_ss(sums, shuf2))
}

// =============================================================================
// f32
// =============================================================================

/// AVX2 dot product with 2 accumulators.
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports AVX2+FMA
/// - `a.len() == b.len()`
#[target_feature(enable = "avx2", enable = "fma")]
#[inline]
unsafe fn dot_f32_avx2(a: &[f32], b: &[f32]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut sum0 = _mm256_setzero_ps();
    let mut sum1 = _mm256_setzero_ps();

    let mut offset = 0;
    while offset + 16 <= len {
        let va0 = _mm256_loadu_ps(a_ptr.add(offset));
        let vb0 = _mm256_loadu_ps(b_ptr.add(offset));
        sum0 = _mm256_fmadd_ps(va0, vb0, sum0);

        let va1 = _mm256_loadu_ps(a_ptr.add(offset + 8));
        let vb1 = _mm256_loadu_ps(b_ptr.add(offset + 8));
        sum1 = _mm256_fmadd_ps(va1, vb1, sum1);

        offset += 16;
    }
    if offset + 8 <= len {
        let va = _mm256_loadu_ps(a_ptr.add(offset));
        let vb = _mm256_loadu_ps(b_ptr.add(offset));
        sum0 = _mm256_fmadd_ps(va, vb, sum0);
        offset += 8;
    }

    let mut result = f64::from(hsum_ps256(_mm256_add_ps(sum0, sum1)));
    for (x, y) in a[offset..].iter().zip(&b[offset..]) {
        result += f64::from(*x) * f64::from(*y);
    }
    result
}

/// AVX2 squared L2 distance with 2 accumulators.
///
/// # Safety
///
/// Same requirements as `dot_f32_avx2`.
#[target_feature(enable = "avx2", enable = "fma")]
#[inline]
unsafe fn l2sq_f32_avx2(a: &[f32], b: &[f32]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut sum0 = _mm256_setzero_ps();
    let mut sum1 = _mm256_setzero_ps();

    let mut offset = 0;
    while offset + 16 <= len {
        let d0 = _mm256_sub_ps(
            _mm256_loadu_ps(a_ptr.add(offset)),
            _mm256_loadu_ps(b_ptr.add(offset)),
        );
        sum0 = _mm256_fmadd_ps(d0, d0, sum0);

        let d1 = _mm256_sub_ps(
            _mm256_loadu_ps(a_ptr.add(offset + 8)),
            _mm256_loadu_ps(b_ptr.add(offset + 8)),
        );
        sum1 = _mm256_fmadd_ps(d1, d1, sum1);

        offset += 16;
    }
    if offset + 8 <= len {
        let d = _mm256_sub_ps(
            _mm256_loadu_ps(a_ptr.add(offset)),
            _mm256_loadu_ps(b_ptr.add(offset)),
        );
        sum0 = _mm256_fmadd_ps(d, d, sum0);
        offset += 8;
    }

    let mut result = f64::from(hsum_ps256(_mm256_add_ps(sum0, sum1)));
    for (x, y) in a[offset..].iter().zip(&b[offset..]) {
        let d = f64::from(*x) - f64::from(*y);
        result += d * d;
    }
    result
}

/// AVX2 fused cosine distance: dot product and both norms in one pass.
///
/// # Safety
///
/// Same requirements as `dot_f32_avx2`.
#[target_feature(enable = "avx2", enable = "fma")]
#[inline]
unsafe fn cos_f32_avx2(a: &[f32], b: &[f32]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut dot = _mm256_setzero_ps();
    let mut na = _mm256_setzero_ps();
    let mut nb = _mm256_setzero_ps();

    let mut offset = 0;
    while offset + 8 <= len {
        let va = _mm256_loadu_ps(a_ptr.add(offset));
        let vb = _mm256_loadu_ps(b_ptr.add(offset));
        dot = _mm256_fmadd_ps(va, vb, dot);
        na = _mm256_fmadd_ps(va, va, na);
        nb = _mm256_fmadd_ps(vb, vb, nb);
        offset += 8;
    }

    let mut ab = f64::from(hsum_ps256(dot));
    let mut a2 = f64::from(hsum_ps256(na));
    let mut b2 = f64::from(hsum_ps256(nb));

    for (x, y) in a[offset..].iter().zip(&b[offset..]) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        ab += x * y;
        a2 += x * x;
        b2 += y * y;
    }

    serial::cosine_distance(ab, a2, b2)
}

// =============================================================================
// f16 (converted to f32 lanes with F16C)
// =============================================================================

/// Loads eight halves and widens them to `f32`.
#[inline]
#[target_feature(enable = "avx2", enable = "f16c")]
unsafe fn load_f16x8(ptr: *const f16) -> __m256 {
    _mm256_cvtph_ps(_mm_loadu_si128(ptr.cast::<__m128i>()))
}

/// # Safety
///
/// CPU supports AVX2+FMA+F16C; `a.len() == b.len()`.
#[target_feature(enable = "avx2", enable = "fma", enable = "f16c")]
#[inline]
unsafe fn dot_f16_haswell(a: &[f16], b: &[f16]) -> f64 {
    let len = a.len();
    let mut sum = _mm256_setzero_ps();
    let mut offset = 0;
    while offset + 8 <= len {
        let va = load_f16x8(a.as_ptr().add(offset));
        let vb = load_f16x8(b.as_ptr().add(offset));
        sum = _mm256_fmadd_ps(va, vb, sum);
        offset += 8;
    }
    f64::from(hsum_ps256(sum)) + serial::dot(&a[offset..], &b[offset..])
}

/// # Safety
///
/// CPU supports AVX2+FMA+F16C; `a.len() == b.len()`.
#[target_feature(enable = "avx2", enable = "fma", enable = "f16c")]
#[inline]
unsafe fn l2sq_f16_haswell(a: &[f16], b: &[f16]) -> f64 {
    let len = a.len();
    let mut sum = _mm256_setzero_ps();
    let mut offset = 0;
    while offset + 8 <= len {
        let d = _mm256_sub_ps(
            load_f16x8(a.as_ptr().add(offset)),
            load_f16x8(b.as_ptr().add(offset)),
        );
        sum = _mm256_fmadd_ps(d, d, sum);
        offset += 8;
    }
    f64::from(hsum_ps256(sum)) + serial::l2sq(&a[offset..], &b[offset..])
}

/// # Safety
///
/// CPU supports AVX2+FMA+F16C; `a.len() == b.len()`.
#[target_feature(enable = "avx2", enable = "fma", enable = "f16c")]
#[inline]
unsafe fn cos_f16_haswell(a: &[f16], b: &[f16]) -> f64 {
    let len = a.len();
    let mut dot = _mm256_setzero_ps();
    let mut na = _mm256_setzero_ps();
    let mut nb = _mm256_setzero_ps();
    let mut offset = 0;
    while offset + 8 <= len {
        let va = load_f16x8(a.as_ptr().add(offset));
        let vb = load_f16x8(b.as_ptr().add(offset));
        dot = _mm256_fmadd_ps(va, vb, dot);
        na = _mm256_fmadd_ps(va, va, na);
        nb = _mm256_fmadd_ps(vb, vb, nb);
        offset += 8;
    }

    let mut ab = f64::from(hsum_ps256(dot));
    let mut a2 = f64::from(hsum_ps256(na));
    let mut b2 = f64::from(hsum_ps256(nb));
    for (x, y) in a[offset..].iter().zip(&b[offset..]) {
        let (x, y) = (x.to_f64(), y.to_f64());
        ab += x * y;
        a2 += x * x;
        b2 += y * y;
    }

    serial::cosine_distance(ab, a2, b2)
}

// =============================================================================
// Binary (POPCNT over 64-bit words)
// =============================================================================

#[inline]
fn words(bytes: &[u8]) -> (impl Iterator<Item = u64> + '_, &[u8]) {
    let chunks = bytes.chunks_exact(8);
    let tail = chunks.remainder();
    (
        chunks.map(|c| u64::from_ne_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])),
        tail,
    )
}

/// # Safety
///
/// CPU supports POPCNT.
#[target_feature(enable = "popcnt")]
#[inline]
unsafe fn hamming_b8_popcnt(a: &[u8], b: &[u8]) -> f64 {
    let (wa, ta) = words(a);
    let (wb, tb) = words(b);
    let differing: u64 = wa.zip(wb).map(|(x, y)| u64::from((x ^ y).count_ones())).sum();
    differing as f64 + serial::hamming_b8(ta, tb)
}

/// # Safety
///
/// CPU supports POPCNT.
#[target_feature(enable = "popcnt")]
#[inline]
unsafe fn jaccard_b8_popcnt(a: &[u8], b: &[u8]) -> f64 {
    let (wa, ta) = words(a);
    let (wb, tb) = words(b);
    let (mut intersection, mut union) = (0_u64, 0_u64);
    for (x, y) in wa.zip(wb) {
        intersection += u64::from((x & y).count_ones());
        union += u64::from((x | y).count_ones());
    }
    for (x, y) in ta.iter().zip(tb) {
        intersection += u64::from((x & y).count_ones());
        union += u64::from((x | y).count_ones());
    }
    serial::jaccard_distance(intersection, union)
}

// =============================================================================
// Registration
// =============================================================================

guarded_kernel!(dot_f32: f32 => dot_f32_avx2, fallback serial::dot, when available);
guarded_kernel!(cos_f32: f32 => cos_f32_avx2, fallback serial::cos, when available);
guarded_kernel!(l2sq_f32: f32 => l2sq_f32_avx2, fallback serial::l2sq, when available);
guarded_kernel!(dot_f16: f16 => dot_f16_haswell, fallback serial::dot, when available);
guarded_kernel!(cos_f16: f16 => cos_f16_haswell, fallback serial::cos, when available);
guarded_kernel!(l2sq_f16: f16 => l2sq_f16_haswell, fallback serial::l2sq, when available);
guarded_kernel!(hamming_b8: u8 => hamming_b8_popcnt, fallback serial::hamming_b8, when popcnt_available);
guarded_kernel!(jaccard_b8: u8 => jaccard_b8_popcnt, fallback serial::jaccard_b8, when popcnt_available);

const fn entry(kind: MetricKind, kernel: MetricKernel) -> KernelEntry {
    KernelEntry::new(kind, Tier::Haswell, kernel)
}

/// Haswell tier.
pub(crate) const ENTRIES: &[KernelEntry] = &[
    entry(MetricKind::Inner, MetricKernel::F32(dot_f32)),
    entry(MetricKind::Cosine, MetricKernel::F32(cos_f32)),
    entry(MetricKind::SqEuclidean, MetricKernel::F32(l2sq_f32)),
    entry(MetricKind::Inner, MetricKernel::F16(dot_f16)),
    entry(MetricKind::Cosine, MetricKernel::F16(cos_f16)),
    entry(MetricKind::SqEuclidean, MetricKernel::F16(l2sq_f16)),
    entry(MetricKind::Hamming, MetricKernel::B8(hamming_b8)),
    entry(MetricKind::Jaccard, MetricKernel::B8(jaccard_b8)),
];
