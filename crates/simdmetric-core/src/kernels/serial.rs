//! Serial kernel implementations.
//!
//! These functions serve as:
//! - The completeness baseline: every supported (metric, datatype) pair has one
//! - Reference implementations for testing accelerated kernels
//! - Fallback bodies when an accelerated wrapper finds its tier missing
//!
//! Accumulation is done in `f64` regardless of element type. Mismatched
//! lengths are truncated to the shorter input.

// Allow precision-loss casts for popcount totals (u64 -> f64).
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]

use half::f16;

use crate::capability::Tier;
use crate::catalog::KernelEntry;
use crate::kernel::MetricKernel;
use crate::metric::MetricKind;

/// Guards the logarithms of the probability divergences against zero mass.
pub const DIVERGENCE_EPSILON: f64 = 1e-7;

/// Element widening used by the generic serial bodies.
pub(crate) trait Lane: Copy {
    fn widen(self) -> f64;
}

impl Lane for f64 {
    #[inline]
    fn widen(self) -> f64 {
        self
    }
}

impl Lane for f32 {
    #[inline]
    fn widen(self) -> f64 {
        f64::from(self)
    }
}

impl Lane for f16 {
    #[inline]
    fn widen(self) -> f64 {
        self.to_f64()
    }
}

impl Lane for i8 {
    #[inline]
    fn widen(self) -> f64 {
        f64::from(self)
    }
}

// =============================================================================
// Spatial
// =============================================================================

/// Inner product.
#[inline]
pub(crate) fn dot<T: Lane>(a: &[T], b: &[T]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x.widen() * y.widen()).sum()
}

/// Cosine distance, `1 - cos(a, b)`.
#[inline]
pub(crate) fn cos<T: Lane>(a: &[T], b: &[T]) -> f64 {
    let mut ab = 0.0_f64;
    let mut a2 = 0.0_f64;
    let mut b2 = 0.0_f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (x.widen(), y.widen());
        ab += x * y;
        a2 += x * x;
        b2 += y * y;
    }

    cosine_distance(ab, a2, b2)
}

/// Folds a dot product and two squared norms into a cosine distance.
///
/// Two zero vectors are identical (distance 0); one zero vector is orthogonal
/// to everything (distance 1).
#[inline]
#[must_use]
pub fn cosine_distance(ab: f64, a2: f64, b2: f64) -> f64 {
    if a2 == 0.0 && b2 == 0.0 {
        return 0.0;
    }
    if a2 == 0.0 || b2 == 0.0 {
        return 1.0;
    }
    (1.0 - ab / (a2 * b2).sqrt()).clamp(0.0, 2.0)
}

/// Squared Euclidean distance.
#[inline]
pub(crate) fn l2sq<T: Lane>(a: &[T], b: &[T]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x.widen() - y.widen();
            d * d
        })
        .sum()
}

// =============================================================================
// Probability
// =============================================================================

/// Kullback-Leibler divergence of `b` from `a`.
#[inline]
pub(crate) fn kl<T: Lane>(a: &[T], b: &[T]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(p, q)| {
            let (p, q) = (p.widen(), q.widen());
            p * ((p + DIVERGENCE_EPSILON) / (q + DIVERGENCE_EPSILON)).ln()
        })
        .sum()
}

/// Jensen-Shannon divergence.
#[inline]
pub(crate) fn js<T: Lane>(a: &[T], b: &[T]) -> f64 {
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(p, q)| {
            let (p, q) = (p.widen(), q.widen());
            let m = (p + q) / 2.0;
            let m = m + DIVERGENCE_EPSILON;
            p * ((p + DIVERGENCE_EPSILON) / m).ln() + q * ((q + DIVERGENCE_EPSILON) / m).ln()
        })
        .sum();
    sum / 2.0
}

// =============================================================================
// Binary
// =============================================================================

/// Number of differing bits.
#[inline]
pub(crate) fn hamming_b8(a: &[u8], b: &[u8]) -> f64 {
    let differing: u64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| u64::from((x ^ y).count_ones()))
        .sum();
    differing as f64
}

/// Jaccard distance, `1 - |a & b| / |a | b|`. Two empty sets are identical.
#[inline]
pub(crate) fn jaccard_b8(a: &[u8], b: &[u8]) -> f64 {
    let (intersection, union) = a.iter().zip(b.iter()).fold((0_u64, 0_u64), |(i, u), (x, y)| {
        (
            i + u64::from((x & y).count_ones()),
            u + u64::from((x | y).count_ones()),
        )
    });
    jaccard_distance(intersection, union)
}

/// Folds popcount totals into a Jaccard distance.
#[inline]
#[must_use]
pub fn jaccard_distance(intersection: u64, union: u64) -> f64 {
    if union == 0 {
        0.0
    } else {
        1.0 - intersection as f64 / union as f64
    }
}

// =============================================================================
// Complex
// =============================================================================

/// Complex inner product `sum(a * b)` over interleaved pairs.
#[inline]
pub(crate) fn dot_complex<T: Lane>(a: &[T], b: &[T]) -> [f64; 2] {
    let mut re = 0.0_f64;
    let mut im = 0.0_f64;
    for (x, y) in a.chunks_exact(2).zip(b.chunks_exact(2)) {
        let (ar, ai) = (x[0].widen(), x[1].widen());
        let (br, bi) = (y[0].widen(), y[1].widen());
        re += ar * br - ai * bi;
        im += ar * bi + ai * br;
    }
    [re, im]
}

/// Conjugate inner product `sum(conj(a) * b)` over interleaved pairs.
#[inline]
pub(crate) fn vdot_complex<T: Lane>(a: &[T], b: &[T]) -> [f64; 2] {
    let mut re = 0.0_f64;
    let mut im = 0.0_f64;
    for (x, y) in a.chunks_exact(2).zip(b.chunks_exact(2)) {
        let (ar, ai) = (x[0].widen(), x[1].widen());
        let (br, bi) = (y[0].widen(), y[1].widen());
        re += ar * br + ai * bi;
        im += ar * bi - ai * br;
    }
    [re, im]
}

// =============================================================================
// Registration
// =============================================================================

const fn entry(kind: MetricKind, kernel: MetricKernel) -> KernelEntry {
    KernelEntry::new(kind, Tier::Serial, kernel)
}

/// Serial tier: one kernel for every supported (metric, datatype) pair.
pub(crate) const ENTRIES: &[KernelEntry] = &[
    // f64
    entry(MetricKind::Inner, MetricKernel::F64(dot::<f64>)),
    entry(MetricKind::Cosine, MetricKernel::F64(cos::<f64>)),
    entry(MetricKind::SqEuclidean, MetricKernel::F64(l2sq::<f64>)),
    entry(MetricKind::KullbackLeibler, MetricKernel::F64(kl::<f64>)),
    entry(MetricKind::JensenShannon, MetricKernel::F64(js::<f64>)),
    // f32
    entry(MetricKind::Inner, MetricKernel::F32(dot::<f32>)),
    entry(MetricKind::Cosine, MetricKernel::F32(cos::<f32>)),
    entry(MetricKind::SqEuclidean, MetricKernel::F32(l2sq::<f32>)),
    entry(MetricKind::KullbackLeibler, MetricKernel::F32(kl::<f32>)),
    entry(MetricKind::JensenShannon, MetricKernel::F32(js::<f32>)),
    // f16
    entry(MetricKind::Inner, MetricKernel::F16(dot::<f16>)),
    entry(MetricKind::Cosine, MetricKernel::F16(cos::<f16>)),
    entry(MetricKind::SqEuclidean, MetricKernel::F16(l2sq::<f16>)),
    entry(MetricKind::KullbackLeibler, MetricKernel::F16(kl::<f16>)),
    entry(MetricKind::JensenShannon, MetricKernel::F16(js::<f16>)),
    // i8
    entry(MetricKind::Inner, MetricKernel::I8(dot::<i8>)),
    entry(MetricKind::Cosine, MetricKernel::I8(cos::<i8>)),
    entry(MetricKind::SqEuclidean, MetricKernel::I8(l2sq::<i8>)),
    // b8
    entry(MetricKind::Hamming, MetricKernel::B8(hamming_b8)),
    entry(MetricKind::Jaccard, MetricKernel::B8(jaccard_b8)),
    // complex
    entry(MetricKind::Inner, MetricKernel::F64c(dot_complex::<f64>)),
    entry(MetricKind::VDot, MetricKernel::F64c(vdot_complex::<f64>)),
    entry(MetricKind::Inner, MetricKernel::F32c(dot_complex::<f32>)),
    entry(MetricKind::VDot, MetricKernel::F32c(vdot_complex::<f32>)),
    entry(MetricKind::Inner, MetricKernel::F16c(dot_complex::<f16>)),
    entry(MetricKind::VDot, MetricKernel::F16c(vdot_complex::<f16>)),
];
