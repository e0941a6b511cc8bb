//! Typed similarity traits.
//!
//! Implemented on element types so callers write `f32::cosine(a, b)` and get
//! the kernel from the process-wide [`dispatch_table`]. Every method returns
//! `None` when the slices differ in length or no kernel exists for the pair.
//!
//! ```
//! use simdmetric_core::SpatialSimilarity;
//!
//! let a = [1.0_f32, 2.0, 3.0];
//! let b = [4.0_f32, 5.0, 6.0];
//! assert_eq!(f32::dot(&a, &b), Some(32.0));
//! ```

use crate::dispatch::dispatch_table;
use crate::kernel::{ComplexScalar, RealScalar};
use crate::metric::MetricKind;

fn real<T: RealScalar>(kind: MetricKind, a: &[T], b: &[T]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    let kernel = dispatch_table().get(kind, T::DATATYPE).kernel()?.real::<T>()?;
    Some(kernel(a, b))
}

fn complex<T: ComplexScalar>(kind: MetricKind, a: &[T], b: &[T]) -> Option<(f64, f64)> {
    if a.len() != b.len() || a.len() % 2 != 0 {
        return None;
    }
    let kernel = dispatch_table()
        .get(kind, T::DATATYPE)
        .kernel()?
        .complex::<T>()?;
    let [re, im] = kernel(a, b);
    Some((re, im))
}

/// Inner product, cosine and squared Euclidean distance.
pub trait SpatialSimilarity: RealScalar {
    /// Inner product.
    fn dot(a: &[Self], b: &[Self]) -> Option<f64> {
        real(MetricKind::Inner, a, b)
    }

    /// Cosine distance, `1 - cos(a, b)`.
    fn cosine(a: &[Self], b: &[Self]) -> Option<f64> {
        real(MetricKind::Cosine, a, b)
    }

    /// Squared Euclidean distance.
    fn sqeuclidean(a: &[Self], b: &[Self]) -> Option<f64> {
        real(MetricKind::SqEuclidean, a, b)
    }

    /// Cosine distance from `query` to each candidate, in candidate order.
    fn cosine_batch(query: &[Self], candidates: &[&[Self]]) -> Vec<Option<f64>> {
        candidates.iter().map(|c| Self::cosine(query, c)).collect()
    }
}

/// Divergences between discrete probability distributions.
pub trait ProbabilitySimilarity: RealScalar {
    /// Kullback-Leibler divergence `KL(a || b)`.
    fn kullbackleibler(a: &[Self], b: &[Self]) -> Option<f64> {
        real(MetricKind::KullbackLeibler, a, b)
    }

    /// Jensen-Shannon divergence.
    fn jensenshannon(a: &[Self], b: &[Self]) -> Option<f64> {
        real(MetricKind::JensenShannon, a, b)
    }
}

/// Distances over bit-packed byte vectors.
pub trait BinarySimilarity: RealScalar {
    /// Number of differing bits.
    fn hamming(a: &[Self], b: &[Self]) -> Option<f64> {
        real(MetricKind::Hamming, a, b)
    }

    /// Jaccard distance over set bits.
    fn jaccard(a: &[Self], b: &[Self]) -> Option<f64> {
        real(MetricKind::Jaccard, a, b)
    }
}

/// Products of interleaved `(re, im)` complex vectors.
pub trait ComplexProducts: ComplexScalar {
    /// Complex inner product `sum(a * b)`.
    fn cdot(a: &[Self], b: &[Self]) -> Option<(f64, f64)> {
        complex(MetricKind::Inner, a, b)
    }

    /// Conjugate inner product `sum(conj(a) * b)`.
    fn vdot(a: &[Self], b: &[Self]) -> Option<(f64, f64)> {
        complex(MetricKind::VDot, a, b)
    }
}

impl SpatialSimilarity for f64 {}
impl SpatialSimilarity for f32 {}
impl SpatialSimilarity for half::f16 {}
impl SpatialSimilarity for i8 {}

impl ProbabilitySimilarity for f64 {}
impl ProbabilitySimilarity for f32 {}
impl ProbabilitySimilarity for half::f16 {}

impl BinarySimilarity for u8 {}

impl ComplexProducts for f64 {}
impl ComplexProducts for f32 {}
impl ComplexProducts for half::f16 {}
