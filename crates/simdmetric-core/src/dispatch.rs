//! Process-wide dispatch table and the cached [`Metric`] handle.
//!
//! This module provides:
//! - [`DispatchTable`]: the resolution of every (metric, datatype) pair,
//!   built once from the probed capabilities and the configured mask
//! - [`dispatch_table()`] for lazy, cached access
//! - [`configure()`] to install a [`DispatchConfig`] before first use
//! - [`warmup_dispatch()`] for eliminating cold-start latency
//! - [`Metric`]: one resolved kernel with checked invocation

use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

use crate::capability::{Capability, Tier};
use crate::catalog::CATALOG;
use crate::config::DispatchConfig;
use crate::datatype::DataType;
use crate::error::{Error, Result};
use crate::kernel::{ComplexScalar, Distance, MetricKernel, RealScalar, VectorPair};
use crate::metric::MetricKind;
use crate::probe::capabilities;
use crate::resolver::{resolve_cached, ResolvedMetric};

// =============================================================================
// Dispatch table
// =============================================================================

/// Resolution of every (metric, datatype) pair under one capability mask.
#[derive(Clone)]
pub struct DispatchTable {
    supported: Capability,
    allowed: Capability,
    resolved: [[ResolvedMetric; MetricKind::COUNT]; DataType::COUNT],
}

impl DispatchTable {
    /// Resolves every pair against the built-in catalog.
    #[must_use]
    pub fn build(supported: Capability, allowed: Capability) -> Self {
        let resolved = std::array::from_fn(|d| {
            let datatype = DataType::ALL[d];
            std::array::from_fn(|k| CATALOG.resolve(MetricKind::ALL[k], datatype, supported, allowed))
        });
        Self {
            supported,
            allowed,
            resolved,
        }
    }

    /// Resolution for `(kind, datatype)`.
    #[inline]
    #[must_use]
    pub fn get(&self, kind: MetricKind, datatype: DataType) -> ResolvedMetric {
        self.resolved[datatype.index()][kind.index()]
    }

    /// Capabilities the table was built for.
    #[must_use]
    pub fn supported(&self) -> Capability {
        self.supported
    }

    /// Allowed mask the table was built with.
    #[must_use]
    pub fn allowed(&self) -> Capability {
        self.allowed
    }

    /// Every resolution, datatype-major.
    pub fn iter(&self) -> impl Iterator<Item = ResolvedMetric> + '_ {
        self.resolved.iter().flatten().copied()
    }

    /// Resolutions that found a kernel.
    pub fn supported_pairs(&self) -> impl Iterator<Item = ResolvedMetric> + '_ {
        self.iter().filter(ResolvedMetric::is_supported)
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("supported", &self.supported)
            .field("allowed", &self.allowed)
            .field("pairs", &self.supported_pairs().count())
            .finish()
    }
}

/// Process-wide table, built on first use or by [`configure`].
static TABLE: OnceLock<DispatchTable> = OnceLock::new();

fn install(allowed: Capability) -> DispatchTable {
    let supported = capabilities();
    let table = DispatchTable::build(supported, allowed);
    debug!(
        supported = %supported,
        allowed = %allowed,
        pairs = table.supported_pairs().count(),
        "built dispatch table"
    );
    table
}

/// Returns the process-wide dispatch table.
///
/// Built on first call with every tier allowed, unless [`configure`] ran
/// first.
#[inline]
#[must_use]
pub fn dispatch_table() -> &'static DispatchTable {
    TABLE.get_or_init(|| install(Capability::ANY))
}

/// Builds the process-wide table from `config`.
///
/// # Errors
///
/// - [`Error::Config`] if `config` fails validation
/// - [`Error::AlreadyConfigured`] if the table was already built, either by
///   an earlier `configure` or by first use
pub fn configure(config: &DispatchConfig) -> Result<&'static DispatchTable> {
    config.validate()?;
    if TABLE.get().is_some() {
        return Err(Error::AlreadyConfigured);
    }
    TABLE
        .set(install(config.allowed_mask()))
        .map_err(|_| Error::AlreadyConfigured)?;
    Ok(dispatch_table())
}

/// Warms up the probe and dispatch table so the first metric call is as
/// fast as later ones.
///
/// # Example
///
/// ```
/// simdmetric_core::warmup_dispatch();
/// ```
pub fn warmup_dispatch() {
    let table = dispatch_table();
    let a = vec![0.01_f32; 768];
    let b = vec![0.01_f32; 768];
    for kind in [MetricKind::Inner, MetricKind::Cosine, MetricKind::SqEuclidean] {
        if let Some(kernel) = table.get(kind, DataType::F32).kernel() {
            let _ = kernel.compute(VectorPair::F32(&a, &b));
        }
    }
}

// =============================================================================
// Metric handle
// =============================================================================

/// A resolved kernel for one (metric, datatype) pair.
///
/// Resolve once, then call [`Metric::real`], [`Metric::complex`] or
/// [`Metric::compute`] per comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metric {
    kind: MetricKind,
    datatype: DataType,
    tier: Tier,
    kernel: MetricKernel,
}

impl Metric {
    /// Looks the pair up in the process-wide dispatch table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCombination`] if no kernel exists.
    pub fn new(kind: MetricKind, datatype: DataType) -> Result<Self> {
        Self::from_resolved(dispatch_table().get(kind, datatype))
    }

    /// Resolves the pair against the probed CPU, limited to `allowed`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCombination`] if no allowed tier has a kernel.
    pub fn with_allowed(kind: MetricKind, datatype: DataType, allowed: Capability) -> Result<Self> {
        Self::from_resolved(resolve_cached(kind, datatype, allowed))
    }

    fn from_resolved(resolved: ResolvedMetric) -> Result<Self> {
        let unsupported = Error::UnsupportedCombination {
            kind: resolved.kind(),
            datatype: resolved.datatype(),
        };
        match (resolved.kernel(), resolved.tier()) {
            (Some(kernel), Some(tier)) => Ok(Self {
                kind: resolved.kind(),
                datatype: resolved.datatype(),
                tier,
                kernel,
            }),
            _ => Err(unsupported),
        }
    }

    /// Metric computed.
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Datatype read.
    #[must_use]
    pub const fn datatype(&self) -> DataType {
        self.datatype
    }

    /// Tier the kernel was resolved at.
    #[must_use]
    pub const fn tier(&self) -> Tier {
        self.tier
    }

    /// Underlying kernel.
    #[must_use]
    pub const fn kernel(&self) -> MetricKernel {
        self.kernel
    }

    /// Runs the kernel on datatype-tagged vectors.
    ///
    /// # Errors
    ///
    /// See [`MetricKernel::compute`].
    #[inline]
    pub fn compute(&self, vectors: VectorPair<'_>) -> Result<Distance> {
        self.kernel.compute(vectors)
    }

    /// Runs a real-valued kernel over `T` slices.
    ///
    /// # Errors
    ///
    /// - [`Error::DataTypeMismatch`] if `T` is not this metric's element type
    /// - [`Error::DimensionMismatch`] if the slices differ in length
    pub fn real<T: RealScalar>(&self, a: &[T], b: &[T]) -> Result<f64> {
        let kernel = self.kernel.real::<T>().ok_or(Error::DataTypeMismatch {
            expected: self.datatype,
            actual: T::DATATYPE,
        })?;
        check_lengths(a.len(), b.len())?;
        Ok(kernel(a, b))
    }

    /// Runs a complex kernel over interleaved `T` slices, returning `(re, im)`.
    ///
    /// # Errors
    ///
    /// - [`Error::DataTypeMismatch`] if `T` is not this metric's element type
    /// - [`Error::DimensionMismatch`] if the slices differ in length
    /// - [`Error::OddComplexLength`] if the slices hold a partial pair
    pub fn complex<T: ComplexScalar>(&self, a: &[T], b: &[T]) -> Result<(f64, f64)> {
        let kernel = self.kernel.complex::<T>().ok_or(Error::DataTypeMismatch {
            expected: self.datatype,
            actual: T::DATATYPE,
        })?;
        check_lengths(a.len(), b.len())?;
        if a.len() % 2 != 0 {
            return Err(Error::OddComplexLength(a.len()));
        }
        let [re, im] = kernel(a, b);
        Ok((re, im))
    }
}

fn check_lengths(left: usize, right: usize) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(Error::DimensionMismatch { left, right })
    }
}
