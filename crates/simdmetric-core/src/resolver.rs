//! Dispatch resolver.
//!
//! Picks, for one (metric, datatype) pair, the kernel registered under the
//! strongest tier that is both supported by the CPU and allowed by the
//! caller. Resolution walks [`Tier::BY_PRIORITY`]; a viable tier without a
//! kernel for the pair is skipped rather than ending the walk.
//!
//! Resolution is cheap but not free. Resolve once per (metric, datatype) and
//! keep the [`ResolvedMetric`] (or use [`crate::dispatch_table`]) instead of
//! resolving inside a per-comparison loop.

use tracing::trace;

use crate::capability::{Capability, Tier};
use crate::catalog::{KernelCatalog, CATALOG};
use crate::datatype::DataType;
use crate::error::{Error, Result};
use crate::kernel::MetricKernel;
use crate::metric::MetricKind;
use crate::probe::capabilities;

/// Outcome of a resolution: the chosen kernel and the tier it was found at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMetric {
    kind: MetricKind,
    datatype: DataType,
    kernel: Option<MetricKernel>,
    capability: Capability,
}

impl ResolvedMetric {
    /// No kernel for the pair under the viable tiers.
    #[must_use]
    pub const fn unsupported(kind: MetricKind, datatype: DataType) -> Self {
        Self {
            kind,
            datatype,
            kernel: None,
            capability: Capability::EMPTY,
        }
    }

    const fn found(kind: MetricKind, datatype: DataType, kernel: MetricKernel, tier: Tier) -> Self {
        Self {
            kind,
            datatype,
            kernel: Some(kernel),
            capability: Capability::only(tier),
        }
    }

    /// Metric that was requested.
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Datatype that was requested.
    #[must_use]
    pub const fn datatype(&self) -> DataType {
        self.datatype
    }

    /// Chosen kernel, if any.
    #[must_use]
    pub const fn kernel(&self) -> Option<MetricKernel> {
        self.kernel
    }

    /// Single-tier set naming the chosen tier, or empty when unsupported.
    #[must_use]
    pub const fn capability(&self) -> Capability {
        self.capability
    }

    /// Chosen tier.
    #[must_use]
    pub fn tier(&self) -> Option<Tier> {
        self.capability.best()
    }

    /// Whether a kernel was found.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        self.kernel.is_some()
    }

    /// Converts to the kernel, reporting an unsupported pair as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCombination`] when no kernel was found.
    pub fn into_kernel(self) -> Result<MetricKernel> {
        self.kernel.ok_or(Error::UnsupportedCombination {
            kind: self.kind,
            datatype: self.datatype,
        })
    }
}

impl KernelCatalog<'_> {
    /// Resolves `(kind, datatype)` against this catalog.
    ///
    /// Only tiers in `supported ∩ allowed` are considered. Never fails; an
    /// unsupported pair yields [`ResolvedMetric::unsupported`].
    #[must_use]
    pub fn resolve(
        &self,
        kind: MetricKind,
        datatype: DataType,
        supported: Capability,
        allowed: Capability,
    ) -> ResolvedMetric {
        let viable = supported.intersection(allowed);
        let resolved = viable
            .tiers()
            .find_map(|tier| {
                self.lookup(kind, datatype, tier)
                    .map(|kernel| ResolvedMetric::found(kind, datatype, kernel, tier))
            })
            .unwrap_or(ResolvedMetric::unsupported(kind, datatype));

        trace!(
            kind = %kind,
            datatype = %datatype,
            viable = %viable,
            tier = ?resolved.tier(),
            "resolved metric"
        );
        resolved
    }
}

/// Resolves `(kind, datatype)` against the built-in catalog.
///
/// `supported` is normally [`capabilities()`]; a caller may pass a narrower
/// or wider mask. Accelerated kernels re-check the CPU before running, so a
/// forged mask costs speed, never correctness.
#[must_use]
pub fn resolve(
    kind: MetricKind,
    datatype: DataType,
    supported: Capability,
    allowed: Capability,
) -> ResolvedMetric {
    CATALOG.resolve(kind, datatype, supported, allowed)
}

/// Resolves against the probed capabilities of this CPU.
///
/// Not meant for hot loops; see the module docs.
#[must_use]
pub fn resolve_cached(kind: MetricKind, datatype: DataType, allowed: Capability) -> ResolvedMetric {
    resolve(kind, datatype, capabilities(), allowed)
}
