//! Kernel catalog.
//!
//! A catalog is a set of per-tier entry sections folded into a dense
//! `(datatype, tier, kind)` table. The built-in [`CATALOG`] is a `static`
//! assembled at compile time from the sections compiled for the target
//! architecture; it never changes at runtime.
//!
//! The serial section registers every combination the crate supports.
//! Accelerated sections only ever add faster kernels for a subset.

use crate::capability::{Capability, Tier};
use crate::datatype::DataType;
use crate::kernel::MetricKernel;
use crate::kernels;
use crate::metric::MetricKind;

/// One catalogued kernel: what it computes, over which datatype, for which tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelEntry {
    /// Metric computed.
    pub kind: MetricKind,
    /// Tier the kernel requires.
    pub tier: Tier,
    /// Entry point; its variant fixes the datatype.
    pub kernel: MetricKernel,
}

impl KernelEntry {
    /// Creates an entry. The datatype is taken from the kernel variant.
    #[must_use]
    pub const fn new(kind: MetricKind, tier: Tier, kernel: MetricKernel) -> Self {
        Self { kind, tier, kernel }
    }

    /// Datatype the kernel reads.
    #[inline]
    #[must_use]
    pub const fn datatype(&self) -> DataType {
        self.kernel.datatype()
    }
}

type KindRow = [Option<MetricKernel>; MetricKind::COUNT];
type TierTable = [KindRow; Tier::COUNT];

/// Read-only `(datatype, tier, kind) -> kernel` table.
pub struct KernelCatalog<'a> {
    sections: &'a [&'a [KernelEntry]],
    table: [TierTable; DataType::COUNT],
}

impl<'a> KernelCatalog<'a> {
    /// Builds a catalog from entry sections.
    ///
    /// # Panics
    ///
    /// Panics if two entries share the same (kind, datatype, tier). In a
    /// `const` or `static` initializer this is a compile error.
    #[must_use]
    pub const fn new(sections: &'a [&'a [KernelEntry]]) -> Self {
        let mut table = [[[None; MetricKind::COUNT]; Tier::COUNT]; DataType::COUNT];

        let mut s = 0;
        while s < sections.len() {
            let section = sections[s];
            let mut e = 0;
            while e < section.len() {
                let entry = &section[e];
                let slot =
                    &mut table[entry.datatype().index()][entry.tier.index()][entry.kind.index()];
                if slot.is_some() {
                    panic!("duplicate kernel registration");
                }
                *slot = Some(entry.kernel);
                e += 1;
            }
            s += 1;
        }

        Self { sections, table }
    }

    /// Kernel registered for exactly this (kind, datatype, tier).
    #[inline]
    #[must_use]
    pub const fn lookup(&self, kind: MetricKind, datatype: DataType, tier: Tier) -> Option<MetricKernel> {
        self.table[datatype.index()][tier.index()][kind.index()]
    }

    /// All entries, section by section.
    pub fn entries(&self) -> impl Iterator<Item = &KernelEntry> + '_ {
        self.sections.iter().flat_map(|section| section.iter())
    }

    /// Tiers registering at least one kernel for `datatype`.
    #[must_use]
    pub fn tiers_for(&self, datatype: DataType) -> Capability {
        let rows = &self.table[datatype.index()];
        Tier::ALL
            .into_iter()
            .filter(|tier| rows[tier.index()].iter().any(Option::is_some))
            .collect()
    }

    /// Kinds registered for `datatype` at `tier`.
    pub fn kinds_at(&self, datatype: DataType, tier: Tier) -> impl Iterator<Item = MetricKind> + '_ {
        let row = &self.table[datatype.index()][tier.index()];
        MetricKind::ALL
            .into_iter()
            .filter(move |kind| row[kind.index()].is_some())
    }

    /// Kinds registered for `datatype` at any tier.
    pub fn kinds_for(&self, datatype: DataType) -> impl Iterator<Item = MetricKind> + '_ {
        MetricKind::ALL
            .into_iter()
            .filter(move |&kind| self.supports(kind, datatype))
    }

    /// Whether any tier implements `kind` for `datatype`.
    #[must_use]
    pub fn supports(&self, kind: MetricKind, datatype: DataType) -> bool {
        Tier::ALL
            .into_iter()
            .any(|tier| self.lookup(kind, datatype, tier).is_some())
    }

    /// Every (kind, datatype) pair some tier implements.
    pub fn combinations(&self) -> impl Iterator<Item = (MetricKind, DataType)> + '_ {
        DataType::ALL
            .into_iter()
            .flat_map(move |datatype| self.kinds_for(datatype).map(move |kind| (kind, datatype)))
    }
}

#[cfg(target_arch = "x86_64")]
const SECTIONS: &[&[KernelEntry]] = &[
    kernels::x86_ice::ENTRIES,
    kernels::x86_skylake::ENTRIES,
    kernels::x86_haswell::ENTRIES,
    kernels::serial::ENTRIES,
];

#[cfg(target_arch = "aarch64")]
const SECTIONS: &[&[KernelEntry]] = &[kernels::neon::ENTRIES, kernels::serial::ENTRIES];

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
const SECTIONS: &[&[KernelEntry]] = &[kernels::serial::ENTRIES];

/// Built-in catalog for the compilation target.
pub static CATALOG: KernelCatalog<'static> = KernelCatalog::new(SECTIONS);
