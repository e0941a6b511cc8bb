//! Instruction-set tiers and capability sets.
//!
//! A [`Tier`] names one hardware generation a kernel can be compiled for. A
//! [`Capability`] is a set of tiers, stored as the stable bitmask callers may
//! persist or pass across process boundaries.
//!
//! Bit positions are additive: a new tier takes an unused bit, existing tiers
//! never move.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hardware generation a kernel targets.
///
/// The discriminant is the tier's bit in a [`Capability`] mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum Tier {
    /// Portable scalar code. Present on every machine.
    Serial = 1,
    /// Arm Advanced SIMD, baseline on aarch64.
    Neon = 1 << 10,
    /// Arm Scalable Vector Extension.
    Sve = 1 << 11,
    /// Arm Scalable Vector Extension 2.
    Sve2 = 1 << 12,
    /// x86 AVX2 together with FMA and F16C.
    Haswell = 1 << 20,
    /// x86 AVX-512 foundation.
    Skylake = 1 << 21,
    /// x86 AVX-512 with VNNI, IFMA, BITALG, VBMI2 and VPOPCNTDQ.
    Ice = 1 << 22,
    /// x86 AVX-512 with native `f16` arithmetic.
    Sapphire = 1 << 23,
}

impl Tier {
    /// Number of tiers.
    pub const COUNT: usize = 8;

    /// Every tier, in declaration order.
    pub const ALL: [Tier; Self::COUNT] = [
        Tier::Serial,
        Tier::Neon,
        Tier::Sve,
        Tier::Sve2,
        Tier::Haswell,
        Tier::Skylake,
        Tier::Ice,
        Tier::Sapphire,
    ];

    /// Resolution order, strongest first.
    ///
    /// x86 and Arm tiers are never supported on the same machine, so this
    /// single order only ranks tiers within one family. Serial is always last.
    pub const BY_PRIORITY: [Tier; Self::COUNT] = [
        Tier::Sapphire,
        Tier::Ice,
        Tier::Skylake,
        Tier::Haswell,
        Tier::Sve2,
        Tier::Sve,
        Tier::Neon,
        Tier::Serial,
    ];

    /// Bit of this tier in a capability mask.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u32 {
        self as u32
    }

    /// Dense index in `0..Tier::COUNT`, matching [`Tier::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Tier::Serial => 0,
            Tier::Neon => 1,
            Tier::Sve => 2,
            Tier::Sve2 => 3,
            Tier::Haswell => 4,
            Tier::Skylake => 5,
            Tier::Ice => 6,
            Tier::Sapphire => 7,
        }
    }

    /// Position in [`Tier::BY_PRIORITY`]; lower is preferred.
    #[must_use]
    pub fn priority(self) -> usize {
        Self::BY_PRIORITY
            .iter()
            .position(|&t| t == self)
            .unwrap_or(Self::COUNT)
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Tier::Serial => "serial",
            Tier::Neon => "neon",
            Tier::Sve => "sve",
            Tier::Sve2 => "sve2",
            Tier::Haswell => "haswell",
            Tier::Skylake => "skylake",
            Tier::Ice => "ice",
            Tier::Sapphire => "sapphire",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Tier::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| Error::UnknownTier(s.to_string()))
    }
}

/// Set of capability tiers.
///
/// Set algebra is exposed through named operations so the resolver reads as
/// set logic rather than bit twiddling.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capability(u32);

impl Capability {
    /// No tiers.
    pub const EMPTY: Self = Self(0);

    /// Serial tier only; the guaranteed fallback.
    pub const SERIAL: Self = Self(Tier::Serial as u32);

    /// Wildcard mask accepting every tier, present and future.
    pub const ANY: Self = Self(0x7FFF_FFFF);

    /// Wraps a raw mask, keeping unknown bits.
    #[inline]
    #[must_use]
    pub const fn from_bits_retain(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw mask value.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Set holding exactly one tier.
    #[inline]
    #[must_use]
    pub const fn only(tier: Tier) -> Self {
        Self(tier.bit())
    }

    /// Tiers in either set.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Tiers in both sets.
    #[inline]
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Tiers in `self` but not in `other`.
    #[inline]
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// This set plus `tier`.
    #[inline]
    #[must_use]
    pub const fn with(self, tier: Tier) -> Self {
        Self(self.0 | tier.bit())
    }

    /// This set minus `tier`.
    #[inline]
    #[must_use]
    pub const fn without(self, tier: Tier) -> Self {
        Self(self.0 & !tier.bit())
    }

    /// Whether `tier` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, tier: Tier) -> bool {
        self.0 & tier.bit() != 0
    }

    /// Whether every tier of `self` is also in `other`.
    #[inline]
    #[must_use]
    pub const fn is_subset_of(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Whether no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Known tiers in the set, strongest first.
    pub fn tiers(self) -> impl Iterator<Item = Tier> {
        Tier::BY_PRIORITY
            .into_iter()
            .filter(move |&t| self.contains(t))
    }

    /// Strongest tier in the set.
    #[must_use]
    pub fn best(self) -> Option<Tier> {
        self.tiers().next()
    }
}

impl From<Tier> for Capability {
    fn from(tier: Tier) -> Self {
        Self::only(tier)
    }
}

impl FromIterator<Tier> for Capability {
    fn from_iter<I: IntoIterator<Item = Tier>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability({self})")
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ANY {
            return f.write_str("any");
        }
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.tiers().map(Tier::name).collect();
        f.write_str(&names.join("+"))
    }
}
