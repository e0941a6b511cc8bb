//! Runtime capability probe.
//!
//! Queries the executing CPU and composes individual ISA extensions into the
//! [`Tier`] generations the kernels are written against. The result is cached
//! once per process by [`capabilities`].

use std::sync::OnceLock;

use tracing::debug;

use crate::capability::{Capability, Tier};

/// Cached probe result, detected once at first use.
static CAPABILITIES: OnceLock<Capability> = OnceLock::new();

/// Probes the executing CPU.
///
/// Never fails: anything the probe cannot confirm is left out, and
/// [`Tier::Serial`] is always present.
#[must_use]
pub fn detect_capabilities() -> Capability {
    Capability::SERIAL.union(detect_accelerated())
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn detect_accelerated() -> Capability {
    let haswell = is_x86_feature_detected!("avx2")
        && is_x86_feature_detected!("f16c")
        && is_x86_feature_detected!("fma");
    let skylake = is_x86_feature_detected!("avx512f");
    let ice = skylake
        && is_x86_feature_detected!("avx512vnni")
        && is_x86_feature_detected!("avx512ifma")
        && is_x86_feature_detected!("avx512bitalg")
        && is_x86_feature_detected!("avx512vbmi2")
        && is_x86_feature_detected!("avx512vpopcntdq");
    let sapphire = skylake && has_avx512_fp16();

    let mut caps = Capability::EMPTY;
    for (present, tier) in [
        (haswell, Tier::Haswell),
        (skylake, Tier::Skylake),
        (ice, Tier::Ice),
        (sapphire, Tier::Sapphire),
    ] {
        if present {
            caps = caps.with(tier);
        }
    }
    caps
}

/// AVX-512 FP16, read straight from CPUID leaf 7 (EDX bit 23).
///
/// Only consulted once AVX-512F is confirmed, which implies the OS saves the
/// ZMM state.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn has_avx512_fp16() -> bool {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::{__cpuid, __cpuid_count};
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::{__cpuid, __cpuid_count};

    // SAFETY: CPUID is available on every CPU that reports AVX-512F.
    #[allow(unused_unsafe)]
    let max_leaf = unsafe { __cpuid(0) }.eax;
    if max_leaf < 7 {
        return false;
    }
    // SAFETY: leaf 7 is within the range reported above.
    #[allow(unused_unsafe)]
    let leaf7 = unsafe { __cpuid_count(7, 0) };
    leaf7.edx & (1 << 23) != 0
}

#[cfg(target_arch = "aarch64")]
fn detect_accelerated() -> Capability {
    let mut caps = Capability::only(Tier::Neon);
    if std::arch::is_aarch64_feature_detected!("sve") {
        caps = caps.with(Tier::Sve);
    }
    if std::arch::is_aarch64_feature_detected!("sve2") {
        caps = caps.with(Tier::Sve2);
    }
    caps
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn detect_accelerated() -> Capability {
    Capability::EMPTY
}

/// Returns the cached capability set of the executing CPU.
///
/// The first call runs [`detect_capabilities`]; later calls are a load.
#[inline]
#[must_use]
pub fn capabilities() -> Capability {
    *CAPABILITIES.get_or_init(|| {
        let caps = detect_capabilities();
        debug!(capabilities = %caps, bits = caps.bits(), "probed CPU capabilities");
        caps
    })
}
