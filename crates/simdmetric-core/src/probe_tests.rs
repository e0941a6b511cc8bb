//! Tests for the capability probe.

use super::capability::{Capability, Tier};
use super::probe::{capabilities, detect_capabilities};

#[test]
fn test_probe_always_includes_serial() {
    assert!(detect_capabilities().contains(Tier::Serial));
    assert!(capabilities().contains(Tier::Serial));
}

#[test]
fn test_probe_is_deterministic() {
    assert_eq!(detect_capabilities(), detect_capabilities());
}

#[test]
fn test_cached_probe_matches_fresh_probe() {
    assert_eq!(capabilities(), detect_capabilities());
    assert_eq!(capabilities(), capabilities());
}

#[test]
fn test_probe_only_reports_known_tiers() {
    let known: Capability = Tier::ALL.into_iter().collect();
    assert!(detect_capabilities().is_subset_of(known));
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[test]
fn test_x86_tier_composition() {
    let caps = detect_capabilities();
    assert!(!caps.contains(Tier::Neon));
    assert!(!caps.contains(Tier::Sve));

    assert_eq!(
        caps.contains(Tier::Haswell),
        is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
            && is_x86_feature_detected!("f16c")
    );
    assert_eq!(caps.contains(Tier::Skylake), is_x86_feature_detected!("avx512f"));
    if caps.contains(Tier::Ice) {
        assert!(caps.contains(Tier::Skylake));
        assert!(is_x86_feature_detected!("avx512vpopcntdq"));
        assert!(is_x86_feature_detected!("avx512vnni"));
    }
    if caps.contains(Tier::Sapphire) {
        assert!(caps.contains(Tier::Skylake));
    }
}

#[cfg(target_arch = "aarch64")]
#[test]
fn test_arm_tier_composition() {
    let caps = detect_capabilities();
    assert!(caps.contains(Tier::Neon));
    assert!(!caps.contains(Tier::Haswell));
    assert_eq!(
        caps.contains(Tier::Sve2),
        std::arch::is_aarch64_feature_detected!("sve2")
    );
}

#[test]
fn test_probe_is_thread_safe() {
    let handles: Vec<_> = (0..8).map(|_| std::thread::spawn(capabilities)).collect();
    let expected = capabilities();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
