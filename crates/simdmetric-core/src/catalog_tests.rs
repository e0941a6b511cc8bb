#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
//! Tests for the kernel catalog.

use half::f16;

use super::capability::{Capability, Tier};
use super::catalog::{KernelCatalog, KernelEntry, CATALOG};
use super::datatype::DataType;
use super::kernel::MetricKernel;
use super::metric::MetricKind;

fn dot_a(a: &[f32], b: &[f32]) -> f64 {
    a.iter().zip(b).map(|(x, y)| f64::from(x * y)).sum()
}

fn dot_b(a: &[f32], b: &[f32]) -> f64 {
    dot_a(a, b) + 1.0
}

// ---------------------------------------------------------------------------
// Built-in catalog
// ---------------------------------------------------------------------------

#[test]
fn test_serial_tier_covers_every_supported_pair() {
    for (kind, datatype) in CATALOG.combinations() {
        assert!(
            CATALOG.lookup(kind, datatype, Tier::Serial).is_some(),
            "{kind}/{datatype} has no serial kernel"
        );
    }
}

#[test]
fn test_no_duplicate_registrations() {
    let entries: Vec<&KernelEntry> = CATALOG.entries().collect();
    for (i, a) in entries.iter().enumerate() {
        for b in &entries[i + 1..] {
            assert!(
                !(a.kind == b.kind && a.datatype() == b.datatype() && a.tier == b.tier),
                "duplicate {}/{}/{}",
                a.kind,
                a.datatype(),
                a.tier
            );
        }
    }
}

#[test]
fn test_lookup_agrees_with_entries() {
    for entry in CATALOG.entries() {
        assert_eq!(
            CATALOG.lookup(entry.kind, entry.datatype(), entry.tier),
            Some(entry.kernel)
        );
    }
}

#[test]
fn test_entry_datatype_comes_from_kernel() {
    for entry in CATALOG.entries() {
        assert_eq!(entry.datatype(), entry.kernel.datatype());
    }
}

#[test]
fn test_unsupported_pairs_are_absent() {
    assert!(!CATALOG.supports(MetricKind::Jaccard, DataType::F32));
    assert!(!CATALOG.supports(MetricKind::Hamming, DataType::F64));
    assert!(!CATALOG.supports(MetricKind::VDot, DataType::F32));
    assert!(!CATALOG.supports(MetricKind::KullbackLeibler, DataType::I8));
    for kind in MetricKind::ALL {
        assert!(!CATALOG.supports(kind, DataType::I8c));
    }
    assert!(CATALOG.tiers_for(DataType::I8c).is_empty());
}

#[test]
fn test_kinds_for_and_tiers_for() {
    let b8: Vec<MetricKind> = CATALOG.kinds_for(DataType::B8).collect();
    assert_eq!(b8, vec![MetricKind::Hamming, MetricKind::Jaccard]);

    let complex: Vec<MetricKind> = CATALOG.kinds_for(DataType::F16c).collect();
    assert_eq!(complex, vec![MetricKind::Inner, MetricKind::VDot]);

    let tiers = CATALOG.tiers_for(DataType::F64);
    assert!(tiers.contains(Tier::Serial));
    assert!(tiers.is_subset_of(Capability::ANY));
}

#[test]
fn test_kinds_at_serial() {
    let kinds: Vec<MetricKind> = CATALOG.kinds_at(DataType::I8, Tier::Serial).collect();
    assert_eq!(
        kinds,
        vec![MetricKind::Inner, MetricKind::Cosine, MetricKind::SqEuclidean]
    );
    assert_eq!(CATALOG.kinds_at(DataType::F32, Tier::Sapphire).count(), 0);
}

#[test]
fn test_combination_count() {
    assert_eq!(CATALOG.combinations().count(), 26);
}

#[cfg(target_arch = "x86_64")]
#[test]
fn test_x86_sections_registered() {
    assert!(CATALOG.lookup(MetricKind::Inner, DataType::F32, Tier::Haswell).is_some());
    assert!(CATALOG.lookup(MetricKind::Cosine, DataType::F64, Tier::Skylake).is_some());
    assert!(CATALOG.lookup(MetricKind::Hamming, DataType::B8, Tier::Ice).is_some());
    assert!(CATALOG.tiers_for(DataType::F32).contains(Tier::Skylake));
    assert!(!CATALOG.tiers_for(DataType::F32).contains(Tier::Neon));
}

#[cfg(target_arch = "aarch64")]
#[test]
fn test_arm_sections_registered() {
    assert!(CATALOG.lookup(MetricKind::Inner, DataType::F32, Tier::Neon).is_some());
    assert!(CATALOG.lookup(MetricKind::Jaccard, DataType::B8, Tier::Neon).is_some());
    assert!(!CATALOG.tiers_for(DataType::F32).contains(Tier::Haswell));
}

// ---------------------------------------------------------------------------
// Every registered kernel agrees with serial, including on unequal lengths
// ---------------------------------------------------------------------------

fn sample_f64(len: usize, seed: f64) -> Vec<f64> {
    (0..len).map(|i| ((i as f64) * 0.37 + seed).sin().abs() + 0.01).collect()
}

fn assert_agrees(entry: &KernelEntry, actual: f64, expected: f64) {
    let allowed = 1e-3 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= allowed,
        "{}/{}/{}: got {actual}, serial {expected}",
        entry.kind,
        entry.datatype(),
        entry.tier
    );
}

#[test]
fn test_all_kernels_match_serial_on_truncated_inputs() {
    for len in [0_usize, 1, 7, 16, 33, 100] {
        let a64 = sample_f64(len + 3, 0.0);
        let b64 = sample_f64(len, 1.0);
        let a32: Vec<f32> = a64.iter().map(|&x| x as f32).collect();
        let b32: Vec<f32> = b64.iter().map(|&x| x as f32).collect();
        let a16: Vec<f16> = a64.iter().map(|&x| f16::from_f64(x)).collect();
        let b16: Vec<f16> = b64.iter().map(|&x| f16::from_f64(x)).collect();
        let a8: Vec<i8> = (0..len + 3).map(|i| (i as i8).wrapping_mul(37)).collect();
        let b8: Vec<i8> = (0..len).map(|i| (i as i8).wrapping_mul(-11)).collect();
        let ab: Vec<u8> = (0..len + 3).map(|i| (i as u8).wrapping_mul(29)).collect();
        let bb: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_mul(71) ^ 0x5A).collect();

        for entry in CATALOG.entries() {
            let reference = CATALOG
                .lookup(entry.kind, entry.datatype(), Tier::Serial)
                .expect("serial kernel");
            match (entry.kernel, reference) {
                (MetricKernel::F64(f), MetricKernel::F64(g)) => {
                    assert_agrees(entry, f(&a64, &b64), g(&a64[..len], &b64));
                }
                (MetricKernel::F32(f), MetricKernel::F32(g)) => {
                    assert_agrees(entry, f(&a32, &b32), g(&a32[..len], &b32));
                }
                (MetricKernel::F16(f), MetricKernel::F16(g)) => {
                    assert_agrees(entry, f(&a16, &b16), g(&a16[..len], &b16));
                }
                (MetricKernel::I8(f), MetricKernel::I8(g)) => {
                    assert_agrees(entry, f(&a8, &b8), g(&a8[..len], &b8));
                }
                (MetricKernel::B8(f), MetricKernel::B8(g)) => {
                    assert_agrees(entry, f(&ab, &bb), g(&ab[..len], &bb));
                }
                (MetricKernel::F64c(_), _)
                | (MetricKernel::F32c(_), _)
                | (MetricKernel::F16c(_), _) => {}
                (kernel, reference) => panic!("variant mismatch: {kernel:?} vs {reference:?}"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Custom catalogs
// ---------------------------------------------------------------------------

#[test]
fn test_custom_catalog_lookup() {
    const SECTION: &[KernelEntry] = &[
        KernelEntry::new(MetricKind::Inner, Tier::Serial, MetricKernel::F32(dot_a)),
        KernelEntry::new(MetricKind::Inner, Tier::Haswell, MetricKernel::F32(dot_b)),
    ];
    const SECTIONS: &[&[KernelEntry]] = &[SECTION];
    let catalog = KernelCatalog::new(SECTIONS);

    assert_eq!(catalog.entries().count(), 2);
    assert_eq!(
        catalog.tiers_for(DataType::F32),
        Capability::from_iter([Tier::Serial, Tier::Haswell])
    );
    let haswell = catalog
        .lookup(MetricKind::Inner, DataType::F32, Tier::Haswell)
        .and_then(MetricKernel::real::<f32>)
        .expect("registered");
    assert_eq!(haswell(&[1.0], &[2.0]), 3.0);
    assert!(catalog.lookup(MetricKind::Cosine, DataType::F32, Tier::Serial).is_none());
}

#[test]
#[should_panic(expected = "duplicate kernel registration")]
fn test_custom_catalog_rejects_duplicates() {
    let section = [
        KernelEntry::new(MetricKind::Inner, Tier::Serial, MetricKernel::F32(dot_a)),
        KernelEntry::new(MetricKind::Inner, Tier::Serial, MetricKernel::F32(dot_b)),
    ];
    let sections: [&[KernelEntry]; 1] = [&section];
    let _ = KernelCatalog::new(&sections);
}
