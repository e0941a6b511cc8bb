//! Tests for the serial reference kernels.

use half::f16;

use super::serial::{
    cos, cosine_distance, dot, dot_complex, hamming_b8, jaccard_b8, jaccard_distance, js, kl,
    l2sq, vdot_complex, ENTRIES,
};
use crate::capability::Tier;
use crate::datatype::DataType;
use crate::metric::MetricKind;

const EPSILON: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "got {actual}, expected {expected}"
    );
}

// =============================================================================
// Spatial
// =============================================================================

#[test]
fn test_dot_known_values() {
    assert_close(dot(&[1.0_f32, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    assert_close(dot(&[-1_i8, 2, 127], &[3_i8, -4, 127]), -3.0 - 8.0 + 16129.0);
    assert_close(dot::<f64>(&[], &[]), 0.0);
}

#[test]
fn test_dot_i8_does_not_overflow() {
    let a = vec![-128_i8; 1024];
    assert_close(dot(&a, &a), 1024.0 * 16384.0);
}

#[test]
fn test_cos_known_values() {
    assert_close(cos(&[1.0_f64, 0.0], &[0.0, 1.0]), 1.0);
    assert_close(cos(&[1.0_f64, 2.0], &[2.0, 4.0]), 0.0);
    assert_close(cos(&[1.0_f64, 2.0], &[-1.0, -2.0]), 2.0);
}

#[test]
fn test_cos_zero_vectors() {
    assert_close(cos(&[0.0_f32; 4], &[0.0_f32; 4]), 0.0);
    assert_close(cos(&[0.0_f32; 4], &[1.0_f32; 4]), 1.0);
    assert_close(cos(&[1.0_f32; 4], &[0.0_f32; 4]), 1.0);
}

#[test]
fn test_cosine_distance_is_clamped() {
    // Rounding can push ab slightly past the norms.
    let d = cosine_distance(1.000_000_1, 1.0, 1.0);
    assert!(d >= 0.0);
    let d = cosine_distance(-1.000_000_1, 1.0, 1.0);
    assert!(d <= 2.0);
}

#[test]
fn test_l2sq_known_values() {
    assert_close(l2sq(&[1.0_f32, 2.0, 3.0], &[4.0, 6.0, 3.0]), 25.0);
    assert_close(l2sq(&[-128_i8], &[127_i8]), 255.0 * 255.0);
}

#[test]
fn test_f16_widening() {
    let a: Vec<f16> = [0.5_f32, 1.5, -2.0].iter().map(|&x| f16::from_f32(x)).collect();
    let b: Vec<f16> = [2.0_f32, 2.0, 0.25].iter().map(|&x| f16::from_f32(x)).collect();
    assert_close(dot(&a, &b), 1.0 + 3.0 - 0.5);
}

#[test]
fn test_unequal_lengths_truncate() {
    assert_close(dot(&[1.0_f64, 1.0, 1.0], &[2.0, 2.0]), 4.0);
    assert_close(hamming_b8(&[0xFF, 0xFF], &[0x00]), 8.0);
}

// =============================================================================
// Probability
// =============================================================================

#[test]
fn test_kl_identical_distributions_is_zero() {
    let p = [0.25_f64, 0.25, 0.5];
    assert!(kl(&p, &p).abs() < 1e-6);
}

#[test]
fn test_kl_known_value() {
    let p = [0.5_f64, 0.5];
    let q = [0.25_f64, 0.75];
    let expected = 0.5 * (0.5_f64 / 0.25).ln() + 0.5 * (0.5_f64 / 0.75).ln();
    assert!((kl(&p, &q) - expected).abs() < 1e-5);
}

#[test]
fn test_kl_zero_mass_is_finite() {
    let p = [1.0_f32, 0.0];
    let q = [0.0_f32, 1.0];
    assert!(kl(&p, &q).is_finite());
    assert!(kl(&q, &p).is_finite());
}

#[test]
fn test_js_symmetric_and_bounded() {
    let p = [0.1_f64, 0.2, 0.7];
    let q = [0.6_f64, 0.3, 0.1];
    let pq = js(&p, &q);
    let qp = js(&q, &p);
    assert!((pq - qp).abs() < 1e-12);
    assert!(pq > 0.0);
    assert!(pq <= std::f64::consts::LN_2 + 1e-6);
    assert!(js(&p, &p).abs() < 1e-6);
}

// =============================================================================
// Binary
// =============================================================================

#[test]
fn test_hamming_counts_bits() {
    assert_close(hamming_b8(&[0b1010_1010], &[0b0101_0101]), 8.0);
    assert_close(hamming_b8(&[0b1000_0001, 0xF0], &[0b0000_0001, 0xF0]), 1.0);
    assert_close(hamming_b8(&[], &[]), 0.0);
}

#[test]
fn test_jaccard_known_values() {
    // a = {0,1,2,3}, b = {2,3,4,5}: |a&b| = 2, |a|b| = 6
    assert_close(jaccard_b8(&[0b0000_1111], &[0b0011_1100]), 1.0 - 2.0 / 6.0);
    assert_close(jaccard_b8(&[0xAB], &[0xAB]), 0.0);
    assert_close(jaccard_b8(&[0x0F], &[0xF0]), 1.0);
}

#[test]
fn test_jaccard_empty_sets_are_identical() {
    assert_close(jaccard_b8(&[0, 0], &[0, 0]), 0.0);
    assert_close(jaccard_distance(0, 0), 0.0);
}

// =============================================================================
// Complex
// =============================================================================

#[test]
fn test_complex_products() {
    // a = [1+2i, 3-1i], b = [2-1i, 1+1i]
    let a = [1.0_f64, 2.0, 3.0, -1.0];
    let b = [2.0_f64, -1.0, 1.0, 1.0];
    // (1+2i)(2-i) = 4+3i ; (3-i)(1+i) = 4+2i
    assert_eq!(dot_complex(&a, &b), [8.0, 5.0]);
    // conj(1+2i)(2-i) = (1-2i)(2-i) = 0-5i ; conj(3-i)(1+i) = (3+i)(1+i) = 2+4i
    assert_eq!(vdot_complex(&a, &b), [2.0, -1.0]);
}

#[test]
fn test_complex_ignores_trailing_half_pair() {
    assert_eq!(dot_complex(&[1.0_f32, 0.0, 9.0], &[1.0_f32, 0.0, 9.0]), [1.0, 0.0]);
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_serial_entries_cover_supported_table() {
    let expected: &[(DataType, &[MetricKind])] = &[
        (
            DataType::F64,
            &[
                MetricKind::Inner,
                MetricKind::Cosine,
                MetricKind::SqEuclidean,
                MetricKind::KullbackLeibler,
                MetricKind::JensenShannon,
            ],
        ),
        (
            DataType::F32,
            &[
                MetricKind::Inner,
                MetricKind::Cosine,
                MetricKind::SqEuclidean,
                MetricKind::KullbackLeibler,
                MetricKind::JensenShannon,
            ],
        ),
        (
            DataType::F16,
            &[
                MetricKind::Inner,
                MetricKind::Cosine,
                MetricKind::SqEuclidean,
                MetricKind::KullbackLeibler,
                MetricKind::JensenShannon,
            ],
        ),
        (
            DataType::I8,
            &[MetricKind::Inner, MetricKind::Cosine, MetricKind::SqEuclidean],
        ),
        (DataType::B8, &[MetricKind::Hamming, MetricKind::Jaccard]),
        (DataType::F64c, &[MetricKind::Inner, MetricKind::VDot]),
        (DataType::F32c, &[MetricKind::Inner, MetricKind::VDot]),
        (DataType::F16c, &[MetricKind::Inner, MetricKind::VDot]),
        (DataType::I8c, &[]),
    ];

    for &(datatype, kinds) in expected {
        let mut registered: Vec<MetricKind> = ENTRIES
            .iter()
            .filter(|e| e.datatype() == datatype)
            .map(|e| e.kind)
            .collect();
        registered.sort_by_key(|k| k.index());
        let mut kinds = kinds.to_vec();
        kinds.sort_by_key(|k| k.index());
        assert_eq!(registered, kinds, "serial coverage for {datatype}");
    }

    assert_eq!(ENTRIES.len(), 26);
    assert!(ENTRIES.iter().all(|e| e.tier == Tier::Serial));
}
