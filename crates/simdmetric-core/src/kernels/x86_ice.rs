//! AVX-512 VPOPCNTDQ binary kernels for x86_64.
//!
//! Hamming and Jaccard over packed bit vectors, 64 bytes per iteration with
//! per-lane 64-bit popcounts.

#![allow(clippy::cast_sign_loss)]
#![allow(clippy::wildcard_imports)]

use std::arch::x86_64::*;

use super::serial;
use crate::capability::Tier;
use crate::catalog::KernelEntry;
use crate::kernel::MetricKernel;
use crate::metric::MetricKind;

#[inline]
fn available() -> bool {
    is_x86_feature_detected!("avx512f") && is_x86_feature_detected!("avx512vpopcntdq")
}

/// # Safety
///
/// CPU supports AVX-512F and VPOPCNTDQ; `a.len() == b.len()`.
#[target_feature(enable = "avx512f,avx512vpopcntdq")]
#[inline]
unsafe fn hamming_b8_ice(a: &[u8], b: &[u8]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut acc = _mm512_setzero_si512();
    let mut offset = 0;
    while offset + 64 <= len {
        let va = _mm512_loadu_si512(a_ptr.add(offset).cast());
        let vb = _mm512_loadu_si512(b_ptr.add(offset).cast());
        acc = _mm512_add_epi64(acc, _mm512_popcnt_epi64(_mm512_xor_si512(va, vb)));
        offset += 64;
    }

    let differing = _mm512_reduce_add_epi64(acc) as u64;
    differing as f64 + serial::hamming_b8(&a[offset..], &b[offset..])
}

/// # Safety
///
/// CPU supports AVX-512F and VPOPCNTDQ; `a.len() == b.len()`.
#[target_feature(enable = "avx512f,avx512vpopcntdq")]
#[inline]
unsafe fn jaccard_b8_ice(a: &[u8], b: &[u8]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut inter = _mm512_setzero_si512();
    let mut union = _mm512_setzero_si512();
    let mut offset = 0;
    while offset + 64 <= len {
        let va = _mm512_loadu_si512(a_ptr.add(offset).cast());
        let vb = _mm512_loadu_si512(b_ptr.add(offset).cast());
        inter = _mm512_add_epi64(inter, _mm512_popcnt_epi64(_mm512_and_si512(va, vb)));
        union = _mm512_add_epi64(union, _mm512_popcnt_epi64(_mm512_or_si512(va, vb)));
        offset += 64;
    }

    let mut intersection = _mm512_reduce_add_epi64(inter) as u64;
    let mut total = _mm512_reduce_add_epi64(union) as u64;
    for (x, y) in a[offset..].iter().zip(&b[offset..]) {
        intersection += u64::from((x & y).count_ones());
        total += u64::from((x | y).count_ones());
    }
    serial::jaccard_distance(intersection, total)
}

guarded_kernel!(hamming_b8: u8 => hamming_b8_ice, fallback serial::hamming_b8, when available);
guarded_kernel!(jaccard_b8: u8 => jaccard_b8_ice, fallback serial::jaccard_b8, when available);

/// Ice Lake tier.
pub(crate) const ENTRIES: &[KernelEntry] = &[
    KernelEntry::new(MetricKind::Hamming, Tier::Ice, MetricKernel::B8(hamming_b8)),
    KernelEntry::new(MetricKind::Jaccard, Tier::Ice, MetricKernel::B8(jaccard_b8)),
];
