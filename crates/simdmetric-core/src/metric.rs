//! Metric kinds and their aliases.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Similarity or distance function family.
///
/// The discriminant is a stable ASCII code. Aliases are associated constants
/// equal to their canonical variant, so they are indistinguishable during
/// resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MetricKind {
    /// Inner (dot) product.
    #[serde(rename = "inner", alias = "dot", alias = "ip")]
    Inner = b'i',
    /// Complex inner product with the first argument conjugated.
    #[serde(rename = "vdot")]
    VDot = b'v',
    /// Cosine distance.
    #[serde(rename = "cosine", alias = "cos", alias = "angular")]
    Cosine = b'c',
    /// Squared Euclidean distance.
    #[serde(rename = "sqeuclidean", alias = "l2sq")]
    SqEuclidean = b'e',
    /// Hamming distance over packed bits.
    #[serde(rename = "hamming", alias = "manhattan")]
    Hamming = b'h',
    /// Jaccard distance over packed bits.
    #[serde(rename = "jaccard", alias = "tanimoto")]
    Jaccard = b'j',
    /// Kullback-Leibler divergence.
    #[serde(rename = "kullbackleibler", alias = "kl")]
    KullbackLeibler = b'k',
    /// Jensen-Shannon divergence.
    #[serde(rename = "jensenshannon", alias = "js")]
    JensenShannon = b's',
}

#[allow(missing_docs)]
impl MetricKind {
    pub const DOT: Self = Self::Inner;
    pub const INNER: Self = Self::Inner;
    pub const COS: Self = Self::Cosine;
    pub const COSINE: Self = Self::Cosine;
    pub const ANGULAR: Self = Self::Cosine;
    pub const L2SQ: Self = Self::SqEuclidean;
    pub const SQEUCLIDEAN: Self = Self::SqEuclidean;
    pub const MANHATTAN: Self = Self::Hamming;
    pub const TANIMOTO: Self = Self::Jaccard;
    pub const KL: Self = Self::KullbackLeibler;
    pub const KULLBACK_LEIBLER: Self = Self::KullbackLeibler;
    pub const JS: Self = Self::JensenShannon;
    pub const JENSEN_SHANNON: Self = Self::JensenShannon;
}

impl MetricKind {
    /// Number of distinct kinds.
    pub const COUNT: usize = 8;

    /// Every kind, in declaration order.
    pub const ALL: [MetricKind; Self::COUNT] = [
        MetricKind::Inner,
        MetricKind::VDot,
        MetricKind::Cosine,
        MetricKind::SqEuclidean,
        MetricKind::Hamming,
        MetricKind::Jaccard,
        MetricKind::KullbackLeibler,
        MetricKind::JensenShannon,
    ];

    /// Stable single-byte code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Dense index in `0..MetricKind::COUNT`, matching [`MetricKind::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            MetricKind::Inner => 0,
            MetricKind::VDot => 1,
            MetricKind::Cosine => 2,
            MetricKind::SqEuclidean => 3,
            MetricKind::Hamming => 4,
            MetricKind::Jaccard => 5,
            MetricKind::KullbackLeibler => 6,
            MetricKind::JensenShannon => 7,
        }
    }

    /// Looks a kind up by its code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            b'i' => Some(Self::Inner),
            b'v' => Some(Self::VDot),
            b'c' => Some(Self::Cosine),
            b'e' => Some(Self::SqEuclidean),
            b'h' => Some(Self::Hamming),
            b'j' => Some(Self::Jaccard),
            b'k' => Some(Self::KullbackLeibler),
            b's' => Some(Self::JensenShannon),
            _ => None,
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            MetricKind::Inner => "inner",
            MetricKind::VDot => "vdot",
            MetricKind::Cosine => "cosine",
            MetricKind::SqEuclidean => "sqeuclidean",
            MetricKind::Hamming => "hamming",
            MetricKind::Jaccard => "jaccard",
            MetricKind::KullbackLeibler => "kullbackleibler",
            MetricKind::JensenShannon => "jensenshannon",
        }
    }

    /// Whether the metric is defined over packed bit vectors.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        matches!(self, MetricKind::Hamming | MetricKind::Jaccard)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for MetricKind {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Self::from_code(code).ok_or_else(|| Error::UnknownMetric(format!("code {code:#04x}")))
    }
}

impl TryFrom<char> for MetricKind {
    type Error = Error;

    fn try_from(code: char) -> Result<Self> {
        u8::try_from(code)
            .ok()
            .and_then(Self::from_code)
            .ok_or_else(|| Error::UnknownMetric(code.to_string()))
    }
}

impl FromStr for MetricKind {
    type Err = Error;

    /// Parses any canonical name or alias, ignoring case, `-` and `_`.
    fn from_str(s: &str) -> Result<Self> {
        let name: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match name.as_str() {
            "inner" | "dot" | "ip" => Ok(Self::Inner),
            "vdot" => Ok(Self::VDot),
            "cosine" | "cos" | "angular" => Ok(Self::Cosine),
            "sqeuclidean" | "l2sq" => Ok(Self::SqEuclidean),
            "hamming" | "manhattan" => Ok(Self::Hamming),
            "jaccard" | "tanimoto" => Ok(Self::Jaccard),
            "kullbackleibler" | "kl" => Ok(Self::KullbackLeibler),
            "jensenshannon" | "js" => Ok(Self::JensenShannon),
            _ => Err(Error::UnknownMetric(s.to_string())),
        }
    }
}
