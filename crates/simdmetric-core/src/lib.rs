//! # `simdmetric` Core
//!
//! Hardware-adaptive dispatch for vector similarity metrics.
//!
//! At runtime the crate probes which instruction-set generations the CPU
//! supports, then picks, for each (metric, datatype) pair, the kernel built for
//! the strongest usable generation. Every supported pair has a portable serial
//! kernel, so resolution always succeeds when the serial tier is allowed.
//!
//! ## Features
//!
//! - **8 metrics**: inner product, conjugate inner product, cosine, squared
//!   Euclidean, Hamming, Jaccard, Kullback-Leibler, Jensen-Shannon
//! - **9 datatypes**: `f64`, `f32`, `f16`, `i8`, bit-packed bytes and complex
//!   variants
//! - **Tiers**: serial, NEON, SVE, SVE2, Haswell, Skylake, Ice Lake, Sapphire
//!   Rapids
//! - **Safe by construction**: kernels are a tagged union, so buffers cannot be
//!   reinterpreted as the wrong element type through the safe API
//!
//! ## Quick Start
//!
//! ```rust
//! use simdmetric_core::{capabilities, resolve, Capability, DataType, MetricKind, VectorPair};
//!
//! fn main() -> Result<(), simdmetric_core::Error> {
//!     // Resolve once...
//!     let resolved = resolve(MetricKind::COS, DataType::F32, capabilities(), Capability::ANY);
//!     let kernel = resolved.into_kernel()?;
//!
//!     // ...then call per comparison.
//!     let distance = kernel.compute(VectorPair::F32(&[1.0, 0.0], &[0.0, 1.0]))?;
//!     assert!((distance.real() - 1.0).abs() < 1e-6);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
// Clippy lints configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(
    test,
    allow(
        clippy::doc_markdown,
        clippy::uninlined_format_args,
        clippy::cast_lossless,
        clippy::cast_precision_loss,
        clippy::float_cmp
    )
)]

pub mod capability;
pub mod catalog;
#[cfg(test)]
mod catalog_tests;
pub mod config;
#[cfg(test)]
mod config_tests;
pub mod datatype;
pub mod dispatch;
pub mod error;
pub mod kernel;
pub mod kernels;
pub mod metric;
pub mod probe;
#[cfg(test)]
mod probe_tests;
pub mod resolver;
pub mod similarity;

pub use capability::{Capability, Tier};
pub use catalog::{KernelCatalog, KernelEntry, CATALOG};
pub use config::DispatchConfig;
pub use datatype::DataType;
pub use dispatch::{configure, dispatch_table, warmup_dispatch, DispatchTable, Metric};
pub use error::{Error, Result};
pub use kernel::{
    ComplexKernel, ComplexScalar, Distance, MetricKernel, RealKernel, RealScalar, VectorPair,
};
pub use kernels::{cosine_distance, jaccard_distance, DIVERGENCE_EPSILON};
pub use metric::MetricKind;
pub use probe::{capabilities, detect_capabilities};
pub use resolver::{resolve, resolve_cached, ResolvedMetric};
pub use similarity::{BinarySimilarity, ComplexProducts, ProbabilitySimilarity, SpatialSimilarity};
