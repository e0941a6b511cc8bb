//! Error types for simdmetric-core.
//!
//! Resolution itself never fails: an unsupported (metric, datatype) pair is an
//! empty [`ResolvedMetric`](crate::ResolvedMetric). These variants surface when
//! callers opt into `Result`-based APIs or feed the typed invocation layer
//! buffers that do not match the kernel.

use thiserror::Error;

use crate::{DataType, MetricKind};

/// simdmetric error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No tier, including serial, implements this metric for this datatype.
    #[error("No kernel implements {kind} for {datatype}")]
    UnsupportedCombination {
        /// Requested metric.
        kind: MetricKind,
        /// Requested element type.
        datatype: DataType,
    },

    /// Buffers handed to a kernel do not match the datatype it was resolved for.
    #[error("Kernel expects {expected} vectors, got {actual}")]
    DataTypeMismatch {
        /// Datatype the kernel was catalogued under.
        expected: DataType,
        /// Datatype of the supplied buffers.
        actual: DataType,
    },

    /// The two input vectors have different lengths.
    #[error("Vector length mismatch: {left} vs {right}")]
    DimensionMismatch {
        /// Length of the first vector.
        left: usize,
        /// Length of the second vector.
        right: usize,
    },

    /// Interleaved complex buffers must hold whole (re, im) pairs.
    #[error("Complex vectors need an even number of scalars, got {0}")]
    OddComplexLength(usize),

    /// Unknown metric name or code.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Unknown datatype name or code.
    #[error("Unknown data type: {0}")]
    UnknownDataType(String),

    /// Unknown capability tier name.
    #[error("Unknown capability tier: {0}")]
    UnknownTier(String),

    /// Invalid or unreadable dispatch configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The process-wide dispatch table was already built.
    #[error("Dispatch table already initialized; configure() must run before first use")]
    AlreadyConfigured,
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for simdmetric operations.
pub type Result<T> = std::result::Result<T, Error>;
