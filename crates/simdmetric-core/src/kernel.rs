//! Uniform kernel shape.
//!
//! Every catalogued kernel is stored as a [`MetricKernel`]: a closed tagged
//! union with one variant per element type. The variant pins the slice type
//! the function pointer accepts, so a kernel resolved for `f32` can only be
//! called with `f32` buffers through the safe API.
//!
//! [`MetricKernel::call_raw`] keeps the untyped `(a, b, n, out)` calling shape
//! for callers that move pointers across module or language boundaries. There
//! the pairing between resolved datatype and buffer type is the caller's
//! contract.

use std::ffi::c_void;
use std::fmt;

use half::f16;

use crate::datatype::DataType;
use crate::error::{Error, Result};

/// Kernel producing one real scalar from two equal-length vectors.
pub type RealKernel<T> = fn(&[T], &[T]) -> f64;

/// Kernel producing one complex scalar `[re, im]` from two interleaved vectors.
pub type ComplexKernel<T> = fn(&[T], &[T]) -> [f64; 2];

/// Type-tagged kernel entry point.
#[derive(Clone, Copy)]
pub enum MetricKernel {
    /// Kernel over `f64` vectors.
    F64(RealKernel<f64>),
    /// Kernel over `f32` vectors.
    F32(RealKernel<f32>),
    /// Kernel over `f16` vectors.
    F16(RealKernel<f16>),
    /// Kernel over `i8` vectors.
    I8(RealKernel<i8>),
    /// Kernel over bit-packed bytes.
    B8(RealKernel<u8>),
    /// Kernel over interleaved complex `f64` vectors.
    F64c(ComplexKernel<f64>),
    /// Kernel over interleaved complex `f32` vectors.
    F32c(ComplexKernel<f32>),
    /// Kernel over interleaved complex `f16` vectors.
    F16c(ComplexKernel<f16>),
}

impl MetricKernel {
    /// Datatype this kernel reads.
    #[must_use]
    pub const fn datatype(&self) -> DataType {
        match self {
            Self::F64(_) => DataType::F64,
            Self::F32(_) => DataType::F32,
            Self::F16(_) => DataType::F16,
            Self::I8(_) => DataType::I8,
            Self::B8(_) => DataType::B8,
            Self::F64c(_) => DataType::F64c,
            Self::F32c(_) => DataType::F32c,
            Self::F16c(_) => DataType::F16c,
        }
    }

    /// Entry point address, for identity checks and diagnostics.
    #[must_use]
    pub fn addr(&self) -> usize {
        match *self {
            Self::F64(f) => f as usize,
            Self::F32(f) => f as usize,
            Self::F16(f) => f as usize,
            Self::I8(f) => f as usize,
            Self::B8(f) => f as usize,
            Self::F64c(f) => f as usize,
            Self::F32c(f) => f as usize,
            Self::F16c(f) => f as usize,
        }
    }

    /// Typed entry point for real-valued kernels over `T`.
    #[inline]
    #[must_use]
    pub fn real<T: RealScalar>(self) -> Option<RealKernel<T>> {
        T::real_kernel(self)
    }

    /// Typed entry point for complex kernels over interleaved `T`.
    #[inline]
    #[must_use]
    pub fn complex<T: ComplexScalar>(self) -> Option<ComplexKernel<T>> {
        T::complex_kernel(self)
    }

    /// Runs the kernel on a datatype-tagged pair of vectors.
    ///
    /// Returns an error instead of reinterpreting memory when the buffers do
    /// not match the kernel's datatype or each other.
    pub fn compute(&self, vectors: VectorPair<'_>) -> Result<Distance> {
        let (left, right) = vectors.lens();
        if left != right {
            return Err(Error::DimensionMismatch { left, right });
        }
        if vectors.datatype().is_complex() && left % 2 != 0 {
            return Err(Error::OddComplexLength(left));
        }

        match (*self, vectors) {
            (Self::F64(f), VectorPair::F64(a, b)) => Ok(Distance::Real(f(a, b))),
            (Self::F32(f), VectorPair::F32(a, b)) => Ok(Distance::Real(f(a, b))),
            (Self::F16(f), VectorPair::F16(a, b)) => Ok(Distance::Real(f(a, b))),
            (Self::I8(f), VectorPair::I8(a, b)) => Ok(Distance::Real(f(a, b))),
            (Self::B8(f), VectorPair::B8(a, b)) => Ok(Distance::Real(f(a, b))),
            (Self::F64c(f), VectorPair::F64c(a, b)) => Ok(Distance::from_pair(f(a, b))),
            (Self::F32c(f), VectorPair::F32c(a, b)) => Ok(Distance::from_pair(f(a, b))),
            (Self::F16c(f), VectorPair::F16c(a, b)) => Ok(Distance::from_pair(f(a, b))),
            (kernel, vectors) => Err(Error::DataTypeMismatch {
                expected: kernel.datatype(),
                actual: vectors.datatype(),
            }),
        }
    }

    /// Runs the kernel through the untyped calling shape.
    ///
    /// `n` counts scalar words: bytes for `b8`, and real scalars (twice the
    /// number of complex values) for complex types. Real kernels write one
    /// `f64` to `out`; complex kernels write `re` then `im`.
    ///
    /// # Safety
    ///
    /// - `a` and `b` must be non-null, aligned for the kernel's element type,
    ///   and valid for reads of `n` elements of that type.
    /// - The element type behind `a` and `b` must be exactly the type of
    ///   [`MetricKernel::datatype`]. Any other type is undefined behaviour.
    /// - `out` must be valid for writes of one `f64`, or two for complex kernels.
    pub unsafe fn call_raw(&self, a: *const c_void, b: *const c_void, n: usize, out: *mut f64) {
        // SAFETY: forwarded to the caller per the contract above.
        unsafe {
            match *self {
                Self::F64(f) => out.write(f(slice_of(a, n), slice_of(b, n))),
                Self::F32(f) => out.write(f(slice_of(a, n), slice_of(b, n))),
                Self::F16(f) => out.write(f(slice_of(a, n), slice_of(b, n))),
                Self::I8(f) => out.write(f(slice_of(a, n), slice_of(b, n))),
                Self::B8(f) => out.write(f(slice_of(a, n), slice_of(b, n))),
                Self::F64c(f) => write_pair(out, f(slice_of(a, n), slice_of(b, n))),
                Self::F32c(f) => write_pair(out, f(slice_of(a, n), slice_of(b, n))),
                Self::F16c(f) => write_pair(out, f(slice_of(a, n), slice_of(b, n))),
            }
        }
    }
}

/// # Safety
///
/// See [`MetricKernel::call_raw`].
#[inline]
unsafe fn slice_of<'a, T>(ptr: *const c_void, n: usize) -> &'a [T] {
    unsafe { std::slice::from_raw_parts(ptr.cast::<T>(), n) }
}

#[inline]
unsafe fn write_pair(out: *mut f64, [re, im]: [f64; 2]) {
    unsafe {
        out.write(re);
        out.add(1).write(im);
    }
}

impl fmt::Debug for MetricKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetricKernel::{}({:#x})", self.datatype(), self.addr())
    }
}

impl PartialEq for MetricKernel {
    fn eq(&self, other: &Self) -> bool {
        self.datatype() == other.datatype() && self.addr() == other.addr()
    }
}

impl Eq for MetricKernel {}

/// Borrowed pair of input vectors, tagged with their datatype.
#[derive(Debug, Clone, Copy)]
pub enum VectorPair<'a> {
    /// `f64` vectors.
    F64(&'a [f64], &'a [f64]),
    /// `f32` vectors.
    F32(&'a [f32], &'a [f32]),
    /// `f16` vectors.
    F16(&'a [f16], &'a [f16]),
    /// `i8` vectors.
    I8(&'a [i8], &'a [i8]),
    /// Bit-packed bytes.
    B8(&'a [u8], &'a [u8]),
    /// Interleaved complex `f64`.
    F64c(&'a [f64], &'a [f64]),
    /// Interleaved complex `f32`.
    F32c(&'a [f32], &'a [f32]),
    /// Interleaved complex `f16`.
    F16c(&'a [f16], &'a [f16]),
    /// Interleaved complex `i8`.
    I8c(&'a [i8], &'a [i8]),
}

impl VectorPair<'_> {
    /// Datatype of the buffers.
    #[must_use]
    pub const fn datatype(&self) -> DataType {
        match self {
            Self::F64(..) => DataType::F64,
            Self::F32(..) => DataType::F32,
            Self::F16(..) => DataType::F16,
            Self::I8(..) => DataType::I8,
            Self::B8(..) => DataType::B8,
            Self::F64c(..) => DataType::F64c,
            Self::F32c(..) => DataType::F32c,
            Self::F16c(..) => DataType::F16c,
            Self::I8c(..) => DataType::I8c,
        }
    }

    /// Scalar lengths of both buffers.
    #[must_use]
    pub const fn lens(&self) -> (usize, usize) {
        match self {
            Self::F64(a, b) | Self::F64c(a, b) => (a.len(), b.len()),
            Self::F32(a, b) | Self::F32c(a, b) => (a.len(), b.len()),
            Self::F16(a, b) | Self::F16c(a, b) => (a.len(), b.len()),
            Self::I8(a, b) | Self::I8c(a, b) => (a.len(), b.len()),
            Self::B8(a, b) => (a.len(), b.len()),
        }
    }
}

/// Kernel output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    /// Real-valued metric.
    Real(f64),
    /// Complex inner product.
    Complex {
        /// Real part.
        re: f64,
        /// Imaginary part.
        im: f64,
    },
}

impl Distance {
    fn from_pair([re, im]: [f64; 2]) -> Self {
        Self::Complex { re, im }
    }

    /// Real value, or the real part of a complex result.
    #[must_use]
    pub const fn real(self) -> f64 {
        match self {
            Self::Real(v) | Self::Complex { re: v, .. } => v,
        }
    }

    /// `(re, im)`; imaginary part is zero for real results.
    #[must_use]
    pub const fn as_complex(self) -> (f64, f64) {
        match self {
            Self::Real(v) => (v, 0.0),
            Self::Complex { re, im } => (re, im),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f64 {}
    impl Sealed for f32 {}
    impl Sealed for half::f16 {}
    impl Sealed for i8 {}
    impl Sealed for u8 {}
}

/// Element types with real-valued kernels.
///
/// `u8` stands for bit-packed [`DataType::B8`] bytes.
pub trait RealScalar: Copy + sealed::Sealed {
    /// Datatype kernels over this element are catalogued under.
    const DATATYPE: DataType;

    /// Extracts the entry point when `kernel` is of this element type.
    fn real_kernel(kernel: MetricKernel) -> Option<RealKernel<Self>>;
}

/// Element types with complex kernels over interleaved buffers.
pub trait ComplexScalar: Copy + sealed::Sealed {
    /// Complex datatype kernels over this element are catalogued under.
    const DATATYPE: DataType;

    /// Extracts the entry point when `kernel` is a complex kernel of this element type.
    fn complex_kernel(kernel: MetricKernel) -> Option<ComplexKernel<Self>>;
}

macro_rules! real_scalar {
    ($ty:ty, $variant:ident) => {
        impl RealScalar for $ty {
            const DATATYPE: DataType = DataType::$variant;

            #[inline]
            fn real_kernel(kernel: MetricKernel) -> Option<RealKernel<Self>> {
                match kernel {
                    MetricKernel::$variant(f) => Some(f),
                    _ => None,
                }
            }
        }
    };
}

macro_rules! complex_scalar {
    ($ty:ty, $variant:ident) => {
        impl ComplexScalar for $ty {
            const DATATYPE: DataType = DataType::$variant;

            #[inline]
            fn complex_kernel(kernel: MetricKernel) -> Option<ComplexKernel<Self>> {
                match kernel {
                    MetricKernel::$variant(f) => Some(f),
                    _ => None,
                }
            }
        }
    };
}

real_scalar!(f64, F64);
real_scalar!(f32, F32);
real_scalar!(f16, F16);
real_scalar!(i8, I8);
real_scalar!(u8, B8);

complex_scalar!(f64, F64c);
complex_scalar!(f32, F32c);
complex_scalar!(f16, F16c);
