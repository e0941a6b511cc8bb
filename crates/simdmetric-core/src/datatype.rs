//! Element representations of input vectors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Element type of the vectors a kernel reads.
///
/// Complex variants hold interleaved `(re, im)` pairs of their base type, so a
/// buffer of `n` scalars holds `n / 2` complex numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DataType {
    /// IEEE 754 double precision.
    F64 = 1,
    /// IEEE 754 single precision.
    F32 = 2,
    /// IEEE 754 half precision.
    F16 = 3,
    /// Signed 8-bit integer.
    I8 = 4,
    /// Eight single-bit values packed into one byte.
    B8 = 5,
    /// Complex double precision.
    F64c = 6,
    /// Complex single precision.
    F32c = 7,
    /// Complex half precision.
    F16c = 8,
    /// Complex signed 8-bit integer.
    I8c = 9,
}

impl DataType {
    /// Number of datatypes.
    pub const COUNT: usize = 9;

    /// Every datatype, in declaration order.
    pub const ALL: [DataType; Self::COUNT] = [
        DataType::F64,
        DataType::F32,
        DataType::F16,
        DataType::I8,
        DataType::B8,
        DataType::F64c,
        DataType::F32c,
        DataType::F16c,
        DataType::I8c,
    ];

    /// Stable numeric code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Dense index in `0..DataType::COUNT`, matching [`DataType::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Looks a datatype up by its code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::F64),
            2 => Some(Self::F32),
            3 => Some(Self::F16),
            4 => Some(Self::I8),
            5 => Some(Self::B8),
            6 => Some(Self::F64c),
            7 => Some(Self::F32c),
            8 => Some(Self::F16c),
            9 => Some(Self::I8c),
            _ => None,
        }
    }

    /// Whether elements are interleaved complex pairs.
    #[inline]
    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(
            self,
            DataType::F64c | DataType::F32c | DataType::F16c | DataType::I8c
        )
    }

    /// Real scalar type underlying a complex variant; identity otherwise.
    #[must_use]
    pub const fn real_part(self) -> Self {
        match self {
            DataType::F64c => DataType::F64,
            DataType::F32c => DataType::F32,
            DataType::F16c => DataType::F16,
            DataType::I8c => DataType::I8,
            other => other,
        }
    }

    /// Size in bytes of one scalar word.
    #[must_use]
    pub const fn scalar_bytes(self) -> usize {
        match self.real_part() {
            DataType::F64 => 8,
            DataType::F32 => 4,
            DataType::F16 => 2,
            _ => 1,
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DataType::F64 => "f64",
            DataType::F32 => "f32",
            DataType::F16 => "f16",
            DataType::I8 => "i8",
            DataType::B8 => "b8",
            DataType::F64c => "f64c",
            DataType::F32c => "f32c",
            DataType::F16c => "f16c",
            DataType::I8c => "i8c",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Self::from_code(code).ok_or_else(|| Error::UnknownDataType(format!("code {code}")))
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "f64" | "float64" | "double" => Ok(Self::F64),
            "f32" | "float32" | "float" => Ok(Self::F32),
            "f16" | "float16" | "half" => Ok(Self::F16),
            "i8" | "int8" => Ok(Self::I8),
            "b8" | "bin8" | "bits" => Ok(Self::B8),
            "f64c" | "complex128" => Ok(Self::F64c),
            "f32c" | "complex64" => Ok(Self::F32c),
            "f16c" | "complex32" => Ok(Self::F16c),
            "i8c" => Ok(Self::I8c),
            _ => Err(Error::UnknownDataType(s.to_string())),
        }
    }
}
