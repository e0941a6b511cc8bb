//! Parsing of command-line vectors into typed buffers.

use std::str::FromStr;

use anyhow::{anyhow, Context};
use half::f16;
use simdmetric_core::{DataType, VectorPair};

/// Owned pair of parsed vectors.
pub enum Vectors {
    F64(Vec<f64>, Vec<f64>),
    F32(Vec<f32>, Vec<f32>),
    F16(Vec<f16>, Vec<f16>),
    I8(Vec<i8>, Vec<i8>),
    B8(Vec<u8>, Vec<u8>),
    F64c(Vec<f64>, Vec<f64>),
    F32c(Vec<f32>, Vec<f32>),
    F16c(Vec<f16>, Vec<f16>),
    I8c(Vec<i8>, Vec<i8>),
}

impl Vectors {
    /// Parses both vectors as elements of `datatype`.
    pub fn parse(datatype: DataType, a: &[String], b: &[String]) -> anyhow::Result<Self> {
        Ok(match datatype {
            DataType::F64 => Self::F64(parse_all(a)?, parse_all(b)?),
            DataType::F32 => Self::F32(parse_all(a)?, parse_all(b)?),
            DataType::F16 => Self::F16(parse_half(a)?, parse_half(b)?),
            DataType::I8 => Self::I8(parse_all(a)?, parse_all(b)?),
            DataType::B8 => Self::B8(parse_bytes(a)?, parse_bytes(b)?),
            DataType::F64c => Self::F64c(parse_all(a)?, parse_all(b)?),
            DataType::F32c => Self::F32c(parse_all(a)?, parse_all(b)?),
            DataType::F16c => Self::F16c(parse_half(a)?, parse_half(b)?),
            DataType::I8c => Self::I8c(parse_all(a)?, parse_all(b)?),
        })
    }

    /// Borrows the buffers for the invocation layer.
    pub fn as_pair(&self) -> VectorPair<'_> {
        match self {
            Self::F64(a, b) => VectorPair::F64(a, b),
            Self::F32(a, b) => VectorPair::F32(a, b),
            Self::F16(a, b) => VectorPair::F16(a, b),
            Self::I8(a, b) => VectorPair::I8(a, b),
            Self::B8(a, b) => VectorPair::B8(a, b),
            Self::F64c(a, b) => VectorPair::F64c(a, b),
            Self::F32c(a, b) => VectorPair::F32c(a, b),
            Self::F16c(a, b) => VectorPair::F16c(a, b),
            Self::I8c(a, b) => VectorPair::I8c(a, b),
        }
    }
}

fn parse_all<T>(values: &[String]) -> anyhow::Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    values
        .iter()
        .map(|v| {
            v.trim()
                .parse::<T>()
                .with_context(|| format!("invalid element: {v:?}"))
        })
        .collect()
}

fn parse_half(values: &[String]) -> anyhow::Result<Vec<f16>> {
    Ok(parse_all::<f32>(values)?
        .into_iter()
        .map(f16::from_f32)
        .collect())
}

/// Bytes may be decimal or `0x`-prefixed hex.
fn parse_bytes(values: &[String]) -> anyhow::Result<Vec<u8>> {
    values
        .iter()
        .map(|v| {
            let v = v.trim();
            let parsed = match v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
                Some(hex) => u8::from_str_radix(hex, 16),
                None => v.parse::<u8>(),
            };
            parsed.map_err(|e| anyhow!("invalid byte {v:?}: {e}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_parse_bytes_accepts_hex_and_decimal() {
        let bytes = parse_bytes(&strings(&["0xFF", "15", "0x0f"])).unwrap();
        assert_eq!(bytes, vec![255, 15, 15]);
        assert!(parse_bytes(&strings(&["256"])).is_err());
    }

    #[test]
    fn test_parse_matches_datatype() {
        let a = strings(&["1", "-2"]);
        let parsed = Vectors::parse(DataType::I8c, &a, &a).unwrap();
        assert_eq!(parsed.as_pair().datatype(), DataType::I8c);
        assert_eq!(parsed.as_pair().lens(), (2, 2));
    }

    #[test]
    fn test_invalid_element_is_reported() {
        let err = Vectors::parse(DataType::F32, &strings(&["1.0", "x"]), &strings(&["1"]))
            .err()
            .unwrap();
        assert!(err.to_string().contains("\"x\""));
    }
}
