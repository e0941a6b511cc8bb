//! Tests for `DispatchConfig` layering.
//!
//! Tests that read or write `SIMDMETRIC_*` variables run serially.

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use super::capability::{Capability, Tier};
use super::config::DispatchConfig;
use super::error::Error;

const VARS: [&str; 2] = ["SIMDMETRIC_ALLOWED", "SIMDMETRIC_DISABLED"];

/// Clears configuration variables on creation and on drop.
struct EnvGuard;

impl EnvGuard {
    fn new() -> Self {
        for var in VARS {
            std::env::remove_var(var);
        }
        Self
    }

    fn set(&self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for var in VARS {
            std::env::remove_var(var);
        }
    }
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("simdmetric.toml");
    fs::write(&path, contents).expect("write config");
    path
}

// ---------------------------------------------------------------------------
// Defaults and masks
// ---------------------------------------------------------------------------

#[test]
fn test_default_allows_everything() {
    let config = DispatchConfig::default();
    assert_eq!(config.allowed, Tier::ALL.to_vec());
    assert!(config.disabled.is_empty());
    assert_eq!(
        config.allowed_mask(),
        Tier::ALL.into_iter().collect::<Capability>()
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_allowed_mask_subtracts_disabled() {
    let config = DispatchConfig {
        allowed: vec![Tier::Serial, Tier::Haswell, Tier::Skylake],
        disabled: vec![Tier::Skylake, Tier::Neon],
    };
    assert_eq!(
        config.allowed_mask(),
        Capability::from_iter([Tier::Serial, Tier::Haswell])
    );
}

#[test]
fn test_validate_requires_serial() {
    let missing = DispatchConfig {
        allowed: vec![Tier::Haswell],
        disabled: Vec::new(),
    };
    assert!(matches!(missing.validate(), Err(Error::Config(_))));

    let disabled = DispatchConfig {
        allowed: Tier::ALL.to_vec(),
        disabled: vec![Tier::Serial],
    };
    assert!(matches!(disabled.validate(), Err(Error::Config(_))));
}

// ---------------------------------------------------------------------------
// Layered loading
// ---------------------------------------------------------------------------

#[test]
#[serial(env)]
fn test_load_without_sources_is_default() {
    let _env = EnvGuard::new();
    assert_eq!(DispatchConfig::load().unwrap(), DispatchConfig::default());
}

#[test]
#[serial(env)]
fn test_from_file_reads_lists() {
    let _env = EnvGuard::new();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
allowed = ["serial", "haswell", "skylake"]
disabled = ["skylake"]
"#,
    );

    let config = DispatchConfig::from_file(&path).unwrap();
    assert_eq!(config.allowed, vec![Tier::Serial, Tier::Haswell, Tier::Skylake]);
    assert_eq!(config.disabled, vec![Tier::Skylake]);
    assert_eq!(
        config.allowed_mask(),
        Capability::from_iter([Tier::Serial, Tier::Haswell])
    );
}

#[test]
#[serial(env)]
fn test_from_file_accepts_comma_separated_string() {
    let _env = EnvGuard::new();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"disabled = "Ice, sapphire""#);

    let config = DispatchConfig::from_file(&path).unwrap();
    assert_eq!(config.allowed, Tier::ALL.to_vec());
    assert_eq!(config.disabled, vec![Tier::Ice, Tier::Sapphire]);
}

#[test]
#[serial(env)]
fn test_env_overrides_file() {
    let env = EnvGuard::new();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"disabled = ["haswell"]"#);
    env.set("SIMDMETRIC_DISABLED", "skylake,ice");

    let config = DispatchConfig::from_file(&path).unwrap();
    assert_eq!(config.disabled, vec![Tier::Skylake, Tier::Ice]);
}

#[test]
#[serial(env)]
fn test_env_alone() {
    let env = EnvGuard::new();
    env.set("SIMDMETRIC_ALLOWED", "serial,neon");

    let config = DispatchConfig::load().unwrap();
    assert_eq!(config.allowed_mask(), Capability::from_iter([Tier::Serial, Tier::Neon]));
}

#[test]
#[serial(env)]
fn test_load_rejects_config_without_serial() {
    let env = EnvGuard::new();
    env.set("SIMDMETRIC_DISABLED", "serial");
    assert!(matches!(DispatchConfig::load(), Err(Error::Config(_))));
}

#[test]
#[serial(env)]
fn test_unknown_tier_is_config_error() {
    let _env = EnvGuard::new();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"allowed = ["serial", "avx9"]"#);

    let err = DispatchConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "{err:?}");
}

#[test]
#[serial(env)]
fn test_missing_file_is_config_error() {
    let _env = EnvGuard::new();
    let dir = TempDir::new().unwrap();
    let err = DispatchConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(ref msg) if msg.contains("absent.toml")));
}
