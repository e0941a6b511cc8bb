//! Installing a dispatch configuration before first use.
//!
//! The table is process-wide, so this binary holds a single test.

use simdmetric_core::{
    configure, dispatch_table, Capability, DataType, DispatchConfig, Error, Metric, MetricKind,
    Tier,
};

#[test]
fn test_configure_installs_serial_only_table() {
    let config = DispatchConfig {
        allowed: vec![Tier::Serial],
        disabled: Vec::new(),
    };

    let table = configure(&config).expect("first configure succeeds");
    assert_eq!(table.allowed(), Capability::SERIAL);
    assert!(std::ptr::eq(table, dispatch_table()));
    assert!(table
        .supported_pairs()
        .all(|resolved| resolved.tier() == Some(Tier::Serial)));

    let metric = Metric::new(MetricKind::Cosine, DataType::F32).unwrap();
    assert_eq!(metric.tier(), Tier::Serial);

    assert_eq!(
        configure(&DispatchConfig::default()).unwrap_err(),
        Error::AlreadyConfigured
    );
}
