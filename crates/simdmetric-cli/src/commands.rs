//! Subcommand handlers.
//!
//! Each command prints a table by default or JSON with `--json`.

use anyhow::Context;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;
use simdmetric_core::{
    capabilities, resolve as resolve_metric, Capability, DataType, DispatchTable, Distance,
    Metric, MetricKind, ResolvedMetric, Tier, CATALOG,
};

use crate::vectors::Vectors;

#[derive(Serialize)]
struct TierRow {
    tier: Tier,
    detected: bool,
    allowed: bool,
    kernels: usize,
}

#[derive(Serialize)]
struct CapsReport {
    capabilities: String,
    bits: u32,
    allowed: String,
    tiers: Vec<TierRow>,
}

#[derive(Serialize)]
struct Resolution {
    metric: MetricKind,
    datatype: DataType,
    tier: Option<Tier>,
}

impl From<ResolvedMetric> for Resolution {
    fn from(resolved: ResolvedMetric) -> Self {
        Self {
            metric: resolved.kind(),
            datatype: resolved.datatype(),
            tier: resolved.tier(),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Value {
    Real(f64),
    Complex { re: f64, im: f64 },
}

#[derive(Serialize)]
struct Computation {
    metric: MetricKind,
    datatype: DataType,
    tier: Tier,
    value: Value,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn tier_cell(tier: Option<Tier>) -> String {
    match tier {
        Some(Tier::Serial) => Tier::Serial.name().to_string(),
        Some(tier) => tier.name().green().to_string(),
        None => "unsupported".dimmed().to_string(),
    }
}

fn flag(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".dimmed().to_string()
    }
}

/// `caps`: probed tiers, the configured mask and catalog coverage per tier.
pub fn caps(table: &DispatchTable, json: bool) -> anyhow::Result<()> {
    let supported = table.supported();
    let allowed = table.allowed();
    let rows: Vec<TierRow> = Tier::BY_PRIORITY
        .into_iter()
        .map(|tier| TierRow {
            tier,
            detected: supported.contains(tier),
            allowed: allowed.contains(tier),
            kernels: CATALOG.entries().filter(|e| e.tier == tier).count(),
        })
        .collect();

    if json {
        return print_json(&CapsReport {
            capabilities: supported.to_string(),
            bits: supported.bits(),
            allowed: allowed.to_string(),
            tiers: rows,
        });
    }

    println!("{} {}", "Capabilities:".bold(), supported.to_string().cyan());
    println!("{} {}", "Allowed:     ".bold(), allowed);
    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_header(vec!["Tier", "Detected", "Allowed", "Kernels"]);
    for row in &rows {
        out.add_row(vec![
            row.tier.name().to_string(),
            flag(row.detected),
            flag(row.allowed),
            row.kernels.to_string(),
        ]);
    }
    println!("{out}");
    Ok(())
}

/// `resolve`: one (metric, datatype) pair, optionally under forged masks.
pub fn resolve(
    table: &DispatchTable,
    metric: MetricKind,
    datatype: DataType,
    supported: Option<&[Tier]>,
    allowed: Option<&[Tier]>,
    json: bool,
) -> anyhow::Result<()> {
    let supported = supported.map_or_else(capabilities, |t| t.iter().copied().collect());
    let allowed = allowed.map_or(table.allowed(), |t| t.iter().copied().collect::<Capability>());
    tracing::debug!(%supported, %allowed, "resolving {metric}/{datatype}");

    let resolved = resolve_metric(metric, datatype, supported, allowed);
    // Unsupported pairs exit non-zero.
    resolved.into_kernel()?;

    if json {
        return print_json(&Resolution::from(resolved));
    }
    println!("{metric}/{datatype} -> {}", tier_cell(resolved.tier()));
    Ok(())
}

/// `table`: the full dispatch table.
pub fn table(table: &DispatchTable, all: bool, json: bool) -> anyhow::Result<()> {
    let rows: Vec<Resolution> = table
        .iter()
        .filter(|r| all || r.is_supported())
        .map(Resolution::from)
        .collect();

    if json {
        return print_json(&rows);
    }

    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_header(vec!["Metric", "Datatype", "Tier"]);
    for row in &rows {
        out.add_row(vec![
            row.metric.to_string(),
            row.datatype.to_string(),
            tier_cell(row.tier),
        ]);
    }
    println!("{out}");
    println!("{} combinations", rows.len());
    Ok(())
}

/// `compute`: runs the dispatched kernel on two vectors.
pub fn compute(
    metric: MetricKind,
    datatype: DataType,
    a: &[String],
    b: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let handle = Metric::new(metric, datatype)?;
    let vectors = Vectors::parse(datatype, a, b)?;
    let distance = handle
        .compute(vectors.as_pair())
        .with_context(|| format!("computing {metric} over {datatype}"))?;

    let value = match distance {
        Distance::Real(v) => Value::Real(v),
        Distance::Complex { re, im } => Value::Complex { re, im },
    };

    if json {
        return print_json(&Computation {
            metric,
            datatype,
            tier: handle.tier(),
            value,
        });
    }
    match value {
        Value::Real(v) => println!("{v}"),
        Value::Complex { re, im } => println!("{re} {im}"),
    }
    Ok(())
}
