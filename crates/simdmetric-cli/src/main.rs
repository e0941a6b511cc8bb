#![allow(clippy::doc_markdown)]
//! `simdmetric` - inspect CPU capabilities and kernel dispatch.

mod commands;
mod vectors;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use simdmetric_core::{configure, DataType, DispatchConfig, MetricKind, Tier};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// simdmetric - hardware-adaptive similarity metrics
#[derive(Parser, Debug)]
#[command(name = "simdmetric")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dispatch configuration file (TOML)
    #[arg(short, long, global = true, env = "SIMDMETRIC_CONFIG")]
    config: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show detected capability tiers and the configured mask
    Caps,

    /// Resolve the kernel tier for one metric and datatype
    Resolve {
        /// Metric name or alias (cos, l2sq, dot, ...)
        metric: MetricKind,

        /// Datatype name (f32, f16, b8, f32c, ...)
        datatype: DataType,

        /// Tiers to treat as supported instead of the probed set
        #[arg(long, value_delimiter = ',')]
        supported: Option<Vec<Tier>>,

        /// Tiers the resolver may pick from instead of the configured mask
        #[arg(long, value_delimiter = ',')]
        allowed: Option<Vec<Tier>>,
    },

    /// Print the resolved tier of every metric and datatype
    Table {
        /// Include combinations with no kernel
        #[arg(long)]
        all: bool,
    },

    /// Compute a metric between two vectors
    Compute {
        /// Metric name or alias
        metric: MetricKind,

        /// Datatype name
        datatype: DataType,

        /// First vector, comma separated (complex values interleaved re,im)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        a: Vec<String>,

        /// Second vector, comma separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        b: Vec<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DispatchConfig> {
    let config = match path {
        Some(path) => DispatchConfig::from_file(path)?,
        None => DispatchConfig::load()?,
    };
    tracing::debug!(allowed = %config.allowed_mask(), "loaded dispatch configuration");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    let table = configure(&config)?;

    match cli.command {
        Commands::Caps => commands::caps(table, cli.json),
        Commands::Resolve {
            metric,
            datatype,
            supported,
            allowed,
        } => commands::resolve(
            table,
            metric,
            datatype,
            supported.as_deref(),
            allowed.as_deref(),
            cli.json,
        ),
        Commands::Table { all } => commands::table(table, all, cli.json),
        Commands::Compute {
            metric,
            datatype,
            a,
            b,
        } => commands::compute(metric, datatype, &a, &b, cli.json),
    }
}
