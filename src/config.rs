use std::path::PathBuf;

use anyhow::{Context, ensure};
use clap::Parser;
use rust_decimal::Decimal;

use crate::matching::{
    coordinate::{Precision, QuantizeCache},
    route_matcher::{DEFAULT_TOLERANCE_STEPS, ToleranceLadder},
};

/// Builds per service route maps out of the agency's stop list and route polylines
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Folder whose api/ subfolder holds the agency export
    #[arg(long, env = "DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Folder the route maps are written to
    #[arg(long, env = "OUTPUT_DIR", default_value = "./data")]
    pub output_dir: PathBuf,

    #[arg(long, env = "LOG_DIR", default_value = "./logs")]
    pub log_dir: PathBuf,

    /// Decimal places coordinates are rounded to
    #[arg(long, env = "LAT_LON_PRECISION", default_value_t = 5)]
    pub precision: u32,

    /// How many multiples of the tolerance unit are tried before giving up on a polyline
    #[arg(long, env = "TOLERANCE_STEPS", default_value_t = DEFAULT_TOLERANCE_STEPS)]
    pub tolerance_steps: u32,

    /// Defaults to one unit of the coordinate precision
    #[arg(long, env = "TOLERANCE_UNIT")]
    pub tolerance_unit: Option<Decimal>,

    /// Raw coordinate strings remembered per worker
    #[arg(long, env = "QUANTIZE_CACHE_SIZE", default_value_t = QuantizeCache::DEFAULT_CAPACITY)]
    pub quantize_cache: usize,
}

/// Everything the matcher needs, checked once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    pub precision: Precision,
    pub ladder: ToleranceLadder,
    pub cache_size: usize,
}

impl MatchConfig {
    pub fn new_cache(&self) -> QuantizeCache {
        QuantizeCache::new(self.precision, self.cache_size)
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            precision: Precision::default(),
            ladder: ToleranceLadder::default(),
            cache_size: QuantizeCache::DEFAULT_CAPACITY,
        }
    }
}

impl TryFrom<&Args> for MatchConfig {
    type Error = anyhow::Error;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        let precision = Precision::new(args.precision).with_context(|| {
            format!(
                "precision {} is over the maximum of {}",
                args.precision,
                Precision::MAX_DIGITS
            )
        })?;

        ensure!(args.tolerance_steps >= 1, "at least one tolerance step is needed");

        let unit = args.tolerance_unit.unwrap_or(precision.unit());
        ensure!(unit > Decimal::ZERO, "tolerance unit must be positive, got {unit}");

        let ladder = ToleranceLadder::new(unit, args.tolerance_steps)
            .context("invalid tolerance ladder")?;

        Ok(MatchConfig {
            precision,
            ladder,
            cache_size: args.quantize_cache,
        })
    }
}
