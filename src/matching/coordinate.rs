//! Fixed precision lat/lon values and the proximity predicate used for matching.
use std::{fmt, num::NonZeroUsize, str::FromStr};

use lru::LruCache;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{error::RouteMapError, utils::first_two_fields};

/// Number of decimal digits coordinates are quantized to.
///
/// 5 digits is about 1.1m at the equator, 7 digits about 11mm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Precision(u32);

impl Precision {
    pub const MAX_DIGITS: u32 = 20;

    pub fn new(digits: u32) -> Option<Self> {
        (digits <= Self::MAX_DIGITS).then_some(Precision(digits))
    }

    pub fn digits(self) -> u32 {
        self.0
    }

    /// The smallest step representable at this precision, `10^-digits`
    pub fn unit(self) -> Decimal {
        Decimal::new(1, self.0)
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision(5)
    }
}

/// A quantized (latitude, longitude) pair.
///
/// Both halves always carry exactly `precision.digits()` decimal places so equal
/// positions are equal map keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    lat: Decimal,
    lon: Decimal,
}

impl Coordinate {
    pub fn lat(&self) -> Decimal {
        self.lat
    }

    pub fn lon(&self) -> Decimal {
        self.lon
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Parses both halves of a coordinate and quantizes them with round-half-to-even
pub fn quantize(
    raw_lat: &str,
    raw_lon: &str,
    precision: Precision,
) -> Result<Coordinate, RouteMapError> {
    Ok(Coordinate {
        lat: quantize_decimal(raw_lat, precision)?,
        lon: quantize_decimal(raw_lon, precision)?,
    })
}

pub fn quantize_decimal(raw: &str, precision: Precision) -> Result<Decimal, RouteMapError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RouteMapError::malformed(raw, "empty value"));
    }

    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| RouteMapError::malformed(raw, e))?;

    let mut quantized =
        value.round_dp_with_strategy(precision.digits(), RoundingStrategy::MidpointNearestEven);
    quantized.rescale(precision.digits());
    if quantized.is_zero() {
        // "-0.00000" and "0.00000" are the same position
        quantized.set_sign_positive(true);
    }

    Ok(quantized)
}

/// Axis aligned box test: both per-axis differences are at most `epsilon`.
///
/// `epsilon` is in degrees, same units as the coordinates.
pub fn within_tolerance(a: Coordinate, b: Coordinate, epsilon: Decimal) -> bool {
    (a.lat - b.lat).abs() <= epsilon && (a.lon - b.lon).abs() <= epsilon
}

/// Memoizes [quantize_decimal] by raw string.
///
/// The same raw strings repeat a lot across stops and dense polylines.
/// One cache per worker, it is never shared.
pub struct QuantizeCache {
    precision: Precision,
    decimals: LruCache<String, Decimal>,
}

impl QuantizeCache {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new(precision: Precision, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        QuantizeCache {
            precision,
            decimals: LruCache::new(capacity),
        }
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn decimal(&mut self, raw: &str) -> Result<Decimal, RouteMapError> {
        if let Some(value) = self.decimals.get(raw) {
            return Ok(*value);
        }

        let value = quantize_decimal(raw, self.precision)?;
        self.decimals.put(raw.to_string(), value);

        Ok(value)
    }

    pub fn coordinate(
        &mut self,
        raw_lat: &str,
        raw_lon: &str,
    ) -> Result<Coordinate, RouteMapError> {
        Ok(Coordinate {
            lat: self.decimal(raw_lat)?,
            lon: self.decimal(raw_lon)?,
        })
    }

    pub fn parse_pair(&mut self, raw_pair: &str) -> Result<Coordinate, RouteMapError> {
        let (raw_lat, raw_lon) = first_two_fields(raw_pair)
            .ok_or_else(|| RouteMapError::malformed(raw_pair, "expected \"lat,lon\""))?;

        self.coordinate(raw_lat, raw_lon)
    }

    /// Parses a whole polyline, failing on the first malformed point
    pub fn polyline<S: AsRef<str>>(
        &mut self,
        raw_points: &[S],
    ) -> Result<Vec<Coordinate>, RouteMapError> {
        raw_points
            .iter()
            .map(|raw| self.parse_pair(raw.as_ref()))
            .collect()
    }
}
