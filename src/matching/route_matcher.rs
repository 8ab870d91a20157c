//! Finds which stops a polyline passes through.
//!
//! Upstream polylines are sampled at very uneven densities. A fixed tight tolerance misses
//! stops on sparse paths and a loose one picks up neighbouring stops, so the search starts at
//! the tightest tolerance and widens one step at a time until a match is found.
use itertools::Itertools;
use rust_decimal::Decimal;

use super::{
    coordinate::{Coordinate, Precision},
    stop_index::{Candidates, StopIndex},
};
use crate::model::route_map::{MatchedSegment, PathPoint};

pub const DEFAULT_TOLERANCE_STEPS: u32 = 9;

/// Tolerances `unit * 1`, `unit * 2`, ... `unit * steps`, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToleranceLadder {
    unit: Decimal,
    steps: u32,
}

impl ToleranceLadder {
    pub fn new(unit: Decimal, steps: u32) -> Option<Self> {
        (unit > Decimal::ZERO && steps >= 1).then_some(ToleranceLadder { unit, steps })
    }

    /// One step per smallest representable unit of `precision`
    pub fn for_precision(precision: Precision) -> Self {
        ToleranceLadder {
            unit: precision.unit(),
            steps: DEFAULT_TOLERANCE_STEPS,
        }
    }

    pub fn unit(&self) -> Decimal {
        self.unit
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// `(step, epsilon)` pairs from tightest to loosest
    pub fn levels(&self) -> impl Iterator<Item = (u32, Decimal)> + use<> {
        let unit = self.unit;
        (1..=self.steps).map(move |step| (step, unit * Decimal::from(step)))
    }

    pub fn max_tolerance(&self) -> Decimal {
        self.unit * Decimal::from(self.steps)
    }
}

impl Default for ToleranceLadder {
    fn default() -> Self {
        Self::for_precision(Precision::default())
    }
}

/// Matches a polyline against the stop index.
///
/// Returns the segment from the first tolerance level that finds at least 2 distinct stops,
/// or `None` when no level up to the top of the ladder does.
pub fn match_polyline(
    polyline: &[Coordinate],
    index: &StopIndex,
    ladder: &ToleranceLadder,
) -> Option<MatchedSegment> {
    let candidates = index.candidates_near(polyline, ladder.max_tolerance());
    if candidates.is_empty() {
        return None;
    }

    ladder
        .levels()
        .find_map(|(step, epsilon)| match_at(polyline, &candidates, step, epsilon))
}

fn match_at(
    polyline: &[Coordinate],
    candidates: &Candidates<'_>,
    step: u32,
    epsilon: Decimal,
) -> Option<MatchedSegment> {
    let tags = polyline
        .iter()
        .map(|&point| candidates.lookup_within(point, epsilon))
        .collect_vec();

    let stops = tags
        .iter()
        .flatten()
        .dedup()
        .map(|&stop| stop.clone())
        .collect_vec();

    // A loop that only ever sees its terminus is not a route
    if stops.iter().unique().count() < 2 {
        return None;
    }

    let first = tags.iter().position(Option::is_some)?;
    let last = tags.iter().rposition(Option::is_some)?;

    let path = polyline[first..=last]
        .iter()
        .zip(&tags[first..=last])
        .map(|(&point, tag)| PathPoint::new(point, (*tag).cloned()))
        .collect_vec();

    Some(MatchedSegment::new(path, stops, step))
}
