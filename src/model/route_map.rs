use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::stop::StopId;
use crate::matching::coordinate::Coordinate;

/// One point of a route path, tagged with the stop it coincides with if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPoint {
    #[serde(with = "rust_decimal::serde::float")]
    pub lat: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub lon: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopId>,
}

impl PathPoint {
    pub fn new(coordinate: Coordinate, stop: Option<StopId>) -> Self {
        PathPoint {
            lat: coordinate.lat(),
            lon: coordinate.lon(),
            stop,
        }
    }
}

/// A polyline cut down to the part between its first and last matched stop.
///
/// Always holds at least 2 distinct stops, and the first and last path points are stop tagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedSegment {
    path: Vec<PathPoint>,
    stops: Vec<StopId>,
    tolerance_step: u32,
}

impl MatchedSegment {
    pub(crate) fn new(path: Vec<PathPoint>, stops: Vec<StopId>, tolerance_step: u32) -> Self {
        debug_assert!(stops.len() >= 2);
        debug_assert!(path.first().is_some_and(|p| p.stop.is_some()));
        debug_assert!(path.last().is_some_and(|p| p.stop.is_some()));

        MatchedSegment {
            path,
            stops,
            tolerance_step,
        }
    }

    pub fn path(&self) -> &[PathPoint] {
        &self.path
    }

    /// Stops in traversal order, consecutive repeats collapsed
    pub fn stops(&self) -> &[StopId] {
        &self.stops
    }

    /// Which rung of the tolerance ladder produced the match, starting at 1
    pub fn tolerance_step(&self) -> u32 {
        self.tolerance_step
    }

    pub fn start(&self) -> &StopId {
        &self.stops[0]
    }

    pub fn end(&self) -> &StopId {
        &self.stops[self.stops.len() - 1]
    }

    pub(crate) fn into_parts(self) -> (Vec<PathPoint>, Vec<StopId>) {
        (self.path, self.stops)
    }
}

/// A named, stop bounded route segment of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMapEntry {
    id: String,
    start_id: StopId,
    end_id: StopId,
    stops: Vec<StopId>,
    route: Vec<PathPoint>,
}

impl RouteMapEntry {
    pub(crate) fn new(id: String, segment: MatchedSegment) -> Self {
        let start_id = segment.start().clone();
        let end_id = segment.end().clone();
        let (route, stops) = segment.into_parts();

        RouteMapEntry {
            id,
            start_id,
            end_id,
            stops,
            route,
        }
    }

    /// `{start}-{end}`, or `{start}-{end}-{n}` for the nth segment sharing the same ends
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start_id(&self) -> &StopId {
        &self.start_id
    }

    pub fn end_id(&self) -> &StopId {
        &self.end_id
    }

    pub fn stops(&self) -> &[StopId] {
        &self.stops
    }

    pub fn route(&self) -> &[PathPoint] {
        &self.route
    }
}

/// All route map entries of one service, in the order their segments were matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRouteCollection {
    service_code: String,
    entries: Vec<RouteMapEntry>,
    serviced_stops: BTreeSet<StopId>,
}

impl ServiceRouteCollection {
    pub(crate) fn new(
        service_code: String,
        entries: Vec<RouteMapEntry>,
        serviced_stops: BTreeSet<StopId>,
    ) -> Self {
        ServiceRouteCollection {
            service_code,
            entries,
            serviced_stops,
        }
    }

    pub fn service_code(&self) -> &str {
        &self.service_code
    }

    pub fn entries(&self) -> &[RouteMapEntry] {
        &self.entries
    }

    /// Union of every entry's stops
    pub fn serviced_stops(&self) -> &BTreeSet<StopId> {
        &self.serviced_stops
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::coordinate::{Precision, quantize};

    #[test]
    fn test_path_point_json() {
        let coordinate = quantize("-41.27871", "174.77601", Precision::default()).unwrap();

        let bare = serde_json::to_value(PathPoint::new(coordinate, None)).unwrap();
        assert_eq!(bare, serde_json::json!({"lat": -41.27871, "lon": 174.77601}));

        let tagged =
            serde_json::to_value(PathPoint::new(coordinate, Some("5000".to_string()))).unwrap();
        assert_eq!(
            tagged,
            serde_json::json!({"lat": -41.27871, "lon": 174.77601, "stop": "5000"})
        );
    }
}
