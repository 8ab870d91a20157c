use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::model::{
    route_map::{MatchedSegment, RouteMapEntry, ServiceRouteCollection},
    stop::StopId,
};

/// Names the matched segments of one service.
///
/// The first segment from `X` to `Y` is `X-Y`, the next ones `X-Y-2`, `X-Y-3`... in the order
/// they are given. Paths and stops are passed through untouched.
pub fn assemble(service_code: &str, segments: Vec<MatchedSegment>) -> ServiceRouteCollection {
    let mut seen_per_pair: HashMap<(StopId, StopId), usize> = HashMap::new();
    let mut issued_ids: HashSet<String> = HashSet::new();
    let mut serviced_stops = BTreeSet::new();
    let mut entries = Vec::with_capacity(segments.len());

    for segment in segments {
        let (start, end) = (segment.start().clone(), segment.end().clone());
        let seen = seen_per_pair.entry((start.clone(), end.clone())).or_insert(0);

        let base_id = format!("{start}-{end}");
        let id = loop {
            *seen += 1;
            let id = if *seen == 1 {
                base_id.clone()
            } else {
                format!("{base_id}-{seen}")
            };

            // Stop ids containing '-' could otherwise collide with another pair's suffix
            if issued_ids.insert(id.clone()) {
                break id;
            }
            debug!("route id {id} already taken in service {service_code}");
        };

        serviced_stops.extend(segment.stops().iter().cloned());
        entries.push(RouteMapEntry::new(id, segment));
    }

    ServiceRouteCollection::new(service_code.to_string(), entries, serviced_stops)
}
