//! Responsible for turning one service's polylines into its route map
use std::{collections::BTreeMap, sync::Arc};

use itertools::Itertools;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn};

use crate::{
    config::MatchConfig,
    error::RouteMapError,
    matching::{assembler::assemble, route_matcher::match_polyline, stop_index::StopIndex},
    model::{api_model::ServiceMapPayload, route_map::ServiceRouteCollection},
};

/// The route map of one service and what had to be left out of it
#[derive(Debug, Clone)]
pub struct ServiceMatchReport {
    pub collection: ServiceRouteCollection,
    pub polylines: usize,
    /// One error per polyline that didn't make it into the collection
    pub dropped: Vec<RouteMapError>,
    /// Matched polylines per tolerance step
    pub steps_used: BTreeMap<u32, usize>,
}

impl ServiceMatchReport {
    pub fn service_code(&self) -> &str {
        self.collection.service_code()
    }
}

/// Matches every polyline of the service and assembles the matches into route map entries.
///
/// A polyline with a malformed coordinate or without at least 2 stops on it is dropped, the rest
/// of the service is still built.
pub fn build_service_route_map(
    payload: &ServiceMapPayload,
    index: &StopIndex,
    config: &MatchConfig,
) -> ServiceMatchReport {
    let service_code = &payload.service_code;
    let mut cache = config.new_cache();
    let mut dropped = Vec::new();

    let segments = payload
        .polylines
        .iter()
        .enumerate()
        .filter_map(|(i, raw_points)| {
            let polyline = match cache.polyline(raw_points) {
                Err(e) => {
                    warn!("Dropping polyline {i} of service {service_code}: {e}");
                    dropped.push(e);
                    return None;
                }
                Ok(polyline) => polyline,
            };

            let segment = match_polyline(&polyline, index, &config.ladder);
            if segment.is_none() {
                let e = RouteMapError::NoRouteFound {
                    service_code: service_code.clone(),
                    polyline: i,
                };
                warn!("{e}");
                dropped.push(e);
            }
            segment
        })
        .collect_vec();

    let steps_used = segments.iter().counts_by(|s| s.tolerance_step());
    let steps_used = steps_used.into_iter().collect::<BTreeMap<_, _>>();

    let collection = assemble(service_code, segments);

    info!(
        "Service {service_code}: {} routes from {} polylines, {} dropped, tolerance steps used {:?}",
        collection.entries().len(),
        payload.polylines.len(),
        dropped.len(),
        steps_used
    );

    ServiceMatchReport {
        collection,
        polylines: payload.polylines.len(),
        dropped,
        steps_used,
    }
}

/// Builds the route maps of all services in parallel, one blocking task per service.
///
/// Reports come back sorted by service code. A task that panics is logged and its service is
/// missing from the result.
pub async fn build_route_maps(
    payloads: Vec<ServiceMapPayload>,
    index: Arc<StopIndex>,
    config: MatchConfig,
) -> Vec<ServiceMatchReport> {
    let mut set = JoinSet::new();

    for payload in payloads {
        let index = index.clone();
        set.spawn_blocking(move || {
            let _span = info_span!("Building route map", service = %payload.service_code).entered();
            build_service_route_map(&payload, &index, &config)
        });
    }

    let mut reports = vec![];

    while let Some(res) = set.join_next().await {
        match res {
            Err(e) => error!("Route map task failed {e}"),
            Ok(report) => reports.push(report),
        }
    }

    reports.sort_by(|a, b| a.service_code().cmp(b.service_code()));
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stop::tests::stop;

    fn index() -> StopIndex {
        StopIndex::build(&[
            stop("A", "-41.00000", "174.00000"),
            stop("B", "-41.00100", "174.00000"),
            stop("C", "-41.00200", "174.00000"),
        ])
    }

    fn payload(code: &str, polylines: &[&[&str]]) -> ServiceMapPayload {
        ServiceMapPayload {
            service_code: code.to_string(),
            polylines: polylines
                .iter()
                .map(|points| points.iter().map(|p| p.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_build_service_route_map() {
        let payload = payload(
            "1",
            &[
                &["-41.0,174.0", "-41.0005,174.0", "-41.001,174.0,0"],
                &["-41.001,174.0", "-41.00202,174.0"],
                &["-41.0,174.0", "oops"],
                &["-41.0,174.0", "-41.0005,174.0"],
                &["-41.0,174.0", "-41.001,174.0"],
            ],
        );

        let report = build_service_route_map(&payload, &index(), &MatchConfig::default());

        assert_eq!(report.polylines, 5);
        assert_eq!(
            report
                .collection
                .entries()
                .iter()
                .map(|e| e.id())
                .collect_vec(),
            vec!["A-B", "B-C", "A-B-2"]
        );
        assert_eq!(report.steps_used, BTreeMap::from([(1, 2), (2, 1)]));
        assert_eq!(report.dropped.len(), 2);
        assert!(matches!(
            report.dropped[0],
            RouteMapError::MalformedCoordinate { .. }
        ));
        assert_eq!(
            report.dropped[1],
            RouteMapError::NoRouteFound {
                service_code: "1".to_string(),
                polyline: 3
            }
        );
    }

    #[tokio::test]
    async fn test_build_route_maps() {
        let payloads = vec![
            payload("2", &[&["-41.0,174.0", "-41.001,174.0"]]),
            payload("1", &[&["-41.002,174.0", "-41.001,174.0"]]),
            payload("3", &[]),
        ];

        let reports =
            build_route_maps(payloads, Arc::new(index()), MatchConfig::default()).await;

        assert_eq!(reports.iter().map(|r| r.service_code()).collect_vec(), vec!["1", "2", "3"]);
        assert_eq!(reports[0].collection.entries()[0].id(), "C-B");
        assert!(reports[2].collection.is_empty());
    }
}
