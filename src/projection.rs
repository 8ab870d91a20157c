//! Turns matched route collections into the map layers and summaries that get exported.
use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use geojson::{Feature, FeatureCollection, GeoJson};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;
use tracing::warn;

use crate::model::{
    fare_zone::FareZone,
    route_map::{RouteMapEntry, ServiceRouteCollection},
    service::{Service, ServiceMode},
    stop::{Stop, StopCatalogue, StopId},
};

/// How a stop is listed in the global catalogue and in service summaries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogueStop {
    pub name: String,
    pub id: StopId,
    pub fare_zone: FareZone,
    #[serde(with = "rust_decimal::serde::float")]
    pub lat: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub lon: Decimal,
}

impl From<&Stop> for CatalogueStop {
    fn from(value: &Stop) -> Self {
        CatalogueStop {
            name: value.name.clone(),
            id: value.id.clone(),
            fare_zone: value.fare_zone,
            lat: value.position.lat(),
            lon: value.position.lon(),
        }
    }
}

/// The `service.json` document of one service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSummary {
    pub name: String,
    pub code: String,
    pub mode: ServiceMode,
    pub schools: Vec<String>,
    pub last_modified: DateTime<FixedOffset>,
    pub stops: Vec<CatalogueStop>,
    pub routes: Vec<RouteMapEntry>,
}

/// Everything exported for one service
#[derive(Debug, Clone)]
pub struct ServiceProjection {
    pub summary: ServiceSummary,
    /// Every route followed by every serviced stop, in id order
    pub service_layer: GeoJson,
    /// One layer per route id holding the route and the stops along it
    pub route_layers: Vec<(String, GeoJson)>,
}

fn degrees(value: Decimal) -> f64 {
    // Decimal always fits in an f64, only precision is lost
    value.to_f64().unwrap_or_default()
}

fn feature(geometry: geojson::Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geometry)),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

fn feature_collection(features: Vec<Feature>) -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

pub fn route_feature(service: &Service, entry: &RouteMapEntry) -> Feature {
    let line = entry
        .route()
        .iter()
        .map(|point| vec![degrees(point.lon), degrees(point.lat)])
        .collect();

    let mut feature = feature(geojson::Value::LineString(line));
    feature.set_property("stroke-opacity", 0.3);
    feature.set_property("name", service.name.clone());
    feature.set_property("code", service.code.clone());
    feature.set_property("mode", service.mode.to_string());
    feature.set_property("route_id", entry.id());
    feature
}

pub fn stop_feature(stop: &CatalogueStop) -> Feature {
    let mut feature = feature(geojson::Value::Point(vec![degrees(stop.lon), degrees(stop.lat)]));
    feature.set_property("name", stop.name.clone());
    feature.set_property("id", stop.id.clone());
    feature.set_property("fare_zone", stop.fare_zone.to_string());
    feature.set_property("marker-size", "small");
    feature
}

/// Looks up the given stop ids, logging the ones the catalogue doesn't know.
///
/// Stops keep the id they were asked for, so a station found through one of its platforms
/// is still listed under the station id the routes use.
fn known_stops<'i>(
    service_code: &str,
    ids: impl IntoIterator<Item = &'i StopId>,
    catalogue: &StopCatalogue,
) -> Vec<CatalogueStop> {
    ids.into_iter()
        .filter_map(|id| {
            let Some(stop) = catalogue.get(id) else {
                warn!(
                    "service {service_code} goes through stop {id} which is not in the stop list"
                );
                return None;
            };

            Some(CatalogueStop {
                id: id.clone(),
                ..CatalogueStop::from(stop)
            })
        })
        .collect()
}

pub fn project_service(
    service: &Service,
    collection: &ServiceRouteCollection,
    catalogue: &StopCatalogue,
) -> ServiceProjection {
    let serviced_stops = known_stops(&service.code, collection.serviced_stops(), catalogue);

    let mut route_features = Vec::with_capacity(collection.entries().len());
    let mut route_layers = Vec::with_capacity(collection.entries().len());
    for entry in collection.entries() {
        let route = route_feature(service, entry);

        let mut features = vec![route.clone()];
        features.extend(
            known_stops(&service.code, entry.stops(), catalogue)
                .iter()
                .map(stop_feature),
        );
        route_layers.push((entry.id().to_string(), feature_collection(features)));

        route_features.push(route);
    }

    let mut service_features = route_features;
    service_features.extend(serviced_stops.iter().map(stop_feature));

    let summary = ServiceSummary {
        name: service.name.clone(),
        code: service.code.clone(),
        mode: service.mode.clone(),
        schools: service.schools.clone(),
        last_modified: service.last_modified,
        stops: serviced_stops,
        routes: collection.entries().to_vec(),
    };

    ServiceProjection {
        summary,
        service_layer: feature_collection(service_features),
        route_layers,
    }
}

/// Every known stop keyed by id, the `stops.json` document
pub fn stop_catalogue(catalogue: &StopCatalogue) -> BTreeMap<StopId, CatalogueStop> {
    catalogue
        .stops()
        .map(|stop| (stop.id.clone(), CatalogueStop::from(stop)))
        .collect()
}
