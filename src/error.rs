use crate::{matching::coordinate::Coordinate, model::stop::StopId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteMapError {
    /// The raw lat/lon text could not be read as a decimal pair.
    /// Aborts matching of the polyline it belongs to.
    #[error("malformed coordinate {raw:?}: {reason}")]
    MalformedCoordinate { raw: String, reason: String },

    /// No tolerance level found at least 2 distinct stops on the polyline
    #[error("no route found for polyline {polyline} of service {service_code}")]
    NoRouteFound { service_code: String, polyline: usize },

    /// Two distinct stops landed on the same indexed coordinate.
    /// Only ever logged, the later stop keeps the slot.
    #[error("stops {replaced} and {kept} share coordinate {coordinate}, keeping {kept}")]
    DuplicateCoordinate {
        coordinate: Coordinate,
        kept: StopId,
        replaced: StopId,
    },

    #[error("invalid fare zone {raw:?}")]
    InvalidFareZone { raw: String },
}

impl RouteMapError {
    pub fn malformed(raw: &str, reason: impl ToString) -> Self {
        RouteMapError::MalformedCoordinate {
            raw: raw.to_string(),
            reason: reason.to_string(),
        }
    }
}
