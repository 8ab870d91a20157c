use std::{collections::BTreeMap, ops::Bound};

use chrono::{DateTime, FixedOffset};
use tracing::{error, warn};

use super::{api_model::StopRecord, fare_zone::FareZone};
use crate::{
    error::RouteMapError,
    matching::coordinate::{Coordinate, QuantizeCache},
    utils::char_prefix,
};

pub type StopId = String;

/// Stations are identified by 4 characters, their platforms append a fifth.
pub const PARENT_ID_LEN: usize = 4;

/// The parent station of a platform, or the id itself when it isn't a platform
pub fn parent_id(id: &str) -> &str {
    char_prefix(id, PARENT_ID_LEN)
}

pub fn is_platform(id: &str) -> bool {
    id.chars().count() > PARENT_ID_LEN
}

/// A fixed boarding location. The position is authoritative, it is never inferred from routes.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub fare_zone: FareZone,
    pub position: Coordinate,
    pub last_modified: DateTime<FixedOffset>,
}

impl Stop {
    pub fn try_from_record(
        record: StopRecord,
        cache: &mut QuantizeCache,
    ) -> Result<Self, RouteMapError> {
        Ok(Stop {
            position: cache.coordinate(&record.lat, &record.lon)?,
            fare_zone: record.fare_zone.parse()?,
            id: record.id,
            name: record.name,
            last_modified: record.last_modified,
        })
    }
}

/// Every known stop, in the order the stop list gave them
#[derive(Debug, Clone, Default)]
pub struct StopCatalogue {
    stops: Vec<Stop>,
    position_by_id: BTreeMap<StopId, usize>,
}

impl StopCatalogue {
    /// A stop with an already seen id replaces the earlier one in its place
    pub fn new(stops: impl IntoIterator<Item = Stop>) -> Self {
        let mut catalogue = StopCatalogue::default();

        for stop in stops {
            match catalogue.position_by_id.get(&stop.id) {
                Some(&position) => {
                    warn!("stop {} listed more than once, keeping the last", stop.id);
                    catalogue.stops[position] = stop;
                }
                None => {
                    catalogue
                        .position_by_id
                        .insert(stop.id.clone(), catalogue.stops.len());
                    catalogue.stops.push(stop);
                }
            }
        }

        catalogue
    }

    /// Records that can't be turned into a [Stop] are logged and skipped
    pub fn from_records(records: Vec<StopRecord>, cache: &mut QuantizeCache) -> Self {
        let stops = records
            .into_iter()
            .filter_map(|record| {
                let id = record.id.clone();
                match Stop::try_from_record(record, cache) {
                    Err(e) => {
                        error!("Error turning StopRecord {id} to Stop {e}");
                        None
                    }
                    Ok(stop) => Some(stop),
                }
            })
            .collect::<Vec<_>>();

        Self::new(stops)
    }

    /// Looks up a stop by id. A parent station id without its own record resolves to its
    /// first platform.
    pub fn get(&self, id: &str) -> Option<&Stop> {
        let position = self.position_by_id.get(id).or_else(|| {
            self.position_by_id
                .range::<str, _>((Bound::Excluded(id), Bound::Unbounded))
                .take_while(|(other, _)| other.starts_with(id))
                .find(|(other, _)| is_platform(other) && parent_id(other) == id)
                .map(|(_, position)| position)
        })?;

        self.stops.get(*position)
    }

    /// Stops in stop list order
    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}
