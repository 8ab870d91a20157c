//! Lookup from quantized coordinate to stop id.
use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::warn;

use super::coordinate::{Coordinate, within_tolerance};
use crate::{
    error::RouteMapError,
    model::stop::{Stop, StopId, is_platform, parent_id},
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexSlot {
    coordinate: Coordinate,
    stop_id: StopId,
}

/// Read only once built. Workers matching different services share one behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct StopIndex {
    /// In the order coordinates were first seen so scans are reproducible
    slots: Vec<IndexSlot>,
    slot_by_coordinate: HashMap<Coordinate, usize>,
    /// Both platform ids and their parent ids, pointing at the id used in the slots
    matched_id_by_id: HashMap<StopId, StopId>,
    duplicates: Vec<RouteMapError>,
}

impl StopIndex {
    /// Indexes every stop at its exact position.
    ///
    /// Platform stops (ids longer than 4 characters) are indexed under their 4 character parent
    /// so every platform of a station matches as the station. The platform id and the parent id
    /// both resolve through [StopIndex::resolve].
    ///
    /// Two different stops on the same coordinate is a known data quality issue, it is logged
    /// and the later stop takes the slot.
    pub fn build<'a>(stops: impl IntoIterator<Item = &'a Stop>) -> Self {
        let mut index = StopIndex::default();

        for stop in stops {
            index.insert(&stop.id, stop.position);
        }

        index
    }

    fn insert(&mut self, id: &str, coordinate: Coordinate) {
        let matched_id = parent_id(id).to_string();

        self.matched_id_by_id
            .insert(id.to_string(), matched_id.clone());
        if is_platform(id) {
            self.matched_id_by_id
                .insert(matched_id.clone(), matched_id.clone());
        }

        match self.slot_by_coordinate.get(&coordinate) {
            Some(&slot) => {
                let existing = &mut self.slots[slot];
                if existing.stop_id != matched_id {
                    let duplicate = RouteMapError::DuplicateCoordinate {
                        coordinate,
                        kept: matched_id.clone(),
                        replaced: existing.stop_id.clone(),
                    };
                    warn!("{duplicate}");
                    self.duplicates.push(duplicate);

                    existing.stop_id = matched_id;
                }
            }
            None => {
                self.slot_by_coordinate
                    .insert(coordinate, self.slots.len());
                self.slots.push(IndexSlot {
                    coordinate,
                    stop_id: matched_id,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Coordinate collisions seen while building
    pub fn duplicates(&self) -> &[RouteMapError] {
        &self.duplicates
    }

    /// The id a stop or parent station is matched as
    pub fn resolve(&self, id: &str) -> Option<&StopId> {
        self.matched_id_by_id.get(id)
    }

    /// First stop in insertion order within `epsilon` of `coordinate`
    pub fn lookup_within(&self, coordinate: Coordinate, epsilon: Decimal) -> Option<&StopId> {
        first_within(self.slots.iter(), coordinate, epsilon)
    }

    /// The slots that could be within `margin` of any point inside the bounding box of
    /// `polyline`, still in insertion order.
    pub fn candidates_near(&self, polyline: &[Coordinate], margin: Decimal) -> Candidates<'_> {
        let Some(first) = polyline.first() else {
            return Candidates { slots: Vec::new() };
        };

        let (min, max) = polyline.iter().fold(
            ((first.lat(), first.lon()), (first.lat(), first.lon())),
            |((min_lat, min_lon), (max_lat, max_lon)), c| {
                (
                    (min_lat.min(c.lat()), min_lon.min(c.lon())),
                    (max_lat.max(c.lat()), max_lon.max(c.lon())),
                )
            },
        );

        let slots = self
            .slots
            .iter()
            .filter(|slot| {
                let c = slot.coordinate;
                c.lat() >= min.0 - margin
                    && c.lat() <= max.0 + margin
                    && c.lon() >= min.1 - margin
                    && c.lon() <= max.1 + margin
            })
            .collect();

        Candidates { slots }
    }
}

/// A subset of a [StopIndex], see [StopIndex::candidates_near]
pub struct Candidates<'a> {
    slots: Vec<&'a IndexSlot>,
}

impl<'a> Candidates<'a> {
    pub fn lookup_within(&self, coordinate: Coordinate, epsilon: Decimal) -> Option<&'a StopId> {
        first_within(self.slots.iter().copied(), coordinate, epsilon)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn first_within<'a>(
    mut slots: impl Iterator<Item = &'a IndexSlot>,
    coordinate: Coordinate,
    epsilon: Decimal,
) -> Option<&'a StopId> {
    slots
        .find(|slot| within_tolerance(slot.coordinate, coordinate, epsilon))
        .map(|slot| &slot.stop_id)
}
