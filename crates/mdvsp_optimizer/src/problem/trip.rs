use std::cmp::Ordering;

use serde::Serialize;

use crate::define_index_newtype;

use super::{location::LocationIdx, travel_time_matrix::Time};

define_index_newtype!(TripIdx, Trip);

/// A timetabled trip that must be covered by exactly one vehicle.
///
/// Trips are totally ordered by `(start_time, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trip {
    id: usize,
    start_location: LocationIdx,
    start_time: Time,
    end_location: LocationIdx,
    end_time: Time,
}

impl Trip {
    pub fn new(
        id: usize,
        start_location: LocationIdx,
        start_time: Time,
        end_location: LocationIdx,
        end_time: Time,
    ) -> Self {
        Self {
            id,
            start_location,
            start_time,
            end_location,
            end_time,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn start_location(&self) -> LocationIdx {
        self.start_location
    }

    pub fn start_time(&self) -> Time {
        self.start_time
    }

    pub fn end_location(&self) -> LocationIdx {
        self.end_location
    }

    pub fn end_time(&self) -> Time {
        self.end_time
    }

    pub fn duration(&self) -> Time {
        self.end_time - self.start_time
    }
}

impl Ord for Trip {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start_time
            .cmp(&other.start_time)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Trip {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
