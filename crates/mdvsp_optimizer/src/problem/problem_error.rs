use thiserror::Error;

use super::{location::LocationIdx, travel_time_matrix::Time};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProblemError {
    #[error("expected a list of {0}")]
    Missing(&'static str),
    #[error("travel time matrix must be square: row {row} has {len} entries, expected {expected}")]
    NonSquareMatrix {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("travel time matrix covers {matrix} locations but {locations} locations were given")]
    MatrixSizeMismatch { matrix: usize, locations: usize },
    #[error("negative travel time from location {from} to location {to}")]
    NegativeTravelTime { from: usize, to: usize },
    #[error("the problem has no depot location")]
    NoDepots,
    #[error("trip {id} references unknown location {location}")]
    UnknownLocation { id: usize, location: LocationIdx },
    #[error("trip {id} ends before it starts")]
    InvalidTripTimes { id: usize },
    #[error("trip id {0} is used more than once")]
    DuplicateTripId(usize),
    #[error("maximal deviation must be non-negative, got {0}")]
    NegativeDeviation(Time),
}
