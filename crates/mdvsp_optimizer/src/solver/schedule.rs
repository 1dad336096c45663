use serde::Serialize;
use thiserror::Error;

use crate::problem::{
    travel_time_matrix::{Cost, Time},
    trip::TripIdx,
    vehicle_scheduling_problem::VehicleSchedulingProblem,
};

use super::route::Route;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("trip {0} is not covered by any vehicle")]
    UncoveredTrip(TripIdx),
    #[error("trip {0} is covered by more than one vehicle")]
    DuplicateTrip(TripIdx),
}

/// An integral solution: one route per vehicle.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleSchedule {
    routes: Vec<Route>,
    cost: Cost,
}

impl VehicleSchedule {
    pub fn new(routes: Vec<Route>) -> Self {
        let cost = routes.iter().map(Route::cost).sum();
        Self { routes, cost }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn num_vehicles(&self) -> usize {
        self.routes.len()
    }

    pub fn vehicles_per_depot(&self, num_depots: usize) -> Vec<usize> {
        let mut vehicles = vec![0; num_depots];
        for route in self.routes.iter() {
            vehicles[route.depot().get()] += 1;
        }
        vehicles
    }

    /// Minutes driven empty over all vehicles.
    pub fn deadhead_time(&self) -> Time {
        self.routes.iter().map(Route::deadhead).sum()
    }

    pub fn total_deviation(&self, problem: &VehicleSchedulingProblem) -> Time {
        self.routes
            .iter()
            .map(|route| route.total_deviation(problem))
            .sum()
    }

    /// Checks that every trip is covered by exactly one route.
    pub fn validate(&self, problem: &VehicleSchedulingProblem) -> Result<(), ScheduleError> {
        let mut covered = vec![false; problem.num_trips()];

        for &trip in self.routes.iter().flat_map(|route| route.trips()) {
            if covered[trip.get()] {
                return Err(ScheduleError::DuplicateTrip(trip));
            }
            covered[trip.get()] = true;
        }

        match covered.iter().position(|&is_covered| !is_covered) {
            Some(index) => Err(ScheduleError::UncoveredTrip(TripIdx::new(index))),
            None => Ok(()),
        }
    }
}
