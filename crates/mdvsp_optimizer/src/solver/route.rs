use serde::Serialize;
use thiserror::Error;

use crate::{
    define_index_newtype,
    problem::{
        travel_time_matrix::{Cost, Time},
        trip::TripIdx,
        vehicle_scheduling_problem::{DepotIdx, VehicleSchedulingProblem},
    },
};

use super::{
    master::duals::Duals,
    network::connection_network::{ArcIdx, ConnectionNetwork},
};

define_index_newtype!(RouteIdx);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("a route must cover at least one trip")]
    Empty,
    #[error("a route covering {trips} trips needs {expected} arcs, got {actual}")]
    ArcCount {
        trips: usize,
        expected: usize,
        actual: usize,
    },
    #[error("arrival at trip {trip} at {arrival} is later than its latest departure {latest}")]
    LateArrival {
        trip: TripIdx,
        arrival: Time,
        latest: Time,
    },
    #[error("no connection from trip {from} to trip {to}")]
    MissingConnection { from: TripIdx, to: TripIdx },
}

/// The duty of one vehicle: leaves its depot, covers `trips` in order and
/// returns to the same depot.
///
/// The cost and the departure times are computed once, by replaying the
/// route with every trip departing as early as its time window allows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    depot: DepotIdx,
    trips: Vec<TripIdx>,
    arcs: Vec<ArcIdx>,
    departures: Vec<Time>,
    deadhead: Time,
    cost: Cost,
}

impl Route {
    /// `arcs` holds the pull-out, the connections and the pull-in of the route.
    pub fn new(
        problem: &VehicleSchedulingProblem,
        depot: DepotIdx,
        trips: Vec<TripIdx>,
        arcs: Vec<ArcIdx>,
    ) -> Result<Self, RouteError> {
        if trips.is_empty() {
            return Err(RouteError::Empty);
        }

        if arcs.len() != trips.len() + 1 {
            return Err(RouteError::ArcCount {
                trips: trips.len(),
                expected: trips.len() + 1,
                actual: arcs.len(),
            });
        }

        let depot_location = problem.depot_location(depot);
        let max_deviation = problem.max_deviation();

        let mut departures = Vec::with_capacity(trips.len());
        let mut deadhead = 0;
        let mut location = depot_location;
        let mut time: Time = 0;

        for &trip_id in trips.iter() {
            let trip = problem.trip(trip_id);
            let travel_time = problem.travel_time(location, trip.start_location());
            deadhead += travel_time;

            let arrival = time + travel_time;
            let latest = trip.start_time() + max_deviation;
            if arrival > latest {
                return Err(RouteError::LateArrival {
                    trip: trip_id,
                    arrival,
                    latest,
                });
            }

            let departure = arrival.max(trip.start_time() - max_deviation);
            departures.push(departure);

            time = departure + trip.duration();
            location = trip.end_location();
        }

        deadhead += problem.travel_time(location, depot_location);
        let cost = 2.0 * problem.fixed_cost() + problem.deadhead_cost(deadhead);

        Ok(Self {
            depot,
            trips,
            arcs,
            departures,
            deadhead,
            cost,
        })
    }

    /// Builds the route covering `trips` in `network`, looking up its arcs.
    pub fn from_trips(
        problem: &VehicleSchedulingProblem,
        network: &ConnectionNetwork,
        trips: Vec<TripIdx>,
    ) -> Result<Self, RouteError> {
        let (Some(&first), Some(&last)) = (trips.first(), trips.last()) else {
            return Err(RouteError::Empty);
        };

        let mut arcs = Vec::with_capacity(trips.len() + 1);
        arcs.push(network.pull_out(first));
        for pair in trips.windows(2) {
            let arc = network
                .connection(pair[0], pair[1])
                .ok_or(RouteError::MissingConnection {
                    from: pair[0],
                    to: pair[1],
                })?;
            arcs.push(arc);
        }
        arcs.push(network.pull_in(last));

        Self::new(problem, network.depot(), trips, arcs)
    }

    pub fn depot(&self) -> DepotIdx {
        self.depot
    }

    pub fn trips(&self) -> &[TripIdx] {
        &self.trips
    }

    pub fn arcs(&self) -> &[ArcIdx] {
        &self.arcs
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Departure time of every trip, aligned with `trips`.
    pub fn departures(&self) -> &[Time] {
        &self.departures
    }

    /// Minutes driven empty, pull-out and pull-in included.
    pub fn deadhead(&self) -> Time {
        self.deadhead
    }

    pub fn contains_trip(&self, trip: TripIdx) -> bool {
        self.trips.contains(&trip)
    }

    /// Sum of the absolute shifts between timetabled and actual departures.
    pub fn total_deviation(&self, problem: &VehicleSchedulingProblem) -> Time {
        self.trips
            .iter()
            .zip(self.departures.iter())
            .map(|(&trip, &departure)| (departure - problem.trip(trip).start_time()).abs())
            .sum()
    }

    pub fn reduced_cost(&self, duals: &Duals) -> f64 {
        self.cost - self.trips.iter().map(|&trip| duals.dual(trip)).sum::<f64>()
    }
}
