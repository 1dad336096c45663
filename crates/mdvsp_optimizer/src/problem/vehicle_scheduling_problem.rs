use fxhash::FxHashSet;

use crate::define_index_newtype;

use super::{
    location::{Location, LocationIdx},
    problem_error::ProblemError,
    travel_time_matrix::{Cost, Time, TravelTimeMatrix},
    trip::{Trip, TripIdx},
};

define_index_newtype!(DepotIdx, LocationIdx);

pub const DEFAULT_FIXED_COST: Cost = 500.0;
pub const DEFAULT_VARIABLE_COST: Cost = 1.0;

/// Multi-depot vehicle scheduling instance with time shifting.
///
/// Every trip may depart up to `max_deviation` minutes earlier or later than
/// timetabled. Depots are numbered in the order their locations appear.
pub struct VehicleSchedulingProblem {
    locations: Vec<Location>,
    depots: Vec<LocationIdx>,
    trips: Vec<Trip>,
    travel_times: TravelTimeMatrix,
    max_deviation: Time,
    fixed_cost: Cost,
    variable_cost: Cost,
}

impl VehicleSchedulingProblem {
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn location(&self, location_id: LocationIdx) -> &Location {
        &self.locations[location_id]
    }

    pub fn num_locations(&self) -> usize {
        self.locations.len()
    }

    pub fn depots(&self) -> impl Iterator<Item = DepotIdx> {
        (0..self.depots.len()).map(DepotIdx::new)
    }

    pub fn num_depots(&self) -> usize {
        self.depots.len()
    }

    pub fn depot_location(&self, depot: DepotIdx) -> LocationIdx {
        self.depots[depot]
    }

    pub fn stations(&self) -> impl Iterator<Item = LocationIdx> {
        self.locations
            .iter()
            .enumerate()
            .filter(|(_, location)| !location.is_depot())
            .map(|(index, _)| LocationIdx::new(index))
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn trip(&self, trip_id: TripIdx) -> &Trip {
        &self.trips[trip_id]
    }

    pub fn num_trips(&self) -> usize {
        self.trips.len()
    }

    #[inline(always)]
    pub fn travel_time(&self, from: LocationIdx, to: LocationIdx) -> Time {
        self.travel_times.travel_time(from, to)
    }

    pub fn is_symmetric(&self) -> bool {
        self.travel_times.is_symmetric()
    }

    /// Cost of driving empty for `travel_time` minutes.
    #[inline(always)]
    pub fn deadhead_cost(&self, travel_time: Time) -> Cost {
        self.variable_cost * travel_time as Cost
    }

    pub fn max_deviation(&self) -> Time {
        self.max_deviation
    }

    /// Cost paid once on pull-out and once on pull-in of every vehicle.
    pub fn fixed_cost(&self) -> Cost {
        self.fixed_cost
    }

    pub fn variable_cost(&self) -> Cost {
        self.variable_cost
    }

    /// Earliest timetabled start and latest timetabled end over all trips.
    pub fn horizon(&self) -> Option<(Time, Time)> {
        let start = self.trips.iter().map(Trip::start_time).min()?;
        let end = self.trips.iter().map(Trip::end_time).max()?;
        Some((start, end))
    }
}

#[derive(Default)]
pub struct VehicleSchedulingProblemBuilder {
    locations: Option<Vec<Location>>,
    travel_times: Option<TravelTimeMatrix>,
    trips: Option<Vec<Trip>>,
    max_deviation: Option<Time>,
    fixed_cost: Option<Cost>,
    variable_cost: Option<Cost>,
}

impl VehicleSchedulingProblemBuilder {
    pub fn set_locations(
        &mut self,
        locations: Vec<Location>,
    ) -> &mut VehicleSchedulingProblemBuilder {
        self.locations = Some(locations);
        self
    }

    pub fn add_location(&mut self, location: Location) -> &mut VehicleSchedulingProblemBuilder {
        if let Some(locations) = &mut self.locations {
            locations.push(location);
        } else {
            self.locations = Some(vec![location]);
        }

        self
    }

    pub fn set_travel_times(
        &mut self,
        travel_times: TravelTimeMatrix,
    ) -> &mut VehicleSchedulingProblemBuilder {
        self.travel_times = Some(travel_times);
        self
    }

    pub fn set_trips(&mut self, trips: Vec<Trip>) -> &mut VehicleSchedulingProblemBuilder {
        self.trips = Some(trips);
        self
    }

    pub fn add_trip(&mut self, trip: Trip) -> &mut VehicleSchedulingProblemBuilder {
        if let Some(trips) = &mut self.trips {
            trips.push(trip);
        } else {
            self.trips = Some(vec![trip]);
        }

        self
    }

    pub fn set_max_deviation(
        &mut self,
        max_deviation: Time,
    ) -> &mut VehicleSchedulingProblemBuilder {
        self.max_deviation = Some(max_deviation);
        self
    }

    pub fn set_fixed_cost(&mut self, fixed_cost: Cost) -> &mut VehicleSchedulingProblemBuilder {
        self.fixed_cost = Some(fixed_cost);
        self
    }

    pub fn set_variable_cost(
        &mut self,
        variable_cost: Cost,
    ) -> &mut VehicleSchedulingProblemBuilder {
        self.variable_cost = Some(variable_cost);
        self
    }

    pub fn build(self) -> Result<VehicleSchedulingProblem, ProblemError> {
        let locations = self.locations.ok_or(ProblemError::Missing("locations"))?;
        let travel_times = self
            .travel_times
            .ok_or(ProblemError::Missing("travel times"))?;
        let trips = self.trips.unwrap_or_default();
        let max_deviation = self.max_deviation.unwrap_or(0);

        if travel_times.num_locations() != locations.len() {
            return Err(ProblemError::MatrixSizeMismatch {
                matrix: travel_times.num_locations(),
                locations: locations.len(),
            });
        }

        if max_deviation < 0 {
            return Err(ProblemError::NegativeDeviation(max_deviation));
        }

        let depots: Vec<LocationIdx> = locations
            .iter()
            .enumerate()
            .filter(|(_, location)| location.is_depot())
            .map(|(index, _)| LocationIdx::new(index))
            .collect();

        if depots.is_empty() {
            return Err(ProblemError::NoDepots);
        }

        let mut ids = FxHashSet::default();
        for trip in trips.iter() {
            for location in [trip.start_location(), trip.end_location()] {
                if location.get() >= locations.len() {
                    return Err(ProblemError::UnknownLocation {
                        id: trip.id(),
                        location,
                    });
                }
            }

            if trip.end_time() < trip.start_time() {
                return Err(ProblemError::InvalidTripTimes { id: trip.id() });
            }

            if !ids.insert(trip.id()) {
                return Err(ProblemError::DuplicateTripId(trip.id()));
            }
        }

        Ok(VehicleSchedulingProblem {
            locations,
            depots,
            trips,
            travel_times,
            max_deviation,
            fixed_cost: self.fixed_cost.unwrap_or(DEFAULT_FIXED_COST),
            variable_cost: self.variable_cost.unwrap_or(DEFAULT_VARIABLE_COST),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> VehicleSchedulingProblemBuilder {
        let mut builder = VehicleSchedulingProblemBuilder::default();
        builder
            .set_locations(vec![Location::station(), Location::depot(), Location::station()])
            .set_travel_times(
                TravelTimeMatrix::new(vec![vec![0, 4, 6], vec![4, 0, 3], vec![6, 3, 0]]).unwrap(),
            )
            .set_max_deviation(5);
        builder
    }

    #[test]
    fn test_build_problem() {
        let mut builder = builder();
        builder
            .add_trip(Trip::new(
                10,
                LocationIdx::new(0),
                300,
                LocationIdx::new(2),
                360,
            ))
            .add_trip(Trip::new(
                11,
                LocationIdx::new(2),
                100,
                LocationIdx::new(0),
                130,
            ));

        let problem = builder.build().unwrap();

        assert_eq!(problem.num_depots(), 1);
        assert_eq!(problem.depot_location(DepotIdx::new(0)), LocationIdx::new(1));
        assert_eq!(
            problem.stations().collect::<Vec<_>>(),
            vec![LocationIdx::new(0), LocationIdx::new(2)]
        );
        assert_eq!(problem.horizon(), Some((100, 360)));
        assert_eq!(problem.fixed_cost(), DEFAULT_FIXED_COST);
        assert_eq!(problem.deadhead_cost(12), 12.0);
    }

    #[test]
    fn test_build_requires_a_depot() {
        let mut builder = VehicleSchedulingProblemBuilder::default();
        builder
            .set_locations(vec![Location::station()])
            .set_travel_times(TravelTimeMatrix::new(vec![vec![0]]).unwrap());

        assert_eq!(builder.build().err(), Some(ProblemError::NoDepots));
    }

    #[test]
    fn test_build_rejects_duplicate_trip_ids() {
        let mut builder = builder();
        let trip = Trip::new(3, LocationIdx::new(0), 10, LocationIdx::new(2), 20);
        builder.add_trip(trip.clone()).add_trip(trip);

        assert_eq!(builder.build().err(), Some(ProblemError::DuplicateTripId(3)));
    }

    #[test]
    fn test_build_rejects_unknown_location() {
        let mut builder = builder();
        builder.add_trip(Trip::new(
            3,
            LocationIdx::new(0),
            10,
            LocationIdx::new(9),
            20,
        ));

        assert_eq!(
            builder.build().err(),
            Some(ProblemError::UnknownLocation {
                id: 3,
                location: LocationIdx::new(9)
            })
        );
    }
}
