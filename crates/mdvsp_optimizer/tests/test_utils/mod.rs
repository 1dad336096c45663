use std::sync::Arc;

use mdvsp_optimizer::problem::{
    location::{Location, LocationIdx},
    travel_time_matrix::{Time, TravelTimeMatrix},
    trip::Trip,
    vehicle_scheduling_problem::{VehicleSchedulingProblem, VehicleSchedulingProblemBuilder},
};

pub struct TestTrip {
    pub start_station: usize,
    pub start_time: Time,
    pub end_station: usize,
    pub end_time: Time,
}

pub fn trip(
    start_station: usize,
    start_time: Time,
    end_station: usize,
    end_time: Time,
) -> TestTrip {
    TestTrip {
        start_station,
        start_time,
        end_station,
        end_time,
    }
}

/// Depots first, then stations. `travel_time(from, to)` is called with
/// location indices.
pub fn create_test_problem(
    num_depots: usize,
    num_stations: usize,
    travel_time: impl Fn(usize, usize) -> Time,
    trips: Vec<TestTrip>,
    max_deviation: Time,
) -> Arc<VehicleSchedulingProblem> {
    let num_locations = num_depots + num_stations;
    let times = (0..num_locations)
        .map(|from| {
            (0..num_locations)
                .map(|to| if from == to { 0 } else { travel_time(from, to) })
                .collect()
        })
        .collect();

    let mut builder = VehicleSchedulingProblemBuilder::default();
    builder
        .set_locations(
            (0..num_locations)
                .map(|index| {
                    if index < num_depots {
                        Location::depot()
                    } else {
                        Location::station()
                    }
                })
                .collect(),
        )
        .set_travel_times(TravelTimeMatrix::new(times).unwrap())
        .set_trips(
            trips
                .into_iter()
                .enumerate()
                .map(|(id, trip)| {
                    Trip::new(
                        id,
                        LocationIdx::new(num_depots + trip.start_station),
                        trip.start_time,
                        LocationIdx::new(num_depots + trip.end_station),
                        trip.end_time,
                    )
                })
                .collect(),
        )
        .set_max_deviation(max_deviation);

    Arc::new(builder.build().unwrap())
}

pub fn create_chain_problem() -> Arc<VehicleSchedulingProblem> {
    create_test_problem(
        1,
        2,
        |_, _| 10,
        vec![trip(0, 100, 1, 150), trip(1, 170, 0, 220), trip(0, 240, 1, 290)],
        5,
    )
}

/// Every pair of trips fits one vehicle, all three do not.
pub fn create_triangle_problem(num_depots: usize) -> Arc<VehicleSchedulingProblem> {
    create_test_problem(
        num_depots,
        3,
        |_, _| 10,
        vec![trip(0, 100, 0, 200), trip(1, 200, 1, 285), trip(2, 294, 2, 394)],
        5,
    )
}
