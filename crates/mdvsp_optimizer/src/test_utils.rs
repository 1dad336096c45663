use crate::{
    problem::{
        location::{Location, LocationIdx},
        travel_time_matrix::{Time, TravelTimeMatrix},
        trip::Trip,
        vehicle_scheduling_problem::{VehicleSchedulingProblem, VehicleSchedulingProblemBuilder},
    },
    solver::{
        master::lp_solver::{ColumnId, LpError, LpSolver, LpStatus},
        network::connection_network::ConnectionNetwork,
        solver_params::NetworkParams,
    },
};

/// Depots come first, station `s` is location `num_depots + s`. Every pair
/// of distinct locations is `travel_time` apart.
pub fn create_problem(
    num_depots: usize,
    num_stations: usize,
    travel_time: Time,
    trips: &[(usize, Time, usize, Time)],
    max_deviation: Time,
) -> VehicleSchedulingProblem {
    let num_locations = num_depots + num_stations;
    let times = (0..num_locations)
        .map(|from| {
            (0..num_locations)
                .map(|to| if from == to { 0 } else { travel_time })
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
                .iter()
                .enumerate()
                .map(|(id, &(start_station, start, end_station, end))| {
                    Trip::new(
                        id,
                        LocationIdx::new(num_depots + start_station),
                        start,
                        LocationIdx::new(num_depots + end_station),
                        end,
                    )
                })
                .collect(),
        )
        .set_max_deviation(max_deviation);

    builder.build().unwrap()
}

/// Three trips a single vehicle covers back to back, for 1020.
pub fn create_chain_problem() -> VehicleSchedulingProblem {
    create_problem(
        1,
        2,
        10,
        &[(0, 100, 1, 150), (1, 170, 0, 220), (0, 240, 1, 290)],
        5,
    )
}

/// Three trips on three stations where every pair can share a vehicle but
/// the three cannot. The LP optimum is 1545, the best schedule costs 2050.
pub fn create_triangle_problem(num_depots: usize) -> VehicleSchedulingProblem {
    create_problem(
        num_depots,
        3,
        10,
        &[(0, 100, 0, 200), (1, 200, 1, 285), (2, 294, 2, 394)],
        5,
    )
}

pub fn create_networks(
    problem: &VehicleSchedulingProblem,
    params: &NetworkParams,
) -> Vec<ConnectionNetwork> {
    problem
        .depots()
        .map(|depot| ConnectionNetwork::new(problem, depot, params))
        .collect()
}

/// LP stand-in returning scripted primal and dual values.
#[derive(Default)]
pub struct MockLpSolver {
    num_rows: usize,
    costs: Vec<Option<f64>>,
    primal_values: Vec<f64>,
    duals: Option<Vec<f64>>,
    infeasible: bool,
    solved: bool,
}

impl MockLpSolver {
    /// Primal values by column id, missing ones are 0.
    pub fn set_primal_values(&mut self, values: Vec<f64>) {
        self.primal_values = values;
    }

    pub fn set_duals(&mut self, duals: Vec<f64>) {
        self.duals = Some(duals);
    }

    pub fn set_infeasible(&mut self, infeasible: bool) {
        self.infeasible = infeasible;
    }

    fn primal(&self, index: usize) -> f64 {
        self.primal_values.get(index).copied().unwrap_or(0.0)
    }
}

impl LpSolver for MockLpSolver {
    fn reset(&mut self, num_rows: usize) {
        self.num_rows = num_rows;
        self.costs.clear();
        self.solved = false;
    }

    fn add_column(&mut self, cost: f64, _rows: &[usize]) -> ColumnId {
        self.costs.push(Some(cost));
        self.solved = false;
        ColumnId::new(self.costs.len() - 1)
    }

    fn remove_column(&mut self, column: ColumnId) -> Result<(), LpError> {
        match self.costs.get_mut(column.get()) {
            Some(cost) if cost.is_some() => {
                *cost = None;
                Ok(())
            }
            _ => Err(LpError::UnknownColumn(column)),
        }
    }

    fn solve(&mut self) -> Result<LpStatus, LpError> {
        self.solved = true;
        Ok(if self.infeasible {
            LpStatus::Infeasible
        } else {
            LpStatus::Optimal
        })
    }

    fn objective_value(&self) -> Result<f64, LpError> {
        if !self.solved || self.infeasible {
            return Err(LpError::NoSolution("objective"));
        }

        Ok(self
            .costs
            .iter()
            .enumerate()
            .filter_map(|(index, cost)| cost.map(|cost| cost * self.primal(index)))
            .sum())
    }

    fn primal_value(&self, column: ColumnId) -> Result<f64, LpError> {
        match self.costs.get(column.get()) {
            Some(Some(_)) => Ok(self.primal(column.get())),
            _ => Err(LpError::UnknownColumn(column)),
        }
    }

    fn duals(&self) -> Result<Vec<f64>, LpError> {
        if !self.solved || self.infeasible {
            return Err(LpError::NoSolution("duals"));
        }

        Ok(self
            .duals
            .clone()
            .unwrap_or_else(|| vec![0.0; self.num_rows]))
    }

    fn farkas_duals(&self) -> Result<Vec<f64>, LpError> {
        if !self.solved || !self.infeasible {
            return Err(LpError::NoSolution("Farkas certificate"));
        }

        Ok(vec![1.0; self.num_rows])
    }
}
