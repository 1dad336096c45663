use std::{cmp::Ordering, collections::BinaryHeap, sync::Arc};

use jiff::{SignedDuration, Timestamp};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    problem::{trip::TripIdx, vehicle_scheduling_problem::VehicleSchedulingProblem},
    timer_debug,
};

use super::{
    branching::{bnp_node::BnpNode, branch_candidate::BranchCandidate},
    master::{
        clarabel_lp::ClarabelLpSolver,
        duals::Duals,
        lp_solver::{LpSolver, LpStatus},
        master_problem::MasterProblem,
    },
    network::{arc_costs::PricingMode, connection_network::ConnectionNetwork},
    pricing::shortest_path::ShortestPathWithResources,
    route::{Route, RouteError},
    schedule::VehicleSchedule,
    solver_error::SolverError,
    solver_params::BranchAndPriceParams,
    statistics::BranchAndPriceStatistics,
};

/// Routes with a flow above this value form the integral schedule.
const INTEGRAL_FLOW_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchStatus {
    Unsolved,
    /// The tree was exhausted or the gap closed, the incumbent is optimal.
    Optimal,
    /// The tree was exhausted without finding an integral schedule.
    Infeasible,
    /// The time budget ran out, both bounds are valid but may differ.
    TimeLimit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeOutcome {
    /// Column generation converged with this LP objective.
    Optimal(f64),
    /// Farkas pricing found no column that restores feasibility.
    Infeasible,
    TimedOut,
}

struct OpenNode {
    priority: f64,
    sequence: usize,
    node: BnpNode,
}

// `BinaryHeap` is a max-heap, the smallest priority has to compare greatest.
impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then(other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

/// Best-first branch-and-bound with column generation at every node.
pub struct BranchAndPrice<L = ClarabelLpSolver> {
    problem: Arc<VehicleSchedulingProblem>,
    params: BranchAndPriceParams,
    networks: Vec<ConnectionNetwork>,
    master: MasterProblem<L>,
    open: BinaryHeap<OpenNode>,
    next_sequence: usize,
    best_schedule: Option<VehicleSchedule>,
    statistics: BranchAndPriceStatistics,
    status: SearchStatus,
    start: Timestamp,
}

impl BranchAndPrice<ClarabelLpSolver> {
    pub fn new(problem: Arc<VehicleSchedulingProblem>, params: BranchAndPriceParams) -> Self {
        Self::with_lp_solver(problem, params, ClarabelLpSolver::default())
    }
}

impl<L: LpSolver> BranchAndPrice<L> {
    pub fn with_lp_solver(
        problem: Arc<VehicleSchedulingProblem>,
        params: BranchAndPriceParams,
        lp: L,
    ) -> Self {
        let (networks, _) = timer_debug!(
            "connection networks",
            problem
                .depots()
                .map(|depot| ConnectionNetwork::new(&problem, depot, &params.network))
                .collect::<Vec<_>>()
        );

        info!(
            trips = problem.num_trips(),
            depots = problem.num_depots(),
            arcs = networks.iter().map(ConnectionNetwork::num_arcs).sum::<usize>(),
            "branch-and-price initialized"
        );

        let master = MasterProblem::new(problem.num_trips(), lp);

        Self {
            problem,
            params,
            networks,
            master,
            open: BinaryHeap::new(),
            next_sequence: 0,
            best_schedule: None,
            statistics: BranchAndPriceStatistics::default(),
            status: SearchStatus::Unsolved,
            start: Timestamp::now(),
        }
    }

    pub fn problem(&self) -> &VehicleSchedulingProblem {
        &self.problem
    }

    pub fn params(&self) -> &BranchAndPriceParams {
        &self.params
    }

    pub fn networks(&self) -> &[ConnectionNetwork] {
        &self.networks
    }

    pub fn master(&self) -> &MasterProblem<L> {
        &self.master
    }

    pub fn best_schedule(&self) -> Option<&VehicleSchedule> {
        self.best_schedule.as_ref()
    }

    pub fn statistics(&self) -> &BranchAndPriceStatistics {
        &self.statistics
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn upper_bound(&self) -> f64 {
        self.statistics.upper_bound().unwrap_or(f64::INFINITY)
    }

    pub fn lower_bound(&self) -> f64 {
        self.statistics.lower_bound()
    }

    /// Adds one single-trip route per trip at the first depot. Trips the
    /// first depot cannot reach in time are left to Farkas pricing.
    pub fn add_initial_columns(&mut self) -> Result<(), SolverError> {
        let Some(network) = self.networks.first() else {
            return Ok(());
        };

        let mut added = 0;
        for index in 0..self.problem.num_trips() {
            match Route::from_trips(&self.problem, network, vec![TripIdx::new(index)]) {
                Ok(route) if !self.master.contains(&route) => {
                    self.master.add_column(route)?;
                    added += 1;
                }
                Ok(_) => {}
                Err(error) => debug!(trip = index, %error, "no initial column"),
            }
        }

        self.statistics.add_generated_columns(added);
        Ok(())
    }

    fn elapsed(&self) -> SignedDuration {
        Timestamp::now().duration_since(self.start)
    }

    fn push_open(&mut self, node: BnpNode) {
        self.open.push(OpenNode {
            priority: node.priority(self.params.depth_weight),
            sequence: self.next_sequence,
            node,
        });
        self.next_sequence += 1;
    }

    fn open_lower_bound(&self) -> Option<f64> {
        self.open
            .iter()
            .map(|open| open.node.lower_bound())
            .min_by(f64::total_cmp)
    }

    pub fn run(&mut self) -> Result<SearchStatus, SolverError> {
        self.start = Timestamp::now();
        self.open.clear();

        if self.master.pool_size() == 0 {
            self.add_initial_columns()?;
        }

        self.push_open(BnpNode::root());

        let gap_tolerance = self.params.gap_tolerance;
        let mut timed_out = false;

        while let Some(lower_bound) = self.open_lower_bound() {
            self.statistics.set_lower_bound(lower_bound);

            if self.upper_bound() - lower_bound < gap_tolerance {
                info!(
                    lower_bound,
                    upper_bound = self.upper_bound(),
                    "gap closed"
                );
                break;
            }

            let elapsed = self.elapsed();
            if elapsed >= self.params.time_limit {
                timed_out = true;
                break;
            }

            let Some(OpenNode { mut node, .. }) = self.open.pop() else {
                break;
            };

            if node.lower_bound() >= self.upper_bound() - gap_tolerance {
                debug!(bound = node.lower_bound(), "node pruned by bound");
                self.statistics.add_pruned_node();
                continue;
            }

            match self.solve_node(&node, self.params.time_limit - elapsed)? {
                NodeOutcome::TimedOut => {
                    timed_out = true;
                    break;
                }
                NodeOutcome::Infeasible => {
                    self.statistics.add_solved_node(node.depth());
                    self.statistics.add_pruned_node();
                    debug!(depth = node.depth(), "node infeasible, pruned");
                }
                NodeOutcome::Optimal(objective) => {
                    node.set_objective(objective);
                    self.process_solved_node(node)?;
                }
            }
        }

        if timed_out {
            warn!(
                lower_bound = self.lower_bound(),
                upper_bound = self.upper_bound(),
                "time limit reached"
            );
            self.status = SearchStatus::TimeLimit;
        } else {
            if self.open.is_empty() {
                self.statistics.set_lower_bound(self.upper_bound());
            }

            self.status = if self.best_schedule.is_some() {
                SearchStatus::Optimal
            } else {
                SearchStatus::Infeasible
            };
        }

        self.statistics.set_time_total(self.elapsed());

        info!(
            status = ?self.status,
            root_bound = ?self.statistics.root_bound(),
            lower_bound = self.lower_bound(),
            upper_bound = self.upper_bound(),
            nodes = self.statistics.nodes_solved(),
            time = ?self.statistics.time_total(),
            time_master = ?self.statistics.time_master(),
            time_pricing = ?self.statistics.time_pricing(),
            "branch-and-price finished"
        );

        Ok(self.status)
    }

    fn process_solved_node(&mut self, node: BnpNode) -> Result<(), SolverError> {
        let Some(objective) = node.objective() else {
            return Ok(());
        };

        self.statistics.add_solved_node(node.depth());

        if node.is_root() {
            let elapsed = self.elapsed();
            self.statistics.set_root(objective, elapsed);
            info!(root_bound = objective, time = ?elapsed, "root node solved");
        }

        if objective >= self.upper_bound() - self.params.gap_tolerance {
            debug!(objective, "node fathomed by its LP bound");
            self.statistics.add_pruned_node();
            return Ok(());
        }

        match self.find_candidate()? {
            Some(candidate) => {
                debug!(depth = node.depth(), objective, ?candidate, "branching");
                let (down, up) = node.branch(&candidate, &self.networks)?;
                self.push_open(down);
                self.push_open(up);
            }
            None => {
                let schedule =
                    VehicleSchedule::new(self.master.positive_routes(INTEGRAL_FLOW_THRESHOLD)?);
                schedule.validate(&self.problem)?;

                if schedule.cost() < self.upper_bound() {
                    info!(
                        cost = schedule.cost(),
                        vehicles = schedule.num_vehicles(),
                        depth = node.depth(),
                        "new incumbent"
                    );
                    self.statistics.set_upper_bound(schedule.cost());
                    self.best_schedule = Some(schedule);
                }
            }
        }

        Ok(())
    }

    fn find_candidate(&self) -> Result<Option<BranchCandidate>, SolverError> {
        for rule in self.params.branching_rules.iter() {
            let candidate = rule.find_candidate(
                &self.master,
                self.networks.len(),
                self.params.integrality_epsilon,
            )?;

            if candidate.is_some() {
                return Ok(candidate);
            }
        }

        Ok(None)
    }

    /// Column generation restricted to the arcs `node` allows.
    pub fn solve_node(
        &mut self,
        node: &BnpNode,
        budget: SignedDuration,
    ) -> Result<NodeOutcome, SolverError> {
        let node_start = Timestamp::now();
        self.master.set_bounds(node.restriction(&self.networks));

        let mut iteration = 0;
        loop {
            iteration += 1;

            if Timestamp::now().duration_since(node_start) >= budget {
                return Ok(NodeOutcome::TimedOut);
            }

            let (status, master_time) = timer_debug!("master", self.master.solve());
            self.statistics.add_master_time(master_time);
            let status = status?;

            let (duals, mode) = match status {
                LpStatus::Optimal => {
                    let duals = self.master.duals()?;

                    let period = self.params.column_management_period;
                    if period > 0 && iteration % period == 0 {
                        let removed = self.master.manage_columns(
                            &duals,
                            self.params.max_reduced_cost,
                            self.params.integrality_epsilon,
                        )?;
                        self.statistics.add_removed_columns(removed);
                    }

                    (duals, PricingMode::Optimality)
                }
                LpStatus::Infeasible => (self.master.farkas_duals()?, PricingMode::Feasibility),
            };

            let (routes, pricing_time) = timer_debug!("pricing", self.price(&duals, mode));
            self.statistics.add_pricing_time(pricing_time);

            let mut added = 0;
            for route in routes? {
                if self.master.contains(&route) {
                    continue;
                }
                self.master.add_column(route)?;
                added += 1;
            }
            self.statistics.add_generated_columns(added);

            debug!(
                iteration,
                ?status,
                added,
                columns = self.master.num_columns(),
                "column generation"
            );

            if added == 0 {
                return Ok(match status {
                    LpStatus::Optimal => NodeOutcome::Optimal(self.master.objective()?),
                    LpStatus::Infeasible => NodeOutcome::Infeasible,
                });
            }
        }
    }

    /// Improving routes of every depot, merged in depot order.
    fn price(&self, duals: &Duals, mode: PricingMode) -> Result<Vec<Route>, RouteError> {
        let problem: &VehicleSchedulingProblem = &self.problem;
        let restriction = self.master.restriction();
        let max_routes = self.params.routes_per_iteration;
        let epsilon = self.params.reduced_cost_epsilon;

        let price_depot = |network: &ConnectionNetwork| -> Result<Vec<Route>, RouteError> {
            let costs = network.search_costs(duals, mode);
            let mut pricing = ShortestPathWithResources::new(problem, network);
            pricing.compute_distances(&costs, restriction);

            if pricing.distance() < -epsilon {
                pricing.best_routes(max_routes, epsilon)
            } else {
                Ok(Vec::new())
            }
        };

        let per_depot: Vec<Vec<Route>> = if self.params.parallel_pricing {
            self.networks
                .par_iter()
                .map(price_depot)
                .collect::<Result<_, _>>()?
        } else {
            self.networks
                .iter()
                .map(price_depot)
                .collect::<Result<_, _>>()?
        };

        Ok(per_depot.into_iter().flatten().collect())
    }
}
