use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use crate::{
    problem::{trip::TripIdx, vehicle_scheduling_problem::DepotIdx},
    solver::master::{
        lp_solver::LpSolver,
        master_problem::{ColumnFlow, MasterError, MasterProblem},
    },
};

use super::branch_candidate::{BranchCandidate, KeptDepots, TripArc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchingRule {
    Color,
    InterTask,
    MostFractionalArc,
}

impl BranchingRule {
    pub fn find_candidate<L: LpSolver>(
        &self,
        master: &MasterProblem<L>,
        num_depots: usize,
        epsilon: f64,
    ) -> Result<Option<BranchCandidate>, MasterError> {
        match self {
            BranchingRule::Color => master.color_branching(num_depots, epsilon),
            BranchingRule::InterTask => master.inter_task_branching(num_depots, epsilon),
            BranchingRule::MostFractionalArc => master.most_fractional_arc(num_depots, epsilon),
        }
    }
}

#[inline]
fn fractionality(value: f64) -> f64 {
    (value - value.round()).abs()
}

/// Keeps the most fractional candidate seen so far, earlier ones win ties.
struct MostFractional<T> {
    best: Option<(f64, T)>,
    epsilon: f64,
}

impl<T> MostFractional<T> {
    fn new(epsilon: f64) -> Self {
        Self {
            best: None,
            epsilon,
        }
    }

    fn offer(&mut self, value: f64, candidate: impl FnOnce() -> T) {
        let score = fractionality(value);
        if score > self.epsilon && self.best.as_ref().is_none_or(|(best, _)| score > *best) {
            self.best = Some((score, candidate()));
        }
    }

    fn into_best(self) -> Option<T> {
        self.best.map(|(_, candidate)| candidate)
    }
}

/// Flow per trip of every depot, over columns carrying more than `epsilon`.
fn trip_flows(
    flows: &[ColumnFlow],
    num_depots: usize,
    epsilon: f64,
) -> Vec<BTreeMap<TripIdx, f64>> {
    let mut per_depot = vec![BTreeMap::new(); num_depots];

    for column in flows.iter().filter(|column| column.flow > epsilon) {
        let depot_flows = &mut per_depot[column.route.depot().get()];
        for &trip in column.route.trips() {
            *depot_flows.entry(trip).or_insert(0.0) += column.flow;
        }
    }

    per_depot
}

/// Flow per trip-to-trip connection of every depot, over columns carrying
/// more than `epsilon`.
fn arc_flows(flows: &[ColumnFlow], num_depots: usize, epsilon: f64) -> Vec<BTreeMap<TripArc, f64>> {
    let mut per_depot = vec![BTreeMap::new(); num_depots];

    for column in flows.iter().filter(|column| column.flow > epsilon) {
        let depot_flows = &mut per_depot[column.route.depot().get()];
        for pair in column.route.trips().windows(2) {
            let arc = TripArc {
                from: pair[0],
                to: pair[1],
            };
            *depot_flows.entry(arc).or_insert(0.0) += column.flow;
        }
    }

    per_depot
}

/// For every depot pair `A < B` sharing an object, offers the pair with the
/// combined flow and the single depot `A` with its own flow. A pair whose
/// combined flow is integral while both parts are fractional still yields
/// the single depot form.
fn best_depot_split<K: Ord + Copy>(
    per_depot: &[BTreeMap<K, f64>],
    epsilon: f64,
) -> Option<(KeptDepots, K)> {
    let mut best = MostFractional::new(epsilon);

    for first in 0..per_depot.len() {
        for second in (first + 1)..per_depot.len() {
            for (&key, &first_flow) in per_depot[first].iter() {
                let Some(&second_flow) = per_depot[second].get(&key) else {
                    continue;
                };

                let pair: KeptDepots = smallvec![DepotIdx::new(first), DepotIdx::new(second)];
                best.offer(first_flow + second_flow, || (pair, key));
                best.offer(first_flow, || (smallvec![DepotIdx::new(first)], key));
            }
        }
    }

    best.into_best()
}

pub fn color_branching(
    flows: &[ColumnFlow],
    num_depots: usize,
    epsilon: f64,
) -> Option<BranchCandidate> {
    best_depot_split(&trip_flows(flows, num_depots, epsilon), epsilon)
        .map(|(depots, trip)| BranchCandidate::Color { depots, trip })
}

pub fn inter_task_branching(
    flows: &[ColumnFlow],
    num_depots: usize,
    epsilon: f64,
) -> Option<BranchCandidate> {
    best_depot_split(&arc_flows(flows, num_depots, epsilon), epsilon)
        .map(|(depots, arc)| BranchCandidate::InterTask { depots, arc })
}

pub fn most_fractional_arc(
    flows: &[ColumnFlow],
    num_depots: usize,
    epsilon: f64,
) -> Option<BranchCandidate> {
    let mut best = MostFractional::new(epsilon);

    for (depot, depot_flows) in arc_flows(flows, num_depots, epsilon).into_iter().enumerate() {
        for (arc, flow) in depot_flows {
            best.offer(flow, || BranchCandidate::Arc {
                depot: DepotIdx::new(depot),
                arc,
            });
        }
    }

    best.into_best()
}
