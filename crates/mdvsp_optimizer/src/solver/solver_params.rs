use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::problem::travel_time_matrix::Time;

use super::branching::branching_rule::BranchingRule;

/// Limits on the trip-to-trip connections of the connection networks.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    /// Longest idle time between two consecutive trips of a vehicle.
    pub max_waiting_time: Time,
    /// Longest empty drive between two consecutive trips of a vehicle.
    pub max_deadhead: Time,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            max_waiting_time: 800,
            max_deadhead: 650,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchAndPriceParams {
    pub time_limit: SignedDuration,

    /// Maximum number of routes returned by one depot per pricing call.
    pub routes_per_iteration: usize,
    /// Column management runs every `column_management_period` iterations of
    /// a node's column generation loop.
    pub column_management_period: usize,
    /// Columns with a reduced cost above this value are dropped by column
    /// management unless they carry flow.
    pub max_reduced_cost: f64,

    /// The search stops once the gap between both global bounds falls below
    /// this value.
    pub gap_tolerance: f64,
    /// Open nodes are explored by ascending `bound - depth_weight * depth`.
    pub depth_weight: f64,
    pub reduced_cost_epsilon: f64,
    pub integrality_epsilon: f64,

    /// Branching rules in priority order.
    pub branching_rules: Vec<BranchingRule>,
    pub parallel_pricing: bool,

    pub network: NetworkParams,
}

impl Default for BranchAndPriceParams {
    fn default() -> Self {
        Self {
            time_limit: SignedDuration::from_secs(3600),
            routes_per_iteration: 4000,
            column_management_period: 50,
            max_reduced_cost: 10.0,
            gap_tolerance: 0.99,
            depth_weight: 1e-3,
            reduced_cost_epsilon: 1e-4,
            integrality_epsilon: 1e-3,
            branching_rules: vec![
                BranchingRule::Color,
                BranchingRule::InterTask,
                BranchingRule::MostFractionalArc,
            ],
            parallel_pricing: false,
            network: NetworkParams::default(),
        }
    }
}
