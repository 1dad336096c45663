use thiserror::Error;

use super::{
    branching::bnp_node::BranchError, master::master_problem::MasterError, route::RouteError,
    schedule::ScheduleError,
};

/// Violated invariants that abort a branch-and-price run.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Master(#[from] MasterError),
    #[error("priced path is not a feasible route: {0}")]
    Route(#[from] RouteError),
    #[error(transparent)]
    Branch(#[from] BranchError),
    #[error("integral master solution is not a valid schedule: {0}")]
    Schedule(#[from] ScheduleError),
}
