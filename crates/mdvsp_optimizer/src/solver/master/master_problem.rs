use std::collections::BTreeMap;

use fxhash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    problem::{trip::TripIdx, vehicle_scheduling_problem::DepotIdx},
    solver::{
        branching::{
            arc_restriction::ArcRestriction, branch_candidate::BranchCandidate, branching_rule,
        },
        route::{Route, RouteIdx},
    },
};

use super::{
    clarabel_lp::ClarabelLpSolver,
    duals::Duals,
    lp_solver::{ColumnId, LpError, LpSolver, LpStatus},
};

#[derive(Debug, Error)]
pub enum MasterError {
    #[error("route at depot {depot} covering {trips:?} uses an arc forbidden at the active node")]
    ForbiddenColumn { depot: DepotIdx, trips: Vec<TripIdx> },
    #[error("route at depot {depot} covering {trips:?} is already a column of the master")]
    DuplicateColumn { depot: DepotIdx, trips: Vec<TripIdx> },
    #[error("route {0} is not a column of the master")]
    UnknownRoute(RouteIdx),
    #[error(transparent)]
    Lp(#[from] LpError),
}

type RouteKey = (DepotIdx, Vec<TripIdx>);

fn route_key(route: &Route) -> RouteKey {
    (route.depot(), route.trips().to_vec())
}

/// Flow of one active column in the latest LP solution.
#[derive(Debug, Clone, Copy)]
pub struct ColumnFlow<'a> {
    pub route_id: RouteIdx,
    pub route: &'a Route,
    pub flow: f64,
}

/// Set-covering LP relaxation over the routes generated so far.
///
/// Every generated route stays in a pool until column management drops it,
/// `set_bounds` re-activates the pool routes a node allows.
pub struct MasterProblem<L = ClarabelLpSolver> {
    lp: L,
    num_trips: usize,
    pool: BTreeMap<RouteIdx, Route>,
    pool_index: FxHashMap<RouteKey, RouteIdx>,
    active: BTreeMap<RouteIdx, ColumnId>,
    restriction: ArcRestriction,
    next_route_id: usize,
    status: Option<LpStatus>,
}

impl<L: LpSolver> MasterProblem<L> {
    pub fn new(num_trips: usize, mut lp: L) -> Self {
        lp.reset(num_trips);

        Self {
            lp,
            num_trips,
            pool: BTreeMap::new(),
            pool_index: FxHashMap::default(),
            active: BTreeMap::new(),
            restriction: ArcRestriction::unrestricted(),
            next_route_id: 0,
            status: None,
        }
    }

    /// Rebuilds the LP for a node: every pool route that `restriction` allows
    /// becomes a column again.
    pub fn set_bounds(&mut self, restriction: ArcRestriction) {
        self.lp.reset(self.num_trips);
        self.active.clear();
        self.status = None;

        for (&route_id, route) in self.pool.iter() {
            if !restriction.forbids(route) {
                let column = self.lp.add_column(route.cost(), &rows(route));
                self.active.insert(route_id, column);
            }
        }

        debug!(
            active = self.active.len(),
            pool = self.pool.len(),
            "master rebuilt for node"
        );

        self.restriction = restriction;
    }

    pub fn restriction(&self) -> &ArcRestriction {
        &self.restriction
    }

    /// Whether `route` is currently a column of the LP.
    pub fn contains(&self, route: &Route) -> bool {
        self.pool_index
            .get(&route_key(route))
            .is_some_and(|route_id| self.active.contains_key(route_id))
    }

    pub fn add_column(&mut self, route: Route) -> Result<RouteIdx, MasterError> {
        if self.restriction.forbids(&route) {
            return Err(MasterError::ForbiddenColumn {
                depot: route.depot(),
                trips: route.trips().to_vec(),
            });
        }

        let key = route_key(&route);
        let route_id = match self.pool_index.get(&key) {
            Some(&route_id) if self.active.contains_key(&route_id) => {
                return Err(MasterError::DuplicateColumn {
                    depot: key.0,
                    trips: key.1,
                });
            }
            Some(&route_id) => route_id,
            None => {
                let route_id = RouteIdx::new(self.next_route_id);
                self.next_route_id += 1;
                self.pool_index.insert(key, route_id);
                self.pool.insert(route_id, route);
                route_id
            }
        };

        let route = self
            .pool
            .get(&route_id)
            .ok_or(MasterError::UnknownRoute(route_id))?;
        let column = self.lp.add_column(route.cost(), &rows(route));
        self.active.insert(route_id, column);

        Ok(route_id)
    }

    /// Removes the column from the LP and the route from the pool.
    pub fn remove_column(&mut self, route_id: RouteIdx) -> Result<Route, MasterError> {
        let column = self
            .active
            .remove(&route_id)
            .ok_or(MasterError::UnknownRoute(route_id))?;
        self.lp.remove_column(column)?;

        let route = self
            .pool
            .remove(&route_id)
            .ok_or(MasterError::UnknownRoute(route_id))?;
        self.pool_index.remove(&route_key(&route));

        Ok(route)
    }

    pub fn solve(&mut self) -> Result<LpStatus, MasterError> {
        self.status = None;
        let status = self.lp.solve()?;
        self.status = Some(status);
        Ok(status)
    }

    pub fn is_feasible(&self) -> bool {
        self.status == Some(LpStatus::Optimal)
    }

    pub fn objective(&self) -> Result<f64, MasterError> {
        Ok(self.lp.objective_value()?)
    }

    pub fn duals(&self) -> Result<Duals, MasterError> {
        Ok(Duals::new(self.lp.duals()?))
    }

    pub fn farkas_duals(&self) -> Result<Duals, MasterError> {
        Ok(Duals::new(self.lp.farkas_duals()?))
    }

    pub fn route(&self, route_id: RouteIdx) -> Option<&Route> {
        self.pool.get(&route_id)
    }

    pub fn num_columns(&self) -> usize {
        self.active.len()
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn column_flows(&self) -> Result<Vec<ColumnFlow<'_>>, MasterError> {
        self.active
            .iter()
            .map(|(&route_id, &column)| {
                let route = self
                    .pool
                    .get(&route_id)
                    .ok_or(MasterError::UnknownRoute(route_id))?;
                Ok(ColumnFlow {
                    route_id,
                    route,
                    flow: self.lp.primal_value(column)?,
                })
            })
            .collect()
    }

    /// Routes whose flow exceeds `threshold` in the latest solution.
    pub fn positive_routes(&self, threshold: f64) -> Result<Vec<Route>, MasterError> {
        Ok(self
            .column_flows()?
            .into_iter()
            .filter(|column| column.flow > threshold)
            .map(|column| column.route.clone())
            .collect())
    }

    /// Drops the columns whose reduced cost under `duals` exceeds
    /// `max_reduced_cost`. Columns with a flow above `flow_epsilon` are kept.
    pub fn manage_columns(
        &mut self,
        duals: &Duals,
        max_reduced_cost: f64,
        flow_epsilon: f64,
    ) -> Result<usize, MasterError> {
        let stale: Vec<RouteIdx> = self
            .column_flows()?
            .into_iter()
            .filter(|column| {
                column.flow <= flow_epsilon && column.route.reduced_cost(duals) > max_reduced_cost
            })
            .map(|column| column.route_id)
            .collect();

        for &route_id in stale.iter() {
            self.remove_column(route_id)?;
        }

        if !stale.is_empty() {
            debug!(removed = stale.len(), remaining = self.active.len(), "column management");
        }

        Ok(stale.len())
    }

    pub fn color_branching(
        &self,
        num_depots: usize,
        epsilon: f64,
    ) -> Result<Option<BranchCandidate>, MasterError> {
        Ok(branching_rule::color_branching(
            &self.column_flows()?,
            num_depots,
            epsilon,
        ))
    }

    pub fn inter_task_branching(
        &self,
        num_depots: usize,
        epsilon: f64,
    ) -> Result<Option<BranchCandidate>, MasterError> {
        Ok(branching_rule::inter_task_branching(
            &self.column_flows()?,
            num_depots,
            epsilon,
        ))
    }

    pub fn most_fractional_arc(
        &self,
        num_depots: usize,
        epsilon: f64,
    ) -> Result<Option<BranchCandidate>, MasterError> {
        Ok(branching_rule::most_fractional_arc(
            &self.column_flows()?,
            num_depots,
            epsilon,
        ))
    }

    #[cfg(test)]
    pub(crate) fn lp_mut(&mut self) -> &mut L {
        &mut self.lp
    }
}

fn rows(route: &Route) -> Vec<usize> {
    route.trips().iter().map(|trip| trip.get()).collect()
}
