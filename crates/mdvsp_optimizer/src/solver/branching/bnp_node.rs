use std::sync::Arc;

use thiserror::Error;

use crate::solver::network::connection_network::ConnectionNetwork;

use super::{
    arc_restriction::ArcRestriction,
    branch_candidate::{BranchCandidate, BranchDirection},
    forbidden_arcs::ForbiddenArcs,
};

#[derive(Debug, Error)]
pub enum BranchError {
    #[error("{direction:?} branch on {candidate:?} was already taken on this path")]
    DuplicateDecision {
        direction: BranchDirection,
        candidate: BranchCandidate,
    },
}

/// A node of the branch-and-price tree.
///
/// A node only differs from the root by the arcs it forbids, its bound is
/// the objective its parent reached.
#[derive(Debug, Clone)]
pub struct BnpNode {
    forbidden: ForbiddenArcs,
    lower_bound: f64,
    objective: Option<f64>,
    depth: usize,
    down_decisions: Arc<Vec<BranchCandidate>>,
    up_decisions: Arc<Vec<BranchCandidate>>,
}

impl BnpNode {
    pub fn root() -> Self {
        Self {
            forbidden: ForbiddenArcs::default(),
            lower_bound: 0.0,
            objective: None,
            depth: 0,
            down_decisions: Arc::new(Vec::new()),
            up_decisions: Arc::new(Vec::new()),
        }
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    /// LP objective once column generation converged at this node.
    pub fn objective(&self) -> Option<f64> {
        self.objective
    }

    pub fn set_objective(&mut self, objective: f64) {
        self.objective = Some(objective);
    }

    /// Sort key of the open list, deeper nodes win close calls.
    pub fn priority(&self, depth_weight: f64) -> f64 {
        self.lower_bound - depth_weight * self.depth as f64
    }

    pub fn forbidden(&self) -> &ForbiddenArcs {
        &self.forbidden
    }

    pub fn restriction(&self, networks: &[ConnectionNetwork]) -> ArcRestriction {
        self.forbidden.restriction(networks)
    }

    pub fn decisions(&self, direction: BranchDirection) -> &[BranchCandidate] {
        match direction {
            BranchDirection::Down => &self.down_decisions,
            BranchDirection::Up => &self.up_decisions,
        }
    }

    pub fn child(
        &self,
        candidate: &BranchCandidate,
        direction: BranchDirection,
        networks: &[ConnectionNetwork],
    ) -> Result<BnpNode, BranchError> {
        if self.decisions(direction).contains(candidate) {
            return Err(BranchError::DuplicateDecision {
                direction,
                candidate: candidate.clone(),
            });
        }

        let extend = |decisions: &Arc<Vec<BranchCandidate>>, take: bool| {
            if take {
                let mut decisions = decisions.as_ref().clone();
                decisions.push(candidate.clone());
                Arc::new(decisions)
            } else {
                Arc::clone(decisions)
            }
        };

        Ok(BnpNode {
            forbidden: self
                .forbidden
                .with(candidate.forbidden_arcs(direction, networks)),
            lower_bound: self.objective.unwrap_or(self.lower_bound),
            objective: None,
            depth: self.depth + 1,
            down_decisions: extend(&self.down_decisions, direction == BranchDirection::Down),
            up_decisions: extend(&self.up_decisions, direction == BranchDirection::Up),
        })
    }

    /// Both children of `candidate`, down first.
    pub fn branch(
        &self,
        candidate: &BranchCandidate,
        networks: &[ConnectionNetwork],
    ) -> Result<(BnpNode, BnpNode), BranchError> {
        Ok((
            self.child(candidate, BranchDirection::Down, networks)?,
            self.child(candidate, BranchDirection::Up, networks)?,
        ))
    }
}
