use std::sync::Arc;

use crate::{
    problem::vehicle_scheduling_problem::DepotIdx,
    solver::network::connection_network::{ArcIdx, ConnectionNetwork},
};

use super::arc_restriction::ArcRestriction;

#[derive(Debug)]
struct ForbiddenLayer {
    arcs: Vec<(DepotIdx, ArcIdx)>,
    parent: Option<Arc<ForbiddenLayer>>,
}

/// Forbidden arcs accumulated along a path of the branch-and-bound tree.
///
/// Each branching decision adds one immutable layer on top of its parent's
/// layers, so children share everything their ancestors forbade.
#[derive(Debug, Clone, Default)]
pub struct ForbiddenArcs {
    head: Option<Arc<ForbiddenLayer>>,
}

impl ForbiddenArcs {
    pub fn with(&self, arcs: Vec<(DepotIdx, ArcIdx)>) -> Self {
        Self {
            head: Some(Arc::new(ForbiddenLayer {
                arcs,
                parent: self.head.clone(),
            })),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DepotIdx, ArcIdx)> + '_ {
        std::iter::successors(self.head.as_deref(), |layer| layer.parent.as_deref())
            .flat_map(|layer| layer.arcs.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn restriction(&self, networks: &[ConnectionNetwork]) -> ArcRestriction {
        ArcRestriction::from_arcs(networks, self.iter())
    }
}
