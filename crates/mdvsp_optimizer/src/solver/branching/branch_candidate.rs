use serde::Serialize;
use smallvec::SmallVec;

use crate::{
    problem::{trip::TripIdx, vehicle_scheduling_problem::DepotIdx},
    solver::network::connection_network::{ArcIdx, CnNode, ConnectionNetwork},
    utils::indexed_slice::IndexedSlice,
};

/// Depots a color or inter-task decision keeps together: a depot pair, or a
/// single depot when the branched flow is split across exactly two depots.
pub type KeptDepots = SmallVec<[DepotIdx; 2]>;

/// A trip-to-trip connection, identified independently of any depot network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TripArc {
    pub from: TripIdx,
    pub to: TripIdx,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum BranchCandidate {
    /// Down: `trip` is not served by the kept depots. Up: `trip` is served by
    /// one of the kept depots.
    Color { depots: KeptDepots, trip: TripIdx },
    /// Down: `arc` is not used at the kept depots. Up: `arc` is used at one
    /// of the kept depots.
    InterTask { depots: KeptDepots, arc: TripArc },
    /// Down: `arc` is not used at `depot`. Up: `arc` is used at `depot`.
    Arc { depot: DepotIdx, arc: TripArc },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BranchDirection {
    Down,
    Up,
}

impl BranchCandidate {
    pub fn kept_depots(&self) -> &[DepotIdx] {
        match self {
            BranchCandidate::Color { depots, .. } | BranchCandidate::InterTask { depots, .. } => {
                depots
            }
            BranchCandidate::Arc { depot, .. } => std::slice::from_ref(depot),
        }
    }

    /// Arcs the child in `direction` forbids on top of its parent's.
    pub fn forbidden_arcs(
        &self,
        direction: BranchDirection,
        networks: &[ConnectionNetwork],
    ) -> Vec<(DepotIdx, ArcIdx)> {
        let kept = self.kept_depots();
        let mut forbidden = Vec::new();

        match (self, direction) {
            (BranchCandidate::Color { trip, .. }, direction) => {
                let in_scope = |depot: DepotIdx| {
                    kept.contains(&depot) == (direction == BranchDirection::Down)
                };

                for network in networks.iter().filter(|network| in_scope(network.depot())) {
                    forbidden.extend(
                        network
                            .arcs_touching(*trip)
                            .map(|arc| (network.depot(), arc)),
                    );
                }
            }
            (
                BranchCandidate::InterTask { arc, .. } | BranchCandidate::Arc { arc, .. },
                BranchDirection::Down,
            ) => {
                for network in networks.iter().filter(|network| kept.contains(&network.depot())) {
                    if let Some(arc) = network.connection(arc.from, arc.to) {
                        forbidden.push((network.depot(), arc));
                    }
                }
            }
            (
                BranchCandidate::InterTask { arc, .. } | BranchCandidate::Arc { arc, .. },
                BranchDirection::Up,
            ) => {
                let tail = CnNode::Trip(arc.from);
                let head = CnNode::Trip(arc.to);

                for network in networks.iter() {
                    let is_kept = kept.contains(&network.depot());

                    // Every other way out of the tail trip and into the head
                    // trip is closed, the branched arc itself only stays open
                    // at the kept depots.
                    for (arc_id, candidate) in network.arcs().iter_idx::<ArcIdx>() {
                        let same_tail = candidate.from() == tail;
                        let same_head = candidate.to() == head;

                        if (same_tail || same_head) && !(same_tail && same_head && is_kept) {
                            forbidden.push((network.depot(), arc_id));
                        }
                    }
                }
            }
        }

        forbidden
    }
}
