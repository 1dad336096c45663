use fixedbitset::FixedBitSet;

use crate::{
    problem::vehicle_scheduling_problem::DepotIdx,
    solver::{
        network::connection_network::{ArcIdx, ConnectionNetwork},
        route::Route,
    },
};

/// Materialized forbidden arcs of one node, one bit set per depot network.
///
/// An empty restriction forbids nothing.
#[derive(Debug, Clone, Default)]
pub struct ArcRestriction {
    forbidden: Vec<FixedBitSet>,
}

impl ArcRestriction {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn from_arcs(
        networks: &[ConnectionNetwork],
        arcs: impl IntoIterator<Item = (DepotIdx, ArcIdx)>,
    ) -> Self {
        let mut forbidden: Vec<FixedBitSet> = networks
            .iter()
            .map(|network| FixedBitSet::with_capacity(network.num_arcs()))
            .collect();

        for (depot, arc) in arcs {
            forbidden[depot.get()].insert(arc.get());
        }

        Self { forbidden }
    }

    #[inline(always)]
    pub fn is_forbidden(&self, depot: DepotIdx, arc: ArcIdx) -> bool {
        self.forbidden
            .get(depot.get())
            .is_some_and(|arcs| arcs.contains(arc.get()))
    }

    pub fn forbids(&self, route: &Route) -> bool {
        route
            .arcs()
            .iter()
            .any(|&arc| self.is_forbidden(route.depot(), arc))
    }

    pub fn num_forbidden(&self) -> usize {
        self.forbidden.iter().map(|arcs| arcs.count_ones(..)).sum()
    }
}
