use fxhash::FxHashMap;
use serde::Serialize;

use crate::{
    define_index_newtype,
    problem::{
        travel_time_matrix::{Cost, Time},
        trip::TripIdx,
        vehicle_scheduling_problem::{DepotIdx, VehicleSchedulingProblem},
    },
    solver::{master::duals::Duals, solver_params::NetworkParams},
};

use super::arc_costs::{ArcCosts, PricingMode};

define_index_newtype!(ArcIdx, CnArc);
define_index_newtype!(NodeIdx, CnNode);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CnNode {
    Source(DepotIdx),
    Trip(TripIdx),
    Sink(DepotIdx),
}

impl CnNode {
    pub fn trip(&self) -> Option<TripIdx> {
        match self {
            CnNode::Trip(trip) => Some(*trip),
            CnNode::Source(_) | CnNode::Sink(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArcKind {
    PullOut,
    Connection,
    PullIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CnArc {
    kind: ArcKind,
    from: CnNode,
    to: CnNode,
    cost: Cost,
    /// Deadhead minutes driven along the arc.
    distance: Time,
}

impl CnArc {
    pub fn kind(&self) -> ArcKind {
        self.kind
    }

    pub fn from(&self) -> CnNode {
        self.from
    }

    pub fn to(&self) -> CnNode {
        self.to
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn distance(&self) -> Time {
        self.distance
    }

    pub fn tail_trip(&self) -> Option<TripIdx> {
        self.from.trip()
    }

    pub fn head_trip(&self) -> Option<TripIdx> {
        self.to.trip()
    }

    pub fn touches(&self, trip: TripIdx) -> bool {
        self.tail_trip() == Some(trip) || self.head_trip() == Some(trip)
    }
}

/// Directed acyclic graph of the possible vehicle movements of one depot.
///
/// Nodes are stored in topological order: the source first, then one node
/// per trip ordered by `(start_time, id)`, the sink last. Every arc goes from
/// a lower to a higher node index.
pub struct ConnectionNetwork {
    depot: DepotIdx,
    nodes: Vec<CnNode>,
    trip_nodes: Vec<NodeIdx>,
    arcs: Vec<CnArc>,
    outgoing: Vec<Vec<ArcIdx>>,
    pull_outs: Vec<ArcIdx>,
    pull_ins: Vec<ArcIdx>,
    connections: FxHashMap<(TripIdx, TripIdx), ArcIdx>,
}

impl ConnectionNetwork {
    pub fn new(
        problem: &VehicleSchedulingProblem,
        depot: DepotIdx,
        params: &NetworkParams,
    ) -> Self {
        let mut order: Vec<TripIdx> = (0..problem.num_trips()).map(TripIdx::new).collect();
        order.sort_by(|&a, &b| problem.trip(a).cmp(problem.trip(b)));

        let mut nodes = Vec::with_capacity(order.len() + 2);
        let mut trip_nodes = vec![NodeIdx::new(0); order.len()];
        nodes.push(CnNode::Source(depot));
        for &trip in order.iter() {
            trip_nodes[trip.get()] = NodeIdx::new(nodes.len());
            nodes.push(CnNode::Trip(trip));
        }
        nodes.push(CnNode::Sink(depot));

        let mut network = Self {
            depot,
            outgoing: vec![Vec::new(); nodes.len()],
            nodes,
            trip_nodes,
            arcs: Vec::new(),
            pull_outs: Vec::with_capacity(order.len()),
            pull_ins: Vec::with_capacity(order.len()),
            connections: FxHashMap::default(),
        };

        let depot_location = problem.depot_location(depot);

        for index in 0..problem.num_trips() {
            let trip_id = TripIdx::new(index);
            let trip = problem.trip(trip_id);

            let pull_out = problem.travel_time(depot_location, trip.start_location());
            let arc = network.add_arc(CnArc {
                kind: ArcKind::PullOut,
                from: CnNode::Source(depot),
                to: CnNode::Trip(trip_id),
                cost: problem.fixed_cost() + problem.deadhead_cost(pull_out),
                distance: pull_out,
            });
            network.pull_outs.push(arc);

            let pull_in = problem.travel_time(trip.end_location(), depot_location);
            let arc = network.add_arc(CnArc {
                kind: ArcKind::PullIn,
                from: CnNode::Trip(trip_id),
                to: CnNode::Sink(depot),
                cost: problem.fixed_cost() + problem.deadhead_cost(pull_in),
                distance: pull_in,
            });
            network.pull_ins.push(arc);
        }

        let max_deviation = problem.max_deviation();
        for (position, &first_id) in order.iter().enumerate() {
            let first = problem.trip(first_id);

            for &second_id in order[position + 1..].iter() {
                let second = problem.trip(second_id);

                // Waiting only grows from here on since trips are sorted by start.
                if second.start_time() - first.end_time()
                    >= params.max_waiting_time + params.max_deadhead
                {
                    break;
                }

                let deadhead = problem.travel_time(first.end_location(), second.start_location());
                let waiting =
                    second.start_time() - (first.end_time() + deadhead) + 2 * max_deviation;

                if waiting >= 0
                    && waiting - 2 * max_deviation < params.max_waiting_time
                    && deadhead <= params.max_deadhead
                {
                    let arc = network.add_arc(CnArc {
                        kind: ArcKind::Connection,
                        from: CnNode::Trip(first_id),
                        to: CnNode::Trip(second_id),
                        cost: problem.deadhead_cost(deadhead),
                        distance: deadhead,
                    });
                    network.connections.insert((first_id, second_id), arc);
                }
            }
        }

        network
    }

    fn add_arc(&mut self, arc: CnArc) -> ArcIdx {
        let arc_id = ArcIdx::new(self.arcs.len());
        let tail = self.node_index(arc.from);
        self.outgoing[tail.get()].push(arc_id);
        self.arcs.push(arc);
        arc_id
    }

    pub fn depot(&self) -> DepotIdx {
        self.depot
    }

    /// Nodes in topological order, addressed by their `NodeIdx`.
    pub fn nodes(&self) -> &[CnNode] {
        &self.nodes
    }

    pub fn node(&self, node_id: NodeIdx) -> CnNode {
        self.nodes[node_id]
    }

    pub fn node_index(&self, node: CnNode) -> NodeIdx {
        match node {
            CnNode::Source(_) => NodeIdx::new(0),
            CnNode::Trip(trip) => self.trip_nodes[trip.get()],
            CnNode::Sink(_) => NodeIdx::new(self.nodes.len() - 1),
        }
    }

    pub fn source(&self) -> NodeIdx {
        NodeIdx::new(0)
    }

    pub fn sink(&self) -> NodeIdx {
        NodeIdx::new(self.nodes.len() - 1)
    }

    pub fn arcs(&self) -> &[CnArc] {
        &self.arcs
    }

    pub fn arc(&self, arc_id: ArcIdx) -> &CnArc {
        &self.arcs[arc_id]
    }

    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    pub fn outgoing(&self, node_id: NodeIdx) -> &[ArcIdx] {
        &self.outgoing[node_id.get()]
    }

    pub fn pull_out(&self, trip: TripIdx) -> ArcIdx {
        self.pull_outs[trip.get()]
    }

    pub fn pull_in(&self, trip: TripIdx) -> ArcIdx {
        self.pull_ins[trip.get()]
    }

    pub fn connection(&self, from: TripIdx, to: TripIdx) -> Option<ArcIdx> {
        self.connections.get(&(from, to)).copied()
    }

    pub fn arcs_touching(&self, trip: TripIdx) -> impl Iterator<Item = ArcIdx> + '_ {
        self.arcs
            .iter()
            .enumerate()
            .filter(move |(_, arc)| arc.touches(trip))
            .map(|(index, _)| ArcIdx::new(index))
    }

    /// Search cost of every arc: base cost minus the dual of the tail trip, or
    /// the negated tail dual alone when pricing against a Farkas certificate.
    /// Arcs leaving the source carry no dual.
    pub fn search_costs(&self, duals: &Duals, mode: PricingMode) -> ArcCosts {
        ArcCosts::new(
            self.arcs
                .iter()
                .map(|arc| {
                    let dual = arc.tail_trip().map_or(0.0, |trip| duals.dual(trip));
                    match mode {
                        PricingMode::Optimality => arc.cost - dual,
                        PricingMode::Feasibility => -dual,
                    }
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_network_is_topologically_sorted() {
        let problem = test_utils::create_chain_problem();
        let network = ConnectionNetwork::new(&problem, DepotIdx::new(0), &NetworkParams::default());

        assert_eq!(network.nodes().len(), 5);
        assert_eq!(network.node(network.source()), CnNode::Source(DepotIdx::new(0)));
        assert_eq!(network.node(network.sink()), CnNode::Sink(DepotIdx::new(0)));

        for arc in network.arcs() {
            assert!(network.node_index(arc.from()) < network.node_index(arc.to()));
        }
    }

    #[test]
    fn test_pull_out_and_pull_in_costs() {
        let problem = test_utils::create_chain_problem();
        let network = ConnectionNetwork::new(&problem, DepotIdx::new(0), &NetworkParams::default());

        let pull_out = network.arc(network.pull_out(TripIdx::new(0)));
        assert_eq!(pull_out.kind(), ArcKind::PullOut);
        assert_eq!(pull_out.distance(), 10);
        assert_eq!(pull_out.cost(), 510.0);

        let pull_in = network.arc(network.pull_in(TripIdx::new(2)));
        assert_eq!(pull_in.kind(), ArcKind::PullIn);
        assert_eq!(pull_in.cost(), 510.0);
    }

    #[test]
    fn test_connections() {
        let problem = test_utils::create_chain_problem();
        let network = ConnectionNetwork::new(&problem, DepotIdx::new(0), &NetworkParams::default());

        let first = network
            .connection(TripIdx::new(0), TripIdx::new(1))
            .map(|arc| *network.arc(arc))
            .unwrap();
        assert_eq!(first.kind(), ArcKind::Connection);
        assert_eq!(first.cost(), 0.0);

        let skip = network
            .connection(TripIdx::new(0), TripIdx::new(2))
            .map(|arc| *network.arc(arc))
            .unwrap();
        assert_eq!(skip.distance(), 10);

        assert!(network.connection(TripIdx::new(1), TripIdx::new(0)).is_none());
        assert!(network.connection(TripIdx::new(2), TripIdx::new(0)).is_none());
    }

    #[test]
    fn test_connections_respect_limits() {
        let problem = test_utils::create_chain_problem();
        let params = NetworkParams {
            max_waiting_time: 25,
            max_deadhead: 650,
        };
        let network = ConnectionNetwork::new(&problem, DepotIdx::new(0), &params);

        // 0 -> 1 waits 20 minutes, 0 -> 2 waits 80 minutes
        assert!(network.connection(TripIdx::new(0), TripIdx::new(1)).is_some());
        assert!(network.connection(TripIdx::new(0), TripIdx::new(2)).is_none());

        let params = NetworkParams {
            max_waiting_time: 800,
            max_deadhead: 5,
        };
        let network = ConnectionNetwork::new(&problem, DepotIdx::new(0), &params);
        assert!(network.connection(TripIdx::new(0), TripIdx::new(1)).is_some());
        assert!(network.connection(TripIdx::new(0), TripIdx::new(2)).is_none());
    }

    #[test]
    fn test_search_costs() {
        let problem = test_utils::create_chain_problem();
        let network = ConnectionNetwork::new(&problem, DepotIdx::new(0), &NetworkParams::default());
        let duals = Duals::new(vec![100.0, 200.0, 300.0]);

        let costs = network.search_costs(&duals, PricingMode::Optimality);
        assert_eq!(costs.len(), network.num_arcs());
        assert_eq!(costs.cost(network.pull_out(TripIdx::new(1))), 510.0);
        assert_eq!(costs.cost(network.pull_in(TripIdx::new(1))), 510.0 - 200.0);

        let costs = network.search_costs(&duals, PricingMode::Feasibility);
        assert_eq!(costs.cost(network.pull_out(TripIdx::new(1))), 0.0);
        assert_eq!(costs.cost(network.pull_in(TripIdx::new(1))), -200.0);
    }

    #[test]
    fn test_arcs_touching() {
        let problem = test_utils::create_chain_problem();
        let network = ConnectionNetwork::new(&problem, DepotIdx::new(0), &NetworkParams::default());

        // pull-out, pull-in, 0 -> 1 and 1 -> 2
        assert_eq!(network.arcs_touching(TripIdx::new(1)).count(), 4);
    }
}
