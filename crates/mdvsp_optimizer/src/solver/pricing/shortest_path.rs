use tracing::debug;

use crate::{
    problem::{
        travel_time_matrix::Time, vehicle_scheduling_problem::VehicleSchedulingProblem,
    },
    solver::{
        branching::arc_restriction::ArcRestriction,
        network::{
            arc_costs::ArcCosts,
            connection_network::{CnNode, ConnectionNetwork, NodeIdx},
        },
        route::{Route, RouteError},
    },
};

use super::label::{Label, LabelIdx};

/// Label-setting shortest path with a time resource on one depot network.
///
/// Nodes are scanned once, in topological order. Labels are kept in an arena
/// and link to their predecessor by index, labels evicted by dominance stay
/// in the arena so that the paths of surviving labels remain intact.
pub struct ShortestPathWithResources<'a> {
    problem: &'a VehicleSchedulingProblem,
    network: &'a ConnectionNetwork,
    labels: Vec<Label>,
    node_labels: Vec<Vec<LabelIdx>>,
}

impl<'a> ShortestPathWithResources<'a> {
    pub fn new(problem: &'a VehicleSchedulingProblem, network: &'a ConnectionNetwork) -> Self {
        Self {
            problem,
            network,
            labels: Vec::new(),
            node_labels: vec![Vec::new(); network.nodes().len()],
        }
    }

    pub fn compute_distances(&mut self, costs: &ArcCosts, restriction: &ArcRestriction) {
        self.labels.clear();
        self.node_labels.iter_mut().for_each(Vec::clear);

        let network = self.network;
        let depot = network.depot();
        let max_deviation = self.problem.max_deviation();
        let sink = network.sink();

        self.insert(Label::source(network.source()));

        for index in 0..sink.get() {
            let node_id = NodeIdx::new(index);
            let duration = match network.node(node_id) {
                CnNode::Trip(trip) => self.problem.trip(trip).duration(),
                CnNode::Source(_) | CnNode::Sink(_) => 0,
            };

            let bucket = std::mem::take(&mut self.node_labels[index]);

            for &label_id in bucket.iter() {
                let label = self.labels[label_id];
                let ready = label.time + duration;

                for &arc_id in network.outgoing(node_id) {
                    if restriction.is_forbidden(depot, arc_id) {
                        continue;
                    }

                    let arc = network.arc(arc_id);
                    let arrival = ready + arc.distance();
                    let Some(time) = self.arrival_time(arc.to(), arrival, max_deviation) else {
                        continue;
                    };

                    self.insert(Label {
                        node: network.node_index(arc.to()),
                        cost: label.cost + costs.cost(arc_id),
                        time,
                        predecessor: Some(label_id),
                        arc: Some(arc_id),
                    });
                }
            }

            self.node_labels[index] = bucket;
        }

        debug!(
            depot = depot.get(),
            labels = self.labels.len(),
            sink_labels = self.node_labels[sink.get()].len(),
            "pricing done"
        );
    }

    /// Virtual time at the head of an arc, `None` when the vehicle arrives
    /// after the latest departure of the head trip.
    #[inline(always)]
    fn arrival_time(&self, head: CnNode, arrival: Time, max_deviation: Time) -> Option<Time> {
        match head {
            CnNode::Trip(trip) => {
                let start = self.problem.trip(trip).start_time();
                if arrival > start + max_deviation {
                    None
                } else {
                    Some(arrival.max(start - max_deviation))
                }
            }
            CnNode::Source(_) | CnNode::Sink(_) => Some(arrival),
        }
    }

    /// Stores `label` unless a label of its node dominates it, and evicts the
    /// labels it dominates. Every label reaching the sink is kept.
    fn insert(&mut self, label: Label) -> bool {
        let node = label.node.get();

        if label.node != self.network.sink() {
            let labels = &self.labels;
            let bucket = &mut self.node_labels[node];

            if bucket
                .iter()
                .any(|&existing| labels[existing].dominates(&label))
            {
                return false;
            }

            bucket.retain(|&existing| !label.dominates(&labels[existing]));
        }

        let label_id = LabelIdx::new(self.labels.len());
        self.labels.push(label);
        self.node_labels[node].push(label_id);
        true
    }

    /// Cost of the cheapest source to sink path, 0 when the sink is not
    /// reachable.
    pub fn distance(&self) -> f64 {
        self.sink_labels()
            .map(|label| label.cost)
            .min_by(f64::total_cmp)
            .unwrap_or(0.0)
    }

    fn sink_labels(&self) -> impl Iterator<Item = &Label> {
        self.node_labels[self.network.sink().get()]
            .iter()
            .map(|&label_id| &self.labels[label_id])
    }

    /// Up to `max_routes` routes with a cost below `-epsilon`, cheapest first.
    pub fn best_routes(&self, max_routes: usize, epsilon: f64) -> Result<Vec<Route>, RouteError> {
        let mut candidates: Vec<LabelIdx> = self.node_labels[self.network.sink().get()]
            .iter()
            .copied()
            .filter(|&label_id| self.labels[label_id].cost < -epsilon)
            .collect();

        candidates.sort_by(|&a, &b| {
            self.labels[a]
                .cost
                .total_cmp(&self.labels[b].cost)
                .then(a.cmp(&b))
        });

        candidates
            .into_iter()
            .take(max_routes)
            .map(|label_id| self.route(label_id))
            .collect()
    }

    fn route(&self, label_id: LabelIdx) -> Result<Route, RouteError> {
        let mut trips = Vec::new();
        let mut arcs = Vec::new();
        let mut current = Some(label_id);

        while let Some(label_id) = current {
            let label = &self.labels[label_id];
            if let Some(arc) = label.arc {
                arcs.push(arc);
            }
            if let CnNode::Trip(trip) = self.network.node(label.node) {
                trips.push(trip);
            }
            current = label.predecessor;
        }

        trips.reverse();
        arcs.reverse();

        Route::new(self.problem, self.network.depot(), trips, arcs)
    }

    #[cfg(test)]
    pub(crate) fn labels_at(&self, node_id: NodeIdx) -> impl Iterator<Item = &Label> {
        self.node_labels[node_id.get()]
            .iter()
            .map(|&label_id| &self.labels[label_id])
    }
}
