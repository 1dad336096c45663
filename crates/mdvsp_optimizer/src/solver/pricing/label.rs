use crate::{
    define_index_newtype,
    problem::travel_time_matrix::Time,
    solver::network::connection_network::{ArcIdx, NodeIdx},
};

define_index_newtype!(LabelIdx, Label);

/// Partial path from the source to `node`.
///
/// `time` is the earliest feasible virtual time at which the vehicle is at
/// `node`: the departure time for trip nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Label {
    pub node: NodeIdx,
    pub cost: f64,
    pub time: Time,
    pub predecessor: Option<LabelIdx>,
    pub arc: Option<ArcIdx>,
}

impl Label {
    pub fn source(node: NodeIdx) -> Self {
        Self {
            node,
            cost: 0.0,
            time: 0,
            predecessor: None,
            arc: None,
        }
    }

    /// A label dominates another one when it is neither more expensive nor
    /// later.
    #[inline(always)]
    pub fn dominates(&self, other: &Label) -> bool {
        self.cost <= other.cost && self.time <= other.time
    }
}
