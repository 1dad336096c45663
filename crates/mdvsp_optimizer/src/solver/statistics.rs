use jiff::SignedDuration;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BranchAndPriceStatistics {
    root_bound: Option<f64>,
    lower_bound: f64,
    upper_bound: Option<f64>,

    time_total: SignedDuration,
    time_root: SignedDuration,
    time_master: SignedDuration,
    time_pricing: SignedDuration,

    nodes_solved: usize,
    nodes_pruned: usize,
    max_depth: usize,
    columns_generated: usize,
    columns_removed: usize,
}

impl Default for BranchAndPriceStatistics {
    fn default() -> Self {
        Self {
            root_bound: None,
            lower_bound: 0.0,
            upper_bound: None,
            time_total: SignedDuration::ZERO,
            time_root: SignedDuration::ZERO,
            time_master: SignedDuration::ZERO,
            time_pricing: SignedDuration::ZERO,
            nodes_solved: 0,
            nodes_pruned: 0,
            max_depth: 0,
            columns_generated: 0,
            columns_removed: 0,
        }
    }
}

impl BranchAndPriceStatistics {
    /// LP bound of the root node, once it has been solved.
    pub fn root_bound(&self) -> Option<f64> {
        self.root_bound
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    /// Cost of the best integral schedule found.
    pub fn upper_bound(&self) -> Option<f64> {
        self.upper_bound
    }

    pub fn gap(&self) -> Option<f64> {
        self.upper_bound.map(|upper_bound| upper_bound - self.lower_bound)
    }

    pub fn time_total(&self) -> SignedDuration {
        self.time_total
    }

    pub fn time_root(&self) -> SignedDuration {
        self.time_root
    }

    pub fn time_master(&self) -> SignedDuration {
        self.time_master
    }

    pub fn time_pricing(&self) -> SignedDuration {
        self.time_pricing
    }

    pub fn nodes_solved(&self) -> usize {
        self.nodes_solved
    }

    pub fn nodes_pruned(&self) -> usize {
        self.nodes_pruned
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn columns_generated(&self) -> usize {
        self.columns_generated
    }

    pub fn columns_removed(&self) -> usize {
        self.columns_removed
    }

    pub(crate) fn set_root(&mut self, bound: f64, time: SignedDuration) {
        self.root_bound = Some(bound);
        self.time_root = time;
    }

    pub(crate) fn set_lower_bound(&mut self, lower_bound: f64) {
        self.lower_bound = lower_bound;
    }

    pub(crate) fn set_upper_bound(&mut self, upper_bound: f64) {
        self.upper_bound = Some(upper_bound);
    }

    pub(crate) fn set_time_total(&mut self, time: SignedDuration) {
        self.time_total = time;
    }

    pub(crate) fn add_master_time(&mut self, time: SignedDuration) {
        self.time_master += time;
    }

    pub(crate) fn add_pricing_time(&mut self, time: SignedDuration) {
        self.time_pricing += time;
    }

    pub(crate) fn add_solved_node(&mut self, depth: usize) {
        self.nodes_solved += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    pub(crate) fn add_pruned_node(&mut self) {
        self.nodes_pruned += 1;
    }

    pub(crate) fn add_generated_columns(&mut self, count: usize) {
        self.columns_generated += count;
    }

    pub(crate) fn add_removed_columns(&mut self, count: usize) {
        self.columns_removed += count;
    }
}
