use super::connection_network::ArcIdx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingMode {
    /// Reduced costs against the duals of a feasible master.
    Optimality,
    /// Costs against a Farkas certificate of an infeasible master.
    Feasibility,
}

/// Search costs of every arc of one network for a single pricing call.
#[derive(Debug, Clone)]
pub struct ArcCosts(Vec<f64>);

impl ArcCosts {
    pub fn new(costs: Vec<f64>) -> Self {
        Self(costs)
    }

    #[inline(always)]
    pub fn cost(&self, arc: ArcIdx) -> f64 {
        self.0[arc.get()]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
