use crate::problem::trip::TripIdx;

/// Dual value of every trip covering row, indexed by trip.
///
/// Either the optimal duals of a feasible master or a Farkas certificate of
/// an infeasible one.
#[derive(Debug, Clone, PartialEq)]
pub struct Duals(Vec<f64>);

impl Duals {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    #[inline(always)]
    pub fn dual(&self, trip: TripIdx) -> f64 {
        self.0[trip.get()]
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}
