use super::{location::LocationIdx, problem_error::ProblemError};

/// Minutes since the start of the planning day.
pub type Time = i64;
pub type Cost = f64;

/// Asymmetric deadhead travel times in minutes.
///
/// The matrix uses a flat structure, the entry of a pair of locations is at
/// `index = from * num_locations + to`.
#[derive(Debug, Clone)]
pub struct TravelTimeMatrix {
    times: Vec<Time>,
    num_locations: usize,
    is_symmetric: bool,
}

fn is_flat_matrix_symmetric(matrix: &[Time], num_locations: usize) -> bool {
    for i in 0..num_locations {
        for j in (i + 1)..num_locations {
            if matrix[i * num_locations + j] != matrix[j * num_locations + i] {
                return false;
            }
        }
    }
    true
}

impl TravelTimeMatrix {
    pub fn new(times: Vec<Vec<Time>>) -> Result<Self, ProblemError> {
        let num_locations = times.len();

        for (row, values) in times.iter().enumerate() {
            if values.len() != num_locations {
                return Err(ProblemError::NonSquareMatrix {
                    row,
                    len: values.len(),
                    expected: num_locations,
                });
            }
        }

        Self::from_flat(times.into_iter().flatten().collect(), num_locations)
    }

    pub fn from_flat(times: Vec<Time>, num_locations: usize) -> Result<Self, ProblemError> {
        if times.len() != num_locations * num_locations {
            return Err(ProblemError::MatrixSizeMismatch {
                matrix: times.len().isqrt(),
                locations: num_locations,
            });
        }

        if let Some(index) = times.iter().position(|&time| time < 0) {
            return Err(ProblemError::NegativeTravelTime {
                from: index / num_locations,
                to: index % num_locations,
            });
        }

        let is_symmetric = is_flat_matrix_symmetric(&times, num_locations);

        Ok(Self {
            times,
            num_locations,
            is_symmetric,
        })
    }

    #[inline(always)]
    pub fn travel_time(&self, from: LocationIdx, to: LocationIdx) -> Time {
        self.times[from.get() * self.num_locations + to.get()]
    }

    pub fn num_locations(&self) -> usize {
        self.num_locations
    }

    pub fn is_symmetric(&self) -> bool {
        self.is_symmetric
    }
}
