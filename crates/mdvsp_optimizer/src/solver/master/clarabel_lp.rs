use clarabel::{algebra::CscMatrix, solver::*};
use tracing::{debug, warn};

use super::lp_solver::{ColumnId, LpError, LpSolver, LpStatus};

struct LpColumn {
    cost: f64,
    rows: Vec<usize>,
}

enum LpOutcome {
    Optimal {
        objective: f64,
        primal: Vec<f64>,
        duals: Vec<f64>,
    },
    Infeasible {
        farkas: Vec<f64>,
    },
}

/// `LpSolver` backed by the clarabel interior point solver.
///
/// The covering LP `min c'x, Ax = 1, x >= 0` is passed as the conic program
/// `Ax + s = 1, s in {0}` and `-x + s = 0, s >= 0`. The duals of the equality
/// rows are the negated cone duals, both for optimal solutions and for
/// infeasibility certificates.
pub struct ClarabelLpSolver {
    settings: DefaultSettings<f64>,
    num_rows: usize,
    columns: Vec<Option<LpColumn>>,
    outcome: Option<LpOutcome>,
}

impl Default for ClarabelLpSolver {
    fn default() -> Self {
        Self::with_settings(DefaultSettings {
            verbose: false,
            ..DefaultSettings::default()
        })
    }
}

impl ClarabelLpSolver {
    pub fn with_settings(settings: DefaultSettings<f64>) -> Self {
        Self {
            settings,
            num_rows: 0,
            columns: Vec::new(),
            outcome: None,
        }
    }

    pub fn num_columns(&self) -> usize {
        self.columns.iter().filter(|column| column.is_some()).count()
    }

    fn solve_active(&self, active: &[(usize, &LpColumn)]) -> Result<LpOutcome, LpError> {
        let m = self.num_rows;
        let n = active.len();

        if m == 0 {
            return Ok(LpOutcome::Optimal {
                objective: 0.0,
                primal: vec![0.0; self.columns.len()],
                duals: Vec::new(),
            });
        }

        if n == 0 {
            return Ok(LpOutcome::Infeasible {
                farkas: vec![1.0; m],
            });
        }

        let mut colptr = Vec::with_capacity(n + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        colptr.push(0);
        for (position, (_, column)) in active.iter().enumerate() {
            for &row in column.rows.iter() {
                rowval.push(row);
                nzval.push(1.0);
            }
            rowval.push(m + position);
            nzval.push(-1.0);
            colptr.push(rowval.len());
        }

        let a = CscMatrix::new(m + n, n, colptr, rowval, nzval);
        let p = CscMatrix::new(n, n, vec![0; n + 1], Vec::new(), Vec::new());
        let q: Vec<f64> = active.iter().map(|(_, column)| column.cost).collect();
        let mut b = vec![1.0; m];
        b.resize(m + n, 0.0);
        let cones = [
            SupportedConeT::ZeroConeT(m),
            SupportedConeT::NonnegativeConeT(n),
        ];

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, self.settings.clone());
        solver.solve();

        let solution = &solver.solution;
        let row_duals = || solution.z[..m].iter().map(|z| -z).collect::<Vec<f64>>();

        match solution.status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {
                let mut primal = vec![0.0; self.columns.len()];
                for (position, &(index, _)) in active.iter().enumerate() {
                    primal[index] = solution.x[position];
                }

                Ok(LpOutcome::Optimal {
                    objective: solution.obj_val,
                    primal,
                    duals: row_duals(),
                })
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                Ok(LpOutcome::Infeasible {
                    farkas: normalized(row_duals()),
                })
            }
            status => {
                warn!("clarabel stopped with status {:?}", status);
                Err(LpError::Numerical(format!("{status:?}")))
            }
        }
    }
}

/// Scales a certificate to a largest component of 1.
fn normalized(mut certificate: Vec<f64>) -> Vec<f64> {
    let scale = certificate.iter().fold(0.0_f64, |max, value| max.max(value.abs()));
    if scale > 0.0 {
        certificate.iter_mut().for_each(|value| *value /= scale);
    }
    certificate
}

impl LpSolver for ClarabelLpSolver {
    fn reset(&mut self, num_rows: usize) {
        self.num_rows = num_rows;
        self.columns.clear();
        self.outcome = None;
    }

    fn add_column(&mut self, cost: f64, rows: &[usize]) -> ColumnId {
        let mut rows = rows.to_vec();
        rows.sort_unstable();
        rows.dedup();

        self.columns.push(Some(LpColumn { cost, rows }));
        ColumnId::new(self.columns.len() - 1)
    }

    fn remove_column(&mut self, column: ColumnId) -> Result<(), LpError> {
        match self.columns.get_mut(column.get()) {
            Some(slot @ Some(_)) => {
                *slot = None;
                Ok(())
            }
            _ => Err(LpError::UnknownColumn(column)),
        }
    }

    fn solve(&mut self) -> Result<LpStatus, LpError> {
        let active: Vec<(usize, &LpColumn)> = self
            .columns
            .iter()
            .enumerate()
            .filter_map(|(index, column)| column.as_ref().map(|column| (index, column)))
            .collect();

        debug!(rows = self.num_rows, columns = active.len(), "solving master LP");

        let outcome = self.solve_active(&active)?;
        let status = match outcome {
            LpOutcome::Optimal { .. } => LpStatus::Optimal,
            LpOutcome::Infeasible { .. } => LpStatus::Infeasible,
        };

        self.outcome = Some(outcome);
        Ok(status)
    }

    fn objective_value(&self) -> Result<f64, LpError> {
        match &self.outcome {
            Some(LpOutcome::Optimal { objective, .. }) => Ok(*objective),
            _ => Err(LpError::NoSolution("objective value")),
        }
    }

    fn primal_value(&self, column: ColumnId) -> Result<f64, LpError> {
        match &self.outcome {
            Some(LpOutcome::Optimal { primal, .. }) => primal
                .get(column.get())
                .copied()
                .ok_or(LpError::UnknownColumn(column)),
            _ => Err(LpError::NoSolution("primal values")),
        }
    }

    fn duals(&self) -> Result<Vec<f64>, LpError> {
        match &self.outcome {
            Some(LpOutcome::Optimal { duals, .. }) => Ok(duals.clone()),
            _ => Err(LpError::NoSolution("dual values")),
        }
    }

    fn farkas_duals(&self) -> Result<Vec<f64>, LpError> {
        match &self.outcome {
            Some(LpOutcome::Infeasible { farkas }) => Ok(farkas.clone()),
            _ => Err(LpError::NoSolution("infeasibility certificate")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_covering_lp() {
        let mut lp = ClarabelLpSolver::default();
        lp.reset(2);
        let both = lp.add_column(3.0, &[0, 1]);
        let first = lp.add_column(2.0, &[0]);
        let second = lp.add_column(2.0, &[1]);

        assert_eq!(lp.solve().unwrap(), LpStatus::Optimal);
        assert!((lp.objective_value().unwrap() - 3.0).abs() < 1e-6);
        assert!((lp.primal_value(both).unwrap() - 1.0).abs() < 1e-6);
        assert!(lp.primal_value(first).unwrap().abs() < 1e-6);
        assert!(lp.primal_value(second).unwrap().abs() < 1e-6);

        let duals = lp.duals().unwrap();
        assert!((duals[0] + duals[1] - 3.0).abs() < 1e-6);
        assert!(duals[0] <= 2.0 + 1e-6);
        assert!(duals[1] <= 2.0 + 1e-6);
    }

    #[test]
    fn test_single_column_dual() {
        let mut lp = ClarabelLpSolver::default();
        lp.reset(1);
        lp.add_column(3.0, &[0]);

        assert_eq!(lp.solve().unwrap(), LpStatus::Optimal);
        assert!((lp.duals().unwrap()[0] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_lp_has_farkas_certificate() {
        let mut lp = ClarabelLpSolver::default();
        lp.reset(2);
        lp.add_column(1.0, &[0]);

        assert_eq!(lp.solve().unwrap(), LpStatus::Infeasible);

        let farkas = lp.farkas_duals().unwrap();
        assert!(farkas[0] + farkas[1] > 0.0);
        assert!(farkas[0] <= 1e-6 * farkas[1]);
        assert!((farkas[1] - 1.0).abs() < 1e-9);
        assert!(lp.duals().is_err());
    }

    #[test]
    fn test_removed_columns_are_ignored() {
        let mut lp = ClarabelLpSolver::default();
        lp.reset(1);
        let cheap = lp.add_column(1.0, &[0]);
        let expensive = lp.add_column(5.0, &[0]);
        lp.remove_column(cheap).unwrap();

        assert_eq!(lp.solve().unwrap(), LpStatus::Optimal);
        assert!((lp.objective_value().unwrap() - 5.0).abs() < 1e-6);
        assert!((lp.primal_value(expensive).unwrap() - 1.0).abs() < 1e-6);
        assert!(lp.remove_column(cheap).is_err());
    }

    #[test]
    fn test_empty_lp_is_infeasible() {
        let mut lp = ClarabelLpSolver::default();
        lp.reset(3);

        assert_eq!(lp.solve().unwrap(), LpStatus::Infeasible);
        assert_eq!(lp.farkas_duals().unwrap(), vec![1.0; 3]);
    }
}
