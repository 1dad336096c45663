use thiserror::Error;

use crate::define_index_newtype;

define_index_newtype!(ColumnId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    Optimal,
    Infeasible,
}

#[derive(Debug, Error)]
pub enum LpError {
    #[error("LP solver stopped with status {0}")]
    Numerical(String),
    #[error("the LP has no {0}, it was not solved or has a different status")]
    NoSolution(&'static str),
    #[error("unknown LP column {0}")]
    UnknownColumn(ColumnId),
}

/// Linear programming collaborator of the master problem.
///
/// The LP has one equality row `= 1` per covered item and one non-negative
/// column per added variable, and is minimized.
pub trait LpSolver {
    /// Drops every column and sets the number of covering rows.
    fn reset(&mut self, num_rows: usize);

    /// Adds a column with coefficient 1 in every row of `rows`.
    fn add_column(&mut self, cost: f64, rows: &[usize]) -> ColumnId;

    fn remove_column(&mut self, column: ColumnId) -> Result<(), LpError>;

    fn solve(&mut self) -> Result<LpStatus, LpError>;

    fn objective_value(&self) -> Result<f64, LpError>;

    fn primal_value(&self, column: ColumnId) -> Result<f64, LpError>;

    /// Optimal dual value of every row, in the convention where the reduced
    /// cost of a column is `cost - sum(duals of its rows)`.
    fn duals(&self) -> Result<Vec<f64>, LpError>;

    /// Certificate `y` of an infeasible LP: `sum(y) > 0` and the sum of `y`
    /// over the rows of every column is at most zero.
    fn farkas_duals(&self) -> Result<Vec<f64>, LpError>;
}
