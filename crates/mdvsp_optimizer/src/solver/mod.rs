pub mod branch_and_price;
pub mod branching;
pub mod master;
pub mod network;
pub mod pricing;
pub mod route;
pub mod schedule;
pub mod solver_error;
pub mod solver_params;
pub mod statistics;
