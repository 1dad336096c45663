pub mod clarabel_lp;
pub mod duals;
pub mod lp_solver;
pub mod master_problem;
