pub mod location;
pub mod problem_error;
pub mod travel_time_matrix;
pub mod trip;
pub mod vehicle_scheduling_problem;
