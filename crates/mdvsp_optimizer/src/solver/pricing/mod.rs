pub mod label;
pub mod shortest_path;
