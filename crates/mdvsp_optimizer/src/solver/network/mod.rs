pub mod arc_costs;
pub mod connection_network;
