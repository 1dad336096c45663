pub mod arc_restriction;
pub mod bnp_node;
pub mod branch_candidate;
pub mod branching_rule;
pub mod forbidden_arcs;
