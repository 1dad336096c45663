use jiff::SignedDuration;
use mdvsp_optimizer::{
    problem::trip::TripIdx,
    solver::{
        branch_and_price::{BranchAndPrice, SearchStatus},
        branching::branching_rule::BranchingRule,
        solver_params::BranchAndPriceParams,
    },
};

mod test_utils;

use test_utils::trip;

#[test]
fn test_chain_is_covered_by_one_vehicle() {
    let problem = test_utils::create_chain_problem();
    let mut solver = BranchAndPrice::new(problem.clone(), BranchAndPriceParams::default());

    let status = solver.run().unwrap();

    assert_eq!(status, SearchStatus::Optimal);
    assert_eq!(solver.upper_bound(), 1020.0);

    let schedule = solver.best_schedule().unwrap();
    schedule.validate(&problem).unwrap();
    assert_eq!(schedule.num_vehicles(), 1);
    assert_eq!(
        schedule.routes()[0].trips(),
        &[TripIdx::new(0), TripIdx::new(1), TripIdx::new(2)]
    );
    assert_eq!(schedule.routes()[0].departures(), &[95, 165, 235]);
    assert_eq!(schedule.total_deviation(&problem), 15);

    let statistics = solver.statistics();
    assert_eq!(statistics.nodes_solved(), 1);
    assert!((statistics.root_bound().unwrap() - 1020.0).abs() < 1e-4);
    assert_eq!(statistics.lower_bound(), 1020.0);
}

#[test]
fn test_triangle_needs_branching() {
    let problem = test_utils::create_triangle_problem(1);
    let mut solver = BranchAndPrice::new(problem.clone(), BranchAndPriceParams::default());

    let status = solver.run().unwrap();

    assert_eq!(status, SearchStatus::Optimal);
    assert_eq!(solver.upper_bound(), 2050.0);
    assert!(solver.lower_bound() > solver.upper_bound() - 1.0);

    let schedule = solver.best_schedule().unwrap();
    schedule.validate(&problem).unwrap();
    assert_eq!(schedule.num_vehicles(), 2);

    let statistics = solver.statistics();
    assert!((statistics.root_bound().unwrap() - 1545.0).abs() < 1e-3);
    assert!(statistics.nodes_solved() > 1);
    assert!(statistics.max_depth() >= 1);
}

#[test]
fn test_triangle_with_identical_depots() {
    let problem = test_utils::create_triangle_problem(2);
    let mut solver = BranchAndPrice::new(problem.clone(), BranchAndPriceParams::default());

    assert_eq!(solver.run().unwrap(), SearchStatus::Optimal);
    assert_eq!(solver.upper_bound(), 2050.0);

    let schedule = solver.best_schedule().unwrap();
    schedule.validate(&problem).unwrap();
    assert_eq!(schedule.vehicles_per_depot(2).iter().sum::<usize>(), 2);
}

#[test]
fn test_parallel_pricing_finds_same_optimum() {
    let problem = test_utils::create_triangle_problem(2);
    let params = BranchAndPriceParams {
        parallel_pricing: true,
        ..BranchAndPriceParams::default()
    };
    let mut solver = BranchAndPrice::new(problem, params);

    assert_eq!(solver.run().unwrap(), SearchStatus::Optimal);
    assert_eq!(solver.upper_bound(), 2050.0);
}

#[test]
fn test_arc_branching_only() {
    let problem = test_utils::create_triangle_problem(2);
    let params = BranchAndPriceParams {
        branching_rules: vec![BranchingRule::MostFractionalArc],
        ..BranchAndPriceParams::default()
    };
    let mut solver = BranchAndPrice::new(problem.clone(), params);

    assert_eq!(solver.run().unwrap(), SearchStatus::Optimal);
    assert_eq!(solver.upper_bound(), 2050.0);
    solver.best_schedule().unwrap().validate(&problem).unwrap();
}

#[test]
fn test_column_management_keeps_optimum() {
    let problem = test_utils::create_triangle_problem(1);
    let params = BranchAndPriceParams {
        column_management_period: 2,
        max_reduced_cost: 1.0,
        ..BranchAndPriceParams::default()
    };
    let mut solver = BranchAndPrice::new(problem.clone(), params);

    assert_eq!(solver.run().unwrap(), SearchStatus::Optimal);
    assert_eq!(solver.upper_bound(), 2050.0);
    solver.best_schedule().unwrap().validate(&problem).unwrap();

    // the single trip columns are idle once the pairs are priced in
    let statistics = solver.statistics();
    assert!(statistics.columns_removed() > 0);
    assert!((statistics.root_bound().unwrap() - 1545.0).abs() < 1e-3);
}

#[test]
fn test_far_depot_is_not_used() {
    // Depot 1 is 100 minutes away from everything.
    let problem = test_utils::create_test_problem(
        2,
        2,
        |from, to| if from == 1 || to == 1 { 100 } else { 10 },
        vec![trip(0, 100, 1, 150), trip(1, 170, 0, 220), trip(0, 240, 1, 290)],
        5,
    );
    let mut solver = BranchAndPrice::new(problem.clone(), BranchAndPriceParams::default());

    assert_eq!(solver.run().unwrap(), SearchStatus::Optimal);
    assert_eq!(solver.upper_bound(), 1020.0);
    assert_eq!(
        solver.best_schedule().unwrap().vehicles_per_depot(2),
        vec![1, 0]
    );
}

#[test]
fn test_uncoverable_trip_is_infeasible() {
    let problem =
        test_utils::create_test_problem(1, 1, |_, _| 10, vec![trip(0, 5, 0, 50)], 0);
    let mut solver = BranchAndPrice::new(problem, BranchAndPriceParams::default());

    assert_eq!(solver.run().unwrap(), SearchStatus::Infeasible);
    assert!(solver.best_schedule().is_none());
    assert_eq!(solver.upper_bound(), f64::INFINITY);
}

#[test]
fn test_time_limit_stops_search() {
    let problem = test_utils::create_triangle_problem(1);
    let params = BranchAndPriceParams {
        time_limit: SignedDuration::ZERO,
        ..BranchAndPriceParams::default()
    };
    let mut solver = BranchAndPrice::new(problem, params);

    assert_eq!(solver.run().unwrap(), SearchStatus::TimeLimit);
    assert!(solver.best_schedule().is_none());
    assert_eq!(solver.status(), SearchStatus::TimeLimit);
}

#[test]
fn test_no_trips() {
    let problem = test_utils::create_test_problem(1, 1, |_, _| 10, Vec::new(), 0);
    let mut solver = BranchAndPrice::new(problem, BranchAndPriceParams::default());

    assert_eq!(solver.run().unwrap(), SearchStatus::Optimal);
    assert_eq!(solver.upper_bound(), 0.0);
    assert_eq!(solver.best_schedule().unwrap().num_vehicles(), 0);
}
