mod common;

use std::sync::Arc;
use std::time::Duration;

use blockpath_lib::{FailureReason, PathOutcome, Pathfinder, PathfinderConfig, Position};

use common::{open_world, OVERWORLD};

#[tokio::test]
async fn mismatched_domains_are_rejected_without_searching() {
    let world = Arc::new(open_world());
    let pathfinder = Pathfinder::new(world.clone());

    let start = Position::new(OVERWORLD, 0.0, 64.0, 0.0);
    let target = Position::new(blockpath_lib::Domain::new(2), 5.0, 64.0, 0.0);

    let result = pathfinder.find_path(start, target).await;

    assert_eq!(result.outcome, PathOutcome::Failed);
    assert_eq!(result.reason, Some(FailureReason::InvalidInput));
    assert!(result.path.is_empty());
    assert_eq!(world.query_count(), 0);
}

#[tokio::test]
async fn non_finite_coordinates_are_rejected_without_searching() {
    let world = Arc::new(open_world());
    let pathfinder = Pathfinder::new(world.clone());

    let start = Position::new(OVERWORLD, f64::NAN, 64.0, 0.0);
    let target = Position::new(OVERWORLD, 5.0, 64.0, 0.0);

    let result = pathfinder.find_path(start, target).await;

    assert_eq!(result.reason, Some(FailureReason::InvalidInput));
    assert_eq!(world.query_count(), 0);

    let infinite = Position::new(OVERWORLD, 0.0, f64::INFINITY, 0.0);
    let result = pathfinder.find_path(infinite, target).await;
    assert_eq!(result.reason, Some(FailureReason::InvalidInput));
}

#[tokio::test]
async fn cancellation_resolves_and_releases_snapshots() {
    let world = Arc::new(open_world());
    let config = PathfinderConfig::default().with_max_iterations(10_000_000);
    let pathfinder = Pathfinder::with_config(world.clone(), config);

    let start = Position::new(OVERWORLD, 0.0, 64.0, 0.0);
    let target = Position::new(OVERWORLD, 1000.0, 64.0, 1000.0);

    let task = pathfinder.find_path(start, target);
    task.cancel();
    let result = task.await;

    assert_eq!(result.outcome, PathOutcome::Failed);
    assert_eq!(result.reason, Some(FailureReason::Cancelled));
    assert!(result.path.is_empty());
    // A resolved search holds no snapshots any more.
    assert_eq!(world.outstanding_snapshots(), 0);
}

#[tokio::test]
async fn exhausted_iteration_budget_times_out() {
    let world = Arc::new(open_world());
    let config = PathfinderConfig::default().with_max_iterations(25);
    let pathfinder = Pathfinder::with_config(world, config);

    let start = Position::new(OVERWORLD, 0.0, 64.0, 0.0);
    let target = Position::new(OVERWORLD, 60.0, 64.0, 60.0);

    let result = pathfinder.find_path(start, target).await;

    assert_eq!(result.outcome, PathOutcome::Failed);
    assert_eq!(result.reason, Some(FailureReason::Timeout));
    assert!(result.path.is_empty());
}

#[tokio::test]
async fn partial_results_survive_a_timeout() {
    let world = Arc::new(open_world());
    let config = PathfinderConfig::default()
        .with_max_iterations(25)
        .with_partial_results(true);
    let pathfinder = Pathfinder::with_config(world, config);

    let start = Position::new(OVERWORLD, 0.0, 64.0, 0.0);
    let target = Position::new(OVERWORLD, 60.0, 64.0, 60.0);

    let result = pathfinder.find_path(start, target).await;

    assert_eq!(result.outcome, PathOutcome::Partial);
    assert_eq!(result.reason, Some(FailureReason::Timeout));
    assert!(result.has_path());
    assert!(!result.is_found());
    assert!(result.path[0].is_in_same_block(&start));
}

#[tokio::test]
async fn wall_clock_budget_times_out() {
    let world = Arc::new(open_world());
    let config = PathfinderConfig::default()
        .with_max_iterations(u64::MAX / 2)
        .with_timeout(Duration::from_millis(1));
    let pathfinder = Pathfinder::with_config(world, config);

    let start = Position::new(OVERWORLD, 0.0, 64.0, 0.0);
    let target = Position::new(OVERWORLD, 5000.0, 64.0, 5000.0);

    let result = pathfinder.find_path(start, target).await;

    assert_eq!(result.outcome, PathOutcome::Failed);
    assert_eq!(result.reason, Some(FailureReason::Timeout));
}
