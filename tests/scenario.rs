use std::path::Path;

use trajcalc::models::IRoute;
use trajcalc::path_sampler::PathSampler;
use trajcalc::report::TrajectoryReport;
use trajcalc::scenario::{FirstLegPolicy, ScenarioConfig, ValidationMode};
use trajcalc::trajectory::TrajectoryEngine;

fn load_basic() -> ScenarioConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/basic.yaml");
    ScenarioConfig::from_file(path).expect("bundled scenario should load")
}

#[test]
fn bundled_scenario_is_valid() {
    let scenario = load_basic();
    assert_eq!(scenario.meta.name, "basic");
    assert_eq!(scenario.engine.mode, ValidationMode::Permissive);
    assert_eq!(scenario.engine.first_leg_policy, FirstLegPolicy::PassThrough);
    assert_eq!(
        scenario
            .route
            .waypoint_inputs(scenario.engine.waypoint_capacity)
            .len(),
        2
    );
}

#[test]
fn bundled_scenario_runs_end_to_end() {
    let scenario = load_basic();
    let engine = TrajectoryEngine::new(scenario.engine);
    let route = &scenario.route;

    let trajectory = engine
        .create_route(route.start, route.end, route.vehicle.to_attributes())
        .expect("route");
    let trajectory = engine
        .append_waypoints(
            &trajectory,
            route.waypoint_inputs(scenario.engine.waypoint_capacity),
        )
        .expect("waypoints");

    assert_eq!(trajectory.waypoint_count(), 2);
    assert_eq!(trajectory.legs().len(), 3);

    // 先頭ウェイポイントは素通しのため、合計は 始点→WP2→終点 の2区間分
    let geo = engine.geo();
    let positions = trajectory.get_waypoint_positions();
    let expected = geo.distance(&route.start, &positions[1]) + geo.distance(&positions[1], &route.end);
    assert!((trajectory.total_distance() - expected).abs() < 1e-9);

    let path = PathSampler::from_config(&scenario.engine).sample_path(&trajectory);
    assert_eq!(path.len(), 300);

    let json = TrajectoryReport::new(&trajectory, &path)
        .to_json_string()
        .expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
    assert_eq!(value["waypoints"].as_array().map(Vec::len), Some(2));
}

#[test]
fn accounting_first_leg_increases_totals() {
    let mut scenario = load_basic();
    let route = scenario.route.clone();
    let inputs = route.waypoint_inputs(scenario.engine.waypoint_capacity);

    let run = |config| {
        let engine = TrajectoryEngine::new(config);
        let trajectory = engine
            .create_route(route.start, route.end, route.vehicle.to_attributes())
            .expect("route");
        engine
            .append_waypoints(&trajectory, inputs.clone())
            .expect("waypoints")
    };

    let pass_through = run(scenario.engine);
    scenario.engine.first_leg_policy = FirstLegPolicy::Accounted;
    let accounted = run(scenario.engine);

    assert!(accounted.total_distance() > pass_through.total_distance());
    assert!(accounted.waypoints()[0].is_accounted());
    assert!(!pass_through.waypoints()[0].is_accounted());
}
