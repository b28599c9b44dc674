use std::sync::Arc;
use std::thread;

use bugnav::prelude::*;
use bugnav::scenario::rand::{draw_field, FieldCfg, ReplayToken};
use nalgebra::vector;

fn square() -> Vec<Vec<[f64; 2]>> {
    vec![vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]]
}

/// Square ring around the origin with a slot too narrow for the robot.
fn slotted_ring() -> Vec<Vec<[f64; 2]>> {
    vec![vec![
        [3.0, 0.05],
        [3.0, 3.0],
        [-3.0, 3.0],
        [-3.0, -3.0],
        [3.0, -3.0],
        [3.0, -0.05],
        [2.0, -0.05],
        [2.0, -2.0],
        [-2.0, -2.0],
        [-2.0, 2.0],
        [2.0, 2.0],
        [2.0, 0.05],
    ]]
}

/// Both triangles straddle the line y = 0.
fn two_triangles() -> Vec<Vec<[f64; 2]>> {
    vec![
        vec![[-2.0, -1.0], [-1.0, -1.0], [-1.5, 1.0]],
        vec![[1.0, -1.5], [2.0, -1.5], [1.5, 0.3]],
    ]
}

fn scenario(
    obstacles: Vec<Vec<[f64; 2]>>,
    start: [f64; 2],
    goal: [f64; 2],
    policy: PolicyKind,
) -> Scenario {
    let mut s = Scenario::new(obstacles, 0.1, start, goal);
    s.config = NavConfig::default().with_policy(policy);
    s
}

fn assert_clear(obstacles: &ObstacleSet, path: &Path, label: &str) {
    let c = obstacles.clearance();
    for p in path.points() {
        assert!(obstacles.clearance_at(*p) >= c - 1e-6, "{label}: {p:?}");
    }
}

#[test]
fn square_exhaustive_reaches_goal() {
    let s = scenario(square(), [-3.0, 1.0], [5.0, 1.0], PolicyKind::A);
    let mut session = s.session().unwrap();
    let mut modes = vec![session.mode()];
    let mut end = None;
    for _ in 0..5000 {
        let ev = session.step();
        if modes.last() != Some(&session.mode()) {
            modes.push(session.mode());
        }
        if ev.is_terminal() {
            end = Some(ev);
            break;
        }
    }
    assert_eq!(
        modes,
        vec![Mode::Seeking, Mode::Following, Mode::Seeking, Mode::Succeeded]
    );
    match end {
        Some(Event::Succeeded(p)) => assert!((p - vector![5.0, 1.0]).norm() <= 0.1),
        other => panic!("expected success, got {other:?}"),
    }
    assert_eq!(session.episodes(), 1);
    // left from the far side of the square
    let leave = session.leave_candidate().unwrap();
    assert!((leave - vector![2.1, 1.0]).norm() < 0.06, "leave at {leave:?}");
}

#[test]
fn ring_around_goal_fails_with_mline() {
    let s = scenario(slotted_ring(), [6.0, 0.0], [0.0, 0.0], PolicyKind::B);
    let mut session = s.session().unwrap();
    let mut path = Path::new();
    let summary = drive(&mut session, &mut path, 5000);
    assert_eq!(summary.outcome, Outcome::Failed(FailureReason::GoalUnreachable));
    assert_eq!(session.mode(), Mode::Failed);
    assert!(summary.steps < 5000);
    // the walk stayed outside the slot
    assert!(path.points().iter().all(|p| p.x > 2.9 || p.x.abs() > 3.0 || p.y.abs() > 3.0));
}

#[test]
fn ring_around_goal_fails_with_exhaustive() {
    let s = scenario(slotted_ring(), [6.0, 0.0], [0.0, 0.0], PolicyKind::A);
    let mut session = s.session().unwrap();
    let summary = drive(&mut session, &mut Path::new(), 5000);
    assert_eq!(summary.outcome, Outcome::Failed(FailureReason::GoalUnreachable));
    assert_eq!(summary.episodes, 1);
}

#[test]
fn triangles_tangent_reaches_goal() {
    let mut s = scenario(two_triangles(), [-5.0, 0.0], [5.0, 0.0], PolicyKind::C);
    s.config.sensor.max_range = 3.0;
    let mut session = s.session().unwrap();
    let mut path = Path::new();
    let summary = drive(&mut session, &mut path, 5000);
    assert!(summary.outcome.is_success(), "{summary:?}");
    // leaving the first triangle may already clear the second one
    assert!((1..=2).contains(&summary.episodes), "{summary:?}");
    assert_clear(&s.obstacle_set().unwrap(), &path, "tangent");
}

#[test]
fn triangles_mline_meets_both() {
    let s = scenario(two_triangles(), [-5.0, 0.0], [5.0, 0.0], PolicyKind::B);
    let mut session = s.session().unwrap();
    let mut path = Path::new();
    let summary = drive(&mut session, &mut path, 5000);
    assert!(summary.outcome.is_success(), "{summary:?}");
    assert_eq!(summary.episodes, 2);
    // last leave on the far side of the second triangle
    let leave = session.leave_candidate().unwrap();
    assert!(leave.x > 1.6 && leave.y.abs() < 1e-9, "leave at {leave:?}");
    assert_clear(&s.obstacle_set().unwrap(), &path, "mline");
}

#[test]
fn mline_leaves_at_full_clearance_past_a_corner() {
    // the tip sits just below the M-line, so the walk rounds it on an arc
    let obstacles = vec![vec![[1.0, -1.0], [3.0, -0.01], [1.0, 1.0]]];
    let s = scenario(obstacles, [-4.0, 0.0], [6.0, 0.0], PolicyKind::B);
    let set = s.obstacle_set().unwrap();
    let mut session = s.session().unwrap();
    let mut path = Path::new();
    let summary = drive(&mut session, &mut path, 5000);
    assert!(summary.outcome.is_success(), "{summary:?}");
    assert_eq!(summary.episodes, 1);
    let leave = session.leave_candidate().unwrap();
    let expect = vector![3.0 + (0.01f64 - 0.0001).sqrt(), 0.0];
    assert!((leave - expect).norm() < 1e-9, "leave at {leave:?}");
    assert!(set.clearance_at(leave) >= 0.1 - 1e-9);
    assert_clear(&set, &path, "corner");
}

#[test]
fn mline_leaves_thin_wall_at_coarse_step() {
    let wall = vec![vec![[0.0, -1.0], [0.1, -1.0], [0.1, 1.0], [0.0, 1.0]]];
    let mut s = scenario(wall, [-3.15, 0.0], [3.0, 0.0], PolicyKind::B);
    s.config.step_size = 0.5;
    s.config.tolerance = 0.2;
    let mut session = s.session().unwrap();
    let mut path = Path::new();
    let summary = drive(&mut session, &mut path, 5000);
    assert!(summary.outcome.is_success(), "{summary:?}");
    assert_eq!(summary.episodes, 1);
    let leave = session.leave_candidate().unwrap();
    assert!(leave.x > 0.1 && leave.y.abs() < 1e-9, "leave at {leave:?}");
    assert_clear(&s.obstacle_set().unwrap(), &path, "wall");
}

#[test]
fn random_fields_are_solved_by_every_policy() {
    let cfg = FieldCfg::default();
    for i in 0..24 {
        for kind in PolicyKind::ALL {
            let nav = NavConfig::default().with_policy(kind);
            let s = draw_field(&cfg, &nav, ReplayToken::new(11, i)).unwrap();
            let set = s.obstacle_set().unwrap();
            let mut session = s.session().unwrap();
            let mut path = Path::new();
            let summary = drive(&mut session, &mut path, 20_000);
            let label = format!("field {i} {kind}");
            assert!(summary.outcome.is_success(), "{label}: {summary:?}");
            assert_clear(&set, &path, &label);
        }
    }
}

#[test]
fn square_all_policies_succeed_and_stay_clear() {
    for kind in PolicyKind::ALL {
        let s = scenario(square(), [-3.0, 1.0], [5.0, 1.0], kind);
        let obstacles = s.obstacle_set().unwrap();
        let mut session = s.session().unwrap();
        let mut path = Path::new();
        let summary = drive(&mut session, &mut path, 5000);
        assert!(summary.outcome.is_success(), "{kind}: {summary:?}");
        assert_clear(&obstacles, &path, &kind.to_string());
        // a detour, but not a wild one
        assert!(summary.path_length > 8.0 && summary.path_length < 25.0);
    }
}

#[test]
fn step_cap_reports_iteration_limit() {
    let s = scenario(square(), [-3.0, 1.0], [5.0, 1.0], PolicyKind::A);
    let mut session = s.session().unwrap();
    let summary = drive(&mut session, &mut Path::new(), 10);
    assert_eq!(summary.outcome, Outcome::Failed(FailureReason::IterationLimit));
    assert_eq!(summary.steps, 10);
    let pos = session.position();
    assert_eq!(session.step(), Event::Failed(FailureReason::IterationLimit));
    assert_eq!(session.position(), pos);
}

#[test]
fn sessions_share_obstacles_across_threads() {
    let s = scenario(square(), [-3.0, 1.0], [5.0, 1.0], PolicyKind::A);
    let obstacles = Arc::new(s.obstacle_set().unwrap());
    let handles: Vec<_> = PolicyKind::ALL
        .into_iter()
        .map(|kind| {
            let obstacles = Arc::clone(&obstacles);
            thread::spawn(move || {
                let cfg = NavConfig::default().with_policy(kind);
                let mut session =
                    NavigationSession::new(obstacles, vector![-3.0, 1.0], vector![5.0, 1.0], cfg)
                        .unwrap();
                drive(&mut session, &mut Path::new(), 5000).outcome
            })
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap().is_success());
    }
}

#[test]
fn scenario_json_round_trip_runs() {
    let s = scenario(two_triangles(), [-5.0, 0.0], [5.0, 0.0], PolicyKind::B);
    let text = serde_json::to_string(&s).unwrap();
    let back: Scenario = serde_json::from_str(&text).unwrap();
    assert_eq!(back.obstacles, s.obstacles);
    assert_eq!(back.config.policy, PolicyKind::B);
    let summary = drive(&mut back.session().unwrap(), &mut Path::new(), 5000);
    assert!(summary.outcome.is_success(), "{summary:?}");
    assert_eq!(summary.episodes, 2);
}
