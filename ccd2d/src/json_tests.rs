use crate::{BoneKind, Error, KinematicsChain, SolverConfig};
use glam::Vec2;

fn assert_vec_approx(actual: Vec2, expected: Vec2) {
    let diff = (actual - expected).abs();
    assert!(
        diff.x <= 1.0e-3 && diff.y <= 1.0e-3,
        "expected {expected}, got {actual}"
    );
}

const ARM: &str = r#"
{
  "origin": [1, 2],
  "jointBoneGap": 0.5,
  "joints": [
    { "name": "shoulder", "orientation": 90, "range": [270, 90] },
    { "name": "wrist", "radius": 1 }
  ],
  "bones": [
    { "name": "upper", "jointA": "shoulder", "jointB": "wrist", "length": 40 },
    {
      "name": "hand",
      "jointA": "wrist",
      "length": 20,
      "gripper": { "basePlateLength": 3, "clawLength": 10 }
    }
  ]
}
"#;

#[test]
fn chain_from_json_is_posed() {
    let chain = KinematicsChain::from_json_str(ARM).unwrap();
    assert_eq!(chain.origin(), Vec2::new(1.0, 2.0));
    assert_eq!(chain.joint_bone_gap(), 0.5);

    let shoulder = chain.joint_by_name("shoulder").unwrap();
    assert!(shoulder.is_root());
    assert_eq!(shoulder.orientation_degrees(), 90.0);
    assert_eq!(shoulder.range().start(), 270.0);
    assert_eq!(shoulder.range().end(), 90.0);
    assert!(chain.joint_by_name("wrist").unwrap().range().is_full());
    assert_eq!(chain.joint_by_name("wrist").unwrap().radius(), 1.0);

    let upper = chain.bone_by_name("upper").unwrap();
    assert_vec_approx(upper.start(), Vec2::new(1.0, 2.5));
    assert_vec_approx(upper.end(), Vec2::new(1.0, 42.5));
    assert_vec_approx(
        chain.joint_by_name("wrist").unwrap().position(),
        Vec2::new(1.0, 44.0),
    );

    let hand = chain.bone_by_name("hand").unwrap();
    assert_eq!(
        hand.kind(),
        BoneKind::Gripper {
            base_plate_length: 3.0,
            claw_length: 10.0
        }
    );
    assert_vec_approx(hand.start(), Vec2::new(1.0, 45.5));
    assert_vec_approx(chain.positioning_end().unwrap(), Vec2::new(1.0, 70.5));
}

#[test]
fn chain_json_errors() {
    assert!(matches!(
        KinematicsChain::from_json_str("{"),
        Err(Error::JsonParse { .. })
    ));
    assert!(matches!(
        KinematicsChain::from_json_str(r#"{ "joints": [] }"#),
        Err(Error::JsonParse { .. })
    ));

    let unknown = r#"{
        "joints": [{ "name": "a" }],
        "bones": [{ "name": "ab", "jointA": "a", "jointB": "elbow", "length": 1 }]
    }"#;
    assert!(matches!(
        KinematicsChain::from_json_str(unknown),
        Err(Error::UnknownJoint { name }) if name == "elbow"
    ));

    let open_ended = r#"{
        "joints": [{ "name": "a" }, { "name": "b" }],
        "bones": [{ "name": "ab", "jointA": "a", "jointB": "b", "length": 1 }]
    }"#;
    assert!(matches!(
        KinematicsChain::from_json_str(open_ended),
        Err(Error::MissingEndBone)
    ));

    let bad_length = r#"{
        "joints": [{ "name": "a" }],
        "bones": [{ "name": "a_end", "jointA": "a", "length": 0 }]
    }"#;
    assert!(matches!(
        KinematicsChain::from_json_str(bad_length),
        Err(Error::InvalidValue { .. })
    ));
}

#[test]
fn solver_config_defaults_and_overrides() {
    assert_eq!(
        SolverConfig::from_json_str("{}").unwrap(),
        SolverConfig::default()
    );

    let config = SolverConfig::from_json_str(
        r#"{ "arrivalDistance": 0.5, "maxIterations": 10, "randomRestarts": 0, "seed": 9 }"#,
    )
    .unwrap();
    assert_eq!(config.arrival_distance, 0.5);
    assert_eq!(config.max_iterations, 10);
    assert_eq!(config.random_restarts, 0);
    assert_eq!(config.seed, Some(9));
    assert_eq!(config.min_change, SolverConfig::default().min_change);
    assert_eq!(config.failure_retries, SolverConfig::default().failure_retries);

    assert!(matches!(
        SolverConfig::from_json_str(r#"{ "maxIterations": -1 }"#),
        Err(Error::JsonParse { .. })
    ));
}
