use ccd2d::{AsyncSolver, CcdSolver, FloorValidator, KinematicsChain, Outcome, SolverConfig};
use glam::Vec2;
use serde_json::json;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const DEFAULT_CHAIN: &str = r#"
{
  "origin": [0, 0],
  "joints": [
    { "name": "base", "orientation": 90, "range": [0, 180] },
    { "name": "shoulder", "range": [270, 90] },
    { "name": "elbow", "range": [270, 90] },
    { "name": "wrist", "range": [270, 90] }
  ],
  "bones": [
    { "name": "column", "jointA": "base", "jointB": "shoulder", "length": 30 },
    { "name": "upper_arm", "jointA": "shoulder", "jointB": "elbow", "length": 40 },
    { "name": "forearm", "jointA": "elbow", "jointB": "wrist", "length": 30 },
    {
      "name": "gripper",
      "jointA": "wrist",
      "length": 8,
      "gripper": { "basePlateLength": 6, "clawLength": 6 }
    }
  ]
}
"#;

fn load_chain(path: Option<&PathBuf>) -> KinematicsChain {
    let json = match path {
        Some(path) => std::fs::read_to_string(path).expect("read chain json"),
        None => DEFAULT_CHAIN.to_string(),
    };
    KinematicsChain::from_json_str(&json).expect("parse chain json")
}

fn main() {
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut positional = Vec::<String>::new();
    let mut chain_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut floor: Option<f32> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--chain" => {
                chain_path = args.get(i + 1).map(PathBuf::from);
                i += 2;
            }
            "--config" => {
                config_path = args.get(i + 1).map(PathBuf::from);
                i += 2;
            }
            "--floor" => {
                floor = args.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }

    let x: f32 = positional
        .first()
        .and_then(|s| s.parse().ok())
        .unwrap_or(40.0);
    let y: f32 = positional
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(20.0);
    let target = Vec2::new(x, y);

    let chain = load_chain(chain_path.as_ref());
    let config = match &config_path {
        Some(path) => {
            let json = std::fs::read_to_string(path).expect("read config json");
            SolverConfig::from_json_str(&json).expect("parse config json")
        }
        None => SolverConfig::default(),
    };

    let mut solver = CcdSolver::new(chain.create_copy(), target, config).expect("create solver");
    if let Some(floor) = floor {
        solver = solver.with_validator(
            FloorValidator::new(floor)
                .with_max_end_bone_tilt(45.0)
                .with_motion_from(chain.create_copy(), 2.0),
        );
    }
    let mut solver = AsyncSolver::new(solver).expect("start background solver");

    let started = Instant::now();
    let mut polls = 0usize;
    let outcome = loop {
        polls += 1;
        let outcome = solver.solve(1).expect("submit background solve");
        if outcome != Outcome::Processing {
            break outcome;
        }
        std::thread::sleep(Duration::from_millis(16));
    };

    let solved = solver.chain().unwrap_or(chain);
    let joints: Vec<_> = solved
        .joints()
        .iter()
        .map(|joint| {
            json!({
                "name": joint.name(),
                "orientation": joint.orientation_degrees(),
                "x": joint.position().x,
                "y": joint.position().y,
            })
        })
        .collect();
    let end = solved.positioning_end().expect("end bone");

    let out = json!({
        "target": [target.x, target.y],
        "outcome": format!("{outcome:?}"),
        "polls": polls,
        "elapsedMs": started.elapsed().as_secs_f64() * 1000.0,
        "end": [end.x, end.y],
        "distance": end.distance(target),
        "joints": joints,
    });
    println!("{}", serde_json::to_string_pretty(&out).expect("serialize"));
}
