use crate::{Error, KinematicsChain, MovementRange, SolverConfig};
use glam::Vec2;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainDef {
    #[serde(default)]
    origin: Option<[f32; 2]>,
    #[serde(default)]
    joint_bone_gap: f32,
    joints: Vec<JointDef>,
    bones: Vec<BoneDef>,
}

#[derive(Debug, Deserialize)]
struct JointDef {
    name: String,
    #[serde(default)]
    orientation: f32,
    #[serde(default)]
    radius: f32,
    /// `[start, end]` in degrees, counter-clockwise from start to end.
    #[serde(default)]
    range: Option<[f32; 2]>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoneDef {
    name: String,
    joint_a: String,
    #[serde(default)]
    joint_b: Option<String>,
    length: f32,
    #[serde(default)]
    gripper: Option<GripperDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GripperDef {
    #[serde(default)]
    base_plate_length: f32,
    claw_length: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolverConfigDef {
    arrival_distance: Option<f32>,
    min_change: Option<f32>,
    epsilon: Option<f32>,
    max_iterations: Option<usize>,
    failure_retries: Option<usize>,
    random_restarts: Option<usize>,
    seed: Option<u64>,
}

impl KinematicsChain {
    /// Builds a chain from its JSON description.
    ///
    /// ```json
    /// {
    ///   "origin": [0, 0],
    ///   "joints": [{ "name": "shoulder", "range": [270, 90] }, { "name": "wrist" }],
    ///   "bones": [
    ///     { "name": "upper", "jointA": "shoulder", "jointB": "wrist", "length": 40 },
    ///     { "name": "hand", "jointA": "wrist", "length": 20, "gripper": { "clawLength": 10 } }
    ///   ]
    /// }
    /// ```
    ///
    /// Forward kinematics has been applied to the returned chain.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let def: ChainDef = serde_json::from_str(input).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })?;

        let mut chain = KinematicsChain::new();
        if let Some([x, y]) = def.origin {
            chain.set_origin(Vec2::new(x, y));
        }
        chain.set_joint_bone_gap(def.joint_bone_gap)?;

        for joint in &def.joints {
            let index = chain.add_joint_with_radius(&joint.name, joint.radius, joint.orientation)?;
            if let Some([start, end]) = joint.range {
                let range = MovementRange::new(start, end)?;
                if let Some(j) = chain.joint_mut(index) {
                    j.set_range(range);
                }
            }
        }

        for bone in &def.bones {
            let joint_a = chain.joint_index(&bone.joint_a)?;
            let joint_b = bone
                .joint_b
                .as_deref()
                .map(|name| chain.joint_index(name))
                .transpose()?;
            match &bone.gripper {
                Some(gripper) => chain.add_gripper(
                    &bone.name,
                    joint_a,
                    joint_b,
                    bone.length,
                    gripper.base_plate_length,
                    gripper.claw_length,
                )?,
                None => chain.add_bone(&bone.name, joint_a, joint_b, bone.length)?,
            };
        }

        chain.validate()?;
        chain.apply_forward_kinematics();
        Ok(chain)
    }
}

impl SolverConfig {
    /// Parses solver settings; keys are camelCase and every key is optional.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let def: SolverConfigDef = serde_json::from_str(input).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })?;

        let defaults = SolverConfig::default();
        Ok(SolverConfig {
            arrival_distance: def.arrival_distance.unwrap_or(defaults.arrival_distance),
            min_change: def.min_change.unwrap_or(defaults.min_change),
            epsilon: def.epsilon.unwrap_or(defaults.epsilon),
            max_iterations: def.max_iterations.unwrap_or(defaults.max_iterations),
            failure_retries: def.failure_retries.unwrap_or(defaults.failure_retries),
            random_restarts: def.random_restarts.unwrap_or(defaults.random_restarts),
            seed: def.seed.or(defaults.seed),
        })
    }
}
