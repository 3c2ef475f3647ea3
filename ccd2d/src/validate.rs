use crate::{ConstraintValidator, KinematicsChain, shortest_rotation};
use glam::Vec2;

/// Rejects configurations that dip below a horizontal floor.
///
/// Optionally also rejects end bones that are tilted away from pointing straight down, and
/// replays the motion from a starting chain to the candidate pose, rejecting the candidate if any
/// intermediate pose dips below the floor.
#[derive(Clone, Debug)]
pub struct FloorValidator {
    floor_y: f32,
    max_end_bone_tilt: Option<f32>,
    motion: Option<MotionCheck>,
}

#[derive(Clone, Debug)]
struct MotionCheck {
    from: KinematicsChain,
    step_degrees: f32,
}

impl FloorValidator {
    pub fn new(floor_y: f32) -> Self {
        Self {
            floor_y,
            max_end_bone_tilt: None,
            motion: None,
        }
    }

    /// Rejects end bones more than `degrees` away from pointing along `-y`.
    pub fn with_max_end_bone_tilt(mut self, degrees: f32) -> Self {
        self.max_end_bone_tilt = Some(degrees.abs());
        self
    }

    /// Replays the joint motion from `from` to the candidate, every joint moving along its shorter
    /// arc by at most `step_degrees` per step.
    pub fn with_motion_from(mut self, from: KinematicsChain, step_degrees: f32) -> Self {
        let step_degrees = if step_degrees.is_finite() && step_degrees > 0.0 {
            step_degrees
        } else {
            1.0
        };
        self.motion = Some(MotionCheck { from, step_degrees });
        self
    }

    pub fn floor_y(&self) -> f32 {
        self.floor_y
    }

    pub fn is_below_floor(&self, chain: &KinematicsChain) -> bool {
        let floor = self.floor_y;
        chain
            .bones()
            .iter()
            .any(|b| b.start().y < floor || b.end().y < floor)
            || chain.joints().iter().any(|j| j.position().y < floor)
    }

    fn end_bone_too_tilted(&self, chain: &KinematicsChain, max_tilt: f32) -> bool {
        let Ok(end) = chain.end_bone() else {
            return true;
        };
        let bone = &chain.bones()[end];
        let dir = (bone.end() - bone.start()).normalize_or_zero();
        if dir == Vec2::ZERO {
            return true;
        }
        let down = Vec2::NEG_Y;
        let tilt = down.perp_dot(dir).atan2(down.dot(dir)).to_degrees();
        tilt.abs() > max_tilt
    }

    fn motion_dips_below_floor(&self, motion: &MotionCheck, to: &KinematicsChain) -> bool {
        let mut pose = motion.from.clone();
        let mut deltas = Vec::with_capacity(pose.joints().len());
        for joint in pose.joints() {
            let target = match to.joint_by_name(joint.name()) {
                Ok(j) => j.orientation_degrees(),
                Err(_) => return true,
            };
            deltas.push(shortest_rotation(target - joint.orientation_degrees()));
        }

        let largest = deltas.iter().fold(0.0f32, |acc, d| acc.max(d.abs()));
        let steps = (largest / motion.step_degrees).ceil().max(1.0) as usize;
        let starts: Vec<f32> = pose.joints().iter().map(|j| j.orientation_degrees()).collect();

        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            for (index, (start, delta)) in starts.iter().zip(&deltas).enumerate() {
                if let Some(joint) = pose.joint_mut(index) {
                    joint.set_orientation(start + delta * t);
                }
            }
            pose.apply_forward_kinematics();
            if self.is_below_floor(&pose) {
                return true;
            }
        }
        false
    }
}

impl ConstraintValidator for FloorValidator {
    fn is_invalid_configuration(&self, chain: &KinematicsChain) -> bool {
        if self.is_below_floor(chain) {
            return true;
        }
        if let Some(max_tilt) = self.max_end_bone_tilt {
            if self.end_bone_too_tilted(chain, max_tilt) {
                return true;
            }
        }
        match &self.motion {
            Some(motion) => self.motion_dips_below_floor(motion, chain),
            None => false,
        }
    }
}
