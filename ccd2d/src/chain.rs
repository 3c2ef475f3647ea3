use crate::{Bone, BoneKind, Error, Joint, NodeKind, NodeRef, direction};
use glam::Vec2;
use rand::Rng;

/// Radius used by [`KinematicsChain::add_joint`].
pub const DEFAULT_JOINT_RADIUS: f32 = 0.0;

/// A single open chain of joints and bones.
///
/// Joints and bones live in two arenas and reference each other by index, so cloning a chain
/// preserves every joint/bone link. A well-formed chain has exactly one root joint, exactly one
/// terminal bone, and alternates joint, bone, joint, ... along a single path.
///
/// Positions are derived: after changing any orientation, call
/// [`apply_forward_kinematics`](Self::apply_forward_kinematics) before reading them.
#[derive(Clone, Debug, Default)]
pub struct KinematicsChain {
    joints: Vec<Joint>,
    bones: Vec<Bone>,
    origin: Vec2,
    joint_bone_gap: f32,
}

impl KinematicsChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep copy; joint/bone indices are identical in the copy.
    pub fn create_copy(&self) -> Self {
        self.clone()
    }

    /// World position of the root joint.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Extra spacing between a joint's radius and the bones attached to it.
    pub fn joint_bone_gap(&self) -> f32 {
        self.joint_bone_gap
    }

    pub fn set_joint_bone_gap(&mut self, gap: f32) -> Result<(), Error> {
        if !gap.is_finite() || gap < 0.0 {
            return Err(Error::InvalidValue {
                message: format!("joint/bone gap must be finite and >= 0, got {gap}"),
            });
        }
        self.joint_bone_gap = gap;
        Ok(())
    }

    /// Adds a joint with [`DEFAULT_JOINT_RADIUS`] and an unconstrained movement range.
    pub fn add_joint(&mut self, name: &str, orientation: f32) -> Result<usize, Error> {
        self.add_joint_with_radius(name, DEFAULT_JOINT_RADIUS, orientation)
    }

    pub fn add_joint_with_radius(
        &mut self,
        name: &str,
        radius: f32,
        orientation: f32,
    ) -> Result<usize, Error> {
        check_name(NodeKind::Joint, name)?;
        if self.joints.iter().any(|j| j.name() == name) {
            return Err(Error::DuplicateName {
                kind: NodeKind::Joint,
                name: name.to_string(),
            });
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(Error::InvalidValue {
                message: format!("radius of joint '{name}' must be finite and >= 0, got {radius}"),
            });
        }
        if !orientation.is_finite() {
            return Err(Error::InvalidValue {
                message: format!("orientation of joint '{name}' must be finite"),
            });
        }

        self.joints
            .push(Joint::new(name.to_string(), radius, orientation));
        Ok(self.joints.len() - 1)
    }

    /// Adds a plain bone from `joint_a` to `joint_b` (`None` for the terminal bone).
    pub fn add_bone(
        &mut self,
        name: &str,
        joint_a: usize,
        joint_b: Option<usize>,
        length: f32,
    ) -> Result<usize, Error> {
        self.add_bone_with_kind(name, joint_a, joint_b, length, BoneKind::Plain)
    }

    /// Adds a gripper bone whose positioning end lies halfway along its claws.
    pub fn add_gripper(
        &mut self,
        name: &str,
        joint_a: usize,
        joint_b: Option<usize>,
        length: f32,
        base_plate_length: f32,
        claw_length: f32,
    ) -> Result<usize, Error> {
        for (what, value) in [
            ("base plate length", base_plate_length),
            ("claw length", claw_length),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidValue {
                    message: format!("{what} of gripper '{name}' must be finite and >= 0"),
                });
            }
        }
        self.add_bone_with_kind(
            name,
            joint_a,
            joint_b,
            length,
            BoneKind::Gripper {
                base_plate_length,
                claw_length,
            },
        )
    }

    pub fn add_bone_with_kind(
        &mut self,
        name: &str,
        joint_a: usize,
        joint_b: Option<usize>,
        length: f32,
        kind: BoneKind,
    ) -> Result<usize, Error> {
        check_name(NodeKind::Bone, name)?;
        if self.bones.iter().any(|b| b.name() == name) {
            return Err(Error::DuplicateName {
                kind: NodeKind::Bone,
                name: name.to_string(),
            });
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(Error::InvalidValue {
                message: format!("length of bone '{name}' must be finite and > 0, got {length}"),
            });
        }

        let a = self
            .joints
            .get(joint_a)
            .ok_or(Error::InvalidJointIndex { index: joint_a })?;
        if a.successor.is_some() {
            return Err(Error::SuccessorAlreadySet {
                joint: a.name().to_string(),
            });
        }
        if let Some(joint_b) = joint_b {
            let b = self
                .joints
                .get(joint_b)
                .ok_or(Error::InvalidJointIndex { index: joint_b })?;
            if joint_b == joint_a {
                return Err(Error::MalformedChain {
                    message: format!("bone '{name}' starts and ends at joint '{}'", b.name()),
                });
            }
            if b.predecessor.is_some() {
                return Err(Error::PredecessorAlreadySet {
                    joint: b.name().to_string(),
                });
            }
        }

        let index = self.bones.len();
        self.bones
            .push(Bone::new(name.to_string(), joint_a, joint_b, length, kind));
        self.joints[joint_a].successor = Some(index);
        if let Some(joint_b) = joint_b {
            self.joints[joint_b].predecessor = Some(index);
        }
        Ok(index)
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn joint_mut(&mut self, index: usize) -> Option<&mut Joint> {
        self.joints.get_mut(index)
    }

    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn joint_index(&self, name: &str) -> Result<usize, Error> {
        self.joints
            .iter()
            .position(|j| j.name() == name)
            .ok_or_else(|| Error::UnknownJoint {
                name: name.to_string(),
            })
    }

    pub fn bone_index(&self, name: &str) -> Result<usize, Error> {
        self.bones
            .iter()
            .position(|b| b.name() == name)
            .ok_or_else(|| Error::UnknownBone {
                name: name.to_string(),
            })
    }

    pub fn joint_by_name(&self, name: &str) -> Result<&Joint, Error> {
        let index = self.joint_index(name)?;
        Ok(&self.joints[index])
    }

    pub fn joint_by_name_mut(&mut self, name: &str) -> Result<&mut Joint, Error> {
        let index = self.joint_index(name)?;
        Ok(&mut self.joints[index])
    }

    pub fn bone_by_name(&self, name: &str) -> Result<&Bone, Error> {
        let index = self.bone_index(name)?;
        Ok(&self.bones[index])
    }

    /// All nodes, joints first, then bones, each in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.joints
            .iter()
            .map(NodeRef::Joint)
            .chain(self.bones.iter().map(NodeRef::Bone))
    }

    /// Visits joints in insertion order until `visitor` returns `false`.
    ///
    /// Returns `true` when every joint was visited.
    pub fn visit_joints(&self, mut visitor: impl FnMut(&Joint) -> bool) -> bool {
        self.joints.iter().all(|j| visitor(j))
    }

    /// Visits bones in insertion order until `visitor` returns `false`.
    pub fn visit_bones(&self, mut visitor: impl FnMut(&Bone) -> bool) -> bool {
        self.bones.iter().all(|b| visitor(b))
    }

    /// Index of the first joint without a predecessor bone.
    pub fn root_joint(&self) -> Result<usize, Error> {
        self.joints
            .iter()
            .position(Joint::is_root)
            .ok_or(Error::MissingRoot)
    }

    /// Index of the first bone without a distal joint.
    pub fn end_bone(&self) -> Result<usize, Error> {
        self.bones
            .iter()
            .position(|b| b.joint_b.is_none())
            .ok_or(Error::MissingEndBone)
    }

    /// Checks that the chain is one open path from a single root to a single terminal bone.
    pub fn validate(&self) -> Result<(), Error> {
        let roots = self.joints.iter().filter(|j| j.is_root()).count();
        match roots {
            0 => return Err(Error::MissingRoot),
            1 => {}
            count => return Err(Error::MultipleRoots { count }),
        }
        let ends = self.bones.iter().filter(|b| b.joint_b.is_none()).count();
        match ends {
            0 => return Err(Error::MissingEndBone),
            1 => {}
            count => return Err(Error::MultipleEndBones { count }),
        }

        let mut joint_index = self.root_joint()?;
        let mut visited_joints = 0usize;
        let mut visited_bones = 0usize;
        loop {
            visited_joints += 1;
            if visited_joints > self.joints.len() {
                return Err(Error::MalformedChain {
                    message: "joints form a cycle".to_string(),
                });
            }
            let joint = &self.joints[joint_index];
            let Some(bone_index) = joint.successor else {
                return Err(Error::MalformedChain {
                    message: format!("joint '{}' has no successor bone", joint.name()),
                });
            };
            visited_bones += 1;
            match self.bones[bone_index].joint_b {
                Some(next) => joint_index = next,
                None => break,
            }
        }

        if visited_joints != self.joints.len() || visited_bones != self.bones.len() {
            return Err(Error::MalformedChain {
                message: format!(
                    "{} of {} joints and {} of {} bones are reachable from the root",
                    visited_joints,
                    self.joints.len(),
                    visited_bones,
                    self.bones.len()
                ),
            });
        }
        Ok(())
    }

    /// Orientation of `joint` in world terms: its own orientation plus those of all ancestors.
    pub fn sum_orientation_degrees(&self, joint: usize) -> f32 {
        let mut sum = 0.0;
        let mut current = Some(joint);
        let mut steps = 0usize;
        while let Some(index) = current {
            let Some(j) = self.joints.get(index) else {
                break;
            };
            sum += j.orientation_degrees();
            current = j.predecessor.map(|bone| self.bones[bone].joint_a);
            steps += 1;
            if steps > self.joints.len() {
                break;
            }
        }
        sum
    }

    /// Recomputes every joint position and bone endpoint from the root down.
    ///
    /// Does nothing on a chain without a root joint.
    pub fn apply_forward_kinematics(&mut self) {
        let Ok(root) = self.root_joint() else {
            return;
        };
        self.joints[root].position = self.origin;
        if let Some(bone) = self.joints[root].successor {
            self.forward_kinematics_from(bone);
        }
    }

    /// Re-places `bone` and everything distal to it, assuming its proximal joint is positioned.
    pub fn forward_kinematics_from(&mut self, bone: usize) {
        let Some(first) = self.bones.get(bone) else {
            return;
        };
        let mut orientation = self.sum_orientation_degrees(first.joint_a);
        let gap = self.joint_bone_gap;

        let mut current = Some(bone);
        let mut steps = 0usize;
        while let Some(bone_index) = current {
            steps += 1;
            if steps > self.bones.len() {
                break;
            }

            let (joint_a, joint_b, length) = {
                let b = &self.bones[bone_index];
                (b.joint_a, b.joint_b, b.length())
            };
            let dir = direction(orientation);
            let a = &self.joints[joint_a];
            let start = a.position + dir * (a.radius() + gap);
            let end = start + dir * length;

            let b = &mut self.bones[bone_index];
            b.start = start;
            b.end = end;

            current = None;
            if let Some(joint_b) = joint_b {
                let next = &mut self.joints[joint_b];
                next.position = start + dir * (length + next.radius() + gap);
                orientation += next.orientation_degrees();
                current = next.successor;
            }
        }
    }

    /// Positioning end of the terminal bone.
    pub fn positioning_end(&self) -> Result<Vec2, Error> {
        let end = self.end_bone()?;
        Ok(self.bones[end].positioning_end())
    }

    /// Draws a fresh orientation for every joint from its own movement range.
    pub fn set_random_orientations<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for joint in &mut self.joints {
            joint.set_random_orientation(rng);
        }
    }
}

fn check_name(kind: NodeKind, name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::EmptyName { kind });
    }
    Ok(())
}
