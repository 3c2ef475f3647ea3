use crate::{MovementRange, normalize_degrees};
use glam::Vec2;
use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    Joint,
    Bone,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Joint => f.write_str("joint"),
            Self::Bone => f.write_str("bone"),
        }
    }
}

/// Borrowed view of either node type of a chain.
#[derive(Copy, Clone, Debug)]
pub enum NodeRef<'a> {
    Joint(&'a Joint),
    Bone(&'a Bone),
}

impl NodeRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Joint(joint) => &joint.name,
            Self::Bone(bone) => &bone.name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Joint(_) => NodeKind::Joint,
            Self::Bone(_) => NodeKind::Bone,
        }
    }
}

/// A rotational degree of freedom.
///
/// The orientation is local (relative to the predecessor joint) and always stored clamped into
/// the joint's [`MovementRange`]. `position` is derived by forward kinematics.
#[derive(Clone, Debug)]
pub struct Joint {
    name: String,
    radius: f32,
    orientation: f32,
    range: MovementRange,
    pub(crate) predecessor: Option<usize>,
    pub(crate) successor: Option<usize>,
    pub(crate) position: Vec2,
}

impl Joint {
    pub(crate) fn new(name: String, radius: f32, orientation: f32) -> Self {
        let range = MovementRange::full();
        Self {
            name,
            radius,
            orientation: range.clamp(orientation),
            range,
            predecessor: None,
            successor: None,
            position: Vec2::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn range(&self) -> MovementRange {
        self.range
    }

    /// Replaces the movement range and re-clamps the current orientation into it.
    pub fn set_range(&mut self, range: MovementRange) {
        self.range = range;
        self.orientation = range.clamp(self.orientation);
    }

    /// Local orientation in degrees, within `[0, 360)`.
    pub fn orientation_degrees(&self) -> f32 {
        self.orientation
    }

    pub fn set_orientation(&mut self, degrees: f32) {
        self.orientation = self.range.clamp(degrees);
    }

    /// Rotates by `delta` degrees. A rotation that leaves the movement range stops at the
    /// boundary lying in the requested direction, not at the nearest one.
    pub fn add_orientation(&mut self, delta: f32) {
        let value = normalize_degrees(self.orientation + delta);
        self.orientation = if self.range.is_in_range(value) {
            value
        } else if delta >= 0.0 {
            self.range.max_valid_angle_ccw()
        } else {
            self.range.max_valid_angle_cw()
        };
    }

    pub(crate) fn set_random_orientation<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.orientation = self.range.clamp(self.range.random_value(rng));
    }

    /// Index of the bone ending at this joint.
    pub fn predecessor(&self) -> Option<usize> {
        self.predecessor
    }

    /// Index of the bone starting at this joint.
    pub fn successor(&self) -> Option<usize> {
        self.successor
    }

    pub fn is_root(&self) -> bool {
        self.predecessor.is_none()
    }

    /// World position as of the last forward kinematics pass.
    pub fn position(&self) -> Vec2 {
        self.position
    }
}

/// Shape of a bone, deciding where its positioning end lies.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum BoneKind {
    #[default]
    Plain,
    /// A claw gripper; the driven point sits halfway along the claws, past the bone end.
    Gripper {
        base_plate_length: f32,
        claw_length: f32,
    },
}

/// A rigid link from `joint_a` to `joint_b`, or to a free end for the terminal bone.
#[derive(Clone, Debug)]
pub struct Bone {
    name: String,
    length: f32,
    kind: BoneKind,
    pub(crate) joint_a: usize,
    pub(crate) joint_b: Option<usize>,
    pub(crate) start: Vec2,
    pub(crate) end: Vec2,
}

impl Bone {
    pub(crate) fn new(
        name: String,
        joint_a: usize,
        joint_b: Option<usize>,
        length: f32,
        kind: BoneKind,
    ) -> Self {
        Self {
            name,
            length,
            kind,
            joint_a,
            joint_b,
            start: Vec2::ZERO,
            end: Vec2::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn kind(&self) -> BoneKind {
        self.kind
    }

    /// Index of the proximal joint.
    pub fn joint_a(&self) -> usize {
        self.joint_a
    }

    /// Index of the distal joint; `None` for the terminal bone.
    pub fn joint_b(&self) -> Option<usize> {
        self.joint_b
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn end(&self) -> Vec2 {
        self.end
    }

    pub fn center(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }

    /// The point driven towards an IK target.
    pub fn positioning_end(&self) -> Vec2 {
        match self.kind {
            BoneKind::Plain => self.end,
            BoneKind::Gripper { claw_length, .. } => {
                self.end + (self.end - self.start).normalize_or_zero() * (claw_length * 0.5)
            }
        }
    }
}
