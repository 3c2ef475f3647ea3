use crate::{BoneKind, Error, KinematicsChain, NodeKind, NodeRef};
use glam::Vec2;

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-3,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn assert_vec_approx(actual: Vec2, expected: Vec2) {
    assert_approx(actual.x, expected.x);
    assert_approx(actual.y, expected.y);
}

fn three_joint_arm() -> KinematicsChain {
    let mut chain = KinematicsChain::new();
    let j0 = chain.add_joint("j0", 0.0).unwrap();
    let j1 = chain.add_joint("j1", 0.0).unwrap();
    let j2 = chain.add_joint("j2", 0.0).unwrap();
    chain.add_bone("b0", j0, Some(j1), 40.0).unwrap();
    chain.add_bone("b1", j1, Some(j2), 40.0).unwrap();
    chain.add_bone("b2", j2, None, 20.0).unwrap();
    chain.apply_forward_kinematics();
    chain
}

#[test]
fn forward_kinematics_extended_along_x() {
    let chain = three_joint_arm();
    let b0 = chain.bone_by_name("b0").unwrap();
    assert_vec_approx(b0.start(), Vec2::new(0.0, 0.0));
    assert_vec_approx(b0.end(), Vec2::new(40.0, 0.0));
    assert_vec_approx(chain.joint_by_name("j1").unwrap().position(), Vec2::new(40.0, 0.0));
    assert_vec_approx(chain.joint_by_name("j2").unwrap().position(), Vec2::new(80.0, 0.0));
    assert_vec_approx(chain.positioning_end().unwrap(), Vec2::new(100.0, 0.0));
}

#[test]
fn forward_kinematics_accumulates_orientations() {
    let mut chain = three_joint_arm();
    chain.joint_by_name_mut("j1").unwrap().set_orientation(90.0);
    chain.apply_forward_kinematics();

    let j2 = chain.joint_index("j2").unwrap();
    assert_approx(chain.sum_orientation_degrees(j2), 90.0);
    assert_vec_approx(chain.joint_by_name("j2").unwrap().position(), Vec2::new(40.0, 40.0));
    assert_vec_approx(chain.positioning_end().unwrap(), Vec2::new(40.0, 60.0));

    chain.joint_by_name_mut("j2").unwrap().set_orientation(270.0);
    chain.apply_forward_kinematics();
    assert_vec_approx(chain.positioning_end().unwrap(), Vec2::new(60.0, 40.0));
}

#[test]
fn forward_kinematics_is_idempotent() {
    let mut chain = three_joint_arm();
    chain.joint_by_name_mut("j0").unwrap().set_orientation(33.0);
    chain.joint_by_name_mut("j1").unwrap().set_orientation(290.0);
    chain.apply_forward_kinematics();
    let first: Vec<_> = chain.bones().iter().map(|b| (b.start(), b.end())).collect();

    chain.apply_forward_kinematics();
    let second: Vec<_> = chain.bones().iter().map(|b| (b.start(), b.end())).collect();
    assert_eq!(first, second);
}

#[test]
fn origin_radius_and_gap_offset_the_bones() {
    let mut chain = KinematicsChain::new();
    chain.set_origin(Vec2::new(5.0, 10.0));
    chain.set_joint_bone_gap(1.0).unwrap();
    let j0 = chain.add_joint_with_radius("j0", 2.0, 0.0).unwrap();
    let j1 = chain.add_joint_with_radius("j1", 3.0, 0.0).unwrap();
    chain.add_bone("b0", j0, Some(j1), 40.0).unwrap();
    chain.add_bone("b1", j1, None, 10.0).unwrap();
    chain.apply_forward_kinematics();

    let b0 = chain.bone(0).unwrap();
    assert_vec_approx(chain.joint(j0).unwrap().position(), Vec2::new(5.0, 10.0));
    assert_vec_approx(b0.start(), Vec2::new(8.0, 10.0));
    assert_vec_approx(b0.end(), Vec2::new(48.0, 10.0));
    assert_vec_approx(chain.joint(j1).unwrap().position(), Vec2::new(52.0, 10.0));

    let b1 = chain.bone(1).unwrap();
    assert_vec_approx(b1.start(), Vec2::new(56.0, 10.0));
    assert_vec_approx(b1.end(), Vec2::new(66.0, 10.0));
    assert_vec_approx(b1.center(), Vec2::new(61.0, 10.0));
}

#[test]
fn gripper_positioning_end_is_half_a_claw_past_the_end() {
    let mut chain = KinematicsChain::new();
    let j0 = chain.add_joint("j0", 90.0).unwrap();
    chain
        .add_gripper("gripper", j0, None, 10.0, 5.0, 4.0)
        .unwrap();
    chain.apply_forward_kinematics();

    let bone = chain.bone_by_name("gripper").unwrap();
    assert_eq!(
        bone.kind(),
        BoneKind::Gripper {
            base_plate_length: 5.0,
            claw_length: 4.0
        }
    );
    assert_vec_approx(bone.end(), Vec2::new(0.0, 10.0));
    assert_vec_approx(bone.positioning_end(), Vec2::new(0.0, 12.0));
    assert_vec_approx(chain.positioning_end().unwrap(), Vec2::new(0.0, 12.0));
}

#[test]
fn copy_is_isolated_from_source() {
    let source = three_joint_arm();
    let mut copy = source.create_copy();
    copy.joint_by_name_mut("j0").unwrap().set_orientation(45.0);
    copy.joint_by_name_mut("j1").unwrap().add_orientation(10.0);
    copy.apply_forward_kinematics();

    assert_approx(source.joint_by_name("j0").unwrap().orientation_degrees(), 0.0);
    assert_approx(source.joint_by_name("j1").unwrap().orientation_degrees(), 0.0);
    assert_vec_approx(source.positioning_end().unwrap(), Vec2::new(100.0, 0.0));
    assert!(copy.positioning_end().unwrap().y > 1.0);

    // Links survive the copy.
    let j1 = copy.joint_by_name("j1").unwrap();
    assert_eq!(j1.predecessor(), Some(copy.bone_index("b0").unwrap()));
    assert_eq!(j1.successor(), Some(copy.bone_index("b1").unwrap()));
}

#[test]
fn root_and_end_bone_lookup() {
    let chain = three_joint_arm();
    assert_eq!(chain.root_joint().unwrap(), chain.joint_index("j0").unwrap());
    assert_eq!(chain.end_bone().unwrap(), chain.bone_index("b2").unwrap());
    assert!(chain.joint_by_name("j0").unwrap().is_root());
    chain.validate().unwrap();
}

#[test]
fn unknown_names_are_reported() {
    let chain = three_joint_arm();
    assert!(matches!(
        chain.joint_by_name("nope"),
        Err(Error::UnknownJoint { name }) if name == "nope"
    ));
    assert!(matches!(
        chain.bone_by_name("nope"),
        Err(Error::UnknownBone { .. })
    ));
}

#[test]
fn duplicate_and_empty_names_are_rejected() {
    let mut chain = KinematicsChain::new();
    let j0 = chain.add_joint("j0", 0.0).unwrap();
    assert!(matches!(
        chain.add_joint("j0", 0.0),
        Err(Error::DuplicateName {
            kind: NodeKind::Joint,
            ..
        })
    ));
    assert!(matches!(
        chain.add_joint("  ", 0.0),
        Err(Error::EmptyName {
            kind: NodeKind::Joint
        })
    ));

    chain.add_bone("b0", j0, None, 1.0).unwrap();
    let j1 = chain.add_joint("j1", 0.0).unwrap();
    assert!(matches!(
        chain.add_bone("b0", j1, None, 1.0),
        Err(Error::DuplicateName {
            kind: NodeKind::Bone,
            ..
        })
    ));
    assert!(matches!(
        chain.add_bone("", j1, None, 1.0),
        Err(Error::EmptyName {
            kind: NodeKind::Bone
        })
    ));
}

#[test]
fn joints_accept_one_predecessor_and_one_successor() {
    let mut chain = KinematicsChain::new();
    let j0 = chain.add_joint("j0", 0.0).unwrap();
    let j1 = chain.add_joint("j1", 0.0).unwrap();
    let j2 = chain.add_joint("j2", 0.0).unwrap();
    chain.add_bone("b0", j0, Some(j1), 1.0).unwrap();

    assert!(matches!(
        chain.add_bone("b1", j0, Some(j2), 1.0),
        Err(Error::SuccessorAlreadySet { joint }) if joint == "j0"
    ));
    assert!(matches!(
        chain.add_bone("b1", j2, Some(j1), 1.0),
        Err(Error::PredecessorAlreadySet { joint }) if joint == "j1"
    ));
    assert!(matches!(
        chain.add_bone("b1", j2, Some(j2), 1.0),
        Err(Error::MalformedChain { .. })
    ));
    assert!(matches!(
        chain.add_bone("b1", 17, None, 1.0),
        Err(Error::InvalidJointIndex { index: 17 })
    ));
}

#[test]
fn invalid_dimensions_are_rejected() {
    let mut chain = KinematicsChain::new();
    assert!(matches!(
        chain.add_joint_with_radius("j", -1.0, 0.0),
        Err(Error::InvalidValue { .. })
    ));
    let j = chain.add_joint("j", 0.0).unwrap();
    for length in [0.0, -3.0, f32::NAN] {
        assert!(matches!(
            chain.add_bone("b", j, None, length),
            Err(Error::InvalidValue { .. })
        ));
    }
    assert!(chain.set_joint_bone_gap(-0.5).is_err());
}

#[test]
fn validate_rejects_chains_that_are_not_a_single_path() {
    let empty = KinematicsChain::new();
    assert!(matches!(empty.validate(), Err(Error::MissingRoot)));

    let mut no_end = KinematicsChain::new();
    let a = no_end.add_joint("a", 0.0).unwrap();
    let b = no_end.add_joint("b", 0.0).unwrap();
    no_end.add_bone("ab", a, Some(b), 1.0).unwrap();
    assert!(matches!(no_end.validate(), Err(Error::MissingEndBone)));

    let mut two_roots = KinematicsChain::new();
    let a = two_roots.add_joint("a", 0.0).unwrap();
    let b = two_roots.add_joint("b", 0.0).unwrap();
    two_roots.add_bone("a_end", a, None, 1.0).unwrap();
    two_roots.add_bone("b_end", b, None, 1.0).unwrap();
    assert!(matches!(
        two_roots.validate(),
        Err(Error::MultipleRoots { count: 2 })
    ));

    let mut dangling = KinematicsChain::new();
    let a = dangling.add_joint("a", 0.0).unwrap();
    let b = dangling.add_joint("b", 0.0).unwrap();
    dangling.add_joint("c", 0.0).unwrap();
    dangling.add_bone("ab", a, Some(b), 1.0).unwrap();
    dangling.add_bone("b_end", b, None, 1.0).unwrap();
    assert!(matches!(
        dangling.validate(),
        Err(Error::MultipleRoots { count: 2 })
    ));
}

#[test]
fn bone_insertion_order_does_not_matter() {
    let mut chain = KinematicsChain::new();
    let a = chain.add_joint("a", 0.0).unwrap();
    let b = chain.add_joint("b", 0.0).unwrap();
    let c = chain.add_joint("c", 0.0).unwrap();
    chain.add_bone("c_end", c, None, 1.0).unwrap();
    chain.add_bone("ab", a, Some(b), 1.0).unwrap();
    chain.add_bone("bc", b, Some(c), 1.0).unwrap();
    chain.validate().unwrap();
    chain.apply_forward_kinematics();
    assert_vec_approx(chain.positioning_end().unwrap(), Vec2::new(3.0, 0.0));
}

#[test]
fn nodes_visit_joints_then_bones() {
    let chain = three_joint_arm();
    let names: Vec<(NodeKind, String)> = chain
        .nodes()
        .map(|n| (n.kind(), n.name().to_string()))
        .collect();
    assert_eq!(names.len(), 6);
    assert_eq!(names[0], (NodeKind::Joint, "j0".to_string()));
    assert_eq!(names[3], (NodeKind::Bone, "b0".to_string()));
    assert!(matches!(chain.nodes().last(), Some(NodeRef::Bone(b)) if b.name() == "b2"));

    let mut seen = Vec::new();
    let completed = chain.visit_joints(|j| {
        seen.push(j.name().to_string());
        j.name() != "j1"
    });
    assert!(!completed);
    assert_eq!(seen, vec!["j0", "j1"]);
    assert!(chain.visit_bones(|b| b.length() > 0.0));
}

#[test]
fn random_orientations_stay_within_ranges() {
    use rand::SeedableRng;

    let mut chain = three_joint_arm();
    let range = crate::MovementRange::new(270.0, 90.0).unwrap();
    for index in 0..chain.joints().len() {
        chain.joint_mut(index).unwrap().set_range(range);
    }
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
    for _ in 0..100 {
        chain.set_random_orientations(&mut rng);
        assert!(chain.visit_joints(|j| range.is_in_range(j.orientation_degrees())));
    }
}
