use vizij_animation_offline::{
    AnimationOptimizer, JointsSetting, RawAnimation, Setting, Skeleton, ToleranceResolver,
};

fn arm() -> (Skeleton, RawAnimation) {
    let skeleton = vizij_test_fixtures::skeletons::load("arm").expect("load arm skeleton");
    let animation = vizij_test_fixtures::animations::load("arm-wave").expect("load arm-wave");
    (skeleton, animation)
}

/// it should apply a leaf override to every ancestor of the leaf
#[test]
fn leaf_override_tightens_whole_chain() {
    let skeleton =
        vizij_test_fixtures::skeletons::load::<Skeleton>("three-joint-chain").unwrap();
    let animation =
        vizij_test_fixtures::animations::load::<RawAnimation>("chain-collinear").unwrap();
    let tip = skeleton.find_joint("tip").unwrap();

    let optimizer = AnimationOptimizer::default().with_joint_setting(tip, Setting::new(1e-6, 0.1));
    let specs = optimizer.resolver().resolve(&skeleton, &animation);

    for joint in skeleton.ancestors(tip) {
        assert!(specs[joint].tolerance <= 1e-6, "joint {joint}");
    }
}

/// it should only tighten the overridden joint and its ancestors
#[test]
fn override_leaves_siblings_untouched() {
    let (skeleton, animation) = arm();
    let finger = skeleton.find_joint("finger").unwrap();
    let head = skeleton.find_joint("head").unwrap();

    let overrides: JointsSetting = [(finger, Setting::new(1e-5, 0.1))].into_iter().collect();
    let base = ToleranceResolver::new(Setting::default(), &JointsSetting::new())
        .resolve(&skeleton, &animation);
    let tight = ToleranceResolver::new(Setting::default(), &overrides).resolve(&skeleton, &animation);

    let chain: Vec<usize> = skeleton.ancestors(finger).collect();
    for joint in 0..skeleton.num_joints() {
        if chain.contains(&joint) {
            assert_eq!(tight[joint].tolerance, 1e-5, "joint {joint}");
        } else {
            assert_eq!(tight[joint].tolerance, base[joint].tolerance, "joint {joint}");
        }
        assert!(tight[joint].tolerance <= base[joint].tolerance);
    }
    assert_eq!(tight[head], base[head]);
}

/// it should never let a looser override relax a stricter descendant
#[test]
fn looser_ancestor_override_cannot_relax_descendant() {
    let (skeleton, animation) = arm();
    let elbow = skeleton.find_joint("elbow").unwrap();
    let finger = skeleton.find_joint("finger").unwrap();

    let optimizer = AnimationOptimizer::default()
        .with_joint_setting(elbow, Setting::new(1e-1, 0.1))
        .with_joint_setting(finger, Setting::new(1e-5, 0.1));
    let specs = optimizer.resolver().resolve(&skeleton, &animation);

    assert_eq!(optimizer.joint_setting(elbow).tolerance, 1e-1);
    assert_eq!(specs[elbow].tolerance, 1e-5);
    assert_eq!(specs[finger].tolerance, 1e-5);
}

/// it should give every joint a hierarchy length no shorter than its descendants'
#[test]
fn distance_grows_toward_root() {
    let (skeleton, animation) = arm();
    let specs = AnimationOptimizer::default()
        .resolver()
        .resolve(&skeleton, &animation);

    for joint in 0..skeleton.num_joints() {
        let spec = &specs[joint];
        assert!(spec.distance >= spec.scale * Setting::default().distance - 1e-6);
        assert!(spec.hierarchy_error_ratio > 0.0 && spec.hierarchy_error_ratio <= 1.0);
        assert!(spec.own_tolerance() <= spec.tolerance);
        if let Some(parent) = skeleton.parent(joint) {
            assert!(specs[parent].distance >= spec.distance);
            assert_eq!(spec.parent_scale, specs[parent].scale);
        }
    }
}

/// it should ignore overrides naming joints outside the skeleton
#[test]
fn out_of_range_override_is_ignored() {
    let (skeleton, animation) = arm();
    let optimizer = AnimationOptimizer::default().with_joint_setting(42, Setting::new(1e-9, 1.0));
    let base = AnimationOptimizer::default()
        .resolver()
        .resolve(&skeleton, &animation);
    let specs = optimizer.resolver().resolve(&skeleton, &animation);
    assert_eq!(specs, base);

    let mut output = RawAnimation::default();
    assert!(optimizer.optimize(&animation, &skeleton, &mut output).is_ok());
}
