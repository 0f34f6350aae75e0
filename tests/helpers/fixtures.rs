//! Library and description fixtures shared across integration tests

use activity_tree_model_rs::library::{ActivityKind, ActivityLibrary};
use activity_tree_model_rs::model::{
    Activity, ActivitySequence, Description, PhysicalActivity, TrajectorySet,
};

/// A one-level library: every chain state is physical, so sampling
/// always terminates after a single expansion of the root.
pub fn flat_library() -> ActivityLibrary {
    ActivityLibrary::builder()
        .activity("FFA", ActivityKind::Intentional)
        .activity("WALK", ActivityKind::Physical)
        .activity("STAND", ActivityKind::Physical)
        .role("ACTOR")
        .concentration("FFA", 1.0)
        .role_distribution("FFA", vec![1.0])
        .kernel("WALK", 10.0, 1.0)
        .kernel("STAND", 5.0, 0.5)
        .chain(
            "ACTOR",
            vec!["WALK".to_string(), "STAND".to_string()],
            vec![0.6, 0.4],
            vec![vec![0.7, 0.3], vec![0.3, 0.7]],
        )
        .build()
        .unwrap()
}

/// A recursive library: chains can emit the intentional MEET, which
/// expands again. MEET carries a spatial target.
pub fn recursive_library() -> ActivityLibrary {
    ActivityLibrary::builder()
        .activity("FFA", ActivityKind::Intentional)
        .activity("MEET", ActivityKind::Intentional)
        .activity("WALK", ActivityKind::Physical)
        .activity("STAND", ActivityKind::Physical)
        .role("ACTOR")
        .role("BYSTANDER")
        .concentration("FFA", 1.0)
        .concentration("MEET", 0.5)
        .role_distribution("FFA", vec![0.7, 0.3])
        .role_distribution("MEET", vec![0.5, 0.5])
        .kernel("WALK", 10.0, 1.0)
        .kernel("STAND", 5.0, 0.5)
        .chain(
            "ACTOR",
            vec!["WALK".to_string(), "STAND".to_string(), "MEET".to_string()],
            vec![0.45, 0.45, 0.1],
            vec![
                vec![0.85, 0.1, 0.05],
                vec![0.1, 0.85, 0.05],
                vec![0.45, 0.45, 0.1],
            ],
        )
        .chain(
            "BYSTANDER",
            vec!["WALK".to_string(), "STAND".to_string()],
            vec![0.5, 0.5],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
        )
        .target("MEET")
        .build()
        .unwrap()
}

/// Two individuals over ten frames, each walking the whole clip in
/// their own role sequence. The smallest description with a
/// non-degenerate endpoint graph: four endpoints, no shared junctions.
pub fn two_walk_description() -> Description {
    let set = TrajectorySet::from_iter([0, 1]);
    let mut desc = Description::new(0, 9, set).unwrap();
    let root = desc.root();
    for index in [0, 1] {
        let member = TrajectorySet::from_iter([index]);
        let phys = PhysicalActivity::placeholder("WALK", 0, 10, 2, member).unwrap();
        let pid = desc.add_physical(phys);
        let seq = ActivitySequence::new("ACTOR", vec![Activity::Physical(pid)]);
        desc.attach_sequence(root, seq).unwrap();
    }
    desc
}
