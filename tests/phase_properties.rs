use cube_morph::camera3d::{dolly_target, BASE_DEPTH};
use cube_morph::phases::{retreat_progress, staggered_progress, PhaseState, Phases};
use cube_morph::title::TitleLabel;

fn sweep(steps: usize) -> impl Iterator<Item = f32> {
    (0..=steps).map(move |i| i as f32 / steps as f32)
}

#[test]
fn phases_stay_in_unit_range_and_never_decrease() {
    let mut previous = Phases::from_progress(0.0).as_array();
    for progress in sweep(2000) {
        let current = Phases::from_progress(progress).as_array();
        for (value, before) in current.iter().zip(previous.iter()) {
            assert!((0.0..=1.0).contains(value), "phase out of range at {progress}: {value}");
            assert!(value >= before, "phase decreased at {progress}");
        }
        previous = current;
    }
}

#[test]
fn phase_boundaries() {
    assert_eq!(Phases::from_progress(0.05).as_array(), [0.0; 4]);

    let at_035 = Phases::from_progress(0.35);
    assert!((at_035.transform - 1.0).abs() < 1e-5);
    assert_eq!(at_035.pyramid, 0.0);

    let at_060 = Phases::from_progress(0.60);
    assert!((at_060.pyramid - 1.0).abs() < 1e-5);
    assert_eq!(at_060.ball, 0.0);

    let at_085 = Phases::from_progress(0.85);
    assert!((at_085.ball - 1.0).abs() < 1e-5);
    assert_eq!(at_085.pyramid_transform, 0.0);

    assert_eq!(Phases::from_progress(1.0).pyramid_transform, 1.0);
}

#[test]
fn at_most_two_phases_are_in_flight() {
    for progress in sweep(2000) {
        let phases = Phases::from_progress(progress);
        let in_flight = phases.as_array().iter().filter(|v| **v > 0.0 && **v < 1.0).count();
        assert!(in_flight <= 2, "{in_flight} phases partially active at {progress}");
    }
}

#[test]
fn later_phase_wins_state() {
    assert_eq!(Phases::from_progress(0.0).state(), PhaseState::Idle);
    assert_eq!(Phases::from_progress(0.2).state(), PhaseState::Assembling);
    assert_eq!(Phases::from_progress(0.5).state(), PhaseState::Pyramid);
    assert_eq!(Phases::from_progress(0.7).state(), PhaseState::Ball);
    assert_eq!(Phases::from_progress(0.9).state(), PhaseState::PyramidTransform);
}

#[test]
fn stagger_is_monotonic_in_index() {
    for transform in sweep(50) {
        let mut previous = staggered_progress(transform, 0);
        for index in 1..40 {
            let current = staggered_progress(transform, index);
            assert!(current <= previous, "stagger increased at index {index}, transform {transform}");
            previous = current;
        }
    }
}

#[test]
fn retreat_progress_is_clamped_and_staggered() {
    assert_eq!(retreat_progress(0.05, 0), 0.0);
    assert_eq!(retreat_progress(0.0, 0), 1.0);
    assert!((retreat_progress(0.03, 0) - 0.4).abs() < 1e-5);
    assert!(retreat_progress(0.05, 1) > retreat_progress(0.05, 0));
    assert_eq!(retreat_progress(0.05, 10), 1.0);
}

#[test]
fn title_label_priority() {
    let with = |ball: f32, pyramid_transform: f32| Phases { transform: 1.0, pyramid: 1.0, ball, pyramid_transform };
    assert_eq!(TitleLabel::for_phases(&with(0.5, 0.0)).as_str(), "SPHERE");
    assert_eq!(TitleLabel::for_phases(&with(0.5, 0.3)).as_str(), "PYRAMID");
    assert_eq!(TitleLabel::for_phases(&with(0.0, 0.0)).as_str(), "CUBE");
}

#[test]
fn camera_depth_targets() {
    assert_eq!(dolly_target(&Phases::from_progress(0.05)), BASE_DEPTH);
    assert!((dolly_target(&Phases::from_progress(1.0)) - 20.0).abs() < 1e-5);
}
