use cruise_core::{CruiseCfg, CruiseControl, CruiseState, CruiseTransition, PotCfg, ReleaseReason};
use rstest::rstest;

fn machine() -> CruiseControl {
    CruiseControl::new(&CruiseCfg::default(), &PotCfg::default())
}

#[test]
fn press_edges_toggle_cruise() {
    let mut c = machine();
    assert_eq!(c.on_button(false, 0), None);
    assert_eq!(c.on_button(true, 100), Some(CruiseTransition::Engaged));
    assert_eq!(c.state(), CruiseState::Active);
    assert_eq!(c.on_button(false, 400), None);
    assert_eq!(
        c.on_button(true, 500),
        Some(CruiseTransition::Released(ReleaseReason::Button))
    );
    assert_eq!(c.state(), CruiseState::Inactive);
}

#[rstest]
#[case::pressed_button(true)]
#[case::released_button(false)]
fn knob_disturbance_releases_regardless_of_button(#[case] held: bool) {
    let mut c = machine();
    c.on_button(true, 0);
    c.on_button(held, 1_000);
    assert!(c.is_active());
    assert_eq!(
        c.on_pot_delta(0.6),
        Some(CruiseTransition::Released(ReleaseReason::KnobMoved))
    );
    assert_eq!(c.state(), CruiseState::Inactive);
}

#[rstest]
#[case::below(0.4)]
#[case::equal(0.5)]
fn small_knob_changes_keep_cruise(#[case] delta: f32) {
    let mut c = machine();
    c.on_button(true, 0);
    assert_eq!(c.on_pot_delta(delta), None);
    assert!(c.is_active());
}

#[test]
fn released_button_never_changes_state() {
    let mut c = machine();
    for t in (0..10_000).step_by(100) {
        assert_eq!(c.on_button(false, t), None);
        assert_eq!(c.on_pot_delta(0.0), None);
        assert_eq!(c.state(), CruiseState::Inactive);
    }
}

#[test]
fn held_button_does_not_retrigger_after_guard() {
    let mut c = machine();
    assert_eq!(c.on_button(true, 0), Some(CruiseTransition::Engaged));
    for t in (100..5_000).step_by(100) {
        assert_eq!(c.on_button(true, t), None);
    }
    assert!(c.is_active());
}

#[test]
fn guard_expires_after_debounce_interval() {
    let mut c = machine();
    c.on_button(true, 1_000);
    c.on_button(false, 1_100);
    // 1_000 + 200 guard
    assert_eq!(c.on_button(true, 1_199), None);
    c.on_button(false, 1_199);
    assert!(c.on_button(true, 1_200).is_some());
    assert!(!c.is_active());
}

#[test]
fn reset_returns_to_inactive() {
    let mut c = machine();
    c.on_button(true, 0);
    c.reset();
    assert_eq!(c.state(), CruiseState::Inactive);
    assert_eq!(c.on_button(true, 10), Some(CruiseTransition::Engaged));
}
