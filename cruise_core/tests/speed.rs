use cruise_core::{PulseCounter, SpeedEstimator};
use rstest::rstest;

fn pulses(n: u32) -> PulseCounter {
    let c = PulseCounter::new();
    for _ in 0..n {
        c.record_edge();
    }
    c
}

#[rstest]
#[case::half_second_rev(3, 500, 120.0)]
#[case::one_second_rev(3, 1_000, 60.0)]
#[case::two_second_rev(3, 2_000, 30.0)]
#[case::single_pulse_sensor(1, 250, 240.0)]
fn speed_is_sixty_over_interval(#[case] ppr: u32, #[case] elapsed_ms: u64, #[case] rpm: f32) {
    let mut est = SpeedEstimator::new(ppr);
    est.reset(10_000);
    let c = pulses(ppr);
    let s = est.update(&c, 10_000 + elapsed_ms).expect("full revolution");
    assert!((s.rpm - rpm).abs() < 1e-3, "got {}", s.rpm);
}

#[test]
fn excess_pulses_are_consumed_by_the_reset() {
    let mut est = SpeedEstimator::new(3);
    est.reset(0);
    let c = pulses(5);
    let s = est.update(&c, 500).expect("updated");
    assert!((s.rpm - 120.0).abs() < 1e-3);
    assert_eq!(c.pending(), 0);
}

#[test]
fn consecutive_revolutions_measure_their_own_interval() {
    let mut est = SpeedEstimator::new(3);
    est.reset(0);
    let c = pulses(3);
    est.update(&c, 1_000).expect("first");
    for _ in 0..3 {
        c.record_edge();
    }
    let s = est.update(&c, 1_500).expect("second");
    assert!((s.rpm - 120.0).abs() < 1e-3);
    assert_eq!(s.at_ms, 1_500);
}

#[test]
fn no_update_below_a_revolution() {
    let mut est = SpeedEstimator::new(3);
    est.reset(0);
    let c = pulses(2);
    assert!(est.update(&c, 400).is_none());
    assert_eq!(est.rpm(), 0.0);
    assert_eq!(c.pending(), 2);
}
