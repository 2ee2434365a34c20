//! Cruise-control state machine.
//!
//! Two inputs drive it each tick: the button level (edge branch) and the
//! potentiometer delta (disturbance branch). Bounce is handled with a
//! timestamp guard instead of sleeping: after a toggle, press edges are
//! ignored until `now + debounce_ms`.

use crate::config::{CruiseCfg, PotCfg};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CruiseState {
    #[default]
    Inactive,
    Active,
}

impl CruiseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CruiseState::Inactive => "inactive",
            CruiseState::Active => "active",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    Button,
    KnobMoved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CruiseTransition {
    Engaged,
    Released(ReleaseReason),
}

#[derive(Debug, Clone)]
pub struct CruiseControl {
    state: CruiseState,
    last_pressed: bool,
    guard_until_ms: Option<u64>,
    debounce_ms: u64,
    change_threshold: f32,
}

impl CruiseControl {
    pub fn new(cruise: &CruiseCfg, pot: &PotCfg) -> Self {
        Self {
            state: CruiseState::Inactive,
            last_pressed: false,
            guard_until_ms: None,
            debounce_ms: cruise.debounce_ms,
            change_threshold: pot.change_threshold,
        }
    }

    pub fn state(&self) -> CruiseState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == CruiseState::Active
    }

    /// Back to `Inactive` with the button assumed released and no guard pending.
    pub fn reset(&mut self) {
        self.state = CruiseState::Inactive;
        self.last_pressed = false;
        self.guard_until_ms = None;
    }

    /// Edge branch. Toggles on a released-to-pressed edge outside the guard window.
    ///
    /// The stored level is refreshed on every call, including inside the guard,
    /// so a press that is still held when the guard expires is not seen as new.
    pub fn on_button(&mut self, pressed: bool, now_ms: u64) -> Option<CruiseTransition> {
        let edge = pressed && !self.last_pressed;
        self.last_pressed = pressed;
        if !edge {
            return None;
        }
        if let Some(until) = self.guard_until_ms
            && now_ms < until
        {
            tracing::trace!(now_ms, until, "press edge inside debounce guard");
            return None;
        }
        self.guard_until_ms = Some(now_ms.saturating_add(self.debounce_ms));
        Some(match self.state {
            CruiseState::Inactive => {
                self.state = CruiseState::Active;
                CruiseTransition::Engaged
            }
            CruiseState::Active => {
                self.state = CruiseState::Inactive;
                CruiseTransition::Released(ReleaseReason::Button)
            }
        })
    }

    /// Disturbance branch. A knob change above the threshold drops cruise.
    pub fn on_pot_delta(&mut self, delta: f32) -> Option<CruiseTransition> {
        if self.state == CruiseState::Active && delta > self.change_threshold {
            self.state = CruiseState::Inactive;
            return Some(CruiseTransition::Released(ReleaseReason::KnobMoved));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(debounce_ms: u64) -> CruiseControl {
        CruiseControl::new(&CruiseCfg { debounce_ms }, &PotCfg::default())
    }

    #[test]
    fn held_press_is_a_single_edge() {
        let mut c = machine(0);
        assert_eq!(c.on_button(true, 0), Some(CruiseTransition::Engaged));
        assert_eq!(c.on_button(true, 100), None);
        assert_eq!(c.on_button(true, 200), None);
        assert!(c.is_active());
    }

    #[test]
    fn bounce_inside_guard_is_ignored() {
        let mut c = machine(200);
        assert_eq!(c.on_button(true, 1_000), Some(CruiseTransition::Engaged));
        assert_eq!(c.on_button(false, 1_050), None);
        assert_eq!(c.on_button(true, 1_100), None);
        assert!(c.is_active());
        assert_eq!(c.on_button(false, 1_300), None);
        assert_eq!(
            c.on_button(true, 1_400),
            Some(CruiseTransition::Released(ReleaseReason::Button))
        );
    }

    #[test]
    fn knob_change_only_matters_while_active() {
        let mut c = machine(0);
        assert_eq!(c.on_pot_delta(10.0), None);
        c.on_button(true, 0);
        assert_eq!(c.on_pot_delta(0.5), None);
        assert_eq!(
            c.on_pot_delta(0.6),
            Some(CruiseTransition::Released(ReleaseReason::KnobMoved))
        );
        assert_eq!(c.state(), CruiseState::Inactive);
    }
}
