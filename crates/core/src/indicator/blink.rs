//! Non-blocking blink state machine
//!
//! [`StatusIndicator::render`] is called once per scheduler pass with the
//! current health code and time. It never waits: every transition is an
//! elapsed-time comparison against the start of the current phase.

use super::{appearance, BlinkSpec, IndicatorFrame};
use crate::health::HealthCode;

/// Phase of a burst pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlinkPhase {
    /// Toggling every `toggle_ms`
    Blinking,
    /// Dark between bursts
    Paused,
}

/// Indicator state, owned by the render task
#[derive(Debug, Clone, Copy)]
pub struct StatusIndicator {
    active: Option<HealthCode>,
    phase: BlinkPhase,
    phase_start_ms: u64,
    toggle_count: u16,
    lit: bool,
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusIndicator {
    pub const fn new() -> Self {
        Self {
            active: None,
            phase: BlinkPhase::Blinking,
            phase_start_ms: 0,
            toggle_count: 0,
            lit: false,
        }
    }

    /// Advance the pattern for `code` and return the frame to show
    ///
    /// A code different from the previous call restarts the pattern at
    /// `now_ms` with the counter cleared and the output dark.
    pub fn render(&mut self, code: HealthCode, now_ms: u64) -> IndicatorFrame {
        if self.active != Some(code) {
            self.restart(code, now_ms);
        }

        let look = appearance(code);
        let lit = match look.pattern.blink_spec() {
            None => {
                self.lit = true;
                true
            }
            Some(spec) => self.advance(spec, now_ms),
        };

        IndicatorFrame {
            color: look.color,
            lit,
        }
    }

    /// Code currently being rendered
    pub fn active(&self) -> Option<HealthCode> {
        self.active
    }

    pub fn phase(&self) -> BlinkPhase {
        self.phase
    }

    pub fn toggle_count(&self) -> u16 {
        self.toggle_count
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    fn restart(&mut self, code: HealthCode, now_ms: u64) {
        self.active = Some(code);
        self.phase = BlinkPhase::Blinking;
        self.phase_start_ms = now_ms;
        self.toggle_count = 0;
        self.lit = false;
    }

    fn advance(&mut self, spec: BlinkSpec, now_ms: u64) -> bool {
        let elapsed = now_ms.saturating_sub(self.phase_start_ms);

        match self.phase {
            BlinkPhase::Blinking => {
                if elapsed >= u64::from(spec.toggle_ms) {
                    self.lit = !self.lit;
                    self.toggle_count = self.toggle_count.saturating_add(1);
                    self.phase_start_ms = now_ms;

                    if !spec.is_continuous() && self.toggle_count >= spec.toggles_per_burst() {
                        self.lit = false;
                        self.phase = BlinkPhase::Paused;
                    }
                }
            }
            BlinkPhase::Paused => {
                if elapsed >= u64::from(spec.pause_ms) {
                    self.toggle_count = 0;
                    self.phase = BlinkPhase::Blinking;
                    self.phase_start_ms = now_ms;
                }
            }
        }

        self.lit
    }
}
