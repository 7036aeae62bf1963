//! Node health and its indicator
//!
//! [`StatusDisplay`] holds the current [`HealthCode`] together with the
//! indicator state machine that renders it. Components write the code;
//! the render task (or a bootstrap wait) draws it.

use plant_pulse_core::health::HealthCode;
use plant_pulse_core::indicator::{IndicatorFrame, IndicatorOutput, StatusIndicator};

use crate::platform::traits::TimerInterface;

/// Current health code plus its rendering state
#[derive(Debug, Clone, Default)]
pub struct StatusDisplay {
    health: HealthCode,
    indicator: StatusIndicator,
    output_faulted: bool,
}

impl StatusDisplay {
    pub const fn new() -> Self {
        Self {
            health: HealthCode::Idle,
            indicator: StatusIndicator::new(),
            output_faulted: false,
        }
    }

    pub fn health(&self) -> HealthCode {
        self.health
    }

    pub fn indicator(&self) -> &StatusIndicator {
        &self.indicator
    }

    /// Set the health code; transitions are logged
    pub fn set(&mut self, code: HealthCode) {
        if code == self.health {
            return;
        }
        if code.is_fatal() {
            crate::log_error!("Health: {} -> {}", self.health.as_str(), code.as_str());
        } else {
            crate::log_info!("Health: {} -> {}", self.health.as_str(), code.as_str());
        }
        self.health = code;
    }

    /// Advance the pattern and drive `output`
    ///
    /// Output errors are logged once per fault episode and otherwise ignored;
    /// the indicator never stops the node.
    pub fn render<O: IndicatorOutput>(&mut self, now_ms: u64, output: &mut O) -> IndicatorFrame {
        let frame = self.indicator.render(self.health, now_ms);
        match output.show(frame) {
            Ok(()) => self.output_faulted = false,
            Err(_) => {
                if !self.output_faulted {
                    crate::log_warn!("Indicator output failed");
                }
                self.output_faulted = true;
            }
        }
        frame
    }
}

/// Blocking wait that keeps the indicator alive
///
/// Used only before the scheduler starts. Every wait is cut into slices of
/// at most `slice_ms` with a render before each slice.
pub struct IndicatorPause<'a, T, O>
where
    T: TimerInterface,
    O: IndicatorOutput,
{
    timer: &'a mut T,
    output: &'a mut O,
    status: &'a mut StatusDisplay,
    slice_ms: u32,
}

impl<'a, T, O> IndicatorPause<'a, T, O>
where
    T: TimerInterface,
    O: IndicatorOutput,
{
    pub fn new(
        timer: &'a mut T,
        output: &'a mut O,
        status: &'a mut StatusDisplay,
        slice_ms: u32,
    ) -> Self {
        Self {
            timer,
            output,
            status,
            slice_ms: slice_ms.max(1),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.timer.now_ms()
    }

    pub fn health(&self) -> HealthCode {
        self.status.health()
    }

    /// Set the health code and draw it immediately
    pub fn set(&mut self, code: HealthCode) {
        self.status.set(code);
        self.render();
    }

    pub fn render(&mut self) {
        let now = self.timer.now_ms();
        self.status.render(now, &mut *self.output);
    }

    /// Wait `ms`, rendering between slices
    pub fn wait(&mut self, ms: u32) {
        let mut remaining = ms;
        while remaining > 0 {
            self.render();
            let step = remaining.min(self.slice_ms);
            if self.timer.delay_ms(step).is_err() {
                crate::log_warn!("Timer delay failed");
            }
            remaining -= step;
        }
        self.render();
    }
}
