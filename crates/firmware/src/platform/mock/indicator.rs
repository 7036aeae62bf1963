//! Mock status indicator for testing

use std::vec::Vec;

use plant_pulse_core::indicator::{IndicatorFrame, IndicatorOutput};

use crate::platform::PlatformError;

/// Records every frame shown
#[derive(Debug, Default)]
pub struct MockIndicator {
    frames: Vec<IndicatorFrame>,
}

impl MockIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[IndicatorFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<IndicatorFrame> {
        self.frames.last().copied()
    }

    /// Number of unlit-to-lit edges seen so far
    pub fn rising_edges(&self) -> usize {
        self.frames
            .windows(2)
            .filter(|w| !w[0].lit && w[1].lit)
            .count()
    }
}

impl IndicatorOutput for MockIndicator {
    type Error = PlatformError;

    fn show(&mut self, frame: IndicatorFrame) -> Result<(), Self::Error> {
        self.frames.push(frame);
        Ok(())
    }
}
