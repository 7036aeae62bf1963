//! Mock actuator for testing

use std::vec::Vec;

use plant_pulse_core::actuator::{ActuationError, Actuator};
use plant_pulse_core::command::ActuationIntent;

/// Records every intent it accepts
#[derive(Debug, Default)]
pub struct MockActuator {
    applied: Vec<ActuationIntent>,
    fault: Option<ActuationError>,
}

impl MockActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actuator that rejects every intent with `error`
    pub fn faulting(error: ActuationError) -> Self {
        Self {
            applied: Vec::new(),
            fault: Some(error),
        }
    }

    pub fn applied(&self) -> &[ActuationIntent] {
        &self.applied
    }

    pub fn last(&self) -> Option<ActuationIntent> {
        self.applied.last().copied()
    }
}

impl Actuator for MockActuator {
    fn apply(&mut self, intent: ActuationIntent) -> Result<(), ActuationError> {
        if let Some(error) = self.fault {
            return Err(error);
        }
        self.applied.push(intent);
        Ok(())
    }
}
