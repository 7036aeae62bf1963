//! Inbound command dispatch
//!
//! Messages on the node's command topic are decoded into an
//! [`ActuationIntent`] and handed to the actuator. Every other topic is
//! ignored. A bad payload is reported as an outcome, never a panic, and
//! never reaches the actuator.

use core::fmt;

use crate::actuator::{ActuationError, Actuator};
use crate::codec::{self, CodecError};
use crate::health::HealthCode;

/// Magnitude used by `on` without a value
pub const DEFAULT_ON_VALUE: u8 = 200;

/// Requested actuator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    On,
    Off,
}

impl Action {
    /// Case-insensitive `on` / `off`
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("on") {
            Some(Action::On)
        } else if s.eq_ignore_ascii_case("off") {
            Some(Action::Off)
        } else {
            None
        }
    }
}

/// Action with its clamped magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuationIntent {
    pub action: Action,
    pub value: u8,
}

/// Valid output magnitude range (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputRange {
    pub min: u8,
    pub max: u8,
}

impl Default for OutputRange {
    fn default() -> Self {
        Self { min: 0, max: 255 }
    }
}

impl OutputRange {
    pub fn clamp(&self, value: f32) -> u8 {
        if value <= f32::from(self.min) {
            self.min
        } else if value >= f32::from(self.max) {
            self.max
        } else {
            value as u8
        }
    }
}

/// Command errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Payload is not a command document
    Malformed(CodecError),
    /// Action field is neither `on` nor `off`
    UnknownAction,
    /// Value is NaN or infinite
    InvalidValue,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Malformed(e) => write!(f, "malformed command: {}", e),
            CommandError::UnknownAction => f.write_str("unknown action"),
            CommandError::InvalidValue => f.write_str("invalid value"),
        }
    }
}

/// Result of handling one inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchOutcome {
    /// Not addressed to the command topic
    Ignored,
    /// Intent accepted by the actuator
    Applied(ActuationIntent),
    /// Payload rejected before actuation
    Rejected(CommandError),
    /// Actuator failed to carry out the intent
    Faulted(ActuationIntent, ActuationError),
}

impl DispatchOutcome {
    /// Health code to raise, if any
    pub const fn health(&self) -> Option<HealthCode> {
        match self {
            DispatchOutcome::Ignored | DispatchOutcome::Applied(_) => None,
            DispatchOutcome::Rejected(_) => Some(HealthCode::CommandRejected),
            DispatchOutcome::Faulted(..) => Some(HealthCode::ActuationFault),
        }
    }
}

/// Decodes commands and drives the actuator
#[derive(Debug, Clone, Copy)]
pub struct CommandDispatcher {
    range: OutputRange,
    default_on_value: u8,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new(OutputRange::default(), DEFAULT_ON_VALUE)
    }
}

impl CommandDispatcher {
    pub fn new(range: OutputRange, default_on_value: u8) -> Self {
        Self {
            range,
            default_on_value,
        }
    }

    /// Decode a payload into a clamped intent
    pub fn decode(&self, payload: &[u8]) -> Result<ActuationIntent, CommandError> {
        let raw = codec::parse_command(payload).map_err(CommandError::Malformed)?;
        let action = Action::parse(raw.action).ok_or(CommandError::UnknownAction)?;

        let value = match (action, raw.value) {
            (Action::Off, _) => 0,
            (Action::On, None) => self.range.clamp(f32::from(self.default_on_value)),
            (Action::On, Some(v)) if !v.is_finite() => return Err(CommandError::InvalidValue),
            (Action::On, Some(v)) => self.range.clamp(v),
        };

        Ok(ActuationIntent { action, value })
    }

    /// Handle one inbound message
    pub fn on_message<A: Actuator>(
        &self,
        command_topic: &str,
        topic: &str,
        payload: &[u8],
        actuator: &mut A,
    ) -> DispatchOutcome {
        if topic != command_topic {
            return DispatchOutcome::Ignored;
        }

        let intent = match self.decode(payload) {
            Ok(intent) => intent,
            Err(e) => return DispatchOutcome::Rejected(e),
        };

        match actuator.apply(intent) {
            Ok(()) => DispatchOutcome::Applied(intent),
            Err(e) => DispatchOutcome::Faulted(intent, e),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;

    const TOPIC: &str = "u1/g1/42/control";

    #[derive(Default)]
    struct RecordingActuator {
        applied: Vec<ActuationIntent>,
        fail: bool,
    }

    impl Actuator for RecordingActuator {
        fn apply(&mut self, intent: ActuationIntent) -> Result<(), ActuationError> {
            if self.fail {
                return Err(ActuationError::HardwareFault);
            }
            self.applied.push(intent);
            Ok(())
        }
    }

    fn dispatch(payload: &str, actuator: &mut RecordingActuator) -> DispatchOutcome {
        CommandDispatcher::default().on_message(TOPIC, TOPIC, payload.as_bytes(), actuator)
    }

    #[test]
    fn test_on_with_value() {
        let mut act = RecordingActuator::default();
        let outcome = dispatch(r#"{"action":"on","value":180}"#, &mut act);
        let intent = ActuationIntent {
            action: Action::On,
            value: 180,
        };
        assert_eq!(outcome, DispatchOutcome::Applied(intent));
        assert_eq!(act.applied, [intent]);
        assert_eq!(outcome.health(), None);
    }

    #[test]
    fn test_value_clamped_to_range() {
        let mut act = RecordingActuator::default();
        dispatch(r#"{"action":"ON","value":999}"#, &mut act);
        dispatch(r#"{"action":"on","value":-20}"#, &mut act);
        assert_eq!(act.applied[0].value, 255);
        assert_eq!(act.applied[1].value, 0);

        let narrow = CommandDispatcher::new(OutputRange { min: 50, max: 150 }, 200);
        assert_eq!(narrow.decode(br#"{"action":"on"}"#).unwrap().value, 150);
        assert_eq!(
            narrow.decode(br#"{"action":"on","value":10}"#).unwrap().value,
            50
        );
    }

    #[test]
    fn test_default_and_off_magnitudes() {
        let dispatcher = CommandDispatcher::default();
        assert_eq!(
            dispatcher.decode(br#"{"action":"on"}"#).unwrap(),
            ActuationIntent {
                action: Action::On,
                value: DEFAULT_ON_VALUE
            }
        );
        assert_eq!(
            dispatcher.decode(br#"{"action":"Off","value":120}"#).unwrap(),
            ActuationIntent {
                action: Action::Off,
                value: 0
            }
        );
    }

    #[test]
    fn test_legacy_aliases() {
        let mut act = RecordingActuator::default();
        let outcome = dispatch(r#"{"pump":"ON","speed":150}"#, &mut act);
        assert_eq!(
            outcome,
            DispatchOutcome::Applied(ActuationIntent {
                action: Action::On,
                value: 150
            })
        );
    }

    #[test]
    fn test_other_topic_ignored() {
        let mut act = RecordingActuator::default();
        let outcome = CommandDispatcher::default().on_message(
            TOPIC,
            "u1/g1/42/sensor",
            br#"{"action":"on"}"#,
            &mut act,
        );
        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert!(act.applied.is_empty());
        assert_eq!(outcome.health(), None);
    }

    #[test]
    fn test_malformed_rejected_without_actuation() {
        let mut act = RecordingActuator::default();
        for payload in ["", "{", r#"{"action":"spin"}"#, r#"{"speed":10}"#] {
            let outcome = dispatch(payload, &mut act);
            assert!(matches!(outcome, DispatchOutcome::Rejected(_)), "{}", payload);
            assert_eq!(outcome.health(), Some(HealthCode::CommandRejected));
        }
        assert!(act.applied.is_empty());
        assert_eq!(
            dispatch(r#"{"action":"toggle"}"#, &mut act),
            DispatchOutcome::Rejected(CommandError::UnknownAction)
        );
    }

    #[test]
    fn test_actuator_failure_faults() {
        let mut act = RecordingActuator {
            fail: true,
            ..Default::default()
        };
        let outcome = dispatch(r#"{"action":"off"}"#, &mut act);
        assert!(matches!(
            outcome,
            DispatchOutcome::Faulted(_, ActuationError::HardwareFault)
        ));
        assert_eq!(outcome.health(), Some(HealthCode::ActuationFault));
    }
}
