//! Status indicator vocabulary
//!
//! Maps each [`HealthCode`] to a color and a blink pattern through a fixed
//! lookup table. The pattern is advanced by [`StatusIndicator`], a
//! non-blocking state machine called once per scheduler pass.
//!
//! # Pattern Table
//!
//! | Pattern     | Toggle (ms) | Blinks/burst | Pause (ms) |
//! |-------------|-------------|--------------|------------|
//! | Solid       | -           | -            | -          |
//! | Slow        | 1000        | continuous   | -          |
//! | Fast        | 300         | continuous   | -          |
//! | Double      | 300         | 2            | 800        |
//! | Triple      | 200         | 3            | 800        |
//! | QuickDouble | 150         | 2            | 600        |

pub mod blink;

pub use blink::{BlinkPhase, StatusIndicator};

use crate::health::HealthCode;

/// Indicator color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Green,
    Yellow,
    Blue,
    Orange,
    Red,
    Purple,
}

impl Color {
    /// 8-bit RGB levels for an RGB LED
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Green => (0, 255, 0),
            Color::Yellow => (255, 255, 0),
            Color::Blue => (0, 0, 255),
            Color::Orange => (255, 100, 0),
            Color::Red => (255, 0, 0),
            Color::Purple => (128, 0, 255),
        }
    }
}

/// Timing of a blinking pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkSpec {
    /// Time between output toggles
    pub toggle_ms: u32,
    /// Full on/off cycles per burst; 0 blinks continuously without pausing
    pub blinks_per_burst: u8,
    /// Dark pause between bursts
    pub pause_ms: u32,
}

impl BlinkSpec {
    /// Continuous patterns never enter the paused phase
    pub const fn is_continuous(&self) -> bool {
        self.blinks_per_burst == 0
    }

    /// Number of toggles that complete one burst
    pub const fn toggles_per_burst(&self) -> u16 {
        2 * self.blinks_per_burst as u16
    }
}

/// Indicator pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    Solid,
    Slow,
    Fast,
    Double,
    Triple,
    QuickDouble,
}

impl Pattern {
    /// Blink timing, or `None` for a solid pattern
    pub const fn blink_spec(self) -> Option<BlinkSpec> {
        let spec = match self {
            Pattern::Solid => return None,
            Pattern::Slow => BlinkSpec {
                toggle_ms: 1000,
                blinks_per_burst: 0,
                pause_ms: 0,
            },
            Pattern::Fast => BlinkSpec {
                toggle_ms: 300,
                blinks_per_burst: 0,
                pause_ms: 0,
            },
            Pattern::Double => BlinkSpec {
                toggle_ms: 300,
                blinks_per_burst: 2,
                pause_ms: 800,
            },
            Pattern::Triple => BlinkSpec {
                toggle_ms: 200,
                blinks_per_burst: 3,
                pause_ms: 800,
            },
            Pattern::QuickDouble => BlinkSpec {
                toggle_ms: 150,
                blinks_per_burst: 2,
                pause_ms: 600,
            },
        };
        Some(spec)
    }
}

/// Color and pattern shown for a health code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub color: Color,
    pub pattern: Pattern,
}

/// Fixed lookup table from health code to appearance
pub const fn appearance(code: HealthCode) -> Appearance {
    let (color, pattern) = match code {
        HealthCode::Idle => (Color::Blue, Pattern::Slow),
        HealthCode::Probing => (Color::Yellow, Pattern::Slow),
        HealthCode::ProbeFailed => (Color::Red, Pattern::Fast),
        HealthCode::ClockSyncFailed => (Color::Red, Pattern::Triple),
        HealthCode::TransportUnverified => (Color::Orange, Pattern::QuickDouble),
        HealthCode::TransportVerified => (Color::Blue, Pattern::Double),
        HealthCode::IdentityFailed => (Color::Red, Pattern::Solid),
        HealthCode::Connecting => (Color::Yellow, Pattern::Fast),
        HealthCode::SessionDown => (Color::Red, Pattern::Double),
        HealthCode::SessionUp => (Color::Green, Pattern::Slow),
        HealthCode::PublishOk => (Color::Green, Pattern::Solid),
        HealthCode::PublishFailed => (Color::Red, Pattern::QuickDouble),
        HealthCode::SensorStale => (Color::Yellow, Pattern::Triple),
        HealthCode::CommandRejected => (Color::Orange, Pattern::Triple),
        HealthCode::ActuationFault => (Color::Purple, Pattern::Double),
    };
    Appearance { color, pattern }
}

/// One rendered indicator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndicatorFrame {
    pub color: Color,
    pub lit: bool,
}

impl IndicatorFrame {
    /// RGB levels to drive, all zero when dark
    pub const fn rgb(&self) -> (u8, u8, u8) {
        if self.lit {
            self.color.rgb()
        } else {
            (0, 0, 0)
        }
    }
}

/// Output device consuming rendered frames
pub trait IndicatorOutput {
    type Error;

    /// Drive the output to match `frame`
    fn show(&mut self, frame: IndicatorFrame) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CODES: [HealthCode; 15] = [
        HealthCode::Idle,
        HealthCode::Probing,
        HealthCode::ProbeFailed,
        HealthCode::ClockSyncFailed,
        HealthCode::TransportUnverified,
        HealthCode::TransportVerified,
        HealthCode::IdentityFailed,
        HealthCode::Connecting,
        HealthCode::SessionDown,
        HealthCode::SessionUp,
        HealthCode::PublishOk,
        HealthCode::PublishFailed,
        HealthCode::SensorStale,
        HealthCode::CommandRejected,
        HealthCode::ActuationFault,
    ];

    #[test]
    fn test_every_code_has_a_distinct_appearance() {
        for (i, a) in ALL_CODES.iter().enumerate() {
            for b in ALL_CODES.iter().skip(i + 1) {
                assert_ne!(appearance(*a), appearance(*b), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_fatal_codes_do_not_share_transient_appearance() {
        let fatal = appearance(HealthCode::IdentityFailed);
        assert_eq!(fatal.color, Color::Red);
        assert_eq!(fatal.pattern, Pattern::Solid);
    }

    #[test]
    fn test_blink_spec_table() {
        assert!(Pattern::Solid.blink_spec().is_none());

        let double = Pattern::Double.blink_spec().unwrap();
        assert_eq!(double.toggle_ms, 300);
        assert_eq!(double.toggles_per_burst(), 4);
        assert_eq!(double.pause_ms, 800);

        let quick = Pattern::QuickDouble.blink_spec().unwrap();
        assert_eq!(quick.toggle_ms, 150);
        assert_eq!(quick.pause_ms, 600);

        assert!(Pattern::Slow.blink_spec().unwrap().is_continuous());
        assert!(!Pattern::Triple.blink_spec().unwrap().is_continuous());
    }

    #[test]
    fn test_frame_rgb_dark_when_unlit() {
        let lit = IndicatorFrame {
            color: Color::Orange,
            lit: true,
        };
        let dark = IndicatorFrame {
            color: Color::Orange,
            lit: false,
        };
        assert_eq!(lit.rgb(), (255, 100, 0));
        assert_eq!(dark.rgb(), (0, 0, 0));
    }
}
