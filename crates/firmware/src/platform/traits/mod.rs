//! Platform trait definitions
//!
//! Each trait abstracts one hardware or transport facility. Implementations
//! live in board support code; host tests use `platform::mock`.

pub mod clock;
pub mod network;
pub mod pwm;
pub mod session;
pub mod timer;

pub use clock::{ClockSource, SYNCED_EPOCH_THRESHOLD};
pub use network::{HttpResponse, NetworkInterface, TrustLevel};
pub use pwm::PwmInterface;
pub use session::{ConnectOptions, MessageSession, QoS};
pub use timer::TimerInterface;
