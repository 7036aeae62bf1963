//! Network-facing protocols
//!
//! - `bootstrap`: one-shot diagnostic chain run before the loop starts
//! - `identity`: user/group lookup over HTTP
//! - `session`: publish/subscribe session upkeep

pub mod bootstrap;
pub mod identity;
pub mod session;

pub use bootstrap::{BootstrapChain, BootstrapError, BootstrapOutcome, BootstrapReport};
pub use identity::{IdentityResolver, ResolveError};
pub use session::{ConnectOutcome, PublishOutcome, SessionConfig, SessionManager, SessionStats};
