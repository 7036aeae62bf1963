//! Node parameters
//!
//! Configuration is fixed at build time and validated once at boot; there
//! is no runtime parameter store.

pub mod node;

pub use node::{
    BuildEnv, ConfigError, NodeParams, TransportPolicy, MAX_ENDPOINT_LEN, MAX_FIELD_LEN,
    MAX_IDLE_WAIT_MS, MAX_PREFIX_LEN,
};
