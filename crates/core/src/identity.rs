//! Resolved identity and topic derivation
//!
//! Topics are `{userId}/{groupId}/{deviceId}/{suffix}`. Identity values are
//! validated before use so a bad server response can never produce a topic
//! with wildcard or level-separator characters in it.

use core::fmt::{self, Write};

use heapless::String;

/// Capacity of a single id
pub const MAX_ID_LEN: usize = 64;

/// Capacity of a derived topic
pub const MAX_TOPIC_LEN: usize = 3 * MAX_ID_LEN + 16;

pub type IdString = String<MAX_ID_LEN>;
pub type TopicString = String<MAX_TOPIC_LEN>;

/// Identity errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IdentityError {
    /// Id is empty
    Empty,
    /// Id longer than [`MAX_ID_LEN`]
    TooLong,
    /// Id contains `/`, `+` or `#`
    ForbiddenCharacter(char),
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::Empty => f.write_str("empty id"),
            IdentityError::TooLong => write!(f, "id longer than {} bytes", MAX_ID_LEN),
            IdentityError::ForbiddenCharacter(c) => write!(f, "id contains '{}'", c),
        }
    }
}

/// Check one id and copy it into fixed storage
pub fn validate_id(id: &str) -> Result<IdString, IdentityError> {
    if id.is_empty() {
        return Err(IdentityError::Empty);
    }
    if let Some(c) = id.chars().find(|c| matches!(c, '/' | '+' | '#')) {
        return Err(IdentityError::ForbiddenCharacter(c));
    }
    let mut out = IdString::new();
    out.push_str(id).map_err(|_| IdentityError::TooLong)?;
    Ok(out)
}

/// Topic role and its suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopicRole {
    /// Sensor data published by the node
    Data,
    /// Commands received by the node
    Command,
    /// Liveness messages
    Liveness,
}

impl TopicRole {
    pub const fn suffix(self) -> &'static str {
        match self {
            TopicRole::Data => "sensor",
            TopicRole::Command => "control",
            TopicRole::Liveness => "ping",
        }
    }
}

/// Device identity after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    device_id: IdString,
    user_id: IdString,
    group_id: IdString,
}

impl Identity {
    pub fn new(device_id: &str, user_id: &str, group_id: &str) -> Result<Self, IdentityError> {
        Ok(Self {
            device_id: validate_id(device_id)?,
            user_id: validate_id(user_id)?,
            group_id: validate_id(group_id)?,
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Topic for one role
    pub fn topic(&self, role: TopicRole) -> TopicString {
        let mut topic = TopicString::new();
        // Three ids of at most MAX_ID_LEN plus separators and suffix always fit
        let _ = write!(
            topic,
            "{}/{}/{}/{}",
            self.user_id,
            self.group_id,
            self.device_id,
            role.suffix()
        );
        topic
    }

    pub fn topics(&self) -> Topics {
        Topics {
            data: self.topic(TopicRole::Data),
            command: self.topic(TopicRole::Command),
            liveness: self.topic(TopicRole::Liveness),
        }
    }
}

/// All topics of a resolved identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub data: TopicString,
    pub command: TopicString,
    pub liveness: TopicString,
}

/// Identity and topics, fixed for the rest of the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identity: Identity,
    pub topics: Topics,
}

impl Credentials {
    pub fn new(identity: Identity) -> Self {
        let topics = identity.topics();
        Self { identity, topics }
    }
}
