//! Wire formats
//!
//! One function per message type:
//!
//! | Message          | Direction | Format                                         |
//! |------------------|-----------|------------------------------------------------|
//! | Identity request | out       | `{endpoint}?deviceId={id}`                     |
//! | Identity reply   | in        | `{"userId": "..", "groupId": ".."}`            |
//! | Sensor data      | out       | `{"temperature": 21.50, "humidity": 60.00}`    |
//! | Command          | in        | `{"action": "on", "value": 180}`               |
//! | Liveness         | out       | `alive`                                        |
//!
//! Inbound JSON is parsed with `serde-json-core`, which borrows strings from
//! the input buffer and needs no allocator.

use core::fmt::{self, Write};

use heapless::String;
use serde::Deserialize;

use crate::identity::{Identity, IdentityError};
use crate::sensors::FreshReadings;

/// Liveness payload
pub const LIVENESS_PAYLOAD: &str = "alive";

/// Capacity of a sensor data payload
pub const MAX_PAYLOAD_LEN: usize = 192;

/// Capacity of an identity request URL
pub const MAX_URL_LEN: usize = 256;

pub type Payload = String<MAX_PAYLOAD_LEN>;
pub type UrlString = String<MAX_URL_LEN>;

/// Codec errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Body is not the expected JSON document
    Malformed,
    /// Output does not fit its fixed buffer
    Overflow,
    /// Identity reply carried an unusable id
    Identity(IdentityError),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Malformed => f.write_str("malformed JSON"),
            CodecError::Overflow => f.write_str("output buffer overflow"),
            CodecError::Identity(e) => write!(f, "bad identity: {}", e),
        }
    }
}

impl From<IdentityError> for CodecError {
    fn from(e: IdentityError) -> Self {
        CodecError::Identity(e)
    }
}

impl From<fmt::Error> for CodecError {
    fn from(_: fmt::Error) -> Self {
        CodecError::Overflow
    }
}

/// Identity request URL for `device_id`
///
/// The device id is percent-encoded outside the URL unreserved set.
pub fn identity_url(endpoint: &str, device_id: &str) -> Result<UrlString, CodecError> {
    let mut url = UrlString::new();
    let sep = if endpoint.contains('?') { '&' } else { '?' };
    write!(url, "{}{}deviceId=", endpoint, sep)?;
    for b in device_id.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            url.push(b as char).map_err(|_| CodecError::Overflow)?;
        } else {
            write!(url, "%{:02X}", b)?;
        }
    }
    Ok(url)
}

#[derive(Deserialize)]
struct IdentityReply<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    #[serde(rename = "groupId")]
    group_id: &'a str,
}

/// Parse an identity reply body into the device identity
pub fn parse_identity(body: &[u8], device_id: &str) -> Result<Identity, CodecError> {
    let (reply, _) = serde_json_core::from_slice::<IdentityReply<'_>>(body)
        .map_err(|_| CodecError::Malformed)?;
    Ok(Identity::new(device_id, reply.user_id, reply.group_id)?)
}

/// Sensor data payload, keys in reading order, two decimals per value
pub fn format_sensor_payload(readings: &FreshReadings) -> Result<Payload, CodecError> {
    let mut out = Payload::new();
    out.push('{').map_err(|_| CodecError::Overflow)?;
    for (i, reading) in readings.iter().enumerate() {
        if i > 0 {
            out.push_str(", ").map_err(|_| CodecError::Overflow)?;
        }
        write!(out, "\"{}\": {:.2}", reading.channel.key(), reading.value)?;
    }
    out.push('}').map_err(|_| CodecError::Overflow)?;
    Ok(out)
}

/// Command as received, before validation
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawCommand<'a> {
    #[serde(alias = "pump")]
    pub action: &'a str,
    #[serde(default, alias = "speed")]
    pub value: Option<f32>,
}

/// Parse a command payload
pub fn parse_command(payload: &[u8]) -> Result<RawCommand<'_>, CodecError> {
    serde_json_core::from_slice::<RawCommand<'_>>(payload)
        .map(|(cmd, _)| cmd)
        .map_err(|_| CodecError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{Channel, ChannelConfig, ChannelSource, SensorCache};

    struct Climate;

    impl ChannelSource for Climate {
        fn read(&mut self, channel: Channel) -> Option<f32> {
            match channel {
                Channel::Temperature => Some(21.5),
                Channel::Humidity => Some(60.0),
                Channel::Illuminance => Some(312.456),
                _ => None,
            }
        }
    }

    fn readings(channels: &[Channel]) -> FreshReadings {
        let mut cache = SensorCache::default();
        for ch in channels {
            cache.add_channel(ChannelConfig::required(*ch)).unwrap();
        }
        cache.sample(0, &mut Climate);
        cache.read_fresh(0).unwrap()
    }

    #[test]
    fn test_sensor_payload_format() {
        let payload =
            format_sensor_payload(&readings(&[Channel::Temperature, Channel::Humidity])).unwrap();
        assert_eq!(payload.as_str(), "{\"temperature\": 21.50, \"humidity\": 60.00}");
    }

    #[test]
    fn test_sensor_payload_follows_channel_order() {
        let payload = format_sensor_payload(&readings(&[
            Channel::Temperature,
            Channel::Illuminance,
            Channel::Humidity,
        ]))
        .unwrap();
        assert_eq!(
            payload.as_str(),
            "{\"temperature\": 21.50, \"light_intensity\": 312.46, \"humidity\": 60.00}"
        );
    }

    #[test]
    fn test_parse_identity() {
        let identity = parse_identity(br#"{"userId":"u1","groupId":"g1"}"#, "42").unwrap();
        assert_eq!(identity.user_id(), "u1");
        assert_eq!(identity.group_id(), "g1");
        assert_eq!(identity.device_id(), "42");
    }

    #[test]
    fn test_parse_identity_ignores_extra_fields() {
        let body = br#"{"deviceId":"42","userId":"u1","groupId":"g1","plan":3}"#;
        assert!(parse_identity(body, "42").is_ok());
    }

    #[test]
    fn test_parse_identity_failures() {
        assert_eq!(
            parse_identity(b"<html>", "42"),
            Err(CodecError::Malformed)
        );
        assert_eq!(
            parse_identity(br#"{"userId":"u1"}"#, "42"),
            Err(CodecError::Malformed)
        );
        assert_eq!(
            parse_identity(br#"{"userId":"","groupId":"g1"}"#, "42"),
            Err(CodecError::Identity(IdentityError::Empty))
        );
        assert_eq!(
            parse_identity(br#"{"userId":"a/b","groupId":"g1"}"#, "42"),
            Err(CodecError::Identity(IdentityError::ForbiddenCharacter('/')))
        );
    }

    #[test]
    fn test_identity_url() {
        assert_eq!(
            identity_url("https://example.net/getUserId", "42").unwrap().as_str(),
            "https://example.net/getUserId?deviceId=42"
        );
        assert_eq!(
            identity_url("https://example.net/id?v=2", "a b").unwrap().as_str(),
            "https://example.net/id?v=2&deviceId=a%20b"
        );
    }

    #[test]
    fn test_parse_command_fields_and_aliases() {
        let cmd = parse_command(br#"{"action":"on","value":180}"#).unwrap();
        assert_eq!(cmd.action, "on");
        assert_eq!(cmd.value, Some(180.0));

        let legacy = parse_command(br#"{"pump":"OFF","speed":0}"#).unwrap();
        assert_eq!(legacy.action, "OFF");
        assert_eq!(legacy.value, Some(0.0));

        let bare = parse_command(br#"{"action":"on"}"#).unwrap();
        assert_eq!(bare.value, None);
    }

    #[test]
    fn test_parse_command_malformed() {
        assert_eq!(parse_command(b"pump on"), Err(CodecError::Malformed));
        assert_eq!(parse_command(br#"{"value":3}"#), Err(CodecError::Malformed));
        assert_eq!(
            parse_command(br#"{"action":"on","value":"fast"}"#),
            Err(CodecError::Malformed)
        );
    }
}
