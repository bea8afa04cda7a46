use std::convert::TryFrom;
use std::fmt;
use std::io;
use std::ops::Deref;
use std::sync::Arc;

use simdutf8::basic::from_utf8;

use super::{write_u16, write_u8, LEVEL_SEP, MATCH_ALL_CHAR, MATCH_ONE_CHAR};
use crate::Error;

pub const MQTT: &[u8] = b"MQTT";

/// The ability of encoding type into `io::Write` under the layout of a
/// protocol version, and calculating encoded size.
pub trait Encodable {
    /// Encode type into `io::Write`
    fn encode<W: io::Write>(&self, writer: &mut W, protocol: Protocol) -> Result<(), Error>;
    /// Calculate the encoded size.
    fn encode_len(&self, protocol: Protocol) -> usize;
}

/// Protocol version.
///
/// The two versions share the fixed header and most of the variable
/// headers; a version only decides the protocol level byte of CONNECT and
/// whether a properties block is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Protocol {
    /// [MQTT 3.1.1] is the most commonly implemented version.
    ///
    /// [MQTT 3.1.1]: https://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html
    #[default]
    MqttV311 = 4,

    /// [MQTT 5.0] is the latest version
    ///
    /// [MQTT 5.0]: https://docs.oasis-open.org/mqtt/mqtt/v5.0/os/mqtt-v5.0-os.html
    MqttV50 = 5,
}

impl Protocol {
    pub fn to_pair(self) -> (&'static [u8], u8) {
        match self {
            Self::MqttV311 => (MQTT, 4),
            Self::MqttV50 => (MQTT, 5),
        }
    }

    /// Whether CONNECT, PUBLISH, SUBSCRIBE and UNSUBSCRIBE carry a
    /// properties block.
    pub fn has_properties(self) -> bool {
        matches!(self, Self::MqttV50)
    }
}

impl TryFrom<u8> for Protocol {
    type Error = Error;
    fn try_from(level: u8) -> Result<Self, Error> {
        match level {
            4 => Ok(Protocol::MqttV311),
            5 => Ok(Protocol::MqttV50),
            _ => Err(Error::InvalidHeader),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let output = match self {
            Self::MqttV311 => "v3.1.1",
            Self::MqttV50 => "v5.0",
        };
        write!(f, "{}", output)
    }
}

impl Encodable for Protocol {
    fn encode<W: io::Write>(&self, writer: &mut W, _protocol: Protocol) -> Result<(), Error> {
        let (name, level) = self.to_pair();
        write_u16(writer, name.len() as u16)?;
        writer.write_all(name)?;
        write_u8(writer, level)?;
        Ok(())
    }

    fn encode_len(&self, _protocol: Protocol) -> usize {
        2 + MQTT.len() + 1
    }
}

/// Packet identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Pid(u16);

impl Pid {
    /// Get the `Pid` as a raw `u16`.
    pub fn value(self) -> u16 {
        self.0
    }
}

impl Default for Pid {
    fn default() -> Pid {
        Pid(1)
    }
}

impl TryFrom<u16> for Pid {
    type Error = Error;
    fn try_from(value: u16) -> Result<Self, Error> {
        if value == 0 {
            Err(Error::ZeroPid)
        } else {
            Ok(Pid(value))
        }
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for Pid {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Pid::try_from(u.arbitrary::<u16>()?).map_err(|_| arbitrary::Error::IncorrectFormat)
    }
}

impl core::ops::Add<u16> for Pid {
    type Output = Pid;

    /// Adding a `u16` to a `Pid` will wrap around and avoid 0.
    fn add(self, u: u16) -> Pid {
        let n = match self.0.overflowing_add(u) {
            (n, false) => n,
            (n, true) => n + 1,
        };
        Pid(n)
    }
}

impl core::ops::AddAssign<u16> for Pid {
    fn add_assign(&mut self, other: u16) {
        *self = *self + other;
    }
}

/// Packet delivery [Quality of Service] level.
///
/// [Quality of Service]: http://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718099
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum QoS {
    /// `QoS 0`. At most once. No ack needed.
    #[default]
    Level0 = 0,
    /// `QoS 1`. At least once. One ack needed.
    Level1 = 1,
    /// `QoS 2`. Exactly once. Two acks needed.
    Level2 = 2,
}

impl QoS {
    pub fn from_u8(byte: u8) -> Result<QoS, Error> {
        match byte {
            0 => Ok(QoS::Level0),
            1 => Ok(QoS::Level1),
            2 => Ok(QoS::Level2),
            n => Err(Error::InvalidQos(n)),
        }
    }
}

/// Combined [`QoS`] and [`Pid`].
///
/// Used only in [`Publish`] packets, a QoS 1/2 message can not be built
/// without its packet identifier.
///
/// [`Publish`]: crate::packet::Publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum QosPid {
    Level0,
    Level1(Pid),
    Level2(Pid),
}

impl QosPid {
    /// Pair a [`QoS`] with a packet identifier, the identifier is only
    /// minted when the level needs one.
    pub fn with<F: FnOnce() -> Pid>(qos: QoS, next_pid: F) -> QosPid {
        match qos {
            QoS::Level0 => QosPid::Level0,
            QoS::Level1 => QosPid::Level1(next_pid()),
            QoS::Level2 => QosPid::Level2(next_pid()),
        }
    }

    /// Extract the [`Pid`] from a `QosPid`, if any.
    pub fn pid(self) -> Option<Pid> {
        match self {
            QosPid::Level0 => None,
            QosPid::Level1(p) => Some(p),
            QosPid::Level2(p) => Some(p),
        }
    }

    /// Extract the [`QoS`] from a `QosPid`.
    pub fn qos(self) -> QoS {
        match self {
            QosPid::Level0 => QoS::Level0,
            QosPid::Level1(_) => QoS::Level1,
            QosPid::Level2(_) => QoS::Level2,
        }
    }
}

/// Topic name.
///
/// See [MQTT 4.7]. An empty name is only encodable by a v5.0 PUBLISH that
/// carries a topic alias.
///
/// [MQTT 4.7]: http://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718106
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicName(Arc<str>);

impl TopicName {
    /// Check if the topic name is invalid.
    pub fn is_invalid(value: &str) -> bool {
        value.contains(|c| c == MATCH_ONE_CHAR || c == MATCH_ALL_CHAR || c == '\0')
    }

    /// The zero length name used together with a topic alias.
    pub fn empty() -> TopicName {
        TopicName(Arc::from(""))
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for TopicName {
    type Error = Error;
    fn try_from(value: &str) -> Result<Self, Error> {
        if TopicName::is_invalid(value) {
            Err(Error::InvalidTopicName(value.into()))
        } else {
            Ok(TopicName(value.into()))
        }
    }
}

impl TryFrom<String> for TopicName {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Error> {
        TopicName::try_from(value.as_str())
    }
}

impl TryFrom<&[u8]> for TopicName {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self, Error> {
        let value = from_utf8(value).map_err(|_| Error::InvalidString)?;
        TopicName::try_from(value)
    }
}

impl Deref for TopicName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for TopicName {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let value: &str = u.arbitrary()?;
        TopicName::try_from(value).map_err(|_| arbitrary::Error::IncorrectFormat)
    }
}

/// Topic filter.
///
/// See [MQTT 4.7].
///
/// [MQTT 4.7]: http://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718106
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicFilter(Arc<str>);

impl TopicFilter {
    /// Check if the topic filter is invalid.
    pub fn is_invalid(value: &str) -> bool {
        if value.is_empty() {
            return true;
        }
        let mut last_sep: Option<usize> = None;
        let mut has_all = false;
        let mut has_one = false;
        for (char_idx, c) in value.chars().enumerate() {
            if c == '\0' {
                return true;
            }
            // "#" must be last char
            if has_all {
                return true;
            }
            if c == LEVEL_SEP {
                // "+" must occupy an entire level of the filter
                if has_one && Some(char_idx) != last_sep.map(|v| v + 2) && char_idx != 1 {
                    return true;
                }
                last_sep = Some(char_idx);
                has_one = false;
            } else if c == MATCH_ALL_CHAR {
                if has_one {
                    // invalid topic filter: "/+#"
                    return true;
                } else if Some(char_idx) == last_sep.map(|v| v + 1) || char_idx == 0 {
                    has_all = true;
                } else {
                    // invalid topic filter: "/ab#"
                    return true;
                }
            } else if c == MATCH_ONE_CHAR {
                if has_one {
                    // invalid topic filter: "/++"
                    return true;
                } else if Some(char_idx) == last_sep.map(|v| v + 1) || char_idx == 0 {
                    has_one = true;
                } else {
                    return true;
                }
            }
        }
        false
    }
}

impl fmt::Display for TopicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for TopicFilter {
    type Error = Error;
    fn try_from(value: &str) -> Result<Self, Error> {
        if TopicFilter::is_invalid(value) {
            Err(Error::InvalidTopicFilter(value.into()))
        } else {
            Ok(TopicFilter(value.into()))
        }
    }
}

impl TryFrom<String> for TopicFilter {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Error> {
        TopicFilter::try_from(value.as_str())
    }
}

impl TryFrom<&[u8]> for TopicFilter {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self, Error> {
        let value = from_utf8(value).map_err(|_| Error::InvalidString)?;
        TopicFilter::try_from(value)
    }
}

impl Deref for TopicFilter {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for TopicFilter {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let value: &str = u.arbitrary()?;
        TopicFilter::try_from(value).map_err(|_| arbitrary::Error::IncorrectFormat)
    }
}

/// An encoded frame, ready to hand to a transport.
///
/// Packets without a body or with only a packet identifier stay on the
/// stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarBytes {
    Dynamic(Vec<u8>),
    Fixed2([u8; 2]),
    Fixed4([u8; 4]),
}

impl VarBytes {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            VarBytes::Dynamic(vec) => vec,
            VarBytes::Fixed2(arr) => &arr[..],
            VarBytes::Fixed4(arr) => &arr[..],
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        match self {
            VarBytes::Dynamic(vec) => vec,
            VarBytes::Fixed2(arr) => arr.to_vec(),
            VarBytes::Fixed4(arr) => arr.to_vec(),
        }
    }
}

impl AsRef<[u8]> for VarBytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
