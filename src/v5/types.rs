use std::fmt;
use std::io;
use std::sync::Arc;

use bytes::Bytes;

use crate::packet::PacketType;
use crate::{
    var_int_len, write_bytes, write_string, write_u16, write_u32, write_u8, write_var_int,
    Encodable, Error, Protocol, TopicName, MAX_REMAINING_LEN,
};

/// [Property type](https://docs.oasis-open.org/mqtt/mqtt/v5.0/os/mqtt-v5.0-os.html#_Toc3901027)
///
/// Only the properties a client sends are listed.
///
/// | Dec |  Hex | Name (usage)                      | Type                  | Packet / Will Properties                        |
/// |-----|------|-----------------------------------|-----------------------|-------------------------------------------------|
/// |   1 | 0x01 | Payload Format Indicator          | Byte                  | PUBLISH, Will Properties                        |
/// |   2 | 0x02 | Message Expiry Interval           | Four Byte Integer     | PUBLISH, Will Properties                        |
/// |   3 | 0x03 | Content Type                      | UTF-8 Encoded String  | PUBLISH, Will Properties                        |
/// |   8 | 0x08 | Response Topic                    | UTF-8 Encoded String  | PUBLISH, Will Properties                        |
/// |   9 | 0x09 | Correlation Data                  | Binary Data           | PUBLISH, Will Properties                        |
/// |  11 | 0x0B | Subscription Identifier           | Variable Byte Integer | SUBSCRIBE                                       |
/// |  17 | 0x11 | Session Expiry Interval           | Four Byte Integer     | CONNECT                                         |
/// |  21 | 0x15 | Authentication Method             | UTF-8 Encoded String  | CONNECT                                         |
/// |  22 | 0x16 | Authentication Data               | Binary Data           | CONNECT                                         |
/// |  23 | 0x17 | Request Problem Information       | Byte                  | CONNECT                                         |
/// |  24 | 0x18 | Will Delay Interval               | Four Byte Integer     | Will Properties                                 |
/// |  25 | 0x19 | Request Response Information      | Byte                  | CONNECT                                         |
/// |  33 | 0x21 | Receive Maximum                   | Two Byte Integer      | CONNECT                                         |
/// |  34 | 0x22 | Topic Alias Maximum               | Two Byte Integer      | CONNECT                                         |
/// |  35 | 0x23 | Topic Alias                       | Two Byte Integer      | PUBLISH                                         |
/// |  38 | 0x26 | User Property                     | UTF-8 String Pair     | CONNECT, PUBLISH, Will Properties, SUBSCRIBE,   |
/// |     |      |                                   |                       | UNSUBSCRIBE                                     |
/// |  39 | 0x27 | Maximum Packet Size               | Four Byte Integer     | CONNECT                                         |
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    PayloadFormatIndicator = 0x01,
    MessageExpiryInterval = 0x02,
    ContentType = 0x03,
    ResponseTopic = 0x08,
    CorrelationData = 0x09,
    SubscriptionIdentifier = 0x0B,
    SessionExpiryInterval = 0x11,
    AuthenticationMethod = 0x15,
    AuthenticationData = 0x16,
    RequestProblemInformation = 0x17,
    WillDelayInterval = 0x18,
    RequestResponseInformation = 0x19,
    ReceiveMaximum = 0x21,
    TopicAliasMaximum = 0x22,
    TopicAlias = 0x23,
    UserProperty = 0x26,
    MaximumPacketSize = 0x27,
}

impl PropertyType {
    /// Properties a packet of `packet_type` may carry.
    pub fn allowed_in(packet_type: PacketType) -> &'static [PropertyType] {
        use PropertyType::*;
        match packet_type {
            PacketType::Connect => &[
                SessionExpiryInterval,
                ReceiveMaximum,
                MaximumPacketSize,
                TopicAliasMaximum,
                RequestResponseInformation,
                RequestProblemInformation,
                UserProperty,
                AuthenticationMethod,
                AuthenticationData,
            ],
            PacketType::Publish => &[
                PayloadFormatIndicator,
                MessageExpiryInterval,
                TopicAlias,
                ResponseTopic,
                CorrelationData,
                UserProperty,
                ContentType,
            ],
            PacketType::Subscribe => &[SubscriptionIdentifier, UserProperty],
            PacketType::Unsubscribe => &[UserProperty],
            _ => &[],
        }
    }

    /// Properties the will message in CONNECT may carry.
    pub fn allowed_in_will() -> &'static [PropertyType] {
        use PropertyType::*;
        &[
            WillDelayInterval,
            PayloadFormatIndicator,
            MessageExpiryInterval,
            ContentType,
            ResponseTopic,
            CorrelationData,
            UserProperty,
        ]
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// User Property is a UTF-8 String Pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserProperty {
    /// The name of the user property.
    pub name: Arc<str>,
    /// The value of the user property.
    pub value: Arc<str>,
}

impl UserProperty {
    pub fn new(name: &str, value: &str) -> Self {
        UserProperty {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A property identifier together with its typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// `true` when the payload is UTF-8 encoded character data.
    PayloadFormatIndicator(bool),
    MessageExpiryInterval(u32),
    ContentType(Arc<str>),
    ResponseTopic(TopicName),
    CorrelationData(Bytes),
    /// Encoded as a variable byte integer, 1 to 268,435,455.
    SubscriptionIdentifier(u32),
    SessionExpiryInterval(u32),
    AuthenticationMethod(Arc<str>),
    AuthenticationData(Bytes),
    RequestProblemInformation(bool),
    WillDelayInterval(u32),
    RequestResponseInformation(bool),
    ReceiveMaximum(u16),
    TopicAliasMaximum(u16),
    TopicAlias(u16),
    UserProperty(UserProperty),
    MaximumPacketSize(u32),
}

impl Property {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Property::PayloadFormatIndicator(_) => PropertyType::PayloadFormatIndicator,
            Property::MessageExpiryInterval(_) => PropertyType::MessageExpiryInterval,
            Property::ContentType(_) => PropertyType::ContentType,
            Property::ResponseTopic(_) => PropertyType::ResponseTopic,
            Property::CorrelationData(_) => PropertyType::CorrelationData,
            Property::SubscriptionIdentifier(_) => PropertyType::SubscriptionIdentifier,
            Property::SessionExpiryInterval(_) => PropertyType::SessionExpiryInterval,
            Property::AuthenticationMethod(_) => PropertyType::AuthenticationMethod,
            Property::AuthenticationData(_) => PropertyType::AuthenticationData,
            Property::RequestProblemInformation(_) => PropertyType::RequestProblemInformation,
            Property::WillDelayInterval(_) => PropertyType::WillDelayInterval,
            Property::RequestResponseInformation(_) => PropertyType::RequestResponseInformation,
            Property::ReceiveMaximum(_) => PropertyType::ReceiveMaximum,
            Property::TopicAliasMaximum(_) => PropertyType::TopicAliasMaximum,
            Property::TopicAlias(_) => PropertyType::TopicAlias,
            Property::UserProperty(_) => PropertyType::UserProperty,
            Property::MaximumPacketSize(_) => PropertyType::MaximumPacketSize,
        }
    }

    /// Reject values the protocol forbids (zero aliases, zero maximums,
    /// out of range subscription identifiers).
    fn check_value(&self) -> Result<(), Error> {
        let invalid = match *self {
            Property::SubscriptionIdentifier(value) => {
                value == 0 || value as usize > MAX_REMAINING_LEN
            }
            Property::TopicAlias(value) | Property::ReceiveMaximum(value) => value == 0,
            Property::MaximumPacketSize(value) => value == 0,
            _ => false,
        };
        if invalid {
            let value = match *self {
                Property::SubscriptionIdentifier(v) | Property::MaximumPacketSize(v) => v,
                Property::TopicAlias(v) | Property::ReceiveMaximum(v) => u32::from(v),
                _ => 0,
            };
            return Err(Error::InvalidPropertyValue(self.property_type(), value));
        }
        Ok(())
    }

    /// Encoded size, including the identifier byte.
    pub fn encode_len(&self) -> usize {
        let value_len = match self {
            Property::PayloadFormatIndicator(_)
            | Property::RequestProblemInformation(_)
            | Property::RequestResponseInformation(_) => 1,
            Property::ReceiveMaximum(_)
            | Property::TopicAliasMaximum(_)
            | Property::TopicAlias(_) => 2,
            Property::MessageExpiryInterval(_)
            | Property::SessionExpiryInterval(_)
            | Property::WillDelayInterval(_)
            | Property::MaximumPacketSize(_) => 4,
            Property::ContentType(value) | Property::AuthenticationMethod(value) => {
                2 + value.len()
            }
            Property::ResponseTopic(value) => 2 + value.len(),
            Property::CorrelationData(value) | Property::AuthenticationData(value) => {
                2 + value.len()
            }
            // out of range values are rejected before encoding
            Property::SubscriptionIdentifier(value) => var_int_len(*value as usize).unwrap_or(4),
            Property::UserProperty(UserProperty { name, value }) => 4 + name.len() + value.len(),
        };
        1 + value_len
    }

    pub(crate) fn encode<W: io::Write>(&self, writer: &mut W) -> Result<(), Error> {
        write_u8(writer, self.property_type() as u8)?;
        match self {
            Property::PayloadFormatIndicator(value)
            | Property::RequestProblemInformation(value)
            | Property::RequestResponseInformation(value) => write_u8(writer, u8::from(*value)),
            Property::ReceiveMaximum(value)
            | Property::TopicAliasMaximum(value)
            | Property::TopicAlias(value) => write_u16(writer, *value),
            Property::MessageExpiryInterval(value)
            | Property::SessionExpiryInterval(value)
            | Property::WillDelayInterval(value)
            | Property::MaximumPacketSize(value) => write_u32(writer, *value),
            Property::ContentType(value) | Property::AuthenticationMethod(value) => {
                write_string(writer, value)
            }
            Property::ResponseTopic(value) => write_string(writer, value),
            Property::CorrelationData(value) | Property::AuthenticationData(value) => {
                write_bytes(writer, value)
            }
            Property::SubscriptionIdentifier(value) => write_var_int(writer, *value as usize),
            Property::UserProperty(UserProperty { name, value }) => {
                write_string(writer, name)?;
                write_string(writer, value)
            }
        }
    }
}

/// An ordered property list.
///
/// Properties are written in the order they were added. User properties
/// may repeat, any other property may appear once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Properties(Vec<Property>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property, builder style.
    pub fn with(mut self, property: Property) -> Self {
        self.0.push(property);
        self
    }

    /// Append a user property, builder style.
    pub fn with_user_property(self, name: &str, value: &str) -> Self {
        self.with(Property::UserProperty(UserProperty::new(name, value)))
    }

    pub fn push(&mut self, property: Property) {
        self.0.push(property);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.0.iter()
    }

    pub fn contains(&self, property_type: PropertyType) -> bool {
        self.0.iter().any(|p| p.property_type() == property_type)
    }

    pub fn topic_alias(&self) -> Option<u16> {
        self.0.iter().find_map(|p| match p {
            Property::TopicAlias(alias) => Some(*alias),
            _ => None,
        })
    }

    /// Size of the encoded properties, without the length prefix.
    pub fn content_len(&self) -> usize {
        self.0.iter().map(Property::encode_len).sum()
    }

    /// Check the list against the properties a packet accepts.
    pub fn validate(&self, packet_type: PacketType, protocol: Protocol) -> Result<(), Error> {
        self.check(PropertyType::allowed_in(packet_type), protocol, |typ| {
            Error::InvalidProperty(typ, packet_type)
        })?;
        if packet_type == PacketType::Connect
            && self.contains(PropertyType::AuthenticationData)
            && !self.contains(PropertyType::AuthenticationMethod)
        {
            return Err(Error::AuthMethodMissing);
        }
        Ok(())
    }

    /// Check the list against the properties a will message accepts.
    pub fn validate_will(&self, protocol: Protocol) -> Result<(), Error> {
        self.check(
            PropertyType::allowed_in_will(),
            protocol,
            Error::InvalidWillProperty,
        )
    }

    fn check<F>(
        &self,
        allowed: &[PropertyType],
        protocol: Protocol,
        invalid: F,
    ) -> Result<(), Error>
    where
        F: Fn(PropertyType) -> Error,
    {
        if self.is_empty() {
            return Ok(());
        }
        if !protocol.has_properties() {
            return Err(Error::PropertiesUnsupported(protocol));
        }
        for (idx, property) in self.0.iter().enumerate() {
            let typ = property.property_type();
            if !allowed.contains(&typ) {
                return Err(invalid(typ));
            }
            if typ != PropertyType::UserProperty
                && self.0[..idx].iter().any(|p| p.property_type() == typ)
            {
                return Err(Error::DuplicatedProperty(typ));
            }
            property.check_value()?;
        }
        Ok(())
    }
}

impl From<Vec<Property>> for Properties {
    fn from(properties: Vec<Property>) -> Self {
        Properties(properties)
    }
}

impl FromIterator<Property> for Properties {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        Properties(iter.into_iter().collect())
    }
}

/// The properties block: a variable byte integer length followed by the
/// properties. Without properties the block is the single byte `0x00`.
/// Protocols without properties write nothing.
impl Encodable for Properties {
    fn encode<W: io::Write>(&self, writer: &mut W, protocol: Protocol) -> Result<(), Error> {
        if !protocol.has_properties() {
            if self.is_empty() {
                return Ok(());
            }
            return Err(Error::PropertiesUnsupported(protocol));
        }
        write_var_int(writer, self.content_len())?;
        for property in &self.0 {
            property.encode(writer)?;
        }
        Ok(())
    }

    fn encode_len(&self, protocol: Protocol) -> usize {
        if !protocol.has_properties() {
            return 0;
        }
        let len = self.content_len();
        // an oversized block fails in `encode`
        var_int_len(len).unwrap_or(4) + len
    }
}
