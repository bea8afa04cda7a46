use std::io;

use super::PacketType;
use crate::v5::Properties;
use crate::{write_string, write_u16, write_u8, Encodable, Error, Pid, Protocol, QoS, TopicFilter};

/// Retain handling of a v5.0 subscription.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RetainHandling {
    /// Send retained messages at the time of the subscribe.
    #[default]
    SendAtSubscribe = 0,
    /// Send retained messages only if the subscription does not exist yet.
    SendAtSubscribeIfNotExist = 1,
    DoNotSend = 2,
}

/// The options byte that follows each topic filter of a SUBSCRIBE.
///
/// ```text
///   7  6 |  5  4  |   3   |    2     |  1  0
///  rsvd  | retain | RAP   | no local | max QoS
/// ```
///
/// Only the maximum QoS exists in v3.1.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SubscriptionOptions {
    pub max_qos: QoS,
    pub no_local: bool,
    pub retain_as_published: bool,
    pub retain_handling: RetainHandling,
}

impl SubscriptionOptions {
    pub fn new(max_qos: QoS) -> Self {
        SubscriptionOptions {
            max_qos,
            ..Default::default()
        }
    }

    /// Whether any option beyond the maximum QoS is set.
    pub fn has_v5_options(&self) -> bool {
        self.no_local
            || self.retain_as_published
            || self.retain_handling != RetainHandling::default()
    }

    pub fn to_u8(self) -> u8 {
        let mut byte = self.max_qos as u8;
        if self.no_local {
            byte |= 0b0000_0100;
        }
        if self.retain_as_published {
            byte |= 0b0000_1000;
        }
        byte |= (self.retain_handling as u8) << 4;
        byte
    }
}

impl From<QoS> for SubscriptionOptions {
    fn from(max_qos: QoS) -> Self {
        SubscriptionOptions::new(max_qos)
    }
}

/// Subscribe packet body type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscribe {
    pub pid: Pid,
    pub topics: Vec<(TopicFilter, SubscriptionOptions)>,
    pub properties: Properties,
}

impl Subscribe {
    pub fn new(pid: Pid, topics: Vec<(TopicFilter, SubscriptionOptions)>) -> Self {
        Subscribe {
            pid,
            topics,
            properties: Properties::new(),
        }
    }
}

impl Encodable for Subscribe {
    fn encode<W: io::Write>(&self, writer: &mut W, protocol: Protocol) -> Result<(), Error> {
        if self.topics.is_empty() {
            return Err(Error::EmptySubscription);
        }
        if !protocol.has_properties() && self.topics.iter().any(|(_, opts)| opts.has_v5_options())
        {
            return Err(Error::InvalidSubscribeOptions(protocol));
        }
        self.properties.validate(PacketType::Subscribe, protocol)?;

        write_u16(writer, self.pid.value())?;
        self.properties.encode(writer, protocol)?;
        for (topic_filter, options) in &self.topics {
            write_string(writer, topic_filter)?;
            write_u8(writer, options.to_u8())?;
        }
        Ok(())
    }

    fn encode_len(&self, protocol: Protocol) -> usize {
        2 + self.properties.encode_len(protocol)
            + self
                .topics
                .iter()
                .map(|(filter, _)| 3 + filter.len())
                .sum::<usize>()
    }
}

/// Unsubscribe packet body type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsubscribe {
    pub pid: Pid,
    pub topics: Vec<TopicFilter>,
    pub properties: Properties,
}

impl Unsubscribe {
    pub fn new(pid: Pid, topics: Vec<TopicFilter>) -> Self {
        Unsubscribe {
            pid,
            topics,
            properties: Properties::new(),
        }
    }
}

impl Encodable for Unsubscribe {
    fn encode<W: io::Write>(&self, writer: &mut W, protocol: Protocol) -> Result<(), Error> {
        if self.topics.is_empty() {
            return Err(Error::EmptySubscription);
        }
        self.properties.validate(PacketType::Unsubscribe, protocol)?;

        write_u16(writer, self.pid.value())?;
        self.properties.encode(writer, protocol)?;
        for topic_filter in &self.topics {
            write_string(writer, topic_filter)?;
        }
        Ok(())
    }

    fn encode_len(&self, protocol: Protocol) -> usize {
        2 + self.properties.encode_len(protocol)
            + self
                .topics
                .iter()
                .map(|filter| 2 + filter.len())
                .sum::<usize>()
    }
}
