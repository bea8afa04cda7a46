use std::io;

use bytes::Bytes;

use super::PacketType;
use crate::v5::Properties;
use crate::{write_string, write_u16, Encodable, Error, Protocol, QosPid, TopicName};

/// Publish packet body type.
///
/// The payload is written as is, without a length prefix. Its length is
/// implied by the remaining length of the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publish {
    pub dup: bool,
    pub retain: bool,
    pub qos_pid: QosPid,
    /// May be empty under v5.0 when a topic alias is given.
    pub topic_name: TopicName,
    pub properties: Properties,
    pub payload: Bytes,
}

impl Publish {
    pub fn new<P: Into<Bytes>>(qos_pid: QosPid, topic_name: TopicName, payload: P) -> Self {
        Publish {
            dup: false,
            retain: false,
            qos_pid,
            topic_name,
            properties: Properties::new(),
            payload: payload.into(),
        }
    }

    fn check_topic(&self, protocol: Protocol) -> Result<(), Error> {
        if self.topic_name.is_empty()
            && !(protocol.has_properties() && self.properties.topic_alias().is_some())
        {
            return Err(Error::EmptyTopicName);
        }
        Ok(())
    }
}

impl Encodable for Publish {
    fn encode<W: io::Write>(&self, writer: &mut W, protocol: Protocol) -> Result<(), Error> {
        self.check_topic(protocol)?;
        self.properties.validate(PacketType::Publish, protocol)?;

        write_string(writer, &self.topic_name)?;
        if let Some(pid) = self.qos_pid.pid() {
            write_u16(writer, pid.value())?;
        }
        self.properties.encode(writer, protocol)?;
        writer.write_all(&self.payload)?;
        Ok(())
    }

    fn encode_len(&self, protocol: Protocol) -> usize {
        let mut length = 2 + self.topic_name.len();
        if self.qos_pid.pid().is_some() {
            length += 2;
        }
        length += self.properties.encode_len(protocol);
        length += self.payload.len();
        length
    }
}
