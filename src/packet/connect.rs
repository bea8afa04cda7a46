use std::io;
use std::sync::Arc;

use bytes::Bytes;

use super::PacketType;
use crate::v5::Properties;
use crate::{
    write_bytes, write_string, write_u16, write_u8, Encodable, Error, Protocol, QoS, TopicName,
};

/// Connect packet body type.
///
/// The protocol level is not stored here, it comes from the [`Protocol`]
/// the packet is encoded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connect {
    /// Clean session (v3.1.1) or clean start (v5.0).
    pub clean_session: bool,
    pub keep_alive: u16,
    /// Only written under v5.0.
    pub properties: Properties,
    pub client_id: Arc<str>,
    pub last_will: Option<LastWill>,
    pub username: Option<Arc<str>>,
    pub password: Option<Bytes>,
}

impl Connect {
    pub fn new(client_id: &str, keep_alive: u16) -> Self {
        Connect {
            clean_session: true,
            keep_alive,
            properties: Properties::new(),
            client_id: client_id.into(),
            last_will: None,
            username: None,
            password: None,
        }
    }

    fn connect_flags(&self) -> u8 {
        let mut connect_flags: u8 = 0b00000000;
        if self.clean_session {
            connect_flags |= 0b10;
        }
        if self.username.is_some() {
            connect_flags |= 0b10000000;
        }
        if self.password.is_some() {
            connect_flags |= 0b01000000;
        }
        if let Some(last_will) = self.last_will.as_ref() {
            connect_flags |= 0b00000100;
            connect_flags |= (last_will.qos as u8) << 3;
            if last_will.retain {
                connect_flags |= 0b00100000;
            }
        }
        connect_flags
    }
}

impl Encodable for Connect {
    fn encode<W: io::Write>(&self, writer: &mut W, protocol: Protocol) -> Result<(), Error> {
        // MQTT-3.1.2-22, relaxed by v5.0
        if protocol == Protocol::MqttV311 && self.password.is_some() && self.username.is_none() {
            return Err(Error::PasswordWithoutUsername);
        }
        self.properties.validate(PacketType::Connect, protocol)?;

        protocol.encode(writer, protocol)?;
        write_u8(writer, self.connect_flags())?;
        write_u16(writer, self.keep_alive)?;
        self.properties.encode(writer, protocol)?;
        write_string(writer, &self.client_id)?;
        if let Some(last_will) = self.last_will.as_ref() {
            last_will.encode(writer, protocol)?;
        }
        if let Some(username) = self.username.as_ref() {
            write_string(writer, username)?;
        }
        if let Some(password) = self.password.as_ref() {
            write_bytes(writer, password.as_ref())?;
        }
        Ok(())
    }

    fn encode_len(&self, protocol: Protocol) -> usize {
        let mut length = protocol.encode_len(protocol);
        // flags + keep-alive
        length += 1 + 2;
        length += self.properties.encode_len(protocol);
        // client identifier
        length += 2 + self.client_id.len();
        if let Some(last_will) = self.last_will.as_ref() {
            length += last_will.encode_len(protocol);
        }
        if let Some(username) = self.username.as_ref() {
            length += 2 + username.len();
        }
        if let Some(password) = self.password.as_ref() {
            length += 2 + password.len();
        }
        length
    }
}

/// Message that the server should publish when the client disconnects.
///
/// Sent by the client in the [Connect] packet. [MQTT 3.1.3.3].
///
/// [MQTT 3.1.3.3]: http://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html#_Toc398718031
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastWill {
    pub qos: QoS,
    pub retain: bool,
    /// Will properties, only written under v5.0.
    pub properties: Properties,
    pub topic_name: TopicName,
    pub payload: Bytes,
}

impl LastWill {
    pub fn new<P: Into<Bytes>>(qos: QoS, topic_name: TopicName, payload: P) -> Self {
        LastWill {
            qos,
            retain: false,
            properties: Properties::new(),
            topic_name,
            payload: payload.into(),
        }
    }
}

impl Encodable for LastWill {
    fn encode<W: io::Write>(&self, writer: &mut W, protocol: Protocol) -> Result<(), Error> {
        if self.topic_name.is_empty() {
            return Err(Error::EmptyTopicName);
        }
        self.properties.validate_will(protocol)?;
        self.properties.encode(writer, protocol)?;
        write_string(writer, &self.topic_name)?;
        write_bytes(writer, self.payload.as_ref())?;
        Ok(())
    }

    fn encode_len(&self, protocol: Protocol) -> usize {
        self.properties.encode_len(protocol) + 4 + self.topic_name.len() + self.payload.len()
    }
}
