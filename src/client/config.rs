//! Client configuration types.

use std::time::Duration;

use bytes::Bytes;

use crate::packet::{Connect, LastWill};
use crate::v5::{Properties, Property};
use crate::Protocol;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote broker address (host:port).
    pub address: String,
    /// Client identifier.
    pub client_id: String,
    pub protocol: Protocol,
    /// Keep-alive interval in seconds (0 = disabled).
    pub keep_alive: u16,
    /// Clean session (v3.1.1) or clean start (v5.0) flag.
    pub clean_session: bool,
    pub username: Option<String>,
    pub password: Option<Vec<u8>>,
    pub last_will: Option<LastWill>,
    /// CONNECT properties, only sent under v5.0.
    pub properties: Properties,
    /// Connection timeout, also bounds a blocked write.
    pub connect_timeout: Duration,
    /// How long an operation waits for the broker to answer.
    pub response_timeout: Duration,
    /// Maximum bytes taken from the transport per response.
    pub read_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: "localhost:1883".to_string(),
            client_id: String::new(),
            protocol: Protocol::default(),
            keep_alive: 60,
            clean_session: true,
            username: None,
            password: None,
            last_will: None,
            properties: Properties::new(),
            connect_timeout: Duration::from_secs(10),
            response_timeout: Duration::from_secs(5),
            read_buffer_size: 4096,
        }
    }
}

impl ClientConfig {
    /// Create a new config with the given address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Set the client ID.
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = id.into();
        self
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Use MQTT 5.0 protocol.
    pub fn mqtt5(self) -> Self {
        self.protocol(Protocol::MqttV50)
    }

    /// Set keep-alive interval in seconds.
    pub fn keep_alive(mut self, seconds: u16) -> Self {
        self.keep_alive = seconds;
        self
    }

    pub fn clean_session(mut self, clean: bool) -> Self {
        self.clean_session = clean;
        self
    }

    /// Set username and password.
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<Vec<u8>>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn last_will(mut self, last_will: LastWill) -> Self {
        self.last_will = Some(last_will);
        self
    }

    /// Session Expiry Interval in seconds (v5.0).
    pub fn session_expiry(self, seconds: u32) -> Self {
        self.property(Property::SessionExpiryInterval(seconds))
    }

    /// Receive Maximum (v5.0).
    pub fn receive_max(self, value: u16) -> Self {
        self.property(Property::ReceiveMaximum(value))
    }

    /// Topic Alias Maximum (v5.0).
    pub fn topic_alias_max(self, value: u16) -> Self {
        self.property(Property::TopicAliasMaximum(value))
    }

    /// Append a CONNECT property, in call order.
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Set connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// The CONNECT body described by this config.
    pub fn to_connect(&self) -> Connect {
        let mut connect = Connect::new(&self.client_id, self.keep_alive);
        connect.clean_session = self.clean_session;
        connect.properties = self.properties.clone();
        connect.last_will = self.last_will.clone();
        connect.username = self.username.as_deref().map(Into::into);
        connect.password = self.password.clone().map(Bytes::from);
        connect
    }
}
