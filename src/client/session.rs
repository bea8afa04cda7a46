use std::io;
use std::time::Duration;

use bytes::Bytes;

#[cfg(feature = "tcp")]
use super::TcpTransport;
use super::{ClientConfig, Transport};
use crate::packet::{Header, Packet, Publish, Subscribe, SubscriptionOptions, Unsubscribe};
use crate::v5::Properties;
use crate::{Error, Pid, PidAllocator, Protocol, QoS, QosPid, TopicFilter, TopicName, VarBytes};

/// Outcome of waiting for the broker after a frame was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Bytes received, not necessarily a whole frame.
    Ready(Bytes),
    /// Nothing arrived within the response timeout.
    Timeout,
    /// The transport failed while waiting or reading.
    TransportError(io::ErrorKind),
}

impl Response {
    pub fn is_ready(&self) -> bool {
        matches!(self, Response::Ready(_))
    }

    pub fn data(&self) -> Option<&Bytes> {
        match self {
            Response::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// Decode the fixed header of the received bytes.
    pub fn header(&self) -> Result<Header, Error> {
        match self {
            Response::Ready(data) => Header::decode(data),
            Response::Timeout => Err(Error::IoError(io::ErrorKind::TimedOut)),
            Response::TransportError(kind) => Err(Error::IoError(*kind)),
        }
    }
}

/// Per message settings of [`Session::publish`].
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    pub qos: QoS,
    pub retain: bool,
    pub dup: bool,
    pub properties: Properties,
}

impl PublishOptions {
    pub fn new(qos: QoS) -> Self {
        PublishOptions {
            qos,
            ..Default::default()
        }
    }

    pub fn retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }

    pub fn dup(mut self, dup: bool) -> Self {
        self.dup = dup;
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }
}

/// One connection's worth of client state: the configuration, the
/// transport and the packet identifier allocator.
///
/// Every operation encodes its frame, sends it and waits for a response.
/// Encoding and send failures are returned as `Err`, the outcome of the
/// wait is always a [`Response`].
pub struct Session<T> {
    config: ClientConfig,
    transport: T,
    pids: PidAllocator,
}

#[cfg(feature = "tcp")]
impl Session<TcpTransport> {
    /// Connect a [`TcpTransport`] to `config.address`.
    ///
    /// Only the TCP connection is opened, send CONNECT with
    /// [`Session::connect`].
    pub fn open(config: ClientConfig) -> Result<Self, Error> {
        let transport = TcpTransport::connect(&config.address, config.connect_timeout)?;
        Ok(Session::new(config, transport))
    }
}

impl<T: Transport> Session<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Session {
            config,
            transport,
            pids: PidAllocator::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn protocol(&self) -> Protocol {
        self.config.protocol
    }

    pub fn pids(&self) -> &PidAllocator {
        &self.pids
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn connect(&mut self) -> Result<Response, Error> {
        let connect = self.config.to_connect();
        self.send(&connect.into())
    }

    pub fn subscribe(
        &mut self,
        filter: &str,
        qos: QoS,
        properties: Properties,
    ) -> Result<Response, Error> {
        self.subscribe_with(filter, qos.into(), properties)
    }

    /// Subscribe with the full v5.0 subscription options.
    pub fn subscribe_with(
        &mut self,
        filter: &str,
        options: SubscriptionOptions,
        properties: Properties,
    ) -> Result<Response, Error> {
        let filter = TopicFilter::try_from(filter)?;
        let mut subscribe = Subscribe::new(self.pids.peek(), vec![(filter, options)]);
        subscribe.properties = properties;
        self.send_with_pid(&subscribe.into())
    }

    pub fn unsubscribe(&mut self, filter: &str, properties: Properties) -> Result<Response, Error> {
        let filter = TopicFilter::try_from(filter)?;
        let mut unsubscribe = Unsubscribe::new(self.pids.peek(), vec![filter]);
        unsubscribe.properties = properties;
        self.send_with_pid(&unsubscribe.into())
    }

    /// Publish `payload` to `topic`. A packet identifier is taken from the
    /// allocator for QoS 1 and 2, once the packet has encoded.
    ///
    /// An empty `topic` is accepted under v5.0 when the options carry a
    /// topic alias.
    pub fn publish<P: Into<Bytes>>(
        &mut self,
        topic: &str,
        payload: P,
        options: PublishOptions,
    ) -> Result<Response, Error> {
        let topic_name = TopicName::try_from(topic)?;
        let qos_pid = QosPid::with(options.qos, || self.pids.peek());
        let mut publish = Publish::new(qos_pid, topic_name, payload);
        publish.retain = options.retain;
        publish.dup = options.dup;
        publish.properties = options.properties;
        if qos_pid.pid().is_some() {
            self.send_with_pid(&publish.into())
        } else {
            self.send(&publish.into())
        }
    }

    /// Release a QoS 2 message, `pid` is the identifier of its PUBLISH.
    pub fn pubrel(&mut self, pid: Pid) -> Result<Response, Error> {
        self.send(&Packet::Pubrel(pid))
    }

    pub fn ping(&mut self) -> Result<Response, Error> {
        self.send(&Packet::Pingreq)
    }

    /// Send DISCONNECT, wait, then close the transport.
    pub fn disconnect(&mut self) -> Result<Response, Error> {
        let response = self.send(&Packet::Disconnect)?;
        self.transport.close()?;
        Ok(response)
    }

    /// Encode and send any packet, then wait for a response.
    pub fn send(&mut self, packet: &Packet) -> Result<Response, Error> {
        let data = packet.encode(self.config.protocol)?;
        self.transmit(packet, data)
    }

    /// Like [`Session::send`] for a packet carrying `pids.peek()`. The
    /// identifier is only consumed once the packet has encoded.
    fn send_with_pid(&mut self, packet: &Packet) -> Result<Response, Error> {
        let data = packet.encode(self.config.protocol)?;
        self.pids.next();
        self.transmit(packet, data)
    }

    fn transmit(&mut self, packet: &Packet, data: VarBytes) -> Result<Response, Error> {
        log::debug!(
            "send {} ({} bytes, {})",
            packet.get_type(),
            data.len(),
            self.config.protocol
        );
        log::trace!("send bytes: {:02x?}", data.as_slice());
        self.transport.send(data.as_slice())?;
        Ok(self.wait_for_response(self.config.response_timeout))
    }

    /// Wait up to `timeout` for the transport to become readable and read
    /// at most `read_buffer_size` bytes.
    pub fn wait_for_response(&mut self, timeout: Duration) -> Response {
        let response = match self.transport.poll_readable(timeout) {
            Ok(false) => Response::Timeout,
            Ok(true) => match self.transport.read(self.config.read_buffer_size) {
                Ok(data) if data.is_empty() => {
                    Response::TransportError(io::ErrorKind::UnexpectedEof)
                }
                Ok(data) => Response::Ready(Bytes::from(data)),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => Response::Timeout,
                Err(err) => Response::TransportError(err.kind()),
            },
            Err(err) => Response::TransportError(err.kind()),
        };

        match &response {
            Response::Ready(data) => {
                match Header::decode(data) {
                    Ok(header) => log::debug!("recv {} ({} bytes)", header.typ, data.len()),
                    Err(_) => log::debug!("recv {} bytes", data.len()),
                }
                log::trace!("recv bytes: {:02x?}", &data[..]);
            }
            Response::Timeout => log::info!("no response within {:?}", timeout),
            Response::TransportError(kind) => log::warn!("transport error: {:?}", kind),
        }
        response
    }
}
