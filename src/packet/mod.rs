//! Client control packets and the fixed header.
//!
//! A single builder serves both protocol versions, the [`Protocol`] given
//! to [`Packet::encode`] decides the protocol level byte and whether the
//! properties blocks are written.

mod connect;
mod publish;
mod subscribe;

#[cfg(test)]
mod tests;

use std::fmt;

use futures_lite::{
    future::block_on,
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
};

use crate::{
    decode_var_int_async, encode_packet, packet_from, total_len, Encodable, Error, Pid, Protocol,
    QoS, VarBytes,
};

pub use connect::{Connect, LastWill};
pub use publish::Publish;
pub use subscribe::{RetainHandling, Subscribe, SubscriptionOptions, Unsubscribe};

/// The control packets a client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Connect(Connect),
    Publish(Publish),
    Pubrel(Pid),
    Subscribe(Subscribe),
    Unsubscribe(Unsubscribe),
    Pingreq,
    Disconnect,
}

/// Control packet type, the high nibble of the first byte.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PacketType {
    Connect = 1,
    Connack = 2,
    Publish = 3,
    Puback = 4,
    Pubrec = 5,
    Pubrel = 6,
    Pubcomp = 7,
    Subscribe = 8,
    Suback = 9,
    Unsubscribe = 10,
    Unsuback = 11,
    Pingreq = 12,
    Pingresp = 13,
    Disconnect = 14,
    Auth = 15,
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PacketType::Connect => "CONNECT",
            PacketType::Connack => "CONNACK",
            PacketType::Publish => "PUBLISH",
            PacketType::Puback => "PUBACK",
            PacketType::Pubrec => "PUBREC",
            PacketType::Pubrel => "PUBREL",
            PacketType::Pubcomp => "PUBCOMP",
            PacketType::Subscribe => "SUBSCRIBE",
            PacketType::Suback => "SUBACK",
            PacketType::Unsubscribe => "UNSUBSCRIBE",
            PacketType::Unsuback => "UNSUBACK",
            PacketType::Pingreq => "PINGREQ",
            PacketType::Pingresp => "PINGRESP",
            PacketType::Disconnect => "DISCONNECT",
            PacketType::Auth => "AUTH",
        };
        write!(f, "{}", name)
    }
}

impl Packet {
    /// Return the packet type variant.
    pub fn get_type(&self) -> PacketType {
        match self {
            Packet::Connect(_) => PacketType::Connect,
            Packet::Publish(_) => PacketType::Publish,
            Packet::Pubrel(_) => PacketType::Pubrel,
            Packet::Subscribe(_) => PacketType::Subscribe,
            Packet::Unsubscribe(_) => PacketType::Unsubscribe,
            Packet::Pingreq => PacketType::Pingreq,
            Packet::Disconnect => PacketType::Disconnect,
        }
    }

    pub async fn encode_async<T: AsyncWrite + Unpin>(
        &self,
        writer: &mut T,
        protocol: Protocol,
    ) -> Result<(), Error> {
        let data = self.encode(protocol)?;
        writer.write_all(data.as_slice()).await?;
        Ok(())
    }

    /// Encode the packet into a complete frame.
    pub fn encode(&self, protocol: Protocol) -> Result<VarBytes, Error> {
        const VOID_PACKET_REMAINING_LEN: u8 = 0;
        let data = match self {
            Packet::Connect(connect) => {
                const CONTROL_BYTE: u8 = 0b00010000;
                VarBytes::Dynamic(encode_packet(CONTROL_BYTE, connect, protocol)?)
            }
            Packet::Publish(publish) => {
                let mut control_byte: u8 = 0b00110000 | ((publish.qos_pid.qos() as u8) << 1);
                if publish.dup {
                    control_byte |= 0b00001000;
                }
                if publish.retain {
                    control_byte |= 0b00000001;
                }
                VarBytes::Dynamic(encode_packet(control_byte, publish, protocol)?)
            }
            Packet::Pubrel(pid) => {
                const CONTROL_BYTE: u8 = 0b01100010;
                VarBytes::Fixed4(encode_with_pid(CONTROL_BYTE, *pid))
            }
            Packet::Subscribe(subscribe) => {
                const CONTROL_BYTE: u8 = 0b10000010;
                VarBytes::Dynamic(encode_packet(CONTROL_BYTE, subscribe, protocol)?)
            }
            Packet::Unsubscribe(unsubscribe) => {
                const CONTROL_BYTE: u8 = 0b10100010;
                VarBytes::Dynamic(encode_packet(CONTROL_BYTE, unsubscribe, protocol)?)
            }
            Packet::Pingreq => {
                const CONTROL_BYTE: u8 = 0b11000000;
                VarBytes::Fixed2([CONTROL_BYTE, VOID_PACKET_REMAINING_LEN])
            }
            Packet::Disconnect => {
                const CONTROL_BYTE: u8 = 0b11100000;
                VarBytes::Fixed2([CONTROL_BYTE, VOID_PACKET_REMAINING_LEN])
            }
        };
        Ok(data)
    }

    /// The total frame length `encode` produces for valid input.
    pub fn encode_len(&self, protocol: Protocol) -> Result<usize, Error> {
        let remaining_len = match self {
            Packet::Connect(inner) => inner.encode_len(protocol),
            Packet::Publish(inner) => inner.encode_len(protocol),
            Packet::Pubrel(_) => 2,
            Packet::Subscribe(inner) => inner.encode_len(protocol),
            Packet::Unsubscribe(inner) => inner.encode_len(protocol),
            Packet::Pingreq => 0,
            Packet::Disconnect => 0,
        };
        total_len(remaining_len)
    }
}

packet_from!(Connect, Publish, Subscribe, Unsubscribe);

/// Fixed header of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub typ: PacketType,
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
    pub remaining_len: usize,
}

impl Header {
    pub fn new(typ: PacketType, dup: bool, qos: QoS, retain: bool, remaining_len: usize) -> Self {
        Self {
            typ,
            dup,
            qos,
            retain,
            remaining_len,
        }
    }

    /// Build a header from the first byte and the remaining length,
    /// checking the reserved flags of each packet type.
    pub fn new_with(hd: u8, remaining_len: usize) -> Result<Header, Error> {
        const FLAGS_MASK: u8 = 0b1111;
        let (typ, flags_ok) = match hd >> 4 {
            1 => (PacketType::Connect, hd & FLAGS_MASK == 0),
            2 => (PacketType::Connack, hd & FLAGS_MASK == 0),
            3 => (PacketType::Publish, true),
            4 => (PacketType::Puback, hd & FLAGS_MASK == 0),
            5 => (PacketType::Pubrec, hd & FLAGS_MASK == 0),
            6 => (PacketType::Pubrel, hd & FLAGS_MASK == 0b0010),
            7 => (PacketType::Pubcomp, hd & FLAGS_MASK == 0),
            8 => (PacketType::Subscribe, hd & FLAGS_MASK == 0b0010),
            9 => (PacketType::Suback, hd & FLAGS_MASK == 0),
            10 => (PacketType::Unsubscribe, hd & FLAGS_MASK == 0b0010),
            11 => (PacketType::Unsuback, hd & FLAGS_MASK == 0),
            12 => (PacketType::Pingreq, hd & FLAGS_MASK == 0),
            13 => (PacketType::Pingresp, hd & FLAGS_MASK == 0),
            14 => (PacketType::Disconnect, hd & FLAGS_MASK == 0),
            15 => (PacketType::Auth, hd & FLAGS_MASK == 0),
            _ => return Err(Error::InvalidHeader),
        };
        if !flags_ok {
            return Err(Error::InvalidHeader);
        }
        Ok(Header {
            typ,
            dup: hd & 0b1000 != 0,
            qos: QoS::from_u8((hd & 0b110) >> 1)?,
            retain: hd & 1 == 1,
            remaining_len,
        })
    }

    pub fn decode(mut reader: &[u8]) -> Result<Self, Error> {
        block_on(Self::decode_async(&mut reader))
    }

    pub async fn decode_async<T: AsyncRead + Unpin>(reader: &mut T) -> Result<Self, Error> {
        let mut typ = 0u8;
        reader.read_exact(std::slice::from_mut(&mut typ)).await?;
        let (remaining_len, _) = decode_var_int_async(reader).await?;
        Header::new_with(typ, remaining_len as usize)
    }
}

#[inline]
fn encode_with_pid(control_byte: u8, pid: Pid) -> [u8; 4] {
    const REMAINING_LEN: u8 = 2;
    let [msb, lsb] = pid.value().to_be_bytes();
    [control_byte, REMAINING_LEN, msb, lsb]
}
