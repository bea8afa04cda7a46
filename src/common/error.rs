use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::packet::PacketType;
use crate::v5::PropertyType;
use crate::Protocol;

/// Errors returned by the building, decoding and sending process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A string or binary field does not fit the 2 byte length prefix.
    #[error("field too long: {0} bytes (max 65535)")]
    StringTooLong(usize),

    /// The value does not fit in a 4 byte variable byte integer.
    #[error("encoding overflow: {0} exceeds 268435455")]
    EncodingOverflow(usize),

    /// No topic in subscribe or unsubscribe packet.
    #[error("empty subscription")]
    EmptySubscription,

    /// Empty topic name without a topic alias to stand for it.
    #[error("empty topic name")]
    EmptyTopicName,

    /// Packet identifier is 0.
    #[error("packet identifier is 0")]
    ZeroPid,

    /// Invalid QoS value.
    #[error("invalid qos: `{0}`")]
    InvalidQos(u8),

    /// Invalid Topic Name
    #[error("invalid topic name: {0}")]
    InvalidTopicName(Arc<str>),

    /// Invalid topic filter
    #[error("invalid topic filter: {0}")]
    InvalidTopicFilter(Arc<str>),

    /// Subscription options that the protocol version can not express.
    #[error("invalid subscribe options for {0}")]
    InvalidSubscribeOptions(Protocol),

    /// Properties given to a protocol version without properties.
    #[error("properties are not supported by {0}")]
    PropertiesUnsupported(Protocol),

    #[error("invalid property `{0}` for packet `{1}`")]
    InvalidProperty(PropertyType, PacketType),

    #[error("invalid will property: `{0}`")]
    InvalidWillProperty(PropertyType),

    #[error("duplicated property: `{0}`")]
    DuplicatedProperty(PropertyType),

    #[error("invalid property value: type=`{0}`, value=`{1}`")]
    InvalidPropertyValue(PropertyType, u32),

    #[error("Authentication Data exists but Authentication Method is missing")]
    AuthMethodMissing,

    /// v3.1.1 CONNECT with a password but no username.
    #[error("password without username")]
    PasswordWithoutUsername,

    /// Invalid fixed header (packet type or flags).
    #[error("invalid header")]
    InvalidHeader,

    /// Invalid variable byte integer, the value MUST smaller than `268,435,456`.
    #[error("invalid variable byte integer")]
    InvalidVarByteInt,

    /// Trying to decode a non-utf8 string.
    #[error("invalid string")]
    InvalidString,

    /// An `io::Error` from the reader or the transport, by kind. Also used
    /// for truncated input while decoding.
    #[error("io error: {0}")]
    IoError(io::ErrorKind),
}

impl Error {
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::IoError(io::ErrorKind::UnexpectedEof))
    }

    /// Errors caused by input the builder refuses to encode.
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            Error::StringTooLong(_)
                | Error::EncodingOverflow(_)
                | Error::EmptySubscription
                | Error::EmptyTopicName
                | Error::ZeroPid
                | Error::InvalidQos(_)
                | Error::InvalidTopicName(_)
                | Error::InvalidTopicFilter(_)
                | Error::InvalidSubscribeOptions(_)
                | Error::PropertiesUnsupported(_)
                | Error::InvalidProperty(..)
                | Error::InvalidWillProperty(_)
                | Error::DuplicatedProperty(_)
                | Error::InvalidPropertyValue(..)
                | Error::AuthMethodMissing
                | Error::PasswordWithoutUsername
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::IoError(_))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err.kind())
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::IoError(kind) => kind.into(),
            err => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_groups() {
        assert!(Error::StringTooLong(70000).is_encoding());
        assert!(Error::EncodingOverflow(268435456).is_encoding());
        assert!(Error::PasswordWithoutUsername.is_encoding());
        assert!(!Error::InvalidHeader.is_encoding());
        assert!(Error::IoError(io::ErrorKind::Other).is_transport());
        assert!(!Error::EmptyTopicName.is_transport());
    }

    #[test]
    fn test_io_error_conversion() {
        let err: Error = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert_eq!(err, Error::IoError(io::ErrorKind::BrokenPipe));

        let err: Error = io::Error::from(io::ErrorKind::ConnectionRefused).into();
        assert_eq!(err, Error::IoError(io::ErrorKind::ConnectionRefused));
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::ConnectionRefused);

        let err: Error = io::Error::from(io::ErrorKind::UnexpectedEof).into();
        assert!(err.is_eof());

        let io_err: io::Error = Error::EmptySubscription.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
    }
}
