use std::sync::Arc;

use bytes::Bytes;
use futures_lite::future::block_on;

use crate::packet::*;
use crate::v5::{Properties, Property};
use crate::*;

fn assert_encode(packet: &Packet, protocol: Protocol, expected: &[u8]) {
    let var_bytes = packet.encode(protocol).unwrap();
    assert_eq!(var_bytes.as_slice(), expected);
    assert_eq!(packet.encode_len(protocol).unwrap(), expected.len());

    let mut data_async = Vec::new();
    block_on(packet.encode_async(&mut data_async, protocol)).unwrap();
    assert_eq!(data_async, expected);

    let header = Header::decode(expected).unwrap();
    assert_eq!(header.typ, packet.get_type());
    assert_eq!(
        header.remaining_len,
        expected.len() - header_len(expected.len())
    );
}

fn topic(name: &str) -> TopicName {
    TopicName::try_from(name).unwrap()
}

fn filter(value: &str) -> TopicFilter {
    TopicFilter::try_from(value).unwrap()
}

fn pid(value: u16) -> Pid {
    Pid::try_from(value).unwrap()
}

#[test]
fn test_encode_connect_v311() {
    let packet: Packet = Connect::new("abc", 60).into();
    #[rustfmt::skip]
    let expected = [
        0x10, 0x0F,
        0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04,
        0x02,
        0x00, 0x3C,
        0x00, 0x03, b'a', b'b', b'c',
    ];
    assert_encode(&packet, Protocol::MqttV311, &expected);
}

#[test]
fn test_encode_connect_v50() {
    let packet: Packet = Connect::new("abc", 60).into();
    #[rustfmt::skip]
    let expected = [
        0x10, 0x10,
        0x00, 0x04, b'M', b'Q', b'T', b'T', 0x05,
        0x02,
        0x00, 0x3C,
        0x00,
        0x00, 0x03, b'a', b'b', b'c',
    ];
    assert_encode(&packet, Protocol::MqttV50, &expected);

    let mut connect = Connect::new("abc", 60);
    connect.properties = Properties::new()
        .with(Property::SessionExpiryInterval(300))
        .with(Property::TopicAliasMaximum(100));
    #[rustfmt::skip]
    let expected = [
        0x10, 0x18,
        0x00, 0x04, b'M', b'Q', b'T', b'T', 0x05,
        0x02,
        0x00, 0x3C,
        0x08, 0x11, 0x00, 0x00, 0x01, 0x2C, 0x22, 0x00, 0x64,
        0x00, 0x03, b'a', b'b', b'c',
    ];
    assert_encode(&connect.into(), Protocol::MqttV50, &expected);
}

#[test]
fn test_encode_connect_flags() {
    let mut connect = Connect::new("c", 10);
    let mut last_will = LastWill::new(QoS::Level1, topic("w"), Bytes::from_static(b"bye"));
    last_will.retain = true;
    connect.last_will = Some(last_will);
    connect.username = Some(Arc::from("u"));
    connect.password = Some(Bytes::from_static(b"p"));
    let packet: Packet = connect.into();

    #[rustfmt::skip]
    let expected = [
        0x10, 0x1B,
        0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04,
        0xEE,
        0x00, 0x0A,
        0x00, 0x01, b'c',
        0x00, 0x01, b'w',
        0x00, 0x03, b'b', b'y', b'e',
        0x00, 0x01, b'u',
        0x00, 0x01, b'p',
    ];
    assert_encode(&packet, Protocol::MqttV311, &expected);

    // empty connect properties and empty will properties
    #[rustfmt::skip]
    let expected = [
        0x10, 0x1D,
        0x00, 0x04, b'M', b'Q', b'T', b'T', 0x05,
        0xEE,
        0x00, 0x0A,
        0x00,
        0x00, 0x01, b'c',
        0x00,
        0x00, 0x01, b'w',
        0x00, 0x03, b'b', b'y', b'e',
        0x00, 0x01, b'u',
        0x00, 0x01, b'p',
    ];
    assert_encode(&packet, Protocol::MqttV50, &expected);

    let mut connect = Connect::new("c", 0);
    connect.clean_session = false;
    let data = Packet::from(connect).encode(Protocol::MqttV311).unwrap();
    assert_eq!(data.as_slice()[9], 0x00);
}

#[test]
fn test_encode_will_properties() {
    let mut last_will = LastWill::new(QoS::Level0, topic("w"), Bytes::new());
    last_will.properties = Properties::new().with(Property::WillDelayInterval(5));
    let mut connect = Connect::new("c", 0);
    connect.last_will = Some(last_will.clone());

    let data = Packet::from(connect.clone())
        .encode(Protocol::MqttV50)
        .unwrap();
    // flags, keep alive, empty connect properties, client id, will properties
    assert_eq!(
        &data.as_slice()[9..21],
        &[0x06, 0x00, 0x00, 0x00, 0x00, 0x01, b'c', 0x05, 0x18, 0x00, 0x00, 0x00]
    );

    assert_eq!(
        Packet::from(connect).encode(Protocol::MqttV311),
        Err(Error::PropertiesUnsupported(Protocol::MqttV311))
    );

    last_will.properties = Properties::new().with(Property::TopicAlias(1));
    let mut connect = Connect::new("c", 0);
    connect.last_will = Some(last_will);
    assert_eq!(
        Packet::from(connect).encode(Protocol::MqttV50),
        Err(Error::InvalidWillProperty(v5::PropertyType::TopicAlias))
    );
}

#[test]
fn test_encode_subscribe() {
    let subscribe = Subscribe::new(pid(1), vec![(filter("a/b"), QoS::Level1.into())]);
    let packet: Packet = subscribe.clone().into();
    #[rustfmt::skip]
    let expected = [
        0x82, 0x08,
        0x00, 0x01,
        0x00, 0x03, b'a', b'/', b'b', 0x01,
    ];
    assert_encode(&packet, Protocol::MqttV311, &expected);
    #[rustfmt::skip]
    let expected = [
        0x82, 0x09,
        0x00, 0x01,
        0x00,
        0x00, 0x03, b'a', b'/', b'b', 0x01,
    ];
    assert_encode(&packet, Protocol::MqttV50, &expected);

    let mut subscribe = subscribe;
    subscribe.properties = Properties::new().with(Property::SubscriptionIdentifier(3));
    #[rustfmt::skip]
    let expected = [
        0x82, 0x0B,
        0x00, 0x01,
        0x02, 0x0B, 0x03,
        0x00, 0x03, b'a', b'/', b'b', 0x01,
    ];
    assert_encode(&subscribe.into(), Protocol::MqttV50, &expected);
}

#[test]
fn test_encode_subscribe_options() {
    let options = SubscriptionOptions {
        max_qos: QoS::Level2,
        no_local: true,
        retain_as_published: true,
        retain_handling: RetainHandling::DoNotSend,
    };
    assert_eq!(options.to_u8(), 0x2E);
    assert_eq!(SubscriptionOptions::new(QoS::Level1).to_u8(), 0x01);

    let subscribe = Subscribe::new(
        pid(7),
        vec![(filter("x"), QoS::Level0.into()), (filter("y/#"), options)],
    );
    let packet: Packet = subscribe.into();
    #[rustfmt::skip]
    let expected = [
        0x82, 0x0D,
        0x00, 0x07,
        0x00,
        0x00, 0x01, b'x', 0x00,
        0x00, 0x03, b'y', b'/', b'#', 0x2E,
    ];
    assert_encode(&packet, Protocol::MqttV50, &expected);
    assert_eq!(
        packet.encode(Protocol::MqttV311),
        Err(Error::InvalidSubscribeOptions(Protocol::MqttV311))
    );
}

#[test]
fn test_encode_unsubscribe() {
    let packet: Packet = Unsubscribe::new(pid(2), vec![filter("a/b")]).into();
    #[rustfmt::skip]
    let expected = [
        0xA2, 0x07,
        0x00, 0x02,
        0x00, 0x03, b'a', b'/', b'b',
    ];
    assert_encode(&packet, Protocol::MqttV311, &expected);
    #[rustfmt::skip]
    let expected = [
        0xA2, 0x08,
        0x00, 0x02,
        0x00,
        0x00, 0x03, b'a', b'/', b'b',
    ];
    assert_encode(&packet, Protocol::MqttV50, &expected);
}

#[test]
fn test_encode_empty_subscription() {
    let packet: Packet = Subscribe::new(pid(1), Vec::new()).into();
    assert_eq!(
        packet.encode(Protocol::MqttV311),
        Err(Error::EmptySubscription)
    );
    let packet: Packet = Unsubscribe::new(pid(1), Vec::new()).into();
    assert_eq!(packet.encode(Protocol::MqttV50), Err(Error::EmptySubscription));
}

#[test]
fn test_encode_publish() {
    let publish = Publish::new(QosPid::Level0, topic("t"), Bytes::from_static(b"hi"));
    let packet: Packet = publish.clone().into();
    assert_encode(
        &packet,
        Protocol::MqttV311,
        &[0x30, 0x05, 0x00, 0x01, b't', b'h', b'i'],
    );
    assert_encode(
        &packet,
        Protocol::MqttV50,
        &[0x30, 0x06, 0x00, 0x01, b't', 0x00, b'h', b'i'],
    );

    let mut publish = publish;
    publish.qos_pid = QosPid::Level1(pid(10));
    publish.retain = true;
    assert_encode(
        &publish.clone().into(),
        Protocol::MqttV311,
        &[0x33, 0x07, 0x00, 0x01, b't', 0x00, 0x0A, b'h', b'i'],
    );

    publish.qos_pid = QosPid::Level2(pid(10));
    publish.retain = false;
    publish.dup = true;
    let data = Packet::from(publish).encode(Protocol::MqttV311).unwrap();
    assert_eq!(data.as_slice()[0], 0x3C);
    let header = Header::decode(data.as_slice()).unwrap();
    assert!(header.dup);
    assert_eq!(header.qos, QoS::Level2);
}

#[test]
fn test_encode_publish_properties() {
    let mut publish = Publish::new(QosPid::Level1(pid(1)), topic("t"), Bytes::from_static(b"x"));
    publish.properties = Properties::new()
        .with(Property::PayloadFormatIndicator(true))
        .with(Property::MessageExpiryInterval(3600));
    #[rustfmt::skip]
    let expected = [
        0x32, 0x0E,
        0x00, 0x01, b't',
        0x00, 0x01,
        0x07, 0x01, 0x01, 0x02, 0x00, 0x00, 0x0E, 0x10,
        b'x',
    ];
    assert_encode(&publish.into(), Protocol::MqttV50, &expected);
}

#[test]
fn test_encode_publish_empty_topic() {
    let mut publish = Publish::new(QosPid::Level0, TopicName::empty(), Bytes::from_static(b"hi"));
    assert_eq!(
        Packet::from(publish.clone()).encode(Protocol::MqttV50),
        Err(Error::EmptyTopicName)
    );

    publish.properties = Properties::new().with(Property::TopicAlias(5));
    let packet: Packet = publish.into();
    #[rustfmt::skip]
    let expected = [
        0x30, 0x08,
        0x00, 0x00,
        0x03, 0x23, 0x00, 0x05,
        b'h', b'i',
    ];
    assert_encode(&packet, Protocol::MqttV50, &expected);
    assert_eq!(packet.encode(Protocol::MqttV311), Err(Error::EmptyTopicName));
}

#[test]
fn test_encode_publish_two_byte_remaining_len() {
    let payload = vec![0xAB; 200];
    let packet: Packet = Publish::new(QosPid::Level0, topic("t"), payload).into();
    let data = packet.encode(Protocol::MqttV311).unwrap();
    assert_eq!(&data.as_slice()[..5], &[0x30, 0xCB, 0x01, 0x00, 0x01]);
    assert_eq!(data.len(), 206);
    assert_eq!(packet.encode_len(Protocol::MqttV311).unwrap(), 206);
    assert_eq!(Header::decode(data.as_slice()).unwrap().remaining_len, 203);
}

#[test]
fn test_encode_bodiless_and_pid_only() {
    for protocol in [Protocol::MqttV311, Protocol::MqttV50] {
        assert_encode(&Packet::Pubrel(pid(10)), protocol, &[0x62, 0x02, 0x00, 0x0A]);
        assert_encode(&Packet::Pingreq, protocol, &[0xC0, 0x00]);
        assert_encode(&Packet::Disconnect, protocol, &[0xE0, 0x00]);
    }
    assert_eq!(
        Packet::Pubrel(pid(0x1234)).encode(Protocol::MqttV311).unwrap(),
        VarBytes::Fixed4([0x62, 0x02, 0x12, 0x34])
    );
}

#[test]
fn test_encode_connect_password_only() {
    let mut connect = Connect::new("c", 0);
    connect.password = Some(Bytes::from_static(b"p"));
    let packet: Packet = connect.into();
    assert_eq!(
        packet.encode(Protocol::MqttV311),
        Err(Error::PasswordWithoutUsername)
    );

    #[rustfmt::skip]
    let expected = [
        0x10, 0x11,
        0x00, 0x04, b'M', b'Q', b'T', b'T', 0x05,
        0x42,
        0x00, 0x00,
        0x00,
        0x00, 0x01, b'c',
        0x00, 0x01, b'p',
    ];
    assert_encode(&packet, Protocol::MqttV50, &expected);
}

#[test]
fn test_encode_errors() {
    let client_id = "x".repeat(65536);
    assert_eq!(
        Packet::from(Connect::new(&client_id, 0)).encode(Protocol::MqttV311),
        Err(Error::StringTooLong(65536))
    );

    let mut connect = Connect::new("abc", 60);
    connect.properties = Properties::new().with(Property::SessionExpiryInterval(300));
    assert_eq!(
        Packet::from(connect).encode(Protocol::MqttV311),
        Err(Error::PropertiesUnsupported(Protocol::MqttV311))
    );

    let mut publish = Publish::new(QosPid::Level0, topic("t"), Bytes::new());
    publish.properties = Properties::new().with(Property::SessionExpiryInterval(1));
    assert_eq!(
        Packet::from(publish).encode(Protocol::MqttV50),
        Err(Error::InvalidProperty(
            v5::PropertyType::SessionExpiryInterval,
            PacketType::Publish
        ))
    );

    let mut last_will = LastWill::new(QoS::Level0, TopicName::empty(), Bytes::new());
    last_will.retain = true;
    let mut connect = Connect::new("c", 0);
    connect.last_will = Some(last_will);
    assert_eq!(
        Packet::from(connect).encode(Protocol::MqttV311),
        Err(Error::EmptyTopicName)
    );
}
