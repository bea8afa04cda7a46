use futures_lite::future::block_on;

use crate::packet::*;
use crate::*;

#[test]
fn test_decode_response_headers() {
    for (data, typ, remaining_len) in [
        (&[0x20, 0x02, 0x00, 0x00][..], PacketType::Connack, 2),
        (&[0x20, 0x03, 0x00, 0x00, 0x00][..], PacketType::Connack, 3),
        (&[0x90, 0x03, 0x00, 0x01, 0x01][..], PacketType::Suback, 3),
        (&[0xB0, 0x02, 0x00, 0x02][..], PacketType::Unsuback, 2),
        (&[0x40, 0x02, 0x00, 0x01][..], PacketType::Puback, 2),
        (&[0x50, 0x02, 0x00, 0x01][..], PacketType::Pubrec, 2),
        (&[0x70, 0x02, 0x00, 0x01][..], PacketType::Pubcomp, 2),
        (&[0xD0, 0x00][..], PacketType::Pingresp, 0),
        (&[0xE0, 0x00][..], PacketType::Disconnect, 0),
        (&[0xF0, 0x00][..], PacketType::Auth, 0),
    ] {
        let header = Header::decode(data).unwrap();
        assert_eq!(header.typ, typ, "{:?}", data);
        assert_eq!(header.remaining_len, remaining_len);
        assert!(!header.dup);
        assert!(!header.retain);

        let mut reader = data;
        assert_eq!(block_on(Header::decode_async(&mut reader)).unwrap(), header);
    }
}

#[test]
fn test_decode_publish_flags() {
    let header = Header::decode(&[0x3B, 0x80, 0x01]).unwrap();
    assert_eq!(
        header,
        Header::new(PacketType::Publish, true, QoS::Level1, true, 128)
    );

    let header = Header::decode(&[0x34, 0x05]).unwrap();
    assert_eq!(header.qos, QoS::Level2);
    assert!(!header.dup);
    assert!(!header.retain);
}

#[test]
fn test_decode_invalid_header() {
    // reserved flags
    assert_eq!(Header::decode(&[0x21, 0x02]), Err(Error::InvalidHeader));
    assert_eq!(Header::decode(&[0x60, 0x02]), Err(Error::InvalidHeader));
    assert_eq!(Header::decode(&[0x80, 0x02]), Err(Error::InvalidHeader));
    assert_eq!(Header::decode(&[0xD2, 0x00]), Err(Error::InvalidHeader));
    // packet type 0 is reserved
    assert_eq!(Header::decode(&[0x00, 0x00]), Err(Error::InvalidHeader));
    // publish with QoS 3
    assert_eq!(Header::decode(&[0x36, 0x00]), Err(Error::InvalidQos(3)));

    assert_eq!(
        Header::decode(&[0x30, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]),
        Err(Error::InvalidVarByteInt)
    );
}

#[test]
fn test_decode_truncated() {
    assert!(Header::decode(&[]).unwrap_err().is_eof());
    assert!(Header::decode(&[0x20]).unwrap_err().is_eof());
    assert!(Header::decode(&[0x30, 0x80]).unwrap_err().is_eof());
}

#[test]
fn test_new_with_matches_builder() {
    for (packet, protocol) in [
        (Packet::Pingreq, Protocol::MqttV311),
        (Packet::Disconnect, Protocol::MqttV50),
        (
            Packet::Pubrel(Pid::try_from(3).unwrap()),
            Protocol::MqttV311,
        ),
    ] {
        let data = packet.encode(protocol).unwrap();
        let bytes = data.as_slice();
        let header = Header::new_with(bytes[0], bytes.len() - 2).unwrap();
        assert_eq!(header.typ, packet.get_type());
        assert_eq!(header.typ.to_string(), format!("{:?}", header.typ).to_uppercase());
    }
}
