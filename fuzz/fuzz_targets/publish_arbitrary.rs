#![no_main]

use futures_lite::future::block_on;
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

use mqtt_frame::packet::{Header, Packet, Publish};
use mqtt_frame::{header_len, Protocol, QosPid, TopicName};

#[derive(Debug, Arbitrary)]
struct Input {
    protocol: Protocol,
    dup: bool,
    retain: bool,
    qos_pid: QosPid,
    topic_name: TopicName,
    payload: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let mut publish = Publish::new(input.qos_pid, input.topic_name, input.payload);
    publish.dup = input.dup;
    publish.retain = input.retain;
    let packet = Packet::Publish(publish);

    let Ok(frame) = packet.encode(input.protocol) else {
        return;
    };
    let mut data_async = Vec::new();
    block_on(packet.encode_async(&mut data_async, input.protocol)).unwrap();
    assert_eq!(frame.as_slice(), &data_async);
    assert_eq!(packet.encode_len(input.protocol).unwrap(), frame.len());

    let header = Header::decode(frame.as_slice()).unwrap();
    assert_eq!(header.qos, input.qos_pid.qos());
    assert_eq!(header.dup, input.dup);
    assert_eq!(header.retain, input.retain);
    assert_eq!(header.remaining_len, frame.len() - header_len(frame.len()));
});
