#![no_main]

use libfuzzer_sys::fuzz_target;

use mqtt_frame::packet::{Header, Packet, Subscribe, Unsubscribe};
use mqtt_frame::{header_len, Pid, Protocol, QoS, TopicFilter};

fuzz_target!(|data: &[u8]| {
    let Ok(filter) = TopicFilter::try_from(data) else {
        return;
    };
    let pid = Pid::default();
    let packets: [Packet; 2] = [
        Subscribe::new(pid, vec![(filter.clone(), QoS::Level1.into())]).into(),
        Unsubscribe::new(pid, vec![filter]).into(),
    ];
    for packet in packets {
        for protocol in [Protocol::MqttV311, Protocol::MqttV50] {
            let Ok(frame) = packet.encode(protocol) else {
                continue;
            };
            let header = Header::decode(frame.as_slice()).unwrap();
            assert_eq!(header.typ, packet.get_type());
            assert_eq!(header.remaining_len, frame.len() - header_len(frame.len()));
        }
    }
});
