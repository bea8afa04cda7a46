//! Client-side MQTT [v3.1.1] and [v5.0] packet builder.
//!
//! [v3.1.1]: http://docs.oasis-open.org/mqtt/mqtt/v3.1.1/os/mqtt-v3.1.1-os.html
//! [v5.0]: https://docs.oasis-open.org/mqtt/mqtt/v5.0/os/mqtt-v5.0-os.html

mod common;
pub mod client;
pub mod packet;
pub mod v5;

pub(crate) use common::{
    encode_packet, packet_from, write_bytes, write_string, write_u16, write_u32, write_u8,
};
pub use common::{
    decode_var_int, decode_var_int_async, encode_var_int, header_len, remaining_len, total_len,
    var_int_len, write_var_int, Encodable, Error, Pid, PidAllocator, Protocol, QoS, QosPid,
    TopicFilter, TopicName, VarBytes, MAX_REMAINING_LEN,
};
