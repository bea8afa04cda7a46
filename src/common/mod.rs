mod error;
mod pid;
mod types;
mod utils;


pub(crate) use utils::{
    encode_packet, packet_from, write_bytes, write_string, write_u16, write_u32, write_u8,
};

pub use error::Error;
pub use pid::PidAllocator;
pub use types::{Encodable, Pid, Protocol, QoS, QosPid, TopicFilter, TopicName, VarBytes};
pub use utils::{
    decode_var_int, decode_var_int_async, encode_var_int, header_len, remaining_len, total_len,
    var_int_len, write_var_int, MAX_REMAINING_LEN,
};

/// Character used to separate each level within a topic tree and provide a hierarchical structure.
pub const LEVEL_SEP: char = '/';
/// Wildcard character that matches only one topic level.
pub const MATCH_ONE_CHAR: char = '+';
/// Wildcard character that matches any number of levels within a topic.
pub const MATCH_ALL_CHAR: char = '#';
