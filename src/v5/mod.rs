//! Properties of MQTT v5.0
//!
//! Version 5.0 adds a length prefixed properties block to the variable
//! header of CONNECT, PUBLISH, SUBSCRIBE and UNSUBSCRIBE, and to the will
//! message. The packets themselves live in [`crate::packet`].

mod types;


pub use types::{Properties, Property, PropertyType, UserProperty};
