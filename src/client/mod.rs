//! A minimal synchronous client session.
//!
//! The session builds frames with [`crate::packet`], hands them to a
//! [`Transport`] and waits a bounded time for whatever the broker answers.
//! It does not track acknowledgements.

mod config;
mod session;
mod transport;

pub use config::ClientConfig;
pub use session::{PublishOptions, Response, Session};
#[cfg(feature = "tcp")]
pub use transport::TcpTransport;
pub use transport::Transport;
