use std::io;
use std::time::Duration;

#[cfg(feature = "tcp")]
use std::{
    io::{Read, Write},
    net::{Shutdown, TcpStream as StdTcpStream, ToSocketAddrs},
    time::Instant,
};

#[cfg(feature = "tcp")]
use mio::{net::TcpStream, Events, Interest, Poll, Token};

/// The byte pipe a [`Session`](super::Session) talks through.
pub trait Transport {
    /// Send the whole buffer.
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Wait until data can be read, `false` when the timeout elapsed first.
    fn poll_readable(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Read what is available, at most `max_bytes`. An empty buffer means
    /// the peer closed the connection.
    fn read(&mut self, max_bytes: usize) -> io::Result<Vec<u8>>;

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).send(data)
    }

    fn poll_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        (**self).poll_readable(timeout)
    }

    fn read(&mut self, max_bytes: usize) -> io::Result<Vec<u8>> {
        (**self).read(max_bytes)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

#[cfg(feature = "tcp")]
const STREAM: Token = Token(0);

/// Non-blocking TCP connection driven by a mio [`Poll`].
#[cfg(feature = "tcp")]
pub struct TcpTransport {
    poll: Poll,
    events: Events,
    stream: Option<TcpStream>,
    write_timeout: Duration,
}

#[cfg(feature = "tcp")]
impl TcpTransport {
    /// Resolve `address` and connect, giving up after `timeout`. The same
    /// timeout bounds a write that can not make progress.
    pub fn connect(address: &str, timeout: Duration) -> io::Result<Self> {
        let addr = address.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not resolve address")
        })?;

        let std_stream = StdTcpStream::connect_timeout(&addr, timeout)?;
        std_stream.set_nonblocking(true)?;
        std_stream.set_nodelay(true)?;
        let mut stream = TcpStream::from_std(std_stream);

        let poll = Poll::new()?;
        poll.registry()
            .register(&mut stream, STREAM, Interest::READABLE)?;
        log::debug!("connected to {}", addr);

        Ok(TcpTransport {
            poll,
            events: Events::with_capacity(16),
            stream: Some(stream),
            write_timeout: timeout,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Re-arm `interest` and wait for it. Re-registering reports readiness
    /// that is already pending, so a partially drained socket still wakes.
    fn wait_for(&mut self, interest: Interest, timeout: Duration) -> io::Result<bool> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        self.poll.registry().reregister(stream, STREAM, interest)?;

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.poll.poll(&mut self.events, Some(remaining)) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
            let ready = self.events.iter().any(|event| {
                event.token() == STREAM
                    && (event.is_error()
                        || if interest.is_readable() {
                            event.is_readable() || event.is_read_closed()
                        } else {
                            event.is_writable() || event.is_write_closed()
                        })
            });
            if ready {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
        }
    }
}

#[cfg(feature = "tcp")]
impl Transport for TcpTransport {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        let mut written = 0;
        while written < data.len() {
            let stream = self.stream.as_mut().ok_or_else(not_connected)?;
            match stream.write(&data[written..]) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => written += n,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    if !self.wait_for(Interest::WRITABLE, self.write_timeout)? {
                        return Err(io::ErrorKind::TimedOut.into());
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        log::trace!("wrote {} bytes", written);
        Ok(())
    }

    fn poll_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        self.wait_for(Interest::READABLE, timeout)
    }

    fn read(&mut self, max_bytes: usize) -> io::Result<Vec<u8>> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        let mut buf = vec![0u8; max_bytes];
        let n = loop {
            match stream.read(&mut buf) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                result => break result?,
            }
        };
        buf.truncate(n);
        Ok(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(mut stream) = self.stream.take() {
            if let Err(err) = self.poll.registry().deregister(&mut stream) {
                log::debug!("deregister failed: {}", err);
            }
            match stream.shutdown(Shutdown::Both) {
                Err(err) if err.kind() != io::ErrorKind::NotConnected => return Err(err),
                _ => {}
            }
            log::debug!("connection closed");
        }
        Ok(())
    }
}

#[cfg(feature = "tcp")]
fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "transport closed")
}
