//! Scripted transport and clock shared by the integration tests.

#![allow(dead_code)]

use libmqisdp::network::application::mqtt::Clock;
use libmqisdp::network::error::Error;
use libmqisdp::network::*;
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

pub const CONNACK_ACCEPTED: [u8; 4] = [0x20, 0x02, 0x00, 0x00];

/// A transport that replays queued inbound chunks and records every write.
#[derive(Debug, Default)]
pub struct MockConnection {
    inbound: VecDeque<Vec<u8>>,
    pub written: Vec<u8>,
    pub writes: usize,
    pub max_write: Option<usize>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub closed: Rc<Cell<bool>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection whose first read yields an accepting CONNACK.
    pub fn accepting() -> Self {
        let mut connection = Self::new();
        connection.queue(&CONNACK_ACCEPTED);
        connection
    }

    /// Queue one chunk; each read returns at most one chunk.
    pub fn queue(&mut self, chunk: &[u8]) {
        self.inbound.push_back(chunk.to_vec());
    }

    pub fn pending_reads(&self) -> usize {
        self.inbound.len()
    }
}

impl Read for MockConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err(Error::ConnectionClosed);
        }
        let Some(mut chunk) = self.inbound.pop_front() else {
            return Ok(0);
        };
        let len = buf.len().min(chunk.len());
        buf[..len].copy_from_slice(&chunk[..len]);
        if len < chunk.len() {
            self.inbound.push_front(chunk.split_off(len));
        }
        Ok(len)
    }
}

impl Write for MockConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(Error::NotOpen);
        }
        let len = self.max_write.map_or(buf.len(), |max| max.min(buf.len()));
        self.written.extend_from_slice(&buf[..len]);
        self.writes += 1;
        Ok(len)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        self.closed.set(true);
        Ok(())
    }
}

impl Connection for MockConnection {}

/// Hands out fresh mock connections and remembers the address dialled.
#[derive(Debug, Default)]
pub struct MockConnector {
    pub dialled: Option<String>,
    pub refuse: bool,
}

impl Connect for MockConnector {
    type Connection = MockConnection;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        self.dialled = Some(remote.to_string());
        if self.refuse {
            return Err(Error::ConnectionRefused);
        }
        Ok(MockConnection::accepting())
    }
}

/// A clock the test controls. Every reading advances it by `step`.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now: Rc<Cell<u64>>,
    step: u64,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stepping(step: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(0)),
            step,
        }
    }

    pub fn set(&self, now: u64) {
        self.now.set(now);
    }
}

impl Clock for MockClock {
    fn now_millis(&mut self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}

#[cfg(feature = "async")]
mod async_impls {
    use super::*;

    impl AsyncRead for MockConnection {
        type Error = Error;
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            Read::read(self, buf)
        }
    }

    impl AsyncWrite for MockConnection {
        type Error = Error;
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            Write::write(self, buf)
        }
        async fn flush(&mut self) -> Result<(), Self::Error> {
            Write::flush(self)
        }
    }

    impl AsyncClose for MockConnection {
        type Error = Error;
        async fn close(self) -> Result<(), Self::Error> {
            Close::close(self)
        }
    }

    impl AsyncConnection for MockConnection {}

    impl AsyncConnect for MockConnector {
        type Connection = MockConnection;
        type Error = Error;
        async fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
            Connect::connect(self, remote)
        }
    }
}
