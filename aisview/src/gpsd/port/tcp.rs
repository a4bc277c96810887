//! TCP Port
//!
//! Implements a `RawPort` for the TCP connection to gpsd, and an MIO event
//! source. Incoming bytes are split into lines and decoded one message at
//! a time; commands are written out whole, buffering any unsent tail.

use super::{iobuf::IOBuf, proto, Command, Message, RawPort, RecvError, SendError};
use mio::net::TcpStream;
use std::io;
use std::io::Write;

/// RawPort to communicate with gpsd via TCP
pub struct Port {
    stream: TcpStream,
    /// Incoming buffer, holds partial lines.
    rxbuf: IOBuf,
    /// Outgoing buffer, holds the unsent part of a command.
    txbuf: IOBuf,
}

impl Port {
    /// Takes ownership of a connected MIO `TcpStream`.
    pub fn from_stream(stream: TcpStream) -> Port {
        Port {
            stream,
            rxbuf: IOBuf::new(),
            txbuf: IOBuf::new(),
        }
    }

    /// Attempts to decode a message only from data already buffered.
    fn recv_buffered(&mut self) -> Result<Message, RecvError> {
        loop {
            let (parsed, size) = match proto::next_line(self.rxbuf.data()) {
                Ok((line, size)) => (Message::parse(line), size),
                Err(proto::Error::NeedMore) => return Err(RecvError::NotReady),
                Err(perr) => {
                    // Unterminated garbage, nothing in it can be recovered.
                    self.rxbuf.flush();
                    return Err(RecvError::Protocol(perr));
                }
            };
            self.rxbuf.consume(size);
            match parsed {
                Ok(Some(msg)) => return Ok(msg),
                Ok(None) => continue,
                Err(perr) => return Err(RecvError::Protocol(perr)),
            }
        }
    }
}

impl RawPort for Port {
    fn recv(&mut self) -> Result<Message, RecvError> {
        // Keep reading until a full line shows up or the socket would block,
        // since readiness is edge triggered.
        loop {
            match self.recv_buffered() {
                Err(RecvError::NotReady) => self.rxbuf.refill(&mut self.stream)?,
                res => return res,
            }
        }
    }

    fn send(&mut self, cmd: &Command) -> Result<(), SendError> {
        if self.has_data_to_drain() {
            return Err(SendError::Full);
        }
        let raw = cmd.serialize().map_err(|_| SendError::Serialization)?;
        match self.stream.write(&raw) {
            Ok(size) if size == raw.len() => Ok(()),
            Ok(size) => {
                // Commands are far smaller than the buffer.
                self.txbuf
                    .add_data(&raw[size..])
                    .map_err(|_| SendError::Serialization)?;
                Err(SendError::MustDrain)
            }
            Err(err) => match err.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::NotConnected => {
                    self.txbuf
                        .add_data(&raw[..])
                        .map_err(|_| SendError::Serialization)?;
                    Err(SendError::MustDrain)
                }
                _ => Err(SendError::IO(err)),
            },
        }
    }

    fn drain(&mut self) -> Result<(), SendError> {
        self.txbuf.drain(&mut self.stream)
    }

    fn has_data_to_drain(&self) -> bool {
        !self.txbuf.empty()
    }
}

impl mio::event::Source for Port {
    fn register(
        &mut self,
        registry: &mio::Registry,
        token: mio::Token,
        interests: mio::Interest,
    ) -> io::Result<()> {
        self.stream.register(registry, token, interests)
    }

    fn reregister(
        &mut self,
        registry: &mio::Registry,
        token: mio::Token,
        interests: mio::Interest,
    ) -> io::Result<()> {
        self.stream.reregister(registry, token, interests)
    }

    fn deregister(&mut self, registry: &mio::Registry) -> io::Result<()> {
        self.stream.deregister(registry)
    }
}
