//! Daemon port
//!
//! The `Port` object owns the connection to gpsd and runs it on a
//! dedicated thread, which is the only place the socket is touched:
//! - decoded messages (or receive errors) are handed to a user callback,
//!   usually one that forwards them to a `crossbeam` channel, bridging the
//!   `mio` world of the socket with the consumer's event loop;
//! - commands are queued on a channel and written out by the thread,
//!   which takes care of draining partially written commands.
//!
//! The thread exits when the connection drops or the callback fails.
//! Dropping the `Port` does not stop it; the process owns its lifetime.

mod iobuf;
mod tcp;

use super::proto::{self, Command, Message};
use std::env;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::thread;
use tracing::{debug, info, warn};

/// Possible errors when receiving from a `Port`
#[derive(Debug)]
pub enum RecvError {
    /// No message available at this time.
    NotReady,
    /// The daemon closed the connection.
    Disconnected,
    /// A line could not be decoded. The stream continues after it.
    Protocol(proto::Error),
    /// Low level IO error.
    IO(io::Error),
}

impl std::fmt::Display for RecvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecvError::NotReady => write!(f, "no message ready"),
            RecvError::Disconnected => write!(f, "connection closed by gpsd"),
            RecvError::Protocol(e) => write!(f, "protocol error: {}", e),
            RecvError::IO(e) => write!(f, "i/o error: {}", e),
        }
    }
}

/// Possible errors when sending to a `Port`
#[derive(Debug)]
pub enum SendError {
    /// Used internally by the raw port: the command was written partially
    /// and must be drained.
    MustDrain,
    /// A previous command has not been drained yet.
    Full,
    /// The port thread is gone.
    Disconnected,
    /// Issue with the underlying IO operation.
    IO(io::Error),
    /// The command could not be serialized.
    Serialization,
}

/// Generic interface for the low level part of a port.
trait RawPort {
    /// Returns a message without blocking, or `RecvError::NotReady` if one
    /// is not available. `Protocol` errors are per line; for the other
    /// error values the port should be torn down.
    fn recv(&mut self) -> Result<Message, RecvError>;

    /// Attempts to send a command. `MustDrain` means it was written
    /// partially and `drain()` must succeed before the next send.
    fn send(&mut self, cmd: &Command) -> Result<(), SendError>;

    fn drain(&mut self) -> Result<(), SendError> {
        Ok(())
    }

    fn has_data_to_drain(&self) -> bool {
        false
    }
}

/// Restricts address resolution to one IP family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrFamilyRestrict {
    V4,
    V6,
    Either,
}

/// Default TCP port of gpsd.
pub const GPSD_DEFAULT_PORT: u16 = 2947;

/// Resolves `addr`, appending the default gpsd port when it is missing.
pub fn find_addr(addr: &str, family: AddrFamilyRestrict) -> Result<SocketAddr, io::Error> {
    let iter = match addr.to_socket_addrs() {
        Ok(iter) => iter,
        Err(err) => match format!("{}:{}", addr, GPSD_DEFAULT_PORT).to_socket_addrs() {
            Ok(iter) => iter,
            Err(_) => match format!("[{}]:{}", addr, GPSD_DEFAULT_PORT).to_socket_addrs() {
                Ok(iter) => iter,
                Err(_) => return Err(err),
            },
        },
    };
    for sa in iter {
        match (sa, family) {
            (SocketAddr::V4(_), AddrFamilyRestrict::V6) => continue,
            (SocketAddr::V6(_), AddrFamilyRestrict::V4) => continue,
            _ => return Ok(sa),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AddrNotAvailable,
        "address resolution failed",
    ))
}

/// Builds a port url from a host and a port, bracketing IPv6 literals.
pub fn daemon_url(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("tcp://[{}]:{}", host, port)
    } else {
        format!("tcp://{}:{}", host, port)
    }
}

/// Default size of the rx channel.
pub const DEFAULT_RX_CHANNEL_SIZE: usize = 1024;

/// Size of the outgoing command queue.
const TX_CHANNEL_SIZE: usize = 8;

const TOKEN_WAKER: mio::Token = mio::Token(0);
const TOKEN_SOCKET: mio::Token = mio::Token(1);

/// Handle to a connection to gpsd serviced by a dedicated thread.
pub struct Port {
    tx: crossbeam::channel::Sender<Command>,
    waker: mio::Waker,
    peer: SocketAddr,
}

impl Port {
    /// Event loop of the port thread.
    fn poller_thread<
        RawPortT: RawPort + mio::event::Source,
        RxCallbackT: Fn(Result<Message, RecvError>) -> io::Result<()>,
    >(
        mut raw_port: RawPortT,
        mut poll: mio::Poll,
        rx: RxCallbackT,
        tx: crossbeam::channel::Receiver<Command>,
    ) {
        use crossbeam::channel::TryRecvError;

        let mut events = mio::Events::with_capacity(4);
        let mut needs_draining = false;
        // Set when commands arrive while a previous one is still draining.
        let mut needs_tx_queue_check = false;

        if let Err(e) = poll
            .registry()
            .register(&mut raw_port, TOKEN_SOCKET, mio::Interest::READABLE)
        {
            let _ = rx(Err(RecvError::IO(e)));
            return;
        }

        'ioloop: loop {
            if let Err(e) = poll.poll(&mut events, None) {
                if e.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                let _ = rx(Err(RecvError::IO(e)));
                break 'ioloop;
            }

            let mut check_tx_channel = false;

            for event in events.iter() {
                match event.token() {
                    TOKEN_WAKER => {
                        if needs_draining {
                            needs_tx_queue_check = true;
                        } else {
                            check_tx_channel = true;
                        }
                    }
                    TOKEN_SOCKET => {
                        if event.is_writable() && needs_draining {
                            match raw_port.drain() {
                                Ok(_) => {
                                    needs_draining = false;
                                    needs_tx_queue_check = true;
                                    if poll
                                        .registry()
                                        .reregister(
                                            &mut raw_port,
                                            TOKEN_SOCKET,
                                            mio::Interest::READABLE,
                                        )
                                        .is_err()
                                    {
                                        break 'ioloop;
                                    }
                                }
                                Err(SendError::MustDrain) => {}
                                Err(_) => break 'ioloop,
                            }
                        }
                        loop {
                            match raw_port.recv() {
                                Ok(msg) => {
                                    if rx(Ok(msg)).is_err() {
                                        break 'ioloop;
                                    }
                                }
                                Err(RecvError::NotReady) => break,
                                Err(e) => {
                                    let fatal = !matches!(e, RecvError::Protocol(_));
                                    if rx(Err(e)).is_err() || fatal {
                                        break 'ioloop;
                                    }
                                }
                            }
                        }
                    }
                    mio::Token(x) => {
                        warn!(token = x, "unexpected poll token");
                    }
                }
            }

            if !needs_draining && needs_tx_queue_check {
                check_tx_channel = true;
                needs_tx_queue_check = false;
            }

            if check_tx_channel {
                loop {
                    match tx.try_recv() {
                        Ok(cmd) => match raw_port.send(&cmd) {
                            Ok(_) => debug!(?cmd, "command sent"),
                            Err(SendError::MustDrain) => {
                                needs_draining = true;
                                if poll
                                    .registry()
                                    .reregister(
                                        &mut raw_port,
                                        TOKEN_SOCKET,
                                        mio::Interest::READABLE.add(mio::Interest::WRITABLE),
                                    )
                                    .is_err()
                                {
                                    break 'ioloop;
                                }
                                break;
                            }
                            Err(SendError::Serialization) => {
                                warn!(?cmd, "command could not be serialized");
                            }
                            Err(_) => break 'ioloop,
                        },
                        Err(TryRecvError::Empty) => break,
                        // The handle is gone but the stream is still wanted.
                        Err(TryRecvError::Disconnected) => break,
                    }
                }
            }
        }
        debug!("port thread exiting");
    }

    /// Create a `Port` from a `RawPort` and a rx callback.
    fn from_raw<
        RawPortT: RawPort + mio::event::Source + Send + 'static,
        RxCallbackT: Fn(Result<Message, RecvError>) -> io::Result<()> + Send + 'static,
    >(
        raw_port: RawPortT,
        peer: SocketAddr,
        rx: RxCallbackT,
    ) -> io::Result<Port> {
        let (tx, ttx) = crossbeam::channel::bounded::<Command>(TX_CHANNEL_SIZE);
        let poll = mio::Poll::new()?;
        let waker = mio::Waker::new(poll.registry(), TOKEN_WAKER)?;
        thread::Builder::new()
            .name("gpsd-port".into())
            .spawn(move || Port::poller_thread(raw_port, poll, rx, ttx))?;
        Ok(Port { tx, waker, peer })
    }

    /// Connects to the daemon at `url`, sending received messages or
    /// errors to `rx`.
    ///
    /// A valid `url` is `host[:port]`, optionally prefixed by `tcp://`, or
    /// by `tcp4://`/`tcp6://` to force an IP family. The port defaults to
    /// 2947. The connection is established before returning, so an
    /// unreachable daemon is reported here.
    ///
    /// The rx callback runs on the port thread. If it returns an `Err()`,
    /// the port thread exits.
    pub fn new<RXT: Fn(Result<Message, RecvError>) -> io::Result<()> + Send + 'static>(
        url: &str,
        rx: RXT,
    ) -> io::Result<Port> {
        let (addr, family) = match url.split_once("://") {
            None => (url, AddrFamilyRestrict::Either),
            Some(("tcp", addr)) => (addr, AddrFamilyRestrict::Either),
            Some(("tcp4", addr)) => (addr, AddrFamilyRestrict::V4),
            Some(("tcp6", addr)) => (addr, AddrFamilyRestrict::V6),
            Some(_) => {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "invalid url"));
            }
        };
        let peer = find_addr(addr, family)?;
        let stream = std::net::TcpStream::connect(peer)?;
        info!(%peer, "connected to gpsd");
        Port::from_tcp_stream(stream, rx)
    }

    /// Create a new port from a connected `std::net::TcpStream`. See `new()`.
    pub fn from_tcp_stream<
        RXT: Fn(Result<Message, RecvError>) -> io::Result<()> + Send + 'static,
    >(
        stream: std::net::TcpStream,
        rx: RXT,
    ) -> io::Result<Port> {
        let peer = stream.peer_addr()?;
        stream.set_nonblocking(true)?;
        let stream = mio::net::TcpStream::from_std(stream);
        Port::from_raw(tcp::Port::from_stream(stream), peer, rx)
    }

    /// Creates a sender/receiver pair to be used with `rx_to_channel`:
    /// ```no_run
    /// use aisview::gpsd::Port;
    /// let (port_rx_send, port_rx) = Port::rx_channel();
    /// let port = Port::new("localhost", Port::rx_to_channel(port_rx_send)).unwrap();
    /// ```
    /// The channel size is `DEFAULT_RX_CHANNEL_SIZE`, or the value of the
    /// `AISVIEW_RX_BUFSIZE` environment variable if it is larger.
    pub fn rx_channel() -> (
        crossbeam::channel::Sender<Result<Message, RecvError>>,
        crossbeam::channel::Receiver<Result<Message, RecvError>>,
    ) {
        let size = match env::var("AISVIEW_RX_BUFSIZE") {
            Ok(req) => std::cmp::max(req.parse().unwrap_or(0), DEFAULT_RX_CHANNEL_SIZE),
            Err(_) => DEFAULT_RX_CHANNEL_SIZE,
        };
        Port::rx_channel_custom(size)
    }

    /// Same as `rx_channel`, but with user specified size.
    pub fn rx_channel_custom(
        size: usize,
    ) -> (
        crossbeam::channel::Sender<Result<Message, RecvError>>,
        crossbeam::channel::Receiver<Result<Message, RecvError>>,
    ) {
        crossbeam::channel::bounded::<Result<Message, RecvError>>(size)
    }

    /// Returns a RX callback which sends the received results to a channel,
    /// blocking the port thread (and so the socket) while the channel is full.
    pub fn rx_to_channel(
        rx_send: crossbeam::channel::Sender<Result<Message, RecvError>>,
    ) -> impl Fn(Result<Message, RecvError>) -> io::Result<()> {
        move |rxdata| -> io::Result<()> {
            rx_send
                .send(rxdata)
                .map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    /// Same as `rx_to_channel`, but never blocks: results that don't fit
    /// in the channel are handed to `full_cb` instead.
    pub fn rx_to_channel_cb<FullCBT: Fn(Result<Message, RecvError>) + Send + 'static>(
        rx_send: crossbeam::channel::Sender<Result<Message, RecvError>>,
        full_cb: FullCBT,
    ) -> impl Fn(Result<Message, RecvError>) -> io::Result<()> {
        move |rxdata| -> io::Result<()> {
            use crossbeam::channel::TrySendError;
            match rx_send.try_send(rxdata) {
                Ok(_) => Ok(()),
                Err(TrySendError::Full(res)) => {
                    full_cb(res);
                    Ok(())
                }
                Err(TrySendError::Disconnected(_)) => {
                    Err(io::Error::from(io::ErrorKind::BrokenPipe))
                }
            }
        }
    }

    /// Queues a command for the daemon. Blocks if the queue is full.
    pub fn send(&self, cmd: Command) -> Result<(), SendError> {
        self.tx.send(cmd).map_err(|_| SendError::Disconnected)?;
        self.waker.wake().map_err(SendError::IO)
    }

    /// Address of the daemon.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}
