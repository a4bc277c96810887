//! Client side of the gpsd protocol: line framing and decoding of JSON
//! reports, and a threaded port that streams them from the daemon.

pub mod port;
pub mod proto;

pub use port::{daemon_url, Port, RecvError, SendError, GPSD_DEFAULT_PORT};
pub use proto::{Command, Message};
