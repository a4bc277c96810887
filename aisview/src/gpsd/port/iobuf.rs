//! Internal buffer for the daemon byte stream.

use super::{proto, RecvError, SendError};
use std::io;

/// Size of the internal buffer. Always holds at least one full line.
const IOBUF_SIZE: usize = 2 * proto::MAX_LINE_SIZE;

/// Buffer used to split the incoming stream into lines and to hold
/// the unsent tail of a partially written command.
pub struct IOBuf {
    /// Valid data (possibly none) is `buf[start..end]`.
    buf: Box<[u8; IOBUF_SIZE]>,
    start: usize,
    end: usize,
}

impl IOBuf {
    pub fn new() -> IOBuf {
        IOBuf {
            buf: Box::new([0; IOBUF_SIZE]),
            start: 0,
            end: 0,
        }
    }

    pub fn empty(&self) -> bool {
        self.start == self.end
    }

    pub fn size(&self) -> usize {
        self.end - self.start
    }

    pub fn data(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    /// Discards `len` bytes off the front. `len` must be at most `size()`.
    pub fn consume(&mut self, len: usize) {
        if len > self.size() {
            panic!("Invalid consume for more data that is contained");
        }
        self.start += len;
    }

    /// Discard the entire content of the buffer.
    pub fn flush(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    fn compact(&mut self) {
        if self.start != 0 {
            let len = self.size();
            self.buf.copy_within(self.start..self.end, 0);
            self.start = 0;
            self.end = len;
        }
    }

    /// Reads as much as fits from `reader`. Interrupted reads are retried.
    pub fn refill<T: io::Read>(&mut self, reader: &mut T) -> Result<(), RecvError> {
        self.compact();
        loop {
            match reader.read(&mut self.buf[self.end..]) {
                Ok(0) => return Err(RecvError::Disconnected),
                Ok(size) => {
                    self.end += size;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Err(RecvError::NotReady),
                Err(e) => return Err(RecvError::IO(e)),
            }
        }
    }

    /// Appends as much of `data` as fits. On a partial append, returns
    /// the number of bytes that were appended.
    pub fn add_data(&mut self, data: &[u8]) -> Result<(), usize> {
        self.compact();
        let copy_size = std::cmp::min(IOBUF_SIZE - self.end, data.len());
        self.buf[self.end..self.end + copy_size].copy_from_slice(&data[0..copy_size]);
        self.end += copy_size;
        if copy_size == data.len() {
            Ok(())
        } else {
            Err(copy_size)
        }
    }

    /// Writes as much of the contained data as possible to `writer`.
    pub fn drain<T: io::Write>(&mut self, writer: &mut T) -> Result<(), SendError> {
        if self.empty() {
            return Ok(());
        }
        match writer.write(self.data()) {
            Ok(size) => {
                self.consume(size);
                if self.empty() {
                    self.flush();
                    Ok(())
                } else {
                    Err(SendError::MustDrain)
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(SendError::MustDrain),
            Err(e) => Err(SendError::IO(e)),
        }
    }
}
