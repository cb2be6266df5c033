use crate::{Direction, HEADER_LEN, MAX_FRAME_LEN, PREAMBLE};
use std::io::{self, Read};

/// Represents a state machine for delimiting an MSP frame in a byte stream
///
/// +-----------------+   +-----------+   +-------------------+   +-------------+   +---------+
/// | AwaitingDollar  |-->| AwaitingM |-->| AwaitingDirection |-->| AwaitingLen |-->| Reading |
/// +-----------------+   +-----------+   +-------------------+   +-------------+   +---------+
///         ^                   |                   |                                     |
///         +-------------------+-------------------+-------------------------------------+
///
/// An error direction completes the frame right after the direction byte.
#[derive(Clone, Copy, Debug, PartialEq)]
enum ReadState {
    AwaitingDollar,
    AwaitingM,
    AwaitingDirection,
    AwaitingLen,
    Reading,
}

/// Represents a frame reader
///
/// The reader only finds frame boundaries. Checksum and layout validation is
/// left to [`decode_response`](crate::decode_response), which takes the
/// yielded bytes as is.
pub struct FrameReader {
    state: ReadState,
    buf: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl FrameReader {
    /// Creates a new FrameReader struct
    pub const fn new() -> Self {
        Self {
            state: ReadState::AwaitingDollar,
            buf: [0; MAX_FRAME_LEN],
            len: 0,
        }
    }

    /// Resets reader's state
    ///
    /// Useful when a read timed out in the middle of a frame
    pub fn reset(&mut self) {
        self.state = ReadState::AwaitingDollar;
        self.len = 0;
    }

    /// Consumes bytes until a frame is complete. Returns the frame, if any, and
    /// the bytes that were not consumed.
    pub fn push_bytes<'r, 'b>(&'r mut self, bytes: &'b [u8]) -> (Option<&'r [u8]>, &'b [u8]) {
        let mut consumed = 0;
        let mut complete = false;

        while !complete && consumed < bytes.len() {
            let byte = bytes[consumed];
            consumed += 1;

            match self.state {
                ReadState::AwaitingDollar => {
                    if byte == PREAMBLE[0] {
                        self.buf[0] = byte;
                        self.len = 1;
                        self.state = ReadState::AwaitingM;
                    }
                }
                ReadState::AwaitingM => {
                    if byte == PREAMBLE[1] {
                        self.push(byte);
                        self.state = ReadState::AwaitingDirection;
                    } else {
                        self.restart(byte);
                    }
                }
                ReadState::AwaitingDirection => match Direction::try_from(byte) {
                    Ok(Direction::Error) => {
                        self.push(byte);
                        complete = true;
                    }
                    Ok(_) => {
                        self.push(byte);
                        self.state = ReadState::AwaitingLen;
                    }
                    Err(_) => {
                        log::trace!("Dropping partial header, bad direction {byte:#04x}");
                        self.restart(byte);
                    }
                },
                ReadState::AwaitingLen => {
                    self.push(byte);
                    self.state = ReadState::Reading;
                }
                ReadState::Reading => {
                    self.push(byte);
                    // Length byte, code byte, data and checksum
                    let final_len = HEADER_LEN + self.buf[3] as usize + 1;
                    complete = self.len == final_len;
                }
            }
        }

        let frame = if complete {
            self.state = ReadState::AwaitingDollar;
            Some(&self.buf[..self.len])
        } else {
            None
        };

        (frame, &bytes[consumed..])
    }

    fn push(&mut self, byte: u8) {
        self.buf[self.len] = byte;
        self.len += 1;
    }

    /// Restarts the preamble hunt, reusing `byte` if it can open a frame.
    fn restart(&mut self, byte: u8) {
        self.reset();
        if byte == PREAMBLE[0] {
            self.push(byte);
            self.state = ReadState::AwaitingM;
        }
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads from `io` until `reader` yields one frame and returns it.
///
/// Bytes following the frame in the last chunk are discarded. A source that
/// reaches end of file before the frame is complete is reported as
/// [`io::ErrorKind::UnexpectedEof`].
pub fn read_frame<R: Read + ?Sized>(reader: &mut FrameReader, io: &mut R) -> io::Result<Vec<u8>> {
    let mut chunk = [0u8; 64];
    loop {
        let n = match io.read(&mut chunk) {
            Ok(0) => {
                reader.reset();
                return Err(io::ErrorKind::UnexpectedEof.into());
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                reader.reset();
                return Err(e);
            }
        };

        if let (Some(frame), rest) = reader.push_bytes(&chunk[..n]) {
            if !rest.is_empty() {
                log::trace!("Discarding {} bytes after frame", rest.len());
            }
            return Ok(frame.to_vec());
        }
    }
}
