//! Serial channel used by the scheduler.

use serialport::{ClearBuffer, SerialPort};
use std::io::{self, Read, Write};
use std::time::Duration;

/// A byte channel to the flight controller.
///
/// Reads must be bounded by a timeout: the scheduler cannot be stopped while
/// a read blocks.
pub trait Transport: Read + Write + Send {
    /// Discards any pending input and output bytes.
    fn clear(&mut self) -> io::Result<()>;
}

impl Transport for Box<dyn SerialPort> {
    fn clear(&mut self) -> io::Result<()> {
        SerialPort::clear(&**self, ClearBuffer::All).map_err(io::Error::from)
    }
}

/// Opens `path` as an 8N1 serial port with the given read timeout.
pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> serialport::Result<Box<dyn SerialPort>> {
    serialport::new(path, baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .stop_bits(serialport::StopBits::One)
        .parity(serialport::Parity::None)
        .timeout(timeout)
        .open()
}
