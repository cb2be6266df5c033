//! This crate provides a client for the MultiWii Serial Protocol (MSP v1).
//!
//! The protocol is half-duplex and single-master: the host sends a request
//! frame, the flight controller answers with one response frame. A
//! [`Scheduler`] owns the serial port, polls every prioritized telemetry
//! command in a loop and publishes the raw payloads into a [`DataStore`].
//! # Usage
//! ### Frame encoding and decoding
//! ```rust
//! use multiwii::{decode_response, encode_request, lookup, Command};
//!
//! let rc = lookup(Command::Rc).unwrap();
//! let request = encode_request(rc, &[]).unwrap();
//! assert_eq!(request, [0x24, 0x4d, 0x3c, 0x00, 0x69, 0x69]);
//!
//! let altitude = lookup(Command::Altitude).unwrap();
//! let response = [0x24, 0x4d, 0x3e, 6, 109, 0x10, 0, 0, 0, 0xfe, 0xff, 0x7a];
//! assert_eq!(decode_response(altitude, &response).unwrap(), vec![16, -2]);
//! ```
//! ### Polling a flight controller
//! ```no_run
//! use std::time::Duration;
//! use multiwii::{values::Attitude, Config, Scheduler};
//!
//! let port = multiwii::transport::open("/dev/ttyUSB0", 115_200, Duration::from_millis(50)).unwrap();
//! let mut scheduler = Scheduler::new(port, Config::default());
//! scheduler.start().unwrap();
//!
//! let store = scheduler.store();
//! if let Some(attitude) = store.get_as::<Attitude>().unwrap() {
//!     println!("{attitude:?}");
//! }
//!
//! scheduler.stop().unwrap();
//! ```

mod command;
pub use command::*;

mod codec;
pub use codec::*;

mod reader;
pub use reader::*;

mod error;
pub use error::*;

mod queue;
pub use queue::{PendingTask, TaskKind};

mod store;
pub use store::*;

mod scheduler;
pub use scheduler::*;

pub mod transport;
pub use transport::Transport;

pub mod values;

/// First two bytes of every frame, `$M`.
pub const PREAMBLE: [u8; 2] = *b"$M";
/// Preamble, direction, length and code bytes.
pub const HEADER_LEN: usize = 5;
/// Largest payload a one-byte length field can announce.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;
/// Largest possible frame: header, payload and checksum.
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_PAYLOAD_LEN + 1;
