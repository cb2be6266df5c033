//! Request encoding and response validation. No I/O happens here.

use crate::{CommandDescriptor, Field, MAX_PAYLOAD_LEN, PREAMBLE};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use snafu::Snafu;

/// Third byte of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Direction {
    /// Host to flight controller, `<`
    Outgoing = b'<',
    /// Flight controller to host, `>`
    Incoming = b'>',
    /// The flight controller rejected the request, `!`
    Error = b'!',
}

impl Direction {
    /// Preamble followed by the direction byte.
    pub const fn header(self) -> [u8; 3] {
        [PREAMBLE[0], PREAMBLE[1], self as u8]
    }
}

/// XOR fold of `bytes`. Frames checksum the length, code and data bytes.
///
/// An XOR checksum misses any corruption that flips the same bit an even
/// number of times.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, byte| acc ^ byte)
}

/// Builds a request frame for `descriptor`.
///
/// Empty `data` produces a poll request (zero-length payload). Otherwise
/// `data` must hold one value per field of the layout, or a whole number of
/// repetitions of it for variable size commands.
pub fn encode_request(descriptor: &CommandDescriptor, data: &[i64]) -> Result<Vec<u8>, FrameError> {
    let layout = descriptor.layout;
    let fits = if descriptor.variable_size {
        !layout.is_empty() && data.len() % layout.len() == 0
    } else {
        data.len() == layout.len()
    };

    if !data.is_empty() && !fits {
        return Err(FrameError::PayloadMismatch {
            code: descriptor.code(),
            expected: layout.len(),
            actual: data.len(),
        });
    }

    let mut payload = Vec::with_capacity(data.len() * 4);
    for (index, (&value, field)) in data.iter().zip(layout.iter().cycle()).enumerate() {
        if !field.write(value, &mut payload) {
            return Err(FrameError::ValueOutOfRange {
                index,
                value,
                field: *field,
            });
        }
    }

    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLong { len: payload.len() });
    }

    let mut frame = Vec::with_capacity(payload.len() + crate::HEADER_LEN + 1);
    frame.extend_from_slice(&Direction::Outgoing.header());
    frame.push(payload.len() as u8);
    frame.push(descriptor.code());
    frame.extend_from_slice(&payload);
    frame.push(checksum(&frame[3..]));

    Ok(frame)
}

/// Validates a response frame to `descriptor` and decodes its payload into
/// one integer per field.
///
/// Bytes following the checksum are ignored.
pub fn decode_response(descriptor: &CommandDescriptor, raw: &[u8]) -> Result<Vec<i64>, FrameError> {
    let (header, rest) = raw.split_at(raw.len().min(3));
    if header == Direction::Error.header() {
        return Err(FrameError::DeviceError {
            code: descriptor.code(),
        });
    }
    if header != Direction::Incoming.header() {
        return Err(FrameError::InvalidHeader);
    }

    let [len, code, body @ ..] = rest else {
        return Err(FrameError::Truncated {
            expected: crate::HEADER_LEN + 1,
            actual: raw.len(),
        });
    };
    let (len, code) = (*len, *code);

    if code != descriptor.code() {
        return Err(FrameError::CodeMismatch {
            expected: descriptor.code(),
            actual: code,
        });
    }

    let Some((data, &[received, ..])) = body.split_at_checked(len as usize) else {
        return Err(FrameError::Truncated {
            expected: crate::HEADER_LEN + len as usize + 1,
            actual: raw.len(),
        });
    };

    let computed = checksum(&raw[3..crate::HEADER_LEN + len as usize]);
    if computed != received {
        return Err(FrameError::ChecksumMismatch {
            expected: received,
            actual: computed,
        });
    }

    let size = descriptor.size();
    let repeats = if descriptor.variable_size {
        if size == 0 || data.len() % size != 0 {
            return Err(FrameError::MalformedLength { len, size });
        }
        data.len() / size
    } else {
        if data.len() != size {
            return Err(FrameError::MalformedLength { len, size });
        }
        1
    };

    let mut values = Vec::with_capacity(repeats * descriptor.layout.len());
    let mut offset = 0;
    for _ in 0..repeats {
        for field in descriptor.layout {
            values.push(field.read(&data[offset..]));
            offset += field.width();
        }
    }

    Ok(values)
}

/// Enum of frame errors.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Snafu)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    #[snafu(display("Flight controller rejected command {code}"))]
    DeviceError { code: u8 },
    #[snafu(display("Frame does not start with a response header"))]
    InvalidHeader,
    #[snafu(display("Code mismatch: expected {expected}, got {actual}"))]
    CodeMismatch { expected: u8, actual: u8 },
    #[snafu(display("Xor checksum mismatch: expected {expected:#04x}, got {actual:#04x}"))]
    ChecksumMismatch { expected: u8, actual: u8 },
    #[snafu(display("Invalid length {len} for a layout of {size} bytes"))]
    MalformedLength { len: u8, size: usize },
    #[snafu(display("Truncated frame: expected {expected} bytes, got {actual}"))]
    Truncated { expected: usize, actual: usize },
    #[snafu(display("Command {code} takes {expected} values per repetition, got {actual}"))]
    PayloadMismatch { code: u8, expected: usize, actual: usize },
    #[snafu(display("Value {value} at index {index} does not fit in {field:?}"))]
    ValueOutOfRange { index: usize, value: i64, field: Field },
    #[snafu(display("Payload of {len} bytes exceeds {MAX_PAYLOAD_LEN}"))]
    PayloadTooLong { len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lookup, Command, CommandDescriptor, Field, STANDARD};

    /// Builds a response frame the way a flight controller would.
    fn response(code: u8, data: &[u8]) -> Vec<u8> {
        let mut frame = Direction::Incoming.header().to_vec();
        frame.push(data.len() as u8);
        frame.push(code);
        frame.extend_from_slice(data);
        frame.push(checksum(&frame[3..]));
        frame
    }

    /// Turns an outgoing frame into the matching incoming one.
    fn reflect(mut request: Vec<u8>) -> Vec<u8> {
        request[2] = Direction::Incoming.into();
        request
    }

    #[test]
    fn test_encode_rc_poll() {
        let rc = lookup(Command::Rc).unwrap();
        assert_eq!(
            encode_request(rc, &[]).unwrap(),
            [0x24, 0x4d, 0x3c, 0x00, 0x69, 0x69]
        );
    }

    #[test]
    fn test_encode_set_raw_rc() {
        let set_raw_rc = lookup(Command::SetRawRc).unwrap();
        let data = [1500, 1500, 1500, 1000, 1000, 1000, 1000, 1000];

        let frame = encode_request(set_raw_rc, &data).unwrap();

        assert_eq!(&frame[..5], &[b'$', b'M', b'<', 16, 200]);
        assert_eq!(&frame[5..7], &1500u16.to_le_bytes());
        assert_eq!(frame.len(), 5 + 16 + 1);
        assert_eq!(frame[21], checksum(&frame[3..21]));
    }

    #[test]
    fn test_encode_action_has_empty_payload() {
        let eeprom_write = lookup(Command::EepromWrite).unwrap();
        assert_eq!(
            encode_request(eeprom_write, &[]).unwrap(),
            [b'$', b'M', b'<', 0, 250, 250]
        );
    }

    #[test]
    fn test_encode_rejects_bad_data() {
        let attitude = lookup(Command::Attitude).unwrap();
        assert_eq!(
            encode_request(attitude, &[1, 2]),
            Err(FrameError::PayloadMismatch {
                code: 108,
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            encode_request(attitude, &[1, 40000, 3]),
            Err(FrameError::ValueOutOfRange {
                index: 1,
                value: 40000,
                field: Field::I16
            })
        );

        let set_boxes = lookup(Command::SetBoxes).unwrap();
        assert_eq!(
            encode_request(set_boxes, &[0; 128]),
            Err(FrameError::PayloadTooLong { len: 256 })
        );
    }

    #[test]
    fn test_encode_variable_size_repetitions() {
        let set_servo_conf = lookup(Command::SetServoConf).unwrap();
        let data = [1000, 2000, 1500, 100, 1020, 1980, 1510, 90];

        let frame = encode_request(set_servo_conf, &data).unwrap();
        assert_eq!(frame[3], 14);

        let frame = reflect(frame);
        let servo_conf = CommandDescriptor {
            command: Command::SetServoConf,
            ..*lookup(Command::ServoConf).unwrap()
        };
        assert_eq!(decode_response(&servo_conf, &frame).unwrap(), data);

        assert!(matches!(
            encode_request(set_servo_conf, &data[..5]),
            Err(FrameError::PayloadMismatch { .. })
        ));
    }

    #[test]
    fn test_fixed_layouts_decode_fabricated_frames() {
        for descriptor in STANDARD.iter().filter(|d| !d.variable_size) {
            // Walk each field through its extremes
            let data: Vec<i64> = descriptor
                .layout
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    let (min, max) = field.range();
                    if i % 2 == 0 {
                        max
                    } else {
                        min
                    }
                })
                .collect();

            let request = encode_request(descriptor, &data).unwrap();
            let decoded = decode_response(descriptor, &reflect(request)).unwrap();
            assert_eq!(decoded, data, "{:?}", descriptor.command);
        }
    }

    #[test]
    fn test_decode_altitude() {
        let altitude = lookup(Command::Altitude).unwrap();
        let frame = response(109, &[0x10, 0x00, 0x00, 0x00, 0xfe, 0xff]);
        assert_eq!(decode_response(altitude, &frame).unwrap(), [16, -2]);
    }

    #[test]
    fn test_decode_rejects_short_fixed_payload() {
        let altitude = lookup(Command::Altitude).unwrap();

        // Two data bytes against a six byte layout, valid checksum
        let frame = [0x24, 0x4d, 0x3e, 0x02, 0x6d, 0x01, 0x00, 0x6e];
        assert_eq!(
            decode_response(altitude, &frame),
            Err(FrameError::MalformedLength { len: 2, size: 6 })
        );

        // Same frame with a wrong checksum fails before the length check
        let frame = [0x24, 0x4d, 0x3e, 0x02, 0x6d, 0x01, 0x00, 0x6c];
        assert_eq!(
            decode_response(altitude, &frame),
            Err(FrameError::ChecksumMismatch {
                expected: 0x6c,
                actual: 0x6e
            })
        );
    }

    #[test]
    fn test_decode_single_byte_corruption() {
        let raw_imu = lookup(Command::RawImu).unwrap();
        let data: Vec<u8> = (1..=18).collect();
        let frame = response(102, &data);

        for i in 5..5 + data.len() {
            let mut corrupted = frame.clone();
            corrupted[i] ^= 0x01;
            assert!(
                matches!(
                    decode_response(raw_imu, &corrupted),
                    Err(FrameError::ChecksumMismatch { .. })
                ),
                "byte {i}"
            );
        }
    }

    #[test]
    fn test_decode_variable_size() {
        let box_names = lookup(Command::BoxNames).unwrap();
        let frame = response(116, b"ARM;ANGLE;");

        let decoded = decode_response(box_names, &frame).unwrap();
        let text: Vec<u8> = decoded.iter().map(|&c| c as u8).collect();
        assert_eq!(text, b"ARM;ANGLE;");

        let motor = lookup(Command::Motor).unwrap();
        let frame = response(104, &[0xe8, 0x03, 0xd0, 0x07]);
        assert_eq!(decode_response(motor, &frame).unwrap(), [1000, 2000]);

        let frame = response(104, &[]);
        assert_eq!(decode_response(motor, &frame).unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_decode_variable_size_remainder() {
        let names = CommandDescriptor::new(
            Command::BoxNames,
            &[Field::U32, Field::U32],
            true,
            None,
        );
        let frame = response(116, &[0x41; 14]);
        assert_eq!(
            decode_response(&names, &frame),
            Err(FrameError::MalformedLength { len: 14, size: 8 })
        );
    }

    #[test]
    fn test_decode_header_errors() {
        let rc = lookup(Command::Rc).unwrap();

        assert_eq!(
            decode_response(rc, b"$M!"),
            Err(FrameError::DeviceError { code: 105 })
        );
        assert_eq!(
            decode_response(rc, &[b'$', b'M', b'!', 0, 105, 105]),
            Err(FrameError::DeviceError { code: 105 })
        );
        assert_eq!(
            decode_response(rc, &[b'$', b'M', b'<', 0, 105, 105]),
            Err(FrameError::InvalidHeader)
        );
        assert_eq!(decode_response(rc, b"$"), Err(FrameError::InvalidHeader));
    }

    #[test]
    fn test_decode_code_mismatch() {
        let rc = lookup(Command::Rc).unwrap();
        let frame = response(108, &[0; 6]);
        assert_eq!(
            decode_response(rc, &frame),
            Err(FrameError::CodeMismatch {
                expected: 105,
                actual: 108
            })
        );
    }

    #[test]
    fn test_decode_truncated() {
        let attitude = lookup(Command::Attitude).unwrap();
        let frame = response(108, &[1, 0, 2, 0, 3, 0]);

        assert_eq!(
            decode_response(attitude, &frame[..frame.len() - 1]),
            Err(FrameError::Truncated {
                expected: 12,
                actual: 11
            })
        );
        assert!(matches!(
            decode_response(attitude, &frame[..4]),
            Err(FrameError::Truncated { .. })
        ));
    }
}
