use super::{Command, CommandDescriptor, Field, Priority};

use Field::{I16, I32, U16, U32, U8};
use Priority::{Critical, High, Low, Normal};

const fn fixed(command: Command, layout: &'static [Field], priority: Option<Priority>) -> CommandDescriptor {
    CommandDescriptor::new(command, layout, false, priority)
}

const fn repeated(command: Command, unit: &'static [Field], priority: Option<Priority>) -> CommandDescriptor {
    CommandDescriptor::new(command, unit, true, priority)
}

const IDENT: &[Field] = &[U8, U8, U8, U32];
const STATUS: &[Field] = &[U16, U16, U16, U32, U8];
const RAW_IMU: &[Field] = &[I16; 9];
const CHANNELS: &[Field] = &[U16; 8];
const RAW_GPS: &[Field] = &[U8, U8, I32, I32, U16, U16, U16];
const COMP_GPS: &[Field] = &[U16, I16, U8];
const ATTITUDE: &[Field] = &[I16, I16, I16];
const ALTITUDE: &[Field] = &[I32, I16];
const ANALOG: &[Field] = &[U8, U16, U16, U16];
const RC_TUNING: &[Field] = &[U8; 7];
// P, I and D for each of the ten controllers
const PID: &[Field] = &[U8; 30];
const MISC: &[Field] = &[U16, U16, U16, U16, U16, U16, U32, U16, U8, U8, U8, U8];
const WP: &[Field] = &[U8, I32, I32, I32, I16, U16, U8];
// min, max, middle, rate
const SERVO_CONF: &[Field] = &[U16, U16, U16, U8];
const SET_RAW_GPS: &[Field] = &[U8, U8, I32, I32, U16, U16];

/// The MSP v1 command table.
///
/// Get commands with a priority are refreshed by the scheduler. Set commands
/// carry a priority only to order explicit calls; the ones without a priority
/// cannot be invoked.
#[rustfmt::skip]
pub static STANDARD: &[CommandDescriptor] = &[
    fixed(Command::Ident, IDENT, None),
    fixed(Command::Status, STATUS, Some(Normal)),
    fixed(Command::RawImu, RAW_IMU, Some(High)),
    repeated(Command::Servo, &[U16], Some(Low)),
    repeated(Command::Motor, &[U16], Some(Normal)),
    fixed(Command::Rc, CHANNELS, Some(Critical)),
    fixed(Command::RawGps, RAW_GPS, Some(Normal)),
    fixed(Command::CompGps, COMP_GPS, Some(Low)),
    fixed(Command::Attitude, ATTITUDE, Some(High)),
    fixed(Command::Altitude, ALTITUDE, Some(High)),
    fixed(Command::Analog, ANALOG, Some(Normal)),
    fixed(Command::RcTuning, RC_TUNING, Some(Low)),
    fixed(Command::Pid, PID, Some(Low)),
    repeated(Command::Boxes, &[U16], Some(Low)),
    fixed(Command::Misc, MISC, Some(Low)),
    fixed(Command::MotorPins, &[U8; 8], None),
    // ';' separated ASCII names
    repeated(Command::BoxNames, &[U8], None),
    repeated(Command::PidNames, &[U8], None),
    fixed(Command::Wp, WP, None),
    repeated(Command::BoxIds, &[U8], None),
    repeated(Command::ServoConf, SERVO_CONF, None),

    fixed(Command::SetRawRc, CHANNELS, Some(Critical)),
    fixed(Command::SetRawGps, SET_RAW_GPS, Some(Normal)),
    fixed(Command::SetPid, PID, Some(Low)),
    repeated(Command::SetBoxes, &[U16], Some(Low)),
    fixed(Command::SetRcTuning, RC_TUNING, Some(Low)),
    fixed(Command::AccCalibration, &[], Some(Normal)),
    fixed(Command::MagCalibration, &[], Some(Normal)),
    fixed(Command::SetMisc, MISC, Some(Low)),
    fixed(Command::ResetConf, &[], Some(Low)),
    fixed(Command::SetWp, WP, Some(Normal)),
    fixed(Command::SelectSetting, &[U8], Some(Low)),
    fixed(Command::SetHead, &[I16], Some(High)),
    repeated(Command::SetServoConf, SERVO_CONF, Some(Low)),
    fixed(Command::SetMotor, CHANNELS, Some(High)),
    fixed(Command::Bind, &[], None),
    fixed(Command::EepromWrite, &[], Some(Low)),
];

#[cfg(test)]
mod tests {
    use super::STANDARD;
    use crate::Command;

    #[test]
    fn test_every_command_is_registered() {
        for code in 0..=u8::MAX {
            if let Ok(command) = Command::try_from(code) {
                assert!(STANDARD.iter().any(|d| d.command == command), "{command:?}");
            }
        }
    }

    #[test]
    fn test_payload_sizes() {
        let size = |command: Command| {
            STANDARD
                .iter()
                .find(|d| d.command == command)
                .map(|d| d.size())
                .unwrap()
        };

        assert_eq!(size(Command::Status), 11);
        assert_eq!(size(Command::RawImu), 18);
        assert_eq!(size(Command::RawGps), 16);
        assert_eq!(size(Command::Misc), 22);
        assert_eq!(size(Command::Wp), 18);
        assert_eq!(size(Command::ServoConf), 7);
        assert_eq!(size(Command::SetRawGps), 14);
    }
}
