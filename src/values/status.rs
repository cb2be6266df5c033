use {
    super::{fields, narrow, FromRaw},
    crate::{Command, Error},
    bitfields::bitfield,
};

/// Sensors detected by the flight controller
#[bitfield(u16)]
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sensors {
    pub acc: bool,
    pub baro: bool,
    pub mag: bool,
    pub gps: bool,
    pub sonar: bool,
    #[bits(11)]
    _reserved: u16,
}

/// `STATUS` payload
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Status {
    /// Main loop duration in microseconds
    pub cycle_time: u16,
    pub i2c_errors: u16,
    pub sensors: Sensors,
    /// One bit per active flight mode, in `BOXNAMES` order
    pub flags: u32,
    pub current_setting: u8,
}

impl Status {
    /// Returns `true` if flight mode `index` is active.
    pub fn mode_active(&self, index: usize) -> bool {
        index < 32 && self.flags & (1 << index) != 0
    }
}

impl FromRaw for Status {
    const COMMAND: Command = Command::Status;

    fn from_raw(values: &[i64]) -> Result<Self, Error> {
        let [cycle_time, i2c_errors, sensors, flags, current_setting] =
            fields::<i64, 5>(values, "Status")?;

        Ok(Self {
            cycle_time: narrow(cycle_time, "Status", 5)?,
            i2c_errors: narrow(i2c_errors, "Status", 5)?,
            sensors: Sensors::from_bits(narrow(sensors, "Status", 5)?),
            flags: narrow(flags, "Status", 5)?,
            current_setting: narrow(current_setting, "Status", 5)?,
        })
    }
}
