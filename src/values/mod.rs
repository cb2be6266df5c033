//! Named records built from the raw tuples published in the
//! [`DataStore`](crate::DataStore).
//!
//! Records apply unit scaling and split bit masks; the engine itself only
//! deals in integers.

use crate::{Command, DecodeSnafu, Error};

mod rc;
pub use rc::*;

mod status;
pub use status::*;

/// Conversion from the raw values of one command.
pub trait FromRaw: Sized {
    /// Command whose payload this record describes.
    const COMMAND: Command;

    fn from_raw(values: &[i64]) -> Result<Self, Error>;
}

/// Narrows one raw value of `record` to `T`.
pub(crate) fn narrow<T: TryFrom<i64>>(value: i64, record: &'static str, len: usize) -> Result<T, Error> {
    T::try_from(value).map_err(|_| DecodeSnafu { record, len }.build())
}

/// Checks that `values` holds exactly `N` values and narrows each one to `T`.
pub(crate) fn fields<T, const N: usize>(values: &[i64], record: &'static str) -> Result<[T; N], Error>
where
    T: TryFrom<i64> + Copy + Default,
{
    if values.len() != N {
        return DecodeSnafu { record, len: values.len() }.fail();
    }

    let mut out = [T::default(); N];
    for (slot, &value) in out.iter_mut().zip(values) {
        *slot = narrow(value, record, N)?;
    }
    Ok(out)
}

/// `IDENT` payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ident {
    pub version: u8,
    /// Airframe type, e.g. 3 for a quad in X configuration
    pub multitype: u8,
    pub msp_version: u8,
    pub capability: u32,
}

impl FromRaw for Ident {
    const COMMAND: Command = Command::Ident;

    fn from_raw(values: &[i64]) -> Result<Self, Error> {
        let [version, multitype, msp_version, capability] = fields::<i64, 4>(values, "Ident")?;
        Ok(Self {
            version: narrow(version, "Ident", 4)?,
            multitype: narrow(multitype, "Ident", 4)?,
            msp_version: narrow(msp_version, "Ident", 4)?,
            capability: narrow(capability, "Ident", 4)?,
        })
    }
}

/// `ATTITUDE` payload, angles in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attitude {
    pub roll: f32,
    pub pitch: f32,
    /// Compass heading, -180 to 180
    pub heading: i16,
}

impl FromRaw for Attitude {
    const COMMAND: Command = Command::Attitude;

    fn from_raw(values: &[i64]) -> Result<Self, Error> {
        let [roll, pitch, heading] = fields::<i16, 3>(values, "Attitude")?;
        Ok(Self {
            // Tenths of a degree on the wire
            roll: roll as f32 / 10.0,
            pitch: pitch as f32 / 10.0,
            heading,
        })
    }
}

/// `ALTITUDE` payload
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Altitude {
    /// Estimated altitude in meters
    pub altitude: f32,
    /// Vertical speed in cm/s
    pub vario: i16,
}

impl FromRaw for Altitude {
    const COMMAND: Command = Command::Altitude;

    fn from_raw(values: &[i64]) -> Result<Self, Error> {
        let [altitude, vario] = fields::<i32, 2>(values, "Altitude")?;
        Ok(Self {
            altitude: altitude as f32 / 100.0,
            vario: narrow(vario.into(), "Altitude", 2)?,
        })
    }
}

/// `ANALOG` payload
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Analog {
    /// Battery voltage in volts
    pub vbat: f32,
    /// Consumed charge in mAh
    pub power_meter_sum: u16,
    pub rssi: u16,
    pub amperage: u16,
}

impl FromRaw for Analog {
    const COMMAND: Command = Command::Analog;

    fn from_raw(values: &[i64]) -> Result<Self, Error> {
        let [vbat, power_meter_sum, rssi, amperage] = fields::<u16, 4>(values, "Analog")?;
        Ok(Self {
            vbat: vbat as f32 / 10.0,
            power_meter_sum,
            rssi,
            amperage,
        })
    }
}

/// `RAW_IMU` payload, in sensor units
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawImu {
    pub acc: [i16; 3],
    pub gyro: [i16; 3],
    pub mag: [i16; 3],
}

impl FromRaw for RawImu {
    const COMMAND: Command = Command::RawImu;

    fn from_raw(values: &[i64]) -> Result<Self, Error> {
        let v = fields::<i16, 9>(values, "RawImu")?;
        Ok(Self {
            acc: [v[0], v[1], v[2]],
            gyro: [v[3], v[4], v[5]],
            mag: [v[6], v[7], v[8]],
        })
    }
}

/// Splits a `;` separated name list (`BOXNAMES`, `PIDNAMES`).
fn names(values: &[i64], record: &'static str) -> Result<Vec<String>, Error> {
    let bytes = values
        .iter()
        .map(|&c| u8::try_from(c))
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| DecodeSnafu { record, len: values.len() }.build())?;

    Ok(bytes
        .split(|&c| c == b';')
        .filter(|name| !name.is_empty())
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect())
}

/// `BOXNAMES` payload: flight mode names, in box order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxNames(pub Vec<String>);

impl FromRaw for BoxNames {
    const COMMAND: Command = Command::BoxNames;

    fn from_raw(values: &[i64]) -> Result<Self, Error> {
        names(values, "BoxNames").map(Self)
    }
}

/// `PIDNAMES` payload: controller names, in PID order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PidNames(pub Vec<String>);

impl FromRaw for PidNames {
    const COMMAND: Command = Command::PidNames;

    fn from_raw(values: &[i64]) -> Result<Self, Error> {
        names(values, "PidNames").map(Self)
    }
}
