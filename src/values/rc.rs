use super::{fields, FromRaw};
use crate::{Command, Error};

/// The eight RC channels of `RC` and `SET_RAW_RC`, in microseconds.
///
/// Channel order is roll, pitch, yaw, throttle, then AUX1 to AUX4.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RcChannels(pub [u16; 8]);

impl RcChannels {
    pub const ROLL: usize = 0;
    pub const PITCH: usize = 1;
    pub const YAW: usize = 2;
    pub const THROTTLE: usize = 3;
    pub const AUX1: usize = 4;

    pub const VALUE_MIN: u16 = 1000;
    pub const VALUE_MID: u16 = 1500;
    pub const VALUE_MAX: u16 = 2000;

    /// Sticks centered, throttle and AUX channels low.
    pub const fn idle() -> Self {
        let mut channels = [Self::VALUE_MIN; 8];
        channels[Self::ROLL] = Self::VALUE_MID;
        channels[Self::PITCH] = Self::VALUE_MID;
        channels[Self::YAW] = Self::VALUE_MID;
        Self(channels)
    }

    /// Stick command that arms the motors: throttle low, yaw right.
    pub const fn armed() -> Self {
        let mut rc = Self::idle();
        rc.0[Self::YAW] = Self::VALUE_MAX;
        rc
    }

    /// Stick command that disarms the motors: throttle low, yaw left.
    pub const fn disarmed() -> Self {
        let mut rc = Self::idle();
        rc.0[Self::YAW] = Self::VALUE_MIN;
        rc
    }

    /// Values to pass to `execute` with `SET_RAW_RC`.
    pub fn to_raw(&self) -> Vec<i64> {
        self.0.iter().map(|&value| value.into()).collect()
    }
}

impl FromRaw for RcChannels {
    const COMMAND: Command = Command::Rc;

    fn from_raw(values: &[i64]) -> Result<Self, Error> {
        fields::<u16, 8>(values, "RcChannels").map(Self)
    }
}

impl core::ops::Deref for RcChannels {
    type Target = [u16; 8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl core::ops::DerefMut for RcChannels {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
