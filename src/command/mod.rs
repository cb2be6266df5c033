use crate::{Error, UnknownCommandSnafu};
use num_enum::{IntoPrimitive, TryFromPrimitive};

mod field;
pub use field::*;

mod table;
pub use table::STANDARD;

/// Represents all MSP v1 command codes known to the registry.
///
/// Codes below 200 request data from the flight controller, codes from 200
/// upwards set data or trigger an action.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    Ident = 100,
    Status = 101,
    RawImu = 102,
    Servo = 103,
    Motor = 104,
    Rc = 105,
    RawGps = 106,
    CompGps = 107,
    Attitude = 108,
    Altitude = 109,
    Analog = 110,
    RcTuning = 111,
    Pid = 112,
    Boxes = 113,
    Misc = 114,
    MotorPins = 115,
    BoxNames = 116,
    PidNames = 117,
    Wp = 118,
    BoxIds = 119,
    ServoConf = 120,
    SetRawRc = 200,
    SetRawGps = 201,
    SetPid = 202,
    SetBoxes = 203,
    SetRcTuning = 204,
    AccCalibration = 205,
    MagCalibration = 206,
    SetMisc = 207,
    ResetConf = 208,
    SetWp = 209,
    SelectSetting = 210,
    SetHead = 211,
    SetServoConf = 212,
    SetMotor = 214,
    Bind = 240,
    EepromWrite = 250,
}

impl Command {
    /// First code of the set/action range.
    pub const FIRST_SET_CODE: u8 = 200;

    /// Returns `true` for commands that request data from the flight controller.
    pub fn is_get(self) -> bool {
        u8::from(self) < Self::FIRST_SET_CODE
    }
}

/// Auto-poll priority. Lower variants are served first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Priority {
    Critical,
    High,
    Normal,
    Low,
}

impl Priority {
    /// All priorities, most urgent first.
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Normal,
        Priority::Low,
    ];
}

/// Static description of one command's wire shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub command: Command,
    /// Field layout of the payload. For variable size commands this is the
    /// layout of one repetition.
    pub layout: &'static [Field],
    /// Whether the number of repetitions of `layout` is only known from the
    /// length announced by the frame.
    pub variable_size: bool,
    /// `None` means the command is never polled nor individually invokable.
    pub priority: Option<Priority>,
}

impl CommandDescriptor {
    pub const fn new(
        command: Command,
        layout: &'static [Field],
        variable_size: bool,
        priority: Option<Priority>,
    ) -> Self {
        Self {
            command,
            layout,
            variable_size,
            priority,
        }
    }

    /// Code byte of the command.
    pub fn code(&self) -> u8 {
        self.command.into()
    }

    /// Payload size of a fixed command, or the size of one repetition of a
    /// variable size command.
    pub const fn size(&self) -> usize {
        layout_size(self.layout)
    }

    /// Returns `true` if the scheduler refreshes this command on its own.
    pub fn is_pollable(&self) -> bool {
        self.priority.is_some() && self.command.is_get()
    }
}

/// A fixed table of command descriptors.
#[derive(Clone, Copy, Debug)]
pub struct Registry {
    descriptors: &'static [CommandDescriptor],
}

impl Registry {
    /// Creates a registry over `descriptors`. Codes must be unique.
    pub const fn new(descriptors: &'static [CommandDescriptor]) -> Self {
        Self { descriptors }
    }

    /// The MSP v1 command table.
    pub const fn standard() -> Self {
        Self::new(STANDARD)
    }

    /// Finds the descriptor registered for `code`.
    pub fn lookup(&self, code: impl Into<u8>) -> Result<&'static CommandDescriptor, Error> {
        let code = code.into();
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.code() == code)
            .ok_or_else(|| UnknownCommandSnafu { code }.build())
    }

    /// Returns all descriptors of the registry in declaration order.
    pub fn iter(&self) -> core::slice::Iter<'static, CommandDescriptor> {
        self.descriptors.iter()
    }

    /// Returns every pollable descriptor, most urgent priority first and in
    /// declaration order within one priority. Calling it again restarts the
    /// sequence from the top.
    pub fn all_pollable(&self) -> impl Iterator<Item = &'static CommandDescriptor> + Clone {
        let descriptors = self.descriptors;
        Priority::ALL.into_iter().flat_map(move |priority| {
            descriptors
                .iter()
                .filter(move |d| d.priority == Some(priority) && d.is_pollable())
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Finds the descriptor for `code` in the standard table.
pub fn lookup(code: impl Into<u8>) -> Result<&'static CommandDescriptor, Error> {
    Registry::standard().lookup(code)
}

/// Pollable descriptors of the standard table, see [`Registry::all_pollable`].
pub fn all_pollable() -> impl Iterator<Item = &'static CommandDescriptor> + Clone {
    Registry::standard().all_pollable()
}
