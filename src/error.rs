use crate::{Command, FrameError};
use snafu::Snafu;

/// Enum of client errors.
#[non_exhaustive]
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unknown command code {code}, see Command enum"))]
    UnknownCommand { code: u8 },
    #[snafu(display("Command {command:?} has no priority and cannot be invoked"))]
    NotInvokable { command: Command },
    #[snafu(display("Command {command:?} does not request data and cannot be polled"))]
    NotPollable { command: Command },
    #[snafu(display("Invalid frame: {source}"))]
    Frame { source: FrameError },
    #[snafu(display("Transport failure: {source}"))]
    TransportIo { source: std::io::Error },
    #[snafu(display("Cannot spawn the scheduler thread: {source}"))]
    Spawn { source: std::io::Error },
    #[snafu(display("Transport was lost to a failed thread spawn"))]
    TransportLost,
    #[snafu(display("Cannot build {record} from {len} raw values"))]
    Decode { record: &'static str, len: usize },
}

impl From<FrameError> for Error {
    fn from(source: FrameError) -> Self {
        Error::Frame { source }
    }
}
