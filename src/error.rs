use embedded_hal::digital::ErrorKind;
use thiserror::Error;

/// Everything that can go wrong while taking a reading.
///
/// There is no magic "zero means nothing" value: a reading is either a
/// distance or one of these.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The echo line never went high within the sensor's response window.
    #[error("timeout waiting for echo pulse to start")]
    EchoStartTimeout,

    /// The echo line stayed high past the time implied by the maximal distance.
    #[error("timeout waiting for echo pulse to end")]
    EchoEndTimeout,

    /// The echo pulse was shorter than the time implied by the minimal distance.
    #[error("echo pulse too short: {0} us")]
    TooShort(u32),

    /// A converted distance fell outside the configured range.
    #[error("distance out of range: {0} cm")]
    OutOfRange(u16),

    /// The temperature yields no usable sound pace.
    #[error("no usable sound pace at this temperature")]
    DegeneratePace,

    /// A filtered reading was requested with zero samples.
    #[error("zero samples requested")]
    NoSamples,

    /// The sampler kept failing until the attempt budget ran out.
    #[error("only {collected} of {required} valid samples collected")]
    InsufficientSamples { collected: u16, required: u16 },

    /// Reading or driving a line failed.
    #[error("pin error: {0}")]
    Pin(ErrorKind),
}

impl Error {
    /// True for the outcomes reported as "no reading": a failed measurement or
    /// an empty request, as opposed to hardware failures or an exhausted
    /// attempt budget.
    pub fn is_no_reading(&self) -> bool {
        matches!(
            self,
            Error::EchoStartTimeout
                | Error::EchoEndTimeout
                | Error::TooShort(_)
                | Error::OutOfRange(_)
                | Error::DegeneratePace
                | Error::NoSamples
        )
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::Pin(kind)
    }
}
