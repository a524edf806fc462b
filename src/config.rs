use crate::Error;

/// Minimal distance the sensor hardware can resolve, in centimeters.
pub const DISTANCE_MIN: u16 = 2;
/// Maximal distance the sensor hardware can resolve, in centimeters.
pub const DISTANCE_MAX: u16 = 500;
/// Upper bound of the accepted range when none is given.
pub const DEFAULT_DISTANCE_MAX: u16 = 400;
/// Ambient temperature assumed until one is set, in degrees Celsius.
pub const DEFAULT_TEMPERATURE: i8 = 20;
/// Sampler calls allowed per requested sample before a filter gives up.
pub const DEFAULT_ATTEMPTS_PER_SAMPLE: u8 = 4;

/// The configuration for the sensor.
///
/// Out-of-range distances are clamped, never rejected: both bounds into
/// `[DISTANCE_MIN, DISTANCE_MAX]`, then a minimum above the maximum is
/// lowered to it, so `distance_min <= distance_max` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    distance_min: u16,
    distance_max: u16,
    attempts_per_sample: u8,
}

impl Config {
    /// Accepted range of `distance_min ..= distance_max` centimeters.
    ///
    /// The maximum wins when the two overlap: `new(30, 50)` accepts exactly
    /// 30 cm.
    pub fn new(distance_max: u16, distance_min: u16) -> Self {
        let distance_max = distance_max.clamp(DISTANCE_MIN, DISTANCE_MAX);
        let distance_min = distance_min.clamp(DISTANCE_MIN, DISTANCE_MAX).min(distance_max);
        Self {
            distance_min,
            distance_max,
            attempts_per_sample: DEFAULT_ATTEMPTS_PER_SAMPLE,
        }
    }

    /// Accepted range of `DISTANCE_MIN ..= distance_max` centimeters.
    pub fn with_distance_max(distance_max: u16) -> Self {
        Self::new(distance_max, DISTANCE_MIN)
    }

    /// How many sampler calls a filter may spend per requested sample.
    /// Zero is raised to one.
    pub fn with_attempts_per_sample(mut self, attempts: u8) -> Self {
        self.attempts_per_sample = attempts.max(1);
        self
    }

    pub fn distance_min(&self) -> u16 {
        self.distance_min
    }

    pub fn distance_max(&self) -> u16 {
        self.distance_max
    }

    pub fn attempts_per_sample(&self) -> u8 {
        self.attempts_per_sample
    }

    /// Pass a converted distance through only if it lies in the accepted range.
    pub fn check(&self, distance: u16) -> Result<u16, Error> {
        if (self.distance_min..=self.distance_max).contains(&distance) {
            Ok(distance)
        } else {
            Err(Error::OutOfRange(distance))
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DISTANCE_MAX, DISTANCE_MIN)
    }
}
