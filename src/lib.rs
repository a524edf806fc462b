//! # hcsr04-ranging
//!
//! This crate provides a blocking driver for the HC-SR04 ultrasonic distance sensor and its
//! trigger/echo relatives.
//!
//! Distances are whole centimeters, temperatures whole degrees Celsius. The speed of sound is
//! corrected for the ambient temperature stored in the driver, and readings can be smoothed with
//! a median, an interquartile mean or a moving mean.
//!
//! Timing is done by busy-polling the echo line against deadlines derived from the accepted
//! distance range, so a narrower range means a shorter worst-case blocking time per reading.
//! Nothing waits forever: every poll has a deadline and every filter has an attempt budget.
//!
//! A driver instance owns its pins and is not meant to be shared between tasks; all operations
//! take `&mut self`.
//!
//! ## Features
//!
//! - `defmt`: log ping phases and failures through `defmt`, and derive `defmt::Format` on the
//!   public types.
//!
//! # Example
//!
//! ```rust, ignore
//! #![no_std]
//! #![no_main]
//!
//! use defmt::*;
//! use embassy_executor::Spawner;
//! use embassy_rp::gpio::{Input, Level, Output, Pull};
//! use embassy_time::{Delay, Duration, Instant, Timer};
//! use hcsr04_ranging::{Config, Filter, Hcsr04, Now};
//! use {defmt_rtt as _, panic_probe as _};
//!
//! #[embassy_executor::main]
//! async fn main(_spawner: Spawner) {
//!     let p = embassy_rp::init(Default::default());
//!
//!     let trigger = Output::new(p.PIN_13, Level::Low);
//!     let echo = Input::new(p.PIN_28, Pull::None);
//!
//!     // Create clock function that returns microseconds
//!     struct EmbassyClock;
//!
//!     impl Now for EmbassyClock {
//!         fn now_micros(&self) -> u64 {
//!             Instant::now().as_micros()
//!         }
//!     }
//!
//!     // accept 2 to 200 cm
//!     let config = Config::with_distance_max(200);
//!     let mut sensor = Hcsr04::new(trigger, echo, config, EmbassyClock, Delay);
//!     sensor.set_temperature(24);
//!
//!     loop {
//!         match sensor.measure_filtered(Filter::Median, 5) {
//!             Ok(distance) => info!("Distance: {} cm", distance),
//!             Err(e) => info!("Error: {:?}", e),
//!         }
//!         Timer::after(Duration::from_secs(1)).await;
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]

// must come first so the logging macros are visible in the other modules
mod fmt;

mod config;
pub mod convert;
mod error;
pub mod filter;
mod lines;
pub mod ping;
#[cfg(test)]
mod sim;
pub mod sound;

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

pub use config::{
    Config, DEFAULT_ATTEMPTS_PER_SAMPLE, DEFAULT_DISTANCE_MAX, DEFAULT_TEMPERATURE, DISTANCE_MAX,
    DISTANCE_MIN,
};
pub use error::Error;
pub use filter::{Filter, MovingMean, Sampler};
pub use lines::{Direction, Lines, SeparatePins, SetDirection, SharedPin};
pub use ping::{EchoWindow, PulseMeasurer};

pub trait Now {
    // The time elapsed since startup in microseconds
    fn now_micros(&self) -> u64;
}

/// The HC-SR04 ultrasonic distance sensor driver.
///
/// # Note
///
/// Every reading blocks for at least the 29 ms the sensor needs between pings, plus up to
/// 18 ms for the echo to start and the round-trip time of `distance_max` for it to end.
pub struct Hcsr04<LINES, CLOCK, DELAY> {
    measurer: PulseMeasurer<LINES, CLOCK, DELAY>,
    config: Config,
    temperature: i8,
    moving_mean: MovingMean,
}

impl<TRIGPIN, ECHOPIN, CLOCK, DELAY> Hcsr04<SeparatePins<TRIGPIN, ECHOPIN>, CLOCK, DELAY>
where
    TRIGPIN: OutputPin,
    ECHOPIN: InputPin,
    CLOCK: Now,
    DELAY: DelayNs,
{
    /// Initialize a new sensor.
    /// Requires trigger pin and an echo pin, measurements are taken on the echo pin.
    /// Requires a config with the accepted distance range.
    /// Requires a clock that will provide the time in microseconds via the `Now` trait.
    /// Requires a delay that implements DelayNs.
    pub fn new(trigger: TRIGPIN, echo: ECHOPIN, config: Config, clock: CLOCK, delay: DELAY) -> Self {
        Self::with_lines(SeparatePins::new(trigger, echo), config, clock, delay)
    }
}

impl<PIN, CLOCK, DELAY> Hcsr04<SharedPin<PIN>, CLOCK, DELAY>
where
    PIN: InputPin + OutputPin + SetDirection,
    CLOCK: Now,
    DELAY: DelayNs,
{
    /// Initialize a sensor whose trigger and echo share one pin.
    /// The pin is switched to output for the trigger pulse and back to input for the echo.
    pub fn new_shared(pin: PIN, config: Config, clock: CLOCK, delay: DELAY) -> Self {
        Self::with_lines(SharedPin::new(pin), config, clock, delay)
    }
}

impl<LINES, CLOCK, DELAY> Hcsr04<LINES, CLOCK, DELAY>
where
    LINES: Lines,
    CLOCK: Now,
    DELAY: DelayNs,
{
    /// Initialize a sensor on any pair of lines implementing `Lines`.
    pub fn with_lines(lines: LINES, config: Config, clock: CLOCK, delay: DELAY) -> Self {
        Self {
            measurer: PulseMeasurer::new(lines, clock, delay),
            config,
            temperature: DEFAULT_TEMPERATURE,
            moving_mean: MovingMean::new(),
        }
    }

    /// Store the ambient temperature in degrees Celsius. It is used from the next reading on.
    pub fn set_temperature(&mut self, celsius: i8) {
        self.temperature = celsius;
    }

    /// The ambient temperature in degrees Celsius used for readings.
    pub fn temperature(&self) -> i8 {
        self.temperature
    }

    /// Smallest accepted distance in centimeters.
    pub fn distance_min(&self) -> u16 {
        self.config.distance_min()
    }

    /// Largest accepted distance in centimeters.
    pub fn distance_max(&self) -> u16 {
        self.config.distance_max()
    }

    /// The configuration the sensor was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ping once and return the echo round-trip time in microseconds.
    pub fn ping(&mut self) -> Result<u32, Error> {
        let pace = sound::pace(self.temperature)?;
        self.measurer
            .round_trip(EchoWindow::new(&self.config, pace))
    }

    /// Measure the distance to the reflector in centimeters.
    pub fn measure(&mut self) -> Result<u16, Error> {
        let round_trip = self.ping()?;
        let distance = convert::to_distance(round_trip, self.temperature)?;
        self.config.check(distance).inspect_err(|_| {
            debug!("distance {} cm outside accepted range", distance);
        })
    }

    /// Measure a series of distances and reduce it with `filter`.
    ///
    /// `samples` is rounded up to what the filter needs; zero samples is an error without any
    /// ping. Failed readings are retried up to the configured attempts per sample.
    pub fn measure_filtered(&mut self, filter: Filter, samples: u8) -> Result<u16, Error> {
        let attempts = self.config.attempts_per_sample();
        filter.apply(&mut || self.measure(), samples, attempts)
    }

    /// Median of `samples` distances, rounded up to an odd count.
    pub fn measure_median(&mut self, samples: u8) -> Result<u16, Error> {
        self.measure_filtered(Filter::Median, samples)
    }

    /// Interquartile mean of `samples` distances, rounded up to a multiple of four.
    pub fn measure_interquartile_mean(&mut self, samples: u8) -> Result<u16, Error> {
        self.measure_filtered(Filter::InterquartileMean, samples)
    }

    /// Fold the next valid distance into this sensor's moving mean.
    ///
    /// Failed readings are retried up to the configured attempts per sample.
    /// If none succeeds the mean is left as it was.
    pub fn measure_moving_mean(&mut self) -> Result<u16, Error> {
        let attempts = self.config.attempts_per_sample();
        let distance = filter::first_valid(&mut || self.measure(), attempts)?;
        Ok(self.moving_mean.update(distance))
    }

    /// The current moving mean, `None` before the first valid reading.
    pub fn moving_mean(&self) -> Option<u16> {
        self.moving_mean.value()
    }

    /// Forget the moving mean; the next reading starts it afresh.
    pub fn reset_moving_mean(&mut self) {
        self.moving_mean.reset();
    }

    /// Give back the lines, clock and delay.
    pub fn release(self) -> (LINES, CLOCK, DELAY) {
        self.measurer.release()
    }
}
