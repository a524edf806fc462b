//! Trigger-and-wait pulse timing.
//!
//! A measurement goes idle -> triggering -> awaiting echo start -> awaiting
//! echo end. Every wait is either a fixed blocking delay or a busy poll
//! against an absolute deadline, so a ping always finishes.

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorKind, PinState},
};

use crate::{sound, Config, Error, Lines, Now};

/// Minimal delay in milliseconds between pings, from the sensor datasheet.
pub const INTERPING_DELAY_MS: u32 = 29;
/// Maximum microseconds for the sensor to start the echo pulse.
/// The slowest modules measured take just under 18 ms.
pub const MAX_SENSOR_DELAY_US: u32 = 18_000;
/// Low time before the trigger pulse.
pub const TRIGGER_SETTLE_US: u32 = 4;
/// Minimal trigger pulse width from the datasheet.
pub const TRIGGER_PULSE_US: u32 = 10;

const INTERPING_DELAY_US: u64 = INTERPING_DELAY_MS as u64 * 1_000;

/// Accepted echo pulse lengths in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EchoWindow {
    pub min_us: u32,
    pub max_us: u32,
}

impl EchoWindow {
    /// Round-trip times of the configured distance range at `pace` us/cm.
    pub fn new(config: &Config, pace: u32) -> Self {
        Self {
            min_us: sound::round_trip_for(config.distance_min(), pace),
            max_us: sound::round_trip_for(config.distance_max(), pace),
        }
    }
}

/// Drives the trigger line and times the echo pulse.
///
/// Not reentrant: it owns the lines and remembers when it last pinged.
pub struct PulseMeasurer<LINES, CLOCK, DELAY> {
    lines: LINES,
    clock: CLOCK,
    delay: DELAY,
    last_trigger: Option<u64>,
}

impl<LINES, CLOCK, DELAY> PulseMeasurer<LINES, CLOCK, DELAY>
where
    LINES: Lines,
    CLOCK: Now,
    DELAY: DelayNs,
{
    pub fn new(lines: LINES, clock: CLOCK, delay: DELAY) -> Self {
        Self {
            lines,
            clock,
            delay,
            last_trigger: None,
        }
    }

    /// Ping once and return the echo pulse length in microseconds.
    ///
    /// Pulses outside `window` are errors: longer ones are cut off at the
    /// deadline, shorter ones are rejected once they end.
    pub fn round_trip(&mut self, window: EchoWindow) -> Result<u32, Error> {
        self.settle();
        self.trigger()?;
        let start = self.await_echo_start()?;
        let end = self.await_echo_end(start, window.max_us)?;

        let elapsed = u32::try_from(end - start).unwrap_or(u32::MAX);
        if elapsed < window.min_us {
            debug!("echo pulse too short: {} us", elapsed);
            return Err(Error::TooShort(elapsed));
        }
        trace!("echo pulse {} us", elapsed);
        Ok(elapsed)
    }

    pub fn release(self) -> (LINES, CLOCK, DELAY) {
        (self.lines, self.clock, self.delay)
    }

    /// Give the sensor its recovery time since the previous trigger.
    /// The first ping waits the full delay.
    fn settle(&mut self) {
        let wait_us = match self.last_trigger {
            Some(at) => {
                let since = self.clock.now_micros().saturating_sub(at);
                INTERPING_DELAY_US.saturating_sub(since)
            }
            None => INTERPING_DELAY_US,
        };
        if wait_us > 0 {
            trace!("waiting {} us before ping", wait_us);
            // bounded by INTERPING_DELAY_US
            self.delay.delay_us(wait_us as u32);
        }
    }

    /// Send the trigger pulse and hand the line back to the sensor.
    fn trigger(&mut self) -> Result<(), Error> {
        self.lines.arm()?;
        let pulse = self.pulse();
        // the line goes back to input even when the pulse failed
        let listen = self.lines.listen();
        pulse?;
        listen?;
        self.last_trigger = Some(self.clock.now_micros());
        Ok(())
    }

    fn pulse(&mut self) -> Result<(), ErrorKind> {
        self.lines.set_trigger(PinState::Low)?;
        self.delay.delay_us(TRIGGER_SETTLE_US);
        self.lines.set_trigger(PinState::High)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.lines.set_trigger(PinState::Low)
    }

    /// Wait for the echo line to rise and return when it did.
    fn await_echo_start(&mut self) -> Result<u64, Error> {
        let deadline = self.clock.now_micros() + u64::from(MAX_SENSOR_DELAY_US);

        // an echo from the previous ping may still be high
        loop {
            let high = self.lines.echo_is_high()?;
            let now = self.clock.now_micros();
            if !high {
                break;
            }
            if now > deadline {
                debug!("echo line stuck high");
                return Err(Error::EchoStartTimeout);
            }
        }

        loop {
            let high = self.lines.echo_is_high()?;
            let now = self.clock.now_micros();
            if high {
                trace!("echo started");
                return Ok(now);
            }
            if now > deadline {
                debug!("timeout waiting for echo pulse to start");
                return Err(Error::EchoStartTimeout);
            }
        }
    }

    /// Wait for the echo line to fall and return when it did.
    fn await_echo_end(&mut self, start: u64, max_us: u32) -> Result<u64, Error> {
        let deadline = start + u64::from(max_us);
        loop {
            let high = self.lines.echo_is_high()?;
            let now = self.clock.now_micros();
            if !high {
                return Ok(now);
            }
            if now > deadline {
                debug!("timeout waiting for echo pulse to end");
                return Err(Error::EchoEndTimeout);
            }
        }
    }
}
