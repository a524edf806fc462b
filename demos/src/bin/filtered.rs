//! # Filtered Measurement
//! This example demonstrates how to take a series of measurements and reduce them to one value with a median
//! or an interquartile mean.
//! The median ignores single outliers entirely, the interquartile mean drops the lowest and highest quarter
//! and averages the rest, which gives a steadier value when the noise is spread out.
//!
//! ## Note
//!
//! Each measurement in a series waits for the sensor's 29ms recovery time, so a series of 8 takes at least
//! a quarter of a second. A narrower distance range shortens the worst case of every single measurement.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Delay, Duration, Instant, Timer};
use hcsr04_ranging::{Config, Filter, Hcsr04, Now};
use {defmt_rtt as _, panic_probe as _};

struct EmbassyClock;

impl Now for EmbassyClock {
    fn now_micros(&self) -> u64 {
        Instant::now().as_micros()
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("Running!");

    let trigger = Output::new(p.PIN_13, Level::Low);
    let echo = Input::new(p.PIN_28, Pull::None);

    // only objects between 5 and 150 cm are of interest, give up quickly on anything else
    let config = Config::new(150, 5).with_attempts_per_sample(3);
    let mut sensor = Hcsr04::new(trigger, echo, config, EmbassyClock, Delay);
    sensor.set_temperature(22);

    loop {
        for filter in [Filter::Median, Filter::InterquartileMean] {
            match sensor.measure_filtered(filter, filter.default_samples()) {
                Ok(distance) => {
                    info!("{}: {} cm", filter, distance);
                }
                Err(e) => {
                    info!("{}: {}", filter, e);
                }
            }
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}
