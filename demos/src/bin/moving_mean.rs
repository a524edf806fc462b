//! # Simple Measurement with Moving Mean
//! This example demonstrates how to smooth measurements of a slowly changing distance, like the water level
//! in a tank, with the sensor's moving mean.
//! Every new measurement is averaged with the previous mean, so a sudden change only shows after a few
//! measurements. Do not use this for a sensor mounted on a moving platform.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Delay, Duration, Instant, Timer};
use hcsr04_ranging::{Config, Hcsr04, Now};
use {defmt_rtt as _, panic_probe as _};

struct EmbassyClock;

impl Now for EmbassyClock {
    fn now_micros(&self) -> u64 {
        Instant::now().as_micros()
    }
}

/// Depth of the tank in centimeters, measured from the sensor.
const TANK_DEPTH: u16 = 120;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("Running!");

    let trigger = Output::new(p.PIN_13, Level::Low);
    let echo = Input::new(p.PIN_28, Pull::None);

    let config = Config::with_distance_max(TANK_DEPTH);
    let mut sensor = Hcsr04::new(trigger, echo, config, EmbassyClock, Delay);

    loop {
        match sensor.measure_moving_mean() {
            Ok(distance) => {
                info!("Water level: {} cm", TANK_DEPTH - distance);
            }
            Err(e) => {
                info!("Measurement error: {}", e);
            }
        }
        Timer::after(Duration::from_secs(10)).await;
    }
}
