//! # Single Pin Measurement
//! This example demonstrates how to use a sensor whose trigger and echo share one wire, like the
//! three-pin ultrasonic modules or an HC-SR04 with both pins bridged through a resistor.
//! The pin is switched to output for the trigger pulse and back to input to listen for the echo.

#![no_std]
#![no_main]

use core::convert::Infallible;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Flex, Pull};
use embassy_time::{Delay, Duration, Instant, Timer};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use hcsr04_ranging::{Config, Direction, Hcsr04, Now, SetDirection};
use {defmt_rtt as _, panic_probe as _};

struct EmbassyClock;

impl Now for EmbassyClock {
    fn now_micros(&self) -> u64 {
        Instant::now().as_micros()
    }
}

/// A flexible pin the driver can turn around.
struct SonarPin<'d>(Flex<'d>);

impl ErrorType for SonarPin<'_> {
    type Error = Infallible;
}

impl SetDirection for SonarPin<'_> {
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        match direction {
            Direction::Input => self.0.set_as_input(),
            Direction::Output => self.0.set_as_output(),
        }
        Ok(())
    }
}

impl OutputPin for SonarPin<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low();
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high();
        Ok(())
    }
}

impl InputPin for SonarPin<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_high())
    }
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_low())
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("Running!");

    let mut pin = Flex::new(p.PIN_13);
    pin.set_pull(Pull::None);
    pin.set_as_input();

    let mut sensor = Hcsr04::new_shared(SonarPin(pin), Config::default(), EmbassyClock, Delay);

    loop {
        match sensor.measure_median(5) {
            Ok(distance) => {
                info!("Distance: {} cm", distance);
            }
            Err(e) => {
                info!("Error: {}", e);
            }
        }
        Timer::after(Duration::from_secs(1)).await;
    }
}
