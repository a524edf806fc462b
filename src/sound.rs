//! Temperature compensation.
//!
//! The only place that turns an ambient temperature into the time sound needs
//! per centimeter. Everything timing or distance related goes through [`pace`].

use libm::round;

use crate::Error;

/// Calculate the speed of sound in meters per second, adjusted for temperature.
pub fn speed_of_sound(celsius: i8) -> f64 {
    331.3 + 0.606 * f64::from(celsius)
}

/// Microseconds the sound needs to travel one centimeter at `celsius`.
///
/// Rounded to whole microseconds so deadlines stay in integer time. Within
/// -15 to +40 degC this is 31 down to 28 us/cm.
pub fn pace(celsius: i8) -> Result<u32, Error> {
    let speed = speed_of_sound(celsius);
    if !(speed.is_finite() && speed > 0.0) {
        return Err(Error::DegeneratePace);
    }
    // 1 cm at `speed` m/s takes 10_000 / speed microseconds
    let pace = round(10_000.0 / speed);
    if !(1.0..=f64::from(u32::MAX)).contains(&pace) {
        return Err(Error::DegeneratePace);
    }
    Ok(pace as u32)
}

/// Round-trip time in microseconds for a reflector `distance` centimeters away.
pub fn round_trip_for(distance: u16, pace: u32) -> u32 {
    2 * u32::from(distance) * pace
}
