//! Round-trip time to distance.

use crate::{sound, Error};

/// Convert a round-trip time in microseconds into whole centimeters at
/// `celsius`, rounding half up.
///
/// The distance is the one-way path, so the time is halved first.
pub fn to_distance(round_trip_us: u32, celsius: i8) -> Result<u16, Error> {
    let pace = sound::pace(celsius)?;
    Ok(distance_at_pace(round_trip_us, pace))
}

/// Same as [`to_distance`] with an already computed pace.
pub fn distance_at_pace(round_trip_us: u32, pace: u32) -> u16 {
    let per_cm = 2 * u64::from(pace);
    let distance = (u64::from(round_trip_us) + u64::from(pace)) / per_cm;
    u16::try_from(distance).unwrap_or(u16::MAX)
}
