//! Statistical smoothing of repeated readings.
//!
//! [`median`] and [`interquartile_mean`] pull a fresh series from a
//! [`Sampler`] on every call; [`MovingMean`] folds one reading at a time into a
//! value it keeps between calls.
//!
//! Failed samples are skipped and not counted, but the number of sampler calls
//! is bounded: a sensor that keeps failing yields
//! [`Error::InsufficientSamples`] instead of blocking forever.

use heapless::Vec;

use crate::Error;

/// Largest series a filter collects: 255 requested samples rounded up to a
/// multiple of four.
pub const SAMPLES_CAPACITY: usize = 256;

/// Source of single readings.
pub trait Sampler {
    fn sample(&mut self) -> Result<u16, Error>;
}

impl<F> Sampler for F
where
    F: FnMut() -> Result<u16, Error>,
{
    fn sample(&mut self) -> Result<u16, Error> {
        self()
    }
}

/// The filters that reduce a whole series to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Filter {
    Median,
    InterquartileMean,
}

impl Filter {
    /// Series size used when the caller has no preference.
    pub fn default_samples(self) -> u8 {
        match self {
            Filter::Median => 5,
            Filter::InterquartileMean => 8,
        }
    }

    /// Series size actually collected for a request of `samples`.
    ///
    /// A median needs an odd count, an interquartile mean a multiple of four.
    pub fn normalize(self, samples: u8) -> u16 {
        let samples = u16::from(samples);
        match self {
            Filter::Median => samples | 1,
            Filter::InterquartileMean => samples.div_ceil(4) * 4,
        }
    }

    /// Collect and reduce a series of `samples` readings.
    pub fn apply<S: Sampler>(
        self,
        sampler: &mut S,
        samples: u8,
        attempts_per_sample: u8,
    ) -> Result<u16, Error> {
        match self {
            Filter::Median => median(sampler, samples, attempts_per_sample),
            Filter::InterquartileMean => interquartile_mean(sampler, samples, attempts_per_sample),
        }
    }
}

/// Median of `samples` readings, rounded up to an odd count.
pub fn median<S: Sampler>(
    sampler: &mut S,
    samples: u8,
    attempts_per_sample: u8,
) -> Result<u16, Error> {
    if samples == 0 {
        return Err(Error::NoSamples);
    }
    let series = collect(sampler, Filter::Median.normalize(samples), attempts_per_sample)?;
    Ok(series[series.len() / 2])
}

/// Arithmetic mean of the inner half of `samples` readings, rounded up to a
/// multiple of four. The lowest and highest quarters are dropped.
pub fn interquartile_mean<S: Sampler>(
    sampler: &mut S,
    samples: u8,
    attempts_per_sample: u8,
) -> Result<u16, Error> {
    if samples == 0 {
        return Err(Error::NoSamples);
    }
    let series = collect(
        sampler,
        Filter::InterquartileMean.normalize(samples),
        attempts_per_sample,
    )?;
    let quarter = series.len() / 4;
    Ok(mean(&series[quarter..series.len() - quarter]))
}

/// First valid reading, skipping failed ones within the attempt budget.
pub fn first_valid<S: Sampler>(sampler: &mut S, attempts_per_sample: u8) -> Result<u16, Error> {
    let series = collect(sampler, 1, attempts_per_sample)?;
    Ok(series[0])
}

/// Arithmetic mean rounded half up.
fn mean(values: &[u16]) -> u16 {
    let count = values.len() as u32;
    let sum: u32 = values.iter().map(|&v| u32::from(v)).sum();
    // the mean of u16 values fits a u16
    ((sum + count / 2) / count) as u16
}

/// Pull valid readings until `required` are collected, keeping them sorted.
fn collect<S: Sampler>(
    sampler: &mut S,
    required: u16,
    attempts_per_sample: u8,
) -> Result<Vec<u16, SAMPLES_CAPACITY>, Error> {
    let mut series: Vec<u16, SAMPLES_CAPACITY> = Vec::new();
    let attempts = u32::from(required) * u32::from(attempts_per_sample.max(1));

    for _ in 0..attempts {
        if series.len() == usize::from(required) {
            break;
        }
        match sampler.sample() {
            Ok(value) => {
                // insertion sort: the series stays ascending as it grows
                let at = series.partition_point(|&v| v <= value);
                if series.insert(at, value).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("sample skipped: {}", e);
            }
        }
    }

    if series.len() < usize::from(required) {
        warn!(
            "only {} of {} valid samples collected",
            series.len(),
            required
        );
        return Err(Error::InsufficientSamples {
            collected: series.len() as u16,
            required,
        });
    }
    Ok(series)
}

/// Two-term recursive mean of a slowly varying signal.
///
/// Each new value is averaged with the previous result, so a step change needs
/// several readings to show. Fine for a water level, wrong for a moving target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MovingMean {
    mean: Option<u16>,
}

impl MovingMean {
    pub const fn new() -> Self {
        Self { mean: None }
    }

    /// Fold `value` in and return the new mean. The first value is taken as is.
    pub fn update(&mut self, value: u16) -> u16 {
        let mean = match self.mean {
            Some(mean) => ((u32::from(mean) + u32::from(value) + 1) / 2) as u16,
            None => value,
        };
        self.mean = Some(mean);
        mean
    }

    pub fn value(&self) -> Option<u16> {
        self.mean
    }

    pub fn reset(&mut self) {
        self.mean = None;
    }
}
