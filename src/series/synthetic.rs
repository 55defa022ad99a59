use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{Sample, Series};

/// Day of year of the Northern Hemisphere summer solstice.
const SUMMER_SOLSTICE_ORDINAL: f64 = 172.0;

/// Gaussian noise with mean 0 via the Box-Muller transform.
///
/// Returns `0.0` for a non-positive standard deviation without touching the RNG.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Hour of day as a fraction, e.g. `13.5` for 13:30.
fn fractional_hour(at: NaiveDateTime) -> f64 {
    f64::from(at.num_seconds_from_midnight()) / 3600.0
}

/// Seasonal position in `[-1, 1]`: `1` at the summer solstice, `-1` half a year later.
fn season_factor(at: NaiveDateTime) -> f64 {
    let angle = 2.0 * std::f64::consts::PI * (f64::from(at.ordinal()) - SUMMER_SOLSTICE_ORDINAL)
        / 365.0;
    angle.cos()
}

fn generate_with<F>(
    name: &str,
    start: NaiveDateTime,
    steps: usize,
    interval: TimeDelta,
    mut f: F,
) -> Series
where
    F: FnMut(NaiveDateTime) -> f64,
{
    let samples = (0..steps)
        .scan(start, |at, _| {
            let timestamp = *at;
            *at += interval;
            Some(Sample::new(timestamp, f(timestamp)))
        })
        .collect();
    Series::new(name, samples)
}

/// A PV array modelled as a half-sine between sunrise and sunset.
///
/// Day length and peak output follow the calendar: around the summer
/// solstice the day is `2 * seasonal_swing_hours` longer than at the
/// equinox-centred `sunrise_hour..sunset_hour` window, and at the winter
/// solstice the peak drops by `winter_derate`. Multiplicative Gaussian noise
/// stands in for cloud cover.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use pv_sim::series::synthetic::SolarProfile;
///
/// let start = NaiveDate::from_ymd_opt(2019, 6, 21).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let mut pv = SolarProfile::new(5.0, 6.0, 18.0, 0.0, 42);
/// let day = pv.generate("south", start, 24, TimeDelta::hours(1));
///
/// assert_eq!(day.samples[0].value_kw, 0.0);
/// assert!(day.samples[12].value_kw > 4.9);
/// ```
#[derive(Debug, Clone)]
pub struct SolarProfile {
    /// Output under clear sky at solar noon on the equinox (kW).
    pub peak_kw: f64,
    /// Sunrise on the equinox (hours after midnight).
    pub sunrise_hour: f64,
    /// Sunset on the equinox (hours after midnight).
    pub sunset_hour: f64,
    /// Noise standard deviation as a fraction of output.
    pub noise_std: f64,
    /// Extra hours of daylight at each end of the day at the summer solstice.
    pub seasonal_swing_hours: f64,
    /// Fractional peak reduction at the winter solstice, in `[0, 1]`.
    pub winter_derate: f64,
    rng: StdRng,
}

impl SolarProfile {
    /// Creates a profile with no seasonal variation.
    ///
    /// Negative peak and noise values are clamped to zero.
    pub fn new(
        peak_kw: f64,
        sunrise_hour: f64,
        sunset_hour: f64,
        noise_std: f64,
        seed: u64,
    ) -> Self {
        Self {
            peak_kw: peak_kw.max(0.0),
            sunrise_hour,
            sunset_hour,
            noise_std: noise_std.max(0.0),
            seasonal_swing_hours: 0.0,
            winter_derate: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Adds day-length swing and winter derate.
    #[must_use]
    pub fn with_seasonality(mut self, seasonal_swing_hours: f64, winter_derate: f64) -> Self {
        self.seasonal_swing_hours = seasonal_swing_hours.max(0.0);
        self.winter_derate = winter_derate.clamp(0.0, 1.0);
        self
    }

    /// Clear-sky fraction of peak output at `at`, in `[0, 1]`.
    pub fn clear_sky_frac(&self, at: NaiveDateTime) -> f64 {
        let season = season_factor(at);
        let sunrise = self.sunrise_hour - self.seasonal_swing_hours * season;
        let sunset = self.sunset_hour + self.seasonal_swing_hours * season;
        let hour = fractional_hour(at);
        if sunset <= sunrise || hour <= sunrise || hour >= sunset {
            return 0.0;
        }

        let shape = (std::f64::consts::PI * (hour - sunrise) / (sunset - sunrise)).sin();
        let derate = 1.0 - self.winter_derate * (1.0 - season) / 2.0;
        (shape * derate).clamp(0.0, 1.0)
    }

    /// Output at `at` (kW), never negative.
    pub fn power_kw(&mut self, at: NaiveDateTime) -> f64 {
        let frac = self.clear_sky_frac(at);
        if frac <= 0.0 {
            return 0.0;
        }
        let noise_mult = 1.0 + gaussian_noise(&mut self.rng, self.noise_std);
        (self.peak_kw * frac * noise_mult).max(0.0)
    }

    /// Generates `steps` samples starting at `start`, `interval` apart.
    pub fn generate(
        &mut self,
        name: &str,
        start: NaiveDateTime,
        steps: usize,
        interval: TimeDelta,
    ) -> Series {
        generate_with(name, start, steps, interval, |at| self.power_kw(at))
    }
}

/// Household demand as a daily sinusoid plus Gaussian noise.
#[derive(Debug, Clone)]
pub struct LoadProfile {
    /// Mean demand (kW).
    pub base_kw: f64,
    /// Daily swing around the mean (kW).
    pub amp_kw: f64,
    /// Phase offset (radians); `0` puts the rising zero-crossing at midnight.
    pub phase_rad: f64,
    /// Noise standard deviation (kW).
    pub noise_std: f64,
    rng: StdRng,
}

impl LoadProfile {
    pub fn new(base_kw: f64, amp_kw: f64, phase_rad: f64, noise_std: f64, seed: u64) -> Self {
        Self {
            base_kw,
            amp_kw,
            phase_rad,
            noise_std: noise_std.max(0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Demand at `at` (kW), never negative.
    pub fn demand_kw(&mut self, at: NaiveDateTime) -> f64 {
        let day_pos = fractional_hour(at) / 24.0;
        let angle = 2.0 * std::f64::consts::PI * day_pos + self.phase_rad;
        let noise = gaussian_noise(&mut self.rng, self.noise_std);
        (self.base_kw + self.amp_kw * angle.sin() + noise).max(0.0)
    }

    /// Generates `steps` samples starting at `start`, `interval` apart.
    pub fn generate(
        &mut self,
        name: &str,
        start: NaiveDateTime,
        steps: usize,
        interval: TimeDelta,
    ) -> Series {
        generate_with(name, start, steps, interval, |at| self.demand_kw(at))
    }
}
