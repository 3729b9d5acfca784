use std::f64::consts::PI;
use std::iter::FusedIterator;

use crate::error::HourlySeriesError;
use crate::services::estimate_engine::round_to;

/// Hours in a non-leap year.
pub const HOURS_PER_YEAR: usize = 8760;

/// Relative swing of the hourly loss around the annual loss. The two
/// amplitudes sum below 1 so the hourly loss never changes sign.
const SEASONAL_AMPLITUDE: f64 = 0.3;
const DIURNAL_AMPLITUDE: f64 = 0.5;
/// Day of year with the least shading in the northern hemisphere (June solstice)
const NH_PEAK_DAY: f64 = 172.0;

enum Source {
    Modeled { base_factor: f64, peak_day: f64 },
    Series(std::vec::IntoIter<f64>),
}

/// One shading factor per hour of a non-leap year, January 1st 00:00
/// first. Yields exactly [`HOURS_PER_YEAR`] values and then stays
/// exhausted.
pub struct HourlyShadingFactors {
    source: Source,
    hour: usize,
}

impl HourlyShadingFactors {
    /// Spreads the loss `1 - base_factor` over the year with a seasonal
    /// cosine (least shading at the local summer solstice) and a diurnal
    /// cosine (least shading at solar noon). Both terms average to zero over
    /// the year, so the mean factor equals `base_factor` unless clamping to
    /// `[0, 1]` kicks in (only for base factors below ~0.45 or above 1).
    pub fn modeled(base_factor: f64, latitude: f64) -> Self {
        let peak_day = if latitude >= 0.0 { NH_PEAK_DAY } else { NH_PEAK_DAY + 182.5 };
        Self {
            source: Source::Modeled { base_factor, peak_day },
            hour: 0,
        }
    }

    /// Wraps factors from an external hourly dataset.
    pub fn from_series(values: Vec<f64>) -> Result<Self, HourlySeriesError> {
        if values.len() != HOURS_PER_YEAR {
            return Err(HourlySeriesError {
                expected: HOURS_PER_YEAR,
                actual: values.len(),
            });
        }
        Ok(Self {
            source: Source::Series(values.into_iter()),
            hour: 0,
        })
    }

    fn modeled_factor(base_factor: f64, peak_day: f64, hour_of_year: usize) -> f64 {
        let day_of_year = (hour_of_year / 24) as f64 + 1.0;
        let hour_of_day = (hour_of_year % 24) as f64;
        let seasonal = SEASONAL_AMPLITUDE * (2.0 * PI * (day_of_year - peak_day) / 365.0).cos();
        let diurnal = DIURNAL_AMPLITUDE * (2.0 * PI * (hour_of_day - 12.0) / 24.0).cos();
        let loss = (1.0 - base_factor) * (1.0 - seasonal - diurnal);
        (1.0 - loss).clamp(0.0, 1.0)
    }
}

impl Iterator for HourlyShadingFactors {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.hour >= HOURS_PER_YEAR {
            return None;
        }
        let value = match &mut self.source {
            Source::Modeled { base_factor, peak_day } => {
                Some(Self::modeled_factor(*base_factor, *peak_day, self.hour))
            }
            Source::Series(values) => values.next(),
        };
        self.hour += 1;
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = HOURS_PER_YEAR.saturating_sub(self.hour);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HourlyShadingFactors {}

impl FusedIterator for HourlyShadingFactors {}

/// Mean shading loss over a series of hourly factors, as a percentage with
/// one decimal. An empty series has no loss.
pub fn annual_shading_loss<I>(factors: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = factors
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), f| (sum + f, count + 1));
    if count == 0 {
        return 0.0;
    }
    round_to((1.0 - sum / count as f64) * 100.0, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modeled_yields_exactly_one_year() {
        let mut it = HourlyShadingFactors::modeled(0.9, 34.0);
        assert_eq!(it.len(), HOURS_PER_YEAR);
        assert_eq!(it.by_ref().count(), HOURS_PER_YEAR);
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
        assert_eq!(it.len(), 0);
    }

    #[test]
    fn test_modeled_shape() {
        let factors: Vec<f64> = HourlyShadingFactors::modeled(0.9, 34.0).collect();
        assert!(factors.iter().all(|f| (0.0..=1.0).contains(f)));

        let at = |day: usize, hour: usize| factors[(day - 1) * 24 + hour];
        // Noon beats early morning on the same day
        assert!(at(100, 12) > at(100, 6));
        // June noon beats December noon in the northern hemisphere
        assert!(at(172, 12) > at(355, 12));
        // loss 0.1 × (1 − 0.3 − 0.5)
        assert!((at(172, 12) - 0.98).abs() < 1e-9);
        // loss 0.1 × (1 + 0.3 + 0.5) at midnight on the winter solstice
        assert!((at(355, 0) - 0.82).abs() < 1e-3);
    }

    #[test]
    fn test_southern_hemisphere_seasons_are_flipped() {
        let factors: Vec<f64> = HourlyShadingFactors::modeled(0.9, -33.9).collect();
        let at = |day: usize, hour: usize| factors[(day - 1) * 24 + hour];
        assert!(at(355, 12) > at(172, 12));
    }

    #[test]
    fn test_modeled_clamps() {
        assert!(HourlyShadingFactors::modeled(1.5, 0.0).all(|f| f <= 1.0));
        assert!(HourlyShadingFactors::modeled(-0.5, 0.0).all(|f| f >= 0.0));
    }

    #[test]
    fn test_series_length_is_enforced() {
        let err = HourlyShadingFactors::from_series(vec![0.9; 24]).err().unwrap();
        assert_eq!(err.expected, HOURS_PER_YEAR);
        assert_eq!(err.actual, 24);

        let series = HourlyShadingFactors::from_series(vec![0.8; HOURS_PER_YEAR]).unwrap();
        assert_eq!(series.len(), HOURS_PER_YEAR);
        assert_eq!(annual_shading_loss(series), 20.0);
    }

    #[test]
    fn test_annual_loss() {
        assert_eq!(annual_shading_loss(Vec::new()), 0.0);
        assert_eq!(annual_shading_loss(vec![1.0, 1.0]), 0.0);
        assert_eq!(annual_shading_loss(vec![0.9, 0.8]), 15.0);
    }

    #[test]
    fn test_modeled_loss_matches_base_factor() {
        for base in [0.5, 0.6, 0.75, 0.8, 0.85, 0.8504, 0.9, 0.92, 0.97, 1.0] {
            for lat in [51.5, 34.0, 0.0, -33.9] {
                let loss = annual_shading_loss(HourlyShadingFactors::modeled(base, lat));
                let expected = (1.0 - base) * 100.0;
                assert!(
                    (loss - expected).abs() <= 0.05 + 1e-9,
                    "base {base} at lat {lat}: annual loss {loss}, expected {expected}"
                );
            }
        }
    }
}
