//! Sample statistics over a measurement series.

use serde::{Deserialize, Serialize};

/// Mean and population spread of a series of values.
///
/// The standard deviation divides by `N`, treating the series as the whole
/// population rather than a sample of it.
///
/// # Example
///
/// ```rust
/// use anomaly_watch::analyzers::SampleStatistics;
///
/// let stats = SampleStatistics::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert_eq!(stats.mean, 5.0);
/// assert_eq!(stats.std_dev, 2.0);
/// assert_eq!(stats.z_score(9.0), 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStatistics {
    /// Number of values.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population variance.
    pub variance: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl SampleStatistics {
    /// Computes statistics for `values`. Returns `None` for an empty slice.
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Some(Self {
            count,
            mean,
            variance,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }

    /// True when the series carries no usable spread.
    ///
    /// That is the case when every value is identical, or when the
    /// accumulated mean or spread overflowed to a non-finite number.
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
            || self.std_dev == 0.0
            || !self.std_dev.is_finite()
            || !self.mean.is_finite()
    }

    /// Standardized deviation of `value` from the mean.
    ///
    /// Degenerate series score every value `0.0`: nothing deviates from a
    /// constant baseline.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        (value - self.mean) / self.std_dev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_empty_series() {
        assert!(SampleStatistics::compute(&[]).is_none());
    }

    #[test]
    fn test_population_std_dev() {
        let stats = SampleStatistics::compute(&[100.0, 102.0, 98.0, 500.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert_close(stats.mean, 200.0);
        assert_close(stats.variance, 30_002.0);
        assert_close(stats.std_dev, 30_002f64.sqrt());
        assert_eq!(stats.min, 98.0);
        assert_eq!(stats.max, 500.0);
    }

    #[test]
    fn test_single_value_is_degenerate() {
        let stats = SampleStatistics::compute(&[42.0]).unwrap();
        assert!(stats.is_degenerate());
        assert_eq!(stats.z_score(42.0), 0.0);
    }

    #[test]
    fn test_constant_series_is_degenerate() {
        let stats = SampleStatistics::compute(&[5.0, 5.0, 5.0, 5.0]).unwrap();
        assert!(stats.is_degenerate());
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.z_score(5.0), 0.0);
        assert_eq!(stats.z_score(1_000.0), 0.0);
    }

    #[test]
    fn test_constant_fractional_series_is_degenerate() {
        // the mean picks up rounding error here, so the spread is not exactly 0
        let stats = SampleStatistics::compute(&[0.1, 0.1, 0.1]).unwrap();
        assert!(stats.is_degenerate());
        assert_eq!(stats.z_score(0.1), 0.0);
    }

    #[test]
    fn test_overflowing_series_is_degenerate() {
        let stats = SampleStatistics::compute(&[f64::MAX, f64::MAX, -1.0]).unwrap();
        assert!(stats.is_degenerate());
        assert_eq!(stats.z_score(f64::MAX), 0.0);
    }

    #[test]
    fn test_z_score_sign() {
        let stats = SampleStatistics::compute(&[1.0, 2.0, 3.0]).unwrap();
        assert!(stats.z_score(3.0) > 0.0);
        assert!(stats.z_score(1.0) < 0.0);
        assert_eq!(stats.z_score(2.0), 0.0);
    }
}
