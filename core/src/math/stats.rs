use serde::{Deserialize, Serialize};

/// Direction of a metric between two halves of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increased,
    Decreased,
    Consistent,
}

impl Trend {
    pub fn describe(&self) -> &'static str {
        match self {
            Trend::Increased => "increased",
            Trend::Decreased => "decreased",
            Trend::Consistent => "stayed consistent",
        }
    }
}

pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    pub fn median(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }

    /// Population standard deviation.
    pub fn std_dev(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let mean = Self::mean(samples);
        let variance =
            samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        variance.sqrt()
    }

    /// Standard deviation over mean; zero when the mean is zero.
    pub fn coefficient_of_variation(samples: &[f64]) -> f64 {
        let mean = Self::mean(samples);
        if mean.abs() < f64::EPSILON {
            0.0
        } else {
            Self::std_dev(samples) / mean
        }
    }

    /// `(later - earlier) / earlier * 100`, or `None` when `earlier` is zero.
    pub fn percent_change(earlier: f64, later: f64) -> Option<f64> {
        if earlier.abs() < f64::EPSILON {
            None
        } else {
            Some((later - earlier) / earlier * 100.0)
        }
    }

    /// Classifies a percent change with a symmetric deadband.
    pub fn classify_change(percent: f64, deadband: f64) -> Trend {
        if percent > deadband {
            Trend::Increased
        } else if percent < -deadband {
            Trend::Decreased
        } else {
            Trend::Consistent
        }
    }

    /// Share of samples strictly below `value`, as a 0-100 percentile.
    pub fn percentile_rank(samples: &[f64], value: f64) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let below = samples.iter().filter(|&&v| v < value).count();
        below as f64 / samples.len() as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_series_have_zero_mean() {
        assert_eq!(StatsHelper::mean(&[]), 0.0);
        assert_eq!(StatsHelper::std_dev(&[]), 0.0);
    }

    #[test]
    fn median_handles_even_and_odd_lengths() {
        assert_eq!(StatsHelper::median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(StatsHelper::median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
    }

    #[test]
    fn std_dev_is_population_form() {
        assert_relative_eq!(
            StatsHelper::std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]),
            2.0
        );
    }

    #[test]
    fn percent_change_guards_zero_baseline() {
        assert_eq!(StatsHelper::percent_change(0.0, 10.0), None);
        assert_eq!(StatsHelper::percent_change(10.0, 15.0), Some(50.0));
    }

    #[test]
    fn deadband_keeps_small_changes_consistent() {
        assert_eq!(StatsHelper::classify_change(9.9, 10.0), Trend::Consistent);
        assert_eq!(StatsHelper::classify_change(10.1, 10.0), Trend::Increased);
        assert_eq!(StatsHelper::classify_change(-25.0, 10.0), Trend::Decreased);
    }
}
