//! Descriptive statistics over an arbitrary numeric series.

use crate::stats::{mean, median, sample_std_deviation, sample_variance, sorted_copy};

#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub variance: f64,
    /// Standard deviation as a percentage of the mean; `None` when the mean is zero.
    pub coefficient_of_variation: Option<f64>,
    /// Moment skewness; `None` for a constant series.
    pub skewness: Option<f64>,
    /// Excess kurtosis (normal = 0); `None` for a constant series.
    pub kurtosis: Option<f64>,
    pub p25: f64,
    pub p75: f64,
}

impl Description {
    pub fn from_values(values: &[f64]) -> Option<Description> {
        let mean = mean(values)?;
        let median = median(values)?;
        let sorted = sorted_copy(values);

        let std_dev = sample_std_deviation(values).unwrap_or(0.0);
        let variance = sample_variance(values).unwrap_or(0.0);

        let coefficient_of_variation = if mean != 0.0 {
            Some(std_dev / mean * 100.0)
        } else {
            None
        };

        let m2 = central_moment(values, mean, 2);
        let (skewness, kurtosis) = if m2 > 0.0 {
            let m3 = central_moment(values, mean, 3);
            let m4 = central_moment(values, mean, 4);
            (Some(m3 / m2.powf(1.5)), Some(m4 / (m2 * m2) - 3.0))
        } else {
            (None, None)
        };

        Some(Description {
            count: values.len(),
            mean,
            median,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            std_dev,
            variance,
            coefficient_of_variation,
            skewness,
            kurtosis,
            p25: percentile_sorted(&sorted, 25.0),
            p75: percentile_sorted(&sorted, 75.0),
        })
    }

    /// Labelled, display-ready values in report order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        fn fixed(v: f64) -> String {
            format!("{v:.4}")
        }
        fn maybe(v: Option<f64>) -> String {
            v.map(fixed).unwrap_or_else(|| "n/a".to_string())
        }

        vec![
            ("Count", self.count.to_string()),
            ("Mean", fixed(self.mean)),
            ("Median", fixed(self.median)),
            ("Min", fixed(self.min)),
            ("Max", fixed(self.max)),
            ("Standard deviation", fixed(self.std_dev)),
            ("Variance", fixed(self.variance)),
            ("Coefficient of variation (%)", maybe(self.coefficient_of_variation)),
            ("Skewness", maybe(self.skewness)),
            ("Kurtosis", maybe(self.kurtosis)),
            ("25th percentile", fixed(self.p25)),
            ("75th percentile", fixed(self.p75)),
        ]
    }
}

fn central_moment(values: &[f64], mean: f64, order: i32) -> f64 {
    values.iter().map(|v| (v - mean).powi(order)).sum::<f64>() / values.len() as f64
}

/// Percentile of already sorted data, interpolating linearly between the
/// two closest ranks. `pct` is in `[0, 100]`.
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
