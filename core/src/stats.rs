/// Summary of a set of timing samples, all values in milliseconds.
///
/// Built once from a non-empty sample and never mutated afterwards. The
/// standard deviation is the sample standard deviation (N-1 denominator) and
/// is exactly zero for a single sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Reduce `samples` to a summary. Returns `None` for an empty slice.
    pub fn from_samples(samples: &[f64]) -> Option<Summary> {
        let mean = mean(samples)?;
        let median = median(samples)?;

        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Some(Summary {
            count: samples.len(),
            mean,
            median,
            std_dev: sample_std_deviation(samples).unwrap_or(0.0),
            min,
            max,
        })
    }
}

/// Ordered durations in milliseconds, one per repetition, in run order.
#[derive(Debug, Clone, Default)]
pub struct TimingSample {
    durations_ms: Vec<f64>,
}

impl TimingSample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TimingSample {
            durations_ms: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, duration_ms: f64) {
        self.durations_ms.push(duration_ms);
    }

    /// Append another sample's durations after this one's, keeping run order.
    pub fn merge(&mut self, other: &TimingSample) {
        self.durations_ms.extend_from_slice(&other.durations_ms);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.durations_ms
    }

    pub fn len(&self) -> usize {
        self.durations_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations_ms.is_empty()
    }

    pub fn summarize(&self) -> Option<Summary> {
        Summary::from_samples(&self.durations_ms)
    }
}

impl From<Vec<f64>> for TimingSample {
    fn from(durations_ms: Vec<f64>) -> Self {
        TimingSample { durations_ms }
    }
}

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Middle value of the sorted data, averaging the two middles for even lengths.
pub fn median(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let sorted = sorted_copy(data);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample variance with Bessel's correction. `None` for fewer than two values.
pub fn sample_variance(data: &[f64]) -> Option<f64> {
    match (mean(data), data.len()) {
        (Some(data_mean), count) if count > 1 => {
            let sum_sq = data
                .iter()
                .map(|value| {
                    let diff = data_mean - (*value);

                    diff * diff
                })
                .sum::<f64>();

            Some(sum_sq / (count - 1) as f64)
        }
        _ => None,
    }
}

pub fn sample_std_deviation(data: &[f64]) -> Option<f64> {
    sample_variance(data).map(f64::sqrt)
}

pub(crate) fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}
