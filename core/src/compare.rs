//! Relative performance of two summaries.

use crate::stats::Summary;
use std::fmt;

/// Direction of a comparison. A ratio of exactly 1.0 counts as
/// `FasterOrEqual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Slower,
    FasterOrEqual,
}

impl Verdict {
    pub fn from_ratio(ratio: f64) -> Verdict {
        if ratio > 1.0 {
            Verdict::Slower
        } else {
            Verdict::FasterOrEqual
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Slower => "slower",
            Verdict::FasterOrEqual => "faster",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `comparand.mean / baseline.mean`, labelled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub ratio: f64,
    pub verdict: Verdict,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x {}", self.ratio, self.verdict)
    }
}

/// Compare two means directly. `None` when the baseline mean is zero or
/// either value is not finite.
pub fn compare_means(baseline_mean: f64, comparand_mean: f64) -> Option<Comparison> {
    if baseline_mean == 0.0 || !baseline_mean.is_finite() || !comparand_mean.is_finite() {
        return None;
    }
    let ratio = comparand_mean / baseline_mean;
    Some(Comparison {
        ratio,
        verdict: Verdict::from_ratio(ratio),
    })
}

/// Compare `comparand` against `baseline`.
pub fn compare(baseline: &Summary, comparand: &Summary) -> Option<Comparison> {
    compare_means(baseline.mean, comparand.mean)
}
