use crate::errors::{SimError, SimResult};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Two-sided confidence level for the mean interval.
const CONFIDENCE_LEVEL: f64 = 0.95;

/// Summary of a batch's terminal values. Stack-allocated, Copy.
///
/// Invariants for n > 1: min <= median <= max and ci_low <= mean <= ci_high.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStatistics {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

/// Summarize terminal values: mean, median, min/max, unbiased sample
/// standard deviation (N-1 denominator, same estimator the calibration
/// uses), and a two-sided 95% confidence interval for the mean via the
/// Student's-t distribution with n-1 degrees of freedom:
///
///   bound = mean +- t_crit * std_dev / sqrt(n)
///
/// Requires at least 2 samples; one value has no meaningful interval.
/// Pure function.
pub fn summarize(values: &[f64]) -> SimResult<SummaryStatistics> {
    if values.len() < 2 {
        return Err(SimError::InsufficientSamples {
            required: 2,
            actual: values.len(),
        });
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(SimError::InvalidParameter(format!(
            "non-finite sample: {bad}"
        )));
    }

    let n = values.len();
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let sum_sq: f64 = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum();
    let std_dev = (sum_sq / (nf - 1.0)).sqrt();

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let min = sorted[0];
    let max = sorted[n - 1];
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    let t_dist = StudentsT::new(0.0, 1.0, nf - 1.0)
        .map_err(|e| SimError::InvalidParameter(format!("t distribution: {e}")))?;
    let t_crit = t_dist.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0);
    let half_width = t_crit * std_dev / nf.sqrt();

    Ok(SummaryStatistics {
        mean,
        median,
        min,
        max,
        std_dev,
        ci_low: mean - half_width,
        ci_high: mean + half_width,
    })
}
