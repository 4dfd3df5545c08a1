use crate::errors::{SimError, SimResult};
use crate::series::PriceSeries;

/// Calendar days used to annualize drift (drift accrues on calendar time,
/// volatility scales with trading sessions).
const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

/// Drift and volatility estimated from a historical price series.
///
/// One params struct feeds every strategy: the log-return fields drive the
/// log-normal model, `simple_volatility` drives the simple-return walk.
/// Each strategy reads the fields it needs. Stack-allocated, Copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibratedParams {
    /// Sample standard deviation of per-bar log-returns ln(close/open)
    pub daily_volatility: f64,
    /// Mean of per-bar log-returns
    pub daily_drift: f64,
    /// daily_volatility * sqrt(trading_days_per_year)
    pub annual_volatility: f64,
    /// daily_drift * 365
    pub annual_drift: f64,
    /// Ito-corrected drift for log-domain stepping:
    /// daily_drift - daily_volatility^2 / 2
    pub mean_drift: f64,
    /// Sample standard deviation of close-over-close simple returns
    pub simple_volatility: f64,
}

/// Estimate drift and volatility from the series.
///
/// Log-returns are per bar, ln(close/open). Both standard deviations use
/// the unbiased sample estimator (N-1 denominator), the same convention the
/// confidence interval in `stats` relies on.
///
/// Requires at least 2 bars. Pure function of the series and the
/// trading-day constant; price positivity is already guaranteed by
/// `PriceSeries` construction.
pub fn calibrate(series: &PriceSeries, trading_days_per_year: u32) -> SimResult<CalibratedParams> {
    if series.len() < 2 {
        return Err(SimError::InsufficientData {
            observations: series.len(),
        });
    }

    let log_returns: Vec<f64> = series
        .bars()
        .iter()
        .map(|b| (b.close / b.open).ln())
        .collect();
    let daily_drift = mean(&log_returns);
    let daily_volatility = sample_std(&log_returns, daily_drift);

    // Close-over-close simple returns: one fewer sample than bars. A 2-bar
    // series leaves a single return, whose sample deviation is undefined;
    // report zero dispersion in that case.
    let simple_returns: Vec<f64> = series
        .bars()
        .windows(2)
        .map(|w| w[1].close / w[0].close - 1.0)
        .collect();
    let simple_volatility = if simple_returns.len() < 2 {
        0.0
    } else {
        sample_std(&simple_returns, mean(&simple_returns))
    };

    Ok(CalibratedParams {
        daily_volatility,
        daily_drift,
        annual_volatility: daily_volatility * f64::from(trading_days_per_year).sqrt(),
        annual_drift: daily_drift * CALENDAR_DAYS_PER_YEAR,
        mean_drift: daily_drift - 0.5 * daily_volatility * daily_volatility,
        simple_volatility,
    })
}

#[inline]
fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Unbiased sample standard deviation. Caller guarantees xs.len() >= 2.
fn sample_std(xs: &[f64], mean: f64) -> f64 {
    let sum_sq: f64 = xs
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum();
    (sum_sq / (xs.len() - 1) as f64).sqrt()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::series::PriceBar;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    /// Four daily bars used as the cross-implementation reference fixture.
    pub(crate) fn reference_series() -> PriceSeries {
        let quotes = [
            (963.380005, 995.440002),
            (995.440002, 1017.049988),
            (1017.049988, 1033.300049),
            (1033.300049, 1135.410034),
        ];
        let bars = quotes
            .iter()
            .enumerate()
            .map(|(i, &(open, close))| PriceBar {
                timestamp: Utc
                    .with_ymd_and_hms(2015, 1, 1 + i as u32, 0, 0, 0)
                    .unwrap(),
                open,
                close,
            })
            .collect();
        PriceSeries::new(bars).expect("reference bars are valid")
    }

    #[test]
    fn test_reference_calibration() {
        let params = calibrate(&reference_series(), 252).expect("calibrates");

        assert_relative_eq!(params.daily_drift, 0.041075297187505105, epsilon = 1e-9);
        assert_relative_eq!(params.daily_volatility, 0.036129246151443487, epsilon = 1e-9);
        assert_relative_eq!(params.annual_drift, 14.992483473439364, epsilon = 1e-9);
        assert_relative_eq!(params.simple_volatility, 0.04626299689473761, epsilon = 1e-9);
    }

    #[test]
    fn test_annualization_identities() {
        let params = calibrate(&reference_series(), 252).expect("calibrates");

        assert_eq!(
            params.annual_volatility,
            params.daily_volatility * 252.0_f64.sqrt()
        );
        assert_eq!(
            params.mean_drift,
            params.daily_drift - 0.5 * params.daily_volatility * params.daily_volatility
        );
        assert_eq!(params.annual_drift, params.daily_drift * 365.0);
    }

    #[test]
    fn test_trading_days_constant_is_configurable() {
        let p252 = calibrate(&reference_series(), 252).unwrap();
        let p365 = calibrate(&reference_series(), 365).unwrap();

        assert_eq!(p252.daily_volatility, p365.daily_volatility);
        assert!(p365.annual_volatility > p252.annual_volatility);
    }

    #[test]
    fn test_insufficient_data() {
        let empty = PriceSeries::new(vec![]).unwrap();
        assert!(matches!(
            calibrate(&empty, 252),
            Err(SimError::InsufficientData { observations: 0 })
        ));

        let one = PriceSeries::new(vec![PriceBar {
            timestamp: Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap(),
            open: 963.38,
            close: 995.44,
        }])
        .unwrap();
        assert!(matches!(
            calibrate(&one, 252),
            Err(SimError::InsufficientData { observations: 1 })
        ));
    }

    #[test]
    fn test_two_bars_zero_simple_volatility() {
        let bars = reference_series().bars()[..2].to_vec();
        let series = PriceSeries::new(bars).unwrap();
        let params = calibrate(&series, 252).unwrap();

        // Two log-returns exist, one simple return does not disperse.
        assert!(params.daily_volatility > 0.0);
        assert_eq!(params.simple_volatility, 0.0);
    }

    #[test]
    fn test_flat_series_has_zero_volatility() {
        let bars = (1..=5)
            .map(|d| PriceBar {
                timestamp: Utc.with_ymd_and_hms(2015, 1, d, 0, 0, 0).unwrap(),
                open: 100.0,
                close: 100.0,
            })
            .collect();
        let series = PriceSeries::new(bars).unwrap();
        let params = calibrate(&series, 252).unwrap();

        assert_eq!(params.daily_volatility, 0.0);
        assert_eq!(params.daily_drift, 0.0);
        assert_eq!(params.mean_drift, 0.0);
        assert_eq!(params.simple_volatility, 0.0);
    }
}
