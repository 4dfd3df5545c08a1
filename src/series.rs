use crate::errors::{SimError, SimResult};
use chrono::{DateTime, Utc};

/// One daily observation: opening and closing price for a single session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub close: f64,
}

/// Ordered historical price series.
///
/// Invariants: timestamps strictly increasing (which also rules out
/// duplicates), every open and close strictly positive and finite. The
/// constructor is the only way in, so downstream code relies on the
/// invariants instead of re-checking them. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> SimResult<Self> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.open.is_finite()
                || !bar.close.is_finite()
                || bar.open <= 0.0
                || bar.close <= 0.0
            {
                return Err(SimError::InvalidParameter(format!(
                    "non-positive price at bar {i}: open={}, close={}",
                    bar.open, bar.close
                )));
            }
            if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
                return Err(SimError::InvalidParameter(format!(
                    "timestamps must be strictly increasing at bar {i}"
                )));
            }
        }
        Ok(Self { bars })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[inline]
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Closing price of the most recent bar -- the simulation's starting spot.
    pub fn last_close(&self) -> SimResult<f64> {
        self.bars
            .last()
            .map(|b| b.close)
            .ok_or(SimError::InsufficientData { observations: 0 })
    }
}
