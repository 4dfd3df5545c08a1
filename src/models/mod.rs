pub mod calibration;
pub mod log_normal;
pub mod simple_return;

use crate::errors::{SimError, SimResult};
use rand::RngCore;
use self::calibration::CalibratedParams;

/// All path-generation strategies implement this trait.
/// simulate() must draw every random number from the passed generator and
/// nothing else: two calls with identically seeded generators produce
/// bit-identical batches. Send + Sync required for use across tokio tasks.
pub trait PathModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Generate `num_simulations` independent paths of `days` prices each,
    /// plus the per-trial score values statistics are computed over.
    fn simulate(
        &self,
        spot: f64,
        params: &CalibratedParams,
        num_simulations: usize,
        days: usize,
        rng: &mut dyn RngCore,
    ) -> SimResult<SimulationBatch>;
}

/// Which strategy to run. Parsed from config or the prompt; callers must
/// state which convention they want, the two are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    SimpleReturn,
    LogNormal,
}

impl StrategyKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" | "simple-return" => Some(Self::SimpleReturn),
            "gbm" | "log-normal" | "lognormal" => Some(Self::LogNormal),
            _ => None,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SimpleReturn => write!(f, "simple-return"),
            Self::LogNormal => write!(f, "log-normal"),
        }
    }
}

/// Output of one simulation run. Constructed all-or-nothing at the end of
/// the run and read-only afterward.
///
/// `scores` is what downstream statistics are computed over: the path
/// endpoints in simple-return mode, the independently drawn annualized
/// projections in log-normal mode. In the latter case the paths' own final
/// prices are a different set of values; both are retained.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationBatch {
    pub model: &'static str,
    pub spot: f64,
    pub days: usize,
    pub paths: Vec<Vec<f64>>,
    pub scores: Vec<f64>,
}

impl SimulationBatch {
    /// Final simulated price of each path.
    pub fn path_endpoints(&self) -> Vec<f64> {
        self.paths
            .iter()
            .filter_map(|p| p.last().copied())
            .collect()
    }
}

/// Shared precondition check. Runs before any sampling so a violating call
/// never consumes generator state.
pub(crate) fn check_simulation_inputs(
    spot: f64,
    num_simulations: usize,
    days: usize,
) -> SimResult<()> {
    if !spot.is_finite() || spot <= 0.0 {
        return Err(SimError::InvalidParameter(format!(
            "spot price must be positive and finite, got {spot}"
        )));
    }
    if num_simulations == 0 {
        return Err(SimError::InvalidParameter(
            "num_simulations must be at least 1".into(),
        ));
    }
    if days == 0 {
        return Err(SimError::InvalidParameter(
            "simulation horizon must be at least 1 day".into(),
        ));
    }
    Ok(())
}
