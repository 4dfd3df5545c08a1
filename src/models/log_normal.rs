use crate::errors::SimResult;
use crate::models::calibration::CalibratedParams;
use crate::models::{check_simulation_inputs, PathModel, SimulationBatch};
use rand::RngCore;
use rand_distr::{Distribution, StandardNormal};

/// Log-normal (geometric Brownian motion) simulation.
///
/// Path step:   price_t = price_{t-1} * exp(mean_drift + daily_volatility * Z)
/// Trial score: spot * exp((annual_drift - annual_volatility^2 / 2)
///                         + annual_volatility * Z')
///
/// with independent standard normals Z, Z'. Log-domain stepping keeps every
/// simulated price strictly positive. The score is a one-shot annualized
/// projection and is NOT the path's final price; downstream statistics run
/// over the scores, and both sets of values are retained on the batch.
///
/// Draw order per trial -- score first, then `days` path draws -- is part of
/// the reproducibility contract.
pub struct LogNormalGbm;

impl LogNormalGbm {
    pub fn new() -> Self {
        Self
    }
}

impl PathModel for LogNormalGbm {
    #[inline]
    fn name(&self) -> &'static str {
        "log-normal"
    }

    fn simulate(
        &self,
        spot: f64,
        params: &CalibratedParams,
        num_simulations: usize,
        days: usize,
        rng: &mut dyn RngCore,
    ) -> SimResult<SimulationBatch> {
        check_simulation_inputs(spot, num_simulations, days)?;

        let score_drift = params.annual_drift - 0.5 * params.annual_volatility * params.annual_volatility;

        let mut paths = Vec::with_capacity(num_simulations);
        let mut scores = Vec::with_capacity(num_simulations);

        for _ in 0..num_simulations {
            let z: f64 = StandardNormal.sample(rng);
            scores.push(spot * (score_drift + params.annual_volatility * z).exp());

            let mut path = Vec::with_capacity(days);
            let mut price = spot;
            for _ in 0..days {
                let z: f64 = StandardNormal.sample(rng);
                let log_return = params.mean_drift + params.daily_volatility * z;
                price *= log_return.exp();
                path.push(price);
            }
            paths.push(path);
        }

        Ok(SimulationBatch {
            model: self.name(),
            spot,
            days,
            paths,
            scores,
        })
    }
}
