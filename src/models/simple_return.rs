use crate::errors::{SimError, SimResult};
use crate::models::calibration::CalibratedParams;
use crate::models::{check_simulation_inputs, PathModel, SimulationBatch};
use rand::RngCore;
use rand_distr::{Distribution, Normal};

/// Random walk on simple returns.
///
/// price_t = price_{t-1} * (1 + Z),  Z ~ Normal(0, simple_volatility)
///
/// The first entry seeds from the spot price. The step distribution is
/// built once per call from the calibrated simple-return volatility, never
/// re-estimated per step. Scores are the path endpoints.
pub struct SimpleReturnWalk;

impl SimpleReturnWalk {
    pub fn new() -> Self {
        Self
    }
}

impl PathModel for SimpleReturnWalk {
    #[inline]
    fn name(&self) -> &'static str {
        "simple-return"
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

        let step = Normal::new(0.0, params.simple_volatility)
            .map_err(|e| SimError::InvalidParameter(format!("simple volatility: {e}")))?;

        let mut paths = Vec::with_capacity(num_simulations);
        let mut scores = Vec::with_capacity(num_simulations);

        for _ in 0..num_simulations {
            let mut path = Vec::with_capacity(days);
            let mut price = spot;
            for _ in 0..days {
                price *= 1.0 + step.sample(rng);
                path.push(price);
            }
            scores.push(price);
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

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_params() -> CalibratedParams {
        CalibratedParams {
            daily_volatility: 0.036,
            daily_drift: 0.041,
            annual_volatility: 0.57,
            annual_drift: 14.9,
            mean_drift: 0.0404,
            simple_volatility: 0.046,
        }
    }

    #[test]
    fn test_batch_shape() {
        let model = SimpleReturnWalk::new();
        let mut rng = StdRng::seed_from_u64(7);
        let batch = model
            .simulate(1135.41, &test_params(), 50, 30, &mut rng)
            .expect("simulates");

        assert_eq!(batch.paths.len(), 50);
        assert!(batch.paths.iter().all(|p| p.len() == 30));
        assert_eq!(batch.scores.len(), 50);
        assert_eq!(batch.model, "simple-return");
    }

    #[test]
    fn test_scores_are_path_endpoints() {
        let model = SimpleReturnWalk::new();
        let mut rng = StdRng::seed_from_u64(7);
        let batch = model
            .simulate(1135.41, &test_params(), 20, 10, &mut rng)
            .unwrap();

        assert_eq!(batch.scores, batch.path_endpoints());
    }

    #[test]
    fn test_prices_stay_positive() {
        let model = SimpleReturnWalk::new();
        let mut rng = StdRng::seed_from_u64(11);
        let batch = model
            .simulate(1135.41, &test_params(), 200, 252, &mut rng)
            .unwrap();

        assert!(batch
            .paths
            .iter()
            .all(|p| p.iter().all(|&price| price > 0.0)));
    }

    #[test]
    fn test_deterministic_given_seed() {
        let model = SimpleReturnWalk::new();
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);

        let a = model
            .simulate(1135.41, &test_params(), 100, 60, &mut rng_a)
            .unwrap();
        let b = model
            .simulate(1135.41, &test_params(), 100, 60, &mut rng_b)
            .unwrap();

        assert_eq!(a, b, "identically seeded runs must be bit-identical");
    }

    #[test]
    fn test_zero_volatility_is_constant() {
        let params = CalibratedParams {
            simple_volatility: 0.0,
            ..test_params()
        };
        let model = SimpleReturnWalk::new();
        let mut rng = StdRng::seed_from_u64(1);
        let batch = model.simulate(100.0, &params, 3, 5, &mut rng).unwrap();

        assert!(batch
            .paths
            .iter()
            .all(|p| p.iter().all(|&price| (price - 100.0).abs() < 1e-12)));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let model = SimpleReturnWalk::new();
        let params = test_params();
        let mut rng = StdRng::seed_from_u64(1);

        for (spot, n, days) in [(-5.0, 1000, 252), (100.0, 0, 252), (100.0, 1000, 0)] {
            let err = model.simulate(spot, &params, n, days, &mut rng).unwrap_err();
            assert!(matches!(err, SimError::InvalidParameter(_)), "got {err}");
        }
    }
}
