use crate::errors::{SimError, SimResult};
use crate::models::StrategyKind;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub num_simulations: usize,
    pub horizon_days: usize,
    pub trading_days_per_year: u32,
    pub default_strategy: StrategyKind,
    pub rng_seed: Option<u64>,
    pub report_dir: PathBuf,
    pub feed_max_retries: u32,
}

impl AppConfig {
    pub fn from_env() -> SimResult<Self> {
        dotenvy::dotenv().ok();

        let num_simulations = env_var_or("NUM_SIMULATIONS", "1000")
            .parse::<usize>()
            .map_err(|e| SimError::Config(format!("NUM_SIMULATIONS: {e}")))?;
        if num_simulations == 0 {
            return Err(SimError::Config("NUM_SIMULATIONS must be at least 1".into()));
        }

        let horizon_days = env_var_or("HORIZON_DAYS", "252")
            .parse::<usize>()
            .map_err(|e| SimError::Config(format!("HORIZON_DAYS: {e}")))?;
        if horizon_days == 0 {
            return Err(SimError::Config("HORIZON_DAYS must be at least 1".into()));
        }

        let trading_days_per_year = env_var_or("TRADING_DAYS_PER_YEAR", "252")
            .parse::<u32>()
            .map_err(|e| SimError::Config(format!("TRADING_DAYS_PER_YEAR: {e}")))?;
        if trading_days_per_year == 0 {
            return Err(SimError::Config(
                "TRADING_DAYS_PER_YEAR must be at least 1".into(),
            ));
        }

        let strategy_name = env_var_or("STRATEGY", "log-normal");
        let default_strategy = StrategyKind::parse(&strategy_name).ok_or_else(|| {
            SimError::Config(format!(
                "STRATEGY: unknown strategy {strategy_name:?} (expected simple-return or log-normal)"
            ))
        })?;

        let rng_seed = match std::env::var("RNG_SEED") {
            Ok(s) => Some(
                s.parse::<u64>()
                    .map_err(|e| SimError::Config(format!("RNG_SEED: {e}")))?,
            ),
            Err(_) => None,
        };

        let feed_max_retries = env_var_or("FEED_MAX_RETRIES", "5")
            .parse::<u32>()
            .map_err(|e| SimError::Config(format!("FEED_MAX_RETRIES: {e}")))?;

        Ok(Self {
            api_base_url: env_var_or("API_BASE_URL", "https://min-api.cryptocompare.com/data"),
            api_key: std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            num_simulations,
            horizon_days,
            trading_days_per_year,
            default_strategy,
            rng_seed,
            report_dir: PathBuf::from(env_var_or("REPORT_DIR", "reports")),
            feed_max_retries,
        })
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
