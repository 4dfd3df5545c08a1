mod config;
mod errors;
mod feeds;
mod models;
mod prompt;
mod report;
mod series;
mod stats;

use crate::errors::{SimError, SimResult};
use crate::models::log_normal::LogNormalGbm;
use crate::models::simple_return::SimpleReturnWalk;
use crate::models::{PathModel, StrategyKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[tokio::main]
async fn main() {
    // Structured logging on stderr; stdout belongs to the prompt and the
    // summary output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("coindrift starting");

    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap_or_default();

    // Strategy instances are created once and selected per session.
    let simple = SimpleReturnWalk::new();
    let gbm = LogNormalGbm::new();

    loop {
        match run_session(&cfg, &client, &simple, &gbm).await {
            Ok(()) => {}
            Err(e @ SimError::DataSourceUnavailable(_)) => {
                tracing::error!("fatal: {e}");
                break;
            }
            Err(e) => {
                eprintln!("{e}");
            }
        }

        match prompt::confirm_rerun() {
            Ok(true) => continue,
            _ => break,
        }
    }

    println!("Goodbye!");
}

/// One full session: prompt, fetch, calibrate, simulate, summarize, report.
async fn run_session(
    cfg: &config::AppConfig,
    client: &reqwest::Client,
    simple: &SimpleReturnWalk,
    gbm: &LogNormalGbm,
) -> SimResult<()> {
    let request = prompt::read_session_request(cfg)?;
    tracing::info!(
        pair = %request.currency.pair_label(),
        start = %request.start,
        end = %request.end,
        trials = request.num_simulations,
        strategy = %request.strategy,
        "session configured"
    );

    println!(
        "Extracting dataset for BITCOIN in {}...",
        request.currency.quote_symbol()
    );
    let series = feeds::history::fetch_daily_history(
        client,
        cfg,
        request.currency.quote_symbol(),
        request.start,
        request.end,
    )
    .await?;
    tracing::info!(bars = series.len(), "history loaded");
    println!("Extraction successful! Running the simulation...");

    let params = models::calibration::calibrate(&series, cfg.trading_days_per_year)?;
    tracing::info!(
        daily_drift = params.daily_drift,
        daily_volatility = params.daily_volatility,
        annual_volatility = params.annual_volatility,
        "calibrated"
    );

    let model: &dyn PathModel = match request.strategy {
        StrategyKind::SimpleReturn => simple,
        StrategyKind::LogNormal => gbm,
    };

    let mut rng: StdRng = match cfg.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let spot = series.last_close()?;
    let batch = model.simulate(
        spot,
        &params,
        request.num_simulations,
        cfg.horizon_days,
        &mut rng,
    )?;
    let summary = stats::summarize(&batch.scores)?;

    report::print_summary(&request.currency.pair_label(), batch.model, &summary);
    let (paths_file, hist_file) =
        report::write_reports(&cfg.report_dir, &request.currency.pair_label(), &batch)?;
    tracing::info!(
        paths_chart = %paths_file.display(),
        histogram = %hist_file.display(),
        "reports written"
    );
    println!(
        "Charts written to {} and {}",
        paths_file.display(),
        hist_file.display()
    );

    Ok(())
}
