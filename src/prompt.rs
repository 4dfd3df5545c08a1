//! Interactive front end. Collects currency, date range, simulation count
//! and strategy from stdin and hands a fully validated, typed request to
//! the core -- the core never parses free text itself.

use crate::config::AppConfig;
use crate::errors::{SimError, SimResult};
use crate::models::StrategyKind;
use chrono::NaiveDate;
use std::io::Write;

const DATE_FORMAT: &str = "%m-%d-%Y";

/// Fiat currency bitcoin is quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Usd,
    Inr,
    Eur,
}

impl Currency {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Some(Self::Usd),
            "INR" => Some(Self::Inr),
            "EUR" => Some(Self::Eur),
            _ => None,
        }
    }

    pub fn quote_symbol(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Inr => "INR",
            Self::Eur => "EUR",
        }
    }

    pub fn pair_label(&self) -> String {
        format!("BTC-{}", self.quote_symbol())
    }
}

/// Everything one simulation session needs from the user.
#[derive(Debug, Clone, Copy)]
pub struct SessionRequest {
    pub currency: Currency,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub num_simulations: usize,
    pub strategy: StrategyKind,
}

/// Walk the user through one session's choices.
pub fn read_session_request(config: &AppConfig) -> SimResult<SessionRequest> {
    let answer = ask("Choose a base currency for bitcoin (USD, INR or EUR): ")?;
    let currency = Currency::parse(&answer)
        .ok_or_else(|| SimError::Input(format!("unknown currency: {answer:?}")))?;

    let answer = ask("Start date for the historical window (MM-DD-YYYY): ")?;
    let start = parse_date(&answer)?;
    let answer = ask("End date for the historical window (MM-DD-YYYY): ")?;
    let end = parse_date(&answer)?;
    if start >= end {
        return Err(SimError::Input(format!(
            "start date {start} must precede end date {end}"
        )));
    }

    let answer = ask(&format!(
        "Number of simulations [{}]: ",
        config.num_simulations
    ))?;
    let num_simulations = parse_count(&answer, config.num_simulations)?;

    let answer = ask(&format!(
        "Strategy: 1 = simple-return, 2 = log-normal [{}]: ",
        config.default_strategy
    ))?;
    let strategy = parse_strategy(&answer, config.default_strategy)?;

    Ok(SessionRequest {
        currency,
        start,
        end,
        num_simulations,
        strategy,
    })
}

/// Ask whether to run another session.
pub fn confirm_rerun() -> SimResult<bool> {
    let answer = ask("Run another simulation? (Y or N): ")?;
    Ok(answer.eq_ignore_ascii_case("y"))
}

fn parse_date(s: &str) -> SimResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| SimError::Input(format!("invalid date {s:?}, expected MM-DD-YYYY")))
}

/// Empty input takes the configured default.
fn parse_count(s: &str, default: usize) -> SimResult<usize> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    let count = trimmed
        .parse::<usize>()
        .map_err(|e| SimError::Input(format!("invalid simulation count {trimmed:?}: {e}")))?;
    if count == 0 {
        return Err(SimError::Input("simulation count must be at least 1".into()));
    }
    Ok(count)
}

fn parse_strategy(s: &str, default: StrategyKind) -> SimResult<StrategyKind> {
    let trimmed = s.trim();
    match trimmed {
        "" => Ok(default),
        "1" => Ok(StrategyKind::SimpleReturn),
        "2" => Ok(StrategyKind::LogNormal),
        other => StrategyKind::parse(other)
            .ok_or_else(|| SimError::Input(format!("unknown strategy: {other:?}"))),
    }
}

fn ask(label: &str) -> SimResult<String> {
    print!("{label}");
    std::io::stdout()
        .flush()
        .map_err(|e| SimError::Input(e.to_string()))?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| SimError::Input(e.to_string()))?;
    Ok(line.trim().to_string())
}
