#![deny(warnings)]

//! Headless driver: load a scenario, populate the market, buy the best
//! listings and run the clock.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use estate_core::{PropertyId, SeededRandom, SimConfig};
use estate_finance::ValuationReport;
use estate_market::PropertyGenerator;
use estate_runtime::{PortfolioSummary, SettlementReport, Simulation};
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    scenario: Option<String>,
    weeks: Option<u32>,
    buy: Option<usize>,
    seed: Option<u64>,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => args.scenario = it.next(),
            "--weeks" => args.weeks = it.next().and_then(|s| s.parse().ok()),
            "--buy" => args.buy = it.next().and_then(|s| s.parse().ok()),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--json" => args.json = true,
            _ => {}
        }
    }
    args
}

#[derive(Serialize)]
struct RunOutput {
    date: NaiveDate,
    weeks_run: u64,
    insolvent: bool,
    summary: PortfolioSummary,
    last_period: Option<SettlementReport>,
}

/// Listings ranked by estimated cap rate, best first.
fn ranked_listings(sim: &Simulation, cfg: &SimConfig) -> Vec<(PropertyId, ValuationReport)> {
    let mut ranked: Vec<_> = sim
        .portfolio()
        .listings()
        .map(|(id, p)| (id, p.estimate(&cfg.valuation.estimate_terms)))
        .collect();
    ranked.sort_by(|a, b| b.1.cap_rate.cmp(&a.1.cap_rate).then(a.0.cmp(&b.0)));
    ranked
}

/// Buy up to `count` of the best listings the wallet can cover.
fn buy_best(sim: &mut Simulation, cfg: &SimConfig, count: usize) -> usize {
    let mut bought = 0;
    for (id, est) in ranked_listings(sim, cfg) {
        if bought == count {
            break;
        }
        let Some(p) = sim.portfolio().property(id) else {
            continue;
        };
        let (price, down) = (p.list_price(), p.minimum_down_payment);
        match sim.purchase(id, price, down) {
            Ok(()) => {
                bought += 1;
                info!(property = %id, cap_rate = ?est.cap_rate, cash_flow = %est.cash_flow, "bought");
            }
            Err(e) if e.is_insufficient_funds() => continue,
            Err(e) => warn!(property = %id, error = %e, "purchase failed"),
        }
    }
    bought
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(scenario = ?args.scenario, weeks = ?args.weeks, "starting CLI");

    let mut cfg = match &args.scenario {
        Some(path) => SimConfig::load(path).with_context(|| format!("loading scenario {path}"))?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.rng_seed = seed;
    }

    let mut sim = Simulation::from_config(&cfg);
    let mut rng = SeededRandom::new(cfg.rng_seed);
    let generator = PropertyGenerator::from_config(&cfg);
    let listed = sim.populate(&generator, &cfg.zones, &mut rng)?.len();
    let bought = buy_best(&mut sim, &cfg, args.buy.unwrap_or(1));

    let mut last_period = None;
    let mut insolvent = false;
    for _ in 0..args.weeks.unwrap_or(52) {
        match sim.advance_period() {
            Ok(report) => last_period = Some(report),
            Err(e) if e.is_insufficient_funds() => {
                warn!(period = sim.period() + 1, error = %e, "stopping: insolvent");
                insolvent = true;
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let summary = sim.portfolio().summary();
    if args.json {
        let out = RunOutput {
            date: sim.date(),
            weeks_run: sim.period(),
            insolvent,
            summary,
            last_period,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "Market OK | zones: {} | listings: {} | bought: {}",
        cfg.zones.len(),
        listed,
        bought
    );
    println!(
        "KPI | weeks: {} | date: {} | wallet: ${} | net worth: ${} | income/wk: ${} | expenses/wk: ${} | debt: ${}",
        sim.period(),
        sim.date(),
        summary.wallet.round_dp(2),
        summary.net_worth.round_dp(2),
        summary.weekly_income.round_dp(2),
        summary.weekly_expenses.round_dp(2),
        summary.debt.round_dp(2),
    );
    if insolvent {
        println!("Stopped early: wallet could not cover a settlement");
    }
    Ok(())
}
