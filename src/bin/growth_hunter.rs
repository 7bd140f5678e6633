use growth_hunter::config::Config;
use growth_hunter::data_provider::DashboardSnapshot;
use growth_hunter::scrapers::base::MarketDataSource;
use growth_hunter::scrapers::yahoo::YahooScraper;
use growth_hunter::services::indicator_engine::IndicatorEngine;
use growth_hunter::services::scheduler::RefreshScheduler;
use growth_hunter::services::screener::rank_opportunities;
use growth_hunter::{classify_signal, report, trade_levels};

use anyhow::{bail, Context};
use clap::{App, Arg, ArgMatches, SubCommand};
use log::{error, info};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn universe_args<'a>(cmd: App<'a>) -> App<'a> {
    cmd.arg(
        Arg::with_name("tickers")
            .short('t')
            .long("tickers")
            .value_name("TICKERS")
            .help("Comma-separated universe to scan (defaults to the built-in B3 list)")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("favorites")
            .short('f')
            .long("favorites")
            .value_name("TICKERS")
            .help("Comma-separated tickers shown as detailed cards")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("limit")
            .short('l')
            .long("limit")
            .value_name("LIMIT")
            .help("Rows in the opportunity table")
            .takes_value(true)
            .default_value("10"),
    )
    .arg(
        Arg::with_name("parallel")
            .short('p')
            .long("parallel")
            .help("Fetch all tickers concurrently")
            .takes_value(false),
    )
    .arg(
        Arg::with_name("lenient-metadata")
            .long("lenient-metadata")
            .help("Use name/target fallbacks when the quote metadata request fails")
            .takes_value(false),
    )
    .arg(
        Arg::with_name("json")
            .long("json")
            .help("Print the snapshot as JSON instead of text")
            .takes_value(false),
    )
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.to_string()).collect()
}

fn build_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = Config::new();

    if let Some(tickers) = matches.value_of("tickers") {
        config = config.with_tickers(&split_list(tickers));
    }
    if let Some(favorites) = matches.value_of("favorites") {
        config = config.with_favorites(&split_list(favorites));
    }

    let limit = matches
        .value_of("limit")
        .unwrap_or("10")
        .parse::<usize>()
        .context("--limit must be a positive integer")?;
    config = config
        .with_screener_limit(limit)
        .with_require_metadata(!matches.is_present("lenient-metadata"));

    if config.tickers.is_empty() {
        bail!("ticker universe is empty");
    }
    Ok(config)
}

/// Union of universe and favourites, universe order first.
fn scan_list(config: &Config) -> Vec<String> {
    let mut tickers = config.tickers.clone();
    for fav in &config.favorites {
        if !tickers.contains(fav) {
            tickers.push(fav.clone());
        }
    }
    tickers
}

async fn scan_once(engine: &IndicatorEngine, parallel: bool, as_json: bool) {
    let config = engine.config();
    let tickers = scan_list(config);
    info!("Scanning {} tickers", tickers.len());

    let outcomes = if parallel {
        engine.compute_batch_concurrent(&tickers).await
    } else {
        engine.compute_batch(&tickers).await
    };
    let snapshot = DashboardSnapshot::from_outcomes(outcomes);

    if as_json {
        let payload = json!({
            "taken_at": snapshot.taken_at().to_rfc3339(),
            "favorites": snapshot.select(&config.favorites),
            "opportunities": rank_opportunities(snapshot.results(), config.screener_limit),
            "results": snapshot.results(),
            "unavailable": snapshot
                .unavailable()
                .iter()
                .map(|u| json!({"ticker": u.ticker, "reason": u.reason.to_string()}))
                .collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to serialize snapshot: {}", e),
        }
    } else {
        print!("{}", report::render_report(&snapshot, &config.favorites, config.screener_limit));
    }
}

fn build_engine(config: Config) -> anyhow::Result<IndicatorEngine> {
    let source: Arc<dyn MarketDataSource + Send + Sync> = Arc::new(YahooScraper::new(&config)?);
    Ok(IndicatorEngine::new(config, source))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let app = App::new("growth_hunter")
        .version(env!("CARGO_PKG_VERSION"))
        .about("B3 momentum terminal: RSI, moving averages and opportunity radar");

    let app = app
        .subcommand(universe_args(
            SubCommand::with_name("scan").about("Compute indicators once and print the report"),
        ))
        .subcommand(
            universe_args(SubCommand::with_name("watch").about("Re-scan on a fixed interval"))
                .arg(
                    Arg::with_name("interval-minutes")
                        .short('i')
                        .long("interval-minutes")
                        .value_name("MINUTES")
                        .help("Minutes between refreshes")
                        .takes_value(true)
                        .default_value("30"),
                )
                .arg(
                    Arg::with_name("cycles")
                        .short('c')
                        .long("cycles")
                        .value_name("N")
                        .help("Stop after N refreshes (runs until Ctrl-C otherwise)")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("signal")
                .about("Classify an RSI value and derive trade levels, no network")
                .arg(
                    Arg::with_name("rsi")
                        .long("rsi")
                        .value_name("RSI")
                        .help("RSI reading in [0, 100]")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("price")
                        .long("price")
                        .value_name("PRICE")
                        .takes_value(true)
                        .requires("volatility"),
                )
                .arg(
                    Arg::with_name("volatility")
                        .long("volatility")
                        .value_name("RANGE")
                        .help("10-session mean high-low range")
                        .takes_value(true)
                        .requires("price"),
                ),
        );

    let matches = app.get_matches();

    if let Some(matches) = matches.subcommand_matches("scan") {
        let engine = build_engine(build_config(matches)?)?;
        scan_once(&engine, matches.is_present("parallel"), matches.is_present("json")).await;
    } else if let Some(matches) = matches.subcommand_matches("watch") {
        let minutes = matches
            .value_of("interval-minutes")
            .unwrap_or("30")
            .parse::<u64>()
            .context("--interval-minutes must be a positive integer")?;
        if minutes == 0 {
            bail!("--interval-minutes must be at least 1");
        }
        let config = build_config(matches)?.with_refresh_interval(Duration::from_secs(minutes * 60));

        let mut scheduler = RefreshScheduler::new(config.refresh_interval);
        if let Some(cycles) = matches.value_of("cycles") {
            scheduler = scheduler.with_max_cycles(cycles.parse::<usize>().context("--cycles must be an integer")?);
        }

        let engine = build_engine(config)?;
        let engine_ref = &engine;
        let parallel = matches.is_present("parallel");
        let as_json = matches.is_present("json");

        info!("Refreshing every {} minute(s)", minutes);
        let completed = scheduler
            .run(
                move |_| scan_once(engine_ref, parallel, as_json),
                async {
                    let _ = tokio::signal::ctrl_c().await;
                },
            )
            .await;
        info!("Completed {} refresh cycle(s)", completed);
    } else if let Some(matches) = matches.subcommand_matches("signal") {
        let rsi = matches
            .value_of("rsi")
            .unwrap_or_default()
            .parse::<f64>()
            .context("--rsi must be a number")?;
        if !(0.0..=100.0).contains(&rsi) {
            bail!("--rsi must be within [0, 100]");
        }

        let signal = classify_signal(rsi);
        println!("{}", signal.label());
        println!("{}", signal.commentary());

        if let (Some(price), Some(vol)) = (matches.value_of("price"), matches.value_of("volatility")) {
            let price = price.parse::<f64>().context("--price must be a number")?;
            let vol = vol.parse::<f64>().context("--volatility must be a number")?;
            let levels = trade_levels(price, vol);
            println!("Buy: R$ {:.2}   Target: R$ {:.2}", levels.buy, levels.target);
        }
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}
