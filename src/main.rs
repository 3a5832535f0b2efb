use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use strategy_analyzer::analysis::{analyze_trades, PnlReport};
use strategy_analyzer::input::{find_input_files, read_input};
use strategy_analyzer::{
    analyze_max_profit_and_buckets, compute_pnl, AnalysisError, AnalyzerConfig, MarketAnalysis,
    Trade, TradeParser, SAMPLE_DATA,
};

#[derive(Parser, Debug)]
#[command(name = "strategy-analyzer")]
#[command(about = "Find the best entry and exit points in pasted price history")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Print verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON instead of a text report
    #[arg(long, global = true)]
    json: bool,

    /// Minimum samples before a bucket counts as a pattern
    #[arg(long, global = true, env = "ANALYZER_MIN_SAMPLES", default_value = "3")]
    min_samples: usize,

    /// Win rate (%) a pattern must strictly exceed
    #[arg(long, global = true, env = "ANALYZER_MIN_WIN_RATE", default_value = "60.0")]
    min_win_rate: f64,

    /// Overall win rate (%) required before recommending a strategy
    #[arg(
        long,
        global = true,
        env = "ANALYZER_RECOMMENDATION_WIN_RATE",
        default_value = "60.0"
    )]
    recommendation_win_rate: f64,

    /// Two-digit year appended to dates pasted without one
    #[arg(long, global = true, env = "ANALYZER_FALLBACK_YEAR", default_value = "23")]
    fallback_year: String,

    /// Looser pattern filters for short pastes (ignores --min-samples/--min-win-rate)
    #[arg(long, global = true)]
    exploratory: bool,
}

impl Args {
    fn config(&self) -> AnalyzerConfig {
        let base = if self.exploratory {
            AnalyzerConfig::exploratory()
        } else {
            AnalyzerConfig {
                min_samples: self.min_samples,
                min_win_rate: self.min_win_rate,
                ..Default::default()
            }
        };

        AnalyzerConfig {
            recommendation_win_rate: self.recommendation_win_rate,
            fallback_year: self.fallback_year.clone(),
            ..base
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Best single buy/sell pair and best day/time to buy and sell
    Analyze {
        /// Input file (omit or "-" to read stdin; .zst is decompressed)
        input: Option<PathBuf>,
    },

    /// Round-trip PnL, win-rate patterns and strategy recommendation
    Pnl {
        /// Input file (omit or "-" to read stdin; .zst is decompressed)
        input: Option<PathBuf>,
    },

    /// Both analyses from a single parse
    Report {
        /// Input file (omit or "-" to read stdin; .zst is decompressed)
        input: Option<PathBuf>,
    },

    /// Analyze every matching file in a directory in parallel
    Batch {
        /// Directory containing pasted price-history files
        #[arg(short, long)]
        dir: PathBuf,

        /// File extension to pick up (also matches <ext>.zst)
        #[arg(short, long, default_value = "txt")]
        ext: String,

        /// Write a one-row-per-file summary CSV here
        #[arg(long)]
        summary_csv: Option<PathBuf>,
    },

    /// Print the built-in sample data set
    Sample,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let directive = if args.verbose {
        "strategy_analyzer=debug"
    } else {
        "strategy_analyzer=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.config();

    match &args.command {
        Commands::Analyze { input } => {
            let trades = load_trades(input.as_deref(), &config)?;
            let market = analyze_max_profit_and_buckets(&trades).map_err(user_error)?;
            if args.json {
                emit_json(&config, &market)?;
            } else {
                print_market(&market);
            }
        }
        Commands::Pnl { input } => {
            let trades = load_trades(input.as_deref(), &config)?;
            let report = compute_pnl(&trades, &config).map_err(user_error)?;
            if args.json {
                emit_json(&config, &report)?;
            } else {
                print_pnl(&report);
            }
        }
        Commands::Report { input } => {
            let trades = load_trades(input.as_deref(), &config)?;
            let report = analyze_trades(&trades, &config).map_err(user_error)?;
            if args.json {
                emit_json(&config, &report)?;
            } else {
                print_market(&report.market);
                print_pnl(&report.pnl);
            }
        }
        Commands::Batch { dir, ext, summary_csv } => {
            run_batch(dir, ext, summary_csv.as_deref(), &config, args.json)?;
        }
        Commands::Sample => {
            println!("{}", SAMPLE_DATA);
        }
    }

    Ok(())
}

fn load_trades(input: Option<&Path>, config: &AnalyzerConfig) -> Result<Vec<Trade>> {
    let text = read_input(input)?;
    let trades = TradeParser::from_config(config)
        .parse_nonempty(&text)
        .map_err(user_error)?;
    info!("Parsed {} trades", trades.len());
    Ok(trades)
}

/// Turn an analysis failure into the message shown to the user
fn user_error(err: AnalysisError) -> anyhow::Error {
    let hint = match &err {
        AnalysisError::ParseEmpty => "No valid data found. Please check your input format.",
        AnalysisError::InsufficientData { .. } => "Need at least 2 valid rows to form a trade.",
        AnalysisError::NoWinningPairs => "No winning trades to build a strategy from.",
    };
    anyhow::anyhow!("{} ({})", hint, err)
}

#[derive(Serialize)]
struct JsonOutput<'a, T: Serialize> {
    generated_at: DateTime<Utc>,
    config: &'a AnalyzerConfig,
    result: &'a T,
}

fn emit_json<T: Serialize>(config: &AnalyzerConfig, result: &T) -> Result<()> {
    let output = JsonOutput {
        generated_at: Utc::now(),
        config,
        result,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn describe(trade: &Trade) -> String {
    format!(
        "#{} {}, {} {} @ ${:.2}",
        trade.period, trade.day, trade.date, trade.time, trade.price
    )
}

fn print_market(market: &MarketAnalysis) {
    println!("\n{}", "=".repeat(60));
    println!("MAX PROFIT ANALYSIS ({} trades)", market.total_trades);
    println!("{}", "=".repeat(60));
    println!("Maximum Profit:   ${:.2}", market.max_profit);
    println!("Best Entry Point: {}", describe(&market.best_buy));
    println!("Best Exit Point:  {}", describe(&market.best_sell));
    println!();
    println!("BEST DAYS / TIMES:");
    println!("{}", "-".repeat(40));
    println!(
        "  Buy day:   {} (Avg: ${:.2})",
        market.best_buy_day,
        market.best_buy_day_avg()
    );
    println!(
        "  Sell day:  {} (Avg: ${:.2})",
        market.best_sell_day,
        market.best_sell_day_avg()
    );
    println!(
        "  Buy time:  {} (Avg: ${:.2})",
        market.best_buy_time,
        market.best_buy_time_avg()
    );
    println!(
        "  Sell time: {} (Avg: ${:.2})",
        market.best_sell_time,
        market.best_sell_time_avg()
    );
    println!();
    println!(
        "Entry Strategy: Buy on {} at {}",
        market.best_buy_day, market.best_buy_time
    );
    println!(
        "Exit Strategy:  Sell on {} at {}",
        market.best_sell_day, market.best_sell_time
    );
}

fn print_pnl(report: &PnlReport) {
    let s = &report.summary;

    println!("\n{}", "=".repeat(60));
    println!("SEQUENTIAL PNL ({} round-trips)", s.total_pairs);
    println!("{}", "=".repeat(60));
    println!("  Net P&L:        ${:.2}", s.net_pnl);
    println!("  Win Rate:       {:.2}%", s.win_rate);
    println!(
        "  Profitable:     {} (${:.2})",
        s.profitable_trades, s.total_profit_value
    );
    println!(
        "  Losing:         {} (${:.2})",
        s.loss_trades, s.total_loss_value
    );
    println!(
        "  Avg Win:        ${:.2} | Avg Loss: ${:.2}",
        s.avg_win, s.avg_loss
    );
    println!("  Profit Factor:  {:.2}", s.profit_factor);
    match &s.max_profit {
        Some(pair) => println!(
            "  Best Trade:     ${:.2} ({} -> {})",
            pair.pnl,
            describe(&pair.entry),
            describe(&pair.exit)
        ),
        None => println!("  Best Trade:     none"),
    }
    match &s.max_loss {
        Some(pair) => println!(
            "  Worst Trade:    ${:.2} ({} -> {})",
            pair.pnl,
            describe(&pair.entry),
            describe(&pair.exit)
        ),
        None => println!("  Worst Trade:    none"),
    }

    let patterns = &report.patterns;
    println!();
    println!("HIGH-PROBABILITY PATTERNS:");
    println!("{}", "-".repeat(40));
    if patterns.days.is_empty()
        && patterns.times.is_empty()
        && patterns.holding_periods.is_empty()
    {
        println!("  (none met the sample-size and win-rate thresholds)");
    }
    for p in &patterns.days {
        println!(
            "  Day {}: {:.1}% win ({}/{}), avg profit ${:.2}",
            p.key, p.win_rate, p.profitable, p.total, p.avg_profit
        );
    }
    for p in &patterns.times {
        println!(
            "  Time {}: {:.1}% win ({}/{}), avg profit ${:.2}",
            p.key, p.win_rate, p.profitable, p.total, p.avg_profit
        );
    }
    for p in &patterns.holding_periods {
        println!(
            "  Hold {} periods: {:.1}% win ({}/{}), avg profit ${:.2}",
            p.key, p.win_rate, p.profitable, p.total, p.avg_profit
        );
    }

    if let Some(rec) = &report.recommendation {
        println!();
        println!("STRATEGY RECOMMENDATION:");
        println!("{}", "-".repeat(40));
        println!("  Enter on {} at {}", rec.best_entry_day, rec.best_entry_time);
        println!("  Hold for ~{} periods", rec.avg_holding_period);
        println!(
            "  Example: {} -> {} (${:.2})",
            describe(&rec.sample_trade.entry),
            describe(&rec.sample_trade.exit),
            rec.sample_trade.pnl
        );
    }

    let opportunities = &report.opportunities;
    if let Some(entry) = opportunities.top_entry() {
        println!();
        println!(
            "Top Entry: {} {} ({:.1}% win over {} samples, avg ${:.2})",
            entry.day, entry.time, entry.win_rate, entry.samples, entry.avg_price
        );
    }
    if let Some(exit) = opportunities.top_exit() {
        println!(
            "Top Exit:  {} {} ({:.1}% win over {} samples, avg ${:.2})",
            exit.day, exit.time, exit.win_rate, exit.samples, exit.avg_price
        );
    }
}

/// One line of the batch summary
#[derive(Debug, Default, Serialize)]
struct BatchRow {
    file: String,
    trades: usize,
    max_profit: Option<f64>,
    net_pnl: Option<f64>,
    win_rate: Option<f64>,
    best_buy_day: Option<String>,
    best_sell_day: Option<String>,
    error: Option<String>,
}

fn analyze_file(path: &Path, config: &AnalyzerConfig) -> BatchRow {
    let file = path.display().to_string();

    let text = match read_input(Some(path)) {
        Ok(text) => text,
        Err(e) => {
            error!("{}: {:#}", file, e);
            return BatchRow {
                file,
                error: Some(format!("{:#}", e)),
                ..Default::default()
            };
        }
    };

    let trades = TradeParser::from_config(config).parse(&text);
    let result = if trades.is_empty() {
        Err(AnalysisError::ParseEmpty)
    } else {
        analyze_trades(&trades, config)
    };

    match result {
        Ok(report) => BatchRow {
            file,
            trades: trades.len(),
            max_profit: Some(report.market.max_profit),
            net_pnl: Some(report.pnl.summary.net_pnl),
            win_rate: Some(report.pnl.summary.win_rate),
            best_buy_day: Some(report.market.best_buy_day.to_string()),
            best_sell_day: Some(report.market.best_sell_day.to_string()),
            error: None,
        },
        Err(e) => {
            warn!("{}: {}", file, e);
            BatchRow {
                file,
                trades: trades.len(),
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    }
}

fn run_batch(
    dir: &Path,
    ext: &str,
    summary_csv: Option<&Path>,
    config: &AnalyzerConfig,
    json: bool,
) -> Result<()> {
    info!("=== BATCH MODE ===");
    info!("Input directory: {:?}", dir);

    let files = find_input_files(dir, ext)?;
    info!("Found {} input files", files.len());

    if files.is_empty() {
        info!("No files to analyze");
        return Ok(());
    }

    let rows: Vec<BatchRow> = files
        .par_iter()
        .map(|path| analyze_file(path, config))
        .collect();

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    info!("Analyzed {} files ({} failed)", rows.len(), failed);

    if let Some(path) = summary_csv {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create summary CSV: {:?}", path))?;
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        info!("Wrote summary to {:?}", path);
    }

    if json {
        return emit_json(config, &rows);
    }

    println!("\n{}", "=".repeat(60));
    println!("BATCH SUMMARY ({} files)", rows.len());
    println!("{}", "=".repeat(60));
    for row in &rows {
        match &row.error {
            Some(e) => println!("  {}: FAILED ({})", row.file, e),
            None => println!(
                "  {}: {} trades | max profit ${:.2} | net ${:.2} | WR {:.2}% | buy {} / sell {}",
                row.file,
                row.trades,
                row.max_profit.unwrap_or_default(),
                row.net_pnl.unwrap_or_default(),
                row.win_rate.unwrap_or_default(),
                row.best_buy_day.as_deref().unwrap_or("-"),
                row.best_sell_day.as_deref().unwrap_or("-"),
            ),
        }
    }

    Ok(())
}
