//! Backtest command implementation.

use anyhow::{Result, bail};
use foresight::Research;
use foresight::eval::{BacktestReport, SkipReason};

use crate::{SourceArgs, data};

/// Run the windowed backtest and print its report.
pub(crate) async fn run_backtest(source: &SourceArgs, format: &str) -> Result<()> {
    if format != "text" && format != "json" {
        bail!("unknown format {format:?}, expected text or json");
    }

    let config = data::load_config(source)?;
    let series = data::load_prices(source).await?;
    let research = Research::new(config)?;
    let (_, report) = research.backtest(&series)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, research.config().scorer.as_str());
    }
    Ok(())
}

fn print_report(report: &BacktestReport, scorer: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                       Backtesting                            ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Scorer: {scorer}\n");

    println!(
        "{:<12} {:<12} {:>5} {:>5} {:>5} {:>5} {:>9} {:>7} {:>6}",
        "Start", "End", "TP", "FP", "TN", "FN", "Precision", "Recall", "F1"
    );
    println!("{}", "-".repeat(78));
    for window in &report.windows {
        println!(
            "{:<12} {:<12} {:>5} {:>5} {:>5} {:>5} {:>9.3} {:>7.3} {:>6.3}",
            window.window_start.to_string(),
            window.window_end.to_string(),
            window.counts.tp,
            window.counts.fp,
            window.counts.tn,
            window.counts.fn_,
            window.precision,
            window.recall,
            window.f1
        );
    }
    println!("{}", "-".repeat(78));
    println!(
        "{:<25} {:>5} {:>5} {:>5} {:>5} {:>9.3} {:>7.3} {:>6.3}",
        "Pooled",
        report.pooled.tp,
        report.pooled.fp,
        report.pooled.tn,
        report.pooled.fn_,
        report.precision(),
        report.recall(),
        report.f1()
    );

    if !report.skipped.is_empty() {
        println!("\nSkipped windows:");
        for skipped in &report.skipped {
            let reason = match skipped.reason {
                SkipReason::TooFewTrainingRows { found } => {
                    format!("only {found} training rows")
                }
                SkipReason::EmptyWindow => "no rows with features".to_string(),
                SkipReason::DegenerateTrainingSet => "single-class training set".to_string(),
            };
            println!(
                "  {} to {}: {reason}",
                skipped.window.start, skipped.window.end
            );
        }
    }
    println!();
}
